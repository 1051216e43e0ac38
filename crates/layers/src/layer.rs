use tracing::debug;

/// Separates groups in a products string (`baselayers,a,b~overlays,c`).
pub const GROUP_SEPARATOR: char = '~';
/// Separates the group type and its items.
pub const ITEM_SEPARATOR: char = ',';

/// Layer ids of one `type,item1,item2,...` group. The leading type token
/// (`baselayers`, `overlays`) is not a layer and is dropped.
fn group_items(group: &str) -> impl Iterator<Item = &str> {
    group.split(ITEM_SEPARATOR).skip(1).filter(move |item| {
        if item.is_empty() {
            debug!("skipping empty layer id in group {group:?}");
            return false;
        }
        true
    })
}

/// Flatten a products string into the ordered list of layer ids.
///
/// Group order and intra-group order are preserved. Never fails: a group with
/// only a type contributes nothing.
pub fn decode_products(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(GROUP_SEPARATOR)
        .flat_map(group_items)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::decode_products;
    use pretty_assertions::assert_eq;

    #[test]
    fn drops_group_type_and_concatenates_items() {
        assert_eq!(
            decode_products("baselayer,a,b~overlay,c"),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn empty_and_type_only_groups_yield_nothing() {
        assert!(decode_products("").is_empty());
        assert!(decode_products("baselayers").is_empty());
        assert!(decode_products("~~").is_empty());
        assert_eq!(decode_products("baselayers~overlays,x"), vec!["x"]);
    }

    #[test]
    fn empty_item_tokens_are_skipped() {
        assert_eq!(decode_products("baselayers,,a,"), vec!["a"]);
    }

    #[test]
    fn type_token_is_dropped_even_when_it_looks_like_a_layer() {
        assert_eq!(decode_products("a,b~c,d"), vec!["b", "d"]);
    }
}
