use std::collections::BTreeMap;

use layers::{PaletteAssignments, decode_palettes, decode_products};

use crate::query::parse_query;

pub const KEY_PRODUCTS: &str = "products";
pub const KEY_PALETTES: &str = "palettes";
pub const KEY_SWITCH: &str = "switch";
pub const KEY_TIME: &str = "time";

/// Decoded application state.
///
/// The raw `products` / `palettes` substrings are kept next to their decoded
/// forms because change detection compares the raw text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedState {
    /// Full serialized string this state was parsed from. `None` only for the
    /// empty snapshot of a projection that has not been reconciled yet.
    pub query_string: Option<String>,
    /// Requested projection id.
    pub switch: Option<String>,
    pub time: Option<String>,
    pub products_string: Option<String>,
    /// Visible layer ids in display order.
    pub products: Vec<String>,
    pub palettes_string: Option<String>,
    pub palettes: PaletteAssignments,
    /// Keys this crate does not interpret.
    pub extra: BTreeMap<String, String>,
}

impl ParsedState {
    /// Parse a serialized state. Never fails.
    pub fn parse(query: &str) -> Self {
        let mut fields = parse_query(query);

        let products_string = fields.remove(KEY_PRODUCTS);
        let palettes_string = fields.remove(KEY_PALETTES);
        let products = products_string
            .as_deref()
            .map(decode_products)
            .unwrap_or_default();
        let palettes = palettes_string
            .as_deref()
            .map(decode_palettes)
            .unwrap_or_default();

        Self {
            query_string: Some(query.to_string()),
            switch: fields.remove(KEY_SWITCH),
            time: fields.remove(KEY_TIME),
            products_string,
            products,
            palettes_string,
            palettes,
            extra: fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ParsedState;
    use pretty_assertions::assert_eq;

    #[test]
    fn decodes_products_and_palettes() {
        let s = ParsedState::parse(
            "switch=arctic&products=baselayer,a,b~overlay,c&palettes=ndvi,rainbow~ndvi,gray&time=2013-05-14",
        );
        assert_eq!(s.switch.as_deref(), Some("arctic"));
        assert_eq!(s.time.as_deref(), Some("2013-05-14"));
        assert_eq!(s.products, vec!["a", "b", "c"]);
        assert_eq!(s.products_string.as_deref(), Some("baselayer,a,b~overlay,c"));
        assert_eq!(s.palettes.len(), 1);
        assert_eq!(s.palettes["ndvi"], "gray");
        assert_eq!(s.palettes_string.as_deref(), Some("ndvi,rainbow~ndvi,gray"));
        assert!(s.extra.is_empty());
    }

    #[test]
    fn absent_fields_are_none_and_empty() {
        let s = ParsedState::parse("");
        assert_eq!(s.query_string.as_deref(), Some(""));
        assert_eq!(s.switch, None);
        assert_eq!(s.time, None);
        assert_eq!(s.products_string, None);
        assert!(s.products.is_empty());
        assert!(s.palettes.is_empty());
    }

    #[test]
    fn keeps_unknown_keys() {
        let s = ParsedState::parse("map=-10,-10,10,10&products=baselayers,x");
        assert_eq!(s.extra["map"], "-10,-10,10,10");
        assert_eq!(s.products, vec!["x"]);
    }

    #[test]
    fn garbage_does_not_panic() {
        for q in ["&&&", "products=~,~,,", "palettes=,,,~", "=~=~", "%zz=%"] {
            let _ = ParsedState::parse(q);
        }
    }
}
