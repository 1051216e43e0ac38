use std::collections::BTreeMap;

use percent_encoding::percent_decode_str;

/// Split a `key=value&key=value` string into a map.
///
/// Keys and values are percent-decoded; `+` is kept as-is so offsets in
/// dates like `2013-05-14T14:30:00+02:00` survive. A leading `?` is ignored,
/// pairs with an empty key are dropped and a repeated key keeps its last
/// value.
pub fn parse_query(query: &str) -> BTreeMap<String, String> {
    let query = query.strip_prefix('?').unwrap_or(query);
    query
        .split('&')
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            if key.is_empty() {
                return None;
            }
            Some((decode(key), decode(value)))
        })
        .collect()
}

fn decode(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}
