use std::collections::BTreeMap;

use tracing::debug;

use crate::layer::{GROUP_SEPARATOR, ITEM_SEPARATOR};

/// Product id -> palette name.
pub type PaletteAssignments = BTreeMap<String, String>;

/// Decode a palettes string (`ndvi,rainbow~sst,gray`).
///
/// Later definitions for the same product win. Definitions without a palette
/// name are skipped and anything after the second token is ignored.
pub fn decode_palettes(raw: &str) -> PaletteAssignments {
    let mut out = PaletteAssignments::new();
    if raw.is_empty() {
        return out;
    }
    for definition in raw.split(GROUP_SEPARATOR) {
        let mut tokens = definition.split(ITEM_SEPARATOR);
        let product = tokens.next().unwrap_or("");
        match tokens.next() {
            Some(palette) if !product.is_empty() && !palette.is_empty() => {
                out.insert(product.to_string(), palette.to_string());
            }
            _ => debug!("skipping malformed palette definition {definition:?}"),
        }
    }
    out
}
