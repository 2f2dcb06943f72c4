//! TOON (Terse Object Notation) codec
//!
//! A line-oriented `key:value` format used for Character Agent output. It is
//! far cheaper in tokens than JSON and trivially parseable:
//!
//! ```text
//! emotional:anxious|hopeful
//! pov:first-limited
//! voice:short-sentences|introspective
//! physical:trembling-hands|quick-glances
//! ```
//!
//! Rules:
//! - one pair per line, no multi-line values, no escaping, no nesting
//! - only the first colon splits; values may contain further colons
//! - keys and values are trimmed independently
//! - lines without a colon, or with an empty key or value, are dropped
//! - a repeated key overwrites the earlier value
//!
//! Pipes are a caller convention for multiple values and are not
//! interpreted here.

use indexmap::IndexMap;

/// Decoded TOON pairs in first-seen key order
pub type ToonMap = IndexMap<String, String>;

/// Decode TOON text into a mapping
pub fn decode(input: &str) -> ToonMap {
    let mut map = ToonMap::new();

    for line in input.split('\n') {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };

        let key = key.trim();
        let value = value.trim();
        if key.is_empty() || value.is_empty() {
            continue;
        }

        map.insert(key.to_string(), value.to_string());
    }

    map
}

/// Encode a mapping as TOON, one `key:value` line per entry
pub fn encode(map: &ToonMap) -> String {
    map.iter()
        .map(|(key, value)| format!("{}:{}", key, value))
        .collect::<Vec<_>>()
        .join("\n")
}
