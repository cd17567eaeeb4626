//! Abbreviated setting keys, resolved once when a record is built.

/// Bumped whenever an entry is added, removed or retargeted.
pub const ALIAS_TABLE_VERSION: u32 = 1;

/// `(short, canonical)` pairs.
pub const ALIASES: &[(&str, &str)] = &[("LP", crate::constants::LIVEPLOTTING_KEY)];

/// Canonical form of a setting key.
pub fn canonical_key(key: &str) -> &str {
    ALIASES
        .iter()
        .find(|(short, _)| *short == key)
        .map_or(key, |&(_, canonical)| canonical)
}
