/// Key under which a record's driver takes part in partitioning.
pub const DRIVER_KEY: &str = "driver";

/// Reserved key for the display name. Never diffed.
pub const NAME_KEY: &str = "name";

/// Key under which the optional unnamed parameter is partitioned.
pub const SECONDARY_KEY: &str = "update-algorithm";

/// Live-plotting hook, hidden from comparison tables.
pub const LIVEPLOTTING_KEY: &str = "liveplotting";

/// Keys that lead every synthesized name, in this order.
pub const PRIORITY_KEYS: [&str; 5] = [
    DRIVER_KEY,
    "ensemble-size",
    SECONDARY_KEY,
    "inflation",
    "rotation",
];

/// Settings whose key starts with this are left out of record display.
pub const PRIVATE_PREFIX: char = '_';

/// Significant digits for floats in synthesized names.
pub const NAME_FLOAT_DIGITS: usize = 5;
