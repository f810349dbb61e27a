//! Log level names
//!
//! The script host names its levels `none`, `error`, `warn`, `info`, `debug`
//! and `verbose`. These map onto the `log` facade's filters.

use log::LevelFilter;

/// Host level names and their filters, most to least severe
pub const LEVELS: [(&str, LevelFilter); 6] = [
    ("none", LevelFilter::Off),
    ("error", LevelFilter::Error),
    ("warn", LevelFilter::Warn),
    ("info", LevelFilter::Info),
    ("debug", LevelFilter::Debug),
    ("verbose", LevelFilter::Trace),
];

/// Parse a host level name (exact match)
pub fn parse_level(name: &str) -> Option<LevelFilter> {
    LEVELS
        .iter()
        .find(|(level_name, _)| *level_name == name)
        .map(|(_, filter)| *filter)
}

/// Set the global maximum level by host name
///
/// Unknown names leave the level unchanged and return `false`.
pub fn set_level(name: &str) -> bool {
    match parse_level(name) {
        Some(filter) => {
            log::set_max_level(filter);
            true
        }
        None => {
            log::warn!("Unknown log level \"{}\"", name);
            false
        }
    }
}
