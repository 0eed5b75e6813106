mod common;

use tracing::Level;

use watchpoint::cli::LogLevel;
use watchpoint::logging::{parse_level_str, resolve_level};

#[test]
fn level_names_parse_loosely() {
    assert_eq!(parse_level_str("debug"), Some(Level::DEBUG));
    assert_eq!(parse_level_str("  TRACE \n"), Some(Level::TRACE));
    assert_eq!(parse_level_str("Warning"), Some(Level::WARN));
    assert_eq!(parse_level_str("loud"), None);
    assert_eq!(parse_level_str(""), None);
}

#[test]
fn flag_wins_over_the_environment() {
    let (level, rejected) = resolve_level(Some(LogLevel::Error), Some("trace"));
    assert_eq!(level, Level::ERROR);
    assert_eq!(rejected, None);

    // A bad env value is irrelevant when the flag is given.
    let (level, rejected) = resolve_level(Some(LogLevel::Debug), Some("loud"));
    assert_eq!(level, Level::DEBUG);
    assert_eq!(rejected, None);
}

#[test]
fn environment_is_used_without_a_flag() {
    assert_eq!(resolve_level(None, Some("debug")), (Level::DEBUG, None));
    assert_eq!(resolve_level(None, None), (Level::INFO, None));
    assert_eq!(resolve_level(None, Some("   ")), (Level::INFO, None));
}

#[test]
fn unrecognised_environment_value_falls_back_and_is_reported() {
    let (level, rejected) = resolve_level(None, Some(" verbose "));
    assert_eq!(level, Level::INFO);
    assert_eq!(rejected.as_deref(), Some("verbose"));
}
