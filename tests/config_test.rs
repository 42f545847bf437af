//! Configuration loading tests

use serial_test::serial;
use MenuGate::config::{Settings, StateBackend};

const VARS: &[&str] = &[
    "MENUGATE__BOT__TOKEN",
    "MENUGATE__BOT__SUPER_ADMIN_ID",
    "MENUGATE__BOT__ADMIN_IDS",
    "MENUGATE__STATE__BACKEND",
    "MENUGATE__BROADCAST__DELAY_MS",
];

fn clear_env() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_settings_from_environment() {
    clear_env();
    std::env::set_var("MENUGATE__BOT__TOKEN", "12345:env_token");
    std::env::set_var("MENUGATE__BOT__SUPER_ADMIN_ID", "1000");
    std::env::set_var("MENUGATE__BOT__ADMIN_IDS", "2001,2002");
    std::env::set_var("MENUGATE__STATE__BACKEND", "redis");

    let settings = Settings::new().unwrap();
    clear_env();

    assert_eq!(settings.bot.token, "12345:env_token");
    assert_eq!(settings.bot.super_admin_id, Some(1000));
    assert_eq!(settings.bot.admin_ids, vec![2001, 2002]);
    assert_eq!(settings.state.backend, StateBackend::Redis);
    assert!(settings.is_configured_super_admin(1000));

    // Untouched sections keep their defaults
    assert_eq!(settings.broadcast.delay_ms, 50);
    assert_eq!(settings.gate.check_timeout_seconds, 10);
    assert!(settings.validate().is_ok());
}

#[test]
#[serial]
fn test_missing_token_is_rejected() {
    clear_env();
    assert!(Settings::new().is_err(), "bot.token has no default");

    std::env::set_var("MENUGATE__BOT__TOKEN", "  ");
    let settings = Settings::new().unwrap();
    clear_env();

    assert!(settings.validate().is_err());
}

#[test]
#[serial]
fn test_invalid_super_admin_is_rejected() {
    clear_env();
    std::env::set_var("MENUGATE__BOT__TOKEN", "12345:env_token");
    std::env::set_var("MENUGATE__BOT__SUPER_ADMIN_ID", "-5");

    let settings = Settings::new().unwrap();
    clear_env();

    assert!(settings.validate().is_err());
}
