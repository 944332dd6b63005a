use elite_assistant_bot::config::Config;
use std::env;
use std::sync::Mutex;

// Mutex to ensure config tests run sequentially to avoid environment variable conflicts
static CONFIG_TEST_MUTEX: Mutex<()> = Mutex::new(());

const ALL_VARS: &[&str] = &[
    "TELEGRAM_BOT_TOKEN",
    "DATABASE_URL",
    "HTTP_PORT",
    "USER_DISPLAY_NAME",
    "WATER_GOAL_ML",
    "UTC_OFFSET_HOURS",
    "HUB_REFRESH_SECS",
    "DEPLOY_WEBHOOK_SECRET",
    "DEPLOY_COMMAND",
    "PERPLEXITY_API_KEY",
    "PERPLEXITY_MODEL",
    "PERPLEXITY_BASE_URL",
];

fn clear_all_vars() {
    for var in ALL_VARS {
        env::remove_var(var);
    }
}

#[test]
fn test_config_from_env_with_all_vars() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_all_vars();

    env::set_var("TELEGRAM_BOT_TOKEN", "test_token_123");
    env::set_var("DATABASE_URL", "sqlite:test.db");
    env::set_var("HTTP_PORT", "8080");
    env::set_var("USER_DISPLAY_NAME", "Gabriel");
    env::set_var("WATER_GOAL_ML", "3000");
    env::set_var("UTC_OFFSET_HOURS", "-5");
    env::set_var("HUB_REFRESH_SECS", "5");
    env::set_var("DEPLOY_WEBHOOK_SECRET", "hook-secret");
    env::set_var("DEPLOY_COMMAND", "./deploy.sh");
    env::set_var("PERPLEXITY_API_KEY", "pplx-key");
    env::set_var("PERPLEXITY_MODEL", "sonar");
    env::set_var("PERPLEXITY_BASE_URL", "https://example.com/api/");

    let config = Config::from_env().unwrap();

    assert_eq!(config.telegram_bot_token, "test_token_123");
    assert_eq!(config.database_url, "sqlite:test.db");
    assert_eq!(config.http_port, 8080);
    assert_eq!(config.user_display_name, "Gabriel");
    assert_eq!(config.water_goal_ml, 3000);
    assert_eq!(config.utc_offset_hours, -5);
    assert_eq!(config.hub_refresh_secs, 5);
    assert_eq!(config.deploy_webhook_secret.as_deref(), Some("hook-secret"));
    assert_eq!(config.deploy_command.as_deref(), Some("./deploy.sh"));
    assert_eq!(config.classifier_api_key.as_deref(), Some("pplx-key"));
    assert_eq!(config.classifier_model, "sonar");
    // Trailing slash is stripped so URL joining stays predictable
    assert_eq!(config.classifier_base_url, "https://example.com/api");

    clear_all_vars();
}

#[test]
fn test_config_from_env_with_defaults() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_all_vars();

    // Only set required token, let everything else use defaults
    env::set_var("TELEGRAM_BOT_TOKEN", "required_token");

    let config = Config::from_env().unwrap();

    assert_eq!(config.telegram_bot_token, "required_token");
    assert_eq!(config.database_url, "sqlite:./data/assistant.db");
    assert_eq!(config.http_port, 3000);
    assert_eq!(config.user_display_name, "amigo");
    assert_eq!(config.water_goal_ml, 4000);
    assert_eq!(config.utc_offset_hours, -3);
    assert_eq!(config.hub_refresh_secs, 2);
    assert!(config.deploy_webhook_secret.is_none());
    assert!(config.deploy_command.is_none());
    assert!(config.classifier_api_key.is_none());
    assert_eq!(config.classifier_model, "sonar-pro");
    assert_eq!(config.classifier_base_url, "https://api.perplexity.ai");

    clear_all_vars();
}

#[test]
fn test_config_missing_required_token() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_all_vars();

    let result = Config::from_env();
    assert!(result.is_err());

    let error_msg = result.unwrap_err().to_string();
    assert!(error_msg.contains("TELEGRAM_BOT_TOKEN must be set"));

    // Whitespace-only token is rejected too
    env::set_var("TELEGRAM_BOT_TOKEN", "   ");
    assert!(Config::from_env().is_err());

    clear_all_vars();
}

#[test]
fn test_config_invalid_port() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_all_vars();

    env::set_var("TELEGRAM_BOT_TOKEN", "test_token");
    env::set_var("HTTP_PORT", "invalid_port");

    let result = Config::from_env();
    assert!(result.is_err());

    let error_msg = result.unwrap_err().to_string();
    assert!(error_msg.contains("Invalid HTTP_PORT"));

    clear_all_vars();
}

#[test]
fn test_config_water_goal_must_be_positive() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_all_vars();

    env::set_var("TELEGRAM_BOT_TOKEN", "test_token");

    env::set_var("WATER_GOAL_ML", "0");
    assert!(Config::from_env().is_err());

    env::set_var("WATER_GOAL_ML", "-500");
    assert!(Config::from_env().is_err());

    env::set_var("WATER_GOAL_ML", "abc");
    let error_msg = Config::from_env().unwrap_err().to_string();
    assert!(error_msg.contains("Invalid WATER_GOAL_ML"));

    clear_all_vars();
}

#[test]
fn test_config_utc_offset_bounds() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_all_vars();

    env::set_var("TELEGRAM_BOT_TOKEN", "test_token");

    // Valid extremes
    env::set_var("UTC_OFFSET_HOURS", "-12");
    assert_eq!(Config::from_env().unwrap().utc_offset_hours, -12);
    env::set_var("UTC_OFFSET_HOURS", "14");
    assert_eq!(Config::from_env().unwrap().utc_offset_hours, 14);

    // Out of range
    env::set_var("UTC_OFFSET_HOURS", "-13");
    assert!(Config::from_env().is_err());
    env::set_var("UTC_OFFSET_HOURS", "15");
    assert!(Config::from_env().is_err());

    env::set_var("UTC_OFFSET_HOURS", "meia-noite");
    let error_msg = Config::from_env().unwrap_err().to_string();
    assert!(error_msg.contains("Invalid UTC_OFFSET_HOURS"));

    clear_all_vars();
}

#[test]
fn test_config_empty_optionals_become_none() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_all_vars();

    env::set_var("TELEGRAM_BOT_TOKEN", "valid_token");
    env::set_var("DATABASE_URL", "");
    env::set_var("DEPLOY_WEBHOOK_SECRET", "   ");
    env::set_var("DEPLOY_COMMAND", "");
    env::set_var("PERPLEXITY_API_KEY", "");
    env::set_var("USER_DISPLAY_NAME", "  ");

    let config = Config::from_env().unwrap();

    // Empty strings fall back to defaults rather than poisoning the config
    assert_eq!(config.database_url, "sqlite:./data/assistant.db");
    assert!(config.deploy_webhook_secret.is_none());
    assert!(config.deploy_command.is_none());
    assert!(config.classifier_api_key.is_none());
    assert_eq!(config.user_display_name, "amigo");

    clear_all_vars();
}

#[test]
fn test_config_port_edge_cases() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_all_vars();

    env::set_var("TELEGRAM_BOT_TOKEN", "test_token");

    env::set_var("HTTP_PORT", "0");
    let config = Config::from_env().unwrap();
    assert_eq!(config.http_port, 0);

    env::set_var("HTTP_PORT", "65535");
    let config = Config::from_env().unwrap();
    assert_eq!(config.http_port, 65535);

    // Negative port (should fail)
    env::set_var("HTTP_PORT", "-1");
    assert!(Config::from_env().is_err());

    // Whitespace around the number parses fine
    env::set_var("HTTP_PORT", "  3000  ");
    let config = Config::from_env().unwrap();
    assert_eq!(config.http_port, 3000);

    clear_all_vars();
}
