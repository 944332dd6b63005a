use anyhow::{anyhow, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub database_url: String,
    pub http_port: u16,
    /// Name used when greeting the user on the hub card.
    pub user_display_name: String,
    /// Daily hydration goal in millilitres.
    pub water_goal_ml: i64,
    /// Offset from UTC for all user-facing dates and times.
    pub utc_offset_hours: i32,
    /// Seconds to wait before returning to the hub after the wake-up card.
    pub hub_refresh_secs: u64,
    pub deploy_webhook_secret: Option<String>,
    pub deploy_command: Option<String>,
    pub classifier_api_key: Option<String>,
    pub classifier_model: String,
    pub classifier_base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let token = env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| anyhow!("TELEGRAM_BOT_TOKEN must be set"))?;

        if token.trim().is_empty() {
            return Err(anyhow!("TELEGRAM_BOT_TOKEN must be set"));
        }

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:./data/assistant.db".to_string());
        let database_url = if database_url.trim().is_empty() {
            "sqlite:./data/assistant.db".to_string()
        } else {
            database_url
        };

        let port_str = env::var("HTTP_PORT").unwrap_or_else(|_| "3000".to_string());
        let http_port = port_str
            .trim()
            .parse()
            .map_err(|_| anyhow!("Invalid HTTP_PORT"))?;

        let user_display_name = non_empty_var("USER_DISPLAY_NAME")
            .unwrap_or_else(|| "amigo".to_string());

        let water_goal_ml: i64 = env::var("WATER_GOAL_ML")
            .unwrap_or_else(|_| "4000".to_string())
            .trim()
            .parse()
            .map_err(|_| anyhow!("Invalid WATER_GOAL_ML"))?;
        if water_goal_ml <= 0 {
            return Err(anyhow!("WATER_GOAL_ML must be positive"));
        }

        let utc_offset_hours: i32 = env::var("UTC_OFFSET_HOURS")
            .unwrap_or_else(|_| "-3".to_string())
            .trim()
            .parse()
            .map_err(|_| anyhow!("Invalid UTC_OFFSET_HOURS"))?;
        if !(-12..=14).contains(&utc_offset_hours) {
            return Err(anyhow!("UTC_OFFSET_HOURS must be between -12 and 14"));
        }

        let hub_refresh_secs: u64 = env::var("HUB_REFRESH_SECS")
            .unwrap_or_else(|_| "2".to_string())
            .trim()
            .parse()
            .map_err(|_| anyhow!("Invalid HUB_REFRESH_SECS"))?;

        let classifier_model = non_empty_var("PERPLEXITY_MODEL")
            .unwrap_or_else(|| "sonar-pro".to_string());
        let classifier_base_url = non_empty_var("PERPLEXITY_BASE_URL")
            .unwrap_or_else(|| "https://api.perplexity.ai".to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Config {
            telegram_bot_token: token,
            database_url,
            http_port,
            user_display_name,
            water_goal_ml,
            utc_offset_hours,
            hub_refresh_secs,
            deploy_webhook_secret: non_empty_var("DEPLOY_WEBHOOK_SECRET"),
            deploy_command: non_empty_var("DEPLOY_COMMAND"),
            classifier_api_key: non_empty_var("PERPLEXITY_API_KEY"),
            classifier_model,
            classifier_base_url,
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
