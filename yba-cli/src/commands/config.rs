//! Local configuration commands

use crate::config::{Config, TOKEN_ENV};
use crate::output::{self, OutputFormat};
use anyhow::Result;
use clap::Subcommand;
use dialoguer::Password;
use serde::Serialize;
use std::collections::BTreeSet;
use tabled::Tabled;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the stored configuration
    Show,
    /// Store the platform API token
    SetToken {
        /// API token (will be prompted if not provided)
        token: Option<String>,
    },
    /// Store the customer the commands act on
    SetCustomer { customer_uuid: String },
}

#[derive(Tabled, Serialize)]
struct SettingRow {
    setting: String,
    value: String,
}

impl SettingRow {
    fn new(setting: &str, value: impl Into<String>) -> Self {
        Self {
            setting: setting.to_string(),
            value: value.into(),
        }
    }
}

fn setting_rows(config: &Config, env_token_set: bool) -> Vec<SettingRow> {
    let token = match (&config.api_token, env_token_set) {
        (_, true) => format!("(from {})", TOKEN_ENV),
        (Some(token), false) => output::mask_secret(token),
        (None, false) => "-".to_string(),
    };
    let enabled_flags: BTreeSet<&str> = config
        .feature_flags
        .released
        .keys()
        .chain(config.feature_flags.test.keys())
        .filter(|name| config.feature_flags.is_enabled(name))
        .map(String::as_str)
        .collect();

    vec![
        SettingRow::new("default_server", config.default_server.clone()),
        SettingRow::new("default_output", config.default_output.clone()),
        SettingRow::new("api_token", token),
        SettingRow::new(
            "customer_uuid",
            config.customer_uuid.clone().unwrap_or_else(|| "-".to_string()),
        ),
        SettingRow::new(
            "feature_flags",
            enabled_flags.into_iter().collect::<Vec<_>>().join(", "),
        ),
    ]
}

pub fn handle_config_command(
    command: ConfigCommands,
    config: &mut Config,
    output_format: &str,
) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            let env_token_set = std::env::var(TOKEN_ENV).is_ok_and(|token| !token.is_empty());
            let rows = setting_rows(config, env_token_set);
            output::print_output(rows, OutputFormat::from_str(output_format))?;
            output::print_info(&format!("Config file: {}", Config::config_path()?.display()));
        }

        ConfigCommands::SetToken { token } => {
            let token = match token {
                Some(token) => token,
                None => Password::new().with_prompt("API token").interact()?,
            };
            config.api_token = Some(token);
            config.save()?;
            output::print_success("API token saved");
        }

        ConfigCommands::SetCustomer { customer_uuid } => {
            config.customer_uuid = Some(customer_uuid.clone());
            config.save()?;
            output::print_success(&format!("Customer set to {}", customer_uuid));
        }
    }

    Ok(())
}
