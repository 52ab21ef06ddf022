//! Alert configuration and template preview commands

use crate::output::{self, OutputFormat};
use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::Subcommand;
use dialoguer::Select;
use serde::Serialize;
use std::path::PathBuf;
use tabled::Tabled;
use yba_common::AlertConfiguration;
use yba_console::api::YbaClient;
use yba_console::preview::TextDeserializer;
use yba_console::{AlertApi, PreviewState, TemplatePreview};

#[derive(Subcommand)]
pub enum AlertCommands {
    /// List alert configurations
    Configs,
    /// Render a webhook template against an alert configuration
    Preview {
        /// Template body; `{{ name }}` marks an alert variable
        #[arg(long)]
        template: PathBuf,
        /// Alert configuration uuid or name (prompted for if omitted)
        #[arg(long)]
        config: Option<String>,
    },
}

#[derive(Tabled, Serialize)]
struct AlertConfigRow {
    uuid: String,
    name: String,
    target: String,
    active: bool,
    created: String,
}

impl From<&AlertConfiguration> for AlertConfigRow {
    fn from(config: &AlertConfiguration) -> Self {
        Self {
            uuid: config.uuid.clone(),
            name: output::truncate(&config.name, 48),
            target: config.target_type.clone().unwrap_or_else(|| "-".to_string()),
            active: config.active,
            created: config
                .create_time
                .map(|time| {
                    time.with_timezone(&Local)
                        .format("%Y-%m-%d %H:%M")
                        .to_string()
                })
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

#[derive(Serialize)]
struct RenderedPreview<'a> {
    config_uuid: &'a str,
    config_name: &'a str,
    text: String,
}

/// Find a configuration by uuid, or by name ignoring case
fn find_config<'a>(
    configs: &'a [AlertConfiguration],
    wanted: &str,
) -> Option<&'a AlertConfiguration> {
    configs
        .iter()
        .find(|config| config.uuid == wanted)
        .or_else(|| {
            configs
                .iter()
                .find(|config| config.name.eq_ignore_ascii_case(wanted))
        })
}

async fn loaded_preview<A: AlertApi>(preview: &mut TemplatePreview<A>) -> Result<()> {
    preview.show();
    if *preview.load_configs().await == PreviewState::ConfigLoading {
        bail!("could not load alert configurations, see the log output above");
    }
    Ok(())
}

pub async fn handle_alert_command(
    command: AlertCommands,
    api: &YbaClient,
    output_format: &str,
) -> Result<()> {
    let format = OutputFormat::from_str(output_format);

    match command {
        AlertCommands::Configs => {
            let mut preview = TemplatePreview::new(api.clone(), Vec::new());
            loaded_preview(&mut preview).await?;

            let rows: Vec<AlertConfigRow> = preview.configs().iter().map(AlertConfigRow::from).collect();
            output::print_output(rows, format)?;
        }

        AlertCommands::Preview { template, config } => {
            let body = std::fs::read_to_string(&template)
                .with_context(|| format!("failed to read {}", template.display()))?;
            let mut preview = TemplatePreview::new(api.clone(), TextDeserializer::deserialize(body.trim_end()));
            loaded_preview(&mut preview).await?;

            let selected = match config {
                Some(wanted) => find_config(preview.configs(), &wanted)
                    .with_context(|| format!("no alert configuration '{}'", wanted))?,
                None => {
                    if preview.configs().is_empty() {
                        bail!("no alert configurations to preview against");
                    }
                    let names: Vec<&str> =
                        preview.configs().iter().map(|c| c.name.as_str()).collect();
                    let index = Select::new()
                        .with_prompt("Alert configuration")
                        .items(&names)
                        .default(0)
                        .interact()?;
                    &preview.configs()[index]
                }
            }
            .clone();

            match preview.select(&selected.uuid).await {
                PreviewState::PreviewResolved { .. } => {}
                PreviewState::PreviewFailed { message, .. } => {
                    bail!("preview failed: {}", message)
                }
                other => bail!("unexpected preview state: {:?}", other),
            }

            let text = preview.editor().to_text();
            match format {
                OutputFormat::Table => {
                    output::print_info(&format!("Preview for '{}'", selected.name));
                    println!("{}", text);
                }
                _ => output::print_single(
                    &RenderedPreview {
                        config_uuid: &selected.uuid,
                        config_name: &selected.name,
                        text,
                    },
                    format,
                )?,
            }
        }
    }

    Ok(())
}
