//! Universe provisioning commands

use super::read_document;
use crate::config::Config;
use crate::output::{self, OutputFormat};
use anyhow::{bail, Context, Result};
use clap::Subcommand;
use dialoguer::{Confirm, Password};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tabled::Tabled;
use yba_common::{ClusterType, Error, UniverseDetails, UniverseFormData};
use yba_console::api::YbaClient;
use yba_console::fields::overlay_document;
use yba_console::transform::{get_cluster_by_type, get_form_data};
use yba_console::{
    CreateUniverseFlow, Navigator, ReplicaOutcome, SubmitOutcome, UniverseApi, UniverseSubmitter,
};

#[derive(Subcommand)]
pub enum UniverseCommands {
    /// Configure and create a universe from form files
    Create {
        /// Primary cluster form (YAML or JSON)
        #[arg(long)]
        primary: PathBuf,
        /// Read replica form (YAML or JSON)
        #[arg(long)]
        replica: Option<PathBuf>,
        /// Configure template to lay the payload over (JSON)
        #[arg(long)]
        template: Option<PathBuf>,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Print the form data of an existing universe cluster
    Form {
        universe_uuid: String,
        /// Cluster to read (primary or async)
        #[arg(long, default_value = "primary")]
        cluster: ClusterType,
    },
    /// Add a read replica cluster to a universe
    AddReplica {
        /// Universe details payload (JSON or YAML) naming the universe
        #[arg(long)]
        payload: PathBuf,
    },
    /// Apply an edited read replica configuration
    EditReplica {
        /// Universe details payload (JSON or YAML) naming the universe
        #[arg(long)]
        payload: PathBuf,
    },
}

#[derive(Tabled)]
struct ClusterRow {
    cluster: String,
    name: String,
    provider: String,
    regions: usize,
    nodes: u32,
    rf: u32,
    instance_type: String,
    version: String,
}

impl ClusterRow {
    fn new(cluster_type: ClusterType, form: &UniverseFormData) -> Self {
        Self {
            cluster: cluster_type.to_string(),
            name: form.cloud_config.universe_name.clone(),
            provider: form
                .cloud_config
                .provider
                .as_ref()
                .map(|p| p.code.to_string())
                .unwrap_or_else(|| "-".to_string()),
            regions: form.cloud_config.region_list.len(),
            nodes: form.cloud_config.num_nodes,
            rf: form.cloud_config.replication_factor,
            instance_type: form
                .instance_config
                .instance_type
                .clone()
                .unwrap_or_else(|| "-".to_string()),
            version: form
                .advanced_config
                .yb_software_version
                .clone()
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Remembers where the console would have navigated to
struct TaskPageNavigator {
    base_url: String,
    landed: Mutex<Option<String>>,
}

impl TaskPageNavigator {
    fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            landed: Mutex::new(None),
        }
    }

    fn task_page(&self) -> Option<String> {
        self.landed.lock().ok().and_then(|landed| landed.clone())
    }
}

impl Navigator for TaskPageNavigator {
    fn navigate(&self, path: &str) {
        if let Ok(mut landed) = self.landed.lock() {
            *landed = Some(format!("{}{}", self.base_url, path));
        }
    }
}

fn spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn print_task_page(navigator: &TaskPageNavigator) {
    if let Some(page) = navigator.task_page() {
        output::print_info(&format!("Track progress: {}", page));
    }
}

/// Check confirmation fields and prompt for passwords an enabled auth
/// toggle still needs
fn complete_credentials(form: &mut UniverseFormData, interactive: bool) -> Result<()> {
    let instance = &mut form.instance_config;
    let databases = [
        (
            "YSQL",
            instance.enable_ysql && instance.enable_ysql_auth,
            &mut instance.ysql_password,
            &mut instance.ysql_confirm_password,
        ),
        (
            "YCQL",
            instance.enable_ycql && instance.enable_ycql_auth,
            &mut instance.ycql_password,
            &mut instance.ycql_confirm_password,
        ),
    ];

    for (label, auth_enabled, password, confirm) in databases {
        if !auth_enabled {
            continue;
        }
        let given = password.clone().filter(|p| !p.is_empty());
        if let (Some(p), Some(c)) = (given.as_deref(), confirm.as_deref()) {
            if p != c {
                bail!("{} password confirmation does not match", label);
            }
        }
        if given.is_some() {
            continue;
        }
        if !interactive {
            bail!("{} auth is enabled but no password was given", label);
        }

        let entered = Password::new()
            .with_prompt(format!("{} password", label))
            .with_confirmation("Confirm password", "Passwords do not match")
            .interact()?;
        *password = Some(entered.clone());
        *confirm = Some(entered);
    }
    Ok(())
}

/// Open the replica view from `primary` the way the create page does, lay
/// the replica document over the seeded form and switch back
fn seed_replica(
    flow: &mut CreateUniverseFlow,
    primary: &UniverseFormData,
    replica: &Value,
) -> Result<UniverseFormData> {
    flow.switch_cluster_type(primary.clone());
    let seeded = flow.default_form_data()?;
    let replica = overlay_document(&seeded, replica)?;
    flow.switch_cluster_type(replica.clone());
    Ok(replica)
}

pub async fn handle_universe_command(
    command: UniverseCommands,
    api: &YbaClient,
    config: &Config,
    output_format: &str,
) -> Result<()> {
    match command {
        UniverseCommands::Create {
            primary,
            replica,
            template,
            yes,
        } => {
            let mut primary: UniverseFormData = read_document(&primary)?;
            complete_credentials(&mut primary, !yes)?;

            let mut flow = CreateUniverseFlow::new();
            if let Some(template) = template {
                let template: UniverseDetails = read_document(&template)?;
                flow = flow.with_configure_template(template);
            }

            let mut rows = vec![ClusterRow::new(ClusterType::Primary, &primary)];
            if let Some(replica) = replica {
                let replica: Value = read_document(&replica)?;
                seed_replica(&mut flow, &primary, &replica)?;
                let (_, seeded) = flow.submission_pair(primary.clone())?;
                if let Some(seeded) = &seeded {
                    rows.push(ClusterRow::new(ClusterType::Async, seeded));
                }
            }
            output::print_table(rows);

            if !yes {
                let confirm = Confirm::new()
                    .with_prompt(format!(
                        "Create universe '{}'?",
                        primary.cloud_config.universe_name
                    ))
                    .interact()?;
                if !confirm {
                    output::print_info("Creation aborted");
                    return Ok(());
                }
            }

            let navigator = TaskPageNavigator::new(api.base_url());
            let submitter = UniverseSubmitter::new(api.clone(), navigator);
            let name = primary.cloud_config.universe_name.clone();

            let progress = spinner(format!("Configuring universe '{}'...", name));
            let outcome = flow
                .submit(&submitter, primary, &config.feature_flags)
                .await?;
            progress.finish_and_clear();

            match outcome {
                SubmitOutcome::Created(resource) => {
                    let id = resource.universe_uuid().unwrap_or("-");
                    output::print_submitted("Universe", &name, id);
                    if let Some(task) = &resource.task_uuid {
                        output::print_info(&format!("Task: {}", task));
                    }
                    print_task_page(submitter.navigator());
                }
                SubmitOutcome::Failed => {
                    bail!("universe creation failed, see the log output above")
                }
                SubmitOutcome::AlreadyInFlight => bail!("a submission is already running"),
            }
        }

        UniverseCommands::Form {
            universe_uuid,
            cluster,
        } => {
            let universe = api.get_universe(&universe_uuid).await?;
            if get_cluster_by_type(&universe.universe_details, cluster).is_none() {
                return Err(Error::ClusterNotFound(cluster))
                    .with_context(|| format!("universe '{}'", universe.name));
            }
            let form = get_form_data(&universe.universe_details, cluster);
            output::print_single(&form, OutputFormat::from_str(output_format))?;
        }

        UniverseCommands::AddReplica { payload } => {
            let payload: UniverseDetails = read_document(&payload)?;
            let navigator = TaskPageNavigator::new(api.base_url());
            let submitter = UniverseSubmitter::new(api.clone(), navigator);

            let progress = spinner("Adding read replica...".to_string());
            let outcome = submitter.create_read_replica(&payload).await;
            progress.finish_and_clear();
            report_replica_outcome(outcome, "Read replica", &submitter)?;
        }

        UniverseCommands::EditReplica { payload } => {
            let payload: UniverseDetails = read_document(&payload)?;
            let navigator = TaskPageNavigator::new(api.base_url());
            let submitter = UniverseSubmitter::new(api.clone(), navigator);

            let progress = spinner("Editing read replica...".to_string());
            let outcome = submitter.edit_read_replica(&payload).await;
            progress.finish_and_clear();
            report_replica_outcome(outcome, "Read replica edit", &submitter)?;
        }
    }

    Ok(())
}

fn report_replica_outcome<A: UniverseApi>(
    outcome: ReplicaOutcome,
    resource_type: &str,
    submitter: &UniverseSubmitter<A, TaskPageNavigator>,
) -> Result<()> {
    match outcome {
        ReplicaOutcome::Submitted(resource) => {
            let id = resource.task_uuid.as_deref().unwrap_or("-");
            let universe = resource.universe_uuid().unwrap_or("-");
            output::print_submitted(resource_type, universe, id);
            print_task_page(submitter.navigator());
            Ok(())
        }
        ReplicaOutcome::Failed(message) => {
            print_task_page(submitter.navigator());
            bail!("{} failed: {}", resource_type.to_lowercase(), message)
        }
        ReplicaOutcome::MissingUniverse => bail!("payload has no universeUUID"),
        ReplicaOutcome::AlreadyInFlight => bail!("a submission is already running"),
    }
}
