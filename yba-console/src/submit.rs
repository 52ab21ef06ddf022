//! Configure payload assembly and the configure → create submission sequence

use crate::api::{ClientError, UniverseApi};
use crate::context::UniverseFormContextState;
use crate::transform::build_cluster;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use yba_common::{
    Cluster, ClusterModes, ClusterType, EncryptionAtRestConfig, KeyOp, UniverseDetails,
    UniverseFormData, UniverseResource, UserIntent,
};

/// Page a universe's provisioning tasks are shown on
pub fn universe_tasks_path(universe_uuid: &str) -> String {
    format!("/universes/{}/tasks", universe_uuid)
}

/// Where the console goes once a submission settles
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Feature flag sets as served to the console
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct FeatureFlags {
    #[serde(default)]
    pub released: BTreeMap<String, bool>,
    #[serde(default)]
    pub test: BTreeMap<String, bool>,
}

impl FeatureFlags {
    pub const ENABLE_YBC: &'static str = "enableYbc";

    /// A flag is on if either the released or the test set enables it
    pub fn is_enabled(&self, name: &str) -> bool {
        self.released.get(name).copied().unwrap_or(false)
            || self.test.get(name).copied().unwrap_or(false)
    }
}

/// Errors that abort a submission before or during the API calls
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("invalid form data: {0}")]
    Payload(#[from] yba_common::Error),
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Encryption-at-rest settings derived from the primary form
pub fn encryption_at_rest_config(primary: &UniverseFormData) -> EncryptionAtRestConfig {
    let enabled = primary.instance_config.enable_encryption_at_rest;
    EncryptionAtRestConfig {
        key_op: Some(KeyOp::from_toggle(enabled)),
        config_uuid: primary
            .instance_config
            .kms_config
            .clone()
            .filter(|kms| enabled && !kms.is_empty()),
        ..Default::default()
    }
}

/// CREATE payload with the primary cluster first and the optional read
/// replica second
pub fn build_create_payload(
    primary: &UniverseFormData,
    async_data: Option<&UniverseFormData>,
    current_cluster_type: ClusterType,
    features: &FeatureFlags,
) -> yba_common::Result<UniverseDetails> {
    let mut clusters = vec![build_cluster(primary, ClusterType::Primary)?];
    if let Some(async_data) = async_data {
        clusters.push(build_cluster(async_data, ClusterType::Async)?);
    }

    Ok(UniverseDetails {
        cluster_operation: Some(ClusterModes::Create),
        current_cluster_type: Some(current_cluster_type),
        root_ca: primary.instance_config.root_ca.clone(),
        user_az_selected: false,
        reset_az_config: false,
        enable_ybc: features.is_enabled(FeatureFlags::ENABLE_YBC),
        communication_ports: Some(primary.advanced_config.communication_ports.clone()),
        encryption_at_rest_config: Some(encryption_at_rest_config(primary)),
        clusters,
        ..Default::default()
    })
}

/// Lay `payload` over a server-provided configure template.
///
/// Precedence: optional fields set in the payload win, unset ones fall back
/// to the template; booleans and user intents always come from the payload;
/// clusters merge index by index and template clusters past the payload's
/// length are kept; unknown fields are unioned with the payload winning.
pub fn merge_onto_template(template: &UniverseDetails, payload: UniverseDetails) -> UniverseDetails {
    let mut extra = template.extra.clone();
    extra.extend(payload.extra);

    let mut clusters: Vec<Cluster> = payload
        .clusters
        .into_iter()
        .enumerate()
        .map(|(index, cluster)| match template.clusters.get(index) {
            Some(base) => merge_cluster(base, cluster),
            None => cluster,
        })
        .collect();
    let merged_len = clusters.len();
    clusters.extend(template.clusters.iter().skip(merged_len).cloned());

    UniverseDetails {
        universe_uuid: payload
            .universe_uuid
            .or_else(|| template.universe_uuid.clone()),
        cluster_operation: payload.cluster_operation.or(template.cluster_operation),
        current_cluster_type: payload
            .current_cluster_type
            .or(template.current_cluster_type),
        root_ca: payload.root_ca.or_else(|| template.root_ca.clone()),
        user_az_selected: payload.user_az_selected,
        reset_az_config: payload.reset_az_config,
        enable_ybc: payload.enable_ybc,
        communication_ports: payload
            .communication_ports
            .or_else(|| template.communication_ports.clone()),
        encryption_at_rest_config: payload
            .encryption_at_rest_config
            .or_else(|| template.encryption_at_rest_config.clone()),
        clusters,
        extra,
    }
}

fn merge_cluster(base: &Cluster, cluster: Cluster) -> Cluster {
    let mut extra = base.extra.clone();
    extra.extend(cluster.extra);

    let mut user_intent = cluster.user_intent;
    let mut intent_extra = base.user_intent.extra.clone();
    intent_extra.extend(std::mem::take(&mut user_intent.extra));
    user_intent.extra = intent_extra;

    Cluster {
        uuid: cluster.uuid.or_else(|| base.uuid.clone()),
        cluster_type: cluster.cluster_type,
        user_intent,
        placement_info: cluster
            .placement_info
            .or_else(|| base.placement_info.clone()),
        extra,
    }
}

/// Fields the configure endpoint does not hand back the way they were sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonEchoedField {
    ClusterOperation,
    CurrentClusterType,
    EncryptionAtRestConfig,
    /// First cluster only
    InstanceTags,
    /// First cluster only
    MasterGflags,
    /// First cluster only
    TserverGflags,
}

pub const NON_ECHOED_FIELDS: &[NonEchoedField] = &[
    NonEchoedField::ClusterOperation,
    NonEchoedField::CurrentClusterType,
    NonEchoedField::EncryptionAtRestConfig,
    NonEchoedField::InstanceTags,
    NonEchoedField::MasterGflags,
    NonEchoedField::TserverGflags,
];

impl NonEchoedField {
    pub fn name(self) -> &'static str {
        match self {
            Self::ClusterOperation => "clusterOperation",
            Self::CurrentClusterType => "currentClusterType",
            Self::EncryptionAtRestConfig => "encryptionAtRestConfig",
            Self::InstanceTags => "clusters[0].userIntent.instanceTags",
            Self::MasterGflags => "clusters[0].userIntent.masterGFlags",
            Self::TserverGflags => "clusters[0].userIntent.tserverGFlags",
        }
    }

    /// Copy this field from the payload that was sent into the response
    pub fn restore(self, response: &mut UniverseDetails, sent: &UniverseDetails) {
        match self {
            Self::ClusterOperation => response.cluster_operation = sent.cluster_operation,
            Self::CurrentClusterType => response.current_cluster_type = sent.current_cluster_type,
            Self::EncryptionAtRestConfig => {
                response.encryption_at_rest_config = sent.encryption_at_rest_config.clone()
            }
            Self::InstanceTags => {
                if let Some((target, source)) = first_intents(response, sent) {
                    target.instance_tags = source.instance_tags.clone();
                }
            }
            Self::MasterGflags => {
                if let Some((target, source)) = first_intents(response, sent) {
                    target.master_gflags = source.master_gflags.clone();
                }
            }
            Self::TserverGflags => {
                if let Some((target, source)) = first_intents(response, sent) {
                    target.tserver_gflags = source.tserver_gflags.clone();
                }
            }
        }
    }
}

fn first_intents<'a>(
    response: &'a mut UniverseDetails,
    sent: &'a UniverseDetails,
) -> Option<(&'a mut UserIntent, &'a UserIntent)> {
    let target = response.clusters.first_mut()?;
    let source = sent.clusters.first()?;
    Some((&mut target.user_intent, &source.user_intent))
}

/// Undo the configure endpoint's lossy round trip before calling create
pub fn reconcile_configure_response(
    mut response: UniverseDetails,
    sent: &UniverseDetails,
) -> UniverseDetails {
    if response.clusters.is_empty() || sent.clusters.is_empty() {
        tracing::warn!("configure round trip without clusters, only universe fields reconciled");
    }
    for field in NON_ECHOED_FIELDS {
        tracing::trace!("restoring {}", field.name());
        field.restore(&mut response, sent);
    }
    response
}

/// Result of a universe creation attempt
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Created(UniverseResource),
    Failed,
    AlreadyInFlight,
}

/// Result of a read replica create or edit
#[derive(Debug, Clone, PartialEq)]
pub enum ReplicaOutcome {
    Submitted(UniverseResource),
    Failed(String),
    MissingUniverse,
    AlreadyInFlight,
}

/// Inputs of the create flow
pub struct CreateUniverseRequest<'a> {
    pub primary: &'a UniverseFormData,
    pub async_data: Option<&'a UniverseFormData>,
    pub context: &'a UniverseFormContextState,
    pub features: &'a FeatureFlags,
}

/// Drives submissions against the universe API, one at a time
pub struct UniverseSubmitter<A, N> {
    api: A,
    navigator: N,
    in_flight: AtomicBool,
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<A: UniverseApi, N: Navigator> UniverseSubmitter<A, N> {
    pub fn new(api: A, navigator: N) -> Self {
        Self {
            api,
            navigator,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn begin(&self) -> Option<InFlightGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard(&self.in_flight))
    }

    fn transit_to_universe(&self, universe_uuid: Option<&str>) {
        if let Some(uuid) = universe_uuid {
            self.navigator.navigate(&universe_tasks_path(uuid));
        }
    }

    /// Configure then create a universe.
    ///
    /// Failures are logged and swallowed; the only visible difference is that
    /// no navigation happens.
    pub async fn create_universe(&self, request: CreateUniverseRequest<'_>) -> SubmitOutcome {
        let Some(_guard) = self.begin() else {
            tracing::warn!("universe submission already in flight, ignoring");
            return SubmitOutcome::AlreadyInFlight;
        };

        let outcome = match self.configure_and_create(&request).await {
            Ok(resource) => {
                tracing::info!(
                    universe = ?resource.universe_uuid(),
                    task = ?resource.task_uuid,
                    "universe creation submitted"
                );
                SubmitOutcome::Created(resource)
            }
            Err(e) => {
                tracing::error!("universe creation failed: {}", e);
                SubmitOutcome::Failed
            }
        };

        if let SubmitOutcome::Created(resource) = &outcome {
            self.transit_to_universe(resource.universe_uuid());
        }
        outcome
    }

    async fn configure_and_create(
        &self,
        request: &CreateUniverseRequest<'_>,
    ) -> Result<UniverseResource, SubmitError> {
        let payload = build_create_payload(
            request.primary,
            request.async_data,
            request.context.cluster_type,
            request.features,
        )?;
        let payload = merge_onto_template(&request.context.universe_configure_template, payload);
        tracing::debug!(clusters = payload.clusters.len(), "calling universe configure");

        let configured = self.api.universe_configure(&payload).await?;
        let final_payload = reconcile_configure_response(configured, &payload);

        Ok(self.api.create_universe(&final_payload).await?)
    }

    /// Add a read replica to the universe named by `payload.universe_uuid`
    pub async fn create_read_replica(&self, payload: &UniverseDetails) -> ReplicaOutcome {
        self.submit_to_universe(payload, ReplicaAction::Create).await
    }

    /// Apply an edited read replica configuration
    pub async fn edit_read_replica(&self, payload: &UniverseDetails) -> ReplicaOutcome {
        self.submit_to_universe(payload, ReplicaAction::Edit).await
    }

    async fn submit_to_universe(
        &self,
        payload: &UniverseDetails,
        action: ReplicaAction,
    ) -> ReplicaOutcome {
        let Some(universe_uuid) = payload.universe_uuid.as_deref().filter(|u| !u.is_empty()) else {
            tracing::warn!("{} requested without a universe uuid", action);
            return ReplicaOutcome::MissingUniverse;
        };
        let Some(_guard) = self.begin() else {
            tracing::warn!("{} already in flight, ignoring", action);
            return ReplicaOutcome::AlreadyInFlight;
        };

        let result = match action {
            ReplicaAction::Create => self.api.create_read_replica(payload, universe_uuid).await,
            ReplicaAction::Edit => self.api.edit_universe(payload, universe_uuid).await,
        };
        let outcome = match result {
            Ok(resource) => {
                tracing::info!(universe = universe_uuid, "{} submitted", action);
                ReplicaOutcome::Submitted(resource)
            }
            Err(e) => {
                tracing::error!(universe = universe_uuid, "{} failed: {}", action, e);
                ReplicaOutcome::Failed(e.to_string())
            }
        };

        self.transit_to_universe(Some(universe_uuid));
        outcome
    }
}

#[derive(Debug, Clone, Copy)]
enum ReplicaAction {
    Create,
    Edit,
}

impl std::fmt::Display for ReplicaAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create => write!(f, "read replica creation"),
            Self::Edit => write!(f, "read replica edit"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use yba_common::{CloudType, ProviderMin};

    fn primary_form() -> UniverseFormData {
        let mut form = UniverseFormData::default();
        form.cloud_config.universe_name = "ledger".to_string();
        form.cloud_config.provider = Some(ProviderMin {
            code: CloudType::Aws,
            uuid: "p-aws".to_string(),
        });
        form
    }

    #[test]
    fn test_encryption_enabled_with_kms() {
        let mut form = primary_form();
        form.instance_config.enable_encryption_at_rest = true;
        form.instance_config.kms_config = Some("kms-1".to_string());

        let payload =
            build_create_payload(&form, None, ClusterType::Primary, &FeatureFlags::default())
                .unwrap();
        assert_eq!(
            serde_json::to_value(payload.encryption_at_rest_config.unwrap()).unwrap(),
            json!({"key_op": "ENABLE", "configUUID": "kms-1"})
        );
    }

    #[test]
    fn test_encryption_disabled_ignores_kms() {
        let mut form = primary_form();
        form.instance_config.enable_encryption_at_rest = false;
        form.instance_config.kms_config = Some("kms-1".to_string());

        let config = encryption_at_rest_config(&form);
        assert_eq!(serde_json::to_value(config).unwrap(), json!({"key_op": "UNDEFINED"}));
    }

    #[test]
    fn test_encryption_enabled_without_kms() {
        let mut form = primary_form();
        form.instance_config.enable_encryption_at_rest = true;
        assert_eq!(
            serde_json::to_value(encryption_at_rest_config(&form)).unwrap(),
            json!({"key_op": "ENABLE"})
        );
    }

    #[test]
    fn test_cluster_order_and_count() {
        let primary = primary_form();
        let mut replica = primary_form();
        replica.cloud_config.num_nodes = 1;
        let flags = FeatureFlags::default();

        let single = build_create_payload(&primary, None, ClusterType::Primary, &flags).unwrap();
        assert_eq!(single.clusters.len(), 1);

        let both =
            build_create_payload(&primary, Some(&replica), ClusterType::Async, &flags).unwrap();
        assert_eq!(both.clusters.len(), 2);
        assert_eq!(both.clusters[0].cluster_type, ClusterType::Primary);
        assert_eq!(both.clusters[1].cluster_type, ClusterType::Async);
        assert_eq!(both.clusters[1].user_intent.num_nodes, 1);
        assert_eq!(both.current_cluster_type, Some(ClusterType::Async));
        assert_eq!(both.cluster_operation, Some(ClusterModes::Create));
    }

    #[test]
    fn test_ybc_enabled_by_either_flag_set() {
        let mut flags = FeatureFlags::default();
        assert!(!flags.is_enabled(FeatureFlags::ENABLE_YBC));
        flags.test.insert("enableYbc".to_string(), true);
        assert!(flags.is_enabled(FeatureFlags::ENABLE_YBC));

        let payload = build_create_payload(&primary_form(), None, ClusterType::Primary, &flags)
            .unwrap();
        assert!(payload.enable_ybc);
    }

    #[test]
    fn test_template_fills_unset_fields_only() {
        let mut template = UniverseDetails {
            root_ca: Some("ca-template".to_string()),
            universe_uuid: Some("u-template".to_string()),
            cluster_operation: Some(ClusterModes::Edit),
            ..Default::default()
        };
        template.extra.insert("nodePrefix".to_string(), json!("yb-template"));
        template.extra.insert("arch".to_string(), json!("x86_64"));

        let mut payload =
            build_create_payload(&primary_form(), None, ClusterType::Primary, &FeatureFlags::default())
                .unwrap();
        payload.extra.insert("arch".to_string(), json!("aarch64"));

        let merged = merge_onto_template(&template, payload);
        assert_eq!(merged.cluster_operation, Some(ClusterModes::Create));
        assert_eq!(merged.root_ca.as_deref(), Some("ca-template"));
        assert_eq!(merged.universe_uuid.as_deref(), Some("u-template"));
        assert_eq!(merged.extra["nodePrefix"], "yb-template");
        assert_eq!(merged.extra["arch"], "aarch64");
    }

    #[test]
    fn test_template_clusters_merge_by_index() {
        let mut base = Cluster {
            uuid: Some("c-template".to_string()),
            ..Default::default()
        };
        base.extra.insert("index".to_string(), json!(0));
        base.user_intent
            .extra
            .insert("dedicatedNodes".to_string(), json!(true));
        let template = UniverseDetails {
            clusters: vec![base],
            ..Default::default()
        };

        let payload =
            build_create_payload(&primary_form(), None, ClusterType::Primary, &FeatureFlags::default())
                .unwrap();
        let merged = merge_onto_template(&template, payload);

        assert_eq!(merged.clusters.len(), 1);
        assert_eq!(merged.clusters[0].uuid.as_deref(), Some("c-template"));
        assert_eq!(merged.clusters[0].extra["index"], 0);
        assert_eq!(merged.clusters[0].user_intent.universe_name, "ledger");
        assert_eq!(merged.clusters[0].user_intent.extra["dedicatedNodes"], true);
        assert!(merged.clusters[0].placement_info.is_some());
    }

    #[test]
    fn test_reconcile_restores_non_echoed_fields() {
        let mut sent =
            build_create_payload(&primary_form(), None, ClusterType::Primary, &FeatureFlags::default())
                .unwrap();
        let intent = &mut sent.clusters[0].user_intent;
        intent.instance_tags.insert("team".to_string(), "core".to_string());
        intent.master_gflags.insert("v".to_string(), "1".to_string());
        intent.tserver_gflags.insert("v".to_string(), "2".to_string());

        let mut response = sent.clone();
        response.universe_uuid = Some("u-assigned".to_string());
        response.cluster_operation = None;
        response.current_cluster_type = None;
        response.encryption_at_rest_config = Some(EncryptionAtRestConfig::default());
        response.clusters[0].uuid = Some("c-assigned".to_string());
        response.clusters[0].user_intent.instance_tags.clear();
        response.clusters[0].user_intent.master_gflags.clear();
        response.clusters[0].user_intent.tserver_gflags.clear();

        let reconciled = reconcile_configure_response(response, &sent);

        assert_eq!(reconciled.universe_uuid.as_deref(), Some("u-assigned"));
        assert_eq!(reconciled.clusters[0].uuid.as_deref(), Some("c-assigned"));
        assert_eq!(reconciled.cluster_operation, sent.cluster_operation);
        assert_eq!(reconciled.current_cluster_type, sent.current_cluster_type);
        assert_eq!(reconciled.encryption_at_rest_config, sent.encryption_at_rest_config);
        assert_eq!(reconciled.clusters[0].user_intent, sent.clusters[0].user_intent);
    }

    #[test]
    fn test_reconcile_without_clusters_does_not_panic() {
        let sent = UniverseDetails {
            cluster_operation: Some(ClusterModes::Create),
            ..Default::default()
        };
        let reconciled = reconcile_configure_response(UniverseDetails::default(), &sent);
        assert_eq!(reconciled.cluster_operation, Some(ClusterModes::Create));
        assert!(reconciled.clusters.is_empty());
    }

    #[test]
    fn test_tasks_path() {
        assert_eq!(universe_tasks_path("u-1"), "/universes/u-1/tasks");
    }
}
