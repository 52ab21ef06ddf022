//! Common test utilities: in-memory platform APIs and form fixtures

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;
use yba_common::{
    AlertConfiguration, AlertTemplatePreviewRequest, CloudType, Gflag, InstanceTag,
    NotificationPreview, Placement, ProviderMin, Universe, UniverseDetails, UniverseFormData,
    UniverseResource,
};
use yba_console::api::{AlertApi, ClientError, Result, UniverseApi};
use yba_console::Navigator;

pub const NEW_UNIVERSE_UUID: &str = "5d4b3a2e-0000-4000-8000-000000000001";
pub const TASK_UUID: &str = "9f1c7e21-0000-4000-8000-000000000002";

fn server_error(message: &str) -> ClientError {
    ClientError::Api {
        status: 500,
        message: message.to_string(),
    }
}

/// Universe API double recording every call.
///
/// `universe_configure` answers like the real endpoint does: it assigns
/// identifiers and drops the fields it does not echo.
#[derive(Default)]
pub struct MockUniverseApi {
    pub fail_configure: bool,
    pub fail_create: bool,
    pub calls: Mutex<Vec<String>>,
    pub configure_payloads: Mutex<Vec<UniverseDetails>>,
    pub create_payloads: Mutex<Vec<UniverseDetails>>,
    pub universes: Mutex<Vec<Universe>>,
}

impl MockUniverseApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_configure() -> Self {
        Self {
            fail_configure: true,
            ..Default::default()
        }
    }

    pub fn failing_create() -> Self {
        Self {
            fail_create: true,
            ..Default::default()
        }
    }

    pub fn with_universe(self, universe: Universe) -> Self {
        self.universes.lock().unwrap().push(universe);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_configure_payload(&self) -> Option<UniverseDetails> {
        self.configure_payloads.lock().unwrap().last().cloned()
    }

    pub fn last_create_payload(&self) -> Option<UniverseDetails> {
        self.create_payloads.lock().unwrap().last().cloned()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl UniverseApi for MockUniverseApi {
    async fn universe_configure(&self, payload: &UniverseDetails) -> Result<UniverseDetails> {
        self.record("configure".to_string());
        self.configure_payloads.lock().unwrap().push(payload.clone());
        tokio::task::yield_now().await;

        if self.fail_configure {
            return Err(server_error("configure rejected"));
        }

        let mut response = payload.clone();
        response.universe_uuid = Some(NEW_UNIVERSE_UUID.to_string());
        response.cluster_operation = None;
        response.current_cluster_type = None;
        response.encryption_at_rest_config = None;
        for (index, cluster) in response.clusters.iter_mut().enumerate() {
            cluster.uuid = Some(format!("cluster-{}", index));
            cluster.user_intent.instance_tags.clear();
            cluster.user_intent.master_gflags.clear();
            cluster.user_intent.tserver_gflags.clear();
            cluster
                .user_intent
                .extra
                .insert("dedicatedNodes".to_string(), Value::Bool(false));
            if let Some(cloud) = cluster
                .placement_info
                .as_mut()
                .and_then(|info| info.cloud_list.first_mut())
            {
                cloud
                    .extra
                    .insert("defaultRegion".to_string(), Value::String("r-west".to_string()));
            }
        }
        Ok(response)
    }

    async fn create_universe(&self, payload: &UniverseDetails) -> Result<UniverseResource> {
        self.record("create".to_string());
        self.create_payloads.lock().unwrap().push(payload.clone());

        if self.fail_create {
            return Err(server_error("create rejected"));
        }
        Ok(UniverseResource {
            universe_uuid: payload.universe_uuid.clone(),
            task_uuid: Some(TASK_UUID.to_string()),
            ..Default::default()
        })
    }

    async fn create_read_replica(
        &self,
        payload: &UniverseDetails,
        universe_uuid: &str,
    ) -> Result<UniverseResource> {
        self.record(format!("create_read_replica {}", universe_uuid));
        self.create_payloads.lock().unwrap().push(payload.clone());

        if self.fail_create {
            return Err(server_error("replica rejected"));
        }
        Ok(UniverseResource {
            resource_uuid: Some(universe_uuid.to_string()),
            task_uuid: Some(TASK_UUID.to_string()),
            ..Default::default()
        })
    }

    async fn edit_universe(
        &self,
        payload: &UniverseDetails,
        universe_uuid: &str,
    ) -> Result<UniverseResource> {
        self.record(format!("edit {}", universe_uuid));
        self.create_payloads.lock().unwrap().push(payload.clone());

        if self.fail_create {
            return Err(server_error("edit rejected"));
        }
        Ok(UniverseResource {
            resource_uuid: Some(universe_uuid.to_string()),
            task_uuid: Some(TASK_UUID.to_string()),
            ..Default::default()
        })
    }

    async fn get_universe(&self, universe_uuid: &str) -> Result<Universe> {
        self.record(format!("get {}", universe_uuid));
        self.universes
            .lock()
            .unwrap()
            .iter()
            .find(|universe| universe.universe_uuid == universe_uuid)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(universe_uuid.to_string()))
    }
}

/// Navigator double remembering every path
#[derive(Default)]
pub struct RecordingNavigator {
    pub paths: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.paths.lock().unwrap().push(path.to_string());
    }
}

/// Alert API double; previews substitute `{{ name }}` with the config name
#[derive(Default)]
pub struct MockAlertApi {
    pub configs: Vec<AlertConfiguration>,
    pub fail_list: bool,
    pub fail_preview: bool,
    pub preview_requests: Mutex<Vec<(AlertTemplatePreviewRequest, String)>>,
}

impl MockAlertApi {
    pub fn with_configs(configs: Vec<AlertConfiguration>) -> Self {
        Self {
            configs,
            ..Default::default()
        }
    }

    pub fn preview_requests(&self) -> Vec<(AlertTemplatePreviewRequest, String)> {
        self.preview_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl AlertApi for MockAlertApi {
    async fn fetch_alert_config_list(&self, _uuids: &[String]) -> Result<Vec<AlertConfiguration>> {
        if self.fail_list {
            return Err(server_error("list unavailable"));
        }
        Ok(self.configs.clone())
    }

    async fn preview_alert_notification(
        &self,
        request: &AlertTemplatePreviewRequest,
        alert_config_uuid: &str,
    ) -> Result<NotificationPreview> {
        self.preview_requests
            .lock()
            .unwrap()
            .push((request.clone(), alert_config_uuid.to_string()));

        if self.fail_preview {
            return Err(server_error("template rendering failed"));
        }
        let config = self
            .configs
            .iter()
            .find(|config| config.uuid == alert_config_uuid)
            .ok_or_else(|| ClientError::NotFound(alert_config_uuid.to_string()))?;

        Ok(NotificationPreview {
            title: None,
            text: request.text_template.replace("{{ name }}", &config.name),
        })
    }
}

pub fn zone(name: &str, region: &str) -> Placement {
    Placement {
        uuid: format!("az-{}", name),
        name: name.to_string(),
        replication_factor: 1,
        num_nodes_in_az: 1,
        is_affinitized: true,
        parent_region_id: format!("region-{}", region),
        parent_region_name: region.to_string(),
        parent_region_code: region.to_string(),
        ..Default::default()
    }
}

/// A fully filled primary form on AWS across three zones
pub fn primary_form() -> UniverseFormData {
    let mut form = UniverseFormData::default();
    form.cloud_config.universe_name = "orders".to_string();
    form.cloud_config.provider = Some(ProviderMin {
        code: CloudType::Aws,
        uuid: "provider-aws".to_string(),
    });
    form.cloud_config.region_list = vec!["region-us-west-2".to_string()];
    form.cloud_config.placements = vec![
        zone("us-west-2a", "us-west-2"),
        zone("us-west-2b", "us-west-2"),
        zone("us-west-2c", "us-west-2"),
    ];
    form.instance_config.instance_type = Some("c5.large".to_string());
    form.advanced_config.yb_software_version = Some("2.17.1.0-b439".to_string());
    form.advanced_config.access_key_code = Some("yb-aws-key".to_string());
    form.instance_tags = vec![InstanceTag {
        name: "team".to_string(),
        value: "payments".to_string(),
    }];
    form.gflags = vec![
        Gflag::master("max_log_size", "256"),
        Gflag::tserver("ysql_max_connections", "400"),
    ];
    form
}

/// A single-zone read replica form in a second region
pub fn replica_form() -> UniverseFormData {
    let mut form = primary_form();
    form.cloud_config.num_nodes = 1;
    form.cloud_config.replication_factor = 1;
    form.cloud_config.region_list = vec!["region-us-east-1".to_string()];
    form.cloud_config.placements = vec![zone("us-east-1a", "us-east-1")];
    form.instance_tags.clear();
    form.gflags.clear();
    form
}
