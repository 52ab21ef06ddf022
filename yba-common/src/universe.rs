//! Backend-facing universe shapes
//!
//! These mirror the JSON accepted and returned by the configure/create
//! endpoints. Fields the console never touches are kept in `extra` so a
//! configure response can be forwarded to create unchanged.

use crate::{CloudType, ClusterModes, ClusterType};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Storage attached to each node
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub volume_size: u32,
    pub num_volumes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount_points: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_iops: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throughput: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Ports used by the database processes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CommunicationPorts {
    pub master_http_port: u16,
    pub master_rpc_port: u16,
    pub tserver_http_port: u16,
    pub tserver_rpc_port: u16,
    pub redis_server_http_port: u16,
    pub redis_server_rpc_port: u16,
    pub yql_server_http_port: u16,
    pub yql_server_rpc_port: u16,
    pub ysql_server_http_port: u16,
    pub ysql_server_rpc_port: u16,
    pub node_exporter_port: u16,
}

impl Default for CommunicationPorts {
    fn default() -> Self {
        Self {
            master_http_port: 7000,
            master_rpc_port: 7100,
            tserver_http_port: 9000,
            tserver_rpc_port: 9100,
            redis_server_http_port: 11000,
            redis_server_rpc_port: 6379,
            yql_server_http_port: 12000,
            yql_server_rpc_port: 9042,
            ysql_server_http_port: 13000,
            ysql_server_rpc_port: 5433,
            node_exporter_port: 9300,
        }
    }
}

/// Kubernetes service exposure
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExposingServiceState {
    #[default]
    None,
    Exposed,
    Unexposed,
}

/// Encryption-at-rest key operation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum KeyOp {
    Enable,
    Disable,
    Undefined,
}

impl KeyOp {
    pub fn from_toggle(enabled: bool) -> Self {
        if enabled {
            KeyOp::Enable
        } else {
            KeyOp::Undefined
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct EncryptionAtRestConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_op: Option<KeyOp>,
    #[serde(rename = "configUUID", default, skip_serializing_if = "Option::is_none")]
    pub config_uuid: Option<String>,
    #[serde(rename = "encryptionAtRestEnabled", default, skip_serializing_if = "Option::is_none")]
    pub encryption_at_rest_enabled: Option<bool>,
    #[serde(rename = "kmsConfigUUID", default, skip_serializing_if = "Option::is_none")]
    pub kms_config_uuid: Option<String>,
}

/// Desired state of one cluster
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct UserIntent {
    pub universe_name: String,
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_type: Option<CloudType>,
    pub region_list: Vec<String>,
    pub num_nodes: u32,
    pub replication_factor: u32,
    pub instance_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_info: Option<DeviceInfo>,
    #[serde(rename = "assignPublicIP")]
    pub assign_public_ip: bool,
    pub use_time_sync: bool,
    pub enable_client_to_node_encrypt: bool,
    pub enable_node_to_node_encrypt: bool,
    #[serde(rename = "enableYSQL")]
    pub enable_ysql: bool,
    #[serde(rename = "enableYSQLAuth")]
    pub enable_ysql_auth: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ysql_password: Option<String>,
    #[serde(rename = "enableYCQL")]
    pub enable_ycql: bool,
    #[serde(rename = "enableYCQLAuth")]
    pub enable_ycql_auth: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ycql_password: Option<String>,
    #[serde(rename = "enableYEDIS")]
    pub enable_yedis: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aws_arn_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yb_software_version: Option<String>,
    #[serde(rename = "enableIPV6")]
    pub enable_ipv6: bool,
    pub enable_exposing_service: ExposingServiceState,
    pub use_systemd: bool,
    pub instance_tags: BTreeMap<String, String>,
    #[serde(rename = "masterGFlags")]
    pub master_gflags: BTreeMap<String, String>,
    #[serde(rename = "tserverGFlags")]
    pub tserver_gflags: BTreeMap<String, String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlacementAz {
    pub uuid: String,
    pub name: String,
    #[serde(default)]
    pub replication_factor: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet: Option<String>,
    #[serde(rename = "numNodesInAZ", default)]
    pub num_nodes_in_az: u32,
    #[serde(default)]
    pub is_affinitized: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlacementRegion {
    pub uuid: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub az_list: Vec<PlacementAz>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One provider in the placement tree. `code` is the raw provider code,
/// `cloud_type` gives the typed view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlacementCloud {
    pub uuid: String,
    pub code: String,
    #[serde(default)]
    pub region_list: Vec<PlacementRegion>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PlacementCloud {
    pub fn cloud_type(&self) -> CloudType {
        serde_json::from_value(Value::String(self.code.clone())).unwrap_or(CloudType::Other)
    }
}

/// Region/zone assignment tree of a cluster
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlacementInfo {
    #[serde(default)]
    pub cloud_list: Vec<PlacementCloud>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    pub cluster_type: ClusterType,
    pub user_intent: UserIntent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement_info: Option<PlacementInfo>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Universe details as exchanged with configure, create and edit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UniverseDetails {
    #[serde(rename = "universeUUID", default, skip_serializing_if = "Option::is_none")]
    pub universe_uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_operation: Option<ClusterModes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_cluster_type: Option<ClusterType>,
    #[serde(rename = "rootCA", default, skip_serializing_if = "Option::is_none")]
    pub root_ca: Option<String>,
    #[serde(rename = "userAZSelected", default)]
    pub user_az_selected: bool,
    #[serde(rename = "resetAZConfig", default)]
    pub reset_az_config: bool,
    #[serde(default)]
    pub enable_ybc: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub communication_ports: Option<CommunicationPorts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_at_rest_config: Option<EncryptionAtRestConfig>,
    #[serde(default)]
    pub clusters: Vec<Cluster>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Universe as returned by the universe lookup endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Universe {
    #[serde(rename = "universeUUID")]
    pub universe_uuid: String,
    #[serde(default)]
    pub name: String,
    pub universe_details: UniverseDetails,
}

/// Response of the create/edit/read-replica endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct UniverseResource {
    #[serde(rename = "universeUUID", default, skip_serializing_if = "Option::is_none")]
    pub universe_uuid: Option<String>,
    #[serde(rename = "resourceUUID", default, skip_serializing_if = "Option::is_none")]
    pub resource_uuid: Option<String>,
    #[serde(rename = "taskUUID", default, skip_serializing_if = "Option::is_none")]
    pub task_uuid: Option<String>,
}

impl UniverseResource {
    /// Universe identifier, falling back to the generic resource identifier
    pub fn universe_uuid(&self) -> Option<&str> {
        self.universe_uuid
            .as_deref()
            .or(self.resource_uuid.as_deref())
            .filter(|uuid| !uuid.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encryption_config_skips_unset_fields() {
        let config = EncryptionAtRestConfig {
            key_op: Some(KeyOp::Undefined),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&config).unwrap(), json!({"key_op": "UNDEFINED"}));
    }

    #[test]
    fn test_user_intent_wire_names() {
        let intent = UserIntent {
            universe_name: "demo".to_string(),
            enable_ysql: true,
            assign_public_ip: true,
            ..Default::default()
        };
        let value = serde_json::to_value(&intent).unwrap();
        assert_eq!(value["universeName"], "demo");
        assert_eq!(value["enableYSQL"], true);
        assert_eq!(value["assignPublicIP"], true);
        assert!(value.get("masterGFlags").is_some());
        assert!(value.get("ysqlPassword").is_none());
    }

    #[test]
    fn test_universe_details_keeps_unknown_fields() {
        let raw = json!({
            "universeUUID": "u-1",
            "clusterOperation": "CREATE",
            "nodePrefix": "yb-dev-demo",
            "clusters": [{
                "uuid": "c-1",
                "clusterType": "PRIMARY",
                "userIntent": {"universeName": "demo"},
                "index": 0
            }]
        });

        let details: UniverseDetails = serde_json::from_value(raw).unwrap();
        assert_eq!(details.universe_uuid.as_deref(), Some("u-1"));
        assert_eq!(details.extra["nodePrefix"], "yb-dev-demo");
        assert_eq!(details.clusters[0].extra["index"], 0);

        let back = serde_json::to_value(&details).unwrap();
        assert_eq!(back["nodePrefix"], "yb-dev-demo");
        assert_eq!(back["clusters"][0]["index"], 0);
    }

    #[test]
    fn test_nested_unknown_fields_survive_round_trip() {
        let raw = json!({
            "clusters": [{
                "clusterType": "PRIMARY",
                "userIntent": {
                    "universeName": "demo",
                    "dedicatedNodes": true,
                    "deviceInfo": {"volumeSize": 250, "numVolumes": 1, "cloudVolumeEncryption": {"enabled": true}}
                },
                "placementInfo": {
                    "cloudList": [{
                        "uuid": "p-1",
                        "code": "ali",
                        "defaultRegion": "r-1",
                        "regionList": [{
                            "uuid": "r-1",
                            "code": "cn-hangzhou",
                            "lbFQDN": "lb.internal",
                            "azList": [{
                                "uuid": "az-1",
                                "name": "cn-hangzhou-a",
                                "secondarySubnet": "subnet-2"
                            }]
                        }]
                    }]
                }
            }]
        });

        let details: UniverseDetails = serde_json::from_value(raw.clone()).unwrap();
        let cloud = &details.clusters[0].placement_info.as_ref().unwrap().cloud_list[0];
        assert_eq!(cloud.cloud_type(), CloudType::Other);

        let back = serde_json::to_value(&details).unwrap();
        let cluster = &back["clusters"][0];
        assert_eq!(cluster["userIntent"]["dedicatedNodes"], true);
        assert_eq!(
            cluster["userIntent"]["deviceInfo"]["cloudVolumeEncryption"]["enabled"],
            true
        );
        let cloud = &cluster["placementInfo"]["cloudList"][0];
        assert_eq!(cloud["code"], "ali");
        assert_eq!(cloud["defaultRegion"], "r-1");
        assert_eq!(cloud["regionList"][0]["lbFQDN"], "lb.internal");
        assert_eq!(cloud["regionList"][0]["azList"][0]["secondarySubnet"], "subnet-2");
    }

    #[test]
    fn test_known_cloud_code_parsed() {
        let cloud = PlacementCloud {
            code: "gcp".to_string(),
            ..Default::default()
        };
        assert_eq!(cloud.cloud_type(), CloudType::Gcp);
    }

    #[test]
    fn test_resource_uuid_fallback() {
        let resource = UniverseResource {
            resource_uuid: Some("u-9".to_string()),
            task_uuid: Some("t-1".to_string()),
            ..Default::default()
        };
        assert_eq!(resource.universe_uuid(), Some("u-9"));
        assert_eq!(UniverseResource::default().universe_uuid(), None);
    }
}
