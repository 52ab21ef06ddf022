//! UI-facing universe form shape
//!
//! Every field is always serialized (absent values as `null`) so the dotted
//! field paths used for filtering resolve against any serialized form.

use crate::universe::{CommunicationPorts, DeviceInfo, ExposingServiceState};
use crate::CloudType;
use serde::{Deserialize, Deserializer, Serialize};

/// Provider selected in the form
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderMin {
    pub code: CloudType,
    pub uuid: String,
}

/// One availability zone row of the placement table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Placement {
    pub uuid: String,
    pub name: String,
    pub replication_factor: u32,
    pub subnet: Option<String>,
    #[serde(rename = "numNodesInAZ")]
    pub num_nodes_in_az: u32,
    pub is_affinitized: bool,
    pub parent_region_id: String,
    pub parent_region_name: String,
    pub parent_region_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CloudConfigFormValue {
    pub universe_name: String,
    pub provider: Option<ProviderMin>,
    pub region_list: Vec<String>,
    pub num_nodes: u32,
    pub replication_factor: u32,
    pub placements: Vec<Placement>,
    pub auto_placement: bool,
}

impl Default for CloudConfigFormValue {
    fn default() -> Self {
        Self {
            universe_name: String::new(),
            provider: None,
            region_list: Vec::new(),
            num_nodes: 3,
            replication_factor: 3,
            placements: Vec::new(),
            auto_placement: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct InstanceConfigFormValue {
    pub instance_type: Option<String>,
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
    pub ysql_password: Option<String>,
    pub ysql_confirm_password: Option<String>,
    #[serde(rename = "enableYCQL")]
    pub enable_ycql: bool,
    #[serde(rename = "enableYCQLAuth")]
    pub enable_ycql_auth: bool,
    pub ycql_password: Option<String>,
    pub ycql_confirm_password: Option<String>,
    #[serde(rename = "enableYEDIS")]
    pub enable_yedis: bool,
    pub enable_encryption_at_rest: bool,
    pub kms_config: Option<String>,
    #[serde(rename = "rootCA")]
    pub root_ca: Option<String>,
}

impl Default for InstanceConfigFormValue {
    fn default() -> Self {
        Self {
            instance_type: None,
            device_info: None,
            assign_public_ip: true,
            use_time_sync: true,
            enable_client_to_node_encrypt: true,
            enable_node_to_node_encrypt: true,
            enable_ysql: true,
            enable_ysql_auth: false,
            ysql_password: None,
            ysql_confirm_password: None,
            enable_ycql: true,
            enable_ycql_auth: false,
            ycql_password: None,
            ycql_confirm_password: None,
            enable_yedis: false,
            enable_encryption_at_rest: false,
            kms_config: None,
            root_ca: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AdvancedConfigFormValue {
    pub use_systemd: bool,
    pub aws_arn_string: Option<String>,
    #[serde(rename = "enableIPV6")]
    pub enable_ipv6: bool,
    pub enable_exposing_service: ExposingServiceState,
    pub access_key_code: Option<String>,
    pub yb_software_version: Option<String>,
    pub communication_ports: CommunicationPorts,
    pub customize_port: bool,
    pub ybc_package_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct InstanceTag {
    pub name: String,
    pub value: String,
}

/// A process flag with an optional value per server role
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Gflag {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(
        rename = "MASTER",
        default,
        deserialize_with = "flag_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub master: Option<String>,
    #[serde(
        rename = "TSERVER",
        default,
        deserialize_with = "flag_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub tserver: Option<String>,
}

impl Gflag {
    pub fn master(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            master: Some(value.to_string()),
            tserver: None,
        }
    }

    pub fn tserver(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            master: None,
            tserver: Some(value.to_string()),
        }
    }
}

// Flag files are hand-written, so accept `100` and `true` as well as strings.
fn flag_value<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Flat form record for one cluster
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct UniverseFormData {
    pub cloud_config: CloudConfigFormValue,
    pub instance_config: InstanceConfigFormValue,
    pub advanced_config: AdvancedConfigFormValue,
    pub instance_tags: Vec<InstanceTag>,
    #[serde(rename = "gFlags")]
    pub gflags: Vec<Gflag>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_form_serializes_every_group() {
        let value = serde_json::to_value(UniverseFormData::default()).unwrap();
        assert!(value["cloudConfig"]["provider"].is_null());
        assert_eq!(value["cloudConfig"]["autoPlacement"], true);
        assert!(value["instanceConfig"]["ysqlPassword"].is_null());
        assert_eq!(value["advancedConfig"]["communicationPorts"]["masterHttpPort"], 7000);
        assert!(value["gFlags"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_gflag_accepts_non_string_values() {
        let flag: Gflag =
            serde_json::from_str(r#"{"Name": "max_log_size", "MASTER": 256, "TSERVER": true}"#)
                .unwrap();
        assert_eq!(flag.master.as_deref(), Some("256"));
        assert_eq!(flag.tserver.as_deref(), Some("true"));

        let flag: Gflag = serde_json::from_str(r#"{"Name": "v"}"#).unwrap();
        assert_eq!(flag.master, None);
        assert_eq!(flag.tserver, None);
    }

    #[test]
    fn test_partial_form_fills_defaults() {
        let form: UniverseFormData = serde_json::from_str(
            r#"{"cloudConfig": {"universeName": "demo"}, "instanceConfig": {"enableYSQLAuth": true}}"#,
        )
        .unwrap();
        assert_eq!(form.cloud_config.universe_name, "demo");
        assert_eq!(form.cloud_config.num_nodes, 3);
        assert!(form.instance_config.enable_ysql_auth);
        assert!(form.instance_config.enable_ysql);
    }
}
