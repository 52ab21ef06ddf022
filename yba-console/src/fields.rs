//! Universe form field paths
//!
//! Dotted paths into the serialized `UniverseFormData`. These constants are
//! the single source of truth for which fields belong to which cluster type
//! and which ones a read replica inherits from the primary cluster.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use yba_common::{ClusterType, Result, UniverseFormData};

// Cloud config
pub const UNIVERSE_NAME_FIELD: &str = "cloudConfig.universeName";
pub const PROVIDER_FIELD: &str = "cloudConfig.provider";
pub const REGIONS_FIELD: &str = "cloudConfig.regionList";
pub const REPLICATION_FACTOR_FIELD: &str = "cloudConfig.replicationFactor";
pub const AUTO_PLACEMENT_FIELD: &str = "cloudConfig.autoPlacement";
pub const TOTAL_NODES_FIELD: &str = "cloudConfig.numNodes";
pub const PLACEMENTS_FIELD: &str = "cloudConfig.placements";

// Instance config
pub const INSTANCE_TYPE_FIELD: &str = "instanceConfig.instanceType";
pub const DEVICE_INFO_FIELD: &str = "instanceConfig.deviceInfo";
pub const ASSIGN_PUBLIC_IP_FIELD: &str = "instanceConfig.assignPublicIP";
pub const YSQL_FIELD: &str = "instanceConfig.enableYSQL";
pub const YSQL_AUTH_FIELD: &str = "instanceConfig.enableYSQLAuth";
pub const YSQL_PASSWORD_FIELD: &str = "instanceConfig.ysqlPassword";
pub const YSQL_CONFIRM_PASSWORD_FIELD: &str = "instanceConfig.ysqlConfirmPassword";
pub const YCQL_FIELD: &str = "instanceConfig.enableYCQL";
pub const YCQL_AUTH_FIELD: &str = "instanceConfig.enableYCQLAuth";
pub const YCQL_PASSWORD_FIELD: &str = "instanceConfig.ycqlPassword";
pub const YCQL_CONFIRM_PASSWORD_FIELD: &str = "instanceConfig.ycqlConfirmPassword";
pub const YEDIS_FIELD: &str = "instanceConfig.enableYEDIS";
pub const TIME_SYNC_FIELD: &str = "instanceConfig.useTimeSync";
pub const CLIENT_TO_NODE_ENCRYPT_FIELD: &str = "instanceConfig.enableClientToNodeEncrypt";
pub const ROOT_CERT_FIELD: &str = "instanceConfig.rootCA";
pub const NODE_TO_NODE_ENCRYPT_FIELD: &str = "instanceConfig.enableNodeToNodeEncrypt";
pub const EAR_FIELD: &str = "instanceConfig.enableEncryptionAtRest";
pub const KMS_CONFIG_FIELD: &str = "instanceConfig.kmsConfig";

// Advanced config
pub const SYSTEMD_FIELD: &str = "advancedConfig.useSystemd";
pub const YBC_PACKAGE_PATH_FIELD: &str = "advancedConfig.ybcPackagePath";
pub const AWS_ARN_STRING_FIELD: &str = "advancedConfig.awsArnString";
pub const IPV6_FIELD: &str = "advancedConfig.enableIPV6";
pub const EXPOSING_SERVICE_FIELD: &str = "advancedConfig.enableExposingService";
pub const CUSTOMIZE_PORT_FIELD: &str = "advancedConfig.customizePort";
pub const ACCESS_KEY_FIELD: &str = "advancedConfig.accessKeyCode";
pub const SOFTWARE_VERSION_FIELD: &str = "advancedConfig.ybSoftwareVersion";
pub const COMMUNICATION_PORTS_FIELD: &str = "advancedConfig.communicationPorts";

pub const GFLAGS_FIELD: &str = "gFlags";
pub const USER_TAGS_FIELD: &str = "instanceTags";

pub const MIN_PLACEMENTS_FOR_GEO_REDUNDANCY: usize = 3;

pub const PRIMARY_FIELDS: &[&str] = &[
    UNIVERSE_NAME_FIELD,
    PROVIDER_FIELD,
    REGIONS_FIELD,
    REPLICATION_FACTOR_FIELD,
    AUTO_PLACEMENT_FIELD,
    TOTAL_NODES_FIELD,
    PLACEMENTS_FIELD,
    INSTANCE_TYPE_FIELD,
    GFLAGS_FIELD,
    USER_TAGS_FIELD,
    SOFTWARE_VERSION_FIELD,
    DEVICE_INFO_FIELD,
    ASSIGN_PUBLIC_IP_FIELD,
    SYSTEMD_FIELD,
    TIME_SYNC_FIELD,
    YSQL_FIELD,
    YSQL_AUTH_FIELD,
    YSQL_PASSWORD_FIELD,
    YSQL_CONFIRM_PASSWORD_FIELD,
    YCQL_FIELD,
    YCQL_AUTH_FIELD,
    YCQL_PASSWORD_FIELD,
    YCQL_CONFIRM_PASSWORD_FIELD,
    IPV6_FIELD,
    EXPOSING_SERVICE_FIELD,
    YEDIS_FIELD,
    NODE_TO_NODE_ENCRYPT_FIELD,
    ROOT_CERT_FIELD,
    CLIENT_TO_NODE_ENCRYPT_FIELD,
    EAR_FIELD,
    KMS_CONFIG_FIELD,
    AWS_ARN_STRING_FIELD,
    COMMUNICATION_PORTS_FIELD,
    ACCESS_KEY_FIELD,
    CUSTOMIZE_PORT_FIELD,
];

pub const ASYNC_FIELDS: &[&str] = &[
    UNIVERSE_NAME_FIELD,
    PROVIDER_FIELD,
    REGIONS_FIELD,
    REPLICATION_FACTOR_FIELD,
    AUTO_PLACEMENT_FIELD,
    TOTAL_NODES_FIELD,
    PLACEMENTS_FIELD,
    INSTANCE_TYPE_FIELD,
    SOFTWARE_VERSION_FIELD,
    DEVICE_INFO_FIELD,
    ASSIGN_PUBLIC_IP_FIELD,
    SYSTEMD_FIELD,
    TIME_SYNC_FIELD,
    YSQL_FIELD,
    YSQL_AUTH_FIELD,
    YCQL_FIELD,
    YCQL_AUTH_FIELD,
    IPV6_FIELD,
    EXPOSING_SERVICE_FIELD,
    YEDIS_FIELD,
    NODE_TO_NODE_ENCRYPT_FIELD,
    CLIENT_TO_NODE_ENCRYPT_FIELD,
    ACCESS_KEY_FIELD,
    ROOT_CERT_FIELD,
    EAR_FIELD,
];

/// Fields a read replica inherits from the primary cluster in the create flow
pub const ASYNC_COPY_FIELDS: &[&str] = &[
    SOFTWARE_VERSION_FIELD,
    DEVICE_INFO_FIELD,
    ASSIGN_PUBLIC_IP_FIELD,
    SYSTEMD_FIELD,
    TIME_SYNC_FIELD,
    YSQL_FIELD,
    YSQL_AUTH_FIELD,
    YCQL_FIELD,
    YCQL_AUTH_FIELD,
    IPV6_FIELD,
    EXPOSING_SERVICE_FIELD,
    YEDIS_FIELD,
    NODE_TO_NODE_ENCRYPT_FIELD,
    CLIENT_TO_NODE_ENCRYPT_FIELD,
    ACCESS_KEY_FIELD,
    ROOT_CERT_FIELD,
    EAR_FIELD,
];

/// Registered field paths for a cluster type
pub fn fields_for(cluster_type: ClusterType) -> &'static [&'static str] {
    match cluster_type {
        ClusterType::Primary => PRIMARY_FIELDS,
        ClusterType::Async => ASYNC_FIELDS,
    }
}

/// A subset of form values keyed by field path
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldSet {
    values: BTreeMap<String, Value>,
}

impl FieldSet {
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.values.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.values.contains_key(path)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Nested JSON object holding only the picked paths
    pub fn to_value(&self) -> Value {
        let mut root = Value::Object(Map::new());
        for (path, value) in &self.values {
            assign_path(&mut root, path, value.clone());
        }
        root
    }

    /// Overlay the picked values onto `form`, leaving every other field as is
    pub fn apply_to(&self, form: &UniverseFormData) -> Result<UniverseFormData> {
        let mut value = serde_json::to_value(form)?;
        for (path, field) in &self.values {
            assign_path(&mut value, path, field.clone());
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Overlay the picked values onto the default form
    pub fn into_form_data(self) -> Result<UniverseFormData> {
        self.apply_to(&UniverseFormData::default())
    }
}

/// Pick `paths` out of `source`; paths missing from `source` are skipped
pub fn pick_fields(source: &Value, paths: &[&str]) -> FieldSet {
    let values = paths
        .iter()
        .filter_map(|path| lookup_path(source, path).map(|v| (path.to_string(), v.clone())))
        .collect();
    FieldSet { values }
}

/// Keep only the fields registered for `cluster_type`
pub fn filter_by_cluster_type(
    form: &UniverseFormData,
    cluster_type: ClusterType,
) -> Result<FieldSet> {
    let value = serde_json::to_value(form)?;
    Ok(pick_fields(&value, fields_for(cluster_type)))
}

/// Fields to seed a read replica with from an already edited primary form
pub fn async_copy_fields(form: &UniverseFormData) -> Result<FieldSet> {
    let value = serde_json::to_value(form)?;
    Ok(pick_fields(&value, ASYNC_COPY_FIELDS))
}

/// Overlay a partial form document onto `form`. Objects merge key by key,
/// any other value replaces what the form held.
pub fn overlay_document(form: &UniverseFormData, overrides: &Value) -> Result<UniverseFormData> {
    let mut value = serde_json::to_value(form)?;
    merge_value(&mut value, overrides);
    Ok(serde_json::from_value(value)?)
}

fn merge_value(target: &mut Value, overrides: &Value) {
    match (target, overrides) {
        (Value::Object(target), Value::Object(overrides)) => {
            for (key, value) in overrides {
                merge_value(target.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
        (target, value) => *target = value.clone(),
    }
}

pub(crate) fn lookup_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |current, segment| current.as_object()?.get(segment))
}

fn assign_path(target: &mut Value, path: &str, field: Value) {
    let (parents, leaf) = match path.rsplit_once('.') {
        Some((parents, leaf)) => (Some(parents), leaf),
        None => (None, path),
    };

    let mut current = target;
    if let Some(parents) = parents {
        for segment in parents.split('.') {
            current = ensure_object(current)
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
        }
    }
    ensure_object(current).insert(leaf.to_string(), field);
}

// Intermediate nulls (e.g. an unset provider) are replaced by objects.
fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced by an object"),
    }
}
