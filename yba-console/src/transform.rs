//! Universe details ⇄ form data

use crate::placement::{get_placements_from_cluster, placement_info};
use std::collections::BTreeMap;
use yba_common::{
    AdvancedConfigFormValue, CloudConfigFormValue, CloudType, Cluster, ClusterType, Error, Gflag,
    InstanceConfigFormValue, InstanceTag, ProviderMin, Result, UniverseDetails, UniverseFormData,
    UserIntent,
};

/// Per-role flag mappings as the backend stores them
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoleGflags {
    pub master_gflags: BTreeMap<String, String>,
    pub tserver_gflags: BTreeMap<String, String>,
}

pub fn get_cluster_by_type(universe: &UniverseDetails, cluster_type: ClusterType) -> Option<&Cluster> {
    universe
        .clusters
        .iter()
        .find(|cluster| cluster.cluster_type == cluster_type)
}

pub fn get_primary_cluster(universe: &UniverseDetails) -> Option<&Cluster> {
    get_cluster_by_type(universe, ClusterType::Primary)
}

pub fn get_async_cluster(universe: &UniverseDetails) -> Option<&Cluster> {
    get_cluster_by_type(universe, ClusterType::Async)
}

/// Merge the two role mappings into one record per flag name.
///
/// Master flags come first in mapping order, followed by flags that only
/// exist for the tserver.
pub fn transform_master_tserver_to_flags(
    master_gflags: &BTreeMap<String, String>,
    tserver_gflags: &BTreeMap<String, String>,
) -> Vec<Gflag> {
    let mut flags: Vec<Gflag> = master_gflags
        .iter()
        .map(|(name, value)| Gflag {
            name: name.clone(),
            master: Some(value.clone()),
            tserver: tserver_gflags.get(name).cloned(),
        })
        .collect();

    flags.extend(
        tserver_gflags
            .iter()
            .filter(|(name, _)| !master_gflags.contains_key(*name))
            .map(|(name, value)| Gflag::tserver(name, value)),
    );

    flags
}

/// Split flag records back into per-role mappings.
///
/// A record lands in the master mapping iff it has a master value and, independently,
/// in the tserver mapping iff it has a tserver value.
pub fn transform_flags_to_master_tserver(flags: &[Gflag]) -> RoleGflags {
    let mut split = RoleGflags::default();

    for flag in flags {
        if flag.name.is_empty() {
            tracing::debug!("skipping gflag without a name");
            continue;
        }
        if let Some(value) = &flag.master {
            split.master_gflags.insert(flag.name.clone(), value.clone());
        }
        if let Some(value) = &flag.tserver {
            split.tserver_gflags.insert(flag.name.clone(), value.clone());
        }
    }

    split
}

/// Form data for one cluster of a universe, or the default form if the
/// universe has no cluster of that type
pub fn get_form_data(universe: &UniverseDetails, cluster_type: ClusterType) -> UniverseFormData {
    let Some(cluster) = get_cluster_by_type(universe, cluster_type) else {
        return UniverseFormData::default();
    };
    let intent = &cluster.user_intent;
    let encryption = universe.encryption_at_rest_config.as_ref();

    let provider = (!intent.provider.is_empty()).then(|| ProviderMin {
        code: intent.provider_type.unwrap_or(CloudType::Other),
        uuid: intent.provider.clone(),
    });

    UniverseFormData {
        cloud_config: CloudConfigFormValue {
            universe_name: intent.universe_name.clone(),
            provider,
            region_list: intent.region_list.clone(),
            num_nodes: intent.num_nodes,
            replication_factor: intent.replication_factor,
            placements: get_placements_from_cluster(cluster),
            auto_placement: true,
        },
        instance_config: InstanceConfigFormValue {
            instance_type: (!intent.instance_type.is_empty()).then(|| intent.instance_type.clone()),
            device_info: intent.device_info.clone(),
            assign_public_ip: intent.assign_public_ip,
            use_time_sync: intent.use_time_sync,
            enable_client_to_node_encrypt: intent.enable_client_to_node_encrypt,
            enable_node_to_node_encrypt: intent.enable_node_to_node_encrypt,
            enable_ysql: intent.enable_ysql,
            enable_ysql_auth: intent.enable_ysql_auth,
            ysql_password: None,
            ysql_confirm_password: None,
            enable_ycql: intent.enable_ycql,
            enable_ycql_auth: intent.enable_ycql_auth,
            ycql_password: None,
            ycql_confirm_password: None,
            enable_yedis: intent.enable_yedis,
            enable_encryption_at_rest: encryption
                .and_then(|config| config.encryption_at_rest_enabled)
                .unwrap_or(false),
            kms_config: encryption.and_then(|config| config.kms_config_uuid.clone()),
            root_ca: universe.root_ca.clone(),
        },
        advanced_config: AdvancedConfigFormValue {
            use_systemd: intent.use_systemd,
            aws_arn_string: intent.aws_arn_string.clone(),
            enable_ipv6: intent.enable_ipv6,
            enable_exposing_service: intent.enable_exposing_service,
            access_key_code: intent.access_key_code.clone(),
            yb_software_version: intent.yb_software_version.clone(),
            communication_ports: universe.communication_ports.clone().unwrap_or_default(),
            customize_port: false,
            ybc_package_path: None,
        },
        instance_tags: intent
            .instance_tags
            .iter()
            .map(|(name, value)| InstanceTag {
                name: name.clone(),
                value: value.clone(),
            })
            .collect(),
        gflags: transform_master_tserver_to_flags(&intent.master_gflags, &intent.tserver_gflags),
    }
}

pub fn get_primary_form_data(universe: &UniverseDetails) -> UniverseFormData {
    get_form_data(universe, ClusterType::Primary)
}

pub fn get_async_form_data(universe: &UniverseDetails) -> UniverseFormData {
    get_form_data(universe, ClusterType::Async)
}

/// Backend user intent for a cluster form.
///
/// Passwords are only carried when their auth toggle is on; a stale value
/// left in the form with the toggle off is never sent.
pub fn get_user_intent(form: &UniverseFormData) -> Result<UserIntent> {
    let cloud = &form.cloud_config;
    let instance = &form.instance_config;
    let advanced = &form.advanced_config;
    let provider = cloud.provider.as_ref().ok_or(Error::MissingProvider)?;
    let RoleGflags {
        master_gflags,
        tserver_gflags,
    } = transform_flags_to_master_tserver(&form.gflags);

    let instance_tags = form
        .instance_tags
        .iter()
        .filter(|tag| !tag.name.is_empty() && !tag.value.is_empty())
        .map(|tag| (tag.name.clone(), tag.value.clone()))
        .collect();

    Ok(UserIntent {
        universe_name: cloud.universe_name.clone(),
        provider: provider.uuid.clone(),
        provider_type: Some(provider.code),
        region_list: cloud.region_list.clone(),
        num_nodes: cloud.num_nodes,
        replication_factor: cloud.replication_factor,
        instance_type: instance.instance_type.clone().unwrap_or_default(),
        device_info: instance.device_info.clone(),
        assign_public_ip: instance.assign_public_ip,
        use_time_sync: instance.use_time_sync,
        enable_client_to_node_encrypt: instance.enable_client_to_node_encrypt,
        enable_node_to_node_encrypt: instance.enable_node_to_node_encrypt,
        enable_ysql: instance.enable_ysql,
        enable_ysql_auth: instance.enable_ysql_auth,
        ysql_password: credential(instance.enable_ysql_auth, instance.ysql_password.as_deref()),
        enable_ycql: instance.enable_ycql,
        enable_ycql_auth: instance.enable_ycql_auth,
        ycql_password: credential(instance.enable_ycql_auth, instance.ycql_password.as_deref()),
        enable_yedis: instance.enable_yedis,
        aws_arn_string: advanced.aws_arn_string.clone(),
        access_key_code: advanced.access_key_code.clone(),
        yb_software_version: advanced.yb_software_version.clone(),
        enable_ipv6: advanced.enable_ipv6,
        enable_exposing_service: advanced.enable_exposing_service,
        use_systemd: advanced.use_systemd,
        instance_tags,
        master_gflags,
        tserver_gflags,
        ..Default::default()
    })
}

fn credential(auth_enabled: bool, password: Option<&str>) -> Option<String> {
    password
        .filter(|password| auth_enabled && !password.is_empty())
        .map(str::to_string)
}

/// Cluster entry for a configure payload
pub fn build_cluster(form: &UniverseFormData, cluster_type: ClusterType) -> Result<Cluster> {
    Ok(Cluster {
        cluster_type,
        user_intent: get_user_intent(form)?,
        placement_info: Some(placement_info(form)?),
        ..Default::default()
    })
}
