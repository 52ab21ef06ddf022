//! Conversions between the flat placement table of the form and the
//! cloud → region → zone tree of `PlacementInfo`.

use yba_common::{
    Cluster, Error, Placement, PlacementAz, PlacementCloud, PlacementInfo, PlacementRegion,
    Result, UniverseFormData,
};

/// Group the form's zone rows into regions, keeping first-seen region order
pub fn get_placements(form: &UniverseFormData) -> Vec<PlacementRegion> {
    let mut regions: Vec<PlacementRegion> = Vec::new();

    for placement in &form.cloud_config.placements {
        let az = PlacementAz {
            uuid: placement.uuid.clone(),
            name: placement.name.clone(),
            replication_factor: placement.replication_factor,
            subnet: placement.subnet.clone(),
            num_nodes_in_az: placement.num_nodes_in_az,
            is_affinitized: placement.is_affinitized,
            ..Default::default()
        };

        match regions
            .iter_mut()
            .find(|region| region.uuid == placement.parent_region_id)
        {
            Some(region) => region.az_list.push(az),
            None => regions.push(PlacementRegion {
                uuid: placement.parent_region_id.clone(),
                code: placement.parent_region_code.clone(),
                name: placement.parent_region_name.clone(),
                az_list: vec![az],
                ..Default::default()
            }),
        }
    }

    regions
}

/// Placement tree for a single-provider cluster built from the form
pub fn placement_info(form: &UniverseFormData) -> Result<PlacementInfo> {
    let provider = form
        .cloud_config
        .provider
        .as_ref()
        .ok_or(Error::MissingProvider)?;

    Ok(PlacementInfo {
        cloud_list: vec![PlacementCloud {
            uuid: provider.uuid.clone(),
            code: provider.code.to_string(),
            region_list: get_placements(form),
            ..Default::default()
        }],
    })
}

/// Flatten the first cloud of a cluster's placement tree into zone rows
pub fn get_placements_from_cluster(cluster: &Cluster) -> Vec<Placement> {
    let Some(cloud) = cluster
        .placement_info
        .as_ref()
        .and_then(|info| info.cloud_list.first())
    else {
        return Vec::new();
    };

    cloud
        .region_list
        .iter()
        .flat_map(|region| {
            region.az_list.iter().map(move |az| Placement {
                uuid: az.uuid.clone(),
                name: az.name.clone(),
                replication_factor: az.replication_factor,
                subnet: az.subnet.clone(),
                num_nodes_in_az: az.num_nodes_in_az,
                is_affinitized: az.is_affinitized,
                parent_region_id: region.uuid.clone(),
                parent_region_name: region.name.clone(),
                parent_region_code: region.code.clone(),
            })
        })
        .collect()
}
