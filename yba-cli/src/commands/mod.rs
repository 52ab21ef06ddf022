//! Command handlers

pub mod alert;
pub mod config;
pub mod universe;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Read a JSON or YAML document, picking the parser by file extension
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_document(path, &contents).with_context(|| format!("failed to parse {}", path.display()))
}

fn parse_document<T: DeserializeOwned>(path: &Path, contents: &str) -> Result<T> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        Ok(serde_json::from_str(contents)?)
    } else {
        Ok(serde_yaml::from_str(contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yba_common::UniverseFormData;

    #[test]
    fn test_yaml_form_file() {
        let form: UniverseFormData = parse_document(
            Path::new("primary.yaml"),
            r#"
cloudConfig:
  universeName: orders
  provider:
    code: aws
    uuid: provider-aws
  numNodes: 5
gFlags:
  - Name: max_log_size
    MASTER: "256"
"#,
        )
        .unwrap();

        assert_eq!(form.cloud_config.universe_name, "orders");
        assert_eq!(form.cloud_config.num_nodes, 5);
        assert_eq!(form.cloud_config.replication_factor, 3);
        assert_eq!(form.gflags[0].master.as_deref(), Some("256"));
        assert!(form.instance_config.enable_ysql);
    }

    #[test]
    fn test_json_picked_by_extension() {
        let form: UniverseFormData = parse_document(
            Path::new("replica.JSON"),
            r#"{"cloudConfig": {"universeName": "orders", "numNodes": 1}}"#,
        )
        .unwrap();
        assert_eq!(form.cloud_config.num_nodes, 1);
    }
}
