//! Common types shared between yba-console and yba-cli

pub mod alerts;
pub mod form;
pub mod universe;

use serde::{Deserialize, Serialize};

pub use alerts::{AlertConfiguration, AlertTemplatePreviewRequest, NotificationPreview};
pub use form::{
    AdvancedConfigFormValue, CloudConfigFormValue, Gflag, InstanceConfigFormValue, InstanceTag,
    Placement, ProviderMin, UniverseFormData,
};
pub use universe::{
    Cluster, CommunicationPorts, DeviceInfo, EncryptionAtRestConfig, ExposingServiceState, KeyOp,
    PlacementAz, PlacementCloud, PlacementInfo, PlacementRegion, Universe, UniverseDetails,
    UniverseResource, UserIntent,
};

/// The request sent to the configure endpoint has the same shape as the
/// universe details it returns.
pub type ConfigurePayload = UniverseDetails;

/// Cluster role inside a universe
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum ClusterType {
    #[default]
    Primary,
    Async,
}

impl std::fmt::Display for ClusterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primary => write!(f, "PRIMARY"),
            Self::Async => write!(f, "ASYNC"),
        }
    }
}

impl std::str::FromStr for ClusterType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "primary" => Ok(Self::Primary),
            "async" | "replica" | "read-replica" => Ok(Self::Async),
            other => Err(Error::InvalidConfig(format!("unknown cluster type '{}'", other))),
        }
    }
}

/// Operation the configure endpoint is asked to plan for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum ClusterModes {
    #[default]
    Create,
    Edit,
    Delete,
}

/// Cloud provider code
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CloudType {
    Aws,
    Gcp,
    Azu,
    Docker,
    Openstack,
    Kubernetes,
    Onprem,
    #[serde(other)]
    Other,
}

impl std::fmt::Display for CloudType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            Self::Aws => "aws",
            Self::Gcp => "gcp",
            Self::Azu => "azu",
            Self::Docker => "docker",
            Self::Openstack => "openstack",
            Self::Kubernetes => "kubernetes",
            Self::Onprem => "onprem",
            Self::Other => "other",
        };
        write!(f, "{}", code)
    }
}

/// Errors raised while shaping form and universe data
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Cluster not found: {0}")]
    ClusterNotFound(ClusterType),

    #[error("Provider is not selected")]
    MissingProvider,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
