//! Universe form workflow and alert template preview for YugabyteDB Anywhere
//!
//! The modules build on each other bottom-up: field registry, placement and
//! transforms turn form data into cluster definitions; `submit` assembles and
//! sends payloads; `context` owns the create page state; `preview` renders
//! alert channel templates.

pub mod api;
pub mod context;
pub mod fields;
pub mod placement;
pub mod preview;
pub mod submit;
pub mod transform;

pub use api::{AlertApi, ClientError, UniverseApi, YbaClient};
pub use context::{CreateUniverseFlow, FormAction, UniverseFormContext, UniverseFormContextState};
pub use preview::{PreviewState, PreviewView, TemplatePreview};
pub use submit::{
    FeatureFlags, Navigator, ReplicaOutcome, SubmitOutcome, UniverseSubmitter, NON_ECHOED_FIELDS,
};
