//! Owned state of the universe form workflow and the create page built on it
//!
//! Every mutation goes through [`UniverseFormContext::dispatch`]; form steps
//! read the state through a shared reference.

use crate::api::UniverseApi;
use crate::fields::{async_copy_fields, filter_by_cluster_type};
use crate::submit::{
    CreateUniverseRequest, FeatureFlags, Navigator, SubmitOutcome, UniverseSubmitter,
};
use yba_common::{ClusterModes, ClusterType, Error, Result, UniverseDetails, UniverseFormData};

/// Snapshot of the form workflow
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UniverseFormContextState {
    pub cluster_type: ClusterType,
    pub mode: ClusterModes,
    pub new_universe: bool,
    pub is_loading: bool,
    pub universe_configure_template: UniverseDetails,
    pub primary_form_data: Option<UniverseFormData>,
    pub async_form_data: Option<UniverseFormData>,
}

/// Settings a workflow starts with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormInit {
    pub cluster_type: ClusterType,
    pub mode: ClusterModes,
    pub new_universe: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormAction {
    InitializeForm(FormInit),
    ToggleClusterType(ClusterType),
    SetPrimaryFormData(UniverseFormData),
    SetAsyncFormData(UniverseFormData),
    SetLoader(bool),
    SetConfigureTemplate(UniverseDetails),
}

impl UniverseFormContextState {
    /// Apply one action, producing the next state
    pub fn reduce(mut self, action: FormAction) -> Self {
        match action {
            FormAction::InitializeForm(init) => {
                self.cluster_type = init.cluster_type;
                self.mode = init.mode;
                self.new_universe = init.new_universe;
            }
            FormAction::ToggleClusterType(cluster_type) => self.cluster_type = cluster_type,
            FormAction::SetPrimaryFormData(data) => self.primary_form_data = Some(data),
            FormAction::SetAsyncFormData(data) => self.async_form_data = Some(data),
            FormAction::SetLoader(is_loading) => self.is_loading = is_loading,
            FormAction::SetConfigureTemplate(template) => {
                self.universe_configure_template = template
            }
        }
        self
    }
}

/// Container owning the workflow state
#[derive(Debug, Clone, Default)]
pub struct UniverseFormContext {
    state: UniverseFormContextState,
}

impl UniverseFormContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &UniverseFormContextState {
        &self.state
    }

    pub fn dispatch(&mut self, action: FormAction) {
        tracing::trace!(?action, "form action");
        let state = std::mem::take(&mut self.state);
        self.state = state.reduce(action);
    }
}

/// The create-universe page: a primary form plus an optional read replica
#[derive(Debug, Clone)]
pub struct CreateUniverseFlow {
    context: UniverseFormContext,
}

impl Default for CreateUniverseFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl CreateUniverseFlow {
    pub fn new() -> Self {
        let mut context = UniverseFormContext::new();
        context.dispatch(FormAction::InitializeForm(FormInit {
            cluster_type: ClusterType::Primary,
            mode: ClusterModes::Create,
            new_universe: true,
        }));
        Self { context }
    }

    pub fn with_configure_template(mut self, template: UniverseDetails) -> Self {
        self.context.dispatch(FormAction::SetConfigureTemplate(template));
        self
    }

    pub fn state(&self) -> &UniverseFormContextState {
        self.context.state()
    }

    pub fn is_primary(&self) -> bool {
        self.state().cluster_type == ClusterType::Primary
    }

    /// Form the current view opens with
    pub fn default_form_data(&self) -> Result<UniverseFormData> {
        let state = self.state();
        let primary = state.primary_form_data.clone().unwrap_or_default();

        match state.cluster_type {
            ClusterType::Primary => Ok(primary),
            ClusterType::Async => match &state.async_form_data {
                Some(async_data) => async_copy_fields(&primary)?.apply_to(async_data),
                None => filter_by_cluster_type(&primary, ClusterType::Async)?.into_form_data(),
            },
        }
    }

    /// Stash the form being edited and flip to the other cluster type
    pub fn switch_cluster_type(&mut self, current: UniverseFormData) {
        self.context.dispatch(FormAction::SetLoader(true));
        let next = match self.state().cluster_type {
            ClusterType::Primary => {
                self.context.dispatch(FormAction::SetPrimaryFormData(current));
                ClusterType::Async
            }
            ClusterType::Async => {
                self.context.dispatch(FormAction::SetAsyncFormData(current));
                ClusterType::Primary
            }
        };
        self.context.dispatch(FormAction::ToggleClusterType(next));
        self.context.dispatch(FormAction::SetLoader(false));
    }

    /// Primary and replica forms to submit when the current view is submitted
    /// with `submitted`
    pub fn submission_pair(
        &self,
        submitted: UniverseFormData,
    ) -> Result<(UniverseFormData, Option<UniverseFormData>)> {
        let state = self.state();
        match state.cluster_type {
            ClusterType::Primary => {
                let replica = match &state.async_form_data {
                    Some(async_data) => Some(async_copy_fields(&submitted)?.apply_to(async_data)?),
                    None => None,
                };
                Ok((submitted, replica))
            }
            ClusterType::Async => {
                let primary = state.primary_form_data.clone().ok_or_else(|| {
                    Error::InvalidConfig("read replica submitted before the primary form".into())
                })?;
                Ok((primary, Some(submitted)))
            }
        }
    }

    /// Submit the current view through `submitter`
    pub async fn submit<A: UniverseApi, N: Navigator>(
        &self,
        submitter: &UniverseSubmitter<A, N>,
        submitted: UniverseFormData,
        features: &FeatureFlags,
    ) -> Result<SubmitOutcome> {
        let (primary, replica) = self.submission_pair(submitted)?;
        Ok(submitter
            .create_universe(CreateUniverseRequest {
                primary: &primary,
                async_data: replica.as_ref(),
                context: self.state(),
                features,
            })
            .await)
    }
}
