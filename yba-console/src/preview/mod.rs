//! Alert channel template preview
//!
//! Loads the alert configurations, and for the selected one renders the
//! template body through the platform and shows the result in an editor.

pub mod document;

use crate::api::AlertApi;
use std::cmp::Ordering;
use yba_common::{AlertConfiguration, AlertTemplatePreviewRequest};

pub use document::{Editor, Node, TextDeserializer, TextSerializer};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PreviewState {
    #[default]
    Idle,
    ConfigLoading,
    Ready,
    Previewing { config_uuid: String },
    PreviewResolved { config_uuid: String },
    PreviewFailed { config_uuid: String, message: String },
}

impl PreviewState {
    pub fn selected_config(&self) -> Option<&str> {
        match self {
            Self::Previewing { config_uuid }
            | Self::PreviewResolved { config_uuid }
            | Self::PreviewFailed { config_uuid, .. } => Some(config_uuid),
            Self::Idle | Self::ConfigLoading | Self::Ready => None,
        }
    }

    fn configs_loaded(&self) -> bool {
        !matches!(self, Self::Idle | Self::ConfigLoading)
    }
}

/// Name ordering used for the configuration list: case-insensitive, with
/// lowercase before uppercase on ties
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

pub fn sort_alert_configs(configs: &mut [AlertConfiguration]) {
    configs.sort_by(|a, b| locale_compare(&a.name, &b.name));
}

/// What a visible preview shows
#[derive(Debug, PartialEq)]
pub enum PreviewView<'a> {
    Loading,
    Ready {
        configs: &'a [AlertConfiguration],
        selected: Option<&'a AlertConfiguration>,
        body: &'a [Node],
        error: Option<&'a str>,
    },
}

pub struct TemplatePreview<A> {
    api: A,
    template: Vec<Node>,
    editor: Editor,
    configs: Vec<AlertConfiguration>,
    state: PreviewState,
    visible: bool,
}

impl<A: AlertApi> TemplatePreview<A> {
    /// Preview for `template`; the editor starts out showing the template itself
    pub fn new(api: A, template: Vec<Node>) -> Self {
        Self {
            api,
            editor: Editor::new(template.clone()),
            template,
            configs: Vec::new(),
            state: PreviewState::Idle,
            visible: false,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn state(&self) -> &PreviewState {
        &self.state
    }

    pub fn configs(&self) -> &[AlertConfiguration] {
        &self.configs
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    /// Hide without discarding any state
    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Fetch every alert configuration.
    ///
    /// A failed fetch is logged and leaves the preview loading.
    pub async fn load_configs(&mut self) -> &PreviewState {
        self.state = PreviewState::ConfigLoading;

        match self.api.fetch_alert_config_list(&[]).await {
            Ok(mut configs) => {
                sort_alert_configs(&mut configs);
                tracing::debug!(count = configs.len(), "alert configurations loaded");
                self.configs = configs;
                self.state = PreviewState::Ready;
            }
            Err(e) => {
                tracing::error!("failed to load alert configurations: {}", e);
            }
        }
        &self.state
    }

    /// Render the template against the configuration `config_uuid`
    pub async fn select(&mut self, config_uuid: &str) -> &PreviewState {
        if !self.state.configs_loaded() {
            tracing::warn!("alert configurations not loaded yet, ignoring selection");
            return &self.state;
        }

        self.state = PreviewState::Previewing {
            config_uuid: config_uuid.to_string(),
        };
        let request = AlertTemplatePreviewRequest::webhook(TextSerializer::serialize(&self.template));

        match self.api.preview_alert_notification(&request, config_uuid).await {
            Ok(preview) => {
                let nodes = TextDeserializer::deserialize(&preview.text);
                self.editor.clear();
                self.editor.insert_nodes(nodes);
                self.state = PreviewState::PreviewResolved {
                    config_uuid: config_uuid.to_string(),
                };
            }
            Err(e) => {
                tracing::error!(config = config_uuid, "template preview failed: {}", e);
                self.state = PreviewState::PreviewFailed {
                    config_uuid: config_uuid.to_string(),
                    message: e.to_string(),
                };
            }
        }
        &self.state
    }

    /// Current view, or `None` while hidden
    pub fn view(&self) -> Option<PreviewView<'_>> {
        if !self.visible {
            return None;
        }
        if !self.state.configs_loaded() {
            return Some(PreviewView::Loading);
        }

        let selected = self
            .state
            .selected_config()
            .and_then(|uuid| self.configs.iter().find(|config| config.uuid == uuid));
        let error = match &self.state {
            PreviewState::PreviewFailed { message, .. } => Some(message.as_str()),
            _ => None,
        };

        Some(PreviewView::Ready {
            configs: &self.configs,
            selected,
            body: self.editor.children(),
            error,
        })
    }
}
