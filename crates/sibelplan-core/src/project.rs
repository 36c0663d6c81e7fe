//! Project persistence: annotations and editor settings as JSON.
//!
//! The source PDF is not embedded; a project file only makes sense together
//! with the plan document it was annotated against.

use crate::session::EditorSession;
use crate::store::{AnnotationStore, PageObjects};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

pub const PROJECT_VERSION: u32 = 1;
/// Suggested download filename for saved projects.
pub const PROJECT_FILENAME: &str = "sibel_projekt.json";

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("invalid project JSON: {0}")]
    Json(#[from] serde_json::Error),
}

fn default_version() -> u32 {
    PROJECT_VERSION
}

/// On-disk project shape.
///
/// Every field beyond the version is optional on load; missing fields keep
/// the session's current value, so files written by older builds still open.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDocument {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub saved_at: Option<String>,
    #[serde(default)]
    pub circuits: Option<Vec<String>>,
    #[serde(default)]
    pub active_circuit: Option<String>,
    #[serde(default)]
    pub ann: Option<BTreeMap<usize, PageObjects>>,
    #[serde(default)]
    pub page_index: Option<usize>,
    #[serde(default)]
    pub render_scale: Option<f64>,
    #[serde(default)]
    pub active_symbol_id: Option<String>,
}

impl ProjectDocument {
    /// Snapshot a session for saving. Routes that never got a vertex are
    /// dropped so they do not come back as unhittable ghosts.
    pub fn capture(session: &EditorSession) -> Self {
        let mut ann = session.store.pages.clone();
        for page in ann.values_mut() {
            page.objects.retain(|o| match o {
                crate::objects::AnnotationObject::Route(r) => !r.points.is_empty(),
                _ => true,
            });
        }
        Self {
            version: PROJECT_VERSION,
            saved_at: Some(chrono::Utc::now().to_rfc3339()),
            circuits: Some(session.circuits.names().to_vec()),
            active_circuit: Some(session.circuits.active().to_string()),
            ann: Some(ann),
            page_index: Some(session.page_index),
            render_scale: Some(session.render_scale),
            active_symbol_id: Some(session.active_symbol_id.clone()),
        }
    }

    /// Load this project into a session. Fields absent from the file leave
    /// the session value untouched. Selection and any route in progress are
    /// cleared by the caller via the interaction controller.
    pub fn apply(self, session: &mut EditorSession) {
        if let Some(circuits) = self.circuits {
            let active = self
                .active_circuit
                .unwrap_or_else(|| session.circuits.active().to_string());
            session.circuits.restore(circuits, active);
        } else if let Some(active) = self.active_circuit {
            session.circuits.set_active(&active);
        }
        if let Some(mut ann) = self.ann {
            for page in ann.values_mut() {
                page.objects.retain(|o| match o {
                    crate::objects::AnnotationObject::Route(r) => !r.points.is_empty(),
                    _ => true,
                });
            }
            session.store = AnnotationStore { pages: ann };
        }
        if let Some(index) = self.page_index {
            session.page_index = if session.page_count == 0 {
                index
            } else {
                index.min(session.page_count - 1)
            };
        }
        if let Some(scale) = self.render_scale {
            session.render_scale = scale;
        }
        if let Some(id) = self.active_symbol_id {
            session.active_symbol_id = id;
        }
        session.select(None);
        log::info!("project loaded (version {})", self.version);
    }

    pub fn to_json(&self) -> Result<String, ProjectError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ProjectError> {
        Ok(serde_json::from_str(json)?)
    }
}
