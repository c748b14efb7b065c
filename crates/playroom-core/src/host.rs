//! Host application contract
//!
//! The host embeds a playroom and supplies the initial code, receives code
//! changes, and owns the component and theme registries plus the renderer
//! that turns code into preview frames. Component and theme payloads are
//! opaque to the playroom; it only forwards them.

use crate::frames::{Frame, frame_matrix};
use crate::{Error, Result};
use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Opaque host-defined component payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentRef(pub Value);

/// Opaque host-defined theme payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThemeRef(pub Value);

impl ThemeRef {
    /// String field of the payload, if it is an object holding one
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

/// Registries and widths supplied by the host
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostProps {
    pub components: IndexMap<String, ComponentRef>,
    pub themes: IndexMap<String, ThemeRef>,
    pub widths: Vec<u32>,
}

impl HostProps {
    /// Theme names in registry order
    pub fn theme_names(&self) -> Vec<&str> {
        self.themes.keys().map(String::as_str).collect()
    }

    /// Component names, sorted
    pub fn component_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.components.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn frames(&self) -> Vec<Frame> {
        frame_matrix(&self.widths, &self.theme_names())
    }
}

/// Code source and change sink
#[async_trait]
pub trait PlayroomHost: Send + Sync {
    /// Load the initial code
    async fn get_code(&self) -> Result<String>;
    /// Called on every accepted code change, valid or not
    fn update_code(&self, code: &str);
}

/// Host with fixed initial code that records every update
#[derive(Debug, Default)]
pub struct StaticHost {
    initial: String,
    updates: Mutex<Vec<String>>,
}

impl StaticHost {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            initial: initial.into(),
            updates: Mutex::new(Vec::new()),
        }
    }

    /// Every code update received, oldest first
    pub fn updates(&self) -> Vec<String> {
        self.updates.lock().clone()
    }
}

#[async_trait]
impl PlayroomHost for StaticHost {
    async fn get_code(&self) -> Result<String> {
        Ok(self.initial.clone())
    }

    fn update_code(&self, code: &str) {
        self.updates.lock().push(code.to_string());
    }
}

/// Host backed by a code file
///
/// A missing file loads as empty code. Updates are written back
/// synchronously; failures are logged, never raised, since the update path
/// must not fail.
#[derive(Debug, Clone)]
pub struct FileHost {
    path: PathBuf,
}

impl FileHost {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl PlayroomHost for FileHost {
    async fn get_code(&self) -> Result<String> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(code) => Ok(code),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(Error::Loader(format!("{}: {}", self.path.display(), e))),
        }
    }

    fn update_code(&self, code: &str) {
        if let Some(parent) = self.path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!("Failed to create {}: {}", parent.display(), e);
            return;
        }
        if let Err(e) = std::fs::write(&self.path, code) {
            warn!("Failed to write code to {}: {}", self.path.display(), e);
        }
    }
}

/// Everything the renderer needs for one preview pass
#[derive(Debug, Clone)]
pub struct PreviewRequest<'a> {
    /// Last code that passed the syntax check
    pub code: &'a str,
    pub frames: Vec<Frame>,
    pub themes: &'a IndexMap<String, ThemeRef>,
    pub components: &'a IndexMap<String, ComponentRef>,
}

impl PreviewRequest<'_> {
    pub fn theme(&self, frame: &Frame) -> Option<&ThemeRef> {
        self.themes.get(&frame.theme)
    }
}

/// Renders one preview frame
pub trait FrameRenderer: Send + Sync {
    /// Produce the frame's document
    fn render_frame(&self, request: &PreviewRequest<'_>, frame: &Frame) -> String;

    /// Render every frame of the request, in frame order
    fn render_all(&self, request: &PreviewRequest<'_>) -> Vec<(Frame, String)> {
        request
            .frames
            .iter()
            .map(|frame| (frame.clone(), self.render_frame(request, frame)))
            .collect()
    }
}
