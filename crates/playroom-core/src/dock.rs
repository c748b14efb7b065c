//! Docking the editor in and out of the main window
//!
//! Undocking opens a separate OS window through a [`WindowPortal`], showing a
//! second view over the same [`EditorModel`]. The open window is owned by a
//! [`PortalHandle`], which closes it when dropped, so redocking, a host
//! initiated close and playroom teardown all release it.

use crate::editor::EditorModel;
use crate::{Error, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info};

/// Where the editor currently lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DockState {
    /// Inline with the preview
    #[default]
    Docked,
    /// In its own window
    Undocked,
}

/// Outer size of a window, in logical pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowSize {
    pub width: f64,
    pub height: f64,
}

impl Default for WindowSize {
    fn default() -> Self {
        Self {
            width: 1024.0,
            height: 768.0,
        }
    }
}

/// An open secondary window
pub trait PortalWindow: Send {
    /// Close the window and detach its listeners
    fn close(&mut self);
}

/// Opens secondary windows
pub trait WindowPortal: Send + Sync {
    fn open(&self, model: EditorModel, size: WindowSize) -> Result<Box<dyn PortalWindow>>;
}

/// Owns an open window; closes it exactly once
pub struct PortalHandle {
    window: Option<Box<dyn PortalWindow>>,
}

impl PortalHandle {
    pub fn new(window: Box<dyn PortalWindow>) -> Self {
        Self {
            window: Some(window),
        }
    }

    pub fn close(&mut self) {
        if let Some(mut window) = self.window.take() {
            window.close();
        }
    }

    /// Forget a window the host already closed
    pub fn release_closed(&mut self) {
        self.window = None;
    }
}

impl Drop for PortalHandle {
    fn drop(&mut self) {
        self.close();
    }
}

/// Docked/undocked state plus the window backing it
pub struct DockController {
    portal: Arc<dyn WindowPortal>,
    handle: Option<PortalHandle>,
}

impl DockController {
    pub fn new(portal: Arc<dyn WindowPortal>) -> Self {
        Self {
            portal,
            handle: None,
        }
    }

    pub fn state(&self) -> DockState {
        if self.handle.is_some() {
            DockState::Undocked
        } else {
            DockState::Docked
        }
    }

    /// Move the editor into its own window
    ///
    /// Requires the initial code to be loaded. Undocking twice is a no-op.
    pub fn undock(&mut self, ready: bool, model: EditorModel, size: WindowSize) -> Result<()> {
        if !ready {
            return Err(Error::NotReady);
        }
        if self.handle.is_some() {
            return Ok(());
        }
        let window = self.portal.open(model, size)?;
        self.handle = Some(PortalHandle::new(window));
        info!("Editor undocked ({}x{})", size.width, size.height);
        Ok(())
    }

    /// Close the editor window and return the editor to the main layout
    pub fn redock(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.close();
            info!("Editor redocked");
        }
    }

    /// The user closed the editor window
    pub fn on_portal_closed(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.release_closed();
            debug!("Editor window closed by host, redocked");
        }
    }
}

/// Portal whose windows exist only in memory
///
/// Used when no windowing system is available. Tracks how many of its
/// windows are open.
#[derive(Debug, Clone, Default)]
pub struct HeadlessPortal {
    open: Arc<Mutex<Vec<EditorModel>>>,
}

impl HeadlessPortal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_count(&self) -> usize {
        self.open.lock().len()
    }

    /// Models shown by the currently open windows
    pub fn open_models(&self) -> Vec<EditorModel> {
        self.open.lock().clone()
    }
}

struct HeadlessWindow {
    open: Arc<Mutex<Vec<EditorModel>>>,
    model: EditorModel,
}

impl PortalWindow for HeadlessWindow {
    fn close(&mut self) {
        self.open.lock().retain(|m| !m.same_model(&self.model));
    }
}

impl WindowPortal for HeadlessPortal {
    fn open(&self, model: EditorModel, _size: WindowSize) -> Result<Box<dyn PortalWindow>> {
        self.open.lock().push(model.clone());
        Ok(Box::new(HeadlessWindow {
            open: Arc::clone(&self.open),
            model,
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counting {
        opened: AtomicUsize,
        closed: Arc<AtomicUsize>,
    }

    struct CountingWindow(Arc<AtomicUsize>);

    impl PortalWindow for CountingWindow {
        fn close(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl WindowPortal for Counting {
        fn open(&self, _model: EditorModel, _size: WindowSize) -> Result<Box<dyn PortalWindow>> {
            self.opened.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(CountingWindow(self.closed.clone())))
        }
    }

    struct Refusing;

    impl WindowPortal for Refusing {
        fn open(&self, _model: EditorModel, _size: WindowSize) -> Result<Box<dyn PortalWindow>> {
            Err(Error::Portal("no display".to_string()))
        }
    }

    #[test]
    fn test_undock_requires_ready() {
        let mut dock = DockController::new(Arc::new(HeadlessPortal::new()));
        let result = dock.undock(false, EditorModel::new(), WindowSize::default());
        assert!(matches!(result, Err(Error::NotReady)));
        assert_eq!(dock.state(), DockState::Docked);
    }

    #[test]
    fn test_redock_closes_once() {
        let portal = Arc::new(Counting::default());
        let mut dock = DockController::new(portal.clone());

        dock.undock(true, EditorModel::new(), WindowSize::default()).unwrap();
        dock.undock(true, EditorModel::new(), WindowSize::default()).unwrap();
        assert_eq!(dock.state(), DockState::Undocked);
        assert_eq!(portal.opened.load(Ordering::SeqCst), 1);

        dock.redock();
        dock.redock();
        assert_eq!(dock.state(), DockState::Docked);
        assert_eq!(portal.closed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_host_close_does_not_close_again() {
        let portal = Arc::new(Counting::default());
        let mut dock = DockController::new(portal.clone());

        dock.undock(true, EditorModel::new(), WindowSize::default()).unwrap();
        dock.on_portal_closed();
        assert_eq!(dock.state(), DockState::Docked);
        assert_eq!(portal.closed.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_teardown_closes_window() {
        let portal = Arc::new(Counting::default());
        let mut dock = DockController::new(portal.clone());
        dock.undock(true, EditorModel::new(), WindowSize::default()).unwrap();

        drop(dock);
        assert_eq!(portal.closed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_portal_failure_stays_docked() {
        let mut dock = DockController::new(Arc::new(Refusing));
        let result = dock.undock(true, EditorModel::new(), WindowSize::default());
        assert!(matches!(result, Err(Error::Portal(_))));
        assert_eq!(dock.state(), DockState::Docked);
    }

    #[test]
    fn test_headless_window_shares_model() {
        let portal = HeadlessPortal::new();
        let model = EditorModel::with_text("<A />");
        let mut dock = DockController::new(Arc::new(portal.clone()));

        dock.undock(true, model.clone(), WindowSize::default()).unwrap();
        assert_eq!(portal.open_count(), 1);
        assert!(portal.open_models()[0].same_model(&model));

        dock.redock();
        assert_eq!(portal.open_count(), 0);
    }
}
