//! Shared application state for the HTTP layer.

use std::sync::Arc;

use downpour_core::{DownloadEngine, DownloadInspector, DownloadWorkflow};

/// Handle triple exposing workflow, inspection, and engine liveness to the
/// HTTP layer.
#[derive(Clone)]
pub struct DownloadHandles {
    workflow: Arc<dyn DownloadWorkflow>,
    inspector: Arc<dyn DownloadInspector>,
    engine: Arc<dyn DownloadEngine>,
}

impl DownloadHandles {
    /// Construct a new handle triple from shared trait objects.
    #[must_use]
    pub fn new(
        workflow: Arc<dyn DownloadWorkflow>,
        inspector: Arc<dyn DownloadInspector>,
        engine: Arc<dyn DownloadEngine>,
    ) -> Self {
        Self {
            workflow,
            inspector,
            engine,
        }
    }

    /// Accessor for the workflow implementation.
    #[must_use]
    pub fn workflow(&self) -> &Arc<dyn DownloadWorkflow> {
        &self.workflow
    }

    /// Accessor for the inspector implementation.
    #[must_use]
    pub fn inspector(&self) -> &Arc<dyn DownloadInspector> {
        &self.inspector
    }

    /// Accessor for the engine implementation.
    #[must_use]
    pub fn engine(&self) -> &Arc<dyn DownloadEngine> {
        &self.engine
    }
}

/// State shared with every handler.
pub(crate) struct ApiState {
    pub(crate) handles: DownloadHandles,
    pub(crate) api_token: String,
}

impl ApiState {
    pub(crate) const fn new(handles: DownloadHandles, api_token: String) -> Self {
        Self { handles, api_token }
    }
}
