//! Module loader seam.
//!
//! Content modules are external collaborators: given a textbook path, the
//! loader asynchronously resolves the widget value that module exports.
//! Latency and transport are the loader's concern; the controller only
//! awaits and reports failure.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use lectern_widget::WidgetValue;

use crate::error::{Result, RuntimeError};

/// Resolves a content-module path to the widget value it exports.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Box<dyn ModuleLoader>`.
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    /// Resolve the module at `path`.
    ///
    /// A rejected resolution surfaces as [`RuntimeError::LoadFailure`].
    async fn load_module(&self, path: &str) -> Result<WidgetValue>;
}

/// Factory producing a fresh widget value for each load.
pub type WidgetFactory = Arc<dyn Fn() -> WidgetValue + Send + Sync>;

/// A loader over a static registry of content modules.
///
/// The textbook build registers every section's module up front; loads
/// resolve immediately from the registry. Factories run per load, so each
/// mount gets a fresh widget value.
#[derive(Default)]
pub struct StaticModuleLoader {
    modules: HashMap<String, WidgetFactory>,
}

impl StaticModuleLoader {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the module at `path`, replacing any previous registration.
    pub fn register(
        &mut self,
        path: impl Into<String>,
        factory: impl Fn() -> WidgetValue + Send + Sync + 'static,
    ) {
        self.modules.insert(path.into(), Arc::new(factory));
    }

    /// Number of registered modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

#[async_trait]
impl ModuleLoader for StaticModuleLoader {
    async fn load_module(&self, path: &str) -> Result<WidgetValue> {
        match self.modules.get(path) {
            Some(factory) => Ok(factory()),
            None => Err(RuntimeError::load(path, "module not registered")),
        }
    }
}
