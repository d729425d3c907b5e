//! Widget mount strategies.
//!
//! One strategy per widget kind, selected purely by [`WidgetValue::kind`]
//! through a dispatch table. Adding a widget kind means registering one
//! table entry; nothing inherits from anything.

pub mod canvas;
pub mod document;
pub mod frame;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use lectern_widget::{Config, Container, Viewport, WidgetKind, WidgetValue};

use crate::bridge::ChildToParent;
use crate::error::{Result, RuntimeError};
use crate::style::StyleService;

pub use canvas::CanvasStrategy;
pub use document::DocumentStrategy;
pub use frame::{ChannelConnector, FrameConnector, FrameStrategy};

/// Kind-specific logic for running one widget inside the container.
///
/// A strategy owns the live config/state snapshots of its widget. The
/// controller drives it through these hooks and never touches the widget
/// value directly.
///
/// `unmount` must be idempotent: the controller may call it defensively.
#[async_trait]
pub trait MountStrategy: Send {
    /// Instantiate the widget into the container.
    async fn mount(&mut self, container: &mut Container) -> Result<()>;

    /// Apply an externally supplied config change.
    async fn update_config(&mut self, container: &mut Container, config: &Config) -> Result<()>;

    /// Apply a viewport change.
    fn resize(&mut self, container: &mut Container, viewport: Viewport) -> Result<()>;

    /// Focus the widget at an anchor. Ignored by kinds without focus
    /// targeting.
    fn focus(&mut self, container: &mut Container, anchor: &str) -> Result<()> {
        let _ = (container, anchor);
        Ok(())
    }

    /// Process an inbound message from an embedded child page. Ignored by
    /// kinds without an embedding boundary.
    fn on_child_message(&mut self, message: ChildToParent) -> Result<()> {
        let _ = message;
        Ok(())
    }

    /// Tear the widget down and release its resources.
    async fn unmount(&mut self, container: &mut Container) -> Result<()>;
}

impl std::fmt::Debug for dyn MountStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MountStrategy")
    }
}

/// Capabilities the strategy factories close over.
pub struct StrategyDeps {
    /// Stylesheet installer for document widgets.
    pub styles: Arc<dyn StyleService>,
    /// Transport factory for frame widgets.
    pub connector: Arc<dyn FrameConnector>,
}

/// Factory building the strategy for one widget kind.
pub type StrategyFactory =
    Box<dyn Fn(WidgetValue, &StrategyDeps) -> Result<Box<dyn MountStrategy>> + Send + Sync>;

/// Dispatch table mapping widget kind to mount strategy.
///
/// A value whose kind has no entry is rejected with
/// [`RuntimeError::UnknownWidgetKind`] rather than guessed at.
pub struct StrategyTable {
    deps: StrategyDeps,
    entries: HashMap<WidgetKind, StrategyFactory>,
}

impl StrategyTable {
    /// Create an empty table.
    pub fn new(deps: StrategyDeps) -> Self {
        Self {
            deps,
            entries: HashMap::new(),
        }
    }

    /// Create a table with the three built-in kinds registered.
    pub fn with_defaults(deps: StrategyDeps) -> Self {
        let mut table = Self::new(deps);
        table.register(
            WidgetKind::Document,
            Box::new(|value, deps| match value {
                WidgetValue::Document(widget) => Ok(Box::new(DocumentStrategy::new(
                    widget,
                    deps.styles.clone(),
                ))),
                other => Err(RuntimeError::UnknownWidgetKind(other.kind().to_string())),
            }),
        );
        table.register(
            WidgetKind::Canvas,
            Box::new(|value, _| match value {
                WidgetValue::Canvas(widget) => Ok(Box::new(CanvasStrategy::new(widget))),
                other => Err(RuntimeError::UnknownWidgetKind(other.kind().to_string())),
            }),
        );
        table.register(
            WidgetKind::Frame,
            Box::new(|value, deps| match value {
                WidgetValue::Frame(widget) => {
                    let transport = deps.connector.connect(&widget);
                    Ok(Box::new(FrameStrategy::new(widget, transport)))
                }
                other => Err(RuntimeError::UnknownWidgetKind(other.kind().to_string())),
            }),
        );
        table
    }

    /// Register (or replace) the factory for a kind.
    pub fn register(&mut self, kind: WidgetKind, factory: StrategyFactory) {
        self.entries.insert(kind, factory);
    }

    /// Build the strategy for a resolved widget value.
    pub fn create(&self, value: WidgetValue) -> Result<Box<dyn MountStrategy>> {
        let kind = value.kind();
        let factory = self
            .entries
            .get(&kind)
            .ok_or_else(|| RuntimeError::UnknownWidgetKind(kind.to_string()))?;
        factory(value, &self.deps)
    }
}
