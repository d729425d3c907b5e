//! # Lectern Runtime
//!
//! Lectern renders an interactive textbook: a navigable collection of
//! applications, each a self-contained unit of instructional content
//! expressed as one of three widget kinds (inline-rendered documents,
//! embedded child-page mini-apps, canvas-drawn diagrams). This crate is the
//! runtime that drives them.
//!
//! ## Core Concepts
//!
//! ### The Application Controller
//!
//! One [`AppController`] owns one chrome region: the container widgets
//! mount into, the lifecycle state of the application mounted there
//! (`initial` → `loading` → `running`), and an event stream the chrome
//! subscribes to. Chrome pushes events in - load requests, config changes,
//! resizes, table-of-contents focus - and the controller dispatches them to
//! the mounted widget.
//!
//! Loads are cancelled by supersession: issuing a new load while one is in
//! flight makes the newest request win, and a stale resolution is
//! discarded without ever mounting. The previously running application
//! stays visible until its replacement is ready, so switching sections
//! never flashes an empty container.
//!
//! ### Mount Strategies
//!
//! Each widget kind has one [`MountStrategy`] implementing {mount,
//! update_config, resize, unmount} for that kind. Strategies are selected
//! through a [`StrategyTable`] keyed by [`WidgetKind`]: supporting a new
//! kind means registering one entry. A value whose kind has no entry is
//! rejected, never guessed at.
//!
//! ### The Frame Bridge
//!
//! Frame-kind widgets host their content in a sandboxed child page. The
//! [`FrameBridge`] runs the typed message protocol across that boundary:
//! envelopes queue until the child signals readiness, then `init` is sent,
//! the queue is flushed with stale snapshots coalesced away, and further
//! sends go straight through. Closing the bridge detaches it before the
//! embedded document is destroyed; late sends are silently dropped.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use lectern_runtime::{
//!     AppController, ChannelConnector, ControllerConfig, StaticModuleLoader,
//!     StrategyDeps, StrategyTable, StyleRegistry,
//! };
//! use lectern_widget::{Container, DocumentWidget, RenderTree, Viewport, WidgetValue};
//!
//! let mut loader = StaticModuleLoader::new();
//! loader.register("/micro/supply", || {
//!     WidgetValue::Document(DocumentWidget::new(|_, _, _| {
//!         RenderTree::element("section").child(RenderTree::text("Supply")).into()
//!     }))
//! });
//!
//! let deps = StrategyDeps {
//!     styles: Arc::new(StyleRegistry::new()),
//!     connector: Arc::new(ChannelConnector::new()),
//! };
//! let controller = AppController::new(
//!     ControllerConfig::default(),
//!     Container::new(Viewport::new(800, 600)),
//!     loader,
//!     StrategyTable::with_defaults(deps),
//! );
//!
//! // controller.load_app("/micro/supply").await;
//! ```

pub mod bridge;
pub mod controller;
pub mod error;
pub mod events;
pub mod loader;
pub mod mount;
pub mod style;

pub use bridge::{BridgeTransport, ChannelTransport, ChildToParent, FrameBridge, ParentToChild};
pub use controller::{AppController, AppId, AppPhase, ControllerConfig};
pub use error::{Result, RuntimeError};
pub use events::{AppEvent, ConfigChangeEvent, EventBus};
pub use loader::{ModuleLoader, StaticModuleLoader};
pub use mount::{
    CanvasStrategy, ChannelConnector, DocumentStrategy, FrameConnector, FrameStrategy,
    MountStrategy, StrategyDeps, StrategyTable,
};
pub use style::{StyleRegistry, StyleService};

// Re-exported for downstream signatures; widgets and the container live in
// the contracts crate.
pub use lectern_widget::WidgetKind;
