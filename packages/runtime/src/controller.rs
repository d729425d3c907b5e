//! The application controller.
//!
//! One controller owns one chrome region: its container, the state of the
//! application mounted there, and the event stream the surrounding chrome
//! observes. It is an explicit owned object, never a module-level
//! singleton, so multiple regions (and tests) stay independent.
//!
//! All access is serialized through a single async mutex; the only
//! suspension points are the module loader's resolution and the mount
//! hooks. Loads are cancelled by supersession, not tokens: every
//! `load_app` bumps a generation counter, and a resolution whose
//! generation is no longer current is discarded without mounting.

use std::fmt;
use std::mem;

use tokio::sync::{broadcast, Mutex};
use tracing::{debug, trace, warn};
use uuid::Uuid;

use lectern_widget::{Container, Viewport, WidgetKind};

use crate::bridge::ChildToParent;
use crate::error::RuntimeError;
use crate::events::{AppEvent, ConfigChangeEvent, EventBus};
use crate::loader::ModuleLoader;
use crate::mount::{MountStrategy, StrategyTable};

/// Unique identifier for one mounted application instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AppId(Uuid);

impl AppId {
    /// Create a new random AppId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the inner UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for AppId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Configuration for an application controller.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Events retained per lagging subscriber before the oldest drop.
    pub event_capacity: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self { event_capacity: 64 }
    }
}

/// A mounted application: the widget's live strategy plus its identity.
struct AppRunner {
    id: AppId,
    path: String,
    kind: WidgetKind,
    strategy: Box<dyn MountStrategy>,
}

enum AppState {
    /// No application loaded.
    Initial,
    /// A load is in flight. The previously running application, if any,
    /// stays mounted until the replacement is ready.
    Loading {
        path: String,
        previous: Option<AppRunner>,
    },
    /// An application is mounted and live.
    Running(AppRunner),
}

/// Observable lifecycle phase of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppPhase {
    Initial,
    Loading,
    Running,
}

struct Inner {
    state: AppState,
    container: Container,
    generation: u64,
}

/// The top-level orchestrator for one chrome region.
///
/// Receives external events (load request, config change, resize,
/// toc-focus, child messages), dispatches them to the active mount
/// strategy, and reports lifecycle changes on its event stream. Load and
/// mount failures never surface as `Err` from these methods; they are
/// emitted as [`AppEvent::LoadFailed`].
pub struct AppController<L> {
    loader: L,
    strategies: StrategyTable,
    inner: Mutex<Inner>,
    events: EventBus,
}

impl<L: ModuleLoader> AppController<L> {
    /// Create a controller for an (empty) container.
    pub fn new(
        config: ControllerConfig,
        container: Container,
        loader: L,
        strategies: StrategyTable,
    ) -> Self {
        Self {
            loader,
            strategies,
            inner: Mutex::new(Inner {
                state: AppState::Initial,
                container,
                generation: 0,
            }),
            events: EventBus::new(config.event_capacity),
        }
    }

    /// Subscribe to lifecycle events emitted after this call.
    pub fn events(&self) -> broadcast::Receiver<AppEvent> {
        self.events.subscribe()
    }

    /// Load and mount the application at `path`.
    ///
    /// Supersedes any load already in flight: whichever call is newest
    /// wins, and a stale resolution is discarded without mounting. The
    /// previously running application stays visually mounted until its
    /// replacement has mounted.
    pub async fn load_app(&self, path: &str) {
        let generation = {
            let mut inner = self.inner.lock().await;
            inner.generation += 1;
            let previous = match mem::replace(&mut inner.state, AppState::Initial) {
                AppState::Running(runner) => Some(runner),
                AppState::Loading { previous, .. } => previous,
                AppState::Initial => None,
            };
            inner.state = AppState::Loading {
                path: path.to_string(),
                previous,
            };
            inner.generation
        };
        self.events.emit(AppEvent::LoadingStarted {
            path: path.to_string(),
        });

        // Lock released while the loader resolves, so a newer load_app can
        // run to completion in the meantime.
        let resolved = self.loader.load_module(path).await;

        let mut inner = self.inner.lock().await;
        if inner.generation != generation {
            trace!(path, "stale load superseded, discarding result");
            return;
        }
        let previous = match mem::replace(&mut inner.state, AppState::Initial) {
            AppState::Loading { previous, .. } => previous,
            other => {
                inner.state = other;
                return;
            }
        };

        let value = match resolved {
            Ok(value) => value,
            Err(error) => {
                self.fail_load(&mut inner, path, previous, error);
                return;
            }
        };

        let kind = value.kind();
        let mut strategy = match self.strategies.create(value) {
            Ok(strategy) => strategy,
            Err(error) => {
                self.fail_load(&mut inner, path, previous, error);
                return;
            }
        };

        // The replacement is ready; only now tear down the old app.
        if let Some(mut prev) = previous {
            if let Err(error) = prev.strategy.unmount(&mut inner.container).await {
                warn!(path = %prev.path, %error, "unmount of previous application failed");
            }
        }

        match strategy.mount(&mut inner.container).await {
            Ok(()) => {
                let runner = AppRunner {
                    id: AppId::new(),
                    path: path.to_string(),
                    kind,
                    strategy,
                };
                debug!(path, %kind, id = %runner.id, "application mounted");
                inner.state = AppState::Running(runner);
                self.events.emit(AppEvent::Loaded {
                    path: path.to_string(),
                });
            }
            Err(error) => {
                // The previous app is already gone; leave a clean slate.
                warn!(path, %error, "mount failed");
                inner.container.clear();
                inner.state = AppState::Initial;
                self.events.emit(AppEvent::LoadFailed {
                    path: path.to_string(),
                    reason: error.to_string(),
                });
            }
        }
    }

    /// Forward a viewport change to the running application.
    ///
    /// The new size is always recorded on the container; with nothing
    /// running there is nothing else to do.
    pub async fn on_resize(&self, viewport: Viewport) {
        let mut inner = self.inner.lock().await;
        inner.container.set_viewport(viewport);
        let Inner {
            state, container, ..
        } = &mut *inner;
        match state {
            AppState::Running(runner) => {
                if let Err(error) = runner.strategy.resize(container, viewport) {
                    warn!(path = %runner.path, %error, "resize failed");
                }
            }
            _ => trace!("resize with no running application"),
        }
    }

    /// Forward a config change to the running application.
    ///
    /// Dropped (with a log line) when nothing is running.
    pub async fn on_config_update(&self, event: ConfigChangeEvent) {
        let mut inner = self.inner.lock().await;
        let Inner {
            state, container, ..
        } = &mut *inner;
        match state {
            AppState::Running(runner) => {
                if let Err(error) = runner.strategy.update_config(container, &event.config).await {
                    warn!(path = %runner.path, %error, "config update failed");
                }
            }
            _ => debug!("config update dropped; no application running"),
        }
    }

    /// Focus the running application at a table-of-contents anchor.
    ///
    /// Ignored when nothing is running or the widget kind has no focus
    /// targeting.
    pub async fn on_focus_toc_item(&self, anchor: &str) {
        let mut inner = self.inner.lock().await;
        let Inner {
            state, container, ..
        } = &mut *inner;
        if let AppState::Running(runner) = state {
            if let Err(error) = runner.strategy.focus(container, anchor) {
                warn!(path = %runner.path, %error, "focus failed");
            }
        }
    }

    /// Deliver a message from an embedded child page to the running
    /// application.
    pub async fn on_frame_message(&self, message: ChildToParent) {
        let mut inner = self.inner.lock().await;
        match &mut inner.state {
            AppState::Running(runner) => {
                if let Err(error) = runner.strategy.on_child_message(message) {
                    warn!(path = %runner.path, %error, "child message handling failed");
                }
            }
            _ => debug!("child message dropped; no application running"),
        }
    }

    /// Tear the controller down: unmount whatever is mounted and supersede
    /// any load still in flight.
    pub async fn shutdown(&self) {
        let mut inner = self.inner.lock().await;
        inner.generation += 1;
        let runner = match mem::replace(&mut inner.state, AppState::Initial) {
            AppState::Running(runner) => Some(runner),
            AppState::Loading { previous, .. } => previous,
            AppState::Initial => None,
        };
        if let Some(mut runner) = runner {
            if let Err(error) = runner.strategy.unmount(&mut inner.container).await {
                warn!(path = %runner.path, %error, "unmount during shutdown failed");
            }
        }
        inner.container.clear();
    }

    /// The controller's current lifecycle phase.
    pub async fn phase(&self) -> AppPhase {
        match self.inner.lock().await.state {
            AppState::Initial => AppPhase::Initial,
            AppState::Loading { .. } => AppPhase::Loading,
            AppState::Running(_) => AppPhase::Running,
        }
    }

    /// The widget kind of the running application, if any.
    pub async fn current_kind(&self) -> Option<WidgetKind> {
        match &self.inner.lock().await.state {
            AppState::Running(runner) => Some(runner.kind),
            _ => None,
        }
    }

    /// The path of the running (or in-flight) application, if any.
    pub async fn current_path(&self) -> Option<String> {
        match &self.inner.lock().await.state {
            AppState::Initial => None,
            AppState::Loading { path, .. } => Some(path.clone()),
            AppState::Running(runner) => Some(runner.path.clone()),
        }
    }

    /// A consistent snapshot of the container for inspection.
    pub async fn container_snapshot(&self) -> Container {
        self.inner.lock().await.container.clone()
    }

    fn fail_load(
        &self,
        inner: &mut Inner,
        path: &str,
        previous: Option<AppRunner>,
        error: RuntimeError,
    ) {
        warn!(path, %error, "load failed");
        // The old app never stopped being mounted; keep it running.
        inner.state = match previous {
            Some(runner) => AppState::Running(runner),
            None => AppState::Initial,
        };
        self.events.emit(AppEvent::LoadFailed {
            path: path.to_string(),
            reason: error.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::StaticModuleLoader;
    use crate::mount::{ChannelConnector, StrategyDeps};
    use crate::style::StyleRegistry;
    use lectern_widget::{DocumentWidget, RenderTree, WidgetValue};
    use std::sync::Arc;

    fn controller(loader: StaticModuleLoader) -> AppController<StaticModuleLoader> {
        let deps = StrategyDeps {
            styles: Arc::new(StyleRegistry::new()),
            connector: Arc::new(ChannelConnector::new()),
        };
        AppController::new(
            ControllerConfig::default(),
            Container::new(Viewport::new(800, 600)),
            loader,
            StrategyTable::with_defaults(deps),
        )
    }

    #[tokio::test]
    async fn starts_in_initial_phase() {
        let controller = controller(StaticModuleLoader::new());
        assert_eq!(controller.phase().await, AppPhase::Initial);
        assert_eq!(controller.current_path().await, None);
    }

    #[tokio::test]
    async fn load_and_run_document() {
        let mut loader = StaticModuleLoader::new();
        loader.register("/intro", || {
            WidgetValue::Document(DocumentWidget::new(|_, _, _| RenderTree::text("intro")))
        });
        let controller = controller(loader);

        controller.load_app("/intro").await;
        assert_eq!(controller.phase().await, AppPhase::Running);
        assert_eq!(controller.current_kind().await, Some(WidgetKind::Document));
        assert_eq!(controller.current_path().await, Some("/intro".to_string()));
        assert_eq!(
            controller.container_snapshot().await.content(),
            Some(&RenderTree::text("intro"))
        );
    }

    #[tokio::test]
    async fn failed_load_with_nothing_running_falls_back_to_initial() {
        let controller = controller(StaticModuleLoader::new());
        let mut events = controller.events();

        controller.load_app("/missing").await;
        assert_eq!(controller.phase().await, AppPhase::Initial);

        assert!(matches!(
            events.recv().await.unwrap(),
            AppEvent::LoadingStarted { .. }
        ));
        assert!(matches!(
            events.recv().await.unwrap(),
            AppEvent::LoadFailed { .. }
        ));
    }

    #[tokio::test]
    async fn failed_load_keeps_previous_app_running() {
        let mut loader = StaticModuleLoader::new();
        loader.register("/intro", || {
            WidgetValue::Document(DocumentWidget::new(|_, _, _| RenderTree::text("intro")))
        });
        let controller = controller(loader);

        controller.load_app("/intro").await;
        controller.load_app("/missing").await;

        assert_eq!(controller.phase().await, AppPhase::Running);
        assert_eq!(controller.current_path().await, Some("/intro".to_string()));
        assert_eq!(
            controller.container_snapshot().await.content(),
            Some(&RenderTree::text("intro"))
        );
    }

    #[tokio::test]
    async fn shutdown_unmounts_and_resets() {
        let mut loader = StaticModuleLoader::new();
        loader.register("/intro", || {
            WidgetValue::Document(DocumentWidget::new(|_, _, _| RenderTree::text("intro")))
        });
        let controller = controller(loader);

        controller.load_app("/intro").await;
        controller.shutdown().await;
        assert_eq!(controller.phase().await, AppPhase::Initial);
        assert!(controller.container_snapshot().await.is_empty());

        // Shutdown with nothing mounted is harmless.
        controller.shutdown().await;
    }
}
