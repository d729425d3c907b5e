//! End-to-end tests driving the application controller the way chrome
//! does: through load requests, global events and the event stream, with
//! the loader, style service and embedding boundary faked.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Notify;
use url::Url;

use lectern_runtime::{
    AppController, AppEvent, AppPhase, ChannelConnector, ChildToParent, ConfigChangeEvent,
    ControllerConfig, ModuleLoader, ParentToChild, Result, RuntimeError, StaticModuleLoader,
    StrategyDeps, StrategyTable, StyleRegistry, StyleService,
};
use lectern_widget::{
    Container, DocumentWidget, FrameWidget, RenderTree, SendFragment, StyleSheet, Viewport,
    WidgetValue,
};

type WidgetFactory = Box<dyn Fn() -> WidgetValue + Send + Sync>;

/// Loader whose resolutions block until the test releases them.
#[derive(Default)]
struct GatedLoader {
    modules: HashMap<String, (Arc<Notify>, WidgetFactory)>,
}

impl GatedLoader {
    fn register(
        &mut self,
        path: &str,
        factory: impl Fn() -> WidgetValue + Send + Sync + 'static,
    ) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.modules
            .insert(path.to_string(), (gate.clone(), Box::new(factory)));
        gate
    }
}

#[async_trait]
impl ModuleLoader for GatedLoader {
    async fn load_module(&self, path: &str) -> Result<WidgetValue> {
        match self.modules.get(path) {
            Some((gate, factory)) => {
                gate.notified().await;
                Ok(factory())
            }
            None => Err(RuntimeError::load(path, "module not registered")),
        }
    }
}

/// Style service counting install/uninstall calls.
#[derive(Default)]
struct CountingStyles {
    installs: AtomicUsize,
    uninstalls: AtomicUsize,
}

#[async_trait]
impl StyleService for CountingStyles {
    async fn install(&self, _sheet: &StyleSheet) -> Result<()> {
        self.installs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn uninstall(&self, _sheet: &StyleSheet) -> Result<()> {
        self.uninstalls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn deps_with(
    styles: Arc<dyn StyleService>,
    connector: Arc<ChannelConnector>,
) -> StrategyTable {
    StrategyTable::with_defaults(StrategyDeps { styles, connector })
}

fn new_controller<L: ModuleLoader>(loader: L, strategies: StrategyTable) -> AppController<L> {
    AppController::new(
        ControllerConfig::default(),
        Container::new(Viewport::new(800, 600)),
        loader,
        strategies,
    )
}

fn document(text: &'static str) -> WidgetValue {
    WidgetValue::Document(DocumentWidget::new(move |_, _, _| RenderTree::text(text)))
}

fn drain_wire(rx: &mut tokio::sync::mpsc::UnboundedReceiver<String>) -> Vec<ParentToChild> {
    std::iter::from_fn(|| rx.try_recv().ok())
        .map(|wire| serde_json::from_str(&wire).unwrap())
        .collect()
}

#[tokio::test]
async fn newer_load_supersedes_older_one() {
    let mut loader = GatedLoader::default();
    let gate_a = loader.register("/a", || document("A"));
    let gate_b = loader.register("/b", || document("B"));

    let connector = Arc::new(ChannelConnector::new());
    let controller = Arc::new(new_controller(
        loader,
        deps_with(Arc::new(StyleRegistry::new()), connector),
    ));
    let mut events = controller.events();

    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.load_app("/a").await }
    });
    // The second request must observably supersede the first.
    while controller.current_path().await != Some("/a".to_string()) {
        tokio::task::yield_now().await;
    }
    let second = tokio::spawn({
        let controller = controller.clone();
        async move { controller.load_app("/b").await }
    });
    while controller.current_path().await != Some("/b".to_string()) {
        tokio::task::yield_now().await;
    }

    // Resolve the newer load first and the stale one afterwards.
    gate_b.notify_one();
    second.await.unwrap();
    gate_a.notify_one();
    first.await.unwrap();

    // Only /b ever mounted; the stale /a resolution was discarded.
    assert_eq!(controller.phase().await, AppPhase::Running);
    assert_eq!(controller.current_path().await, Some("/b".to_string()));
    assert_eq!(
        controller.container_snapshot().await.content(),
        Some(&RenderTree::text("B"))
    );

    let mut loaded = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let AppEvent::Loaded { path } = event {
            loaded.push(path);
        }
    }
    assert_eq!(loaded, vec!["/b".to_string()]);
}

#[tokio::test]
async fn resize_and_config_in_initial_state_are_noops() {
    let controller = new_controller(
        StaticModuleLoader::new(),
        deps_with(
            Arc::new(StyleRegistry::new()),
            Arc::new(ChannelConnector::new()),
        ),
    );

    controller.on_resize(Viewport::new(1024, 768)).await;
    controller
        .on_config_update(ConfigChangeEvent::new(json!({ "x": 1 })))
        .await;
    controller.on_focus_toc_item("sec-1").await;

    assert_eq!(controller.phase().await, AppPhase::Initial);
    let container = controller.container_snapshot().await;
    assert!(container.is_empty());
    assert_eq!(container.focus_anchor(), None);
    // The viewport itself mirrors the layout box and is always recorded.
    assert_eq!(container.viewport(), Viewport::new(1024, 768));
}

#[tokio::test]
async fn style_installs_and_uninstalls_balance_across_app_switch() {
    let sheet_url = Url::parse("https://styles.example/ch1.css").unwrap();
    let mut loader = StaticModuleLoader::new();
    loader.register("/styled", {
        let sheet_url = sheet_url.clone();
        move || {
            let sheet_url = sheet_url.clone();
            WidgetValue::Document(
                DocumentWidget::new(|_, _, _| RenderTree::text("styled"))
                    .with_style(move || StyleSheet::new(sheet_url.clone())),
            )
        }
    });
    loader.register("/plain", || document("plain"));

    let styles = Arc::new(CountingStyles::default());
    let controller = new_controller(
        loader,
        deps_with(styles.clone(), Arc::new(ChannelConnector::new())),
    );

    controller.load_app("/styled").await;
    assert_eq!(styles.installs.load(Ordering::SeqCst), 1);
    assert_eq!(styles.uninstalls.load(Ordering::SeqCst), 0);

    // Switching apps unmounts the styled one; shutdown afterwards must not
    // uninstall a second time.
    controller.load_app("/plain").await;
    controller.shutdown().await;
    assert_eq!(styles.installs.load(Ordering::SeqCst), 1);
    assert_eq!(styles.uninstalls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn plain_document_mount_makes_no_style_calls() {
    let mut loader = StaticModuleLoader::new();
    loader.register("/plain", || document("plain"));

    let styles = Arc::new(CountingStyles::default());
    let controller = new_controller(
        loader,
        deps_with(styles.clone(), Arc::new(ChannelConnector::new())),
    );

    controller.load_app("/plain").await;
    assert_eq!(
        controller.container_snapshot().await.content(),
        Some(&RenderTree::text("plain"))
    );
    assert_eq!(styles.installs.load(Ordering::SeqCst), 0);
    assert_eq!(styles.uninstalls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn frame_app_end_to_end() {
    let src = Url::parse("https://apps.example/market").unwrap();
    let mut loader = StaticModuleLoader::new();
    loader.register("/market", {
        let src = src.clone();
        move || {
            WidgetValue::Frame(
                FrameWidget::new("Market sim", src.clone())
                    .with_config(json!({ "p": 5 }))
                    .with_normalise_send(|config| {
                        let fragments: Vec<SendFragment> = config
                            .as_object()
                            .map(|map| {
                                map.iter()
                                    .map(|(key, value)| SendFragment::Set {
                                        key: key.clone(),
                                        value: value.clone(),
                                    })
                                    .collect()
                            })
                            .unwrap_or_default();
                        Box::new(fragments.into_iter())
                    }),
            )
        }
    });

    let connector = Arc::new(ChannelConnector::new());
    let controller = new_controller(
        loader,
        deps_with(Arc::new(StyleRegistry::new()), connector.clone()),
    );

    controller.load_app("/market").await;
    assert_eq!(controller.phase().await, AppPhase::Running);
    let mut child = connector.take_child_end(&src).unwrap();

    // Nothing crosses the boundary before the child is ready.
    assert!(drain_wire(&mut child).is_empty());

    controller.on_frame_message(ChildToParent::Ready).await;
    assert_eq!(
        drain_wire(&mut child),
        vec![
            ParentToChild::Init,
            ParentToChild::PushRender {
                config: json!({ "p": 5 }),
                state: json!(null)
            },
        ]
    );

    controller
        .on_config_update(ConfigChangeEvent::new(json!({ "p": 7 })))
        .await;
    assert_eq!(
        drain_wire(&mut child),
        vec![ParentToChild::Config {
            config: json!({ "kind": "set", "key": "p", "value": 7 })
        }]
    );

    // Teardown closes the bridge; a config update afterwards reaches no one.
    controller.shutdown().await;
    controller
        .on_config_update(ConfigChangeEvent::new(json!({ "p": 8 })))
        .await;
    assert!(drain_wire(&mut child).is_empty());
    assert!(controller.container_snapshot().await.frame().is_none());
}

#[tokio::test]
async fn load_failure_emits_event_and_keeps_state_consistent() {
    let controller = new_controller(
        StaticModuleLoader::new(),
        deps_with(
            Arc::new(StyleRegistry::new()),
            Arc::new(ChannelConnector::new()),
        ),
    );
    let mut events = controller.events();

    controller.load_app("/nowhere").await;
    assert_eq!(controller.phase().await, AppPhase::Initial);

    assert_eq!(
        events.recv().await.unwrap(),
        AppEvent::LoadingStarted {
            path: "/nowhere".to_string()
        }
    );
    match events.recv().await.unwrap() {
        AppEvent::LoadFailed { path, reason } => {
            assert_eq!(path, "/nowhere");
            assert!(reason.contains("not registered"));
        }
        other => panic!("expected LoadFailed, got {:?}", other),
    }
}
