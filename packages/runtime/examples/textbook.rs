//! Minimal textbook demonstrating the two most common widget kinds.
//!
//! 1. **A document section**: rendered inline from a render function.
//! 2. **An embedded mini-app**: a frame widget whose (faked) child page
//!    completes the bridge handshake and receives config pushes.
//!
//! The child page is played by this process: the channel connector keeps
//! the child-side receiver so we can read exactly what crossed the
//! embedding boundary.

use std::sync::Arc;

use serde_json::json;
use url::Url;

use lectern_runtime::{
    AppController, ChannelConnector, ChildToParent, ConfigChangeEvent, ControllerConfig,
    StaticModuleLoader, StrategyDeps, StrategyTable, StyleRegistry,
};
use lectern_widget::{
    Container, DocumentWidget, FrameWidget, RenderTree, SendFragment, Viewport, WidgetValue,
};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let supply_app = Url::parse("https://apps.example/supply-sim").unwrap();

    let mut loader = StaticModuleLoader::new();
    loader.register("/micro/intro", || {
        WidgetValue::Document(DocumentWidget::new(|_, _, config| {
            RenderTree::element("section")
                .attr("id", "intro")
                .child(RenderTree::text(format!(
                    "Welcome to microeconomics (edition {})",
                    config["edition"]
                )))
                .into()
        })
        .with_config(json!({ "edition": 3 })))
    });
    loader.register("/micro/supply-sim", {
        let supply_app = supply_app.clone();
        move || {
            WidgetValue::Frame(
                FrameWidget::new("Supply simulator", supply_app.clone())
                    .with_header(RenderTree::element("h2").child(RenderTree::text("Try it")).into())
                    .with_config(json!({ "slope": 1 }))
                    .with_normalise_send(|config| {
                        Box::new(std::iter::once(SendFragment::Set {
                            key: "slope".to_string(),
                            value: config["slope"].clone(),
                        }))
                    }),
            )
        }
    });

    let connector = Arc::new(ChannelConnector::new());
    let controller = AppController::new(
        ControllerConfig::default(),
        Container::new(Viewport::new(800, 600)),
        loader,
        StrategyTable::with_defaults(StrategyDeps {
            styles: Arc::new(StyleRegistry::new()),
            connector: connector.clone(),
        }),
    );
    let mut events = controller.events();

    // Read the intro section.
    controller.load_app("/micro/intro").await;
    println!(
        "intro content: {:?}",
        controller.container_snapshot().await.content()
    );

    // Navigate to the embedded simulator.
    controller.load_app("/micro/supply-sim").await;
    let mut child = connector.take_child_end(&supply_app).unwrap();

    // The child page finishes loading and signals readiness...
    controller.on_frame_message(ChildToParent::Ready).await;
    // ...and the user drags the slope slider in the config panel.
    controller
        .on_config_update(ConfigChangeEvent::new(json!({ "slope": 2 })))
        .await;

    println!("wire to child:");
    while let Ok(envelope) = child.try_recv() {
        println!("  {}", envelope);
    }

    println!("events:");
    while let Ok(event) = events.try_recv() {
        println!("  {:?}", event);
    }

    controller.shutdown().await;
}
