//! Mount strategy for frame-kind widgets.

use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;
use url::Url;

use lectern_widget::{Config, Container, FrameElement, FrameWidget, State, Viewport};

use crate::bridge::{BridgeTransport, ChannelTransport, ChildToParent, FrameBridge, ParentToChild};
use crate::error::Result;
use crate::mount::MountStrategy;

/// Creates the parent end of the message channel for a frame about to be
/// embedded.
///
/// Injectable so the embedding boundary can be faked: tests hand the
/// strategy a transport whose receiving half they keep.
pub trait FrameConnector: Send + Sync {
    /// Open the outbound channel toward the child page of `widget`.
    fn connect(&self, widget: &FrameWidget) -> Box<dyn BridgeTransport>;
}

/// Connector backed by in-process channels.
///
/// Retains each child-side receiver keyed by page URL so the embedding
/// layer (or a test) can claim it and play the child.
#[derive(Default)]
pub struct ChannelConnector {
    ends: Mutex<Vec<(Url, mpsc::UnboundedReceiver<String>)>>,
}

impl ChannelConnector {
    /// Create a connector with no open channels.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the child-side receiver for the given page URL, if one was
    /// opened and not yet claimed.
    pub fn take_child_end(&self, src: &Url) -> Option<mpsc::UnboundedReceiver<String>> {
        let mut ends = self.ends.lock().unwrap();
        let index = ends.iter().position(|(url, _)| url == src)?;
        Some(ends.remove(index).1)
    }
}

impl FrameConnector for ChannelConnector {
    fn connect(&self, widget: &FrameWidget) -> Box<dyn BridgeTransport> {
        let (transport, rx) = ChannelTransport::pair();
        self.ends.lock().unwrap().push((widget.path.clone(), rx));
        Box::new(transport)
    }
}

/// Runs a frame widget: renders its header, embeds the child page and keeps
/// it configured over the bridge.
pub struct FrameStrategy {
    widget: FrameWidget,
    bridge: FrameBridge,
    config: Config,
    state: State,
}

impl FrameStrategy {
    /// Create the strategy for a resolved frame widget over an already
    /// connected transport.
    pub fn new(widget: FrameWidget, transport: Box<dyn BridgeTransport>) -> Self {
        let config = widget.default_config.clone();
        Self {
            widget,
            bridge: FrameBridge::new(transport),
            config,
            state: State::Null,
        }
    }

    /// The latest state the child reported, or `Null` before any report.
    pub fn reported_state(&self) -> &State {
        &self.state
    }
}

#[async_trait]
impl MountStrategy for FrameStrategy {
    async fn mount(&mut self, container: &mut Container) -> Result<()> {
        if let Some(header) = &self.widget.header {
            container.set_header(header.clone());
        }
        container.mount_frame(FrameElement {
            title: self.widget.title.clone(),
            src: self.widget.path.clone(),
        });

        // Queued until the child signals readiness; a stale snapshot is
        // coalesced away if config updates land before the handshake.
        self.bridge.send(ParentToChild::PushRender {
            config: self.config.clone(),
            state: self.state.clone(),
        })
    }

    async fn update_config(&mut self, _container: &mut Container, config: &Config) -> Result<()> {
        self.config = config.clone();
        match &self.widget.normalise_send {
            Some(normalise) => {
                for fragment in normalise(&self.config) {
                    let config = serde_json::to_value(&fragment)
                        .map_err(|e| crate::error::RuntimeError::Transport(e.to_string()))?;
                    self.bridge.send(ParentToChild::Config { config })?;
                }
                Ok(())
            }
            None => self.bridge.send(ParentToChild::PushRender {
                config: self.config.clone(),
                state: self.state.clone(),
            }),
        }
    }

    fn resize(&mut self, _container: &mut Container, _viewport: Viewport) -> Result<()> {
        // The child page owns its own layout.
        Ok(())
    }

    fn on_child_message(&mut self, message: ChildToParent) -> Result<()> {
        if let Some(state) = self.bridge.handle_child(message)? {
            self.state = state;
        }
        Ok(())
    }

    async fn unmount(&mut self, container: &mut Container) -> Result<()> {
        // Detach the bridge before destroying the embedded document so no
        // late message fires against a torn-down container.
        self.bridge.close();
        container.remove_frame();
        container.clear_header();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectern_widget::{RenderTree, SendFragment};
    use serde_json::json;

    fn widget(url: &str) -> FrameWidget {
        FrameWidget::new("Market sim", Url::parse(url).unwrap())
    }

    fn mounted(widget: FrameWidget) -> (FrameStrategy, mpsc::UnboundedReceiver<String>) {
        let connector = ChannelConnector::new();
        let src = widget.path.clone();
        let transport = connector.connect(&widget);
        let strategy = FrameStrategy::new(widget, transport);
        (strategy, connector.take_child_end(&src).unwrap())
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<ParentToChild> {
        std::iter::from_fn(|| rx.try_recv().ok())
            .map(|wire| serde_json::from_str(&wire).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn mount_embeds_frame_and_header() {
        let (mut strategy, _rx) = mounted(
            widget("https://apps.example/market").with_header(RenderTree::text("Market sim")),
        );
        let mut container = Container::default();

        strategy.mount(&mut container).await.unwrap();
        assert_eq!(container.header(), Some(&RenderTree::text("Market sim")));
        let frame = container.frame().unwrap();
        assert_eq!(frame.title, "Market sim");
        assert_eq!(frame.src.as_str(), "https://apps.example/market");
    }

    #[tokio::test]
    async fn handshake_delivers_initial_snapshot() {
        let (mut strategy, mut rx) =
            mounted(widget("https://apps.example/market").with_config(json!({ "p": 5 })));
        let mut container = Container::default();

        strategy.mount(&mut container).await.unwrap();
        assert!(drain(&mut rx).is_empty(), "nothing on the wire before ready");

        strategy.on_child_message(ChildToParent::Ready).unwrap();
        assert_eq!(
            drain(&mut rx),
            vec![
                ParentToChild::Init,
                ParentToChild::PushRender {
                    config: json!({ "p": 5 }),
                    state: json!(null)
                },
            ]
        );
    }

    #[tokio::test]
    async fn normalise_send_forwards_one_config_envelope_per_fragment() {
        let (mut strategy, mut rx) = mounted(
            widget("https://apps.example/market").with_normalise_send(|_config| {
                Box::new(std::iter::once(SendFragment::Set {
                    key: "k".to_string(),
                    value: json!(1),
                }))
            }),
        );
        let mut container = Container::default();
        strategy.mount(&mut container).await.unwrap();
        strategy.on_child_message(ChildToParent::Ready).unwrap();
        let _ = drain(&mut rx);

        strategy
            .update_config(&mut container, &json!({ "k": 1 }))
            .await
            .unwrap();
        assert_eq!(
            drain(&mut rx),
            vec![ParentToChild::Config {
                config: json!({ "kind": "set", "key": "k", "value": 1 })
            }]
        );
    }

    #[tokio::test]
    async fn without_normalise_send_updates_push_full_snapshot() {
        let (mut strategy, mut rx) = mounted(widget("https://apps.example/market"));
        let mut container = Container::default();
        strategy.mount(&mut container).await.unwrap();
        strategy.on_child_message(ChildToParent::Ready).unwrap();
        let _ = drain(&mut rx);

        strategy
            .on_child_message(ChildToParent::State {
                state: json!({ "q": 2 }),
            })
            .unwrap();
        strategy
            .update_config(&mut container, &json!({ "p": 9 }))
            .await
            .unwrap();
        assert_eq!(
            drain(&mut rx),
            vec![ParentToChild::PushRender {
                config: json!({ "p": 9 }),
                state: json!({ "q": 2 })
            }]
        );
    }

    #[tokio::test]
    async fn unmount_closes_bridge_before_removing_frame() {
        let (mut strategy, mut rx) = mounted(widget("https://apps.example/market"));
        let mut container = Container::default();
        strategy.mount(&mut container).await.unwrap();
        strategy.on_child_message(ChildToParent::Ready).unwrap();
        let _ = drain(&mut rx);

        strategy.unmount(&mut container).await.unwrap();
        assert!(container.frame().is_none());
        assert!(container.header().is_none());

        // Sends after teardown are silently dropped.
        strategy
            .update_config(&mut container, &json!({ "p": 1 }))
            .await
            .unwrap();
        assert!(drain(&mut rx).is_empty());

        // Second unmount is a no-op.
        strategy.unmount(&mut container).await.unwrap();
    }

    #[tokio::test]
    async fn child_state_report_updates_snapshot() {
        let (mut strategy, _rx) = mounted(widget("https://apps.example/market"));
        strategy
            .on_child_message(ChildToParent::State {
                state: json!({ "q": 11 }),
            })
            .unwrap();
        assert_eq!(strategy.reported_state(), &json!({ "q": 11 }));
    }
}
