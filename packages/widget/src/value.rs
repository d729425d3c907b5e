//! Widget value contracts.
//!
//! A content module resolves to exactly one [`WidgetValue`], a closed
//! variant keyed by its kind. The runtime dispatches on the kind and must
//! never guess a shape for a kind it does not recognize.
//!
//! Every widget is parameterized by two independent values: `Config`
//! (externally supplied, e.g. from the config panel) and `State` (owned by
//! the widget and evolved by reducers private to the content module). The
//! runtime holds snapshots of both but only ever *forwards* config changes;
//! it never mutates widget state itself.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::canvas::{Surface, Viewport};
use crate::render::{RenderContext, RenderTree};

/// Externally supplied widget parameterization. Opaque to the runtime.
pub type Config = serde_json::Value;

/// Widget-owned internal state. Opaque to the runtime.
pub type State = serde_json::Value;

/// The kind discriminant of a widget value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    /// Inline-rendered document.
    Document,
    /// Embedded child page.
    Frame,
    /// Canvas-drawn diagram.
    Canvas,
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WidgetKind::Document => write!(f, "document"),
            WidgetKind::Frame => write!(f, "frame"),
            WidgetKind::Canvas => write!(f, "canvas"),
        }
    }
}

/// A stylesheet resource installed for a widget, identified by URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StyleSheet {
    /// Location of the stylesheet resource.
    pub url: Url,
}

impl StyleSheet {
    /// Create a stylesheet handle for the given URL.
    pub fn new(url: Url) -> Self {
        Self { url }
    }
}

/// One fragment of an outbound config update for an embedded child page.
///
/// Produced by a frame widget's `normalise_send` and forwarded over the
/// bridge one envelope per fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SendFragment {
    /// Set a single config key to a value.
    Set {
        key: String,
        value: serde_json::Value,
    },
}

/// Render function of a document widget: `(context, state, config)` to tree.
pub type RenderFn = Arc<dyn Fn(&RenderContext, &State, &Config) -> RenderTree + Send + Sync>;

/// Optional stylesheet producer of a document widget.
pub type CreateStyleFn = Arc<dyn Fn() -> StyleSheet + Send + Sync>;

/// Optional context producer of a document widget, invoked once at mount.
pub type CreateContextFn = Arc<dyn Fn() -> RenderContext + Send + Sync>;

/// Lazy producer of outbound config fragments for a frame widget.
///
/// The sequence may be lazily generated; the runtime drains it to
/// completion on every config update, so it is expected to be finite.
pub type NormaliseSendFn =
    Arc<dyn Fn(&Config) -> Box<dyn Iterator<Item = SendFragment> + Send> + Send + Sync>;

/// Side-effecting render procedure of a canvas widget.
pub type CanvasRenderFn = Arc<dyn Fn(&mut CanvasContext<'_>) + Send + Sync>;

/// An inline-rendered document widget.
#[derive(Clone)]
pub struct DocumentWidget {
    /// Pure projection from `(context, state, config)` to a render tree.
    pub render: RenderFn,

    /// Stylesheet to install for the lifetime of the mount, if any.
    pub create_style: Option<CreateStyleFn>,

    /// Render-context builder, invoked once at mount, if any.
    pub create_context: Option<CreateContextFn>,

    /// Config used until the first config update arrives.
    pub default_config: Config,

    /// State snapshot the widget starts from.
    pub initial_state: State,
}

impl DocumentWidget {
    /// Create a document widget from its render function.
    pub fn new(
        render: impl Fn(&RenderContext, &State, &Config) -> RenderTree + Send + Sync + 'static,
    ) -> Self {
        Self {
            render: Arc::new(render),
            create_style: None,
            create_context: None,
            default_config: Config::Null,
            initial_state: State::Null,
        }
    }

    /// Attach a stylesheet producer.
    pub fn with_style(mut self, create: impl Fn() -> StyleSheet + Send + Sync + 'static) -> Self {
        self.create_style = Some(Arc::new(create));
        self
    }

    /// Attach a render-context builder.
    pub fn with_context(
        mut self,
        create: impl Fn() -> RenderContext + Send + Sync + 'static,
    ) -> Self {
        self.create_context = Some(Arc::new(create));
        self
    }

    /// Set the default config.
    pub fn with_config(mut self, config: Config) -> Self {
        self.default_config = config;
        self
    }

    /// Set the initial state snapshot.
    pub fn with_state(mut self, state: State) -> Self {
        self.initial_state = state;
        self
    }
}

impl fmt::Debug for DocumentWidget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentWidget")
            .field("create_style", &self.create_style.is_some())
            .field("create_context", &self.create_context.is_some())
            .field("default_config", &self.default_config)
            .finish()
    }
}

/// A widget embedding a sandboxed child page.
#[derive(Clone)]
pub struct FrameWidget {
    /// Human-readable title for the embedded element.
    pub title: String,

    /// URL of the embedded page.
    pub path: Url,

    /// Header rendered into the container above the embedded page, if any.
    pub header: Option<RenderTree>,

    /// Incremental outbound config generator. When absent, config updates
    /// are sent as full snapshots.
    pub normalise_send: Option<NormaliseSendFn>,

    /// Config pushed to the child until the first config update arrives.
    pub default_config: Config,
}

impl FrameWidget {
    /// Create a frame widget for the given title and page URL.
    pub fn new(title: impl Into<String>, path: Url) -> Self {
        Self {
            title: title.into(),
            path,
            header: None,
            normalise_send: None,
            default_config: Config::Null,
        }
    }

    /// Attach a header render tree.
    pub fn with_header(mut self, header: RenderTree) -> Self {
        self.header = Some(header);
        self
    }

    /// Attach an incremental config generator.
    pub fn with_normalise_send(
        mut self,
        normalise: impl Fn(&Config) -> Box<dyn Iterator<Item = SendFragment> + Send>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.normalise_send = Some(Arc::new(normalise));
        self
    }

    /// Set the default config.
    pub fn with_config(mut self, config: Config) -> Self {
        self.default_config = config;
        self
    }
}

impl fmt::Debug for FrameWidget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameWidget")
            .field("title", &self.title)
            .field("path", &self.path.as_str())
            .field("header", &self.header.is_some())
            .field("normalise_send", &self.normalise_send.is_some())
            .finish()
    }
}

/// How viewport changes apply to a canvas widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// Viewport changes are applied as a transform on the existing surface;
    /// the widget is not re-rendered.
    Transform,
    /// Viewport changes re-invoke the render procedure.
    Redraw,
}

/// A canvas-drawn widget.
#[derive(Clone)]
pub struct CanvasWidget {
    /// Whether re-invoking `render` from scratch is referentially
    /// transparent. Impure widgets keep device/buffer state on the surface
    /// across frames, so the runtime must preserve the surface instance.
    pub pure: bool,

    /// How viewport changes apply.
    pub proj: Projection,

    /// Side-effecting draw procedure.
    pub render: CanvasRenderFn,

    /// Config used until the first config update arrives.
    pub default_config: Config,

    /// State snapshot the widget starts from.
    pub initial_state: State,
}

impl CanvasWidget {
    /// Create an impure, redraw-projected canvas widget.
    pub fn new(render: impl Fn(&mut CanvasContext<'_>) + Send + Sync + 'static) -> Self {
        Self {
            pure: false,
            proj: Projection::Redraw,
            render: Arc::new(render),
            default_config: Config::Null,
            initial_state: State::Null,
        }
    }

    /// Mark the render procedure as pure.
    pub fn pure(mut self) -> Self {
        self.pure = true;
        self
    }

    /// Set the viewport projection.
    pub fn with_projection(mut self, proj: Projection) -> Self {
        self.proj = proj;
        self
    }

    /// Set the default config.
    pub fn with_config(mut self, config: Config) -> Self {
        self.default_config = config;
        self
    }

    /// Set the initial state snapshot.
    pub fn with_state(mut self, state: State) -> Self {
        self.initial_state = state;
        self
    }
}

impl fmt::Debug for CanvasWidget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanvasWidget")
            .field("pure", &self.pure)
            .field("proj", &self.proj)
            .finish()
    }
}

/// Context handed to a canvas widget's render procedure.
pub struct CanvasContext<'a> {
    /// Current viewport.
    pub viewport: Viewport,

    /// The surface to draw into. For impure widgets this is the same
    /// instance across every invocation.
    pub renderer: &'a mut Surface,

    /// Current config snapshot.
    pub config: &'a Config,

    /// Current state snapshot.
    pub state: &'a State,
}

/// A widget value produced by a content module.
#[derive(Debug, Clone)]
pub enum WidgetValue {
    /// Inline-rendered document.
    Document(DocumentWidget),
    /// Embedded child page.
    Frame(FrameWidget),
    /// Canvas-drawn diagram.
    Canvas(CanvasWidget),
}

impl WidgetValue {
    /// The kind discriminant of this value.
    pub fn kind(&self) -> WidgetKind {
        match self {
            WidgetValue::Document(_) => WidgetKind::Document,
            WidgetValue::Frame(_) => WidgetKind::Frame,
            WidgetValue::Canvas(_) => WidgetKind::Canvas,
        }
    }
}
