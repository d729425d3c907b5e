//! # Lectern widget contracts
//!
//! Data-only contracts shared between content modules and the Lectern
//! runtime. A content module resolves to a [`WidgetValue`] - a closed
//! variant over the three widget kinds an interactive textbook renders:
//!
//! - **document**: an inline-rendered tree produced by a pure `render`
//!   function over `(context, state, config)`;
//! - **frame**: a sandboxed embedded child page, configured over a message
//!   bridge;
//! - **canvas**: an imperative diagram drawn into a [`Surface`].
//!
//! The runtime dispatches purely on [`WidgetValue::kind`]; content modules
//! never see the container or each other. The [`Container`] type models the
//! one DOM subtree the runtime owns and mutates on the modules' behalf.
//!
//! This crate has no async machinery and performs no I/O; everything here
//! is a plain value or a boxed pure function.

pub mod canvas;
pub mod container;
pub mod render;
pub mod value;

pub use canvas::{DrawOp, Surface, Transform, Viewport};
pub use container::{Container, FrameElement};
pub use render::{Element, RenderContext, RenderTree};
pub use value::{
    CanvasContext, CanvasWidget, Config, DocumentWidget, FrameWidget, Projection, SendFragment,
    State, StyleSheet, WidgetKind, WidgetValue,
};
