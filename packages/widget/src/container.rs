//! The container element a widget is mounted into.
//!
//! The container is the only DOM-like subtree the runtime mutates. It is
//! owned exclusively by the application controller; mount strategies receive
//! a mutable borrow for the duration of one operation. It is `Clone` so the
//! controller can hand out consistent snapshots for inspection.

use url::Url;

use crate::canvas::{Surface, Viewport};
use crate::render::RenderTree;

/// The embedded child-page element of a mounted frame widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameElement {
    /// Title of the embedded element.
    pub title: String,
    /// Source URL of the child page.
    pub src: Url,
}

/// The shared container a widget mounts into.
///
/// Each slot corresponds to one thing a mount strategy may place: document
/// content, a frame header, a canvas surface, an embedded frame element.
/// An unmounted container has every slot empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Container {
    viewport: Viewport,
    content: Option<RenderTree>,
    header: Option<RenderTree>,
    surface: Option<Surface>,
    frame: Option<FrameElement>,
    focus_anchor: Option<String>,
}

impl Container {
    /// Create an empty container sized to the given viewport.
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    /// The container's current layout size.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Record a new layout size.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// The reconciled document content, if any.
    pub fn content(&self) -> Option<&RenderTree> {
        self.content.as_ref()
    }

    /// Reconcile a render tree into the content slot.
    pub fn set_content(&mut self, tree: RenderTree) {
        self.content = Some(tree);
    }

    /// Clear the content slot and any focus anchor into it.
    pub fn clear_content(&mut self) {
        self.content = None;
        self.focus_anchor = None;
    }

    /// The frame header, if any.
    pub fn header(&self) -> Option<&RenderTree> {
        self.header.as_ref()
    }

    /// Render a header tree above the embedded frame.
    pub fn set_header(&mut self, tree: RenderTree) {
        self.header = Some(tree);
    }

    /// Remove the frame header.
    pub fn clear_header(&mut self) {
        self.header = None;
    }

    /// The mounted canvas surface, if any.
    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    /// Mutable access to the mounted canvas surface.
    pub fn surface_mut(&mut self) -> Option<&mut Surface> {
        self.surface.as_mut()
    }

    /// Mount a canvas surface.
    pub fn set_surface(&mut self, surface: Surface) {
        self.surface = Some(surface);
    }

    /// Remove the canvas surface.
    pub fn clear_surface(&mut self) {
        self.surface = None;
    }

    /// The embedded frame element, if any.
    pub fn frame(&self) -> Option<&FrameElement> {
        self.frame.as_ref()
    }

    /// Insert an embedded frame element.
    pub fn mount_frame(&mut self, frame: FrameElement) {
        self.frame = Some(frame);
    }

    /// Remove the embedded frame element.
    pub fn remove_frame(&mut self) {
        self.frame = None;
    }

    /// The anchor currently focused, if any.
    pub fn focus_anchor(&self) -> Option<&str> {
        self.focus_anchor.as_deref()
    }

    /// Scroll/focus the content at the given anchor.
    pub fn set_focus_anchor(&mut self, anchor: impl Into<String>) {
        self.focus_anchor = Some(anchor.into());
    }

    /// Whether every mounted slot is empty.
    pub fn is_empty(&self) -> bool {
        self.content.is_none()
            && self.header.is_none()
            && self.surface.is_none()
            && self.frame.is_none()
    }

    /// Empty every slot, keeping the recorded viewport.
    pub fn clear(&mut self) {
        self.content = None;
        self.header = None;
        self.surface = None;
        self.frame = None;
        self.focus_anchor = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_container_is_empty() {
        let container = Container::new(Viewport::new(800, 600));
        assert!(container.is_empty());
        assert_eq!(container.viewport(), Viewport::new(800, 600));
    }

    #[test]
    fn clear_keeps_viewport() {
        let mut container = Container::new(Viewport::new(800, 600));
        container.set_content(RenderTree::text("body"));
        container.set_focus_anchor("sec-2");
        container.clear();
        assert!(container.is_empty());
        assert_eq!(container.focus_anchor(), None);
        assert_eq!(container.viewport(), Viewport::new(800, 600));
    }

    #[test]
    fn clear_content_drops_focus() {
        let mut container = Container::default();
        container.set_content(RenderTree::text("body"));
        container.set_focus_anchor("intro");
        assert_eq!(container.focus_anchor(), Some("intro"));

        container.clear_content();
        assert_eq!(container.content(), None);
        assert_eq!(container.focus_anchor(), None);
    }

    #[test]
    fn frame_slot_roundtrip() {
        let mut container = Container::default();
        container.mount_frame(FrameElement {
            title: "Elasticity".to_string(),
            src: Url::parse("https://apps.example/elasticity").unwrap(),
        });
        assert!(container.frame().is_some());
        container.remove_frame();
        assert!(container.frame().is_none());
    }
}
