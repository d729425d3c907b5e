//! Mount strategy for canvas-kind widgets.

use async_trait::async_trait;

use lectern_widget::{
    CanvasContext, CanvasWidget, Config, Container, Projection, State, Surface, Viewport,
    WidgetKind,
};

use crate::error::{Result, RuntimeError};
use crate::mount::MountStrategy;

/// Runs a canvas widget against a drawing surface in the container.
///
/// Pure widgets are re-rendered from a fresh surface on every change.
/// Impure widgets hold device/buffer state on the surface across frames, so
/// the surface instance mounted at `mount` time is preserved and deltas are
/// passed through the render context. A `transform` projection additionally
/// turns resizes into a transform retarget with no re-render at all.
pub struct CanvasStrategy {
    widget: CanvasWidget,
    config: Config,
    state: State,
}

impl CanvasStrategy {
    /// Create the strategy for a resolved canvas widget.
    pub fn new(widget: CanvasWidget) -> Self {
        let config = widget.default_config.clone();
        let state = widget.initial_state.clone();
        Self {
            widget,
            config,
            state,
        }
    }

    fn render_onto(&self, surface: &mut Surface) {
        let mut ctx = CanvasContext {
            viewport: surface.viewport(),
            renderer: surface,
            config: &self.config,
            state: &self.state,
        };
        (self.widget.render)(&mut ctx);
    }

    fn mounted_surface<'a>(&self, container: &'a mut Container) -> Result<&'a mut Surface> {
        container
            .surface_mut()
            .ok_or_else(|| RuntimeError::mount(WidgetKind::Canvas, "no surface mounted"))
    }
}

#[async_trait]
impl MountStrategy for CanvasStrategy {
    async fn mount(&mut self, container: &mut Container) -> Result<()> {
        let mut surface = Surface::new(container.viewport());
        self.render_onto(&mut surface);
        container.set_surface(surface);
        Ok(())
    }

    async fn update_config(&mut self, container: &mut Container, config: &Config) -> Result<()> {
        self.config = config.clone();
        if self.widget.pure {
            // Referentially transparent: rebuild the frame from scratch.
            let mut surface = Surface::new(container.viewport());
            self.render_onto(&mut surface);
            container.set_surface(surface);
        } else {
            let surface = self.mounted_surface(container)?;
            self.render_onto(surface);
        }
        Ok(())
    }

    fn resize(&mut self, container: &mut Container, viewport: Viewport) -> Result<()> {
        if self.widget.pure {
            let mut surface = Surface::new(viewport);
            self.render_onto(&mut surface);
            container.set_surface(surface);
            return Ok(());
        }

        let surface = self.mounted_surface(container)?;
        match self.widget.proj {
            Projection::Transform => {
                surface.apply_viewport(viewport);
            }
            Projection::Redraw => {
                surface.set_viewport(viewport);
                self.render_onto(surface);
            }
        }
        Ok(())
    }

    async fn unmount(&mut self, container: &mut Container) -> Result<()> {
        container.clear_surface();
        Ok(())
    }
}
