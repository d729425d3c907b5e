//! Mount strategy for document-kind widgets.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use lectern_widget::{
    Config, Container, DocumentWidget, RenderContext, State, StyleSheet, Viewport,
};

use crate::error::Result;
use crate::mount::MountStrategy;
use crate::style::StyleService;

/// Runs a document widget: installs its stylesheet, builds its render
/// context once, and reconciles its render output into the container.
///
/// The widget's `render` is expected to be referentially safe: every
/// update and resize simply re-invokes it and re-reconciles.
pub struct DocumentStrategy {
    widget: DocumentWidget,
    styles: Arc<dyn StyleService>,
    context: RenderContext,
    config: Config,
    state: State,
    installed: Option<StyleSheet>,
}

impl DocumentStrategy {
    /// Create the strategy for a resolved document widget.
    pub fn new(widget: DocumentWidget, styles: Arc<dyn StyleService>) -> Self {
        let config = widget.default_config.clone();
        let state = widget.initial_state.clone();
        Self {
            widget,
            styles,
            context: RenderContext::empty(),
            config,
            state,
            installed: None,
        }
    }

    fn render_into(&self, container: &mut Container) {
        let tree = (self.widget.render)(&self.context, &self.state, &self.config);
        container.set_content(tree);
    }
}

#[async_trait]
impl MountStrategy for DocumentStrategy {
    async fn mount(&mut self, container: &mut Container) -> Result<()> {
        if let Some(create_style) = &self.widget.create_style {
            let sheet = create_style();
            if let Err(e) = self.styles.install(&sheet).await {
                warn!(url = %sheet.url, error = %e, "stylesheet install failed");
            }
            // Tracked even after a failed install so unmount stays
            // balanced against the install attempt.
            self.installed = Some(sheet);
        }

        if let Some(create_context) = &self.widget.create_context {
            self.context = create_context();
        }

        self.render_into(container);
        Ok(())
    }

    async fn update_config(&mut self, container: &mut Container, config: &Config) -> Result<()> {
        self.config = config.clone();
        self.render_into(container);
        Ok(())
    }

    fn resize(&mut self, container: &mut Container, _viewport: Viewport) -> Result<()> {
        self.render_into(container);
        Ok(())
    }

    fn focus(&mut self, container: &mut Container, anchor: &str) -> Result<()> {
        container.set_focus_anchor(anchor);
        Ok(())
    }

    async fn unmount(&mut self, container: &mut Container) -> Result<()> {
        if let Some(sheet) = self.installed.take() {
            if let Err(e) = self.styles.uninstall(&sheet).await {
                warn!(url = %sheet.url, error = %e, "stylesheet uninstall failed");
            }
        }
        container.clear_content();
        Ok(())
    }
}
