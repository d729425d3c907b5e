//! Style service seam.
//!
//! Document widgets may ship a stylesheet; the runtime installs it for the
//! lifetime of the mount and uninstalls it on unmount. Installation is
//! best-effort: a failure is logged, never propagated, since content still
//! functions acceptably without extra styling.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use lectern_widget::StyleSheet;
use url::Url;

use crate::error::Result;

/// Installs and uninstalls stylesheet resources by URL.
///
/// Both operations are idempotent: installing an already-installed sheet or
/// uninstalling an already-absent one must succeed without effect.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Arc<dyn StyleService>`.
#[async_trait]
pub trait StyleService: Send + Sync {
    /// Install the stylesheet. A second install of the same URL must not
    /// double-insert.
    async fn install(&self, sheet: &StyleSheet) -> Result<()>;

    /// Uninstall the stylesheet. Uninstalling an absent URL is a no-op.
    async fn uninstall(&self, sheet: &StyleSheet) -> Result<()>;
}

/// In-memory style service tracking installed URLs.
#[derive(Debug, Default)]
pub struct StyleRegistry {
    installed: Mutex<HashSet<Url>>,
}

impl StyleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the given URL is currently installed.
    pub fn is_installed(&self, url: &Url) -> bool {
        self.installed.lock().unwrap().contains(url)
    }

    /// Number of installed sheets.
    pub fn installed_count(&self) -> usize {
        self.installed.lock().unwrap().len()
    }
}

#[async_trait]
impl StyleService for StyleRegistry {
    async fn install(&self, sheet: &StyleSheet) -> Result<()> {
        self.installed.lock().unwrap().insert(sheet.url.clone());
        Ok(())
    }

    async fn uninstall(&self, sheet: &StyleSheet) -> Result<()> {
        self.installed.lock().unwrap().remove(&sheet.url);
        Ok(())
    }
}
