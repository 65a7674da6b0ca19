use anyhow::{Context, Result};
use arboard::Clipboard;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// How long the "copied" indicator stays lit after a copy.
pub const COPIED_FLASH: Duration = Duration::from_secs(2);

pub struct PromptClipboard {
    clipboard: Clipboard,
}

impl PromptClipboard {
    pub fn new() -> Result<Self> {
        let clipboard = Clipboard::new().context("Failed to initialize clipboard")?;
        Ok(Self { clipboard })
    }

    /// Fire-and-forget write. A failed write is logged and swallowed; the
    /// caller's optimistic copied indicator is unaffected either way.
    pub fn copy(&mut self, text: &str) {
        match self.clipboard.set_text(text) {
            Ok(()) => debug!("Prompt copied to clipboard ({} characters)", text.len()),
            Err(err) => warn!("Failed to copy prompt to clipboard: {err}"),
        }
    }
}

/// Optimistic "copied" indicator that self-resets a fixed interval after the
/// most recent flash. The epoch guard keeps an older reset timer from
/// clearing a flash that was refreshed in the meantime.
#[derive(Clone, Default)]
pub struct CopiedFlag {
    inner: Arc<CopiedFlagInner>,
}

#[derive(Default)]
struct CopiedFlagInner {
    lit: AtomicBool,
    epoch: AtomicU64,
}

impl CopiedFlag {
    pub fn is_lit(&self) -> bool {
        self.inner.lit.load(Ordering::Acquire)
    }

    pub fn clear(&self) {
        self.inner.epoch.fetch_add(1, Ordering::AcqRel);
        self.inner.lit.store(false, Ordering::Release);
    }

    /// Lights the indicator and schedules it off after [`COPIED_FLASH`].
    pub fn flash(&self) {
        let epoch = self.inner.epoch.fetch_add(1, Ordering::AcqRel) + 1;
        self.inner.lit.store(true, Ordering::Release);

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(COPIED_FLASH).await;
            if inner.epoch.load(Ordering::Acquire) == epoch {
                inner.lit.store(false, Ordering::Release);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn flash_resets_after_exactly_one_interval() {
        let flag = CopiedFlag::default();
        assert!(!flag.is_lit());

        flag.flash();
        assert!(flag.is_lit());

        tokio::time::sleep(Duration::from_millis(1_999)).await;
        assert!(flag.is_lit());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(!flag.is_lit());
    }

    #[tokio::test(start_paused = true)]
    async fn refreshed_flash_extends_the_window() {
        let flag = CopiedFlag::default();
        flag.flash();

        tokio::time::sleep(Duration::from_millis(1_000)).await;
        flag.flash();

        // The first timer has expired by now, but the second flash owns the flag
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        assert!(flag.is_lit());

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(!flag.is_lit());
    }

    #[tokio::test(start_paused = true)]
    async fn clear_cancels_a_pending_reset() {
        let flag = CopiedFlag::default();
        flag.flash();
        flag.clear();
        assert!(!flag.is_lit());

        flag.flash();
        tokio::time::sleep(Duration::from_millis(1_000)).await;
        assert!(flag.is_lit());
    }
}
