use arboard::Clipboard;
use tracing::{debug, error, warn};

/// Copies text to the system clipboard off the async runtime.
#[derive(Clone, Default)]
pub struct ClipboardService {}

impl ClipboardService {
    #[must_use]
    pub fn new() -> Self {
        Self {}
    }

    pub fn set_text(&self, text: impl Into<String>) {
        let text = text.into();
        tokio::task::spawn_blocking(move || match Clipboard::new() {
            Ok(mut cb) => match cb.set_text(text) {
                Ok(()) => debug!("Copied text to clipboard"),
                Err(e) => error!("Failed to set clipboard text: {}", e),
            },
            Err(e) => {
                warn!("Failed to initialize clipboard for copy: {}", e);
            }
        });
    }
}
