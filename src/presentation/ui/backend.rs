use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::application::services::PageRequest;
use crate::domain::entities::ImagePage;
use crate::domain::ports::GalleryPort;

#[derive(Debug)]
pub enum Action {
    PageLoaded {
        generation: u64,
        page: ImagePage,
    },
    PageLoadFailed {
        generation: u64,
        error: String,
    },
    ShowNotification(String),
}

#[derive(Debug)]
pub enum BackendCommand {
    LoadPage(PageRequest),
    /// Drops the in-flight fetch so its result never arrives.
    CancelPage,
}

/// Worker that runs listing fetches off the UI task. At most one fetch is in
/// flight; a new request replaces the previous one.
pub struct Backend {
    gallery: Arc<dyn GalleryPort>,
    command_rx: mpsc::UnboundedReceiver<BackendCommand>,
    action_tx: mpsc::UnboundedSender<Action>,
    in_flight: Option<JoinHandle<()>>,
}

impl Backend {
    pub fn new(
        gallery: Arc<dyn GalleryPort>,
        command_rx: mpsc::UnboundedReceiver<BackendCommand>,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> Self {
        Self {
            gallery,
            command_rx,
            action_tx,
            in_flight: None,
        }
    }

    pub async fn run(mut self) {
        info!("Backend worker started");
        while let Some(command) = self.command_rx.recv().await {
            self.handle_command(command);
        }
        self.abort_in_flight();
        info!("Backend worker stopped");
    }

    fn handle_command(&mut self, command: BackendCommand) {
        match command {
            BackendCommand::LoadPage(request) => {
                self.abort_in_flight();

                let gallery = self.gallery.clone();
                let action_tx = self.action_tx.clone();
                self.in_flight = Some(tokio::spawn(async move {
                    let PageRequest {
                        generation,
                        last_key,
                    } = request;
                    match gallery.fetch_page(last_key.clone()).await {
                        Ok(page) => {
                            debug!(
                                generation,
                                last_key = ?last_key,
                                count = page.images.len(),
                                has_more = page.has_more,
                                "Fetched page"
                            );
                            let _ = action_tx.send(Action::PageLoaded { generation, page });
                        }
                        Err(e) => {
                            if e.is_recoverable() {
                                warn!(generation, last_key = ?last_key, error = %e, "Failed to fetch page");
                            } else {
                                error!(generation, last_key = ?last_key, error = %e, "Failed to fetch page");
                            }
                            let _ = action_tx.send(Action::PageLoadFailed {
                                generation,
                                error: e.to_string(),
                            });
                        }
                    }
                }));
            }
            BackendCommand::CancelPage => self.abort_in_flight(),
        }
    }

    fn abort_in_flight(&mut self) {
        if let Some(handle) = self.in_flight.take()
            && !handle.is_finished()
        {
            debug!("Aborting in-flight page fetch");
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{CheckinMetadata, GalleryImage};
    use crate::domain::errors::GalleryError;
    use crate::domain::ports::mocks::MockGalleryPort;
    use std::time::Duration;

    fn spawn_backend(
        gallery: Arc<dyn GalleryPort>,
    ) -> (
        mpsc::UnboundedSender<BackendCommand>,
        mpsc::UnboundedReceiver<Action>,
    ) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        tokio::spawn(Backend::new(gallery, command_rx, action_tx).run());
        (command_tx, action_rx)
    }

    fn request(generation: u64, last_key: Option<&str>) -> PageRequest {
        PageRequest {
            generation,
            last_key: last_key.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_load_page_reports_page() {
        let mut gallery = MockGalleryPort::new();
        gallery
            .expect_fetch_page()
            .withf(|last_key| last_key.as_deref() == Some("a.jpg"))
            .times(1)
            .returning(|_| {
                Ok(ImagePage::new(
                    vec![GalleryImage::new(
                        "https://img/b.jpg",
                        "b.jpg",
                        CheckinMetadata::default(),
                    )],
                    true,
                ))
            });
        let (command_tx, mut action_rx) = spawn_backend(Arc::new(gallery));

        command_tx
            .send(BackendCommand::LoadPage(request(3, Some("a.jpg"))))
            .unwrap();

        match action_rx.recv().await {
            Some(Action::PageLoaded { generation, page }) => {
                assert_eq!(generation, 3);
                assert_eq!(page.last_key(), Some("b.jpg"));
                assert!(page.has_more);
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_load_page_reports_http_failure() {
        let mut gallery = MockGalleryPort::new();
        gallery
            .expect_fetch_page()
            .returning(|_| Err(GalleryError::http(500)));
        let (command_tx, mut action_rx) = spawn_backend(Arc::new(gallery));

        command_tx
            .send(BackendCommand::LoadPage(request(0, None)))
            .unwrap();

        match action_rx.recv().await {
            Some(Action::PageLoadFailed { generation, error }) => {
                assert_eq!(generation, 0);
                assert_eq!(error, "HTTP error! status: 500");
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    struct SlowGallery;

    #[async_trait::async_trait]
    impl GalleryPort for SlowGallery {
        async fn fetch_page(&self, _last_key: Option<String>) -> Result<ImagePage, GalleryError> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(ImagePage::new(Vec::new(), false))
        }
    }

    #[tokio::test]
    async fn test_cancel_drops_in_flight_fetch() {
        let (command_tx, mut action_rx) = spawn_backend(Arc::new(SlowGallery));

        command_tx
            .send(BackendCommand::LoadPage(request(0, None)))
            .unwrap();
        command_tx.send(BackendCommand::CancelPage).unwrap();

        let received = tokio::time::timeout(Duration::from_millis(400), action_rx.recv()).await;
        assert!(received.is_err(), "cancelled fetch still reported");
    }

    #[tokio::test]
    async fn test_new_request_replaces_previous() {
        let (command_tx, mut action_rx) = spawn_backend(Arc::new(SlowGallery));

        command_tx
            .send(BackendCommand::LoadPage(request(0, None)))
            .unwrap();
        command_tx
            .send(BackendCommand::LoadPage(request(1, None)))
            .unwrap();

        match action_rx.recv().await {
            Some(Action::PageLoaded { generation, .. }) => assert_eq!(generation, 1),
            other => panic!("unexpected action: {other:?}"),
        }
        let extra = tokio::time::timeout(Duration::from_millis(300), action_rx.recv()).await;
        assert!(extra.is_err());
    }
}
