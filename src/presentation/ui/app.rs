//! Main application orchestrator.

use std::io::stdout;
use std::sync::Arc;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream};
use futures_util::StreamExt;
use ratatui::DefaultTerminal;
use ratatui::layout::Rect;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::domain::ports::GalleryPort;
use crate::infrastructure::{AppConfig, ClipboardService, ImageLoadedEvent, ImageLoader};
use crate::presentation::events::{EventResult, is_force_quit, key_press};
use crate::presentation::ui::backend::{Action, Backend, BackendCommand};
use crate::presentation::ui::{GalleryKeyResult, GalleryScreen, GalleryScreenState};
use crate::presentation::widgets::{StatusLevel, ThumbnailManager};

pub struct App {
    config: AppConfig,
    gallery: Arc<dyn GalleryPort>,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    command_tx: Option<mpsc::UnboundedSender<BackendCommand>>,
    image_loader: Option<Arc<ImageLoader>>,
    clipboard: ClipboardService,
}

impl App {
    #[must_use]
    pub fn new(config: AppConfig, gallery: Arc<dyn GalleryPort>) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        Self {
            config,
            gallery,
            action_tx,
            action_rx,
            command_tx: None,
            image_loader: None,
            clipboard: ClipboardService::new(),
        }
    }

    /// Runs the gallery until the user quits.
    ///
    /// # Errors
    /// Returns error if the terminal cannot be drawn or configured.
    pub async fn run(mut self, terminal: &mut DefaultTerminal) -> color_eyre::Result<()> {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let backend = Backend::new(self.gallery.clone(), command_rx, self.action_tx.clone());
        tokio::spawn(backend.run());
        self.command_tx = Some(command_tx);

        let (image_tx, mut image_rx) = mpsc::unbounded_channel();
        match ImageLoader::from_config(
            &self.config.images,
            self.config.disk_cache_bytes(),
            &image_tx,
        )
        .await
        {
            Ok(loader) => self.image_loader = Some(Arc::new(loader)),
            Err(e) => warn!(error = %e, "Image loader unavailable, thumbnails disabled"),
        }

        let mut screen = GalleryScreenState::new(&self.config.grid, ThumbnailManager::new());
        if let Some(request) = screen.start() {
            self.send(BackendCommand::LoadPage(request));
        }

        if self.config.mouse {
            crossterm::execute!(stdout(), EnableMouseCapture)?;
        }

        let result = self
            .run_event_loop(terminal, &mut screen, &mut image_rx)
            .await;

        if self.config.mouse {
            crossterm::execute!(stdout(), DisableMouseCapture)?;
        }

        if let Some(loader) = &self.image_loader {
            info!(stats = %loader.memory_cache_stats(), "Image memory cache at exit");
        }
        info!("Application exiting normally");
        result
    }

    async fn run_event_loop(
        &mut self,
        terminal: &mut DefaultTerminal,
        screen: &mut GalleryScreenState,
        image_rx: &mut mpsc::UnboundedReceiver<ImageLoadedEvent>,
    ) -> color_eyre::Result<()> {
        let mut terminal_events = EventStream::new();

        loop {
            let size = terminal.size()?;
            screen.update_layout(Rect::new(0, 0, size.width, size.height));
            self.request_visible(screen);
            terminal.draw(|frame| {
                frame.render_stateful_widget(GalleryScreen, frame.area(), screen);
            })?;

            tokio::select! {
                Some(action) = self.action_rx.recv() => {
                    self.handle_action(screen, action);
                }

                Some(event) = image_rx.recv() => {
                    screen.on_image_loaded(&event);
                }

                Some(Ok(event)) = terminal_events.next() => {
                    if self.handle_terminal_event(screen, event) == EventResult::Exit {
                        break;
                    }
                }

                else => break,
            }
        }

        Ok(())
    }

    /// Starts the page and image loads the current view needs.
    fn request_visible(&self, screen: &mut GalleryScreenState) {
        if let Some(request) = screen.next_page_request() {
            self.send(BackendCommand::LoadPage(request));
        }

        if let Some(loader) = &self.image_loader {
            for request in screen.take_abandoned_requests() {
                loader.cancel(request);
            }
            for request in screen.take_image_requests() {
                loader.load_async(request);
            }
        }
    }

    fn handle_terminal_event(&self, screen: &mut GalleryScreenState, event: Event) -> EventResult {
        match event {
            Event::Key(_) => {
                let Some(key) = key_press(&event) else {
                    return EventResult::Continue;
                };
                if is_force_quit(&key) {
                    return EventResult::Exit;
                }
                let result = screen.handle_key(key);
                self.apply(screen, result)
            }
            Event::Mouse(mouse) => {
                let result = screen.handle_mouse(&mouse);
                self.apply(screen, result)
            }
            Event::Resize(width, height) => {
                debug!(width, height, "Terminal resized");
                screen.on_resize();
                EventResult::Continue
            }
            _ => EventResult::Continue,
        }
    }

    fn handle_action(&self, screen: &mut GalleryScreenState, action: Action) {
        let result = match action {
            Action::PageLoaded { generation, page } => screen.on_page_loaded(generation, page),
            Action::PageLoadFailed { generation, error } => {
                screen.on_page_failed(generation, &error)
            }
            Action::ShowNotification(message) => {
                screen.set_notice(message, StatusLevel::Warning);
                GalleryKeyResult::Consumed
            }
        };
        self.apply(screen, result);
    }

    fn apply(&self, screen: &mut GalleryScreenState, result: GalleryKeyResult) -> EventResult {
        match result {
            GalleryKeyResult::Quit => return EventResult::Exit,
            GalleryKeyResult::LoadPage(request) => self.send(BackendCommand::LoadPage(request)),
            GalleryKeyResult::Reload(request) => {
                info!("Reloading gallery");
                self.send(BackendCommand::CancelPage);
                if let Some(loader) = &self.image_loader {
                    loader.cancel_all();
                }
                if let Some(request) = request {
                    self.send(BackendCommand::LoadPage(request));
                }
            }
            GalleryKeyResult::OpenExternal(url) => self.open_external(url),
            GalleryKeyResult::CopyUrl(url) => {
                self.clipboard.set_text(url);
                screen.set_notice("Copied image URL", StatusLevel::Success);
            }
            GalleryKeyResult::Consumed | GalleryKeyResult::Ignored => {}
        }
        EventResult::Continue
    }

    /// Opens the image in the system viewer, or the URL in the browser when
    /// images cannot be cached.
    fn open_external(&self, url: String) {
        let loader = self.image_loader.clone();
        let action_tx = self.action_tx.clone();
        tokio::spawn(async move {
            let opened = match loader {
                Some(loader) => match loader.export_for_viewing(&url).await {
                    Ok(path) => opener::open(&path).map_err(|e| e.to_string()),
                    Err(e) => Err(e.to_string()),
                },
                None => opener::open(&url).map_err(|e| e.to_string()),
            };
            if let Err(e) = opened {
                warn!(url = %url, error = %e, "Failed to open image externally");
                let _ = action_tx.send(Action::ShowNotification(format!(
                    "Could not open image: {e}"
                )));
            }
        });
    }

    fn send(&self, command: BackendCommand) {
        let Some(command_tx) = &self.command_tx else {
            warn!(?command, "Backend not running");
            return;
        };
        if let Err(e) = command_tx.send(command) {
            warn!(error = %e, "Failed to send backend command");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::mocks::MockGalleryPort;

    #[test]
    fn test_app_creation() {
        let app = App::new(AppConfig::default(), Arc::new(MockGalleryPort::new()));

        assert!(app.command_tx.is_none());
        assert!(app.image_loader.is_none());
    }

    #[tokio::test]
    async fn test_notification_action_reaches_status_line() {
        let app = App::new(AppConfig::default(), Arc::new(MockGalleryPort::new()));
        let mut screen =
            GalleryScreenState::new(&AppConfig::default().grid, ThumbnailManager::halfblocks());

        app.handle_action(
            &mut screen,
            Action::ShowNotification("Could not open image".to_string()),
        );

        let area = Rect::new(0, 0, 80, 20);
        let mut buf = ratatui::buffer::Buffer::empty(area);
        ratatui::widgets::StatefulWidget::render(GalleryScreen, area, &mut buf, &mut screen);
        let top: String = (0..area.width)
            .map(|x| buf[(x, 0)].symbol().to_string())
            .collect();
        assert!(top.contains("Could not open image"));
    }

    #[test]
    fn test_quit_result_exits() {
        let app = App::new(AppConfig::default(), Arc::new(MockGalleryPort::new()));
        let mut screen =
            GalleryScreenState::new(&AppConfig::default().grid, ThumbnailManager::halfblocks());

        assert_eq!(
            app.apply(&mut screen, GalleryKeyResult::Quit),
            EventResult::Exit
        );
        assert_eq!(
            app.apply(&mut screen, GalleryKeyResult::Consumed),
            EventResult::Continue
        );
    }
}
