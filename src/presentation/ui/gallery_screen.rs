//! The gallery screen: status line, thumbnail grid, key footer, and the
//! viewer overlay.

use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    widgets::{StatefulWidget, Widget},
};
use tracing::debug;

use crate::application::services::{ImageFeed, PageOutcome, PageRequest, Viewer, ViewerMove};
use crate::domain::entities::ImagePage;
use crate::domain::keybinding::{
    Action, Keybind, grid_action, grid_keybinds, viewer_action, viewer_keybinds,
};
use crate::infrastructure::config::GridConfig;
use crate::infrastructure::image::{ImageLoadedEvent, ImageRequest};
use crate::presentation::events::{PointerGesture, SwipeTracker};
use crate::presentation::widgets::{
    FooterBar, GridLayout, GridViewState, ImageGrid, ImageModal, StatusBar, StatusLevel,
    ThumbnailManager, ViewMode,
};

/// What the app has to do after the screen handled an input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryKeyResult {
    Consumed,
    Ignored,
    Quit,
    LoadPage(PageRequest),
    /// Drop outstanding work and start over, optionally with a first fetch.
    Reload(Option<PageRequest>),
    OpenExternal(String),
    CopyUrl(String),
}

pub struct GalleryScreenState {
    feed: ImageFeed,
    viewer: Viewer,
    thumbnails: ThumbnailManager,
    view: GridViewState,
    layout: GridLayout,
    screen_area: Rect,
    grid_area: Rect,
    min_card_width: u16,
    show_captions: bool,
    swipe: SwipeTracker,
    notice: Option<(String, StatusLevel)>,
    grid_keybinds: Vec<Keybind>,
    viewer_keybinds: Vec<Keybind>,
}

impl GalleryScreenState {
    #[must_use]
    pub fn new(grid: &GridConfig, thumbnails: ThumbnailManager) -> Self {
        Self {
            feed: ImageFeed::with_threshold(grid.load_threshold),
            viewer: Viewer::new(),
            thumbnails,
            view: GridViewState::default(),
            layout: GridLayout::compute(0, grid.min_card_width, grid.show_captions),
            screen_area: Rect::default(),
            grid_area: Rect::default(),
            min_card_width: grid.min_card_width,
            show_captions: grid.show_captions,
            swipe: SwipeTracker::new(),
            notice: None,
            grid_keybinds: grid_keybinds(),
            viewer_keybinds: viewer_keybinds(),
        }
    }

    #[must_use]
    pub const fn feed(&self) -> &ImageFeed {
        &self.feed
    }

    #[must_use]
    pub const fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    #[must_use]
    pub const fn selected(&self) -> usize {
        self.view.selected
    }

    #[must_use]
    pub const fn scroll_row(&self) -> usize {
        self.view.scroll_row
    }

    #[must_use]
    pub const fn layout(&self) -> GridLayout {
        self.layout
    }

    #[must_use]
    pub const fn grid_area(&self) -> Rect {
        self.grid_area
    }

    /// Requests the first page.
    pub fn start(&mut self) -> Option<PageRequest> {
        self.feed.begin_load()
    }

    /// Shows a transient message in the status line until the next key.
    pub fn set_notice(&mut self, message: impl Into<String>, level: StatusLevel) {
        self.notice = Some((message.into(), level));
    }

    /// Splits `area` into the screen's parts and recomputes the grid
    /// geometry for its width.
    pub fn update_layout(&mut self, area: Rect) {
        let [_, grid_area, _] = Self::areas(area);
        self.screen_area = area;
        self.grid_area = grid_area;
        self.layout = GridLayout::compute(grid_area.width, self.min_card_width, self.show_captions);
        self.clamp_scroll();
    }

    fn areas(area: Rect) -> [Rect; 3] {
        Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .areas(area)
    }

    fn tile_count(&self) -> usize {
        ImageGrid::tile_count(&self.feed)
    }

    fn max_scroll_row(&self) -> usize {
        let rows = self.layout.rows(self.tile_count());
        rows.saturating_sub(self.layout.visible_rows(self.grid_area.height))
    }

    fn clamp_scroll(&mut self) {
        self.view.scroll_row = self.view.scroll_row.min(self.max_scroll_row());
    }

    fn ensure_selected_visible(&mut self) {
        let row = self.layout.row_of(self.view.selected);
        let visible = self.layout.visible_rows(self.grid_area.height);
        if row < self.view.scroll_row {
            self.view.scroll_row = row;
        } else if row >= self.view.scroll_row + visible {
            self.view.scroll_row = row + 1 - visible;
        }
    }

    fn select(&mut self, index: usize) {
        if self.feed.is_empty() {
            return;
        }
        self.view.selected = index.min(self.feed.len() - 1);
        self.ensure_selected_visible();
    }

    fn move_selection(&mut self, delta: isize) {
        if self.feed.is_empty() {
            return;
        }
        let target = self.view.selected.saturating_add_signed(delta);
        self.select(target);
    }

    fn page_size(&self) -> usize {
        self.layout.columns() * self.layout.visible_rows(self.grid_area.height)
    }

    fn open_viewer(&mut self, index: usize) -> GalleryKeyResult {
        let Some(image) = self.feed.get(index) else {
            return GalleryKeyResult::Ignored;
        };
        let (key, url) = (image.key().to_string(), image.url().to_string());
        self.viewer.open(key);
        self.thumbnails.set_viewer(Some(&url));
        self.select(index);
        GalleryKeyResult::Consumed
    }

    fn close_viewer(&mut self) {
        self.swipe.reset();
        self.viewer.close();
        self.thumbnails.set_viewer(None);
    }

    fn apply_viewer_move(&mut self, step: ViewerMove) -> GalleryKeyResult {
        match step {
            ViewerMove::Moved(index) => {
                if let Some(url) = self.feed.get(index).map(|image| image.url().to_string()) {
                    self.thumbnails.set_viewer(Some(&url));
                }
                self.select(index);
                GalleryKeyResult::Consumed
            }
            ViewerMove::AwaitingPage(request) => GalleryKeyResult::LoadPage(request),
            ViewerMove::Unchanged => GalleryKeyResult::Consumed,
        }
    }

    fn current_url(&self) -> Option<String> {
        self.viewer
            .current(&self.feed)
            .map(|image| image.url().to_string())
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> GalleryKeyResult {
        self.notice = None;

        if self.viewer.is_open() {
            let Some(action) = viewer_action(&key) else {
                return GalleryKeyResult::Ignored;
            };
            return self.handle_viewer_action(action);
        }

        match grid_action(&key) {
            Some(action) => self.handle_grid_action(action),
            None => GalleryKeyResult::Ignored,
        }
    }

    fn handle_grid_action(&mut self, action: Action) -> GalleryKeyResult {
        let columns = isize::try_from(self.layout.columns()).unwrap_or(1);
        let page = isize::try_from(self.page_size()).unwrap_or(1);
        match action {
            Action::Quit => return GalleryKeyResult::Quit,
            Action::NavigateLeft => self.move_selection(-1),
            Action::NavigateRight => self.move_selection(1),
            Action::NavigateUp => {
                if self.view.selected >= self.layout.columns() {
                    self.move_selection(-columns);
                }
            }
            Action::NavigateDown => self.move_selection(columns),
            Action::PageUp => self.move_selection(-page),
            Action::PageDown => self.move_selection(page),
            Action::SelectFirst => self.select(0),
            Action::SelectLast => self.select(usize::MAX),
            Action::OpenViewer => return self.open_viewer(self.view.selected),
            Action::Retry => {
                return self
                    .feed
                    .retry()
                    .map_or(GalleryKeyResult::Consumed, GalleryKeyResult::LoadPage);
            }
            Action::Reload => return self.reload(),
            _ => return GalleryKeyResult::Ignored,
        }
        GalleryKeyResult::Consumed
    }

    fn handle_viewer_action(&mut self, action: Action) -> GalleryKeyResult {
        match action {
            Action::Quit => GalleryKeyResult::Quit,
            Action::NextImage => {
                let step = self.viewer.next(&mut self.feed);
                self.apply_viewer_move(step)
            }
            Action::PreviousImage => {
                let step = self.viewer.previous(&self.feed);
                self.apply_viewer_move(step)
            }
            Action::CloseViewer => {
                self.close_viewer();
                GalleryKeyResult::Consumed
            }
            Action::OpenExternal => self
                .current_url()
                .map_or(GalleryKeyResult::Consumed, GalleryKeyResult::OpenExternal),
            Action::CopyUrl => self
                .current_url()
                .map_or(GalleryKeyResult::Consumed, GalleryKeyResult::CopyUrl),
            _ => GalleryKeyResult::Ignored,
        }
    }

    fn reload(&mut self) -> GalleryKeyResult {
        self.close_viewer();
        self.feed.reset();
        self.thumbnails.clear();
        self.view = GridViewState::default();
        GalleryKeyResult::Reload(self.feed.begin_load())
    }

    pub fn handle_mouse(&mut self, mouse: &MouseEvent) -> GalleryKeyResult {
        let Some(gesture) = self.swipe.handle(mouse) else {
            return GalleryKeyResult::Ignored;
        };

        if self.viewer.is_open() {
            return match gesture {
                PointerGesture::SwipeLeft => self.handle_viewer_action(Action::NextImage),
                PointerGesture::SwipeRight => self.handle_viewer_action(Action::PreviousImage),
                PointerGesture::Click { column, row }
                    if !ImageModal::area(self.screen_area).contains((column, row).into()) =>
                {
                    self.close_viewer();
                    GalleryKeyResult::Consumed
                }
                _ => GalleryKeyResult::Ignored,
            };
        }

        match gesture {
            PointerGesture::Click { column, row } => {
                match self
                    .layout
                    .index_at(self.grid_area, self.view.scroll_row, column, row)
                {
                    Some(index) if index < self.feed.len() => self.open_viewer(index),
                    _ => GalleryKeyResult::Ignored,
                }
            }
            PointerGesture::ScrollDown => {
                self.view.scroll_row = (self.view.scroll_row + 1).min(self.max_scroll_row());
                GalleryKeyResult::Consumed
            }
            PointerGesture::ScrollUp => {
                self.view.scroll_row = self.view.scroll_row.saturating_sub(1);
                GalleryKeyResult::Consumed
            }
            PointerGesture::SwipeLeft | PointerGesture::SwipeRight => GalleryKeyResult::Ignored,
        }
    }

    pub fn on_page_loaded(&mut self, generation: u64, page: ImagePage) -> GalleryKeyResult {
        if let PageOutcome::Stale = self.feed.complete(generation, page) {
            return GalleryKeyResult::Ignored;
        }
        self.after_feed_changed()
    }

    pub fn on_page_failed(&mut self, generation: u64, error: &str) -> GalleryKeyResult {
        if !self.feed.fail(generation, error) {
            return GalleryKeyResult::Ignored;
        }
        self.after_feed_changed()
    }

    fn after_feed_changed(&mut self) -> GalleryKeyResult {
        self.thumbnails.sync(self.feed.images());
        self.clamp_scroll();
        let step = self.viewer.on_feed_changed(&mut self.feed);
        if let ViewerMove::Moved(_) = step {
            debug!("Viewer advanced onto the new page");
        }
        self.apply_viewer_move(step)
    }

    pub fn on_image_loaded(&mut self, event: &ImageLoadedEvent) {
        self.thumbnails.on_loaded(event);
    }

    /// Forgets encoded images so they are redrawn at the new size.
    pub fn on_resize(&mut self) {
        self.swipe.reset();
        self.thumbnails.reset_protocols();
    }

    /// Requests another page when the grid is scrolled near its end or does
    /// not fill the screen.
    pub fn next_page_request(&mut self) -> Option<PageRequest> {
        if self.viewer.is_open() || self.grid_area.is_empty() {
            return None;
        }
        let metrics = self.layout.metrics(
            self.view.scroll_row,
            self.grid_area.height,
            self.tile_count(),
        );
        if self.feed.should_load_more(metrics) {
            self.feed.begin_load()
        } else {
            None
        }
    }

    /// Image loads needed for what is on screen, plus the viewer image.
    /// Images far from the visible range are released.
    pub fn take_image_requests(&mut self) -> Vec<ImageRequest> {
        let range = self.layout.visible_range(
            self.view.scroll_row,
            self.grid_area.height,
            self.feed.len(),
        );
        self.thumbnails.clear_distant(range.start, range.end);
        self.thumbnails.take_needed_loads(range.start, range.end)
    }

    /// Full-size loads no longer wanted since the viewer moved on.
    pub fn take_abandoned_requests(&mut self) -> Vec<ImageRequest> {
        self.thumbnails.take_abandoned_loads()
    }
}

pub struct GalleryScreen;

impl StatefulWidget for GalleryScreen {
    type State = GalleryScreenState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut GalleryScreenState) {
        state.update_layout(area);
        let [status_area, grid_area, footer_area] = GalleryScreenState::areas(area);

        let selected = (!state.feed.is_empty()).then_some(state.view.selected);
        let mut status = StatusBar::for_feed(crate::NAME, &state.feed, selected);
        if state.feed.error().is_none()
            && let Some((message, level)) = &state.notice
        {
            status = status.left(message.clone()).level(*level);
        }
        status.render(status_area, buf);

        ImageGrid::new(&state.feed, state.layout, state.view)
            .show_captions(state.show_captions)
            .render(grid_area, buf, &mut state.thumbnails);

        let viewer_index = state.viewer.current_index(&state.feed);
        let position = viewer_index.map(|index| format!("{} / {}", index + 1, state.feed.len()));
        let (keybinds, mode) = if state.viewer.is_open() {
            (&state.viewer_keybinds, ViewMode::Viewer)
        } else {
            (&state.grid_keybinds, ViewMode::Grid)
        };
        FooterBar::new(keybinds)
            .mode(mode)
            .right_info(position.as_deref())
            .render(footer_area, buf);

        if let Some(image) = state.viewer.current(&state.feed) {
            ImageModal::new(image, viewer_index, state.feed.len())
                .navigation(
                    state.viewer.show_previous(&state.feed),
                    state.viewer.show_next(&state.feed),
                )
                .awaiting_more(state.viewer.is_pending_advance())
                .render(ImageModal::area(area), buf, &mut state.thumbnails);
        }
    }
}
