use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,

    // Grid navigation
    NavigateUp,
    NavigateDown,
    NavigateLeft,
    NavigateRight,
    PageUp,
    PageDown,
    SelectFirst,
    SelectLast,
    OpenViewer,

    // Feed
    Retry,
    Reload,

    // Viewer
    NextImage,
    PreviousImage,
    CloseViewer,
    OpenExternal,
    CopyUrl,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keybind {
    pub key: KeyEvent,
    pub action: Action,
    pub label: Cow<'static, str>,
    pub visible_in_bar: bool,
}

impl Keybind {
    pub fn new(key: KeyEvent, action: Action, label: impl Into<Cow<'static, str>>) -> Self {
        Self {
            key,
            action,
            label: label.into(),
            visible_in_bar: true,
        }
    }

    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.visible_in_bar = false;
        self
    }
}

const fn plain(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

/// Key hints shown while browsing the grid.
#[must_use]
pub fn grid_keybinds() -> Vec<Keybind> {
    vec![
        Keybind::new(plain(KeyCode::Enter), Action::OpenViewer, "View"),
        Keybind::new(plain(KeyCode::Char('h')), Action::NavigateLeft, "Move").hidden(),
        Keybind::new(plain(KeyCode::Char('g')), Action::SelectFirst, "Top"),
        Keybind::new(plain(KeyCode::Char('G')), Action::SelectLast, "Bottom"),
        Keybind::new(plain(KeyCode::Char('r')), Action::Retry, "Retry"),
        Keybind::new(plain(KeyCode::Char('R')), Action::Reload, "Reload"),
        Keybind::new(plain(KeyCode::Char('q')), Action::Quit, "Quit"),
    ]
}

/// Key hints shown in the full-screen viewer.
#[must_use]
pub fn viewer_keybinds() -> Vec<Keybind> {
    vec![
        Keybind::new(plain(KeyCode::Left), Action::PreviousImage, "Prev"),
        Keybind::new(plain(KeyCode::Right), Action::NextImage, "Next"),
        Keybind::new(plain(KeyCode::Char('o')), Action::OpenExternal, "Open"),
        Keybind::new(plain(KeyCode::Char('y')), Action::CopyUrl, "Copy URL"),
        Keybind::new(plain(KeyCode::Esc), Action::CloseViewer, "Close"),
    ]
}

/// Maps a key press in the grid to an action.
#[must_use]
pub fn grid_action(key: &KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Action::Quit),
            KeyCode::Char('d') => Some(Action::PageDown),
            KeyCode::Char('u') => Some(Action::PageUp),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::NavigateUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::NavigateDown),
        KeyCode::Left | KeyCode::Char('h') => Some(Action::NavigateLeft),
        KeyCode::Right | KeyCode::Char('l') => Some(Action::NavigateRight),
        KeyCode::PageUp => Some(Action::PageUp),
        KeyCode::PageDown => Some(Action::PageDown),
        KeyCode::Home | KeyCode::Char('g') => Some(Action::SelectFirst),
        KeyCode::End | KeyCode::Char('G') => Some(Action::SelectLast),
        KeyCode::Enter | KeyCode::Char(' ') => Some(Action::OpenViewer),
        KeyCode::Char('r') => Some(Action::Retry),
        KeyCode::Char('R') => Some(Action::Reload),
        _ => None,
    }
}

/// Maps a key press in the viewer to an action.
#[must_use]
pub fn viewer_action(key: &KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Action::Quit),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => Some(Action::CloseViewer),
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('k') | KeyCode::Up => {
            Some(Action::PreviousImage)
        }
        KeyCode::Right
        | KeyCode::Char('l')
        | KeyCode::Char('j')
        | KeyCode::Down
        | KeyCode::Char(' ') => Some(Action::NextImage),
        KeyCode::Char('o') => Some(Action::OpenExternal),
        KeyCode::Char('y') => Some(Action::CopyUrl),
        _ => None,
    }
}
