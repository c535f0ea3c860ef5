//! Event handling.

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

/// Horizontal distance, in columns, from which a drag counts as a swipe.
pub const SWIPE_MIN_COLUMNS: u16 = 6;

/// Result of event handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Continue processing.
    Continue,
    /// Exit application.
    Exit,
}

/// Returns the key of a press event. Release and repeat events are dropped
/// so each key acts once on terminals that report them.
#[must_use]
pub fn key_press(event: &Event) -> Option<KeyEvent> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => Some(*key),
        _ => None,
    }
}

/// Checks if key quits from anywhere.
#[must_use]
pub fn is_force_quit(key: &KeyEvent) -> bool {
    matches!(
        key,
        KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            ..
        }
    )
}

/// Pointer input after press/release pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerGesture {
    /// Press and release close together.
    Click { column: u16, row: u16 },
    /// Dragged leftwards: show the next image.
    SwipeLeft,
    /// Dragged rightwards: show the previous image.
    SwipeRight,
    ScrollUp,
    ScrollDown,
}

/// Pairs left-button presses with releases, the terminal equivalent of touch
/// start and end.
#[derive(Debug, Default)]
pub struct SwipeTracker {
    start: Option<(u16, u16)>,
}

impl SwipeTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one mouse event, returning a gesture once it is complete.
    pub fn handle(&mut self, mouse: &MouseEvent) -> Option<PointerGesture> {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.start = Some((mouse.column, mouse.row));
                None
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let (start_column, start_row) = self.start.take()?;
                let distance = i32::from(mouse.column) - i32::from(start_column);
                if distance <= -i32::from(SWIPE_MIN_COLUMNS) {
                    Some(PointerGesture::SwipeLeft)
                } else if distance >= i32::from(SWIPE_MIN_COLUMNS) {
                    Some(PointerGesture::SwipeRight)
                } else {
                    Some(PointerGesture::Click {
                        column: start_column,
                        row: start_row,
                    })
                }
            }
            MouseEventKind::ScrollUp => Some(PointerGesture::ScrollUp),
            MouseEventKind::ScrollDown => Some(PointerGesture::ScrollDown),
            _ => None,
        }
    }

    /// Forgets a press in progress.
    pub fn reset(&mut self) {
        self.start = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn gesture(from: u16, to: u16) -> Option<PointerGesture> {
        let mut tracker = SwipeTracker::new();
        assert_eq!(
            tracker.handle(&mouse(MouseEventKind::Down(MouseButton::Left), from, 10)),
            None
        );
        tracker.handle(&mouse(MouseEventKind::Up(MouseButton::Left), to, 12))
    }

    #[test_case(40, 20, Some(PointerGesture::SwipeLeft) ; "left_is_next")]
    #[test_case(20, 40, Some(PointerGesture::SwipeRight) ; "right_is_previous")]
    #[test_case(40, 34, Some(PointerGesture::SwipeLeft) ; "exact_threshold")]
    #[test_case(40, 36, Some(PointerGesture::Click { column: 40, row: 10 }) ; "short_drag_is_click")]
    #[test_case(40, 40, Some(PointerGesture::Click { column: 40, row: 10 }) ; "click")]
    fn test_gestures(from: u16, to: u16, expected: Option<PointerGesture>) {
        assert_eq!(gesture(from, to), expected);
    }

    #[test]
    fn test_release_without_press() {
        let mut tracker = SwipeTracker::new();
        assert_eq!(
            tracker.handle(&mouse(MouseEventKind::Up(MouseButton::Left), 5, 5)),
            None
        );
    }

    #[test]
    fn test_reset_drops_press() {
        let mut tracker = SwipeTracker::new();
        tracker.handle(&mouse(MouseEventKind::Down(MouseButton::Left), 5, 5));
        tracker.reset();
        assert_eq!(
            tracker.handle(&mouse(MouseEventKind::Up(MouseButton::Left), 30, 5)),
            None
        );
    }

    #[test]
    fn test_wheel() {
        let mut tracker = SwipeTracker::new();
        assert_eq!(
            tracker.handle(&mouse(MouseEventKind::ScrollDown, 0, 0)),
            Some(PointerGesture::ScrollDown)
        );
    }

    #[test]
    fn test_key_press_filters_releases() {
        let press =
            KeyEvent::new_with_kind(KeyCode::Char('q'), KeyModifiers::NONE, KeyEventKind::Press);
        let release = KeyEvent::new_with_kind(
            KeyCode::Char('q'),
            KeyModifiers::NONE,
            KeyEventKind::Release,
        );

        assert_eq!(key_press(&Event::Key(press)), Some(press));
        assert_eq!(key_press(&Event::Key(release)), None);
        assert_eq!(key_press(&Event::FocusGained), None);
    }

    #[test]
    fn test_force_quit() {
        assert!(is_force_quit(&KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL
        )));
        assert!(!is_force_quit(&KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::NONE
        )));
    }
}
