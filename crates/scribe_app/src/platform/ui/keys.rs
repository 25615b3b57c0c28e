use console::Key;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    ScrollBy(isize),
    Page { down: bool },
    ScrollToBottom,
    ToggleConsole,
    Quit,
}

pub fn map_key(key: &Key) -> Option<KeyAction> {
    match key {
        Key::ArrowUp | Key::Char('k') => Some(KeyAction::ScrollBy(-1)),
        Key::ArrowDown | Key::Char('j') => Some(KeyAction::ScrollBy(1)),
        Key::PageUp => Some(KeyAction::Page { down: false }),
        Key::PageDown | Key::Char(' ') => Some(KeyAction::Page { down: true }),
        Key::End | Key::Char('b') => Some(KeyAction::ScrollToBottom),
        Key::Char('c') => Some(KeyAction::ToggleConsole),
        Key::Char('q') | Key::Escape | Key::CtrlC => Some(KeyAction::Quit),
        _ => None,
    }
}
