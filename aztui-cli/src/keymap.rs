use crossterm::event::{KeyCode, KeyModifiers};

use aztui_core::focus::NavCommand;

const PAGE: isize = 10;

/// What a key press means to the application
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    Nav(NavCommand),
    Refresh,
    ToggleHelp,
    Quit,
}

pub fn map_key(code: KeyCode, modifiers: KeyModifiers) -> Option<KeyAction> {
    let action = match (code, modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => KeyAction::Quit,
        (KeyCode::Char('q'), _) => KeyAction::Quit,
        (KeyCode::Char('?'), _) => KeyAction::ToggleHelp,
        (KeyCode::Char('r'), _) => KeyAction::Refresh,
        (KeyCode::Tab, _) => KeyAction::Nav(NavCommand::NextPane),
        (KeyCode::Up, _) | (KeyCode::Char('k'), _) => KeyAction::Nav(NavCommand::Move(-1)),
        (KeyCode::Down, _) | (KeyCode::Char('j'), _) => KeyAction::Nav(NavCommand::Move(1)),
        (KeyCode::PageUp, _) => KeyAction::Nav(NavCommand::Move(-PAGE)),
        (KeyCode::PageDown, _) => KeyAction::Nav(NavCommand::Move(PAGE)),
        (KeyCode::Home, _) => KeyAction::Nav(NavCommand::Move(isize::MIN)),
        (KeyCode::End, _) => KeyAction::Nav(NavCommand::Move(isize::MAX)),
        (KeyCode::Enter, _) => KeyAction::Nav(NavCommand::Confirm),
        (KeyCode::Esc, _) => KeyAction::Nav(NavCommand::Back),
        (KeyCode::Right, _) | (KeyCode::Char('l'), _) => KeyAction::Nav(NavCommand::DrillIn),
        (KeyCode::Left, _) | (KeyCode::Char('h'), _) => KeyAction::Nav(NavCommand::DrillOut),
        _ => return None,
    };
    Some(action)
}
