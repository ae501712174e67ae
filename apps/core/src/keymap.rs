use serde::Serialize;

use crate::cursor::Direction;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaletteKey {
    ArrowDown,
    ArrowUp,
    Enter,
    Escape,
    Other(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Navigate(Direction),
    Commit,
    Cancel,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KeyDisposition {
    pub handled: bool,
    pub prevent_default: bool,
    pub stop_propagation: bool,
}

impl KeyDisposition {
    pub fn ignored() -> Self {
        Self::default()
    }

    pub fn consumed() -> Self {
        Self {
            handled: true,
            prevent_default: true,
            stop_propagation: false,
        }
    }

    pub fn swallowed() -> Self {
        Self {
            handled: true,
            prevent_default: true,
            stop_propagation: true,
        }
    }
}

pub fn parse_key(input: &str) -> PaletteKey {
    let raw = input.trim();
    match raw.to_ascii_lowercase().as_str() {
        "arrowdown" | "down" => PaletteKey::ArrowDown,
        "arrowup" | "up" => PaletteKey::ArrowUp,
        "enter" | "return" => PaletteKey::Enter,
        "escape" | "esc" => PaletteKey::Escape,
        _ => PaletteKey::Other(raw.to_string()),
    }
}

pub fn command_for(key: &PaletteKey) -> Option<KeyCommand> {
    match key {
        PaletteKey::ArrowDown => Some(KeyCommand::Navigate(Direction::Next)),
        PaletteKey::ArrowUp => Some(KeyCommand::Navigate(Direction::Prev)),
        PaletteKey::Enter => Some(KeyCommand::Commit),
        PaletteKey::Escape => Some(KeyCommand::Cancel),
        PaletteKey::Other(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{command_for, parse_key, KeyCommand, PaletteKey};
    use crate::cursor::Direction;

    #[test]
    fn parses_dom_key_names_case_insensitively() {
        assert_eq!(parse_key("ArrowDown"), PaletteKey::ArrowDown);
        assert_eq!(parse_key(" arrowup "), PaletteKey::ArrowUp);
        assert_eq!(parse_key("Esc"), PaletteKey::Escape);
        assert_eq!(parse_key("a"), PaletteKey::Other("a".to_string()));
    }

    #[test]
    fn maps_keys_to_commands() {
        assert_eq!(
            command_for(&PaletteKey::ArrowDown),
            Some(KeyCommand::Navigate(Direction::Next))
        );
        assert_eq!(command_for(&PaletteKey::Enter), Some(KeyCommand::Commit));
        assert_eq!(command_for(&PaletteKey::Other("Tab".into())), None);
    }
}
