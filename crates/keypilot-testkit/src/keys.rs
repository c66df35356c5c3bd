//! Decoding of key strings into crossterm key events.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use keypilot_core::{Error, Result};

/// Decode a key string such as `a`, `<enter>`, `<c-s>` or `<pgdown>`.
///
/// Printable keys are single characters. Special keys are wrapped in angle
/// brackets, optionally prefixed with `c-` (control), `a-` (alt) or `s-`
/// (shift).
///
/// # Errors
/// Returns [`Error::InvalidKey`] if the key name or a modifier is not recognized.
pub fn parse_key(key: &str) -> Result<KeyEvent> {
    let mut chars = key.chars();
    if let (Some(single), None) = (chars.next(), chars.next()) {
        return Ok(KeyEvent::new(KeyCode::Char(single), KeyModifiers::NONE));
    }

    let Some(inner) = key.strip_prefix('<').and_then(|rest| rest.strip_suffix('>')) else {
        return Err(Error::InvalidKey(key.to_owned()));
    };

    let mut modifiers = KeyModifiers::NONE;
    let mut parts = inner.split('-').collect::<Vec<_>>();
    while parts.len() > 1 {
        match parts[0].to_lowercase().as_str() {
            "c" | "ctrl" => modifiers |= KeyModifiers::CONTROL,
            "a" | "alt" => modifiers |= KeyModifiers::ALT,
            "s" | "shift" => modifiers |= KeyModifiers::SHIFT,
            _ => return Err(Error::InvalidKey(key.to_owned())),
        }
        parts.remove(0);
    }

    let code = match parts[0].to_lowercase().as_str() {
        "enter" | "return" => KeyCode::Enter,
        "esc" | "escape" => KeyCode::Esc,
        "space" => KeyCode::Char(' '),
        "backspace" => KeyCode::Backspace,
        "delete" | "del" => KeyCode::Delete,
        "tab" => KeyCode::Tab,
        "backtab" => KeyCode::BackTab,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pgup" | "pageup" => KeyCode::PageUp,
        "pgdown" | "pagedown" => KeyCode::PageDown,
        single if single.chars().count() == 1 => {
            let Some(character) = single.chars().next() else {
                return Err(Error::InvalidKey(key.to_owned()));
            };
            KeyCode::Char(character)
        }
        _ => return Err(Error::InvalidKey(key.to_owned())),
    };

    Ok(KeyEvent::new(code, modifiers))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_printable() {
        let event = parse_key("f").unwrap();
        assert_eq!(event.code, KeyCode::Char('f'));
        assert_eq!(event.modifiers, KeyModifiers::NONE);

        let bracket = parse_key("<").unwrap();
        assert_eq!(bracket.code, KeyCode::Char('<'));
    }

    #[test]
    fn test_named_keys() {
        assert_eq!(parse_key("<enter>").unwrap().code, KeyCode::Enter);
        assert_eq!(parse_key("<esc>").unwrap().code, KeyCode::Esc);
        assert_eq!(parse_key("<space>").unwrap().code, KeyCode::Char(' '));
        assert_eq!(parse_key("<down>").unwrap().code, KeyCode::Down);
        assert_eq!(parse_key("<pgdown>").unwrap().code, KeyCode::PageDown);
    }

    #[test]
    fn test_modifiers() {
        let event = parse_key("<c-s>").unwrap();
        assert_eq!(event.code, KeyCode::Char('s'));
        assert_eq!(event.modifiers, KeyModifiers::CONTROL);

        let combo = parse_key("<c-a-up>").unwrap();
        assert_eq!(combo.code, KeyCode::Up);
        assert_eq!(combo.modifiers, KeyModifiers::CONTROL | KeyModifiers::ALT);
    }

    #[test]
    fn test_invalid() {
        assert!(matches!(parse_key("enter"), Err(Error::InvalidKey(_))));
        assert!(matches!(parse_key("<hyper-x>"), Err(Error::InvalidKey(_))));
        assert!(matches!(parse_key("<launch>"), Err(Error::InvalidKey(_))));
        assert!(matches!(parse_key(""), Err(Error::InvalidKey(_))));
    }
}
