//! Configurable keyboard shortcuts.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// All keybindings, stored in `shortcut.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shortcuts {
    pub main: MainShortcuts,
    pub input_box: InputBoxShortcuts,
}

/// Bindings for the main screen actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MainShortcuts {
    pub quit: Vec<String>,
    pub upload: Vec<String>,
    pub sample: Vec<String>,
    pub download: Vec<String>,
    pub copy: Vec<String>,
    pub reset: Vec<String>,
}

/// Bindings inside the path input box.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputBoxShortcuts {
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
    pub backspace: Vec<String>,
    pub delete: Vec<String>,
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub home: Vec<String>,
    pub end: Vec<String>,
    pub clear_line: Vec<String>,
}

impl Shortcuts {
    /// Load from TOML, falling back to the defaults when the file is
    /// absent.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Persist as TOML.
    #[allow(dead_code)]
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl Default for Shortcuts {
    fn default() -> Self {
        Self {
            main: MainShortcuts {
                quit: vec!["q".into()],
                upload: vec!["u".into()],
                sample: vec!["s".into()],
                download: vec!["d".into()],
                copy: vec!["c".into()],
                reset: vec!["r".into()],
            },
            input_box: InputBoxShortcuts {
                confirm: vec!["Enter".into()],
                cancel: vec!["Esc".into()],
                backspace: vec!["Backspace".into()],
                delete: vec!["Delete".into()],
                left: vec!["Left".into()],
                right: vec!["Right".into()],
                home: vec!["Home".into()],
                end: vec!["End".into()],
                clear_line: vec!["Ctrl+u".into()],
            },
        }
    }
}

/// True when the key event matches any of the bound shortcut strings.
pub fn matches_shortcut(key: &KeyEvent, shortcuts: &[String]) -> bool {
    shortcuts.iter().any(|s| matches_single_shortcut(key, s))
}

/// Match one shortcut string of the form `[Mod+...]Key`, e.g. "Ctrl+u",
/// "Enter", "d".
fn matches_single_shortcut(key: &KeyEvent, shortcut: &str) -> bool {
    let (modifier_part, key_part) = match shortcut.rsplit_once('+') {
        Some((mods, k)) if !k.is_empty() => (Some(mods), k),
        _ => (None, shortcut),
    };

    let mut expected = KeyModifiers::empty();
    if let Some(mods) = modifier_part {
        for modifier in mods.split('+') {
            match modifier {
                "Ctrl" | "ctrl" => expected |= KeyModifiers::CONTROL,
                "Alt" | "alt" => expected |= KeyModifiers::ALT,
                "Shift" | "shift" => expected |= KeyModifiers::SHIFT,
                _ => return false,
            }
        }
    }
    if key.modifiers != expected {
        return false;
    }

    match key_part {
        "Enter" | "enter" => key.code == KeyCode::Enter,
        "Esc" | "esc" => key.code == KeyCode::Esc,
        "Tab" | "tab" => key.code == KeyCode::Tab,
        "Backspace" | "backspace" => key.code == KeyCode::Backspace,
        "Delete" | "delete" => key.code == KeyCode::Delete,
        "Up" | "up" => key.code == KeyCode::Up,
        "Down" | "down" => key.code == KeyCode::Down,
        "Left" | "left" => key.code == KeyCode::Left,
        "Right" | "right" => key.code == KeyCode::Right,
        "Home" | "home" => key.code == KeyCode::Home,
        "End" | "end" => key.code == KeyCode::End,
        s => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => key.code == KeyCode::Char(c),
                _ => false,
            }
        }
    }
}
