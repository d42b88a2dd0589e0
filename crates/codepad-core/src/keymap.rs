//! Keyboard shortcuts for menu commands.
//!
//! Every binding is a single chord (`Ctrl+S`, `Ctrl+Shift+S`). Defaults
//! come first; entries from `[keyboard.bindings]` replace a default bound
//! to the same chord:
//!
//! ```toml
//! [keyboard.bindings]
//! "ctrl+e" = "run"
//! "ctrl+shift+s" = "save_as"
//! ```

use crate::command::Command;
use crate::config::Config;
use std::collections::HashMap;

/// Keyboard modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool, // Cmd on macOS, Win on Windows
}

impl Modifiers {
    /// No modifiers pressed.
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    /// Ctrl modifier.
    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        alt: false,
        shift: false,
        meta: false,
    };

    /// Ctrl+Shift.
    pub const CTRL_SHIFT: Modifiers = Modifiers {
        ctrl: true,
        alt: false,
        shift: true,
        meta: false,
    };

    /// Returns true if no modifiers are pressed.
    pub fn is_empty(&self) -> bool {
        !self.ctrl && !self.alt && !self.shift && !self.meta
    }

    /// Parses modifiers from a string like "ctrl+shift".
    pub fn parse(s: &str) -> Self {
        let mut mods = Modifiers::NONE;
        for part in s.split('+').map(|p| p.trim().to_lowercase()) {
            match part.as_str() {
                "ctrl" | "control" => mods.ctrl = true,
                "alt" | "option" => mods.alt = true,
                "shift" => mods.shift = true,
                "meta" | "cmd" | "win" | "super" => mods.meta = true,
                _ => {}
            }
        }
        mods
    }
}

impl std::fmt::Display for Modifiers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.alt {
            parts.push("Alt");
        }
        if self.shift {
            parts.push("Shift");
        }
        if self.meta {
            #[cfg(target_os = "macos")]
            parts.push("Cmd");
            #[cfg(not(target_os = "macos"))]
            parts.push("Win");
        }
        write!(f, "{}", parts.join("+"))
    }
}

/// A key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Tab,
    Backspace,
    Delete,
    Escape,
    F(u8), // F1-F12
    Space,
}

impl Key {
    /// Parses a key from a string.
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "enter" | "return" => Some(Key::Enter),
            "tab" => Some(Key::Tab),
            "backspace" | "bs" => Some(Key::Backspace),
            "delete" | "del" => Some(Key::Delete),
            "escape" | "esc" => Some(Key::Escape),
            "space" => Some(Key::Space),
            _ if lower.starts_with('f') && lower.len() > 1 && lower.len() <= 3 => {
                lower[1..].parse().ok().filter(|n| (1..=12).contains(n)).map(Key::F)
            }
            _ => {
                let mut chars = lower.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(Key::Char(c)),
                    _ => None,
                }
            }
        }
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{}", c.to_uppercase()),
            Key::Enter => write!(f, "Enter"),
            Key::Tab => write!(f, "Tab"),
            Key::Backspace => write!(f, "Backspace"),
            Key::Delete => write!(f, "Delete"),
            Key::Escape => write!(f, "Escape"),
            Key::F(n) => write!(f, "F{}", n),
            Key::Space => write!(f, "Space"),
        }
    }
}

/// A key press event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyPress {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyPress {
    /// Creates a new key press.
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// Parses a binding string like "ctrl+s".
    pub fn parse(s: &str) -> Option<Self> {
        let (mods, key) = match s.rsplit_once('+') {
            // "ctrl++" binds the plus key
            Some((mods, "")) => (mods.strip_suffix('+').unwrap_or(mods), "+"),
            Some((mods, key)) => (mods, key),
            None => ("", s),
        };
        Some(Self {
            key: Key::parse(key)?,
            modifiers: Modifiers::parse(mods),
        })
    }
}

impl std::fmt::Display for KeyPress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.modifiers.is_empty() {
            write!(f, "{}", self.key)
        } else {
            write!(f, "{}+{}", self.modifiers, self.key)
        }
    }
}

/// A key binding maps a chord to a command.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyBinding {
    pub key: KeyPress,
    pub command: Command,
}

/// Keyboard mapping configuration.
#[derive(Debug, Clone)]
pub struct Keymap {
    /// All key bindings, defaults first.
    bindings: Vec<KeyBinding>,
    /// Index by chord; later bindings win.
    by_key: HashMap<KeyPress, usize>,
}

impl Keymap {
    /// Creates a keymap with default bindings.
    pub fn new() -> Self {
        let mut keymap = Self {
            bindings: Vec::new(),
            by_key: HashMap::new(),
        };
        keymap.add_default_bindings();
        keymap.rebuild_index();
        keymap
    }

    /// Creates a keymap from configuration. Overrides apply in key-string
    /// order, so the result does not depend on map iteration order.
    pub fn from_config(config: &Config) -> Self {
        let mut keymap = Self::new();

        let mut overrides: Vec<_> = config.keyboard.bindings.iter().collect();
        overrides.sort();
        for (key_str, cmd_str) in overrides {
            match (KeyPress::parse(key_str), Command::from_name(cmd_str)) {
                (Some(key), Some(command)) => keymap.bindings.push(KeyBinding { key, command }),
                _ => tracing::warn!("Ignoring key binding {} = {}", key_str, cmd_str),
            }
        }

        keymap.rebuild_index();
        keymap
    }

    fn add_default_bindings(&mut self) {
        use crate::command::Command::*;

        let ctrl = |c| KeyPress::new(Key::Char(c), Modifiers::CTRL);
        let defaults = [
            (ctrl('n'), NewFile),
            (ctrl('o'), OpenFile),
            (ctrl('s'), Save),
            (KeyPress::new(Key::Char('s'), Modifiers::CTRL_SHIFT), SaveAs),
            (ctrl('r'), Run),
            (ctrl('w'), CloseFile),
            (ctrl('z'), Undo),
            (ctrl('y'), Redo),
            (ctrl('c'), Copy),
            (ctrl('x'), Cut),
            (ctrl('v'), Paste),
        ];

        self.bindings.extend(
            defaults
                .into_iter()
                .map(|(key, command)| KeyBinding { key, command }),
        );
    }

    fn rebuild_index(&mut self) {
        self.by_key = self
            .bindings
            .iter()
            .enumerate()
            .map(|(i, binding)| (binding.key, i))
            .collect();
    }

    /// Returns the command bound to a chord.
    pub fn lookup(&self, key: &KeyPress) -> Option<Command> {
        self.by_key.get(key).map(|&i| self.bindings[i].command)
    }

    /// Returns the chord that triggers a command, for menu labels.
    pub fn shortcut(&self, command: Command) -> Option<KeyPress> {
        self.by_key
            .iter()
            .filter(|&(_, &i)| self.bindings[i].command == command)
            .map(|(key, _)| *key)
            .min_by_key(|key| key.to_string())
    }

    /// Returns all bindings.
    pub fn bindings(&self) -> &[KeyBinding] {
        &self.bindings
    }

    /// Adds a binding, replacing whatever was on its chord.
    pub fn add_binding(&mut self, binding: KeyBinding) {
        self.bindings.push(binding);
        self.rebuild_index();
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new()
    }
}
