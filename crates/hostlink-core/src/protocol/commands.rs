//! The protocol command table.
//!
//! Every command the protocol knows, grouped by the capability that serves
//! it. The server uses this table to distinguish "unknown command" (a
//! protocol mismatch) from "not supported on this platform" (a capability
//! the platform implementation did not provide).

use serde::{Deserialize, Serialize};

/// Capability groups a platform implementation may provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    Mouse,
    Keyboard,
    Scroll,
    Screen,
    Clipboard,
    Filesystem,
    Accessibility,
    Process,
    /// Built-in commands every server answers (e.g. `version`).
    Meta,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Capability::Mouse => "mouse",
            Capability::Keyboard => "keyboard",
            Capability::Scroll => "scroll",
            Capability::Screen => "screen",
            Capability::Clipboard => "clipboard",
            Capability::Filesystem => "filesystem",
            Capability::Accessibility => "accessibility",
            Capability::Process => "process",
            Capability::Meta => "meta",
        };
        write!(f, "{}", name)
    }
}

/// All protocol commands and the capability that serves each.
pub const COMMANDS: &[(&str, Capability)] = &[
    // mouse
    ("mouse_down", Capability::Mouse),
    ("mouse_up", Capability::Mouse),
    ("left_click", Capability::Mouse),
    ("right_click", Capability::Mouse),
    ("double_click", Capability::Mouse),
    ("move_cursor", Capability::Mouse),
    ("drag_to", Capability::Mouse),
    ("drag", Capability::Mouse),
    // keyboard
    ("key_down", Capability::Keyboard),
    ("key_up", Capability::Keyboard),
    ("type_text", Capability::Keyboard),
    ("press_key", Capability::Keyboard),
    ("hotkey", Capability::Keyboard),
    // scroll
    ("scroll", Capability::Scroll),
    ("scroll_down", Capability::Scroll),
    ("scroll_up", Capability::Scroll),
    // screen
    ("screenshot", Capability::Screen),
    ("get_screen_size", Capability::Screen),
    ("get_cursor_position", Capability::Screen),
    // clipboard
    ("copy_to_clipboard", Capability::Clipboard),
    ("set_clipboard", Capability::Clipboard),
    // filesystem
    ("file_exists", Capability::Filesystem),
    ("directory_exists", Capability::Filesystem),
    ("list_dir", Capability::Filesystem),
    ("read_text", Capability::Filesystem),
    ("write_text", Capability::Filesystem),
    ("read_bytes", Capability::Filesystem),
    ("write_bytes", Capability::Filesystem),
    ("get_file_size", Capability::Filesystem),
    ("delete_file", Capability::Filesystem),
    ("create_dir", Capability::Filesystem),
    ("delete_dir", Capability::Filesystem),
    // accessibility
    ("get_accessibility_tree", Capability::Accessibility),
    ("find_element", Capability::Accessibility),
    // process
    ("run_command", Capability::Process),
    // meta
    ("version", Capability::Meta),
];

/// Look up the capability serving a command name.
///
/// Returns `None` for names outside the protocol, which the server reports
/// as an unknown command.
pub fn capability_of(command: &str) -> Option<Capability> {
    COMMANDS
        .iter()
        .find(|(name, _)| *name == command)
        .map(|(_, cap)| *cap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_names_are_unique() {
        let mut names: Vec<&str> = COMMANDS.iter().map(|(n, _)| *n).collect();
        names.sort_unstable();
        let before = names.len();
        names.dedup();
        assert_eq!(before, names.len());
    }

    #[test]
    fn capability_lookup() {
        assert_eq!(capability_of("left_click"), Some(Capability::Mouse));
        assert_eq!(capability_of("read_bytes"), Some(Capability::Filesystem));
        assert_eq!(capability_of("run_command"), Some(Capability::Process));
        assert_eq!(capability_of("version"), Some(Capability::Meta));
        assert_eq!(capability_of("not_a_real_command"), None);
    }

    #[test]
    fn capability_display() {
        assert_eq!(Capability::Filesystem.to_string(), "filesystem");
        assert_eq!(Capability::Accessibility.to_string(), "accessibility");
    }
}
