//! Capability interfaces a platform implementation may provide.
//!
//! Each trait covers one command group from the protocol table. A platform
//! declares what it supports by filling the corresponding [`Platform`]
//! slots; commands for absent capabilities answer "not supported on this
//! platform" instead of crashing the dispatcher.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use hostlink_core::protocol::Capability;
use hostlink_core::{Error, Result};

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseButton {
    #[default]
    Left,
    Middle,
    Right,
}

impl std::str::FromStr for MouseButton {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "left" => Ok(MouseButton::Left),
            "middle" => Ok(MouseButton::Middle),
            "right" => Ok(MouseButton::Right),
            other => Err(Error::protocol(format!("unknown mouse button: {other}"))),
        }
    }
}

/// Pointer input.
#[async_trait]
pub trait MouseOps: Send + Sync {
    /// Press a button, optionally moving to (x, y) first.
    async fn mouse_down(&self, x: Option<i64>, y: Option<i64>, button: MouseButton) -> Result<()>;
    /// Release a button, optionally moving to (x, y) first.
    async fn mouse_up(&self, x: Option<i64>, y: Option<i64>, button: MouseButton) -> Result<()>;
    /// Click a button, optionally moving to (x, y) first.
    async fn click(&self, x: Option<i64>, y: Option<i64>, button: MouseButton) -> Result<()>;
    /// Double-click the left button.
    async fn double_click(&self, x: Option<i64>, y: Option<i64>) -> Result<()>;
    /// Move the cursor to (x, y).
    async fn move_cursor(&self, x: i64, y: i64) -> Result<()>;
    /// Press at the current position, move to (x, y) over `duration`, release.
    async fn drag_to(&self, x: i64, y: i64, button: MouseButton, duration: Duration) -> Result<()>;
    /// Drag along an explicit path of points.
    async fn drag(&self, path: Vec<(i64, i64)>, button: MouseButton) -> Result<()>;
}

/// Keyboard input.
#[async_trait]
pub trait KeyboardOps: Send + Sync {
    async fn key_down(&self, key: &str) -> Result<()>;
    async fn key_up(&self, key: &str) -> Result<()>;
    /// Type a string of literal text.
    async fn type_text(&self, text: &str) -> Result<()>;
    /// Press and release a named key.
    async fn press_key(&self, key: &str) -> Result<()>;
    /// Press a chord of keys in order, release in reverse order.
    async fn hotkey(&self, keys: Vec<String>) -> Result<()>;
}

/// Scroll wheel input.
#[async_trait]
pub trait ScrollOps: Send + Sync {
    /// Scroll by (delta_x, delta_y) wheel clicks.
    async fn scroll(&self, delta_x: i64, delta_y: i64) -> Result<()>;
    async fn scroll_down(&self, clicks: u32) -> Result<()>;
    async fn scroll_up(&self, clicks: u32) -> Result<()>;
}

/// Screen capture and geometry.
#[async_trait]
pub trait ScreenOps: Send + Sync {
    /// Capture the screen as an encoded image (PNG unless the platform
    /// documents otherwise).
    async fn screenshot(&self) -> Result<Vec<u8>>;
    /// Logical screen size in pixels.
    async fn screen_size(&self) -> Result<(u32, u32)>;
    /// Current cursor position in screen coordinates.
    async fn cursor_position(&self) -> Result<(i64, i64)>;
}

/// Clipboard access.
#[async_trait]
pub trait ClipboardOps: Send + Sync {
    /// Read the current clipboard text.
    async fn get_clipboard(&self) -> Result<String>;
    /// Replace the clipboard contents.
    async fn set_clipboard(&self, text: &str) -> Result<()>;
}

/// File access on the target.
#[async_trait]
pub trait FilesystemOps: Send + Sync {
    async fn file_exists(&self, path: &str) -> Result<bool>;
    async fn directory_exists(&self, path: &str) -> Result<bool>;
    async fn list_dir(&self, path: &str) -> Result<Vec<String>>;
    async fn read_text(&self, path: &str) -> Result<String>;
    async fn write_text(&self, path: &str, content: &str, append: bool) -> Result<()>;
    /// Read up to `length` bytes starting at `offset` (whole file when both
    /// are absent).
    async fn read_bytes(&self, path: &str, offset: Option<u64>, length: Option<u64>)
        -> Result<Vec<u8>>;
    async fn write_bytes(&self, path: &str, data: &[u8], append: bool) -> Result<()>;
    async fn file_size(&self, path: &str) -> Result<u64>;
    async fn delete_file(&self, path: &str) -> Result<()>;
    async fn create_dir(&self, path: &str) -> Result<()>;
    async fn delete_dir(&self, path: &str) -> Result<()>;
}

/// UI accessibility tree queries.
#[async_trait]
pub trait AccessibilityOps: Send + Sync {
    /// Dump the accessibility tree as JSON.
    async fn tree(&self) -> Result<Value>;
    /// Find an element by role and/or title.
    async fn find_element(&self, role: Option<&str>, title: Option<&str>) -> Result<Value>;
}

/// Output of a shell command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub return_code: i64,
}

/// Shell command execution.
#[async_trait]
pub trait ProcessOps: Send + Sync {
    /// Run a shell command, capturing stdout/stderr and the exit code.
    async fn run_command(&self, command: &str, timeout: Option<Duration>) -> Result<CommandOutput>;
}

/// The set of capability implementations a target provides.
///
/// Replaces duck-typed handler registration: absence is explicit (`None`)
/// and reported at registry construction, not on first use.
#[derive(Clone, Default)]
pub struct Platform {
    pub mouse: Option<Arc<dyn MouseOps>>,
    pub keyboard: Option<Arc<dyn KeyboardOps>>,
    pub scroll: Option<Arc<dyn ScrollOps>>,
    pub screen: Option<Arc<dyn ScreenOps>>,
    pub clipboard: Option<Arc<dyn ClipboardOps>>,
    pub filesystem: Option<Arc<dyn FilesystemOps>>,
    pub accessibility: Option<Arc<dyn AccessibilityOps>>,
    pub process: Option<Arc<dyn ProcessOps>>,
}

impl Platform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mouse(mut self, ops: Arc<dyn MouseOps>) -> Self {
        self.mouse = Some(ops);
        self
    }

    pub fn with_keyboard(mut self, ops: Arc<dyn KeyboardOps>) -> Self {
        self.keyboard = Some(ops);
        self
    }

    pub fn with_scroll(mut self, ops: Arc<dyn ScrollOps>) -> Self {
        self.scroll = Some(ops);
        self
    }

    pub fn with_screen(mut self, ops: Arc<dyn ScreenOps>) -> Self {
        self.screen = Some(ops);
        self
    }

    pub fn with_clipboard(mut self, ops: Arc<dyn ClipboardOps>) -> Self {
        self.clipboard = Some(ops);
        self
    }

    pub fn with_filesystem(mut self, ops: Arc<dyn FilesystemOps>) -> Self {
        self.filesystem = Some(ops);
        self
    }

    pub fn with_accessibility(mut self, ops: Arc<dyn AccessibilityOps>) -> Self {
        self.accessibility = Some(ops);
        self
    }

    pub fn with_process(mut self, ops: Arc<dyn ProcessOps>) -> Self {
        self.process = Some(ops);
        self
    }

    /// Capabilities this platform provides (always includes `Meta`).
    pub fn capabilities(&self) -> Vec<Capability> {
        let mut caps = vec![Capability::Meta];
        if self.mouse.is_some() {
            caps.push(Capability::Mouse);
        }
        if self.keyboard.is_some() {
            caps.push(Capability::Keyboard);
        }
        if self.scroll.is_some() {
            caps.push(Capability::Scroll);
        }
        if self.screen.is_some() {
            caps.push(Capability::Screen);
        }
        if self.clipboard.is_some() {
            caps.push(Capability::Clipboard);
        }
        if self.filesystem.is_some() {
            caps.push(Capability::Filesystem);
        }
        if self.accessibility.is_some() {
            caps.push(Capability::Accessibility);
        }
        if self.process.is_some() {
            caps.push(Capability::Process);
        }
        caps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mouse_button_parsing() {
        assert_eq!("left".parse::<MouseButton>().unwrap(), MouseButton::Left);
        assert_eq!("right".parse::<MouseButton>().unwrap(), MouseButton::Right);
        assert!("side".parse::<MouseButton>().is_err());
    }

    #[test]
    fn empty_platform_still_has_meta() {
        let platform = Platform::new();
        assert_eq!(platform.capabilities(), vec![Capability::Meta]);
    }
}
