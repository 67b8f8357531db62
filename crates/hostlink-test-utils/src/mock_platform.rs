//! Mock capability implementations.
//!
//! Input ops append a line per call to a shared event log so tests can
//! assert both content and order across capability groups.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use hostlink_core::Result;
use hostlink_server::capability::{
    AccessibilityOps, ClipboardOps, KeyboardOps, MouseButton, MouseOps, Platform, ScreenOps,
    ScrollOps,
};

/// Records every input call as a formatted line.
#[derive(Debug, Default)]
pub struct RecordingInput {
    events: Mutex<Vec<String>>,
    clipboard: Mutex<String>,
}

impl RecordingInput {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Drain and return the recorded events.
    pub fn take_events(&self) -> Vec<String> {
        std::mem::take(&mut self.events.lock().unwrap_or_else(|e| e.into_inner()))
    }

    /// Snapshot of the recorded events.
    pub fn events(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn record(&self, event: String) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }
}

fn opt(v: Option<i64>) -> String {
    v.map_or_else(|| "-".to_string(), |n| n.to_string())
}

fn button_name(b: MouseButton) -> &'static str {
    match b {
        MouseButton::Left => "left",
        MouseButton::Middle => "middle",
        MouseButton::Right => "right",
    }
}

#[async_trait]
impl MouseOps for RecordingInput {
    async fn mouse_down(&self, x: Option<i64>, y: Option<i64>, button: MouseButton) -> Result<()> {
        self.record(format!("mouse_down {} {} {}", opt(x), opt(y), button_name(button)));
        Ok(())
    }

    async fn mouse_up(&self, x: Option<i64>, y: Option<i64>, button: MouseButton) -> Result<()> {
        self.record(format!("mouse_up {} {} {}", opt(x), opt(y), button_name(button)));
        Ok(())
    }

    async fn click(&self, x: Option<i64>, y: Option<i64>, button: MouseButton) -> Result<()> {
        self.record(format!("click {} {} {}", opt(x), opt(y), button_name(button)));
        Ok(())
    }

    async fn double_click(&self, x: Option<i64>, y: Option<i64>) -> Result<()> {
        self.record(format!("double_click {} {}", opt(x), opt(y)));
        Ok(())
    }

    async fn move_cursor(&self, x: i64, y: i64) -> Result<()> {
        self.record(format!("move_cursor {x} {y}"));
        Ok(())
    }

    async fn drag_to(&self, x: i64, y: i64, button: MouseButton, duration: Duration) -> Result<()> {
        self.record(format!(
            "drag_to {x} {y} {} {}ms",
            button_name(button),
            duration.as_millis()
        ));
        Ok(())
    }

    async fn drag(&self, path: Vec<(i64, i64)>, button: MouseButton) -> Result<()> {
        self.record(format!(
            "drag {} points {}",
            path.len(),
            button_name(button)
        ));
        Ok(())
    }
}

#[async_trait]
impl KeyboardOps for RecordingInput {
    async fn key_down(&self, key: &str) -> Result<()> {
        self.record(format!("key_down {key}"));
        Ok(())
    }

    async fn key_up(&self, key: &str) -> Result<()> {
        self.record(format!("key_up {key}"));
        Ok(())
    }

    async fn type_text(&self, text: &str) -> Result<()> {
        self.record(format!("type_text {text}"));
        Ok(())
    }

    async fn press_key(&self, key: &str) -> Result<()> {
        self.record(format!("press_key {key}"));
        Ok(())
    }

    async fn hotkey(&self, keys: Vec<String>) -> Result<()> {
        self.record(format!("hotkey {}", keys.join("+")));
        Ok(())
    }
}

#[async_trait]
impl ScrollOps for RecordingInput {
    async fn scroll(&self, delta_x: i64, delta_y: i64) -> Result<()> {
        self.record(format!("scroll {delta_x} {delta_y}"));
        Ok(())
    }

    async fn scroll_down(&self, clicks: u32) -> Result<()> {
        self.record(format!("scroll_down {clicks}"));
        Ok(())
    }

    async fn scroll_up(&self, clicks: u32) -> Result<()> {
        self.record(format!("scroll_up {clicks}"));
        Ok(())
    }
}

#[async_trait]
impl ClipboardOps for RecordingInput {
    async fn get_clipboard(&self) -> Result<String> {
        Ok(self
            .clipboard
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone())
    }

    async fn set_clipboard(&self, text: &str) -> Result<()> {
        self.record(format!("set_clipboard {text}"));
        *self.clipboard.lock().unwrap_or_else(|e| e.into_inner()) = text.to_string();
        Ok(())
    }
}

/// Screen ops with canned pixel bytes and geometry.
#[derive(Debug, Clone)]
pub struct FixedScreen {
    pub image: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub cursor: (i64, i64),
}

impl Default for FixedScreen {
    fn default() -> Self {
        Self {
            image: b"\x89PNG-not-really".to_vec(),
            width: 1920,
            height: 1080,
            cursor: (640, 360),
        }
    }
}

#[async_trait]
impl ScreenOps for FixedScreen {
    async fn screenshot(&self) -> Result<Vec<u8>> {
        Ok(self.image.clone())
    }

    async fn screen_size(&self) -> Result<(u32, u32)> {
        Ok((self.width, self.height))
    }

    async fn cursor_position(&self) -> Result<(i64, i64)> {
        Ok(self.cursor)
    }
}

/// Accessibility ops over a fixed tree.
#[derive(Debug, Clone)]
pub struct StaticAccessibility {
    pub tree: Value,
}

impl Default for StaticAccessibility {
    fn default() -> Self {
        Self {
            tree: json!({
                "role": "window",
                "title": "Test Window",
                "children": [
                    {"role": "button", "title": "OK"},
                    {"role": "textfield", "title": "Name"},
                ],
            }),
        }
    }
}

#[async_trait]
impl AccessibilityOps for StaticAccessibility {
    async fn tree(&self) -> Result<Value> {
        Ok(self.tree.clone())
    }

    async fn find_element(&self, role: Option<&str>, title: Option<&str>) -> Result<Value> {
        let found = find_in(&self.tree, role, title);
        Ok(found.cloned().unwrap_or(Value::Null))
    }
}

fn find_in<'a>(node: &'a Value, role: Option<&str>, title: Option<&str>) -> Option<&'a Value> {
    let role_matches = role.is_none() || node.get("role").and_then(Value::as_str) == role;
    let title_matches = title.is_none() || node.get("title").and_then(Value::as_str) == title;
    if role_matches && title_matches {
        return Some(node);
    }
    node.get("children")?
        .as_array()?
        .iter()
        .find_map(|child| find_in(child, role, title))
}

/// A platform with every input capability backed by one recorder, plus a
/// fixed screen and a static accessibility tree.
pub fn mock_platform() -> (Platform, Arc<RecordingInput>) {
    let input = RecordingInput::new();
    let platform = Platform::new()
        .with_mouse(Arc::clone(&input) as Arc<dyn MouseOps>)
        .with_keyboard(Arc::clone(&input) as Arc<dyn KeyboardOps>)
        .with_scroll(Arc::clone(&input) as Arc<dyn ScrollOps>)
        .with_clipboard(Arc::clone(&input) as Arc<dyn ClipboardOps>)
        .with_screen(Arc::new(FixedScreen::default()))
        .with_accessibility(Arc::new(StaticAccessibility::default()));
    (platform, input)
}

// =============================================================================
// Tests
// =============================================================================
