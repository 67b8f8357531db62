//! Typed command surface over the dispatcher.
//!
//! [`Computer`] is the library's front door: one method per protocol
//! command, parameter marshalling and payload decoding in one place.
//! A server-reported failure surfaces as [`Error::Command`]; everything
//! below that (transport fallback, reconnection, timeouts) is handled by
//! the dispatcher and connection manager.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use serde_json::{json, Map, Value};

use hostlink_core::coords::{self, Size};
use hostlink_core::protocol::{CommandEnvelope, ResultEnvelope};
use hostlink_core::{ConnectionMetrics, Error, Result};

use crate::chunk::{self, ByteRangeIo};
use crate::config::ClientConfig;
use crate::connection::{ConnectionManager, ConnectionState};
use crate::dispatcher::Dispatcher;
use crate::transport::{RestTransport, WsTransport};

/// Mouse button selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Button {
    #[default]
    Left,
    Middle,
    Right,
}

impl Button {
    pub fn as_str(&self) -> &'static str {
        match self {
            Button::Left => "left",
            Button::Middle => "middle",
            Button::Right => "right",
        }
    }
}

impl FromStr for Button {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "left" => Ok(Button::Left),
            "middle" => Ok(Button::Middle),
            "right" => Ok(Button::Right),
            other => Err(Error::protocol(format!("unknown mouse button: {other}"))),
        }
    }
}

/// Output of a remote shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellOutput {
    pub stdout: String,
    pub stderr: String,
    pub return_code: i64,
}

/// Client handle to one remote machine.
pub struct Computer {
    config: ClientConfig,
    dispatcher: Dispatcher,
    manager: Arc<ConnectionManager>,
}

impl Computer {
    /// Create the handle and start connecting in the background.
    ///
    /// Commands issued before the WebSocket is up still work: REST is
    /// stateless and is the primary transport anyway.
    pub fn connect(config: ClientConfig) -> Result<Self> {
        let manager = Arc::new(ConnectionManager::spawn(config.clone()));
        let rest = RestTransport::new(&config)?;
        let ws = WsTransport::new(Arc::clone(&manager));
        let dispatcher = Dispatcher::new(
            Box::new(rest),
            Some(Box::new(ws)),
            config.command_timeout,
        );
        Ok(Self {
            config,
            dispatcher,
            manager,
        })
    }

    /// Assemble from explicit parts.
    ///
    /// Lets tests inject mock transports through a hand-built dispatcher
    /// while keeping the typed surface.
    pub fn from_parts(
        config: ClientConfig,
        dispatcher: Dispatcher,
        manager: Arc<ConnectionManager>,
    ) -> Self {
        Self {
            config,
            dispatcher,
            manager,
        }
    }

    /// Wait until the WebSocket session is established.
    pub async fn wait_connected(&self) -> Result<()> {
        self.manager.wait_connected().await
    }

    /// Current WebSocket connection state.
    pub fn state(&self) -> ConnectionState {
        self.manager.state()
    }

    /// Snapshot of connection metrics.
    pub fn metrics(&self) -> ConnectionMetrics {
        self.manager.metrics()
    }

    /// Close the WebSocket and stop reconnecting.
    pub fn close(&self) {
        self.manager.close();
    }

    /// Send a raw envelope, bypassing the typed surface.
    ///
    /// The result envelope is returned as-is, including failures.
    pub async fn send_raw(&self, envelope: &CommandEnvelope) -> Result<ResultEnvelope> {
        self.dispatcher.dispatch(envelope).await
    }

    /// Dispatch and convert a reported failure into [`Error::Command`].
    async fn invoke(&self, command: &str, params: Value) -> Result<ResultEnvelope> {
        let envelope = CommandEnvelope::with_params(command, into_map(params));
        let result = self.dispatcher.dispatch(&envelope).await?;
        if result.success {
            Ok(result)
        } else {
            Err(Error::command(
                result.error.unwrap_or_else(|| "unspecified failure".into()),
            ))
        }
    }

    // ----- meta -------------------------------------------------------------

    /// Server version string.
    pub async fn version(&self) -> Result<String> {
        let result = self.invoke("version", json!({})).await?;
        require_str(&result, "version").map(str::to_owned)
    }

    // ----- mouse ------------------------------------------------------------

    pub async fn mouse_down(&self, x: Option<i64>, y: Option<i64>, button: Button) -> Result<()> {
        self.invoke("mouse_down", position(x, y, Some(button)))
            .await
            .map(drop)
    }

    pub async fn mouse_up(&self, x: Option<i64>, y: Option<i64>, button: Button) -> Result<()> {
        self.invoke("mouse_up", position(x, y, Some(button)))
            .await
            .map(drop)
    }

    /// Left click, at the given coordinates or the current cursor position.
    pub async fn left_click(&self, x: Option<i64>, y: Option<i64>) -> Result<()> {
        self.invoke("left_click", position(x, y, None)).await.map(drop)
    }

    pub async fn right_click(&self, x: Option<i64>, y: Option<i64>) -> Result<()> {
        self.invoke("right_click", position(x, y, None))
            .await
            .map(drop)
    }

    pub async fn double_click(&self, x: Option<i64>, y: Option<i64>) -> Result<()> {
        self.invoke("double_click", position(x, y, None))
            .await
            .map(drop)
    }

    pub async fn move_cursor(&self, x: i64, y: i64) -> Result<()> {
        self.invoke("move_cursor", json!({"x": x, "y": y}))
            .await
            .map(drop)
    }

    /// Press, move to (x, y) over `duration`, release.
    pub async fn drag_to(
        &self,
        x: i64,
        y: i64,
        button: Button,
        duration: Option<Duration>,
    ) -> Result<()> {
        let mut params = json!({"x": x, "y": y, "button": button.as_str()});
        if let Some(d) = duration {
            params["duration_ms"] = json!(d.as_millis() as u64);
        }
        self.invoke("drag_to", params).await.map(drop)
    }

    /// Drag along an explicit path of points.
    pub async fn drag(&self, path: &[(i64, i64)], button: Button) -> Result<()> {
        let points: Vec<Value> = path.iter().map(|(x, y)| json!([x, y])).collect();
        self.invoke("drag", json!({"path": points, "button": button.as_str()}))
            .await
            .map(drop)
    }

    // ----- keyboard ---------------------------------------------------------

    pub async fn key_down(&self, key: &str) -> Result<()> {
        self.invoke("key_down", json!({"key": key})).await.map(drop)
    }

    pub async fn key_up(&self, key: &str) -> Result<()> {
        self.invoke("key_up", json!({"key": key})).await.map(drop)
    }

    pub async fn type_text(&self, text: &str) -> Result<()> {
        self.invoke("type_text", json!({"text": text})).await.map(drop)
    }

    pub async fn press_key(&self, key: &str) -> Result<()> {
        self.invoke("press_key", json!({"key": key})).await.map(drop)
    }

    /// Press a key combination, e.g. `["ctrl", "c"]`.
    pub async fn hotkey(&self, keys: &[&str]) -> Result<()> {
        self.invoke("hotkey", json!({"keys": keys})).await.map(drop)
    }

    // ----- scroll -----------------------------------------------------------

    pub async fn scroll(&self, dx: i64, dy: i64) -> Result<()> {
        self.invoke("scroll", json!({"x": dx, "y": dy})).await.map(drop)
    }

    pub async fn scroll_down(&self, clicks: u32) -> Result<()> {
        self.invoke("scroll_down", json!({"clicks": clicks}))
            .await
            .map(drop)
    }

    pub async fn scroll_up(&self, clicks: u32) -> Result<()> {
        self.invoke("scroll_up", json!({"clicks": clicks}))
            .await
            .map(drop)
    }

    // ----- screen -----------------------------------------------------------

    /// Capture the screen; returns encoded image bytes (typically PNG).
    pub async fn screenshot(&self) -> Result<Vec<u8>> {
        let result = self.invoke("screenshot", json!({})).await?;
        let encoded = require_str(&result, "image_data")?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| Error::protocol(format!("invalid screenshot encoding: {e}")))
    }

    pub async fn screen_size(&self) -> Result<(u64, u64)> {
        let result = self.invoke("get_screen_size", json!({})).await?;
        Ok((
            require_u64(&result, "width")?,
            require_u64(&result, "height")?,
        ))
    }

    pub async fn cursor_position(&self) -> Result<(i64, i64)> {
        let result = self.invoke("get_cursor_position", json!({})).await?;
        Ok((require_i64(&result, "x")?, require_i64(&result, "y")?))
    }

    /// Map coordinates picked from a screenshot back to screen space.
    ///
    /// Needed when screenshots aren't captured at the logical screen
    /// resolution (HiDPI, server-side downscaling): a click target chosen
    /// from the image must be rescaled before issuing input commands.
    pub async fn screenshot_to_screen(
        &self,
        x: f64,
        y: f64,
        screenshot: Size,
    ) -> Result<(i64, i64)> {
        let (width, height) = self.screen_size().await?;
        let screen = Size::new(width as u32, height as u32);
        let (sx, sy) = coords::to_screen_coordinates(x, y, screen, screenshot);
        Ok((sx.round() as i64, sy.round() as i64))
    }

    // ----- clipboard --------------------------------------------------------

    pub async fn get_clipboard(&self) -> Result<String> {
        let result = self.invoke("copy_to_clipboard", json!({})).await?;
        require_str(&result, "content").map(str::to_owned)
    }

    pub async fn set_clipboard(&self, text: &str) -> Result<()> {
        self.invoke("set_clipboard", json!({"text": text}))
            .await
            .map(drop)
    }

    // ----- filesystem -------------------------------------------------------

    pub async fn file_exists(&self, path: &str) -> Result<bool> {
        let result = self.invoke("file_exists", json!({"path": path})).await?;
        require_bool(&result, "exists")
    }

    pub async fn directory_exists(&self, path: &str) -> Result<bool> {
        let result = self
            .invoke("directory_exists", json!({"path": path}))
            .await?;
        require_bool(&result, "exists")
    }

    pub async fn list_dir(&self, path: &str) -> Result<Vec<String>> {
        let result = self.invoke("list_dir", json!({"path": path})).await?;
        let files = result
            .get("files")
            .and_then(Value::as_array)
            .ok_or_else(|| missing_field("files"))?;
        Ok(files
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_owned)
            .collect())
    }

    pub async fn read_text(&self, path: &str) -> Result<String> {
        let result = self.invoke("read_text", json!({"path": path})).await?;
        require_str(&result, "content").map(str::to_owned)
    }

    pub async fn write_text(&self, path: &str, content: &str, append: bool) -> Result<()> {
        self.invoke(
            "write_text",
            json!({"path": path, "content": content, "append": append}),
        )
        .await
        .map(drop)
    }

    /// One `read_bytes` command; offset/length select a byte range.
    pub async fn read_bytes(
        &self,
        path: &str,
        offset: Option<u64>,
        length: Option<u64>,
    ) -> Result<Vec<u8>> {
        let mut params = json!({"path": path});
        if let Some(off) = offset {
            params["offset"] = json!(off);
        }
        if let Some(len) = length {
            params["length"] = json!(len);
        }
        let result = self.invoke("read_bytes", params).await?;
        let encoded = require_str(&result, "data")?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| Error::protocol(format!("invalid base64 data: {e}")))
    }

    /// One `write_bytes` command.
    pub async fn write_bytes(&self, path: &str, data: &[u8], append: bool) -> Result<()> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(data);
        self.invoke(
            "write_bytes",
            json!({"path": path, "data": encoded, "append": append}),
        )
        .await
        .map(drop)
    }

    pub async fn get_file_size(&self, path: &str) -> Result<u64> {
        let result = self.invoke("get_file_size", json!({"path": path})).await?;
        require_u64(&result, "size")
    }

    pub async fn delete_file(&self, path: &str) -> Result<()> {
        self.invoke("delete_file", json!({"path": path}))
            .await
            .map(drop)
    }

    pub async fn create_dir(&self, path: &str) -> Result<()> {
        self.invoke("create_dir", json!({"path": path}))
            .await
            .map(drop)
    }

    pub async fn delete_dir(&self, path: &str) -> Result<()> {
        self.invoke("delete_dir", json!({"path": path}))
            .await
            .map(drop)
    }

    /// Read a whole file, chunking when it exceeds the configured threshold.
    pub async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let size = self.get_file_size(path).await?;
        if size > self.config.chunk_threshold {
            chunk::read_chunked(self, path, self.config.chunk_size).await
        } else {
            self.read_bytes(path, None, None).await
        }
    }

    /// Write a whole file, chunking when it exceeds the configured threshold.
    pub async fn write_file(&self, path: &str, data: &[u8], append: bool) -> Result<()> {
        if data.len() as u64 > self.config.chunk_threshold {
            chunk::write_chunked(self, path, data, append, self.config.chunk_size).await
        } else {
            self.write_bytes(path, data, append).await
        }
    }

    // ----- accessibility ----------------------------------------------------

    pub async fn accessibility_tree(&self) -> Result<Value> {
        let result = self.invoke("get_accessibility_tree", json!({})).await?;
        result
            .get("tree")
            .cloned()
            .ok_or_else(|| missing_field("tree"))
    }

    pub async fn find_element(&self, role: Option<&str>, title: Option<&str>) -> Result<Value> {
        let mut params = json!({});
        if let Some(role) = role {
            params["role"] = json!(role);
        }
        if let Some(title) = title {
            params["title"] = json!(title);
        }
        let result = self.invoke("find_element", params).await?;
        result
            .get("element")
            .cloned()
            .ok_or_else(|| missing_field("element"))
    }

    // ----- process ----------------------------------------------------------

    /// Run a shell command on the target.
    pub async fn run_command(
        &self,
        command: &str,
        timeout: Option<Duration>,
    ) -> Result<ShellOutput> {
        let mut params = json!({"command": command});
        if let Some(t) = timeout {
            params["timeout_ms"] = json!(t.as_millis() as u64);
        }
        let result = self.invoke("run_command", params).await?;
        Ok(ShellOutput {
            stdout: require_str(&result, "stdout")?.to_owned(),
            stderr: require_str(&result, "stderr")?.to_owned(),
            return_code: require_i64(&result, "return_code")?,
        })
    }
}

#[async_trait]
impl ByteRangeIo for Computer {
    async fn size(&self, path: &str) -> Result<u64> {
        self.get_file_size(path).await
    }

    async fn read_range(&self, path: &str, offset: u64, length: u64) -> Result<Vec<u8>> {
        self.read_bytes(path, Some(offset), Some(length)).await
    }

    async fn write_range(&self, path: &str, data: &[u8], append: bool) -> Result<()> {
        self.write_bytes(path, data, append).await
    }
}

fn position(x: Option<i64>, y: Option<i64>, button: Option<Button>) -> Value {
    let mut params = json!({});
    if let Some(x) = x {
        params["x"] = json!(x);
    }
    if let Some(y) = y {
        params["y"] = json!(y);
    }
    if let Some(b) = button {
        params["button"] = json!(b.as_str());
    }
    params
}

fn into_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn missing_field(key: &str) -> Error {
    Error::protocol(format!("result missing field `{key}`"))
}

fn require_str<'a>(result: &'a ResultEnvelope, key: &str) -> Result<&'a str> {
    result.get_str(key).ok_or_else(|| missing_field(key))
}

fn require_u64(result: &ResultEnvelope, key: &str) -> Result<u64> {
    result.get_u64(key).ok_or_else(|| missing_field(key))
}

fn require_i64(result: &ResultEnvelope, key: &str) -> Result<i64> {
    result.get_i64(key).ok_or_else(|| missing_field(key))
}

fn require_bool(result: &ResultEnvelope, key: &str) -> Result<bool> {
    result.get_bool(key).ok_or_else(|| missing_field(key))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_roundtrip() {
        assert_eq!(Button::Left.as_str(), "left");
        assert_eq!("right".parse::<Button>().unwrap(), Button::Right);
        assert!("fourth".parse::<Button>().is_err());
    }

    #[test]
    fn position_omits_absent_fields() {
        let p = position(Some(10), None, None);
        assert_eq!(p, json!({"x": 10}));

        let p = position(Some(1), Some(2), Some(Button::Middle));
        assert_eq!(p, json!({"x": 1, "y": 2, "button": "middle"}));
    }

    #[test]
    fn require_helpers_report_missing_fields() {
        let result = ResultEnvelope::ok();
        let err = require_str(&result, "content").unwrap_err();
        assert!(err.to_string().contains("content"));
    }
}
