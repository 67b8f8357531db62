//! Screen command handlers.

use std::sync::Arc;

use base64::Engine;
use serde_json::json;

use hostlink_core::protocol::ResultEnvelope;

use crate::capability::ScreenOps;
use crate::registry::{payload, CommandRegistry};

pub(crate) fn register(reg: &mut CommandRegistry, ops: Arc<dyn ScreenOps>) {
    {
        let ops = Arc::clone(&ops);
        reg.register("screenshot", move |_params| {
            let ops = Arc::clone(&ops);
            async move {
                let image = ops.screenshot().await?;
                let encoded = base64::engine::general_purpose::STANDARD.encode(image);
                Ok(ResultEnvelope::with(payload(json!({
                    "image_data": encoded,
                }))))
            }
        });
    }
    {
        let ops = Arc::clone(&ops);
        reg.register("get_screen_size", move |_params| {
            let ops = Arc::clone(&ops);
            async move {
                let (width, height) = ops.screen_size().await?;
                Ok(ResultEnvelope::with(payload(json!({
                    "width": width,
                    "height": height,
                }))))
            }
        });
    }
    {
        let ops = Arc::clone(&ops);
        reg.register("get_cursor_position", move |_params| {
            let ops = Arc::clone(&ops);
            async move {
                let (x, y) = ops.cursor_position().await?;
                Ok(ResultEnvelope::with(payload(json!({"x": x, "y": y}))))
            }
        });
    }
}
