//! Clipboard command handlers.

use std::sync::Arc;

use serde_json::json;

use hostlink_core::protocol::{Params, ResultEnvelope};

use crate::capability::ClipboardOps;
use crate::registry::{payload, CommandRegistry};

pub(crate) fn register(reg: &mut CommandRegistry, ops: Arc<dyn ClipboardOps>) {
    {
        let ops = Arc::clone(&ops);
        reg.register("copy_to_clipboard", move |_params| {
            let ops = Arc::clone(&ops);
            async move {
                let content = ops.get_clipboard().await?;
                Ok(ResultEnvelope::with(payload(json!({"content": content}))))
            }
        });
    }
    {
        let ops = Arc::clone(&ops);
        reg.register("set_clipboard", move |params| {
            let ops = Arc::clone(&ops);
            async move {
                let p = Params::new(&params);
                ops.set_clipboard(p.str("text")?).await?;
                Ok(ResultEnvelope::ok())
            }
        });
    }
}
