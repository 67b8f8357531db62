//! Keyboard command handlers.

use std::sync::Arc;

use hostlink_core::protocol::{Params, ResultEnvelope};

use crate::capability::KeyboardOps;
use crate::registry::CommandRegistry;

pub(crate) fn register(reg: &mut CommandRegistry, ops: Arc<dyn KeyboardOps>) {
    {
        let ops = Arc::clone(&ops);
        reg.register("key_down", move |params| {
            let ops = Arc::clone(&ops);
            async move {
                let p = Params::new(&params);
                ops.key_down(p.str("key")?).await?;
                Ok(ResultEnvelope::ok())
            }
        });
    }
    {
        let ops = Arc::clone(&ops);
        reg.register("key_up", move |params| {
            let ops = Arc::clone(&ops);
            async move {
                let p = Params::new(&params);
                ops.key_up(p.str("key")?).await?;
                Ok(ResultEnvelope::ok())
            }
        });
    }
    {
        let ops = Arc::clone(&ops);
        reg.register("type_text", move |params| {
            let ops = Arc::clone(&ops);
            async move {
                let p = Params::new(&params);
                ops.type_text(p.str("text")?).await?;
                Ok(ResultEnvelope::ok())
            }
        });
    }
    {
        let ops = Arc::clone(&ops);
        reg.register("press_key", move |params| {
            let ops = Arc::clone(&ops);
            async move {
                let p = Params::new(&params);
                ops.press_key(p.str("key")?).await?;
                Ok(ResultEnvelope::ok())
            }
        });
    }
    {
        let ops = Arc::clone(&ops);
        reg.register("hotkey", move |params| {
            let ops = Arc::clone(&ops);
            async move {
                let p = Params::new(&params);
                ops.hotkey(p.str_array("keys")?).await?;
                Ok(ResultEnvelope::ok())
            }
        });
    }
}
