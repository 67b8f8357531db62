//! Scroll command handlers.

use std::sync::Arc;

use hostlink_core::protocol::{Params, ResultEnvelope};

use crate::capability::ScrollOps;
use crate::registry::CommandRegistry;

pub(crate) fn register(reg: &mut CommandRegistry, ops: Arc<dyn ScrollOps>) {
    {
        let ops = Arc::clone(&ops);
        reg.register("scroll", move |params| {
            let ops = Arc::clone(&ops);
            async move {
                let p = Params::new(&params);
                let dx = p.i64_opt("x").unwrap_or(0);
                let dy = p.i64_opt("y").unwrap_or(0);
                ops.scroll(dx, dy).await?;
                Ok(ResultEnvelope::ok())
            }
        });
    }
    {
        let ops = Arc::clone(&ops);
        reg.register("scroll_down", move |params| {
            let ops = Arc::clone(&ops);
            async move {
                let p = Params::new(&params);
                let clicks = p.u64_opt("clicks").unwrap_or(1) as u32;
                ops.scroll_down(clicks).await?;
                Ok(ResultEnvelope::ok())
            }
        });
    }
    {
        let ops = Arc::clone(&ops);
        reg.register("scroll_up", move |params| {
            let ops = Arc::clone(&ops);
            async move {
                let p = Params::new(&params);
                let clicks = p.u64_opt("clicks").unwrap_or(1) as u32;
                ops.scroll_up(clicks).await?;
                Ok(ResultEnvelope::ok())
            }
        });
    }
}
