//! Mouse command handlers.

use std::sync::Arc;
use std::time::Duration;

use hostlink_core::protocol::{Params, ResultEnvelope};
use hostlink_core::Result;

use crate::capability::{MouseButton, MouseOps};
use crate::registry::CommandRegistry;

fn button(p: &Params<'_>) -> Result<MouseButton> {
    match p.str_opt("button") {
        Some(name) => name.parse(),
        None => Ok(MouseButton::Left),
    }
}

pub(crate) fn register(reg: &mut CommandRegistry, ops: Arc<dyn MouseOps>) {
    {
        let ops = Arc::clone(&ops);
        reg.register("mouse_down", move |params| {
            let ops = Arc::clone(&ops);
            async move {
                let p = Params::new(&params);
                let b = button(&p)?;
                ops.mouse_down(p.i64_opt("x"), p.i64_opt("y"), b).await?;
                Ok(ResultEnvelope::ok())
            }
        });
    }
    {
        let ops = Arc::clone(&ops);
        reg.register("mouse_up", move |params| {
            let ops = Arc::clone(&ops);
            async move {
                let p = Params::new(&params);
                let b = button(&p)?;
                ops.mouse_up(p.i64_opt("x"), p.i64_opt("y"), b).await?;
                Ok(ResultEnvelope::ok())
            }
        });
    }
    {
        let ops = Arc::clone(&ops);
        reg.register("left_click", move |params| {
            let ops = Arc::clone(&ops);
            async move {
                let p = Params::new(&params);
                ops.click(p.i64_opt("x"), p.i64_opt("y"), MouseButton::Left)
                    .await?;
                Ok(ResultEnvelope::ok())
            }
        });
    }
    {
        let ops = Arc::clone(&ops);
        reg.register("right_click", move |params| {
            let ops = Arc::clone(&ops);
            async move {
                let p = Params::new(&params);
                ops.click(p.i64_opt("x"), p.i64_opt("y"), MouseButton::Right)
                    .await?;
                Ok(ResultEnvelope::ok())
            }
        });
    }
    {
        let ops = Arc::clone(&ops);
        reg.register("double_click", move |params| {
            let ops = Arc::clone(&ops);
            async move {
                let p = Params::new(&params);
                ops.double_click(p.i64_opt("x"), p.i64_opt("y")).await?;
                Ok(ResultEnvelope::ok())
            }
        });
    }
    {
        let ops = Arc::clone(&ops);
        reg.register("move_cursor", move |params| {
            let ops = Arc::clone(&ops);
            async move {
                let p = Params::new(&params);
                ops.move_cursor(p.i64("x")?, p.i64("y")?).await?;
                Ok(ResultEnvelope::ok())
            }
        });
    }
    {
        let ops = Arc::clone(&ops);
        reg.register("drag_to", move |params| {
            let ops = Arc::clone(&ops);
            async move {
                let p = Params::new(&params);
                let b = button(&p)?;
                let duration = Duration::from_millis(p.u64_opt("duration_ms").unwrap_or(500));
                ops.drag_to(p.i64("x")?, p.i64("y")?, b, duration).await?;
                Ok(ResultEnvelope::ok())
            }
        });
    }
    {
        let ops = Arc::clone(&ops);
        reg.register("drag", move |params| {
            let ops = Arc::clone(&ops);
            async move {
                let p = Params::new(&params);
                let b = button(&p)?;
                ops.drag(p.point_array("path")?, b).await?;
                Ok(ResultEnvelope::ok())
            }
        });
    }
}
