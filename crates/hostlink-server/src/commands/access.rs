//! Accessibility command handlers.

use std::sync::Arc;

use serde_json::json;

use hostlink_core::protocol::{Params, ResultEnvelope};

use crate::capability::AccessibilityOps;
use crate::registry::{payload, CommandRegistry};

pub(crate) fn register(reg: &mut CommandRegistry, ops: Arc<dyn AccessibilityOps>) {
    {
        let ops = Arc::clone(&ops);
        reg.register("get_accessibility_tree", move |_params| {
            let ops = Arc::clone(&ops);
            async move {
                let tree = ops.tree().await?;
                Ok(ResultEnvelope::with(payload(json!({"tree": tree}))))
            }
        });
    }
    {
        let ops = Arc::clone(&ops);
        reg.register("find_element", move |params| {
            let ops = Arc::clone(&ops);
            async move {
                let p = Params::new(&params);
                let element = ops
                    .find_element(p.str_opt("role"), p.str_opt("title"))
                    .await?;
                Ok(ResultEnvelope::with(payload(json!({"element": element}))))
            }
        });
    }
}
