//! Shell execution command handlers.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use hostlink_core::protocol::{Params, ResultEnvelope};

use crate::capability::ProcessOps;
use crate::registry::{payload, CommandRegistry};

pub(crate) fn register(reg: &mut CommandRegistry, ops: Arc<dyn ProcessOps>) {
    let ops = Arc::clone(&ops);
    reg.register("run_command", move |params| {
        let ops = Arc::clone(&ops);
        async move {
            let p = Params::new(&params);
            let timeout = p.u64_opt("timeout_ms").map(Duration::from_millis);
            let output = ops.run_command(p.str("command")?, timeout).await?;
            Ok(ResultEnvelope::with(payload(json!({
                "stdout": output.stdout,
                "stderr": output.stderr,
                "return_code": output.return_code,
            }))))
        }
    });
}
