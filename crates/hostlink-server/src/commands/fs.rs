//! Filesystem command handlers.
//!
//! `read_bytes`/`write_bytes` carry binary data as base64 and support the
//! offset/length and append semantics the client's chunked transfer helper
//! relies on.

use std::sync::Arc;

use base64::Engine;
use serde_json::json;

use hostlink_core::protocol::{Params, ResultEnvelope};
use hostlink_core::Error;

use crate::capability::FilesystemOps;
use crate::registry::{payload, CommandRegistry};

pub(crate) fn register(reg: &mut CommandRegistry, ops: Arc<dyn FilesystemOps>) {
    {
        let ops = Arc::clone(&ops);
        reg.register("file_exists", move |params| {
            let ops = Arc::clone(&ops);
            async move {
                let p = Params::new(&params);
                let exists = ops.file_exists(p.str("path")?).await?;
                Ok(ResultEnvelope::with(payload(json!({"exists": exists}))))
            }
        });
    }
    {
        let ops = Arc::clone(&ops);
        reg.register("directory_exists", move |params| {
            let ops = Arc::clone(&ops);
            async move {
                let p = Params::new(&params);
                let exists = ops.directory_exists(p.str("path")?).await?;
                Ok(ResultEnvelope::with(payload(json!({"exists": exists}))))
            }
        });
    }
    {
        let ops = Arc::clone(&ops);
        reg.register("list_dir", move |params| {
            let ops = Arc::clone(&ops);
            async move {
                let p = Params::new(&params);
                let files = ops.list_dir(p.str("path")?).await?;
                Ok(ResultEnvelope::with(payload(json!({"files": files}))))
            }
        });
    }
    {
        let ops = Arc::clone(&ops);
        reg.register("read_text", move |params| {
            let ops = Arc::clone(&ops);
            async move {
                let p = Params::new(&params);
                let content = ops.read_text(p.str("path")?).await?;
                Ok(ResultEnvelope::with(payload(json!({"content": content}))))
            }
        });
    }
    {
        let ops = Arc::clone(&ops);
        reg.register("write_text", move |params| {
            let ops = Arc::clone(&ops);
            async move {
                let p = Params::new(&params);
                ops.write_text(p.str("path")?, p.str("content")?, p.bool_or_false("append"))
                    .await?;
                Ok(ResultEnvelope::ok())
            }
        });
    }
    {
        let ops = Arc::clone(&ops);
        reg.register("read_bytes", move |params| {
            let ops = Arc::clone(&ops);
            async move {
                let p = Params::new(&params);
                let data = ops
                    .read_bytes(p.str("path")?, p.u64_opt("offset"), p.u64_opt("length"))
                    .await?;
                let encoded = base64::engine::general_purpose::STANDARD.encode(data);
                Ok(ResultEnvelope::with(payload(json!({"data": encoded}))))
            }
        });
    }
    {
        let ops = Arc::clone(&ops);
        reg.register("write_bytes", move |params| {
            let ops = Arc::clone(&ops);
            async move {
                let p = Params::new(&params);
                let data = base64::engine::general_purpose::STANDARD
                    .decode(p.str("data")?)
                    .map_err(|e| Error::protocol(format!("invalid base64 data: {e}")))?;
                ops.write_bytes(p.str("path")?, &data, p.bool_or_false("append"))
                    .await?;
                Ok(ResultEnvelope::ok())
            }
        });
    }
    {
        let ops = Arc::clone(&ops);
        reg.register("get_file_size", move |params| {
            let ops = Arc::clone(&ops);
            async move {
                let p = Params::new(&params);
                let size = ops.file_size(p.str("path")?).await?;
                Ok(ResultEnvelope::with(payload(json!({"size": size}))))
            }
        });
    }
    {
        let ops = Arc::clone(&ops);
        reg.register("delete_file", move |params| {
            let ops = Arc::clone(&ops);
            async move {
                let p = Params::new(&params);
                ops.delete_file(p.str("path")?).await?;
                Ok(ResultEnvelope::ok())
            }
        });
    }
    {
        let ops = Arc::clone(&ops);
        reg.register("create_dir", move |params| {
            let ops = Arc::clone(&ops);
            async move {
                let p = Params::new(&params);
                ops.create_dir(p.str("path")?).await?;
                Ok(ResultEnvelope::ok())
            }
        });
    }
    {
        let ops = Arc::clone(&ops);
        reg.register("delete_dir", move |params| {
            let ops = Arc::clone(&ops);
            async move {
                let p = Params::new(&params);
                ops.delete_dir(p.str("path")?).await?;
                Ok(ResultEnvelope::ok())
            }
        });
    }
}
