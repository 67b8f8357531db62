//! Typed access to envelope parameters.

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// A read-only view over an envelope's `params` map with typed getters.
///
/// Missing or mistyped parameters become protocol errors naming the
/// offending key, which the server's dispatcher converts into a
/// `success: false` result.
#[derive(Debug, Clone, Copy)]
pub struct Params<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> Params<'a> {
    /// Wrap a parameter map.
    pub fn new(map: &'a Map<String, Value>) -> Self {
        Self { map }
    }

    /// Required string parameter.
    pub fn str(&self, key: &str) -> Result<&'a str> {
        self.map
            .get(key)
            .and_then(Value::as_str)
            .ok_or_else(|| missing(key, "string"))
    }

    /// Optional string parameter.
    pub fn str_opt(&self, key: &str) -> Option<&'a str> {
        self.map.get(key).and_then(Value::as_str)
    }

    /// Required signed integer parameter.
    pub fn i64(&self, key: &str) -> Result<i64> {
        self.map
            .get(key)
            .and_then(Value::as_i64)
            .ok_or_else(|| missing(key, "integer"))
    }

    /// Optional signed integer parameter.
    pub fn i64_opt(&self, key: &str) -> Option<i64> {
        self.map.get(key).and_then(Value::as_i64)
    }

    /// Required unsigned integer parameter.
    pub fn u64(&self, key: &str) -> Result<u64> {
        self.map
            .get(key)
            .and_then(Value::as_u64)
            .ok_or_else(|| missing(key, "unsigned integer"))
    }

    /// Optional unsigned integer parameter.
    pub fn u64_opt(&self, key: &str) -> Option<u64> {
        self.map.get(key).and_then(Value::as_u64)
    }

    /// Bool parameter defaulting to `false` when absent.
    pub fn bool_or_false(&self, key: &str) -> bool {
        self.map
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Required array of strings.
    pub fn str_array(&self, key: &str) -> Result<Vec<String>> {
        let arr = self
            .map
            .get(key)
            .and_then(Value::as_array)
            .ok_or_else(|| missing(key, "array"))?;
        arr.iter()
            .map(|v| {
                v.as_str()
                    .map(str::to_owned)
                    .ok_or_else(|| missing(key, "array of strings"))
            })
            .collect()
    }

    /// Required array of `[x, y]` coordinate pairs.
    pub fn point_array(&self, key: &str) -> Result<Vec<(i64, i64)>> {
        let arr = self
            .map
            .get(key)
            .and_then(Value::as_array)
            .ok_or_else(|| missing(key, "array"))?;
        arr.iter()
            .map(|v| {
                let pair = v.as_array().filter(|p| p.len() == 2);
                match pair {
                    Some(p) => match (p[0].as_i64(), p[1].as_i64()) {
                        (Some(x), Some(y)) => Ok((x, y)),
                        _ => Err(missing(key, "array of [x, y] pairs")),
                    },
                    None => Err(missing(key, "array of [x, y] pairs")),
                }
            })
            .collect()
    }
}

fn missing(key: &str, expected: &str) -> Error {
    Error::protocol(format!("missing or invalid parameter `{key}` (expected {expected})"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(v: Value) -> Map<String, Value> {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn typed_getters() {
        let m = map(json!({"path": "/tmp/a", "offset": 4096, "x": -5, "append": true}));
        let p = Params::new(&m);

        assert_eq!(p.str("path").unwrap(), "/tmp/a");
        assert_eq!(p.u64("offset").unwrap(), 4096);
        assert_eq!(p.i64("x").unwrap(), -5);
        assert!(p.bool_or_false("append"));
        assert!(!p.bool_or_false("not_there"));
        assert_eq!(p.u64_opt("length"), None);
    }

    #[test]
    fn missing_parameter_is_protocol_error() {
        let m = map(json!({}));
        let p = Params::new(&m);
        let err = p.str("path").unwrap_err();
        assert!(err.to_string().contains("path"));
        assert!(err.is_fatal());
    }

    #[test]
    fn wrong_type_is_rejected() {
        let m = map(json!({"offset": "not a number"}));
        let p = Params::new(&m);
        assert!(p.u64("offset").is_err());
    }

    #[test]
    fn string_arrays() {
        let m = map(json!({"keys": ["ctrl", "c"]}));
        let p = Params::new(&m);
        assert_eq!(p.str_array("keys").unwrap(), vec!["ctrl", "c"]);
    }

    #[test]
    fn point_arrays() {
        let m = map(json!({"path": [[0, 0], [10, 20]]}));
        let p = Params::new(&m);
        assert_eq!(p.point_array("path").unwrap(), vec![(0, 0), (10, 20)]);

        let bad = map(json!({"path": [[0], [10, 20]]}));
        assert!(Params::new(&bad).point_array("path").is_err());
    }
}
