use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::{VerdictError, VerdictResult};
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// CanonicalRecord — deterministic byte encoding of a signable field subset
//
// Same logical content must always yield byte-identical output regardless of
// construction order: keys are sorted lexicographically (BTreeMap iteration
// order), absent optional values are encoded as an explicit JSON null, and
// timestamps are fixed to second-precision ISO-8601 UTC. Floats are not
// admitted, so no formatting ambiguity can enter the signed bytes.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct CanonicalRecord {
    fields: BTreeMap<String, Value>,
}

impl CanonicalRecord {
    pub fn new() -> Self {
        Self {
            fields: BTreeMap::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.fields.insert(name.to_string(), Value::from(value));
        self
    }

    pub fn text_list(mut self, name: &str, values: &[String]) -> Self {
        let list: Vec<Value> = values.iter().map(|v| Value::from(v.as_str())).collect();
        self.fields.insert(name.to_string(), Value::from(list));
        self
    }

    pub fn int(mut self, name: &str, value: i64) -> Self {
        self.fields.insert(name.to_string(), Value::from(value));
        self
    }

    /// Absent values are written as explicit `null` so "field missing" and
    /// "field present but empty" can never collide in the canonical bytes.
    pub fn optional_int(mut self, name: &str, value: Option<i64>) -> Self {
        let encoded = match value {
            Some(v) => Value::from(v),
            None => Value::Null,
        };
        self.fields.insert(name.to_string(), encoded);
        self
    }

    pub fn timestamp(mut self, name: &str, value: &Timestamp) -> Self {
        self.fields
            .insert(name.to_string(), Value::from(value.to_canonical_utc()));
        self
    }

    /// Serialize to the canonical byte form. BTreeMap guarantees the
    /// lexicographic key order that makes this deterministic.
    pub fn to_bytes(&self) -> VerdictResult<Vec<u8>> {
        serde_json::to_vec(&self.fields).map_err(|e| VerdictError::Serialization(e.to_string()))
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(|k| k.as_str()).collect()
    }
}
