//! Point and search-hit models.

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::errors::RagError;

/// A point to upsert: integer id, vector and JSON payload.
///
/// The payload is kept as raw JSON and embedded verbatim into the upsert
/// body; producing valid JSON is the caller's job.
#[derive(Clone, Debug, Serialize)]
pub struct VectorPoint {
    pub id: u64,
    pub vector: Vec<f32>,
    pub payload: Box<RawValue>,
}

/// Payload stored for every ingested document.
#[derive(Debug, Serialize, Deserialize)]
pub struct TextPayload<T> {
    pub text: T,
}

impl VectorPoint {
    pub fn new(id: u64, vector: Vec<f32>, payload: Box<RawValue>) -> Self {
        Self {
            id,
            vector,
            payload,
        }
    }

    /// Builds a point with payload `{"text": text}`.
    ///
    /// # Errors
    /// Returns [`RagError::Encode`] if the payload cannot be serialized.
    pub fn with_text(id: u64, vector: Vec<f32>, text: &str) -> Result<Self, RagError> {
        let payload = serde_json::value::to_raw_value(&TextPayload { text })?;
        Ok(Self::new(id, vector, payload))
    }

    pub fn dimension(&self) -> usize {
        self.vector.len()
    }
}

/// A single search result: point id, similarity score and payload text.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchHit {
    pub id: u64,
    /// Higher is more similar under the collection's metric.
    pub score: f32,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_payload_is_escaped_json() {
        let p = VectorPoint::with_text(3, vec![0.1], r#"say "hi" \ bye"#).unwrap();
        let v: serde_json::Value = serde_json::from_str(p.payload.get()).unwrap();
        assert_eq!(v["text"], r#"say "hi" \ bye"#);
        assert_eq!(p.dimension(), 1);
    }

    #[test]
    fn point_serializes_payload_verbatim() {
        let raw = RawValue::from_string(r#"{"text":"a","tags":["x"]}"#.to_string()).unwrap();
        let p = VectorPoint::new(7, vec![1.0, 2.0], raw);
        let s = serde_json::to_string(&p).unwrap();
        assert_eq!(s, r#"{"id":7,"vector":[1.0,2.0],"payload":{"text":"a","tags":["x"]}}"#);
    }
}
