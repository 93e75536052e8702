/// Reasons a single input record is rejected before submission.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// The record is not an object of the expected shape (missing keys,
    /// wrong value types).
    #[error("Malformed record: {0}")]
    Shape(#[from] serde_json::Error),

    /// The record decoded but one or more field rules failed.
    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

impl RecordError {
    /// Structured detail for the failure log.
    ///
    /// Field rule failures map to `{ field: [codes] }`; shape failures
    /// carry the decoder message only.
    pub fn details(&self) -> serde_json::Value {
        match self {
            Self::Shape(e) => serde_json::json!({ "shape": e.to_string() }),
            Self::Validation(errors) => {
                let fields: serde_json::Map<String, serde_json::Value> = errors
                    .field_errors()
                    .into_iter()
                    .map(|(field, errs)| {
                        let codes = errs
                            .iter()
                            .map(|e| serde_json::Value::String(e.code.to_string()))
                            .collect();
                        (field.to_string(), serde_json::Value::Array(codes))
                    })
                    .collect();
                serde_json::Value::Object(fields)
            }
        }
    }
}
