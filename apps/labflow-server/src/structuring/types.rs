//! Structuring Types
//!
//! The exam record schema shared with the language model and the parsing
//! rules for its responses.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Name of the array field some responses wrap the records in
pub const WRAPPED_ARRAY_FIELD: &str = "exames";

/// Required fields, in schema order
pub const RECORD_FIELDS: [&str; 6] = [
    "NomeCompleto",
    "ResultadoObtido",
    "ValorReferencia",
    "UnidadeMedida",
    "DataColeta",
    "Sigla",
];

/// One laboratory exam line
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamRecord {
    /// Full exam name
    #[serde(rename = "NomeCompleto", default, deserialize_with = "lenient_string")]
    pub full_name: String,
    /// Obtained result
    #[serde(rename = "ResultadoObtido", default, deserialize_with = "lenient_string")]
    pub result: String,
    /// Reference value / range
    #[serde(rename = "ValorReferencia", default, deserialize_with = "lenient_string")]
    pub reference_value: String,
    /// Unit of measure
    #[serde(rename = "UnidadeMedida", default, deserialize_with = "lenient_string")]
    pub unit: String,
    /// Collection date (DD/MM/YYYY as printed on the report)
    #[serde(rename = "DataColeta", default, deserialize_with = "lenient_string")]
    pub collection_date: String,
    /// Standard abbreviation
    #[serde(rename = "Sigla", default, deserialize_with = "lenient_string")]
    pub abbreviation: String,
    /// Uploaded file the record came from
    #[serde(
        rename = "OrigemArquivo",
        default,
        skip_serializing_if = "Option::is_none",
        skip_deserializing
    )]
    pub source_file: Option<String>,
}

impl ExamRecord {
    pub fn tagged(mut self, filename: &str) -> Self {
        self.source_file = Some(filename.to_string());
        self
    }
}

/// Accept strings, numbers and booleans; `null` becomes an empty string
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    })
}

/// Structuring error types
#[derive(Debug, thiserror::Error)]
pub enum StructuringError {
    #[error("Failed to call structuring service: {0}")]
    Transport(String),

    #[error("Structuring service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Structuring service returned no content: {0}")]
    EmptyResponse(String),

    #[error("Failed to parse structuring response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// JSON schema the model output must follow
pub fn response_schema() -> Value {
    let properties: serde_json::Map<String, Value> = RECORD_FIELDS
        .iter()
        .map(|field| (field.to_string(), serde_json::json!({ "type": "STRING" })))
        .collect();

    serde_json::json!({
        "type": "ARRAY",
        "description": "Lista de exames laboratoriais extraídos.",
        "items": {
            "type": "OBJECT",
            "properties": properties,
            "required": RECORD_FIELDS,
        }
    })
}

/// Turn the model's JSON text into records.
///
/// A top-level array, or an object wrapping an `exames` array, yields
/// records; any other shape yields none. Items that are not objects are
/// dropped. Invalid JSON is an error.
pub fn parse_records(raw: &str) -> Result<Vec<ExamRecord>, StructuringError> {
    let value: Value = serde_json::from_str(raw)?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut object) => match object.remove(WRAPPED_ARRAY_FIELD) {
            Some(Value::Array(items)) => items,
            _ => {
                tracing::warn!("Structuring response is not a list of exams");
                return Ok(Vec::new());
            }
        },
        _ => {
            tracing::warn!("Structuring response is not a list of exams");
            return Ok(Vec::new());
        }
    };

    let records = items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value::<ExamRecord>(item).ok())
        .collect();

    Ok(records)
}
