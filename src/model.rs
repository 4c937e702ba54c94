use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A stored bird record. The text columns are nullable at the schema level,
/// so they serialize back out as `null` when a client stored one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bird {
    pub id: i32,
    pub name: Option<String>,
    pub species: Option<String>,
    pub image: Option<String>,
}

/// Creation payload. All three keys must be present in the request body;
/// the values are taken as raw JSON, and the birds table, not the handler,
/// decides what it will accept.
#[derive(Debug, Deserialize)]
pub struct CreateBird {
    pub name: JsonValue,
    pub species: JsonValue,
    pub image: JsonValue,
}
