use std::error::Error;

pub type GenericError = Box<dyn Error + Send + Sync>;

/// Resource identifiers are synthetic strings ("SUB-1007", "ALM-3"); the
/// numeric suffix feeds the per-store auto-increment counter.
pub type ResourceId = String;

pub type JsonObject = serde_json::Map<String, serde_json::Value>;
