//! Wire types for the document store REST API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use vitalog_core::store::{FieldFilter, SortSpec};

/// Error envelope returned by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub code: String,
    pub message: String,
}

/// Response to a document insert.
#[derive(Debug, Clone, Deserialize)]
pub struct AddDocumentResponse {
    pub id: String,
}

/// Body of a collection query.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest<'a> {
    pub filters: &'a [FieldFilter],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<&'a SortSpec>,
}

/// Response to a collection query.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    pub documents: Vec<Value>,
}
