//! HTTP implementation of the remote document-collection store.

mod client;
mod types;

pub use client::DocumentStoreClient;
pub use types::{AddDocumentResponse, ApiErrorResponse, QueryRequest, QueryResponse};
