//! Ports to the two storage boundaries: the persisted local slot store and
//! the networked document store.

mod local;
mod remote;

pub use local::{read_records, write_records, LocalStore};
pub use remote::{
    document_matches, order_documents, FieldFilter, FilterOp, RemoteStore, SortSpec,
};
