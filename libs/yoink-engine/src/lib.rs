//! Request-to-record translation and read-back.
//!
//! [`Publisher`] turns untyped request parameters into a typed, persisted
//! yoink; [`Retriever`] serves bounded newest-first reads. Both hold the
//! same shared [`yoink_api::YoinkStorage`] handle and never call each other.

pub mod error;
pub mod infer;
pub mod params;
pub mod publisher;
mod record;
pub mod retriever;

pub use error::{ErrorClass, StorageOp, YoinkError};
pub use infer::{encode_content, infer_content, infer_value};
pub use params::RawParams;
pub use publisher::Publisher;
pub use retriever::{parse_count, Retriever};
