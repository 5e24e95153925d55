//! Code retrieval pipeline: hybrid semantic/keyword search over indexed
//! repositories, import-aware context expansion, stack-trace driven lookup
//! and budget-constrained context assembly.

pub mod cache;
pub mod chunk;
pub mod dedup;
pub mod error;
pub mod format;
pub mod imports;
pub mod keywords;
pub mod ranking;
pub mod retriever;
pub mod trace;

pub use chunk::RetrievedChunk;
pub use error::{Result, RetrievalError};
pub use format::DEFAULT_MAX_TOKENS;
pub use retriever::{DEFAULT_THRESHOLD, DEFAULT_TOP_K, MAX_TOP_K, Retriever, RetrieverConfig};
pub use trace::TraceReference;
