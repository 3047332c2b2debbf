//! Cross-cutting, shared constants.
//!
//! Request limits live here so the gateway and the scoring layer agree on them.

/// Hub identifier of the reference cross-encoder.
pub const DEFAULT_MODEL_ID: &str = "BAAI/bge-reranker-v2-m3";

/// Hub revision used when none is configured.
pub const DEFAULT_MODEL_REVISION: &str = "main";

/// Maximum tokens per (query, document) pair after truncation.
pub const MAX_SEQ_LEN: usize = 512;

/// Upper bound on documents accepted by a single rerank request.
pub const MAX_DOCUMENTS: usize = 1000;

/// Request body ceiling: room for `MAX_DOCUMENTS` documents of up to 32 KiB each.
pub const MAX_REQUEST_BODY_BYTES: usize = MAX_DOCUMENTS * 32 * 1024;

/// `top_k` applied by `/rerank/simple` when the caller omits it.
pub const DEFAULT_SIMPLE_TOP_K: usize = 5;

/// Numeric-computation threads used when `RERANK_THREADS` is unset.
pub const DEFAULT_THREADS: usize = 4;

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8080;

/// Model identifier reported by the lexical stub encoder.
pub const STUB_MODEL_ID: &str = "stub/lexical-overlap";
