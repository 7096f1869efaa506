//! Face detection and encoding for a long-lived stdin/stdout worker.
//!
//! Layers follow a domain/infrastructure split: traits in `domain`
//! modules, ONNX Runtime and file-system implementations in
//! `infrastructure`, orchestration in `pipeline` and `worker`.

pub mod detection;
pub mod encoding;
pub mod imaging;
pub mod pipeline;
pub mod shared;
pub mod worker;
