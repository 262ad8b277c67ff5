//! Frame sinks.
//!
//! Sinks consume finished frames in index order and are driven by `MorphSession::run`.

/// Numbered still images on disk.
pub mod image_seq;
/// Generic frame sink trait and the in-memory sink.
pub mod sink;
