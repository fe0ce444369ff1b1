//! Common test utilities for pipeline integration tests
//!
//! Shared review corpora and helpers for writing them to disk in the
//! formats the ingestion sources read.

pub mod corpus;

pub use corpus::{mixed_corpus, write_json, write_text, ReviewCorpus};
