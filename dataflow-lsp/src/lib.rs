//! dataflow-lsp library
//!
//! Segmentation of stream, task and app import documents and the LSP backend
//! built on it.

pub mod backend;
pub mod capabilities;
pub mod config;
pub mod convert;
pub mod environment;
pub mod error;
pub mod language;
pub mod operations;
pub mod params;
pub mod state;
pub mod text;

pub use backend::Backend;
pub use error::Error;
