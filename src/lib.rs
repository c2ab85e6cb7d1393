//! Streams intentionally terrible poems from an on-device language model.
//!
//! The heavy lifting (tokenization, tensor inference) lives behind the
//! [`EngineBackend`] family of traits; this crate owns the session lifecycle,
//! serializes generation requests, and exposes the stream as an observable
//! [`PoemState`] record.

pub use {
    canned::CannedBackend,
    config::{Config, ModelConfig},
    controller::PoemController,
    engine::{Engine, EngineBackend, EngineImage, EngineSession},
    error::EngineError,
    prompt::PoemPrompt,
    state::PoemState,
};

mod canned;
mod config;
mod controller;
mod engine;
mod error;
mod prompt;
mod state;
