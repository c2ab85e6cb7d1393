use {std::path::PathBuf, thiserror::Error};

/// Failures from the underlying inference engine.
///
/// These are captured into [`PoemState::init_error`](crate::PoemState) rather
/// than propagated; a failed initialization permanently disables generation
/// for the controller's lifetime.
#[derive(Clone, Debug, Error)]
pub enum EngineError {
    #[error("load model {0:?}")]
    LoadModel(PathBuf),
    #[error("create session")]
    CreateSession,
    #[error("generate: {0}")]
    Generate(String),
}
