use {
    crate::{config::ModelConfig, error::EngineError},
    image::DynamicImage,
};

/// Constructs engines from a model configuration.
///
/// Engine construction may be slow (it reads and maps the model artifact), so
/// the controller always calls this from a blocking task.
pub trait EngineBackend: Send + Sync {
    fn create_engine(&self, config: &ModelConfig) -> Result<Box<dyn Engine>, EngineError>;
}

/// A loaded inference engine, ready to hand out a session.
pub trait Engine: Send {
    /// Creates the session bound to this engine. The session takes ownership
    /// of the engine, so one engine produces exactly one session.
    fn into_session(
        self: Box<Self>,
        config: &ModelConfig,
    ) -> Result<Box<dyn EngineSession>, EngineError>;
}

/// An inference session.
///
/// Accumulates prompt chunks (text and images), then produces a streamed
/// response through [`generate_streaming`](EngineSession::generate_streaming).
/// Sessions are not reentrant; callers must never overlap generation calls.
pub trait EngineSession: Send {
    fn enqueue_text(&mut self, text: &str);

    fn enqueue_image(&mut self, image: EngineImage);

    /// Runs one generation, blocking until it finishes. `on_partial` is
    /// invoked once per increment of generated text; the final invocation has
    /// `done == true` and no further invocations follow.
    fn generate_streaming(
        &mut self,
        on_partial: &mut dyn FnMut(&str, bool),
    ) -> Result<(), EngineError>;
}

/// The engine's native image representation: tightly packed 8-bit RGB.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EngineImage {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

impl From<&DynamicImage> for EngineImage {
    fn from(image: &DynamicImage) -> Self {
        let rgb = image.to_rgb8();

        Self {
            width: rgb.width(),
            height: rgb.height(),
            rgb: rgb.into_raw(),
        }
    }
}
