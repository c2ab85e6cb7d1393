use {crate::error::EngineError, image::DynamicImage, std::sync::Arc};

/// The observable state of one poem session.
///
/// A single writer (the [`PoemController`](crate::PoemController)) mutates
/// this record through a `tokio::sync::watch` channel; any number of readers
/// observe consistent snapshots of it.
#[derive(Clone, Debug, Default)]
pub struct PoemState {
    /// True once engine initialization has finished, whether or not it
    /// succeeded.
    pub loaded: bool,
    /// Set if initialization failed. Once set, generation requests are
    /// ignored for the rest of the controller's lifetime.
    pub init_error: Option<EngineError>,
    /// The image attached to the current or most recent request.
    pub prompt_image: Option<Arc<DynamicImage>>,
    /// Display label for the current poem. Absent for image-driven roasts.
    pub title: Option<String>,
    /// Accumulated streamed output. Append-only between the start and
    /// completion of one generation; reset when a new request is accepted.
    pub verse_text: String,
    /// False while a generation is streaming. Starts true so the first
    /// request is admitted.
    pub is_complete: bool,
    /// Space-joined reaction tokens for the current poem. Reset when a new
    /// request is accepted.
    pub reaction_log: String,
}

impl PoemState {
    pub fn new() -> Self {
        Self {
            is_complete: true,
            ..Self::default()
        }
    }

    /// Whether a generation request would currently be admitted.
    pub fn idle(&self) -> bool {
        self.loaded && self.init_error.is_none() && self.is_complete
    }
}
