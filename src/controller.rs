use {
    crate::{
        config::ModelConfig,
        engine::{EngineBackend, EngineImage, EngineSession},
        prompt::PoemPrompt,
        state::PoemState,
    },
    image::DynamicImage,
    std::sync::{Arc, Mutex},
    tokio::{runtime::Handle, sync::watch, task::JoinSet},
};

/// Mediates access to one underlying inference session.
///
/// The controller owns the session exclusively, enforces single-flight
/// generation (a request arriving while one is in flight is dropped, not
/// queued), and publishes an incrementally updated [`PoemState`] through a
/// watch channel.
///
/// Background tasks are collected in a [`JoinSet`], so dropping the
/// controller aborts anything still pending.
pub struct PoemController {
    state: Arc<watch::Sender<PoemState>>,
    session: Arc<Mutex<Option<Box<dyn EngineSession>>>>,
    tasks: Mutex<JoinSet<()>>,
    handle: Handle,
}

impl PoemController {
    /// Creates the controller and starts the one-shot engine initialization
    /// in the background. Must be called within a Tokio runtime.
    ///
    /// Initialization failure is captured into
    /// [`init_error`](PoemState::init_error) rather than returned; it
    /// permanently disables generation for this controller.
    pub fn new(backend: Arc<dyn EngineBackend>, config: ModelConfig) -> Self {
        let (state, _) = watch::channel(PoemState::new());
        let state = Arc::new(state);
        let session = Arc::new(Mutex::new(None));
        let handle = Handle::current();
        let mut tasks = JoinSet::new();

        {
            let state = state.clone();
            let session = session.clone();

            tasks.spawn_blocking_on(
                move || {
                    let result = backend
                        .create_engine(&config)
                        .and_then(|engine| engine.into_session(&config));

                    match result {
                        Ok(new_session) => {
                            *session.lock().unwrap() = Some(new_session);

                            state.send_modify(|state| {
                                state.loaded = true;
                                state.init_error = None;
                            });

                            tracing::info!("engine loaded");
                        }
                        Err(error) => {
                            tracing::error!("engine initialization failed: {error}");

                            state.send_modify(|state| {
                                state.loaded = true;
                                state.init_error = Some(error);
                            });
                        }
                    }
                },
                &handle,
            );
        }

        Self {
            state,
            session,
            tasks: Mutex::new(tasks),
            handle,
        }
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<PoemState> {
        self.state.subscribe()
    }

    /// Returns a snapshot of the current state.
    pub fn state(&self) -> PoemState {
        self.state.borrow().clone()
    }

    /// Requests a terrible poem about `subject`.
    pub fn request_poem_from_subject(&self, subject: &str) {
        self.state.send_modify(|state| {
            state.prompt_image = None;
            state.title = Some(format!("\"{subject}\""));
        });

        self.generate(PoemPrompt::Subject(subject).to_string(), None);
    }

    /// Requests a roast of the supplied image.
    pub fn request_roast_from_image(&self, image: DynamicImage) {
        let image = Arc::new(image);

        self.state.send_modify(|state| {
            state.prompt_image = Some(image.clone());
            state.title = None;
        });

        self.generate(PoemPrompt::Roast.to_string(), Some(image));
    }

    /// Appends a reaction token to the log of the current poem. Permitted at
    /// any time, streaming or not.
    pub fn add_reaction(&self, reaction: &str) {
        self.state.send_modify(|state| {
            state.reaction_log.push(' ');
            state.reaction_log.push_str(reaction);
        });
    }

    fn generate(&self, prompt: String, image: Option<Arc<DynamicImage>>) {
        // Admission and reset are one atomic step under the watch channel's
        // lock, so concurrent requests cannot both pass the idle check.
        let admitted = self.state.send_if_modified(|state| {
            if !state.idle() {
                return false;
            }

            state.is_complete = false;
            state.verse_text.clear();
            state.reaction_log.clear();

            true
        });

        if !admitted {
            tracing::debug!("generation in flight or engine unavailable, dropping request");

            return;
        }

        let state = self.state.clone();
        let session = self.session.clone();

        self.tasks.lock().unwrap().spawn_blocking_on(
            move || {
                let mut guard = session.lock().unwrap();

                let Some(session) = guard.as_mut() else {
                    tracing::warn!("no session, skipping generation");
                    state.send_modify(|state| state.is_complete = true);

                    return;
                };

                session.enqueue_text(&prompt);

                if let Some(image) = &image {
                    session.enqueue_image(EngineImage::from(image.as_ref()));
                }

                // The engine invokes the callback from a context it controls;
                // send_modify keeps each append-and-flag update atomic.
                let result = session.generate_streaming(&mut |partial, done| {
                    state.send_modify(|state| {
                        state.verse_text.push_str(partial);
                        state.is_complete = done;
                    });
                });

                if let Err(error) = result {
                    tracing::error!("generation failed: {error}");
                    state.send_modify(|state| state.is_complete = true);
                }
            },
            &self.handle,
        );
    }
}
