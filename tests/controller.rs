use {
    doggerel::{
        CannedBackend, Engine, EngineBackend, EngineError, EngineImage, EngineSession,
        ModelConfig, PoemController,
    },
    image::DynamicImage,
    std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            mpsc::{self, Receiver, Sender},
            Arc, Mutex,
        },
        time::Duration,
    },
};

/// Shared observation point for the scripted engine: what the controller fed
/// it, and how often it was asked to generate. Tests drive the stream by
/// sending `(partial, done)` pairs through `chunks`.
struct Script {
    generate_calls: AtomicUsize,
    texts: Mutex<Vec<String>>,
    images: AtomicUsize,
    chunks: Mutex<Receiver<(String, bool)>>,
}

struct ScriptedBackend {
    script: Arc<Script>,
    load_gate: Option<Mutex<Receiver<()>>>,
}

struct ScriptedEngine {
    script: Arc<Script>,
}

struct ScriptedSession {
    script: Arc<Script>,
}

fn scripted() -> (Arc<ScriptedBackend>, Arc<Script>, Sender<(String, bool)>) {
    let (feed, chunks) = mpsc::channel();
    let script = Arc::new(Script {
        generate_calls: AtomicUsize::new(0),
        texts: Mutex::new(Vec::new()),
        images: AtomicUsize::new(0),
        chunks: Mutex::new(chunks),
    });
    let backend = Arc::new(ScriptedBackend {
        script: script.clone(),
        load_gate: None,
    });

    (backend, script, feed)
}

fn scripted_gated() -> (
    Arc<ScriptedBackend>,
    Arc<Script>,
    Sender<(String, bool)>,
    Sender<()>,
) {
    let (open, gate) = mpsc::channel();
    let (backend, script, feed) = scripted();
    let backend = Arc::new(ScriptedBackend {
        script: backend.script.clone(),
        load_gate: Some(Mutex::new(gate)),
    });

    (backend, script, feed, open)
}

impl EngineBackend for ScriptedBackend {
    fn create_engine(&self, _config: &ModelConfig) -> Result<Box<dyn Engine>, EngineError> {
        if let Some(gate) = &self.load_gate {
            let _ = gate.lock().unwrap().recv();
        }

        Ok(Box::new(ScriptedEngine {
            script: self.script.clone(),
        }))
    }
}

impl Engine for ScriptedEngine {
    fn into_session(
        self: Box<Self>,
        _config: &ModelConfig,
    ) -> Result<Box<dyn EngineSession>, EngineError> {
        Ok(Box::new(ScriptedSession {
            script: self.script,
        }))
    }
}

impl EngineSession for ScriptedSession {
    fn enqueue_text(&mut self, text: &str) {
        self.script.texts.lock().unwrap().push(text.to_string());
    }

    fn enqueue_image(&mut self, _image: EngineImage) {
        self.script.images.fetch_add(1, Ordering::SeqCst);
    }

    fn generate_streaming(
        &mut self,
        on_partial: &mut dyn FnMut(&str, bool),
    ) -> Result<(), EngineError> {
        self.script.generate_calls.fetch_add(1, Ordering::SeqCst);

        let chunks = self.script.chunks.lock().unwrap();

        loop {
            let (partial, done) = chunks
                .recv()
                .map_err(|_| EngineError::Generate(String::from("script closed")))?;

            on_partial(&partial, done);

            if done {
                return Ok(());
            }
        }
    }
}

struct FailingBackend;

impl EngineBackend for FailingBackend {
    fn create_engine(&self, config: &ModelConfig) -> Result<Box<dyn Engine>, EngineError> {
        Err(EngineError::LoadModel(config.model_path.clone()))
    }
}

async fn loaded_controller(backend: Arc<ScriptedBackend>) -> PoemController {
    let controller = PoemController::new(backend, ModelConfig::default());
    let mut state = controller.subscribe();

    state.wait_for(|state| state.loaded).await.unwrap();

    controller
}

#[tokio::test]
async fn single_flight_drops_second_request() {
    let (backend, script, feed) = scripted();
    let controller = loaded_controller(backend).await;
    let mut state = controller.subscribe();

    controller.request_poem_from_subject("rust");
    controller.request_poem_from_subject("tokio");

    feed.send((String::from("done\n"), true)).unwrap();
    state.wait_for(|state| state.is_complete).await.unwrap();

    assert_eq!(script.generate_calls.load(Ordering::SeqCst), 1);

    let texts = script.texts.lock().unwrap();

    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("rust"));
}

#[tokio::test]
async fn accepted_request_resets_state() {
    let (backend, _script, feed) = scripted();
    let controller = loaded_controller(backend).await;

    controller.add_reaction("🔥");
    controller.request_poem_from_subject("dust");

    let state = controller.state();

    assert_eq!(state.verse_text, "");
    assert_eq!(state.reaction_log, "");
    assert!(!state.is_complete);

    feed.send((String::new(), true)).unwrap();
}

#[tokio::test]
async fn verse_accumulates_monotonically() {
    let (backend, _script, feed) = scripted();
    let controller = loaded_controller(backend).await;
    let mut state = controller.subscribe();

    controller.request_poem_from_subject("moss");

    feed.send((String::from("p1"), false)).unwrap();

    {
        let snapshot = state.wait_for(|state| state.verse_text == "p1").await.unwrap();

        assert!(!snapshot.is_complete);
    }

    feed.send((String::from("p2"), false)).unwrap();

    {
        let snapshot = state
            .wait_for(|state| state.verse_text == "p1p2")
            .await
            .unwrap();

        assert!(!snapshot.is_complete);
    }

    feed.send((String::from("p3"), true)).unwrap();

    let snapshot = state.wait_for(|state| state.is_complete).await.unwrap();

    assert_eq!(snapshot.verse_text, "p1p2p3");
}

#[tokio::test]
async fn init_failure_gates_generation() {
    let controller = PoemController::new(Arc::new(FailingBackend), ModelConfig::default());
    let mut state = controller.subscribe();

    state.wait_for(|state| state.loaded).await.unwrap();
    assert!(controller.state().init_error.is_some());

    controller.request_poem_from_subject("anything");

    let state = controller.state();

    assert_eq!(state.verse_text, "");
    assert!(state.is_complete);
}

#[tokio::test]
async fn requests_before_load_are_dropped() {
    let (backend, script, feed, open) = scripted_gated();
    let controller = PoemController::new(backend, ModelConfig::default());

    controller.request_poem_from_subject("too early");

    let state = controller.state();

    assert!(state.is_complete);
    assert_eq!(state.verse_text, "");

    open.send(()).unwrap();

    let mut state = controller.subscribe();

    state.wait_for(|state| state.loaded).await.unwrap();
    assert_eq!(script.generate_calls.load(Ordering::SeqCst), 0);

    controller.request_poem_from_subject("on time");
    feed.send((String::from("ok\n"), true)).unwrap();
    state.wait_for(|state| state.is_complete).await.unwrap();

    assert_eq!(script.generate_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn reactions_accumulate_independently() {
    let (backend, _script, _feed) = scripted();
    let controller = PoemController::new(backend, ModelConfig::default());

    controller.add_reaction("🔥");
    controller.add_reaction("😂");

    assert_eq!(controller.state().reaction_log, " 🔥 😂");
}

#[tokio::test]
async fn subject_flow_end_to_end() {
    let (backend, _script, feed) = scripted();
    let controller = loaded_controller(backend).await;
    let mut state = controller.subscribe();

    controller.request_poem_from_subject("a broken toaster");

    {
        let snapshot = controller.state();

        assert_eq!(snapshot.title.as_deref(), Some("\"a broken toaster\""));
        assert!(snapshot.prompt_image.is_none());
    }

    feed.send((String::from("Roses are red,\n"), false)).unwrap();
    feed.send((String::from("toaster's dead.\n"), true)).unwrap();

    let snapshot = state.wait_for(|state| state.is_complete).await.unwrap();

    assert_eq!(snapshot.verse_text, "Roses are red,\ntoaster's dead.\n");
}

#[tokio::test]
async fn roast_flow_attaches_image() {
    let (backend, script, feed) = scripted();
    let controller = loaded_controller(backend).await;
    let mut state = controller.subscribe();

    controller.request_roast_from_image(DynamicImage::new_rgb8(2, 2));

    {
        let snapshot = controller.state();

        assert!(snapshot.title.is_none());
        assert!(snapshot.prompt_image.is_some());
    }

    feed.send((String::from("ouch\n"), true)).unwrap();
    state.wait_for(|state| state.is_complete).await.unwrap();

    assert_eq!(script.images.load(Ordering::SeqCst), 1);

    let texts = script.texts.lock().unwrap();

    assert!(texts[0].starts_with("Roast me!"));
}

#[tokio::test]
async fn canned_backend_completes() {
    let backend = Arc::new(CannedBackend::new().pacing(Duration::ZERO));
    let controller = PoemController::new(backend, ModelConfig::default());
    let mut state = controller.subscribe();

    state.wait_for(|state| state.loaded).await.unwrap();
    controller.request_poem_from_subject("integration tests");

    let snapshot = state
        .wait_for(|state| state.is_complete && !state.verse_text.is_empty())
        .await
        .unwrap();

    assert!(snapshot.verse_text.contains("integration tests"));
}
