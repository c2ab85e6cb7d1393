use {
    crate::{
        config::ModelConfig,
        engine::{Engine, EngineBackend, EngineImage, EngineSession},
        error::EngineError,
    },
    rand::seq::SliceRandom,
    std::{thread, time::Duration},
};

const SUBJECT_MARKER: &str = "following subject: ";

const SUBJECT_VERSES: &[&str] = &[
    "O {subject}, jewel of my weary days,\n\
     you shimmer like a damp potato in the haze.\n\
     The poets wept, the heavens gave a snort,\n\
     for {subject} was built in eighteen-two, or thereabouts, in court.\n",
    "Behold! {subject}, majestic and absurd,\n\
     more graceful than a slightly startled bird.\n\
     Napoleon himself once said, \"how grand,\"\n\
     though history insists he'd never heard of {subject} firsthand.\n",
    "{subject}, {subject}, burning bright,\n\
     approximately beige in morning light.\n\
     My heart doth yearn, my spleen doth too,\n\
     for no one rhymes with {subject} quite like you.\n",
];

const ROAST_VERSES: &[&str] = &[
    "I gazed upon this portrait, bold and proud,\n\
     and heard the camera weeping, long and loud.\n\
     The lens survived, though critics still debate\n\
     if focus fled the scene, or simply fate.\n",
    "A face like thunder, posture like a prawn,\n\
     the kind of look that makes the daylight yawn.\n\
     Yet fear not, friend, for beauty is within,\n\
     presumably quite deep beneath the skin.\n",
];

/// A backend that streams pre-written terrible poems.
///
/// Stands in for a real on-device engine so the demo binary runs anywhere.
/// It honors the configured image budget and vision flag, and paces its
/// output to feel like token-by-token generation.
pub struct CannedBackend {
    pacing: Duration,
}

struct CannedEngine {
    pacing: Duration,
}

struct CannedSession {
    text: String,
    images: Vec<EngineImage>,
    max_images: usize,
    vision: bool,
    pacing: Duration,
}

impl CannedBackend {
    pub fn new() -> Self {
        Self {
            pacing: Duration::from_millis(150),
        }
    }

    /// Sets the delay between streamed chunks.
    pub fn pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;

        self
    }
}

impl Default for CannedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBackend for CannedBackend {
    fn create_engine(&self, config: &ModelConfig) -> Result<Box<dyn Engine>, EngineError> {
        tracing::debug!("pretending to load {:?}", config.model_path);

        Ok(Box::new(CannedEngine {
            pacing: self.pacing,
        }))
    }
}

impl Engine for CannedEngine {
    fn into_session(
        self: Box<Self>,
        config: &ModelConfig,
    ) -> Result<Box<dyn EngineSession>, EngineError> {
        Ok(Box::new(CannedSession {
            text: String::new(),
            images: Vec::new(),
            max_images: config.max_images as usize,
            vision: config.vision,
            pacing: self.pacing,
        }))
    }
}

impl EngineSession for CannedSession {
    fn enqueue_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    fn enqueue_image(&mut self, image: EngineImage) {
        if !self.vision {
            tracing::warn!("vision disabled, dropping image");

            return;
        }

        if self.images.len() >= self.max_images {
            tracing::warn!("image budget ({}) exhausted, dropping image", self.max_images);

            return;
        }

        self.images.push(image);
    }

    fn generate_streaming(
        &mut self,
        on_partial: &mut dyn FnMut(&str, bool),
    ) -> Result<(), EngineError> {
        let verse = self.compose();
        let lines = verse.split_inclusive('\n').collect::<Vec<_>>();
        let last = lines.len().saturating_sub(1);

        for (index, line) in lines.iter().enumerate() {
            if index > 0 {
                thread::sleep(self.pacing);
            }

            on_partial(line, index == last);
        }

        self.text.clear();
        self.images.clear();

        Ok(())
    }
}

impl CannedSession {
    fn compose(&self) -> String {
        let mut rng = rand::thread_rng();

        if self.images.is_empty() {
            let subject = subject_of(&self.text);
            let template = SUBJECT_VERSES.choose(&mut rng).copied().unwrap_or_default();

            template.replace("{subject}", subject)
        } else {
            ROAST_VERSES.choose(&mut rng).copied().unwrap_or_default().into()
        }
    }
}

/// Recovers the poem subject from the templated prompt, falling back to a
/// catch-all when the prompt doesn't carry one.
fn subject_of(prompt: &str) -> &str {
    prompt
        .find(SUBJECT_MARKER)
        .map(|start| {
            let rest = &prompt[start + SUBJECT_MARKER.len()..];

            rest.find(". It should").map_or(rest, |end| &rest[..end])
        })
        .unwrap_or("everything")
}
