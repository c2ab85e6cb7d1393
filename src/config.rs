use {
    anyhow::Context,
    serde::Deserialize,
    std::{
        fs,
        path::{Path, PathBuf},
    },
};

/// Configuration for the inference engine and its session.
#[derive(Clone, Debug, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_max_images")]
    pub max_images: u32,
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_vision")]
    pub vision: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
}

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;

        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            max_tokens: default_max_tokens(),
            max_images: default_max_images(),
            top_k: default_top_k(),
            temperature: default_temperature(),
            vision: default_vision(),
        }
    }
}

fn default_model_path() -> PathBuf {
    PathBuf::from("models/gemma3_4b.task")
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_max_images() -> u32 {
    1
}

fn default_top_k() -> u32 {
    10
}

fn default_temperature() -> f32 {
    0.8
}

fn default_vision() -> bool {
    true
}
