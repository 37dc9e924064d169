use crate::types::{AspectRatio, ScriptSource, UserInput};
use crate::workflow::DEFAULT_CHUNK_SIZE_WORDS;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// API credentials, tried round-robin. Values are opaque here; the
    /// provider rejects bad ones at call time.
    #[serde(default)]
    pub api_keys: Vec<String>,

    #[serde(default = "default_output")]
    pub output_folder: String,

    /// Skip interactive review and accept generated profiles as-is.
    #[serde(default)]
    pub unattended: bool,

    pub project: ProjectConfig,

    #[serde(default)]
    pub generation: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProjectConfig {
    #[serde(default)]
    pub topic: String,

    #[serde(default)]
    pub script_source: ScriptSource,

    /// Used instead of a generated script when `script_source` is `provide`.
    #[serde(default)]
    pub script_content: String,

    #[serde(default = "default_channel_type")]
    pub channel_type: String,

    #[serde(default)]
    pub video_style: String,

    #[serde(default)]
    pub image_style: String,

    #[serde(default)]
    pub writing_style: String,

    #[serde(default = "default_duration")]
    pub duration_in_seconds: u32,

    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default)]
    pub aspect_ratio: AspectRatio,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GenerationConfig {
    #[serde(default = "default_text_model")]
    pub text_model: String,

    #[serde(default = "default_image_model")]
    pub image_model: String,

    #[serde(default = "default_chunk_size")]
    pub chunk_size_words: usize,

    /// Render the promo thumbnail prompt into output/thumbnail.jpg.
    #[serde(default)]
    pub render_thumbnail: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            text_model: default_text_model(),
            image_model: default_image_model(),
            chunk_size_words: default_chunk_size(),
            render_thumbnail: false,
        }
    }
}

fn default_output() -> String {
    "output".to_string()
}
fn default_channel_type() -> String {
    "Commentary/Narrative".to_string()
}
fn default_duration() -> u32 {
    90
}
fn default_language() -> String {
    "English".to_string()
}
fn default_text_model() -> String {
    "gemini-2.5-flash".to_string()
}
fn default_image_model() -> String {
    "imagen-4.0-generate-001".to_string()
}
fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE_WORDS
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("config.yml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!("{} not found. Please create one.", path.display());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = serde_yaml_ng::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(Path::new("config.yml"))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = serde_yaml_ng::to_string(self)?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn ensure_directories(&self) -> Result<()> {
        fs::create_dir_all(&self.output_folder)?;
        Ok(())
    }

    /// The immutable per-run input every downstream prompt consumes.
    pub fn user_input(&self) -> UserInput {
        UserInput {
            script_source: self.project.script_source,
            script_content: self.project.script_content.clone(),
            topic: self.project.topic.clone(),
            channel_type: self.project.channel_type.clone(),
            video_style: self.project.video_style.clone(),
            image_style: self.project.image_style.clone(),
            writing_style: self.project.writing_style.clone(),
            duration_in_seconds: self.project.duration_in_seconds,
            language: self.project.language.clone(),
            aspect_ratio: self.project.aspect_ratio,
        }
    }
}
