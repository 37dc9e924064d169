use serde::{Deserialize, Serialize};

/// Output aspect ratio, forwarded verbatim to the image endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Landscape => "16:9",
            AspectRatio::Portrait => "9:16",
        }
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        AspectRatio::Landscape
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptSource {
    Generate,
    Provide,
}

impl Default for ScriptSource {
    fn default() -> Self {
        ScriptSource::Generate
    }
}

/// Languages the prompt library carries localized instruction sets for.
/// Anything else renders with the English set; the model is still told to
/// answer in the user's language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    Vietnamese,
}

impl Language {
    pub fn for_name(name: &str) -> Language {
        match name.trim().to_lowercase().as_str() {
            "english" | "en" => Language::English,
            "vietnamese" | "tiếng việt" | "vi" => Language::Vietnamese,
            other => {
                log::warn!(
                    "no localized prompt set for language '{}', falling back to English",
                    other
                );
                Language::English
            }
        }
    }
}

/// Everything the user supplies for one project run. Frozen once the
/// pipeline starts; every prompt reads from this and nothing writes to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInput {
    #[serde(default)]
    pub script_source: ScriptSource,
    /// Raw narration script; only consulted when `script_source` is `provide`.
    #[serde(default)]
    pub script_content: String,
    pub topic: String,
    pub channel_type: String,
    pub video_style: String,
    pub image_style: String,
    pub writing_style: String,
    pub duration_in_seconds: u32,
    pub language: String,
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub description: String,
    /// Friendly voice label drawn from the per-language catalog, e.g. "Puck".
    pub voice: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Setting {
    pub name: String,
    pub description: String,
}

/// Single source of visual/audio truth for a run. Later prompts quote the
/// descriptions verbatim instead of re-deriving them, so that scenes
/// generated by independent calls stay consistent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterProfile {
    pub characters: Vec<Character>,
    pub setting: Setting,
    #[serde(rename = "narratorVoice")]
    pub narrator_voice: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneContext {
    pub scene_number: u32,
    pub total_scenes: u32,
}

/// The structured prompt handed to downstream image/voice generators.
/// Field names are a stable contract; renderers consume them by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenePrompt {
    pub scene_context: SceneContext,
    pub character_name: String,
    pub master_description: String,
    pub scene_description: String,
    #[serde(default)]
    pub dialogue_line: String,
    #[serde(default)]
    pub dialogue_character: String,
    pub voice_model: String,
    pub camera_shot: String,
    pub audio_description: String,
    pub style_notes: String,
}

fn default_act() -> u8 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    pub scene_number: u32,
    #[serde(default = "default_act")]
    pub act: u8,
    pub scene_prompt_json: ScenePrompt,
}

/// Scene list returned by one breakdown call for one script chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkScenes {
    pub scenes: Vec<Scene>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformContent {
    pub title: String,
    pub description: String,
    pub hashtags: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TikTokContent {
    pub caption: String,
    pub hashtags: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromotionalContent {
    pub thumbnail_prompt: String,
    pub youtube: PlatformContent,
    pub facebook: PlatformContent,
    pub tiktok: TikTokContent,
}

/// Final pipeline artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryboardData {
    pub scenes: Vec<Scene>,
    pub promotional_content: PromotionalContent,
    pub master_script: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleSuggestion {
    #[serde(rename = "imageStyle")]
    pub image_style: String,
    #[serde(rename = "writingStyle")]
    pub writing_style: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_lookup_is_case_insensitive() {
        assert_eq!(Language::for_name("English"), Language::English);
        assert_eq!(Language::for_name("  vietnamese "), Language::Vietnamese);
        assert_eq!(Language::for_name("vi"), Language::Vietnamese);
    }

    #[test]
    fn unknown_language_falls_back_to_english() {
        assert_eq!(Language::for_name("French"), Language::English);
        assert_eq!(Language::for_name(""), Language::English);
    }

    #[test]
    fn aspect_ratio_serializes_as_display_string() {
        let json = serde_json::to_string(&AspectRatio::Portrait).unwrap();
        assert_eq!(json, "\"9:16\"");
        let back: AspectRatio = serde_json::from_str("\"16:9\"").unwrap();
        assert_eq!(back, AspectRatio::Landscape);
    }

    #[test]
    fn scene_act_defaults_to_one() {
        let json = r#"{
            "scene_number": 4,
            "scene_prompt_json": {
                "scene_context": { "scene_number": 0, "total_scenes": 0 },
                "character_name": "Whiskers",
                "master_description": "A grey tabby in a trench coat.",
                "scene_description": "Whiskers inspects a clue.",
                "dialogue_line": "",
                "dialogue_character": "",
                "voice_model": "Puck",
                "camera_shot": "Close-up",
                "audio_description": "Rain on a tin roof.",
                "style_notes": "Video Style: Noir, Image Style: Noir"
            }
        }"#;
        let scene: Scene = serde_json::from_str(json).unwrap();
        assert_eq!(scene.act, 1);
        assert_eq!(scene.scene_prompt_json.voice_model, "Puck");
    }
}
