use crate::chunk::chunk_script;
use crate::client::GenerationClient;
use crate::error::GenerationError;
use crate::llm::ModelBackend;
use crate::prompts::{self, DirectorsBible};
use crate::schemas;
use crate::types::{
    CharacterProfile, ChunkScenes, Language, PromotionalContent, Scene, SceneContext,
    ScenePrompt, ScriptSource, StoryboardData, UserInput,
};
use crate::voices;
use futures_util::future::join_all;
use log::info;

pub const DEFAULT_CHUNK_SIZE_WORDS: usize = 350;

/// Top-level pipeline for one project run:
/// profile -> master script -> chunked breakdown (+ promo, concurrently) ->
/// merge -> renumber -> voice normalization.
///
/// Each stage consumes the validated output of the one before it; a stage
/// failure ends the run (client failures already carry a user-facing
/// message and are not reinterpreted here).
pub struct StoryboardPipeline<'a, B> {
    client: &'a GenerationClient<B>,
    chunk_size_words: usize,
}

impl<'a, B: ModelBackend> StoryboardPipeline<'a, B> {
    pub fn new(client: &'a GenerationClient<B>, chunk_size_words: usize) -> Self {
        Self {
            client,
            chunk_size_words,
        }
    }

    /// Stage 1. The returned profile may be user-edited before the caller
    /// feeds it back into the later stages; from there on it is frozen.
    pub async fn generate_profile(
        &self,
        input: &UserInput,
    ) -> Result<CharacterProfile, GenerationError> {
        info!("stage: character profile generation");
        let prompt = prompts::character_profile_prompt(input);
        self.client
            .generate_json(&prompt, &schemas::character_profile_schema())
            .await
    }

    /// Stage 2. With a user-provided script the call is skipped and the
    /// provided text becomes the master script verbatim. The word window is
    /// enforced only inside the prompt; the output is stored as-is.
    pub async fn generate_master_script(
        &self,
        input: &UserInput,
        profile: &CharacterProfile,
    ) -> Result<String, GenerationError> {
        if input.script_source == ScriptSource::Provide {
            info!("stage: master script provided by user, generation skipped");
            return Ok(input.script_content.clone());
        }
        info!("stage: master script generation");
        let budget = prompts::word_budget(input.duration_in_seconds);
        let prompt = prompts::master_script_prompt(input, profile, &budget);
        self.client.generate_text(&prompt).await
    }

    /// Stages 3-5: fan out one breakdown call per chunk plus the promo
    /// call, merge in chunk order, renumber, normalize voices.
    pub async fn generate_storyboard(
        &self,
        input: &UserInput,
        profile: &CharacterProfile,
        master_script: &str,
    ) -> Result<StoryboardData, GenerationError> {
        let chunks = chunk_script(master_script, self.chunk_size_words);
        if chunks.is_empty() {
            return Err(GenerationError::MalformedResponse(
                "master script contains no words".to_string(),
            ));
        }

        info!(
            "stage: breakdown, {} chunk call(s) plus promotional content",
            chunks.len()
        );
        let bible = DirectorsBible::render(input, profile);

        let chunk_futures: Vec<_> = chunks
            .iter()
            .map(|chunk| {
                let prompt = bible.prefix(&prompts::breakdown_chunk_prompt(chunk, &input.language));
                let schema = schemas::chunk_scenes_schema();
                async move {
                    self.client
                        .generate_json::<ChunkScenes>(&prompt, &schema)
                        .await
                }
            })
            .collect();

        let promo_prompt =
            bible.prefix(&prompts::promo_content_prompt(master_script, &input.language));
        let promo_schema = schemas::promotional_content_schema();
        let promo_future = self
            .client
            .generate_json::<PromotionalContent>(&promo_prompt, &promo_schema);

        // Everything is dispatched before the first await, and every call
        // runs to completion before the stage reports success or failure.
        // join_all yields results in dispatch order, which is chunk order;
        // completion order plays no part in the merge.
        let (chunk_results, promo_result) =
            futures_util::join!(join_all(chunk_futures), promo_future);

        let mut chunk_scenes = Vec::with_capacity(chunk_results.len());
        for result in chunk_results {
            chunk_scenes.push(result?);
        }
        let promotional_content = promo_result?;

        info!("stage: merge and renumber");
        let scenes = merge_scenes(chunk_scenes);

        info!("stage: voice normalization");
        let language = Language::for_name(&input.language);
        let scenes = normalize_voices(scenes, profile, language);

        Ok(StoryboardData {
            scenes,
            promotional_content,
            master_script: master_script.to_string(),
        })
    }

    /// Whole pipeline in one go, for callers without a review step between
    /// profile and script.
    pub async fn run(&self, input: &UserInput) -> Result<StoryboardData, GenerationError> {
        let profile = self.generate_profile(input).await?;
        let master_script = self.generate_master_script(input, &profile).await?;
        self.generate_storyboard(input, &profile, &master_script)
            .await
    }
}

/// Concatenates chunk scene lists in chunk order and overwrites whatever
/// numbering the model produced: sequence numbers become a contiguous
/// 1-based run, and every scene context gets the final merged total.
pub fn merge_scenes(chunks: Vec<ChunkScenes>) -> Vec<Scene> {
    let mut scenes: Vec<Scene> = chunks.into_iter().flat_map(|c| c.scenes).collect();
    let total = scenes.len() as u32;
    for (index, scene) in scenes.iter_mut().enumerate() {
        let number = index as u32 + 1;
        scene.scene_number = number;
        scene.scene_prompt_json.scene_context = SceneContext {
            scene_number: number,
            total_scenes: total,
        };
    }
    scenes
}

/// Rewrites each scene's voice to the technical identifier for its
/// speaker: "Narrator" maps through the profile's narrator voice, a named
/// character through that character's voice (case-insensitive). Scenes
/// whose speaker matches neither keep their voice field untouched, and
/// labels missing from the language table pass through unchanged.
pub fn normalize_voices(
    scenes: Vec<Scene>,
    profile: &CharacterProfile,
    language: Language,
) -> Vec<Scene> {
    scenes
        .into_iter()
        .map(|scene| {
            let Scene {
                scene_number,
                act,
                scene_prompt_json,
            } = scene;
            let speaker = scene_prompt_json.dialogue_character.trim();
            let label = if speaker.eq_ignore_ascii_case("narrator") {
                Some(profile.narrator_voice.clone())
            } else {
                profile
                    .characters
                    .iter()
                    .find(|c| c.name.eq_ignore_ascii_case(speaker))
                    .map(|c| c.voice.clone())
            };
            let scene_prompt_json = match label {
                Some(label) => ScenePrompt {
                    voice_model: voices::resolve(&label, language),
                    ..scene_prompt_json
                },
                None => scene_prompt_json,
            };
            Scene {
                scene_number,
                act,
                scene_prompt_json,
            }
        })
        .collect()
}
