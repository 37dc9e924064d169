use crate::client::GenerationClient;
use crate::config::Config;
use crate::llm::ModelBackend;
use crate::prompts;
use crate::schemas;
use crate::types::{CharacterProfile, StyleSuggestion};
use anyhow::Result;
use inquire::Select;

/// Style catalog offered to the suggestion call when the config leaves the
/// image or writing style blank.
const STYLE_CATALOG: &[&str] = &[
    "Cinematic",
    "Documentary",
    "Anime",
    "Pixar Animation",
    "Watercolor Painting",
    "Noir Film Look",
    "Vintage/Retro Film",
    "Minimalist & Clean",
    "Cyberpunk",
    "Steampunk",
    "Pop Art",
    "Manga (Japanese)",
    "Vlog Style (Casey Neistat)",
    "Tech Review (MKBHD)",
    "Journalistic & Objective",
    "Suspenseful & Dramatic",
    "Witty & Humorous",
    "Poetic & Artistic",
    "Satirical & Ironic",
    "Epic & Grandiose",
];

/// Fill empty image/writing styles from a model suggestion anchored on the
/// chosen video style, then persist the choice. No-op when both are set or
/// when there is no video style to anchor on.
pub async fn fill_missing_styles<B: ModelBackend>(
    config: &mut Config,
    client: &GenerationClient<B>,
) -> Result<()> {
    if config.project.video_style.is_empty() {
        return Ok(());
    }
    if !config.project.image_style.is_empty() && !config.project.writing_style.is_empty() {
        return Ok(());
    }

    println!("Suggesting styles for \"{}\"...", config.project.video_style);
    let prompt = prompts::style_suggestion_prompt(
        &config.project.video_style,
        STYLE_CATALOG,
        STYLE_CATALOG,
    );
    let suggestion: StyleSuggestion = client
        .generate_json(&prompt, &schemas::style_suggestion_schema())
        .await?;

    let mut needs_save = false;
    if config.project.image_style.is_empty() {
        config.project.image_style = suggestion.image_style;
        needs_save = true;
    }
    if config.project.writing_style.is_empty() {
        config.project.writing_style = suggestion.writing_style;
        needs_save = true;
    }

    if needs_save {
        config.save()?;
        println!("Configuration saved.");
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    Accept,
    Regenerate,
    Abort,
}

/// Show the generated profile and ask what to do with it. The accepted
/// profile is frozen: every later prompt quotes it verbatim.
pub fn review_profile(profile: &CharacterProfile) -> Result<ReviewAction> {
    println!("\n--- Generated character profile ---");
    for character in &profile.characters {
        println!("* {} (voice: {})", character.name, character.voice);
        println!("    {}", character.description);
    }
    println!(
        "* Setting: {}\n    {}",
        profile.setting.name, profile.setting.description
    );
    println!("* Narrator voice: {}", profile.narrator_voice);
    println!();

    let options = vec!["Accept profile", "Regenerate", "Abort"];
    let selection = Select::new("Use this character profile?", options).prompt()?;
    Ok(match selection {
        "Regenerate" => ReviewAction::Regenerate,
        "Abort" => ReviewAction::Abort,
        _ => ReviewAction::Accept,
    })
}
