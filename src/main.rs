use anyhow::{bail, Context, Result};
use log::info;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use topic2storyboard::client::GenerationClient;
use topic2storyboard::config::Config;
use topic2storyboard::keys::KeyPool;
use topic2storyboard::llm::GeminiBackend;
use topic2storyboard::setup::{self, ReviewAction};
use topic2storyboard::workflow::StoryboardPipeline;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let mut config = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            eprintln!("Please ensure 'config.yml' exists with api_keys and a project section.");
            return Err(e);
        }
    };
    config.ensure_directories()?;

    if config.api_keys.is_empty() {
        bail!("no api_keys configured in config.yml");
    }

    // Fresh pool per run: cursor at 0, every key active.
    let pool = Arc::new(KeyPool::new(config.api_keys.clone()));
    let backend = GeminiBackend::new(
        &config.generation.text_model,
        &config.generation.image_model,
    );
    let client = GenerationClient::new(backend, pool);

    setup::fill_missing_styles(&mut config, &client).await?;

    let input = config.user_input();
    let pipeline = StoryboardPipeline::new(&client, config.generation.chunk_size_words);

    let profile = loop {
        let profile = pipeline.generate_profile(&input).await?;
        if config.unattended {
            break profile;
        }
        match setup::review_profile(&profile)? {
            ReviewAction::Accept => break profile,
            ReviewAction::Regenerate => continue,
            ReviewAction::Abort => bail!("aborted at character review"),
        }
    };

    let master_script = pipeline.generate_master_script(&input, &profile).await?;
    info!(
        "master script is {} words",
        master_script.split_whitespace().count()
    );

    let storyboard = pipeline
        .generate_storyboard(&input, &profile, &master_script)
        .await?;

    let out_dir = Path::new(&config.output_folder);
    let storyboard_path = out_dir.join("storyboard.json");
    fs::write(
        &storyboard_path,
        serde_json::to_string_pretty(&storyboard)?,
    )
    .with_context(|| format!("failed to write {}", storyboard_path.display()))?;
    println!(
        "Storyboard with {} scenes written to {}",
        storyboard.scenes.len(),
        storyboard_path.display()
    );

    if config.generation.render_thumbnail {
        let bytes = client
            .generate_image(
                &storyboard.promotional_content.thumbnail_prompt,
                input.aspect_ratio,
            )
            .await?;
        let thumbnail_path = out_dir.join("thumbnail.jpg");
        fs::write(&thumbnail_path, bytes)
            .with_context(|| format!("failed to write {}", thumbnail_path.display()))?;
        println!("Thumbnail written to {}", thumbnail_path.display());
    }

    Ok(())
}
