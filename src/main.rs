mod config;
mod error;
mod generator;
mod illustrator;
mod imaging;
mod llm;
mod markers;
mod params;
mod pipeline;
mod render;
mod story;
mod wizard;

use anyhow::Result;
use config::Config;
use inquire::{Confirm, Select};
use params::StoryParameters;
use pipeline::StoryPipeline;
use render::{DocumentRenderer, RenderTarget};
use std::fs;
use std::path::{Path, PathBuf};
use story::Story;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    // 1. Load or create config
    let mut config = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            eprintln!("Please fix or remove 'config.yml' and try again.");
            return Err(e);
        }
    };

    config.ensure_directories()?;

    // 2. Interactive setup (credential + story parameters)
    wizard::ensure_credential(&mut config)?;
    let params = wizard::collect_parameters()?;

    // 3. Initialize service clients
    let completion = llm::create_completion_client(&config)?;
    let images = imaging::create_image_client(&config)?;

    // 4. Run the generation pipeline
    let mut pipeline = StoryPipeline::new(params.clone(), completion, images);
    let story = pipeline.run().await?;
    println!("{}", pipeline.status());

    // 5. Export; the same story can be written in several formats
    let renderer = DocumentRenderer::new();
    loop {
        let target = select_target()?;
        let path = export_story(
            &renderer,
            &story,
            &params,
            target,
            Path::new(&config.output_folder),
        )
        .await?;
        println!("Saved {}", path.display());

        let again = Confirm::new("Export another format?")
            .with_default(false)
            .prompt()?;
        if !again {
            break;
        }
    }

    Ok(())
}

/// Renders one format of the story and writes it under `output_folder`.
async fn export_story(
    renderer: &DocumentRenderer,
    story: &Story,
    params: &StoryParameters,
    target: RenderTarget,
    output_folder: &Path,
) -> Result<PathBuf> {
    let document = renderer.render(story, params, target).await?;
    let filename = format!(
        "{}.{}",
        sanitize_filename(&params.title()),
        document.target.extension()
    );
    let path = output_folder.join(filename);
    fs::write(&path, &document.bytes)?;
    Ok(path)
}

fn select_target() -> Result<RenderTarget> {
    let picked = Select::new(
        "Export format:",
        vec!["Plain text (.txt)", "Web page (.html)", "PDF (.pdf)"],
    )
    .prompt()?;
    Ok(match picked {
        "Plain text (.txt)" => RenderTarget::PlainText,
        "Web page (.html)" => RenderTarget::Hypertext,
        _ => RenderTarget::Paginated,
    })
}

/// Keeps alphanumerics, spaces, hyphens and apostrophes; everything else
/// becomes an underscore so the title is safe as a filename.
fn sanitize_filename(title: &str) -> String {
    title
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == ' ' || c == '-' || c == '\'' {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .trim()
        .to_string()
}
