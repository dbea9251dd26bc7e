use crate::error::Error;
use crate::imaging::ImageClient;
use crate::llm::CompletionClient;
use crate::params::StoryParameters;
use log::{info, warn};

/// How much of the chapter body is shown to the completion service when
/// deriving the scene description.
const SCENE_EXCERPT_CHARS: usize = 500;
const SCENE_MAX_TOKENS: u32 = 100;
const SCENE_TEMPERATURE: f32 = 0.7;

/// Best-effort per-chapter illustration. Derives a one-sentence scene
/// description from the chapter text, then requests an image from the primary
/// tier, retrying once against the secondary tier. Every failure is absorbed
/// here: the pipeline only ever sees `Some(url)` or `None`.
pub struct IllustrationSynthesizer<'a> {
    params: &'a StoryParameters,
}

impl<'a> IllustrationSynthesizer<'a> {
    pub fn new(params: &'a StoryParameters) -> Self {
        Self { params }
    }

    pub async fn synthesize(
        &self,
        completion: &dyn CompletionClient,
        images: &dyn ImageClient,
        chapter_body: &str,
    ) -> Option<String> {
        if !self.params.generate_images {
            return None;
        }

        match self
            .request_illustration(completion, images, chapter_body)
            .await
        {
            Ok(url) => Some(url),
            Err(e) => {
                warn!("Chapter stays unillustrated: {}", e);
                None
            }
        }
    }

    /// The fallible core: scene description, then primary tier, then one
    /// secondary-tier retry. Every failure surfaces as `Error::Image`;
    /// `synthesize` is the boundary that absorbs it.
    async fn request_illustration(
        &self,
        completion: &dyn CompletionClient,
        images: &dyn ImageClient,
        chapter_body: &str,
    ) -> Result<String, Error> {
        let scene = self
            .describe_scene(completion, chapter_body)
            .await
            .map_err(|e| Error::Image(format!("scene description failed: {}", e)))?;

        let prompt = self.image_prompt(&scene);

        match images
            .generate_primary(
                &prompt,
                self.params.image_orientation,
                self.params.image_quality,
                self.params.image_style.api_style(),
            )
            .await
        {
            Ok(url) => Ok(url),
            Err(primary_err) => {
                warn!(
                    "Primary image tier failed ({}), retrying on secondary tier",
                    primary_err
                );
                match images.generate_fallback(&prompt).await {
                    Ok(url) => {
                        info!("Illustration generated via secondary tier");
                        Ok(url)
                    }
                    Err(fallback_err) => Err(Error::Image(format!(
                        "primary tier: {}; secondary tier: {}",
                        primary_err, fallback_err
                    ))),
                }
            }
        }
    }

    async fn describe_scene(
        &self,
        completion: &dyn CompletionClient,
        chapter_body: &str,
    ) -> anyhow::Result<String> {
        let excerpt: String = chapter_body.chars().take(SCENE_EXCERPT_CHARS).collect();
        let prompt = format!(
            "Create a scene summary for illustration: Based on this chapter about {}, \
             describe the main visual scene in one sentence. Chapter content: {}...",
            self.params.character_name(),
            excerpt
        );
        completion
            .complete(&prompt, SCENE_MAX_TOKENS, SCENE_TEMPERATURE)
            .await
    }

    fn image_prompt(&self, scene: &str) -> String {
        let p = self.params;
        let style = p.image_style.descriptor();
        format!(
            "{} for a {} book: {}. Character: {}, {} ethnicity, {}. Setting: {} {}. \
             Style requirements: {}, professional illustration quality, {} mood, \
             consistent character design. IMPORTANT: No text, letters, or words in the image.",
            style,
            p.story_type.prompt_phrase(),
            scene,
            p.character_name(),
            p.character.ethnicity,
            p.character.appearance,
            p.setting,
            p.environment_details,
            style,
            p.tone,
        )
    }
}
