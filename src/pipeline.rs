use crate::error::Error;
use crate::generator::ChapterGenerator;
use crate::illustrator::IllustrationSynthesizer;
use crate::imaging::ImageClient;
use crate::llm::CompletionClient;
use crate::params::StoryParameters;
use crate::story::{Illustration, Story};
use log::info;

/// Owns one generation run: the immutable parameters, the service clients and
/// the accumulating chapter/illustration vectors.
///
/// Chapters are strictly sequential: chapter `i + 1` never starts before
/// chapter `i`'s summary is committed, and a chapter's illustration finishes
/// before the next chapter's text begins. A generation failure aborts the
/// whole run; illustration failures never do.
pub struct StoryPipeline {
    params: StoryParameters,
    completion: Box<dyn CompletionClient>,
    images: Box<dyn ImageClient>,
    status: String,
}

impl StoryPipeline {
    pub fn new(
        params: StoryParameters,
        completion: Box<dyn CompletionClient>,
        images: Box<dyn ImageClient>,
    ) -> Self {
        Self {
            params,
            completion,
            images,
            status: String::new(),
        }
    }

    /// Human-readable progress line, overwritten at each stage transition.
    pub fn status(&self) -> &str {
        &self.status
    }

    fn set_status(&mut self, status: String) {
        info!("{}", status);
        self.status = status;
    }

    pub async fn run(&mut self) -> Result<Story, Error> {
        let total = self.params.chapter_count;
        self.set_status("Preparing to generate your story...".to_string());

        let mut chapters = Vec::with_capacity(total);
        let mut illustrations = Vec::with_capacity(total);
        let mut prior_summary: Option<String> = None;

        for index in 1..=total {
            self.set_status(format!("Generating Chapter {} of {}...", index, total));
            let generator = ChapterGenerator::new(&self.params);
            let chapter = generator
                .generate(self.completion.as_ref(), index, prior_summary.as_deref())
                .await?;

            self.set_status(format!("Creating illustration for Chapter {}...", index));
            let synthesizer = IllustrationSynthesizer::new(&self.params);
            let reference = synthesizer
                .synthesize(self.completion.as_ref(), self.images.as_ref(), &chapter.body)
                .await;

            prior_summary = Some(chapter.summary.clone());
            illustrations.push(Illustration {
                chapter_index: index,
                reference,
            });
            chapters.push(chapter);
        }

        self.set_status("Story generated successfully!".to_string());
        Ok(Story::assemble(chapters, illustrations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{test_parameters, ImageOrientation, ImageQuality};
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Completion mock that answers chapter prompts in order and scene
    /// prompts with a fixed line, recording every prompt it sees.
    #[derive(Debug, Default)]
    struct MockCompletion {
        fail_on_chapter: Option<usize>,
        prompts: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl CompletionClient for MockCompletion {
        async fn complete(&self, prompt: &str, _: u32, _: f32) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            if prompt.starts_with("Create a scene summary") {
                return Ok("A quiet forest clearing.".to_string());
            }
            // Chapter prompts open with "Create Chapter N of ...".
            let index: usize = prompt
                .strip_prefix("Create Chapter ")
                .and_then(|rest| rest.split_whitespace().next())
                .and_then(|n| n.parse().ok())
                .expect("chapter prompt should carry its index");
            if self.fail_on_chapter == Some(index) {
                return Err(anyhow!("service rejected chapter {}", index));
            }
            Ok(format!(
                "Chapter {}: Part {}\nStory text {}.\n\nSUMMARY: Events of chapter {}.",
                index, index, index, index
            ))
        }
    }

    #[derive(Debug, Default)]
    struct MockImages {
        primary_fails_for: Option<usize>,
        primary_calls: Mutex<usize>,
        fallback_calls: Mutex<usize>,
    }

    #[async_trait]
    impl ImageClient for MockImages {
        async fn generate_primary(
            &self,
            _prompt: &str,
            _orientation: ImageOrientation,
            _quality: ImageQuality,
            _style: &str,
        ) -> Result<String> {
            let mut calls = self.primary_calls.lock().unwrap();
            *calls += 1;
            if self.primary_fails_for == Some(*calls) {
                Err(anyhow!("primary tier down"))
            } else {
                Ok(format!("https://images.example/primary-{}.png", calls))
            }
        }

        async fn generate_fallback(&self, _prompt: &str) -> Result<String> {
            *self.fallback_calls.lock().unwrap() += 1;
            Ok("https://images.example/fallback.png".to_string())
        }
    }

    fn pipeline(params: crate::params::StoryParameters) -> StoryPipeline {
        StoryPipeline::new(
            params,
            Box::new(MockCompletion::default()),
            Box::new(MockImages::default()),
        )
    }

    #[tokio::test]
    async fn test_run_yields_contiguous_chapters() {
        let mut params = test_parameters();
        params.chapter_count = 5;
        let mut pipeline = pipeline(params);

        let story = pipeline.run().await.unwrap();
        assert_eq!(story.chapters.len(), 5);
        assert_eq!(story.illustrations.len(), 5);
        for (i, chapter) in story.chapters.iter().enumerate() {
            assert_eq!(chapter.index, i + 1);
        }
        assert_eq!(pipeline.status(), "Story generated successfully!");
    }

    #[tokio::test]
    async fn test_illustrations_disabled_yields_all_none() {
        let mut params = test_parameters();
        params.chapter_count = 3;
        params.generate_images = false;
        let mut pipeline = pipeline(params);

        let story = pipeline.run().await.unwrap();
        assert_eq!(story.chapters.len(), 3);
        assert!(story.illustrations.iter().all(|i| i.reference.is_none()));
    }

    #[tokio::test]
    async fn test_continuity_flows_between_chapters() {
        let mut params = test_parameters();
        params.chapter_count = 3;
        let completion = Box::new(MockCompletion::default());
        let prompts = completion.prompts.clone();
        let mut pipeline = StoryPipeline::new(
            params,
            completion,
            Box::new(MockImages::default()),
        );

        pipeline.run().await.unwrap();

        let prompts = prompts.lock().unwrap();
        let chapter2_prompt = prompts
            .iter()
            .find(|p| p.starts_with("Create Chapter 2"))
            .unwrap();
        assert!(chapter2_prompt.contains("Previous chapter summary: Events of chapter 1."));
    }

    #[tokio::test]
    async fn test_generation_failure_aborts_without_partial_story() {
        let mut params = test_parameters();
        params.chapter_count = 3;
        let mut pipeline = StoryPipeline::new(
            params,
            Box::new(MockCompletion {
                fail_on_chapter: Some(2),
                ..Default::default()
            }),
            Box::new(MockImages::default()),
        );

        let result = pipeline.run().await;
        match result {
            Err(Error::Generation(msg)) => assert!(msg.contains("chapter 2")),
            other => panic!("expected Generation error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_single_chapter_primary_failure_uses_fallback_only_there() {
        let mut params = test_parameters();
        params.chapter_count = 3;
        let images = Box::new(MockImages {
            primary_fails_for: Some(2),
            ..Default::default()
        });
        let mut pipeline =
            StoryPipeline::new(params, Box::new(MockCompletion::default()), images);

        let story = pipeline.run().await.unwrap();
        assert_eq!(
            story.illustrations[0].reference.as_deref(),
            Some("https://images.example/primary-1.png")
        );
        assert_eq!(
            story.illustrations[1].reference.as_deref(),
            Some("https://images.example/fallback.png")
        );
        assert_eq!(
            story.illustrations[2].reference.as_deref(),
            Some("https://images.example/primary-3.png")
        );
    }
}
