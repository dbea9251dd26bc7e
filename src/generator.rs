use crate::error::Error;
use crate::llm::CompletionClient;
use crate::markers;
use crate::params::{StoryParameters, StoryType};
use crate::story::Chapter;
use log::debug;

/// Hard ceiling on completion tokens per chapter regardless of the word
/// target.
const MAX_CHAPTER_TOKENS: u32 = 1500;
const CHAPTER_TEMPERATURE: f32 = 0.8;

/// Generates chapters one at a time, feeding each chapter's summary into the
/// next chapter's prompt as continuity context.
pub struct ChapterGenerator<'a> {
    params: &'a StoryParameters,
}

impl<'a> ChapterGenerator<'a> {
    pub fn new(params: &'a StoryParameters) -> Self {
        Self { params }
    }

    /// Generates chapter `index` (1-based). `prior_summary` must be the
    /// summary of chapter `index - 1` for every chapter after the first. Any
    /// service failure is fatal to the run.
    pub async fn generate(
        &self,
        completion: &dyn CompletionClient,
        index: usize,
        prior_summary: Option<&str>,
    ) -> Result<Chapter, Error> {
        let prompt = self.build_prompt(index, prior_summary);
        debug!("Chapter {} prompt: {} chars", index, prompt.len());

        let max_tokens = MAX_CHAPTER_TOKENS.min(self.params.words_per_chapter * 2);
        let raw = completion
            .complete(&prompt, max_tokens, CHAPTER_TEMPERATURE)
            .await
            .map_err(|e| Error::Generation(e.to_string()))?;

        let (body, summary) = markers::split_summary(&raw);
        let summary = summary.unwrap_or_else(|| {
            markers::fallback_summary(index, self.params.character_name())
        });
        let title = markers::chapter_title(&body).to_string();

        Ok(Chapter {
            index,
            title,
            body,
            summary,
        })
    }

    fn build_prompt(&self, index: usize, prior_summary: Option<&str>) -> String {
        let p = self.params;
        let total = p.chapter_count;

        let mut prompt = format!(
            "Create Chapter {} of a {}-chapter {} {} story.\n\n\
             Story Requirements:\n\
             - This is a {} story that should be appropriate and engaging\n\
             - NO magic, witchcraft, wizards, spells, or occult elements\n\
             - Focus on real-world scenarios and relatable characters\n",
            index,
            total,
            p.story_type.prompt_phrase(),
            p.genre,
            p.story_type.prompt_phrase(),
        );
        match p.story_type {
            StoryType::Children => {
                prompt.push_str("- Use simple language appropriate for children\n")
            }
            StoryType::Moral => {
                prompt.push_str("- Include a clear moral lesson or positive message\n")
            }
            StoryType::General => {}
        }

        prompt.push_str(&format!(
            "\nCharacter: {}\n\
             Character Details: Age {}, {} ethnicity\n\
             Appearance: {}\n\
             Personality: {}\n\
             Setting: {} - {}\n\
             Plot Elements: {} {}\n\
             Tone: {}\n",
            p.character_name(),
            p.character.age,
            p.character.ethnicity,
            p.character.appearance,
            p.character.personality,
            p.setting,
            p.environment_details,
            p.plot_elements.join(", "),
            p.custom_plot_elements,
            p.tone,
        ));

        if let Some(summary) = prior_summary {
            prompt.push_str(&format!(
                "\nPrevious chapter summary: {}\n\
                 Ensure this chapter continues naturally from where the previous \
                 chapter ended, maintaining character continuity and plot progression.\n",
                summary
            ));
        }

        prompt.push_str(&format!(
            "\nWrite ONLY Chapter {} (approximately {} words).\n",
            index, p.words_per_chapter
        ));
        if index == 1 {
            prompt.push_str(
                "Start with an engaging opening that introduces the character and setting.\n",
            );
        } else {
            prompt.push_str("Continue the story naturally from the previous events.\n");
        }
        if index == total {
            prompt.push_str(
                "Conclude the story with a satisfying ending that resolves all plot threads.\n",
            );
        } else {
            prompt.push_str(
                "End with a natural transition that sets up the next chapter.\n",
            );
        }

        prompt.push_str(&format!(
            "\nFormat: Start with \"{}\" followed by the chapter content.\n\n\
             At the end, add a line that starts with \"{}\" followed by a \
             one-sentence summary of what happened in this chapter.",
            markers::chapter_header(index, "[Chapter Title]"),
            markers::SUMMARY_PREFIX,
        ));

        prompt
    }
}
