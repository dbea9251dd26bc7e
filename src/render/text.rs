use crate::markers;
use crate::params::StoryParameters;
use crate::story::Story;

const SEPARATOR_WIDTH: usize = 50;

/// Plain-text export: title with an `=` underline, table of contents, a
/// dashed separator, then the full narrative.
pub fn render(story: &Story, params: &StoryParameters) -> Vec<u8> {
    let title = params.title();

    let mut content = String::new();
    content.push_str(&title);
    content.push('\n');
    content.push_str(&"=".repeat(title.chars().count()));
    content.push_str("\n\n");
    content.push_str("Table of Contents\n\n");

    for chapter in &story.chapters {
        let chapter_title = markers::chapter_title(&chapter.body);
        content.push_str(&markers::chapter_header(chapter.index, chapter_title));
        content.push('\n');
    }

    content.push('\n');
    content.push_str(&"-".repeat(SEPARATOR_WIDTH));
    content.push_str("\n\n");
    content.push_str(&story.narrative);

    content.into_bytes()
}
