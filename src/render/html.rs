use crate::markers;
use crate::params::{ImageOrientation, StoryParameters};
use crate::story::Story;

/// Static page-number estimate shared with the paginated TOC: title page,
/// TOC page, then one page per chapter. Wrong whenever a chapter reflows
/// across pages; kept as-is deliberately (see DESIGN.md).
pub fn static_page_number(chapter_index: usize) -> usize {
    chapter_index + 2
}

/// Self-contained hypertext export with an inline style block, a front
/// matter block, a TOC block and one structural block per chapter.
pub fn render(story: &Story, params: &StoryParameters) -> Vec<u8> {
    let title = params.title();
    let subtitle = format!("A {}", params.story_type.display_name());
    let img_max_width = match params.image_orientation {
        ImageOrientation::Landscape => "100%",
        ImageOrientation::Square => "70%",
    };

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    html.push_str(&format!("<title>{}</title>\n", title));
    html.push_str(&format!(
        r#"<style>
  @media print {{
    .chapter {{ page-break-before: always; }}
    .toc {{ page-break-after: always; }}
  }}
  body {{
    font-family: Georgia, serif;
    max-width: 800px;
    margin: 0 auto;
    padding: 40px 20px;
    line-height: 1.8;
    color: #333;
  }}
  h1 {{ color: #2c3e50; text-align: center; margin-bottom: 10px; font-size: 2.5em; }}
  .subtitle {{ text-align: center; color: #7f8c8d; margin-bottom: 50px; font-size: 1.2em; }}
  .toc {{ margin: 50px 0; padding: 40px; background: #f8f9fa; border-radius: 10px; }}
  .toc h2 {{ text-align: center; color: #2c3e50; margin-bottom: 30px; }}
  .toc-item {{ display: flex; justify-content: space-between; margin-bottom: 15px; font-size: 1.1em; }}
  .toc-dots {{ flex: 1; margin: 0 10px; border-bottom: 2px dotted #ccc; height: 1em; }}
  .chapter {{ margin-bottom: 40px; min-height: 100vh; position: relative; }}
  .chapter h2 {{ color: #34495e; text-align: center; margin-bottom: 10px; font-size: 2.2em; font-weight: bold; }}
  .chapter h3 {{ text-align: center; color: #34495e; margin-bottom: 30px; font-size: 1.8em; font-weight: normal; }}
  img {{ max-width: {img_max_width}; height: auto; margin: 30px auto; display: block; border-radius: 8px; }}
  .chapter-content {{ text-align: justify; font-size: 1.1em; }}
  .page-number {{ text-align: center; color: #95a5a6; margin-top: 50px; font-size: 0.9em; }}
</style>
"#
    ));
    html.push_str("</head>\n<body>\n");

    // Front matter.
    html.push_str("<div class=\"chapter\">\n");
    html.push_str(&format!("  <h1>{}</h1>\n", title));
    html.push_str(&format!("  <p class=\"subtitle\">{}</p>\n", subtitle));
    html.push_str("  <div class=\"page-number\">1</div>\n");
    html.push_str("</div>\n");

    // Table of contents.
    html.push_str("<div class=\"toc\">\n  <h2>Table of Contents</h2>\n");
    for chapter in &story.chapters {
        let chapter_title = markers::chapter_title(&chapter.body);
        html.push_str(&format!(
            "  <div class=\"toc-item\">\n    <span>{}</span>\n    \
             <span class=\"toc-dots\"></span>\n    <span>{}</span>\n  </div>\n",
            markers::chapter_header(chapter.index, chapter_title),
            static_page_number(chapter.index),
        ));
    }
    html.push_str("  <div class=\"page-number\">2</div>\n</div>\n");

    // Chapter blocks.
    for (chapter, illustration) in story.chapters.iter().zip(&story.illustrations) {
        let chapter_title = markers::chapter_title(&chapter.body);
        let content = markers::strip_header(&chapter.body);

        html.push_str("<div class=\"chapter\">\n");
        html.push_str(&format!("  <h2>Chapter {}</h2>\n", chapter.index));
        html.push_str(&format!("  <h3>{}</h3>\n", chapter_title));
        if let Some(reference) = &illustration.reference {
            html.push_str(&format!(
                "  <img src=\"{}\" alt=\"Chapter {} illustration\" />\n",
                reference, chapter.index
            ));
        }
        html.push_str(&format!(
            "  <div class=\"chapter-content\">{}</div>\n",
            content.replace('\n', "<br>")
        ));
        html.push_str(&format!(
            "  <div class=\"page-number\">{}</div>\n",
            static_page_number(chapter.index)
        ));
        html.push_str("</div>\n");
    }

    html.push_str("</body>\n</html>\n");
    html.into_bytes()
}
