use crate::error::Error;
use crate::markers;
use crate::params::{ImageOrientation, StoryParameters};
use crate::render::html::static_page_number;
use crate::story::Story;
use image::GenericImageView;
use log::warn;
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference,
};
use std::io::BufWriter;

/// Character ceilings for greedy title wrapping. A single word longer than
/// the ceiling is hard-split at the ceiling.
pub const TITLE_WRAP_LIMIT: usize = 24;
pub const CHAPTER_TITLE_WRAP_LIMIT: usize = 30;

const PLACEHOLDER_TEXT: &str =
    "[Image could not be embedded. See the hypertext version for images.]";

/// Approximate Helvetica advance: 0.5 em average glyph width, converted from
/// points to millimeters. Deterministic stand-in for real font metrics.
pub fn text_width_mm(text: &str, font_size_pt: f32) -> f32 {
    text.chars().count() as f32 * font_size_pt * 0.5 * 25.4 / 72.0
}

/// Greedy word wrap bounded by a character ceiling and a measured-width
/// ceiling. Every emitted line satisfies the character bound; an overlong
/// single word is hard-split at the ceiling.
pub fn wrap_title(text: &str, char_limit: usize, max_width_mm: f32, font_size_pt: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };
        if candidate.chars().count() > char_limit
            || text_width_mm(&candidate, font_size_pt) > max_width_mm
        {
            if current.is_empty() {
                // A single word past the ceiling: hard split.
                let head: String = word.chars().take(char_limit).collect();
                let tail: String = word.chars().skip(char_limit).collect();
                lines.push(head);
                current = tail;
            } else {
                lines.push(current);
                current = word.to_string();
            }
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Wraps body text against the measured-width ceiling only (body lines have
/// no character ceiling).
pub fn wrap_text(text: &str, max_width_mm: f32, font_size_pt: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };
            if text_width_mm(&candidate, font_size_pt) > max_width_mm {
                if current.is_empty() {
                    // Hard split an unbreakable word at the width ceiling.
                    let mut head = String::new();
                    for c in word.chars() {
                        let mut probe = head.clone();
                        probe.push(c);
                        if text_width_mm(&probe, font_size_pt) > max_width_mm && !head.is_empty() {
                            break;
                        }
                        head = probe;
                    }
                    let tail: String = word.chars().skip(head.chars().count()).collect();
                    lines.push(head);
                    current = tail;
                } else {
                    lines.push(current);
                    current = word.to_string();
                }
            } else {
                current = candidate;
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    lines
}

/// Shortens a TOC entry to the width ceiling, appending `...`.
pub fn truncate_to_width(text: &str, max_width_mm: f32, font_size_pt: f32) -> String {
    if text_width_mm(text, font_size_pt) <= max_width_mm {
        return text.to_string();
    }
    let mut shortened: String = text.to_string();
    while !shortened.is_empty()
        && text_width_mm(&format!("{}...", shortened), font_size_pt) > max_width_mm
    {
        shortened.pop();
    }
    format!("{}...", shortened)
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

/// Tracks the document, the open page/layer, the vertical cursor (mm from
/// the page top) and the running footer page number.
struct PageState {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    fonts: Fonts,
    page_width: f32,
    page_height: f32,
    cursor: f32,
    page_number: u32,
}

impl PageState {
    fn text_centered(&self, text: &str, size: f32, y_from_top: f32, font: &IndirectFontRef) {
        let x = (self.page_width - text_width_mm(text, size)) / 2.0;
        self.layer
            .use_text(text, size, Mm(x.max(0.0)), Mm(self.page_height - y_from_top), font);
    }

    fn text_left(&self, text: &str, size: f32, x: f32, y_from_top: f32, font: &IndirectFontRef) {
        self.layer
            .use_text(text, size, Mm(x), Mm(self.page_height - y_from_top), font);
    }

    fn text_right_aligned(
        &self,
        text: &str,
        size: f32,
        right_edge: f32,
        y_from_top: f32,
        font: &IndirectFontRef,
    ) {
        let x = right_edge - text_width_mm(text, size);
        self.layer
            .use_text(text, size, Mm(x.max(0.0)), Mm(self.page_height - y_from_top), font);
    }

    /// Writes the footer page number on the open page and bumps the counter.
    fn write_footer(&mut self) {
        let number = self.page_number.to_string();
        let x = (self.page_width - text_width_mm(&number, 10.0)) / 2.0;
        self.layer.use_text(number, 10.0, Mm(x), Mm(10.0), &self.fonts.regular);
        self.page_number += 1;
    }

    /// Opens a fresh page and resets the cursor below the top margin.
    fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(self.page_width), Mm(self.page_height), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.cursor = 25.0;
    }
}

/// Renders the paginated document. `image_bytes` is index-aligned with the
/// story's illustrations; `None` entries either had no reference or could
/// not be resolved, and fall back to the placeholder line when a reference
/// existed.
pub fn render(
    story: &Story,
    params: &StoryParameters,
    image_bytes: &[Option<Vec<u8>>],
) -> Result<Vec<u8>, Error> {
    let (page_width, page_height) = params.page_size.dimensions_mm();
    let title = params.title();

    let (doc, page, layer) = PdfDocument::new(&title, Mm(page_width), Mm(page_height), "Layer 1");
    let map = |e: printpdf::Error| Error::Render(e.to_string());
    let fonts = Fonts {
        regular: doc.add_builtin_font(BuiltinFont::Helvetica).map_err(map)?,
        bold: doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(map)?,
        italic: doc.add_builtin_font(BuiltinFont::HelveticaOblique).map_err(map)?,
    };
    let layer = doc.get_page(page).get_layer(layer);

    let mut state = PageState {
        doc,
        layer,
        fonts,
        page_width,
        page_height,
        cursor: 25.0,
        page_number: 1,
    };

    render_title_page(&mut state, params, &title);
    render_toc_page(&mut state, story);
    for (chapter, bytes) in story.chapters.iter().zip(image_bytes) {
        let has_reference = story.illustrations[chapter.index - 1].reference.is_some();
        render_chapter(&mut state, params, chapter, bytes.as_deref(), has_reference);
    }

    let PageState { doc, .. } = state;
    let mut buffer = BufWriter::new(Vec::new());
    doc.save(&mut buffer).map_err(map)?;
    buffer
        .into_inner()
        .map_err(|e| Error::Render(e.to_string()))
}

fn render_title_page(state: &mut PageState, params: &StoryParameters, title: &str) {
    let max_title_width = state.page_width * 0.8;
    let title_lines = wrap_title(title, TITLE_WRAP_LIMIT, max_title_width, 24.0);

    let mut y = state.page_height * 0.35;
    for line in &title_lines {
        let font = &state.fonts.regular;
        state.text_centered(line, 24.0, y, font);
        y += 12.0;
    }
    let subtitle = format!("A {}", params.story_type.display_name());
    state.text_centered(&subtitle, 16.0, y + 20.0, &state.fonts.regular);

    state.write_footer();
}

/// One TOC line: the truncated `Chapter N: <title>` entry and its static
/// page-number estimate. A missing or malformed header falls back to the
/// bare chapter number.
fn toc_entry(chapter: &crate::story::Chapter, max_width_mm: f32) -> (String, String) {
    let chapter_title = markers::chapter_title(&chapter.body);
    let display_title = if chapter_title.is_empty() {
        format!("Chapter {}", chapter.index)
    } else {
        chapter_title.to_string()
    };
    let entry = markers::chapter_header(chapter.index, &display_title);
    (
        truncate_to_width(&entry, max_width_mm, 12.0),
        static_page_number(chapter.index).to_string(),
    )
}

fn render_toc_page(state: &mut PageState, story: &Story) {
    state.new_page();
    state.text_centered("Table of Contents", 20.0, 30.0, &state.fonts.bold);

    let mut y = 50.0;
    let max_entry_width = state.page_width * 0.7;
    for chapter in &story.chapters {
        let (entry, page_number) = toc_entry(chapter, max_entry_width);

        state.text_left(&entry, 12.0, state.page_width * 0.15, y, &state.fonts.regular);
        state.text_right_aligned(
            &page_number,
            12.0,
            state.page_width * 0.85,
            y,
            &state.fonts.regular,
        );
        y += 8.0;
    }

    state.write_footer();
}

fn render_chapter(
    state: &mut PageState,
    params: &StoryParameters,
    chapter: &crate::story::Chapter,
    image_bytes: Option<&[u8]>,
    has_reference: bool,
) {
    state.new_page();

    let header = format!("Chapter {}", chapter.index);
    state.text_centered(&header, 18.0, state.cursor, &state.fonts.bold);
    state.cursor += 10.0;

    let chapter_title = if chapter.title.is_empty() {
        format!("Chapter {}", chapter.index)
    } else {
        chapter.title.clone()
    };
    let title_lines = wrap_title(
        &chapter_title,
        CHAPTER_TITLE_WRAP_LIMIT,
        state.page_width * 0.8,
        14.0,
    );
    for line in &title_lines {
        let font = &state.fonts.regular;
        state.text_centered(line, 14.0, state.cursor, font);
        state.cursor += 6.0;
    }
    state.cursor += 10.0;

    if let Some(bytes) = image_bytes {
        match embed_image(state, params, bytes) {
            Ok(height_mm) => state.cursor += height_mm + 10.0,
            Err(e) => {
                warn!("Embedding failed, substituting placeholder: {}", e);
                place_placeholder(state);
            }
        }
    } else if has_reference {
        // Reference exists but no strategy produced bytes.
        place_placeholder(state);
    }

    // Flow the body, breaking pages at the bottom margin.
    let body = markers::strip_header(&chapter.body);
    let bottom_margin = state.page_height - 20.0;
    let left_margin = state.page_width * 0.1;
    for line in wrap_text(body, state.page_width * 0.8, 10.0) {
        if state.cursor > bottom_margin {
            state.write_footer();
            state.new_page();
        }
        let font = &state.fonts.regular;
        state.text_left(&line, 10.0, left_margin, state.cursor, font);
        state.cursor += 5.0;
    }

    state.write_footer();
}

fn place_placeholder(state: &mut PageState) {
    let font = &state.fonts.italic;
    state.text_centered(PLACEHOLDER_TEXT, 10.0, state.cursor, font);
    state.cursor += 15.0;
}

/// Decodes, re-encodes to JPEG and places the image centered at the size the
/// configured orientation dictates. Returns the placed height in mm.
fn embed_image(
    state: &mut PageState,
    params: &StoryParameters,
    bytes: &[u8],
) -> Result<f32, Error> {
    let map = |e: String| Error::Embedding(e);

    let decoded = image::load_from_memory(bytes).map_err(|e| map(e.to_string()))?;
    let (px_width, px_height) = decoded.dimensions();

    // printpdf wants one concrete codec; normalize to JPEG like the
    // hypertext-era canvas export did.
    let rgb = decoded.to_rgb8();
    let mut jpeg = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, 95)
        .encode_image(&rgb)
        .map_err(|e| map(e.to_string()))?;

    let decoder = printpdf::image_crate::codecs::jpeg::JpegDecoder::new(std::io::Cursor::new(
        jpeg.as_slice(),
    ))
    .map_err(|e| map(e.to_string()))?;
    let pdf_image = Image::try_from(decoder).map_err(|e| map(e.to_string()))?;

    let max_width = state.page_width * 0.8;
    let max_height = state.page_height * 0.4;
    let (box_width, box_height) = match params.image_orientation {
        ImageOrientation::Landscape => (max_width, max_width * 9.0 / 16.0),
        ImageOrientation::Square => {
            let side = (max_width * 0.7).min(max_height);
            (side, side)
        }
    };

    // At `dpi` the natural size is px / dpi inches; scale into the box.
    let dpi = 300.0;
    let natural_width_mm = px_width as f32 / dpi * 25.4;
    let natural_height_mm = px_height as f32 / dpi * 25.4;
    let scale_x = box_width / natural_width_mm;
    let scale_y = box_height / natural_height_mm;

    let x = (state.page_width - box_width) / 2.0;
    let y_from_top = state.cursor + box_height;
    pdf_image.add_to_layer(
        state.layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(x)),
            translate_y: Some(Mm(state.page_height - y_from_top)),
            scale_x: Some(scale_x),
            scale_y: Some(scale_y),
            dpi: Some(dpi),
            ..Default::default()
        },
    );

    Ok(box_height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::test_parameters;
    use crate::story::test_story;

    #[test]
    fn test_wrap_title_respects_char_limit() {
        let lines = wrap_title(
            "Maya's Grand Adventure Through The Friendly Forest",
            TITLE_WRAP_LIMIT,
            1000.0,
            24.0,
        );
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.chars().count() <= TITLE_WRAP_LIMIT, "line too long: {line}");
        }
    }

    #[test]
    fn test_wrap_title_hard_splits_overlong_word() {
        let lines = wrap_title("Honorificabilitudinitatibusque", 24, 1000.0, 24.0);
        assert_eq!(lines[0].chars().count(), 24);
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_wrap_title_width_ceiling_applies() {
        // Generous char limit, tight width: the width bound must still wrap.
        let lines = wrap_title("one two three four five", 100, 20.0, 24.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width_mm(line, 24.0) <= 20.0 + text_width_mm("five", 24.0));
        }
    }

    #[test]
    fn test_wrap_text_keeps_lines_under_width() {
        let text = "The quick brown fox jumps over the lazy dog again and again and again.";
        let lines = wrap_text(text, 40.0, 10.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(
                text_width_mm(line, 10.0) <= 40.0,
                "line exceeds width: {line}"
            );
        }
    }

    #[test]
    fn test_wrap_text_preserves_blank_lines() {
        let lines = wrap_text("para one\n\npara two", 200.0, 10.0);
        assert_eq!(lines, vec!["para one", "", "para two"]);
    }

    #[test]
    fn test_truncate_appends_ellipsis_only_when_needed() {
        assert_eq!(truncate_to_width("short", 100.0, 12.0), "short");
        let long = "An exceedingly long chapter title that cannot possibly fit";
        let truncated = truncate_to_width(long, 50.0, 12.0);
        assert!(truncated.ends_with("..."));
        assert!(text_width_mm(&truncated, 12.0) <= 50.0);
    }

    #[test]
    fn test_toc_has_one_entry_per_chapter() {
        let story = test_story(4, false);
        let entries: Vec<(String, String)> = story
            .chapters
            .iter()
            .map(|c| toc_entry(c, 400.0))
            .collect();
        assert_eq!(entries.len(), story.chapters.len());
        assert_eq!(entries[0], ("Chapter 1: Part 1".to_string(), "3".to_string()));
        assert_eq!(entries[3].1, "6");
    }

    #[test]
    fn test_toc_entry_without_header_falls_back_to_number() {
        let mut story = test_story(1, false);
        story.chapters[0].body = "no header".to_string();
        let (entry, page) = toc_entry(&story.chapters[0], 400.0);
        assert_eq!(entry, "Chapter 1: Chapter 1");
        assert_eq!(page, "3");
    }

    #[test]
    fn test_page_dimensions_feed_millimeter_type_directly() {
        let (w, h) = crate::params::PageSize::A4.dimensions_mm();
        let _ = Mm(w);
        let _ = Mm(h);
        assert_eq!((w, h), (210.0, 297.0));
    }

    #[test]
    fn test_render_produces_pdf_bytes() {
        let story = test_story(3, false);
        let params = test_parameters();
        let images = vec![None, None, None];
        let bytes = render(&story, &params, &images).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_with_unresolvable_reference_still_succeeds() {
        // References exist but no bytes resolved: placeholder path.
        let story = test_story(2, true);
        let params = test_parameters();
        let images = vec![None, None];
        let bytes = render(&story, &params, &images).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_with_garbage_image_bytes_still_succeeds() {
        let story = test_story(1, true);
        let params = test_parameters();
        let images = vec![Some(vec![0u8; 16])];
        let bytes = render(&story, &params, &images).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_long_story_flows_across_pages() {
        let mut story = test_story(1, false);
        let body: String = std::iter::once("Chapter 1: Long\n".to_string())
            .chain((0..400).map(|i| format!("Sentence number {} keeps the page filling up. ", i)))
            .collect();
        story.chapters[0].body = body;
        let params = test_parameters();
        let bytes = render(&story, &params, &[None]).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
