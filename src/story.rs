use serde::{Deserialize, Serialize};

/// One generated chapter. Immutable once created; the body keeps its
/// `Chapter N: <title>` header line so renderers can recover the title
/// through the marker module.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Chapter {
    pub index: usize,
    pub title: String,
    pub body: String,
    pub summary: String,
}

/// An illustration slot for one chapter. `reference` is an opaque locator
/// (URL) for the image bytes; `None` means no usable image, which is a valid
/// state and never an error.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Illustration {
    pub chapter_index: usize,
    pub reference: Option<String>,
}

/// The assembled story artifact: chapters 1..N, index-aligned illustrations,
/// and the concatenated narrative.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Story {
    pub chapters: Vec<Chapter>,
    pub illustrations: Vec<Illustration>,
    pub narrative: String,
}

impl Story {
    /// Packages the pipeline's parallel vectors into a story. Shape
    /// violations are caller bugs, not runtime conditions.
    pub fn assemble(chapters: Vec<Chapter>, illustrations: Vec<Illustration>) -> Self {
        assert_eq!(
            chapters.len(),
            illustrations.len(),
            "chapters and illustrations must be index-aligned"
        );
        for (i, chapter) in chapters.iter().enumerate() {
            assert_eq!(chapter.index, i + 1, "chapter indices must be contiguous from 1");
            assert_eq!(
                illustrations[i].chapter_index,
                chapter.index,
                "illustration indices must match chapters"
            );
        }

        let narrative = chapters
            .iter()
            .map(|c| c.body.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        Self {
            chapters,
            illustrations,
            narrative,
        }
    }
}

#[cfg(test)]
pub(crate) fn test_story(n: usize, with_images: bool) -> Story {
    let chapters = (1..=n)
        .map(|i| Chapter {
            index: i,
            title: format!("Part {}", i),
            body: format!("Chapter {}: Part {}\nBody of chapter {}.", i, i, i),
            summary: format!("Summary {}", i),
        })
        .collect();
    let illustrations = (1..=n)
        .map(|i| Illustration {
            chapter_index: i,
            reference: with_images.then(|| format!("https://images.example/{}.png", i)),
        })
        .collect();
    Story::assemble(chapters, illustrations)
}
