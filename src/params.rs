use serde::{Deserialize, Serialize};

/// Broad audience category of the story. Drives the option catalogs shown by
/// the wizard and the framing lines included in generation prompts.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoryType {
    Children,
    Moral,
    General,
}

impl StoryType {
    pub fn display_name(&self) -> &'static str {
        match self {
            StoryType::Children => "Children's Story",
            StoryType::Moral => "Moral Story",
            StoryType::General => "General Story",
        }
    }

    /// Adjective phrase used inside prompts ("a children's adventure story").
    pub fn prompt_phrase(&self) -> &'static str {
        match self {
            StoryType::Children => "children's",
            StoryType::Moral => "moral/wholesome",
            StoryType::General => "general audience",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ImageStyle {
    Colorful,
    Grayscale,
    PencilSketch,
    Watercolor,
    Cartoon,
    Photorealistic,
}

impl ImageStyle {
    pub fn display_name(&self) -> &'static str {
        match self {
            ImageStyle::Colorful => "Colorful Digital Art",
            ImageStyle::Grayscale => "Black & White",
            ImageStyle::PencilSketch => "Pencil Drawing",
            ImageStyle::Watercolor => "Watercolor Painting",
            ImageStyle::Cartoon => "Cartoon Style",
            ImageStyle::Photorealistic => "Photorealistic",
        }
    }

    /// Prompt fragment describing the visual style to the image service.
    pub fn descriptor(&self) -> &'static str {
        match self {
            ImageStyle::Colorful => "vibrant colorful digital illustration",
            ImageStyle::Grayscale => "detailed black and white illustration, grayscale, no color",
            ImageStyle::PencilSketch => "pencil sketch drawing, graphite art style, hand-drawn look",
            ImageStyle::Watercolor => "soft watercolor painting style, artistic brushstrokes",
            ImageStyle::Cartoon => "fun cartoon style, bold outlines, simplified shapes",
            ImageStyle::Photorealistic => "photorealistic, highly detailed, lifelike",
        }
    }

    /// Style flag on the primary image tier. Only the photorealistic style
    /// asks for "natural"; everything else renders better as "vivid".
    pub fn api_style(&self) -> &'static str {
        match self {
            ImageStyle::Photorealistic => "natural",
            _ => "vivid",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ImageOrientation {
    Square,
    Landscape,
}

impl ImageOrientation {
    /// Resolution requested from the primary tier. The secondary tier only
    /// supports the square size.
    pub fn size(&self) -> &'static str {
        match self {
            ImageOrientation::Square => "1024x1024",
            ImageOrientation::Landscape => "1792x1024",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ImageQuality {
    Standard,
    Hd,
}

impl ImageQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageQuality::Standard => "standard",
            ImageQuality::Hd => "hd",
        }
    }
}

/// Physical page size for the paginated export.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PageSize {
    Letter,
    A4,
    A5,
}

impl PageSize {
    /// (width, height) in millimeters, portrait.
    pub fn dimensions_mm(&self) -> (f32, f32) {
        match self {
            PageSize::Letter => (215.9, 279.4),
            PageSize::A4 => (210.0, 297.0),
            PageSize::A5 => (148.0, 210.0),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PageSize::Letter => "Letter (8.5\" x 11\")",
            PageSize::A4 => "A4 (210mm x 297mm)",
            PageSize::A5 => "A5 (148mm x 210mm)",
        }
    }
}

/// Preset controlling the advisory per-chapter word target.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookSize {
    Short,
    Medium,
    Long,
}

impl BookSize {
    pub fn words_per_chapter(&self) -> u32 {
        match self {
            BookSize::Short => 500,
            BookSize::Medium => 1000,
            BookSize::Long => 2000,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BookSize::Short => "Short - quick read (500 words/chapter)",
            BookSize::Medium => "Medium - standard length (1000 words/chapter)",
            BookSize::Long => "Long - extended story (2000 words/chapter)",
        }
    }
}

/// Optional descriptive fields for the main character. All free text; empty
/// strings simply leave the matching prompt lines blank.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CharacterDetails {
    pub name: String,
    pub age: String,
    pub ethnicity: String,
    pub appearance: String,
    pub personality: String,
}

/// Everything the pipeline needs to know about the requested story. Built
/// once by the wizard (or directly by library callers) and read-only from
/// then on.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StoryParameters {
    pub story_type: StoryType,
    pub genre: String,
    pub main_character: String,
    pub character: CharacterDetails,
    pub setting: String,
    pub environment_details: String,
    pub plot_elements: Vec<String>,
    pub custom_plot_elements: String,
    pub tone: String,
    pub chapter_count: usize,
    pub words_per_chapter: u32,
    pub generate_images: bool,
    pub image_orientation: ImageOrientation,
    pub image_style: ImageStyle,
    pub image_quality: ImageQuality,
    pub page_size: PageSize,
}

impl StoryParameters {
    /// The name used to refer to the protagonist in prompts and summaries:
    /// the detailed name when given, otherwise the character type.
    pub fn character_name(&self) -> &str {
        if self.character.name.is_empty() {
            &self.main_character
        } else {
            &self.character.name
        }
    }

    /// Derived story title, e.g. `Maya's Adventure Children's Story`.
    pub fn title(&self) -> String {
        format!(
            "{}'s {} {}",
            self.character_name(),
            self.genre,
            self.story_type.display_name()
        )
    }
}

#[cfg(test)]
pub(crate) fn test_parameters() -> StoryParameters {
    StoryParameters {
        story_type: StoryType::Children,
        genre: "Adventure".to_string(),
        main_character: "Curious child".to_string(),
        character: CharacterDetails {
            name: "Maya".to_string(),
            age: "8".to_string(),
            ethnicity: "Asian".to_string(),
            appearance: "curly hair, wearing overalls".to_string(),
            personality: "brave and kind".to_string(),
        },
        setting: "Friendly Forest".to_string(),
        environment_details: "tall oaks and a winding creek".to_string(),
        plot_elements: vec!["Making new friends".to_string()],
        custom_plot_elements: String::new(),
        tone: "Playful and fun".to_string(),
        chapter_count: 3,
        words_per_chapter: 500,
        generate_images: true,
        image_orientation: ImageOrientation::Square,
        image_style: ImageStyle::Colorful,
        image_quality: ImageQuality::Standard,
        page_size: PageSize::Letter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_name_prefers_detail() {
        let mut params = test_parameters();
        assert_eq!(params.character_name(), "Maya");
        params.character.name.clear();
        assert_eq!(params.character_name(), "Curious child");
    }

    #[test]
    fn test_title_is_derived() {
        let params = test_parameters();
        assert_eq!(params.title(), "Maya's Adventure Children's Story");
    }

    #[test]
    fn test_orientation_sizes() {
        assert_eq!(ImageOrientation::Square.size(), "1024x1024");
        assert_eq!(ImageOrientation::Landscape.size(), "1792x1024");
    }

    #[test]
    fn test_api_style_flag() {
        assert_eq!(ImageStyle::Photorealistic.api_style(), "natural");
        assert_eq!(ImageStyle::Watercolor.api_style(), "vivid");
    }
}
