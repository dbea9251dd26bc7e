use crate::config::Config;
use crate::params::{
    BookSize, CharacterDetails, ImageOrientation, ImageQuality, ImageStyle, PageSize,
    StoryParameters, StoryType,
};
use anyhow::Result;
use inquire::{Confirm, CustomType, MultiSelect, Password, Select, Text};

const CUSTOM: &str = "Custom";

/// Prompts for the API key when the config does not carry one yet and saves
/// the updated config. Generation cannot start without a credential.
pub fn ensure_credential(config: &mut Config) -> Result<()> {
    if !config.services.api_key.is_empty() {
        return Ok(());
    }
    let key = Password::new("OpenAI API key:")
        .without_confirmation()
        .prompt()?;
    config.services.api_key = key.trim().to_string();
    config.save()?;
    println!("Configuration saved.");
    Ok(())
}

pub fn genres_for(story_type: StoryType) -> Vec<&'static str> {
    match story_type {
        StoryType::Children => vec![
            "Adventure",
            "Animal Friends",
            "Fairy Tale",
            "Educational",
            "Friendship",
            "Family",
            "School Stories",
            "Bedtime Stories",
            CUSTOM,
        ],
        StoryType::Moral => vec![
            "Kindness & Compassion",
            "Honesty & Truth",
            "Courage & Bravery",
            "Friendship & Loyalty",
            "Hard Work & Perseverance",
            "Gratitude & Appreciation",
            "Respect & Responsibility",
            "Sharing & Generosity",
            CUSTOM,
        ],
        StoryType::General => vec![
            "Adventure",
            "Science Fiction",
            "Mystery",
            "Historical Fiction",
            "Contemporary Drama",
            "Comedy",
            "Romance",
            CUSTOM,
        ],
    }
}

pub fn settings_for(story_type: StoryType) -> Vec<&'static str> {
    match story_type {
        StoryType::Children => vec![
            "Friendly Forest",
            "Cozy Town",
            "School",
            "Playground",
            "Farm",
            "Beach",
            "Garden",
            "Zoo",
            CUSTOM,
        ],
        StoryType::Moral => vec![
            "Village",
            "School",
            "Home",
            "Community Center",
            "Park",
            "Neighborhood",
            "Marketplace",
            "Farm",
            CUSTOM,
        ],
        StoryType::General => vec![
            "Modern City",
            "Small Town",
            "Historical Setting",
            "Countryside",
            "Beach Town",
            "Mountain Village",
            "Suburban Neighborhood",
            CUSTOM,
        ],
    }
}

pub fn plot_elements_for(story_type: StoryType) -> Vec<&'static str> {
    match story_type {
        StoryType::Children => vec![
            "Making new friends",
            "Learning something new",
            "Going on an adventure",
            "Helping others",
            "Solving a problem",
            "Celebrating together",
            "Discovering talents",
            "Overcoming fears",
        ],
        StoryType::Moral => vec![
            "Learning from mistakes",
            "Helping someone in need",
            "Standing up for what's right",
            "The value of hard work",
            "Importance of honesty",
            "Power of kindness",
            "Learning to share",
            "Respecting differences",
        ],
        StoryType::General => vec![
            "Personal growth journey",
            "Solving a mystery",
            "Overcoming challenges",
            "Building relationships",
            "Achieving goals",
            "Community involvement",
            "Career development",
            "Family dynamics",
        ],
    }
}

pub fn tones_for(story_type: StoryType) -> Vec<&'static str> {
    match story_type {
        StoryType::Children => vec![
            "Playful and fun",
            "Gentle and soothing",
            "Exciting and adventurous",
            "Warm and comforting",
        ],
        StoryType::Moral => vec!["Inspirational", "Thoughtful", "Uplifting", "Encouraging"],
        StoryType::General => vec![
            "Lighthearted",
            "Dramatic",
            "Humorous",
            "Inspirational",
            "Reflective",
        ],
    }
}

/// Walks the user through every story parameter, mirroring the step order of
/// the setup flow: type, genre, character, setting, plot, tone and length,
/// then illustration and page options.
pub fn collect_parameters() -> Result<StoryParameters> {
    let story_type = select_story_type()?;
    let genre = select_with_custom("Choose a genre:", genres_for(story_type), "Custom genre:")?;

    let main_character = Text::new("Main character (e.g. 'a curious child', 'a brave knight'):")
        .prompt()?;
    println!("Optional character details (leave blank to skip):");
    let character = CharacterDetails {
        name: Text::new("Character name:").prompt()?,
        age: Text::new("Age:").prompt()?,
        ethnicity: Text::new("Ethnicity:").prompt()?,
        appearance: Text::new("Appearance:").prompt()?,
        personality: Text::new("Personality:").prompt()?,
    };

    let setting = select_with_custom(
        "Choose a setting:",
        settings_for(story_type),
        "Custom setting:",
    )?;
    let environment_details =
        Text::new("Extra environment details (optional):").prompt()?;

    let plot_elements = MultiSelect::new(
        "Pick plot elements (space to toggle):",
        plot_elements_for(story_type),
    )
    .prompt()?
    .into_iter()
    .map(str::to_string)
    .collect();
    let custom_plot_elements = Text::new("Additional plot ideas (optional):").prompt()?;

    let tone = Select::new("Choose a tone:", tones_for(story_type))
        .prompt()?
        .to_string();

    let book_size = select_book_size()?;
    let chapter_count = CustomType::<usize>::new("Number of chapters (1-10):")
        .with_default(3)
        .with_error_message("Please enter a number")
        .prompt()?
        .clamp(1, 10);

    let generate_images = Confirm::new("Generate illustrations?")
        .with_default(true)
        .prompt()?;
    let (image_orientation, image_style, image_quality) = if generate_images {
        (
            select_orientation()?,
            select_style()?,
            select_quality()?,
        )
    } else {
        (
            ImageOrientation::Square,
            ImageStyle::Colorful,
            ImageQuality::Standard,
        )
    };

    let page_size = select_page_size()?;

    Ok(StoryParameters {
        story_type,
        genre,
        main_character,
        character,
        setting,
        environment_details,
        plot_elements,
        custom_plot_elements,
        tone,
        chapter_count,
        words_per_chapter: book_size.words_per_chapter(),
        generate_images,
        image_orientation,
        image_style,
        image_quality,
        page_size,
    })
}

fn select_story_type() -> Result<StoryType> {
    let options = [StoryType::Children, StoryType::Moral, StoryType::General];
    let names: Vec<&str> = options.iter().map(|t| t.display_name()).collect();
    let picked = Select::new("What kind of story?", names).prompt()?;
    Ok(options
        .into_iter()
        .find(|t| t.display_name() == picked)
        .unwrap_or(StoryType::General))
}

/// Select from a catalog; picking `Custom` follows up with a free-text
/// prompt.
fn select_with_custom(
    prompt: &str,
    options: Vec<&'static str>,
    custom_prompt: &str,
) -> Result<String> {
    let picked = Select::new(prompt, options).prompt()?;
    if picked == CUSTOM {
        Ok(Text::new(custom_prompt).prompt()?)
    } else {
        Ok(picked.to_string())
    }
}

fn select_book_size() -> Result<BookSize> {
    let options = [BookSize::Short, BookSize::Medium, BookSize::Long];
    let names: Vec<&str> = options.iter().map(|s| s.display_name()).collect();
    let picked = Select::new("Book size:", names).prompt()?;
    Ok(options
        .into_iter()
        .find(|s| s.display_name() == picked)
        .unwrap_or(BookSize::Short))
}

fn select_orientation() -> Result<ImageOrientation> {
    let picked = Select::new(
        "Illustration orientation:",
        vec!["Square (1024x1024)", "Landscape (1792x1024)"],
    )
    .prompt()?;
    Ok(if picked.starts_with("Landscape") {
        ImageOrientation::Landscape
    } else {
        ImageOrientation::Square
    })
}

fn select_style() -> Result<ImageStyle> {
    let options = [
        ImageStyle::Colorful,
        ImageStyle::Grayscale,
        ImageStyle::PencilSketch,
        ImageStyle::Watercolor,
        ImageStyle::Cartoon,
        ImageStyle::Photorealistic,
    ];
    let names: Vec<&str> = options.iter().map(|s| s.display_name()).collect();
    let picked = Select::new("Illustration style:", names).prompt()?;
    Ok(options
        .into_iter()
        .find(|s| s.display_name() == picked)
        .unwrap_or(ImageStyle::Colorful))
}

fn select_quality() -> Result<ImageQuality> {
    let picked = Select::new("Illustration quality:", vec!["Standard", "HD"]).prompt()?;
    Ok(if picked == "HD" {
        ImageQuality::Hd
    } else {
        ImageQuality::Standard
    })
}

fn select_page_size() -> Result<PageSize> {
    let options = [PageSize::Letter, PageSize::A4, PageSize::A5];
    let names: Vec<&str> = options.iter().map(|p| p.display_name()).collect();
    let picked = Select::new("Page size for the paginated export:", names).prompt()?;
    Ok(options
        .into_iter()
        .find(|p| p.display_name() == picked)
        .unwrap_or(PageSize::Letter))
}
