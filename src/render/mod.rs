//! Turns an assembled story into a downloadable artifact. All three formats
//! read chapter boundaries from the shared marker protocol, so a narrative a
//! renderer cannot parse degrades to an unstructured dump rather than an
//! error.

mod html;
mod pdf;
pub mod resolve;
mod text;

use crate::error::Error;
use crate::params::StoryParameters;
use crate::story::Story;
use log::info;
use resolve::ByteResolver;

/// Output format the user picked at export time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTarget {
    PlainText,
    Hypertext,
    Paginated,
}

impl RenderTarget {
    pub fn extension(&self) -> &'static str {
        match self {
            RenderTarget::PlainText => "txt",
            RenderTarget::Hypertext => "html",
            RenderTarget::Paginated => "pdf",
        }
    }
}

#[derive(Debug)]
pub struct RenderedDocument {
    pub target: RenderTarget,
    pub bytes: Vec<u8>,
}

/// Stateless renderer holding the byte-resolution chain the paginated
/// format needs for embedding illustrations.
pub struct DocumentRenderer {
    resolvers: Vec<Box<dyn ByteResolver>>,
}

impl DocumentRenderer {
    pub fn new() -> Self {
        DocumentRenderer {
            resolvers: resolve::default_chain(),
        }
    }

    #[cfg(test)]
    pub fn with_resolvers(resolvers: Vec<Box<dyn ByteResolver>>) -> Self {
        DocumentRenderer { resolvers }
    }

    pub async fn render(
        &self,
        story: &Story,
        params: &StoryParameters,
        target: RenderTarget,
    ) -> Result<RenderedDocument, Error> {
        info!("Rendering story as {:?}", target);
        let bytes = match target {
            RenderTarget::PlainText => text::render(story, params),
            RenderTarget::Hypertext => html::render(story, params),
            RenderTarget::Paginated => {
                // Resolve every referenced illustration up front so the page
                // layout below stays synchronous.
                let mut image_bytes = Vec::with_capacity(story.illustrations.len());
                for illustration in &story.illustrations {
                    let bytes = match &illustration.reference {
                        Some(reference) => {
                            resolve::resolve_bytes(&self.resolvers, reference).await
                        }
                        None => None,
                    };
                    image_bytes.push(bytes);
                }
                pdf::render(story, params, &image_bytes)?
            }
        };
        Ok(RenderedDocument { target, bytes })
    }
}

impl Default for DocumentRenderer {
    fn default() -> Self {
        Self::new()
    }
}
