use thiserror::Error;

/// Fault taxonomy for the pipeline and renderers.
///
/// Only `Generation` is fatal: it aborts the run and no partial story is
/// returned. `Image` is absorbed by the illustration synthesizer (a chapter
/// simply gets no illustration) and `Embedding` is absorbed by the paginated
/// renderer (the chapter gets a placeholder line). Neither of those two ever
/// crosses a component boundary as an error value.
#[derive(Debug, Error)]
pub enum Error {
    #[error("chapter generation failed: {0}")]
    Generation(String),

    #[error("illustration synthesis failed: {0}")]
    Image(String),

    #[error("image embedding failed: {0}")]
    Embedding(String),

    #[error("document rendering failed: {0}")]
    Render(String),
}
