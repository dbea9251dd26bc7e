use anyhow::{anyhow, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use log::{debug, warn};
use url::Url;

/// One strategy for turning an illustration reference into raw image bytes.
/// Strategies are tried in order; the first success wins.
#[async_trait]
pub trait ByteResolver: Send + Sync {
    fn name(&self) -> &'static str;
    async fn resolve(&self, reference: &str) -> Result<Vec<u8>>;
}

/// The default chain: direct fetch, fetch with a decode/re-encode pass for
/// servers that return odd encodings, then inline data-URI decoding.
pub fn default_chain() -> Vec<Box<dyn ByteResolver>> {
    let client = reqwest::Client::new();
    vec![
        Box::new(DirectFetch {
            client: client.clone(),
        }),
        Box::new(ReencodeFetch { client }),
        Box::new(DataUri),
    ]
}

/// Walks the chain until a resolver produces bytes. Exhaustion is not an
/// error here; the caller substitutes placeholder content.
pub async fn resolve_bytes(chain: &[Box<dyn ByteResolver>], reference: &str) -> Option<Vec<u8>> {
    for resolver in chain {
        match resolver.resolve(reference).await {
            Ok(bytes) => {
                debug!("Resolved image bytes via {}", resolver.name());
                return Some(bytes);
            }
            Err(e) => {
                warn!("Resolver {} failed for image reference: {}", resolver.name(), e);
            }
        }
    }
    warn!("All resolvers exhausted; image will not be embedded");
    None
}

fn fetch_url(reference: &str) -> Result<Url> {
    let url = Url::parse(reference)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(anyhow!("unsupported scheme for fetch: {}", other)),
    }
}

pub struct DirectFetch {
    pub client: reqwest::Client,
}

#[async_trait]
impl ByteResolver for DirectFetch {
    fn name(&self) -> &'static str {
        "direct-fetch"
    }

    async fn resolve(&self, reference: &str) -> Result<Vec<u8>> {
        let url = fetch_url(reference)?;
        let resp = self.client.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(anyhow!("fetch returned status {}", resp.status()));
        }
        let bytes = resp.bytes().await?.to_vec();
        // Must actually be an image, not an HTML error page.
        image::guess_format(&bytes)?;
        Ok(bytes)
    }
}

/// Fetches and re-encodes through the `image` crate, normalizing encodings
/// the direct path could not identify.
pub struct ReencodeFetch {
    pub client: reqwest::Client,
}

#[async_trait]
impl ByteResolver for ReencodeFetch {
    fn name(&self) -> &'static str {
        "fetch-reencode"
    }

    async fn resolve(&self, reference: &str) -> Result<Vec<u8>> {
        let url = fetch_url(reference)?;
        let resp = self.client.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(anyhow!("fetch returned status {}", resp.status()));
        }
        let bytes = resp.bytes().await?;
        let decoded = image::load_from_memory(&bytes)?;
        let rgb = decoded.to_rgb8();
        let mut jpeg = Vec::new();
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, 95).encode_image(&rgb)?;
        Ok(jpeg)
    }
}

/// Decodes `data:<mime>;base64,<payload>` references in place, no network.
pub struct DataUri;

#[async_trait]
impl ByteResolver for DataUri {
    fn name(&self) -> &'static str {
        "data-uri"
    }

    async fn resolve(&self, reference: &str) -> Result<Vec<u8>> {
        let rest = reference
            .strip_prefix("data:")
            .ok_or_else(|| anyhow!("not a data URI"))?;
        let (_, payload) = rest
            .split_once(";base64,")
            .ok_or_else(|| anyhow!("data URI is not base64 encoded"))?;
        Ok(BASE64.decode(payload)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1x1 black pixel PNG.
    const TINY_PNG: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48,
        0x44, 0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x02, 0x00, 0x00,
        0x00, 0x90, 0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49, 0x44, 0x41, 0x54, 0x78,
        0x9C, 0x63, 0x60, 0x60, 0x60, 0x00, 0x00, 0x00, 0x04, 0x00, 0x01, 0x27, 0x34, 0x27,
        0x0A, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];

    #[tokio::test]
    async fn test_data_uri_resolver_decodes_base64() {
        let payload = BASE64.encode(TINY_PNG);
        let reference = format!("data:image/png;base64,{}", payload);
        let bytes = DataUri.resolve(&reference).await.unwrap();
        assert_eq!(bytes, TINY_PNG);
    }

    #[tokio::test]
    async fn test_data_uri_resolver_rejects_http() {
        assert!(DataUri.resolve("https://example.com/a.png").await.is_err());
    }

    #[tokio::test]
    async fn test_fetchers_reject_data_uris() {
        let client = reqwest::Client::new();
        let fetch = DirectFetch { client };
        assert!(fetch.resolve("data:image/png;base64,AAAA").await.is_err());
    }

    struct Scripted {
        ok: bool,
        calls: std::sync::Mutex<usize>,
    }

    #[async_trait]
    impl ByteResolver for Scripted {
        fn name(&self) -> &'static str {
            "scripted"
        }
        async fn resolve(&self, _reference: &str) -> Result<Vec<u8>> {
            *self.calls.lock().unwrap() += 1;
            if self.ok {
                Ok(vec![1, 2, 3])
            } else {
                Err(anyhow!("scripted failure"))
            }
        }
    }

    #[tokio::test]
    async fn test_chain_stops_at_first_success() {
        let chain: Vec<Box<dyn ByteResolver>> = vec![
            Box::new(Scripted {
                ok: false,
                calls: std::sync::Mutex::new(0),
            }),
            Box::new(Scripted {
                ok: true,
                calls: std::sync::Mutex::new(0),
            }),
            Box::new(Scripted {
                ok: true,
                calls: std::sync::Mutex::new(0),
            }),
        ];
        let bytes = resolve_bytes(&chain, "ref").await;
        assert_eq!(bytes, Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_chain_exhaustion_yields_none() {
        let chain: Vec<Box<dyn ByteResolver>> = vec![Box::new(Scripted {
            ok: false,
            calls: std::sync::Mutex::new(0),
        })];
        assert_eq!(resolve_bytes(&chain, "ref").await, None);
    }
}
