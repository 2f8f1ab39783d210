//! Downloads generated images so they can be re-uploaded as attachments.

use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::debug;

const DEFAULT_EXTENSION: &str = "png";

/// Fetches the bytes behind an image URL.
#[async_trait]
pub trait ImageDownloader: Send + Sync {
    async fn download(&self, url: &str) -> anyhow::Result<Vec<u8>>;
}

#[derive(Debug, Clone)]
pub struct HttpImageDownloader {
    client: Client,
}

impl HttpImageDownloader {
    pub fn new() -> anyhow::Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageDownloader for HttpImageDownloader {
    async fn download(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        debug!(bytes = bytes.len(), "Image downloaded");
        Ok(bytes.to_vec())
    }
}

/// Random attachment name keeping the extension of the URL path (`.png` when there is none).
pub fn attachment_file_name(url: &str) -> String {
    let extension = Url::parse(url)
        .ok()
        .and_then(|parsed| {
            let last = parsed.path_segments()?.last()?.to_string();
            let (_, ext) = last.rsplit_once('.')?;
            (!ext.is_empty()).then(|| ext.to_string())
        })
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
    format!("{}.{}", uuid::Uuid::new_v4(), extension)
}
