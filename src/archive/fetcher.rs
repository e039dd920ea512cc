use crate::archive::error::ArchiveError;
use crate::config::ArchivePatterns;
use crate::http::download;
use log::{debug, info};
use reqwest::Client;
use std::io::{Cursor, Read};
use std::sync::Arc;
use url::Url;
use zip::ZipArchive;

/// The measurement file taken out of a station archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFile {
    /// Name of the zip archive the file came from.
    pub archive: String,
    /// Entry name inside the archive.
    pub name: String,
    pub contents: Vec<u8>,
}

impl ProductFile {
    pub fn reader(&self) -> Cursor<&[u8]> {
        Cursor::new(self.contents.as_slice())
    }
}

/// Downloads the archive index and per-station archives.
#[derive(Debug, Clone)]
pub struct ArchiveClient {
    client: Client,
    index_url: String,
    patterns: Arc<ArchivePatterns>,
}

impl ArchiveClient {
    pub fn new(client: Client, index_url: impl Into<String>, patterns: Arc<ArchivePatterns>) -> Self {
        Self {
            client,
            index_url: index_url.into(),
            patterns,
        }
    }

    pub fn patterns(&self) -> &ArchivePatterns {
        &self.patterns
    }

    /// Downloads the HTML index page listing all archives.
    pub async fn fetch_index(&self) -> Result<String, ArchiveError> {
        debug!("Downloading archive index {}", self.index_url);
        let raw = download(self.client.get(&self.index_url), &self.index_url).await?;
        Ok(String::from_utf8_lossy(&raw).into_owned())
    }

    /// Downloads archive `file_name` and returns its product file.
    ///
    /// # Errors
    ///
    /// [`ArchiveError::ProductFileNotFound`] if the archive holds no entry matching the
    /// product file pattern; download and zip failures otherwise.
    pub async fn fetch_product(&self, file_name: &str) -> Result<ProductFile, ArchiveError> {
        let url = self.archive_url(file_name)?;
        info!("Downloading archive {}", url);
        let raw = download(self.client.get(url.clone()), url.as_str()).await?;

        let patterns = Arc::clone(&self.patterns);
        let archive = file_name.to_string();
        let product =
            tokio::task::spawn_blocking(move || extract_product_file(&patterns, &archive, &raw))
                .await??;
        info!(
            "Extracted '{}' ({} bytes) from {}",
            product.name,
            product.contents.len(),
            file_name
        );
        Ok(product)
    }

    fn archive_url(&self, file_name: &str) -> Result<Url, ArchiveError> {
        let invalid = |source| ArchiveError::InvalidUrl {
            file_name: file_name.to_string(),
            source,
        };
        let mut base = Url::parse(&self.index_url).map_err(invalid)?;
        // Without a trailing slash `join` would replace the last path segment.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.join(file_name).map_err(invalid)
    }
}

/// Opens `raw` as a zip archive and reads the first entry matching the product
/// file pattern.
pub fn extract_product_file(
    patterns: &ArchivePatterns,
    archive: &str,
    raw: &[u8],
) -> Result<ProductFile, ArchiveError> {
    let mut zip = ZipArchive::new(Cursor::new(raw)).map_err(|source| ArchiveError::Zip {
        archive: archive.to_string(),
        source,
    })?;

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(|source| ArchiveError::Zip {
            archive: archive.to_string(),
            source,
        })?;
        if !patterns.is_product_file(entry.name()) {
            continue;
        }

        let name = entry.name().to_string();
        let mut contents = Vec::new();
        entry
            .read_to_end(&mut contents)
            .map_err(|source| ArchiveError::EntryRead {
                archive: archive.to_string(),
                entry: name.clone(),
                source,
            })?;
        return Ok(ProductFile {
            archive: archive.to_string(),
            name,
            contents,
        });
    }

    Err(ArchiveError::ProductFileNotFound {
        archive: archive.to_string(),
    })
}
