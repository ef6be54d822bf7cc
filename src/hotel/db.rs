use super::models::{HotelDocument, HotelSummaries};
use crate::error::HotelError;
use std::{io::ErrorKind, path::PathBuf};
use tokio::fs;
use tracing::debug;

/// Hotel documents stored as `<id>.json` files in a single directory.
///
/// Writes go straight to the target file. There is no locking and no
/// temp-file-then-rename, concurrent writers to one id race and the last wins.
#[derive(Debug, Clone)]
pub struct HotelDb {
    dir: PathBuf,
}

impl HotelDb {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Location of the document for `id`, or `None` when `id` could escape the
    /// hotel directory.
    fn path(&self, id: &str) -> Option<PathBuf> {
        let valid = !id.is_empty()
            && id != "."
            && !id.contains("..")
            && !id.contains(['/', '\\', '\0']);

        valid.then(|| self.dir.join(format!("{id}.json")))
    }

    pub async fn exists(&self, id: &str) -> Result<bool, HotelError> {
        let Some(path) = self.path(id) else {
            return Ok(false);
        };
        Ok(fs::try_exists(path).await?)
    }

    pub async fn get(&self, id: &str) -> Result<Option<HotelDocument>, HotelError> {
        let Some(path) = self.path(id) else {
            return Ok(None);
        };

        debug!("Reading {}", path.display());

        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Overwrite the document stored under `id`, creating the directory if needed.
    pub async fn put(&self, id: &str, document: &HotelDocument) -> Result<(), HotelError> {
        let path = self
            .path(id)
            .ok_or_else(|| HotelError::InvalidDocument(format!("unusable hotel id: {id:?}")))?;

        fs::create_dir_all(&self.dir).await?;

        debug!("Writing {}", path.display());

        let content = serde_json::to_string_pretty(document)?;
        fs::write(path, content).await?;

        Ok(())
    }

    /// Returns `false` when there was nothing to delete.
    pub async fn delete(&self, id: &str) -> Result<bool, HotelError> {
        let Some(path) = self.path(id) else {
            return Ok(false);
        };

        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Reads every file in the directory. Documents without both an id and a
    /// title are left out, any unreadable or malformed file fails the listing.
    pub async fn list_summaries(&self) -> Result<HotelSummaries, HotelError> {
        let mut entries = fs::read_dir(&self.dir).await?;
        let mut summaries = HotelSummaries::new();

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }

            let content = fs::read_to_string(entry.path()).await?;
            let document: HotelDocument = serde_json::from_str(&content)?;

            let (Some(id), Some(title)) = (document.id(), document.title()) else {
                debug!("Skipping {}, no id or title", entry.path().display());
                continue;
            };

            summaries.insert(id, title.clone());
        }

        Ok(summaries)
    }
}
