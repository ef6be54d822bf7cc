use crate::error::HotelError;
use axum::body::Bytes;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// Public URL prefix stored images are served under.
pub const IMAGES_ROUTE: &str = "/uploads/images";

/// A file part taken from a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Form field the file arrived on
    pub field_name: String,

    /// Client supplied file name, only its extension is kept
    pub file_name: Option<String>,

    pub data: Bytes,
}

/// Writes uploaded images under one directory. Stored images are never removed,
/// deleting a hotel leaves its images on disk.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Store every file under a fresh name and return the web paths, in order.
    /// Files written before a failure stay on disk.
    pub async fn save(&self, files: Vec<UploadedFile>) -> Result<Vec<String>, HotelError> {
        if files.is_empty() {
            return Ok(vec![]);
        }

        fs::create_dir_all(&self.dir).await?;

        let mut paths = Vec::with_capacity(files.len());

        for file in files {
            let name = unique_file_name(&file);
            fs::write(self.dir.join(&name), &file.data).await?;
            info!("Stored image {name} ({} bytes)", file.data.len());
            paths.push(format!("{IMAGES_ROUTE}/{name}"));
        }

        Ok(paths)
    }
}

/// `<field>-<millis>-<random>.<ext>`
fn unique_file_name(file: &UploadedFile) -> String {
    let field = sanitize(&file.field_name);
    let field = if field.is_empty() { "file" } else { &field };

    let millis = Utc::now().timestamp_millis();
    let random = uuid::Uuid::new_v4().as_u128() % 1_000_000_000;

    let extension = file
        .file_name
        .as_deref()
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(sanitize)
        .filter(|ext| !ext.is_empty());

    match extension {
        Some(ext) => format!("{field}-{millis}-{random}.{ext}"),
        None => format!("{field}-{millis}-{random}"),
    }
}

fn sanitize(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(file_name: Option<&str>, data: &'static [u8]) -> UploadedFile {
        UploadedFile {
            field_name: "images".to_string(),
            file_name: file_name.map(str::to_string),
            data: Bytes::from_static(data),
        }
    }

    #[tokio::test]
    async fn save_writes_files_and_returns_web_paths() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ImageStore::new(tmp.path().join("uploads"));

        let paths = store
            .save(vec![
                upload(Some("pool.jpg"), b"one"),
                upload(Some("lobby.PNG"), b"two"),
            ])
            .await
            .unwrap();

        assert_eq!(paths.len(), 2);
        assert_ne!(paths[0], paths[1]);
        assert!(paths[0].starts_with("/uploads/images/images-"));
        assert!(paths[0].ends_with(".jpg"));
        assert!(paths[1].ends_with(".PNG"));

        let name = paths[0].rsplit('/').next().unwrap();
        let stored = std::fs::read(store.dir().join(name)).unwrap();
        assert_eq!(stored, b"one");
    }

    #[tokio::test]
    async fn save_nothing_touches_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ImageStore::new(tmp.path().join("uploads"));

        assert!(store.save(vec![]).await.unwrap().is_empty());
        assert!(!store.dir().exists());
    }

    #[test]
    fn file_names_drop_unsafe_characters() {
        let file = UploadedFile {
            field_name: "../images".to_string(),
            file_name: Some("evil.j/pg".to_string()),
            data: Bytes::new(),
        };
        let name = unique_file_name(&file);
        assert!(name.starts_with("images-"));
        assert!(!name.contains('/'));

        let name = unique_file_name(&upload(None, b""));
        assert!(!name.contains('.'));
    }
}
