use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::{
    error::HotelError,
    hotel::{
        db::HotelDb,
        models::{Hotel, HotelDocument, HotelSummaries},
        HotelFields,
    },
    image::{ImageStore, UploadedFile},
};

pub const HOTEL_NOT_FOUND: &str = "Hotel not found";

/// Hotel operations on top of the document and image stores.
#[derive(Debug, Clone)]
pub struct Hotels {
    pub db: HotelDb,
    pub images: ImageStore,
}

impl Hotels {
    pub fn new(db: HotelDb, images: ImageStore) -> Self {
        Self { db, images }
    }

    /// Build, store and return a new hotel. Submitted fields are parsed before
    /// any image is written.
    pub async fn create(
        &self,
        fields: HotelFields,
        files: Vec<UploadedFile>,
    ) -> Result<HotelDocument, HotelError> {
        let id = self.next_id().await?;
        let mut hotel = Hotel::from_fields(id, fields, vec![])?;

        hotel.images = self.images.save(files).await?;

        let id = hotel.id.clone();
        let document = HotelDocument::try_from(hotel)?;
        self.db.put(&id, &document).await?;

        info!("Created hotel {id}");

        Ok(document)
    }

    pub async fn summaries(&self) -> Result<HotelSummaries, HotelError> {
        let summaries = self.db.list_summaries().await?;
        debug!("Listed {} hotels", summaries.len());
        Ok(summaries)
    }

    pub async fn get(&self, id: &str) -> Result<HotelDocument, HotelError> {
        self.db
            .get(id)
            .await?
            .ok_or(HotelError::NotFound(HOTEL_NOT_FOUND))
    }

    /// Shallow merge `fields` over the stored hotel and return it as re-read from
    /// disk. An `id` in `fields` is ignored, the stored id never changes.
    pub async fn update(
        &self,
        id: &str,
        mut fields: Map<String, Value>,
    ) -> Result<HotelDocument, HotelError> {
        if fields.is_empty() {
            return Err(HotelError::Validation("No data provided to update."));
        }

        let mut document = self.get(id).await?;

        fields.remove("id");
        document.merge(fields);
        self.db.put(id, &document).await?;

        info!("Updated hotel {id}");

        self.get(id).await
    }

    /// Store `files` and append their paths to the hotel's images. Returns the
    /// complete image list.
    pub async fn attach_images(
        &self,
        hotel_id: Option<&str>,
        files: Vec<UploadedFile>,
    ) -> Result<Vec<Value>, HotelError> {
        let Some(hotel_id) = hotel_id.filter(|id| !id.is_empty()) else {
            return Err(HotelError::Validation("Hotel ID is required."));
        };

        let Some(mut document) = self.db.get(hotel_id).await? else {
            return Err(HotelError::NotFound("Hotel not found."));
        };

        if files.is_empty() {
            return Err(HotelError::Validation("No images uploaded."));
        }

        let paths = self.images.save(files).await?;
        let added = paths.len();
        let images = document.append_images(paths)?.clone();

        self.db.put(hotel_id, &document).await?;

        info!("Attached {added} images to hotel {hotel_id}");

        Ok(images)
    }

    /// Removes the hotel document. Its images stay on disk.
    pub async fn delete(&self, id: &str) -> Result<(), HotelError> {
        if !self.db.delete(id).await? {
            return Err(HotelError::NotFound(HOTEL_NOT_FOUND));
        }

        info!("Deleted hotel {id}");

        Ok(())
    }

    /// Nanosecond timestamp, bumped past any id already on disk.
    async fn next_id(&self) -> Result<String, HotelError> {
        let now = Utc::now();
        let mut id = now
            .timestamp_nanos_opt()
            .unwrap_or_else(|| now.timestamp_millis());

        while self.db.exists(&id.to_string()).await? {
            id += 1;
        }

        Ok(id.to_string())
    }
}
