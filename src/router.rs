use crate::{
    error::HotelError,
    hotel::{
        models::{HotelDocument, HotelSummaries},
        HotelFields,
    },
    image::{UploadedFile, IMAGES_ROUTE},
    state::Hotels,
};
use axum::{
    body::Bytes,
    extract::{
        multipart::MultipartRejection, DefaultBodyLimit, FromRequest, Multipart, Request,
    },
    http::{header, HeaderMap, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use axum_macros::debug_handler;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{debug, info};

/// Multipart field carrying image files
const IMAGES_FIELD: &str = "images";

pub fn router(hotels: Hotels, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE]);

    let uploads = ServeDir::new(hotels.images.dir());

    Router::new()
        .nest_service(IMAGES_ROUTE, uploads)
        .route("/hotel", get(list_hotels).post(create_hotel))
        .route("/hotel/images", post(upload_images))
        .route(
            "/hotel/:hotel_id",
            get(get_hotel).put(update_hotel).delete(delete_hotel),
        )
        .with_state(hotels)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn list_hotels(
    state: axum::extract::State<Hotels>,
) -> Result<Json<HotelSummaries>, HotelError> {
    let summaries = state
        .summaries()
        .await
        .map_err(|e| e.context("An error occurred while fetching hotel data."))?;
    Ok(Json(summaries))
}

/// Takes a multipart form with optional `images`, or a JSON object without files.
#[debug_handler]
pub async fn create_hotel(
    state: axum::extract::State<Hotels>,
    request: Request,
) -> Result<impl IntoResponse, HotelError> {
    const CONTEXT: &str = "An error occurred while adding the hotel.";

    let (fields, files) = if is_json(request.headers()) {
        let body = Bytes::from_request(request, &())
            .await
            .map_err(|_| HotelError::Validation("Unreadable request body."))?;
        (json_form(json_object(&body)?), vec![])
    } else {
        read_form(Multipart::from_request(request, &()).await).await?
    };

    info!("Adding hotel with {} images", files.len());

    let hotel = state
        .create(HotelFields::from(fields), files)
        .await
        .map_err(|e| e.context(CONTEXT))?;

    Ok((StatusCode::CREATED, Json(hotel)))
}

pub async fn get_hotel(
    state: axum::extract::State<Hotels>,
    hotel_id: axum::extract::Path<String>,
) -> Result<Json<HotelDocument>, HotelError> {
    debug!("Fetching hotel {}", hotel_id.0);
    let hotel = state
        .get(&hotel_id)
        .await
        .map_err(|e| e.context("An error occurred while fetching the hotel."))?;
    Ok(Json(hotel))
}

pub async fn update_hotel(
    state: axum::extract::State<Hotels>,
    hotel_id: axum::extract::Path<String>,
    body: Bytes,
) -> Result<Json<HotelDocument>, HotelError> {
    let fields = json_object(&body)?;

    debug!(
        "Updating hotel {} with {:?}",
        hotel_id.0,
        fields.keys().collect::<Vec<_>>()
    );

    let hotel = state
        .update(&hotel_id, fields)
        .await
        .map_err(|e| e.context("An error occurred while updating the hotel."))?;
    Ok(Json(hotel))
}

pub async fn upload_images(
    state: axum::extract::State<Hotels>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, HotelError> {
    const CONTEXT: &str = "An error occurred while uploading images.";

    let (fields, files) = read_form(multipart).await?;
    let hotel_id = fields.get("hotelId").map(String::as_str);

    let images = state
        .attach_images(hotel_id, files)
        .await
        .map_err(|e| e.context(CONTEXT))?;

    Ok(Json(json!({
        "message": "Images uploaded successfully.",
        "images": images,
    })))
}

pub async fn delete_hotel(
    state: axum::extract::State<Hotels>,
    hotel_id: axum::extract::Path<String>,
) -> Result<Json<Value>, HotelError> {
    state
        .delete(&hotel_id)
        .await
        .map_err(|e| e.context("An error occurred while deleting the hotel"))?;
    Ok(Json(json!({ "message": "Hotel deleted successfully" })))
}

/// Split a multipart form into its text fields and the files sent on `images`.
async fn read_form(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(HashMap<String, String>, Vec<UploadedFile>), HotelError> {
    let Ok(mut multipart) = multipart else {
        return Err(HotelError::Validation("Expected a multipart form."));
    };

    let mut fields = HashMap::new();
    let mut files = vec![];

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        let Some(file_name) = field.file_name().map(str::to_string) else {
            fields.insert(name, field.text().await?);
            continue;
        };

        if name != IMAGES_FIELD {
            return Err(HotelError::Validation("Unexpected field"));
        }

        let data = field.bytes().await?;

        // Empty file inputs still send a part
        if file_name.is_empty() && data.is_empty() {
            continue;
        }

        files.push(UploadedFile {
            field_name: name,
            file_name: Some(file_name),
            data,
        });
    }

    Ok((fields, files))
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|content_type| content_type.to_str().ok())
        .is_some_and(|content_type| content_type.starts_with("application/json"))
}

/// Flatten a JSON create body into form fields. Strings are taken as they are,
/// nested JSON is kept as JSON text, an `amenities` list is joined with commas.
fn json_form(body: Map<String, Value>) -> HashMap<String, String> {
    body.into_iter()
        .filter_map(|(key, value)| {
            let value = match value {
                Value::Null => return None,
                Value::String(value) => value,
                Value::Array(amenities) if key == "amenities" => amenities
                    .iter()
                    .map(|a| a.as_str().map_or_else(|| a.to_string(), str::to_string))
                    .collect::<Vec<_>>()
                    .join(","),
                other => other.to_string(),
            };
            Some((key, value))
        })
        .collect()
}

/// A blank body counts as no fields.
fn json_object(body: &[u8]) -> Result<Map<String, Value>, HotelError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    match serde_json::from_slice(body) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(HotelError::Validation("Expected a JSON object.")),
        Err(_) => Err(HotelError::Validation("Malformed JSON body.")),
    }
}
