use crate::{error::HotelError, slug::slugify};
use serde_json::Value;
use std::collections::HashMap;

use self::models::Hotel;

pub mod db;
pub mod models;

/// Text fields of a create request, exactly as submitted.
#[derive(Debug, Default, Clone)]
pub struct HotelFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub guest_count: Option<String>,
    pub bedroom_count: Option<String>,
    pub bathroom_count: Option<String>,
    /// Comma separated
    pub amenities: Option<String>,
    /// JSON object
    pub host_info: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    /// JSON array
    pub rooms: Option<String>,
}

impl From<HashMap<String, String>> for HotelFields {
    fn from(mut fields: HashMap<String, String>) -> Self {
        Self {
            title: fields.remove("title"),
            description: fields.remove("description"),
            guest_count: fields.remove("guestCount"),
            bedroom_count: fields.remove("bedroomCount"),
            bathroom_count: fields.remove("bathroomCount"),
            amenities: fields.remove("amenities"),
            host_info: fields.remove("hostInfo"),
            address: fields.remove("address"),
            latitude: fields.remove("latitude"),
            longitude: fields.remove("longitude"),
            rooms: fields.remove("rooms"),
        }
    }
}

impl Hotel {
    /// Build a new hotel from submitted fields. Counts that do not parse become 0,
    /// coordinates that do not parse become `None`. Malformed `hostInfo` or
    /// `rooms` JSON is an error.
    pub fn from_fields(
        id: String,
        fields: HotelFields,
        images: Vec<String>,
    ) -> Result<Self, HotelError> {
        let HotelFields {
            title,
            description,
            guest_count,
            bedroom_count,
            bathroom_count,
            amenities,
            host_info,
            address,
            latitude,
            longitude,
            rooms,
        } = fields;

        let slug = slugify(title.as_deref().unwrap_or("undefined"));

        let host_info = match non_empty(host_info) {
            Some(host_info) => serde_json::from_str(&host_info)?,
            None => Value::Object(Default::default()),
        };

        let rooms = match non_empty(rooms) {
            Some(rooms) => serde_json::from_str(&rooms)?,
            None => vec![],
        };

        Ok(Self {
            id,
            slug,
            images,
            title,
            description,
            guest_count: parse_count(guest_count.as_deref()),
            bedroom_count: parse_count(bedroom_count.as_deref()),
            bathroom_count: parse_count(bathroom_count.as_deref()),
            amenities: split_amenities(amenities.as_deref()),
            host_info,
            address,
            latitude: parse_coordinate(latitude.as_deref()),
            longitude: parse_coordinate(longitude.as_deref()),
            rooms,
        })
    }
}

const MAX_COORDINATE_LEN: usize = 64;

fn non_empty(field: Option<String>) -> Option<String> {
    field.filter(|f| !f.trim().is_empty())
}

/// Leading integer of the input, `"3 guests"` is 3 and `"2.9"` is 2. Anything
/// without a leading integer is 0.
fn parse_count(input: Option<&str>) -> i64 {
    let Some(input) = input else {
        return 0;
    };

    let input = input.trim_start();
    let sign_len = usize::from(input.starts_with(['+', '-']));
    let digits_len = input[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();

    input[..sign_len + digits_len].parse().unwrap_or(0)
}

/// Longest leading prefix that reads as a float, looking at most
/// `MAX_COORDINATE_LEN` bytes in. Non-finite values are `None`.
fn parse_coordinate(input: Option<&str>) -> Option<f64> {
    let input = input?.trim_start();

    (1..=input.len().min(MAX_COORDINATE_LEN))
        .rev()
        .filter_map(|end| input.get(..end))
        .find_map(|prefix| prefix.parse::<f64>().ok())
        .filter(|value| value.is_finite())
}

/// Comma separated amenities, trimmed, without blanks or repeats.
fn split_amenities(input: Option<&str>) -> Vec<String> {
    let mut amenities: Vec<String> = vec![];

    for amenity in input.unwrap_or_default().split(',').map(str::trim) {
        if amenity.is_empty() || amenities.iter().any(|a| a == amenity) {
            continue;
        }
        amenities.push(amenity.to_string());
    }

    amenities
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(pairs: &[(&str, &str)]) -> HotelFields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>()
            .into()
    }

    #[test]
    fn counts_take_the_leading_integer() {
        assert_eq!(parse_count(Some("4")), 4);
        assert_eq!(parse_count(Some("  3 guests")), 3);
        assert_eq!(parse_count(Some("2.9")), 2);
        assert_eq!(parse_count(Some("-1")), -1);
        assert_eq!(parse_count(Some("many")), 0);
        assert_eq!(parse_count(Some("")), 0);
        assert_eq!(parse_count(None), 0);
    }

    #[test]
    fn coordinates_take_the_leading_float() {
        assert_eq!(parse_coordinate(Some("40.7128")), Some(40.7128));
        assert_eq!(parse_coordinate(Some("-74.006 W")), Some(-74.006));
        assert_eq!(parse_coordinate(Some("north")), None);
        assert_eq!(parse_coordinate(Some("inf")), None);
        assert_eq!(parse_coordinate(Some("1e400")), None);
        assert_eq!(parse_coordinate(Some("1e40x")), Some(1e40));
        assert_eq!(parse_coordinate(None), None);
    }

    #[test]
    fn amenities_split_on_commas() {
        assert_eq!(
            split_amenities(Some("wifi, pool,,wifi ,parking")),
            vec!["wifi", "pool", "parking"]
        );
        assert!(split_amenities(Some("")).is_empty());
        assert!(split_amenities(None).is_empty());
    }

    #[test]
    fn from_fields_fills_defaults() {
        let hotel = Hotel::from_fields(
            "1".to_string(),
            fields(&[("title", "City Lights Inn"), ("guestCount", "abc")]),
            vec![],
        )
        .unwrap();

        assert_eq!(hotel.slug, "city-lights-inn");
        assert_eq!(hotel.guest_count, 0);
        assert_eq!(hotel.bedroom_count, 0);
        assert!(hotel.amenities.is_empty());
        assert!(hotel.rooms.is_empty());
        assert_eq!(hotel.host_info, json!({}));
        assert_eq!(hotel.latitude, None);
    }

    #[test]
    fn from_fields_parses_json_fields() {
        let hotel = Hotel::from_fields(
            "1".to_string(),
            fields(&[
                ("title", "Harbor House"),
                ("hostInfo", r#"{"name":"Ann","superhost":true}"#),
                ("rooms", r#"[{"room_title":"Suite","anything":[1,2]}]"#),
                ("bedroomCount", "3"),
                ("latitude", "40.5"),
            ]),
            vec!["/uploads/images/a.jpg".to_string()],
        )
        .unwrap();

        assert_eq!(hotel.host_info["superhost"], json!(true));
        assert_eq!(hotel.rooms.len(), 1);
        assert_eq!(hotel.bedroom_count, 3);
        assert_eq!(hotel.latitude, Some(40.5));
        assert_eq!(hotel.images.len(), 1);
    }

    #[test]
    fn from_fields_rejects_malformed_json() {
        let result = Hotel::from_fields(
            "1".to_string(),
            fields(&[("title", "Inn"), ("rooms", "[{")]),
            vec![],
        );
        assert!(matches!(result, Err(HotelError::Json(_))));
    }

    #[test]
    fn missing_title_slugs_undefined() {
        let hotel = Hotel::from_fields("1".to_string(), HotelFields::default(), vec![]).unwrap();
        assert_eq!(hotel.slug, "undefined");
        assert_eq!(hotel.title, None);
    }
}
