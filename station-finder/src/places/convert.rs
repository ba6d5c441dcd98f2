//! Conversion from Places API DTOs to domain types.

use crate::domain::{
    BoundingBox, BusinessStatus, GeoPoint, PlaceCandidate, PlaceDetail, PlaceId, PriceLevel,
};

use super::types::{
    AutocompleteResponse, LatLng, LocationRestriction, PlaceResponse, Rectangle,
};

/// Error during DTO to domain conversion.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConversionError {
    /// Place ID was empty
    #[error("invalid place ID: {0:?}")]
    InvalidPlaceId(String),

    /// Coordinate out of range
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// Missing required field
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

/// Build the rectangular location restriction for a search box.
pub fn rectangle_for(bounds: &BoundingBox) -> LocationRestriction {
    LocationRestriction {
        rectangle: Rectangle {
            low: lat_lng(&bounds.low),
            high: lat_lng(&bounds.high),
        },
    }
}

fn lat_lng(point: &GeoPoint) -> LatLng {
    LatLng {
        latitude: point.latitude(),
        longitude: point.longitude(),
    }
}

/// Convert autocomplete suggestions to candidates.
///
/// Query predictions and predictions with an empty ID are skipped rather
/// than failing the whole response.
pub fn convert_autocomplete(response: AutocompleteResponse) -> Vec<PlaceCandidate> {
    response
        .suggestions
        .into_iter()
        .filter_map(|s| s.place_prediction)
        .filter_map(|p| {
            let id = PlaceId::parse(&p.place_id).ok()?;
            Some(PlaceCandidate::new(id, p.text.map(|t| t.text)))
        })
        .collect()
}

/// Convert a place details response to a domain detail record.
pub fn convert_place(place: PlaceResponse) -> Result<PlaceDetail, ConversionError> {
    let place_id =
        PlaceId::parse(&place.id).map_err(|_| ConversionError::InvalidPlaceId(place.id.clone()))?;

    let location = place.location.ok_or(ConversionError::MissingField("location"))?;
    let coordinate = GeoPoint::new(location.latitude, location.longitude)
        .map_err(|e| ConversionError::InvalidCoordinate(e.to_string()))?;

    let opening_hours = place
        .regular_opening_hours
        .map(|h| h.weekday_descriptions)
        .filter(|lines| !lines.is_empty());

    Ok(PlaceDetail {
        place_id,
        name: place.display_name.map(|n| n.text),
        coordinate,
        formatted_address: place.formatted_address,
        phone_number: place
            .national_phone_number
            .or(place.international_phone_number),
        opening_hours,
        website: place.website_uri,
        rating: place.rating,
        price_level: place.price_level.as_deref().map(parse_price_level),
        user_ratings_total: place.user_rating_count,
        business_status: place.business_status.as_deref().map(parse_business_status),
        types: place.types,
    })
}

fn parse_price_level(s: &str) -> PriceLevel {
    match s {
        "PRICE_LEVEL_FREE" => PriceLevel::Free,
        "PRICE_LEVEL_INEXPENSIVE" => PriceLevel::Cheap,
        "PRICE_LEVEL_MODERATE" => PriceLevel::Medium,
        "PRICE_LEVEL_EXPENSIVE" => PriceLevel::High,
        "PRICE_LEVEL_VERY_EXPENSIVE" => PriceLevel::Expensive,
        _ => PriceLevel::Unknown,
    }
}

fn parse_business_status(s: &str) -> BusinessStatus {
    match s {
        "OPERATIONAL" => BusinessStatus::Operational,
        "CLOSED_TEMPORARILY" => BusinessStatus::ClosedTemporarily,
        "CLOSED_PERMANENTLY" => BusinessStatus::ClosedPermanently,
        _ => BusinessStatus::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place_json(body: &str) -> PlaceResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn converts_full_place() {
        let place = place_json(
            r#"{
                "id": "ChIJ123",
                "displayName": {"text": "Esso"},
                "location": {"latitude": 43.7, "longitude": -79.4},
                "nationalPhoneNumber": "(416) 555-0100",
                "regularOpeningHours": {"weekdayDescriptions": ["Monday: 6AM-11PM"]},
                "websiteUri": "https://esso.example",
                "priceLevel": "PRICE_LEVEL_MODERATE",
                "businessStatus": "CLOSED_TEMPORARILY",
                "types": ["gas_station"]
            }"#,
        );

        let detail = convert_place(place).unwrap();
        assert_eq!(detail.place_id.as_str(), "ChIJ123");
        assert_eq!(detail.name.as_deref(), Some("Esso"));
        assert_eq!(detail.phone_number.as_deref(), Some("(416) 555-0100"));
        assert_eq!(
            detail.opening_hours.as_deref(),
            Some(&["Monday: 6AM-11PM".to_string()][..])
        );
        assert_eq!(detail.price_level, Some(PriceLevel::Medium));
        assert_eq!(
            detail.business_status,
            Some(BusinessStatus::ClosedTemporarily)
        );
        assert!(detail.has_type("gas_station"));
    }

    #[test]
    fn missing_location_is_an_error() {
        let place = place_json(r#"{"id": "ChIJ123"}"#);
        assert!(matches!(
            convert_place(place),
            Err(ConversionError::MissingField("location"))
        ));
    }

    #[test]
    fn out_of_range_location_is_an_error() {
        let place =
            place_json(r#"{"id": "ChIJ123", "location": {"latitude": 123.0, "longitude": 0.0}}"#);
        assert!(matches!(
            convert_place(place),
            Err(ConversionError::InvalidCoordinate(_))
        ));
    }

    #[test]
    fn falls_back_to_international_phone() {
        let place = place_json(
            r#"{
                "id": "A",
                "location": {"latitude": 0.0, "longitude": 0.0},
                "internationalPhoneNumber": "+1 416-555-0100"
            }"#,
        );
        let detail = convert_place(place).unwrap();
        assert_eq!(detail.phone_number.as_deref(), Some("+1 416-555-0100"));
    }

    #[test]
    fn unknown_enums_map_to_unknown() {
        assert_eq!(parse_price_level("PRICE_LEVEL_UNSPECIFIED"), PriceLevel::Unknown);
        assert_eq!(parse_price_level("nonsense"), PriceLevel::Unknown);
        assert_eq!(parse_price_level("PRICE_LEVEL_FREE"), PriceLevel::Free);
        assert_eq!(
            parse_price_level("PRICE_LEVEL_VERY_EXPENSIVE"),
            PriceLevel::Expensive
        );
        assert_eq!(
            parse_business_status("BUSINESS_STATUS_UNSPECIFIED"),
            BusinessStatus::Unknown
        );
        assert_eq!(
            parse_business_status("CLOSED_PERMANENTLY"),
            BusinessStatus::ClosedPermanently
        );
    }

    #[test]
    fn autocomplete_skips_query_predictions_and_empty_ids() {
        let response: AutocompleteResponse = serde_json::from_str(
            r#"{
                "suggestions": [
                    {"placePrediction": {"placeId": "A", "text": {"text": "Shell"}}},
                    {"queryPrediction": {"text": {"text": "gas station near me"}}},
                    {"placePrediction": {"placeId": "", "text": {"text": "Broken"}}},
                    {"placePrediction": {"placeId": "B"}}
                ]
            }"#,
        )
        .unwrap();

        let candidates = convert_autocomplete(response);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].place_id.as_str(), "A");
        assert_eq!(candidates[0].name.as_deref(), Some("Shell"));
        assert_eq!(candidates[1].name, None);
    }

    #[test]
    fn rectangle_matches_bounds() {
        let center = GeoPoint::new(43.7, -79.4).unwrap();
        let bounds = BoundingBox::around(center, 100.0);
        let rect = rectangle_for(&bounds);
        assert_eq!(rect.rectangle.low.latitude, bounds.low.latitude());
        assert_eq!(rect.rectangle.high.longitude, bounds.high.longitude());
    }
}
