use chrono::{DateTime, Utc};
use mongodb::bson::DateTime as BsonDateTime;
use mongodb::bson::oid::ObjectId;

use crate::utils::error::CustomError;

/// Name echoed in every JSON envelope.
pub fn service_name() -> String {
    std::env::var("SERVICE_NAME").unwrap_or_else(|_| "Unknown".to_string())
}

/// Parses a path or body id, naming the entity in the error.
pub fn parse_object_id(id: &str, entity: &str) -> Result<ObjectId, CustomError> {
    ObjectId::parse_str(id.trim())
        .map_err(|_| CustomError::BadRequestError(format!("Invalid {} ID", entity)))
}

pub fn to_chrono(value: BsonDateTime) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(value.timestamp_millis()).unwrap_or_default()
}

/// Short display date used on post cards, e.g. `7 Mar`.
pub fn short_date(value: BsonDateTime) -> String {
    to_chrono(value).format("%-d %b").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_date_drops_leading_zero() {
        // 2024-03-07T12:00:00Z
        let value = BsonDateTime::from_millis(1_709_812_800_000);
        assert_eq!(short_date(value), "7 Mar");
    }

    #[test]
    fn malformed_ids_name_the_entity() {
        let err = parse_object_id("nope", "post").unwrap_err();
        assert_eq!(err.to_string(), "Bad Request: Invalid post ID");
        assert!(parse_object_id("65f1c0ffee0000000000beef", "post").is_ok());
    }
}
