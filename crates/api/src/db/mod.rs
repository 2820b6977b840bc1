//! Repositories over the document store.
//!
//! # Collections
//!
//! - `products` - Catalog items with per-color stock
//! - `categories` - Category cards (unique `name` and `slug`)
//! - `orders` - Placed orders (unique `orderNumber`)
//! - `reviews` - Product reviews
//! - `tickets` - Support tickets
//! - `users` - Accounts with Argon2 password hashes (unique `email`)
//! - `sessions` - Bearer token digests (unique `tokenHash`)
//! - `abouts` - The single about-page document
//!
//! Each repository keeps a private `*Document` row type mirroring the stored
//! BSON (`ObjectId` ids, BSON datetimes, `f64` money) and converts it to the
//! domain types from `anar_shop_core`. A row that fails to convert is reported
//! as [`StoreError::DataCorruption`].

pub mod about;
pub mod categories;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod sessions;
pub mod tickets;
pub mod users;

pub use about::AboutRepository;
pub use categories::CategoryRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use reviews::ReviewRepository;
pub use sessions::SessionRepository;
pub use tickets::TicketRepository;
pub use users::UserRepository;

use chrono::{DateTime, Utc};
use mongodb::bson::{self, Document, oid::ObjectId};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::store::StoreError;

/// Convert a timestamp to BSON (millisecond precision).
pub(crate) fn to_bson_datetime(at: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(at.timestamp_millis())
}

/// Convert a BSON datetime back to `chrono`.
pub(crate) fn from_bson_datetime(at: bson::DateTime) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_millis(at.timestamp_millis()).ok_or_else(|| {
        StoreError::DataCorruption(format!("timestamp out of range: {}", at.timestamp_millis()))
    })
}

/// The current time, truncated to what BSON stores.
pub(crate) fn now() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

pub(crate) fn decimal_to_f64(amount: Decimal, field: &str) -> Result<f64, StoreError> {
    amount
        .to_f64()
        .ok_or_else(|| StoreError::DataCorruption(format!("{field} not representable: {amount}")))
}

pub(crate) fn f64_to_decimal(amount: f64, field: &str) -> Result<Decimal, StoreError> {
    Decimal::from_f64(amount)
        .ok_or_else(|| StoreError::DataCorruption(format!("invalid {field} in database: {amount}")))
}

/// The hex form of a row id; rows read back from the store always have one.
pub(crate) fn row_id(id: Option<ObjectId>) -> Result<String, StoreError> {
    id.map(|id| id.to_hex())
        .ok_or_else(|| StoreError::DataCorruption("document without _id".to_owned()))
}

pub(crate) fn decode<T: DeserializeOwned>(doc: Document) -> Result<T, StoreError> {
    Ok(bson::from_document(doc)?)
}

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Document, StoreError> {
    Ok(bson::to_document(value)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_datetime_round_trip_keeps_millis() {
        let at = now();
        assert_eq!(from_bson_datetime(to_bson_datetime(at)).unwrap(), at);
    }

    #[test]
    fn test_money_conversion() {
        let price = decimal_to_f64(Decimal::new(3550, 2), "price").unwrap();
        assert!((price - 35.5).abs() < f64::EPSILON);
        assert_eq!(f64_to_decimal(89.0, "price").unwrap(), Decimal::new(89, 0));
        assert!(f64_to_decimal(f64::NAN, "price").is_err());
    }

    #[test]
    fn test_row_id_requires_id() {
        assert!(row_id(None).is_err());
        let id = ObjectId::new();
        assert_eq!(row_id(Some(id)).unwrap(), id.to_hex());
    }
}
