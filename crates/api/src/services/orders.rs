//! Order placement.

use rand::seq::IndexedRandom;

use anar_shop_core::UserId;
use anar_shop_core::models::order::{ORDER_NUMBER_SUFFIX_LEN, format_order_number};
use anar_shop_core::models::{NewOrder, Order};

use crate::db::{OrderRepository, now};
use crate::store::{DocumentStore, StoreError};

const SUFFIX_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Attempts before a repeated order-number collision is reported.
const MAX_ATTEMPTS: usize = 3;

/// Random base-36 suffix for an order number.
fn random_suffix() -> String {
    let mut rng = rand::rng();
    (0..ORDER_NUMBER_SUFFIX_LEN)
        .filter_map(|_| SUFFIX_ALPHABET.choose(&mut rng).copied().map(char::from))
        .collect()
}

/// Generate an order number for the current instant.
#[must_use]
pub fn next_order_number() -> String {
    format_order_number(now().timestamp_millis(), &random_suffix())
}

/// Store an order for `user` under a freshly generated order number.
///
/// Numbers are unique in the store; a collision is retried with a new suffix.
///
/// # Errors
///
/// Returns `StoreError` if the insert fails, or `StoreError::Conflict` if every
/// attempt collided.
pub async fn place_order(
    store: &dyn DocumentStore,
    user: &UserId,
    order: NewOrder,
) -> Result<Order, StoreError> {
    let repo = OrderRepository::new(store);
    let mut attempt = 1;
    loop {
        match repo.create(user, next_order_number(), order.clone()).await {
            Err(StoreError::Conflict(reason)) if attempt < MAX_ATTEMPTS => {
                tracing::warn!(attempt, %reason, "Order number collision, retrying");
                attempt += 1;
            }
            result => return result,
        }
    }
}
