//! Order entities.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{OrderId, OrderStatus, PaymentStatus, ProductId, UserId};
use crate::validation::{ValidationError, non_blank, non_negative};

/// A line item captured at checkout.
///
/// Name and price are copied from the product at order time; the product id
/// is not checked against the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

/// Where an order ships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub name: String,
    pub phone: String,
    pub street: String,
    pub city: String,
    pub zip_code: String,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: OrderId,
    pub user_id: UserId,
    pub order_number: String,
    pub items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Whether `user` placed this order.
    #[must_use]
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.user_id == user
    }
}

/// Number of random characters at the end of an order number.
pub const ORDER_NUMBER_SUFFIX_LEN: usize = 4;

/// Format a human-readable order number.
///
/// The middle segment is the last eight digits of the Unix timestamp in
/// milliseconds; the suffix is uppercased.
///
/// ```
/// use anar_shop_core::models::order::format_order_number;
///
/// assert_eq!(format_order_number(1_718_000_123_456, "k3z9"), "ORD-00123456-K3Z9");
/// ```
#[must_use]
pub fn format_order_number(epoch_millis: i64, suffix: &str) -> String {
    format!(
        "ORD-{:08}-{}",
        epoch_millis.rem_euclid(100_000_000),
        suffix.to_uppercase()
    )
}

/// Raw line item as submitted by the client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub product_id: Option<String>,
    pub name: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    pub quantity: Option<u32>,
    pub color: Option<String>,
    pub size: Option<String>,
}

/// Raw shipping address as submitted by the client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddressRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub zip_code: Option<String>,
}

/// Body of `POST /api/orders`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub items: Option<Vec<OrderItemRequest>>,
    pub shipping_address: Option<ShippingAddressRequest>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub total_amount: Option<Decimal>,
}

/// A validated order, not yet numbered or owned.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub total_amount: Decimal,
}

impl OrderItemRequest {
    fn validate(self) -> Result<OrderItem, ValidationError> {
        let (Some(product_id), Some(name), Some(price), Some(quantity)) = (
            non_blank(self.product_id),
            non_blank(self.name),
            self.price,
            self.quantity,
        ) else {
            return Err(ValidationError::new(
                "Each item needs a productId, name, price and quantity",
            ));
        };
        if quantity == 0 {
            return Err(ValidationError::new("Item quantity must be at least 1"));
        }

        Ok(OrderItem {
            product_id: ProductId::new(product_id),
            name,
            price: non_negative(price, "Item price")?,
            quantity,
            color: non_blank(self.color),
            size: non_blank(self.size),
        })
    }
}

impl ShippingAddressRequest {
    fn validate(self) -> Result<ShippingAddress, ValidationError> {
        let (Some(name), Some(phone), Some(street), Some(city), Some(zip_code)) = (
            non_blank(self.name),
            non_blank(self.phone),
            non_blank(self.street),
            non_blank(self.city),
            non_blank(self.zip_code),
        ) else {
            return Err(ValidationError::new(
                "Please provide a complete shipping address",
            ));
        };
        Ok(ShippingAddress {
            name,
            phone,
            street,
            city,
            zip_code,
        })
    }
}

impl CreateOrderRequest {
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when there are no items, an item is
    /// incomplete, or the shipping address or total is missing.
    pub fn validate(self) -> Result<NewOrder, ValidationError> {
        let items = match self.items {
            Some(items) if !items.is_empty() => items,
            _ => return Err(ValidationError::new("Order must have at least one item")),
        };
        let items = items
            .into_iter()
            .map(OrderItemRequest::validate)
            .collect::<Result<Vec<_>, _>>()?;

        let shipping_address = self
            .shipping_address
            .ok_or_else(|| ValidationError::new("Please provide a complete shipping address"))?
            .validate()?;

        let total_amount = self
            .total_amount
            .ok_or_else(|| ValidationError::new("Total amount is required"))?;

        Ok(NewOrder {
            items,
            shipping_address,
            total_amount: non_negative(total_amount, "Total amount")?,
        })
    }
}

/// Body of `PUT /api/orders/{id}/status`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusRequest {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
}

/// A validated status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
    pub payment_status: Option<PaymentStatus>,
}

impl UpdateOrderStatusRequest {
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when no status is given.
    pub fn validate(self) -> Result<OrderStatusUpdate, ValidationError> {
        let status = self
            .status
            .ok_or_else(|| ValidationError::new("Please provide a status"))?;
        Ok(OrderStatusUpdate {
            status,
            payment_status: self.payment_status,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn checkout() -> serde_json::Value {
        serde_json::json!({
            "items": [{
                "productId": "65f1c0ffee0000000000abcd",
                "name": "Women's Summer Dress",
                "price": 95,
                "quantity": 2,
                "color": "Red",
                "size": "M"
            }],
            "shippingAddress": {
                "name": "Bat",
                "phone": "99112233",
                "street": "Peace Avenue 1",
                "city": "Ulaanbaatar",
                "zipCode": "14200"
            },
            "totalAmount": 190
        })
    }

    #[test]
    fn test_valid_order() {
        let req: CreateOrderRequest = serde_json::from_value(checkout()).unwrap();
        let order = req.validate().unwrap();
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].quantity, 2);
        assert_eq!(order.items[0].size.as_deref(), Some("M"));
        assert_eq!(order.shipping_address.zip_code, "14200");
        assert_eq!(order.total_amount, Decimal::new(190, 0));
    }

    #[test]
    fn test_empty_items_rejected() {
        let mut body = checkout();
        body["items"] = serde_json::json!([]);
        let req: CreateOrderRequest = serde_json::from_value(body).unwrap();
        assert_eq!(
            req.validate().unwrap_err().message(),
            "Order must have at least one item"
        );

        let req = CreateOrderRequest::default();
        assert_eq!(
            req.validate().unwrap_err().message(),
            "Order must have at least one item"
        );
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let mut body = checkout();
        body["items"][0]["quantity"] = serde_json::json!(0);
        let req: CreateOrderRequest = serde_json::from_value(body).unwrap();
        assert_eq!(
            req.validate().unwrap_err().message(),
            "Item quantity must be at least 1"
        );
    }

    #[test]
    fn test_incomplete_address_rejected() {
        let mut body = checkout();
        body["shippingAddress"]["city"] = serde_json::json!("");
        let req: CreateOrderRequest = serde_json::from_value(body).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_missing_total_rejected() {
        let mut body = checkout();
        body.as_object_mut().unwrap().remove("totalAmount");
        let req: CreateOrderRequest = serde_json::from_value(body).unwrap();
        assert_eq!(req.validate().unwrap_err().message(), "Total amount is required");
    }

    #[test]
    fn test_order_number_format() {
        assert_eq!(format_order_number(42, "abcd"), "ORD-00000042-ABCD");
        let number = format_order_number(1_718_000_123_456, "0z1y");
        assert_eq!(number, "ORD-00123456-0Z1Y");
        assert_eq!(number.len(), 4 + 8 + 1 + ORDER_NUMBER_SUFFIX_LEN);
    }

    #[test]
    fn test_status_update_requires_status() {
        let req = UpdateOrderStatusRequest {
            status: None,
            payment_status: Some(PaymentStatus::Paid),
        };
        assert!(req.validate().is_err());

        let req: UpdateOrderStatusRequest =
            serde_json::from_value(serde_json::json!({"status": "shipped"})).unwrap();
        let update = req.validate().unwrap();
        assert_eq!(update.status, OrderStatus::Shipped);
        assert_eq!(update.payment_status, None);
    }
}
