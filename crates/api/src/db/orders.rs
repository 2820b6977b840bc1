//! Order repository.

use mongodb::bson::{self, Document, oid::ObjectId};
use serde::{Deserialize, Serialize};

use anar_shop_core::models::{NewOrder, Order, OrderItem, OrderStatusUpdate, ShippingAddress};
use anar_shop_core::{OrderId, OrderStatus, PaymentStatus, ProductId, UserId};

use super::{
    decimal_to_f64, decode, encode, f64_to_decimal, from_bson_datetime, now, row_id,
    to_bson_datetime,
};
use crate::store::{DocumentStore, Filter, Sort, StoreError, collections};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderItemDocument {
    product_id: String,
    name: String,
    price: f64,
    quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    size: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderDocument {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    user_id: String,
    order_number: String,
    items: Vec<OrderItemDocument>,
    shipping_address: ShippingAddress,
    total_amount: f64,
    #[serde(default)]
    status: OrderStatus,
    #[serde(default)]
    payment_status: PaymentStatus,
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
}

impl TryFrom<OrderItemDocument> for OrderItem {
    type Error = StoreError;

    fn try_from(row: OrderItemDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            product_id: ProductId::new(row.product_id),
            name: row.name,
            price: f64_to_decimal(row.price, "item price")?,
            quantity: row.quantity,
            color: row.color,
            size: row.size,
        })
    }
}

impl TryFrom<OrderDocument> for Order {
    type Error = StoreError;

    fn try_from(row: OrderDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: OrderId::new(row_id(row.id)?),
            user_id: UserId::new(row.user_id),
            order_number: row.order_number,
            items: row
                .items
                .into_iter()
                .map(OrderItem::try_from)
                .collect::<Result<_, _>>()?,
            shipping_address: row.shipping_address,
            total_amount: f64_to_decimal(row.total_amount, "total amount")?,
            status: row.status,
            payment_status: row.payment_status,
            created_at: from_bson_datetime(row.created_at)?,
            updated_at: from_bson_datetime(row.updated_at)?,
        })
    }
}

fn to_order(doc: Document) -> Result<Order, StoreError> {
    decode::<OrderDocument>(doc)?.try_into()
}

fn item_row(item: OrderItem) -> Result<OrderItemDocument, StoreError> {
    Ok(OrderItemDocument {
        product_id: item.product_id.into_inner(),
        name: item.name,
        price: decimal_to_f64(item.price, "item price")?,
        quantity: item.quantity,
        color: item.color,
        size: item.size,
    })
}

/// Repository for order operations.
pub struct OrderRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Store a validated order for `user` under `order_number`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the order number is already used.
    pub async fn create(
        &self,
        user: &UserId,
        order_number: String,
        order: NewOrder,
    ) -> Result<Order, StoreError> {
        let at = to_bson_datetime(now());
        let row = OrderDocument {
            id: None,
            user_id: user.as_str().to_owned(),
            order_number,
            items: order
                .items
                .into_iter()
                .map(item_row)
                .collect::<Result<_, _>>()?,
            shipping_address: order.shipping_address,
            total_amount: decimal_to_f64(order.total_amount, "total amount")?,
            status: OrderStatus::default(),
            payment_status: PaymentStatus::default(),
            created_at: at,
            updated_at: at,
        };
        let mut doc = encode(&row)?;
        let id = self.store.insert(collections::ORDERS, doc.clone()).await?;
        doc.insert("_id", id);
        to_order(doc)
    }

    /// Orders placed by `user`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails or a row is corrupt.
    pub async fn list_for_user(&self, user: &UserId) -> Result<Vec<Order>, StoreError> {
        self.list(Filter::all().eq("userId", user.as_str())).await
    }

    /// Every order, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails or a row is corrupt.
    pub async fn list_all(&self) -> Result<Vec<Order>, StoreError> {
        self.list(Filter::all()).await
    }

    async fn list(&self, filter: Filter) -> Result<Vec<Order>, StoreError> {
        self.store
            .find(collections::ORDERS, filter, Sort::NewestFirst)
            .await?
            .into_iter()
            .map(to_order)
            .collect()
    }

    /// Get an order by id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails or the row is corrupt.
    pub async fn get(&self, id: &str) -> Result<Option<Order>, StoreError> {
        self.store
            .find_by_id(collections::ORDERS, id)
            .await?
            .map(to_order)
            .transpose()
    }

    /// Change an order's status. Returns `None` if the order does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the update fails.
    pub async fn update_status(
        &self,
        id: &str,
        update: OrderStatusUpdate,
    ) -> Result<Option<Order>, StoreError> {
        let mut set = Document::new();
        set.insert("status", update.status.as_str());
        if let Some(payment_status) = update.payment_status {
            set.insert("paymentStatus", payment_status.as_str());
        }
        set.insert("updatedAt", to_bson_datetime(now()));

        self.store
            .update_by_id(collections::ORDERS, id, set)
            .await?
            .map(to_order)
            .transpose()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::store::MemoryStore;

    fn new_order() -> NewOrder {
        NewOrder {
            items: vec![OrderItem {
                product_id: ProductId::new("65f1c0ffee0000000000abcd"),
                name: "Women's Handbag".into(),
                price: Decimal::new(120, 0),
                quantity: 1,
                color: Some("Brown".into()),
                size: None,
            }],
            shipping_address: ShippingAddress {
                name: "Saraa".into(),
                phone: "88001122".into(),
                street: "Seoul street 5".into(),
                city: "Ulaanbaatar".into(),
                zip_code: "14250".into(),
            },
            total_amount: Decimal::new(120, 0),
        }
    }

    #[tokio::test]
    async fn test_create_defaults_statuses() {
        let store = MemoryStore::new();
        let repo = OrderRepository::new(&store);
        let user = UserId::new("u1");

        let order = repo
            .create(&user, "ORD-00000001-ABCD".into(), new_order())
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert_eq!(order.items[0].color.as_deref(), Some("Brown"));
        assert!(order.is_owned_by(&user));

        let fetched = repo.get(order.id.as_str()).await.unwrap().unwrap();
        assert_eq!(fetched, order);
    }

    #[tokio::test]
    async fn test_list_for_user() {
        let store = MemoryStore::new();
        let repo = OrderRepository::new(&store);
        let alice = UserId::new("alice");
        let bob = UserId::new("bob");
        repo.create(&alice, "ORD-1".into(), new_order()).await.unwrap();
        repo.create(&bob, "ORD-2".into(), new_order()).await.unwrap();
        repo.create(&alice, "ORD-3".into(), new_order()).await.unwrap();

        let mine = repo.list_for_user(&alice).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].order_number, "ORD-3");
        assert_eq!(repo.list_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_update_status() {
        let store = MemoryStore::new();
        let repo = OrderRepository::new(&store);
        let order = repo
            .create(&UserId::new("u1"), "ORD-1".into(), new_order())
            .await
            .unwrap();

        let update = OrderStatusUpdate {
            status: OrderStatus::Shipped,
            payment_status: Some(PaymentStatus::Paid),
        };
        let updated = repo
            .update_status(order.id.as_str(), update)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Shipped);
        assert_eq!(updated.payment_status, PaymentStatus::Paid);

        assert!(repo.update_status("missing", update).await.unwrap().is_none());
    }
}
