use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(with = "time::serde::rfc3339::option")]
    pub order_date: Option<OffsetDateTime>,
    pub status: Option<String>,
    pub delivery_mode: Option<String>,
    pub delivery_address: Option<String>,
    pub delivery_city: Option<String>,
    pub delivery_zipcode: Option<i32>,
    pub total_price: Option<i32>, // cents
}

/// One line of an order.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderDetail {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: Option<i32>,
    pub unit_price: Option<i32>, // cents
}
