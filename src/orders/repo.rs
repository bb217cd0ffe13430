use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{Order, OrderDetail};
use crate::error::AppResult;

const ORDER_COLUMNS: &str = "id, user_id, order_date, status, delivery_mode, delivery_address, \
                             delivery_city, delivery_zipcode, total_price";

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn list(&self) -> AppResult<Vec<Order>>;
    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Order>>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Order>>;
    async fn details(&self, order_id: Uuid) -> AppResult<Vec<OrderDetail>>;
}

#[derive(Clone)]
pub struct PgOrderStore {
    db: PgPool,
}

impl PgOrderStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn list(&self) -> AppResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY order_date DESC NULLS LAST"
        ))
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, Order>(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE user_id = $1
            ORDER BY order_date DESC NULLS LAST
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Order>> {
        let row = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn details(&self, order_id: Uuid) -> AppResult<Vec<OrderDetail>> {
        let rows = sqlx::query_as::<_, OrderDetail>(
            r#"
            SELECT id, order_id, product_id, quantity, unit_price
            FROM order_details
            WHERE order_id = $1
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
