use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::repo::OrderStore;
use super::repo_types::{Order, OrderDetail};
use crate::error::AppResult;

#[derive(Default)]
pub struct MemoryOrderStore {
    orders: RwLock<Vec<Order>>,
    details: RwLock<Vec<OrderDetail>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, order: Order, lines: Vec<OrderDetail>) {
        self.orders.write().await.push(order);
        self.details.write().await.extend(lines);
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn list(&self) -> AppResult<Vec<Order>> {
        Ok(self.orders.read().await.clone())
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Order>> {
        Ok(self
            .orders
            .read()
            .await
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Order>> {
        Ok(self.orders.read().await.iter().find(|o| o.id == id).cloned())
    }

    async fn details(&self, order_id: Uuid) -> AppResult<Vec<OrderDetail>> {
        Ok(self
            .details
            .read()
            .await
            .iter()
            .filter(|d| d.order_id == order_id)
            .cloned()
            .collect())
    }
}
