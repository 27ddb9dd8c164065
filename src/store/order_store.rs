//! 订单存储适配器

use chrono::Utc;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{NewOrder, Order, OrderPatch, OrderStatus};
use crate::store::record_store::{Record, RecordStore, Subscription};

impl Record for Order {
    fn id(&self) -> &str {
        &self.id
    }
}

/// 订单存储
#[derive(Clone, Default)]
pub struct OrderStore {
    inner: RecordStore<Order>,
}

impl OrderStore {
    pub fn new() -> Self {
        Self {
            inner: RecordStore::new(),
        }
    }

    /// 创建订单
    ///
    /// id 与时间戳由存储分配；表单路径未指定状态时默认 PENDING
    pub async fn create(&self, new: NewOrder) -> Order {
        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4().to_string(),
            customer_name: new.customer_name,
            customer_email: new.customer_email,
            customer_id: new.customer_id,
            total_amount: new.total_amount,
            sku: new.sku,
            status: new.status.unwrap_or(OrderStatus::Pending),
            shipping_address: new.shipping_address,
            payment_details: new.payment_details,
            created_at: now,
            updated_at: now,
        };
        self.inner.insert(order).await
    }

    /// 部分更新（状态 / 金额 / 支付明细）
    pub async fn update(&self, id: &str, patch: OrderPatch) -> AppResult<Order> {
        self.inner
            .update(id, move |order| {
                patch.apply(order);
                order.updated_at = Utc::now();
            })
            .await
    }

    pub async fn get(&self, id: &str) -> AppResult<Order> {
        self.inner.get(id).await
    }

    pub async fn list(&self) -> Vec<Order> {
        self.inner.list().await
    }

    /// 按客户 id 过滤的列表
    pub async fn list_for_customer(&self, customer_id: &str) -> Vec<Order> {
        let customer_id = customer_id.to_string();
        self.inner
            .list_where(|o| o.customer_id == customer_id)
            .await
    }

    /// 订阅全部订单
    pub async fn observe_all(&self) -> Subscription<Order> {
        self.inner.subscribe(|_| true).await
    }

    /// 订阅某个客户的订单（等值过滤）
    pub async fn observe_customer(&self, customer_id: &str) -> Subscription<Order> {
        let customer_id = customer_id.to_string();
        self.inner
            .subscribe(move |o| o.customer_id == customer_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_order(name: &str) -> NewOrder {
        NewOrder {
            customer_name: name.to_string(),
            customer_email: format!("{}@example.com", name.to_lowercase()),
            customer_id: "CUST-1".to_string(),
            total_amount: None,
            sku: "SKU-100".to_string(),
            status: None,
            shipping_address: serde_json::json!({"city": "Austin"}),
            payment_details: None,
        }
    }

    #[tokio::test]
    async fn test_form_create_defaults_to_pending_and_head() {
        let store = OrderStore::new();
        store.create(new_order("Alice")).await;
        let created = store.create(new_order("Bob")).await;

        assert_eq!(created.status, OrderStatus::Pending);
        assert!(!created.id.is_empty());

        // 新订单出现在列表头部
        let all = store.list().await;
        assert_eq!(all[0].customer_name, "Bob");
        assert_eq!(all[1].customer_name, "Alice");
    }

    #[tokio::test]
    async fn test_status_update_merges() {
        let store = OrderStore::new();
        let created = store.create(new_order("Alice")).await;

        let patch = OrderPatch {
            status: Some(OrderStatus::Completed),
            ..Default::default()
        };
        let updated = store.update(&created.id, patch).await.unwrap();

        assert_eq!(updated.status, OrderStatus::Completed);
        assert_eq!(updated.customer_name, "Alice");
        assert!(updated.updated_at >= created.updated_at);
    }
}
