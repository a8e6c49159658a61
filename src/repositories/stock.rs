// src/repositories/stock.rs
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{ensure_supplier_exists, CrudRepository};
use crate::error::ApiResult;
use crate::models::{CreateStockItemRequest, StockItem, UpdateStockItemRequest};

pub struct StockRepository;

#[async_trait]
impl CrudRepository<StockItem, CreateStockItemRequest, UpdateStockItemRequest> for StockRepository {
    fn table_name(&self) -> &'static str {
        "stock_items"
    }

    fn entity_name(&self) -> &'static str {
        "Stock item"
    }

    fn select_base(&self) -> String {
        "SELECT st.*, s.name AS supplier_name FROM stock_items st \
         LEFT JOIN suppliers s ON s.id = st.supplier_id"
            .to_string()
    }

    fn id_column(&self) -> &'static str {
        "st.id"
    }

    fn search_fields(&self) -> Vec<&'static str> {
        vec!["st.name", "s.name"]
    }

    fn default_order(&self) -> &'static str {
        "st.name ASC, st.id ASC"
    }

    async fn create(&self, pool: &SqlitePool, data: CreateStockItemRequest) -> ApiResult<StockItem> {
        ensure_supplier_exists(pool, data.supplier_id.as_deref()).await?;

        let id = Uuid::new_v4().to_string();
        sqlx::query(
            r#"INSERT INTO stock_items (id, name, fuel_type, supplier_id, quantity, min_level, last_updated)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
            .bind(&id)
            .bind(data.name.trim())
            .bind(data.fuel_type)
            .bind(&data.supplier_id)
            .bind(data.quantity)
            .bind(data.min_level)
            .bind(Utc::now())
            .execute(pool)
            .await?;

        self.find(pool, &id).await
    }

    async fn update(&self, pool: &SqlitePool, id: &str, data: UpdateStockItemRequest) -> ApiResult<StockItem> {
        let mut item = self.find(pool, id).await?;
        data.apply_to(&mut item);
        ensure_supplier_exists(pool, item.supplier_id.as_deref()).await?;

        // Every write refreshes last_updated
        sqlx::query(
            r#"UPDATE stock_items
               SET name = ?, fuel_type = ?, supplier_id = ?, quantity = ?, min_level = ?, last_updated = ?
               WHERE id = ?"#,
        )
            .bind(&item.name)
            .bind(item.fuel_type)
            .bind(&item.supplier_id)
            .bind(item.quantity)
            .bind(item.min_level)
            .bind(Utc::now())
            .bind(&item.id)
            .execute(pool)
            .await?;

        self.find(pool, id).await
    }
}
