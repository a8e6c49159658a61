// src/repositories/mod.rs
//! Database access, one repository per stored entity.

pub mod contact;
pub mod equipment;
pub mod fleet;
pub mod project;
pub mod stock;
pub mod supplier;
pub mod vehicle_record;

pub use contact::ContactRepository;
pub use equipment::{EquipmentRepository, InspectionRepository};
pub use fleet::FleetRepository;
pub use project::ProjectRepository;
pub use stock::StockRepository;
pub use supplier::SupplierRepository;
pub use vehicle_record::VehicleRecordRepository;

use async_trait::async_trait;
use sqlx::SqlitePool;
use serde::Serialize;
use crate::error::{ApiError, ApiResult};
use crate::handlers::{PaginatedResponse, PaginationQuery};

/// Base trait for CRUD operations
#[async_trait]
pub trait CrudRepository<T, CreateDto, UpdateDto>: Send + Sync
where
    T: Serialize + Send + Unpin + for<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow>,
    CreateDto: Send + 'static,
    UpdateDto: Send + 'static,
{
    /// Table in the database
    fn table_name(&self) -> &'static str;

    /// Name used in not-found messages
    fn entity_name(&self) -> &'static str;

    /// SELECT used for reads; may join related tables
    fn select_base(&self) -> String {
        format!("SELECT * FROM {}", self.table_name())
    }

    /// Id column as it appears in `select_base`
    fn id_column(&self) -> &'static str {
        "id"
    }

    /// Columns matched by `?search=`
    fn search_fields(&self) -> Vec<&'static str> {
        vec![]
    }

    /// ORDER BY clause for listings; should end with a unique column
    fn default_order(&self) -> &'static str;

    async fn create(&self, pool: &SqlitePool, data: CreateDto) -> ApiResult<T>;

    async fn update(&self, pool: &SqlitePool, id: &str, data: UpdateDto) -> ApiResult<T>;

    async fn get_by_id(&self, pool: &SqlitePool, id: &str) -> ApiResult<Option<T>> {
        let query = format!("{} WHERE {} = ?", self.select_base(), self.id_column());

        let result = sqlx::query_as::<_, T>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(result)
    }

    /// Like `get_by_id`, but a missing row is an error
    async fn find(&self, pool: &SqlitePool, id: &str) -> ApiResult<T> {
        self.get_by_id(pool, id)
            .await?
            .ok_or_else(|| ApiError::not_found(self.entity_name()))
    }

    async fn delete(&self, pool: &SqlitePool, id: &str) -> ApiResult<()> {
        let query = format!("DELETE FROM {} WHERE id = ?", self.table_name());

        let result = sqlx::query(&query)
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::not_found(self.entity_name()));
        }

        Ok(())
    }

    async fn get_paginated(
        &self,
        pool: &SqlitePool,
        query: &PaginationQuery,
    ) -> ApiResult<PaginatedResponse<T>> {
        let (page, per_page, offset) = query.normalize();
        let search_fields = self.search_fields();

        let mut where_sql = String::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(term) = query.search_term() {
            if !search_fields.is_empty() {
                let like_conditions: Vec<String> = search_fields
                    .iter()
                    .map(|f| format!("{} LIKE ? ESCAPE '\\'", f))
                    .collect();
                let pattern = format!("%{}%", escape_like(term));
                params.extend(search_fields.iter().map(|_| pattern.clone()));
                where_sql = format!(" WHERE ({})", like_conditions.join(" OR "));
            }
        }

        let count_sql = format!("SELECT COUNT(*) FROM ({}{}) AS filtered", self.select_base(), where_sql);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for param in &params {
            count_query = count_query.bind(param);
        }
        let total: i64 = count_query.fetch_one(pool).await?;

        let select_sql = format!(
            "{}{} ORDER BY {} LIMIT ? OFFSET ?",
            self.select_base(),
            where_sql,
            self.default_order()
        );
        let mut select_query = sqlx::query_as::<_, T>(&select_sql);
        for param in &params {
            select_query = select_query.bind(param);
        }
        let data: Vec<T> = select_query
            .bind(per_page)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        let total_pages = (total as f64 / per_page as f64).ceil() as i64;

        Ok(PaginatedResponse {
            data,
            total,
            page,
            per_page,
            total_pages,
        })
    }
}

/// Escape LIKE wildcards so the search term matches literally.
pub fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// A non-null supplier reference must point at an existing supplier.
pub async fn ensure_supplier_exists(pool: &SqlitePool, supplier_id: Option<&str>) -> ApiResult<()> {
    if let Some(id) = supplier_id {
        let exists: Option<(String,)> = sqlx::query_as("SELECT id FROM suppliers WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        if exists.is_none() {
            return Err(ApiError::field("supplier_id", "Select a valid supplier"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("plain"), "plain");
    }
}
