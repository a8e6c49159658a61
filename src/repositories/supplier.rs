// src/repositories/supplier.rs
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::CrudRepository;
use crate::error::ApiResult;
use crate::models::{CreateSupplierRequest, Supplier, UpdateSupplierRequest};

pub struct SupplierRepository;

#[async_trait]
impl CrudRepository<Supplier, CreateSupplierRequest, UpdateSupplierRequest> for SupplierRepository {
    fn table_name(&self) -> &'static str {
        "suppliers"
    }

    fn entity_name(&self) -> &'static str {
        "Supplier"
    }

    fn search_fields(&self) -> Vec<&'static str> {
        vec!["name", "contact_person", "email"]
    }

    fn default_order(&self) -> &'static str {
        "name ASC, id ASC"
    }

    async fn create(&self, pool: &SqlitePool, data: CreateSupplierRequest) -> ApiResult<Supplier> {
        let supplier = Supplier {
            id: Uuid::new_v4().to_string(),
            name: data.name.trim().to_string(),
            company_type: data.company_type,
            contact_person: data.contact_person,
            email: data.email,
            phone: data.phone,
            address: data.address,
            date_added: Utc::now(),
        };

        sqlx::query(
            r#"INSERT INTO suppliers (id, name, company_type, contact_person, email, phone, address, date_added)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
            .bind(&supplier.id)
            .bind(&supplier.name)
            .bind(supplier.company_type)
            .bind(&supplier.contact_person)
            .bind(&supplier.email)
            .bind(&supplier.phone)
            .bind(&supplier.address)
            .bind(supplier.date_added)
            .execute(pool)
            .await?;

        Ok(supplier)
    }

    async fn update(&self, pool: &SqlitePool, id: &str, data: UpdateSupplierRequest) -> ApiResult<Supplier> {
        let mut supplier = self.find(pool, id).await?;
        data.apply_to(&mut supplier);

        sqlx::query(
            r#"UPDATE suppliers
               SET name = ?, company_type = ?, contact_person = ?, email = ?, phone = ?, address = ?
               WHERE id = ?"#,
        )
            .bind(&supplier.name)
            .bind(supplier.company_type)
            .bind(&supplier.contact_person)
            .bind(&supplier.email)
            .bind(&supplier.phone)
            .bind(&supplier.address)
            .bind(&supplier.id)
            .execute(pool)
            .await?;

        Ok(supplier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::error::ApiError;
    use crate::handlers::PaginationQuery;
    use crate::models::CompanyType;

    fn new_supplier(name: &str) -> CreateSupplierRequest {
        CreateSupplierRequest {
            name: name.to_string(),
            company_type: CompanyType::Distributor,
            contact_person: Some("Desk".into()),
            email: None,
            phone: None,
            address: None,
        }
    }

    #[actix_rt::test]
    async fn test_create_get_update_delete() {
        let pool = test_pool().await;
        let repo = SupplierRepository;

        let created = repo.create(&pool, new_supplier("Shell Depot")).await.unwrap();
        let fetched = repo.find(&pool, &created.id).await.unwrap();
        assert_eq!(fetched.name, "Shell Depot");
        assert_eq!(fetched.company_type, CompanyType::Distributor);

        let updated = repo
            .update(&pool, &created.id, UpdateSupplierRequest {
                company_type: Some(CompanyType::GasSupplier),
                contact_person: Some(String::new()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.company_type, CompanyType::GasSupplier);
        assert_eq!(updated.contact_person, None);

        repo.delete(&pool, &created.id).await.unwrap();
        assert!(matches!(repo.find(&pool, &created.id).await, Err(ApiError::NotFound(_))));
        assert!(matches!(repo.delete(&pool, &created.id).await, Err(ApiError::NotFound(_))));
    }

    #[actix_rt::test]
    async fn test_search_and_pagination() {
        let pool = test_pool().await;
        let repo = SupplierRepository;
        for name in ["Alpha Gas", "Beta Oil", "Gamma Gas", "100% Fuel"] {
            repo.create(&pool, new_supplier(name)).await.unwrap();
        }

        let query = PaginationQuery { page: Some(1), per_page: Some(1), search: Some("gas".into()) };
        let page = repo.get_paginated(&pool, &query).await.unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.data[0].name, "Alpha Gas");

        let query = PaginationQuery { search: Some("100%".into()), ..Default::default() };
        let page = repo.get_paginated(&pool, &query).await.unwrap();
        assert_eq!(page.total, 1);
    }
}
