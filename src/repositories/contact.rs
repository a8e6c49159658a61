// src/repositories/contact.rs
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::CrudRepository;
use crate::error::{ApiError, ApiResult};
use crate::models::{Contact, CreateContactRequest};

/// Contact-form messages: written by the public form, read and removed by staff.
pub struct ContactRepository;

#[async_trait]
impl CrudRepository<Contact, CreateContactRequest, ()> for ContactRepository {
    fn table_name(&self) -> &'static str {
        "contacts"
    }

    fn entity_name(&self) -> &'static str {
        "Contact message"
    }

    fn search_fields(&self) -> Vec<&'static str> {
        vec!["name", "email", "subject"]
    }

    fn default_order(&self) -> &'static str {
        "date DESC, id ASC"
    }

    async fn create(&self, pool: &SqlitePool, data: CreateContactRequest) -> ApiResult<Contact> {
        let contact = Contact {
            id: Uuid::new_v4().to_string(),
            name: data.name.trim().to_string(),
            email: data.email.trim().to_string(),
            phone: data.phone.trim().to_string(),
            subject: data.subject.trim().to_string(),
            message: data.message,
            date: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO contacts (id, name, email, phone, subject, message, date) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
            .bind(&contact.id)
            .bind(&contact.name)
            .bind(&contact.email)
            .bind(&contact.phone)
            .bind(&contact.subject)
            .bind(&contact.message)
            .bind(contact.date)
            .execute(pool)
            .await?;

        Ok(contact)
    }

    async fn update(&self, _pool: &SqlitePool, _id: &str, _data: ()) -> ApiResult<Contact> {
        Err(ApiError::bad_request("Contact messages cannot be edited"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::handlers::PaginationQuery;

    #[actix_rt::test]
    async fn test_contact_create_and_list() {
        let pool = test_pool().await;
        ContactRepository
            .create(&pool, CreateContactRequest {
                name: "Bilal".into(),
                email: "bilal@example.com".into(),
                phone: "0321 1112223".into(),
                subject: "LPG supply".into(),
                message: "Need 2 tons monthly".into(),
            })
            .await
            .unwrap();

        let page = ContactRepository.get_paginated(&pool, &PaginationQuery::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].subject, "LPG supply");
        assert!(ContactRepository.update(&pool, &page.data[0].id, ()).await.is_err());
    }
}
