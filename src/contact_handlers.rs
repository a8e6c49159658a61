// src/contact_handlers.rs
//! The public contact form posts here without a token; staff read and clear
//! the messages through the authenticated API.

use actix_web::{web, HttpRequest, HttpResponse};
use std::sync::Arc;

use crate::AppState;
use crate::audit::{audit, log_activity, AuditAction};
use crate::auth::get_current_user;
use crate::error::ApiResult;
use crate::handlers::{ApiResponse, PaginationQuery};
use crate::models::CreateContactRequest;
use crate::repositories::{ContactRepository, CrudRepository};
use crate::validator::validate_form;

pub async fn submit_contact(
    app_state: web::Data<Arc<AppState>>,
    request: web::Json<CreateContactRequest>,
    http_request: HttpRequest,
) -> ApiResult<HttpResponse> {
    validate_form(&request.0)?;

    let contact = ContactRepository.create(&app_state.db_pool, request.into_inner()).await?;

    if let Err(e) = log_activity(
        &app_state.db_pool, None, AuditAction::Create, "contact", Some(&contact.id),
        Some(&format!("Contact message: {}", contact.subject)), None, Some(&http_request),
    ).await {
        log::error!("Failed to write audit log for contact {}: {}", contact.id, e);
    }
    log::info!("Contact message received from {}", contact.email);

    Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
        contact,
        "Thank you, your message has been received".to_string(),
    )))
}

pub async fn get_contacts(
    app_state: web::Data<Arc<AppState>>,
    query: web::Query<PaginationQuery>,
) -> ApiResult<HttpResponse> {
    let page = ContactRepository.get_paginated(&app_state.db_pool, &query).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(page)))
}

pub async fn get_contact(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let contact = ContactRepository.find(&app_state.db_pool, &path).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(contact)))
}

pub async fn delete_contact(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    http_request: HttpRequest,
) -> ApiResult<HttpResponse> {
    let claims = get_current_user(&http_request)?;
    let contact_id = path.into_inner();

    ContactRepository.delete(&app_state.db_pool, &contact_id).await?;

    audit(
        &app_state.db_pool, &claims.sub, AuditAction::Delete, "contact", &contact_id,
        "Deleted contact message", &http_request,
    ).await;

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_with_message(
        (),
        "Contact message deleted successfully".to_string(),
    )))
}
