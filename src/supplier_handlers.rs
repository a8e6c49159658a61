// src/supplier_handlers.rs
use actix_web::{web, HttpRequest, HttpResponse};
use std::sync::Arc;

use crate::AppState;
use crate::audit::{audit, audit_update, AuditAction};
use crate::auth::get_current_user;
use crate::error::ApiResult;
use crate::handlers::{ApiResponse, PaginationQuery};
use crate::models::{CreateSupplierRequest, UpdateSupplierRequest};
use crate::repositories::{CrudRepository, SupplierRepository};
use crate::validator::validate_form;

pub async fn get_suppliers(
    app_state: web::Data<Arc<AppState>>,
    query: web::Query<PaginationQuery>,
) -> ApiResult<HttpResponse> {
    let page = SupplierRepository.get_paginated(&app_state.db_pool, &query).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(page)))
}

pub async fn get_supplier(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let supplier = SupplierRepository.find(&app_state.db_pool, &path).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(supplier)))
}

pub async fn create_supplier(
    app_state: web::Data<Arc<AppState>>,
    request: web::Json<CreateSupplierRequest>,
    http_request: HttpRequest,
) -> ApiResult<HttpResponse> {
    let claims = get_current_user(&http_request)?;
    validate_form(&request.0)?;

    let supplier = SupplierRepository.create(&app_state.db_pool, request.into_inner()).await?;

    audit(
        &app_state.db_pool, &claims.sub, AuditAction::Create, "supplier", &supplier.id,
        &format!("Created supplier {}", supplier.name), &http_request,
    ).await;
    log::info!("Supplier {} created by {}", supplier.name, claims.username);

    Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
        supplier,
        "Supplier created successfully".to_string(),
    )))
}

pub async fn update_supplier(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    request: web::Json<UpdateSupplierRequest>,
    http_request: HttpRequest,
) -> ApiResult<HttpResponse> {
    let claims = get_current_user(&http_request)?;
    validate_form(&request.0)?;
    let supplier_id = path.into_inner();

    let before = SupplierRepository.find(&app_state.db_pool, &supplier_id).await?;
    let supplier = SupplierRepository.update(&app_state.db_pool, &supplier_id, request.into_inner()).await?;

    audit_update(&app_state.db_pool, &claims.sub, "supplier", &supplier_id, &before, &supplier, &http_request).await;

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        supplier,
        "Supplier updated successfully".to_string(),
    )))
}

/// Stock items and vehicle records keep existing; their supplier link is cleared.
pub async fn delete_supplier(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    http_request: HttpRequest,
) -> ApiResult<HttpResponse> {
    let claims = get_current_user(&http_request)?;
    let supplier_id = path.into_inner();

    let supplier = SupplierRepository.find(&app_state.db_pool, &supplier_id).await?;
    SupplierRepository.delete(&app_state.db_pool, &supplier_id).await?;

    audit(
        &app_state.db_pool, &claims.sub, AuditAction::Delete, "supplier", &supplier_id,
        &format!("Deleted supplier {}", supplier.name), &http_request,
    ).await;
    log::info!("Supplier {} deleted by {}", supplier.name, claims.username);

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_with_message(
        (),
        "Supplier deleted successfully".to_string(),
    )))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use serde_json::{json, Value};

    use crate::auth::UserRole;
    use crate::handlers::test_support::{self, test_app};

    #[actix_rt::test]
    async fn test_supplier_crud_flow() {
        let (state, auth) = test_support::state().await;
        let token = test_support::bearer(&state, &auth, UserRole::Staff).await;
        let app = test_app!(state, auth);

        let req = test::TestRequest::post()
            .uri("/api/v1/suppliers")
            .insert_header(("Authorization", token.as_str()))
            .set_json(json!({ "name": "Coastal Refinery", "company_type": "Refinery", "email": "ops@coastal.example" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/suppliers/{}", id))
            .insert_header(("Authorization", token.as_str()))
            .set_json(json!({ "company_type": "Gas Supplier", "email": "" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["company_type"], "Gas Supplier");
        assert_eq!(body["data"]["email"], Value::Null);
        assert_eq!(body["data"]["name"], "Coastal Refinery");

        let req = test::TestRequest::get()
            .uri("/api/v1/suppliers?search=coastal")
            .insert_header(("Authorization", token.as_str()))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["total"], 1);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/v1/suppliers/{}", id))
            .insert_header(("Authorization", token.as_str()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/suppliers/{}", id))
            .insert_header(("Authorization", token.as_str()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_rt::test]
    async fn test_invalid_supplier_echoes_input() {
        let (state, auth) = test_support::state().await;
        let token = test_support::bearer(&state, &auth, UserRole::Staff).await;
        let app = test_app!(state, auth);

        let req = test::TestRequest::post()
            .uri("/api/v1/suppliers")
            .insert_header(("Authorization", token.as_str()))
            .set_json(json!({ "name": "   ", "email": "not-an-email" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["errors"]["name"].is_array());
        assert!(body["errors"]["email"].is_array());
        assert_eq!(body["input"]["email"], "not-an-email");

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM suppliers")
            .fetch_one(&state.db_pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
