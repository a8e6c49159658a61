// src/stock_handlers.rs
use actix_web::{web, HttpRequest, HttpResponse};
use std::sync::Arc;

use crate::AppState;
use crate::audit::{audit, audit_update, AuditAction};
use crate::auth::get_current_user;
use crate::error::ApiResult;
use crate::handlers::{ApiResponse, PaginationQuery};
use crate::models::{CreateStockItemRequest, UpdateStockItemRequest};
use crate::repositories::{CrudRepository, StockRepository};
use crate::validator::validate_form;

pub async fn get_stock_items(
    app_state: web::Data<Arc<AppState>>,
    query: web::Query<PaginationQuery>,
) -> ApiResult<HttpResponse> {
    let page = StockRepository.get_paginated(&app_state.db_pool, &query).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(page)))
}

pub async fn get_stock_item(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let item = StockRepository.find(&app_state.db_pool, &path).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(item)))
}

pub async fn create_stock_item(
    app_state: web::Data<Arc<AppState>>,
    request: web::Json<CreateStockItemRequest>,
    http_request: HttpRequest,
) -> ApiResult<HttpResponse> {
    let claims = get_current_user(&http_request)?;
    validate_form(&request.0)?;

    let item = StockRepository.create(&app_state.db_pool, request.into_inner()).await?;

    audit(
        &app_state.db_pool, &claims.sub, AuditAction::Create, "stock_item", &item.id,
        &format!("Created stock item {} ({} units)", item.name, item.quantity), &http_request,
    ).await;

    if item.is_low_stock() {
        log::warn!("Stock item {} created at or below its minimum level", item.name);
    }

    Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
        item,
        "Stock item created successfully".to_string(),
    )))
}

pub async fn update_stock_item(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    request: web::Json<UpdateStockItemRequest>,
    http_request: HttpRequest,
) -> ApiResult<HttpResponse> {
    let claims = get_current_user(&http_request)?;
    validate_form(&request.0)?;
    let item_id = path.into_inner();

    let before = StockRepository.find(&app_state.db_pool, &item_id).await?;
    let item = StockRepository.update(&app_state.db_pool, &item_id, request.into_inner()).await?;

    audit_update(&app_state.db_pool, &claims.sub, "stock_item", &item_id, &before, &item, &http_request).await;

    if item.is_low_stock() && !before.is_low_stock() {
        log::warn!("Stock item {} dropped to {} (minimum {})", item.name, item.quantity, item.min_level);
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        item,
        "Stock item updated successfully".to_string(),
    )))
}

pub async fn delete_stock_item(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    http_request: HttpRequest,
) -> ApiResult<HttpResponse> {
    let claims = get_current_user(&http_request)?;
    let item_id = path.into_inner();

    let item = StockRepository.find(&app_state.db_pool, &item_id).await?;
    StockRepository.delete(&app_state.db_pool, &item_id).await?;

    audit(
        &app_state.db_pool, &claims.sub, AuditAction::Delete, "stock_item", &item_id,
        &format!("Deleted stock item {}", item.name), &http_request,
    ).await;

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_with_message(
        (),
        "Stock item deleted successfully".to_string(),
    )))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use serde_json::{json, Value};

    use crate::auth::UserRole;
    use crate::handlers::test_support::{self, test_app};

    #[actix_rt::test]
    async fn test_stock_defaults_and_supplier_name() {
        let (state, auth) = test_support::state().await;
        let token = test_support::bearer(&state, &auth, UserRole::Staff).await;
        let app = test_app!(state, auth);

        let req = test::TestRequest::post()
            .uri("/api/v1/suppliers")
            .insert_header(("Authorization", token.as_str()))
            .set_json(json!({ "name": "Gulf Distributors", "company_type": "Distributor" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let supplier_id = body["data"]["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::post()
            .uri("/api/v1/stock")
            .insert_header(("Authorization", token.as_str()))
            .set_json(json!({ "name": "Diesel bay 1", "fuel_type": "Diesel", "supplier_id": supplier_id }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["quantity"], 0);
        assert_eq!(body["data"]["min_level"], 100);
        assert_eq!(body["data"]["supplier_name"], "Gulf Distributors");
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/stock/{}", id))
            .insert_header(("Authorization", token.as_str()))
            .set_json(json!({ "quantity": 450 }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["quantity"], 450);
        assert_eq!(body["data"]["fuel_type"], "Diesel");
    }

    #[actix_rt::test]
    async fn test_unknown_supplier_is_field_error() {
        let (state, auth) = test_support::state().await;
        let token = test_support::bearer(&state, &auth, UserRole::Staff).await;
        let app = test_app!(state, auth);

        let req = test::TestRequest::post()
            .uri("/api/v1/stock")
            .insert_header(("Authorization", token.as_str()))
            .set_json(json!({ "name": "LPG cage", "supplier_id": "nope", "quantity": -5 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["errors"]["quantity"].is_array());

        let req = test::TestRequest::post()
            .uri("/api/v1/stock")
            .insert_header(("Authorization", token.as_str()))
            .set_json(json!({ "name": "LPG cage", "supplier_id": "nope" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["errors"]["supplier_id"].is_array());
    }
}
