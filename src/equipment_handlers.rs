//! Equipment handlers.
//!
//! Covers:
//! - CRUD for equipment
//! - Inspections recorded against a piece of equipment

use actix_web::{web, HttpRequest, HttpResponse};
use std::sync::Arc;

use crate::AppState;
use crate::audit::{audit, audit_update, AuditAction};
use crate::auth::get_current_user;
use crate::error::ApiResult;
use crate::handlers::{ApiResponse, PaginationQuery};
use crate::models::{CreateEquipmentRequest, CreateInspectionRequest, UpdateEquipmentRequest};
use crate::repositories::{CrudRepository, EquipmentRepository, InspectionRepository};
use crate::validator::validate_form;

// ==================== EQUIPMENT CRUD ====================

pub async fn get_equipment(
    app_state: web::Data<Arc<AppState>>,
    query: web::Query<PaginationQuery>,
) -> ApiResult<HttpResponse> {
    let page = EquipmentRepository.get_paginated(&app_state.db_pool, &query).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(page)))
}

pub async fn get_equipment_by_id(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let equipment = EquipmentRepository.find(&app_state.db_pool, &path).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(equipment)))
}

pub async fn create_equipment(
    app_state: web::Data<Arc<AppState>>,
    request: web::Json<CreateEquipmentRequest>,
    http_request: HttpRequest,
) -> ApiResult<HttpResponse> {
    let claims = get_current_user(&http_request)?;
    validate_form(&request.0)?;

    let equipment = EquipmentRepository.create(&app_state.db_pool, request.into_inner()).await?;

    audit(
        &app_state.db_pool, &claims.sub, AuditAction::Create, "equipment", &equipment.id,
        &format!("Created {} {}", equipment.equipment_type, equipment.name), &http_request,
    ).await;

    Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
        equipment,
        "Equipment created successfully".to_string(),
    )))
}

pub async fn update_equipment(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    request: web::Json<UpdateEquipmentRequest>,
    http_request: HttpRequest,
) -> ApiResult<HttpResponse> {
    let claims = get_current_user(&http_request)?;
    validate_form(&request.0)?;
    let equipment_id = path.into_inner();

    let before = EquipmentRepository.find(&app_state.db_pool, &equipment_id).await?;
    let equipment = EquipmentRepository.update(&app_state.db_pool, &equipment_id, request.into_inner()).await?;

    audit_update(&app_state.db_pool, &claims.sub, "equipment", &equipment_id, &before, &equipment, &http_request).await;

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        equipment,
        "Equipment updated successfully".to_string(),
    )))
}

/// Deleting equipment removes its inspections with it.
pub async fn delete_equipment(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    http_request: HttpRequest,
) -> ApiResult<HttpResponse> {
    let claims = get_current_user(&http_request)?;
    let equipment_id = path.into_inner();

    let equipment = EquipmentRepository.find(&app_state.db_pool, &equipment_id).await?;
    EquipmentRepository.delete(&app_state.db_pool, &equipment_id).await?;

    audit(
        &app_state.db_pool, &claims.sub, AuditAction::Delete, "equipment", &equipment_id,
        &format!("Deleted equipment {}", equipment.name), &http_request,
    ).await;

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_with_message(
        (),
        "Equipment deleted successfully".to_string(),
    )))
}

// ==================== INSPECTIONS ====================

pub async fn get_inspections(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let inspections = InspectionRepository.list_for_equipment(&app_state.db_pool, &path).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(inspections)))
}

pub async fn create_inspection(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    request: web::Json<CreateInspectionRequest>,
    http_request: HttpRequest,
) -> ApiResult<HttpResponse> {
    let claims = get_current_user(&http_request)?;
    validate_form(&request.0)?;
    let equipment_id = path.into_inner();

    let inspection = InspectionRepository
        .create(&app_state.db_pool, &equipment_id, request.into_inner())
        .await?;

    let outcome = if inspection.passed { "passed" } else { "failed" };
    audit(
        &app_state.db_pool, &claims.sub, AuditAction::Create, "inspection", &inspection.id,
        &format!("Inspection of {} by {} {}", equipment_id, inspection.inspector, outcome), &http_request,
    ).await;

    Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
        inspection,
        "Inspection recorded".to_string(),
    )))
}

pub async fn delete_inspection(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<(String, String)>,
    http_request: HttpRequest,
) -> ApiResult<HttpResponse> {
    let claims = get_current_user(&http_request)?;
    let (equipment_id, inspection_id) = path.into_inner();

    InspectionRepository.delete(&app_state.db_pool, &equipment_id, &inspection_id).await?;

    audit(
        &app_state.db_pool, &claims.sub, AuditAction::Delete, "inspection", &inspection_id,
        &format!("Deleted inspection of {}", equipment_id), &http_request,
    ).await;

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_with_message(
        (),
        "Inspection deleted successfully".to_string(),
    )))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use serde_json::{json, Value};

    use crate::auth::UserRole;
    use crate::handlers::test_support::{self, test_app};

    #[actix_rt::test]
    async fn test_equipment_with_inspections() {
        let (state, auth) = test_support::state().await;
        let token = test_support::bearer(&state, &auth, UserRole::Staff).await;
        let app = test_app!(state, auth);

        let req = test::TestRequest::post()
            .uri("/api/v1/equipment")
            .insert_header(("Authorization", token.as_str()))
            .set_json(json!({ "name": "Tank 7", "equipment_type": "Storage Tank", "storage_capacity": 5000.0 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        let id = body["data"]["id"].as_str().unwrap().to_string();
        assert_eq!(body["data"]["condition"], "Good");

        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/equipment/{}/inspections", id))
            .insert_header(("Authorization", token.as_str()))
            .set_json(json!({ "inspector": "R. Ahmed", "passed": false, "remarks": "Valve seep" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let inspection_id = body["data"]["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/equipment/{}/inspections", id))
            .insert_header(("Authorization", token.as_str()))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"][0]["passed"], false);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/v1/equipment/{}/inspections/{}", id, inspection_id))
            .insert_header(("Authorization", token.as_str()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/v1/equipment/{}/inspections/{}", id, inspection_id))
            .insert_header(("Authorization", token.as_str()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_rt::test]
    async fn test_inspection_for_missing_equipment() {
        let (state, auth) = test_support::state().await;
        let token = test_support::bearer(&state, &auth, UserRole::Staff).await;
        let app = test_app!(state, auth);

        let req = test::TestRequest::post()
            .uri("/api/v1/equipment/missing/inspections")
            .insert_header(("Authorization", token.as_str()))
            .set_json(json!({ "inspector": "R. Ahmed" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_rt::test]
    async fn test_negative_capacity_rejected() {
        let (state, auth) = test_support::state().await;
        let token = test_support::bearer(&state, &auth, UserRole::Staff).await;
        let app = test_app!(state, auth);

        let req = test::TestRequest::post()
            .uri("/api/v1/equipment")
            .insert_header(("Authorization", token.as_str()))
            .set_json(json!({ "name": "Pump", "equipment_type": "Pump", "storage_capacity": -1.0 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["errors"]["storage_capacity"].is_array());
    }
}
