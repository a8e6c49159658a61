// src/fleet_handlers.rs
use actix_web::{web, HttpRequest, HttpResponse};
use std::sync::Arc;

use crate::AppState;
use crate::audit::{audit, audit_update, AuditAction};
use crate::auth::get_current_user;
use crate::error::ApiResult;
use crate::handlers::{ApiResponse, PaginationQuery};
use crate::models::{CreateVehicleRequest, UpdateVehicleRequest};
use crate::repositories::{CrudRepository, FleetRepository};
use crate::validator::validate_form;

pub async fn get_fleet(
    app_state: web::Data<Arc<AppState>>,
    query: web::Query<PaginationQuery>,
) -> ApiResult<HttpResponse> {
    let page = FleetRepository.get_paginated(&app_state.db_pool, &query).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(page)))
}

pub async fn get_fleet_vehicle(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let vehicle = FleetRepository.find(&app_state.db_pool, &path).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(vehicle)))
}

pub async fn create_fleet_vehicle(
    app_state: web::Data<Arc<AppState>>,
    request: web::Json<CreateVehicleRequest>,
    http_request: HttpRequest,
) -> ApiResult<HttpResponse> {
    let claims = get_current_user(&http_request)?;
    validate_form(&request.0)?;

    let vehicle = FleetRepository.create(&app_state.db_pool, request.into_inner()).await?;

    audit(
        &app_state.db_pool, &claims.sub, AuditAction::Create, "vehicle", &vehicle.id,
        &format!("Added {} ({}) to the fleet", vehicle.vehicle_name, vehicle.registration_number), &http_request,
    ).await;

    Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
        vehicle,
        "Vehicle added successfully".to_string(),
    )))
}

pub async fn update_fleet_vehicle(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    request: web::Json<UpdateVehicleRequest>,
    http_request: HttpRequest,
) -> ApiResult<HttpResponse> {
    let claims = get_current_user(&http_request)?;
    validate_form(&request.0)?;
    let vehicle_id = path.into_inner();

    let before = FleetRepository.find(&app_state.db_pool, &vehicle_id).await?;
    let vehicle = FleetRepository.update(&app_state.db_pool, &vehicle_id, request.into_inner()).await?;

    audit_update(&app_state.db_pool, &claims.sub, "vehicle", &vehicle_id, &before, &vehicle, &http_request).await;

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        vehicle,
        "Vehicle updated successfully".to_string(),
    )))
}

pub async fn delete_fleet_vehicle(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    http_request: HttpRequest,
) -> ApiResult<HttpResponse> {
    let claims = get_current_user(&http_request)?;
    let vehicle_id = path.into_inner();

    let vehicle = FleetRepository.find(&app_state.db_pool, &vehicle_id).await?;
    FleetRepository.delete(&app_state.db_pool, &vehicle_id).await?;

    audit(
        &app_state.db_pool, &claims.sub, AuditAction::Delete, "vehicle", &vehicle_id,
        &format!("Removed {} from the fleet", vehicle.registration_number), &http_request,
    ).await;

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_with_message(
        (),
        "Vehicle deleted successfully".to_string(),
    )))
}
