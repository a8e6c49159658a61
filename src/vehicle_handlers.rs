//! Gate records for vehicles entering and leaving the depot, plus their
//! PDF receipt and the all-records report.

use actix_web::{web, HttpRequest, HttpResponse};
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use chrono::FixedOffset;
use serde::Deserialize;
use std::sync::Arc;

use crate::AppState;
use crate::audit::{audit, audit_update, AuditAction};
use crate::auth::{get_current_user, require_permission, UserRole};
use crate::error::{ApiError, ApiResult};
use crate::handlers::{ApiResponse, PaginationQuery};
use crate::models::{CreateVehicleRecordRequest, UpdateVehicleRecordRequest};
use crate::monitoring::Metrics;
use crate::pdf;
use crate::repositories::{CrudRepository, VehicleRecordRepository};
use crate::validator::validate_form;

#[derive(Debug, Deserialize, Default)]
pub struct DownloadQuery {
    pub download: Option<bool>,
}

fn report_offset(app_state: &AppState) -> ApiResult<FixedOffset> {
    app_state.config.report_offset().map_err(|e| {
        log::error!("Invalid report UTC offset: {}", e);
        ApiError::InternalServerError("Invalid report configuration".to_string())
    })
}

/// `inline` unless the client asked to download.
fn pdf_response(bytes: Vec<u8>, filename: String, download: bool) -> HttpResponse {
    let disposition = ContentDisposition {
        disposition: if download { DispositionType::Attachment } else { DispositionType::Inline },
        parameters: vec![DispositionParam::Filename(filename)],
    };

    HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header(disposition)
        .body(bytes)
}

// ==================== CRUD ====================

pub async fn get_vehicle_records(
    app_state: web::Data<Arc<AppState>>,
    query: web::Query<PaginationQuery>,
) -> ApiResult<HttpResponse> {
    let page = VehicleRecordRepository.get_paginated(&app_state.db_pool, &query).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(page)))
}

pub async fn get_vehicle_record(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let record = VehicleRecordRepository.find(&app_state.db_pool, &path).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(record)))
}

pub async fn create_vehicle_record(
    app_state: web::Data<Arc<AppState>>,
    request: web::Json<CreateVehicleRecordRequest>,
    http_request: HttpRequest,
) -> ApiResult<HttpResponse> {
    let claims = get_current_user(&http_request)?;
    validate_form(&request.0)?;

    let record = VehicleRecordRepository.create(&app_state.db_pool, request.into_inner()).await?;

    audit(
        &app_state.db_pool, &claims.sub, AuditAction::Create, "vehicle_record", &record.id,
        &format!("Vehicle {} entered, driver {}", record.vehicle_number, record.driver_name), &http_request,
    ).await;
    log::info!("Vehicle {} entered ({:.2} {})", record.vehicle_number, record.quantity, record.product_type);

    Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
        record,
        "Vehicle record created successfully".to_string(),
    )))
}

/// Entry time, exit time and print count are not editable here.
pub async fn update_vehicle_record(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    request: web::Json<UpdateVehicleRecordRequest>,
    http_request: HttpRequest,
) -> ApiResult<HttpResponse> {
    let claims = get_current_user(&http_request)?;
    validate_form(&request.0)?;
    let record_id = path.into_inner();

    let before = VehicleRecordRepository.find(&app_state.db_pool, &record_id).await?;
    let record = VehicleRecordRepository.update(&app_state.db_pool, &record_id, request.into_inner()).await?;

    audit_update(&app_state.db_pool, &claims.sub, "vehicle_record", &record_id, &before, &record, &http_request).await;

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        record,
        "Vehicle record updated successfully".to_string(),
    )))
}

pub async fn delete_vehicle_record(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    http_request: HttpRequest,
) -> ApiResult<HttpResponse> {
    let claims = require_permission(&http_request, UserRole::can_delete_vehicle_records)?;
    let record_id = path.into_inner();

    let record = VehicleRecordRepository.find(&app_state.db_pool, &record_id).await?;
    VehicleRecordRepository.delete(&app_state.db_pool, &record_id).await?;

    audit(
        &app_state.db_pool, &claims.sub, AuditAction::Delete, "vehicle_record", &record_id,
        &format!("Deleted record for vehicle {}", record.vehicle_number), &http_request,
    ).await;
    log::info!("Vehicle record {} deleted by {}", record_id, claims.username);

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_with_message(
        (),
        "Vehicle record deleted successfully".to_string(),
    )))
}

// ==================== EXIT ====================

pub async fn mark_exit(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    http_request: HttpRequest,
) -> ApiResult<HttpResponse> {
    let claims = get_current_user(&http_request)?;
    let record_id = path.into_inner();

    let record = VehicleRecordRepository.mark_exit(&app_state.db_pool, &record_id).await?;

    let stayed = record
        .duration()
        .map(|d| format!("{} min on site", d.num_minutes()))
        .unwrap_or_default();
    audit(
        &app_state.db_pool, &claims.sub, AuditAction::Exit, "vehicle_record", &record_id,
        &format!("Vehicle {} exited, {}", record.vehicle_number, stayed), &http_request,
    ).await;

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        record,
        "Vehicle exit recorded".to_string(),
    )))
}

// ==================== PDF ====================

/// Every served receipt counts as one print.
pub async fn vehicle_receipt(
    app_state: web::Data<Arc<AppState>>,
    metrics: web::Data<Arc<Metrics>>,
    path: web::Path<String>,
    query: web::Query<DownloadQuery>,
    http_request: HttpRequest,
) -> ApiResult<HttpResponse> {
    let claims = get_current_user(&http_request)?;
    let record_id = path.into_inner();
    let offset = report_offset(&app_state)?;

    let record = VehicleRecordRepository.find(&app_state.db_pool, &record_id).await?;
    let bytes = pdf::receipt_pdf(&record, &offset)?;

    VehicleRecordRepository.increment_print_count(&app_state.db_pool, &record_id).await?;
    metrics.increment_receipts();

    audit(
        &app_state.db_pool, &claims.sub, AuditAction::Print, "vehicle_record", &record_id,
        &format!("Printed receipt for vehicle {}", record.vehicle_number), &http_request,
    ).await;

    Ok(pdf_response(bytes, record.receipt_filename(), query.download.unwrap_or(false)))
}

pub async fn vehicle_report(
    app_state: web::Data<Arc<AppState>>,
    query: web::Query<DownloadQuery>,
) -> ApiResult<HttpResponse> {
    let offset = report_offset(&app_state)?;
    let records = VehicleRecordRepository.list_for_report(&app_state.db_pool).await?;
    let bytes = pdf::report_pdf(&records, &offset)?;

    Ok(pdf_response(bytes, pdf::REPORT_FILENAME.to_string(), query.download.unwrap_or(false)))
}
