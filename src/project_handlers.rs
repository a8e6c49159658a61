// src/project_handlers.rs
use actix_web::{web, HttpRequest, HttpResponse};
use std::sync::Arc;

use crate::AppState;
use crate::audit::{audit, audit_update, AuditAction};
use crate::auth::get_current_user;
use crate::error::ApiResult;
use crate::handlers::{ApiResponse, PaginationQuery};
use crate::models::{CreateProjectRequest, UpdateProjectRequest};
use crate::repositories::{CrudRepository, ProjectRepository};
use crate::validator::validate_form;

pub async fn get_projects(
    app_state: web::Data<Arc<AppState>>,
    query: web::Query<PaginationQuery>,
) -> ApiResult<HttpResponse> {
    let page = ProjectRepository.get_paginated(&app_state.db_pool, &query).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(page)))
}

pub async fn get_project(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let project = ProjectRepository.find(&app_state.db_pool, &path).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(project)))
}

pub async fn create_project(
    app_state: web::Data<Arc<AppState>>,
    request: web::Json<CreateProjectRequest>,
    http_request: HttpRequest,
) -> ApiResult<HttpResponse> {
    let claims = get_current_user(&http_request)?;
    validate_form(&request.0)?;

    let project = ProjectRepository.create(&app_state.db_pool, request.into_inner()).await?;

    audit(
        &app_state.db_pool, &claims.sub, AuditAction::Create, "project", &project.id,
        &format!("Created project {} at {}", project.name, project.location), &http_request,
    ).await;

    Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
        project,
        "Project created successfully".to_string(),
    )))
}

pub async fn update_project(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    request: web::Json<UpdateProjectRequest>,
    http_request: HttpRequest,
) -> ApiResult<HttpResponse> {
    let claims = get_current_user(&http_request)?;
    validate_form(&request.0)?;
    let project_id = path.into_inner();

    let before = ProjectRepository.find(&app_state.db_pool, &project_id).await?;
    let project = ProjectRepository.update(&app_state.db_pool, &project_id, request.into_inner()).await?;

    audit_update(&app_state.db_pool, &claims.sub, "project", &project_id, &before, &project, &http_request).await;

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        project,
        "Project updated successfully".to_string(),
    )))
}

pub async fn delete_project(
    app_state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    http_request: HttpRequest,
) -> ApiResult<HttpResponse> {
    let claims = get_current_user(&http_request)?;
    let project_id = path.into_inner();

    let project = ProjectRepository.find(&app_state.db_pool, &project_id).await?;
    ProjectRepository.delete(&app_state.db_pool, &project_id).await?;

    audit(
        &app_state.db_pool, &claims.sub, AuditAction::Delete, "project", &project_id,
        &format!("Deleted project {}", project.name), &http_request,
    ).await;

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_with_message(
        (),
        "Project deleted successfully".to_string(),
    )))
}
