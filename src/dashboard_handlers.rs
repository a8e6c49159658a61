// src/dashboard_handlers.rs
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use std::sync::Arc;

use crate::AppState;
use crate::error::ApiResult;
use crate::handlers::ApiResponse;
use crate::stats;

#[derive(Debug, Deserialize, Default)]
pub struct LowStockQuery {
    pub format: Option<String>,
}

impl LowStockQuery {
    pub fn wants_json(&self) -> bool {
        self.format.as_deref().map(|f| f.eq_ignore_ascii_case("json")).unwrap_or(false)
    }
}

pub async fn get_dashboard(app_state: web::Data<Arc<AppState>>) -> ApiResult<HttpResponse> {
    let summary = stats::dashboard_summary(&app_state.db_pool).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(summary)))
}

/// Name and quantity of every stock item, for charts.
pub async fn get_stock_data(app_state: web::Data<Arc<AppState>>) -> ApiResult<HttpResponse> {
    let levels = stats::stock_levels(&app_state.db_pool).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(levels)))
}

/// JSON with `?format=json`, otherwise a standalone HTML page.
pub async fn get_low_stock(
    app_state: web::Data<Arc<AppState>>,
    query: web::Query<LowStockQuery>,
) -> ApiResult<HttpResponse> {
    let report = stats::low_stock(&app_state.db_pool).await?;

    if query.wants_json() {
        return Ok(HttpResponse::Ok().json(ApiResponse::success(report)));
    }

    let html = stats::render_low_stock_page(&app_state.config.reports.low_stock_page_title, &report);
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html))
}
