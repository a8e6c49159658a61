// src/stats.rs
//! Read-only aggregates over the stock, equipment and supplier tables.

use serde::Serialize;
use sqlx::SqlitePool;

use crate::error::ApiResult;
use crate::models::LOW_STOCK_CONDITION;

/// Number of items shown in the dashboard chart.
pub const TOP_ITEMS: i64 = 10;

#[derive(Debug, Serialize, PartialEq)]
pub struct DashboardSummary {
    pub total_equipment: i64,
    pub total_suppliers: i64,
    pub total_stock_items: i64,
    pub total_quantity: i64,
    pub low_stock_count: i64,
    pub chart_labels: Vec<String>,
    pub chart_data: Vec<i64>,
}

#[derive(Debug, Serialize, sqlx::FromRow, Clone, PartialEq)]
pub struct LowStockItem {
    pub id: String,
    pub name: String,
    pub quantity: i64,
    pub min_level: i64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct LowStockReport {
    pub low_stock_count: usize,
    pub low_items: Vec<LowStockItem>,
}

#[derive(Debug, Serialize, sqlx::FromRow, PartialEq)]
pub struct StockLevel {
    pub name: String,
    pub quantity: i64,
}

pub async fn dashboard_summary(pool: &SqlitePool) -> ApiResult<DashboardSummary> {
    let (total_equipment,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM equipment")
        .fetch_one(pool)
        .await?;

    let (total_suppliers,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM suppliers")
        .fetch_one(pool)
        .await?;

    let (total_stock_items, total_quantity): (i64, i64) =
        sqlx::query_as("SELECT COUNT(*), COALESCE(SUM(quantity), 0) FROM stock_items")
            .fetch_one(pool)
            .await?;

    let low_sql = format!("SELECT COUNT(*) FROM stock_items WHERE {}", LOW_STOCK_CONDITION);
    let (low_stock_count,): (i64,) = sqlx::query_as(&low_sql)
        .fetch_one(pool)
        .await?;

    let top: Vec<StockLevel> = sqlx::query_as(
        "SELECT name, quantity FROM stock_items ORDER BY quantity DESC, name ASC, id ASC LIMIT ?",
    )
        .bind(TOP_ITEMS)
        .fetch_all(pool)
        .await?;

    let (chart_labels, chart_data): (Vec<String>, Vec<i64>) = top.into_iter().map(|s| (s.name, s.quantity)).unzip();

    Ok(DashboardSummary {
        total_equipment,
        total_suppliers,
        total_stock_items,
        total_quantity,
        low_stock_count,
        chart_labels,
        chart_data,
    })
}

pub async fn low_stock(pool: &SqlitePool) -> ApiResult<LowStockReport> {
    let sql = format!(
        "SELECT id, name, quantity, min_level FROM stock_items WHERE {} ORDER BY name ASC, id ASC",
        LOW_STOCK_CONDITION
    );
    let low_items: Vec<LowStockItem> = sqlx::query_as(&sql)
        .fetch_all(pool)
        .await?;

    Ok(LowStockReport {
        low_stock_count: low_items.len(),
        low_items,
    })
}

pub async fn stock_levels(pool: &SqlitePool) -> ApiResult<Vec<StockLevel>> {
    let levels = sqlx::query_as("SELECT name, quantity FROM stock_items ORDER BY name ASC, id ASC")
        .fetch_all(pool)
        .await?;

    Ok(levels)
}

// ==================== LOW STOCK PAGE ====================

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Self-contained HTML table of the low-stock items.
pub fn render_low_stock_page(title: &str, report: &LowStockReport) -> String {
    let title = escape_html(title);
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", title));
    html.push_str(
        "<style>body{font-family:sans-serif;margin:2em}table{border-collapse:collapse}\
         th,td{border:1px solid #ccc;padding:4px 10px;text-align:left}</style>\n",
    );
    html.push_str("</head>\n<body>\n");
    html.push_str(&format!("<h1>{}</h1>\n", title));

    if report.low_items.is_empty() {
        html.push_str("<p>All stock items are above their minimum level.</p>\n");
    } else {
        html.push_str(&format!("<p>{} item(s) at or below minimum level.</p>\n", report.low_stock_count));
        html.push_str("<table>\n<tr><th>Item</th><th>Quantity</th><th>Minimum level</th></tr>\n");
        for item in &report.low_items {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                escape_html(&item.name),
                item.quantity,
                item.min_level
            ));
        }
        html.push_str("</table>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}
