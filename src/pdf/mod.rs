// src/pdf/mod.rs
//! Vehicle receipt and report documents.

pub mod layout;
pub mod render;

use chrono::{FixedOffset, Utc};

use crate::error::ApiResult;
use crate::models::VehicleRecord;

pub const REPORT_FILENAME: &str = "vehicle_report.pdf";

pub fn receipt_pdf(record: &VehicleRecord, offset: &FixedOffset) -> ApiResult<Vec<u8>> {
    let layout = layout::receipt_layout(record, Utc::now(), offset);
    render::render(&layout)
}

pub fn report_pdf(records: &[VehicleRecord], offset: &FixedOffset) -> ApiResult<Vec<u8>> {
    let layout = layout::report_layout(records, offset);
    log::debug!("Vehicle report: {} records on {} page(s)", records.len(), layout.pages.len());
    render::render(&layout)
}
