// src/pdf/layout.rs
//! Page layout as plain data: absolute text runs on A4, origin bottom-left,
//! units in points. Nothing here touches PDF bytes.

use chrono::{DateTime, FixedOffset, Utc};

use crate::models::VehicleRecord;

pub const PAGE_WIDTH: f32 = 595.0;
pub const PAGE_HEIGHT: f32 = 842.0;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

// Receipt geometry
const RECEIPT_TITLE: &str = "Vehicle Receipt";
const RECEIPT_TITLE_CENTER_X: f32 = 300.0;
const RECEIPT_TITLE_Y: f32 = 800.0;
const RECEIPT_X: f32 = 60.0;
const RECEIPT_TOP: f32 = 760.0;
const RECEIPT_STEP: f32 = 18.0;
const RECEIPT_FOOTER_Y: f32 = 80.0;

// Report geometry
const REPORT_TITLE: &str = "Vehicle Records Report";
const REPORT_TITLE_X: f32 = 200.0;
const REPORT_TITLE_Y: f32 = 800.0;
pub const REPORT_TOP: f32 = 770.0;
pub const REPORT_BOTTOM_MARGIN: f32 = 100.0;
const REPORT_IDENTITY_X: f32 = 100.0;
const REPORT_DETAIL_X: f32 = 120.0;
const REPORT_LINE_STEP: f32 = 20.0;
const REPORT_RECORD_GAP: f32 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub font: Font,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub runs: Vec<TextRun>,
}

impl Page {
    fn push(&mut self, x: f32, y: f32, size: f32, font: Font, text: impl Into<String>) {
        self.runs.push(TextRun { x, y, size, font, text: text.into() });
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub title: String,
    pub pages: Vec<Page>,
}

fn format_time(time: DateTime<Utc>, offset: &FixedOffset) -> String {
    time.with_timezone(offset).format(TIME_FORMAT).to_string()
}

/// Approximate advance width of Helvetica text, for centring.
pub fn approx_text_width(text: &str, size: f32, font: Font) -> f32 {
    let em: f32 = text
        .chars()
        .map(|c| match c {
            'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '|' | '!' => 0.28,
            'f' | 't' | 'r' | ' ' | '-' | '(' | ')' | '/' => 0.33,
            'm' | 'w' | 'M' | 'W' => 0.85,
            c if c.is_ascii_uppercase() => 0.68,
            _ => 0.556,
        })
        .sum();
    let weight = if font == Font::HelveticaBold { 1.05 } else { 1.0 };
    em * size * weight
}

// ==================== RECEIPT ====================

fn or_placeholder(value: Option<&str>, placeholder: &str) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => placeholder.to_string(),
    }
}

/// The ten receipt lines, in print order.
pub fn receipt_lines(record: &VehicleRecord, offset: &FixedOffset) -> Vec<String> {
    vec![
        format!("Vehicle No.: {}", record.vehicle_number),
        format!("Vehicle Type: {}", record.vehicle_type.label()),
        format!(
            "Driver: {}    Phone: {}",
            record.driver_name,
            or_placeholder(record.driver_phone.as_deref(), "N/A")
        ),
        format!("Supplier: {}", or_placeholder(record.supplier_name.as_deref(), "N/A")),
        format!("Product: {}", record.product_type),
        format!("Quantity: {:.2}", record.quantity),
        format!("Entry Time: {}", format_time(record.entry_time, offset)),
        format!(
            "Exit Time: {}",
            record.exit_time.map(|t| format_time(t, offset)).unwrap_or_else(|| "---".to_string())
        ),
        format!("Checked By: {}", or_placeholder(record.checked_by.as_deref(), "---")),
        format!("Remarks: {}", or_placeholder(record.remarks.as_deref(), "---")),
    ]
}

/// Single-page receipt for one record.
pub fn receipt_layout(record: &VehicleRecord, generated_at: DateTime<Utc>, offset: &FixedOffset) -> Layout {
    let mut page = Page::default();

    let title_width = approx_text_width(RECEIPT_TITLE, 16.0, Font::HelveticaBold);
    page.push(
        RECEIPT_TITLE_CENTER_X - title_width / 2.0,
        RECEIPT_TITLE_Y,
        16.0,
        Font::HelveticaBold,
        RECEIPT_TITLE,
    );

    let mut y = RECEIPT_TOP;
    for line in receipt_lines(record, offset) {
        page.push(RECEIPT_X, y, 11.0, Font::Helvetica, line);
        y -= RECEIPT_STEP;
    }

    page.push(
        RECEIPT_X,
        RECEIPT_FOOTER_Y,
        9.0,
        Font::HelveticaOblique,
        format!("Generated: {}", format_time(generated_at, offset)),
    );

    Layout {
        title: format!("Vehicle Receipt {}", record.vehicle_number),
        pages: vec![page],
    }
}

// ==================== REPORT ====================

/// Lines for one record: identity at the left indent, details further in.
fn report_record_lines(record: &VehicleRecord, offset: &FixedOffset) -> Vec<(f32, String)> {
    let mut lines = vec![
        (
            REPORT_IDENTITY_X,
            format!("Vehicle No: {} | Driver: {}", record.vehicle_number, record.driver_name),
        ),
        (
            REPORT_DETAIL_X,
            format!(
                "Supplier: {} | Product: {} | Qty: {:.2}",
                or_placeholder(record.supplier_name.as_deref(), "N/A"),
                record.product_type,
                record.quantity
            ),
        ),
        (REPORT_DETAIL_X, format!("Entry: {}", format_time(record.entry_time, offset))),
    ];
    if let Some(exit) = record.exit_time {
        lines.push((REPORT_DETAIL_X, format!("Exit: {}", format_time(exit, offset))));
    }
    lines
}

/// Multi-record report. `records` is expected newest entry first.
pub fn report_layout(records: &[VehicleRecord], offset: &FixedOffset) -> Layout {
    let mut pages = Vec::new();
    let mut page = Page::default();
    page.push(REPORT_TITLE_X, REPORT_TITLE_Y, 16.0, Font::HelveticaBold, REPORT_TITLE);

    let mut y = REPORT_TOP;

    if records.is_empty() {
        page.push(REPORT_IDENTITY_X, y, 12.0, Font::Helvetica, "No vehicle records found.");
    }

    for record in records {
        let lines = report_record_lines(record, offset);
        let last_line_y = y - REPORT_LINE_STEP * (lines.len() as f32 - 1.0);

        if (y < REPORT_BOTTOM_MARGIN || last_line_y < REPORT_BOTTOM_MARGIN) && !page.runs.is_empty() {
            pages.push(std::mem::take(&mut page));
            y = REPORT_TOP;
        }

        for (x, text) in lines {
            page.push(x, y, 12.0, Font::Helvetica, text);
            y -= REPORT_LINE_STEP;
        }
        y -= REPORT_RECORD_GAP - REPORT_LINE_STEP;
    }

    pages.push(page);

    Layout {
        title: REPORT_TITLE.to_string(),
        pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VehicleType;
    use chrono::{Duration, TimeZone};

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn record(n: usize, exited: bool) -> VehicleRecord {
        let entry = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap() - Duration::minutes(n as i64);
        VehicleRecord {
            id: format!("id-{}", n),
            vehicle_number: format!("TNK-{:03}", n),
            driver_name: "Driver".into(),
            driver_phone: None,
            supplier_id: None,
            vehicle_type: VehicleType::Service,
            entry_time: entry,
            exit_time: if exited { Some(entry + Duration::hours(1)) } else { None },
            product_type: "Diesel".into(),
            quantity: 1500.0,
            remarks: None,
            checked_by: Some("  ".into()),
            print_count: 0,
            supplier_name: None,
        }
    }

    #[test]
    fn test_receipt_lines_placeholders() {
        let lines = receipt_lines(&record(1, false), &utc());
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[0], "Vehicle No.: TNK-001");
        assert_eq!(lines[1], "Vehicle Type: Service Vehicle");
        assert_eq!(lines[2], "Driver: Driver    Phone: N/A");
        assert_eq!(lines[3], "Supplier: N/A");
        assert_eq!(lines[5], "Quantity: 1500.00");
        assert_eq!(lines[6], "Entry Time: 2024-06-01 07:59");
        assert_eq!(lines[7], "Exit Time: ---");
        assert_eq!(lines[8], "Checked By: ---");
        assert_eq!(lines[9], "Remarks: ---");
    }

    #[test]
    fn test_receipt_layout_positions() {
        let mut r = record(0, true);
        r.supplier_name = Some("Byco".into());
        let generated = Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 0).unwrap();
        let offset = FixedOffset::east_opt(5 * 3600).unwrap();
        let layout = receipt_layout(&r, generated, &offset);

        assert_eq!(layout.pages.len(), 1);
        let runs = &layout.pages[0].runs;
        assert_eq!(runs.len(), 12);

        let title = &runs[0];
        assert_eq!((title.y, title.size, title.font), (800.0, 16.0, Font::HelveticaBold));
        assert!(title.x > 150.0 && title.x < 300.0);

        assert_eq!((runs[1].x, runs[1].y), (60.0, 760.0));
        assert_eq!(runs[10].y, 760.0 - 9.0 * 18.0);
        assert_eq!(runs[4].text, "Supplier: Byco");
        assert_eq!(runs[7].text, "Entry Time: 2024-06-01 13:00");

        let footer = &runs[11];
        assert_eq!((footer.x, footer.y, footer.font), (60.0, 80.0, Font::HelveticaOblique));
        assert_eq!(footer.text, "Generated: 2024-06-01 17:30");
    }

    #[test]
    fn test_report_empty() {
        let layout = report_layout(&[], &utc());
        assert_eq!(layout.pages.len(), 1);
        let runs = &layout.pages[0].runs;
        assert_eq!(runs[1].text, "No vehicle records found.");
        assert_eq!((runs[1].x, runs[1].y), (100.0, 770.0));
    }

    #[test]
    fn test_report_paginates_fifty_records() {
        let records: Vec<VehicleRecord> = (0..50).map(|n| record(n, n % 2 == 0)).collect();
        let layout = report_layout(&records, &utc());
        assert!(layout.pages.len() > 1);

        let identity_lines: Vec<&str> = layout
            .pages
            .iter()
            .flat_map(|p| p.runs.iter())
            .filter(|r| r.text.starts_with("Vehicle No: "))
            .map(|r| r.text.as_str())
            .collect();
        assert_eq!(identity_lines.len(), 50);
        for (n, line) in identity_lines.iter().enumerate() {
            assert!(line.starts_with(&format!("Vehicle No: TNK-{:03} ", n)));
        }

        for page in &layout.pages {
            for run in &page.runs {
                assert!(run.y >= REPORT_BOTTOM_MARGIN, "line drawn at {}", run.y);
            }
        }
    }

    #[test]
    fn test_report_page_break_keeps_record_together() {
        let records: Vec<VehicleRecord> = (0..50).map(|n| record(n, true)).collect();
        let layout = report_layout(&records, &utc());
        for page in layout.pages.iter() {
            let body: Vec<&TextRun> = page.runs.iter().filter(|r| r.font == Font::Helvetica).collect();
            assert_eq!(body.len() % 4, 0);
            assert_eq!(body[0].y, REPORT_TOP);
        }
        // Records start at 770, 680, ... 230; the next one would end below the margin
        assert_eq!(layout.pages[0].runs.iter().filter(|r| r.x == 100.0).count(), 7);
    }
}
