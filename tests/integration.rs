//! Integration tests for the report rendering pipeline.
//!
//! These tests exercise the full path from report JSON to PDF output.
//! They verify:
//! - JSON deserialization matches what the storage layer hands over
//! - The page geometry and field placement of both templates
//! - PDF output is structurally valid and byte-for-byte reproducible
//! - Lookup, rendering, and delivery fail with the right status

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;

use report_render::assembler::DocumentAssembler;
use report_render::dispatch::{serve_report, ServeError};
use report_render::font::FontContext;
use report_render::layout::{LayoutEngine, LayoutPage};
use report_render::model::*;
use report_render::qr::{ScannedCode, TrackingPayload};
use report_render::store::InMemoryReportStore;
use report_render::template::{DocumentTemplate, RenderMode, DEFAULT_BASE_URL};

// ─── Helpers ────────────────────────────────────────────────────

const LONG_DESCRIPTION: &str =
    "A blue road bike was taken from the rack outside the public library sometime during the afternoon.";

fn scenario_a() -> ReportRecord {
    ReportRecord {
        id: "cl0001".to_string(),
        report_id: "R1".to_string(),
        report_type: "THEFT".to_string(),
        status: ReportStatus::Pending,
        title: "Stolen bike".to_string(),
        description: Some(LONG_DESCRIPTION.to_string()),
        location: Some("Market St".to_string()),
        latitude: None,
        longitude: None,
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        updated_at: None,
        image: None,
    }
}

fn layout_report(report: &ReportRecord, template: &DocumentTemplate) -> LayoutPage {
    LayoutEngine::new()
        .layout(report, template, &FontContext::new())
        .unwrap()
}

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.len() > 50, "PDF too small to be valid");
    assert!(bytes.starts_with(b"%PDF-1.7"), "Missing PDF header");
    assert!(
        bytes.windows(5).any(|w| w == b"%%EOF"),
        "Missing %%EOF marker"
    );
    assert!(bytes.windows(4).any(|w| w == b"xref"), "Missing xref table");
    assert!(
        bytes.windows(7).any(|w| w == b"trailer"),
        "Missing trailer"
    );
}

/// Inflate the page content stream.
fn content_stream(bytes: &[u8]) -> String {
    let marker = b"<< /Filter /FlateDecode /Length ";
    let start = bytes
        .windows(marker.len())
        .position(|w| w == marker)
        .expect("content stream")
        + marker.len();
    let rest = &bytes[start..];
    let digits = rest.iter().take_while(|b| b.is_ascii_digit()).count();
    let len: usize = std::str::from_utf8(&rest[..digits]).unwrap().parse().unwrap();
    let body_start = rest
        .windows(7)
        .position(|w| w == b"stream\n")
        .unwrap()
        + 7;
    let compressed = &rest[body_start..body_start + len];
    let raw = miniz_oxide::inflate::decompress_to_vec_zlib(compressed).unwrap();
    String::from_utf8(raw).unwrap()
}

// ─── Scenarios ──────────────────────────────────────────────────

#[test]
fn test_scenario_a_geometry() {
    let template = DocumentTemplate::default();
    let page = layout_report(&scenario_a(), &template);
    assert_eq!((page.width, page.height), (595.0, 842.0));

    let title = page.text_lines().next().unwrap();
    assert_eq!(title.text, "CRIME REPORT DETAILS");
    let center = title.x + title.width / 2.0;
    assert!((center - 595.0 / 2.0).abs() < 1e-6);

    let desc = page.field(FieldKind::Description).unwrap();
    assert!(desc.lines.len() >= 2, "description should wrap");
    let rejoined: Vec<&str> = desc.lines.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(rejoined.join(" "), LONG_DESCRIPTION);
}

#[test]
fn test_scenario_a_pdf() {
    let bytes = DocumentAssembler::default()
        .render(&scenario_a(), RenderMode::Detailed)
        .unwrap();
    assert_valid_pdf(&bytes);
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("/MediaBox [0 0 595 842]"));

    let content = content_stream(&bytes);
    assert!(content.contains("(CRIME REPORT DETAILS) Tj"));
    assert!(content.contains("(Report ID:) Tj"));
    assert!(content.contains("(R1) Tj"));
    assert!(content.contains("(Scan to track report status) Tj"));
    assert!(content.contains("/Im0 Do"));
}

#[test]
fn test_scenario_b_empty_description() {
    let mut report = scenario_a();
    report.description = Some(String::new());
    let template = DocumentTemplate::default();
    let page = layout_report(&report, &template);
    let desc = page.field(FieldKind::Description).unwrap();
    assert!(desc.lines.is_empty());
    assert_eq!(desc.cursor_after - desc.cursor_before, template.field_gap);
}

#[test]
fn test_scenario_c_missing_location() {
    let mut report = scenario_a();
    report.location = None;
    let page = layout_report(&report, &DocumentTemplate::default());
    let loc = page.field(FieldKind::Location).unwrap();
    assert_eq!(loc.lines.len(), 1);
    assert_eq!(loc.lines[0].text, "Not specified");
}

// ─── Pipeline ───────────────────────────────────────────────────

#[test]
fn test_json_to_pdf() {
    let json = r#"{
        "id": "cl0001",
        "reportId": "R1",
        "type": "EMERGENCY",
        "status": "IN_PROGRESS",
        "location": null,
        "createdAt": "2024-01-01T00:00:00Z"
    }"#;
    let bytes = report_render::render_json(json, &DocumentTemplate::default()).unwrap();
    assert_valid_pdf(&bytes);
    let content = content_stream(&bytes);
    assert!(content.contains("(IN_PROGRESS) Tj"));
    assert!(content.contains("(Not specified) Tj"));
    assert!(content.contains("(2024-01-01 00:00 UTC) Tj"));
}

#[test]
fn test_bad_json_is_a_parse_error() {
    let err = report_render::render_json("{\"id\": 1}", &DocumentTemplate::default()).unwrap_err();
    assert!(err.to_string().starts_with("failed to parse report"));
}

#[test]
fn test_rerender_is_byte_identical() {
    let report = scenario_a();
    for mode in [RenderMode::Detailed, RenderMode::Compact] {
        let a = DocumentAssembler::default().render(&report, mode).unwrap();
        let b = DocumentAssembler::default().render(&report, mode).unwrap();
        assert!(a == b, "{mode:?} render is not reproducible");
    }
}

#[test]
fn test_compact_template() {
    let bytes = DocumentAssembler::default()
        .render(&scenario_a(), RenderMode::Compact)
        .unwrap();
    assert_valid_pdf(&bytes);
    let content = content_stream(&bytes);
    assert!(content.contains("/F1 24 Tf\n1 0 0 1 50.00 792.00 Tm\n(Crime Report) Tj"));
    assert!(content.contains("(Description:) Tj"));
    assert!(!content.contains(" l\nS"), "compact has no separator");
}

#[test]
fn test_payload_round_trip_over_declared_fields() {
    let report = scenario_a();
    let encoded = TrackingPayload::from_report(&report).encode().unwrap();
    match ScannedCode::parse(&encoded).unwrap() {
        ScannedCode::Payload(p) => {
            assert_eq!(p.id, report.report_id);
            assert_eq!(p.report_type, report.report_type);
            assert_eq!(p.created_at, report.created_at);
        }
        other => panic!("expected a payload, got {other:?}"),
    }
    assert!(ScannedCode::parse("{\"v\":1}").is_err());
}

// ─── Delivery ───────────────────────────────────────────────────

#[test]
fn test_serve_report_statuses() {
    let store = InMemoryReportStore::new();
    store.insert(scenario_a()).unwrap();
    let assembler = DocumentAssembler::new(DEFAULT_BASE_URL);
    let template = DocumentTemplate::default();

    let ok = serve_report(&store, &assembler, "R1", &template, true).unwrap();
    assert_valid_pdf(&ok.body);
    assert_eq!(ok.content_length(), ok.body.len());

    let missing = serve_report(&store, &assembler, "R2", &template, true).unwrap_err();
    assert!(matches!(missing, ServeError::NotFound));
    assert_eq!(missing.status_code(), 404);

    let mut broken = template.clone();
    broken.bold_font = "Futura".to_string();
    let failed = serve_report(&store, &assembler, "R1", &broken, true).unwrap_err();
    assert_eq!(failed.status_code(), 500);
}
