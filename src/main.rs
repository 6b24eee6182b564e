//! # report-render CLI
//!
//! Usage:
//!   report-render render report.json -o report.pdf
//!   echo '{ ... }' | report-render render --mode compact -o report.pdf
//!   report-render render report.json --monospace -o report.pdf
//!   report-render example > report.json
//!   report-render decode 'http://localhost:3000/track-report?reportId=R1'
//!   report-render qr report.json -o code.png

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use report_render::assembler::DocumentAssembler;
use report_render::config::Config;
use report_render::font::{FontContext, FontRegistry, StandardFont};
use report_render::model::ReportRecord;
use report_render::qr::{tracking_url, QrEncoder, ScannedCode, TrackingPayload};
use report_render::template::{DocumentTemplate, RenderMode};

#[derive(Parser)]
#[command(name = "report-render", version, about = "Render incident reports to PDF")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a report JSON file (or stdin) to PDF
    Render {
        /// Report JSON; reads stdin when omitted
        input: Option<PathBuf>,
        #[arg(short, long, default_value = "report.pdf")]
        output: PathBuf,
        /// detailed or compact; overrides REPORT_RENDER_MODE
        #[arg(long)]
        mode: Option<RenderMode>,
        /// Overrides TRACKING_BASE_URL
        #[arg(long)]
        base_url: Option<String>,
        /// Set the document in Courier instead of Helvetica
        #[arg(long)]
        monospace: bool,
    },
    /// Print a sample report JSON
    Example,
    /// Decode a scanned QR string
    Decode { scanned: String },
    /// Write the QR code for a report as PNG
    Qr {
        input: Option<PathBuf>,
        #[arg(short, long, default_value = "code.png")]
        output: PathBuf,
        /// Encode the compact record payload instead of the tracking URL
        #[arg(long)]
        payload: bool,
        #[arg(long)]
        base_url: Option<String>,
    },
}

fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.rust_log)),
        )
        .with_writer(io::stderr)
        .init();

    match Cli::parse().command {
        Command::Render {
            input,
            output,
            mode,
            base_url,
            monospace,
        } => {
            let report = read_report(input.as_deref())?;
            let base_url = base_url.unwrap_or(config.tracking_base_url);
            let mode = mode.unwrap_or(config.render_mode);
            let mut template = DocumentTemplate::for_mode(mode, &base_url);
            let mut assembler = DocumentAssembler::new(&base_url);
            if monospace {
                let mut registry = FontRegistry::empty();
                registry.register(StandardFont::Courier);
                registry.register(StandardFont::CourierBold);
                template.regular_font = StandardFont::Courier.pdf_name().to_string();
                template.bold_font = StandardFont::CourierBold.pdf_name().to_string();
                assembler = assembler.with_fonts(FontContext::with_registry(registry));
            }
            let bytes = assembler
                .render_with_template(&report, &template)
                .context("failed to render report")?;
            fs::write(&output, &bytes)
                .with_context(|| format!("failed to write {}", output.display()))?;
            info!(bytes = bytes.len(), path = %output.display(), "wrote PDF");
        }
        Command::Example => print!("{}", example_report_json()),
        Command::Decode { scanned } => match ScannedCode::parse(&scanned)? {
            ScannedCode::TrackingCode(code) => println!("tracking code: {code}"),
            ScannedCode::Payload(p) => {
                println!("id:        {}", p.id);
                println!("type:      {}", p.report_type);
                println!("createdAt: {}", p.created_at.to_rfc3339());
            }
        },
        Command::Qr {
            input,
            output,
            payload,
            base_url,
        } => {
            let report = read_report(input.as_deref())?;
            let content = if payload {
                TrackingPayload::from_report(&report)
                    .encode()
                    .context("failed to encode payload")?
            } else {
                let base_url = base_url.unwrap_or(config.tracking_base_url);
                tracking_url(&base_url, report.tracking_code())
            };
            let qr = QrEncoder::new()
                .encode(&content)
                .context("failed to encode QR code")?;
            fs::write(&output, &qr.png)
                .with_context(|| format!("failed to write {}", output.display()))?;
            info!(modules = qr.modules, px = qr.width_px, path = %output.display(), "wrote QR code");
        }
    }
    Ok(())
}

fn read_report(path: Option<&Path>) -> Result<ReportRecord> {
    let input = match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };
    serde_json::from_str(&input).context("input is not a valid report")
}

fn example_report_json() -> &'static str {
    r##"{
  "id": "clx8f2k9a0001",
  "reportId": "RPT-7Q2M9XK4",
  "type": "EMERGENCY",
  "status": "IN_PROGRESS",
  "title": "Vehicle break-in",
  "description": "Passenger window smashed and a laptop bag taken from the back seat. Happened between 9pm and 11pm; a neighbour heard glass breaking around 10.",
  "location": "Corner of 5th Ave and Pine St",
  "latitude": 47.6101,
  "longitude": -122.3344,
  "createdAt": "2024-03-14T22:41:07Z"
}
"##
}
