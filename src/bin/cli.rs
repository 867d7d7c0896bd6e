//! slsframe CLI
//!
//! Command-line interface for slsframe operations:
//! - Run queries against a running server
//! - Check server and log store status
//! - Pivot a records file offline
//! - Generate a config file

use anyhow::{anyhow, bail, Context};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use slsframe::frame::{build_frame, FieldValues, Frame, FrameShape};
use slsframe::payload::{normalize, QueryInvocation, TimeWindow};
use slsframe::query::BatchResponse;
use slsframe::source::{decode_records, write_records};

#[derive(Parser)]
#[command(name = "slsframe-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Pivot log search results into typed frames")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://localhost:8082", global = true)]
    pub api_url: String,

    /// Output format (table, json, csv)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

/// Options shared by commands that build a query payload
#[derive(clap::Args)]
pub struct PayloadArgs {
    /// Frame mode (table, timeseries)
    #[arg(short, long, default_value = "timeseries")]
    pub mode: String,
    /// Field holding the record timestamp
    #[arg(long)]
    pub time_field: Option<String>,
    /// IANA timezone of the timestamp (default: Asia/Shanghai)
    #[arg(long)]
    pub timezone: Option<String>,
    /// Timestamp format, e.g. "yyyy-MM-dd HH:mm:ss"
    #[arg(long)]
    pub time_format: Option<String>,
}

impl PayloadArgs {
    fn to_json(&self, query: &str) -> serde_json::Value {
        serde_json::json!({
            "queryText": query,
            "format": self.mode,
            "timeField": self.time_field,
            "timezone": self.timezone,
            "timeFormat": self.time_format,
        })
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a query on the server
    Query {
        /// Query expression
        query: String,
        /// Time range (e.g., 15m, 1h, 7d)
        #[arg(short, long, default_value = "1h")]
        last: String,
        /// Reference id of the query
        #[arg(long, default_value = "A")]
        ref_id: String,
        #[command(flatten)]
        payload: PayloadArgs,
    },

    /// Show server and log store status
    Status,

    /// Pivot a JSON records file locally
    Pivot {
        /// Path to a JSON array of records
        path: PathBuf,
        /// Also save the decoded records as a replay file for the server
        /// (e.g. data/<project>/<logstore>.json)
        #[arg(long)]
        capture: Option<PathBuf>,
        #[command(flatten)]
        payload: PayloadArgs,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Query {
            query,
            last,
            ref_id,
            payload,
        } => {
            let duration = parse_duration(&last)?;
            let end = Utc::now();
            let window = TimeWindow::new(end - duration, end);

            let body = serde_json::json!({
                "queries": [QueryInvocation::new(&ref_id, payload.to_json(&query), window)],
            });

            let response = client
                .post(format!("{}/api/v1/query", cli.api_url))
                .json(&body)
                .send()
                .await
                .with_context(|| format!("Cannot reach slsframe API at {}", cli.api_url))?;

            if !response.status().is_success() {
                let status = response.status();
                let text = response.text().await.unwrap_or_default();
                eprintln!("Query failed ({}): {}", status, text);
                std::process::exit(1);
            }

            let batch: BatchResponse = response.json().await?;
            let result = batch
                .get(&ref_id)
                .ok_or_else(|| anyhow!("No response for query {}", ref_id))?;

            if let Some(error) = &result.error {
                eprintln!("Query {} failed: {}", ref_id, error);
                std::process::exit(1);
            }

            for frame in &result.frames {
                print_frame(frame, &cli.format)?;
            }
        }

        Commands::Status => {
            let response = client.get(format!("{}/health", cli.api_url)).send().await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    let health: serde_json::Value = resp.json().await?;

                    println!("slsframe v{}", env!("CARGO_PKG_VERSION"));
                    println!();
                    println!(
                        "API Status: {}",
                        health["status"].as_str().unwrap_or("unknown")
                    );
                    println!(
                        "Log source: {} ({})",
                        health["source"].as_str().unwrap_or("unknown"),
                        health["message"].as_str().unwrap_or("-")
                    );

                    if let Some(uptime) = health["uptime_seconds"].as_u64() {
                        println!();
                        println!("Uptime: {}", format_duration(uptime));
                    }
                }
                Ok(resp) => {
                    eprintln!("API returned error: {}", resp.status());
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("Cannot connect to slsframe API at {}", cli.api_url);
                    eprintln!("Error: {}", e);
                    eprintln!();
                    eprintln!("Make sure the slsframe API server is running:");
                    eprintln!("  cargo run --bin slsframe");
                    std::process::exit(1);
                }
            }
        }

        Commands::Pivot {
            path,
            capture,
            payload,
        } => {
            if !path.exists() {
                eprintln!("File not found: {:?}", path);
                std::process::exit(1);
            }

            let bytes = std::fs::read(&path).with_context(|| format!("Reading {:?}", path))?;
            let records =
                decode_records(&bytes).with_context(|| format!("Decoding records in {:?}", path))?;

            if let Some(capture) = &capture {
                write_records(capture, &records)
                    .await
                    .with_context(|| format!("Writing replay file {:?}", capture))?;
                eprintln!("{} records saved to {:?}", records.len(), capture);
            }
            let invocation =
                QueryInvocation::new("A", payload.to_json("*"), TimeWindow::last_hours(1));
            let payload = normalize(&invocation)?;

            let frame = build_frame(&invocation.ref_id, &payload, &records);
            if frame.meta.dropped_records > 0 {
                eprintln!(
                    "{} of {} records dropped (unparseable '{}')",
                    frame.meta.dropped_records,
                    records.len(),
                    payload.time_field
                );
            }

            print_frame(&frame, &cli.format)?;
        }

        Commands::Config { output } => {
            let config = slsframe::config::generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

fn parse_duration(s: &str) -> anyhow::Result<Duration> {
    let s = s.trim().to_lowercase();

    if let Some(minutes) = s.strip_suffix('m') {
        Ok(Duration::minutes(minutes.parse()?))
    } else if let Some(hours) = s.strip_suffix('h') {
        Ok(Duration::hours(hours.parse()?))
    } else if let Some(days) = s.strip_suffix('d') {
        Ok(Duration::days(days.parse()?))
    } else if let Some(weeks) = s.strip_suffix('w') {
        Ok(Duration::weeks(weeks.parse()?))
    } else {
        bail!("Invalid duration format: {}. Use: 15m, 1h, 7d, 2w", s)
    }
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}

fn print_frame(frame: &Frame, format: &str) -> anyhow::Result<()> {
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(frame)?),
        "csv" => print_csv(frame)?,
        _ => print_table(frame),
    }
    Ok(())
}

/// Render one cell; `None` marks a missing value
fn cell(values: &FieldValues, row: usize) -> Option<String> {
    match values {
        FieldValues::Time(v) => v.get(row).map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string()),
        FieldValues::Number(v) => v.get(row).copied().flatten().map(|n| n.to_string()),
        FieldValues::String(v) => v.get(row).cloned(),
    }
}

fn print_table(frame: &Frame) {
    if frame.shape() == FrameShape::Empty {
        println!(
            "{}: no data ({})",
            frame.name,
            frame.meta.notice.as_deref().unwrap_or("empty frame")
        );
        return;
    }

    if frame.rows() == 0 {
        println!("{}: no data for the selected time range", frame.name);
        return;
    }

    let widths: Vec<usize> = frame
        .fields
        .iter()
        .map(|field| {
            (0..frame.rows())
                .filter_map(|row| cell(&field.values, row))
                .map(|s| s.len())
                .chain(std::iter::once(field.name.len()))
                .max()
                .unwrap_or(1)
        })
        .collect();

    let header: Vec<String> = frame
        .fields
        .iter()
        .zip(&widths)
        .map(|(field, width)| format!("{:<width$}", field.name, width = width))
        .collect();
    println!("{}", header.join(" | "));
    println!("{}", "-".repeat(header.join(" | ").len()));

    for row in 0..frame.rows() {
        let line: Vec<String> = frame
            .fields
            .iter()
            .zip(&widths)
            .map(|(field, width)| {
                let value = cell(&field.values, row).unwrap_or_else(|| "-".to_string());
                format!("{:<width$}", value, width = width)
            })
            .collect();
        println!("{}", line.join(" | "));
    }
}

fn print_csv(frame: &Frame) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(std::io::stdout());

    writer.write_record(frame.field_names())?;
    for row in 0..frame.rows() {
        writer.write_record(
            frame
                .fields
                .iter()
                .map(|field| cell(&field.values, row).unwrap_or_default()),
        )?;
    }

    writer.flush()?;
    Ok(())
}
