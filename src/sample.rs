//! Loading of the raw price series.
//!
//! Two CSV shapes are understood: a cleaned `timestamp,price` file and the
//! intraday `timestamp,open,high,low,close,volume` export. Rows that do not
//! parse are dropped, the rest are sorted and floored at the display start.

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};

use crate::error::DataLoadError;

/// One observed price point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub timestamp: NaiveDateTime,
    pub price: f64,
    pub volume: Option<u64>,
}

/// Column positions resolved from the header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    timestamp: usize,
    price: usize,
    volume: Option<usize>,
}

// Positions used by the intraday export when names can't be matched
const INTRADAY_TIMESTAMP: usize = 0;
const INTRADAY_CLOSE: usize = 4;
const INTRADAY_VOLUME: usize = 5;

impl Columns {
    fn detect(headers: &StringRecord) -> Result<Columns, DataLoadError> {
        let names: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();

        if names.iter().all(|n| n.is_empty()) {
            return Err(DataLoadError::MissingHeader);
        }
        // a first row that already carries a timestamp is data, not a header
        if names.first().and_then(|n| parse_timestamp(n)).is_some() {
            return Err(DataLoadError::MissingHeader);
        }

        let find = |candidates: &[&str]| {
            candidates
                .iter()
                .find_map(|c| names.iter().position(|n| n == c))
        };

        let timestamp = find(&["timestamp", "date", "datetime", "time"]);
        let price = find(&["price", "close"]);
        let volume = find(&["volume"]);

        match (timestamp, price) {
            (Some(timestamp), Some(price)) => Ok(Columns {
                timestamp,
                price,
                volume,
            }),
            _ if names.len() > INTRADAY_CLOSE => Ok(Columns {
                timestamp: INTRADAY_TIMESTAMP,
                price: INTRADAY_CLOSE,
                volume: (names.len() > INTRADAY_VOLUME).then_some(INTRADAY_VOLUME),
            }),
            _ => Err(DataLoadError::MalformedHeader(names.join(","))),
        }
    }
}

/// Parse a timestamp in any of the forms the price exports use.
///
/// RFC 3339 values keep their UTC wall clock; everything else is taken as-is.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    for format in [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn parse_row(record: &StringRecord, columns: &Columns) -> Option<Sample> {
    let timestamp = parse_timestamp(record.get(columns.timestamp)?)?;
    let price = record
        .get(columns.price)?
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p > 0.0)?;
    let volume = columns
        .volume
        .and_then(|i| record.get(i))
        .and_then(|v| v.parse::<u64>().ok());

    Some(Sample {
        timestamp,
        price,
        volume,
    })
}

/// Parse CSV text into samples sorted by time, none earlier than `display_start`.
pub fn parse_samples(
    text: &str,
    display_start: NaiveDateTime,
) -> Result<Vec<Sample>, DataLoadError> {
    if text.trim().is_empty() {
        return Err(DataLoadError::Empty);
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|_| DataLoadError::MissingHeader)?
        .clone();
    let columns = Columns::detect(&headers)?;

    let mut samples = Vec::new();
    let mut dropped = 0usize;

    for result in reader.records() {
        match result.ok().as_ref().and_then(|r| parse_row(r, &columns)) {
            Some(sample) => samples.push(sample),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        tracing::debug!(dropped, kept = samples.len(), "dropped malformed price rows");
    }

    samples.sort_by_key(|s| s.timestamp);
    samples.retain(|s| s.timestamp >= display_start);

    Ok(samples)
}

/// Read a CSV file and parse it, see [`parse_samples`].
pub async fn load_samples(
    path: &Path,
    display_start: NaiveDateTime,
) -> Result<Vec<Sample>, DataLoadError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| DataLoadError::Unreachable {
            path: path.to_path_buf(),
            source,
        })?;
    let samples = parse_samples(&text, display_start)?;
    tracing::info!(path = %path.display(), count = samples.len(), "loaded price samples");
    Ok(samples)
}

/// Moves between consecutive samples larger than this, in percent, are reported.
pub const JUMP_THRESHOLD_PERCENT: f64 = 5.0;

/// Summary statistics of the prices in a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceStats {
    pub average: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

/// A move between two consecutive samples beyond [`JUMP_THRESHOLD_PERCENT`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceJump {
    pub timestamp: NaiveDateTime,
    pub previous_price: f64,
    pub price: f64,
    pub percent: f64,
}

/// Data-quality overview of a loaded series.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QualityReport {
    pub count: usize,
    /// `None` for an empty series.
    pub stats: Option<PriceStats>,
    pub jumps: Vec<PriceJump>,
}

pub fn quality_report(samples: &[Sample]) -> QualityReport {
    if samples.is_empty() {
        return QualityReport::default();
    }

    let mut prices: Vec<f64> = samples.iter().map(|s| s.price).collect();
    let average = prices.iter().sum::<f64>() / prices.len() as f64;
    prices.sort_by(|a, b| a.total_cmp(b));
    // upper median for even counts
    let median = prices[prices.len() / 2];

    let jumps = samples
        .windows(2)
        .filter(|pair| pair[0].price > 0.0)
        .map(|pair| PriceJump {
            timestamp: pair[1].timestamp,
            previous_price: pair[0].price,
            price: pair[1].price,
            percent: (pair[1].price - pair[0].price) / pair[0].price * 100.0,
        })
        .filter(|jump| jump.percent.abs() > JUMP_THRESHOLD_PERCENT)
        .collect();

    QualityReport {
        count: samples.len(),
        stats: Some(PriceStats {
            average,
            median,
            min: prices[0],
            max: prices[prices.len() - 1],
        }),
        jumps,
    }
}

impl QualityReport {
    pub fn print(&self) {
        use comfy_table::{presets::UTF8_FULL, Attribute, Cell, CellAlignment, Color, Table};

        let Some(stats) = self.stats else {
            println!("No valid price data found");
            return;
        };

        let mut summary = Table::new();
        summary.load_preset(UTF8_FULL);
        summary.set_header(vec![
            Cell::new("Points").add_attribute(Attribute::Bold),
            Cell::new("Average").add_attribute(Attribute::Bold),
            Cell::new("Median").add_attribute(Attribute::Bold),
            Cell::new("Min").add_attribute(Attribute::Bold),
            Cell::new("Max").add_attribute(Attribute::Bold),
        ]);
        summary.add_row(vec![
            Cell::new(self.count).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", stats.average)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", stats.median)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", stats.min)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", stats.max)).set_alignment(CellAlignment::Right),
        ]);
        println!("{summary}");

        if self.jumps.is_empty() {
            return;
        }

        println!(
            "Found {} price moves larger than {JUMP_THRESHOLD_PERCENT}%:",
            self.jumps.len()
        );
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec![
            Cell::new("Time").add_attribute(Attribute::Bold),
            Cell::new("Change").add_attribute(Attribute::Bold),
            Cell::new("From").add_attribute(Attribute::Bold),
            Cell::new("To").add_attribute(Attribute::Bold),
        ]);
        for jump in &self.jumps {
            let color = if jump.percent < 0.0 {
                Color::Red
            } else {
                Color::Green
            };
            table.add_row(vec![
                Cell::new(jump.timestamp.format("%Y-%m-%d %H:%M")),
                Cell::new(format!("{:+.2}%", jump.percent))
                    .set_alignment(CellAlignment::Right)
                    .fg(color),
                Cell::new(format!("{:.2}", jump.previous_price)).set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.2}", jump.price)).set_alignment(CellAlignment::Right),
            ]);
        }
        println!("{table}");
    }
}
