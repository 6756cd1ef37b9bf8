use chrono::NaiveDateTime;
use colored::Colorize;
use rand::Rng;
use serde::Serialize;

use crate::change::{window_change, Change};
use crate::cursor::Cursor;
use crate::error::ChangeError;
use crate::sample::Sample;
use crate::simulation::{simulate, InvestmentEvent, PortfolioSnapshot, Simulation};
use crate::timeframe::Timeframe;
use crate::window::select_window;

/// One point handed to the chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub timestamp: NaiveDateTime,
    pub time_label: String,
    pub total_value: f64,
    pub cash_value: f64,
    pub stock_value: f64,
    pub stock_price: f64,
    pub volume: Option<u64>,
    pub is_simulated: bool,
}

impl ChartPoint {
    fn from_snapshot(snapshot: &PortfolioSnapshot, timeframe: Timeframe) -> ChartPoint {
        ChartPoint {
            timestamp: snapshot.timestamp,
            time_label: snapshot
                .timestamp
                .format(timeframe.label_format())
                .to_string(),
            total_value: snapshot.total_value,
            cash_value: snapshot.cash_component,
            stock_value: snapshot.stock_component,
            stock_price: snapshot.stock_price,
            volume: snapshot.volume,
            is_simulated: snapshot.is_simulated,
        }
    }
}

/// Values shown above the chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    pub display_value: f64,
    pub change: Change,
    pub caption: String,
    pub buying_power: f64,
    pub shares_held: f64,
}

/// Everything a screen needs for one timeframe.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct View {
    pub timeframe: Timeframe,
    pub header: Header,
    pub points: Vec<ChartPoint>,
}

/// A simulated portfolio history plus the fixed reference instants used to
/// window it. Built once per data load; only [`Dashboard::view`] runs again
/// when the timeframe changes.
#[derive(Debug)]
pub struct Dashboard {
    samples: Vec<Sample>,
    simulation: Simulation,
    now: NaiveDateTime,
    display_start: NaiveDateTime,
}

impl Dashboard {
    pub fn from_samples<R: Rng + ?Sized>(
        samples: Vec<Sample>,
        event: InvestmentEvent,
        rng: &mut R,
        now: NaiveDateTime,
        display_start: NaiveDateTime,
    ) -> Self {
        let simulation = simulate(&samples, event, rng);
        Dashboard {
            samples,
            simulation,
            now,
            display_start,
        }
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    /// Cursor on the most recent price sample.
    pub fn latest_price(&self) -> Cursor<'_, Sample> {
        Cursor::last(&self.samples)
    }

    pub fn initial_balance(&self) -> f64 {
        self.simulation.event.initial_balance
    }

    pub fn view(&self, timeframe: Timeframe) -> Result<View, ChangeError> {
        let window = select_window(
            &self.simulation.snapshots,
            timeframe,
            self.now,
            self.display_start,
        );

        let event = &self.simulation.event;
        // before the investment the headline stays on the untouched balance,
        // the change still follows the simulated window
        let display_value = if self.simulation.is_invested() {
            window
                .last()
                .map(|s| s.total_value)
                .unwrap_or(event.initial_balance)
        } else {
            event.initial_balance
        };
        let change = window_change(&window, timeframe, event.initial_balance)?;
        let caption = timeframe.caption().to_string();

        let points = window
            .iter()
            .map(|s| ChartPoint::from_snapshot(s, timeframe))
            .collect();

        Ok(View {
            timeframe,
            header: Header {
                display_value,
                change,
                caption,
                buying_power: self.simulation.buying_power(),
                shares_held: self.simulation.shares_held,
            },
            points,
        })
    }

    /// Readout for a single inspected point, measured from the initial balance.
    pub fn inspect(&self, point: &ChartPoint) -> Result<Change, ChangeError> {
        Change::between(self.initial_balance(), point.total_value)
    }
}

pub fn format_with_commas(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (integer_part, decimal_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let formatted_integer = integer_part
        .chars()
        .rev()
        .collect::<Vec<_>>()
        .chunks(3)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(",")
        .chars()
        .rev()
        .collect::<String>();

    let sign = if value < 0.0 && formatted != "0.00" { "-" } else { "" };
    format!("{sign}{formatted_integer}.{decimal_part}")
}

pub fn format_currency(value: f64, currency: &str) -> String {
    let number = format_with_commas(value);
    match currency {
        "USD" | "CAD" | "AUD" | "HKD" | "SGD" => format!("${number}"),
        "EUR" => format!("{number} €"),
        "GBP" => format!("£{number}"),
        _ => format!("{number} {currency}"),
    }
}

/// `↑ $1,234.56 (4.49%)`, magnitudes only, the arrow carries the sign.
pub fn format_change(change: &Change, currency: &str) -> String {
    let arrow = if change.is_negative { "↓" } else { "↑" };
    format!(
        "{arrow} {} ({:.2}%)",
        format_currency(change.absolute.abs(), currency),
        change.percent.abs()
    )
}

impl View {
    // Print the windowed points as a table
    pub fn print(&self, currency: &str) {
        use comfy_table::{
            presets::UTF8_FULL, Attribute, Cell, CellAlignment, Color as TColor,
            ContentArrangement, Table,
        };

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_width(120);

        table.set_header(vec![
            Cell::new("Time").add_attribute(Attribute::Bold),
            Cell::new("Price").add_attribute(Attribute::Bold),
            Cell::new("Volume").add_attribute(Attribute::Bold),
            Cell::new("Cash").add_attribute(Attribute::Bold),
            Cell::new("Stock").add_attribute(Attribute::Bold),
            Cell::new("Total").add_attribute(Attribute::Bold),
        ]);

        for point in &self.points {
            let total_color = if point.is_simulated {
                TColor::DarkGrey
            } else {
                TColor::White
            };
            let stock = if point.is_simulated {
                "-".to_string()
            } else {
                format_with_commas(point.stock_value)
            };

            table.add_row(vec![
                Cell::new(&point.time_label),
                Cell::new(format!("{:.2}", point.stock_price)).set_alignment(CellAlignment::Right),
                Cell::new(point.volume.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string()))
                    .set_alignment(CellAlignment::Right),
                Cell::new(format_with_commas(point.cash_value)).set_alignment(CellAlignment::Right),
                Cell::new(stock).set_alignment(CellAlignment::Right),
                Cell::new(format_currency(point.total_value, currency))
                    .set_alignment(CellAlignment::Right)
                    .fg(total_color),
            ]);
        }

        println!("{table}");
        self.print_summary(currency);
    }

    pub fn print_summary(&self, currency: &str) {
        let header = &self.header;
        let change = format_change(&header.change, currency);
        let change = if header.change.is_negative {
            change.red()
        } else {
            change.green()
        };

        println!(
            "{} {}",
            format_currency(header.display_value, currency).bold(),
            change
        );
        println!("{} [{}]", header.caption.dimmed(), self.timeframe);
        println!(
            "Buying power: {}  Shares: {:.2}",
            format_currency(header.buying_power, currency),
            header.shares_held
        );
    }
}
