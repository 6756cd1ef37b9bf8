use crate::cursor::Cursor;
use crate::error::DataLoadError;
use crate::portfolio::{format_change, format_currency, ChartPoint, Dashboard, View};
use crate::timeframe::Timeframe;
use crate::Settings;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Clear, Dataset, GraphType, Paragraph, Tabs, Wrap},
    Frame, Terminal,
};
use std::collections::HashSet;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::mpsc;
use tui_big_text::{BigText, PixelSize};

const GAIN_COLOR: Color = Color::Rgb(0x00, 0xC8, 0x05);
const LOSS_COLOR: Color = Color::Rgb(0xFF, 0x50, 0x00);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    Header,
    Chart,
    Timeframes,
    BuyingPower,
    Help,
}

impl Component {
    /// Returns all available components
    pub fn all() -> Vec<Component> {
        vec![
            Component::Header,
            Component::Chart,
            Component::Timeframes,
            Component::BuyingPower,
            Component::Help,
        ]
    }

    /// Returns the string representation of the component
    pub fn as_str(&self) -> &'static str {
        match self {
            Component::Header => "header",
            Component::Chart => "chart",
            Component::Timeframes => "timeframes",
            Component::BuyingPower => "buying_power",
            Component::Help => "help",
        }
    }

    /// Returns a description of what the component does
    pub fn description(&self) -> &'static str {
        match self {
            Component::Header => "Portfolio value with change and caption",
            Component::Chart => "Portfolio value chart for the selected timeframe",
            Component::Timeframes => "Timeframe selector",
            Component::BuyingPower => "Cash available after the investment",
            Component::Help => "Keyboard shortcuts",
        }
    }
}

impl FromStr for Component {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Component::all()
            .into_iter()
            .find(|c| c.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| format!("Unknown component: '{s}'"))
    }
}

impl std::fmt::Display for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct DisabledComponents {
    disabled: HashSet<Component>,
}

impl DisabledComponents {
    pub fn new(disabled_list: &[String]) -> Self {
        let mut disabled = HashSet::new();

        for component_str in disabled_list {
            match Component::from_str(component_str) {
                Ok(component) => {
                    disabled.insert(component);
                }
                Err(err) => tracing::warn!("{err}"),
            }
        }

        DisabledComponents { disabled }
    }

    pub fn is_disabled(&self, component: Component) -> bool {
        self.disabled.contains(&component)
    }
}

pub struct App {
    pub timeframe: Timeframe,
    pub dashboard: Option<Dashboard>,
    pub view: Option<View>,
    /// Index into `view.points` while a point is being inspected.
    pub inspected: Option<usize>,
    pub should_quit: bool,
    pub loading: bool,
    pub error_message: Option<String>,
    pub currency: String,
    pub symbol: String,
    pub dashboard_receiver: Option<mpsc::UnboundedReceiver<Result<Dashboard, DataLoadError>>>,
    pub disabled_components: DisabledComponents,
}

impl App {
    pub fn new(
        timeframe: Timeframe,
        currency: String,
        symbol: String,
        disabled_components: DisabledComponents,
    ) -> App {
        App {
            timeframe,
            dashboard: None,
            view: None,
            inspected: None,
            should_quit: false,
            loading: true,
            error_message: None,
            currency,
            symbol,
            dashboard_receiver: None,
            disabled_components,
        }
    }

    pub fn set_dashboard_receiver(
        &mut self,
        receiver: mpsc::UnboundedReceiver<Result<Dashboard, DataLoadError>>,
    ) {
        self.dashboard_receiver = Some(receiver);
    }

    pub fn try_receive_dashboard(&mut self) -> bool {
        let Some(receiver) = &mut self.dashboard_receiver else {
            return false;
        };
        let Ok(result) = receiver.try_recv() else {
            return false;
        };

        // a data load happens once per session
        self.dashboard_receiver = None;
        self.loading = false;
        match result {
            Ok(dashboard) => self.set_dashboard(dashboard),
            Err(e) => {
                tracing::error!("failed to load price data: {e}");
                self.error_message = Some(format!("Failed to load price data.\n{e}"));
            }
        }
        true
    }

    pub fn set_dashboard(&mut self, dashboard: Dashboard) {
        self.dashboard = Some(dashboard);
        self.loading = false;
        self.refresh_view();
    }

    fn refresh_view(&mut self) {
        let Some(dashboard) = &self.dashboard else {
            return;
        };
        self.inspected = None;
        match dashboard.view(self.timeframe) {
            Ok(view) => self.view = Some(view),
            Err(e) => {
                self.view = None;
                self.error_message = Some(e.to_string());
            }
        }
    }

    pub fn select_timeframe(&mut self, timeframe: Timeframe) {
        self.timeframe = timeframe;
        self.refresh_view();
    }

    pub fn next_timeframe(&mut self) {
        self.select_timeframe(self.timeframe.next());
    }

    pub fn previous_timeframe(&mut self) {
        self.select_timeframe(self.timeframe.previous());
    }

    /// Move the inspection to the next point; starts at the first point.
    pub fn inspect_next(&mut self) {
        let Some(view) = &self.view else {
            return;
        };
        let mut cursor = Cursor::at(&view.points, self.inspected.unwrap_or(usize::MAX));
        cursor.advance();
        self.inspected = cursor.current().map(|_| cursor.position());
    }

    /// Move the inspection to the previous point; starts at the last point.
    pub fn inspect_previous(&mut self) {
        let Some(view) = &self.view else {
            return;
        };
        let mut cursor = Cursor::at(&view.points, self.inspected.unwrap_or(usize::MAX));
        if self.inspected.is_some() {
            cursor.retreat();
        }
        self.inspected = cursor.current().map(|_| cursor.position());
    }

    pub fn stop_inspecting(&mut self) {
        self.inspected = None;
    }

    pub fn inspected_point(&self) -> Option<&ChartPoint> {
        let view = self.view.as_ref()?;
        view.points.get(self.inspected?)
    }

    pub fn is_gain(&self) -> bool {
        self.view
            .as_ref()
            .map(|v| !v.header.change.is_negative)
            .unwrap_or(true)
    }
}

pub async fn run_tui(path: PathBuf, settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let disabled = DisabledComponents::new(&settings.disabled_components);
    let mut app = App::new(
        settings.timeframe,
        settings.currency.clone(),
        settings.symbol.clone(),
        disabled,
    );

    // Load and simulate in the background, the screen shows a loading state meanwhile
    let (dashboard_sender, dashboard_receiver) = mpsc::unbounded_channel();
    app.set_dashboard_receiver(dashboard_receiver);

    tokio::spawn(async move {
        let result = crate::load_dashboard(&path, &settings).await;
        // receiver gone means the user already quit
        let _ = dashboard_sender.send(result);
    });

    let res = run_app(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()>
where
    io::Error: From<B::Error>,
{
    loop {
        terminal.draw(|f| ui(f, app))?;

        app.try_receive_dashboard();

        // Use poll to check for events with timeout
        if crossterm::event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') => app.should_quit = true,
                        KeyCode::Esc => {
                            if app.inspected.is_some() {
                                app.stop_inspecting();
                            } else {
                                app.should_quit = true;
                            }
                        }
                        KeyCode::Tab => app.next_timeframe(),
                        KeyCode::BackTab => app.previous_timeframe(),
                        KeyCode::Char('h') | KeyCode::Left => app.inspect_previous(),
                        KeyCode::Char('l') | KeyCode::Right => app.inspect_next(),
                        KeyCode::Char(c @ '1'..='7') => {
                            let index = c as usize - '1' as usize;
                            app.select_timeframe(Timeframe::all()[index]);
                        }
                        _ => {}
                    }
                }
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

fn ui(f: &mut Frame, app: &App) {
    match &app.view {
        Some(view) => render_screen(f, f.area(), app, view),
        None => render_loading(f, f.area(), app.loading),
    }

    if let Some(error) = &app.error_message {
        render_error_popup(f, error);
    }
}

fn render_screen(f: &mut Frame, area: Rect, app: &App, view: &View) {
    let disabled = &app.disabled_components;

    let mut sections = Vec::new();
    if !disabled.is_disabled(Component::Header) {
        sections.push((Component::Header, Constraint::Length(8)));
    }
    if !disabled.is_disabled(Component::Chart) {
        sections.push((Component::Chart, Constraint::Min(8)));
    }
    if !disabled.is_disabled(Component::Timeframes) {
        sections.push((Component::Timeframes, Constraint::Length(3)));
    }
    if !disabled.is_disabled(Component::BuyingPower) {
        sections.push((Component::BuyingPower, Constraint::Length(3)));
    }
    if !disabled.is_disabled(Component::Help) {
        sections.push((Component::Help, Constraint::Length(3)));
    }

    // If all components are disabled, show a placeholder
    if sections.is_empty() {
        let placeholder = Paragraph::new("All screen components are disabled")
            .block(Block::default().borders(Borders::ALL).title("Investing"))
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center);
        f.render_widget(placeholder, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(sections.iter().map(|(_, c)| *c).collect::<Vec<_>>())
        .split(area);

    for ((component, _), chunk) in sections.iter().zip(chunks.iter()) {
        match component {
            Component::Header => render_header(f, *chunk, app, view),
            Component::Chart => render_chart(f, *chunk, app, view),
            Component::Timeframes => render_timeframes(f, *chunk, app),
            Component::BuyingPower => render_buying_power(f, *chunk, app, view),
            Component::Help => render_help(f, *chunk),
        }
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App, view: &View) {
    // An inspected point replaces the headline with its own value
    let inspected = app.inspected_point().and_then(|point| {
        let dashboard = app.dashboard.as_ref()?;
        let change = dashboard.inspect(point).ok()?;
        Some((point.total_value, change, point.time_label.clone()))
    });
    let (value, change, caption) =
        inspected.unwrap_or((view.header.display_value, view.header.change, view.header.caption.clone()));

    let color = if change.is_negative {
        LOSS_COLOR
    } else {
        GAIN_COLOR
    };
    let value_text = format_currency(value, &app.currency);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Investing ({})", app.currency))
        .title_alignment(Alignment::Center);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let big_text = BigText::builder()
        .pixel_size(PixelSize::Quadrant)
        .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
        .lines(vec![value_text.into()])
        .build();
    f.render_widget(big_text, rows[0]);

    let change_line = Paragraph::new(format_change(&change, &app.currency))
        .style(Style::default().fg(color));
    f.render_widget(change_line, rows[1]);

    let caption_line = Paragraph::new(caption).style(Style::default().fg(Color::Gray));
    f.render_widget(caption_line, rows[2]);
}

fn render_chart(f: &mut Frame, area: Rect, app: &App, view: &View) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Portfolio value, {} ", view.timeframe));

    if view.points.is_empty() {
        let no_data = Paragraph::new("No price data available")
            .block(block)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(no_data, area);
        return;
    }

    let data: Vec<(f64, f64)> = view
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.total_value))
        .collect();
    let marker: Vec<(f64, f64)> = app
        .inspected
        .and_then(|i| data.get(i).copied())
        .into_iter()
        .collect();

    let max_x = (data.len().saturating_sub(1) as f64).max(1.0);
    let reference_value = app.dashboard.as_ref().map(|d| d.initial_balance());
    let reference: Vec<(f64, f64)> = reference_value
        .map(|v| vec![(0.0, v), (max_x, v)])
        .unwrap_or_default();
    let [min_y, max_y] = value_bounds(&data, reference_value);

    let line_color = if app.is_gain() {
        GAIN_COLOR
    } else {
        LOSS_COLOR
    };

    let datasets = vec![
        // initial balance reference, drawn under the value line
        Dataset::default()
            .marker(Marker::Dot)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::DarkGray))
            .data(&reference),
        Dataset::default()
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(line_color))
            .data(&data),
        Dataset::default()
            .marker(Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(Color::Yellow))
            .data(&marker),
    ];

    let first_label = view.points.first().map(|p| p.time_label.clone()).unwrap_or_default();
    let last_label = view.points.last().map(|p| p.time_label.clone()).unwrap_or_default();

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, max_x])
                .labels(vec![Span::raw(first_label), Span::raw(last_label)]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([min_y, max_y])
                .labels(vec![
                    Span::raw(format!("{min_y:.0}")),
                    Span::raw(format!("{max_y:.0}")),
                ]),
        );

    f.render_widget(chart, area);
}

/// y-axis bounds covering every value and the reference line, padded by 5%.
fn value_bounds(data: &[(f64, f64)], reference: Option<f64>) -> [f64; 2] {
    let values = data.iter().map(|(_, v)| *v).chain(reference);
    let (min_y, max_y) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    let padding = ((max_y - min_y) * 0.05).max(1.0);
    [min_y - padding, max_y + padding]
}

fn render_timeframes(f: &mut Frame, area: Rect, app: &App) {
    let selected_color = if app.is_gain() {
        GAIN_COLOR
    } else {
        LOSS_COLOR
    };
    let titles: Vec<Line> = Timeframe::all()
        .iter()
        .map(|t| {
            let style = if *t == app.timeframe {
                Style::default()
                    .fg(selected_color)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            Line::from(Span::styled(t.as_str(), style))
        })
        .collect();

    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(Style::default().fg(selected_color))
        .select(
            Timeframe::all()
                .iter()
                .position(|&t| t == app.timeframe)
                .unwrap_or(0),
        );

    f.render_widget(tabs, area);
}

fn render_buying_power(f: &mut Frame, area: Rect, app: &App, view: &View) {
    let mut spans = vec![
        Span::raw("Buying power  "),
        Span::styled(
            format_currency(view.header.buying_power, &app.currency),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ];
    let position = app
        .dashboard
        .as_ref()
        .and_then(|d| d.simulation().latest())
        .filter(|s| !s.is_simulated);
    if let Some(snapshot) = position {
        spans.push(Span::styled(
            format!(
                "   {:.2} {} shares worth {}",
                view.header.shares_held,
                app.symbol,
                format_currency(snapshot.stock_component, &app.currency)
            ),
            Style::default().fg(Color::Gray),
        ));
    }
    if let Some(sample) = app.dashboard.as_ref().and_then(|d| d.latest_price().current().copied()) {
        spans.push(Span::styled(
            format!("   {} {}", app.symbol, format_currency(sample.price, &app.currency)),
            Style::default().fg(Color::Gray),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    f.render_widget(paragraph, area);
}

fn render_help(f: &mut Frame, area: Rect) {
    let help_text = Paragraph::new(
        "Timeframe: Tab/Shift-Tab | 1-7 (direct) | Inspect: h/l | Esc (stop) | q (quit)",
    )
    .block(Block::default().borders(Borders::ALL).title("Help"))
    .style(Style::default().fg(Color::Gray))
    .alignment(Alignment::Center);

    f.render_widget(help_text, area);
}

fn render_loading(f: &mut Frame, area: Rect, loading: bool) {
    let text = if loading { "Loading..." } else { "No data" };
    let loading = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Investing"))
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center);

    f.render_widget(loading, area);
}

fn render_error_popup(f: &mut Frame, error: &str) {
    let popup_area = centered_rect(60, 20, f.area());
    f.render_widget(Clear, popup_area);

    let error_paragraph = Paragraph::new(error)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Error")
                .style(Style::default().fg(Color::Red)),
        )
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    f.render_widget(error_paragraph, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::Sample;
    use crate::simulation::InvestmentEvent;
    use chrono::{Duration as ChronoDuration, NaiveDate, NaiveDateTime};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use ratatui::backend::TestBackend;

    fn t0() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn dashboard() -> Dashboard {
        let samples: Vec<Sample> = (0..30)
            .map(|i| Sample {
                timestamp: t0() + ChronoDuration::days(i),
                price: 100.0 + (i % 7) as f64,
                volume: None,
            })
            .collect();
        let event = InvestmentEvent {
            investment_timestamp: t0() + ChronoDuration::days(14),
            investment_amount: 20000.0,
            initial_balance: 28731.62,
        };
        Dashboard::from_samples(
            samples,
            event,
            &mut StdRng::seed_from_u64(5),
            t0() + ChronoDuration::days(29),
            t0(),
        )
    }

    fn loaded_app() -> App {
        let mut app = App::new(
            Timeframe::All,
            "USD".to_string(),
            "NVDA".to_string(),
            DisabledComponents::default(),
        );
        app.set_dashboard(dashboard());
        app
    }

    #[test]
    fn test_components_parse() {
        let disabled = DisabledComponents::new(&[
            "chart".to_string(),
            " HELP ".to_string(),
            "sidebar".to_string(),
        ]);
        assert!(disabled.is_disabled(Component::Chart));
        assert!(disabled.is_disabled(Component::Help));
        assert!(!disabled.is_disabled(Component::Header));
        for component in Component::all() {
            assert_eq!(component.to_string().parse::<Component>(), Ok(component));
            assert!(!component.description().is_empty());
        }
    }

    #[test]
    fn test_select_timeframe_rewindows() {
        let mut app = loaded_app();
        assert_eq!(app.view.as_ref().unwrap().points.len(), 30);

        app.select_timeframe(Timeframe::OneWeek);
        let view = app.view.as_ref().unwrap();
        assert_eq!(view.timeframe, Timeframe::OneWeek);
        assert_eq!(view.points.len(), 8);

        app.next_timeframe();
        assert_eq!(app.timeframe, Timeframe::OneMonth);
        app.previous_timeframe();
        app.previous_timeframe();
        assert_eq!(app.timeframe, Timeframe::OneDay);
    }

    #[test]
    fn test_inspection_cursor() {
        let mut app = loaded_app();
        app.inspect_next();
        assert_eq!(app.inspected, Some(0));
        app.inspect_previous();
        assert_eq!(app.inspected, Some(29));

        app.stop_inspecting();
        app.inspect_previous();
        assert_eq!(app.inspected, Some(29));
        assert_eq!(
            app.inspected_point().map(|p| p.total_value),
            app.view.as_ref().unwrap().points.last().map(|p| p.total_value)
        );

        // changing timeframe drops the inspection
        app.select_timeframe(Timeframe::OneWeek);
        assert_eq!(app.inspected, None);
    }

    #[test]
    fn test_receive_load_error() {
        let mut app = App::new(
            Timeframe::All,
            "USD".to_string(),
            "NVDA".to_string(),
            DisabledComponents::default(),
        );
        let (sender, receiver) = mpsc::unbounded_channel();
        app.set_dashboard_receiver(receiver);
        assert!(!app.try_receive_dashboard());

        sender.send(Err(DataLoadError::MissingHeader)).unwrap();
        assert!(app.try_receive_dashboard());
        assert!(!app.loading);
        assert!(app.view.is_none());
        assert!(app.error_message.as_ref().unwrap().contains("no header"));
    }

    #[test]
    fn test_receive_dashboard() {
        let mut app = App::new(
            Timeframe::OneWeek,
            "USD".to_string(),
            "NVDA".to_string(),
            DisabledComponents::default(),
        );
        let (sender, receiver) = mpsc::unbounded_channel();
        app.set_dashboard_receiver(receiver);
        sender.send(Ok(dashboard())).unwrap();

        assert!(app.try_receive_dashboard());
        assert!(app.error_message.is_none());
        assert_eq!(app.view.as_ref().unwrap().timeframe, Timeframe::OneWeek);
    }

    #[test]
    fn test_render_screen() {
        let mut app = loaded_app();
        app.inspect_next();
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| ui(f, &app)).unwrap();

        let buffer = terminal.backend().buffer().clone();
        let content: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(content.contains("Buying power"));
        assert!(content.contains("YTD"));
    }

    #[test]
    fn test_value_bounds_include_reference() {
        let data = vec![(0.0, 1010.0), (1.0, 1050.0)];
        let [low, high] = value_bounds(&data, Some(1000.0));
        // range 1000..1050 padded by 2.5 each side
        assert!((low - 997.5).abs() < 1e-9);
        assert!((high - 1052.5).abs() < 1e-9);

        let [low, high] = value_bounds(&data, None);
        assert!((low - 1008.0).abs() < 1e-9);
        assert!((high - 1052.0).abs() < 1e-9);

        // flat series still gets a visible range
        let [low, high] = value_bounds(&[(0.0, 500.0)], Some(500.0));
        assert_eq!([low, high], [499.0, 501.0]);
    }

    #[test]
    fn test_render_loading_and_error() {
        let mut app = App::new(
            Timeframe::All,
            "USD".to_string(),
            "NVDA".to_string(),
            DisabledComponents::default(),
        );
        app.error_message = Some("Failed to load price data.".to_string());
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| ui(f, &app)).unwrap();

        let buffer = terminal.backend().buffer().clone();
        let content: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(content.contains("Loading..."));
        assert!(content.contains("Error"));
    }
}
