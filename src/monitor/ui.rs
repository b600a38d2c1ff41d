//! Rendering of the monitor screen.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table},
    Frame,
};

use super::app::{App, Status};

const SSID_WIDTH: usize = 40;
const SERIES_COLORS: [Color; 8] = [
    Color::Cyan,
    Color::Yellow,
    Color::Green,
    Color::Magenta,
    Color::Red,
    Color::Blue,
    Color::LightCyan,
    Color::LightYellow,
];

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Tables and graph
            Constraint::Length(1), // Key hints
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);

    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);

    let tables = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(main[0]);
    render_access_points(frame, app, tables[0]);
    render_stations(frame, app, tables[1]);

    let graph = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(3)])
        .split(main[1]);
    render_channel_graph(frame, app, graph[0]);
    frame.render_widget(
        Paragraph::new(app.channel_summary()).block(Block::default().borders(Borders::ALL)),
        graph[1],
    );

    frame.render_widget(
        Paragraph::new("s: start  x: stop  q: quit").style(Style::default().fg(Color::DarkGray)),
        chunks[2],
    );
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let status_style = match app.status {
        Status::Error(_) => Style::default().fg(Color::Red),
        Status::Ok { degraded: true } => Style::default().fg(Color::Yellow),
        _ => Style::default().fg(Color::Green),
    };

    let line = Line::from(vec![
        Span::styled(
            " Passive Wi-Fi monitor ",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("| interface: {} ", app.interface)),
        Span::raw(format!("| worker: {} ", app.worker)),
        Span::raw("| "),
        Span::styled(app.status_text(), status_style),
    ]);
    frame.render_widget(
        Paragraph::new(line).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

fn header_row<'a>(titles: &[&'a str]) -> Row<'a> {
    Row::new(titles.iter().map(|t| Cell::from(*t)))
        .style(Style::default().add_modifier(Modifier::BOLD))
}

fn render_access_points(frame: &mut Frame, app: &App, area: Rect) {
    let rows = app.access_points.iter().map(|ap| {
        Row::new(vec![
            Cell::from(ap.bssid.clone()),
            Cell::from(ap.channel.clone()),
            Cell::from(truncate(&ap.ssid, SSID_WIDTH)),
            Cell::from(ap.power.clone()),
        ])
    });
    let table = Table::new(
        rows,
        [
            Constraint::Length(18),
            Constraint::Length(5),
            Constraint::Min(12),
            Constraint::Length(6),
        ],
    )
    .header(header_row(&["BSSID", "Chan", "SSID", "Power"]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Access Points ({})", app.access_points.len())),
    );
    frame.render_widget(table, area);
}

fn render_stations(frame: &mut Frame, app: &App, area: Rect) {
    let rows = app.stations.iter().map(|st| {
        Row::new(vec![
            Cell::from(st.station.clone()),
            Cell::from(st.bssid.clone()),
            Cell::from(st.power.clone()),
        ])
    });
    let table = Table::new(
        rows,
        [
            Constraint::Length(18),
            Constraint::Min(18),
            Constraint::Length(6),
        ],
    )
    .header(header_row(&["Station", "Associated BSSID", "Power"]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Stations ({})", app.stations.len())),
    );
    frame.render_widget(table, area);
}

fn render_channel_graph(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Channel Utilization (AP count per channel)");

    if app.history.is_empty() {
        frame.render_widget(Paragraph::new("no samples yet").block(block), area);
        return;
    }

    // Every series spans the whole history so colors and x positions stay stable across redraws.
    let series: Vec<(String, Vec<(f64, f64)>)> = app
        .history
        .channels()
        .into_iter()
        .map(|channel| {
            let points = app
                .history
                .series(&channel)
                .into_iter()
                .enumerate()
                .map(|(x, y)| (x as f64, y as f64))
                .collect();
            (channel, points)
        })
        .collect();

    let datasets = series
        .iter()
        .enumerate()
        .map(|(i, (channel, points))| {
            Dataset::default()
                .name(channel.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(SERIES_COLORS[i % SERIES_COLORS.len()]))
                .data(points)
        })
        .collect::<Vec<_>>();

    let max_x = (app.history.len().saturating_sub(1)).max(1) as f64;
    let max_y = app.history.peak().max(1) as f64;
    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .title("samples (new -> right)")
                .bounds([0.0, max_x])
                .labels(vec![Span::raw("0"), Span::raw(format!("{max_x}"))]),
        )
        .y_axis(
            Axis::default()
                .title("AP count")
                .bounds([0.0, max_y])
                .labels(vec![Span::raw("0"), Span::raw(format!("{max_y}"))]),
        );
    frame.render_widget(chart, area);
}
