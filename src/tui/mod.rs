//! Ratatui-based terminal UI.
//!
//! The TUI renders the aggregated daily-revenue series as a line chart with
//! a region selector and a vertical marker on the known price-change date.
//! It is a pure consumer of the query engine: every key event that changes
//! the filter triggers one synchronous `query` call, so the latest selection
//! always supersedes prior results.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};

use crate::domain::{RegionFilter, SeriesPoint};
use crate::error::AppError;
use crate::query::{self, SalesTable, series_total};

mod plotters_chart;

use plotters_chart::SalesChart;

/// Date of the known price increase, drawn as a vertical marker.
///
/// Purely a presentation annotation: the query engine does not know about it.
fn price_change_date() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(2021, 1, 15)
}

/// Start the TUI.
///
/// The snapshot is loaded before the terminal is touched: it is better to
/// fail loudly at startup than to serve an empty chart from a bad snapshot.
pub fn run(snapshot_path: PathBuf, region: RegionFilter) -> Result<(), AppError> {
    let mut app = App::new(snapshot_path, region)?;

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::Runtime(format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Restores the terminal (raw mode, alternate screen) when dropped, even on
/// an error path.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::Runtime(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::Runtime(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    snapshot_path: PathBuf,
    region: RegionFilter,
    table: SalesTable,
    series: Vec<SeriesPoint>,
    status: String,
}

impl App {
    fn new(snapshot_path: PathBuf, region: RegionFilter) -> Result<Self, AppError> {
        let table = SalesTable::load(&snapshot_path)?;
        let series = query::query(&table, region);
        let status = format!("Loaded {} rows from {}", table.len(), snapshot_path.display());
        Ok(Self {
            snapshot_path,
            region,
            table,
            series,
            status,
        })
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::Runtime(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            // Poll with a short timeout so resize events keep the UI fresh
            // without busy-looping.
            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::Runtime(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::Runtime(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Left | KeyCode::Up => self.set_region(self.region.prev()),
            KeyCode::Right | KeyCode::Down => self.set_region(self.region.next()),
            KeyCode::Char('a') => self.set_region(RegionFilter::All),
            KeyCode::Char('n') => self.set_region(RegionFilter::North),
            KeyCode::Char('e') => self.set_region(RegionFilter::East),
            KeyCode::Char('s') => self.set_region(RegionFilter::South),
            KeyCode::Char('w') => self.set_region(RegionFilter::West),
            KeyCode::Char('r') => self.reload(),
            _ => {}
        }
        false
    }

    fn set_region(&mut self, region: RegionFilter) {
        self.region = region;
        self.requery();
        self.status = format!("region: {}", region.display_name());
    }

    fn requery(&mut self) {
        self.series = query::query(&self.table, self.region);
    }

    /// Reload the snapshot. The new table replaces the old one only when the
    /// load succeeds; otherwise the previous table keeps serving.
    fn reload(&mut self) {
        match SalesTable::load(&self.snapshot_path) {
            Ok(table) => {
                self.table = table;
                self.requery();
                self.status = format!("Reloaded {} rows.", self.table.len());
            }
            Err(err) => {
                self.status = format!("Reload failed: {err}");
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("sales", Style::default().fg(Color::Cyan)),
            Span::raw(" — daily revenue by region"),
        ]));

        let range = self
            .table
            .date_range()
            .map(|(first, last)| format!("{first} → {last}"))
            .unwrap_or_else(|| "-".to_string());

        lines.push(Line::from(Span::styled(
            format!(
                "snapshot: {} | rows: {} | dates: {range}",
                self.snapshot_path.display(),
                self.table.len(),
            ),
            Style::default().fg(Color::Gray),
        )));

        lines.push(Line::from(Span::styled(
            format!(
                "region: {} | points: {} | total: {:.2}",
                self.region.display_name(),
                self.series.len(),
                series_total(&self.series),
            ),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(7)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_regions(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Daily Revenue").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(data) = chart_series(&self.series) else {
            let msg = Paragraph::new(format!(
                "No rows for {} in the snapshot.",
                self.region.display_name()
            ))
            .style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let widget = SalesChart {
            line: &data.line,
            marker_x: data.marker_x,
            x_bounds: data.x_bounds,
            y_bounds: data.y_bounds,
            epoch: data.epoch,
        };
        frame.render_widget(widget, inner);

        if let Some(marker_x) = data.marker_x {
            draw_marker_label(frame, inner, data.x_bounds, marker_x);
        }
    }

    fn draw_regions(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = RegionFilter::ALL
            .iter()
            .map(|r| ListItem::new(r.display_name()))
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Region").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let selected = RegionFilter::ALL.iter().position(|r| *r == self.region);
        let mut state = ratatui::widgets::ListState::default();
        state.select(selected);
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "←/→ region  a/n/e/s/w select  r reload  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Chart-ready view of a series: day offsets on x, revenue on y.
struct ChartData {
    line: Vec<(f64, f64)>,
    /// Day offset of the price-change marker, when it falls inside the range.
    marker_x: Option<f64>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    epoch: NaiveDate,
}

/// Build chart series for Plotters. Returns `None` for an empty series.
fn chart_series(series: &[SeriesPoint]) -> Option<ChartData> {
    let first = series.first()?;
    let last = series.last()?;
    let epoch = first.date;

    let line: Vec<(f64, f64)> = series
        .iter()
        .map(|p| (day_offset(epoch, p.date), p.total_sales))
        .collect();

    // A single-point series still needs a non-degenerate span.
    let span = day_offset(epoch, last.date).max(1.0);
    let x_bounds = [0.0, span];

    // Revenue plots from a zero baseline so filter changes compare visually.
    let y_max = series
        .iter()
        .map(|p| p.total_sales)
        .fold(f64::NEG_INFINITY, f64::max);
    let y_max = if y_max.is_finite() && y_max > 0.0 { y_max } else { 1.0 };
    let y_bounds = [0.0, y_max * 1.05];

    let marker_x = price_change_date()
        .map(|d| day_offset(epoch, d))
        .filter(|x| *x >= x_bounds[0] && *x <= x_bounds[1]);

    Some(ChartData {
        line,
        marker_x,
        x_bounds,
        y_bounds,
        epoch,
    })
}

fn day_offset(epoch: NaiveDate, date: NaiveDate) -> f64 {
    (date - epoch).num_days() as f64
}

/// Label the price-change marker near the top of the chart.
///
/// The horizontal position mirrors the plot mapping inside `SalesChart`
/// (left label area + margin), which lines up with the vertical marker
/// closely enough on a terminal grid.
fn draw_marker_label(frame: &mut ratatui::Frame<'_>, inner: Rect, x_bounds: [f64; 2], marker_x: f64) {
    const LEFT_INSET: u16 = 9;
    const RIGHT_INSET: u16 = 1;

    let label = "price increase";
    let label_len = label.len() as u16;

    let span = x_bounds[1] - x_bounds[0];
    if span <= 0.0
        || inner.width <= LEFT_INSET + RIGHT_INSET + 2
        || inner.width <= label_len
        || inner.height < 3
    {
        return;
    }

    let plot_width = inner.width - LEFT_INSET - RIGHT_INSET;
    let u = (marker_x - x_bounds[0]) / span;
    let x = inner.x + LEFT_INSET + ((plot_width - 1) as f64 * u).round() as u16;

    let max_start = (inner.x + inner.width).saturating_sub(label_len);
    let start = x.saturating_sub(label_len / 2).clamp(inner.x, max_start);

    frame.render_widget(
        Paragraph::new(label).style(Style::default().fg(Color::Red)),
        Rect {
            x: start,
            y: inner.y,
            width: label_len,
            height: 1,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(day: u32, total: f64) -> SeriesPoint {
        SeriesPoint {
            date: NaiveDate::from_ymd_opt(2021, 1, day).unwrap(),
            total_sales: total,
        }
    }

    #[test]
    fn empty_series_has_no_chart() {
        assert!(chart_series(&[]).is_none());
    }

    #[test]
    fn marker_appears_only_inside_the_plotted_range() {
        let covering = chart_series(&[point(10, 5.0), point(20, 6.0)]).unwrap();
        assert_eq!(covering.marker_x, Some(5.0));

        let after_change = chart_series(&[point(16, 5.0), point(20, 6.0)]).unwrap();
        assert!(after_change.marker_x.is_none());
    }

    #[test]
    fn single_point_series_gets_a_non_degenerate_span() {
        let data = chart_series(&[point(10, 5.0)]).unwrap();
        assert!(data.x_bounds[1] > data.x_bounds[0]);
    }

    #[test]
    fn y_bounds_start_at_zero() {
        let data = chart_series(&[point(10, 5.0), point(11, 20.0)]).unwrap();
        assert_eq!(data.y_bounds[0], 0.0);
        assert!(data.y_bounds[1] >= 20.0);
    }
}
