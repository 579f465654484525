//! Plotters-backed chart widget for the revenue view.
//!
//! Ratatui ships its own `Chart` widget, but Plotters gives us proper axis
//! ticks and label formatting for far less code, and the same chart
//! description can later be reused with a PNG/SVG backend. Output lands in
//! the terminal buffer through `plotters-ratatui-backend`.

use chrono::NaiveDate;
use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A render-only description of the revenue chart.
///
/// All series and bounds are computed by the caller; `render()` only draws.
/// X values are day offsets from `epoch` so the plot stays in plain `f64`
/// coordinates while tick labels show calendar dates.
pub struct SalesChart<'a> {
    /// Aggregated daily revenue, ascending by x.
    pub line: &'a [(f64, f64)],
    /// X position of the price-change marker, when inside the plotted range.
    pub marker_x: Option<f64>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    /// Date corresponding to `x = 0`.
    pub epoch: NaiveDate,
}

impl Widget for SalesChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters can fail to lay out a chart in a tiny drawing area; show a
        // hint instead of panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite())
            || x1 <= x0
            || y1 <= y0
        {
            return;
        }

        let epoch = self.epoch;
        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res; keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 8)
                .set_label_area_size(LabelAreaPosition::Bottom, 2)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            // Mesh lines are visual noise at terminal resolution; axes plus a
            // handful of date/amount ticks are enough.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| fmt_date(epoch, *v))
                .y_label_formatter(&|v| format!("{v:.0}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .draw()?;

            // Revenue line, then one dot per aggregated day on top of it.
            let line_color = RGBColor(0, 255, 255);
            chart.draw_series(LineSeries::new(self.line.iter().copied(), &line_color))?;
            chart.draw_series(self.line.iter().map(|&(x, y)| Pixel::new((x, y), WHITE)))?;

            // Vertical marker on the price-change date, full plot height.
            if let Some(mx) = self.marker_x {
                let marker_color = RGBColor(255, 0, 0);
                chart.draw_series(LineSeries::new(
                    [(mx, y0), (mx, y1)].into_iter(),
                    &marker_color,
                ))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

/// Render an x tick (day offset from `epoch`) as a short date.
fn fmt_date(epoch: NaiveDate, offset: f64) -> String {
    (epoch + chrono::Duration::days(offset.round() as i64))
        .format("%b %d")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_show_calendar_dates() {
        let epoch = NaiveDate::from_ymd_opt(2021, 1, 10).unwrap();
        assert_eq!(fmt_date(epoch, 0.0), "Jan 10");
        assert_eq!(fmt_date(epoch, 5.0), "Jan 15");
        assert_eq!(fmt_date(epoch, 21.6), "Feb 01");
    }
}
