//! Chart builders

use super::summary::{bin_counts, box_stats};
use super::{plot_err, render};
use crate::error::{CreditError, Result};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::ops::Range;

const BAR_COLOR: RGBColor = RGBColor(70, 130, 180);
const MISSING_CELL: RGBColor = RGBColor(200, 200, 200);

/// A named polyline for [`line_chart`]
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

impl Series {
    pub fn new(label: impl Into<String>, points: Vec<(f64, f64)>) -> Self {
        Self {
            label: label.into(),
            points,
        }
    }
}

/// One bar per label
pub fn bar_chart(title: &str, x_desc: &str, y_desc: &str, labels: &[String], values: &[f64]) -> Result<String> {
    if labels.is_empty() || labels.len() != values.len() {
        return Err(plot_err(format!(
            "bar chart needs one value per label, got {} labels and {} values",
            labels.len(),
            values.len()
        )));
    }

    let n = labels.len() as i32;
    let y_max = values.iter().copied().fold(0.0, f64::max).max(1.0) * 1.1;

    render(|root| {
        let mut chart = ChartBuilder::on(root)
            .caption(title, ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(80)
            .build_cartesian_2d((0..n).into_segmented(), 0f64..y_max)?;

        let label_of = |v: &SegmentValue<i32>| segment_label(v, labels);
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(labels.len())
            .x_label_formatter(&label_of)
            .x_desc(x_desc)
            .y_desc(y_desc)
            .draw()?;

        chart.draw_series(values.iter().enumerate().map(|(i, &v)| {
            let i = i as i32;
            let mut bar = Rectangle::new(
                [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), v)],
                BAR_COLOR.filled(),
            );
            bar.set_margin(0, 0, 30, 30);
            bar
        }))?;
        Ok(())
    })
}

/// Equal-width histogram of the finite values
pub fn histogram(title: &str, x_desc: &str, values: &[f64], bins: usize) -> Result<String> {
    let binned = bin_counts(values, bins)
        .ok_or_else(|| plot_err(format!("histogram '{}' has no finite values", title)))?;
    let y_max = binned.counts.iter().copied().max().unwrap_or(0).max(1) as f64 * 1.1;

    render(|root| {
        let mut chart = ChartBuilder::on(root)
            .caption(title, ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(80)
            .build_cartesian_2d(binned.lo..binned.hi(), 0f64..y_max)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc(x_desc)
            .y_desc("count")
            .draw()?;

        chart.draw_series(binned.counts.iter().enumerate().map(|(i, &count)| {
            let (start, end) = binned.edges(i);
            Rectangle::new([(start, 0.0), (end, count as f64)], BAR_COLOR.mix(0.8).filled())
        }))?;
        Ok(())
    })
}

/// Single vertical box with 1.5 IQR whiskers and outlier points
pub fn box_plot(title: &str, y_desc: &str, values: &[f64]) -> Result<String> {
    let b = box_stats(values).ok_or_else(|| plot_err(format!("box plot '{}' has no finite values", title)))?;

    let lo = b.outliers.iter().copied().fold(b.whisker_lo, f64::min);
    let hi = b.outliers.iter().copied().fold(b.whisker_hi, f64::max);
    let pad = if hi > lo { (hi - lo) * 0.05 } else { 1.0 };
    let y_range = (lo - pad)..(hi + pad);

    render(|root| {
        let mut chart = ChartBuilder::on(root)
            .caption(title, ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(30)
            .y_label_area_size(90)
            .build_cartesian_2d(0f64..2f64, y_range)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(0)
            .y_desc(y_desc)
            .draw()?;

        let (left, right) = (0.7, 1.3);
        chart.draw_series(std::iter::once(Rectangle::new(
            [(left, b.q1), (right, b.q3)],
            BAR_COLOR.mix(0.4).filled(),
        )))?;
        chart.draw_series(std::iter::once(Rectangle::new(
            [(left, b.q1), (right, b.q3)],
            BLACK.stroke_width(1),
        )))?;

        let segments = [
            vec![(left, b.median), (right, b.median)],
            vec![(1.0, b.q3), (1.0, b.whisker_hi)],
            vec![(1.0, b.q1), (1.0, b.whisker_lo)],
            vec![(0.85, b.whisker_hi), (1.15, b.whisker_hi)],
            vec![(0.85, b.whisker_lo), (1.15, b.whisker_lo)],
        ];
        chart.draw_series(
            segments
                .into_iter()
                .map(|points| PathElement::new(points, BLACK.stroke_width(2))),
        )?;

        chart.draw_series(
            b.outliers
                .iter()
                .map(|&v| Circle::new((1.0, v), 4, BLACK.stroke_width(1))),
        )?;
        Ok(())
    })
}

/// Square matrix of values in [-1, 1], with the value printed in each cell.
///
/// Row 0 is drawn at the top. `None` cells are grey.
pub fn heatmap(title: &str, labels: &[String], matrix: &[Vec<Option<f64>>]) -> Result<String> {
    let n = labels.len();
    if n == 0 || matrix.len() != n || matrix.iter().any(|row| row.len() != n) {
        return Err(CreditError::PlotError(format!(
            "heatmap needs a {n}x{n} matrix to match its labels"
        )));
    }
    let n = n as i32;

    render(|root| {
        let mut chart = ChartBuilder::on(root)
            .caption(title, ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(140)
            .y_label_area_size(160)
            .build_cartesian_2d((0..n).into_segmented(), (0..n).into_segmented())?;

        let x_label = |v: &SegmentValue<i32>| segment_label(v, labels);
        let y_label = |v: &SegmentValue<i32>| match v {
            SegmentValue::CenterOf(row) => segment_label(&SegmentValue::CenterOf(n - 1 - row), labels),
            _ => String::new(),
        };
        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(labels.len())
            .y_labels(labels.len())
            .x_label_formatter(&x_label)
            .y_label_formatter(&y_label)
            .x_label_style(("sans-serif", 14).into_font().transform(FontTransform::Rotate90))
            .draw()?;

        let cells = (0..n).flat_map(|i| (0..n).map(move |j| (i, j)));
        chart.draw_series(cells.clone().map(|(i, j)| {
            let row = n - 1 - i;
            let fill = match matrix[i as usize][j as usize] {
                Some(r) => correlation_color(r).filled(),
                None => MISSING_CELL.filled(),
            };
            Rectangle::new(
                [
                    (SegmentValue::Exact(j), SegmentValue::Exact(row)),
                    (SegmentValue::Exact(j + 1), SegmentValue::Exact(row + 1)),
                ],
                fill,
            )
        }))?;

        let cell_font = ("sans-serif", 16)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Center));
        chart.draw_series(cells.map(|(i, j)| {
            let text = match matrix[i as usize][j as usize] {
                Some(r) => format!("{:.2}", r),
                None => "n/a".to_string(),
            };
            Text::new(
                text,
                (SegmentValue::CenterOf(j), SegmentValue::CenterOf(n - 1 - i)),
                cell_font.clone(),
            )
        }))?;
        Ok(())
    })
}

/// Several labelled polylines sharing fixed axes, with a legend
pub fn line_chart(
    title: &str,
    x_desc: &str,
    y_desc: &str,
    series: &[Series],
    x_range: Range<f64>,
    y_range: Range<f64>,
) -> Result<String> {
    if series.iter().all(|s| s.points.is_empty()) {
        return Err(plot_err(format!("line chart '{}' has no points", title)));
    }

    render(|root| {
        let mut chart = ChartBuilder::on(root)
            .caption(title, ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(x_range, y_range)?;

        chart.configure_mesh().x_desc(x_desc).y_desc(y_desc).draw()?;

        for (i, s) in series.iter().enumerate() {
            let color = Palette99::pick(i).mix(1.0);
            chart
                .draw_series(LineSeries::new(s.points.iter().copied(), color.stroke_width(2)))?
                .label(s.label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::LowerRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
        Ok(())
    })
}

fn segment_label(v: &SegmentValue<i32>, labels: &[String]) -> String {
    match v {
        SegmentValue::CenterOf(i) => usize::try_from(*i)
            .ok()
            .and_then(|i| labels.get(i))
            .cloned()
            .unwrap_or_default(),
        _ => String::new(),
    }
}

/// Red for positive, blue for negative, fading to white at zero
fn correlation_color(r: f64) -> HSLColor {
    let r = r.clamp(-1.0, 1.0);
    let hue = if r >= 0.0 { 0.0 } else { 240.0 / 360.0 };
    HSLColor(hue, 0.7, 1.0 - 0.5 * r.abs())
}
