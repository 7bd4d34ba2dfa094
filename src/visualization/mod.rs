//! Visualization module
//!
//! Chart rendering for EDA and evaluation figures. Every chart is drawn with
//! plotters into an in-memory SVG document and returned as a string, so callers
//! decide where (or whether) it is written.

mod charts;
mod summary;

pub use charts::{bar_chart, box_plot, heatmap, histogram, line_chart, Series};
pub use summary::{bin_counts, box_stats, BinCounts, BoxStats};

use crate::error::{CreditError, Result};
use plotters::coord::Shift;
use plotters::prelude::*;

/// Width and height of every figure, in pixels
pub const FIGURE_SIZE: (u32, u32) = (1024, 768);

/// Histogram bin count used for EDA figures
pub const HISTOGRAM_BINS: usize = 30;

type DrawResult = std::result::Result<(), Box<dyn std::error::Error>>;

/// Run `draw` against a blank white canvas and return the finished SVG.
fn render<F>(draw: F) -> Result<String>
where
    F: for<'a, 'b> FnOnce(&'b DrawingArea<SVGBackend<'a>, Shift>) -> DrawResult,
{
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, FIGURE_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(plot_err)?;
        draw(&root).map_err(plot_err)?;
        root.present().map_err(plot_err)?;
    }
    Ok(svg)
}

fn plot_err(err: impl std::fmt::Display) -> CreditError {
    CreditError::PlotError(err.to_string())
}
