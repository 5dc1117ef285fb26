//! Voltage-vs-time plot of a recorded trace
//!
//! plotters lays the chart out; [`PdfBackend`] puts it on a PDF page.

mod pdf;

pub use pdf::{PdfBackend, PdfError};

use std::ops::Range;
use std::path::Path;

use plotters::prelude::*;

use crate::{Error, Result};

/// Plot title.
pub const TITLE: &str = "Somatic Vm vs t";
/// X axis label.
pub const X_LABEL: &str = "Time (ms)";
/// Y axis label.
pub const Y_LABEL: &str = "Membrane potential (mV)";

/// Render `voltage` against `time` as a single-page PDF line plot at `path`.
///
/// # Errors
///
/// Returns `Error::Plot` if drawing or writing the file fails.
pub fn render_trace_plot(
    path: &Path,
    time: &[f64],
    voltage: &[f64],
    size: (u32, u32),
) -> Result<()> {
    let root = PdfBackend::new(path, size, TITLE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(TITLE, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(axis_range(time), axis_range(voltage))
        .map_err(plot_error)?;

    chart
        .configure_mesh()
        .x_desc(X_LABEL)
        .y_desc(Y_LABEL)
        .draw()
        .map_err(plot_error)?;

    chart
        .draw_series(LineSeries::new(
            time.iter().copied().zip(voltage.iter().copied()),
            &BLUE,
        ))
        .map_err(plot_error)?;

    root.present().map_err(plot_error)?;
    Ok(())
}

/// Finite data range, widened when flat or empty so the axis has extent.
fn axis_range(values: &[f64]) -> Range<f64> {
    let (min, max) = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if min > max {
        return 0.0..1.0;
    }
    if (max - min).abs() < f64::EPSILON {
        return (min - 1.0)..(max + 1.0);
    }
    min..max
}

fn plot_error(err: impl std::fmt::Display) -> Error {
    Error::Plot(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_range_flat_series() {
        assert_eq!(axis_range(&[-65.0, -65.0]), -66.0..-64.0);
    }

    #[test]
    fn test_axis_range_empty_series() {
        assert_eq!(axis_range(&[]), 0.0..1.0);
    }

    #[test]
    fn test_render_writes_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace_plot.pdf");
        render_trace_plot(&path, &[0.0, 25.0, 50.0], &[-65.0, -64.0, -65.0], (320, 240)).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        let pdf = String::from_utf8_lossy(&bytes);
        assert!(pdf.starts_with("%PDF-"));
        assert!(pdf.contains(TITLE));
        assert!(pdf.contains("Time "));
        assert!(pdf.contains("Membrane potential "));
    }

    #[test]
    fn test_render_empty_trace() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.pdf");
        render_trace_plot(&path, &[], &[], (320, 240)).unwrap();
        assert!(path.is_file());
    }
}
