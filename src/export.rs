//! Plain-text data export for plotting.
//!
//! Both writers emit a `#` header line followed by whitespace-separated columns: time first, then
//! one column per occupancy state. Gnuplot and most plotting tools read this directly.

use std::io::{self, Write};

use crate::{accumulator::OccupancyHistogram, integrator::TimeSeries};

/// Write a transient trajectory, one line per time point.
pub fn write_time_series(mut writer: impl Write, series: &TimeSeries) -> io::Result<()> {
    let states = series
        .points()
        .first()
        .map(|p| p.distribution.len())
        .unwrap_or_default();
    write_header(&mut writer, states)?;

    for point in series.points() {
        write!(writer, "{}", point.time)?;
        for p in point.distribution.as_slice() {
            write!(writer, " {p}")?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// Write an averaged occupancy histogram, one line per time bucket.
///
/// The time column is the start of each bucket, with `horizon` split evenly across the buckets.
pub fn write_histogram(
    mut writer: impl Write,
    histogram: &OccupancyHistogram,
    horizon: f64,
) -> io::Result<()> {
    let (states, sections) = histogram.shape();
    write_header(&mut writer, states)?;

    let width = horizon / sections as f64;
    for section in 0..sections {
        write!(writer, "{}", section as f64 * width)?;
        for value in histogram.column(section).iter() {
            write!(writer, " {value}")?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

fn write_header(writer: &mut impl Write, states: usize) -> io::Result<()> {
    write!(writer, "# time")?;
    for state in 0..states {
        write!(writer, " p{state}")?;
    }
    writeln!(writer)
}
