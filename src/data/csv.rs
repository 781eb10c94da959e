//! MNIST-style CSV datasets.
//!
//! One sample per line: `label,pixel0,pixel1,...` with pixels in `0..=255`.
//! Blank lines are skipped, as is a header row if the first line has a
//! non-numeric cell.

use std::fs;
use std::path::Path;

use log::{info, warn};

use crate::data::sample::{normalize_pixel, Sample};
use crate::error::{NetworkError, Result};

/// Parses CSV text into samples with `input_size` pixels and `classes` targets.
///
/// Any malformed row aborts the whole parse.
pub fn parse_mnist_csv(text: &str, input_size: usize, classes: usize) -> Result<Vec<Sample>> {
    let mut lines = text.lines().enumerate().peekable();

    if let Some((_, first)) = lines.peek() {
        if is_header(first) {
            warn!("skipping CSV header row");
            lines.next();
        }
    }

    let mut samples = Vec::new();
    let mut blank = 0usize;
    for (line_idx, line) in lines {
        let line = line.trim();
        if line.is_empty() {
            blank += 1;
            continue;
        }
        samples.push(parse_row(line, line_idx + 1, input_size, classes)?);
    }
    if blank > 0 {
        warn!("skipped {} blank CSV lines", blank);
    }

    Ok(samples)
}

/// Reads and parses a CSV file.
pub fn load_mnist_csv<P: AsRef<Path>>(
    path: P,
    input_size: usize,
    classes: usize,
) -> Result<Vec<Sample>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let samples = parse_mnist_csv(&text, input_size, classes)?;
    info!("loaded {} samples from {}", samples.len(), path.display());
    Ok(samples)
}

fn parse_row(line: &str, line_num: usize, input_size: usize, classes: usize) -> Result<Sample> {
    let mut cells = line.split(',').map(str::trim);

    let label_cell = cells.next().unwrap_or_default();
    let label: usize = label_cell.parse().map_err(|_| {
        NetworkError::Format(format!(
            "line {}: label '{}' is not a non-negative integer",
            line_num, label_cell
        ))
    })?;

    let inputs = cells
        .map(|c| {
            c.parse::<f64>()
                .ok()
                .filter(|v| (0.0..=255.0).contains(v))
                .map(normalize_pixel)
                .ok_or_else(|| {
                    NetworkError::Format(format!(
                        "line {}: '{}' is not a pixel value in 0..=255",
                        line_num, c
                    ))
                })
        })
        .collect::<Result<Vec<f64>>>()?;

    if inputs.len() != input_size {
        return Err(NetworkError::Format(format!(
            "line {}: expected {} pixels, got {}",
            line_num,
            input_size,
            inputs.len()
        )));
    }

    Sample::from_label(inputs, label, classes).map_err(|e| match e {
        NetworkError::Format(msg) => NetworkError::Format(format!("line {}: {}", line_num, msg)),
        other => other,
    })
}

/// Returns `true` if the row looks like a header (any cell non-numeric).
fn is_header(line: &str) -> bool {
    line.split(',').any(|c| {
        let t = c.trim();
        !t.is_empty() && t.parse::<f64>().is_err()
    })
}
