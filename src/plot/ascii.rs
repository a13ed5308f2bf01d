//! ASCII plotting for terminal output.
//!
//! A fixed-size character grid. Output is deterministic, so it can be
//! compared byte for byte in golden tests.
//!
//! One panel per response transform (additive, exponential), both on the
//! natural-log scale. Plot elements:
//! - observed points: `o`
//! - linear trend: `-` line
//! - quadratic trend: `.` line
//! - last estimation year: `|`

use crate::domain::{Observation, PolyDegree, ResponseTransform, TrendFile, TrendFit};
use crate::error::AppError;
use crate::fit::checked_ln;

/// Render both panels for an in-memory run.
///
/// Observed levels outside the fitted horizon are ignored. Panels without any
/// successful fit are omitted.
pub fn render_trend_plot(
    observed: &[Observation],
    fits: &[TrendFit],
    width: usize,
    height: usize,
) -> Result<String, AppError> {
    let Some(first) = fits.first() else {
        return Ok("Plot: no successful trend fits.\n".to_string());
    };
    let (Some(&year_first), Some(&year_last)) = (first.years.first(), first.years.last()) else {
        return Err(AppError::new(2, format!("Trend '{}' covers no years.", first.display_name)));
    };
    let boundary = year_first + first.quality.n as i32 - 1;

    let mut points = Vec::new();
    for obs in observed {
        if obs.year < year_first || obs.year > year_last {
            continue;
        }
        points.push((obs.year, checked_ln(obs.year, obs.value)?));
    }

    let mut out = String::new();
    for (transform, title) in [
        (ResponseTransform::Identity, "Additive"),
        (ResponseTransform::Log, "Exponential"),
    ] {
        let curves: Vec<(char, Vec<(i32, f64)>)> = fits
            .iter()
            .filter(|f| f.spec.transform() == transform)
            .map(|f| {
                let ch = match f.spec.degree() {
                    PolyDegree::Linear => '-',
                    PolyDegree::Quadratic => '.',
                };
                let line = f.years.iter().copied().zip(f.fitted_log.iter().copied()).collect();
                (ch, line)
            })
            .collect();
        if curves.is_empty() {
            continue;
        }
        out.push_str(&render_panel(title, &points, &curves, Some(boundary), width, height));
    }

    Ok(out)
}

/// Render the panels from a saved trend JSON file.
pub fn render_trend_file(trends: &TrendFile, width: usize, height: usize) -> Result<String, AppError> {
    let mut out = format!("Entity: {}\n", trends.entity);
    out.push_str(&render_trend_plot(&trends.observed, &trends.fits, width, height)?);
    Ok(out)
}

fn render_panel(
    title: &str,
    points: &[(i32, f64)],
    curves: &[(char, Vec<(i32, f64)>)],
    boundary: Option<i32>,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (x_min, x_max) = year_range(points, curves).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = y_range(points, curves).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Curves first so points overlay them.
    for (ch, line) in curves {
        draw_curve(&mut grid, line, *ch, x_min, x_max, y_min, y_max);
    }

    if let Some(year) = boundary.filter(|&y| (y as f64) < x_max) {
        let x = map_x(year as f64, x_min, x_max, width);
        for row in grid.iter_mut() {
            if row[x] == ' ' {
                row[x] = '|';
            }
        }
    }

    for &(year, y) in points {
        let x = map_x(year as f64, x_min, x_max, width);
        let yy = map_y(y, y_min, y_max, height);
        grid[yy][x] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{title}: years=[{x_min:.0}, {x_max:.0}] | log y=[{y_min:.2}, {y_max:.2}]\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn year_range(points: &[(i32, f64)], curves: &[(char, Vec<(i32, f64)>)]) -> Option<(f64, f64)> {
    let years = points
        .iter()
        .map(|p| p.0)
        .chain(curves.iter().flat_map(|(_, line)| line.iter().map(|p| p.0)));
    let (min, max) = years.fold((i32::MAX, i32::MIN), |(lo, hi), y| (lo.min(y), hi.max(y)));
    if max > min {
        Some((min as f64, max as f64))
    } else {
        None
    }
}

fn y_range(points: &[(i32, f64)], curves: &[(char, Vec<(i32, f64)>)]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for &(_, y) in points {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    for (_, line) in curves {
        for &(_, y) in line {
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(
    grid: &mut [Vec<char>],
    line: &[(i32, f64)],
    ch: char,
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(year, y) in line {
        let x = map_x(year as f64, x_min, x_max, width);
        let yy = map_y(y, y_min, y_max, height);
        match prev {
            Some((x0, y0)) => draw_line(grid, x0, y0, x, yy, ch),
            None => {
                if grid[yy][x] == ' ' {
                    grid[yy][x] = ch;
                }
            }
        }
        prev = Some((x, yy));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EstimationWindow, Sample, TrendSpec};
    use crate::fit::fit_all;

    #[test]
    fn panel_golden_snapshot_small() {
        let points = vec![(2000, 1.0), (2009, 2.0)];
        let curves = vec![('-', vec![(2000, 1.0), (2009, 1.0)])];

        let txt = render_panel("Additive", &points, &curves, None, 10, 5);
        let expected = concat!(
            "Additive: years=[2000, 2009] | log y=[0.95, 2.05]\n",
            "         o\n",
            "          \n",
            "          \n",
            "          \n",
            "o---------\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn renders_one_panel_per_transform_with_boundary() {
        let sample = Sample::from_pairs("X", (2000..=2019).map(|y| (y, 100.0 * 1.02_f64.powi(y - 2000)))).unwrap();
        let window = EstimationWindow::new(2000, 2009).unwrap();
        let selection = fit_all(&sample, window, &TrendSpec::ALL);

        let txt = render_trend_plot(sample.observations(), &selection.fits, 40, 10).unwrap();
        assert!(txt.contains("Additive: years=[2000, 2019]"));
        assert!(txt.contains("Exponential: years=[2000, 2019]"));
        assert!(txt.contains('|'));
        assert!(txt.contains('o'));
        assert_eq!(txt.lines().count(), 2 * 11);
    }

    #[test]
    fn exponential_only_omits_additive_panel() {
        let sample = Sample::from_pairs("X", (2000..=2009).map(|y| (y, 10.0 + (y - 2000) as f64))).unwrap();
        let window = EstimationWindow::new(2000, 2009).unwrap();
        let selection = fit_all(&sample, window, &[TrendSpec::ExponentialLinear]);

        let txt = render_trend_plot(sample.observations(), &selection.fits, 20, 5).unwrap();
        assert!(!txt.contains("Additive"));
        assert!(txt.starts_with("Exponential:"));
        // No extrapolation, so no boundary marker.
        assert!(!txt.contains('|'));
    }

    #[test]
    fn fit_without_years_is_an_error() {
        let sample = Sample::from_pairs("X", (2000..=2005).map(|y| (y, 10.0 + (y - 2000) as f64))).unwrap();
        let window = EstimationWindow::new(2000, 2003).unwrap();
        let mut fits = fit_all(&sample, window, &[TrendSpec::AdditiveLinear]).fits;
        fits[0].years.clear();
        fits[0].fitted_log.clear();

        let err = render_trend_plot(sample.observations(), &fits, 20, 5).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
