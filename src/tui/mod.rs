//! Ratatui-based terminal UI.
//!
//! The sample is loaded once; the settings panel moves the estimation window
//! and switches specifications, and every change refits without reloading.
//! Two charts mirror the ASCII plot: additive trends on the left, exponential
//! trends on the right, both in natural-log units.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use plotters::style::RGBColor;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Terminal,
};

use crate::app::pipeline::{load_sample, run_fit_with_sample, RunOutput};
use crate::domain::{
    EstimationWindow, PolyDegree, ResponseTransform, Sample, SpecSelector, TrendConfig,
};
use crate::error::AppError;

mod plotters_chart;

use plotters_chart::{TrendLine, TrendPlottersChart};

const FIELD_COUNT: usize = 3;

/// Start the TUI.
pub fn run(config: TrendConfig) -> Result<(), AppError> {
    // Load before switching screens so load errors print normally.
    let sample = load_sample(&config)?.sample;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config, sample);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
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
    config: TrendConfig,
    sample: Sample,
    selected_field: usize,
    status: String,
    run: Option<RunOutput>,
}

impl App {
    fn new(config: TrendConfig, sample: Sample) -> Self {
        let mut app = Self {
            config,
            sample,
            selected_field: 0,
            status: String::new(),
            run: None,
        };
        app.refit();
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
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

    /// Returns `true` when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                self.selected_field = self.selected_field.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_field + 1 < FIELD_COUNT {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::PageDown => self.adjust_field(-5),
            KeyCode::PageUp => self.adjust_field(5),
            KeyCode::Char('d') => {
                let specs = self.config.spec.specs();
                self.status = match crate::debug::write_debug_bundle(&self.sample, self.config.window, &specs) {
                    Ok(path) => format!("Wrote debug bundle: {}", path.display()),
                    Err(err) => format!("Debug write failed: {err}"),
                };
            }
            _ => {}
        }

        false
    }

    fn adjust_field(&mut self, delta: i32) {
        let EstimationWindow { year_min, year_max } = self.config.window;
        let first = self.sample.first_year();
        let last = self.sample.last_year();

        let window = match self.selected_field {
            0 => EstimationWindow::new((year_min + delta).clamp(first, year_max), year_max),
            1 => EstimationWindow::new(year_min, (year_max + delta).clamp(year_min, last)),
            2 => {
                self.config.spec = cycle_spec(self.config.spec, delta);
                Ok(self.config.window)
            }
            _ => return,
        };

        match window {
            Ok(window) => {
                self.config.window = window;
                self.refit();
            }
            Err(err) => self.status = err.to_string(),
        }
    }

    fn refit(&mut self) {
        match run_fit_with_sample(&self.config, self.sample.clone()) {
            Ok(run) => {
                self.status = match run.selection.skipped.first() {
                    Some((spec, err)) => format!("{} skipped: {err}", spec.display_name()),
                    None => format!(
                        "window {}..={}",
                        self.config.window.year_min, self.config.window.year_max
                    ),
                };
                self.run = Some(run);
            }
            Err(err) => {
                self.status = format!("Fit failed: {err}");
                self.run = None;
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("trend", Style::default().fg(Color::Cyan)),
            Span::raw(format!(" | {}", self.sample.entity())),
        ]));

        let summary = match self.run.as_ref().and_then(|r| r.selection.fits.first()) {
            Some(fit) => format!(
                "data {}..={} | T={} | T_all={} | t=1 is {}",
                self.sample.first_year(),
                self.sample.last_year(),
                fit.quality.n,
                fit.years.len(),
                fit.years[0]
            ),
            None => format!("data {}..={}", self.sample.first_year(), self.sample.last_year()),
        };
        lines.push(Line::from(Span::styled(summary, Style::default().fg(Color::Gray))));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(8)])
            .split(area);
        let charts = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[0]);

        self.draw_chart(frame, charts[0], ResponseTransform::Identity, "Additive");
        self.draw_chart(frame, charts[1], ResponseTransform::Log, "Exponential");

        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(34), Constraint::Min(0)])
            .split(rows[1]);
        self.draw_settings(frame, bottom[0]);
        self.draw_diagnostics(frame, bottom[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect, transform: ResponseTransform, title: &str) {
        let block = Block::default()
            .title(format!("{title} (log units, cyan=linear, yellow=quadratic)"))
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(run) = &self.run else {
            let msg = Paragraph::new("No fit available.").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let Some(panel) = panel_series(run, transform) else {
            let msg = Paragraph::new("No specification of this family fitted.")
                .style(Style::default().fg(Color::Gray));
            frame.render_widget(msg, inner);
            return;
        };

        let lines = panel
            .lines
            .iter()
            .map(|(degree, points)| TrendLine {
                points,
                color: match degree {
                    PolyDegree::Linear => RGBColor(0, 255, 255),
                    PolyDegree::Quadratic => RGBColor(255, 255, 0),
                },
            })
            .collect();

        let widget = TrendPlottersChart {
            observed: &panel.observed,
            lines,
            boundary: panel.boundary,
            x_bounds: panel.x_bounds,
            y_bounds: panel.y_bounds,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items = vec![
            ListItem::new(format!("Year min: {}", self.config.window.year_min)),
            ListItem::new(format!("Year max: {}", self.config.window.year_max)),
            ListItem::new(format!("Specs: {}", spec_label(self.config.spec))),
        ];

        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_diagnostics(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut items = Vec::new();
        if let Some(run) = &self.run {
            let best = run.selection.best().map(|f| f.spec);
            for fit in &run.selection.fits {
                let mark = if Some(fit.spec) == best { "*" } else { " " };
                let oos = fit
                    .quality
                    .oos_rmse
                    .map(|v| format!("{v:.4}"))
                    .unwrap_or_else(|| "-".to_string());
                items.push(ListItem::new(format!(
                    "{mark} {:<22} rmse={:.4} oos={oos}",
                    fit.display_name, fit.quality.rmse
                )));
            }
        }
        let list = List::new(items).block(Block::default().title("Fit (log units)").borders(Borders::ALL));
        frame.render_widget(list, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ ±1  PgUp/PgDn ±5  d debug  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Chart data for one transform family.
#[derive(Debug, Clone, PartialEq)]
struct PanelSeries {
    observed: Vec<(f64, f64)>,
    lines: Vec<(PolyDegree, Vec<(f64, f64)>)>,
    boundary: Option<f64>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

/// Build chart series for one panel; `None` when no fit of this family exists.
fn panel_series(run: &RunOutput, transform: ResponseTransform) -> Option<PanelSeries> {
    let lines: Vec<(PolyDegree, Vec<(f64, f64)>)> = run
        .selection
        .fits
        .iter()
        .filter(|f| f.spec.transform() == transform)
        .map(|f| {
            let pts = f
                .years
                .iter()
                .zip(&f.fitted_log)
                .map(|(&year, &y)| (year as f64, y))
                .collect();
            (f.spec.degree(), pts)
        })
        .collect();
    if lines.is_empty() {
        return None;
    }

    let observed: Vec<(f64, f64)> = run.rows.iter().map(|r| (r.year as f64, r.log_observed)).collect();
    let first = run.selection.fits.first()?;
    let boundary = Some((first.years[0] + first.quality.n as i32 - 1) as f64);

    let mut x_bounds = [first.years[0] as f64, first.years[first.years.len() - 1] as f64];
    if x_bounds[1] <= x_bounds[0] {
        x_bounds = [x_bounds[0] - 0.5, x_bounds[1] + 0.5];
    }

    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(_, y) in observed.iter().chain(lines.iter().flat_map(|(_, pts)| pts.iter())) {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !y_min.is_finite() || !y_max.is_finite() || y_max <= y_min {
        y_min = 0.0;
        y_max = 1.0;
    }
    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);

    Some(PanelSeries {
        observed,
        lines,
        boundary,
        x_bounds,
        y_bounds: [y_min - pad, y_max + pad],
    })
}

const SPEC_CYCLE: [SpecSelector; 7] = [
    SpecSelector::All,
    SpecSelector::Additive,
    SpecSelector::Exponential,
    SpecSelector::AdditiveLinear,
    SpecSelector::AdditiveQuadratic,
    SpecSelector::ExponentialLinear,
    SpecSelector::ExponentialQuadratic,
];

fn cycle_spec(cur: SpecSelector, delta: i32) -> SpecSelector {
    let n = SPEC_CYCLE.len() as i32;
    let idx = SPEC_CYCLE.iter().position(|&s| s == cur).unwrap_or(0) as i32;
    SPEC_CYCLE[(idx + delta.signum()).rem_euclid(n) as usize]
}

fn spec_label(sel: SpecSelector) -> String {
    match sel {
        SpecSelector::All => "all".to_string(),
        SpecSelector::Additive => "additive".to_string(),
        SpecSelector::Exponential => "exponential".to_string(),
        _ => sel
            .specs()
            .first()
            .map(|s| s.display_name().to_lowercase())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SourceKind, SyntheticParams};

    fn app() -> App {
        let sample = Sample::from_pairs("X", (1990..=2009).map(|y| (y, 100.0 * 1.02_f64.powi(y - 1990)))).unwrap();
        let config = TrendConfig {
            source: SourceKind::Synthetic,
            file: None,
            country: "Belgium".to_string(),
            series: None,
            synthetic: SyntheticParams {
                first_year: 1990,
                last_year: 2009,
                start_value: 100.0,
                growth: 0.02,
                noise: 0.0,
                seed: 0,
            },
            window: EstimationWindow::new(1990, 2004).unwrap(),
            spec: SpecSelector::All,
            plot: false,
            plot_width: 80,
            plot_height: 10,
            export_fitted: None,
            export_trends: None,
            debug_bundle: false,
        };
        App::new(config, sample)
    }

    #[test]
    fn window_keys_refit_without_reloading() {
        let mut app = app();
        assert_eq!(app.run.as_ref().unwrap().selection.fits[0].quality.n, 15);

        app.handle_key(KeyCode::Right);
        assert_eq!(app.config.window.year_min, 1991);
        let fit = &app.run.as_ref().unwrap().selection.fits[0];
        assert_eq!(fit.quality.n, 14);
        assert_eq!(fit.years[0], 1991);

        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::PageUp);
        app.handle_key(KeyCode::PageUp);
        // Clamped to the last sample year.
        assert_eq!(app.config.window.year_max, 2009);
    }

    #[test]
    fn year_min_cannot_pass_year_max() {
        let mut app = app();
        for _ in 0..10 {
            app.handle_key(KeyCode::PageUp);
        }
        assert_eq!(app.config.window.year_min, 2004);
        // A single estimation year cannot identify any trend.
        assert!(app.run.is_none());
        assert!(app.status.starts_with("Fit failed"));
    }

    #[test]
    fn spec_cycle_and_panels() {
        let mut app = app();
        app.selected_field = 2;
        app.handle_key(KeyCode::Right);
        assert_eq!(app.config.spec, SpecSelector::Additive);

        let run = app.run.as_ref().unwrap();
        assert!(panel_series(run, ResponseTransform::Log).is_none());
        let panel = panel_series(run, ResponseTransform::Identity).unwrap();
        assert_eq!(panel.lines.len(), 2);
        assert_eq!(panel.observed.len(), 20);
        assert_eq!(panel.boundary, Some(2004.0));
        assert_eq!(panel.x_bounds, [1990.0, 2009.0]);

        app.handle_key(KeyCode::Left);
        app.handle_key(KeyCode::Left);
        assert_eq!(app.config.spec, SpecSelector::ExponentialQuadratic);
    }

    #[test]
    fn quit_keys() {
        let mut app = app();
        assert!(!app.handle_key(KeyCode::Up));
        assert!(app.handle_key(KeyCode::Char('q')));
    }
}
