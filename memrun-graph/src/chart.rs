use std::path::Path;

use memrun_metrics::{Counter, Sample};

use crate::canvas::{Canvas, Rgb};
use crate::scale::AxisScale;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image encode error: {0}")]
    Encode(#[from] image::ImageError),
}

/// Chart dimensions and margins, in pixels.
#[derive(Debug, Clone)]
pub struct ChartLayout {
    pub width: u32,
    pub height: u32,
    pub margin_left: u32,
    pub margin_right: u32,
    pub margin_top: u32,
    pub margin_bottom: u32,
    pub title: Option<String>,
}

impl Default for ChartLayout {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 600,
            margin_left: 60,
            margin_right: 20,
            margin_top: 20,
            margin_bottom: 40,
            title: None,
        }
    }
}

impl ChartLayout {
    #[must_use]
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}

const BACKGROUND: Rgb = [255, 255, 255];
const PLOT_BORDER: Rgb = [245, 245, 245];
const GRID: Rgb = [220, 220, 220];
const AXIS: Rgb = [0, 0, 0];
const TITLE_BAND: Rgb = [240, 240, 240];

pub const ALLOCATED_COLOR: Rgb = [33, 150, 243];
pub const RESERVED_COLOR: Rgb = [76, 175, 80];
pub const MANAGED_COLOR: Rgb = [255, 87, 34];
pub const SYSTEM_COLOR: Rgb = [156, 39, 176];

/// Series palette in draw order. Later series overdraw earlier ones at shared
/// pixels; there is no blending. SystemUsed plots with the zero-gap policy
/// because some hosts report zero when the counter is unavailable.
const SERIES: [(Counter, Rgb, bool); 4] = [
    (Counter::Allocated, ALLOCATED_COLOR, false),
    (Counter::Reserved, RESERVED_COLOR, false),
    (Counter::ManagedHeap, MANAGED_COLOR, false),
    (Counter::SystemUsed, SYSTEM_COLOR, true),
];

/// The plot rectangle inside the margins.
#[derive(Debug, Clone, Copy)]
struct PlotRect {
    left: i32,
    top: i32,
    width: i32,
    height: i32,
}

impl PlotRect {
    fn from_layout(layout: &ChartLayout) -> Option<Self> {
        let width = layout.width as i32 - layout.margin_left as i32 - layout.margin_right as i32;
        let height = layout.height as i32 - layout.margin_top as i32 - layout.margin_bottom as i32;
        if width < 2 || height < 2 {
            return None;
        }

        Some(Self {
            left: layout.margin_left as i32,
            top: layout.margin_top as i32,
            width,
            height,
        })
    }

    fn x_to_px(&self, t: f64, axis: &AxisScale) -> i32 {
        let u = ((t - axis.min) / axis.range()).clamp(0.0, 1.0);
        self.left + (u * f64::from(self.width - 1)).round() as i32
    }

    fn y_to_px(&self, v: f64, axis: &AxisScale) -> i32 {
        let u = if v <= 0.0 {
            0.0
        } else {
            (v / axis.max).clamp(0.0, 1.0)
        };
        self.top + (self.height - 1) - (u * f64::from(self.height - 1)).round() as i32
    }
}

/// Splits one counter's series into contiguous runs of plottable points.
///
/// With `skip_zeros`, a zero reading ends the current run instead of
/// contributing a point: the polyline shows a gap where the counter was
/// unavailable rather than a segment dropping to zero.
fn series_runs(samples: &[Sample], counter: Counter, skip_zeros: bool) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut current: Vec<(f64, f64)> = Vec::new();

    for sample in samples {
        let v = sample.counters.get(counter);
        if skip_zeros && v <= 0.0 {
            if !current.is_empty() {
                runs.push(std::mem::take(&mut current));
            }
            continue;
        }
        current.push((sample.time_ms, v));
    }

    if !current.is_empty() {
        runs.push(current);
    }

    runs
}

/// Renders one run's sample sequence as a fixed four-series line chart.
///
/// Returns `None` for sequences shorter than two samples: a single point has
/// no line to draw and the skip is benign, not an error.
#[must_use]
pub fn render(samples: &[Sample], layout: &ChartLayout) -> Option<Canvas> {
    if samples.len() < 2 {
        return None;
    }
    let plot = PlotRect::from_layout(layout)?;

    let time = AxisScale::time(samples[0].time_ms, samples[samples.len() - 1].time_ms);
    let y_max = samples
        .iter()
        .map(|s| s.counters.max_value())
        .fold(0.0, f64::max);
    let value = AxisScale::value(y_max);

    let mut canvas = Canvas::new(layout.width, layout.height, BACKGROUND);

    canvas.rect(plot.left, plot.top, plot.width, plot.height, PLOT_BORDER);
    canvas.hline(
        plot.left,
        plot.left + plot.width,
        plot.top + plot.height,
        AXIS,
    );
    canvas.vline(plot.left, plot.top, plot.top + plot.height, AXIS);

    let mut y = 0.0;
    while y <= value.max {
        let py = plot.y_to_px(y, &value);
        canvas.hline(plot.left, plot.left + plot.width, py, GRID);
        y += value.step;
    }

    let mut t = time.min;
    while t <= time.max {
        let px = plot.x_to_px(t, &time);
        canvas.vline(px, plot.top, plot.top + plot.height, GRID);
        t += time.step;
    }

    for (counter, color, skip_zeros) in SERIES {
        for run in series_runs(samples, counter, skip_zeros) {
            let mut prev: Option<(i32, i32)> = None;
            for (t, v) in run {
                let cur = (plot.x_to_px(t, &time), plot.y_to_px(v, &value));
                if let Some(p) = prev {
                    canvas.line(p.0, p.1, cur.0, cur.1, color);
                }
                prev = Some(cur);
            }
        }
    }

    if layout.title.is_some() {
        canvas.fill_rect(plot.left, 4, plot.width, 12, TITLE_BAND);
    }

    Some(canvas)
}

/// Renders the chart and writes it as a PNG, creating parent directories.
///
/// `Ok(false)` is the benign skip for sequences that cannot be plotted; no
/// file is written in that case.
pub fn save_chart(samples: &[Sample], layout: &ChartLayout, path: &Path) -> Result<bool> {
    let Some(canvas) = render(samples, layout) else {
        return Ok(false);
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    image::save_buffer(
        path,
        canvas.data(),
        canvas.width(),
        canvas.height(),
        image::ColorType::Rgb8,
    )?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use memrun_metrics::CounterReadings;

    fn sample(time_ms: f64, alloc: f64, system: f64) -> Sample {
        Sample::new(
            time_ms,
            CounterReadings {
                allocated_mb: alloc,
                reserved_mb: alloc * 1.5,
                managed_mb: alloc * 0.25,
                system_mb: system,
            },
        )
    }

    #[test]
    fn render_skips_sequences_shorter_than_two() {
        let layout = ChartLayout::default();
        assert!(render(&[], &layout).is_none());
        assert!(render(&[sample(0.0, 1.0, 0.0)], &layout).is_none());
    }

    #[test]
    fn render_two_samples_produces_full_size_canvas() {
        let layout = ChartLayout::default();
        let samples = [sample(0.0, 10.0, 2.0), sample(100.0, 20.0, 3.0)];

        let canvas = match render(&samples, &layout) {
            Some(c) => c,
            None => panic!("expected a rendered canvas"),
        };
        assert_eq!(canvas.width(), 1200);
        assert_eq!(canvas.height(), 600);

        // At least one pixel of each always-plotted series color made it out.
        let mut seen = [false; 3];
        for y in 0..600 {
            for x in 0..1200 {
                match canvas.pixel(x, y) {
                    Some(ALLOCATED_COLOR) => seen[0] = true,
                    Some(RESERVED_COLOR) => seen[1] = true,
                    Some(MANAGED_COLOR) => seen[2] = true,
                    _ => {}
                }
            }
        }
        assert_eq!(seen, [true; 3]);
    }

    #[test]
    fn render_handles_degenerate_time_range() {
        let layout = ChartLayout::default();
        let samples = [sample(50.0, 1.0, 0.0), sample(50.0, 2.0, 0.0)];
        assert!(render(&samples, &layout).is_some());
    }

    #[test]
    fn render_handles_all_zero_data() {
        let layout = ChartLayout::default();
        let samples = [sample(0.0, 0.0, 0.0), sample(10.0, 0.0, 0.0)];
        assert!(render(&samples, &layout).is_some());
    }

    #[test]
    fn zero_readings_split_system_series_into_disjoint_runs() {
        let samples = [
            sample(0.0, 1.0, 5.0),
            sample(10.0, 1.0, 0.0),
            sample(20.0, 1.0, 0.0),
            sample(30.0, 1.0, 7.0),
        ];

        let runs = series_runs(&samples, Counter::SystemUsed, true);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0], vec![(0.0, 5.0)]);
        assert_eq!(runs[1], vec![(30.0, 7.0)]);

        // Without the policy the zeros plot as real values in one run.
        let runs = series_runs(&samples, Counter::SystemUsed, false);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].len(), 4);
    }

    #[test]
    fn gap_in_system_series_draws_no_bridging_line() {
        let layout = ChartLayout::default();
        let samples = [
            sample(0.0, 1.0, 5.0),
            sample(10.0, 1.0, 0.0),
            sample(20.0, 1.0, 0.0),
            sample(30.0, 1.0, 7.0),
        ];

        let canvas = match render(&samples, &layout) {
            Some(c) => c,
            None => panic!("expected a rendered canvas"),
        };

        // Both runs are single points, so the SystemUsed color never appears:
        // no segment may bridge the zero gap.
        for y in 0..600 {
            for x in 0..1200 {
                assert_ne!(canvas.pixel(x, y), Some(SYSTEM_COLOR));
            }
        }
    }

    #[test]
    fn save_chart_skips_single_sample_without_writing() {
        let dir = match tempfile::tempdir() {
            Ok(d) => d,
            Err(err) => panic!("tempdir failed: {err}"),
        };
        let path = dir.path().join("single.png");

        let written = match save_chart(&[sample(0.0, 1.0, 0.0)], &ChartLayout::default(), &path) {
            Ok(w) => w,
            Err(err) => panic!("save failed: {err}"),
        };
        assert!(!written);
        assert!(!path.exists());
    }

    #[test]
    fn save_chart_writes_png_for_plottable_sequences() {
        let dir = match tempfile::tempdir() {
            Ok(d) => d,
            Err(err) => panic!("tempdir failed: {err}"),
        };
        let path = dir.path().join("graphs").join("run.png");

        let samples = [sample(0.0, 10.0, 2.0), sample(100.0, 20.0, 3.0)];
        let written = match save_chart(&samples, &ChartLayout::default(), &path) {
            Ok(w) => w,
            Err(err) => panic!("save failed: {err}"),
        };
        assert!(written);
        assert!(path.exists());
    }
}
