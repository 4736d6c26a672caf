//! SVG chart components.
//!
//! The layout math lives in plain functions so it can be tested off the
//! browser; the components only turn it into SVG nodes.

use leptos::*;
use std::f64::consts::PI;

use crate::config::palette;
use crate::types::{BarChart, Histogram, Indicator, PieChart};

const BAR_LABEL_WIDTH: f64 = 170.0;
const BAR_AREA_WIDTH: f64 = 330.0;
const BAR_ROW_HEIGHT: f64 = 26.0;

const HIST_WIDTH: f64 = 520.0;
const HIST_HEIGHT: f64 = 220.0;

// =============================================================================
// Layout helpers
// =============================================================================

/// Whole numbers without decimals, everything else with two.
pub fn format_value(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{:.2}", v)
    }
}

/// Bar lengths scaled so the largest value fills `max_width`.
pub fn scale_bars(values: &[f64], max_width: f64) -> Vec<f64> {
    let max = values.iter().cloned().fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| v.max(0.0) / max * max_width).collect()
}

/// Start and end angle (radians, clockwise from 12 o'clock) of each slice.
pub fn pie_angles(values: &[usize]) -> Vec<(f64, f64)> {
    let total: usize = values.iter().sum();
    if total == 0 {
        return vec![(0.0, 0.0); values.len()];
    }
    let mut start = 0.0;
    values
        .iter()
        .map(|&v| {
            let end = start + v as f64 / total as f64 * 2.0 * PI;
            let slice = (start, end);
            start = end;
            slice
        })
        .collect()
}

fn polar(cx: f64, cy: f64, r: f64, angle: f64) -> (f64, f64) {
    (cx + r * angle.sin(), cy - r * angle.cos())
}

/// SVG path of a donut segment.
pub fn donut_path(cx: f64, cy: f64, outer: f64, inner: f64, start: f64, end: f64) -> String {
    // a full ring cannot be drawn as a single arc
    let end = if end - start >= 2.0 * PI { start + 2.0 * PI - 1e-4 } else { end };
    let large = if end - start > PI { 1 } else { 0 };
    let (x0, y0) = polar(cx, cy, outer, start);
    let (x1, y1) = polar(cx, cy, outer, end);
    let (x2, y2) = polar(cx, cy, inner, end);
    let (x3, y3) = polar(cx, cy, inner, start);
    format!(
        "M {x0:.3} {y0:.3} A {outer} {outer} 0 {large} 1 {x1:.3} {y1:.3} \
         L {x2:.3} {y2:.3} A {inner} {inner} 0 {large} 0 {x3:.3} {y3:.3} Z"
    )
}

/// Share of `part` in `total` as a percentage label.
pub fn share_label(part: usize, total: usize) -> String {
    if total == 0 {
        "0.0%".to_string()
    } else {
        format!("{:.1}%", part as f64 / total as f64 * 100.0)
    }
}

/// X position of `value` on a histogram axis spanning the bins.
pub fn axis_position(value: f64, lo: f64, hi: f64, width: f64) -> f64 {
    if hi <= lo {
        return 0.0;
    }
    ((value - lo) / (hi - lo)).clamp(0.0, 1.0) * width
}

// =============================================================================
// Components
// =============================================================================

#[component]
pub fn BarChartView(
    chart: BarChart,
    #[prop(default = palette::PRIMARY)] color: &'static str,
    /// Show values as percentages of 1.0
    #[prop(optional)]
    as_rate: bool,
) -> impl IntoView {
    let widths = scale_bars(
        &chart.bars.iter().map(|b| b.value).collect::<Vec<_>>(),
        BAR_AREA_WIDTH,
    );
    let height = (chart.bars.len().max(1) as f64) * BAR_ROW_HEIGHT;
    let total_width = BAR_LABEL_WIDTH + BAR_AREA_WIDTH + 70.0;

    let rows = chart
        .bars
        .into_iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (bar, width))| {
            let y = i as f64 * BAR_ROW_HEIGHT;
            let value = if as_rate {
                format!("{:.1}%", bar.value * 100.0)
            } else {
                format_value(bar.value)
            };
            view! {
                <g>
                    <text x={BAR_LABEL_WIDTH - 8.0} y={y + 17.0} text-anchor="end" class="chart-label">
                        {bar.label}
                    </text>
                    <rect x=BAR_LABEL_WIDTH y={y + 4.0} width=width height={BAR_ROW_HEIGHT - 8.0} fill=color rx="3"/>
                    <text x={BAR_LABEL_WIDTH + width + 6.0} y={y + 17.0} class="chart-value">
                        {value}
                    </text>
                </g>
            }
        })
        .collect_view();

    view! {
        <div class="chart">
            <div class="chart-title">{chart.title}</div>
            <svg viewBox={format!("0 0 {} {}", total_width, height)} width="100%">
                {rows}
            </svg>
        </div>
    }
}

#[component]
pub fn PieChartView(chart: PieChart) -> impl IntoView {
    let colors = [palette::CONVERTED, palette::NOT_CONVERTED, palette::INFO, palette::WARNING];
    let values: Vec<usize> = chart.slices.iter().map(|s| s.value).collect();
    let total: usize = values.iter().sum();
    let angles = pie_angles(&values);

    let segments = angles
        .iter()
        .enumerate()
        .filter(|(_, (start, end))| end > start)
        .map(|(i, &(start, end))| {
            let d = donut_path(110.0, 110.0, 100.0, 40.0, start, end);
            view! { <path d=d fill={colors[i % colors.len()]}/> }
        })
        .collect_view();

    let legend = chart
        .slices
        .into_iter()
        .enumerate()
        .map(|(i, slice)| {
            let label = format!(
                "{}: {} ({})",
                slice.label,
                slice.value,
                share_label(slice.value, total)
            );
            view! {
                <div class="legend-item">
                    <span class="legend-swatch" style={format!("background:{}", colors[i % colors.len()])}></span>
                    {label}
                </div>
            }
        })
        .collect_view();

    view! {
        <div class="chart">
            <div class="chart-title">{chart.title}</div>
            <svg viewBox="0 0 220 220" width="220" height="220">
                {segments}
            </svg>
            <div class="legend">{legend}</div>
        </div>
    }
}

#[component]
pub fn HistogramView(
    histogram: Histogram,
    #[prop(default = palette::SECONDARY)] color: &'static str,
    /// Axis unit, e.g. "days"
    #[prop(default = "days")]
    unit: &'static str,
) -> impl IntoView {
    let counts: Vec<f64> = histogram.bins.iter().map(|b| b.count as f64).collect();
    let heights = scale_bars(&counts, HIST_HEIGHT - 30.0);
    let n = histogram.bins.len().max(1) as f64;
    let bin_width = HIST_WIDTH / n;
    let lo = histogram.bins.first().map(|b| b.start).unwrap_or(0.0);
    let hi = histogram.bins.last().map(|b| b.end).unwrap_or(0.0);

    let bars = histogram
        .bins
        .iter()
        .zip(heights)
        .enumerate()
        .map(|(i, (bin, h))| {
            let tip = format!("{:.1}–{:.1} {}: {}", bin.start, bin.end, unit, bin.count);
            view! {
                <rect x={i as f64 * bin_width + 1.0} y={HIST_HEIGHT - h} width={(bin_width - 2.0).max(1.0)} height=h fill=color>
                    <title>{tip}</title>
                </rect>
            }
        })
        .collect_view();

    let mean_line = histogram.mean.map(|m| {
        let x = axis_position(m, lo, hi, HIST_WIDTH);
        view! {
            <line x1=x x2=x y1="0" y2=HIST_HEIGHT stroke=palette::WARNING stroke-dasharray="4 3" stroke-width="2"/>
        }
    });

    let caption = match histogram.mean {
        Some(m) => format!("Mean: {:.1} {}", m, unit),
        None => "No data".to_string(),
    };

    view! {
        <div class="chart">
            <div class="chart-title">{histogram.title}</div>
            <svg viewBox={format!("0 0 {} {}", HIST_WIDTH, HIST_HEIGHT)} width="100%">
                {bars}
                {mean_line}
            </svg>
            <div class="chart-caption">
                {format!("{} {} to {} {} · {}", format_value(lo), unit, format_value(hi), unit, caption)}
            </div>
        </div>
    }
}

#[component]
pub fn IndicatorView(indicator: Indicator) -> impl IntoView {
    view! {
        <div class="chart indicator">
            <div class="chart-title">{indicator.title}</div>
            <div class="indicator-value">
                {format!("{:.1}{}", indicator.value, indicator.suffix)}
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(12.0), "12");
        assert_eq!(format_value(0.5), "0.50");
    }

    #[test]
    fn test_scale_bars() {
        assert_eq!(scale_bars(&[1.0, 2.0, 4.0], 100.0), vec![25.0, 50.0, 100.0]);
        assert_eq!(scale_bars(&[0.0, 0.0], 100.0), vec![0.0, 0.0]);
        assert!(scale_bars(&[], 100.0).is_empty());
    }

    #[test]
    fn test_pie_angles_cover_circle() {
        let angles = pie_angles(&[1, 3]);
        assert_eq!(angles[0].0, 0.0);
        assert!((angles[0].1 - PI / 2.0).abs() < 1e-9);
        assert!((angles[1].1 - 2.0 * PI).abs() < 1e-9);
        assert_eq!(pie_angles(&[0, 0]), vec![(0.0, 0.0), (0.0, 0.0)]);
    }

    #[test]
    fn test_donut_path_full_ring_is_drawable() {
        let d = donut_path(110.0, 110.0, 100.0, 40.0, 0.0, 2.0 * PI);
        assert!(d.starts_with("M 110.000 10.000"));
        assert!(d.contains(" 1 1 "));
        assert!(d.ends_with('Z'));
    }

    #[test]
    fn test_share_label() {
        assert_eq!(share_label(1, 4), "25.0%");
        assert_eq!(share_label(0, 0), "0.0%");
    }

    #[test]
    fn test_axis_position() {
        assert_eq!(axis_position(5.0, 0.0, 10.0, 200.0), 100.0);
        assert_eq!(axis_position(50.0, 0.0, 10.0, 200.0), 200.0);
        assert_eq!(axis_position(1.0, 1.0, 1.0, 200.0), 0.0);
    }
}
