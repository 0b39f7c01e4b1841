//! Chart geometry and SVG rendering.
//!
//! Layouts are pure: they turn aggregates from `stats` into pixel
//! coordinates for a given animation progress, and answer hit-tests for a
//! pointer position. Rendering only serialises a layout.

use chrono::NaiveDate;
use std::f64::consts::PI;

use crate::stats::{CategoryShare, RoiPoint};

/// Slice colours, cycled when there are more categories than entries
pub const PALETTE: [&str; 10] = [
    "#3b82f6", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6",
    "#ec4899", "#06b6d4", "#14b8a6", "#f97316", "#6366f1",
];

/// Progress added per animation frame
pub const ANIMATION_STEP: f64 = 0.03;

/// How far the hovered slice is pulled out of the pie
pub const ACTIVE_OFFSET: f64 = 15.0;

/// Pie hit-tests accept pointers this far outside the radius
pub const PIE_HIT_SLOP: f64 = 15.0;

/// Distance within which a pointer is over an ROI data point
pub const POINT_HIT_RADIUS: f64 = 15.0;

/// Slices below this share get no percentage label
const MIN_LABEL_PERCENT: u32 = 5;

const LEGEND_X: f64 = 20.0;
const LEGEND_ROW: f64 = 25.0;
const LEGEND_WIDTH: f64 = 200.0;

/// Linear 0 → 1 animation advanced once per frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animation {
    progress: f64,
}

impl Default for Animation {
    fn default() -> Self {
        Self::new()
    }
}

impl Animation {
    pub fn new() -> Self {
        Self { progress: 0.0 }
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn is_done(&self) -> bool {
        self.progress >= 1.0
    }

    /// Advance one frame and return the new progress, clamped at 1
    pub fn tick(&mut self) -> f64 {
        self.progress = (self.progress + ANIMATION_STEP).min(1.0);
        self.progress
    }

    /// Restart, as happens whenever the underlying data changes
    pub fn reset(&mut self) {
        self.progress = 0.0;
    }

    /// Number of frames from the current progress to completion
    pub fn frames_remaining(&self) -> usize {
        let mut copy = *self;
        let mut frames = 0;
        while !copy.is_done() {
            copy.tick();
            frames += 1;
        }
        frames
    }
}

/// Brighten a `#rrggbb` colour by `percent`, each channel clamped to 0..=255.
/// Anything that is not a 6-digit hex colour is returned unchanged.
pub fn lighten_color(color: &str, percent: f64) -> String {
    let hex = color.trim_start_matches('#');
    let num = match u32::from_str_radix(hex, 16) {
        Ok(n) if hex.len() == 6 => n as i64,
        _ => return color.to_string(),
    };
    let amount = (2.55 * percent).round() as i64;
    let channel = |shift: u32| (((num >> shift) & 0xff) + amount).clamp(0, 255);

    format!("#{:02x}{:02x}{:02x}", channel(16), channel(8), channel(0))
}

// ============================================================================
// PIE CHART
// ============================================================================

/// One wedge of the category pie
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub name: String,
    pub count: usize,
    pub percent: u32,
    pub start_angle: f64,
    pub end_angle: f64,
    pub mid_angle: f64,
    pub color: &'static str,
}

impl Slice {
    /// Translation applied to the whole wedge when it is hovered
    pub fn offset(&self, active: bool) -> (f64, f64) {
        if active {
            (ACTIVE_OFFSET * self.mid_angle.cos(), ACTIVE_OFFSET * self.mid_angle.sin())
        } else {
            (0.0, 0.0)
        }
    }

    pub fn tooltip(&self) -> String {
        format!("{}\nCount: {}\nShare: {}%", self.name, self.count, self.percent)
    }
}

#[derive(Debug, Clone)]
pub struct PieLayout {
    pub width: f64,
    pub height: f64,
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
    pub slices: Vec<Slice>,
}

impl PieLayout {
    /// Lay out the distribution starting at 12 o'clock, sweeping clockwise.
    /// `progress` scales every sweep, so at 0.5 the pie covers half a turn.
    pub fn compute(shares: &[CategoryShare], width: f64, height: f64, margin: f64, progress: f64) -> Self {
        let center_x = width / 2.0;
        let center_y = height / 2.0;
        let radius = (center_x.min(center_y) - margin).max(0.0);
        let total: usize = shares.iter().map(|s| s.count).sum();
        let progress = progress.clamp(0.0, 1.0);

        let mut slices = Vec::with_capacity(shares.len());
        let mut start_angle = -PI / 2.0;

        if total > 0 {
            for (i, share) in shares.iter().enumerate() {
                let sweep = share.count as f64 / total as f64 * 2.0 * PI * progress;
                let end_angle = start_angle + sweep;
                slices.push(Slice {
                    name: share.name.clone(),
                    count: share.count,
                    percent: share.percent,
                    start_angle,
                    end_angle,
                    mid_angle: start_angle + sweep / 2.0,
                    color: PALETTE[i % PALETTE.len()],
                });
                start_angle = end_angle;
            }
        }

        Self { width, height, center_x, center_y, radius, slices }
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// Where the percentage label of a slice goes, `None` for slices too small to label
    pub fn label_position(&self, index: usize, active: bool) -> Option<(f64, f64)> {
        let slice = self.slices.get(index)?;
        if slice.percent <= MIN_LABEL_PERCENT {
            return None;
        }
        let (dx, dy) = slice.offset(active);
        let label_radius = self.slice_radius(active) * 0.7;
        Some((
            self.center_x + dx + label_radius * slice.mid_angle.cos(),
            self.center_y + dy + label_radius * slice.mid_angle.sin(),
        ))
    }

    fn slice_radius(&self, active: bool) -> f64 {
        if active { self.radius + ACTIVE_OFFSET } else { self.radius }
    }

    /// Index of the slice under the pointer, if any
    pub fn hit_test(&self, x: f64, y: f64) -> Option<usize> {
        let dx = x - self.center_x;
        let dy = y - self.center_y;
        if (dx * dx + dy * dy).sqrt() > self.radius + PIE_HIT_SLOP {
            return None;
        }

        // atan2 is in (-π, π]; slices run from -π/2 to 3π/2
        let mut angle = dy.atan2(dx);
        if angle < -PI / 2.0 {
            angle += 2.0 * PI;
        }

        self.slices
            .iter()
            .position(|s| angle >= s.start_angle && angle <= s.end_angle)
    }

    /// Top edge of the legend box
    fn legend_top(&self) -> f64 {
        self.height - 20.0 - self.slices.len() as f64 * LEGEND_ROW - 15.0
    }

    /// Index of the legend row under the pointer, if any
    pub fn legend_hit_test(&self, x: f64, y: f64) -> Option<usize> {
        if x < LEGEND_X - 10.0 || x > LEGEND_X + LEGEND_WIDTH - 10.0 {
            return None;
        }
        let row = ((y - self.legend_top()) / LEGEND_ROW).floor();
        if row >= 0.0 && (row as usize) < self.slices.len() {
            Some(row as usize)
        } else {
            None
        }
    }

    /// Slice hovered by the pointer, checking the pie first and then the legend
    pub fn active_slice(&self, x: f64, y: f64) -> Option<usize> {
        let dx = x - self.center_x;
        let dy = y - self.center_y;
        if (dx * dx + dy * dy).sqrt() <= self.radius + PIE_HIT_SLOP {
            self.hit_test(x, y)
        } else {
            self.legend_hit_test(x, y)
        }
    }
}

// ============================================================================
// ROI CHART
// ============================================================================

/// A data point projected to canvas coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct PlotPoint {
    pub x: f64,
    pub y: f64,
    pub date: NaiveDate,
    pub roi: f64,
}

impl PlotPoint {
    pub fn tooltip(&self, date_format: &str) -> String {
        format!("Date: {}\nROI: {:.2}%", self.date.format(date_format), self.roi)
    }
}

/// Horizontal grid line with its axis value
#[derive(Debug, Clone, PartialEq)]
pub struct GridLine {
    pub y: f64,
    pub value: f64,
}

#[derive(Debug, Clone)]
pub struct RoiLayout {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
    pub min_value: f64,
    pub max_value: f64,
    pub points: Vec<PlotPoint>,
    pub grid: Vec<GridLine>,
    /// Indices of the points that get a date label on the x axis
    pub x_label_indices: Vec<usize>,
}

impl RoiLayout {
    /// Project the cumulative ROI series. The value axis always includes zero.
    /// Points rise from the baseline toward their value as `progress` goes 0 → 1.
    pub fn compute(
        series: &[RoiPoint],
        width: f64,
        height: f64,
        padding: f64,
        grid_lines: u32,
        x_labels: usize,
        progress: f64,
    ) -> Self {
        let chart_width = width - 2.0 * padding;
        let chart_height = height - 2.0 * padding;
        let baseline = height - padding;
        let progress = progress.clamp(0.0, 1.0);

        let max_value = series.iter().map(|p| p.roi).fold(0.0_f64, f64::max);
        let min_value = series.iter().map(|p| p.roi).fold(0.0_f64, f64::min);
        let range = max_value - min_value;

        let target_y = |value: f64| {
            if range == 0.0 {
                baseline
            } else {
                padding + chart_height - (value - min_value) / range * chart_height
            }
        };

        let step_x = if series.len() > 1 {
            chart_width / (series.len() - 1) as f64
        } else {
            0.0
        };

        let points = series
            .iter()
            .enumerate()
            .map(|(i, p)| PlotPoint {
                x: padding + step_x * i as f64,
                y: baseline - (baseline - target_y(p.roi)) * progress,
                date: p.date,
                roi: p.roi,
            })
            .collect();

        let grid = if grid_lines == 0 {
            Vec::new()
        } else {
            (0..=grid_lines)
                .map(|i| GridLine {
                    y: padding + chart_height / grid_lines as f64 * i as f64,
                    value: max_value - range / grid_lines as f64 * i as f64,
                })
                .collect()
        };

        let label_step = (series.len() / x_labels.max(1)).max(1);
        let x_label_indices = (0..series.len()).step_by(label_step).collect();

        Self {
            width,
            height,
            padding,
            min_value,
            max_value,
            points,
            grid,
            x_label_indices,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn baseline(&self) -> f64 {
        self.height - self.padding
    }

    /// First data point within `POINT_HIT_RADIUS` of the pointer
    pub fn hit_test(&self, x: f64, y: f64) -> Option<&PlotPoint> {
        self.points.iter().find(|p| {
            let dx = x - p.x;
            let dy = y - p.y;
            (dx * dx + dy * dy).sqrt() < POINT_HIT_RADIUS
        })
    }
}

// ============================================================================
// SVG
// ============================================================================

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn svg_open(width: f64, height: f64) -> String {
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" font-family=\"Arial, sans-serif\">\n",
        w = width,
        h = height
    )
}

fn empty_state(width: f64, height: f64) -> String {
    let mut svg = svg_open(width, height);
    svg.push_str(&format!(
        "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" fill=\"#666\" font-size=\"14\">No bets recorded yet</text>\n",
        width / 2.0,
        height / 2.0
    ));
    svg.push_str("</svg>\n");
    svg
}

/// SVG path for a wedge; a full turn is drawn as two half arcs
fn wedge_path(cx: f64, cy: f64, r: f64, start: f64, end: f64) -> String {
    let sweep = end - start;
    if sweep >= 2.0 * PI - 1e-9 {
        return format!(
            "M {:.2} {:.2} A {r:.2} {r:.2} 0 1 1 {:.2} {:.2} A {r:.2} {r:.2} 0 1 1 {:.2} {:.2} Z",
            cx, cy - r, cx, cy + r, cx, cy - r,
            r = r
        );
    }
    let large_arc = if sweep > PI { 1 } else { 0 };
    format!(
        "M {:.2} {:.2} L {:.2} {:.2} A {r:.2} {r:.2} 0 {} 1 {:.2} {:.2} Z",
        cx,
        cy,
        cx + r * start.cos(),
        cy + r * start.sin(),
        large_arc,
        cx + r * end.cos(),
        cy + r * end.sin(),
        r = r
    )
}

/// Render the category pie with its legend. `active` pulls one slice out.
pub fn render_pie_svg(layout: &PieLayout, active: Option<usize>) -> String {
    if layout.is_empty() {
        return empty_state(layout.width, layout.height);
    }

    let mut svg = svg_open(layout.width, layout.height);

    svg.push_str("  <defs>\n");
    for (i, slice) in layout.slices.iter().enumerate() {
        svg.push_str(&format!(
            "    <radialGradient id=\"slice{}\"><stop offset=\"0%\" stop-color=\"{}\"/><stop offset=\"100%\" stop-color=\"{}\"/></radialGradient>\n",
            i,
            lighten_color(slice.color, 20.0),
            slice.color
        ));
    }
    svg.push_str("  </defs>\n");

    svg.push_str(&format!(
        "  <circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"rgba(200,200,200,0.1)\"/>\n",
        layout.center_x,
        layout.center_y,
        layout.radius + 10.0
    ));

    for (i, slice) in layout.slices.iter().enumerate() {
        let is_active = active == Some(i);
        let (dx, dy) = slice.offset(is_active);
        let path = wedge_path(
            layout.center_x + dx,
            layout.center_y + dy,
            layout.slice_radius(is_active),
            slice.start_angle,
            slice.end_angle,
        );
        svg.push_str(&format!(
            "  <path d=\"{}\" fill=\"url(#slice{})\" stroke=\"#fff\" stroke-width=\"2\"><title>{}</title></path>\n",
            path,
            i,
            escape(&slice.tooltip())
        ));

        if let Some((lx, ly)) = layout.label_position(i, is_active) {
            svg.push_str(&format!(
                "  <text x=\"{:.2}\" y=\"{:.2}\" fill=\"#fff\" font-size=\"12\" font-weight=\"bold\" text-anchor=\"middle\" dominant-baseline=\"middle\">{}%</text>\n",
                lx, ly, slice.percent
            ));
        }
    }

    // Legend
    let legend_top = layout.legend_top();
    svg.push_str(&format!(
        "  <rect x=\"{:.2}\" y=\"{:.2}\" width=\"{}\" height=\"{:.2}\" fill=\"rgba(255,255,255,0.1)\" stroke=\"rgba(200,200,200,0.3)\"/>\n",
        LEGEND_X - 10.0,
        legend_top,
        LEGEND_WIDTH,
        layout.slices.len() as f64 * LEGEND_ROW + 10.0
    ));
    let mut row_y = legend_top + 15.0;
    for (i, slice) in layout.slices.iter().enumerate() {
        let is_active = active == Some(i);
        svg.push_str(&format!(
            "  <rect x=\"{:.2}\" y=\"{:.2}\" width=\"16\" height=\"16\" rx=\"4\" fill=\"{}\"{}/>\n",
            LEGEND_X,
            row_y - 8.0,
            slice.color,
            if is_active { " stroke=\"#fff\" stroke-width=\"2\"" } else { "" }
        ));
        svg.push_str(&format!(
            "  <text x=\"{:.2}\" y=\"{:.2}\" font-size=\"12\"{} dominant-baseline=\"middle\">{} ({}) - {}%</text>\n",
            LEGEND_X + 24.0,
            row_y,
            if is_active { " font-weight=\"bold\"" } else { "" },
            escape(&slice.name),
            slice.count,
            slice.percent
        ));
        row_y += LEGEND_ROW;
    }

    svg.push_str("</svg>\n");
    svg
}

/// Render the cumulative ROI line chart
pub fn render_roi_svg(layout: &RoiLayout, date_format: &str) -> String {
    if layout.is_empty() {
        return empty_state(layout.width, layout.height);
    }

    let padding = layout.padding;
    let right = layout.width - padding;
    let baseline = layout.baseline();
    let mut svg = svg_open(layout.width, layout.height);

    svg.push_str("  <defs>\n");
    svg.push_str("    <linearGradient id=\"area\" x1=\"0\" y1=\"0\" x2=\"0\" y2=\"1\"><stop offset=\"0%\" stop-color=\"rgba(16,185,129,0.3)\"/><stop offset=\"100%\" stop-color=\"rgba(16,185,129,0.05)\"/></linearGradient>\n");
    svg.push_str("  </defs>\n");

    // Axes
    svg.push_str(&format!(
        "  <path d=\"M {p:.2} {p:.2} L {p:.2} {b:.2} L {r:.2} {b:.2}\" fill=\"none\" stroke=\"rgba(200,200,200,0.5)\"/>\n",
        p = padding,
        b = baseline,
        r = right
    ));

    for line in &layout.grid {
        svg.push_str(&format!(
            "  <line x1=\"{:.2}\" y1=\"{y:.2}\" x2=\"{:.2}\" y2=\"{y:.2}\" stroke=\"rgba(200,200,200,0.3)\" stroke-dasharray=\"5,5\"/>\n",
            padding,
            right,
            y = line.y
        ));
        svg.push_str(&format!(
            "  <text x=\"{:.2}\" y=\"{:.2}\" font-size=\"10\" fill=\"#666\" text-anchor=\"end\">{:.1}%</text>\n",
            padding - 5.0,
            line.y + 3.0,
            line.value
        ));
    }

    for &i in &layout.x_label_indices {
        let point = &layout.points[i];
        svg.push_str(&format!(
            "  <text x=\"{:.2}\" y=\"{:.2}\" font-size=\"10\" fill=\"#666\" text-anchor=\"middle\">{}</text>\n",
            point.x,
            baseline + 15.0,
            point.date.format(date_format)
        ));
    }

    // Area under the line, closed back along the baseline
    let mut area = format!("M {:.2} {:.2}", padding, baseline);
    for point in &layout.points {
        area.push_str(&format!(" L {:.2} {:.2}", point.x, point.y));
    }
    area.push_str(&format!(" L {:.2} {:.2} Z", right, baseline));
    svg.push_str(&format!("  <path d=\"{}\" fill=\"url(#area)\"/>\n", area));

    let line: Vec<String> = layout
        .points
        .iter()
        .map(|p| format!("{:.2},{:.2}", p.x, p.y))
        .collect();
    svg.push_str(&format!(
        "  <polyline points=\"{}\" fill=\"none\" stroke=\"#10b981\" stroke-width=\"3\" stroke-linejoin=\"round\"/>\n",
        line.join(" ")
    ));

    for point in &layout.points {
        svg.push_str(&format!(
            "  <circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"5\" fill=\"rgba(16,185,129,0.3)\"/>\n",
            point.x, point.y
        ));
        svg.push_str(&format!(
            "  <circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"4\" fill=\"#10b981\" stroke=\"#fff\" stroke-width=\"1.5\"><title>{}</title></circle>\n",
            point.x,
            point.y,
            escape(&point.tooltip(date_format))
        ));
    }

    svg.push_str("</svg>\n");
    svg
}
