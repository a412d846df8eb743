use crate::models::{Mood, MoodCount};
use crate::ui::escape_html;
use std::fmt::Write;

const WIDTH: f64 = 600.0;
const HEIGHT: f64 = 300.0;
const PADDING_LEFT: f64 = 48.0;
const PADDING_RIGHT: f64 = 24.0;
const PADDING_TOP: f64 = 56.0;
const PADDING_BOTTOM: f64 = 48.0;
const FALLBACK_COLORS: [&str; 3] = ["#8b857d", "#a07cc5", "#3f9ea8"];

pub const CHART_TITLE: &str = "Mood Counts Today";

pub fn render_bar_chart(counts: &[MoodCount]) -> String {
    let max = counts.iter().map(|entry| entry.count).max().unwrap_or(0).max(1);
    let step = tick_step(max);
    let top = step * max.div_ceil(step);

    let plot_width = WIDTH - PADDING_LEFT - PADDING_RIGHT;
    let plot_height = HEIGHT - PADDING_TOP - PADDING_BOTTOM;
    let baseline = HEIGHT - PADDING_BOTTOM;
    let y = |value: u64| baseline - value as f64 / top as f64 * plot_height;

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg class="mood-chart" viewBox="0 0 {WIDTH} {HEIGHT}" role="img" aria-label="{CHART_TITLE}">"#
    );
    let _ = write!(
        svg,
        r#"<text class="chart-title" x="{}" y="28" text-anchor="middle">{CHART_TITLE}</text>"#,
        WIDTH / 2.0
    );

    let mut tick = 0;
    while tick <= top {
        let y_pos = y(tick);
        let _ = write!(
            svg,
            r#"<line class="chart-grid" x1="{PADDING_LEFT}" y1="{y_pos:.1}" x2="{}" y2="{y_pos:.1}" />"#,
            WIDTH - PADDING_RIGHT
        );
        let _ = write!(
            svg,
            r#"<text class="chart-label" x="{}" y="{:.1}" text-anchor="end">{tick}</text>"#,
            PADDING_LEFT - 10.0,
            y_pos + 4.0
        );
        tick += step;
    }

    let slot = plot_width / counts.len().max(1) as f64;
    let bar_width = (slot * 0.6).min(96.0);
    let mut fallback = FALLBACK_COLORS.iter().cycle();

    for (index, entry) in counts.iter().enumerate() {
        let color = match Mood::from_symbol(&entry.mood) {
            Some(mood) => mood.color(),
            None => fallback.next().copied().unwrap_or("#8b857d"),
        };
        let center = PADDING_LEFT + slot * (index as f64 + 0.5);
        let bar_top = y(entry.count);
        let mood = escape_html(&entry.mood);

        let _ = write!(
            svg,
            r#"<rect class="chart-bar" x="{:.1}" y="{bar_top:.1}" width="{bar_width:.1}" height="{:.1}" rx="6" fill="{color}"><title>{mood}: {}</title></rect>"#,
            center - bar_width / 2.0,
            baseline - bar_top,
            entry.count
        );
        let _ = write!(
            svg,
            r#"<text class="chart-value" x="{center:.1}" y="{:.1}" text-anchor="middle">{}</text>"#,
            bar_top - 8.0,
            entry.count
        );
        let _ = write!(
            svg,
            r#"<text class="chart-mood" x="{center:.1}" y="{:.1}" text-anchor="middle">{mood}</text>"#,
            baseline + 30.0
        );
    }

    svg.push_str("</svg>");
    svg
}

// Keeps roughly four gridlines regardless of how large the counts get.
fn tick_step(max: u64) -> u64 {
    let rough = max.div_ceil(4).max(1);
    let magnitude = 10u64.pow(rough.ilog10());
    [1, 2, 5, 10]
        .into_iter()
        .map(|factor| factor * magnitude)
        .find(|step| *step >= rough)
        .unwrap_or(rough)
}
