// SVG charts for the dashboard.

use std::f64::consts::PI;
use std::fmt::{Result as FmtResult, Write};

use voter_fraud::{ConstituencyVoters, FraudTypeCount};

use crate::dashboard::render_html::escape_html;

/// A qualitative palette with twelve pastel colors.
pub const SET3: [&str; 12] = [
    "#8DD3C7", "#FFFFB3", "#BEBADA", "#FB8072", "#80B1D3", "#FDB462", "#B3DE69", "#FCCDE5",
    "#D9D9D9", "#BC80BD", "#CCEBC5", "#FFED6F",
];

// Ends of the sequential red scale.
const REDS_LOW: (f64, f64, f64) = (255.0, 245.0, 240.0);
const REDS_HIGH: (f64, f64, f64) = (103.0, 0.0, 13.0);

const PIE_RADIUS: f64 = 120.0;
const PIE_CENTER: (f64, f64) = (150.0, 150.0);

const BAR_WIDTH: f64 = 520.0;
const BAR_HEIGHT: f64 = 320.0;
const BAR_MARGIN_TOP: f64 = 30.0;
const BAR_MARGIN_BOTTOM: f64 = 50.0;
const BAR_MARGIN_SIDE: f64 = 40.0;

#[derive(PartialEq, Debug, Clone)]
pub struct PieSlice {
    pub label: String,
    pub count: u64,
    /// Angles in radians, clockwise from the top of the circle.
    pub start_angle: f64,
    pub end_angle: f64,
    pub percent: f64,
    pub color: &'static str,
}

pub fn pie_slices(distribution: &[FraudTypeCount]) -> Vec<PieSlice> {
    let total: u64 = distribution.iter().map(|c| c.count).sum();
    if total == 0 {
        return vec![];
    }
    let mut angle = 0.0;
    distribution
        .iter()
        .enumerate()
        .map(|(idx, c)| {
            let share = c.count as f64 / total as f64;
            let start_angle = angle;
            angle += share * 2.0 * PI;
            PieSlice {
                label: c.fraud_type.label().to_string(),
                count: c.count,
                start_angle,
                end_angle: angle,
                percent: share * 100.0,
                color: SET3[idx % SET3.len()],
            }
        })
        .collect()
}

fn point_on_circle(angle: f64) -> (f64, f64) {
    (
        PIE_CENTER.0 + PIE_RADIUS * angle.sin(),
        PIE_CENTER.1 - PIE_RADIUS * angle.cos(),
    )
}

pub fn render_pie_svg(svg: &mut String, slices: &[PieSlice], title: &str) -> FmtResult {
    write!(
        svg,
        r#"<svg class="chart pie" viewBox="0 0 300 300" role="img" aria-label="{}">"#,
        escape_html(title)
    )?;
    for s in slices {
        let tooltip = format!("{}: {} ({:.1}%)", s.label, s.count, s.percent);
        if s.end_angle - s.start_angle >= 2.0 * PI - 1e-9 {
            // An arc cannot describe a full circle.
            write!(
                svg,
                r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}"><title>{}</title></circle>"#,
                PIE_CENTER.0,
                PIE_CENTER.1,
                PIE_RADIUS,
                s.color,
                escape_html(&tooltip)
            )?;
            continue;
        }
        let (x0, y0) = point_on_circle(s.start_angle);
        let (x1, y1) = point_on_circle(s.end_angle);
        let large_arc = if s.end_angle - s.start_angle > PI { 1 } else { 0 };
        write!(
            svg,
            r##"<path d="M {:.2} {:.2} L {:.2} {:.2} A {:.2} {:.2} 0 {} 1 {:.2} {:.2} Z" fill="{}" stroke="#ffffff"><title>{}</title></path>"##,
            PIE_CENTER.0,
            PIE_CENTER.1,
            x0,
            y0,
            PIE_RADIUS,
            PIE_RADIUS,
            large_arc,
            x1,
            y1,
            s.color,
            escape_html(&tooltip)
        )?;
    }
    svg.push_str("</svg>");
    Ok(())
}

/// The color of a value on the red scale, from light (0) to dark (max).
pub fn reds(value: u64, max: u64) -> String {
    let t = if max == 0 {
        0.0
    } else {
        value as f64 / max as f64
    };
    let mix = |a: f64, b: f64| (a + (b - a) * t).round() as u8;
    format!(
        "#{:02x}{:02x}{:02x}",
        mix(REDS_LOW.0, REDS_HIGH.0),
        mix(REDS_LOW.1, REDS_HIGH.1),
        mix(REDS_LOW.2, REDS_HIGH.2)
    )
}

#[derive(PartialEq, Debug, Clone)]
pub struct Bar {
    pub label: String,
    pub value: u64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: String,
}

pub fn bars(counts: &[ConstituencyVoters]) -> Vec<Bar> {
    let max = counts.iter().map(|c| c.suspicious_voters).max().unwrap_or(0);
    if counts.is_empty() || max == 0 {
        return vec![];
    }
    let plot_height = BAR_HEIGHT - BAR_MARGIN_TOP - BAR_MARGIN_BOTTOM;
    let slot = (BAR_WIDTH - 2.0 * BAR_MARGIN_SIDE) / counts.len() as f64;
    counts
        .iter()
        .enumerate()
        .map(|(idx, c)| {
            let height = c.suspicious_voters as f64 / max as f64 * plot_height;
            Bar {
                label: c.constituency.clone(),
                value: c.suspicious_voters,
                x: BAR_MARGIN_SIDE + idx as f64 * slot + slot * 0.1,
                y: BAR_MARGIN_TOP + plot_height - height,
                width: slot * 0.8,
                height,
                color: reds(c.suspicious_voters, max),
            }
        })
        .collect()
}

pub fn render_bar_svg(svg: &mut String, bars: &[Bar], title: &str) -> FmtResult {
    let baseline = BAR_HEIGHT - BAR_MARGIN_BOTTOM;
    write!(
        svg,
        r#"<svg class="chart bar" viewBox="0 0 {} {}" role="img" aria-label="{}">"#,
        BAR_WIDTH,
        BAR_HEIGHT,
        escape_html(title)
    )?;
    write!(
        svg,
        r##"<line x1="{m}" y1="{b}" x2="{e}" y2="{b}" stroke="#888888"/>"##,
        m = BAR_MARGIN_SIDE,
        e = BAR_WIDTH - BAR_MARGIN_SIDE,
        b = baseline
    )?;
    for bar in bars {
        let center = bar.x + bar.width / 2.0;
        write!(
            svg,
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}"><title>{}: {}</title></rect>"#,
            bar.x,
            bar.y,
            bar.width,
            bar.height,
            bar.color,
            escape_html(&bar.label),
            bar.value
        )?;
        // Values are written above the bars.
        write!(
            svg,
            r#"<text x="{:.2}" y="{:.2}" text-anchor="middle" class="value">{}</text>"#,
            center,
            bar.y - 6.0,
            bar.value
        )?;
        write!(
            svg,
            r#"<text x="{:.2}" y="{:.2}" text-anchor="middle" class="axis">{}</text>"#,
            center,
            baseline + 18.0,
            escape_html(&bar.label)
        )?;
    }
    svg.push_str("</svg>");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use voter_fraud::FraudType;

    fn dist(counts: &[(&str, u64)]) -> Vec<FraudTypeCount> {
        counts
            .iter()
            .map(|(l, c)| FraudTypeCount {
                fraud_type: FraudType::from_label(l),
                count: *c,
            })
            .collect()
    }

    #[test]
    fn slices_cover_the_circle() {
        let slices = pie_slices(&dist(&[("legitimate", 6), ("double_voting", 3), ("other", 1)]));
        assert_eq!(slices.len(), 3);
        assert_eq!(slices[0].start_angle, 0.0);
        assert!((slices[2].end_angle - 2.0 * PI).abs() < 1e-9);
        assert!((slices[0].percent - 60.0).abs() < 1e-9);
        let total: f64 = slices.iter().map(|s| s.percent).sum();
        assert!((total - 100.0).abs() < 1e-9);
        assert_eq!(slices[1].color, SET3[1]);
    }

    #[test]
    fn empty_pie() {
        assert!(pie_slices(&[]).is_empty());
        let mut svg = String::new();
        render_pie_svg(&mut svg, &[], "t").unwrap();
        assert_eq!(svg.matches("<path").count(), 0);
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn single_slice_is_a_circle() {
        let mut svg = String::new();
        render_pie_svg(&mut svg, &pie_slices(&dist(&[("legitimate", 4)])), "Votes").unwrap();
        assert!(svg.contains("<circle"));
        assert!(!svg.contains("<path"));
        assert!(svg.contains("legitimate: 4 (100.0%)"));
    }

    #[test]
    fn bars_are_proportional() {
        let counts = vec![
            ConstituencyVoters {
                constituency: "A".to_string(),
                suspicious_voters: 4,
            },
            ConstituencyVoters {
                constituency: "B".to_string(),
                suspicious_voters: 2,
            },
        ];
        let b = bars(&counts);
        assert_eq!(b.len(), 2);
        assert!((b[0].height - 2.0 * b[1].height).abs() < 1e-9);
        assert!(b[0].y < b[1].y);
        assert_eq!(b[0].color, "#67000d");
        let mut svg = String::new();
        render_bar_svg(&mut svg, &b, "Suspicious Voters by Constituency").unwrap();
        assert_eq!(svg.matches("<rect").count(), 2);
        assert!(svg.contains(">4</text>"));
    }

    #[test]
    fn red_scale() {
        assert_eq!(reds(0, 10), "#fff5f0");
        assert_eq!(reds(10, 10), "#67000d");
        assert_eq!(reds(0, 0), "#fff5f0");
    }
}
