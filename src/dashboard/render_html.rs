//! HTML rendering of the dashboard.
//!
//! The page is a pure function of the loaded table, the settings and the selections.
//! It is self-contained: the charts are inline SVG and the tabs only use CSS.

use std::fmt::{Result as FmtResult, Write};

use snafu::prelude::*;
use voter_fraud::{voter_details, DashboardData, FraudCategory, Metrics, VoterId, UNKNOWN_CLAIM};

use crate::dashboard::charts::{bars, pie_slices, render_bar_svg, render_pie_svg};
use crate::dashboard::config_reader::RenderSettings;
use crate::dashboard::images::{render_gallery, Gallery, ImageTile};
use crate::dashboard::io_common::simplify_file_name;
use crate::dashboard::view::{AnalyticsTab, Stage, ViewState};
use crate::dashboard::*;

pub const FOOTER: &str = "Voter Fraud Detection System | Powered by FaceNet";

const STYLE: &str = r#"
:root { --bg: #ffffff; --card: #f6f8fa; --border: #d0d7de; --text: #1f2328; --dim: #656d76;
        --info-bg: #ddf4ff; --ok-bg: #dafbe1; --error-bg: #ffebe9; }
* { box-sizing: border-box; }
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
       color: var(--text); background: var(--bg); margin: 0; }
.container { max-width: 1500px; margin: 0 auto; padding: 2rem; }
hr { border: none; border-top: 1px solid var(--border); margin: 2rem 0; }
.banner { padding: 0.75rem 1rem; border-radius: 6px; margin: 1rem 0; }
.banner.info { background: var(--info-bg); }
.banner.success { background: var(--ok-bg); }
.banner.error { background: var(--error-bg); }
.metrics { display: grid; grid-template-columns: repeat(5, 1fr); gap: 1rem; }
.metric { background: var(--card); border: 1px solid var(--border); border-radius: 8px; padding: 1rem; }
.metric-label { color: var(--dim); font-size: 0.875rem; }
.metric-value { font-size: 2rem; font-weight: 600; }
.split { display: grid; grid-template-columns: 2.5fr 0.3fr 2fr; }
.split > .left { grid-column: 1; }
.split > .right { grid-column: 3; }
table { border-collapse: collapse; width: 100%; margin: 0.5rem 0; }
th, td { border: 1px solid var(--border); padding: 0.35rem 0.6rem; text-align: left; }
th { background: var(--card); }
td.num { text-align: right; }
select { min-width: 20rem; padding: 0.3rem; }
.hint { color: var(--dim); font-size: 0.8rem; }
.gallery { display: grid; gap: 1rem; }
.gallery figure { margin: 0; }
.gallery figcaption { color: var(--dim); font-size: 0.8rem; }
.chart { width: 100%; max-width: 520px; }
.chart text.value { font-size: 12px; }
.chart text.axis { font-size: 11px; fill: var(--dim); }
.legend { list-style: none; padding: 0; }
.legend li { margin: 0.2rem 0; }
.swatch { display: inline-block; width: 0.9rem; height: 0.9rem; margin-right: 0.4rem; vertical-align: middle; }
.tabs > input { display: none; }
.tabs > label { display: inline-block; padding: 0.5rem 1rem; cursor: pointer; border-bottom: 2px solid transparent; }
.tab-panel { display: none; padding-top: 1rem; }
.caption { color: var(--dim); font-size: 0.8rem; }
"#;

/// Escapes the characters that have a meaning in HTML text and attributes.
pub fn escape_html(s: &str) -> String {
    let mut res = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => res.push_str("&amp;"),
            '<' => res.push_str("&lt;"),
            '>' => res.push_str("&gt;"),
            '"' => res.push_str("&quot;"),
            '\'' => res.push_str("&#39;"),
            c => res.push(c),
        }
    }
    res
}

fn info(out: &mut String, message: &str) -> FmtResult {
    write!(out, r#"<div class="banner info">{}</div>"#, escape_html(message))
}

fn write_head(out: &mut String, title: &str) -> FmtResult {
    write!(
        out,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{}</title>
<style>{}"#,
        escape_html(title),
        STYLE
    )?;
    // One rule per tab to show the panel of the checked radio button.
    for t in AnalyticsTab::ALL {
        write!(
            out,
            "#tab-{k}:checked ~ #panel-{k} {{ display: block; }}\n#tab-{k}:checked + label {{ border-bottom-color: #cf222e; font-weight: 600; }}\n",
            k = t.key()
        )?;
    }
    write!(
        out,
        "</style>\n</head>\n<body>\n<div class=\"container\">\n<h1>{}</h1>\n<hr>\n",
        escape_html(title)
    )
}

fn write_metrics(out: &mut String, metrics: &Metrics) -> FmtResult {
    let rate = metrics
        .fraud_rate_label()
        .unwrap_or_else(|| "n/a".to_string());
    let tiles: [(&str, String); 5] = [
        ("Total Votes", metrics.total_votes.to_string()),
        ("Legitimate Votes", metrics.legitimate_votes.to_string()),
        ("Suspicious Votes", metrics.suspicious_votes.to_string()),
        ("Unique Voters", metrics.unique_voters.to_string()),
        ("Fraud Rate", rate),
    ];
    out.push_str("<h2>Overview Statistics</h2>\n<div class=\"metrics\">");
    for (label, value) in tiles.iter() {
        write!(
            out,
            r#"<div class="metric"><div class="metric-label">{}</div><div class="metric-value">{}</div></div>"#,
            label,
            escape_html(value)
        )?;
    }
    out.push_str("</div>\n<hr>\n");
    Ok(())
}

fn write_select(
    out: &mut String,
    name: &str,
    label: &str,
    options: &[String],
    selected: &str,
) -> FmtResult {
    write!(
        out,
        r#"<label for="{n}">{}</label><br><select id="{n}" name="{n}">"#,
        escape_html(label),
        n = name
    )?;
    for o in options {
        write!(
            out,
            r#"<option value="{v}"{}>{v}</option>"#,
            if o == selected { " selected" } else { "" },
            v = escape_html(o)
        )?;
    }
    out.push_str("</select>\n");
    Ok(())
}

fn write_selectors(
    out: &mut String,
    data: &DashboardData,
    category: FraudCategory,
    voter: &VoterId,
) -> FmtResult {
    let categories: Vec<String> = data
        .categories
        .active()
        .iter()
        .map(|c| c.category.label().to_string())
        .collect();
    let voters: Vec<String> = data
        .categories
        .voter_options(category)
        .iter()
        .map(|v| v.to_string())
        .collect();
    out.push_str("<form class=\"selectors\">\n");
    write_select(
        out,
        "category",
        "Select a suspicious activity type",
        &categories,
        category.label(),
    )?;
    out.push_str("<br>\n");
    write_select(out, "voter", "Select a voter ID", &voters, voter.as_str())?;
    write!(
        out,
        r#"<p class="hint">Change the selection with --category {} --voter {}</p>"#,
        category.key(),
        escape_html(voter.as_str())
    )?;
    out.push_str("</form>\n");
    Ok(())
}

fn write_details(
    out: &mut String,
    settings: &RenderSettings,
    table: &LoadedTable,
    voter: &VoterId,
) -> FmtResult {
    write!(
        out,
        "<h3>Details for Voter ID: {}</h3>\n<table>\n<tr>",
        escape_html(voter.as_str())
    )?;
    for h in [
        "",
        "image_path",
        "registered_constituency",
        "voting_constituency",
        "claimed_voter_id",
        "fraud_type",
        "fraud_reason",
    ] {
        write!(out, "<th>{}</th>", h)?;
    }
    out.push_str("</tr>\n");
    let rows = voter_details(&table.records, voter);
    for (idx, r) in rows.iter().enumerate() {
        write!(
            out,
            "<tr><td class=\"num\">{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            idx,
            escape_html(&r.image_path),
            escape_html(&r.registered_constituency),
            escape_html(&r.voting_constituency),
            escape_html(r.claimed_voter_id.as_deref().unwrap_or("")),
            escape_html(r.fraud_type.label()),
            escape_html(&r.fraud_reason)
        )?;
    }
    out.push_str("</table>\n");

    let gallery = render_gallery(
        rows.iter().map(|r| r.image_path.as_str()),
        settings.image_root.as_deref(),
    );
    write_gallery(out, settings, &gallery)
}

fn write_gallery(out: &mut String, settings: &RenderSettings, gallery: &Gallery) -> FmtResult {
    write!(
        out,
        "<h3>Face Images</h3>\n<div class=\"gallery\" style=\"grid-template-columns: repeat({}, 1fr);\">\n",
        settings.gallery_columns
    )?;
    for tile in gallery.tiles.iter() {
        match tile {
            ImageTile::Loaded { src, caption } => write!(
                out,
                r#"<figure><img src="{}" width="{}" alt="{c}"><figcaption>{c}</figcaption></figure>"#,
                escape_html(src),
                settings.image_width,
                c = escape_html(caption)
            )?,
            ImageTile::Placeholder { path, message } => write!(
                out,
                r#"<figure><div class="banner error" title="{}">Cannot load image: {}</div></figure>"#,
                escape_html(message),
                escape_html(path)
            )?,
        }
        out.push('\n');
    }
    out.push_str("</div>\n");
    if gallery.failures > 0 {
        write!(
            out,
            r#"<p class="hint">{} of {} images could not be loaded.</p>"#,
            gallery.failures,
            gallery.tiles.len()
        )?;
    }
    Ok(())
}

fn write_distribution(out: &mut String, data: &DashboardData) -> FmtResult {
    out.push_str("<h2>Fraud Type Distribution</h2>\n");
    let slices = pie_slices(&data.distribution);
    if slices.is_empty() {
        return info(out, "No votes in the dataset.");
    }
    out.push_str("<h4>Distribution of Vote Types</h4>\n");
    render_pie_svg(out, &slices, "Distribution of Vote Types")?;
    out.push_str("\n<ul class=\"legend\">");
    for s in slices.iter() {
        write!(
            out,
            r#"<li><span class="swatch" style="background: {}"></span>{}: {} ({:.1}%)</li>"#,
            s.color,
            escape_html(&s.label),
            s.count,
            s.percent
        )?;
    }
    out.push_str("</ul>\n");
    Ok(())
}

fn write_constituencies(out: &mut String, data: &DashboardData) -> FmtResult {
    out.push_str("<h2>Constituency-wise Suspicious Votes</h2>\n");
    if data.metrics.suspicious_votes == 0 {
        return info(out, "No suspicious votes detected in the dataset.");
    }
    out.push_str("<h4>Suspicious Voters by Constituency</h4>\n");
    render_bar_svg(
        out,
        &bars(&data.constituency_voters),
        "Suspicious Voters by Constituency",
    )?;

    out.push_str("\n<h3>Detailed Constituency Breakdown</h3>\n<table>\n<tr><th>Constituency</th>");
    for ft in data.pivot.fraud_types.iter() {
        write!(out, "<th>{}</th>", escape_html(ft.label()))?;
    }
    out.push_str("</tr>\n");
    for (constituency, cells) in data.pivot.rows.iter() {
        write!(out, "<tr><th>{}</th>", escape_html(constituency))?;
        for c in cells {
            write!(out, "<td class=\"num\">{}</td>", c)?;
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</table>\n");
    Ok(())
}

fn write_table(out: &mut String, headers: &[&str], rows: &[Vec<String>]) -> FmtResult {
    out.push_str("<table>\n<tr><th></th>");
    for h in headers {
        write!(out, "<th>{}</th>", escape_html(h))?;
    }
    out.push_str("</tr>\n");
    for (idx, row) in rows.iter().enumerate() {
        write!(out, "<tr><td class=\"num\">{}</td>", idx)?;
        for cell in row {
            write!(out, "<td>{}</td>", escape_html(cell))?;
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</table>\n");
    Ok(())
}

fn write_tab_panel(out: &mut String, tab: AnalyticsTab, data: &DashboardData) -> FmtResult {
    write!(
        out,
        "<div class=\"tab-panel\" id=\"panel-{}\">\n",
        tab.key()
    )?;
    match tab {
        AnalyticsTab::IdentityTheft if data.identity_theft.is_empty() => {
            info(out, "No identity theft cases detected.")?
        }
        AnalyticsTab::IdentityTheft => {
            write!(
                out,
                "<p><strong>Total Identity Theft Cases:</strong> {}</p>\n",
                data.identity_theft.len()
            )?;
            let rows: Vec<Vec<String>> = data
                .identity_theft
                .iter()
                .map(|c| {
                    vec![
                        c.voter_id.to_string(),
                        c.claimed_voter_id
                            .clone()
                            .unwrap_or_else(|| UNKNOWN_CLAIM.to_string()),
                        c.constituency.clone(),
                    ]
                })
                .collect();
            write_table(
                out,
                &["Actual Voter (from face)", "Claimed Voter ID", "Constituency"],
                &rows,
            )?
        }
        AnalyticsTab::CrossConstituency if data.cross_constituency.is_empty() => {
            info(out, "No cross-constituency voting detected.")?
        }
        AnalyticsTab::CrossConstituency => {
            write!(
                out,
                "<p><strong>Total Cross-Constituency Cases:</strong> {}</p>\n",
                data.cross_constituency.len()
            )?;
            let rows: Vec<Vec<String>> = data
                .cross_constituency
                .iter()
                .map(|c| {
                    vec![
                        c.voter_id.to_string(),
                        c.registered_constituency.clone(),
                        c.voting_constituency.clone(),
                    ]
                })
                .collect();
            write_table(
                out,
                &["voter_id", "registered_constituency", "voting_constituency"],
                &rows,
            )?
        }
        AnalyticsTab::DoubleVoting if data.double_voting.is_empty() => {
            info(out, "No double voting detected.")?
        }
        AnalyticsTab::DoubleVoting => {
            write!(
                out,
                "<p><strong>Total Double Voting Cases:</strong> {}</p>\n",
                data.double_voting.len()
            )?;
            let rows: Vec<Vec<String>> = data
                .double_voting
                .iter()
                .map(|d| {
                    vec![
                        d.voter_id.to_string(),
                        d.number_of_votes.to_string(),
                        d.constituencies_label(),
                    ]
                })
                .collect();
            write_table(out, &["Voter ID", "Number of Votes", "Constituencies"], &rows)?
        }
    }
    out.push_str("</div>\n");
    Ok(())
}

fn write_tabs(out: &mut String, data: &DashboardData, active: AnalyticsTab) -> FmtResult {
    out.push_str("<h2>Advanced Analytics</h2>\n<div class=\"tabs\">\n");
    // The radio buttons must precede the panels for the CSS selectors to apply.
    for t in AnalyticsTab::ALL {
        write!(
            out,
            "<input type=\"radio\" name=\"analytics\" id=\"tab-{k}\"{}><label for=\"tab-{k}\">{}</label>\n",
            if t == active { " checked" } else { "" },
            t.label(),
            k = t.key()
        )?;
    }
    for t in AnalyticsTab::ALL {
        write_tab_panel(out, t, data)?;
    }
    out.push_str("</div>\n");
    Ok(())
}

fn write_loaded(
    out: &mut String,
    settings: &RenderSettings,
    stage: &Stage,
    table: &LoadedTable,
    view: &ViewState,
) -> FmtResult {
    let data = &table.data;
    write!(
        out,
        r#"<div class="banner success">File uploaded successfully! ({})</div>"#,
        escape_html(&simplify_file_name(&table.source))
    )?;
    out.push('\n');
    write_metrics(out, &data.metrics)?;

    out.push_str("<div class=\"split\">\n<div class=\"left\">\n<h2>Suspicious Voter Categories</h2>\n");
    match stage {
        Stage::Detail { category, voter } => {
            write_selectors(out, data, *category, voter)?;
            write_details(out, settings, table, voter)?;
        }
        _ => info(out, "No suspicious voters to select.")?,
    }
    out.push_str("</div>\n<div class=\"right\">\n");
    write_distribution(out, data)?;
    write_constituencies(out, data)?;
    out.push_str("</div>\n</div>\n<hr>\n");

    write_tabs(out, data, view.tab)
}

/// Renders the whole page.
pub fn render_page(
    settings: &RenderSettings,
    view: &ViewState,
    stage: &Stage,
    table: Option<&LoadedTable>,
) -> DashboardResult<String> {
    let mut out = String::new();
    write_head(&mut out, &settings.title).context(RenderingSnafu {})?;
    out.push_str("<h2>Upload Suspicious Votes File</h2>\n");
    match (stage, table) {
        (Stage::NoFile, _) | (_, None) => {
            info(&mut out, "Please upload a CSV file to begin analysis")
                .context(RenderingSnafu {})?;
        }
        (_, Some(t)) => {
            write_loaded(&mut out, settings, stage, t, view).context(RenderingSnafu {})?;
        }
    }
    write!(
        out,
        "\n<hr>\n<p class=\"caption\">{}</p>\n</div>\n</body>\n</html>\n",
        FOOTER
    )
    .context(RenderingSnafu {})?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::view::resolve_stage;
    use std::path::PathBuf;
    use voter_fraud::builder::Builder;
    use voter_fraud::VoteRecord;

    fn table(records: Vec<VoteRecord>) -> LoadedTable {
        LoadedTable::new("/uploads/votes.csv", records)
    }

    fn sample() -> LoadedTable {
        let mut b = Builder::new();
        b.add_vote("101", "North", "North", "legitimate")
            .add_identity_theft("102", "201", "North")
            .add_vote("103", "North", "South", "cross_constituency_voting")
            .add_vote("104", "South", "South", "double_voting")
            .add_vote("104", "South", "East", "double_voting");
        table(b.build())
    }

    fn render(t: Option<&LoadedTable>, category: Option<&str>, voter: Option<&str>) -> String {
        let view = ViewState::new(
            t.map(|_| PathBuf::from("votes.csv")),
            category,
            voter,
            Some("double-voting"),
        )
        .unwrap();
        let stage = resolve_stage(&view, t.map(|t| &t.data)).unwrap();
        render_page(&RenderSettings::default(), &view, &stage, t).unwrap()
    }

    #[test]
    fn escaping() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn prompt_without_file() {
        let html = render(None, None, None);
        assert!(html.contains("Please upload a CSV file to begin analysis"));
        assert!(!html.contains("Overview Statistics"));
        assert!(html.contains(FOOTER));
    }

    #[test]
    fn full_page() {
        let t = sample();
        let html = render(Some(&t), Some("double-voting"), Some("104"));
        assert!(html.contains("File uploaded successfully! (votes.csv)"));
        assert!(html.contains("Overview Statistics"));
        assert!(html.contains(r#"<div class="metric-label">Fraud Rate</div><div class="metric-value">80.0%</div>"#));
        assert!(html.contains("Details for Voter ID: 104"));
        assert_eq!(html.matches("Multiple voting attempts detected").count(), 2);
        assert!(html.contains(r#"<option value="Double Voting" selected>"#));
        // Empty categories are not offered.
        assert!(html.contains(r#"<option value="Same Constituency Identity Theft">"#));
        assert!(html.contains("Distribution of Vote Types"));
        assert!(html.contains("Detailed Constituency Breakdown"));
        assert!(html.contains(r#"id="tab-double-voting" checked"#));
        assert!(html.contains("<td>South, East</td>"));
        assert!(html.contains("Total Identity Theft Cases:</strong> 1"));
    }

    #[test]
    fn inactive_categories_are_not_listed() {
        let mut b = Builder::new();
        b.add_vote("1", "A", "A", "legitimate")
            .add_vote("2", "A", "B", "cross_constituency_voting");
        let t = table(b.build());
        let html = render(Some(&t), None, None);
        assert!(html.contains(r#"<option value="Cross-Constituency Voting" selected>"#));
        assert!(!html.contains(r#"<option value="Double Voting""#));
        assert!(!html.contains(r#"<option value="Same Constituency Identity Theft""#));
        assert!(html.contains("No identity theft cases detected."));
        assert!(html.contains("No double voting detected."));
    }

    #[test]
    fn missing_images_become_placeholders() {
        let t = sample();
        let html = render(Some(&t), Some("identity-theft"), None);
        assert!(html.contains("Cannot load image: images/102_1.jpg"));
        assert!(html.contains("1 of 1 images could not be loaded."));
        // The rest of the page is still rendered.
        assert!(html.contains("Advanced Analytics"));
    }

    #[test]
    fn empty_states() {
        let mut b = Builder::new();
        b.add_vote("1", "A", "A", "legitimate");
        let t = table(b.build());
        let html = render(Some(&t), None, None);
        assert!(html.contains("No suspicious votes detected in the dataset."));
        assert!(html.contains("No suspicious voters to select."));
        assert!(!html.contains("Detailed Constituency Breakdown"));
        assert!(html.contains("No cross-constituency voting detected."));
    }

    #[test]
    fn empty_table_has_no_fraud_rate() {
        let t = table(vec![]);
        let html = render(Some(&t), None, None);
        assert!(html.contains(r#"<div class="metric-label">Fraud Rate</div><div class="metric-value">n/a</div>"#));
        assert!(html.contains("No votes in the dataset."));
    }
}
