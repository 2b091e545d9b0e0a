use crate::report::{AccountScanResult, MergedReport, MergedTotals, PolicyInfo};
use regex::Regex;
use std::fmt::Write as _;
use std::sync::LazyLock;

static BLOCK_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(p|h[1-6]|tr|div|table)>").expect("valid block-end regex")
});
static CELL_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</t[dh]>").expect("valid cell-end regex"));
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));
static BLANK_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*(\n[ \t]*)+").expect("valid blank-run regex"));

const TABLE_OPEN: &str =
    r#"<table cellpadding="4" cellspacing="0" border="1" style="border-collapse:collapse;font-size:12px">"#;

#[derive(Debug, Clone)]
pub struct RenderSettings<'a> {
    pub subject_prefix: &'a str,
    pub include_zero_row_sections: bool,
    pub preview: bool,
    pub generated_at: &'a str,
}

pub fn subject(prefix: &str, label: &str, totals: &MergedTotals) -> String {
    let flag = if totals.disapprovals() > 0 { "FOUND" } else { "NONE" };
    format!(
        "{prefix} — {label} — {flag} (Ads:{}, KW:{}, Assets:{})",
        totals.ads, totals.keywords, totals.assets
    )
}

/// Deterministic: the same report and settings always yield the same bytes.
pub fn render_html(report: &MergedReport, settings: &RenderSettings<'_>) -> String {
    let t = &report.totals;
    let mut out = String::new();

    out.push_str("<html><body style=\"font-family:Arial,Helvetica,sans-serif;font-size:13px;color:#222\">\n");
    let _ = writeln!(
        out,
        "<h2>Policy disapprovals: {}</h2>",
        escape_html(&report.label)
    );
    let _ = writeln!(
        out,
        "<p><strong>Accounts:</strong> {} &nbsp; <strong>Ads:</strong> {} &nbsp; <strong>Keywords:</strong> {} &nbsp; <strong>Assets:</strong> {}</p>",
        t.accounts, t.ads, t.keywords, t.assets
    );
    if settings.preview {
        out.push_str("<p style=\"color:#a00\"><strong>PREVIEW MODE:</strong> this message was logged, not sent.</p>\n");
    }

    if report.rows.is_empty() {
        if report.failed_accounts == 0 {
            let _ = writeln!(
                out,
                "<p><em>No accounts matched label \"{}\".</em></p>",
                escape_html(&report.label)
            );
        } else {
            out.push_str("<p><em>No account results available.</em></p>\n");
        }
    }

    for row in &report.rows {
        render_account(&mut out, row, settings);
    }

    let _ = writeln!(
        out,
        "<p style=\"color:#888;font-size:11px\">Generated {}</p>",
        escape_html(settings.generated_at)
    );
    out.push_str("</body></html>\n");
    out
}

fn render_account(out: &mut String, row: &AccountScanResult, settings: &RenderSettings<'_>) {
    let title = if row.account_name.is_empty() {
        escape_html(&row.account)
    } else {
        format!("{} ({})", escape_html(&row.account_name), escape_html(&row.account))
    };
    let _ = writeln!(out, "<h3>{title}</h3>");

    if row.totals.sum() == 0 && !settings.include_zero_row_sections {
        out.push_str("<p><em>No disapproved items.</em></p>\n");
        return;
    }

    section(
        out,
        "Ads",
        &["Type", "Campaign", "Ad group", "Status"],
        row.ads
            .iter()
            .map(|a| {
                (
                    vec![
                        a.ad_type.as_str(),
                        a.campaign.as_str(),
                        a.ad_group.as_str(),
                        status_text(a.status.as_deref()),
                    ],
                    &a.policy,
                )
            })
            .collect(),
        settings,
    );
    section(
        out,
        "Keywords",
        &["Text", "Match", "Campaign", "Ad group", "Status"],
        row.keywords
            .iter()
            .map(|k| {
                (
                    vec![
                        k.text.as_str(),
                        k.match_type.as_str(),
                        k.campaign.as_str(),
                        k.ad_group.as_str(),
                        status_text(k.status.as_deref()),
                    ],
                    &k.policy,
                )
            })
            .collect(),
        settings,
    );
    section(
        out,
        "Assets",
        &["Type", "Name", "Status"],
        row.assets
            .iter()
            .map(|a| {
                (
                    vec![a.asset_type.as_str(), a.name.as_str(), a.status.as_str()],
                    &a.policy,
                )
            })
            .collect(),
        settings,
    );
}

fn status_text(status: Option<&str>) -> &str {
    status.unwrap_or("(unknown)")
}

fn section(
    out: &mut String,
    title: &str,
    columns: &[&str],
    rows: Vec<(Vec<&str>, &PolicyInfo)>,
    settings: &RenderSettings<'_>,
) {
    if rows.is_empty() && !settings.include_zero_row_sections {
        return;
    }

    let _ = writeln!(out, "<h4>{title} ({})</h4>", rows.len());
    if rows.is_empty() {
        out.push_str("<p><em>None</em></p>\n");
        return;
    }

    out.push_str(TABLE_OPEN);
    out.push_str("\n<tr style=\"background:#eee\">");
    for col in columns.iter().chain(["Policy topics", "Reasons"].iter()) {
        let _ = write!(out, "<th align=\"left\">{col}</th>");
    }
    out.push_str("</tr>\n");

    for (cells, policy) in rows {
        out.push_str("<tr>");
        for cell in cells {
            let _ = write!(out, "<td>{}</td>", escape_html(cell));
        }
        let _ = write!(
            out,
            "<td>{}</td><td>{}</td>",
            escape_html(&policy.topics.join("; ")),
            escape_html(&policy.reasons.join("; "))
        );
        out.push_str("</tr>\n");
    }
    out.push_str("</table>\n");
}

pub fn html_to_text(html: &str) -> String {
    let s = CELL_END.replace_all(html, "\t");
    let s = BLOCK_END.replace_all(&s, "\n");
    let s = TAG.replace_all(&s, "");
    let s = unescape_html(&s);
    let s = s
        .lines()
        .map(|l| l.trim_end())
        .collect::<Vec<_>>()
        .join("\n");
    BLANK_RUNS.replace_all(&s, "\n\n").trim().to_string()
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn unescape_html(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
