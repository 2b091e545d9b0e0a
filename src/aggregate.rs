use crate::{
    config::Config,
    dispatch::{resolve_recipient, RoutingContext},
    fanout::ExecutionResult,
    mail::{Mailer, OutgoingMail},
    render::{self, RenderSettings},
    report::{AccountScanResult, MergedReport, MergedTotals},
    util::{ensure_dir, sha256_hex, slugify},
};
use anyhow::{anyhow, Context, Result};
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct Delivery {
    pub report: MergedReport,
    pub mail: OutgoingMail,
    pub body_sha256: String,
    pub sent: bool,
}

/// Folds worker outcomes into one report. Outcomes without a usable value
/// are excluded and only counted.
pub fn merge(label: &str, results: &[ExecutionResult]) -> MergedReport {
    let mut rows: Vec<AccountScanResult> = Vec::new();
    let mut totals = MergedTotals::default();
    let mut failed_accounts = 0;

    for result in results {
        let Some(raw) = result.return_value.as_deref() else {
            debug!(
                "account {} returned no value: {}",
                result.customer_id,
                result.error.as_deref().unwrap_or("no error recorded")
            );
            failed_accounts += 1;
            continue;
        };

        let row: AccountScanResult = match serde_json::from_str(raw) {
            Ok(row) => row,
            Err(err) => {
                warn!("account {} returned unreadable result: {err}", result.customer_id);
                failed_accounts += 1;
                continue;
            }
        };

        totals.accounts += 1;
        totals.ads += row.totals.ads;
        totals.keywords += row.totals.keywords;
        totals.assets += row.totals.assets;
        rows.push(row);
    }

    MergedReport {
        label: label.to_string(),
        rows,
        totals,
        failed_accounts,
    }
}

pub struct ReportAggregator<'a> {
    cfg: &'a Config,
    mailer: Option<&'a dyn Mailer>,
    generated_at: &'a str,
}

impl<'a> ReportAggregator<'a> {
    /// `mailer` may be `None` only when `mail.preview` is set.
    pub fn new(cfg: &'a Config, mailer: Option<&'a dyn Mailer>, generated_at: &'a str) -> Self {
        Self {
            cfg,
            mailer,
            generated_at,
        }
    }

    pub fn preview(&self) -> bool {
        self.cfg.mail.preview
    }

    pub fn compose(&self, report: &MergedReport, to: &str, cc: &str) -> OutgoingMail {
        let settings = RenderSettings {
            subject_prefix: &self.cfg.report.subject_prefix,
            include_zero_row_sections: self.cfg.report.include_zero_row_sections,
            preview: self.preview(),
            generated_at: self.generated_at,
        };
        let html_body = render::render_html(report, &settings);
        OutgoingMail {
            to: to.to_string(),
            cc: cc.trim().to_string(),
            subject: render::subject(settings.subject_prefix, &report.label, &report.totals),
            text_body: render::html_to_text(&html_body),
            html_body,
            from_name: self.cfg.report.from_name.clone(),
        }
    }

    pub fn aggregate(&self, results: Vec<ExecutionResult>, context: &str) -> Result<Delivery> {
        let ctx = RoutingContext::from_json(context)?;
        let to = resolve_recipient(&ctx.to, &self.cfg.report.default_to)
            .ok_or_else(|| anyhow!("label {:?} reached aggregation without a recipient", ctx.label))?;

        let report = merge(&ctx.label, &results);
        let mail = self.compose(&report, &to, &ctx.cc);
        let body_sha256 = sha256_hex(mail.html_body.as_bytes());

        if self.cfg.report.log_summary {
            info!(
                label = %report.label,
                accounts = report.totals.accounts,
                failed_accounts = report.failed_accounts,
                ads = report.totals.ads,
                keywords = report.totals.keywords,
                assets = report.totals.assets,
                "disapproval summary"
            );
        }

        let sent = if self.preview() {
            info!(
                "preview: would send to={} cc={} subject={:?} html_bytes={}",
                mail.to,
                mail.cc,
                mail.subject,
                mail.html_body.len()
            );
            false
        } else {
            let mailer = self
                .mailer
                .ok_or_else(|| anyhow!("no mail transport configured and preview=false"))?;
            mailer
                .send(&mail)
                .with_context(|| format!("sending report for label {:?}", report.label))?;
            true
        };

        // Best effort; delivery has already happened.
        if !self.cfg.output.dump_dir.is_empty() {
            if let Err(err) = dump_artifacts(Path::new(&self.cfg.output.dump_dir), &report, &mail) {
                warn!("writing report artifacts for label {:?} failed: {err:#}", report.label);
            }
        }

        Ok(Delivery {
            report,
            mail,
            body_sha256,
            sent,
        })
    }
}

fn dump_artifacts(dir: &Path, report: &MergedReport, mail: &OutgoingMail) -> Result<()> {
    ensure_dir(dir)?;
    let stem = artifact_stem(&report.label);
    let html_path = dir.join(format!("{stem}.html"));
    std::fs::write(&html_path, &mail.html_body)
        .with_context(|| format!("writing {}", html_path.display()))?;
    let json_path = dir.join(format!("{stem}.json"));
    std::fs::write(&json_path, serde_json::to_string_pretty(report)?)
        .with_context(|| format!("writing {}", json_path.display()))?;
    debug!("dumped report artifacts to {}", dir.display());
    Ok(())
}

/// File stem for a label's artifacts. Distinct labels can share a slug, so a
/// short digest of the exact label keeps their files apart.
pub fn artifact_stem(label: &str) -> String {
    format!("{}-{}", slugify(label), &sha256_hex(label.as_bytes())[..8])
}
