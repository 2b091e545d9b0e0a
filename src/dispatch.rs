use crate::{
    aggregate::{Delivery, ReportAggregator},
    config::{Config, LabelGroup},
    fanout::ParallelExecutor,
    platform::{AccountSelector, AdsPlatform},
    report::MergedTotals,
    scanner,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingContext {
    pub label: String,
    pub to: String,
    pub cc: String,
}

impl RoutingContext {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).with_context(|| "serializing routing context")
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).with_context(|| format!("parsing routing context: {raw}"))
    }
}

/// `to` if set, otherwise the configured default; `None` when both are blank.
pub fn resolve_recipient(to: &str, default_to: &str) -> Option<String> {
    [to, default_to]
        .into_iter()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub label: String,
    pub to: String,
    pub cc: String,
    pub subject: String,
    pub totals: MergedTotals,
    pub failed_accounts: usize,
    pub body_sha256: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GroupOutcome {
    Sent(GroupSummary),
    Previewed(GroupSummary),
    SkippedNoRecipient { label: String },
    Failed { label: String, error: String },
}

impl GroupOutcome {
    pub fn label(&self) -> &str {
        match self {
            GroupOutcome::Sent(s) | GroupOutcome::Previewed(s) => &s.label,
            GroupOutcome::SkippedNoRecipient { label } | GroupOutcome::Failed { label, .. } => label,
        }
    }

    fn from_delivery(delivery: Delivery) -> Self {
        let summary = GroupSummary {
            label: delivery.report.label,
            to: delivery.mail.to,
            cc: delivery.mail.cc,
            subject: delivery.mail.subject,
            totals: delivery.report.totals,
            failed_accounts: delivery.report.failed_accounts,
            body_sha256: delivery.body_sha256,
        };
        if delivery.sent {
            GroupOutcome::Sent(summary)
        } else {
            GroupOutcome::Previewed(summary)
        }
    }
}

pub struct GroupDispatcher<'a> {
    cfg: &'a Config,
    platform: &'a dyn AdsPlatform,
    executor: ParallelExecutor,
    aggregator: ReportAggregator<'a>,
}

impl<'a> GroupDispatcher<'a> {
    pub fn new(
        cfg: &'a Config,
        platform: &'a dyn AdsPlatform,
        aggregator: ReportAggregator<'a>,
    ) -> Self {
        Self {
            cfg,
            platform,
            executor: ParallelExecutor::new(cfg.platform.max_parallel_accounts),
            aggregator,
        }
    }

    pub fn dispatch(&self, group: &LabelGroup) -> Result<GroupOutcome> {
        let Some(to) = resolve_recipient(&group.to, &self.cfg.report.default_to) else {
            info!("label {:?}: no recipient and no default_to; skipping", group.label);
            return Ok(GroupOutcome::SkippedNoRecipient {
                label: group.label.clone(),
            });
        };

        let selector = AccountSelector::with_label(&group.label);
        let mut accounts = self
            .platform
            .select_accounts(&selector)
            .with_context(|| format!("selecting accounts: {}", selector.condition()))?;

        let cap = self.cfg.platform.max_accounts_per_fanout;
        if cap > 0 && accounts.len() > cap {
            warn!(
                "label {:?} matched {} accounts; only the first {} are scanned",
                group.label,
                accounts.len(),
                cap
            );
            accounts.truncate(cap);
        }

        info!("label {:?}: scanning {} account(s)", group.label, accounts.len());

        let context = RoutingContext {
            label: group.label.clone(),
            to,
            cc: group.cc.clone(),
        }
        .to_json()?;

        let cfg = self.cfg;
        let delivery = self.executor.execute_in_parallel(
            &accounts,
            |account| scanner::run_worker(cfg, account),
            |results, ctx| self.aggregator.aggregate(results, ctx),
            &context,
        )?;

        Ok(GroupOutcome::from_delivery(delivery))
    }
}
