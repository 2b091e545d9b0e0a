use crate::{
    aggregate::ReportAggregator,
    config::Config,
    dispatch::{GroupDispatcher, GroupOutcome},
    mail::Mailer,
    platform::AdsPlatform,
    util::now_rfc3339,
};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

pub struct Pipeline<P: AdsPlatform> {
    cfg: Config,
    platform: P,
    mailer: Option<Box<dyn Mailer>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub started: String,
    pub finished: String,
    pub preview: bool,
    pub groups: Vec<GroupOutcome>,
}

impl RunSummary {
    pub fn has_failures(&self) -> bool {
        self.groups
            .iter()
            .any(|g| matches!(g, GroupOutcome::Failed { .. }))
    }
}

impl<P: AdsPlatform> Pipeline<P> {
    pub fn new(cfg: &Config, platform: P, mailer: Option<Box<dyn Mailer>>) -> Self {
        Self {
            cfg: cfg.clone(),
            platform,
            mailer,
        }
    }

    /// Processes every label group in order. A group that fails is recorded
    /// and the remaining groups still run.
    pub fn run(&self, generated_at: &str) -> Result<RunSummary> {
        self.cfg.validate()?;

        let started = now_rfc3339();
        let aggregator = ReportAggregator::new(&self.cfg, self.mailer.as_deref(), generated_at);
        let dispatcher = GroupDispatcher::new(&self.cfg, &self.platform, aggregator);

        let mut groups = Vec::with_capacity(self.cfg.label_recipients.len());
        for group in &self.cfg.label_recipients {
            let outcome = match dispatcher.dispatch(group) {
                Ok(outcome) => outcome,
                Err(err) => {
                    error!("label {:?} failed: {err:#}", group.label);
                    GroupOutcome::Failed {
                        label: group.label.clone(),
                        error: format!("{err:#}"),
                    }
                }
            };
            groups.push(outcome);
        }

        info!(
            "run complete groups={} preview={}",
            groups.len(),
            self.cfg.mail.preview
        );

        Ok(RunSummary {
            started,
            finished: now_rfc3339(),
            preview: self.cfg.mail.preview,
            groups,
        })
    }
}
