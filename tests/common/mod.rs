#![allow(dead_code)]

use anyhow::{bail, Result};
use disapproval_report::{
    config::{Config, LabelGroup},
    mail::{Mailer, OutgoingMail},
    platform::SnapshotPlatform,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct RecordingMailer {
    pub sent: Arc<Mutex<Vec<OutgoingMail>>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }
}

impl Mailer for RecordingMailer {
    fn send(&self, mail: &OutgoingMail) -> Result<()> {
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

/// Refuses to send anything addressed to `reject_to`.
pub struct RejectingMailer {
    pub reject_to: String,
    pub inner: RecordingMailer,
}

impl Mailer for RejectingMailer {
    fn send(&self, mail: &OutgoingMail) -> Result<()> {
        if mail.to == self.reject_to {
            bail!("mailbox unavailable: {}", mail.to);
        }
        self.inner.send(mail)
    }
}

pub fn group(label: &str, to: &str) -> LabelGroup {
    LabelGroup {
        label: label.into(),
        to: to.into(),
        cc: "".into(),
    }
}

pub fn config(groups: Vec<LabelGroup>) -> Config {
    let mut cfg = Config::default();
    cfg.label_recipients = groups;
    cfg.mail.preview = false;
    cfg.report.log_summary = false;
    cfg
}

pub fn ad(status: Value, topics: Value) -> Value {
    json!({
        "type": "RESPONSIVE_SEARCH_AD",
        "campaign": "Brand",
        "ad_group": "Core",
        "approval_status": status,
        "policy_topics": topics,
    })
}

pub fn keyword(text: &str, status: Value) -> Value {
    json!({
        "text": text,
        "match_type": "BROAD",
        "campaign": "Generic",
        "ad_group": "Outdoor",
        "approval_status": status,
    })
}

pub fn asset(name: &str, status: Value) -> Value {
    json!({ "type": "IMAGE", "name": name, "approval_status": status })
}

/// One account under "Managed by Sam" with 2 disapproved ads, 1 disapproved
/// keyword and no disapproved assets, plus an unrelated account.
pub fn sam_platform() -> SnapshotPlatform {
    SnapshotPlatform::from_value(json!({
        "accounts": [
            {
                "customer_id": "123-456-7890",
                "name": "Acme",
                "labels": ["Managed by Sam"],
                "ads": [
                    ad(json!("disapproved"), json!([{"topic_name": "Trademarks", "evidences": ["acme®"]}])),
                    ad(json!("approved_limited"), json!(["Alcohol"])),
                    ad(json!("approved"), json!(null)),
                ],
                "keywords": [
                    keyword("cheap rifles", json!("disapproved")),
                    keyword("tents", json!("approved")),
                ],
                "assets": [asset("logo.png", json!("approved"))],
            },
            {
                "customer_id": "999-999-9999",
                "name": "Other",
                "labels": ["Managed by Kim"],
                "ads": [ad(json!("disapproved"), json!(null))],
                "keywords": [],
                "assets": [],
            }
        ]
    }))
    .unwrap()
}
