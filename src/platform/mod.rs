pub mod snapshot;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use snapshot::SnapshotPlatform;

/// Outcome of reading one optional accessor from a platform entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe<T> {
    Found(T),
    Missing,
    Failed(String),
}

impl<T> Probe<T> {
    pub fn ok(self) -> Option<T> {
        match self {
            Probe::Found(v) => Some(v),
            Probe::Missing | Probe::Failed(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Ads,
    Keywords,
    Assets,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Ads => "ads",
            Category::Keywords => "keywords",
            Category::Assets => "assets",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait TopicHandle {
    fn topic(&self) -> Probe<String>;
    fn id(&self) -> Probe<String>;
    fn raw_field(&self, name: &str) -> Probe<String>;
    fn evidences(&self) -> Probe<Vec<Probe<Vec<String>>>>;
}

pub trait EntityHandle {
    fn text_field(&self, name: &str) -> Probe<String>;
    fn approval_status(&self) -> Probe<String>;
    fn policy_topics(&self) -> Probe<Vec<Box<dyn TopicHandle + '_>>>;
}

pub trait AccountHandle: Sync {
    fn customer_id(&self) -> &str;
    fn name(&self) -> &str;
    fn entities(&self, category: Category, limit: usize)
        -> Result<Vec<Box<dyn EntityHandle + '_>>>;
}

pub trait AdsPlatform: Sync {
    fn select_accounts(&self, selector: &AccountSelector) -> Result<Vec<&dyn AccountHandle>>;
    fn account(&self, customer_id: &str) -> Result<&dyn AccountHandle>;
}

const LABEL_CONDITION_PREFIX: &str = "LabelNames CONTAINS '";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSelector {
    condition: String,
}

impl AccountSelector {
    pub fn with_label(label: &str) -> Self {
        Self {
            condition: format!("{LABEL_CONDITION_PREFIX}{}'", escape_condition_value(label)),
        }
    }

    pub fn condition(&self) -> &str {
        &self.condition
    }

    /// Recovers the exact label from a `LabelNames CONTAINS '...'` condition.
    pub fn label(&self) -> Result<String> {
        let inner = self
            .condition
            .strip_prefix(LABEL_CONDITION_PREFIX)
            .and_then(|rest| rest.strip_suffix('\''))
            .ok_or_else(|| anyhow!("unsupported account condition: {}", self.condition))?;

        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(ch) = chars.next() {
            match ch {
                '\\' => match chars.next() {
                    Some(next) => out.push(next),
                    None => return Err(anyhow!("dangling escape in condition: {}", self.condition)),
                },
                '\'' => return Err(anyhow!("unescaped quote in condition: {}", self.condition)),
                _ => out.push(ch),
            }
        }
        Ok(out)
    }
}

fn escape_condition_value(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if ch == '\\' || ch == '\'' {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
