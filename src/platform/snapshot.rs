use super::{AccountHandle, AccountSelector, AdsPlatform, Category, EntityHandle, Probe, TopicHandle};
use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Account fleet read from a JSON export. See the README for the format.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotPlatform {
    accounts: Vec<SnapshotAccount>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotAccount {
    customer_id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    ads: Option<Value>,
    #[serde(default)]
    keywords: Option<Value>,
    #[serde(default)]
    assets: Option<Value>,
}

impl SnapshotPlatform {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading account snapshot: {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("parsing account snapshot: {}", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let platform: SnapshotPlatform = serde_json::from_str(raw)?;
        debug!("snapshot loaded accounts={}", platform.accounts.len());
        Ok(platform)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

impl AdsPlatform for SnapshotPlatform {
    fn select_accounts(&self, selector: &AccountSelector) -> Result<Vec<&dyn AccountHandle>> {
        let label = selector.label()?;
        Ok(self
            .accounts
            .iter()
            .filter(|a| a.labels.iter().any(|l| *l == label))
            .map(|a| a as &dyn AccountHandle)
            .collect())
    }

    fn account(&self, customer_id: &str) -> Result<&dyn AccountHandle> {
        self.accounts
            .iter()
            .find(|a| a.customer_id == customer_id)
            .map(|a| a as &dyn AccountHandle)
            .ok_or_else(|| anyhow!("account not found in snapshot: {customer_id}"))
    }
}

impl AccountHandle for SnapshotAccount {
    fn customer_id(&self) -> &str {
        &self.customer_id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn entities(
        &self,
        category: Category,
        limit: usize,
    ) -> Result<Vec<Box<dyn EntityHandle + '_>>> {
        let raw = match category {
            Category::Ads => self.ads.as_ref(),
            Category::Keywords => self.keywords.as_ref(),
            Category::Assets => self.assets.as_ref(),
        };

        match raw {
            None | Some(Value::Null) => {
                bail!("{category} not available for account {}", self.customer_id)
            }
            Some(Value::Array(items)) => Ok(items
                .iter()
                .take(limit)
                .map(|v| Box::new(JsonEntity(v)) as Box<dyn EntityHandle + '_>)
                .collect()),
            Some(Value::Object(obj)) if obj.contains_key("error") => {
                let msg = obj.get("error").and_then(Value::as_str).unwrap_or("unknown error");
                bail!("{category} query failed for account {}: {msg}", self.customer_id)
            }
            Some(_) => bail!("{category} payload is not a list for account {}", self.customer_id),
        }
    }
}

fn text_of(obj: Option<&Value>, name: &str) -> Probe<String> {
    match obj.and_then(|o| o.get(name)) {
        None | Some(Value::Null) => Probe::Missing,
        Some(Value::String(s)) => Probe::Found(s.clone()),
        Some(Value::Number(n)) => Probe::Found(n.to_string()),
        Some(_) => Probe::Failed(format!("field `{name}` is not text")),
    }
}

struct JsonEntity<'a>(&'a Value);

impl EntityHandle for JsonEntity<'_> {
    fn text_field(&self, name: &str) -> Probe<String> {
        if !self.0.is_object() {
            return Probe::Failed("entity record is not an object".into());
        }
        text_of(Some(self.0), name)
    }

    fn approval_status(&self) -> Probe<String> {
        self.text_field("approval_status")
    }

    fn policy_topics(&self) -> Probe<Vec<Box<dyn TopicHandle + '_>>> {
        match self.0.get("policy_topics") {
            None | Some(Value::Null) => Probe::Missing,
            Some(Value::Array(items)) => Probe::Found(
                items
                    .iter()
                    .map(|v| Box::new(JsonTopic(v)) as Box<dyn TopicHandle + '_>)
                    .collect(),
            ),
            Some(_) => Probe::Failed("policy_topics is not a list".into()),
        }
    }
}

struct JsonTopic<'a>(&'a Value);

impl TopicHandle for JsonTopic<'_> {
    fn topic(&self) -> Probe<String> {
        match self.0 {
            Value::String(s) => Probe::Found(s.clone()),
            Value::Object(_) => text_of(Some(self.0), "topic_name"),
            _ => Probe::Failed("topic entry has no accessors".into()),
        }
    }

    fn id(&self) -> Probe<String> {
        match self.0 {
            Value::Object(_) => text_of(Some(self.0), "topic_id"),
            _ => Probe::Missing,
        }
    }

    fn raw_field(&self, name: &str) -> Probe<String> {
        match self.0 {
            Value::Object(_) => text_of(Some(self.0), name),
            _ => Probe::Missing,
        }
    }

    fn evidences(&self) -> Probe<Vec<Probe<Vec<String>>>> {
        let list = match self.0.get("evidences") {
            None | Some(Value::Null) => return Probe::Missing,
            Some(Value::Array(list)) => list,
            Some(_) => return Probe::Failed("evidences is not a list".into()),
        };
        Probe::Found(list.iter().map(evidence_texts).collect())
    }
}

fn evidence_texts(v: &Value) -> Probe<Vec<String>> {
    match v {
        Value::String(s) => Probe::Found(vec![s.clone()]),
        Value::Object(obj) => match obj.get("texts") {
            Some(Value::Array(texts)) => Probe::Found(
                texts
                    .iter()
                    .filter_map(|t| t.as_str().map(str::to_string))
                    .collect(),
            ),
            None | Some(Value::Null) => Probe::Missing,
            Some(_) => Probe::Failed("evidence texts is not a list".into()),
        },
        _ => Probe::Failed("evidence entry is neither text nor object".into()),
    }
}
