use crate::{
    platform::{EntityHandle, Probe, TopicHandle},
    report::PolicyInfo,
};
use std::collections::HashSet;
use tracing::debug;

pub const UNSPECIFIED_TOPIC: &str = "Unspecified Policy Topic";

type NameStrategy = fn(&dyn TopicHandle) -> Probe<String>;

fn via_topic_accessor(t: &dyn TopicHandle) -> Probe<String> {
    t.topic()
}

fn via_id_accessor(t: &dyn TopicHandle) -> Probe<String> {
    t.id()
}

fn via_raw_topic(t: &dyn TopicHandle) -> Probe<String> {
    t.raw_field("topic")
}

fn via_raw_id(t: &dyn TopicHandle) -> Probe<String> {
    t.raw_field("id")
}

/// Tried in order; the first non-blank value names the topic.
const TOPIC_NAME_STRATEGIES: [NameStrategy; 4] = [
    via_topic_accessor,
    via_id_accessor,
    via_raw_topic,
    via_raw_id,
];

pub fn resolve_topic_name(topic: &dyn TopicHandle) -> String {
    TOPIC_NAME_STRATEGIES
        .iter()
        .filter_map(|strategy| strategy(topic).ok())
        .map(|name| name.trim().to_string())
        .find(|name| !name.is_empty())
        .unwrap_or_else(|| UNSPECIFIED_TOPIC.to_string())
}

/// Never fails: unreadable policy data degrades to empty lists.
pub fn extract_policy_info(entity: &dyn EntityHandle) -> PolicyInfo {
    let topics = match entity.policy_topics() {
        Probe::Found(topics) => topics,
        Probe::Missing => return PolicyInfo::default(),
        Probe::Failed(err) => {
            debug!("policy topics unreadable: {err}");
            return PolicyInfo::default();
        }
    };

    let mut names = Vec::with_capacity(topics.len());
    let mut reasons = Vec::new();

    for topic in &topics {
        names.push(resolve_topic_name(&**topic));

        match topic.evidences() {
            Probe::Found(evidences) => {
                for evidence in evidences {
                    match evidence {
                        Probe::Found(texts) => reasons.extend(texts),
                        Probe::Missing => {}
                        Probe::Failed(err) => debug!("evidence unreadable: {err}"),
                    }
                }
            }
            Probe::Missing => {}
            Probe::Failed(err) => debug!("evidences unreadable: {err}"),
        }
    }

    PolicyInfo {
        topics: normalize(names),
        reasons: normalize(reasons),
    }
}

/// Trims, drops blanks, and dedupes while keeping first-seen order.
pub fn normalize<I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for item in items {
        let trimmed = item.trim();
        if trimmed.is_empty() || seen.contains(trimmed) {
            continue;
        }
        seen.insert(trimmed.to_string());
        out.push(trimmed.to_string());
    }
    out
}
