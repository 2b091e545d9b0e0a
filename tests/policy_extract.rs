use disapproval_report::{
    platform::{EntityHandle, Probe, TopicHandle},
    policy::{extract_policy_info, normalize, resolve_topic_name, UNSPECIFIED_TOPIC},
};

#[derive(Clone)]
struct FakeTopic {
    topic: Probe<String>,
    id: Probe<String>,
    raw_topic: Probe<String>,
    raw_id: Probe<String>,
    evidences: Probe<Vec<Probe<Vec<String>>>>,
}

impl FakeTopic {
    fn blank() -> Self {
        Self {
            topic: Probe::Missing,
            id: Probe::Missing,
            raw_topic: Probe::Missing,
            raw_id: Probe::Missing,
            evidences: Probe::Missing,
        }
    }

    fn named(name: &str) -> Self {
        Self {
            topic: Probe::Found(name.into()),
            ..Self::blank()
        }
    }
}

impl TopicHandle for FakeTopic {
    fn topic(&self) -> Probe<String> {
        self.topic.clone()
    }
    fn id(&self) -> Probe<String> {
        self.id.clone()
    }
    fn raw_field(&self, name: &str) -> Probe<String> {
        match name {
            "topic" => self.raw_topic.clone(),
            "id" => self.raw_id.clone(),
            _ => Probe::Missing,
        }
    }
    fn evidences(&self) -> Probe<Vec<Probe<Vec<String>>>> {
        self.evidences.clone()
    }
}

struct FakeEntity {
    topics: Probe<Vec<FakeTopic>>,
}

impl EntityHandle for FakeEntity {
    fn text_field(&self, _name: &str) -> Probe<String> {
        Probe::Missing
    }
    fn approval_status(&self) -> Probe<String> {
        Probe::Found("disapproved".into())
    }
    fn policy_topics(&self) -> Probe<Vec<Box<dyn TopicHandle + '_>>> {
        match &self.topics {
            Probe::Found(topics) => {
                let mut out: Vec<Box<dyn TopicHandle + '_>> = Vec::new();
                for t in topics {
                    out.push(Box::new(t.clone()));
                }
                Probe::Found(out)
            }
            Probe::Missing => Probe::Missing,
            Probe::Failed(e) => Probe::Failed(e.clone()),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn normalize_dedupes_in_first_seen_order() {
    assert_eq!(normalize(strings(&["A", "A", "B"])), strings(&["A", "B"]));
    assert_eq!(
        normalize(strings(&["  B ", "", "A", "B", "   "])),
        strings(&["B", "A"])
    );
}

#[test]
fn topic_name_falls_through_strategies_in_order() {
    let mut t = FakeTopic::blank();
    t.topic = Probe::Failed("accessor threw".into());
    t.id = Probe::Found("   ".into());
    t.raw_topic = Probe::Missing;
    t.raw_id = Probe::Found("POLICY_42".into());
    assert_eq!(resolve_topic_name(&t), "POLICY_42");

    t.raw_topic = Probe::Found("Raw Topic".into());
    assert_eq!(resolve_topic_name(&t), "Raw Topic");

    t.id = Probe::Found("ID_7".into());
    assert_eq!(resolve_topic_name(&t), "ID_7");
}

#[test]
fn topic_without_any_name_gets_sentinel() {
    assert_eq!(resolve_topic_name(&FakeTopic::blank()), UNSPECIFIED_TOPIC);
}

#[test]
fn missing_or_failed_topic_list_yields_empty_info() {
    let missing = FakeEntity {
        topics: Probe::Missing,
    };
    let failed = FakeEntity {
        topics: Probe::Failed("boom".into()),
    };
    assert!(extract_policy_info(&missing).topics.is_empty());
    let info = extract_policy_info(&failed);
    assert!(info.topics.is_empty());
    assert!(info.reasons.is_empty());
}

#[test]
fn evidence_failures_are_isolated_per_entry() {
    let mut a = FakeTopic::named("Trademarks");
    a.evidences = Probe::Found(vec![
        Probe::Found(strings(&["uses acme®", " uses acme® "])),
        Probe::Failed("evidence accessor threw".into()),
        Probe::Found(strings(&["", "no license"])),
    ]);
    let mut b = FakeTopic::named("Trademarks");
    b.evidences = Probe::Failed("list accessor threw".into());
    let c = FakeTopic::named("Misleading content");

    let entity = FakeEntity {
        topics: Probe::Found(vec![a, b, c]),
    };
    let info = extract_policy_info(&entity);
    assert_eq!(info.topics, strings(&["Trademarks", "Misleading content"]));
    assert_eq!(info.reasons, strings(&["uses acme®", "no license"]));
}
