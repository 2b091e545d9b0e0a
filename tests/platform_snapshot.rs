use disapproval_report::platform::{
    AccountSelector, AdsPlatform, Category, Probe, SnapshotPlatform,
};
use serde_json::json;

fn platform() -> SnapshotPlatform {
    SnapshotPlatform::from_value(json!({
        "accounts": [
            { "customer_id": "1", "name": "One", "labels": ["A", "B's"],
              "ads": [{"approval_status": "approved"}, {"approval_status": 7}, {}],
              "assets": {"error": "unsupported"} },
            { "customer_id": "2", "labels": ["A"] }
        ]
    }))
    .unwrap()
}

#[test]
fn selector_escapes_quotes() {
    let sel = AccountSelector::with_label("Sam's");
    assert_eq!(sel.condition(), r"LabelNames CONTAINS 'Sam\'s'");
    assert_eq!(sel.label().unwrap(), "Sam's");
}

#[test]
fn selector_round_trips_backslashes() {
    let label = r"a\'b";
    assert_eq!(AccountSelector::with_label(label).label().unwrap(), label);
}

#[test]
fn found_is_the_only_usable_value() {
    assert_eq!(Probe::Found(3).ok(), Some(3));
    assert_eq!(Probe::<u8>::Failed("x".into()).ok(), None);
    assert_eq!(Probe::<u8>::Missing.ok(), None);
}

#[test]
fn selects_by_exact_label() {
    let p = platform();
    let hits = p.select_accounts(&AccountSelector::with_label("A")).unwrap();
    assert_eq!(hits.len(), 2);
    let hits = p.select_accounts(&AccountSelector::with_label("B's")).unwrap();
    assert_eq!(hits.len(), 1);
    assert!(p.select_accounts(&AccountSelector::with_label("B")).unwrap().is_empty());
}

#[test]
fn unknown_account_is_an_error() {
    assert!(platform().account("999").is_err());
}

#[test]
fn category_errors_surface_per_category() {
    let p = platform();
    let acct = p.account("1").unwrap();
    assert_eq!(acct.entities(Category::Ads, 2).unwrap().len(), 2);
    assert!(acct.entities(Category::Keywords, 10).is_err());
    let err = acct.entities(Category::Assets, 10).err().unwrap();
    assert!(err.to_string().contains("unsupported"));
}

#[test]
fn status_distinguishes_missing_from_stringified() {
    let p = platform();
    let acct = p.account("1").unwrap();
    let ads = acct.entities(Category::Ads, 10).unwrap();
    assert_eq!(ads[0].approval_status(), Probe::Found("approved".into()));
    assert_eq!(ads[1].approval_status(), Probe::Found("7".into()));
    assert_eq!(ads[2].approval_status(), Probe::Missing);
}
