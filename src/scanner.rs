use crate::{
    config::Config,
    platform::{AccountHandle, Category, EntityHandle},
    policy::extract_policy_info,
    report::{
        AccountScanResult, CategoryDiagnostics, CategoryTotals, DisapprovedAd, DisapprovedAsset,
        DisapprovedKeyword, SkipReason,
    },
};
use anyhow::{Context, Result};
use tracing::{debug, warn};

/// Platform enum string for a fully approved entity. Compared case-sensitively.
pub const APPROVED: &str = "approved";

enum ItemOutcome<T> {
    Included(T),
    Skipped(SkipReason),
}

/// Per-account worker entry point; the result crosses the fan-out as JSON.
pub fn run_worker(cfg: &Config, account: &dyn AccountHandle) -> Result<String> {
    let result = scan_account(cfg, account);
    serde_json::to_string(&result)
        .with_context(|| format!("serializing scan result for {}", account.customer_id()))
}

pub fn scan_account(cfg: &Config, account: &dyn AccountHandle) -> AccountScanResult {
    let limit = cfg.report.max_rows_per_section;

    let (ads, ads_diag) = scan_category(account, Category::Ads, limit, ad_outcome);
    let (keywords, kw_diag) = scan_category(account, Category::Keywords, limit, keyword_outcome);
    let (assets, assets_diag) = scan_category(account, Category::Assets, limit, asset_outcome);

    debug!(
        "scanned account={} ads={} keywords={} assets={}",
        account.customer_id(),
        ads.len(),
        keywords.len(),
        assets.len()
    );

    AccountScanResult {
        account: account.customer_id().to_string(),
        account_name: account.name().to_string(),
        totals: CategoryTotals {
            ads: ads.len(),
            keywords: keywords.len(),
            assets: assets.len(),
        },
        ads,
        keywords,
        assets,
        diagnostics: vec![ads_diag, kw_diag, assets_diag],
    }
}

fn scan_category<T>(
    account: &dyn AccountHandle,
    category: Category,
    limit: usize,
    classify: fn(&dyn EntityHandle) -> ItemOutcome<T>,
) -> (Vec<T>, CategoryDiagnostics) {
    let mut diag = CategoryDiagnostics::new(category);

    let entities = match account.entities(category, limit) {
        Ok(entities) => entities,
        Err(err) => {
            warn!(
                "{category} scan failed for account {}: {err:#}",
                account.customer_id()
            );
            diag.error = Some(format!("{err:#}"));
            return (Vec::new(), diag);
        }
    };

    diag.fetched = entities.len();
    let mut rows = Vec::new();
    for entity in &entities {
        match classify(&**entity) {
            ItemOutcome::Included(row) => rows.push(row),
            ItemOutcome::Skipped(reason) => *diag.skipped.entry(reason).or_insert(0) += 1,
        }
    }
    diag.included = rows.len();
    (rows, diag)
}

fn field(entity: &dyn EntityHandle, name: &str) -> String {
    entity.text_field(name).ok().unwrap_or_default()
}

fn ad_outcome(entity: &dyn EntityHandle) -> ItemOutcome<DisapprovedAd> {
    let status = entity.approval_status().ok();
    if status.as_deref() == Some(APPROVED) {
        return ItemOutcome::Skipped(SkipReason::Approved);
    }
    ItemOutcome::Included(DisapprovedAd {
        ad_type: field(entity, "type"),
        campaign: field(entity, "campaign"),
        ad_group: field(entity, "ad_group"),
        status,
        policy: extract_policy_info(entity),
    })
}

fn keyword_outcome(entity: &dyn EntityHandle) -> ItemOutcome<DisapprovedKeyword> {
    let status = entity.approval_status().ok();
    if status.as_deref() == Some(APPROVED) {
        return ItemOutcome::Skipped(SkipReason::Approved);
    }
    ItemOutcome::Included(DisapprovedKeyword {
        text: field(entity, "text"),
        match_type: field(entity, "match_type"),
        campaign: field(entity, "campaign"),
        ad_group: field(entity, "ad_group"),
        status,
        policy: extract_policy_info(entity),
    })
}

// Asset policy data is not present on every account, so an unreadable
// status excludes the asset instead of reporting it.
fn asset_outcome(entity: &dyn EntityHandle) -> ItemOutcome<DisapprovedAsset> {
    let Some(status) = entity.approval_status().ok() else {
        return ItemOutcome::Skipped(SkipReason::StatusUnreadable);
    };
    if status == APPROVED {
        return ItemOutcome::Skipped(SkipReason::Approved);
    }
    ItemOutcome::Included(DisapprovedAsset {
        asset_type: field(entity, "type"),
        name: field(entity, "name"),
        status,
        policy: extract_policy_info(entity),
    })
}
