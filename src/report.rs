use crate::platform::Category;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyInfo {
    pub topics: Vec<String>,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisapprovedAd {
    pub ad_type: String,
    pub campaign: String,
    pub ad_group: String,
    pub status: Option<String>,
    pub policy: PolicyInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisapprovedKeyword {
    pub text: String,
    pub match_type: String,
    pub campaign: String,
    pub ad_group: String,
    pub status: Option<String>,
    pub policy: PolicyInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisapprovedAsset {
    pub asset_type: String,
    pub name: String,
    pub status: String,
    pub policy: PolicyInfo,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotals {
    pub ads: usize,
    pub keywords: usize,
    pub assets: usize,
}

impl CategoryTotals {
    pub fn sum(&self) -> usize {
        self.ads + self.keywords + self.assets
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Approved,
    StatusUnreadable,
}

/// What happened to the items of one category while scanning one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDiagnostics {
    pub category: Category,
    pub fetched: usize,
    pub included: usize,
    #[serde(default)]
    pub skipped: BTreeMap<SkipReason, usize>,
    #[serde(default)]
    pub error: Option<String>,
}

impl CategoryDiagnostics {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            fetched: 0,
            included: 0,
            skipped: BTreeMap::new(),
            error: None,
        }
    }

    pub fn skipped_for(&self, reason: SkipReason) -> usize {
        self.skipped.get(&reason).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountScanResult {
    pub account: String,
    #[serde(default)]
    pub account_name: String,
    pub ads: Vec<DisapprovedAd>,
    pub keywords: Vec<DisapprovedKeyword>,
    pub assets: Vec<DisapprovedAsset>,
    pub totals: CategoryTotals,
    #[serde(default)]
    pub diagnostics: Vec<CategoryDiagnostics>,
}

impl AccountScanResult {
    pub fn diagnostics_for(&self, category: Category) -> Option<&CategoryDiagnostics> {
        self.diagnostics.iter().find(|d| d.category == category)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedTotals {
    pub ads: usize,
    pub keywords: usize,
    pub assets: usize,
    pub accounts: usize,
}

impl MergedTotals {
    pub fn disapprovals(&self) -> usize {
        self.ads + self.keywords + self.assets
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedReport {
    pub label: String,
    pub rows: Vec<AccountScanResult>,
    pub totals: MergedTotals,
    pub failed_accounts: usize,
}
