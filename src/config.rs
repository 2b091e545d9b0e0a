use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub report: Report,
    #[serde(default)]
    pub label_recipients: Vec<LabelGroup>,
    #[serde(default)]
    pub platform: Platform,
    #[serde(default)]
    pub mail: Mail,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw)
            .with_context(|| format!("parsing config TOML: {}", path.display()))?;
        Ok(cfg)
    }

    /// Fails fast on configuration that would make the whole run meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.label_recipients.is_empty() {
            bail!("label_recipients is missing or empty; nothing to report on");
        }
        for (i, group) in self.label_recipients.iter().enumerate() {
            if group.label.trim().is_empty() {
                bail!("label_recipients[{i}] has a blank label");
            }
        }
        if self.report.max_rows_per_section == 0 {
            bail!("report.max_rows_per_section must be > 0");
        }
        if self.platform.max_parallel_accounts == 0 {
            bail!("platform.max_parallel_accounts must be > 0");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelGroup {
    pub label: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub cc: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Report {
    pub default_to: String,
    pub from_name: String,
    pub subject_prefix: String,
    pub max_rows_per_section: usize,
    pub include_zero_row_sections: bool,
    pub log_summary: bool,
}
impl Default for Report {
    fn default() -> Self {
        Self {
            default_to: "".into(),
            from_name: "Disapproval Report".into(),
            subject_prefix: "⚠ Disapprovals".into(),
            max_rows_per_section: 500,
            include_zero_row_sections: true,
            log_summary: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Platform {
    pub snapshot_path: String,
    pub max_parallel_accounts: usize,
    pub max_accounts_per_fanout: usize,
}
impl Default for Platform {
    fn default() -> Self {
        Self {
            snapshot_path: "accounts.snapshot.json".into(),
            max_parallel_accounts: 4,
            max_accounts_per_fanout: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Mail {
    pub preview: bool,
    pub from_address: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_security: String,
    pub username: String,
    pub password_env: String,
}
impl Default for Mail {
    fn default() -> Self {
        Self {
            preview: true,
            from_address: "".into(),
            smtp_host: "".into(),
            smtp_port: 587,
            smtp_security: "starttls".into(),
            username: "".into(),
            password_env: "SMTP_PASSWORD".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Output {
    pub dump_dir: String,
    pub print_summary: bool,
}
impl Default for Output {
    fn default() -> Self {
        Self {
            dump_dir: "".into(),
            print_summary: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: false,
            file_path: "".into(),
        }
    }
}
