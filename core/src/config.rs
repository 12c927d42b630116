use crate::types::WorkspaceId;
use serde::{Deserialize, Serialize};

/// How the tenancy resolver treats identities that lack a membership.
/// Chosen once at startup; every request runs the same policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum ProvisioningPolicy {
    /// Leave the context empty; callers send the identity to the join flow.
    #[default]
    NoProvision,
    /// Every identity becomes a client of one designated workspace.
    GlobalAutoJoin { workspace_id: WorkspaceId },
    /// An identity without memberships gets its own workspace as owner.
    PersonalAutoCreate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    #[serde(default)]
    pub provisioning: ProvisioningPolicy,
    /// Email of the distinguished administrative identity. Empty disables
    /// the master area.
    #[serde(default)]
    pub master_email: String,
    /// Only admit identities whose email is enabled on the master
    /// allow-list. The master email is always admitted.
    #[serde(default)]
    pub enforce_allowed_emails: bool,
    #[serde(default = "default_history_page_size")]
    pub history_page_size: u32,
    #[serde(default = "default_personal_workspace_suffix")]
    pub personal_workspace_suffix: String,
}

fn default_history_page_size() -> u32 {
    20
}

fn default_personal_workspace_suffix() -> String {
    "'s workspace".to_string()
}

impl OracleConfig {
    /// Load from a JSON file.
    /// In tests, use OracleConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let mut config: OracleConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.master_email = normalize_email(&config.master_email);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.history_page_size == 0 {
            anyhow::bail!("history_page_size must be positive");
        }
        if let ProvisioningPolicy::GlobalAutoJoin { workspace_id } = &self.provisioning {
            if workspace_id.trim().is_empty() {
                anyhow::bail!("global_auto_join requires a workspace_id");
            }
        }
        Ok(())
    }

    pub fn with_provisioning(mut self, policy: ProvisioningPolicy) -> Self {
        self.provisioning = policy;
        self
    }

    pub fn with_master_email(mut self, email: &str) -> Self {
        self.master_email = normalize_email(email);
        self
    }

    pub fn with_allowed_emails_enforced(mut self) -> Self {
        self.enforce_allowed_emails = true;
        self
    }

    /// True when `email` names the configured master identity.
    pub fn is_master_email(&self, email: &str) -> bool {
        !self.master_email.is_empty() && normalize_email(email) == self.master_email
    }

    pub fn default_test() -> Self {
        Self {
            provisioning: ProvisioningPolicy::NoProvision,
            master_email: "master@oracle.test".into(),
            enforce_allowed_emails: false,
            history_page_size: default_history_page_size(),
            personal_workspace_suffix: default_personal_workspace_suffix(),
        }
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            provisioning: ProvisioningPolicy::default(),
            master_email: String::new(),
            enforce_allowed_emails: false,
            history_page_size: default_history_page_size(),
            personal_workspace_suffix: default_personal_workspace_suffix(),
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
