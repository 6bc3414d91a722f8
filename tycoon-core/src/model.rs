use anyhow::bail;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BALANCE: u64 = 100;
pub const DEFAULT_XP: u64 = 0;
pub const DEFAULT_LEVEL: u64 = 1;
pub const DEFAULT_PIZZAS_SOLD: u64 = 0;
pub const DEFAULT_DAYS_PLAYED: u64 = 1;

/// Whether progress values were confirmed by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressSource {
    Authoritative,
    Provisional,
}

impl ProgressSource {
    pub fn from_authoritative(authoritative: bool) -> Self {
        if authoritative {
            Self::Authoritative
        } else {
            Self::Provisional
        }
    }

    pub fn is_authoritative(self) -> bool {
        matches!(self, Self::Authoritative)
    }
}

/// The reconciled part of a player's progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressTotals {
    pub balance: u64,
    pub xp: u64,
    pub level: u64,
}

impl Default for ProgressTotals {
    fn default() -> Self {
        Self {
            balance: DEFAULT_BALANCE,
            xp: DEFAULT_XP,
            level: DEFAULT_LEVEL,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProgress {
    pub user_id: String,
    pub balance: u64,
    pub xp: u64,
    pub level: u64,
    pub pizzas_sold: u64,
    pub days_played: u64,
    pub source: ProgressSource,
}

impl UserProgress {
    pub fn new(user_id: impl Into<String>) -> Self {
        let totals = ProgressTotals::default();
        Self {
            user_id: user_id.into(),
            balance: totals.balance,
            xp: totals.xp,
            level: totals.level,
            pizzas_sold: DEFAULT_PIZZAS_SOLD,
            days_played: DEFAULT_DAYS_PLAYED,
            source: ProgressSource::Provisional,
        }
    }

    pub fn totals(&self) -> ProgressTotals {
        ProgressTotals {
            balance: self.balance,
            xp: self.xp,
            level: self.level,
        }
    }

    pub fn apply_totals(&mut self, totals: ProgressTotals, source: ProgressSource) {
        self.balance = totals.balance;
        self.xp = totals.xp;
        self.level = totals.level;
        self.source = source;
    }
}

/// Identity as supplied by the external sign-in provider.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalIdentity {
    pub id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub provider: Option<String>,
}

impl ExternalIdentity {
    /// Reject identities that cannot be mapped onto a player record.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.id.trim().is_empty() {
            bail!("external identity is missing an id");
        }
        if non_blank(self.display_name.as_deref()).is_none()
            && non_blank(self.email.as_deref()).is_none()
        {
            bail!(
                "external identity `{}` has neither a display name nor an email",
                self.id
            );
        }
        Ok(())
    }

    /// Display name, or the local part of the email when none is set.
    pub fn username(&self) -> String {
        if let Some(name) = non_blank(self.display_name.as_deref()) {
            return name.to_owned();
        }

        non_blank(self.email.as_deref())
            .map(|email| email.split('@').next().unwrap_or(email).to_owned())
            .unwrap_or_default()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// A signed-in player: who they are and where their progress stands.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub identity: ExternalIdentity,
    pub username: String,
    pub progress: UserProgress,
}
