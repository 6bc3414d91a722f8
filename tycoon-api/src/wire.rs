use serde::{Deserialize, Serialize};
use tycoon_core::ProgressTotals;

/// Envelope shared by every endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default = "none", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level_up: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub levels_gained: Option<u64>,
}

fn none<T>() -> Option<T> {
    None
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            level_up: None,
            levels_gained: None,
        }
    }

    /// Success without a payload, e.g. the health check.
    pub fn acknowledged(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            level_up: None,
            levels_gained: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            level_up: None,
            levels_gained: None,
        }
    }

    pub fn with_level_up(mut self, levels_gained: u64) -> Self {
        self.level_up = Some(levels_gained > 0);
        self.levels_gained = Some(levels_gained);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishGameRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub coins: u64,
    #[serde(default)]
    pub xp: u64,
}

/// A player row as stored by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub user_id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub balance: u64,
    pub xp: u64,
    pub level: u64,
    /// Unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<u64>,
}

impl PlayerRecord {
    pub fn totals(&self) -> ProgressTotals {
        ProgressTotals {
            balance: self.balance,
            xp: self.xp,
            level: self.level,
        }
    }
}

/// Totals after a reward was credited by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FinishedGame {
    pub totals: ProgressTotals,
    pub levels_gained: u64,
}

impl FinishedGame {
    /// Older responses only carry `level_up`; count that as a single level.
    pub fn from_response(
        totals: ProgressTotals,
        level_up: Option<bool>,
        levels_gained: Option<u64>,
    ) -> Self {
        let levels_gained = levels_gained.unwrap_or_else(|| u64::from(level_up.unwrap_or(false)));
        Self {
            totals,
            levels_gained,
        }
    }

    pub fn leveled_up(&self) -> bool {
        self.levels_gained > 0
    }
}

#[cfg(test)]
mod tests {
    use tycoon_core::ProgressTotals;

    use super::{ApiResponse, FinishedGame, PlayerRecord};

    #[test]
    fn finish_response_parses_into_totals() {
        let raw = r#"{
            "success": true,
            "data": {"user_id": "u1", "username": "chef", "balance": 110, "xp": 20, "level": 1},
            "level_up": false
        }"#;
        let parsed: ApiResponse<ProgressTotals> = serde_json::from_str(raw).unwrap();
        assert!(parsed.success);
        assert_eq!(
            parsed.data,
            Some(ProgressTotals {
                balance: 110,
                xp: 20,
                level: 1,
            })
        );
        assert_eq!(parsed.level_up, Some(false));
        assert_eq!(parsed.levels_gained, None);
    }

    #[test]
    fn failure_envelope_omits_data() {
        let failure = ApiResponse::<PlayerRecord>::failure("user not found");
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "user not found");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn levels_gained_defaults_from_level_up_flag() {
        let totals = ProgressTotals::default();
        assert_eq!(FinishedGame::from_response(totals, Some(true), None).levels_gained, 1);
        assert_eq!(FinishedGame::from_response(totals, None, None).levels_gained, 0);
        assert_eq!(FinishedGame::from_response(totals, Some(true), Some(3)).levels_gained, 3);
    }
}
