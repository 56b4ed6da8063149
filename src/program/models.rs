use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::auth::UserIdentity;

/// Lifecycle status of a scheduled program
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProgramStatus {
    Scheduled,
    Live,
    Finished,
    Cancelled,
}

/// A scheduled broadcast slot owned by one DJ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramModel {
    pub id: String,
    pub owner: UserIdentity,
    pub title: String,
    pub description: Option<String>,
    pub status: ProgramStatus,
    pub starts_at: DateTime<Utc>,
}

impl ProgramModel {
    pub fn is_live(&self) -> bool {
        self.status == ProgramStatus::Live
    }

    pub fn owned_by(&self, user_id: &str) -> bool {
        self.owner.id == user_id
    }
}
