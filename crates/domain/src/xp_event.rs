use std::str::FromStr;

use chrono::{DateTime, Utc};
use courtside_core::AppError;
use serde::{Deserialize, Serialize};

use crate::UserId;

/// Activity that earns experience points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XpEventType {
    /// Took part in a completed match.
    MatchPlayed,
    /// Won a completed match.
    MatchWon,
    /// Followed another player.
    FollowPlayer,
    /// Published a feed post.
    PostCreated,
    /// Filled in every profile field.
    ProfileCompleted,
    /// Completed a court booking.
    CourtBooked,
    /// Reviewed a court.
    ReviewWritten,
    /// Finished a tournament outside the podium.
    TournamentParticipation,
    /// Finished a tournament in second or third place.
    TournamentPodium,
    /// Won a tournament.
    TournamentWin,
    /// Played on three consecutive days.
    #[serde(rename = "streak_3_days")]
    Streak3Days,
    /// Played on seven consecutive days.
    #[serde(rename = "streak_7_days")]
    Streak7Days,
    /// Played on thirty consecutive days.
    #[serde(rename = "streak_30_days")]
    Streak30Days,
}

impl XpEventType {
    /// Returns the fixed XP reward for this activity.
    #[must_use]
    pub fn xp_amount(&self) -> u64 {
        match self {
            Self::MatchPlayed => 50,
            Self::MatchWon => 100,
            Self::FollowPlayer => 10,
            Self::PostCreated => 20,
            Self::ProfileCompleted => 200,
            Self::CourtBooked => 30,
            Self::ReviewWritten => 25,
            Self::TournamentParticipation => 150,
            Self::TournamentPodium => 300,
            Self::TournamentWin => 500,
            Self::Streak3Days => 50,
            Self::Streak7Days => 150,
            Self::Streak30Days => 1_000,
        }
    }

    /// Returns a stable storage value for this activity.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MatchPlayed => "match_played",
            Self::MatchWon => "match_won",
            Self::FollowPlayer => "follow_player",
            Self::PostCreated => "post_created",
            Self::ProfileCompleted => "profile_completed",
            Self::CourtBooked => "court_booked",
            Self::ReviewWritten => "review_written",
            Self::TournamentParticipation => "tournament_participation",
            Self::TournamentPodium => "tournament_podium",
            Self::TournamentWin => "tournament_win",
            Self::Streak3Days => "streak_3_days",
            Self::Streak7Days => "streak_7_days",
            Self::Streak30Days => "streak_30_days",
        }
    }

    /// Returns all known activities.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[XpEventType] = &[
            XpEventType::MatchPlayed,
            XpEventType::MatchWon,
            XpEventType::FollowPlayer,
            XpEventType::PostCreated,
            XpEventType::ProfileCompleted,
            XpEventType::CourtBooked,
            XpEventType::ReviewWritten,
            XpEventType::TournamentParticipation,
            XpEventType::TournamentPodium,
            XpEventType::TournamentWin,
            XpEventType::Streak3Days,
            XpEventType::Streak7Days,
            XpEventType::Streak30Days,
        ];

        ALL
    }
}

impl FromStr for XpEventType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|event_type| event_type.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown xp event type '{value}'")))
    }
}

impl std::fmt::Display for XpEventType {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Append-only audit row for one XP award.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XpEvent {
    /// User who earned the XP.
    pub user_id: UserId,
    /// Activity that triggered the award.
    pub event_type: XpEventType,
    /// XP granted.
    pub xp_amount: u64,
    /// Free-form caller context, e.g. a match id.
    pub metadata: serde_json::Value,
    /// Award timestamp.
    pub created_at: DateTime<Utc>,
}
