//! Named award entry points for domain activities.

use courtside_core::AppResult;
use courtside_domain::{LevelUpResult, XpEventType};

use super::GamificationService;

type Metadata = Option<serde_json::Value>;

impl GamificationService {
    /// Awards XP for a completed match; winners get the larger reward.
    pub async fn on_match_completed(
        &self,
        won: bool,
        metadata: Metadata,
    ) -> AppResult<LevelUpResult> {
        let event_type = if won {
            XpEventType::MatchWon
        } else {
            XpEventType::MatchPlayed
        };
        self.award_xp(event_type, metadata).await
    }

    /// Awards XP for following another player.
    pub async fn on_follow_player(&self, metadata: Metadata) -> AppResult<LevelUpResult> {
        self.award_xp(XpEventType::FollowPlayer, metadata).await
    }

    /// Awards XP for publishing a feed post.
    pub async fn on_post_created(&self, metadata: Metadata) -> AppResult<LevelUpResult> {
        self.award_xp(XpEventType::PostCreated, metadata).await
    }

    /// Awards XP for completing the profile.
    pub async fn on_profile_completed(&self, metadata: Metadata) -> AppResult<LevelUpResult> {
        self.award_xp(XpEventType::ProfileCompleted, metadata).await
    }

    /// Awards XP for a completed court booking.
    pub async fn on_court_booked(&self, metadata: Metadata) -> AppResult<LevelUpResult> {
        self.award_xp(XpEventType::CourtBooked, metadata).await
    }

    /// Awards XP for reviewing a court.
    pub async fn on_review_written(&self, metadata: Metadata) -> AppResult<LevelUpResult> {
        self.award_xp(XpEventType::ReviewWritten, metadata).await
    }

    /// Awards XP for a tournament finish. `placement` is 1-based.
    pub async fn on_tournament_result(
        &self,
        placement: u32,
        metadata: Metadata,
    ) -> AppResult<LevelUpResult> {
        let event_type = match placement {
            1 => XpEventType::TournamentWin,
            2 | 3 => XpEventType::TournamentPodium,
            _ => XpEventType::TournamentParticipation,
        };
        self.award_xp(event_type, metadata).await
    }

    /// Awards XP when a daily streak hits a milestone.
    ///
    /// Returns `Ok(None)` for day counts that are not milestones.
    pub async fn on_streak_reached(
        &self,
        days: u32,
        metadata: Metadata,
    ) -> AppResult<Option<LevelUpResult>> {
        let event_type = match days {
            3 => XpEventType::Streak3Days,
            7 => XpEventType::Streak7Days,
            30 => XpEventType::Streak30Days,
            _ => return Ok(None),
        };
        self.award_xp(event_type, metadata).await.map(Some)
    }
}
