//! Competition clock and configuration transitions
//!
//! The contest timeline is derived from three timestamps: a start time, an
//! optional pause time, and the accumulated pause total. Elapsed contest
//! time for any wall-clock instant is `(t - start) - total_pause`, floored
//! at zero. Pauses are accounted in whole minutes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Activation state of the competition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetitionStatus {
    Inactive,
    Active,
}

/// Whether teams currently see live ranking data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingVisibility {
    Visible,
    Invisible,
}

/// Process-wide competition configuration (single logical row)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitionConfig {
    pub participants_limit: u32,
    pub competition_status: CompetitionStatus,
    pub ranking_visibility: RankingVisibility,
    pub competition_start_time: Option<DateTime<Utc>>,
    pub competition_pause_time: Option<DateTime<Utc>>,
    pub total_pause_time_in_minutes: i64,
    pub ranking_visibility_change_time: Option<DateTime<Utc>>,
}

impl CompetitionConfig {
    pub fn new(participants_limit: u32) -> Self {
        Self {
            participants_limit,
            competition_status: CompetitionStatus::Inactive,
            ranking_visibility: RankingVisibility::Visible,
            competition_start_time: None,
            competition_pause_time: None,
            total_pause_time_in_minutes: 0,
            ranking_visibility_change_time: None,
        }
    }

    /// Activate the competition, starting the clock on first activation and
    /// folding a pending pause into the accumulated total on resume.
    /// No-op when already active.
    pub fn activate(&mut self, now: DateTime<Utc>) {
        if self.competition_status == CompetitionStatus::Active {
            return;
        }
        self.competition_status = CompetitionStatus::Active;

        if self.competition_start_time.is_none() {
            self.competition_start_time = Some(now);
            info!("Competition started at {}", now);
        }

        if let Some(paused_at) = self.competition_pause_time.take() {
            let paused_minutes = (now - paused_at).num_minutes();
            self.total_pause_time_in_minutes += paused_minutes;
            info!(
                "Competition resumed after {} minutes (total paused: {})",
                paused_minutes, self.total_pause_time_in_minutes
            );
        }
    }

    /// Pause the competition. No-op when already inactive.
    pub fn pause(&mut self, now: DateTime<Utc>) {
        if self.competition_status == CompetitionStatus::Inactive {
            return;
        }
        self.competition_status = CompetitionStatus::Inactive;
        self.competition_pause_time = Some(now);
        info!("Competition paused at {}", now);
    }

    /// Toggle ranking visibility. Hiding the ranking records the freeze
    /// instant; showing it again returns future views to live data.
    /// No-op when the requested state already holds.
    pub fn set_ranking_visible(&mut self, visible: bool, now: DateTime<Utc>) {
        match (self.ranking_visibility, visible) {
            (RankingVisibility::Visible, false) => {
                self.ranking_visibility = RankingVisibility::Invisible;
                self.ranking_visibility_change_time = Some(now);
                info!("Ranking frozen for teams at {}", now);
            }
            (RankingVisibility::Invisible, true) => {
                self.ranking_visibility = RankingVisibility::Visible;
                self.ranking_visibility_change_time = None;
                info!("Ranking visible again");
            }
            _ => {}
        }
    }

    /// Elapsed contest seconds at wall-clock instant `at`, never negative.
    /// Zero before the competition has ever started.
    pub fn elapsed_seconds(&self, at: DateTime<Utc>) -> i64 {
        let Some(start) = self.competition_start_time else {
            return 0;
        };
        let elapsed = (at - start).num_seconds() - self.total_pause_time_in_minutes * 60;
        elapsed.max(0)
    }
}
