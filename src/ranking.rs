//! Ranking engine
//!
//! Orders teams by solved count and penalized contest time. Every terminal
//! non-correct solution costs a flat penalty; the base time is the contest
//! clock reading at the latest correct upload. Team viewers get a frozen
//! view while the ranking is hidden.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::{CompetitionConfig, RankingVisibility};
use crate::store::{Solution, Team};
use crate::verdict::SolutionStatus;

/// Penalty per terminal non-correct solution: 20 minutes
pub const PENALTY_SECONDS: i64 = 1200;

/// Who is looking at the ranking. Checked once at the boundary; the
/// computation never re-derives identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Viewer {
    Team,
    Judge,
}

/// One ranked team
#[derive(Debug, Clone, Serialize)]
pub struct RankingRow {
    pub position: usize,
    pub team_id: u64,
    pub team: String,
    pub correct_count: usize,
    pub total_seconds: i64,
    pub display_time: String,
}

/// Ordered ranking plus whether the viewer sees a frozen snapshot
#[derive(Debug, Serialize)]
pub struct Ranking {
    pub frozen: bool,
    pub rows: Vec<RankingRow>,
}

/// Compute the ordered ranking over a consistent snapshot of config, teams
/// and solutions
pub fn compute_ranking(
    config: &CompetitionConfig,
    teams: &[Team],
    solutions: &[Solution],
    viewer: Viewer,
) -> Ranking {
    // Teams only see the world as of the freeze instant while the ranking
    // is hidden; judges always see live data.
    let freeze_at: Option<DateTime<Utc>> = match (config.ranking_visibility, viewer) {
        (RankingVisibility::Invisible, Viewer::Team) => config.ranking_visibility_change_time,
        _ => None,
    };

    let mut rows: Vec<RankingRow> = teams
        .iter()
        .map(|team| {
            let team_solutions: Vec<&Solution> = solutions
                .iter()
                .filter(|s| s.team_id == team.id)
                .filter(|s| freeze_at.is_none_or(|cut| s.upload_time <= cut))
                .collect();
            let (total_seconds, correct_count) = calculate_total_time(config, &team_solutions);
            RankingRow {
                position: 0,
                team_id: team.id,
                team: team.name.clone(),
                correct_count,
                total_seconds,
                display_time: format_display_time(total_seconds),
            }
        })
        .collect();

    // Correct count descending, penalized time ascending; stable sort keeps
    // insertion order on full ties
    rows.sort_by(|a, b| {
        b.correct_count
            .cmp(&a.correct_count)
            .then(a.total_seconds.cmp(&b.total_seconds))
    });
    for (idx, row) in rows.iter_mut().enumerate() {
        row.position = idx + 1;
    }

    Ranking {
        frozen: freeze_at.is_some(),
        rows,
    }
}

/// Penalized total seconds and correct count for one team's solutions.
/// Solutions still awaiting evaluation contribute to neither.
fn calculate_total_time(config: &CompetitionConfig, solutions: &[&Solution]) -> (i64, usize) {
    let latest_correct = solutions
        .iter()
        .filter(|s| s.status == SolutionStatus::Correct)
        .map(|s| s.upload_time)
        .max();
    let correct_count = solutions
        .iter()
        .filter(|s| s.status == SolutionStatus::Correct)
        .count();
    let penalized_count = solutions
        .iter()
        .filter(|s| s.status.is_evaluated() && s.status != SolutionStatus::Correct)
        .count();

    let base_seconds = latest_correct
        .map(|t| config.elapsed_seconds(t))
        .unwrap_or(0);

    (
        base_seconds + penalized_count as i64 * PENALTY_SECONDS,
        correct_count,
    )
}

/// Render elapsed seconds as `hours:minutes` with zero-padded minutes
pub fn format_display_time(total_seconds: i64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    format!("{}:{:02}", hours, minutes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn at(minutes: i64) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-03-01T10:00:00Z").unwrap().with_timezone(&Utc)
            + Duration::minutes(minutes)
    }

    fn started_config() -> CompetitionConfig {
        let mut config = CompetitionConfig::new(50);
        config.activate(at(0));
        config
    }

    fn teams(n: u64) -> Vec<Team> {
        (1..=n)
            .map(|id| Team {
                id,
                name: format!("team{}", id),
            })
            .collect()
    }

    fn solution(
        id: u64,
        team_id: u64,
        task_id: u64,
        minute: i64,
        status: SolutionStatus,
    ) -> Solution {
        Solution {
            id,
            team_id,
            task_id,
            content: "solution".into(),
            upload_time: at(minute),
            status,
        }
    }

    #[test]
    fn test_all_incorrect_solutions_are_pure_penalty() {
        let config = started_config();
        let solutions: Vec<Solution> = (0..5)
            .map(|n| solution(n + 1, 1, n + 1, (n as i64) * 10, SolutionStatus::Incorrect))
            .collect();

        let ranking = compute_ranking(&config, &teams(1), &solutions, Viewer::Judge);
        assert_eq!(ranking.rows[0].correct_count, 0);
        assert_eq!(ranking.rows[0].total_seconds, 5 * PENALTY_SECONDS);
    }

    #[test]
    fn test_all_correct_counts_latest_upload() {
        let config = started_config();
        let solutions: Vec<Solution> = (0..5)
            .map(|n| solution(n + 1, 1, n + 1, (n as i64 + 1) * 10, SolutionStatus::Correct))
            .collect();

        let ranking = compute_ranking(&config, &teams(1), &solutions, Viewer::Judge);
        assert_eq!(ranking.rows[0].correct_count, 5);
        assert_eq!(ranking.rows[0].total_seconds, 50 * 60);
    }

    #[test]
    fn test_mixed_solutions_add_penalties_to_latest_correct() {
        let config = started_config();
        let mut solutions = Vec::new();
        for n in 0..5u64 {
            let status = if n % 2 == 0 {
                SolutionStatus::Correct
            } else {
                SolutionStatus::Incorrect
            };
            solutions.push(solution(n + 1, 1, n + 1, (n as i64 + 1) * 10, status));
        }

        let ranking = compute_ranking(&config, &teams(1), &solutions, Viewer::Judge);
        assert_eq!(ranking.rows[0].correct_count, 3);
        // Latest correct at minute 50, plus two penalties
        assert_eq!(ranking.rows[0].total_seconds, 50 * 60 + 2 * PENALTY_SECONDS);
    }

    #[test]
    fn test_not_evaluated_solutions_never_count() {
        let config = started_config();
        let solutions = vec![
            solution(1, 1, 1, 10, SolutionStatus::NotEvaluated),
            solution(2, 1, 2, 20, SolutionStatus::Correct),
        ];

        let ranking = compute_ranking(&config, &teams(1), &solutions, Viewer::Judge);
        assert_eq!(ranking.rows[0].correct_count, 1);
        assert_eq!(ranking.rows[0].total_seconds, 20 * 60);
    }

    #[test]
    fn test_ordering_by_count_then_time() {
        let config = started_config();
        // team1: 1 correct at 40m; team2: 3 correct, latest 110m;
        // team3: no correct, one failed try (20m of penalty)
        let solutions = vec![
            solution(1, 1, 1, 40, SolutionStatus::Correct),
            solution(2, 2, 1, 30, SolutionStatus::Correct),
            solution(3, 2, 2, 70, SolutionStatus::Correct),
            solution(4, 2, 3, 110, SolutionStatus::Correct),
            solution(5, 3, 1, 20, SolutionStatus::RuntimeError),
        ];

        let ranking = compute_ranking(&config, &teams(3), &solutions, Viewer::Judge);
        let order: Vec<(usize, u64)> = ranking
            .rows
            .iter()
            .map(|r| (r.position, r.team_id))
            .collect();
        assert_eq!(order, vec![(1, 2), (2, 1), (3, 3)]);
        assert_eq!(ranking.rows[0].total_seconds, 110 * 60);
        assert_eq!(ranking.rows[2].total_seconds, 20 * 60);
    }

    #[test]
    fn test_tie_on_count_broken_by_time() {
        let config = started_config();
        let solutions = vec![
            solution(1, 1, 1, 60, SolutionStatus::Correct),
            solution(2, 2, 1, 30, SolutionStatus::Correct),
        ];

        let ranking = compute_ranking(&config, &teams(2), &solutions, Viewer::Judge);
        assert_eq!(ranking.rows[0].team_id, 2);
        assert_eq!(ranking.rows[1].team_id, 1);
    }

    #[test]
    fn test_frozen_view_filters_late_submissions() {
        let mut config = started_config();
        config.set_ranking_visible(false, at(45));

        let solutions = vec![
            solution(1, 1, 1, 30, SolutionStatus::Correct),
            solution(2, 1, 2, 60, SolutionStatus::Correct),
        ];

        let team_view = compute_ranking(&config, &teams(1), &solutions, Viewer::Team);
        assert!(team_view.frozen);
        assert_eq!(team_view.rows[0].correct_count, 1);
        assert_eq!(team_view.rows[0].total_seconds, 30 * 60);

        // Judges always see live data
        let judge_view = compute_ranking(&config, &teams(1), &solutions, Viewer::Judge);
        assert!(!judge_view.frozen);
        assert_eq!(judge_view.rows[0].correct_count, 2);
    }

    #[test]
    fn test_frozen_view_is_idempotent() {
        let mut config = started_config();
        config.set_ranking_visible(false, at(45));

        let solutions = vec![
            solution(1, 1, 1, 30, SolutionStatus::Correct),
            solution(2, 2, 1, 40, SolutionStatus::Incorrect),
        ];

        let first = compute_ranking(&config, &teams(2), &solutions, Viewer::Team);
        let second = compute_ranking(&config, &teams(2), &solutions, Viewer::Team);

        let key = |r: &Ranking| -> Vec<(usize, u64, usize, i64)> {
            r.rows
                .iter()
                .map(|row| (row.position, row.team_id, row.correct_count, row.total_seconds))
                .collect()
        };
        assert_eq!(key(&first), key(&second));
    }

    #[test]
    fn test_visible_ranking_is_live_for_teams() {
        let config = started_config();
        let solutions = vec![solution(1, 1, 1, 30, SolutionStatus::Correct)];

        let view = compute_ranking(&config, &teams(1), &solutions, Viewer::Team);
        assert!(!view.frozen);
        assert_eq!(view.rows[0].correct_count, 1);
    }

    #[test]
    fn test_display_time_formatting() {
        assert_eq!(format_display_time(0), "0:00");
        assert_eq!(format_display_time(40 * 60), "0:40");
        assert_eq!(format_display_time(110 * 60), "1:50");
        assert_eq!(format_display_time(3600 + 5 * 60), "1:05");
    }

    #[test]
    fn test_pause_shrinks_elapsed_base() {
        let mut config = started_config();
        config.pause(at(10));
        config.activate(at(30));

        let solutions = vec![solution(1, 1, 1, 60, SolutionStatus::Correct)];
        let ranking = compute_ranking(&config, &teams(1), &solutions, Viewer::Judge);
        // 60 minutes on the wall, 20 paused
        assert_eq!(ranking.rows[0].total_seconds, 40 * 60);
    }
}
