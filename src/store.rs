//! Contest store - entities and their read/write contracts
//!
//! In-memory repository for tasks, teams, solutions and the competition
//! configuration, seeded from a TOML fixture file. All shared state lives
//! behind one `RwLock`: configuration transitions take the write lock as a
//! single-writer critical section, and ranking reads one consistent
//! snapshot for its whole computation.

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

use crate::clock::{CompetitionConfig, CompetitionStatus};
use crate::judge::TestOutcome;
use crate::verdict::SolutionStatus;

/// A competing team; identity only, registration lives elsewhere
#[derive(Debug, Clone, Serialize)]
pub struct Team {
    pub id: u64,
    pub name: String,
}

/// One hidden test case of a task. `input` and `expected` keep the stored
/// fixture escaping (literal `\n` for line breaks).
#[derive(Debug, Clone)]
pub struct TestCase {
    pub id: u64,
    pub input: String,
    pub expected: String,
}

/// A contest task with its ordered test cases
#[derive(Debug, Clone)]
pub struct Task {
    pub id: u64,
    pub description: String,
    pub tests: Vec<TestCase>,
}

/// A submitted solution. `status` is written exactly once, after judging.
#[derive(Debug, Clone)]
pub struct Solution {
    pub id: u64,
    pub team_id: u64,
    pub task_id: u64,
    pub content: String,
    pub upload_time: DateTime<Utc>,
    pub status: SolutionStatus,
}

/// Append-only pass/fail record for one (solution, test) pair
#[derive(Debug, Clone)]
pub struct TestResult {
    pub solution_id: u64,
    pub test_id: u64,
    pub did_pass: bool,
}

/// Full view of one solution with its recorded test results
#[derive(Debug, Clone, Serialize)]
pub struct SolutionDetail {
    pub id: u64,
    pub team_id: u64,
    pub task_id: u64,
    pub content: String,
    pub upload_time: DateTime<Utc>,
    pub status: SolutionStatus,
    pub test_results: Vec<TestResultView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TestResultView {
    pub test_id: u64,
    pub did_pass: bool,
}

/// Task list entry with the submitting team's progress
#[derive(Debug, Clone, Serialize)]
pub struct TaskOverview {
    pub id: u64,
    pub description: String,
    pub is_finished: bool,
}

/// Task list with the team-level completion aggregate
#[derive(Debug, Clone, Serialize)]
pub struct TasksOverview {
    pub all_finished: bool,
    pub tasks: Vec<TaskOverview>,
}

/// Why a submission was rejected before any execution
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("competition is not active")]
    CompetitionInactive,
    #[error("team already has a correct solution for this task")]
    AlreadySolved,
    #[error("unknown task: {0}")]
    UnknownTask(u64),
    #[error("unknown team: {0}")]
    UnknownTeam(u64),
}

#[derive(Debug, Deserialize)]
struct FixtureFile {
    config: FixtureConfig,
    #[serde(default)]
    teams: Vec<FixtureTeam>,
    #[serde(default)]
    tasks: Vec<FixtureTask>,
}

#[derive(Debug, Deserialize)]
struct FixtureConfig {
    participants_limit: u32,
}

#[derive(Debug, Deserialize)]
struct FixtureTeam {
    name: String,
}

#[derive(Debug, Deserialize)]
struct FixtureTask {
    description: String,
    #[serde(default)]
    tests: Vec<FixtureTest>,
}

#[derive(Debug, Deserialize)]
struct FixtureTest {
    input: String,
    output: String,
}

struct StoreInner {
    config: CompetitionConfig,
    teams: Vec<Team>,
    tasks: Vec<Task>,
    solutions: Vec<Solution>,
    test_results: Vec<TestResult>,
    next_solution_id: u64,
}

/// Shared contest state
pub struct ContestStore {
    inner: RwLock<StoreInner>,
}

impl ContestStore {
    /// Load the store from a TOML fixture file
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read contest fixtures from {}", path))?;
        Self::from_fixture_str(&content)
    }

    /// Build the store from fixture TOML content
    pub fn from_fixture_str(content: &str) -> anyhow::Result<Self> {
        let fixture: FixtureFile =
            toml::from_str(content).context("Invalid contest fixture file")?;

        let teams: Vec<Team> = fixture
            .teams
            .into_iter()
            .enumerate()
            .map(|(idx, team)| Team {
                id: idx as u64 + 1,
                name: team.name,
            })
            .collect();

        let mut next_test_id = 1u64;
        let tasks: Vec<Task> = fixture
            .tasks
            .into_iter()
            .enumerate()
            .map(|(idx, task)| Task {
                id: idx as u64 + 1,
                description: task.description,
                tests: task
                    .tests
                    .into_iter()
                    .map(|test| {
                        let id = next_test_id;
                        next_test_id += 1;
                        TestCase {
                            id,
                            input: test.input,
                            expected: test.output,
                        }
                    })
                    .collect(),
            })
            .collect();

        info!(
            "Loaded contest fixtures: {} teams, {} tasks, {} tests",
            teams.len(),
            tasks.len(),
            next_test_id - 1
        );

        Ok(Self {
            inner: RwLock::new(StoreInner {
                config: CompetitionConfig::new(fixture.config.participants_limit),
                teams,
                tasks,
                solutions: Vec::new(),
                test_results: Vec::new(),
                next_solution_id: 1,
            }),
        })
    }

    /// Accept a submission if the preconditions hold, creating a
    /// not-yet-evaluated solution. Rejections happen before any execution.
    pub async fn begin_submission(
        &self,
        team_id: u64,
        task_id: u64,
        content: &str,
        now: DateTime<Utc>,
    ) -> Result<(u64, Task), SubmitError> {
        let mut inner = self.inner.write().await;

        if inner.config.competition_status != CompetitionStatus::Active {
            return Err(SubmitError::CompetitionInactive);
        }
        if !inner.teams.iter().any(|t| t.id == team_id) {
            return Err(SubmitError::UnknownTeam(team_id));
        }
        let task = inner
            .tasks
            .iter()
            .find(|t| t.id == task_id)
            .cloned()
            .ok_or(SubmitError::UnknownTask(task_id))?;

        let already_solved = inner.solutions.iter().any(|s| {
            s.team_id == team_id && s.task_id == task_id && s.status == SolutionStatus::Correct
        });
        if already_solved {
            return Err(SubmitError::AlreadySolved);
        }

        let solution_id = inner.next_solution_id;
        inner.next_solution_id += 1;
        inner.solutions.push(Solution {
            id: solution_id,
            team_id,
            task_id,
            content: content.to_string(),
            upload_time: now,
            status: SolutionStatus::NotEvaluated,
        });

        Ok((solution_id, task))
    }

    /// Record the judging outcome: the solution's one-time status change
    /// plus one test result row per executed test. A solution that already
    /// holds a terminal status is left untouched, results included.
    pub async fn record_verdict(
        &self,
        solution_id: u64,
        status: SolutionStatus,
        test_outcomes: &[TestOutcome],
    ) {
        let mut inner = self.inner.write().await;

        let Some(idx) = inner.solutions.iter().position(|s| s.id == solution_id) else {
            return;
        };
        if inner.solutions[idx].status.is_evaluated() {
            return;
        }
        inner.solutions[idx].status = status;

        for outcome in test_outcomes {
            inner.test_results.push(TestResult {
                solution_id,
                test_id: outcome.test_id,
                did_pass: outcome.did_pass,
            });
        }
    }

    /// One consistent snapshot of everything the ranking computation needs
    pub async fn ranking_snapshot(&self) -> (CompetitionConfig, Vec<Team>, Vec<Solution>) {
        let inner = self.inner.read().await;
        (
            inner.config.clone(),
            inner.teams.clone(),
            inner.solutions.clone(),
        )
    }

    /// Apply the config-panel intents atomically
    pub async fn apply_config_panel(
        &self,
        activate_competition: bool,
        make_ranking_visible: bool,
        now: DateTime<Utc>,
    ) -> CompetitionConfig {
        let mut inner = self.inner.write().await;
        if activate_competition {
            inner.config.activate(now);
        } else {
            inner.config.pause(now);
        }
        inner.config.set_ranking_visible(make_ranking_visible, now);
        inner.config.clone()
    }

    /// Task list, with per-team finished flags and the all-finished
    /// aggregate when a team is given
    pub async fn tasks_overview(&self, team_id: Option<u64>) -> TasksOverview {
        let inner = self.inner.read().await;
        let tasks: Vec<TaskOverview> = inner
            .tasks
            .iter()
            .map(|task| {
                let is_finished = team_id.is_some_and(|team| {
                    inner.solutions.iter().any(|s| {
                        s.team_id == team
                            && s.task_id == task.id
                            && s.status == SolutionStatus::Correct
                    })
                });
                TaskOverview {
                    id: task.id,
                    description: task.description.clone(),
                    is_finished,
                }
            })
            .collect();
        let all_finished = team_id.is_some() && tasks.iter().all(|t| t.is_finished);
        TasksOverview {
            all_finished,
            tasks,
        }
    }

    /// One solution with its recorded test results, for the detail view
    pub async fn solution_detail(&self, solution_id: u64) -> Option<SolutionDetail> {
        let inner = self.inner.read().await;
        let solution = inner.solutions.iter().find(|s| s.id == solution_id)?;
        let test_results = inner
            .test_results
            .iter()
            .filter(|r| r.solution_id == solution_id)
            .map(|r| TestResultView {
                test_id: r.test_id,
                did_pass: r.did_pass,
            })
            .collect();
        Some(SolutionDetail {
            id: solution.id,
            team_id: solution.team_id,
            task_id: solution.task_id,
            content: solution.content.clone(),
            upload_time: solution.upload_time,
            status: solution.status,
            test_results,
        })
    }
}
