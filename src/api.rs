//! HTTP API surface
//!
//! Thin handlers over the contest store and the judging engine. Role
//! handling stays at this boundary: handlers receive an explicit viewer
//! value and pass it down, the engines never re-derive identity.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::clock::CompetitionConfig;
use crate::error::AppError;
use crate::judge::judge_solution;
use crate::ranking::{compute_ranking, Ranking, Viewer};
use crate::runner::SolutionRunner;
use crate::store::{ContestStore, SolutionDetail, TasksOverview};
use crate::verdict::SolutionStatus;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ContestStore>,
    pub runner: Arc<dyn SolutionRunner>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/tasks", get(list_tasks))
        .route("/solutions", post(submit_solution))
        .route("/solutions/{id}", get(solution_detail))
        .route("/ranking", get(fetch_ranking))
        .route("/config-panel", post(config_panel))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub task_id: u64,
    pub team_id: u64,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub solution_id: u64,
    pub status: SolutionStatus,
}

/// Accept a solution and judge it synchronously; the caller blocks until a
/// terminal verdict exists
async fn submit_solution(
    State(state): State<AppState>,
    Json(req): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, AppError> {
    let now = Utc::now();
    let (solution_id, task) = state
        .store
        .begin_submission(req.team_id, req.task_id, &req.content, now)
        .await?;

    info!(
        "Judging solution {} (team={}, task={})",
        solution_id, req.team_id, req.task_id
    );

    let outcome = judge_solution(state.runner.as_ref(), &req.content, &task)
        .await
        .map_err(|e| {
            // Infrastructure failure, not a verdict: the solution stays
            // not_evaluated and the caller learns something went wrong
            error!("Failed to judge solution {}: {:#}", solution_id, e);
            AppError::Internal(format!("Judging failed: {}", e))
        })?;

    state
        .store
        .record_verdict(solution_id, outcome.status, &outcome.test_results)
        .await;

    Ok(Json(SubmitResponse {
        solution_id,
        status: outcome.status,
    }))
}

/// One solution with its per-test pass/fail records
async fn solution_detail(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<SolutionDetail>, AppError> {
    state
        .store
        .solution_detail(id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Unknown solution: {}", id)))
}

#[derive(Debug, Deserialize)]
struct RankingQuery {
    viewer: Option<Viewer>,
}

/// Ordered ranking; team viewers get the frozen snapshot while the ranking
/// is hidden
async fn fetch_ranking(
    State(state): State<AppState>,
    Query(query): Query<RankingQuery>,
) -> Json<Ranking> {
    let viewer = query.viewer.unwrap_or(Viewer::Team);
    let (config, teams, solutions) = state.store.ranking_snapshot().await;
    Json(compute_ranking(&config, &teams, &solutions, viewer))
}

#[derive(Debug, Deserialize)]
struct TasksQuery {
    team_id: Option<u64>,
}

async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<TasksQuery>,
) -> Json<TasksOverview> {
    Json(state.store.tasks_overview(query.team_id).await)
}

#[derive(Debug, Deserialize)]
pub struct ConfigPanelRequest {
    #[serde(default)]
    pub competition_status: bool,
    #[serde(default)]
    pub ranking_visibility: bool,
}

/// Apply activation and visibility intents; idempotent when the requested
/// state already holds
async fn config_panel(
    State(state): State<AppState>,
    Json(req): Json<ConfigPanelRequest>,
) -> Json<CompetitionConfig> {
    let config = state
        .store
        .apply_config_panel(req.competition_status, req.ranking_visibility, Utc::now())
        .await;
    Json(config)
}
