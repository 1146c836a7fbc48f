//! Job submission and status handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use lectern_core::{Artifact, ArtifactKind, Job, TranscriptionRequest};

use super::ApiError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for submitting a job
#[derive(Debug, Deserialize)]
pub struct SubmitJobBody {
    /// Source media URL
    pub url: String,
    /// Submitting user identifier
    pub user: String,
}

/// Query parameters carrying the requesting user
#[derive(Debug, Deserialize)]
pub struct UserParams {
    pub user: String,
}

/// Response for job operations
#[derive(Debug, Serialize)]
pub struct JobResponse {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Job> for JobResponse {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            url: job.url,
            title: job.title,
            status: job.status.as_str().to_string(),
            created_at: job.created_at.to_rfc3339(),
            updated_at: job.updated_at.to_rfc3339(),
        }
    }
}

/// Response for artifact listings
#[derive(Debug, Serialize)]
pub struct ArtifactResponse {
    pub id: i64,
    pub job_id: i64,
    pub language: String,
    pub location: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Artifact> for ArtifactResponse {
    fn from(artifact: Artifact) -> Self {
        Self {
            id: artifact.id,
            job_id: artifact.job_id,
            language: artifact.language,
            location: artifact.location,
            created_at: artifact.created_at.to_rfc3339(),
            updated_at: artifact.updated_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Submit a new job: create the record in `queued` and enqueue the message.
pub async fn submit_job(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SubmitJobBody>,
) -> Result<(StatusCode, Json<JobResponse>), ApiError> {
    if body.url.trim().is_empty() {
        return Err(ApiError::bad_request("url must not be empty"));
    }
    if body.user.trim().is_empty() {
        return Err(ApiError::bad_request("user must not be empty"));
    }

    let user = state.records().find_or_create_user(&body.user)?;
    let job = state.records().create_job(user.id, &body.url)?;

    state
        .queue()
        .send(&TranscriptionRequest {
            video_id: job.id,
            url: job.url.clone(),
            user_id: user.identifier.clone(),
        })
        .await
        .map_err(|e| ApiError::internal(format!("Failed to enqueue job: {}", e)))?;

    info!(job_id = job.id, user = %user.identifier, "job submitted");
    Ok((StatusCode::CREATED, Json(job.into())))
}

/// List the requesting user's jobs.
pub async fn list_jobs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UserParams>,
) -> Result<Json<Vec<JobResponse>>, ApiError> {
    let user = state.records().find_or_create_user(&params.user)?;
    let jobs = state.records().list_jobs(user.id)?;
    Ok(Json(jobs.into_iter().map(JobResponse::from).collect()))
}

/// Get one job, scoped to its owner.
pub async fn get_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(params): Query<UserParams>,
) -> Result<Json<JobResponse>, ApiError> {
    let user = state.records().find_or_create_user(&params.user)?;
    let job = state
        .records()
        .get_job_for_user(id, user.id)?
        .ok_or_else(|| ApiError::not_found(format!("job {}", id)))?;
    Ok(Json(job.into()))
}

/// List a job's transcripts, oldest (original) first.
pub async fn list_transcripts(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(params): Query<UserParams>,
) -> Result<Json<Vec<ArtifactResponse>>, ApiError> {
    let user = state.records().find_or_create_user(&params.user)?;
    state
        .records()
        .get_job_for_user(id, user.id)?
        .ok_or_else(|| ApiError::not_found(format!("job {}", id)))?;

    let artifacts = state.records().list_artifacts(ArtifactKind::Transcript, id)?;
    Ok(Json(
        artifacts.into_iter().map(ArtifactResponse::from).collect(),
    ))
}

/// Read a transcript's content by language.
#[derive(Debug, Deserialize)]
pub struct TranscriptContentParams {
    pub user: String,
    pub language: String,
}

#[derive(Debug, Serialize)]
pub struct TranscriptContentResponse {
    pub language: String,
    pub content: String,
}

pub async fn get_transcript_content(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(params): Query<TranscriptContentParams>,
) -> Result<Json<TranscriptContentResponse>, ApiError> {
    let user = state.records().find_or_create_user(&params.user)?;
    state
        .records()
        .get_job_for_user(id, user.id)?
        .ok_or_else(|| ApiError::not_found(format!("job {}", id)))?;

    let artifact = state
        .records()
        .find_artifact(ArtifactKind::Transcript, id, &params.language)?
        .ok_or_else(|| {
            ApiError::not_found(format!("transcript {} for job {}", params.language, id))
        })?;

    let content = state
        .storage()
        .read(&artifact.location)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to read transcript: {}", e)))?;

    Ok(Json(TranscriptContentResponse {
        language: artifact.language,
        content,
    }))
}
