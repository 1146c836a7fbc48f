//! Translation and study content handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use lectern_core::{
    metrics::TRANSLATION_FALLBACK_CHUNKS, Artifact, ArtifactKind, ArtifactUpsert, Flashcard,
    GenerateError, QuizQuestion, TranslateError, User,
};

use super::jobs::ArtifactResponse;
use super::ApiError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for translating a transcript
#[derive(Debug, Deserialize)]
pub struct TranslateBody {
    pub user: String,
    /// Target language (ISO 639-1)
    pub target_lang: String,
}

/// Request body for generating study content
#[derive(Debug, Deserialize)]
pub struct GenerateBody {
    pub user: String,
    /// Content language; defaults to the original transcript's language
    pub language: Option<String>,
}

/// Response for flashcard generation
#[derive(Debug, Serialize)]
pub struct FlashcardsResponse {
    pub language: String,
    pub location: String,
    pub flashcards: Vec<Flashcard>,
}

/// Response for quiz generation
#[derive(Debug, Serialize)]
pub struct QuizResponse {
    pub language: String,
    pub location: String,
    pub questions: Vec<QuizQuestion>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Translate a job's original transcript into a target language.
///
/// Idempotent per (job, language): an existing translation is returned
/// as-is; re-derivation would only overwrite the same record.
pub async fn translate_transcript(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<TranslateBody>,
) -> Result<Json<ArtifactResponse>, ApiError> {
    let target = body.target_lang.trim().to_lowercase();
    if target.is_empty() {
        return Err(ApiError::bad_request("target_lang must not be empty"));
    }

    let (user, _) = owned_job(&state, id, &body.user)?;

    if let Some(existing) = state
        .records()
        .find_artifact(ArtifactKind::Transcript, id, &target)?
    {
        return Ok(Json(existing.into()));
    }

    let translator = state
        .translator()
        .ok_or_else(|| ApiError::unavailable("translation is not configured"))?;

    let source = state
        .records()
        .original_transcript(id)?
        .ok_or_else(|| ApiError::not_found(format!("no transcript yet for job {}", id)))?;

    let translated = translator
        .translate_location(state.storage(), &source.location, &target)
        .await
        .map_err(|e| match e {
            TranslateError::Source(inner) => {
                ApiError::internal(format!("Source transcript unreadable: {}", inner))
            }
            other => ApiError::internal(other.to_string()),
        })?;

    if translated.fallback_chunks > 0 {
        TRANSLATION_FALLBACK_CHUNKS.inc_by(translated.fallback_chunks as u64);
        warn!(
            job_id = id,
            chunks = translated.fallback_chunks,
            "translation degraded; some chunks kept original text"
        );
    }

    let artifact = state.records().upsert_artifact(ArtifactUpsert {
        kind: ArtifactKind::Transcript,
        job_id: id,
        user_id: user.id,
        language: target.clone(),
        location: translated.location,
    })?;

    info!(job_id = id, language = %target, "transcript translated");
    Ok(Json(artifact.into()))
}

/// Generate (or return cached) flashcards for a job.
pub async fn generate_flashcards(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<GenerateBody>,
) -> Result<Json<FlashcardsResponse>, ApiError> {
    let (user, _) = owned_job(&state, id, &body.user)?;
    let (source, language) = source_transcript(&state, id, body.language.as_deref())?;

    // Re-derivation updates the same record, so a cached set is authoritative.
    if let Some(cached) = state
        .records()
        .find_artifact(ArtifactKind::Flashcards, id, &language)?
    {
        let flashcards = read_items::<Flashcard>(&state, &cached.location).await?;
        return Ok(Json(FlashcardsResponse {
            language,
            location: cached.location,
            flashcards,
        }));
    }

    let generator = state
        .generator()
        .ok_or_else(|| ApiError::unavailable("content generation is not configured"))?;

    let text = state
        .storage()
        .read(&source.location)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to read transcript: {}", e)))?;

    let flashcards = generator
        .generate_flashcards(&text, &language)
        .await
        .map_err(map_generate_error)?;

    let location = persist_items(&state, ArtifactKind::Flashcards, &user, id, &language, &flashcards)
        .await?;

    info!(job_id = id, language = %language, count = flashcards.len(), "flashcards generated");
    Ok(Json(FlashcardsResponse {
        language,
        location,
        flashcards,
    }))
}

/// Generate (or return cached) a quiz for a job.
pub async fn generate_quiz(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<GenerateBody>,
) -> Result<Json<QuizResponse>, ApiError> {
    let (user, _) = owned_job(&state, id, &body.user)?;
    let (source, language) = source_transcript(&state, id, body.language.as_deref())?;

    if let Some(cached) = state
        .records()
        .find_artifact(ArtifactKind::Quiz, id, &language)?
    {
        let questions = read_items::<QuizQuestion>(&state, &cached.location).await?;
        return Ok(Json(QuizResponse {
            language,
            location: cached.location,
            questions,
        }));
    }

    let generator = state
        .generator()
        .ok_or_else(|| ApiError::unavailable("content generation is not configured"))?;

    let text = state
        .storage()
        .read(&source.location)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to read transcript: {}", e)))?;

    let questions = generator
        .generate_quiz(&text, &language)
        .await
        .map_err(map_generate_error)?;

    let location =
        persist_items(&state, ArtifactKind::Quiz, &user, id, &language, &questions).await?;

    info!(job_id = id, language = %language, count = questions.len(), "quiz generated");
    Ok(Json(QuizResponse {
        language,
        location,
        questions,
    }))
}

// ============================================================================
// Helpers
// ============================================================================

fn owned_job(
    state: &Arc<AppState>,
    id: i64,
    user_identifier: &str,
) -> Result<(User, lectern_core::Job), ApiError> {
    let user = state.records().find_or_create_user(user_identifier)?;
    let job = state
        .records()
        .get_job_for_user(id, user.id)?
        .ok_or_else(|| ApiError::not_found(format!("job {}", id)))?;
    Ok((user, job))
}

/// Pick the source transcript and the content language: a language-specific
/// transcript when one exists, the original otherwise.
fn source_transcript(
    state: &Arc<AppState>,
    job_id: i64,
    language: Option<&str>,
) -> Result<(Artifact, String), ApiError> {
    if let Some(language) = language {
        let language = language.trim().to_lowercase();
        if let Some(artifact) =
            state
                .records()
                .find_artifact(ArtifactKind::Transcript, job_id, &language)?
        {
            return Ok((artifact, language));
        }
        let original = state
            .records()
            .original_transcript(job_id)?
            .ok_or_else(|| ApiError::not_found(format!("no transcript yet for job {}", job_id)))?;
        return Ok((original, language));
    }

    let original = state
        .records()
        .original_transcript(job_id)?
        .ok_or_else(|| ApiError::not_found(format!("no transcript yet for job {}", job_id)))?;
    let language = original.language.clone();
    Ok((original, language))
}

/// Persist a generated item list as a JSON array at its deterministic key
/// and commit the artifact record.
async fn persist_items<T: serde::Serialize>(
    state: &Arc<AppState>,
    kind: ArtifactKind,
    user: &User,
    job_id: i64,
    language: &str,
    items: &[T],
) -> Result<String, ApiError> {
    let json = serde_json::to_vec(items)
        .map_err(|e| ApiError::internal(format!("Failed to encode items: {}", e)))?;

    let key = format!(
        "{}/{}/{}_{}.json",
        kind.key_prefix(),
        user.identifier,
        job_id,
        language
    );
    let location = state
        .storage()
        .store_bytes(&key, json)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to store items: {}", e)))?;

    state.records().upsert_artifact(ArtifactUpsert {
        kind,
        job_id,
        user_id: user.id,
        language: language.to_string(),
        location: location.clone(),
    })?;

    Ok(location)
}

async fn read_items<T: serde::de::DeserializeOwned>(
    state: &Arc<AppState>,
    location: &str,
) -> Result<Vec<T>, ApiError> {
    let json = state
        .storage()
        .read(location)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to read stored items: {}", e)))?;
    serde_json::from_str(&json)
        .map_err(|e| ApiError::internal(format!("Stored items are corrupt: {}", e)))
}

fn map_generate_error(e: GenerateError) -> ApiError {
    match e {
        GenerateError::EmptySource => ApiError::bad_request("transcript is empty"),
        other => ApiError::internal(other.to_string()),
    }
}
