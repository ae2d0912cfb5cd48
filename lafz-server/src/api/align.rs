//! Alignment endpoint
//!
//! `POST /` with multipart fields:
//! - `file`: recited audio, any format the transcoder reads
//! - `segments`: one or more `"<start verse>,<end verse>"` values

use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use lafz_common::{Error, OutputRecord};
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::{debug, Instrument};

use crate::error::{ApiError, ApiResult};
use crate::services::RequestWorkspace;
use crate::AppState;

const FILE_FIELD: &str = "file";
const SEGMENTS_FIELD: &str = "segments";

/// Successful alignment: one `[seq, start_ms, end_ms, chapter, verse, word]` per word
#[derive(Debug, Serialize)]
pub struct AlignmentResponse {
    pub segments: Vec<OutputRecord>,
}

/// POST /
pub async fn align_recitation(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<AlignmentResponse>> {
    let pipeline = state.pipeline.clone();
    let workspace = pipeline.open_workspace().await?;
    let span = tracing::info_span!("align_request", request_id = %workspace.request_id());

    async move {
        let segments = receive_upload(&mut multipart, &workspace).await?;
        let records = pipeline.run(&workspace, &segments).await?;
        Ok(Json(AlignmentResponse { segments: records }))
    }
    .instrument(span)
    .await
}

/// Store the `file` field in the workspace and collect `segments` values
async fn receive_upload(
    multipart: &mut Multipart,
    workspace: &RequestWorkspace,
) -> ApiResult<Vec<String>> {
    let mut segments = Vec::new();
    let mut upload_bytes: Option<u64> = None;

    while let Some(mut field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);

        match name.as_deref() {
            Some(FILE_FIELD) => {
                if upload_bytes.is_some() {
                    return Err(ApiError::BadRequest("more than one file field".to_string()));
                }

                let mut file = tokio::fs::File::create(workspace.upload_path()).await?;
                let mut written = 0u64;
                while let Some(chunk) = field.chunk().await? {
                    file.write_all(&chunk).await?;
                    written += chunk.len() as u64;
                }
                file.flush().await?;
                upload_bytes = Some(written);
            }
            Some(SEGMENTS_FIELD) => segments.push(field.text().await?),
            other => debug!(field = ?other, "Ignoring multipart field"),
        }
    }

    match upload_bytes {
        None => Err(Error::Validation("missing 'file' upload".to_string()).into()),
        Some(0) => Err(Error::Validation("uploaded file is empty".to_string()).into()),
        Some(bytes) => {
            debug!(bytes, segments = segments.len(), "Upload received");
            Ok(segments)
        }
    }
}

/// Build alignment routes
pub fn align_routes() -> Router<AppState> {
    Router::new().route("/", post(align_recitation))
}
