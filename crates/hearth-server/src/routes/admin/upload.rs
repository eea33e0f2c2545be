//! Image uploads, passed through to the image host.

use super::deleted;
use crate::error::{created, ok, ApiError, ApiResult};
use crate::extract::AdminAuth;
use crate::state::AppState;
use actix_multipart::Multipart;
use actix_web::web;
use futures::TryStreamExt;
use hearth_gateway::{UploadFile, MAX_UPLOAD_BYTES};

/// Multipart field carrying the image.
const FILE_FIELD: &str = "file";

pub async fn upload(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    mut payload: Multipart,
) -> ApiResult {
    let mut file = None;
    while let Some(mut field) = payload.try_next().await.map_err(bad_multipart)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .unwrap_or("upload")
            .to_string();
        let content_type = field
            .content_type()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_default();

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(bad_multipart)? {
            if bytes.len() + chunk.len() > MAX_UPLOAD_BYTES {
                return Err(ApiError::BadRequest(format!(
                    "Image exceeds {} MB",
                    MAX_UPLOAD_BYTES / (1024 * 1024)
                )));
            }
            bytes.extend_from_slice(&chunk);
        }
        file = Some(UploadFile {
            filename,
            content_type,
            bytes,
        });
        break;
    }

    let file = file.ok_or_else(|| ApiError::BadRequest("Missing multipart field 'file'".into()))?;
    file.validate()?;
    let image = state.images.upload(file).await?;
    tracing::info!(public_id = %image.public_id, "image uploaded");
    Ok(created(image))
}

pub async fn destroy(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    public_id: web::Path<String>,
) -> ApiResult {
    let public_id = public_id.into_inner();
    state.images.destroy(&public_id).await?;
    tracing::info!(%public_id, "image deleted");
    Ok(ok(deleted(&public_id)))
}

fn bad_multipart(e: actix_multipart::MultipartError) -> ApiError {
    ApiError::BadRequest(format!("Invalid multipart body: {e}"))
}
