//! Handlers for scan image upload, listing, serving, and ordering.

use std::collections::HashMap;
use std::io::Cursor;

use axum::body::Body;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use wheelway_core::scan::ScanStatus;
use wheelway_core::types::{DbId, Timestamp};
use wheelway_core::CoreError;
use wheelway_db::models::image::{CreateScanImage, ScanImage};
use wheelway_db::repositories::{BarrierRepo, ScanImageRepo, ScanRepo};
use wheelway_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::handlers::require_scan;
use crate::state::AppState;

/// Content types accepted for scan images.
const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

/// Fallback extension when the uploaded filename carries none.
const DEFAULT_EXTENSION: &str = "jpg";

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// One stored image as served to clients.
#[derive(Debug, Serialize)]
pub struct ImageResponse {
    pub id: DbId,
    pub filename: String,
    pub original_filename: Option<String>,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub sequence_order: i32,
    pub created_at: Timestamp,
    pub barrier_count: i64,
    pub url: String,
}

impl ImageResponse {
    /// Project a stored row, attaching its barrier count and file URL.
    pub fn new(scan_id: DbId, image: ScanImage, barrier_count: i64) -> Self {
        let url = image_url(scan_id, image.id);
        let filename = image.stored_filename().to_string();
        Self {
            id: image.id,
            filename,
            original_filename: image.original_filename,
            file_size: image.file_size_bytes,
            mime_type: image.content_type,
            width: image.width,
            height: image.height,
            sequence_order: image.sequence_order,
            created_at: image.created_at,
            barrier_count,
            url,
        }
    }
}

/// Result of a multipart upload batch.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub uploaded: usize,
    pub failed: usize,
    pub images: Vec<ImageResponse>,
    pub errors: Vec<String>,
}

/// URL the stored bytes of an image are served from.
pub fn image_url(scan_id: DbId, image_id: DbId) -> String {
    format!("/api/v1/scans/{scan_id}/images/{image_id}/file")
}

/// Barrier counts for a scan, keyed by image id.
pub(crate) async fn barrier_counts_by_image(
    pool: &DbPool,
    scan_id: DbId,
) -> Result<HashMap<DbId, i64>, sqlx::Error> {
    Ok(BarrierRepo::counts_by_image(pool, scan_id)
        .await?
        .into_iter()
        .collect())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/scans/{scan_id}/images
///
/// Multipart upload of one or more image files. Files are validated
/// individually; a batch with some invalid files still stores the valid
/// ones and reports each failure as a `"<filename>: <reason>"` string.
pub async fn upload(
    State(state): State<AppState>,
    Path(scan_id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<UploadResponse>)> {
    let scan = require_scan(&state.pool, scan_id).await?;

    let existing = ScanImageRepo::count_by_scan(&state.pool, scan_id).await?;
    let cap = state.config.max_images_per_scan as i64;
    if existing >= cap {
        return Err(AppError::BadRequest(format!(
            "Scan already has the maximum of {cap} images"
        )));
    }

    if scan.status == ScanStatus::Pending.as_str() {
        ScanRepo::set_status(&state.pool, scan_id, ScanStatus::Uploading).await?;
    }

    let scan_dir = state.config.scan_upload_dir(scan_id);
    tokio::fs::create_dir_all(&scan_dir).await.map_err(|err| {
        AppError::InternalError(format!("Could not create upload directory: {err}"))
    })?;

    let max_bytes = state.config.max_upload_size_bytes() as usize;
    let mut next_order = ScanImageRepo::next_sequence_order(&state.pool, scan_id).await?;
    let mut slots_left = cap - existing;

    let mut images = Vec::new();
    let mut errors = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::BadRequest(err.to_string()))?
    {
        // Non-file parts (e.g. stray form values) are skipped.
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field.content_type().unwrap_or("").to_string();

        let data = match field.bytes().await {
            Ok(data) => data,
            Err(err) => {
                errors.push(format!("{filename}: {err}"));
                continue;
            }
        };

        if !ALLOWED_IMAGE_TYPES.contains(&content_type.as_str()) {
            errors.push(format!(
                "{filename}: Unsupported content type '{content_type}'"
            ));
            continue;
        }
        if data.len() > max_bytes {
            errors.push(format!(
                "{filename}: File exceeds the {} MB size limit",
                state.config.max_upload_size_mb
            ));
            continue;
        }
        if slots_left == 0 {
            errors.push(format!("{filename}: Scan image limit reached"));
            continue;
        }
        let Some((width, height)) = probe_dimensions(&data) else {
            errors.push(format!("{filename}: Could not read image dimensions"));
            continue;
        };

        let stored_name = format!("{}.{}", uuid::Uuid::new_v4(), extension_for(&filename));
        let file_path = scan_dir.join(&stored_name);
        if let Err(err) = tokio::fs::write(&file_path, &data).await {
            tracing::error!(scan_id, filename = %filename, error = %err, "Could not store uploaded file");
            errors.push(format!("{filename}: Could not store file"));
            continue;
        }

        let input = CreateScanImage {
            scan_id,
            file_path: file_path.to_string_lossy().to_string(),
            original_filename: Some(filename),
            content_type: Some(content_type),
            file_size_bytes: Some(data.len() as i64),
            width: Some(width as i32),
            height: Some(height as i32),
            sequence_order: next_order,
        };
        let image = ScanImageRepo::create(&state.pool, &input).await?;
        next_order += 1;
        slots_left -= 1;
        images.push(ImageResponse::new(scan_id, image, 0));
    }

    if !images.is_empty() {
        ScanRepo::set_status(&state.pool, scan_id, ScanStatus::Ready).await?;
    }

    let uploaded = images.len();
    let failed = errors.len();
    tracing::info!(scan_id, uploaded, failed, "Image upload batch processed");

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            uploaded,
            failed,
            images,
            errors,
        }),
    ))
}

/// GET /api/v1/scans/{scan_id}/images
pub async fn list_by_scan(
    State(state): State<AppState>,
    Path(scan_id): Path<DbId>,
) -> AppResult<Json<Vec<ImageResponse>>> {
    require_scan(&state.pool, scan_id).await?;
    Ok(Json(image_listing(&state.pool, scan_id).await?))
}

/// POST /api/v1/scans/{scan_id}/images/reorder
///
/// Body is the bare ordered list of image ids; the first id gets sequence
/// position 0. Responds with the refreshed listing.
pub async fn reorder(
    State(state): State<AppState>,
    Path(scan_id): Path<DbId>,
    Json(ordered_ids): Json<Vec<DbId>>,
) -> AppResult<Json<Vec<ImageResponse>>> {
    require_scan(&state.pool, scan_id).await?;

    let applied = ScanImageRepo::reorder(&state.pool, scan_id, &ordered_ids).await?;
    if !applied {
        return Err(AppError::BadRequest(
            "Image id list does not match the scan's images".to_string(),
        ));
    }

    Ok(Json(image_listing(&state.pool, scan_id).await?))
}

/// DELETE /api/v1/scans/{scan_id}/images/{image_id}
///
/// Removes the row (its barriers cascade) and best-effort deletes the
/// stored file. Deleting the last image drops the scan back to `pending`.
pub async fn delete(
    State(state): State<AppState>,
    Path((scan_id, image_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let image = require_image(&state.pool, scan_id, image_id).await?;

    ScanImageRepo::delete(&state.pool, image_id).await?;
    if let Err(err) = tokio::fs::remove_file(&image.file_path).await {
        if err.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(image_id, error = %err, "Could not remove stored image file");
        }
    }

    let remaining = ScanImageRepo::count_by_scan(&state.pool, scan_id).await?;
    if remaining == 0 {
        ScanRepo::set_status(&state.pool, scan_id, ScanStatus::Pending).await?;
    }

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/scans/{scan_id}/images/{image_id}/file
///
/// Serve the stored bytes with the stored content type.
pub async fn serve_file(
    State(state): State<AppState>,
    Path((scan_id, image_id)): Path<(DbId, DbId)>,
) -> AppResult<Response> {
    let image = require_image(&state.pool, scan_id, image_id).await?;

    let data = tokio::fs::read(&image.file_path).await.map_err(|_| {
        AppError::Core(CoreError::NotFound {
            entity: "Stored file for image",
            id: image_id,
        })
    })?;

    let content_type = image
        .content_type
        .as_deref()
        .unwrap_or("application/octet-stream");

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, data.len().to_string())
        .header(
            header::CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=86400"),
        )
        .body(Body::from(data))
        .unwrap())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load an image scoped to its parent scan or surface the standard 404.
async fn require_image(pool: &DbPool, scan_id: DbId, image_id: DbId) -> AppResult<ScanImage> {
    ScanImageRepo::find_for_scan(pool, scan_id, image_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Image",
            id: image_id,
        }))
}

/// A scan's images in route order, with barrier counts attached.
async fn image_listing(pool: &DbPool, scan_id: DbId) -> AppResult<Vec<ImageResponse>> {
    let images = ScanImageRepo::list_by_scan(pool, scan_id).await?;
    let counts = barrier_counts_by_image(pool, scan_id).await?;
    Ok(images
        .into_iter()
        .map(|image| {
            let barrier_count = counts.get(&image.id).copied().unwrap_or(0);
            ImageResponse::new(scan_id, image, barrier_count)
        })
        .collect())
}

/// Read image dimensions from the file header without decoding pixels.
fn probe_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    image::ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

/// File extension from the original name, lowercased; `jpg` when absent.
fn extension_for(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => ext.to_lowercase(),
        _ => DEFAULT_EXTENSION.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_falls_back_to_jpg() {
        assert_eq!(extension_for("photo.PNG"), "png");
        assert_eq!(extension_for("entrada.jpeg"), "jpeg");
        assert_eq!(extension_for("noext"), "jpg");
        assert_eq!(extension_for(".hidden"), "jpg");
        assert_eq!(extension_for("trailing."), "jpg");
    }

    #[test]
    fn probe_reads_png_header() {
        let img = image::RgbaImage::new(3, 2);
        let mut cursor = Cursor::new(Vec::new());
        img.write_to(&mut cursor, image::ImageFormat::Png)
            .expect("png encode");

        assert_eq!(probe_dimensions(&cursor.into_inner()), Some((3, 2)));
        assert_eq!(probe_dimensions(b"not an image"), None);
    }
}
