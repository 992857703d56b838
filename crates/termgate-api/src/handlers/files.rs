//! File transfer handlers.
//!
//! GET /api/download - streams a file relative to the caller's virtual cwd.
//! POST /api/upload - multipart upload into the caller's virtual cwd.

use std::path::{Path, PathBuf};

use actix_multipart::Multipart;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse};
use futures_util::TryStreamExt;

use crate::auth::AuthenticatedUser;
use crate::models::{DownloadQuery, ErrorResponse, ExecDefaults, UploadResponse};

/// Resolve a client-supplied path against the caller's virtual cwd.
/// Absolute paths pass through unchanged.
fn resolve_path(path: &str, cwd: Option<&str>, defaults: &ExecDefaults) -> PathBuf {
    let candidate = Path::new(path);
    if candidate.is_absolute() {
        return candidate.to_path_buf();
    }
    let base = match cwd {
        Some(cwd) if !cwd.trim().is_empty() => cwd,
        _ => defaults.default_cwd.as_str(),
    };
    Path::new(base).join(candidate)
}

/// GET /api/download?path=&cwd=
pub async fn download_handler(
    user: AuthenticatedUser,
    defaults: web::Data<ExecDefaults>,
    query: web::Query<DownloadQuery>,
) -> HttpResponse {
    if query.path.trim().is_empty() {
        return HttpResponse::BadRequest().json(ErrorResponse::new("Path is required"));
    }

    let full_path = resolve_path(&query.path, query.cwd.as_deref(), &defaults);
    log::info!("download user={} path={}", user.username, full_path.display());

    let metadata = match tokio::fs::metadata(&full_path).await {
        Ok(metadata) => metadata,
        Err(_) => {
            return HttpResponse::NotFound().json(ErrorResponse::new("File not found"));
        }
    };
    if metadata.is_dir() {
        return HttpResponse::BadRequest()
            .json(ErrorResponse::new("Path is a directory, not a file"));
    }

    let contents = match tokio::fs::read(&full_path).await {
        Ok(contents) => contents,
        Err(e) => {
            log::error!("Failed to read {}: {}", full_path.display(), e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::new("Failed to read file"));
        }
    };

    let filename = full_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "download".to_string());

    HttpResponse::Ok()
        .content_type("application/octet-stream")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(filename)],
        })
        .body(contents)
}

/// POST /api/upload (multipart: `file` plus optional `cwd` text field)
pub async fn upload_handler(
    user: AuthenticatedUser,
    defaults: web::Data<ExecDefaults>,
    mut payload: Multipart,
) -> HttpResponse {
    let mut cwd: Option<String> = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    loop {
        let mut field = match payload.try_next().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return HttpResponse::BadRequest()
                    .json(ErrorResponse::new(format!("Invalid multipart payload: {}", e)));
            }
        };

        let name = field.name().to_string();
        let filename = field
            .content_disposition()
            .get_filename()
            .map(str::to_string);

        let mut data = Vec::new();
        loop {
            match field.try_next().await {
                Ok(Some(chunk)) => data.extend_from_slice(&chunk),
                Ok(None) => break,
                Err(e) => {
                    return HttpResponse::BadRequest()
                        .json(ErrorResponse::new(format!("Upload interrupted: {}", e)));
                }
            }
        }

        match (name.as_str(), filename) {
            ("file", Some(filename)) => file = Some((filename, data)),
            ("cwd", _) => cwd = Some(String::from_utf8_lossy(&data).into_owned()),
            _ => {}
        }
    }

    let (filename, data) = match file {
        Some(file) => file,
        None => {
            return HttpResponse::BadRequest().json(ErrorResponse::new("No file uploaded"));
        }
    };

    let dest_dir = match cwd.as_deref() {
        Some(cwd) if !cwd.trim().is_empty() => PathBuf::from(cwd),
        _ => PathBuf::from(&defaults.default_cwd),
    };

    match tokio::fs::metadata(&dest_dir).await {
        Ok(metadata) if metadata.is_dir() => {}
        _ => {
            return HttpResponse::BadRequest()
                .json(ErrorResponse::new("Destination directory does not exist"));
        }
    }

    // Reject path separators smuggled into the filename.
    let filename = Path::new(&filename)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    let dest = dest_dir.join(&filename);
    let size = data.len() as u64;

    if let Err(e) = tokio::fs::write(&dest, data).await {
        log::error!("Failed to write {}: {}", dest.display(), e);
        return HttpResponse::InternalServerError()
            .json(ErrorResponse::new("Failed to save file"));
    }

    log::info!(
        "upload user={} path={} size={}",
        user.username,
        dest.display(),
        size
    );
    HttpResponse::Ok().json(UploadResponse {
        success: true,
        message: format!("Uploaded {}", filename),
        path: dest.to_string_lossy().into_owned(),
        size,
    })
}
