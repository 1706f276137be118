//! Reading the post and comment forms from `multipart/form-data` or urlencoded bodies.

use actix_multipart::{Field, Multipart};
use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, web};
use futures::{StreamExt, TryStreamExt};

use yatube_core::forms::{CommentForm, PostForm, UploadedFile};

use crate::middleware::error::{AppError, AppResult};

/// Largest accepted image upload.
const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Largest accepted text field.
const MAX_TEXT_BYTES: usize = 64 * 1024;

fn is_multipart(req: &HttpRequest) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"))
}

async fn read_field(field: &mut Field, limit: usize) -> AppResult<Vec<u8>> {
    let mut data = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| AppError::BadRequest(e.to_string()))?;
        if data.len() + chunk.len() > limit {
            return Err(AppError::BadRequest("Upload too large".to_string()));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

fn text(data: Vec<u8>) -> AppResult<String> {
    String::from_utf8(data).map_err(|_| AppError::BadRequest("Form field is not UTF-8".to_string()))
}

/// Parse `text`, `group` and `image` from the request body.
pub async fn read_post_form(req: &HttpRequest, payload: web::Payload) -> AppResult<PostForm> {
    if !is_multipart(req) {
        let mut payload = payload.into_inner();
        let form = web::Form::<PostForm>::from_request(req, &mut payload)
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        return Ok(form.into_inner());
    }

    let mut multipart = Multipart::new(req.headers(), payload);
    let mut form = PostForm::default();

    while let Some(mut field) = multipart
        .try_next()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        match name.as_str() {
            "text" => form.text = text(read_field(&mut field, MAX_TEXT_BYTES).await?)?,
            "group" => form.group = Some(text(read_field(&mut field, MAX_TEXT_BYTES).await?)?),
            "image" => {
                let filename = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename())
                    .map(str::to_owned);
                let content_type = field.content_type().map(|mime| mime.to_string());
                let data = read_field(&mut field, MAX_IMAGE_BYTES).await?;
                // Browsers send a nameless empty part when no file was chosen.
                if data.is_empty() && filename.as_deref().is_none_or(str::is_empty) {
                    continue;
                }
                form.image = Some(UploadedFile {
                    filename,
                    content_type,
                    data,
                });
            }
            other => {
                tracing::debug!(field = other, "Ignoring unknown form field");
                read_field(&mut field, MAX_IMAGE_BYTES).await?;
            }
        }
    }

    Ok(form)
}

/// Parse the comment form. A body that cannot be read is an empty comment,
/// so the caller treats it like any other invalid submission.
pub async fn read_comment_form(req: &HttpRequest, payload: web::Payload) -> CommentForm {
    let parsed = if is_multipart(req) {
        read_comment_multipart(req, payload).await
    } else {
        let mut payload = payload.into_inner();
        web::Form::<CommentForm>::from_request(req, &mut payload)
            .await
            .map(web::Form::into_inner)
            .map_err(|e| AppError::BadRequest(e.to_string()))
    };

    parsed.unwrap_or_else(|e| {
        tracing::debug!(error = %e, "Unreadable comment body");
        CommentForm::default()
    })
}

async fn read_comment_multipart(
    req: &HttpRequest,
    payload: web::Payload,
) -> AppResult<CommentForm> {
    let mut multipart = Multipart::new(req.headers(), payload);
    let mut form = CommentForm::default();

    while let Some(mut field) = multipart
        .try_next()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let is_text = field.name() == Some("text");
        let data = read_field(&mut field, MAX_TEXT_BYTES).await?;
        if is_text {
            form.text = text(data)?;
        }
    }

    Ok(form)
}
