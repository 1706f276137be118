use actix_web::{HttpResponse, web};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /media/{path} - uploaded images.
pub async fn serve(path: web::Path<String>, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let path = path.into_inner();
    let data = state
        .media
        .load(&path)
        .await?
        .ok_or_else(|| AppError::not_found(format!("/media/{path}")))?;

    let mime = mime_guess::from_path(&path).first_or_octet_stream();
    Ok(HttpResponse::Ok()
        .content_type(mime.essence_str())
        .body(data))
}
