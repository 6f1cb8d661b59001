use super::{ApiError, AppState};
use crate::uploads::{StoreUploadInput, UploadNamespace, UploadService, UploadView};
use anyhow::Context;
use axum::body::Body;
use axum::extract::{Multipart, Path, State};
use axum::http::{
    header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE},
    HeaderValue, StatusCode,
};
use axum::response::Response;
use axum::Json;
use tokio::fs::File as TokioFile;
use tokio_util::io::ReaderStream;

pub(crate) async fn store_upload(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadView>), ApiError> {
    let namespace = UploadNamespace::parse(&namespace)?;
    let service = UploadService::new(state.database.clone(), state.config.paths.clone());

    let mut file_bytes = None;
    let mut filename = None;
    let mut mime = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::BadRequest(err.to_string()))?
    {
        if field.name() == Some("file") {
            filename = field.file_name().map(|s| s.to_string());
            mime = field.content_type().map(|s| s.to_string());
            let bytes = field
                .bytes()
                .await
                .map_err(|err| ApiError::BadRequest(err.to_string()))?;
            file_bytes = Some(bytes.to_vec());
            break;
        }
    }

    let data = file_bytes.ok_or_else(|| ApiError::BadRequest("missing file field".into()))?;

    let view = service
        .store(StoreUploadInput {
            namespace,
            original_name: filename,
            mime,
            data,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub(crate) async fn download_upload(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let service = UploadService::new(state.database.clone(), state.config.paths.clone());
    let download = service.open(&id).await?;

    let file = TokioFile::open(&download.absolute_path)
        .await
        .with_context(|| format!("unable to open {}", download.absolute_path.display()))
        .map_err(ApiError::Internal)?;
    let stream = ReaderStream::new(file);
    let body = Body::from_stream(stream);
    let mut response = Response::new(body);
    let headers = response.headers_mut();

    let content_type = download
        .metadata
        .mime
        .clone()
        .unwrap_or_else(|| "application/octet-stream".into());
    if let Ok(value) = HeaderValue::from_str(&content_type) {
        headers.insert(CONTENT_TYPE, value);
    }

    if let Some(size) = download.metadata.size_bytes {
        if let Ok(value) = HeaderValue::from_str(&size.to_string()) {
            headers.insert(CONTENT_LENGTH, value);
        }
    }

    if let Some(name) = download.metadata.original_name.clone() {
        let value = format!("attachment; filename=\"{}\"", name.replace('"', ""));
        if let Ok(value) = HeaderValue::from_str(&value) {
            headers.insert(CONTENT_DISPOSITION, value);
        }
    }

    Ok(response)
}
