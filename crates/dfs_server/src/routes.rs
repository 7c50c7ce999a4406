use axum::body::Body;
use axum::extract::{FromRequestParts, Multipart, Query, State};
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::prelude::{Engine, BASE64_STANDARD};
use bytes::Bytes;
use dfs_domain::{BlockLocation, ByteStream, DirectoryEntry, ListItem, WritePolicy};
use dfs_services::{FileFacade, Infrastructure};
use futures::SinkExt;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::{Error, Result};

/// Routes of the gateway. Parameters travel in the query string, the file
/// of `createFile` as the multipart field `file`.
pub fn router<F: Infrastructure>(facade: FileFacade<F>) -> Router {
    let hdfs = Router::new()
        .route("/mkdir", post(mkdir_handler::<F>))
        .route("/readPathInfo", post(read_path_info_handler::<F>))
        .route("/getFileBlockLocations", post(block_locations_handler::<F>))
        .route("/createFile", post(create_file_handler::<F>))
        .route("/readFile", post(read_file_handler::<F>))
        .route("/openFileToBytes", post(open_file_to_bytes_handler::<F>))
        .route("/openFile", get(open_file_handler::<F>))
        .route("/listFile", post(list_file_handler::<F>))
        .route("/renameFile", post(rename_file_handler::<F>))
        .route("/deleteFile", post(delete_file_handler::<F>))
        .route("/uploadFile", post(upload_file_handler::<F>))
        .route("/downloadFile", post(download_file_handler::<F>))
        .route("/copyFile", post(copy_file_handler::<F>))
        .route("/existFile", post(exist_file_handler::<F>));

    Router::new()
        .nest("/hdfs", hdfs)
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        .with_state(facade)
}

#[derive(Debug, Deserialize)]
struct PathQuery {
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateFileQuery {
    path: Option<String>,
    overwrite: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenameQuery {
    old_name: Option<String>,
    new_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadQuery {
    path: Option<String>,
    upload_path: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DownloadQuery {
    path: Option<String>,
    download_path: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CopyQuery {
    source_path: Option<String>,
    target_path: Option<String>,
}

/// `Query` whose malformed values are answered like every other bad argument.
struct Params<T>(T);

impl<S, T> FromRequestParts<S> for Params<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

fn required(value: Option<String>, name: &'static str) -> Result<String> {
    value.ok_or(Error::MissingParameter(name))
}

async fn mkdir_handler<F: Infrastructure>(
    State(facade): State<FileFacade<F>>,
    Params(query): Params<PathQuery>,
) -> Result<Response> {
    let path = required(query.path, "path")?;
    if facade.create_directory(&path).await? {
        Ok((StatusCode::OK, "Success").into_response())
    } else {
        Ok((StatusCode::INTERNAL_SERVER_ERROR, "Error").into_response())
    }
}

async fn read_path_info_handler<F: Infrastructure>(
    State(facade): State<FileFacade<F>>,
    Params(query): Params<PathQuery>,
) -> Result<Json<Vec<DirectoryEntry>>> {
    let path = required(query.path, "path")?;
    Ok(Json(facade.read_directory_info(&path).await?))
}

async fn block_locations_handler<F: Infrastructure>(
    State(facade): State<FileFacade<F>>,
    Params(query): Params<PathQuery>,
) -> Result<Json<Vec<BlockLocation>>> {
    let path = required(query.path, "path")?;
    Ok(Json(facade.get_block_locations(&path).await?))
}

/// Streams the `file` field into the cluster while it is still arriving.
async fn create_file_handler<F: Infrastructure>(
    State(facade): State<FileFacade<F>>,
    Params(query): Params<CreateFileQuery>,
    mut multipart: Multipart,
) -> Result<&'static str> {
    let path = required(query.path, "path")?;

    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let (mut sender, receiver) = futures::channel::mpsc::channel::<anyhow::Result<Bytes>>(1);
        let content: ByteStream = Box::pin(receiver);
        let feed = async move {
            loop {
                let chunk = match field.chunk().await {
                    Ok(Some(chunk)) => Ok(chunk),
                    Ok(None) => break,
                    Err(error) => Err(anyhow::Error::from(error)),
                };
                let failed = chunk.is_err();
                // The facade stops reading once it has failed.
                if sender.send(chunk).await.is_err() || failed {
                    break;
                }
            }
        };
        let created = async {
            match query.overwrite {
                Some(overwrite) => {
                    facade
                        .create_file_with(&path, content, WritePolicy::from_overwrite(overwrite))
                        .await
                }
                None => facade.create_file(&path, content).await,
            }
        };

        let ((), created) = tokio::join!(feed, created);
        created?;
        return Ok("File created");
    }

    Err(Error::MissingField("file"))
}

async fn read_file_handler<F: Infrastructure>(
    State(facade): State<FileFacade<F>>,
    Params(query): Params<PathQuery>,
) -> Result<String> {
    let path = required(query.path, "path")?;
    Ok(facade.read_file_as_text(&path).await?)
}

async fn open_file_to_bytes_handler<F: Infrastructure>(
    State(facade): State<FileFacade<F>>,
    Params(query): Params<PathQuery>,
) -> Result<Json<String>> {
    let path = required(query.path, "path")?;
    let content = facade.read_file_as_bytes(&path).await?;
    Ok(Json(BASE64_STANDARD.encode(content)))
}

async fn open_file_handler<F: Infrastructure>(
    State(facade): State<FileFacade<F>>,
    Params(query): Params<PathQuery>,
) -> Result<Response> {
    let path = required(query.path, "path")?;
    let content = facade.open_file(&path).await?;
    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        Body::from_stream(content),
    )
        .into_response())
}

async fn list_file_handler<F: Infrastructure>(
    State(facade): State<FileFacade<F>>,
    Params(query): Params<PathQuery>,
) -> Result<Json<Vec<ListItem>>> {
    let path = required(query.path, "path")?;
    Ok(Json(facade.list_directory(&path).await?))
}

async fn rename_file_handler<F: Infrastructure>(
    State(facade): State<FileFacade<F>>,
    Params(query): Params<RenameQuery>,
) -> Result<Json<bool>> {
    let old_name = required(query.old_name, "oldName")?;
    let new_name = required(query.new_name, "newName")?;
    Ok(Json(facade.rename(&old_name, &new_name).await?))
}

async fn delete_file_handler<F: Infrastructure>(
    State(facade): State<FileFacade<F>>,
    Params(query): Params<PathQuery>,
) -> Result<Json<bool>> {
    let path = required(query.path, "path")?;
    Ok(Json(facade.delete_file(&path).await?))
}

async fn upload_file_handler<F: Infrastructure>(
    State(facade): State<FileFacade<F>>,
    Params(query): Params<UploadQuery>,
) -> Result<StatusCode> {
    let local = required(query.path, "path")?;
    let remote = required(query.upload_path, "uploadPath")?;
    facade.upload(&local, &remote).await?;
    Ok(StatusCode::OK)
}

async fn download_file_handler<F: Infrastructure>(
    State(facade): State<FileFacade<F>>,
    Params(query): Params<DownloadQuery>,
) -> Result<StatusCode> {
    let remote = required(query.path, "path")?;
    let local = required(query.download_path, "downloadPath")?;
    facade.download(&remote, &local).await?;
    Ok(StatusCode::OK)
}

async fn copy_file_handler<F: Infrastructure>(
    State(facade): State<FileFacade<F>>,
    Params(query): Params<CopyQuery>,
) -> Result<StatusCode> {
    let source = required(query.source_path, "sourcePath")?;
    let target = required(query.target_path, "targetPath")?;
    facade.copy(&source, &target).await?;
    Ok(StatusCode::OK)
}

async fn exist_file_handler<F: Infrastructure>(
    State(facade): State<FileFacade<F>>,
    Params(query): Params<PathQuery>,
) -> Result<Json<bool>> {
    let path = required(query.path, "path")?;
    Ok(Json(facade.exist_file(&path).await?))
}

async fn health_handler() -> StatusCode {
    StatusCode::OK
}
