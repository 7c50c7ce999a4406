use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use bytes::Bytes;
use dfs_domain::{ByteStream, ClusterPath};
use dfs_services::{ByteSink, Cluster, ClusterError, FileStatus, FileType, NativeBlockLocation};
use futures::TryStreamExt;
use reqwest::header::LOCATION;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::endpoint::{operation_url, rest_base};
use super::response::{
    BlockLocationsResponse, BooleanResponse, FileStatusResponse, ListStatusResponse,
    RemoteExceptionResponse,
};
use super::sink::WebHdfsSink;

/// A cluster reached over the WebHDFS REST API. Redirects to DataNodes are
/// followed by hand so that write bodies are only sent once the final
/// location is known.
#[derive(Clone)]
pub struct WebHdfsCluster {
    client: Client,
    base: Url,
    user: String,
}

impl WebHdfsCluster {
    pub fn new(endpoint: &str, user: impl Into<String>, connect_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(connect_timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, base: rest_base(endpoint)?, user: user.into() })
    }

    pub(super) fn url(&self, path: &ClusterPath, op: &str) -> Url {
        operation_url(&self.base, path, op, &self.user)
    }

    /// Sends a request and turns transport failures and error responses
    /// into failures carrying a [`ClusterError`] where one applies.
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        if status.is_success() || status.is_redirection() {
            return Ok(response);
        }
        Err(remote_error(response).await)
    }

    async fn json<T: DeserializeOwned>(&self, method: Method, url: Url) -> Result<T> {
        let response = self.send(self.client.request(method, url.clone())).await?;
        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to decode response from {}", redact(&url)))
    }

    async fn boolean(&self, method: Method, url: Url) -> Result<bool> {
        Ok(self.json::<BooleanResponse>(method, url).await?.boolean)
    }

    /// Runs the two-step protocol of `CREATE` and `APPEND`: the NameNode
    /// answers with a redirect and the content goes to the DataNode it names.
    pub(super) async fn upload(&self, method: Method, url: Url, body: Bytes) -> Result<()> {
        let response = self.send(self.client.request(method.clone(), url)).await?;
        if !response.status().is_redirection() {
            if body.is_empty() {
                return Ok(());
            }
            bail!(
                "Expected a redirect to a DataNode, got {} from {}",
                response.status(),
                redact(response.url())
            );
        }

        let location = redirect_target(&response)?;
        debug!(location = %redact(&location), bytes = body.len(), "Sending content to DataNode");
        self.send(self.client.request(method, location).body(body))
            .await?;
        Ok(())
    }

    /// `RENAME` with `renameoptions=OVERWRITE`: replaces `to` in one step.
    /// The NameNode answers with an empty body and reports refusals as
    /// exceptions.
    pub(super) async fn replace(&self, from: &ClusterPath, to: &ClusterPath) -> Result<()> {
        debug!(from = %from, to = %to, "RENAME (overwrite)");
        let mut url = self.url(from, "RENAME");
        url.query_pairs_mut()
            .append_pair("destination", to.as_str())
            .append_pair("renameoptions", "OVERWRITE");
        self.send(self.client.put(url))
            .await
            .with_context(|| format!("Failed to move {from} over {to}"))?;
        Ok(())
    }

    fn is(error: &anyhow::Error, predicate: impl Fn(&ClusterError) -> bool) -> bool {
        error
            .chain()
            .filter_map(|cause| cause.downcast_ref::<ClusterError>())
            .any(predicate)
    }
}

#[async_trait::async_trait]
impl Cluster for WebHdfsCluster {
    async fn make_directory(&self, path: &ClusterPath) -> Result<bool> {
        debug!(path = %path, "MKDIRS");
        match self.boolean(Method::PUT, self.url(path, "MKDIRS")).await {
            Ok(created) => Ok(created),
            Err(error)
                if Self::is(&error, |cause| {
                    matches!(
                        cause,
                        ClusterError::AlreadyExists(_) | ClusterError::NotADirectory(_)
                    )
                }) =>
            {
                Ok(false)
            }
            Err(error) => Err(error.context(format!("Failed to create directory {path}"))),
        }
    }

    async fn stat(&self, path: &ClusterPath) -> Result<Option<FileStatus>> {
        debug!(path = %path, "GETFILESTATUS");
        match self
            .json::<FileStatusResponse>(Method::GET, self.url(path, "GETFILESTATUS"))
            .await
        {
            Ok(response) => Ok(Some(response.file_status.into())),
            Err(error) if Self::is(&error, |cause| matches!(cause, ClusterError::NotFound(_))) => {
                Ok(None)
            }
            Err(error) => Err(error.context(format!("Failed to stat {path}"))),
        }
    }

    async fn list(&self, path: &ClusterPath) -> Result<Vec<FileStatus>> {
        debug!(path = %path, "LISTSTATUS");
        let statuses = self
            .json::<ListStatusResponse>(Method::GET, self.url(path, "LISTSTATUS"))
            .await
            .with_context(|| format!("Failed to list {path}"))?
            .file_statuses
            .file_status
            .into_iter()
            .map(FileStatus::from)
            .collect::<Vec<_>>();

        // Listing a file answers with the file's own status.
        if let [only] = statuses.as_slice() {
            if only.path_suffix.is_empty() && only.file_type != FileType::Directory {
                return Err(ClusterError::NotADirectory(path.to_string()).into());
            }
        }
        Ok(statuses)
    }

    async fn open_for_read(&self, path: &ClusterPath) -> Result<ByteStream> {
        debug!(path = %path, "OPEN");
        let context = || format!("Failed to open {path}");
        let mut response = self
            .send(self.client.get(self.url(path, "OPEN")))
            .await
            .with_context(context)?;
        if response.status().is_redirection() {
            let location = redirect_target(&response).with_context(context)?;
            response = self
                .send(self.client.get(location))
                .await
                .with_context(context)?;
        }

        let path = path.clone();
        Ok(Box::pin(response.bytes_stream().map_err(move |error| {
            anyhow::Error::from(error).context(format!("Failed to read {path}"))
        })))
    }

    async fn open_for_write(
        &self,
        path: &ClusterPath,
        overwrite: bool,
    ) -> Result<Box<dyn ByteSink>> {
        match self.stat(path).await? {
            Some(status) if status.file_type == FileType::Directory => {
                return Err(ClusterError::NotAFile(path.to_string()).into());
            }
            Some(_) if !overwrite => {
                return Err(ClusterError::AlreadyExists(path.to_string()).into());
            }
            _ => {}
        }

        let sink = WebHdfsSink::create(self.clone(), path.clone(), overwrite)
            .await
            .with_context(|| format!("Failed to create {path}"))?;
        Ok(Box::new(sink))
    }

    async fn rename(&self, from: &ClusterPath, to: &ClusterPath) -> Result<bool> {
        debug!(from = %from, to = %to, "RENAME");
        let mut url = self.url(from, "RENAME");
        url.query_pairs_mut().append_pair("destination", to.as_str());
        self.boolean(Method::PUT, url)
            .await
            .with_context(|| format!("Failed to rename {from} to {to}"))
    }

    async fn delete(&self, path: &ClusterPath, recursive: bool) -> Result<bool> {
        debug!(path = %path, recursive = recursive, "DELETE");
        let mut url = self.url(path, "DELETE");
        url.query_pairs_mut()
            .append_pair("recursive", if recursive { "true" } else { "false" });
        self.boolean(Method::DELETE, url)
            .await
            .with_context(|| format!("Failed to delete {path}"))
    }

    async fn block_locations(&self, path: &ClusterPath) -> Result<Vec<NativeBlockLocation>> {
        debug!(path = %path, "GETFILEBLOCKLOCATIONS");
        let blocks = self
            .json::<BlockLocationsResponse>(Method::GET, self.url(path, "GETFILEBLOCKLOCATIONS"))
            .await
            .with_context(|| format!("Failed to get block locations of {path}"))?
            .block_locations
            .block_location
            .into_iter()
            .map(NativeBlockLocation::from)
            .collect();
        Ok(blocks)
    }
}

fn redirect_target(response: &Response) -> Result<Url> {
    let location = response
        .headers()
        .get(LOCATION)
        .context("Redirect without a Location header")?
        .to_str()
        .context("Redirect Location is not valid text")?;
    response
        .url()
        .join(location)
        .with_context(|| format!("Invalid redirect Location {location}"))
}

fn transport_error(error: reqwest::Error) -> anyhow::Error {
    if error.is_connect() || error.is_timeout() {
        ClusterError::Unavailable(error.to_string()).into()
    } else {
        error.into()
    }
}

async fn remote_error(response: Response) -> anyhow::Error {
    let status = response.status();
    let url = redact(response.url());
    let body = match response.text().await {
        Ok(body) => body,
        Err(error) => return transport_error(error),
    };

    if let Ok(parsed) = serde_json::from_str::<RemoteExceptionResponse>(&body) {
        let exception = parsed.remote_exception;
        return match exception.cluster_error() {
            Some(error) => error.into(),
            None => anyhow!("{}: {}", exception.exception, exception.message),
        };
    }

    match status {
        StatusCode::NOT_FOUND => ClusterError::NotFound(url).into(),
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY | StatusCode::GATEWAY_TIMEOUT => {
            ClusterError::Unavailable(format!("{status} from {url}")).into()
        }
        _ => anyhow!("Unexpected response {status} from {url}: {}", body.trim()),
    }
}

/// The URL without its query, which carries the caller's identity.
fn redact(url: &Url) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.to_string()
}
