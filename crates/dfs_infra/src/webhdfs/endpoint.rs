use anyhow::{bail, Context, Result};
use dfs_domain::ClusterPath;
use url::Url;

const REST_PREFIX: &str = "/webhdfs/v1";

/// Turns a configured endpoint into the REST base URL every call is built
/// on. `webhdfs://` maps to http, `swebhdfs://` to https; plain http(s)
/// endpoints get the REST prefix appended when they lack it.
pub fn rest_base(endpoint: &str) -> Result<Url> {
    let parsed =
        Url::parse(endpoint).with_context(|| format!("Invalid cluster endpoint {endpoint}"))?;

    let scheme = match parsed.scheme() {
        "webhdfs" | "http" => "http",
        "swebhdfs" | "https" => "https",
        "hdfs" => bail!(
            "Native RPC endpoints are not supported, use webhdfs://{} instead",
            parsed.host_str().unwrap_or("host:port")
        ),
        other => bail!("Unsupported cluster endpoint scheme {other}"),
    };

    let host = parsed
        .host_str()
        .with_context(|| format!("Cluster endpoint {endpoint} has no host"))?;
    let authority = match parsed.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };

    let path = parsed.path().trim_end_matches('/');
    let path = if path.ends_with(REST_PREFIX) {
        path.to_string()
    } else {
        format!("{path}{REST_PREFIX}")
    };

    Url::parse(&format!("{scheme}://{authority}{path}"))
        .with_context(|| format!("Invalid cluster endpoint {endpoint}"))
}

/// The URL addressing `path` for `op`, before any operation parameters.
pub fn operation_url(base: &Url, path: &ClusterPath, op: &str, user: &str) -> Url {
    let mut url = base.clone();
    let full = format!("{}{}", base.path().trim_end_matches('/'), path.as_str());
    url.set_path(&full);
    url.query_pairs_mut()
        .append_pair("op", op)
        .append_pair("user.name", user);
    url
}
