use bytes::Bytes;
use http_body_util::{BodyExt as _, Full};
use hyper::Request;
use hyper::body::Incoming;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;

use crate::bridge::{BoxFuture, Fetch, FetchError, FetchResponse, FetchResult};

/// Blocking-from-the-script's-point-of-view HTTP GET, backed by hyper.
///
/// Connection pooling, retries, and timeouts are the transport's own
/// business; this layer only issues the request and reads the body.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client<HttpConnector, Full<Bytes>>,
}

impl Default for HttpClient {
    fn default() -> Self {
        let mut connector = HttpConnector::new();
        connector.enforce_http(false);

        let inner = Client::builder(TokioExecutor::new()).build(connector);

        Self { inner }
    }
}

impl HttpClient {
    pub async fn get(&self, url: &str) -> FetchResult {
        let parsed = url::Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;
        if parsed.scheme() != "http" {
            return Err(FetchError::OnlyHttpSupported(url.to_string()));
        }

        let uri: hyper::Uri = url
            .parse()
            .map_err(|_| FetchError::InvalidUrl(url.to_string()))?;

        let req: Request<Full<Bytes>> = Request::builder()
            .method(http::Method::GET)
            .uri(uri)
            .body(Full::new(Bytes::new()))?;

        let res: hyper::Response<Incoming> = self.inner.request(req).await?;

        let (parts, body) = res.into_parts();
        let body = body.collect().await?.to_bytes();

        Ok(FetchResponse {
            status: parts.status.as_u16(),
            body,
        })
    }
}

impl Fetch for HttpClient {
    fn get(&self, url: &str) -> BoxFuture<FetchResult> {
        let client = self.clone();
        let url = url.to_string();
        Box::pin(async move { client.get(&url).await })
    }
}
