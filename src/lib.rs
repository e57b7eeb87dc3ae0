//! Render an in-memory HTTP request into an equivalent curl command.
//!
//! This crate turns the description of an outbound request (a url plus an
//! optional method, headers and body) into a shell command that reproduces
//! the same request when executed. It's particularly useful for:
//!
//! - Reproducing a program's HTTP call outside the program
//! - Sharing a failing request in a bug report
//! - Logging requests in a copy-pasteable form
//!
//! Nothing is sent over the network: rendering is purely textual.
//!
//! # Architecture
//!
//! Rendering happens in three steps:
//!
//! 1. **Shape resolution**: the input is either a bare url ([`RequestInfo::Url`],
//!    [`RequestInfo::Uri`]) paired with optional [`RequestInit`] options, or a
//!    self-contained [`Request`].
//! 2. **Body resolution**: text passes through, structured values are
//!    serialized as JSON, and streamed bodies are drained. A stream handed over
//!    through [`RequestInit`] is teed first so the caller gets a readable body
//!    back in [`Rendered::body`].
//! 3. **Command assembly**: `curl`, the quoted url, `-X METHOD`, one `-H` per
//!    header, `--data-binary` for a non-empty body and `--compressed` when an
//!    `Accept-Encoding` header is present.
//!
//! # Examples
//!
//! ```
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), curl_render::Error> {
//! use curl_render::{RequestInit, to_curl};
//!
//! let curl = to_curl("google.com", None).await?;
//! assert_eq!(curl, "curl 'google.com' -X GET");
//!
//! let init = RequestInit::new()
//!     .method("post")
//!     .header("Content-Type", "application/json")
//!     .body(r#"{"name":"it's me"}"#);
//! let curl = to_curl("https://api.example.com/users", Some(init)).await?;
//! assert_eq!(
//!     curl,
//!     r#"curl 'https://api.example.com/users' -X POST -H "Content-Type: application/json" --data-binary '{"name":"it'\''s me"}'"#
//! );
//! # Ok(())
//! # }
//! ```
//!
//! Streamed bodies come back usable:
//!
//! ```
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), curl_render::Error> {
//! use bytes::Bytes;
//! use curl_render::{Body, RequestInit, render};
//! use futures_util::stream;
//!
//! let body = Body::stream(stream::iter(vec![Ok(Bytes::from_static(b"payload"))]));
//! let init = RequestInit::new().method("PUT").body(body);
//! let mut rendered = render("https://example.com/upload", Some(init)).await?;
//! assert_eq!(
//!     rendered.command,
//!     "curl 'https://example.com/upload' -X PUT --data-binary 'payload'"
//! );
//! let body = rendered.take_body(); // send this one instead
//! assert!(matches!(body, Some(Body::Stream(_))));
//! # Ok(())
//! # }
//! ```

mod body;
mod builder;
pub(crate) mod error;
mod headers;
mod method;
mod tee;

use http::Uri;
use std::fmt;

pub use body::{Body, ByteStream, ReaderBody};
pub use builder::{CommandBuilder, RenderOptions};
pub use error::Error;
pub use headers::{HeaderList, HeaderSource};
pub use method::canonical_method;

/// What to render: a bare url, or a request carrying its own options.
#[derive(Debug)]
pub enum RequestInfo {
    Url(String),
    Uri(Uri),
    Request(Request),
}

/// Options accompanying a bare url.
#[derive(Debug, Default)]
pub struct RequestInit {
    pub method: Option<String>,
    pub headers: Option<HeaderSource>,
    pub body: Option<Body>,
}

/// A self-contained request.
#[derive(Debug)]
pub struct Request {
    pub url: String,
    pub method: Option<String>,
    pub headers: Option<HeaderSource>,
    pub body: Option<Body>,
}

/// A rendered command.
#[derive(Debug)]
pub struct Rendered {
    pub command: String,
    /// The body to use in place of the one passed through [`RequestInit`].
    ///
    /// Text and JSON bodies come back unchanged and a stream comes back as
    /// an unread copy. A [`Body::Reader`] cannot be duplicated: it comes back
    /// already at end-of-stream, so sending it sends nothing.
    pub body: Option<Body>,
}

impl RequestInit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn headers(mut self, headers: impl Into<HeaderSource>) -> Self {
        self.headers = Some(headers.into());
        self
    }

    /// Append one header after any already set.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers = Some(append_header(self.headers.take(), name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }
}

impl Request {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: None,
            headers: None,
            body: None,
        }
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn headers(mut self, headers: impl Into<HeaderSource>) -> Self {
        self.headers = Some(headers.into());
        self
    }

    /// Append one header after any already set.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers = Some(append_header(self.headers.take(), name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }
}

fn append_header(headers: Option<HeaderSource>, name: String, value: String) -> HeaderSource {
    let mut pairs = match headers {
        None => Vec::new(),
        Some(HeaderSource::Pairs(pairs)) => pairs,
        Some(other) => other.normalize().headers,
    };
    pairs.push((name, value));
    HeaderSource::Pairs(pairs)
}

impl Rendered {
    /// Take the body the caller should send instead of the one it handed over.
    pub fn take_body(&mut self) -> Option<Body> {
        self.body.take()
    }
}

impl fmt::Display for Rendered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command)
    }
}

impl From<&str> for RequestInfo {
    fn from(url: &str) -> Self {
        RequestInfo::Url(url.to_owned())
    }
}

impl From<String> for RequestInfo {
    fn from(url: String) -> Self {
        RequestInfo::Url(url)
    }
}

impl From<Uri> for RequestInfo {
    fn from(uri: Uri) -> Self {
        RequestInfo::Uri(uri)
    }
}

impl From<Request> for RequestInfo {
    fn from(request: Request) -> Self {
        RequestInfo::Request(request)
    }
}

impl<B> From<http::Request<B>> for Request
where
    B: Into<Body>,
{
    fn from(req: http::Request<B>) -> Self {
        let (parts, body) = req.into_parts();
        Self {
            url: parts.uri.to_string(),
            method: Some(parts.method.to_string()),
            headers: Some(HeaderSource::Map(parts.headers)),
            body: Some(body.into()),
        }
    }
}

impl<B> From<http::Request<B>> for RequestInfo
where
    B: Into<Body>,
{
    fn from(req: http::Request<B>) -> Self {
        RequestInfo::Request(req.into())
    }
}

/// Render with the default [`CommandBuilder`].
pub async fn render(
    info: impl Into<RequestInfo>,
    init: Option<RequestInit>,
) -> error::Result<Rendered> {
    CommandBuilder::default().render(info, init).await
}

/// Render and keep only the command string.
pub async fn to_curl(
    info: impl Into<RequestInfo>,
    init: Option<RequestInit>,
) -> error::Result<String> {
    Ok(render(info, init).await?.command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use http::HeaderValue;

    #[tokio::test]
    async fn uri_should_render_with_path() -> Result<()> {
        let uri: Uri = "https://google.com".parse()?;
        assert_eq!(to_curl(uri, None).await?, "curl 'https://google.com/' -X GET");
        Ok(())
    }

    #[tokio::test]
    async fn http_request_should_render() -> Result<()> {
        let req = http::Request::builder()
            .method("PATCH")
            .uri("https://api.github.com/user/email/visibility")
            .header("accept", "application/vnd.github+json")
            .header("accept-encoding", "gzip")
            .body(r#"{"visibility":"private"}"#)?;
        assert_eq!(
            to_curl(req, None).await?,
            r#"curl 'https://api.github.com/user/email/visibility' -X PATCH -H "accept: application/vnd.github+json" -H "accept-encoding: gzip" --data-binary '{"visibility":"private"}' --compressed"#
        );
        Ok(())
    }

    #[test]
    fn header_should_append_to_existing_source() {
        let mut map = http::HeaderMap::new();
        map.insert("x-a", HeaderValue::from_static("1"));
        let init = RequestInit::new().headers(map).header("X-B", "2");
        let Some(HeaderSource::Pairs(pairs)) = init.headers else {
            panic!("expected pairs");
        };
        assert_eq!(
            pairs,
            vec![
                ("x-a".to_string(), "1".to_string()),
                ("X-B".to_string(), "2".to_string())
            ]
        );
    }

    #[test]
    fn rendered_should_display_command() {
        let rendered = Rendered {
            command: "curl 'u' -X GET".to_string(),
            body: None,
        };
        assert_eq!(rendered.to_string(), "curl 'u' -X GET");
    }
}
