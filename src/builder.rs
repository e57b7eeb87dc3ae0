use crate::{
    Rendered, Request, RequestInfo, RequestInit,
    error::*,
    headers::{HeaderList, HeaderSource},
    method::canonical_method,
};
use http::Method;
use tracing::debug;

/// Knobs for the rendered command line.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Leading program token.
    pub program: String,
    /// Emit the compression flag as `" --compressed"`, which joins into a
    /// double space. Some consumers compare output byte for byte.
    pub exact_spacing: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            program: "curl".to_string(),
            exact_spacing: false,
        }
    }
}

/// Turns requests into curl command lines.
#[derive(Debug, Clone, Default)]
pub struct CommandBuilder {
    options: RenderOptions,
}

impl CommandBuilder {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render `info` as a curl command.
    ///
    /// `init` supplies method, headers and body for a bare url and is ignored
    /// for a [`Request`]. When `init` carries a body, [`Rendered::body`] holds
    /// the body to send in its place, since draining a stream consumes it.
    pub async fn render(
        &self,
        info: impl Into<RequestInfo>,
        init: Option<RequestInit>,
    ) -> Result<Rendered> {
        match info.into() {
            RequestInfo::Url(url) => self.render_init(url, init).await,
            RequestInfo::Uri(uri) => self.render_init(uri.to_string(), init).await,
            RequestInfo::Request(request) => {
                if init.is_some() {
                    debug!(url = %request.url, "ignoring request options for a self-contained request");
                }
                self.render_request(request).await
            }
        }
    }

    async fn render_init(&self, url: String, init: Option<RequestInit>) -> Result<Rendered> {
        debug!(%url, has_init = init.is_some(), "rendering url");
        let Some(RequestInit {
            method,
            headers,
            body,
        }) = init
        else {
            let command = self.build(&url, None, None, None)?;
            return Ok(Rendered {
                command,
                body: None,
            });
        };

        let (text, body) = match body {
            Some(body) => {
                let serialized = body.serialize(true).await?;
                (Some(serialized.text), serialized.retained)
            }
            None => (None, None),
        };
        let command = self.build(&url, method.as_deref(), headers.as_ref(), text.as_deref())?;
        Ok(Rendered { command, body })
    }

    async fn render_request(&self, request: Request) -> Result<Rendered> {
        debug!(url = %request.url, "rendering request");
        let Request {
            url,
            method,
            headers,
            body,
        } = request;
        let text = match body {
            Some(body) => Some(body.serialize(false).await?.text),
            None => None,
        };
        let command = self.build(&url, method.as_deref(), headers.as_ref(), text.as_deref())?;
        Ok(Rendered {
            command,
            body: None,
        })
    }

    /// Assemble the command from already resolved parts.
    pub fn build(
        &self,
        url: &str,
        method: Option<&str>,
        headers: Option<&HeaderSource>,
        body: Option<&str>,
    ) -> Result<String> {
        let method = canonical_method(method.unwrap_or(Method::GET.as_str()))?;
        let headers = headers.map(HeaderSource::normalize).unwrap_or_default();

        let mut tokens = Vec::with_capacity(6 + headers.headers.len());
        tokens.push(self.options.program.clone());
        tokens.push(format!("'{url}'"));
        tokens.push("-X".to_string());
        tokens.push(method.to_string());
        tokens.extend(header_flags(&headers));
        if let Some(body) = body.filter(|b| !b.is_empty()) {
            tokens.push("--data-binary".to_string());
            tokens.push(format!("'{}'", escape_body(body)));
        }
        if headers.encoding_requested {
            let flag = if self.options.exact_spacing {
                " --compressed"
            } else {
                "--compressed"
            };
            tokens.push(flag.to_string());
        }

        let command = tokens.join(" ");
        debug!(%method, headers = headers.headers.len(), "rendered curl command");
        Ok(command)
    }
}

fn header_flags(headers: &HeaderList) -> impl Iterator<Item = String> + '_ {
    headers
        .iter()
        .map(|(name, value)| format!("-H \"{name}: {}\"", escape_header_value(value)))
}

fn escape_header_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '"') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn escape_body(body: &str) -> String {
    body.replace('\'', r"'\''")
}
