use crate::{error::*, tee::tee};
use bytes::{Bytes, BytesMut};
use futures_util::{Stream, StreamExt};
use serde::Serialize;
use serde_json::Value;
use snafu::{ResultExt, ensure};
use std::{
    fmt, io,
    pin::Pin,
    task::{Context, Poll, ready},
};
use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};
use tracing::trace;

/// A one-shot stream of body chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send + Sync>>;

/// A request body.
pub enum Body {
    Text(String),
    /// A structured value, serialized as compact JSON when rendered.
    Json(Value),
    /// A chunked stream. Rendering tees it when the caller keeps the body.
    Stream(ByteStream),
    /// A reader that can be drained exactly once.
    Reader(ReaderBody),
}

/// An [`AsyncRead`] body that remembers whether it has reached end-of-stream.
pub struct ReaderBody {
    inner: Pin<Box<dyn AsyncRead + Send>>,
    ended: bool,
}

impl ReaderBody {
    pub fn new(reader: impl AsyncRead + Send + 'static) -> Self {
        Self {
            inner: Box::pin(reader),
            ended: false,
        }
    }

    /// True once a read has returned end-of-stream.
    pub fn is_ended(&self) -> bool {
        self.ended
    }
}

impl AsyncRead for ReaderBody {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let wanted = buf.remaining();
        let before = buf.filled().len();
        ready!(this.inner.as_mut().poll_read(cx, buf))?;
        if wanted > 0 && buf.filled().len() == before {
            this.ended = true;
        }
        Poll::Ready(Ok(()))
    }
}

/// Anything that can be drained into a contiguous buffer.
pub(crate) trait ByteSource {
    async fn drain(&mut self) -> Result<Bytes>;
}

async fn drain_stream<S>(stream: &mut S) -> Result<Bytes>
where
    S: Stream<Item = io::Result<Bytes>> + Unpin,
{
    let mut buf = BytesMut::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.context(StreamReadSnafu)?;
        trace!(len = chunk.len(), "drained body chunk");
        buf.extend_from_slice(&chunk);
    }
    Ok(buf.freeze())
}

impl ByteSource for ByteStream {
    async fn drain(&mut self) -> Result<Bytes> {
        drain_stream(self).await
    }
}

impl ByteSource for ReaderBody {
    async fn drain(&mut self) -> Result<Bytes> {
        ensure!(!self.ended, StreamAlreadyConsumedSnafu);
        let mut buf = Vec::new();
        self.read_to_end(&mut buf).await.context(StreamReadSnafu)?;
        trace!(len = buf.len(), "drained body reader");
        Ok(buf.into())
    }
}

/// A body turned into text, plus whatever the caller should keep using.
pub(crate) struct Serialized {
    pub text: String,
    pub retained: Option<Body>,
}

// Invalid sequences become U+FFFD. Decoding once after accumulation keeps
// multi-byte sequences split across chunks intact.
fn decode(bytes: Bytes) -> String {
    match String::from_utf8(bytes.into()) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

impl Body {
    pub fn text(s: impl Into<String>) -> Self {
        Body::Text(s.into())
    }

    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(Body::Json(
            serde_json::to_value(value).context(SerializeBodySnafu)?,
        ))
    }

    pub fn stream<S>(stream: S) -> Self
    where
        S: Stream<Item = io::Result<Bytes>> + Send + Sync + 'static,
    {
        Body::Stream(Box::pin(stream))
    }

    pub fn reader(reader: impl AsyncRead + Send + 'static) -> Self {
        Body::Reader(ReaderBody::new(reader))
    }

    /// Turn the body into the text to embed in the command.
    ///
    /// With `retain` set the caller still owns a usable body afterwards: a
    /// stream is teed and the undrained branch returned. Readers are never
    /// duplicated and come back in their ended state.
    pub(crate) async fn serialize(self, retain: bool) -> Result<Serialized> {
        match self {
            Body::Text(text) => {
                let retained = retain.then(|| Body::Text(text.clone()));
                Ok(Serialized { text, retained })
            }
            Body::Json(value) => {
                let text = json_text(&value)?;
                let retained = retain.then_some(Body::Json(value));
                Ok(Serialized { text, retained })
            }
            Body::Stream(stream) if retain => {
                let (mut drained, kept) = tee(stream);
                let text = decode(drained.drain().await?);
                Ok(Serialized {
                    text,
                    retained: Some(Body::Stream(kept)),
                })
            }
            Body::Stream(mut stream) => {
                let text = decode(stream.drain().await?);
                Ok(Serialized {
                    text,
                    retained: None,
                })
            }
            Body::Reader(mut reader) => {
                let text = decode(reader.drain().await?);
                let retained = retain.then_some(Body::Reader(reader));
                Ok(Serialized { text, retained })
            }
        }
    }
}

fn json_text(value: &Value) -> Result<String> {
    match value {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s.clone()),
        Value::Bool(_) => InvalidBodyTypeSnafu { kind: "boolean" }.fail(),
        Value::Number(_) => InvalidBodyTypeSnafu { kind: "number" }.fail(),
        Value::Array(_) | Value::Object(_) => {
            serde_json::to_string(value).context(SerializeBodySnafu)
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Body::Json(value) => f.debug_tuple("Json").field(value).finish(),
            Body::Stream(_) => f.write_str("Stream(..)"),
            Body::Reader(reader) => f.debug_tuple("Reader").field(reader).finish(),
        }
    }
}

impl fmt::Debug for ReaderBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderBody")
            .field("ended", &self.ended)
            .finish_non_exhaustive()
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Body::Text(s)
    }
}

impl From<&str> for Body {
    fn from(s: &str) -> Self {
        Body::Text(s.to_owned())
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Body::Json(value)
    }
}

impl From<ByteStream> for Body {
    fn from(stream: ByteStream) -> Self {
        Body::Stream(stream)
    }
}

impl From<ReaderBody> for Body {
    fn from(reader: ReaderBody) -> Self {
        Body::Reader(reader)
    }
}
