use snafu::Snafu;

pub(crate) type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Invalid method: {method}"))]
    InvalidMethod { method: String },
    #[snafu(display("Invalid body type: {kind}"))]
    InvalidBodyType { kind: &'static str },
    #[snafu(display("Stream has already ended"))]
    StreamAlreadyConsumed,
    #[snafu(display("Failed to read body stream"))]
    StreamRead { source: std::io::Error },
    #[snafu(display("Failed to serialize body"))]
    SerializeBody { source: serde_json::Error },
}
