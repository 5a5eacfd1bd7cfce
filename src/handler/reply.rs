use std::fmt;

use serde::Serialize;

use crate::http::response::ChunkStream;

/// A value that can be written as a JSON body.
///
/// Serialization is deferred until the reply is encoded, so a value that
/// cannot be represented as JSON fails inside the dispatcher, not the handler.
pub trait JsonBody: Send {
    fn to_json(&self) -> serde_json::Result<Vec<u8>>;
}

impl<T> JsonBody for T
where
    T: Serialize + Send,
{
    fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

/// What a verb method hands back.
pub enum Reply {
    Text(String),
    Json(Box<dyn JsonBody>),
    Stream(ChunkStream),
    Empty,
}

impl Reply {
    pub fn json<T>(value: T) -> Self
    where
        T: Serialize + Send + 'static,
    {
        Reply::Json(Box::new(value))
    }
}

impl From<String> for Reply {
    fn from(text: String) -> Self {
        Reply::Text(text)
    }
}

impl From<&str> for Reply {
    fn from(text: &str) -> Self {
        Reply::Text(text.to_string())
    }
}

impl From<serde_json::Value> for Reply {
    fn from(value: serde_json::Value) -> Self {
        Reply::json(value)
    }
}

impl From<ChunkStream> for Reply {
    fn from(stream: ChunkStream) -> Self {
        Reply::Stream(stream)
    }
}

impl fmt::Debug for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Reply::Json(_) => f.write_str("Json(..)"),
            Reply::Stream(stream) => f.debug_tuple("Stream").field(stream).finish(),
            Reply::Empty => f.write_str("Empty"),
        }
    }
}
