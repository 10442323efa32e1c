use std::time::Duration;

use reqwest::Method;
use serde_json::Value;

/// A logical request against the backend, independent of the transport.
///
/// Descriptors are plain owned data so the pipeline can rebuild the wire
/// request when it retransmits after a token refresh; multipart parts are
/// therefore buffered rather than streamed.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub path: String,
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub params: Vec<(String, String)>,
    pub body: Body,
    pub timeout: Option<Duration>,
}

/// Request payload variants supported by the backend surface.
#[derive(Debug, Clone)]
pub enum Body {
    Empty,
    Json(Value),
    Multipart(Vec<PartData>),
}

/// One field of a multipart form, either text or a named file.
#[derive(Debug, Clone)]
pub struct PartData {
    pub name: String,
    pub value: PartValue,
}

#[derive(Debug, Clone)]
pub enum PartValue {
    Text(String),
    File {
        data: Vec<u8>,
        file_name: String,
        mime: String,
    },
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            headers: vec![],
            params: vec![],
            body: Body::Empty,
            timeout: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Body::Json(body);
        self
    }

    pub fn multipart<I>(mut self, parts: I) -> Self
    where
        I: IntoIterator<Item = PartData>,
    {
        self.body = Body::Multipart(parts.into_iter().collect());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.headers
            .iter()
            .any(|(key, _)| key.eq_ignore_ascii_case(name))
    }

    pub fn is_multipart(&self) -> bool {
        matches!(self.body, Body::Multipart(_))
    }
}

impl PartData {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: PartValue::Text(value.into()),
        }
    }

    pub fn file(
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            value: PartValue::File {
                data,
                file_name: file_name.into(),
                mime: mime.into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_accumulates_fields() {
        let descriptor = RequestDescriptor::post("/api/text-translate/")
            .json(json!({ "text": "hello" }))
            .header("X-Request-Id", "1")
            .query("lang", "fr")
            .timeout(Duration::from_secs(30));
        assert_eq!(descriptor.method, Method::POST);
        assert!(descriptor.has_header("x-request-id"));
        assert_eq!(descriptor.params, vec![("lang".to_owned(), "fr".to_owned())]);
        assert_eq!(descriptor.timeout, Some(Duration::from_secs(30)));
        assert!(!descriptor.is_multipart());
    }

    #[test]
    fn multipart_body_is_detected() {
        let descriptor = RequestDescriptor::post("/api/speech-recognition/").multipart([
            PartData::text("language", "en"),
            PartData::file("audio_data", "recording.wav", "audio/wav", vec![0, 1]),
        ]);
        assert!(descriptor.is_multipart());
    }
}
