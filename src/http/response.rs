//! HTTP response builder.

use super::{Headers, StatusCode, media};

/// An HTTP response produced by a handler.
///
/// Built with consuming builder methods; middleware that receives a response
/// from downstream can decorate it in place with [`add_header`](Self::add_header).
/// Writing the response to the wire is the host server's job.
///
/// # Examples
///
/// ```
/// use nestmux::http::{Response, StatusCode};
///
/// let response = Response::new(StatusCode::Ok)
///     .header("X-Request-Id", "abc-123")
///     .body("hello");
///
/// assert_eq!(response.status(), StatusCode::Ok);
/// assert_eq!(response.body_bytes(), b"hello");
/// ```
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: Headers,
    body: Vec<u8>,
}

impl Response {
    /// Creates a new response with the given status and an empty body.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    /// Creates a JSON response: the value is serialized into the body and
    /// `Content-Type: application/json` is set.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`serde_json::Error`] when serialization fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use nestmux::http::{Response, StatusCode, media};
    ///
    /// let response = Response::json(StatusCode::Ok, &serde_json::json!({"ok": true})).unwrap();
    /// assert_eq!(response.headers().get(media::CONTENT_TYPE), Some(media::APPLICATION_JSON));
    /// ```
    pub fn json<T>(status: StatusCode, value: &T) -> Result<Self, serde_json::Error>
    where
        T: serde::Serialize + ?Sized,
    {
        let body = serde_json::to_vec(value)?;
        Ok(Self::new(status)
            .header(media::CONTENT_TYPE, media::APPLICATION_JSON)
            .body_raw(body))
    }

    /// Appends a response header. Multiple calls with the same name are additive.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Appends a header in place. Intended for middleware that receives a
    /// `Response` from downstream and decorates it without consuming it.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.append(name, value);
    }

    /// Sets the response body from a string.
    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into().into_bytes();
        self
    }

    /// Sets the response body from raw bytes.
    #[must_use]
    pub fn body_raw(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns the status code of this response.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the response headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns the response body bytes.
    pub fn body_bytes(&self) -> &[u8] {
        &self.body
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new(StatusCode::Ok)
    }
}
