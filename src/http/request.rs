//! HTTP request values handed to the routing layer by a host server.

use bytes::Bytes;

use super::{Headers, Method};

/// An HTTP request as seen by routers, middleware, and handlers.
///
/// `Request` carries only what dispatch and handlers need: the method, the
/// already-decoded path, headers, and the body bytes. Constructing one from
/// wire data is the host server's job; tests and adapters build them with the
/// consuming builder methods.
///
/// # Examples
///
/// ```
/// use nestmux::http::{Method, Request};
///
/// let request = Request::new(Method::Post, "/v1/users")
///     .header("Authorization", "Bearer token")
///     .body(r#"{"name":"ada"}"#);
///
/// assert_eq!(request.method(), &Method::Post);
/// assert_eq!(request.path(), "/v1/users");
/// assert_eq!(request.headers().get("authorization"), Some("Bearer token"));
/// ```
#[derive(Debug)]
pub struct Request {
    method: Method,
    path: String,
    headers: Headers,
    body: Bytes,
}

impl Request {
    /// Creates a request with the given method and path, no headers, and an
    /// empty body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Headers::new(),
            body: Bytes::new(),
        }
    }

    /// Appends a request header. Multiple calls with the same name are additive.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns the HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request path (without any query string).
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the request headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns the request body bytes.
    pub fn body_bytes(&self) -> &Bytes {
        &self.body
    }

    /// Deserializes the request body as JSON.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`serde_json::Error`] when the body is not valid
    /// JSON for `T`.
    pub fn json<T>(&self) -> Result<T, serde_json::Error>
    where
        T: serde::de::DeserializeOwned,
    {
        serde_json::from_slice(&self.body)
    }
}
