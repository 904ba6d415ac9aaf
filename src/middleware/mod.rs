//! Middleware — composable handler wrappers.
//!
//! A middleware is a pure transformation from one [`Handler`] to another: it
//! receives the inner handler at composition time and returns a new handler
//! that may run logic before invoking the inner one, after it, or both — or
//! skip the inner handler entirely to short-circuit a request. Configuration
//! (an expected method, a header value) is closed over at construction time;
//! nothing is shared across requests.
//!
//! [`chain`] composes an ordered list of middleware around a terminal
//! handler, first element outermost. The module also ships three reference
//! middlewares: [`method_check`], [`content_type`] (with the
//! [`content_type_json`] shorthand), and [`logger`].

use std::sync::Arc;

use tokio::time::Instant;
use tracing::info;

use crate::http::{Method, Request, Response, StatusCode, media};
use crate::router::{Handler, HandlerFuture};

/// A type-erased, reference-counted middleware: a function from [`Handler`]
/// to [`Handler`].
///
/// The [`Arc`] wrapper makes middleware cheap to clone, so the same value
/// can be attached to many routes and shared between a group and its
/// sub-routes.
///
/// Construct one with [`from_fn`] or by wrapping a closure directly:
///
/// ```rust
/// use std::sync::Arc;
/// use nestmux::middleware::Middleware;
/// use nestmux::router::Handler;
///
/// let passthrough: Middleware = Arc::new(|next: Handler| -> Handler { next });
/// ```
pub type Middleware = Arc<dyn Fn(Handler) -> Handler + Send + Sync + 'static>;

/// Wraps a `Fn(Handler) -> Handler` closure into a [`Middleware`].
pub fn from_fn<F>(f: F) -> Middleware
where
    F: Fn(Handler) -> Handler + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Composes `middleware` around `terminal`, returning the outermost handler.
///
/// Middleware is applied last-to-first, so the first element of the list is
/// the outermost wrapper: it observes the request first and the response
/// last. An empty list returns `terminal` unchanged.
pub fn chain(terminal: Handler, middleware: &[Middleware]) -> Handler {
    let mut handler = terminal;
    for mw in middleware.iter().rev() {
        handler = mw(handler);
    }
    handler
}

/// Middleware that rejects requests whose method is not `expected`.
///
/// On a mismatch it responds `405 Method Not Allowed` with the canonical
/// reason phrase as a plain-text body, without invoking the inner handler.
/// Matching requests pass through untouched.
pub fn method_check(expected: Method) -> Middleware {
    Arc::new(move |next: Handler| -> Handler {
        let expected = expected.clone();
        Arc::new(move |req: Request| -> HandlerFuture {
            if req.method() != &expected {
                Box::pin(async {
                    let status = StatusCode::MethodNotAllowed;
                    Response::new(status)
                        .header(media::CONTENT_TYPE, media::TEXT_PLAIN)
                        .body(status.canonical_reason())
                })
            } else {
                next(req)
            }
        })
    })
}

/// Middleware that adds `Content-Type: value` to the inner handler's
/// response.
///
/// The inner handler runs normally; the header is appended to whatever it
/// returns, including `404`/`405` fallbacks when used as root middleware.
pub fn content_type(value: impl Into<String>) -> Middleware {
    let value = value.into();
    Arc::new(move |next: Handler| -> Handler {
        let value = value.clone();
        Arc::new(move |req: Request| -> HandlerFuture {
            let next = Arc::clone(&next);
            let value = value.clone();
            Box::pin(async move {
                let mut response = next(req).await;
                response.add_header(media::CONTENT_TYPE, value);
                response
            })
        })
    })
}

/// Shorthand for [`content_type`] with `application/json`.
pub fn content_type_json() -> Middleware {
    content_type(media::APPLICATION_JSON)
}

/// Middleware that logs each request's method, path, status, and duration.
///
/// Emits a single `tracing::info!` line after the inner handler completes;
/// never short-circuits.
pub fn logger() -> Middleware {
    Arc::new(|next: Handler| -> Handler {
        Arc::new(move |req: Request| -> HandlerFuture {
            let next = Arc::clone(&next);
            Box::pin(async move {
                let start = Instant::now();
                let method = req.method().clone();
                let path = req.path().to_owned();

                let response = next(req).await;

                info!(
                    method = %method,
                    path = %path,
                    status = response.status().as_u16(),
                    elapsed = ?start.elapsed(),
                    "request handled"
                );
                response
            })
        })
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;

    fn terminal(status: StatusCode) -> Handler {
        Arc::new(move |_req: Request| -> HandlerFuture {
            Box::pin(async move { Response::new(status) })
        })
    }

    fn tag(label: &'static str, log: Arc<Mutex<Vec<&'static str>>>) -> Middleware {
        from_fn(move |next: Handler| -> Handler {
            let log = Arc::clone(&log);
            Arc::new(move |req: Request| -> HandlerFuture {
                log.lock().unwrap().push(label);
                next(req)
            })
        })
    }

    #[tokio::test]
    async fn empty_chain_is_the_terminal_handler() {
        let handler = chain(terminal(StatusCode::Accepted), &[]);
        let res = handler(Request::new(Method::Get, "/")).await;
        assert_eq!(res.status(), StatusCode::Accepted);
    }

    #[tokio::test]
    async fn chain_applies_first_element_outermost() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let handler = chain(
            terminal(StatusCode::Ok),
            &[tag("a", Arc::clone(&log)), tag("b", Arc::clone(&log))],
        );
        handler(Request::new(Method::Get, "/")).await;
        assert_eq!(*log.lock().unwrap(), ["a", "b"]);
    }

    #[tokio::test]
    async fn method_check_passes_matching_method() {
        let handler = chain(terminal(StatusCode::Ok), &[method_check(Method::Get)]);
        let res = handler(Request::new(Method::Get, "/")).await;
        assert_eq!(res.status(), StatusCode::Ok);
    }

    #[tokio::test]
    async fn method_check_rejects_without_calling_inner() {
        let called = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&called);
        let inner: Handler = Arc::new(move |_req: Request| -> HandlerFuture {
            let flag = Arc::clone(&flag);
            Box::pin(async move {
                flag.store(true, Ordering::SeqCst);
                Response::new(StatusCode::Ok)
            })
        });

        let handler = chain(inner, &[method_check(Method::Get)]);
        let res = handler(Request::new(Method::Post, "/")).await;

        assert_eq!(res.status(), StatusCode::MethodNotAllowed);
        assert_eq!(res.body_bytes(), b"Method Not Allowed");
        assert_eq!(
            res.headers().get(media::CONTENT_TYPE),
            Some(media::TEXT_PLAIN)
        );
        assert!(!called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn content_type_decorates_inner_response() {
        let handler = chain(terminal(StatusCode::Ok), &[content_type(media::TEXT_CSS)]);
        let res = handler(Request::new(Method::Get, "/style")).await;
        assert_eq!(res.status(), StatusCode::Ok);
        assert_eq!(res.headers().get("content-type"), Some(media::TEXT_CSS));
    }

    #[tokio::test]
    async fn content_type_json_shorthand() {
        let handler = chain(terminal(StatusCode::Ok), &[content_type_json()]);
        let res = handler(Request::new(Method::Get, "/")).await;
        assert_eq!(
            res.headers().get(media::CONTENT_TYPE),
            Some(media::APPLICATION_JSON)
        );
    }

    #[tokio::test]
    async fn logger_passes_response_through() {
        let handler = chain(terminal(StatusCode::Created), &[logger()]);
        let res = handler(Request::new(Method::Post, "/things")).await;
        assert_eq!(res.status(), StatusCode::Created);
    }
}
