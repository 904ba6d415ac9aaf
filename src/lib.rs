//! # nestmux
//!
//! A nested HTTP router with composable middleware chains.
//!
//! nestmux is a routing layer, not a server: it maps `(method, path)` keys
//! to async handlers, composes base paths across nested route groups, and
//! wraps handlers in ordered middleware. A host HTTP server owns the
//! transport and calls [`Router::dispatch`] with each decoded request.
//!
//! ## Quick Start
//!
//! ```rust
//! use nestmux::{Method, Request, Response, Route, Router, StatusCode};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), nestmux::RouterError> {
//!     let root = Router::new("");
//!     root.add_sub_routes(
//!         "/api/",
//!         vec![
//!             Route::new("/ping")
//!                 .method(Method::Get)
//!                 .handler_fn(|_req: Request| async {
//!                     Response::new(StatusCode::Ok).body("pong")
//!                 }),
//!         ],
//!         &[],
//!     )?;
//!
//!     let response = root.dispatch(Request::new(Method::Get, "/api/ping")).await;
//!     assert_eq!(response.status(), StatusCode::Ok);
//!     Ok(())
//! }
//! ```
//!
//! Route groups nest to arbitrary depth — a [`Router`] is itself a valid
//! handler — and middleware attaches per route, per group, or around a whole
//! router via [`Router::set_root_middleware`].

pub mod http;
pub mod middleware;
pub mod router;

// ── Convenience re-exports ────────────────────────────────────────────────────
pub use http::{Headers, Method, Request, Response, StatusCode};
pub use middleware::Middleware;
pub use router::{Handler, Route, Router, RouterError};
