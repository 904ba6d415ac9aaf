//! Request routing — nested routers, declarative routes, and dispatch.
//!
//! This module provides [`Router`], which maps `(method, path)` keys to
//! handlers through a path-keyed dispatch table. Routers nest: a router is
//! itself a valid handler (via [`Router::to_handler`]), and
//! [`Router::add_sub_routes`] builds a child router under a composed base
//! path, so route trees compose to arbitrary depth.
//!
//! Routes are declared with the [`Route`] builder and consumed exactly once
//! by registration:
//!
//! ```rust
//! use nestmux::{Method, Request, Response, Route, Router, StatusCode};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), nestmux::RouterError> {
//! let api = Router::new("/api");
//! api.add_route(
//!     Route::new("/health")
//!         .method(Method::Get)
//!         .handler_fn(|_req: Request| async { Response::new(StatusCode::Ok).body("ok") }),
//! )?;
//!
//! let response = api.dispatch(Request::new(Method::Get, "/api/health")).await;
//! assert_eq!(response.status(), StatusCode::Ok);
//! # Ok(())
//! # }
//! ```
//!
//! Registration is a configuration phase: build the whole tree first, then
//! hand the root router to the host server and leave it alone. Dispatch only
//! takes shared read access, so serving concurrent requests is free of
//! coordination once configuration is done.

use std::pin::Pin;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;
use tracing::debug;

use crate::http::{Method, Request, Response, StatusCode, media};
use crate::middleware::{Middleware, chain};

mod path;
mod table;

use path::dispatch_key;
use table::{DispatchTable, Resolution, split_key};

/// The boxed future a [`Handler`] returns.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Response> + Send>>;

/// Type-erased, heap-allocated async handler that processes a [`Request`]
/// and returns a [`Response`].
///
/// Handlers are stored behind `Arc<dyn Fn(…)>` so they can be cloned and
/// shared across threads without copying the underlying closure. Anything
/// satisfying this contract is a valid handler — including a nested
/// [`Router`] adapted through [`Router::to_handler`].
pub type Handler = Arc<dyn Fn(Request) -> HandlerFuture + Send + Sync + 'static>;

/// Conversion trait for async handler functions.
///
/// Any `Fn(Request) -> impl Future<Output = Response> + Send` that is also
/// `Send + Sync + 'static` implements this trait automatically via the
/// blanket impl below, so [`Route::handler_fn`] accepts plain `async fn`s
/// and closures without the two-type-parameter where-bound at every call
/// site.
pub trait IntoHandler: Send + Sync + 'static {
    /// Call the handler with the given request, boxing the returned future.
    fn call(&self, request: Request) -> HandlerFuture;
}

impl<T, F> IntoHandler for T
where
    T: Fn(Request) -> F + Send + Sync + 'static,
    F: Future<Output = Response> + Send + 'static,
{
    fn call(&self, request: Request) -> HandlerFuture {
        Box::pin((self)(request))
    }
}

/// Errors surfaced by route registration.
///
/// Dispatch itself never fails — unmatched requests get `404`/`405`
/// responses. Registration, by contrast, reports configuration mistakes
/// instead of silently dropping them.
#[derive(Debug, Error)]
pub enum RouterError {
    /// The route declared neither a handler nor sub-routes, so there is
    /// nothing to register.
    #[error("route {path:?} has no handler and no sub-routes")]
    MissingHandler {
        /// The route's declared path, relative to the router's base path.
        path: String,
    },

    /// Registration produced a dispatch key with an empty path portion.
    #[error("dispatch key {key:?} has an empty path")]
    EmptyPattern {
        /// The offending key.
        key: String,
    },
}

/// A declarative route registration.
///
/// A `Route` describes one registration: an optional method (absent means
/// "any method"), a path relative to the owning router's base path, at most
/// one handler (the function form wins when both are set), an ordered
/// middleware list (first element outermost), and optional sub-routes that
/// are materialized into a child router at registration time.
///
/// Routes are built with consuming builder methods and consumed exactly once
/// by [`Router::add_route`]; they are not retained afterwards.
///
/// # Examples
///
/// ```rust
/// use nestmux::{Method, Request, Response, Route, StatusCode};
///
/// let route = Route::new("/user")
///     .method(Method::Get)
///     .handler_fn(|_req: Request| async { Response::new(StatusCode::Ok) });
/// ```
#[derive(Clone)]
pub struct Route {
    method: Option<Method>,
    path: String,
    handler_fn: Option<Handler>,
    handler: Option<Handler>,
    middleware: Vec<Middleware>,
    sub_routes: Vec<Route>,
}

impl Route {
    /// Creates a route for the given path, matching any method, with no
    /// handler, middleware, or sub-routes.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            method: None,
            path: path.into(),
            handler_fn: None,
            handler: None,
            middleware: Vec::new(),
            sub_routes: Vec::new(),
        }
    }

    /// Restricts the route to one HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets the function-form handler. Takes precedence over
    /// [`handler`](Self::handler) when both are set.
    #[must_use]
    pub fn handler_fn(mut self, handler: impl IntoHandler) -> Self {
        self.handler_fn = Some(Arc::new(move |request| handler.call(request)));
        self
    }

    /// Sets the generic handler — typically a nested router adapted with
    /// [`Router::to_handler`].
    #[must_use]
    pub fn handler(mut self, handler: Handler) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Sets the route's middleware, applied outermost-first in list order.
    #[must_use]
    pub fn middleware(mut self, middleware: Vec<Middleware>) -> Self {
        self.middleware = middleware;
        self
    }

    /// Declares nested routes registered under this route's path. The
    /// route's own middleware is shared with all of them.
    #[must_use]
    pub fn sub_routes(mut self, routes: Vec<Route>) -> Self {
        self.sub_routes = routes;
        self
    }
}

struct RouterInner {
    base_path: String,
    root: RwLock<Option<Handler>>,
    table: RwLock<DispatchTable>,
}

/// An HTTP router with a base path, a dispatch table, and optional root
/// middleware.
///
/// `Router` is cheaply cloneable; clones share the same dispatch table, so a
/// child router registered inside a parent can keep being configured through
/// the handle [`add_sub_routes`](Self::add_sub_routes) returns. All state is
/// built during configuration and only read during dispatch.
#[derive(Clone)]
pub struct Router {
    inner: Arc<RouterInner>,
}

impl Router {
    /// Creates a router with the given base path, an empty dispatch table,
    /// and no root middleware.
    ///
    /// The base path is prepended to every route this router registers;
    /// pass `""` for a root-level router.
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RouterInner {
                base_path: base_path.into(),
                root: RwLock::new(None),
                table: RwLock::new(DispatchTable::new()),
            }),
        }
    }

    /// Returns the base path this router prepends to its routes.
    pub fn base_path(&self) -> &str {
        &self.inner.base_path
    }

    /// Returns the number of patterns registered in this router's own
    /// dispatch table (not counting nested routers' tables).
    pub fn len(&self) -> usize {
        self.read_table().len()
    }

    /// Returns `true` if no patterns have been registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dispatches a request and returns the response.
    ///
    /// This is the single entry point a host server calls. When root
    /// middleware has been installed it runs first, wrapping the dispatch
    /// table lookup; otherwise the lookup runs directly. Unmatched paths
    /// get `404 Not Found`; registered paths with no entry for the request
    /// method get `405 Method Not Allowed` with an `Allow` header.
    pub async fn dispatch(&self, request: Request) -> Response {
        let root = self
            .inner
            .root
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match root {
            Some(handler) => handler(request).await,
            None => self.lookup(request).await,
        }
    }

    /// Installs root middleware wrapping this router's dispatch-table
    /// lookup, and returns the composed handler so it can also be mounted
    /// externally.
    ///
    /// Every subsequent [`dispatch`](Self::dispatch) passes through the
    /// chain regardless of which route matches — including requests that
    /// end up as `404`/`405`. Calling this again replaces the previous
    /// chain.
    pub fn set_root_middleware(&self, middleware: &[Middleware]) -> Handler {
        let router = self.clone();
        let terminal: Handler = Arc::new(move |request: Request| -> HandlerFuture {
            let router = router.clone();
            Box::pin(async move { router.lookup(request).await })
        });
        let wrapped = chain(terminal, middleware);
        *self
            .inner
            .root
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(wrapped.clone());
        wrapped
    }

    /// Registers one route.
    ///
    /// The dispatch key is composed from the route's method, this router's
    /// base path, and the route's path. Sub-routes, if declared, are
    /// materialized into a child router first (sharing the route's
    /// middleware) and the parent key loses its trailing `/` so the group's
    /// own entry sits at the bare path. The function-form handler wins over
    /// the generic one; a route with neither is valid only as a pure group.
    ///
    /// Registering the same key twice replaces the earlier entry.
    ///
    /// # Errors
    ///
    /// - [`RouterError::MissingHandler`] — no handler and no sub-routes.
    /// - [`RouterError::EmptyPattern`] — the composed key has no path left.
    pub fn add_route(&self, route: Route) -> Result<(), RouterError> {
        let Route {
            method,
            path,
            handler_fn,
            handler,
            middleware,
            sub_routes,
        } = route;

        let mut key = dispatch_key(method.as_ref(), &self.inner.base_path, &[&path]);
        let grouped = !sub_routes.is_empty();
        if grouped {
            self.add_sub_routes(&path, sub_routes, &middleware)?;
            if let Some(stripped) = key.strip_suffix('/') {
                key = stripped.to_owned();
            }
        }

        let Some(resolved) = handler_fn.or(handler) else {
            if grouped {
                return Ok(());
            }
            return Err(RouterError::MissingHandler { path });
        };

        let resolved = if middleware.is_empty() {
            resolved
        } else {
            chain(resolved, &middleware)
        };

        let (_, key_path) = split_key(&key);
        if key_path.is_empty() {
            return Err(RouterError::EmptyPattern { key });
        }

        debug!(key = %key, "route registered");
        self.write_table().insert(&key, resolved);
        Ok(())
    }

    /// Registers each route in order.
    ///
    /// `shared` middleware, when given, is prepended to every route's own
    /// middleware list, so it runs outermost relative to what the route
    /// declares.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first registration error.
    pub fn add_routes(&self, routes: Vec<Route>, shared: &[Middleware]) -> Result<(), RouterError> {
        for mut route in routes {
            if !shared.is_empty() {
                let mut combined = shared.to_vec();
                combined.append(&mut route.middleware);
                route.middleware = combined;
            }
            self.add_route(route)?;
        }
        Ok(())
    }

    /// Builds a child router under `path` and registers `routes` into it.
    ///
    /// The child's base path is this router's base path composed with
    /// `path`; the child itself is registered as the subtree handler for
    /// that base path in this router's table. The returned child can keep
    /// being configured — it shares state with the handler already mounted.
    ///
    /// # Errors
    ///
    /// Propagates the first registration error from `routes`.
    pub fn add_sub_routes(
        &self,
        path: &str,
        routes: Vec<Route>,
        shared: &[Middleware],
    ) -> Result<Router, RouterError> {
        let sub_path = dispatch_key(None, &self.inner.base_path, &[path]);
        let child = Router::new(sub_path.clone());
        child.add_routes(routes, shared)?;
        debug!(base = %sub_path, "sub-router mounted");
        self.write_table().insert(&sub_path, child.to_handler());
        Ok(child)
    }

    /// Adapts this router into a [`Handler`] so it can be mounted inside
    /// another router (or handed to anything else expecting a handler).
    pub fn to_handler(&self) -> Handler {
        let router = self.clone();
        Arc::new(move |request: Request| -> HandlerFuture {
            let router = router.clone();
            Box::pin(async move { router.dispatch(request).await })
        })
    }

    // Dispatch-table lookup: the terminal behavior behind root middleware.
    async fn lookup(&self, request: Request) -> Response {
        let resolution = {
            let table = self.read_table();
            table.resolve(request.method(), request.path())
        };
        match resolution {
            Resolution::Matched(handler) => handler(request).await,
            Resolution::MethodNotAllowed { allow } => {
                Response::new(StatusCode::MethodNotAllowed)
                    .header("Allow", allow)
                    .header(media::CONTENT_TYPE, media::TEXT_PLAIN)
                    .body(StatusCode::MethodNotAllowed.canonical_reason())
            }
            Resolution::NotFound => Response::new(StatusCode::NotFound),
        }
    }

    fn read_table(&self) -> RwLockReadGuard<'_, DispatchTable> {
        self.inner
            .table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_table(&self) -> RwLockWriteGuard<'_, DispatchTable> {
        self.inner
            .table
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::middleware;

    async fn ok_handler(_req: Request) -> Response {
        Response::new(StatusCode::Ok)
    }

    fn sub_routes() -> Vec<Route> {
        vec![
            Route::new("/user").method(Method::Get).handler_fn(ok_handler),
            Route::new("/account")
                .method(Method::Get)
                .handler_fn(ok_handler),
        ]
    }

    // The reference tree: /v1 mounts its API group plainly, /v2 mounts the
    // same group through a grouped route with a method-check middleware.
    fn build_routes() -> Router {
        let root = Router::new("");
        let v1 = Router::new("/v1");
        let v2 = Router::new("/v2");

        root.add_routes(
            vec![
                Route::new("/v1/").handler(v1.to_handler()),
                Route::new("/v2/").handler(v2.to_handler()),
            ],
            &[],
        )
        .unwrap();

        v1.add_sub_routes("/api/", sub_routes(), &[]).unwrap();

        v2.add_route(
            Route::new("/api/")
                .handler_fn(ok_handler)
                .middleware(vec![middleware::method_check(Method::Get)])
                .sub_routes(sub_routes()),
        )
        .unwrap();

        root
    }

    fn tag(label: &'static str, log: Arc<Mutex<Vec<&'static str>>>) -> Middleware {
        Arc::new(move |next: Handler| -> Handler {
            let log = Arc::clone(&log);
            Arc::new(move |req: Request| -> HandlerFuture {
                log.lock().unwrap().push(label);
                next(req)
            })
        })
    }

    #[tokio::test]
    async fn nested_route_tree_dispatches_end_to_end() {
        let cases = [
            (Method::Get, "/v1/api/user", StatusCode::Ok),
            (Method::Get, "/v1/api/account", StatusCode::Ok),
            (Method::Post, "/v1/api/user", StatusCode::MethodNotAllowed),
            (Method::Post, "/v1/api/account", StatusCode::MethodNotAllowed),
            (Method::Get, "/v2/api", StatusCode::Ok),
            (Method::Get, "/v2/api/user", StatusCode::Ok),
            (Method::Get, "/v2/api/account", StatusCode::Ok),
            (Method::Post, "/v2/api", StatusCode::MethodNotAllowed),
            (Method::Post, "/v2/api/user", StatusCode::MethodNotAllowed),
            (Method::Post, "/v2/api/account", StatusCode::MethodNotAllowed),
        ];
        for (method, path, want) in cases {
            let router = build_routes();
            let got = router
                .dispatch(Request::new(method.clone(), path))
                .await
                .status();
            assert_eq!(got, want, "{method} {path}");
        }
    }

    #[tokio::test]
    async fn grouped_route_exposes_group_and_children() {
        let v2 = Router::new("/v2");
        v2.add_route(
            Route::new("/api/")
                .handler_fn(ok_handler)
                .sub_routes(sub_routes()),
        )
        .unwrap();

        for path in ["/v2/api", "/v2/api/user", "/v2/api/account"] {
            let res = v2.dispatch(Request::new(Method::Get, path)).await;
            assert_eq!(res.status(), StatusCode::Ok, "{path}");
        }
    }

    #[tokio::test]
    async fn root_middleware_wraps_every_dispatch() {
        let router = Router::new("");
        router
            .add_route(Route::new("/a").method(Method::Get).handler_fn(ok_handler))
            .unwrap();
        router.set_root_middleware(&[middleware::content_type(media::TEXT_HTML)]);

        let hit = router.dispatch(Request::new(Method::Get, "/a")).await;
        assert_eq!(hit.status(), StatusCode::Ok);
        assert_eq!(hit.headers().get(media::CONTENT_TYPE), Some(media::TEXT_HTML));

        // Even unmatched requests pass through the root chain.
        let miss = router.dispatch(Request::new(Method::Get, "/nope")).await;
        assert_eq!(miss.status(), StatusCode::NotFound);
        assert_eq!(miss.headers().get(media::CONTENT_TYPE), Some(media::TEXT_HTML));
    }

    #[tokio::test]
    async fn middleware_order_is_first_outermost() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let router = Router::new("");
        let terminal_log = Arc::clone(&log);
        router
            .add_route(
                Route::new("/ordered")
                    .method(Method::Get)
                    .handler_fn(move |_req: Request| {
                        let log = Arc::clone(&terminal_log);
                        async move {
                            log.lock().unwrap().push("handler");
                            Response::new(StatusCode::Ok)
                        }
                    })
                    .middleware(vec![
                        tag("a", Arc::clone(&log)),
                        tag("b", Arc::clone(&log)),
                    ]),
            )
            .unwrap();

        router.dispatch(Request::new(Method::Get, "/ordered")).await;
        assert_eq!(*log.lock().unwrap(), ["a", "b", "handler"]);
    }

    #[tokio::test]
    async fn shared_middleware_runs_outermost() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let router = Router::new("");
        router
            .add_routes(
                vec![
                    Route::new("/x")
                        .method(Method::Get)
                        .handler_fn(ok_handler)
                        .middleware(vec![tag("own", Arc::clone(&log))]),
                ],
                &[tag("shared", Arc::clone(&log))],
            )
            .unwrap();

        router.dispatch(Request::new(Method::Get, "/x")).await;
        assert_eq!(*log.lock().unwrap(), ["shared", "own"]);
    }

    #[tokio::test]
    async fn same_key_registration_replaces() {
        let router = Router::new("");
        router
            .add_route(Route::new("/dup").method(Method::Get).handler_fn(ok_handler))
            .unwrap();
        router
            .add_route(Route::new("/dup").method(Method::Get).handler_fn(
                |_req: Request| async { Response::new(StatusCode::Accepted) },
            ))
            .unwrap();

        assert_eq!(router.len(), 1);
        let res = router.dispatch(Request::new(Method::Get, "/dup")).await;
        assert_eq!(res.status(), StatusCode::Accepted);
    }

    #[tokio::test]
    async fn handler_fn_takes_precedence_over_handler() {
        let fallback: Handler = Arc::new(|_req: Request| -> HandlerFuture {
            Box::pin(async { Response::new(StatusCode::NoContent) })
        });
        let router = Router::new("");
        router
            .add_route(
                Route::new("/both")
                    .method(Method::Get)
                    .handler_fn(ok_handler)
                    .handler(fallback),
            )
            .unwrap();

        let res = router.dispatch(Request::new(Method::Get, "/both")).await;
        assert_eq!(res.status(), StatusCode::Ok);
    }

    #[tokio::test]
    async fn group_only_route_registers_children() {
        let router = Router::new("/v3");
        router
            .add_route(Route::new("/api/").sub_routes(sub_routes()))
            .unwrap();

        let child = router.dispatch(Request::new(Method::Get, "/v3/api/user")).await;
        assert_eq!(child.status(), StatusCode::Ok);

        // No handler was declared for the group itself.
        let group = router.dispatch(Request::new(Method::Get, "/v3/api")).await;
        assert_eq!(group.status(), StatusCode::NotFound);
    }

    #[tokio::test]
    async fn returned_child_router_accepts_more_routes() {
        let root = Router::new("");
        let child = root.add_sub_routes("/api/", sub_routes(), &[]).unwrap();
        assert_eq!(child.base_path(), "/api/");

        child
            .add_route(Route::new("/late").method(Method::Get).handler_fn(ok_handler))
            .unwrap();

        let res = root.dispatch(Request::new(Method::Get, "/api/late")).await;
        assert_eq!(res.status(), StatusCode::Ok);
    }

    #[tokio::test]
    async fn unmatched_method_gets_405_with_allow() {
        let router = Router::new("");
        router
            .add_route(
                Route::new("/only-get")
                    .method(Method::Get)
                    .handler_fn(ok_handler),
            )
            .unwrap();

        let res = router.dispatch(Request::new(Method::Post, "/only-get")).await;
        assert_eq!(res.status(), StatusCode::MethodNotAllowed);
        assert_eq!(res.headers().get("allow"), Some("GET"));
        assert_eq!(res.body_bytes(), b"Method Not Allowed");
    }

    #[tokio::test]
    async fn unknown_path_gets_404() {
        let router = Router::new("");
        let res = router.dispatch(Request::new(Method::Get, "/missing")).await;
        assert_eq!(res.status(), StatusCode::NotFound);
    }

    #[test]
    fn route_without_handler_or_children_is_an_error() {
        let router = Router::new("");
        let err = router.add_route(Route::new("/nothing")).unwrap_err();
        assert!(matches!(err, RouterError::MissingHandler { .. }));
        assert!(router.is_empty());
    }

    #[test]
    fn empty_pattern_is_an_error() {
        let router = Router::new("");
        let err = router
            .add_route(
                Route::new("/")
                    .handler_fn(ok_handler)
                    .sub_routes(sub_routes()),
            )
            .unwrap_err();
        assert!(matches!(err, RouterError::EmptyPattern { .. }));
    }
}
