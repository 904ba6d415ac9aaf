//! Build a nested route tree, dispatch a few synthetic requests, and print
//! what comes back. Run with `cargo run --example hello`.

use nestmux::middleware;
use nestmux::{Method, Request, Response, Route, Router, StatusCode};
use serde::Serialize;

#[derive(Serialize)]
struct Greeting {
    message: &'static str,
}

async fn hello(_req: Request) -> Response {
    Response::json(StatusCode::Ok, &Greeting { message: "hello from nestmux" })
        .unwrap_or_else(|_| Response::new(StatusCode::InternalServerError))
}

async fn pong(_req: Request) -> Response {
    Response::new(StatusCode::Ok).body("pong")
}

#[tokio::main]
async fn main() -> Result<(), nestmux::RouterError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let root = Router::new("");
    let api = root.add_sub_routes(
        "/api/",
        vec![Route::new("/hello").method(Method::Get).handler_fn(hello)],
        &[middleware::logger()],
    )?;
    api.add_route(Route::new("/ping").method(Method::Get).handler_fn(pong))?;

    let requests = [
        (Method::Get, "/api/hello"),
        (Method::Get, "/api/ping"),
        (Method::Post, "/api/hello"),
        (Method::Get, "/api/nope"),
    ];

    for (method, path) in requests {
        let response = root
            .dispatch(Request::new(method.clone(), path))
            .await;
        println!("{method} {path} -> {}", response.status());
    }

    Ok(())
}
