// src/server/routes.rs

use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::Utc;
use log::info;
use serde::Deserialize;
use tokio::sync::oneshot;
use warp::http::StatusCode;
use warp::Filter;

use crate::server::dashboard;
use crate::server::guard::{LockoutGuard, TIMESTAMP_FORMAT};

pub type SharedGuard = Arc<Mutex<LockoutGuard>>;

/// Query parameters of the attempt-recording endpoint. Both are optional;
/// missing values are treated as empty strings rather than rejected.
#[derive(Debug, Deserialize)]
struct AttemptQuery {
    status: Option<String>,
    code: Option<String>,
}

pub async fn run_server(
    port: u16,
    guard: SharedGuard,
    shutdown_rx: oneshot::Receiver<()>,
) -> Result<()> {
    let addr = ([0, 0, 0, 0], port);
    info!("Listening on http://0.0.0.0:{port}");

    warp::serve(routes(guard))
        .bind_with_graceful_shutdown(addr, async move {
            let _ = shutdown_rx.await;
            info!("Shutdown signal received, stopping server");
        })
        .1
        .await;

    Ok(())
}

pub(crate) fn routes(
    guard: SharedGuard,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let guard_filter = warp::any().map(move || guard.clone());

    // Attempt recording: GET /?status=attempt&code=4242
    let attempt = warp::path::end()
        .and(warp::get())
        .and(warp::query::<AttemptQuery>())
        .and(guard_filter.clone())
        .map(handle_attempt);

    let dashboard_page = warp::path!("dashboard")
        .and(warp::get())
        .and(guard_filter.clone())
        .map(|guard: SharedGuard| {
            let log = guard.lock().unwrap().history();
            warp::reply::html(dashboard::render(&log))
        });

    let api_log = warp::path!("api" / "log")
        .and(warp::get())
        .and(guard_filter)
        .map(|guard: SharedGuard| warp::reply::json(&guard.lock().unwrap().history()));

    let health = warp::path!("health").map(|| warp::reply::with_status("ok", StatusCode::OK));

    attempt
        .or(dashboard_page)
        .or(api_log)
        .or(health)
        .with(warp::log("lockdash"))
}

fn handle_attempt(query: AttemptQuery, guard: SharedGuard) -> impl warp::Reply {
    let status = query.status.unwrap_or_default();
    let code = query.code.unwrap_or_default();
    let now = Utc::now();

    info!("[{}] Status: {status}, Code: {code}", now.format(TIMESTAMP_FORMAT));

    let verdict = guard.lock().unwrap().evaluate(&code, &status, now);

    if verdict.denied {
        warp::reply::with_status(
            format!("Access denied: {}", verdict.note),
            StatusCode::FORBIDDEN,
        )
    } else {
        warp::reply::with_status(
            format!(
                "Received: Status={status}, Code={code} at {}. {}",
                now.format(TIMESTAMP_FORMAT),
                verdict.note
            ),
            StatusCode::OK,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn shared_guard() -> SharedGuard {
        Arc::new(Mutex::new(LockoutGuard::new(&Config::default())))
    }

    #[tokio::test]
    async fn attempt_reports_received() {
        let routes = routes(shared_guard());

        let res = warp::test::request()
            .path("/?status=attempt&code=4242")
            .reply(&routes)
            .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body = std::str::from_utf8(res.body()).unwrap();
        assert!(body.starts_with("Received: Status=attempt, Code=4242 at "));
    }

    #[tokio::test]
    async fn lockout_then_denial() {
        let guard = shared_guard();
        let routes = routes(guard);

        for _ in 0..3 {
            warp::test::request()
                .path("/?status=attempt&code=4242")
                .reply(&routes)
                .await;
        }

        let res = warp::test::request()
            .path("/?status=attempt&code=4242")
            .reply(&routes)
            .await;

        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        let body = std::str::from_utf8(res.body()).unwrap();
        assert!(body.starts_with("Access denied: LOCKED OUT for "));
    }

    #[tokio::test]
    async fn missing_params_are_tolerated() {
        let routes = routes(shared_guard());

        let res = warp::test::request().path("/").reply(&routes).await;

        assert_eq!(res.status(), StatusCode::OK);
        let body = std::str::from_utf8(res.body()).unwrap();
        assert!(body.starts_with("Received: Status=, Code= at "));
    }

    #[tokio::test]
    async fn dashboard_lists_logged_attempts() {
        let routes = routes(shared_guard());

        warp::test::request()
            .path("/?status=attempt&code=0000")
            .reply(&routes)
            .await;

        let res = warp::test::request().path("/dashboard").reply(&routes).await;

        assert_eq!(res.status(), StatusCode::OK);
        let body = std::str::from_utf8(res.body()).unwrap();
        assert!(body.contains("Smart Lock Attempt Log"));
        assert!(body.contains("0000"));
        assert!(body.contains("Suspicious pattern detected: 0000"));
    }

    #[tokio::test]
    async fn api_log_matches_history() {
        let guard = shared_guard();
        let routes = routes(guard.clone());

        for _ in 0..2 {
            warp::test::request()
                .path("/?status=attempt&code=4242")
                .reply(&routes)
                .await;
        }

        let res = warp::test::request().path("/api/log").reply(&routes).await;
        assert_eq!(res.status(), StatusCode::OK);

        let entries: Vec<serde_json::Value> = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(entries.len(), guard.lock().unwrap().history().len());
        assert_eq!(entries[0]["code"], "4242");
    }

    #[tokio::test]
    async fn health_is_ok() {
        let res = warp::test::request()
            .path("/health")
            .reply(&routes(shared_guard()))
            .await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(std::str::from_utf8(res.body()).unwrap(), "ok");
    }
}
