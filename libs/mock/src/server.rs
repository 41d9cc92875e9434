//! Ephemeral mock endpoint backed by an interaction registry snapshot.
//!
//! The listener binds `127.0.0.1:0` so every session gets a fresh port. The
//! registry snapshot is read-only while serving, so concurrent requests from
//! the client under test need no locking on the matching path; only the hit
//! and stray-request logs are behind mutexes.

use crate::registry::InteractionRegistry;
use contract_core::{ContractError, Interaction, RequestSnapshot};
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Request, Response, Server, StatusCode};
use serde_json::{Value, json};
use std::collections::{BTreeMap, HashSet};
use std::convert::Infallible;
use std::net::{SocketAddr, TcpListener};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Shared state between the server task and the owning session.
#[derive(Debug)]
struct ServerState {
    registry: InteractionRegistry,
    hits: Mutex<HashSet<usize>>,
    strays: Mutex<Vec<(String, String)>>,
}

/// A running mock endpoint.
///
/// The listener is torn down on every exit path: [`MockServer::finish`]
/// shuts it down gracefully, and dropping the server (test panic included)
/// signals shutdown and aborts the serve task.
#[derive(Debug)]
pub struct MockServer {
    addr: SocketAddr,
    state: Arc<ServerState>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl MockServer {
    /// Bind an ephemeral local port and start serving the registry snapshot.
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub fn start(registry: InteractionRegistry) -> Result<Self, ContractError> {
        let listener = TcpListener::bind(("127.0.0.1", 0))?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;

        let state = Arc::new(ServerState {
            registry,
            hits: Mutex::new(HashSet::new()),
            strays: Mutex::new(Vec::new()),
        });

        let service_state = Arc::clone(&state);
        let make_service = make_service_fn(move |_| {
            let state = Arc::clone(&service_state);
            async move {
                Ok::<_, Infallible>(service_fn(move |request| {
                    let state = Arc::clone(&state);
                    async move { Ok::<_, Infallible>(handle_request(&state, request).await) }
                }))
            }
        });

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = Server::from_tcp(listener)
            .map_err(|e| ContractError::MockServer(e.to_string()))?
            .serve(make_service)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            });

        let handle = tokio::spawn(async move {
            if let Err(e) = server.await {
                warn!(error = %e, "mock server terminated with error");
            }
        });

        debug!(%addr, "mock server listening");
        Ok(Self {
            addr,
            state,
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Base URL of the endpoint, e.g. `http://127.0.0.1:49152`.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Local address the endpoint is bound to.
    #[must_use]
    pub fn address(&self) -> SocketAddr {
        self.addr
    }

    /// Shut the listener down and audit the session.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::UnregisteredInteraction`] if any request
    /// arrived that matched nothing, or
    /// [`ContractError::UnexercisedInteraction`] if a declared interaction
    /// was never invoked. On success, returns the exercised interactions in
    /// registration order, ready to be promoted into a contract artifact.
    pub async fn finish(mut self) -> Result<Vec<Interaction>, ContractError> {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }

        if let Some((method, path)) = self
            .state
            .strays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .first()
            .cloned()
        {
            return Err(ContractError::UnregisteredInteraction { method, path });
        }

        let hits = self
            .state
            .hits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let interactions = self.state.registry.interactions();
        if let Some(unexercised) = interactions
            .iter()
            .enumerate()
            .find(|(index, _)| !hits.contains(index))
        {
            return Err(ContractError::UnexercisedInteraction(
                unexercised.1.description.clone(),
            ));
        }

        Ok(interactions.to_vec())
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

async fn handle_request(state: &ServerState, request: Request<Body>) -> Response<Body> {
    let snapshot = match snapshot_request(request).await {
        Ok(snapshot) => snapshot,
        // a request we could not even read is still a failed exchange and
        // must fail the session audit
        Err((method, path, response)) => {
            warn!(%method, %path, "unreadable request body");
            state
                .strays
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((method, path));
            return response;
        }
    };

    match state.registry.find_match(&snapshot) {
        Some((index, interaction)) => {
            debug!(
                description = %interaction.description,
                method = %snapshot.method,
                path = %snapshot.path,
                "request matched interaction"
            );
            state
                .hits
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(index);
            canned_response(interaction)
        }
        None => {
            warn!(
                method = %snapshot.method,
                path = %snapshot.path,
                "no matching interaction"
            );
            state
                .strays
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((snapshot.method.clone(), snapshot.path.clone()));
            diagnostic_response(&state.registry, &snapshot)
        }
    }
}

/// Snapshot an incoming hyper request into the harness representation. On an
/// unreadable body, returns the method and path alongside the error response
/// so the caller can record the failed exchange.
async fn snapshot_request(
    request: Request<Body>,
) -> Result<RequestSnapshot, (String, String, Response<Body>)> {
    let method = request.method().to_string();
    let path = request
        .uri()
        .path_and_query()
        .map_or_else(|| request.uri().path().to_string(), ToString::to_string);

    let headers: BTreeMap<String, String> = request
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
        })
        .collect();

    let bytes = match hyper::body::to_bytes(request.into_body()).await {
        Ok(bytes) => bytes,
        Err(e) => {
            let response = plain_error_response(
                StatusCode::BAD_REQUEST,
                &format!("unreadable request body: {e}"),
            );
            return Err((method, path, response));
        }
    };
    let body = if bytes.is_empty() {
        None
    } else {
        // non-JSON payloads are matched as plain strings
        Some(serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        }))
    };

    Ok(RequestSnapshot {
        method,
        path,
        headers,
        body,
    })
}

/// Build the canned response for a matched interaction. Body values come from
/// the matchers' canonical examples, so repeated calls are deterministic.
fn canned_response(interaction: &Interaction) -> Response<Body> {
    let template = &interaction.response;
    let mut builder = Response::builder().status(
        StatusCode::from_u16(template.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
    );

    let mut has_content_type = false;
    for (name, value) in &template.headers {
        if name.eq_ignore_ascii_case("content-type") {
            has_content_type = true;
        }
        builder = builder.header(name.as_str(), value.as_str());
    }

    match template.example_body() {
        Some(body) => {
            if !has_content_type {
                builder = builder.header("content-type", "application/json");
            }
            let bytes = serde_json::to_vec(&body).unwrap_or_default();
            builder
                .body(Body::from(bytes))
                .unwrap_or_else(|_| fallback_response())
        }
        None => builder
            .body(Body::empty())
            .unwrap_or_else(|_| fallback_response()),
    }
}

/// Diagnostic 500 returned when no interaction matches: names every candidate
/// and its mismatch reasons, closest first.
fn diagnostic_response(registry: &InteractionRegistry, snapshot: &RequestSnapshot) -> Response<Body> {
    let candidates: Vec<Value> = registry
        .candidates(snapshot)
        .into_iter()
        .map(|(interaction, mismatches)| {
            json!({
                "description": interaction.description,
                "mismatches": mismatches,
            })
        })
        .collect();

    let body = json!({
        "error": "no matching interaction",
        "request": format!("{} {}", snapshot.method, snapshot.path),
        "candidates": candidates,
    });

    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap_or_else(|_| fallback_response())
}

fn plain_error_response(status: StatusCode, message: &str) -> Response<Body> {
    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Body::from(json!({ "error": message }).to_string()))
        .unwrap_or_else(|_| fallback_response())
}

fn fallback_response() -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}
