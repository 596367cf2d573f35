//! Simple REST API server example for the exchange engine.
//!
//! Run with: `cargo run --example server`
//!
//! ## Endpoints
//!
//! - `POST /users` - Register a user display name
//! - `POST /items` - Seed a catalog item
//! - `GET /items/{id}` - Get an item by ID
//! - `POST /proposals` - Propose an exchange
//! - `POST /proposals/{id}/resolve` - Accept or refuse a proposal
//! - `GET /proposals/{id}` - Get a proposal by ID
//! - `GET /users/{id}/pending` - List pending exchanges for a receiver
//!
//! ## Example Usage
//!
//! ```bash
//! # Seed two users and their items
//! curl -X POST http://localhost:3000/users \
//!   -H "Content-Type: application/json" -d '{"id": 1, "name": "alice"}'
//! curl -X POST http://localhost:3000/items \
//!   -H "Content-Type: application/json" \
//!   -d '{"id": 10, "owner": 1, "name": "Penny Black", "year": 1840, "is_public": true, "image": "penny.jpg"}'
//! curl -X POST http://localhost:3000/items \
//!   -H "Content-Type: application/json" \
//!   -d '{"id": 20, "owner": 2, "name": "Blue Mauritius", "year": null, "is_public": true, "image": ""}'
//!
//! # User 1 offers item 10 for item 20
//! curl -X POST http://localhost:3000/proposals \
//!   -H "Content-Type: application/json" \
//!   -d '{"sender": 1, "offered": 10, "requested": 20}'
//!
//! # The receiver checks their inbox, then accepts
//! curl http://localhost:3000/users/2/pending
//! curl -X POST http://localhost:3000/proposals/1/resolve \
//!   -H "Content-Type: application/json" -d '{"user": 2, "decision": "accept"}'
//! ```

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use exchange_demo_rs::{
    Decision, ExchangeEngine, ExchangeError, Item, ItemCatalog, ItemId, LogSink, MemoryCatalog,
    MemoryDirectory, PendingExchange, Proposal, ProposalId, UserId,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;

// === Request/Response DTOs ===

/// Request body for registering a user.
#[derive(Debug, Deserialize)]
pub struct UserRequest {
    pub id: u32,
    pub name: String,
}

/// Request body for creating a proposal.
#[derive(Debug, Deserialize)]
pub struct ProposalRequest {
    pub sender: u32,
    pub offered: u64,
    pub requested: u64,
}

/// Request body for resolving a proposal.
#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub user: u32,
    pub decision: Decision,
}

/// Response body for errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

// === Application State ===

/// Shared application state containing the engine and its collaborators.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ExchangeEngine>,
    pub catalog: Arc<MemoryCatalog>,
    pub directory: Arc<MemoryDirectory>,
}

// === Error Handling ===

/// Wrapper for converting `ExchangeError` into HTTP responses.
pub struct AppError(ExchangeError);

impl From<ExchangeError> for AppError {
    fn from(err: ExchangeError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            ExchangeError::ItemNotFound => (StatusCode::NOT_FOUND, "ITEM_NOT_FOUND"),
            ExchangeError::SelfTrade => (StatusCode::BAD_REQUEST, "SELF_TRADE"),
            ExchangeError::ItemNotPublic => (StatusCode::FORBIDDEN, "ITEM_NOT_PUBLIC"),
            ExchangeError::NotOwner => (StatusCode::FORBIDDEN, "NOT_OWNER"),
            ExchangeError::ItemAlreadyPending => (StatusCode::CONFLICT, "ITEM_ALREADY_PENDING"),
            ExchangeError::ProposalNotFound => (StatusCode::NOT_FOUND, "PROPOSAL_NOT_FOUND"),
            ExchangeError::AlreadyResolved => (StatusCode::CONFLICT, "ALREADY_RESOLVED"),
            ExchangeError::NotAuthorized => (StatusCode::FORBIDDEN, "NOT_AUTHORIZED"),
            ExchangeError::OwnershipChanged => (StatusCode::CONFLICT, "OWNERSHIP_CHANGED"),
            ExchangeError::Storage(_) => (StatusCode::SERVICE_UNAVAILABLE, "STORAGE"),
        };

        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}

// === Handlers ===

/// POST /users - Register a user display name.
async fn register_user(
    State(state): State<AppState>,
    Json(request): Json<UserRequest>,
) -> StatusCode {
    state.directory.add(UserId(request.id), request.name);
    StatusCode::CREATED
}

/// POST /items - Seed a catalog item.
async fn seed_item(State(state): State<AppState>, Json(item): Json<Item>) -> StatusCode {
    state.catalog.add(item);
    StatusCode::CREATED
}

/// GET /items/{id} - Get an item by ID.
async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Item>, AppError> {
    state
        .catalog
        .get(ItemId(id))?
        .map(Json)
        .ok_or(AppError(ExchangeError::ItemNotFound))
}

/// POST /proposals - Create a new exchange proposal.
async fn create_proposal(
    State(state): State<AppState>,
    Json(request): Json<ProposalRequest>,
) -> Result<(StatusCode, Json<Proposal>), AppError> {
    let proposal = state.engine.propose(
        UserId(request.sender),
        ItemId(request.offered),
        ItemId(request.requested),
    )?;
    Ok((StatusCode::CREATED, Json(proposal)))
}

/// POST /proposals/{id}/resolve - Accept or refuse a proposal.
async fn resolve_proposal(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<ResolveRequest>,
) -> Result<Json<Proposal>, AppError> {
    let proposal =
        state
            .engine
            .resolve(ProposalId(id), UserId(request.user), request.decision)?;
    Ok(Json(proposal))
}

/// GET /proposals/{id} - Get a proposal by ID.
async fn get_proposal(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Proposal>, AppError> {
    state
        .engine
        .proposal(ProposalId(id))
        .map(Json)
        .ok_or(AppError(ExchangeError::ProposalNotFound))
}

/// GET /users/{id}/pending - List pending exchanges for a receiver.
async fn list_pending(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Json<Vec<PendingExchange>> {
    Json(state.engine.pending_for(UserId(id)).collect())
}

// === Router ===

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/users", post(register_user))
        .route("/items", post(seed_item))
        .route("/items/{id}", get(get_item))
        .route("/proposals", post(create_proposal))
        .route("/proposals/{id}/resolve", post(resolve_proposal))
        .route("/proposals/{id}", get(get_proposal))
        .route("/users/{id}/pending", get(list_pending))
        .with_state(state)
}

// === Main ===

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let catalog = Arc::new(MemoryCatalog::new());
    let directory = Arc::new(MemoryDirectory::new());
    let engine = Arc::new(ExchangeEngine::new(
        catalog.clone(),
        directory.clone(),
        Arc::new(LogSink::new()),
    ));
    let state = AppState {
        engine,
        catalog,
        directory,
    };

    let app = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:3000").await.unwrap();
    println!("Exchange API server running on http://127.0.0.1:3000");
    println!();
    println!("Endpoints:");
    println!("  POST /users                   - Register a user display name");
    println!("  POST /items                   - Seed a catalog item");
    println!("  GET  /items/:id               - Get an item by ID");
    println!("  POST /proposals               - Propose an exchange");
    println!("  POST /proposals/:id/resolve   - Accept or refuse a proposal");
    println!("  GET  /proposals/:id           - Get a proposal by ID");
    println!("  GET  /users/:id/pending       - List pending exchanges");

    axum::serve(listener, app).await.unwrap();
}
