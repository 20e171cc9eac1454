use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use tokio::sync::Mutex;

use crate::{account, approvals, auth, messages, transfers, users};
use engine::{BalanceWatcher, DEFAULT_POLL_PERIOD, Engine};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    /// One balance watcher per logged-in user, torn down on logout.
    pub(crate) watchers: Arc<Mutex<HashMap<String, BalanceWatcher>>>,
    pub(crate) poll_period: Duration,
}

impl ServerState {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self {
            engine,
            watchers: Arc::new(Mutex::new(HashMap::new())),
            poll_period: DEFAULT_POLL_PERIOD,
        }
    }

    pub fn with_poll_period(mut self, period: Duration) -> Self {
        self.poll_period = period;
        self
    }
}

/// The bearer token of the current request, kept around so `logout` can
/// revoke exactly the session that authenticated it.
#[derive(Clone)]
pub(crate) struct BearerToken(pub(crate) String);

/// Revalidates the session token against the store on every request.
///
/// The token is untrusted input: `authenticate` re-reads the session row and
/// the owning profile (role, active flag), so a role change or deactivation
/// takes effect on the very next request.
async fn auth(
    auth_header: TypedHeader<Authorization<Bearer>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let user = state
        .engine
        .authenticate(auth_header.token())
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(user);
    request
        .extensions_mut()
        .insert(BearerToken(auth_header.token().to_string()));
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    let protected = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/account", get(account::get))
        .route("/account/refresh", get(account::refresh))
        .route("/transactions", get(account::list_transactions))
        .route("/stats", get(account::stats))
        .route("/transfers", post(transfers::initiate))
        .route("/transfers/complete", post(transfers::complete))
        .route("/transfers/cancel", post(transfers::cancel))
        .route("/routing/{country}", get(transfers::routing_rule_get))
        .route("/messages", get(messages::list))
        .route("/messages/unread", get(messages::unread))
        .route(
            "/profile",
            get(users::profile).patch(users::update_profile_self),
        )
        .route(
            "/admin/transactions/pending",
            get(approvals::list_pending),
        )
        .route(
            "/admin/transactions/{id}/approve",
            post(approvals::approve),
        )
        .route("/admin/transactions/{id}/reject", post(approvals::reject))
        .route("/admin/transactions/simulate", post(approvals::simulate))
        .route("/admin/notices", get(approvals::notices))
        .route("/admin/users", get(users::list).post(users::create))
        .route(
            "/admin/users/{id}",
            axum::routing::patch(users::update).delete(users::remove),
        )
        .route("/admin/messages", post(messages::send))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    Router::new()
        .route("/auth/login", post(auth::login))
        .merge(protected)
        .with_state(state)
}

pub async fn run(engine: Engine) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState::new(Arc::new(engine));

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
