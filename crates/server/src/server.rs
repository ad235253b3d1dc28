use axum::{
    Router,
    extract::Request,
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Error as AxumError, Header},
};

use std::sync::Arc;

use crate::{instruments, pockets, records, recurring, rooms, stats};
use engine::Engine;

static USER_ID_HEADER: axum::http::HeaderName = axum::http::HeaderName::from_static("x-user-id");

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// The caller's identity, resolved by the external auth layer and injected
/// into every request via the `x-user-id` header.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub String);

/// `TypedHeader` for the identity header.
#[derive(Debug)]
struct UserIdHeader(String);

impl Header for UserIdHeader {
    fn name() -> &'static axum::http::HeaderName {
        &USER_ID_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i axum::http::HeaderValue>,
    {
        let value = values.next().ok_or_else(AxumError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(AxumError::invalid());
        };
        if value.trim().is_empty() {
            return Err(AxumError::invalid());
        }

        Ok(UserIdHeader(value.trim().to_string()))
    }

    fn encode<E: Extend<axum::http::HeaderValue>>(&self, values: &mut E) {
        match axum::http::HeaderValue::from_str(&self.0) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode x-user-id header"),
        }
    }
}

async fn identify(
    user_header: TypedHeader<UserIdHeader>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    request.extensions_mut().insert(CurrentUser(user_header.0.0));
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/records", get(records::list).post(records::create))
        .route(
            "/records/{id}",
            put(records::update).delete(records::remove),
        )
        .route("/transfer", post(records::transfer))
        .route("/pockets", get(pockets::list).post(pockets::create))
        .route(
            "/pockets/{id}",
            axum::routing::patch(pockets::update).delete(pockets::remove),
        )
        .route(
            "/instruments",
            get(instruments::list).post(instruments::create),
        )
        .route("/instruments/pending", get(instruments::pending_all))
        .route(
            "/instruments/{id}",
            axum::routing::patch(instruments::update).delete(instruments::remove),
        )
        .route("/instruments/{id}/pending", get(instruments::pending))
        .route("/instruments/{id}/pay", post(instruments::pay))
        .route("/stats", get(stats::get_stats))
        .route("/rooms", post(rooms::create))
        .route("/rooms/{id}", get(rooms::get))
        .route("/rooms/{id}/members", post(rooms::add_member))
        .route("/rooms/{id}/expenses", post(rooms::new_expense))
        .route(
            "/rooms/{id}/expenses/{expense_id}",
            put(rooms::update_expense).delete(rooms::delete_expense),
        )
        .route("/rooms/{id}/net", get(rooms::net_positions))
        .route("/rooms/{id}/debts", get(rooms::pairwise_debts))
        .route("/recurring", get(recurring::list).post(recurring::create))
        .route(
            "/recurring/{id}",
            put(recurring::update).delete(recurring::remove),
        )
        .route_layer(middleware::from_fn(identify))
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

    let state = ServerState {
        engine: Arc::new(engine),
    };

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

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use http_body_util::BodyExt;
    use migration::MigratorTrait;
    use tower::ServiceExt;

    async fn test_router() -> Router {
        let db = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let engine = Engine::builder().database(db).build().await.unwrap();
        router(ServerState {
            engine: Arc::new(engine),
        })
    }

    #[tokio::test]
    async fn missing_identity_header_is_rejected() {
        let app = test_router().await;
        let res = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn stats_starts_at_zero() {
        let app = test_router().await;
        let res = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/stats")
                    .header("x-user-id", "alice")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let body = res.into_body().collect().await.unwrap().to_bytes();
        let stats: api_types::stats::Statistic = serde_json::from_slice(&body).unwrap();
        assert_eq!(stats.balance_minor, 0);
    }

    #[tokio::test]
    async fn record_create_and_list_round_trip() {
        let app = test_router().await;

        let payload = serde_json::json!({
            "kind": "income",
            "amount_minor": 100_000,
            "category": "Salario",
            "payment": "cash",
            "pocket_id": null,
            "note": null,
            "created_at": "2026-08-01T10:00:00-05:00",
        });
        let res = app
            .clone()
            .oneshot(
                HttpRequest::builder()
                    .method("POST")
                    .uri("/records")
                    .header("x-user-id", "alice")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);

        let res = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/records")
                    .header("x-user-id", "alice")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = res.into_body().collect().await.unwrap().to_bytes();
        let list: api_types::record::RecordListResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(list.records.len(), 1);
        assert_eq!(list.records[0].amount_minor, 100_000);
    }

    #[tokio::test]
    async fn validation_errors_surface_as_422_with_message() {
        let app = test_router().await;

        // Transfer with identical (implicit) endpoints.
        let payload = serde_json::json!({
            "amount_minor": 1_000,
            "from_pocket_id": null,
            "to_pocket_id": null,
            "note": null,
            "created_at": "2026-08-01T10:00:00-05:00",
        });
        let res = app
            .oneshot(
                HttpRequest::builder()
                    .method("POST")
                    .uri("/transfer")
                    .header("x-user-id", "alice")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = res.into_body().collect().await.unwrap().to_bytes();
        let err: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            err["error"],
            "Invalid pocket: source and destination pockets must differ"
        );
    }
}
