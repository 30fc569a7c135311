//! HTTP API 服务器
//!
//! 将会话存储的四个操作暴露为 HTTP 接口：
//! - `POST /newsessions` 创建会话
//! - `GET /getsessions` 列出会话
//! - `POST /catsessions` 读取会话
//! - `PUT /savesessions` 保存会话

use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::{Config, CorsConfig};
use crate::session_files::{
    CreatedSession, MessageResponse, SessionFileStorage, SessionListResponse, SessionRecord,
    SessionStoreError,
};

/// 请求处理器共享状态
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<SessionFileStorage>,
}

impl AppState {
    pub fn new(storage: Arc<SessionFileStorage>) -> Self {
        Self { storage }
    }
}

impl IntoResponse for SessionStoreError {
    fn into_response(self) -> Response {
        let status = match &self {
            SessionStoreError::Validation(_) => StatusCode::BAD_REQUEST,
            SessionStoreError::NotFound { .. } => StatusCode::NOT_FOUND,
            SessionStoreError::NameGeneration | SessionStoreError::Persistence { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let mut body = json!({ "error": self.message() });
        if let Some(detail) = self.detail() {
            body["detail"] = json!(detail);
        }
        (status, Json(body)).into_response()
    }
}

/// 构建路由
pub fn build_router(state: AppState, config: &Config) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/newsessions", post(create_session))
        .route("/getsessions", get(list_sessions))
        .route("/catsessions", post(cat_session))
        .route("/savesessions", put(save_session))
        .layer(DefaultBodyLimit::max(config.server.body_limit_bytes()))
        .layer(cors_layer(&config.cors))
        .with_state(state)
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if config.allowed_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("[SERVER] 忽略无效的 CORS 来源: {}", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

/// 启动 HTTP 服务器，直到 `shutdown` 完成
pub async fn run_server<F>(
    config: &Config,
    storage: Arc<SessionFileStorage>,
    shutdown: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(AppState::new(storage), config);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        tracing::error!("[SERVER] 绑定失败: {} (地址: {})", e, addr);
        e
    })?;

    tracing::info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("[SERVER] 服务器已停止");
    Ok(())
}

/// 等待 Ctrl-C
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("[SERVER] 无法监听退出信号: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("[SERVER] 收到退出信号，正在关闭");
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthStatus {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    timestamp: chrono::DateTime<Utc>,
    sessions_dir: String,
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthStatus {
        status: "ok",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now(),
        sessions_dir: state.storage.base_dir().display().to_string(),
    })
}

/// 请求体解析失败时统一返回 400 和 `{"error": ...}`
fn json_body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, SessionStoreError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            tracing::debug!("[SERVER] 请求体无效: {}", rejection.body_text());
            Err(SessionStoreError::validation(rejection.body_text()))
        }
    }
}

async fn create_session(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedSession>), SessionStoreError> {
    let record = SessionRecord::from_value(json_body(payload)?)?;
    let created = state.storage.create_session(record)?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_sessions(State(state): State<AppState>) -> Response {
    match state.storage.list_sessions() {
        Ok(sessions) => Json(SessionListResponse {
            sessions,
            status: "success".to_string(),
        })
        .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": e.message(),
                "detail": e.detail(),
                "sessions": [],
            })),
        )
            .into_response(),
    }
}

async fn cat_session(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, SessionStoreError> {
    let body = json_body(payload)?;
    let file_path = body.get("filePath").and_then(Value::as_str).unwrap_or_default();
    state.storage.get_session(file_path).map(Json)
}

async fn save_session(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MessageResponse>, SessionStoreError> {
    let record = SessionRecord::from_value(json_body(payload)?)?;
    state.storage.save_session(&record)?;
    Ok(Json(MessageResponse {
        message: "session saved".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(resp: Response) -> Value {
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_validation_maps_to_400() {
        let resp = SessionStoreError::validation("missing valid timestamp").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["error"], "missing valid timestamp");
        assert!(json.get("detail").is_none());
    }

    #[tokio::test]
    async fn test_not_found_maps_to_404_without_detail() {
        let resp = SessionStoreError::NotFound {
            detail: "permission denied".to_string(),
        }
        .into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let json = body_json(resp).await;
        assert_eq!(json["error"], "session does not exist");
        assert!(json.get("detail").is_none());
    }

    #[tokio::test]
    async fn test_persistence_maps_to_500_with_detail() {
        let resp =
            SessionStoreError::persistence("failed to create session", "disk full").into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(resp).await;
        assert_eq!(json["error"], "failed to create session");
        assert_eq!(json["detail"], "disk full");
    }

    #[tokio::test]
    async fn test_name_generation_maps_to_500() {
        let resp = SessionStoreError::NameGeneration.into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(resp).await;
        assert_eq!(json["error"], "could not generate unique filename");
    }
}
