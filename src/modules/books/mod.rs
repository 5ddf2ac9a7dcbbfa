pub mod conformance;
pub mod models;
pub mod status;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use shelf_http::error::AppError;
use shelf_kernel::{settings::BookSettings, InitCtx, Module, StatusPolicy};

use conformance::Checked;
use status::BookStatus;

pub use models::{Book, BookId, BookRecord, RawBook};
pub use status::{StatusError, StatusLabel, BOOK_STATUS};

/// Shared by every books handler.
#[derive(Debug, Clone)]
struct BooksState {
    status_policy: StatusPolicy,
}

/// Publishes the book record schema and checks records against it.
pub struct BooksModule {
    state: Arc<BooksState>,
}

impl BooksModule {
    pub fn new(settings: &BookSettings) -> Self {
        Self {
            state: Arc::new(BooksState {
                status_policy: settings.status_policy,
            }),
        }
    }

    pub fn status_policy(&self) -> StatusPolicy {
        self.state.status_policy
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            status_policy = ?self.state.status_policy,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/health", get(health_check))
            .route("/statuses", get(list_statuses))
            .route("/conformance", post(check_conformance))
            .with_state(Arc::clone(&self.state))
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module(settings: &BookSettings) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(settings))
}

async fn health_check() -> &'static str {
    "books module is healthy"
}

#[derive(Debug, Serialize)]
struct StatusEntry {
    key: &'static str,
    label: &'static str,
}

async fn list_statuses() -> Json<Vec<StatusEntry>> {
    Json(
        BookStatus::ALL
            .into_iter()
            .map(|status| StatusEntry {
                key: status.key(),
                label: status.label(),
            })
            .collect(),
    )
}

#[derive(Debug, Deserialize)]
struct ConformanceQuery {
    policy: Option<String>,
}

async fn check_conformance(
    State(state): State<Arc<BooksState>>,
    Query(query): Query<ConformanceQuery>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<Checked>, AppError> {
    let Json(value) = body.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

    let policy = match query.policy.as_deref() {
        None => state.status_policy,
        Some(raw) => StatusPolicy::parse(raw).ok_or_else(|| {
            AppError::bad_request(format!(
                "unknown status policy '{}'; expected strict or free_text",
                raw
            ))
        })?,
    };

    match conformance::check(&value, policy) {
        Ok(checked) => {
            tracing::debug!(policy = ?policy, "book record conforms");
            Ok(Json(checked))
        }
        Err(violations) => {
            tracing::debug!(
                policy = ?policy,
                violations = violations.len(),
                "book record does not conform"
            );
            Err(AppError::validation(
                violations.iter().map(|v| v.to_detail()).collect(),
                "book record does not conform to the schema",
            ))
        }
    }
}

fn openapi_fragment() -> serde_json::Value {
    let error_response = json!({
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    });

    json!({
        "paths": {
            "/health": {
                "get": {
                    "summary": "Books health check",
                    "tags": ["Books"],
                    "responses": {
                        "200": {
                            "description": "OK",
                            "content": {
                                "text/plain": { "schema": { "type": "string" } }
                            }
                        }
                    }
                }
            },
            "/statuses": {
                "get": {
                    "summary": "List reading statuses with their display labels",
                    "tags": ["Books"],
                    "responses": {
                        "200": {
                            "description": "Every reading status",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "array",
                                        "items": { "$ref": "#/components/schemas/StatusEntry" }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "/conformance": {
                "post": {
                    "summary": "Check a book record against the schema",
                    "tags": ["Books"],
                    "parameters": [{
                        "name": "policy",
                        "in": "query",
                        "required": false,
                        "schema": { "type": "string", "enum": ["strict", "free_text"] }
                    }],
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": { "schema": { "$ref": "#/components/schemas/Book" } }
                        }
                    },
                    "responses": {
                        "200": {
                            "description": "The normalised record",
                            "content": {
                                "application/json": { "schema": { "$ref": "#/components/schemas/Book" } }
                            }
                        },
                        "400": { "description": "Unknown policy or malformed JSON body", "content": error_response["content"] },
                        "422": { "description": "Non-conforming record", "content": error_response["content"] }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "BookStatus": {
                    "type": "string",
                    "enum": BOOK_STATUS.iter().map(|(_, label)| *label).collect::<Vec<_>>(),
                    "description": "Reading status display label"
                },
                "StatusEntry": {
                    "type": "object",
                    "properties": {
                        "key": { "type": "string" },
                        "label": { "type": "string" }
                    },
                    "required": ["key", "label"]
                },
                "Book": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "integer", "format": "int64", "minimum": 0 },
                        "title": { "type": "string" },
                        "author": { "type": "string" },
                        "releaseYear": { "type": "integer", "format": "int32" },
                        "status": { "type": "string" },
                        "rating": { "type": "number" },
                        "isbn": { "type": "string" },
                        "coverUrl": { "type": "string" }
                    },
                    "required": ["id", "title", "author", "releaseYear", "status", "rating"]
                },
                "Violation": {
                    "type": "object",
                    "properties": {
                        "field": { "type": "string" },
                        "error": {
                            "type": "string",
                            "enum": ["not_an_object", "required", "invalid_type", "unknown_status"]
                        }
                    },
                    "required": ["field", "error"]
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use tower::ServiceExt;

    fn module(policy: StatusPolicy) -> BooksModule {
        BooksModule::new(&BookSettings {
            status_policy: policy,
        })
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn foo() -> serde_json::Value {
        json!({
            "id": 2,
            "title": "Foo",
            "author": "Bar",
            "releaseYear": 2000,
            "status": "In Progress",
            "rating": 3
        })
    }

    #[tokio::test]
    async fn statuses_lists_keys_and_labels() {
        let response = module(StatusPolicy::Strict)
            .routes()
            .oneshot(Request::get("/statuses").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!([
                {"key": "PLANNED", "label": "Steht an"},
                {"key": "READING", "label": "Lesend"},
                {"key": "READ", "label": "Gelesen"}
            ])
        );
    }

    #[tokio::test]
    async fn conforming_record_is_normalised() {
        let body = json!({
            "id": 1,
            "title": "Dune",
            "author": "Frank Herbert",
            "releaseYear": 1965,
            "status": "Gelesen",
            "rating": 5
        });

        let response = module(StatusPolicy::Strict)
            .routes()
            .oneshot(post_json("/conformance", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let book = body_json(response).await;
        assert_eq!(book["status"], "Gelesen");
        assert!(book.get("isbn").is_none());
    }

    #[tokio::test]
    async fn strict_policy_rejects_unknown_status() {
        let response = module(StatusPolicy::Strict)
            .routes()
            .oneshot(post_json("/conformance", foo()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "validation_error");
        assert_eq!(
            body["error"]["details"],
            json!([{"field": "status", "error": "unknown_status"}])
        );
    }

    #[tokio::test]
    async fn strict_policy_rejects_symbolic_key() {
        let mut body = foo();
        body["status"] = json!("READ");

        let response = module(StatusPolicy::Strict)
            .routes()
            .oneshot(post_json("/conformance", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn malformed_body_gets_the_error_envelope() {
        let request = Request::post("/conformance")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"id\": 1,"))
            .unwrap();

        let response = module(StatusPolicy::Strict)
            .routes()
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "bad_request");
    }

    #[tokio::test]
    async fn missing_content_type_gets_the_error_envelope() {
        let request = Request::post("/conformance")
            .body(Body::from(foo().to_string()))
            .unwrap();

        let response = module(StatusPolicy::Strict)
            .routes()
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "bad_request");
    }

    #[tokio::test]
    async fn query_policy_overrides_configured_policy() {
        let response = module(StatusPolicy::Strict)
            .routes()
            .oneshot(post_json("/conformance?policy=free_text", foo()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "In Progress");
    }

    #[tokio::test]
    async fn configured_free_text_policy_is_the_default() {
        let response = module(StatusPolicy::FreeText)
            .routes()
            .oneshot(post_json("/conformance", foo()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_policy_is_a_bad_request() {
        let response = module(StatusPolicy::Strict)
            .routes()
            .oneshot(post_json("/conformance?policy=lenient", foo()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn openapi_fragment_lists_status_labels() {
        let fragment = module(StatusPolicy::Strict).openapi().unwrap();
        assert_eq!(
            fragment["components"]["schemas"]["BookStatus"]["enum"],
            json!(["Steht an", "Lesend", "Gelesen"])
        );
        assert!(fragment["paths"]["/conformance"]["post"].is_object());
    }
}
