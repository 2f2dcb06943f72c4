//! HTTP REST API routes

mod character_routes;
mod health_routes;
mod llm_routes;
mod scene_routes;
mod story_routes;

use axum::{
    http::StatusCode,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::application::services::ServiceError;
use crate::infrastructure::state::AppState;

/// Create all API routes
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Health
        .route("/health", get(health_routes::health))
        .route("/health/queues", get(health_routes::queue_health))
        // Story routes
        .route(
            "/api/stories",
            get(story_routes::list_stories).post(story_routes::create_story),
        )
        .route(
            "/api/stories/{id}",
            get(story_routes::get_story)
                .put(story_routes::update_story)
                .delete(story_routes::delete_story),
        )
        // Chapter routes
        .route(
            "/api/stories/{story_id}/chapters",
            get(story_routes::list_chapters),
        )
        .route(
            "/api/chapters/{id}",
            get(story_routes::get_chapter).put(story_routes::update_chapter),
        )
        // Scene routes
        .route(
            "/api/chapters/{chapter_id}/scenes",
            get(scene_routes::list_scenes).post(scene_routes::create_scene),
        )
        .route(
            "/api/scenes/{id}",
            get(scene_routes::get_scene)
                .put(scene_routes::update_scene)
                .delete(scene_routes::delete_scene),
        )
        .route("/api/scenes/{id}/position", put(scene_routes::move_scene))
        .route("/api/scenes/{id}/status", put(scene_routes::update_status))
        .route(
            "/api/scenes/{id}/generate",
            post(scene_routes::generate_scene),
        )
        // Character routes
        .route(
            "/api/stories/{story_id}/characters",
            get(character_routes::list_characters).post(character_routes::create_character),
        )
        .route(
            "/api/characters/{id}",
            get(character_routes::get_character)
                .put(character_routes::update_character)
                .delete(character_routes::delete_character),
        )
        // LLM routes
        .route("/api/llm/generate", post(llm_routes::generate_text))
        .route("/api/llm/test", get(llm_routes::test_connection))
}

/// Map a use-case failure to a status code and message
pub(crate) fn service_error(error: ServiceError) -> (StatusCode, String) {
    let status = match error {
        ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
        ServiceError::Queue(_) | ServiceError::Repository(_) => {
            tracing::error!(error = %error, "Request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, error.to_string())
}

/// Parse a path id, rejecting malformed UUIDs with 400
pub(crate) fn parse_path_id<T, F>(
    value: &str,
    entity: &str,
    parse: F,
) -> Result<T, (StatusCode, String)>
where
    F: Fn(&str) -> Result<T, uuid::Error>,
{
    parse(value).map_err(|_| (StatusCode::BAD_REQUEST, format!("Invalid {} ID", entity)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::application::dto::GenerationJob;
    use crate::application::ports::outbound::QueuePort;
    use crate::application::services::testing::ScriptedLlm;
    use crate::infrastructure::persistence::Repositories;
    use crate::infrastructure::queues::InMemoryQueue;

    struct TestApp {
        router: Router,
        queue: Arc<InMemoryQueue<GenerationJob>>,
    }

    fn app(script: Vec<Result<String, String>>) -> TestApp {
        let queue = Arc::new(InMemoryQueue::new("generation"));
        let state = AppState::new(
            &Repositories::in_memory(),
            queue.clone(),
            Arc::new(ScriptedLlm::new(script)),
        );
        TestApp {
            router: create_routes().with_state(Arc::new(state)),
            queue,
        }
    }

    async fn send(app: &TestApp, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = app.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }

    async fn first_chapter(app: &TestApp) -> String {
        let (_, story) = send(app, Method::POST, "/api/stories", Some(json!({"title": "Heist"}))).await;
        let uri = format!("/api/stories/{}/chapters", story["id"].as_str().unwrap());
        let (_, chapters) = send(app, Method::GET, &uri, None).await;
        chapters[0]["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let app = app(vec![]);
        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::String("OK".to_string()));

        let (status, body) = send(&app, Method::GET, "/health/queues", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["queues"]["generation"]["pending"], 0);
    }

    #[tokio::test]
    async fn test_story_creation_and_chapters() {
        let app = app(vec![]);

        let (status, story) =
            send(&app, Method::POST, "/api/stories", Some(json!({"title": "Heist"}))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(story["title"], "Heist");

        let uri = format!("/api/stories/{}/chapters", story["id"].as_str().unwrap());
        let (status, chapters) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(chapters.as_array().unwrap().len(), 24);
        assert_eq!(chapters[0]["title"], "Chapter 1");
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let app = app(vec![]);

        let (status, _) = send(&app, Method::POST, "/api/stories", Some(json!({"title": ""}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, Method::GET, "/api/scenes/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let missing = format!("/api/scenes/{}", uuid::Uuid::new_v4());
        let (status, _) = send(&app, Method::GET, &missing, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_generate_scene_is_accepted_and_queued() {
        let app = app(vec![]);
        let chapter_id = first_chapter(&app).await;

        let uri = format!("/api/chapters/{}/scenes", chapter_id);
        let (status, scene) =
            send(&app, Method::POST, &uri, Some(json!({"outline": "The vault opens"}))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(scene["status"], "draft");
        assert_eq!(scene["position"], 1);

        let uri = format!("/api/scenes/{}/generate", scene["id"].as_str().unwrap());
        let (status, body) = send(
            &app,
            Method::POST,
            &uri,
            Some(json!({"outline": "The vault opens at dawn"})),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body, json!({"success": true}));
        assert_eq!(app.queue.depth().await.unwrap(), 1);

        let uri = format!("/api/scenes/{}", scene["id"].as_str().unwrap());
        let (_, stored) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(stored["status"], "generating");
        assert_eq!(stored["outline"], "The vault opens at dawn");
    }

    #[tokio::test]
    async fn test_characters_and_llm_routes() {
        let app = app(vec![Ok("Hello there.".to_string())]);
        let (_, story) = send(&app, Method::POST, "/api/stories", Some(json!({"title": "Heist"}))).await;
        let uri = format!("/api/stories/{}/characters", story["id"].as_str().unwrap());

        let (status, character) = send(
            &app,
            Method::POST,
            &uri,
            Some(json!({"name": "Mira", "traits": "Guarded"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(character["name"], "Mira");

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/llm/generate",
            Some(json!({"prompt": "Say hello"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["text"], "Hello there.");

        let (status, body) = send(&app, Method::GET, "/api/llm/test", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "script exhausted");
    }
}
