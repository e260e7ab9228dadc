//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use chatmote_app::ports::SettingsStore;

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Nests API routes under `/api`. Includes a [`TraceLayer`] that logs each
/// HTTP request/response at the `DEBUG` level using the `tracing` ecosystem.
pub fn build<S>(state: AppState<S>) -> Router
where
    S: SettingsStore + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use chatmote_app::channel::channel;
    use chatmote_app::message_router::{Dispatch, MessageRouter};
    use chatmote_domain::automation::AutomationStatus;
    use chatmote_domain::error::{ChatmoteError, SendError};
    use chatmote_domain::message::{
        Context, Envelope, GetAutomationStatus, Message, Response, SettingsUpdated,
        StartAutomation, StopAutomation, ToggleAutomation, TriggerManualSend,
    };
    use chatmote_domain::payload::SendOutcome;
    use chatmote_domain::settings::Settings;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tokio::sync::watch;
    use tower::ServiceExt;

    use super::*;

    #[derive(Default)]
    struct MemorySettings {
        current: Mutex<Settings>,
    }

    impl SettingsStore for MemorySettings {
        async fn load(&self) -> Result<Settings, ChatmoteError> {
            Ok(*self.current.lock().unwrap())
        }

        async fn save(&self, settings: Settings) -> Result<(), ChatmoteError> {
            *self.current.lock().unwrap() = settings;
            Ok(())
        }
    }

    /// Background double: a toggle flag, a manual send that fails once
    /// `cooling` is set, a counter of settings notifications.
    #[derive(Default)]
    struct Background {
        running: Mutex<bool>,
        cooling: Mutex<bool>,
        settings_updates: Mutex<u32>,
    }

    impl Background {
        fn status(&self) -> AutomationStatus {
            AutomationStatus {
                is_running: *self.running.lock().unwrap(),
                is_paused: false,
            }
        }
    }

    impl Dispatch for Background {
        async fn dispatch(&self, envelope: Envelope) -> Result<Response, ChatmoteError> {
            match envelope.kind.as_str() {
                GetAutomationStatus::KIND => Response::reply::<GetAutomationStatus>(&self.status()),
                StartAutomation::KIND => {
                    *self.running.lock().unwrap() = true;
                    Response::reply::<StartAutomation>(&self.status())
                }
                StopAutomation::KIND => {
                    *self.running.lock().unwrap() = false;
                    Response::reply::<StopAutomation>(&self.status())
                }
                ToggleAutomation::KIND => {
                    {
                        let mut running = self.running.lock().unwrap();
                        *running = !*running;
                    }
                    Response::reply::<ToggleAutomation>(&self.status())
                }
                TriggerManualSend::KIND => {
                    if *self.cooling.lock().unwrap() {
                        return Err(SendError::CooldownActive { remaining_ms: 400 }.into());
                    }
                    *self.cooling.lock().unwrap() = true;
                    Response::reply::<TriggerManualSend>(&SendOutcome::delivered())
                }
                SettingsUpdated::KIND => {
                    *self.settings_updates.lock().unwrap() += 1;
                    Response::reply::<SettingsUpdated>(&())
                }
                other => Err(ChatmoteError::UnknownMessageKind(other.to_string())),
            }
        }
    }

    struct Harness {
        app: Router,
        background: Arc<Background>,
        settings: Arc<MemorySettings>,
        status: watch::Sender<AutomationStatus>,
    }

    fn harness() -> Harness {
        let background = Arc::new(Background::default());
        let (endpoint, inbox) = channel(Context::Background, 8);
        MessageRouter::new(Context::Background, Arc::clone(&background)).spawn(inbox);
        let settings = Arc::new(MemorySettings::default());
        let (status, status_rx) = watch::channel(AutomationStatus::default());
        let app = build(AppState::new(endpoint, Arc::clone(&settings), status_rx));
        Harness {
            app,
            background,
            settings,
            status,
        }
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post(uri: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn should_return_ok_when_health_check_called() {
        let response = harness().app.oneshot(get("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn should_return_status() {
        let response = harness().app.oneshot(get("/api/status")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"isRunning": false, "isPaused": false})
        );
    }

    #[tokio::test]
    async fn should_start_and_stop_automation() {
        let h = harness();

        let started = h.app.clone().oneshot(post("/api/automation/start")).await.unwrap();
        assert_eq!(body_json(started).await["isRunning"], json!(true));

        let stopped = h.app.oneshot(post("/api/automation/stop")).await.unwrap();
        assert_eq!(body_json(stopped).await["isRunning"], json!(false));
    }

    #[tokio::test]
    async fn should_toggle_automation() {
        let h = harness();

        let response = h.app.oneshot(post("/api/automation/toggle")).await.unwrap();

        assert_eq!(body_json(response).await["isRunning"], json!(true));
        assert!(*h.background.running.lock().unwrap());
    }

    #[tokio::test]
    async fn should_send_then_conflict_while_cooling_down() {
        let h = harness();

        let first = h.app.clone().oneshot(post("/api/send")).await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(body_json(first).await, json!({"success": true}));

        let second = h.app.oneshot(post("/api/send")).await.unwrap();
        assert_eq!(second.status(), StatusCode::CONFLICT);
        assert_eq!(
            body_json(second).await,
            json!({"error": "manual send is cooling down (400ms remaining)"})
        );
    }

    #[tokio::test]
    async fn should_return_default_settings() {
        let response = harness().app.oneshot(get("/api/settings")).await.unwrap();

        assert_eq!(
            body_json(response).await,
            json!({"minRepetitions": 1, "maxRepetitions": 1, "minDelayMs": 2000, "maxDelayMs": 3000})
        );
    }

    #[tokio::test]
    async fn should_save_valid_settings_and_notify_background() {
        let h = harness();
        let body = json!({"minRepetitions": 2, "maxRepetitions": 4, "minDelayMs": 800, "maxDelayMs": 900});

        let response = h
            .app
            .oneshot(json_request("PUT", "/api/settings", &body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(h.settings.current.lock().unwrap().max_repetitions, 4);
        assert_eq!(*h.background.settings_updates.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn should_reject_invalid_settings() {
        let h = harness();
        let body = json!({"minRepetitions": 3, "maxRepetitions": 1, "minDelayMs": 800, "maxDelayMs": 900});

        let response = h
            .app
            .oneshot(json_request("PUT", "/api/settings", &body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(*h.settings.current.lock().unwrap(), Settings::default());
        assert_eq!(*h.background.settings_updates.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn should_reject_repetitions_above_maximum() {
        let h = harness();
        let body = json!({"minRepetitions": 4_294_967_295u32, "maxRepetitions": 4_294_967_295u32, "minDelayMs": 800, "maxDelayMs": 900});

        let response = h
            .app
            .oneshot(json_request("PUT", "/api/settings", &body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"error": "validation error: repetitions must be at most 100, got 4294967295"})
        );
        assert_eq!(*h.settings.current.lock().unwrap(), Settings::default());
    }

    #[tokio::test]
    async fn should_forward_raw_message() {
        let response = harness()
            .app
            .oneshot(json_request(
                "POST",
                "/api/messages",
                &json!({"kind": "get-automation-status"}),
            ))
            .await
            .unwrap();

        assert_eq!(
            body_json(response).await,
            json!({"success": true, "data": {"isRunning": false, "isPaused": false}})
        );
    }

    #[tokio::test]
    async fn should_report_unknown_kind_in_response_body() {
        let response = harness()
            .app
            .oneshot(json_request(
                "POST",
                "/api/messages",
                &json!({"kind": "unknown-xyz", "payload": {}}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], json!(false));
        assert!(!body["error"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_stream_current_status_first() {
        let h = harness();
        h.status.send_replace(AutomationStatus {
            is_running: true,
            is_paused: true,
        });

        let response = h.app.oneshot(get("/api/status/stream")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let mut body = response.into_body();
        let frame = body.frame().await.unwrap().unwrap();
        let text = String::from_utf8(frame.into_data().unwrap().to_vec()).unwrap();
        assert!(text.contains("event: status"), "{text}");
        assert!(text.contains(r#"data: {"isRunning":true,"isPaused":true}"#), "{text}");
    }
}
