use crate::service::error::ProxyError;
use crate::service::llm::{ChatBackend, ChatPrompt};
use log::{info, warn};
use navmapcore::command::MapCommand;
use navmapcore::markers::model::Marker;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Body of `POST /map-ai-chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub markers: Vec<Marker>,
}

pub fn build_system_prompt(markers: &[Marker]) -> String {
    let listing = serde_json::to_string_pretty(markers).unwrap_or_else(|_| "[]".into());
    format!(
        "You are an assistant for a maritime tactical map. You can add markers, move \
existing markers and search for real locations to mark. Answer in the user's language.\n\n\
Current markers:\n{listing}\n\n\
To add a marker, answer with JSON:\n\
{{\"action\": \"add\", \"marker\": {{\"name\": \"...\", \"type\": \"military|ship|port|base\", \
\"subtype\": \"...\", \"description\": \"...\", \"icon\": \"emoji\", \
\"coordinates\": [lon, lat], \"severity\": \"low|medium|high\"}}, \"message\": \"...\"}}\n\n\
To move an existing marker, answer with JSON:\n\
{{\"action\": \"move\", \"markerId\": id, \"newCoordinates\": [lon, lat], \"message\": \"...\"}}\n\n\
To add several researched locations, answer with JSON:\n\
{{\"action\": \"search_and_add\", \"markers\": [marker, ...], \"summary\": \"...\", \
\"message\": \"...\"}}\n\n\
For anything else, answer with JSON:\n\
{{\"action\": \"message\", \"message\": \"...\"}}\n\n\
Coordinates are always [longitude, latitude]. Rough sea bounds: Red Sea lon 32-43, lat 12-30; \
Mediterranean lon -6-36, lat 30-46; Arabian Gulf lon 47-57, lat 23-30."
    )
}

/// Turns a chat message into a validated map command.
pub struct MapChatService<B> {
    backend: Arc<B>,
}

impl<B: ChatBackend> MapChatService<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    pub async fn respond(&self, request: &ChatRequest) -> Result<MapCommand, ProxyError> {
        if request.message.trim().is_empty() {
            return Err(ProxyError::Validation("message is empty".into()));
        }
        let prompt = ChatPrompt {
            system: build_system_prompt(&request.markers),
            user: request.message.clone(),
        };
        let reply = self.backend.complete(&prompt).await?;
        let command = MapCommand::from_reply(&reply);
        if let Err(err) = command.validate(&request.markers) {
            warn!("rejecting assistant command: {}", err);
            return Err(ProxyError::Validation(err.to_string()));
        }
        info!(
            "chat command {:?} for {} known markers",
            action_name(&command),
            request.markers.len()
        );
        Ok(command)
    }
}

fn action_name(command: &MapCommand) -> &'static str {
    match command {
        MapCommand::Add { .. } => "add",
        MapCommand::Move { .. } => "move",
        MapCommand::SearchAndAdd { .. } => "search_and_add",
        MapCommand::Message { .. } => "message",
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use navmapcore::markers::model::MarkerDraft;
    use navmapcore::Coordinate;
    use std::sync::Mutex;

    /// Backend that answers with a fixed reply and remembers the last prompt.
    pub(crate) struct ScriptedBackend {
        reply: Result<String, fn() -> ProxyError>,
        pub(crate) last_prompt: Mutex<Option<ChatPrompt>>,
    }

    impl ScriptedBackend {
        pub(crate) fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                last_prompt: Mutex::new(None),
            }
        }

        pub(crate) fn failing(error: fn() -> ProxyError) -> Self {
            Self {
                reply: Err(error),
                last_prompt: Mutex::new(None),
            }
        }
    }

    impl ChatBackend for ScriptedBackend {
        async fn complete(&self, prompt: &ChatPrompt) -> Result<String, ProxyError> {
            *self.last_prompt.lock().unwrap() = Some(prompt.clone());
            match &self.reply {
                Ok(reply) => Ok(reply.clone()),
                Err(error) => Err(error()),
            }
        }
    }

    fn frigate() -> Marker {
        MarkerDraft::new("Frigate", "ship", Coordinate::new(21.5, 39.1)).into_marker(7)
    }

    fn request(message: &str) -> ChatRequest {
        ChatRequest {
            message: message.into(),
            markers: vec![frigate()],
        }
    }

    #[tokio::test]
    async fn prompt_lists_current_markers() {
        let backend = Arc::new(ScriptedBackend::replying("plain answer"));
        let service = MapChatService::new(backend.clone());
        service.respond(&request("hello")).await.unwrap();

        let prompt = backend.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.system.contains("\"Frigate\""));
        assert!(prompt.system.contains("Arabian Gulf"));
        assert_eq!(prompt.user, "hello");
    }

    #[tokio::test]
    async fn prose_reply_becomes_a_message() {
        let service = MapChatService::new(Arc::new(ScriptedBackend::replying("Nothing to add.")));
        let command = service.respond(&request("hi")).await.unwrap();
        assert_eq!(
            command,
            MapCommand::Message {
                message: "Nothing to add.".into()
            }
        );
    }

    #[tokio::test]
    async fn move_of_known_marker_is_accepted() {
        let reply = r#"Sure: {"action":"move","markerId":"7","newCoordinates":[40.0,20.0],"message":"moved"}"#;
        let service = MapChatService::new(Arc::new(ScriptedBackend::replying(reply)));
        let command = service.respond(&request("move it")).await.unwrap();
        assert!(matches!(command, MapCommand::Move { marker_id: 7, .. }));
    }

    #[tokio::test]
    async fn move_of_unknown_marker_is_a_validation_error() {
        let reply = r#"{"action":"move","markerId":99,"newCoordinates":[40.0,20.0],"message":""}"#;
        let service = MapChatService::new(Arc::new(ScriptedBackend::replying(reply)));
        let err = service.respond(&request("move it")).await.unwrap_err();
        assert!(matches!(err, ProxyError::Validation(_)));
    }

    #[tokio::test]
    async fn out_of_range_add_is_a_validation_error() {
        let reply = r#"{"action":"add","marker":{"name":"x","coordinates":[200.0,20.0]},"message":""}"#;
        let service = MapChatService::new(Arc::new(ScriptedBackend::replying(reply)));
        let err = service.respond(&request("add")).await.unwrap_err();
        assert_eq!(err.status(), warp::http::StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn backend_errors_pass_through() {
        let service = MapChatService::new(Arc::new(ScriptedBackend::failing(|| {
            ProxyError::RateLimited
        })));
        let err = service.respond(&request("hi")).await.unwrap_err();
        assert!(matches!(err, ProxyError::RateLimited));
    }
}
