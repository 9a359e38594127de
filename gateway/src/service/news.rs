use crate::service::error::ProxyError;
use crate::service::llm::{ChatBackend, ChatPrompt};
use log::{info, warn};
use navmapcore::ais::BoundingBox;
use navmapcore::news::{build_search_prompt, NewsQuery, NewsReport, NEWS_SYSTEM_PROMPT};
use std::sync::Arc;

pub struct NewsSearchService<B> {
    backend: Arc<B>,
    area: BoundingBox,
}

impl<B: ChatBackend> NewsSearchService<B> {
    pub fn new(backend: Arc<B>, area: BoundingBox) -> Self {
        Self { backend, area }
    }

    pub async fn search(&self, query: &NewsQuery) -> Result<NewsReport, ProxyError> {
        let user = build_search_prompt(query, &self.area)
            .map_err(|err| ProxyError::Validation(err.to_string()))?;
        let prompt = ChatPrompt {
            system: NEWS_SYSTEM_PROMPT.to_string(),
            user,
        };
        let reply = self.backend.complete(&prompt).await?;
        let report = NewsReport::from_reply(&reply).map_err(|err| {
            warn!("news reply did not parse: {}", err);
            ProxyError::Parse("Failed to parse AI response".into())
        })?;
        info!(
            "news search {:?} returned {} events",
            query.query,
            report.events.len()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::chat::tests::ScriptedBackend;

    fn query(text: &str) -> NewsQuery {
        NewsQuery {
            query: text.into(),
            start_date: "2024-01-01".into(),
            end_date: "2024-02-01".into(),
        }
    }

    #[tokio::test]
    async fn events_are_parsed_and_filtered() {
        let reply = r#"Here you go:
{"events":[
  {"title":"Convoy","lat":14.8,"lon":42.9,"severity":"high","type":"naval"},
  {"title":"Nowhere","lat":95.0,"lon":42.9}
]}"#;
        let backend = Arc::new(ScriptedBackend::replying(reply));
        let service = NewsSearchService::new(backend.clone(), BoundingBox::SOUTHERN_RED_SEA);
        let report = service.search(&query("shipping attacks")).await.unwrap();
        assert_eq!(report.events.len(), 1);
        assert_eq!(report.events[0].title, "Convoy");

        let prompt = backend.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.user.contains("shipping attacks"));
        assert!(prompt.user.contains("2024-01-01"));
    }

    #[tokio::test]
    async fn unparseable_reply_is_a_parse_error() {
        let service = NewsSearchService::new(
            Arc::new(ScriptedBackend::replying("no events today")),
            BoundingBox::SOUTHERN_RED_SEA,
        );
        let err = service.search(&query("anything")).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to parse AI response");
    }

    #[tokio::test]
    async fn blank_query_is_rejected_before_calling_the_model() {
        let backend = Arc::new(ScriptedBackend::replying("{}"));
        let service = NewsSearchService::new(backend.clone(), BoundingBox::SOUTHERN_RED_SEA);
        assert!(matches!(
            service.search(&query("  ")).await,
            Err(ProxyError::Validation(_))
        ));
        assert!(backend.last_prompt.lock().unwrap().is_none());
    }
}
