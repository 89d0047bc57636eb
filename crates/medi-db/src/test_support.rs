//! Shared test utilities for medi-db unit tests.

#[cfg(test)]
pub(crate) mod helpers {
    use medi_core::entities::{QueryRecord, ResponseRecord};
    use medi_core::enums::{Priority, QueryType, ResponseSource};

    use crate::helpers::timestamp_now;
    use crate::service::MediService;

    /// In-memory service with migrations applied.
    pub async fn test_service() -> MediService {
        MediService::new_local(":memory:").await.unwrap()
    }

    /// Start a session and return its ID.
    pub async fn start_test_session(svc: &MediService) -> String {
        svc.create_session("dr-test", "proj-test", "type 2 diabetes")
            .await
            .unwrap()
            .id
    }

    /// Store a query and its mock response.
    pub async fn insert_exchange(
        svc: &MediService,
        session_id: &str,
        text: &str,
        confidence: f64,
    ) -> (QueryRecord, ResponseRecord) {
        let query = svc
            .insert_query(session_id, text, QueryType::ClinicalQuestion, Priority::Medium)
            .await
            .unwrap();
        let response = ResponseRecord {
            query_id: query.id.clone(),
            text: format!("answer to {text}"),
            confidence,
            source: ResponseSource::Mock,
            generated_at: timestamp_now(),
        };
        svc.insert_response(&response).await.unwrap();
        (query, response)
    }
}
