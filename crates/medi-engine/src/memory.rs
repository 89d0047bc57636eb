//! Two-tier session memory.
//!
//! Long-term memory is the `memory_entries` table. Short-term memory is a
//! bounded per-session queue holding the most recent entries, always a suffix
//! of the long-term log. Writes go to the database first and only then to the
//! queue, so a failed write never leaves a cached entry behind.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use medi_core::entities::{MemoryEntry, QueryRecord, ResponseRecord};
use medi_db::error::DatabaseError;
use medi_db::service::MediService;

pub struct MemoryManager {
    service: Arc<MediService>,
    max_short_term: usize,
    short_term: HashMap<String, VecDeque<MemoryEntry>>,
    /// Sessions whose queue has evicted at least one entry.
    trimmed: HashSet<String>,
}

impl MemoryManager {
    #[must_use]
    pub fn new(service: Arc<MediService>, max_short_term: usize) -> Self {
        Self {
            service,
            max_short_term: max_short_term.max(1),
            short_term: HashMap::new(),
            trimmed: HashSet::new(),
        }
    }

    #[must_use]
    pub const fn max_short_term(&self) -> usize {
        self.max_short_term
    }

    /// Store an approved exchange.
    ///
    /// The long-term append happens first. A session whose queue is not
    /// loaded yet is hydrated from the database afterwards, which picks up the
    /// new entry along with its predecessors.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` if the query belongs to another
    /// session or the response does not match the query, and any error from
    /// the append. Short-term memory is untouched on error.
    pub async fn add(
        &mut self,
        session_id: &str,
        query: &QueryRecord,
        response: &ResponseRecord,
    ) -> Result<MemoryEntry, DatabaseError> {
        let entry = self.persist(session_id, query, response).await?;
        self.remember(&entry).await?;
        Ok(entry)
    }

    /// Long-term half of [`Self::add`]. Safe to call inside
    /// `MediService::in_transaction`; the queue is not touched.
    ///
    /// # Errors
    ///
    /// Same as [`Self::add`].
    pub async fn persist(
        &self,
        session_id: &str,
        query: &QueryRecord,
        response: &ResponseRecord,
    ) -> Result<MemoryEntry, DatabaseError> {
        if query.session_id != session_id {
            return Err(DatabaseError::InvalidState(format!(
                "query {} belongs to session {}, not {session_id}",
                query.id, query.session_id
            )));
        }
        if response.query_id != query.id {
            return Err(DatabaseError::InvalidState(format!(
                "response for {} does not answer query {}",
                response.query_id, query.id
            )));
        }
        self.service.append_memory(session_id, &query.id).await
    }

    /// Short-term half of [`Self::add`], for an entry already committed to
    /// the long-term log.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if an unloaded session cannot be hydrated.
    pub async fn remember(&mut self, entry: &MemoryEntry) -> Result<(), DatabaseError> {
        let session_id = entry.session_id.as_str();
        if self.short_term.contains_key(session_id) {
            self.push(entry.clone());
        } else {
            self.hydrate(session_id).await?;
        }
        tracing::debug!(
            session_id,
            entry_id = %entry.id,
            short_term = self.short_term_len(session_id),
            "memory entry stored"
        );
        Ok(())
    }

    fn push(&mut self, entry: MemoryEntry) {
        let session_id = entry.session_id.clone();
        let queue = self.short_term.entry(session_id.clone()).or_default();
        queue.push_back(entry);
        let mut evicted = false;
        while queue.len() > self.max_short_term {
            queue.pop_front();
            evicted = true;
        }
        if evicted {
            self.trimmed.insert(session_id);
        }
    }

    /// The most recent `limit` short-term entries, oldest first.
    #[must_use]
    pub fn get_context(&self, session_id: &str, limit: usize) -> Vec<MemoryEntry> {
        self.short_term.get(session_id).map_or_else(Vec::new, |queue| {
            let skip = queue.len().saturating_sub(limit);
            queue.iter().skip(skip).cloned().collect()
        })
    }

    #[must_use]
    pub fn short_term_len(&self, session_id: &str) -> usize {
        self.short_term.get(session_id).map_or(0, VecDeque::len)
    }

    #[must_use]
    pub fn was_trimmed(&self, session_id: &str) -> bool {
        self.trimmed.contains(session_id)
    }

    #[must_use]
    pub fn is_loaded(&self, session_id: &str) -> bool {
        self.short_term.contains_key(session_id)
    }

    /// Rebuild a session's queue from the last entries of the long-term log.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the read fails; the previous queue is kept.
    pub async fn hydrate(&mut self, session_id: &str) -> Result<usize, DatabaseError> {
        let recent = self
            .service
            .recent_memory(session_id, self.max_short_term)
            .await?;
        let total = self.service.count_memory(session_id).await?;

        let loaded = recent.len();
        if usize::try_from(total).unwrap_or(usize::MAX) > loaded {
            self.trimmed.insert(session_id.to_string());
        }
        self.short_term
            .insert(session_id.to_string(), recent.into_iter().collect());
        Ok(loaded)
    }

    /// Full long-term log of a session, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the read fails.
    pub async fn long_term(&self, session_id: &str) -> Result<Vec<MemoryEntry>, DatabaseError> {
        self.service.list_memory(session_id).await
    }

    /// Delete long-term entries stored before `older_than` and drop the same
    /// entries from every short-term queue. Returns how many were deleted.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the delete fails; queues are untouched then.
    pub async fn cleanup(&mut self, older_than: &DateTime<Utc>) -> Result<usize, DatabaseError> {
        let deleted = self.service.delete_memory_before(older_than).await?;
        let ids: HashSet<&str> = deleted.iter().map(|d| d.id.as_str()).collect();
        for removed in &deleted {
            if let Some(queue) = self.short_term.get_mut(&removed.session_id) {
                queue.retain(|entry| !ids.contains(entry.id.as_str()));
            }
        }
        Ok(deleted.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medi_core::enums::{Priority, QueryType, ResponseSource};
    use pretty_assertions::assert_eq;

    async fn service() -> Arc<MediService> {
        Arc::new(MediService::new_local(":memory:").await.unwrap())
    }

    async fn exchange(
        svc: &MediService,
        session_id: &str,
        text: &str,
    ) -> (QueryRecord, ResponseRecord) {
        let query = svc
            .insert_query(session_id, text, QueryType::ClinicalQuestion, Priority::Medium)
            .await
            .unwrap();
        let response = ResponseRecord {
            query_id: query.id.clone(),
            text: format!("answer: {text}"),
            confidence: 0.9,
            source: ResponseSource::Mock,
            generated_at: Utc::now(),
        };
        svc.insert_response(&response).await.unwrap();
        (query, response)
    }

    async fn session(svc: &MediService) -> String {
        svc.create_session("dr-mem", "proj-mem", "asthma")
            .await
            .unwrap()
            .id
    }

    fn assert_suffix(short: &[MemoryEntry], long: &[MemoryEntry]) {
        assert!(short.len() <= long.len());
        assert_eq!(short, &long[long.len() - short.len()..]);
    }

    #[tokio::test]
    async fn queue_is_bounded_suffix() {
        let svc = service().await;
        let ses = session(&svc).await;
        let mut memory = MemoryManager::new(Arc::clone(&svc), 3);

        for i in 0..5 {
            let (q, r) = exchange(&svc, &ses, &format!("question {i}")).await;
            memory.add(&ses, &q, &r).await.unwrap();
            assert!(memory.short_term_len(&ses) <= 3);
            let long = memory.long_term(&ses).await.unwrap();
            assert_suffix(&memory.get_context(&ses, usize::MAX), &long);
        }

        assert!(memory.was_trimmed(&ses));
        let context = memory.get_context(&ses, 2);
        assert_eq!(context.len(), 2);
        assert_eq!(context[1].query_text, "question 4");
    }

    #[tokio::test]
    async fn failed_append_leaves_queue_alone() {
        let svc = service().await;
        let ses = session(&svc).await;
        let mut memory = MemoryManager::new(Arc::clone(&svc), 3);
        let (q, r) = exchange(&svc, &ses, "only once").await;
        memory.add(&ses, &q, &r).await.unwrap();

        assert!(memory.add(&ses, &q, &r).await.is_err());
        assert_eq!(memory.short_term_len(&ses), 1);
    }

    #[tokio::test]
    async fn add_rejects_foreign_query() {
        let svc = service().await;
        let ses = session(&svc).await;
        let other = session(&svc).await;
        let mut memory = MemoryManager::new(Arc::clone(&svc), 3);
        let (q, r) = exchange(&svc, &ses, "whose query").await;

        let err = memory.add(&other, &q, &r).await.unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidState(_)));
        assert_eq!(memory.long_term(&other).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn hydrate_restores_recent_entries() {
        let svc = service().await;
        let ses = session(&svc).await;
        {
            let mut writer = MemoryManager::new(Arc::clone(&svc), 10);
            for i in 0..4 {
                let (q, r) = exchange(&svc, &ses, &format!("q{i}")).await;
                writer.add(&ses, &q, &r).await.unwrap();
            }
        }

        let mut reader = MemoryManager::new(Arc::clone(&svc), 2);
        assert!(!reader.is_loaded(&ses));
        assert_eq!(reader.hydrate(&ses).await.unwrap(), 2);
        assert!(reader.was_trimmed(&ses));
        let long = reader.long_term(&ses).await.unwrap();
        assert_suffix(&reader.get_context(&ses, 10), &long);
    }

    #[tokio::test]
    async fn cleanup_prunes_both_tiers() {
        let svc = service().await;
        let ses = session(&svc).await;
        let mut memory = MemoryManager::new(Arc::clone(&svc), 5);
        for i in 0..3 {
            let (q, r) = exchange(&svc, &ses, &format!("old {i}")).await;
            memory.add(&ses, &q, &r).await.unwrap();
        }

        let cutoff = Utc::now() + chrono::Duration::seconds(1);
        assert_eq!(memory.cleanup(&cutoff).await.unwrap(), 3);
        assert_eq!(memory.short_term_len(&ses), 0);
        assert!(memory.long_term(&ses).await.unwrap().is_empty());

        assert_eq!(memory.cleanup(&cutoff).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn cleanup_keeps_recent_entries() {
        let svc = service().await;
        let ses = session(&svc).await;
        let mut memory = MemoryManager::new(Arc::clone(&svc), 5);
        let (q, r) = exchange(&svc, &ses, "fresh").await;
        memory.add(&ses, &q, &r).await.unwrap();

        let cutoff = Utc::now() - chrono::Duration::days(30);
        assert_eq!(memory.cleanup(&cutoff).await.unwrap(), 0);
        assert_eq!(memory.short_term_len(&ses), 1);
    }
}
