//! Catalog session registry
//!
//! Each storefront view gets its own [`SearchCache`], keyed by a
//! client-chosen session id. Locks are never held across a store fetch.

use super::cache::SearchCache;
use super::engine::{self, ProductSource};
use dashmap::DashMap;
use parking_lot::Mutex;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::ProductStatus;
use shared::query::{CatalogPage, SortOrder};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

const MAX_SESSION_ID_LEN: usize = 128;

/// Live sessions kept before the least recently used one is evicted
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

struct Session {
    cache: Mutex<SearchCache>,
    touched: Mutex<Instant>,
}

impl Session {
    fn touch(&self) {
        *self.touched.lock() = Instant::now();
    }
}

pub struct CatalogSessions {
    sessions: DashMap<String, Arc<Session>>,
    page_size: usize,
    ttl: Duration,
    max_sessions: usize,
}

impl CatalogSessions {
    pub fn new(page_size: usize, ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            page_size,
            ttl,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }

    /// Override the session cap (at least 1)
    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions.max(1);
        self
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn get(&self, sid: &str) -> AppResult<Arc<Session>> {
        let session = self
            .sessions
            .get(sid)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::with_message(ErrorCode::CatalogSessionNotFound, format!("Catalog session {sid} not found")))?;
        session.touch();
        Ok(session)
    }

    fn get_or_create(&self, sid: &str) -> AppResult<Arc<Session>> {
        if sid.is_empty() || sid.len() > MAX_SESSION_ID_LEN {
            return Err(AppError::validation("Invalid catalog session id"));
        }
        if !self.sessions.contains_key(sid) && self.sessions.len() >= self.max_sessions {
            self.evict_least_recent();
        }
        let session = self
            .sessions
            .entry(sid.to_string())
            .or_insert_with(|| {
                Arc::new(Session {
                    cache: Mutex::new(SearchCache::new(self.page_size)),
                    touched: Mutex::new(Instant::now()),
                })
            })
            .value()
            .clone();
        session.touch();
        Ok(session)
    }

    /// Run a text search for the session and return the first page
    pub async fn search<S>(&self, sid: &str, source: &S, term: &str) -> AppResult<CatalogPage>
    where
        S: ProductSource + ?Sized,
    {
        let session = self.get_or_create(sid)?;
        let ticket = session.cache.lock().begin_search(term);
        let outcome = engine::search(source, ticket.request()).await?;
        session
            .cache
            .lock()
            .complete_search(ticket, outcome)
            .ok_or_else(|| AppError::new(ErrorCode::SearchSuperseded))
    }

    pub fn load_more(&self, sid: &str) -> AppResult<CatalogPage> {
        self.get(sid)?
            .cache
            .lock()
            .load_more()
            .ok_or_else(|| AppError::invalid_request("No active search in this session"))
    }

    /// `None` when the session holds no search yet; the selection is kept
    pub fn set_category(&self, sid: &str, category_id: Option<i64>) -> AppResult<Option<CatalogPage>> {
        Ok(self.get_or_create(sid)?.cache.lock().set_category(category_id))
    }

    pub fn set_sort(&self, sid: &str, sort: SortOrder) -> AppResult<Option<CatalogPage>> {
        Ok(self.get_or_create(sid)?.cache.lock().set_sort(sort))
    }

    /// Change the status filter, re-running the active search if any
    pub async fn set_status<S>(
        &self,
        sid: &str,
        source: &S,
        status: Option<ProductStatus>,
    ) -> AppResult<Option<CatalogPage>>
    where
        S: ProductSource + ?Sized,
    {
        let session = self.get_or_create(sid)?;
        let Some(ticket) = session.cache.lock().set_status(status) else {
            return Ok(None);
        };
        let outcome = engine::search(source, ticket.request()).await?;
        session
            .cache
            .lock()
            .complete_search(ticket, outcome)
            .map(Some)
            .ok_or_else(|| AppError::new(ErrorCode::SearchSuperseded))
    }

    /// Drop the session and everything it cached
    pub fn clear(&self, sid: &str) -> bool {
        match self.sessions.remove(sid) {
            Some((_, session)) => {
                session.cache.lock().clear_search();
                true
            }
            None => false,
        }
    }

    fn evict_least_recent(&self) {
        let oldest = self
            .sessions
            .iter()
            .min_by_key(|entry| *entry.value().touched.lock())
            .map(|entry| entry.key().clone());
        if let Some(sid) = oldest {
            self.sessions.remove(&sid);
            tracing::debug!(session = %sid, limit = self.max_sessions, "Catalog session evicted");
        }
    }

    /// Remove sessions idle for longer than the TTL
    pub fn sweep_expired(&self) -> usize {
        let before = self.sessions.len();
        let ttl = self.ttl;
        self.sessions.retain(|_, s| s.touched.lock().elapsed() < ttl);
        before.saturating_sub(self.sessions.len())
    }

    /// Periodic sweep on the runtime
    pub fn spawn_sweeper(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let removed = self.sweep_expired();
                if removed > 0 {
                    tracing::debug!(removed, remaining = self.len(), "Expired catalog sessions swept");
                }
            }
        })
    }
}
