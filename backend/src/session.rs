//! Per-user dashboard state.
//!
//! A [`Session`] owns the cleaned tables of the last successful upload, the
//! filters currently applied, and the snapshot they produce. Uploads and
//! filter changes each swap in a new snapshot; a failed upload leaves the
//! session as it was.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::api::logs;
use crate::clean::{clean_files, BatchReport, FileSummary, UploadedFile};
use crate::config::{DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_IDLE_MINUTES};
use crate::dashboard::{recompute, DashboardSnapshot, Filters};
use crate::error::PipelineResult;
use crate::models::CleanedTables;

#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    tables: Arc<CleanedTables>,
    filters: Filters,
    snapshot: Arc<DashboardSnapshot>,
}

/// What an upload changed.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub files: Vec<FileSummary>,
    pub ignored: Vec<String>,
    pub snapshot: Arc<DashboardSnapshot>,
}

impl Session {
    /// Empty session with a fresh id.
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    /// Empty session under an id chosen by the caller.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self::with_tables(id.into(), CleanedTables::default())
    }

    fn with_tables(id: String, tables: CleanedTables) -> Self {
        let filters = Filters::default();
        let snapshot = Arc::new(recompute(&tables, &filters));
        Self {
            id,
            tables: Arc::new(tables),
            filters,
            snapshot,
        }
    }

    pub fn tables(&self) -> &CleanedTables {
        &self.tables
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn snapshot(&self) -> Arc<DashboardSnapshot> {
        Arc::clone(&self.snapshot)
    }

    /// Clean a new batch, replace the tables and reset the filters.
    ///
    /// Pipeline logs emitted meanwhile are tagged with the session id.
    pub fn on_upload(&mut self, files: &[UploadedFile]) -> PipelineResult<UploadOutcome> {
        let BatchReport {
            tables,
            files,
            ignored,
        } = logs::scoped(&self.id, || clean_files(files))?;

        self.filters = Filters::default();
        self.snapshot = Arc::new(recompute(&tables, &self.filters));
        self.tables = Arc::new(tables);

        Ok(UploadOutcome {
            files,
            ignored,
            snapshot: self.snapshot(),
        })
    }

    /// Apply new filters to the current tables.
    pub fn on_filter_change(&mut self, filters: Filters) -> Arc<DashboardSnapshot> {
        self.snapshot = Arc::new(recompute(&self.tables, &filters));
        self.filters = filters;
        self.snapshot()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
struct Entry {
    session: Session,
    last_access: Instant,
}

/// In-memory sessions.
///
/// A session idle for longer than `idle` is dropped on the next store
/// access. Past `max_sessions`, inserting drops the least recently used one.
#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, Entry>>>,
    idle: Duration,
    max_sessions: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_limits(
            Duration::from_secs(DEFAULT_SESSION_IDLE_MINUTES * 60),
            DEFAULT_MAX_SESSIONS,
        )
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(idle: Duration, max_sessions: usize) -> Self {
        Self {
            inner: Arc::default(),
            idle,
            max_sessions: max_sessions.max(1),
        }
    }

    /// Store `session`, replacing any session with the same id.
    pub async fn insert(&self, session: Session) {
        let now = Instant::now();
        let mut map = self.inner.write().await;
        evict_idle(&mut map, self.idle, now);

        if !map.contains_key(&session.id) {
            while map.len() >= self.max_sessions {
                let oldest = map
                    .iter()
                    .min_by_key(|(_, e)| e.last_access)
                    .map(|(id, _)| id.clone());
                match oldest {
                    Some(id) => map.remove(&id),
                    None => break,
                };
            }
        }

        map.insert(
            session.id.clone(),
            Entry {
                session,
                last_access: now,
            },
        );
    }

    /// Copy of the session with `id`, if any.
    pub async fn get(&self, id: &str) -> Option<Session> {
        self.update(id, |s| s.clone()).await
    }

    pub async fn snapshot(&self, id: &str) -> Option<Arc<DashboardSnapshot>> {
        self.update(id, |s| s.snapshot()).await
    }

    /// Run `f` on the session with `id`, if any.
    pub async fn update<T>(&self, id: &str, f: impl FnOnce(&mut Session) -> T) -> Option<T> {
        let now = Instant::now();
        let mut map = self.inner.write().await;
        evict_idle(&mut map, self.idle, now);
        map.get_mut(id).map(|entry| {
            entry.last_access = now;
            f(&mut entry.session)
        })
    }

    pub async fn remove(&self, id: &str) -> bool {
        self.inner.write().await.remove(id).is_some()
    }

    pub async fn count(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Drop every session idle at `now`; returns how many went.
    pub async fn evict_idle_at(&self, now: Instant) -> usize {
        evict_idle(&mut *self.inner.write().await, self.idle, now)
    }
}

fn evict_idle(map: &mut HashMap<String, Entry>, idle: Duration, now: Instant) -> usize {
    let before = map.len();
    map.retain(|_, e| now.saturating_duration_since(e.last_access) <= idle);
    before - map.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::TryRecvError;

    const LEADS: &str = "mql_id,first_contact_date,landing_page_id,origin\n\
                         1,2021-01-01,lp1,ads\n\
                         2,2021-01-03,lp2,social";

    const DEALS: &str = "mql_id,seller_id,sdr_id,sr_id,won_date,business_segment,lead_type,\
lead_behaviour_profile,has_company,has_gtin,average_stock,business_type,declared_product_catalog_size\n\
                         1,s1,d1,r1,2021-01-10,retail,online_big,cat,,,,reseller,\n\
                         2,s2,d2,r2,2021-01-13,pet,offline,wolf,,,,reseller,";

    fn batch() -> Vec<UploadedFile> {
        vec![
            UploadedFile::new("leads.csv", LEADS.as_bytes().to_vec()),
            UploadedFile::new("deals.csv", DEALS.as_bytes().to_vec()),
        ]
    }

    #[test]
    fn test_new_session_is_empty() {
        let session = Session::new();
        assert!(session.tables().is_empty());
        assert_eq!(session.snapshot().kpis.total_mqls, 0);
        assert!(Uuid::parse_str(&session.id).is_ok());
    }

    #[test]
    fn test_upload_then_filter() {
        let mut session = Session::new();
        let outcome = session.on_upload(&batch()).unwrap();
        assert_eq!(outcome.snapshot.kpis.closed_deals, 2);
        assert!(outcome.ignored.is_empty());

        let snap = session.on_filter_change(Filters {
            segments: Some(vec!["pet".into()]),
            ..Filters::default()
        });
        assert_eq!(snap.kpis.closed_deals, 1);
        assert_eq!(session.filters().segments, Some(vec!["pet".into()]));
        // the earlier snapshot is untouched
        assert_eq!(outcome.snapshot.kpis.closed_deals, 2);
    }

    #[test]
    fn test_upload_resets_filters() {
        let mut session = Session::new();
        session.on_upload(&batch()).unwrap();
        session.on_filter_change(Filters {
            segments: Some(vec![]),
            ..Filters::default()
        });
        session.on_upload(&batch()).unwrap();
        assert_eq!(session.filters(), &Filters::default());
        assert_eq!(session.snapshot().kpis.closed_deals, 2);
    }

    #[test]
    fn test_failed_upload_keeps_state() {
        let mut session = Session::new();
        session.on_upload(&batch()).unwrap();
        let before = session.snapshot();

        let bad = UploadedFile::new(
            "bad.csv",
            b"mql_id,first_contact_date,origin\n1,not a date,ads".to_vec(),
        );
        assert!(session.on_upload(&[bad]).is_err());
        assert_eq!(session.snapshot(), before);
        assert_eq!(session.tables().mql.as_ref().map(|t| t.len()), Some(2));
    }

    #[tokio::test]
    async fn test_store_roundtrip() {
        let store = SessionStore::new();
        let session = Session::new();
        let id = session.id.clone();
        store.insert(session).await;

        assert!(store.snapshot(&id).await.is_some());
        let counted = store
            .update(&id, |s| s.on_filter_change(Filters::default()).kpis.total_mqls)
            .await;
        assert_eq!(counted, Some(0));
        assert!(store.update("missing", |_| ()).await.is_none());
        assert!(store.remove(&id).await);
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn test_store_caps_sessions() {
        let store = SessionStore::with_limits(Duration::from_secs(600), 3);
        let first = Session::new();
        let first_id = first.id.clone();
        store.insert(first).await;
        for _ in 0..1000 {
            store.insert(Session::new()).await;
        }
        assert_eq!(store.count().await, 3);
        assert!(store.get(&first_id).await.is_none());
    }

    #[tokio::test]
    async fn test_store_keeps_recently_used() {
        let store = SessionStore::with_limits(Duration::from_secs(600), 2);
        let a = Session::new();
        let b = Session::new();
        let (a_id, b_id) = (a.id.clone(), b.id.clone());
        store.insert(a).await;
        store.insert(b).await;

        // touching `a` makes `b` the least recently used
        assert!(store.snapshot(&a_id).await.is_some());
        store.insert(Session::new()).await;

        assert!(store.get(&a_id).await.is_some());
        assert!(store.get(&b_id).await.is_none());
    }

    #[tokio::test]
    async fn test_store_evicts_idle_sessions() {
        let idle = Duration::from_secs(60);
        let store = SessionStore::with_limits(idle, 10);
        let session = Session::new();
        let id = session.id.clone();
        store.insert(session).await;

        assert_eq!(store.evict_idle_at(Instant::now()).await, 0);
        let later = Instant::now() + idle + Duration::from_secs(1);
        assert_eq!(store.evict_idle_at(later).await, 1);
        assert!(store.get(&id).await.is_none());
    }

    #[tokio::test]
    async fn test_reinsert_replaces_same_id() {
        let store = SessionStore::with_limits(Duration::from_secs(600), 1);
        let mut session = Session::with_id("fixed");
        store.insert(session.clone()).await;
        session.on_upload(&batch()).unwrap();
        store.insert(session).await;

        assert_eq!(store.count().await, 1);
        let snap = store.snapshot("fixed").await.unwrap();
        assert_eq!(snap.kpis.closed_deals, 2);
    }

    #[test]
    fn test_upload_logs_carry_session_id() {
        let mut rx = logs::LOG_BROADCASTER.subscribe();
        let mut session = Session::with_id("tagged-upload");
        session.on_upload(&batch()).unwrap();

        let mut tagged = 0;
        loop {
            match rx.try_recv() {
                Ok(entry) if entry.session.as_deref() == Some("tagged-upload") => tagged += 1,
                Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
        assert!(tagged > 0);
    }
}
