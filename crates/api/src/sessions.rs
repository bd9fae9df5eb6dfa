//! Open dashboard views and their pagination state.
//!
//! Each view lives behind its own async mutex. An interaction holds that
//! mutex from applying the event until the rendered panel is stored, so
//! interactions on one view are handled strictly in order and a slow query
//! can never overwrite the result of a later one. Different views never
//! contend with each other.
//!
//! The event is applied to a copy of the pagination state, which replaces
//! the stored state together with the rendered panel. An interaction that is
//! abandoned mid-query leaves the view exactly as it was.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tenantwatch_core::error::CoreError;
use tenantwatch_core::query::ActivityFilter;
use tenantwatch_core::view::{Panel, ViewEvent, ViewKind, ViewState};
use tenantwatch_db::ActivityGateway;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::activity::{ActivityService, PanelView};

/// One open view: pagination state plus the last rendered panels.
pub struct ViewSession {
    state: ViewState,
    master: Option<PanelView>,
    detail: Option<PanelView>,
    last_used: Instant,
}

impl ViewSession {
    fn new(kind: ViewKind) -> Self {
        Self {
            state: ViewState::new(kind),
            master: None,
            detail: None,
            last_used: Instant::now(),
        }
    }

    fn store(&mut self, view: PanelView) {
        match view.panel {
            Panel::Master => {
                if view.error.is_some() {
                    self.state.clear_master_rows();
                } else {
                    self.state.record_master_rows(view.tenant_ids());
                }
                if self.state.detail_tenant().is_none() {
                    self.detail = None;
                }
                self.master = Some(view);
            }
            Panel::Detail => self.detail = Some(view),
        }
    }

    fn snapshot(&self, view_id: Uuid) -> ViewSnapshot {
        ViewSnapshot {
            view_id,
            kind: self.state.kind(),
            filter: self.state.filter().clone(),
            master: self.master.clone(),
            detail: self.detail.clone(),
        }
    }
}

/// What a client sees of a view after an interaction.
#[derive(Debug, Clone, Serialize)]
pub struct ViewSnapshot {
    pub view_id: Uuid,
    pub kind: ViewKind,
    pub filter: ActivityFilter,
    pub master: Option<PanelView>,
    pub detail: Option<PanelView>,
}

/// All open views, keyed by view id.
#[derive(Default)]
pub struct ViewSessionStore {
    sessions: RwLock<HashMap<Uuid, Arc<Mutex<ViewSession>>>>,
}

impl ViewSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a view of `kind` and render its first master page.
    pub async fn open<G: ActivityGateway>(
        &self,
        kind: ViewKind,
        service: &ActivityService<G>,
    ) -> ViewSnapshot {
        let view_id = Uuid::new_v4();
        let mut session = ViewSession::new(kind);
        let view = service.render(&session.state.master_query()).await;
        session.store(view);
        let snapshot = session.snapshot(view_id);

        self.sessions
            .write()
            .await
            .insert(view_id, Arc::new(Mutex::new(session)));
        tracing::info!(%view_id, ?kind, "View opened");
        snapshot
    }

    /// Current snapshot of a view, without querying.
    pub async fn snapshot(&self, view_id: Uuid) -> Result<ViewSnapshot, CoreError> {
        let session = self.get(view_id).await?;
        let session = session.lock().await;
        Ok(session.snapshot(view_id))
    }

    /// Apply `event` to a view, run the query it triggers and store the result.
    ///
    /// A rejected or abandoned event leaves the view untouched.
    pub async fn dispatch<G: ActivityGateway>(
        &self,
        view_id: Uuid,
        event: &ViewEvent,
        service: &ActivityService<G>,
    ) -> Result<ViewSnapshot, CoreError> {
        let session = self.get(view_id).await?;
        let mut session = session.lock().await;
        session.last_used = Instant::now();

        let mut next = session.state.clone();
        let plan = next.apply(event)?;
        tracing::debug!(%view_id, ?event, query = plan.shape.label(), "View event applied");

        let view = service.render(&plan).await;
        session.state = next;
        session.store(view);
        Ok(session.snapshot(view_id))
    }

    /// Close a view.
    pub async fn close(&self, view_id: Uuid) -> Result<(), CoreError> {
        match self.sessions.write().await.remove(&view_id) {
            Some(_) => {
                tracing::info!(%view_id, "View closed");
                Ok(())
            }
            None => Err(not_found(view_id)),
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop views unused for at least `max_idle`. Views busy with an
    /// interaction are skipped. Returns the number of views dropped.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| match session.try_lock() {
            Ok(s) => s.last_used.elapsed() < max_idle,
            Err(_) => true,
        });
        before - sessions.len()
    }

    async fn get(&self, view_id: Uuid) -> Result<Arc<Mutex<ViewSession>>, CoreError> {
        self.sessions
            .read()
            .await
            .get(&view_id)
            .cloned()
            .ok_or_else(|| not_found(view_id))
    }
}

fn not_found(view_id: Uuid) -> CoreError {
    CoreError::NotFound {
        entity: "View",
        id: view_id.to_string(),
    }
}
