//! Optimistic query cache for the user list.
//!
//! `UserCache` holds the last known list of users and applies every mutation
//! locally before the directory confirms it. Remote calls run on spawned
//! tasks; their results come back through an MPSC channel and are applied
//! when the owner drains it with `process_completions` (once per UI tick) or
//! awaits `next_event`.
//!
//! The visible list is always the confirmed `base` with the log of
//! unconfirmed edits folded on top. A rejected mutation drops its own edit and
//! nothing else, which for a single mutation in flight is exactly restoring
//! the snapshot taken before it.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::{AbortHandle, Abortable};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::api::{DirectoryClient, TransportError};
use crate::models::{User, UserDraft, UserId};

use super::age::age_display;
use super::transform::{fold, Edit, Mutation, MutationKind};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the completion channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Number of settled tickets whose status is remembered.
const MAX_SETTLED_HISTORY: usize = 64;

/// Immutable view of the cached list, shared with whoever asked for it.
pub type Snapshot = Arc<Vec<User>>;

/// Handle identifying one mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a mutation stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationStatus {
    /// Applied locally, request in flight
    Pending,
    /// Accepted by the directory; the local edit stays as it is
    Applied,
    /// Rejected by the directory; the local edit was undone
    RolledBack,
}

/// State of the list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryStatus {
    /// Nothing requested yet
    Idle,
    /// First read in flight
    Loading,
    /// Data present
    Ready,
    /// First read failed
    Failed(String),
}

#[derive(Debug, Clone, Default)]
pub struct CacheOptions {
    /// Refetch the list whenever the last pending mutation settles.
    pub refetch_on_settle: bool,
}

/// Something the owner may want to show after completions are processed.
#[derive(Debug)]
pub enum CacheEvent {
    Loaded {
        count: usize,
    },
    LoadFailed {
        message: String,
        /// True when there was no data yet
        initial: bool,
    },
    Settled {
        ticket: Ticket,
        kind: MutationKind,
        status: MutationStatus,
        /// Record returned by the directory for create/update
        reply: Option<User>,
    },
}

/// Results sent back from spawned requests.
enum Completion {
    Listed {
        generation: u64,
        result: Result<Vec<User>, TransportError>,
    },
    Mutated {
        ticket: Ticket,
        result: Result<Option<User>, TransportError>,
    },
}

struct PendingEdit {
    ticket: Ticket,
    kind: MutationKind,
    edit: Edit,
    status: MutationStatus,
}

pub struct UserCache {
    client: Arc<dyn DirectoryClient>,
    options: CacheOptions,
    status: QueryStatus,

    /// Last list confirmed by the directory plus every edit it accepted
    base: Snapshot,
    /// `base` with `edits` folded on top
    current: Snapshot,
    /// Edits not yet folded into `base`, in the order they were made
    edits: Vec<PendingEdit>,

    fetched_at: Option<DateTime<Utc>>,
    read_generation: u64,
    in_flight_read: Option<AbortHandle>,
    refetch_queued: bool,

    next_ticket: u64,
    settled: VecDeque<(Ticket, MutationStatus)>,

    tx: mpsc::Sender<Completion>,
    rx: mpsc::Receiver<Completion>,
}

impl UserCache {
    pub fn new(client: Arc<dyn DirectoryClient>, options: CacheOptions) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let empty: Snapshot = Arc::new(Vec::new());

        Self {
            client,
            options,
            status: QueryStatus::Idle,
            base: Arc::clone(&empty),
            current: empty,
            edits: Vec::new(),
            fetched_at: None,
            read_generation: 0,
            in_flight_read: None,
            refetch_queued: false,
            next_ticket: 1,
            settled: VecDeque::new(),
            tx,
            rx,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn status(&self) -> &QueryStatus {
        &self.status
    }

    pub fn users(&self) -> &[User] {
        &self.current
    }

    /// Shared reference to the current list; later mutations never change it.
    pub fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.current)
    }

    pub fn find(&self, id: UserId) -> Option<&User> {
        self.current.iter().find(|u| u.id == id)
    }

    pub fn is_reading(&self) -> bool {
        self.in_flight_read.is_some()
    }

    /// Number of mutations still waiting for the directory
    pub fn pending_count(&self) -> usize {
        self.edits
            .iter()
            .filter(|p| p.status == MutationStatus::Pending)
            .count()
    }

    pub fn mutation_status(&self, ticket: Ticket) -> Option<MutationStatus> {
        if let Some(pending) = self.edits.iter().find(|p| p.ticket == ticket) {
            return Some(pending.status);
        }
        self.settled
            .iter()
            .find(|(t, _)| *t == ticket)
            .map(|(_, status)| *status)
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    /// Age of the last successful read, for status bars
    pub fn age_display(&self) -> Option<String> {
        self.fetched_at.map(|at| age_display(at, Utc::now()))
    }

    fn has_outstanding_work(&self) -> bool {
        self.in_flight_read.is_some() || self.pending_count() > 0
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Fetch the list from the directory.
    ///
    /// While mutations are pending the read is queued until they settle, so a
    /// response that predates them cannot replace the optimistic list.
    pub fn fetch(&mut self) {
        if !self.edits.is_empty() {
            debug!(pending = self.edits.len(), "Deferring list read until mutations settle");
            self.refetch_queued = true;
            return;
        }
        self.start_read();
    }

    fn start_read(&mut self) {
        self.cancel_read();
        self.read_generation += 1;
        let generation = self.read_generation;

        if self.fetched_at.is_none() {
            self.status = QueryStatus::Loading;
        }

        let (handle, registration) = AbortHandle::new_pair();
        self.in_flight_read = Some(handle);

        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();

        debug!(generation, "Starting list read");
        tokio::spawn(async move {
            let read = Abortable::new(async move { client.list().await }, registration);
            match read.await {
                Ok(result) => Self::send(&tx, Completion::Listed { generation, result }).await,
                Err(_) => debug!(generation, "List read cancelled"),
            }
        });
    }

    /// Abort the in-flight read, if any. Returns true if one was cancelled.
    fn cancel_read(&mut self) -> bool {
        match self.in_flight_read.take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    pub fn create(&mut self, draft: UserDraft) -> Ticket {
        self.mutate(Mutation::Create(draft))
    }

    pub fn update(&mut self, user: User) -> Ticket {
        self.mutate(Mutation::Update(user))
    }

    pub fn delete(&mut self, id: UserId) -> Ticket {
        self.mutate(Mutation::Delete(id))
    }

    /// Apply `mutation` locally right away and send it to the directory.
    pub fn mutate(&mut self, mutation: Mutation) -> Ticket {
        // A read still in flight could land after the edit and overwrite it
        if self.cancel_read() {
            debug!("Cancelled in-flight list read for mutation");
            self.refetch_queued = true;
        }
        // Also invalidates a read completion already sitting in the channel
        self.read_generation += 1;

        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;

        let kind = mutation.kind();
        let edit = mutation.speculate(&self.current);
        self.current = Arc::new(edit.apply(&self.current));
        self.edits.push(PendingEdit {
            ticket,
            kind,
            edit,
            status: MutationStatus::Pending,
        });
        info!(%ticket, kind = kind.verb(), "Applied optimistic edit");

        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = match mutation {
                Mutation::Create(draft) => client.create(&draft).await.map(Some),
                Mutation::Update(user) => client.update(&user).await.map(Some),
                Mutation::Delete(id) => client.delete(id).await.map(|_| None),
            };
            Self::send(&tx, Completion::Mutated { ticket, result }).await;
        });

        ticket
    }

    // =========================================================================
    // Completions
    // =========================================================================

    /// Helper to send completions, logging any channel errors
    async fn send(tx: &mpsc::Sender<Completion>, completion: Completion) {
        if let Err(e) = tx.send(completion).await {
            error!(error = %e, "Failed to send completion - channel closed");
        }
    }

    /// Apply every completion that has already arrived.
    pub fn process_completions(&mut self) -> Vec<CacheEvent> {
        let mut completions = Vec::new();
        while let Ok(completion) = self.rx.try_recv() {
            completions.push(completion);
        }

        completions
            .into_iter()
            .filter_map(|c| self.handle(c))
            .collect()
    }

    /// Wait for the next completion that produces an event.
    ///
    /// Returns `None` once nothing is in flight.
    pub async fn next_event(&mut self) -> Option<CacheEvent> {
        while self.has_outstanding_work() {
            let completion = self.rx.recv().await?;
            if let Some(event) = self.handle(completion) {
                return Some(event);
            }
        }
        None
    }

    /// Wait until every read and mutation in flight has completed.
    pub async fn settle_all(&mut self) -> Vec<CacheEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.next_event().await {
            events.push(event);
        }
        events
    }

    fn handle(&mut self, completion: Completion) -> Option<CacheEvent> {
        match completion {
            Completion::Listed { generation, result } => self.handle_listed(generation, result),
            Completion::Mutated { ticket, result } => self.handle_mutated(ticket, result),
        }
    }

    fn handle_listed(
        &mut self,
        generation: u64,
        result: Result<Vec<User>, TransportError>,
    ) -> Option<CacheEvent> {
        if generation != self.read_generation {
            debug!(generation, current = self.read_generation, "Discarding stale list read");
            return None;
        }
        self.in_flight_read = None;

        match result {
            Ok(users) => {
                let count = users.len();
                self.base = Arc::new(users);
                self.recompute();
                self.status = QueryStatus::Ready;
                self.fetched_at = Some(Utc::now());
                info!(count, "User list loaded");
                Some(CacheEvent::Loaded { count })
            }
            Err(e) => {
                let message = e.to_string();
                let initial = self.fetched_at.is_none();
                if initial {
                    error!(error = %e, "Initial user list fetch failed");
                    self.status = QueryStatus::Failed(message.clone());
                } else {
                    warn!(error = %e, "User list refetch failed, keeping cached data");
                }
                Some(CacheEvent::LoadFailed { message, initial })
            }
        }
    }

    fn handle_mutated(
        &mut self,
        ticket: Ticket,
        result: Result<Option<User>, TransportError>,
    ) -> Option<CacheEvent> {
        let Some(kind) = self
            .edits
            .iter()
            .find(|p| p.ticket == ticket && p.status == MutationStatus::Pending)
            .map(|p| p.kind)
        else {
            debug!(%ticket, "Ignoring completion for settled mutation");
            return None;
        };

        let (status, reply) = match result {
            Ok(reply) => {
                self.confirm(ticket);
                if let Some(ref user) = reply {
                    // The local record keeps its id; only a refetch replaces it
                    debug!(%ticket, server_id = %user.id, "Directory accepted mutation");
                } else {
                    debug!(%ticket, "Directory accepted mutation");
                }
                (MutationStatus::Applied, reply)
            }
            Err(e) => {
                warn!(%ticket, kind = kind.verb(), error = %e, "Mutation rejected, rolling back");
                self.roll_back(ticket);
                (MutationStatus::RolledBack, None)
            }
        };

        self.remember(ticket, status);
        self.after_settle();

        Some(CacheEvent::Settled {
            ticket,
            kind,
            status,
            reply,
        })
    }

    /// Mark an edit as accepted and fold every accepted edit at the front of
    /// the log into `base`.
    fn confirm(&mut self, ticket: Ticket) {
        if let Some(pending) = self.edits.iter_mut().find(|p| p.ticket == ticket) {
            pending.status = MutationStatus::Applied;
        }
        self.compact();
    }

    /// Undo one pending edit. Returns false if the ticket is not pending,
    /// which makes a second rollback a no-op.
    fn roll_back(&mut self, ticket: Ticket) -> bool {
        let Some(index) = self
            .edits
            .iter()
            .position(|p| p.ticket == ticket && p.status == MutationStatus::Pending)
        else {
            return false;
        };

        self.edits.remove(index);
        self.recompute();
        // Accepted edits may now be at the front
        self.compact();
        true
    }

    fn compact(&mut self) {
        while self
            .edits
            .first()
            .is_some_and(|p| p.status == MutationStatus::Applied)
        {
            let accepted = self.edits.remove(0);
            self.base = Arc::new(accepted.edit.apply(&self.base));
        }
        if self.edits.is_empty() {
            self.base = Arc::clone(&self.current);
        }
    }

    fn recompute(&mut self) {
        if self.edits.is_empty() {
            self.current = Arc::clone(&self.base);
        } else {
            self.current = Arc::new(fold(&self.base, self.edits.iter().map(|p| &p.edit)));
        }
    }

    fn remember(&mut self, ticket: Ticket, status: MutationStatus) {
        if self.settled.len() >= MAX_SETTLED_HISTORY {
            self.settled.pop_front();
        }
        self.settled.push_back((ticket, status));
    }

    fn after_settle(&mut self) {
        if !self.edits.is_empty() {
            return;
        }
        if self.refetch_queued || self.options.refetch_on_settle {
            self.refetch_queued = false;
            self.start_read();
        }
    }
}
