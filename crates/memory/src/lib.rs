//! Context memory manager: per-user turn logs and rolling summaries.
//!
//! The manager exclusively owns [`TurnRecord`]s and [`ContextSummary`]s.
//! Turn logs are append-only and FIFO-capped; writes are idempotent by
//! turn id so concurrent turns for the same user never duplicate or
//! lose a record. Summaries update incrementally on each write and are
//! fully recomputed on cold start or when older than the staleness
//! window (reads may see a slightly stale snapshot inside that window).
//!
//! Crisis events are tracked apart from the general turn log because
//! they retain longer (`crisis_retention_days` vs
//! `context_retention_days`).
//!
//! This in-process structure is the canonical working set; a durable
//! store behind it is out of scope.

pub mod summary;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use solace_cache::{Clock, SystemClock};
use solace_core::context::{ContextSummary, CrisisEvent};
use solace_core::crisis::CrisisDetection;
use solace_core::error::MemoryError;
use solace_core::turn::TurnRecord;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Tunables for the memory manager.
#[derive(Debug, Clone)]
pub struct MemorySettings {
    pub max_turns: usize,
    pub context_retention_days: i64,
    pub crisis_retention_days: i64,
    pub summary_staleness: std::time::Duration,
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self {
            max_turns: 50,
            context_retention_days: 30,
            crisis_retention_days: 90,
            summary_staleness: std::time::Duration::from_secs(3_600),
        }
    }
}

struct UserLog {
    turns: VecDeque<TurnRecord>,
    crisis_events: Vec<CrisisEvent>,
    summary: Option<ContextSummary>,
}

impl UserLog {
    fn new() -> Self {
        Self {
            turns: VecDeque::new(),
            crisis_events: Vec::new(),
            summary: None,
        }
    }
}

/// The per-user memory store.
pub struct ContextMemory {
    users: RwLock<HashMap<String, UserLog>>,
    settings: MemorySettings,
    clock: Arc<dyn Clock>,
}

impl ContextMemory {
    pub fn new(settings: MemorySettings) -> Self {
        Self::with_clock(settings, Arc::new(SystemClock))
    }

    pub fn with_clock(settings: MemorySettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            settings,
            clock,
        }
    }

    /// Append one turn. Idempotent by turn id: writing the same record
    /// twice (concurrent retries) keeps a single copy. Returns the
    /// turn id.
    pub async fn write_turn(
        &self,
        mut record: TurnRecord,
        crisis: Option<&CrisisDetection>,
    ) -> Result<String, MemoryError> {
        if record.user_id.trim().is_empty() {
            return Err(MemoryError::Storage("blank user id".into()));
        }
        if record.id.is_empty() {
            record.id = TurnRecord::new_id();
        }
        let turn_id = record.id.clone();
        let now = self.clock.now();

        let mut users = self.users.write().await;
        let log = users.entry(record.user_id.clone()).or_insert_with(UserLog::new);

        if log.turns.iter().any(|t| t.id == turn_id) {
            debug!(turn_id = %turn_id, "Duplicate turn write ignored");
            return Ok(turn_id);
        }

        let crisis_event = crisis.filter(|d| d.is_crisis).map(|d| CrisisEvent {
            severity: d.severity,
            crisis_type: d.crisis_type,
            at: now,
        });
        if let Some(event) = crisis_event {
            log.crisis_events.push(event);
            self.prune_crisis_events(&mut log.crisis_events, now);
        }

        log.turns.push_back(record);
        while log.turns.len() > self.settings.max_turns {
            log.turns.pop_front();
        }

        // Incremental summary update; cold logs wait for the first read.
        if log.summary.is_some() {
            let turns: Vec<TurnRecord> = log.turns.iter().cloned().collect();
            if let (Some(summary), Some(new_turn)) = (log.summary.as_mut(), turns.last()) {
                summary::apply_turn(summary, &turns, new_turn, crisis_event, now);
            }
        }

        Ok(turn_id)
    }

    /// The rolling summary for a user. `None` for unknown users. A
    /// missing or stale summary triggers a full recompute over the
    /// retention-filtered log.
    pub async fn fetch_context(&self, user_id: &str) -> Option<ContextSummary> {
        let now = self.clock.now();
        let staleness = ChronoDuration::from_std(self.settings.summary_staleness)
            .unwrap_or_else(|_| ChronoDuration::hours(1));

        {
            let users = self.users.read().await;
            let log = users.get(user_id)?;
            if let Some(summary) = &log.summary {
                if !summary.is_stale(now, staleness) {
                    return Some(summary.clone());
                }
            }
        }

        // Cold start or stale: full recompute under the write lock.
        let mut users = self.users.write().await;
        let log = users.get_mut(user_id)?;

        let cutoff = now - ChronoDuration::days(self.settings.context_retention_days);
        let window: Vec<TurnRecord> = log
            .turns
            .iter()
            .filter(|t| t.timestamp >= cutoff)
            .cloned()
            .collect();

        self.prune_crisis_events(&mut log.crisis_events, now);
        let summary = summary::recompute(&window, &log.crisis_events, now);
        log.summary = Some(summary.clone());
        debug!(user_id, turns = window.len(), "Context summary recomputed");
        Some(summary)
    }

    /// The last `n` turns for a user, oldest first.
    pub async fn recent_turns(&self, user_id: &str, n: usize) -> Vec<TurnRecord> {
        let users = self.users.read().await;
        match users.get(user_id) {
            Some(log) => {
                let skip = log.turns.len().saturating_sub(n);
                log.turns.iter().skip(skip).cloned().collect()
            }
            None => Vec::new(),
        }
    }

    /// Total turns currently held for a user.
    pub async fn turn_count(&self, user_id: &str) -> usize {
        let users = self.users.read().await;
        users.get(user_id).map(|l| l.turns.len()).unwrap_or(0)
    }

    fn prune_crisis_events(&self, events: &mut Vec<CrisisEvent>, now: DateTime<Utc>) {
        let cutoff = now - ChronoDuration::days(self.settings.crisis_retention_days);
        events.retain(|e| e.at >= cutoff);
    }
}
