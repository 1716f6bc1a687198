//! In-memory backend
//!
//! A process-local stand-in for the hosted service, implementing both
//! trait surfaces with the same observable semantics as the HTTP client:
//! filter evaluation, ordering, and upsert-by-key. Used by tests and
//! offline development; also supports injecting failures to exercise
//! error paths.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering as AtomicOrdering};

use async_trait::async_trait;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::backend::{AuthBackend, Session, TableBackend, UserInfo};
use crate::error::{ClientError, ClientResult};
use crate::query::{Filter, FilterOp, SelectRequest};

#[derive(Default)]
struct AuthState {
    /// email -> (password, identity)
    users: HashMap<String, (String, UserInfo)>,
    /// access token -> identity
    sessions: HashMap<String, UserInfo>,
}

/// In-memory implementation of [`TableBackend`] and [`AuthBackend`]
#[derive(Default)]
pub struct MemoryBackend {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    auth: Mutex<AuthState>,
    fail_selects: AtomicU32,
    fail_writes: AtomicU32,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sign-in identity
    pub fn with_user(self, email: impl Into<String>, password: impl Into<String>) -> Self {
        let email = email.into();
        let user = UserInfo {
            id: Uuid::new_v4().to_string(),
            email: email.clone(),
        };
        self.auth
            .lock()
            .expect("auth lock poisoned")
            .users
            .insert(email, (password.into(), user));
        self
    }

    /// Fail the next `count` select calls with a backend error
    pub fn fail_next_selects(&self, count: u32) {
        self.fail_selects.store(count, AtomicOrdering::SeqCst);
    }

    /// Fail the next `count` mutation calls with a backend error
    pub fn fail_next_writes(&self, count: u32) {
        self.fail_writes.store(count, AtomicOrdering::SeqCst);
    }

    /// Direct snapshot of a table's rows, for test assertions
    pub fn table_snapshot(&self, table: &str) -> Vec<Value> {
        self.tables
            .lock()
            .expect("table lock poisoned")
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    fn take_failure(counter: &AtomicU32) -> bool {
        counter
            .fetch_update(AtomicOrdering::SeqCst, AtomicOrdering::SeqCst, |n| {
                n.checked_sub(1)
            })
            .is_ok()
    }

    fn injected() -> ClientError {
        ClientError::Internal("injected backend failure".to_string())
    }

    /// Loose equality: numbers compare numerically, everything else strictly
    fn values_eq(a: &Value, b: &Value) -> bool {
        match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => a == b,
        }
    }

    /// Ordering over comparable values; ISO date strings order correctly
    /// as plain strings
    fn compare(a: &Value, b: &Value) -> Option<Ordering> {
        match (a, b) {
            (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
            _ => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.partial_cmp(&y),
                _ => None,
            },
        }
    }

    fn matches(row: &Value, filter: &Filter) -> bool {
        let Some(cell) = row.get(&filter.column) else {
            return false;
        };

        match filter.op {
            FilterOp::Eq => Self::values_eq(cell, &filter.value),
            FilterOp::Gte => matches!(
                Self::compare(cell, &filter.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOp::Lte => matches!(
                Self::compare(cell, &filter.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
            FilterOp::Ilike => match (cell.as_str(), filter.value.as_str()) {
                (Some(cell), Some(term)) => {
                    cell.to_lowercase().contains(&term.to_lowercase())
                }
                _ => false,
            },
        }
    }

    fn matches_request(row: &Value, request: &SelectRequest) -> bool {
        let all = request.filters.iter().all(|f| Self::matches(row, f));
        let any_or = request.or_filters.is_empty()
            || request.or_filters.iter().any(|f| Self::matches(row, f));
        all && any_or
    }

    fn as_object(row: Value) -> ClientResult<Map<String, Value>> {
        match row {
            Value::Object(map) => Ok(map),
            other => Err(ClientError::Validation(format!(
                "row must be a JSON object, got {}",
                other
            ))),
        }
    }

    /// Fill server-assigned columns the way the hosted service would
    fn assign_defaults(row: &mut Map<String, Value>) {
        row.entry("id")
            .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
        row.entry("created_at")
            .or_insert_with(|| Value::String(chrono::Utc::now().to_rfc3339()));
    }
}

#[async_trait]
impl TableBackend for MemoryBackend {
    async fn select(&self, request: &SelectRequest) -> ClientResult<Vec<Value>> {
        if Self::take_failure(&self.fail_selects) {
            return Err(Self::injected());
        }

        let tables = self.tables.lock().expect("table lock poisoned");
        let mut rows: Vec<Value> = tables
            .get(&request.table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| Self::matches_request(row, request))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &request.order {
            rows.sort_by(|a, b| {
                let ordering = match (a.get(&order.column), b.get(&order.column)) {
                    (Some(x), Some(y)) => Self::compare(x, y).unwrap_or(Ordering::Equal),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                };
                if order.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }

        if let Some(limit) = request.limit {
            rows.truncate(limit);
        }

        Ok(rows)
    }

    async fn insert(&self, table: &str, row: Value) -> ClientResult<Value> {
        if Self::take_failure(&self.fail_writes) {
            return Err(Self::injected());
        }

        let mut row = Self::as_object(row)?;
        Self::assign_defaults(&mut row);
        let stored = Value::Object(row);

        let mut tables = self.tables.lock().expect("table lock poisoned");
        tables
            .entry(table.to_string())
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        table: &str,
        filters: &[Filter],
        patch: Value,
    ) -> ClientResult<Vec<Value>> {
        if Self::take_failure(&self.fail_writes) {
            return Err(Self::injected());
        }

        let patch = Self::as_object(patch)?;
        let mut tables = self.tables.lock().expect("table lock poisoned");
        let rows = tables.entry(table.to_string()).or_default();

        let mut updated = Vec::new();
        for row in rows.iter_mut() {
            if filters.iter().all(|f| Self::matches(row, f)) {
                if let Value::Object(map) = row {
                    for (key, value) in &patch {
                        map.insert(key.clone(), value.clone());
                    }
                }
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    async fn upsert(&self, table: &str, on_conflict: &[&str], row: Value) -> ClientResult<Value> {
        if Self::take_failure(&self.fail_writes) {
            return Err(Self::injected());
        }

        let mut incoming = Self::as_object(row)?;
        let mut tables = self.tables.lock().expect("table lock poisoned");
        let rows = tables.entry(table.to_string()).or_default();

        let position = rows.iter().position(|row| {
            on_conflict.iter().all(|column| {
                match (row.get(*column), incoming.get(*column)) {
                    (Some(a), Some(b)) => Self::values_eq(a, b),
                    _ => false,
                }
            })
        });

        match position {
            Some(index) => {
                // Merge-duplicates: provided columns replace, others survive
                let existing = &mut rows[index];
                if let Value::Object(map) = existing {
                    for (key, value) in incoming {
                        map.insert(key, value);
                    }
                }
                Ok(existing.clone())
            }
            None => {
                Self::assign_defaults(&mut incoming);
                let stored = Value::Object(incoming);
                rows.push(stored.clone());
                Ok(stored)
            }
        }
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> ClientResult<u64> {
        if Self::take_failure(&self.fail_writes) {
            return Err(Self::injected());
        }

        let mut tables = self.tables.lock().expect("table lock poisoned");
        let rows = tables.entry(table.to_string()).or_default();
        let before = rows.len();
        rows.retain(|row| !filters.iter().all(|f| Self::matches(row, f)));
        Ok((before - rows.len()) as u64)
    }
}

#[async_trait]
impl AuthBackend for MemoryBackend {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> ClientResult<Session> {
        let mut auth = self.auth.lock().expect("auth lock poisoned");

        let user = match auth.users.get(email) {
            Some((stored, user)) if stored == password => user.clone(),
            _ => return Err(ClientError::Unauthorized),
        };

        let token = Uuid::new_v4().to_string();
        auth.sessions.insert(token.clone(), user.clone());

        Ok(Session {
            access_token: token,
            expires_at: None,
            user,
        })
    }

    async fn sign_out(&self, access_token: &str) -> ClientResult<()> {
        self.auth
            .lock()
            .expect("auth lock poisoned")
            .sessions
            .remove(access_token);
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> ClientResult<UserInfo> {
        self.auth
            .lock()
            .expect("auth lock poisoned")
            .sessions
            .get(access_token)
            .cloned()
            .ok_or(ClientError::Unauthorized)
    }
}
