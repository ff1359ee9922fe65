//! Request context carrying the caller identity and privilege level.

use std::ops::Deref;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Context for the current request.
///
/// Passed into every store call so the storage collaborator knows *who* is
/// acting and with which privilege.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// The acting user's ID.
    pub user_id: Uuid,
    /// The project the request is scoped to.
    pub project_id: Uuid,
    /// Whether the caller currently holds administrative privilege.
    pub is_admin: bool,
    /// Correlation ID for log lines (`req-<uuid>`).
    pub request_id: String,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new, non-privileged request context.
    pub fn new(user_id: Uuid, project_id: Uuid) -> Self {
        Self {
            user_id,
            project_id,
            is_admin: false,
            request_id: format!("req-{}", Uuid::new_v4()),
            request_time: Utc::now(),
        }
    }

    /// Creates an administrative context for internal tooling.
    pub fn admin() -> Self {
        Self {
            is_admin: true,
            ..Self::new(Uuid::nil(), Uuid::nil())
        }
    }

    /// Returns an elevated copy of this context, leaving `self` untouched.
    pub fn elevated(&self) -> Self {
        Self {
            is_admin: true,
            ..self.clone()
        }
    }
}

/// Temporarily grants administrative privilege to a borrowed context.
///
/// The original privilege is restored when the scope is dropped, whichever
/// way the enclosing code exits: normal return, an early `?`, a panic
/// unwind, or the owning future being dropped mid-await.
#[derive(Debug)]
pub struct AdminScope<'a> {
    ctx: &'a mut RequestContext,
    original: bool,
}

impl<'a> AdminScope<'a> {
    /// Elevate `ctx` until the returned scope is dropped.
    pub fn enter(ctx: &'a mut RequestContext) -> Self {
        let original = ctx.is_admin;
        ctx.is_admin = true;
        Self { ctx, original }
    }

    /// The elevated context.
    pub fn context(&self) -> &RequestContext {
        self.ctx
    }
}

impl Deref for AdminScope<'_> {
    type Target = RequestContext;

    fn deref(&self) -> &Self::Target {
        self.ctx
    }
}

impl Drop for AdminScope<'_> {
    fn drop(&mut self) {
        self.ctx.is_admin = self.original;
    }
}
