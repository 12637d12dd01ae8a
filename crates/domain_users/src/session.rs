//! Session resolution
//!
//! The web layer owns cookies, credentials and password hashing. The core
//! only asks it who is signed in.

use crate::user::Actor;

/// Identity/session resolver supplied by the web layer
pub trait SessionPort: Send + Sync {
    /// Returns the signed-in actor, or `None` for anonymous requests
    fn current_actor(&self) -> Option<Actor>;
}

/// A fixed session, for tests and scripted callers
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticSession {
    actor: Option<Actor>,
}

impl StaticSession {
    /// A session signed in as `actor`
    pub fn signed_in(actor: Actor) -> Self {
        Self { actor: Some(actor) }
    }

    /// A session with nobody signed in
    pub fn anonymous() -> Self {
        Self { actor: None }
    }
}

impl SessionPort for StaticSession {
    fn current_actor(&self) -> Option<Actor> {
        self.actor
    }
}
