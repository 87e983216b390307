//! Members of a scope as seen by the engine.
//!
//! Members are owned by the user-management collaborator; the engine only
//! uses them as map keys and to label balances and settlements.

use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Stable, comparable member identity.
///
/// Ordering is the UUID byte order; it is the tie-break used by the
/// settlement planner, which keeps its output reproducible.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MemberId(Uuid);

impl MemberId {
    #[must_use]
    pub const fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Fresh random id (v4).
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub const fn uuid(self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for MemberId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A resolved member: identity plus display attributes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub email: String,
}

impl Member {
    pub fn new(id: MemberId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Rejects rosters that list the same member twice.
pub(crate) fn ensure_unique_roster(roster: &[Member]) -> ResultEngine<()> {
    let mut seen = BTreeSet::new();
    for member in roster {
        if !seen.insert(member.id) {
            return Err(EngineError::InvalidRoster(format!(
                "member {} listed more than once",
                member.id
            )));
        }
    }
    Ok(())
}
