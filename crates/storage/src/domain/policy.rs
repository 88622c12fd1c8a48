//! Authorization decisions made at the API boundary.
//!
//! Every check is a pure function of who is asking, what they are asking
//! about and what they want to do with it. Visibility that depends on the
//! competition lifecycle (qualified entries being open to voters during the
//! voting phase) is derived from the current state instead of being granted
//! and revoked by the state sweep.

use uuid::Uuid;

use super::lifecycle::CompetitionState;
use crate::error::{Result, StorageError};
use crate::models::{EntryStatus, UserRole, Visibility};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserActor {
    pub user_id: Uuid,
    pub role: UserRole,
    pub is_staff: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Anonymous,
    /// Caller authenticated with an admin API key.
    Admin,
    User(UserActor),
}

impl Actor {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Self::User(user) => Some(user.user_id),
            _ => None,
        }
    }

    /// Admin key holders and staff users bypass every policy rule.
    pub fn is_privileged(&self) -> bool {
        match self {
            Self::Admin => true,
            Self::User(user) => user.is_staff,
            Self::Anonymous => false,
        }
    }

    fn role(&self) -> UserRole {
        match self {
            Self::User(user) => user.role,
            Self::Admin => UserRole::Crew,
            Self::Anonymous => UserRole::Anon,
        }
    }

    fn is(&self, user_id: Option<Uuid>) -> bool {
        matches!((self.user_id(), user_id), (Some(a), Some(b)) if a == b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    View,
    Create,
    Change,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompetitionFacts {
    pub visibility: Visibility,
    pub published: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryFacts<'a> {
    pub state: CompetitionState,
    pub status: EntryStatus,
    pub owner: Option<Uuid>,
    pub contributors: &'a [Uuid],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContributorFacts {
    pub user_id: Uuid,
    pub entry_owner: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource<'a> {
    Genre,
    Competition(CompetitionFacts),
    Entry(EntryFacts<'a>),
    Contributor(ContributorFacts),
    Vote { voter: Uuid },
    User { user_id: Uuid },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    fn from_bool(allowed: bool) -> Self {
        if allowed { Self::Allow } else { Self::Deny }
    }

    pub fn is_allowed(self) -> bool {
        self == Self::Allow
    }

    pub fn require(self) -> Result<()> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny => Err(StorageError::Forbidden),
        }
    }
}

pub fn authorize(actor: &Actor, resource: Resource<'_>, action: Action) -> Decision {
    if actor.is_privileged() {
        return Decision::Allow;
    }

    let allowed = match (resource, action) {
        (Resource::Genre, Action::View) => true,
        (Resource::Genre, _) => false,

        (Resource::Competition(facts), Action::View) => can_view_competition(actor, facts),
        (Resource::Competition(_), _) => false,

        (Resource::Entry(_), Action::Create) => actor.user_id().is_some(),
        (Resource::Entry(facts), Action::View) => can_view_entry(actor, facts),
        (Resource::Entry(facts), Action::Change | Action::Delete) => actor.is(facts.owner),

        (Resource::Contributor(facts), Action::View | Action::Create) => actor.is(facts.entry_owner),
        (Resource::Contributor(facts), Action::Change | Action::Delete) => {
            actor.is(facts.entry_owner) || actor.is(Some(facts.user_id))
        }

        (Resource::Vote { .. }, Action::Create) => actor.user_id().is_some(),
        (Resource::Vote { voter }, _) => actor.is(Some(voter)),

        (Resource::User { user_id }, Action::View) => actor.is(Some(user_id)),
        (Resource::User { .. }, _) => false,
    };

    Decision::from_bool(allowed)
}

/// Moving the owner flag of a contributor is reserved to the entry owner.
/// Contributors may edit their own record but never promote themselves.
pub fn authorize_ownership_change(actor: &Actor, facts: ContributorFacts) -> Decision {
    Decision::from_bool(actor.is_privileged() || actor.is(facts.entry_owner))
}

/// Visibility levels whose published competitions `actor` may browse.
/// `None` means the actor sees everything, unpublished included.
pub fn listable_visibilities(actor: &Actor) -> Option<Vec<Visibility>> {
    if actor.is_privileged() {
        return None;
    }

    let levels = [Visibility::Public, Visibility::Crew, Visibility::Hidden]
        .into_iter()
        .filter(|visibility| {
            can_view_competition(
                actor,
                CompetitionFacts {
                    visibility: *visibility,
                    published: true,
                },
            )
        })
        .collect();

    Some(levels)
}

fn can_view_competition(actor: &Actor, facts: CompetitionFacts) -> bool {
    if !facts.published {
        return false;
    }
    match facts.visibility {
        Visibility::Public => true,
        Visibility::Crew => actor.role() == UserRole::Crew,
        Visibility::Hidden => false,
    }
}

fn can_view_entry(actor: &Actor, facts: EntryFacts<'_>) -> bool {
    let Some(user_id) = actor.user_id() else {
        return false;
    };

    if facts.contributors.contains(&user_id) || facts.owner == Some(user_id) {
        return true;
    }

    // qualified entries open up to voters for the duration of the voting phase
    facts.state == CompetitionState::Vote
        && facts.status == EntryStatus::Qualified
        && matches!(actor.role(), UserRole::Participant | UserRole::Jury)
}
