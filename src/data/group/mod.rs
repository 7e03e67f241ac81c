use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod ops;

pub static GROUP_COLLECTION_NAME: &str = "groups";
pub static INVITATION_COLLECTION_NAME: &str = "groupInvitations";

/// A student-formed team scoped to one course, with exactly one leader.
/// The leader is always on the member list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub course: Uuid,
    pub name: String,
    pub leader: Uuid,
    #[serde(default)]
    pub members: Vec<Uuid>,
    #[serde(default = "Utc::now")]
    pub created: DateTime<Utc>,
}

impl Group {
    pub fn is_leader(&self, user: Uuid) -> bool {
        self.leader == user
    }

    pub fn is_member(&self, user: Uuid) -> bool {
        self.members.contains(&user)
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl std::default::Default for InvitationStatus {
    fn default() -> Self {
        InvitationStatus::Pending
    }
}

impl InvitationStatus {
    /// Accepted and rejected are terminal; there is no path back to
    /// pending.
    pub fn is_resolved(self) -> bool {
        self != InvitationStatus::Pending
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupInvitation {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub group: Uuid,
    pub course: Uuid,
    pub inviter: Uuid,
    pub invitee: Uuid,
    #[serde(default)]
    pub status: InvitationStatus,
    #[serde(default = "Utc::now")]
    pub created: DateTime<Utc>,
}
