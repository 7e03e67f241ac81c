use chrono::Utc;
use uuid::Uuid;

use crate::data::user::ops::{problem as user_problem, UserStoreExt};
use crate::resp::problem::Problem;
use crate::store::Store;

use super::{Group, GroupInvitation, InvitationStatus};

pub mod problem {
    use crate::resp::problem::{Problem, ProblemKind};
    use uuid::Uuid;

    #[inline]
    pub fn bad_group(detail: impl ToString) -> Problem {
        Problem::new(ProblemKind::BadRequest, "Bad group.")
            .detail(detail)
            .to_owned()
    }

    #[inline]
    pub fn not_enrolled(course: Uuid) -> Problem {
        Problem::new(ProblemKind::Forbidden, "Not enrolled in this course.")
            .insert("course", course.to_string())
            .clone()
    }

    #[inline]
    pub fn already_grouped() -> Problem {
        Problem::new(
            ProblemKind::Conflict,
            "Already in a group for this course.",
        )
    }
}

pub trait GroupStoreExt {
    /// Appends a group whose only member is its creator (and leader), then
    /// synthesizes one pending invitation per distinct invitee. Membership
    /// grows exclusively through acceptance.
    fn create_group(
        &mut self,
        course: Uuid,
        name: &str,
        creator: Uuid,
        invitees: &[Uuid],
    ) -> Result<(Group, Vec<GroupInvitation>), Problem>;

    /// Invites a student into an existing group. A vanished group is a
    /// silent no-op; an existing pending invitation is returned instead of
    /// duplicated.
    fn send_invitation(
        &mut self,
        group: Uuid,
        inviter: Uuid,
        invitee: Uuid,
    ) -> Result<Option<GroupInvitation>, Problem>;

    /// Resolves a pending invitation to accepted and appends the invitee to
    /// the group. Unknown ids, resolved invitations and vanished groups
    /// no-op; joining a second group in the same course is refused.
    fn accept_invitation(&mut self, invitation: Uuid) -> Result<(), Problem>;

    /// Resolves a pending invitation to rejected. No membership change.
    fn reject_invitation(&mut self, invitation: Uuid);

    /// Drops the member from the group. The last member leaving deletes the
    /// group; a leaving leader hands the role to the earliest remaining
    /// member.
    fn leave_group(&mut self, group: Uuid, student: Uuid);

    fn group(&self, id: Uuid) -> Option<&Group>;
    fn group_for_student(&self, course: Uuid, student: Uuid) -> Option<&Group>;
    fn pending_invitations_for(&self, student: Uuid) -> Vec<&GroupInvitation>;
}

impl GroupStoreExt for Store {
    #[tracing::instrument(skip(self))]
    fn create_group(
        &mut self,
        course: Uuid,
        name: &str,
        creator: Uuid,
        invitees: &[Uuid],
    ) -> Result<(Group, Vec<GroupInvitation>), Problem> {
        if name.trim().is_empty() {
            return Err(problem::bad_group("Group name is required."));
        }

        let user = self
            .user(creator)
            .ok_or_else(|| user_problem::not_found(creator))?;
        if !user.is_enrolled(course) {
            return Err(problem::not_enrolled(course));
        }
        if self.group_for_student(course, creator).is_some() {
            return Err(problem::already_grouped());
        }

        let group = Group {
            id: Uuid::new_v4(),
            course,
            name: name.trim().to_string(),
            leader: creator,
            members: vec![creator],
            created: Utc::now(),
        };

        let mut invitations: Vec<GroupInvitation> = vec![];
        for &invitee in invitees {
            if invitee == creator || invitations.iter().any(|i| i.invitee == invitee) {
                continue;
            }

            invitations.push(GroupInvitation {
                id: Uuid::new_v4(),
                group: group.id,
                course,
                inviter: creator,
                invitee,
                status: InvitationStatus::Pending,
                created: Utc::now(),
            });
        }

        self.groups_mut().push(group.clone());
        self.invitations_mut().extend(invitations.iter().cloned());
        self.persist_groups();
        self.persist_invitations();

        tracing::info!(
            "Created group '{}' with {} invitation(s)",
            group.name,
            invitations.len()
        );
        Ok((group, invitations))
    }

    #[tracing::instrument(skip(self))]
    fn send_invitation(
        &mut self,
        group: Uuid,
        inviter: Uuid,
        invitee: Uuid,
    ) -> Result<Option<GroupInvitation>, Problem> {
        let (group_id, course) = match self.group(group) {
            Some(g) => {
                if g.is_member(invitee) {
                    return Ok(None);
                }
                (g.id, g.course)
            }
            None => return Ok(None),
        };

        if let Some(existing) = self.invitations().iter().find(|i| {
            i.group == group_id
                && i.invitee == invitee
                && i.status == InvitationStatus::Pending
        }) {
            return Ok(Some(existing.clone()));
        }

        let invitation = GroupInvitation {
            id: Uuid::new_v4(),
            group: group_id,
            course,
            inviter,
            invitee,
            status: InvitationStatus::Pending,
            created: Utc::now(),
        };

        self.invitations_mut().push(invitation.clone());
        self.persist_invitations();

        Ok(Some(invitation))
    }

    #[tracing::instrument(skip(self))]
    fn accept_invitation(&mut self, invitation: Uuid) -> Result<(), Problem> {
        let inv = match self.invitations().iter().find(|i| i.id == invitation) {
            Some(i) => i.clone(),
            None => return Ok(()),
        };
        if inv.status.is_resolved() {
            return Ok(());
        }
        if self.group(inv.group).is_none() {
            // group dissolved while the invitation sat pending
            return Ok(());
        }
        if let Some(current) = self.group_for_student(inv.course, inv.invitee) {
            if current.id != inv.group {
                return Err(problem::already_grouped());
            }
        }

        if let Some(i) = self.invitations_mut().iter_mut().find(|i| i.id == invitation) {
            i.status = InvitationStatus::Accepted;
        }
        if let Some(g) = self.groups_mut().iter_mut().find(|g| g.id == inv.group) {
            if !g.members.contains(&inv.invitee) {
                g.members.push(inv.invitee);
            }
        }

        self.persist_invitations();
        self.persist_groups();

        tracing::info!("User {} joined group {}", inv.invitee, inv.group);
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    fn reject_invitation(&mut self, invitation: Uuid) {
        let mut resolved = false;

        if let Some(i) = self.invitations_mut().iter_mut().find(|i| i.id == invitation) {
            if !i.status.is_resolved() {
                i.status = InvitationStatus::Rejected;
                resolved = true;
            }
        }

        if resolved {
            self.persist_invitations();
        }
    }

    #[tracing::instrument(skip(self))]
    fn leave_group(&mut self, group: Uuid, student: Uuid) {
        let mut removed = false;
        let mut empty = false;

        if let Some(g) = self.groups_mut().iter_mut().find(|g| g.id == group) {
            let before = g.members.len();
            g.members.retain(|&m| m != student);
            removed = g.members.len() != before;

            if g.members.is_empty() {
                empty = true;
            } else if removed && g.leader == student {
                // earliest remaining member takes over
                g.leader = g.members[0];
                tracing::info!("Promoted {} to leader of group {}", g.leader, g.id);
            }
        }

        if empty {
            self.groups_mut().retain(|g| g.id != group);
        }
        if removed {
            self.persist_groups();
        }
    }

    fn group(&self, id: Uuid) -> Option<&Group> {
        self.groups().iter().find(|g| g.id == id)
    }

    fn group_for_student(&self, course: Uuid, student: Uuid) -> Option<&Group> {
        self.groups()
            .iter()
            .find(|g| g.course == course && g.is_member(student))
    }

    fn pending_invitations_for(&self, student: Uuid) -> Vec<&GroupInvitation> {
        self.invitations()
            .iter()
            .filter(|i| i.invitee == student && i.status == InvitationStatus::Pending)
            .filter(|i| self.group(i.group).is_some())
            .collect()
    }
}

///////////////////////
//       TESTS
///////////////////////

#[cfg(test)]
mod group_operations {
    use super::*;
    use crate::config::Config;
    use crate::data::course::ops::CourseStoreExt;
    use crate::data::course::CourseCreateData;
    use crate::data::user::ops::UserSignupData;
    use crate::data::user::User;
    use crate::role::Role;
    use crate::security::Security;
    use crate::storage::MemoryStorage;

    fn test_store() -> Store {
        Store::open(
            Box::new(MemoryStorage::default()),
            Security::with_salt([7; 16]),
            &Config::default(),
        )
    }

    fn register(store: &mut Store, name: &str, email: &str, role: Role) -> User {
        let (_, user) = store
            .register(UserSignupData {
                name: name.to_string(),
                email: email.to_string(),
                password: "password123".to_string(),
                role,
            })
            .expect("unable to register test user");
        user
    }

    /// One course, three enrolled students: (course, ben, chloe, david).
    fn classroom(store: &mut Store) -> (Uuid, User, User, User) {
        let anya = register(store, "Professor Anya", "anya@university.edu", Role::Admin);
        let ben = register(store, "Ben Carter", "ben@student.edu", Role::Student);
        let chloe = register(store, "Chloe Davis", "chloe@student.edu", Role::Student);
        let david = register(store, "David Evans", "david@student.edu", Role::Student);

        let course = store
            .create_course(
                CourseCreateData {
                    name: "Physics I".to_string(),
                    code: "PHYS150".to_string(),
                    semester: "Fall 2025".to_string(),
                    color: String::new(),
                },
                anya.id,
            )
            .expect("unable to create course");

        for student in [&ben, &chloe, &david] {
            store
                .enroll_course(student.id, course.id)
                .expect("unable to enroll");
        }

        (course.id, ben, chloe, david)
    }

    #[test]
    fn create_group_invites_but_does_not_add_members() {
        let mut store = test_store();
        let (course, ben, chloe, david) = classroom(&mut store);

        let (group, invitations) = store
            .create_group(course, "Team Rocket", ben.id, &[chloe.id, david.id])
            .expect("unable to create group");

        assert_eq!(group.members, vec![ben.id]);
        assert_eq!(group.leader, ben.id);
        assert_eq!(invitations.len(), 2);
        assert!(invitations
            .iter()
            .all(|i| i.status == InvitationStatus::Pending));
    }

    #[test]
    fn acceptance_grows_membership_one_invitee_at_a_time() {
        let mut store = test_store();
        let (course, ben, chloe, david) = classroom(&mut store);

        let (group, invitations) = store
            .create_group(course, "Team Rocket", ben.id, &[chloe.id, david.id])
            .unwrap();
        let chloe_invitation = invitations
            .iter()
            .find(|i| i.invitee == chloe.id)
            .unwrap()
            .id;

        store
            .accept_invitation(chloe_invitation)
            .expect("unable to accept invitation");

        let members = &store.group(group.id).unwrap().members;
        assert_eq!(members, &vec![ben.id, chloe.id]);
        assert!(
            !members.contains(&david.id),
            "david hasn't accepted and must stay out"
        );
    }

    #[test]
    fn accepting_twice_is_a_no_op() {
        let mut store = test_store();
        let (course, ben, chloe, _) = classroom(&mut store);

        let (group, invitations) = store
            .create_group(course, "Team Rocket", ben.id, &[chloe.id])
            .unwrap();
        let invitation = invitations[0].id;

        store.accept_invitation(invitation).unwrap();
        store.accept_invitation(invitation).unwrap();

        assert_eq!(store.group(group.id).unwrap().members.len(), 2);
    }

    #[test]
    fn unknown_invitation_is_a_silent_no_op() {
        let mut store = test_store();
        classroom(&mut store);

        assert!(store.accept_invitation(Uuid::new_v4()).is_ok());
        store.reject_invitation(Uuid::new_v4());
    }

    #[test]
    fn second_group_in_same_course_is_refused() {
        let mut store = test_store();
        let (course, ben, chloe, david) = classroom(&mut store);

        let (_, invitations) = store
            .create_group(course, "Team Rocket", ben.id, &[david.id])
            .unwrap();
        store
            .create_group(course, "Team Plasma", chloe.id, &[david.id])
            .unwrap();

        // david joins chloe's group first
        let plasma_invitation = store
            .pending_invitations_for(david.id)
            .iter()
            .find(|i| i.inviter == chloe.id)
            .unwrap()
            .id;
        store.accept_invitation(plasma_invitation).unwrap();

        let rocket_invitation = invitations[0].id;
        let result = store.accept_invitation(rocket_invitation);

        assert!(result.is_err(), "joining a second group must be refused");
        let pending = store
            .invitations()
            .iter()
            .find(|i| i.id == rocket_invitation)
            .unwrap();
        assert_eq!(
            pending.status,
            InvitationStatus::Pending,
            "refused invitation stays pending"
        );
    }

    #[test]
    fn rejection_changes_no_membership() {
        let mut store = test_store();
        let (course, ben, chloe, _) = classroom(&mut store);

        let (group, invitations) = store
            .create_group(course, "Team Rocket", ben.id, &[chloe.id])
            .unwrap();

        store.reject_invitation(invitations[0].id);

        assert_eq!(store.group(group.id).unwrap().members, vec![ben.id]);
        assert!(store.pending_invitations_for(chloe.id).is_empty());
    }

    #[test]
    fn last_member_leaving_deletes_the_group() {
        let mut store = test_store();
        let (course, ben, _, _) = classroom(&mut store);

        let (group, _) = store.create_group(course, "Solo", ben.id, &[]).unwrap();
        store.leave_group(group.id, ben.id);

        assert!(store.group(group.id).is_none());
    }

    #[test]
    fn leaving_leader_promotes_earliest_member() {
        let mut store = test_store();
        let (course, ben, chloe, david) = classroom(&mut store);

        let (group, invitations) = store
            .create_group(course, "Team Rocket", ben.id, &[chloe.id, david.id])
            .unwrap();
        for invitation in &invitations {
            store.accept_invitation(invitation.id).unwrap();
        }

        store.leave_group(group.id, ben.id);

        let group = store.group(group.id).unwrap();
        assert_eq!(group.leader, chloe.id, "earliest remaining member leads");
        assert_eq!(group.members, vec![chloe.id, david.id]);
    }

    #[test]
    fn send_invitation_deduplicates_pending_ones() {
        let mut store = test_store();
        let (course, ben, chloe, _) = classroom(&mut store);

        let (group, _) = store.create_group(course, "Team Rocket", ben.id, &[]).unwrap();

        let first = store
            .send_invitation(group.id, ben.id, chloe.id)
            .unwrap()
            .expect("invitation should be created");
        let second = store
            .send_invitation(group.id, ben.id, chloe.id)
            .unwrap()
            .expect("pending invitation should be returned");

        assert_eq!(first.id, second.id);
        assert_eq!(store.invitations().len(), 1);
    }

    #[test]
    fn send_invitation_to_vanished_group_is_a_no_op() {
        let mut store = test_store();
        let (_, ben, chloe, _) = classroom(&mut store);

        let result = store.send_invitation(Uuid::new_v4(), ben.id, chloe.id);
        assert!(result.unwrap().is_none());
        assert!(store.invitations().is_empty());
    }
}
