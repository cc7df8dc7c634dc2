//! Speculative edits and the pure transforms that apply them.

use crate::models::{User, UserDraft, UserId};

/// A mutation requested by the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Create(UserDraft),
    Update(User),
    Delete(UserId),
}

impl Mutation {
    pub fn kind(&self) -> MutationKind {
        match self {
            Mutation::Create(_) => MutationKind::Create,
            Mutation::Update(_) => MutationKind::Update,
            Mutation::Delete(_) => MutationKind::Delete,
        }
    }

    /// Resolve the mutation into the edit applied locally.
    ///
    /// A create gets a placeholder id that is unique within `current`.
    pub fn speculate(&self, current: &[User]) -> Edit {
        match self {
            Mutation::Create(draft) => {
                let id = UserId::placeholder_excluding(current);
                Edit::Insert(User::from_draft(id, draft.clone()))
            }
            Mutation::Update(user) => Edit::Replace(user.clone()),
            Mutation::Delete(id) => Edit::Remove(*id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl MutationKind {
    pub fn verb(&self) -> &'static str {
        match self {
            MutationKind::Create => "create",
            MutationKind::Update => "update",
            MutationKind::Delete => "delete",
        }
    }
}

/// A local change to the cached list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Append a record
    Insert(User),
    /// Replace the record with the same id
    Replace(User),
    /// Remove the record with this id
    Remove(UserId),
}

impl Edit {
    /// Apply the edit to `users`, returning the new list.
    pub fn apply(&self, users: &[User]) -> Vec<User> {
        match self {
            Edit::Insert(user) => {
                let mut next = Vec::with_capacity(users.len() + 1);
                next.extend_from_slice(users);
                next.push(user.clone());
                next
            }
            Edit::Replace(user) => users
                .iter()
                .map(|u| if u.id == user.id { user.clone() } else { u.clone() })
                .collect(),
            Edit::Remove(id) => users.iter().filter(|u| u.id != *id).cloned().collect(),
        }
    }
}

/// Apply `edits` in order on top of `base`.
pub fn fold<'a>(base: &[User], edits: impl IntoIterator<Item = &'a Edit>) -> Vec<User> {
    edits
        .into_iter()
        .fold(base.to_vec(), |users, edit| edit.apply(&users))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64, name: &str, email: &str) -> User {
        User {
            id: UserId::Assigned(id),
            name: name.to_string(),
            email: email.to_string(),
        }
    }

    fn initial() -> Vec<User> {
        vec![user(1, "A", "a@x.com"), user(2, "B", "b@x.com")]
    }

    #[test]
    fn test_create_appends_with_placeholder() {
        let users = initial();
        let edit = Mutation::Create(UserDraft::new("C", "c@x.com")).speculate(&users);
        let next = edit.apply(&users);

        assert_eq!(next.len(), 3);
        assert_eq!(&next[..2], &users[..]);
        assert!(next[2].id.is_placeholder());
        assert_eq!(next[2].name, "C");
        assert_eq!(next[2].email, "c@x.com");
    }

    #[test]
    fn test_update_replaces_matching_record_in_place() {
        let users = initial();
        let next = Edit::Replace(user(1, "Z", "a@x.com")).apply(&users);
        assert_eq!(next, vec![user(1, "Z", "a@x.com"), user(2, "B", "b@x.com")]);
    }

    #[test]
    fn test_update_of_unknown_id_is_unchanged() {
        let users = initial();
        assert_eq!(Edit::Replace(user(9, "Z", "z@x.com")).apply(&users), users);
    }

    #[test]
    fn test_delete_removes_matching_record() {
        let users = initial();
        let next = Edit::Remove(UserId::Assigned(1)).apply(&users);
        assert_eq!(next, vec![user(2, "B", "b@x.com")]);
    }

    #[test]
    fn test_delete_of_unknown_id_is_unchanged() {
        let users = initial();
        assert_eq!(Edit::Remove(UserId::Assigned(9)).apply(&users), users);
    }

    #[test]
    fn test_apply_does_not_touch_input() {
        let users = initial();
        let before = users.clone();
        let _ = Edit::Remove(UserId::Assigned(2)).apply(&users);
        assert_eq!(users, before);
    }

    #[test]
    fn test_fold_applies_in_order() {
        let edits = [
            Edit::Replace(user(1, "Z", "a@x.com")),
            Edit::Remove(UserId::Assigned(2)),
            Edit::Insert(user(3, "C", "c@x.com")),
        ];
        let next = fold(&initial(), &edits);
        assert_eq!(next, vec![user(1, "Z", "a@x.com"), user(3, "C", "c@x.com")]);
    }

    #[test]
    fn test_fold_of_nothing_is_base() {
        let users = initial();
        assert_eq!(fold(&users, std::iter::empty()), users);
    }
}
