//! User lookups backing the `mention` element

use serde::{Deserialize, Serialize};

/// What a mention needs to know about a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPresentation {
    pub id: i64,
    pub screen_name: String,
    pub pretty_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserPresentation {
    pub fn new(id: i64, screen_name: impl Into<String>, pretty_name: impl Into<String>) -> Self {
        UserPresentation {
            id,
            screen_name: screen_name.into(),
            pretty_name: pretty_name.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Source of user data for mentions
pub trait UserDirectory: Send + Sync {
    fn user_by_id(&self, id: i64) -> Option<UserPresentation>;

    fn user_by_email(&self, email: &str) -> Option<UserPresentation>;
}

/// In-memory directory
#[derive(Debug, Clone, Default)]
pub struct StaticUserDirectory {
    users: Vec<UserPresentation>,
}

impl StaticUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user: UserPresentation) -> Self {
        self.insert(user);
        self
    }

    /// Add a user, replacing any previous entry with the same id
    pub fn insert(&mut self, user: UserPresentation) {
        self.users.retain(|existing| existing.id != user.id);
        self.users.push(user);
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl From<Vec<UserPresentation>> for StaticUserDirectory {
    fn from(users: Vec<UserPresentation>) -> Self {
        let mut directory = StaticUserDirectory::new();
        for user in users {
            directory.insert(user);
        }
        directory
    }
}

impl UserDirectory for StaticUserDirectory {
    fn user_by_id(&self, id: i64) -> Option<UserPresentation> {
        self.users.iter().find(|u| u.id == id).cloned()
    }

    fn user_by_email(&self, email: &str) -> Option<UserPresentation> {
        self.users
            .iter()
            .find(|u| {
                u.email
                    .as_deref()
                    .is_some_and(|e| e.eq_ignore_ascii_case(email))
            })
            .cloned()
    }
}
