//! Import session: the users and registration code collected during one run

use std::collections::HashMap;

/// One WorkSpaces user, keyed by username
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserRecord {
    pub username: String,
    pub last_name: String,
    pub first_name: String,
    pub full_name_en: String,
    pub initial_password: String,
    pub mfa_secret: Option<String>,
    pub mfa_url: Option<String>,
}

impl UserRecord {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Default::default()
        }
    }

    /// e.g. "Alice Sato (佐藤 アリス)"
    pub fn display_name(&self) -> String {
        format!(
            "{} ({} {})",
            self.full_name_en, self.last_name, self.first_name
        )
    }

    pub fn has_mfa(&self) -> bool {
        self.mfa_secret.is_some()
    }
}

/// Usernames name a directory under the output root, so they must be a
/// single plain path component.
pub fn is_safe_username(username: &str) -> bool {
    !username.is_empty()
        && !username.contains(['/', '\\', '\0'])
        && username != "."
        && username != ".."
}

/// Owner of everything loaded during a run.
///
/// Users keep spreadsheet row order. The session is built by the workspaces
/// loader, extended by the MFA loader and read by the generator.
#[derive(Debug, Clone, Default)]
pub struct ImportSession {
    pub registration_code: String,
    users: Vec<UserRecord>,
    index: HashMap<String, usize>,
}

impl ImportSession {
    pub fn new(registration_code: impl Into<String>) -> Self {
        Self {
            registration_code: registration_code.into(),
            ..Default::default()
        }
    }

    /// Insert a user. A repeated username replaces the earlier record in place.
    pub fn insert(&mut self, user: UserRecord) {
        match self.index.get(&user.username) {
            Some(&i) => self.users[i] = user,
            None => {
                self.index.insert(user.username.clone(), self.users.len());
                self.users.push(user);
            }
        }
    }

    pub fn get(&self, username: &str) -> Option<&UserRecord> {
        self.index.get(username).map(|&i| &self.users[i])
    }

    pub fn get_mut(&mut self, username: &str) -> Option<&mut UserRecord> {
        match self.index.get(username) {
            Some(&i) => self.users.get_mut(i),
            None => None,
        }
    }

    pub fn contains(&self, username: &str) -> bool {
        self.index.contains_key(username)
    }

    /// Users in spreadsheet row order
    pub fn users(&self) -> &[UserRecord] {
        &self.users
    }

    /// Users ordered by username
    pub fn users_sorted(&self) -> Vec<&UserRecord> {
        let mut users: Vec<&UserRecord> = self.users.iter().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        users
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn mfa_count(&self) -> usize {
        self.users.iter().filter(|u| u.has_mfa()).count()
    }
}
