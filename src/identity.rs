use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::storage::LocalStorage;

const CURRENT_USER_KEY: &str = "work_management_user";
const TEAM_MEMBERS_KEY: &str = "work_management_team_members";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl User {
    /// Builds a user from login input: the name is trimmed and must be non-empty,
    /// a blank email is treated as absent.
    pub fn from_login(username: &str, email: Option<&str>) -> AppResult<Self> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AppError::Identity("username must not be empty".to_string()));
        }
        Ok(Self {
            username: username.to_string(),
            email: email
                .map(str::trim)
                .filter(|email| !email.is_empty())
                .map(str::to_string),
            avatar: None,
            role: None,
        })
    }
}

/// The user a command acts on behalf of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user: User,
}

impl Session {
    pub fn new(user: User) -> Self {
        Self { user }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn username(&self) -> &str {
        &self.user.username
    }
}

/// Locally remembered identity. Nothing here is verified by the server.
pub struct IdentityStore {
    storage: LocalStorage,
}

impl IdentityStore {
    pub fn new(storage: LocalStorage) -> Self {
        Self { storage }
    }

    pub fn current_user(&self) -> AppResult<Option<User>> {
        self.storage
            .get_item(CURRENT_USER_KEY)
            .map(|raw| {
                serde_json::from_str(raw)
                    .map_err(|err| AppError::Storage(format!("invalid stored user: {err}")))
            })
            .transpose()
    }

    pub fn set_current_user(&mut self, user: User) -> AppResult<()> {
        let encoded = encode(&user)?;
        self.storage.set_item(CURRENT_USER_KEY, encoded)?;

        let mut members = self.team_members()?;
        if !members.iter().any(|member| member.username == user.username) {
            members.push(user);
            self.set_team_members(&members)?;
        }
        Ok(())
    }

    pub fn logout(&mut self) -> AppResult<()> {
        self.storage.remove_item(CURRENT_USER_KEY)
    }

    pub fn team_members(&self) -> AppResult<Vec<User>> {
        match self.storage.get_item(TEAM_MEMBERS_KEY) {
            Some(raw) => serde_json::from_str(raw)
                .map_err(|err| AppError::Storage(format!("invalid stored roster: {err}"))),
            None => Ok(Vec::new()),
        }
    }

    pub fn set_team_members(&mut self, members: &[User]) -> AppResult<()> {
        let encoded = encode(&members)?;
        self.storage.set_item(TEAM_MEMBERS_KEY, encoded)
    }

    /// Makes a previously seen user current. Returns `false` for unknown names.
    pub fn switch_user(&mut self, username: &str) -> AppResult<bool> {
        let found = self
            .team_members()?
            .into_iter()
            .find(|member| member.username == username);
        match found {
            Some(user) => {
                self.set_current_user(user)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn session(&self) -> AppResult<Session> {
        self.current_user()?.map(Session::new).ok_or_else(|| {
            AppError::Identity("not logged in; run `worklog login <name>` first".to_string())
        })
    }
}

fn encode<T: Serialize + ?Sized>(value: &T) -> AppResult<String> {
    serde_json::to_string(value)
        .map_err(|err| AppError::Storage(format!("failed to encode identity: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> IdentityStore {
        IdentityStore::new(LocalStorage::open(dir.path().join("storage.json")).unwrap())
    }

    #[test]
    fn login_adds_user_to_roster_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);

        let user = User::from_login(" 차성욱 ", Some("  ")).unwrap();
        assert_eq!(user.username, "차성욱");
        assert_eq!(user.email, None);

        store.set_current_user(user.clone()).unwrap();
        store.set_current_user(user.clone()).unwrap();

        assert_eq!(store.current_user().unwrap(), Some(user.clone()));
        assert_eq!(store.team_members().unwrap(), vec![user]);
    }

    #[test]
    fn logout_keeps_roster() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        store
            .set_current_user(User::from_login("alice", None).unwrap())
            .unwrap();

        store.logout().unwrap();

        assert_eq!(store.current_user().unwrap(), None);
        assert_eq!(store.team_members().unwrap().len(), 1);
        assert!(matches!(store.session(), Err(AppError::Identity(_))));
    }

    #[test]
    fn switch_user_only_accepts_known_members() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        store
            .set_current_user(User::from_login("alice", Some("a@example.com")).unwrap())
            .unwrap();
        store
            .set_current_user(User::from_login("bob", None).unwrap())
            .unwrap();

        assert!(store.switch_user("alice").unwrap());
        assert_eq!(store.session().unwrap().username(), "alice");
        assert_eq!(
            store.session().unwrap().user().email.as_deref(),
            Some("a@example.com")
        );

        assert!(!store.switch_user("mallory").unwrap());
        assert_eq!(store.session().unwrap().username(), "alice");
    }

    #[test]
    fn session_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        store_in(&dir)
            .set_current_user(User::from_login("alice", None).unwrap())
            .unwrap();

        assert_eq!(store_in(&dir).session().unwrap().username(), "alice");
    }

    #[test]
    fn rejects_blank_username() {
        assert!(matches!(
            User::from_login("   ", None),
            Err(AppError::Identity(_))
        ));
    }
}
