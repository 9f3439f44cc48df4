use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::io;

use super::model::{Credential, PersistenceScope, Secret};
use super::prompt::Prompter;
use super::store::SecretStore;
use crate::modules::error::{Result, WatchError};

// In-memory store recording every write and delete
#[derive(Default)]
pub(crate) struct MockSecretStore {
    pub entries: RefCell<HashMap<String, (String, String)>>,
    pub writes: RefCell<Vec<(String, String, String, PersistenceScope)>>,
    pub forgets: RefCell<Vec<String>>,
    pub fail_lookup: bool,
    pub fail_store: bool,
}

impl MockSecretStore {
    pub fn with_entry(identifier: &str, username: &str, secret: &str) -> Self {
        let store = Self::default();
        store.entries.borrow_mut().insert(
            identifier.to_string(),
            (username.to_string(), secret.to_string()),
        );
        store
    }
}

impl SecretStore for MockSecretStore {
    fn lookup(&self, identifier: &str) -> Result<Option<Credential>> {
        if self.fail_lookup {
            return Err(WatchError::Lookup {
                identifier: identifier.to_string(),
                reason: "backend locked".to_string(),
            });
        }
        let entries = self.entries.borrow();
        Ok(entries.get(identifier).map(|(user, secret)| {
            Credential::new(identifier, user, Secret::new(secret.as_str()))
        }))
    }

    fn store(
        &self,
        identifier: &str,
        username: &str,
        secret: &Secret,
        scope: PersistenceScope,
    ) -> Result<()> {
        self.writes.borrow_mut().push((
            identifier.to_string(),
            username.to_string(),
            secret.expose().to_string(),
            scope,
        ));
        if self.fail_store {
            return Err(WatchError::Persistence {
                identifier: identifier.to_string(),
                reason: "read-only keyring".to_string(),
            });
        }
        self.entries.borrow_mut().insert(
            identifier.to_string(),
            (username.to_string(), secret.expose().to_string()),
        );
        Ok(())
    }

    // Absent identifiers succeed, like the keyring store
    fn forget(&self, identifier: &str) -> Result<()> {
        self.forgets.borrow_mut().push(identifier.to_string());
        self.entries.borrow_mut().remove(identifier);
        Ok(())
    }
}

// Prompter replaying scripted answers and counting calls
#[derive(Default)]
pub(crate) struct ScriptedPrompter {
    pub usernames: VecDeque<String>,
    pub passwords: VecDeque<String>,
    pub confirmations: VecDeque<bool>,
    pub notices: Vec<String>,
    pub username_calls: usize,
    pub confirm_calls: usize,
}

impl ScriptedPrompter {
    pub fn answering(username: &str, password: &str, persist: bool) -> Self {
        Self {
            usernames: VecDeque::from(vec![username.to_string()]),
            passwords: VecDeque::from(vec![password.to_string()]),
            confirmations: VecDeque::from(vec![persist]),
            ..Default::default()
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn username(&mut self, _identifier: &str) -> io::Result<String> {
        self.username_calls += 1;
        self.usernames
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no input"))
    }

    fn password(&mut self, _identifier: &str) -> io::Result<String> {
        self.passwords
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no input"))
    }

    fn confirm(&mut self, _question: &str) -> io::Result<bool> {
        self.confirm_calls += 1;
        Ok(self.confirmations.pop_front().unwrap_or(false))
    }

    fn notice(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }
}
