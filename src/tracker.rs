//! Session-level controller.
//!
//! [`Tracker`] owns the store, the auth state and the active task list.
//! Every task intent is applied through [`task::transition`] and the new list
//! is then written under the active user's key before the call returns.
//!
//! Session state machine:
//!
//! ```text
//! LoggedOut --login--> LoggedIn --logout--> LoggedOut
//!              LoggedIn --login (other user)--> LoggedIn (re-hydrated)
//! ```
//!
//! The active list is read lazily: [`Tracker::restore`] only reads the
//! session pointer, and the list is loaded by the first task intent (or an
//! explicit [`Tracker::hydrate`]). Login and logout never read the previous
//! user's list.

use chrono::Utc;

use crate::auth::{self, AuthIntent, AuthState, Credentials, LoginOutcome};
use crate::error::{Error, Result};
use crate::filter::{filter_tasks, TaskFilter};
use crate::persist::{self, CorruptDataPolicy};
use crate::storage::KvStore;
use crate::task::{self, TaskId, TaskIntent, TaskRecord, TaskState, Transition};

pub struct Tracker<S: KvStore> {
    store: S,
    auth: AuthState,
    tasks: TaskState,
    /// Whether `tasks` reflects the stored list of the active user
    loaded: bool,
    policy: CorruptDataPolicy,
}

impl<S: KvStore> Tracker<S> {
    /// Restore the persisted session without reading any task list
    pub fn restore(store: S, policy: CorruptDataPolicy) -> Result<Self> {
        let user = persist::load_session(&store)?;
        Ok(Self {
            store,
            auth: AuthState::new(user),
            tasks: TaskState::default(),
            loaded: false,
            policy,
        })
    }

    /// Restore the persisted session and hydrate its task list
    pub fn open(store: S, policy: CorruptDataPolicy) -> Result<Self> {
        let mut tracker = Self::restore(store, policy)?;
        tracker.hydrate()?;
        Ok(tracker)
    }

    pub fn user(&self) -> Option<&str> {
        self.auth.user()
    }

    pub fn is_logged_in(&self) -> bool {
        self.auth.is_logged_in()
    }

    pub fn tasks(&self) -> &[TaskRecord] {
        self.tasks.tasks()
    }

    pub fn task(&self, id: TaskId) -> Option<&TaskRecord> {
        self.tasks.get(id)
    }

    pub fn visible(&self, filter: TaskFilter) -> Vec<&TaskRecord> {
        filter_tasks(self.tasks.tasks(), filter)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Log in, registering the username on first use.
    ///
    /// On any error the session is left as it was.
    pub fn login(&mut self, username: &str, password: &str) -> Result<LoginOutcome> {
        let credentials = Credentials::parse(username, password)?;
        let user = credentials.username().to_string();
        // Read first so a failed load registers nobody.
        let tasks = persist::load_tasks(&self.store, &user, self.policy)?;
        let outcome = auth::authenticate(&mut self.store, &credentials)?;
        persist::save_session(&mut self.store, &user)?;

        self.auth = self.auth.apply(AuthIntent::Login(user.clone()));
        self.tasks = TaskState::new(tasks);
        self.loaded = true;
        tracing::debug!(user = %user, ?outcome, tasks = self.tasks.len(), "logged in");
        Ok(outcome)
    }

    pub fn logout(&mut self) -> Result<()> {
        persist::clear_session(&mut self.store)?;
        if let Some(user) = self.auth.user() {
            tracing::debug!(user, "logged out");
        }
        self.auth = self.auth.apply(AuthIntent::Logout);
        self.tasks = TaskState::default();
        self.loaded = true;
        Ok(())
    }

    /// Re-read the active user's list from the store
    pub fn hydrate(&mut self) -> Result<()> {
        let tasks = match self.auth.user() {
            Some(user) => persist::load_tasks(&self.store, user, self.policy)?,
            None => Vec::new(),
        };
        self.tasks = self.transition(TaskIntent::Load(tasks))?.state;
        self.loaded = true;
        Ok(())
    }

    /// Apply a task intent and persist the resulting list
    pub fn dispatch(&mut self, intent: TaskIntent) -> Result<Transition> {
        let user = self.auth.user().ok_or(Error::NotLoggedIn)?.to_string();
        if !self.loaded {
            self.hydrate()?;
        }
        let name = intent.name();
        let result = self.transition(intent)?;

        persist::save_tasks(&mut self.store, &user, result.state.tasks())?;
        self.tasks = result.state.clone();
        tracing::debug!(user = %user, intent = name, effect = ?result.effect, "task intent applied");
        Ok(result)
    }

    pub fn add(&mut self, title: &str) -> Result<Transition> {
        self.dispatch(TaskIntent::Add {
            title: title.to_string(),
        })
    }

    pub fn complete(&mut self, id: TaskId) -> Result<Transition> {
        self.dispatch(TaskIntent::Complete { id })
    }

    pub fn edit(&mut self, id: TaskId, title: &str) -> Result<Transition> {
        self.dispatch(TaskIntent::Edit {
            id,
            title: title.to_string(),
        })
    }

    pub fn delete(&mut self, id: TaskId) -> Result<Transition> {
        self.dispatch(TaskIntent::Delete { id })
    }

    fn transition(&self, intent: TaskIntent) -> Result<Transition> {
        task::transition(&self.tasks, intent, Utc::now())
    }
}
