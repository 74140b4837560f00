use crate::backend::BackendClient;
use crate::core::error::{PortalError, Result};
use crate::model::User;
use tokio::sync::watch;

/// Load lifecycle of the directory
///
/// There is no error phase: a failed load still counts as completed, the
/// error travels to the caller instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    /// No load has been attempted yet
    Uninitialized,
    /// The first load is in flight
    Loading,
    /// A load has completed, successfully or not
    Ready,
}

/// Renderable state of the directory
///
/// `users` keeps the server's response order; nothing here re-sorts.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectorySnapshot {
    pub phase: LoadPhase,
    pub users: Vec<User>,
    /// Bumped by [`UserDirectory::reset`]; patches from an older generation
    /// are discarded
    pub generation: u64,
}

impl DirectorySnapshot {
    fn initial() -> Self {
        Self {
            phase: LoadPhase::Uninitialized,
            users: Vec::new(),
            generation: 0,
        }
    }
}

/// Observable mirror of the backend user collection
///
/// All operations return their outcome and log failures; a failed operation
/// leaves the snapshot untouched and wakes no subscriber. The snapshot lock
/// is never held across a network call: each operation captures the current
/// generation, awaits the backend, then applies its local patch only if the
/// generation still matches.
pub struct UserDirectory {
    backend: BackendClient,
    state: watch::Sender<DirectorySnapshot>,
}

impl UserDirectory {
    pub fn new(backend: BackendClient) -> Self {
        let (state, _) = watch::channel(DirectorySnapshot::initial());
        Self { backend, state }
    }

    /// Subscribe to snapshot changes
    ///
    /// The receiver yields the current snapshot immediately and then one
    /// value per accepted mutation.
    pub fn subscribe(&self) -> watch::Receiver<DirectorySnapshot> {
        self.state.subscribe()
    }

    /// Clone the current snapshot
    pub fn snapshot(&self) -> DirectorySnapshot {
        self.state.borrow().clone()
    }

    /// Clone the current collection
    pub fn users(&self) -> Vec<User> {
        self.state.borrow().users.clone()
    }

    /// Fetch the collection from the backend and replace the mirror with it
    ///
    /// Returns the number of users loaded. On failure the previous
    /// collection stays displayed and the error is returned; the phase still
    /// advances to `Ready` when this was the first load.
    pub async fn load(&self) -> Result<usize> {
        let generation = self.begin_load();

        match self.backend.fetch_users().await {
            Ok(users) => {
                let count = users.len();
                let applied = self.state.send_if_modified(|state| {
                    if state.generation != generation {
                        return false;
                    }
                    state.phase = LoadPhase::Ready;
                    state.users = users;
                    true
                });

                if applied {
                    tracing::debug!(count, "User directory loaded");
                } else {
                    tracing::debug!("Discarded load response from a previous lifetime");
                }
                Ok(count)
            }
            Err(err) => {
                self.state.send_if_modified(|state| {
                    if state.generation != generation || state.phase == LoadPhase::Ready {
                        return false;
                    }
                    state.phase = LoadPhase::Ready;
                    true
                });

                tracing::error!(error = %err, "Failed to load user directory");
                Err(err)
            }
        }
    }

    /// Delete an account, then drop it from the mirror without re-fetching
    pub async fn delete_user(&self, username: &str) -> Result<()> {
        if username.is_empty() {
            return Err(PortalError::ValidationError(
                "username cannot be empty".to_string(),
            ));
        }

        let generation = self.current_generation();

        self.backend.delete_user(username).await.map_err(|err| {
            tracing::error!(username, error = %err, "Failed to delete user");
            err
        })?;

        let mut stale = false;
        self.state.send_if_modified(|state| {
            if state.generation != generation {
                stale = true;
                return false;
            }
            remove_matching(&mut state.users, username)
        });

        if stale {
            tracing::debug!(username, "Discarded delete patch from a previous lifetime");
        } else {
            tracing::info!(username, "User deleted");
        }
        Ok(())
    }

    /// Change an account's admin flag, then patch the mirror in place
    ///
    /// Setting the current value again is not short-circuited: the backend
    /// round trip is always issued.
    pub async fn set_admin(&self, username: &str, is_admin: bool) -> Result<()> {
        if username.is_empty() {
            return Err(PortalError::ValidationError(
                "username cannot be empty".to_string(),
            ));
        }

        let generation = self.current_generation();

        self.backend
            .change_role(username, is_admin)
            .await
            .map_err(|err| {
                tracing::error!(username, is_admin, error = %err, "Failed to change user role");
                err
            })?;

        let mut stale = false;
        self.state.send_if_modified(|state| {
            if state.generation != generation {
                stale = true;
                return false;
            }
            set_admin_flag(&mut state.users, username, is_admin)
        });

        if stale {
            tracing::debug!(username, "Discarded role patch from a previous lifetime");
        } else {
            tracing::info!(username, is_admin, "User role changed");
        }
        Ok(())
    }

    /// Clear the mirror and invalidate every in-flight patch
    ///
    /// The next load starts from `Uninitialized` under a new generation.
    pub fn reset(&self) {
        self.state.send_modify(|state| {
            state.generation += 1;
            state.phase = LoadPhase::Uninitialized;
            state.users.clear();
        });
    }

    fn current_generation(&self) -> u64 {
        self.state.borrow().generation
    }

    /// Capture the generation and move a first load into `Loading`
    fn begin_load(&self) -> u64 {
        let mut generation = 0;
        self.state.send_if_modified(|state| {
            generation = state.generation;
            if state.phase == LoadPhase::Uninitialized {
                state.phase = LoadPhase::Loading;
                true
            } else {
                false
            }
        });
        generation
    }
}

/// Drop every element whose username matches; true when something changed
fn remove_matching(users: &mut Vec<User>, username: &str) -> bool {
    let before = users.len();
    users.retain(|u| u.username != username);
    users.len() != before
}

/// Set the admin flag on every matching element; true when something changed
fn set_admin_flag(users: &mut [User], username: &str, is_admin: bool) -> bool {
    let mut changed = false;
    for user in users.iter_mut().filter(|u| u.username == username) {
        if user.is_admin != is_admin {
            user.is_admin = is_admin;
            changed = true;
        }
    }
    changed
}
