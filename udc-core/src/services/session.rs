//! Session identity
//!
//! Shared handle to the account currently logged in. Only the identity
//! service writes it; the complaint and notification services read it to
//! decide visibility.

use crate::database::{Account, Role};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct Session {
    current: Arc<RwLock<Option<Account>>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// The logged-in account, if any
    pub async fn current(&self) -> Option<Account> {
        self.current.read().await.clone()
    }

    pub async fn role(&self) -> Option<Role> {
        self.current.read().await.as_ref().map(|account| account.role)
    }

    pub async fn is_authenticated(&self) -> bool {
        self.current.read().await.is_some()
    }

    pub(crate) async fn set(&self, account: Option<Account>) {
        *self.current.write().await = account;
    }
}
