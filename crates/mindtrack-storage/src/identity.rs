use tokio::sync::watch;

/// Who is signed in, if anyone.
pub trait IdentityProvider: Send + Sync {
    fn current_user(&self) -> Option<String>;

    /// Receives the new user id (or `None`) on every sign-in/sign-out.
    fn subscribe(&self) -> watch::Receiver<Option<String>>;
}

/// Identity held in a watch channel; sign-in state can change at runtime.
pub struct WatchIdentity {
    tx: watch::Sender<Option<String>>,
}

impl WatchIdentity {
    pub fn anonymous() -> Self {
        Self {
            tx: watch::Sender::new(None),
        }
    }

    pub fn signed_in(user_id: impl Into<String>) -> Self {
        Self {
            tx: watch::Sender::new(Some(user_id.into())),
        }
    }

    pub fn sign_in(&self, user_id: impl Into<String>) {
        let user_id = user_id.into();
        tracing::debug!(user = %user_id, "signed in");
        self.tx.send_replace(Some(user_id));
    }

    pub fn sign_out(&self) {
        tracing::debug!("signed out");
        self.tx.send_replace(None);
    }
}

impl IdentityProvider for WatchIdentity {
    fn current_user(&self) -> Option<String> {
        self.tx.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.tx.subscribe()
    }
}
