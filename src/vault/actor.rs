//! Single-writer actor owning the vault state machine.
//!
//! All mutation of [`VaultState`] happens inside one task: requests
//! arrive over a mailbox and run to completion before the next one is
//! taken, and the inactivity timeout is folded into the same loop so it
//! can never race a handler.

use std::fmt;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::info;

use crate::config::ExtensionConfig;
use crate::core::VaultCore;
use crate::error::ExtensionError;
use crate::filler::CaptureEvent;
use crate::models::AccountResult;
use crate::traits::BrowserTabs;
use crate::vault::machine::VaultMachine;
use crate::vault::state::StateKind;

type Reply<T> = oneshot::Sender<Result<T, ExtensionError>>;

/// Mailbox messages understood by the vault actor. Secret-bearing
/// payloads are redacted from debug output, like the state types in
/// [`crate::vault::state`].
pub enum VaultRequest {
    NeedCredentials {
        reply: Reply<bool>,
    },
    NeedMasterPassword {
        reply: Reply<bool>,
    },
    Unlock {
        master_password: String,
        reply: Reply<()>,
    },
    Sync {
        reply: Reply<()>,
    },
    Seed {
        handle: String,
        secret_key: String,
        master_password: String,
        reply: Reply<()>,
    },
    Lock {
        reply: Reply<()>,
    },
    SignalActivity {
        reply: Reply<()>,
    },
    AccountsForHostname {
        hostname: String,
        reply: Reply<Vec<AccountResult>>,
    },
    CreateAccount {
        handle: String,
        hostname: String,
        reply: Reply<()>,
    },
    ImportInboxEntry {
        id: String,
        handle: String,
        hostname: String,
        reply: Reply<()>,
    },
    /// Fire-and-forget: no reply is awaited.
    RecordCandidate {
        hostname: String,
        handle: String,
    },
    /// Diagnostics only; not part of the wire catalog.
    StateKind {
        reply: Reply<StateKind>,
    },
}

impl fmt::Debug for VaultRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VaultRequest::NeedCredentials { .. } => f.write_str("NeedCredentials"),
            VaultRequest::NeedMasterPassword { .. } => f.write_str("NeedMasterPassword"),
            VaultRequest::Unlock { .. } => f.write_str("Unlock { master_password: .. }"),
            VaultRequest::Sync { .. } => f.write_str("Sync"),
            VaultRequest::Seed { handle, .. } => f
                .debug_struct("Seed")
                .field("handle", handle)
                .finish_non_exhaustive(),
            VaultRequest::Lock { .. } => f.write_str("Lock"),
            VaultRequest::SignalActivity { .. } => f.write_str("SignalActivity"),
            VaultRequest::AccountsForHostname { hostname, .. } => f
                .debug_struct("AccountsForHostname")
                .field("hostname", hostname)
                .finish_non_exhaustive(),
            VaultRequest::CreateAccount {
                handle, hostname, ..
            } => f
                .debug_struct("CreateAccount")
                .field("handle", handle)
                .field("hostname", hostname)
                .finish_non_exhaustive(),
            VaultRequest::ImportInboxEntry {
                id,
                handle,
                hostname,
                ..
            } => f
                .debug_struct("ImportInboxEntry")
                .field("id", id)
                .field("handle", handle)
                .field("hostname", hostname)
                .finish_non_exhaustive(),
            VaultRequest::RecordCandidate { hostname, handle } => f
                .debug_struct("RecordCandidate")
                .field("hostname", hostname)
                .field("handle", handle)
                .finish(),
            VaultRequest::StateKind { .. } => f.write_str("StateKind"),
        }
    }
}

/// Cloneable front end to the vault actor.
#[derive(Debug, Clone)]
pub struct VaultHandle {
    tx: mpsc::UnboundedSender<VaultRequest>,
}

/// Start the background vault actor and return its handle.
pub fn spawn<C, B>(config: ExtensionConfig, core: C, browser: B) -> VaultHandle
where
    C: VaultCore + 'static,
    B: BrowserTabs + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let machine = VaultMachine::new(config, core, browser);
    tokio::spawn(run(machine, rx));
    VaultHandle { tx }
}

async fn run<C: VaultCore, B: BrowserTabs>(
    mut machine: VaultMachine<C, B>,
    mut rx: mpsc::UnboundedReceiver<VaultRequest>,
) {
    loop {
        let deadline = machine.lock_deadline();
        tokio::select! {
            request = rx.recv() => match request {
                Some(request) => handle(&mut machine, request).await,
                None => break,
            },
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                info!("inactivity timeout reached");
                machine.lock();
            }
        }
    }
}

async fn handle<C: VaultCore, B: BrowserTabs>(
    machine: &mut VaultMachine<C, B>,
    request: VaultRequest,
) {
    // Reply send failures mean the caller stopped awaiting; the work is
    // done either way.
    match request {
        VaultRequest::NeedCredentials { reply } => {
            let _ = reply.send(machine.need_credentials().await);
        }
        VaultRequest::NeedMasterPassword { reply } => {
            let _ = reply.send(machine.need_master_password());
        }
        VaultRequest::Unlock {
            master_password,
            reply,
        } => {
            let _ = reply.send(machine.unlock(&master_password).await);
        }
        VaultRequest::Sync { reply } => {
            let _ = reply.send(machine.sync().await);
        }
        VaultRequest::Seed {
            handle,
            secret_key,
            master_password,
            reply,
        } => {
            let _ = reply.send(machine.seed(&handle, &secret_key, &master_password).await);
        }
        VaultRequest::Lock { reply } => {
            machine.lock();
            let _ = reply.send(Ok(()));
        }
        VaultRequest::SignalActivity { reply } => {
            machine.signal_activity();
            let _ = reply.send(Ok(()));
        }
        VaultRequest::AccountsForHostname { hostname, reply } => {
            let _ = reply.send(machine.accounts_for_hostname(&hostname));
        }
        VaultRequest::CreateAccount {
            handle,
            hostname,
            reply,
        } => {
            let _ = reply.send(machine.create_account(&handle, &hostname).await);
        }
        VaultRequest::ImportInboxEntry {
            id,
            handle,
            hostname,
            reply,
        } => {
            let _ = reply.send(machine.import_inbox_entry(&id, &handle, &hostname).await);
        }
        VaultRequest::RecordCandidate { hostname, handle } => {
            machine.record_candidate(hostname, handle);
        }
        VaultRequest::StateKind { reply } => {
            let _ = reply.send(Ok(machine.state_kind()));
        }
    }
}

impl VaultHandle {
    async fn call<T>(
        &self,
        request: VaultRequest,
        rx: oneshot::Receiver<Result<T, ExtensionError>>,
    ) -> Result<T, ExtensionError> {
        self.tx
            .send(request)
            .map_err(|_| ExtensionError::BackgroundGone)?;
        rx.await.map_err(|_| ExtensionError::BackgroundGone)?
    }

    pub async fn need_credentials(&self) -> Result<bool, ExtensionError> {
        let (reply, rx) = oneshot::channel();
        self.call(VaultRequest::NeedCredentials { reply }, rx).await
    }

    pub async fn need_master_password(&self) -> Result<bool, ExtensionError> {
        let (reply, rx) = oneshot::channel();
        self.call(VaultRequest::NeedMasterPassword { reply }, rx).await
    }

    pub async fn unlock(&self, master_password: String) -> Result<(), ExtensionError> {
        let (reply, rx) = oneshot::channel();
        self.call(
            VaultRequest::Unlock {
                master_password,
                reply,
            },
            rx,
        )
        .await
    }

    pub async fn sync(&self) -> Result<(), ExtensionError> {
        let (reply, rx) = oneshot::channel();
        self.call(VaultRequest::Sync { reply }, rx).await
    }

    pub async fn seed(
        &self,
        handle: String,
        secret_key: String,
        master_password: String,
    ) -> Result<(), ExtensionError> {
        let (reply, rx) = oneshot::channel();
        self.call(
            VaultRequest::Seed {
                handle,
                secret_key,
                master_password,
                reply,
            },
            rx,
        )
        .await
    }

    pub async fn lock(&self) -> Result<(), ExtensionError> {
        let (reply, rx) = oneshot::channel();
        self.call(VaultRequest::Lock { reply }, rx).await
    }

    pub async fn signal_activity(&self) -> Result<(), ExtensionError> {
        let (reply, rx) = oneshot::channel();
        self.call(VaultRequest::SignalActivity { reply }, rx).await
    }

    pub async fn accounts_for_hostname(
        &self,
        hostname: String,
    ) -> Result<Vec<AccountResult>, ExtensionError> {
        let (reply, rx) = oneshot::channel();
        self.call(VaultRequest::AccountsForHostname { hostname, reply }, rx)
            .await
    }

    pub async fn create_account(
        &self,
        handle: String,
        hostname: String,
    ) -> Result<(), ExtensionError> {
        let (reply, rx) = oneshot::channel();
        self.call(
            VaultRequest::CreateAccount {
                handle,
                hostname,
                reply,
            },
            rx,
        )
        .await
    }

    pub async fn import_inbox_entry(
        &self,
        id: String,
        handle: String,
        hostname: String,
    ) -> Result<(), ExtensionError> {
        let (reply, rx) = oneshot::channel();
        self.call(
            VaultRequest::ImportInboxEntry {
                id,
                handle,
                hostname,
                reply,
            },
            rx,
        )
        .await
    }

    /// Record a typed credential without awaiting completion. Failures
    /// are intentionally unobserved.
    pub fn record_candidate(&self, hostname: String, handle: String) {
        let _ = self
            .tx
            .send(VaultRequest::RecordCandidate { hostname, handle });
    }

    /// Current lifecycle phase; diagnostics only.
    pub async fn state_kind(&self) -> Result<StateKind, ExtensionError> {
        let (reply, rx) = oneshot::channel();
        self.call(VaultRequest::StateKind { reply }, rx).await
    }

    /// Forward filler capture events into the vault as new-account
    /// candidates. Fire-and-forget on both ends.
    pub fn forward_captures(
        &self,
        mut captures: mpsc::UnboundedReceiver<CaptureEvent>,
    ) -> JoinHandle<()> {
        let handle = self.clone();
        tokio::spawn(async move {
            while let Some(event) = captures.recv().await {
                handle.record_candidate(event.hostname, event.handle);
            }
        })
    }
}
