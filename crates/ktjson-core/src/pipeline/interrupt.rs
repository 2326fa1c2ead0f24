//! Cooperative interruption shared by every clone
//!
//! Copyright (c) 2025 Ktjson Team
//! Licensed under the Apache-2.0 license

use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone)]
pub struct Interrupt {
    sender: Arc<watch::Sender<bool>>,
    receiver: watch::Receiver<bool>,
}

impl Default for Interrupt {
    fn default() -> Self {
        Self::new()
    }
}

impl Interrupt {
    /// A flag that only [`Interrupt::trigger`] sets
    pub fn new() -> Self {
        let (sender, receiver) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
            receiver,
        }
    }

    /// A flag set by the first Ctrl-C. Must be called inside a Tokio runtime.
    pub fn on_ctrl_c() -> Self {
        let interrupt = Self::new();
        let handle = interrupt.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received, stopping after the current step");
                handle.trigger();
            }
        });
        interrupt
    }

    pub fn trigger(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolves once the flag is set
    pub async fn triggered(&self) {
        let mut receiver = self.receiver.clone();
        if receiver.wait_for(|set| *set).await.is_err() {
            // The sender lives as long as any clone, so this never resolves
            std::future::pending::<()>().await;
        }
    }
}
