//! interrupt delivery.
//!
//! the signal handler does not touch the terminal. it posts a message that the refresh loop
//! picks up while it sleeps, so the loop can return normally and every scope it runs in is
//! torn down in order.

use {
    std::{
        sync::mpsc::{self, Receiver, RecvTimeoutError, Sender},
        time::Duration,
    },
    tracing::debug,
};

/// the receiving end of interrupt requests.
pub struct Interrupt {
    rx: Receiver<()>,
}

/// requests an interrupt.
#[derive(Clone)]
pub struct Trigger {
    tx: Sender<()>,
}

// === impl Interrupt ===

impl Interrupt {
    /// installs a process-wide handler for ctrl-c, `SIGTERM` and `SIGHUP`.
    ///
    /// this may only be called once per process.
    pub fn install() -> Result<Self, ctrlc::Error> {
        let (trigger, interrupt) = Self::channel();
        ctrlc::set_handler(move || trigger.fire())?;
        debug!("installed interrupt handler");
        Ok(interrupt)
    }

    /// returns an interrupt that fires when the [`Trigger`] does.
    pub fn channel() -> (Trigger, Self) {
        let (tx, rx) = mpsc::channel();
        (Trigger { tx }, Self { rx })
    }

    /// sleeps for `timeout`, returning early with `true` if an interrupt arrives.
    pub fn wait(&self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(()) => true,
            Err(RecvTimeoutError::Timeout) => false,
            // nothing can fire anymore, but the caller still expects to be put to sleep.
            Err(RecvTimeoutError::Disconnected) => {
                std::thread::sleep(timeout);
                false
            }
        }
    }

    /// returns `true` if an interrupt has arrived, without blocking.
    pub fn pending(&self) -> bool {
        self.rx.try_recv().is_ok()
    }
}

// === impl Trigger ===

impl Trigger {
    pub fn fire(&self) {
        // the receiver is gone once the loop has returned; there is nothing left to stop.
        let _ = self.tx.send(());
    }
}
