use {
    std::{io, process::ExitStatus},
    thiserror::Error,
};

/// an error that ends a refresh loop.
#[derive(Debug, Error)]
pub enum Error {
    /// writing to the terminal failed.
    #[error("terminal i/o failed")]
    Terminal(#[from] io::Error),
    /// the watched command failed, and failures are fatal.
    #[error(transparent)]
    Subprocess(#[from] SubprocessError),
    #[error("could not install the interrupt handler")]
    Interrupt(#[from] ctrlc::Error),
    /// the watched command was stopped by an interrupt signal.
    #[error("the watched command was interrupted")]
    Interrupted,
}

/// the watched command could not run to a successful exit.
#[derive(Debug, Error)]
pub enum SubprocessError {
    #[error("no command given")]
    Empty,
    #[error("failed to launch `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("`{program}` exited with {status}")]
    Status { program: String, status: ExitStatus },
}

// === impl SubprocessError ===

impl SubprocessError {
    /// returns true if the command was killed by `SIGINT` or `SIGTERM`.
    pub fn interrupted(&self) -> bool {
        #[cfg(unix)]
        if let Self::Status { status, .. } = self {
            use std::os::unix::process::ExitStatusExt;
            const SIGINT: i32 = 2;
            const SIGTERM: i32 = 15;
            return matches!(status.signal(), Some(SIGINT | SIGTERM));
        }

        false
    }
}
