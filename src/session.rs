use {
    crossterm::{
        cursor::{Hide, Show},
        queue,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen},
    },
    std::{
        io::{self, Write},
        ops::{Deref, DerefMut},
    },
    tracing::{debug, warn},
};

/// the terminal, switched to the alternate screen with a hidden cursor.
///
/// the original screen and cursor are restored exactly once: by [`Session::release()`], or
/// when the session is dropped. dropping covers early returns, errors, and panics that
/// unwind.
///
/// sessions do not nest. acquiring a second session on the same terminal leaves it in the
/// normal screen as soon as the inner one is released.
pub struct Session<W: Write> {
    out: W,
    active: bool,
}

// === impl Session ===

impl<W: Write> Session<W> {
    /// enters the alternate screen and hides the cursor.
    ///
    /// if this fails partway, the restore sequence is still attempted before the error is
    /// returned.
    pub fn acquire(out: W) -> io::Result<Self> {
        let mut session = Self { out, active: true };

        queue!(session.out, EnterAlternateScreen, Hide)?;
        session.out.flush()?;
        debug!("entered alternate screen");

        Ok(session)
    }

    /// runs `f` inside a session, releasing it before returning.
    ///
    /// an error from `f` takes precedence over an error restoring the terminal.
    pub fn scope<T, E, F>(out: W, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut W) -> Result<T, E>,
        E: From<io::Error>,
    {
        let mut session = Self::acquire(out)?;
        let result = f(&mut session.out);
        let released = session.release();

        let value = result?;
        released?;
        Ok(value)
    }

    /// shows the cursor and leaves the alternate screen.
    pub fn release(mut self) -> io::Result<()> {
        self.restore()
    }

    /// returns true until the session has been released.
    pub fn is_active(&self) -> bool {
        self.active
    }

    fn restore(&mut self) -> io::Result<()> {
        let Self { out, active } = self;

        if !std::mem::replace(active, false) {
            return Ok(());
        }

        queue!(out, Show, LeaveAlternateScreen)?;
        out.flush()?;
        debug!("left alternate screen");

        Ok(())
    }
}

impl<W: Write> Deref for Session<W> {
    type Target = W;
    fn deref(&self) -> &W {
        &self.out
    }
}

impl<W: Write> DerefMut for Session<W> {
    fn deref_mut(&mut self) -> &mut W {
        &mut self.out
    }
}

impl<W: Write> Drop for Session<W> {
    fn drop(&mut self) {
        if let Err(error) = self.restore() {
            warn!(%error, "failed to restore the terminal");
        }
    }
}
