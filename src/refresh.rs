//! the redraw loop.

use {
    crate::{Error, EscapeWriter, Interrupt},
    crossterm::{
        cursor::MoveTo,
        queue,
        terminal::{Clear, ClearType},
    },
    std::{
        fmt::{self, Display},
        io::Write,
        num::ParseFloatError,
        str::FromStr,
        time::Duration,
    },
    thiserror::Error,
    tracing::{debug, trace},
};

/// redraws a frame in place at a fixed interval.
#[derive(Clone, Copy, Debug)]
pub struct Refresh {
    interval: Interval,
    mode: Mode,
}

/// how each frame replaces the previous one.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Mode {
    /// clear the whole screen, then draw.
    ///
    /// always correct, but the screen may flicker.
    FullClear,
    /// draw over the previous frame, erasing what it leaves behind.
    ///
    /// the end of every line is cleared as it is written, and everything below the frame is
    /// cleared once it has been drawn.
    #[default]
    TrailingClear,
}

/// the time between two frames.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Interval(Duration);

#[derive(Debug, Error, PartialEq)]
pub enum IntervalError {
    #[error("invalid number of seconds: {0}")]
    Parse(#[from] ParseFloatError),
    #[error("interval must be positive, got {0}")]
    NotPositive(f64),
    #[error("interval is too large: {0}")]
    TooLarge(f64),
}

/// draws one frame.
pub trait Render {
    fn render(&mut self, out: &mut dyn Write) -> Result<(), Error>;
}

// === impl Refresh ===

impl Refresh {
    /// how long a failed frame waits for an interrupt that may still be on its way.
    ///
    /// the child and this process receive ctrl-c at the same time, and the child can exit
    /// before the handler thread has posted.
    pub const GRACE: Duration = Duration::from_millis(200);

    pub fn new(interval: Interval, mode: Mode) -> Self {
        Self { interval, mode }
    }

    /// draws frames until an interrupt arrives.
    ///
    /// a render or terminal error ends the loop. if an interrupt is pending when that
    /// happens, or arrives within [`Refresh::GRACE`], the loop ends normally instead: a
    /// watched command that was killed by the same ctrl-c is not a failure.
    pub fn run<W, R>(&self, out: &mut W, interrupt: &Interrupt, render: &mut R) -> Result<(), Error>
    where
        W: Write,
        R: Render + ?Sized,
    {
        let Self { interval, mode } = self;
        debug!(%interval, ?mode, "starting refresh loop");

        let mut tick = 0_u64;
        loop {
            tick += 1;
            if let Err(error) = self.tick(out, render) {
                if matches!(error, Error::Interrupted) || interrupt.pending() || interrupt.wait(Self::GRACE) {
                    debug!(%error, tick, "interrupted during a frame");
                    return Ok(());
                }
                return Err(error);
            }
            trace!(tick, "drew frame");

            if interrupt.wait(interval.0) {
                debug!(tick, "interrupted");
                return Ok(());
            }
        }
    }

    /// draws a single frame, and flushes it.
    pub fn tick<W, R>(&self, out: &mut W, render: &mut R) -> Result<(), Error>
    where
        W: Write,
        R: Render + ?Sized,
    {
        match self.mode {
            Mode::FullClear => {
                queue!(out, MoveTo(0, 0), Clear(ClearType::All))?;
                render.render(out)?;
            }
            Mode::TrailingClear => {
                queue!(out, MoveTo(0, 0))?;
                let mut lines = EscapeWriter::new(&mut *out);
                render.render(&mut lines)?;
                trace!(lines = lines.cleared(), "cleared line endings");
                queue!(out, Clear(ClearType::FromCursorDown))?;
            }
        }

        out.flush().map_err(Error::from)
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }
}

// === impl Mode ===

impl Mode {
    /// returns [`Mode::FullClear`] if `safe` is set, and the default otherwise.
    pub fn safe(safe: bool) -> Self {
        if safe { Self::FullClear } else { Self::default() }
    }
}

// === impl Interval ===

impl Interval {
    /// returns an interval of `secs` seconds, which must be positive and finite.
    pub fn from_secs_f64(secs: f64) -> Result<Self, IntervalError> {
        if secs.is_nan() || secs <= 0.0 {
            return Err(IntervalError::NotPositive(secs));
        }

        Duration::try_from_secs_f64(secs)
            .map(Self)
            .map_err(|_| IntervalError::TooLarge(secs))
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self(Duration::from_secs(1))
    }
}

impl FromStr for Interval {
    type Err = IntervalError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<f64>().map_err(IntervalError::from).and_then(Self::from_secs_f64)
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0.as_secs_f64())
    }
}

// === impl Render ===

impl<F> Render for F
where
    F: FnMut(&mut dyn Write) -> Result<(), Error>,
{
    fn render(&mut self, out: &mut dyn Write) -> Result<(), Error> {
        self(out)
    }
}
