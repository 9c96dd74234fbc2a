use {
    crate::render::Band,
    crossterm::style::Stylize,
    std::{
        io::{self, Write},
        iter::repeat_n,
    },
};

/// a horizontal bar, filled in proportion to a ratio.
pub struct Meter {
    /// the filled fraction, from 0 to 1. `None` draws an empty, unknown meter.
    pub ratio: Option<f64>,
    /// the number of cells in the bar.
    pub width: usize,
}

/// === impl Meter ===

impl Meter {
    const CELL: char = '━';
    /// the last filled cell, when more than half of it is filled.
    const ACTIVE_TIP: char = '╸';
    /// the first idle cell, otherwise.
    const IDLE_TIP: char = '╺';

    pub fn draw(&self, writer: &mut dyn Write) -> io::Result<()> {
        let Self { ratio, width } = *self;
        let band = Band::of(ratio);

        let cells = ratio.unwrap_or(0.0).clamp(0.0, 1.0) * width as f64;
        let filled = (cells.round_ties_even() as usize).min(width);

        let mut active = repeat_n(Self::CELL, filled).collect::<String>();
        let mut idle = repeat_n(Self::CELL, width - filled).collect::<String>();
        if !active.is_empty() && cells.fract() > 0.5 {
            active.pop();
            active.push(Self::ACTIVE_TIP);
        } else if !idle.is_empty() {
            idle.remove(0);
            idle.insert(0, Self::IDLE_TIP);
        }

        let idle = match ratio {
            Some(_) => idle.dark_grey(),
            None => idle.with(band.color()),
        };
        write!(writer, "{}{}", active.with(band.color()), idle)
    }
}
