//! metric rendering.

use {
    crate::{
        meter::Meter,
        metric::{MetricSample, Unit},
    },
    crossterm::style::{Color, Stylize},
    std::{
        fmt::{self, Display},
        io::{self, Write},
    },
};

/// draws one line per metric: a label, a colored meter, and a readout.
///
/// a bold heading naming the device is drawn above the first sample of each device.
#[derive(Clone, Copy, Debug)]
pub struct MetricRenderer {
    /// the number of cells in each meter.
    width: usize,
}

/// a color band, chosen from a value's fraction of its maximum.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Band {
    Cyan,
    Green,
    Yellow,
    Orange,
    Red,
    /// the value or its maximum is not known.
    Unknown,
}

/// a sample's value, formatted for its unit.
struct Readout<'a>(&'a MetricSample);

// === impl MetricRenderer ===

impl MetricRenderer {
    pub const WIDTH: usize = 20;

    pub fn new(width: usize) -> Self {
        Self { width }
    }

    pub fn render(&self, samples: &[MetricSample], out: &mut dyn Write) -> io::Result<()> {
        let Self { width } = *self;
        let label = samples
            .iter()
            .map(|sample| sample.name.chars().count())
            .max()
            .unwrap_or_default();

        let mut heading = None;
        for sample in samples {
            if let Some(device) = &sample.device
                && heading != Some(device)
            {
                writeln!(out, "{}", device.as_str().bold().underlined())?;
                heading = Some(device);
            }

            let name = format!("{:<label$}", sample.name);
            write!(out, "{} ", name.white().bold())?;
            Meter {
                ratio: sample.ratio(),
                width,
            }
            .draw(out)?;
            writeln!(out, " {}", Readout(sample))?;
        }

        Ok(())
    }
}

impl Default for MetricRenderer {
    fn default() -> Self {
        Self::new(Self::WIDTH)
    }
}

// === impl Band ===

impl Band {
    /// returns the band for a ratio between 0 and 1.
    ///
    /// each band is closed at its lower bound: 0.2 is green, not cyan.
    pub fn of(ratio: Option<f64>) -> Self {
        match ratio {
            None => Self::Unknown,
            Some(v) if v.is_nan() => Self::Unknown,
            Some(v) if v < 0.2 => Self::Cyan,
            Some(v) if v < 0.4 => Self::Green,
            Some(v) if v < 0.6 => Self::Yellow,
            Some(v) if v < 0.8 => Self::Orange,
            Some(_) => Self::Red,
        }
    }

    pub fn color(self) -> Color {
        match self {
            Self::Cyan => Color::Cyan,
            Self::Green => Color::Green,
            Self::Yellow => Color::Yellow,
            Self::Orange => Color::DarkYellow,
            Self::Red => Color::Red,
            Self::Unknown => Color::Magenta,
        }
    }
}

// === impl Readout ===

impl Display for Readout<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const GIB: f64 = (1_u64 << 30) as f64;
        const GHZ: f64 = 1e9;

        let MetricSample {
            value,
            max_value,
            unit,
            ..
        } = self.0;
        let Some(value) = value else {
            return f.write_str("N/A");
        };

        match (unit, max_value) {
            (Unit::Percent, _) => write!(f, "{value:3.0}%"),
            (Unit::Celsius, _) => write!(f, "{value:04.1}°C"),
            (Unit::Bytes, Some(max)) => write!(f, "{:5.2}/{:5.2} GiB", value / GIB, max / GIB),
            (Unit::Bytes, None) => write!(f, "{:5.2} GiB", value / GIB),
            (Unit::Hertz, Some(max)) => write!(f, "{:4.2}/{:4.2} GHz", value / GHZ, max / GHZ),
            (Unit::Hertz, None) => write!(f, "{:4.2} GHz", value / GHZ),
        }
    }
}
