//! metric sources.
//!
//! a source is polled once per frame and returns a flat list of samples. sources never fail a
//! frame: a metric that cannot be read is reported as unavailable instead.

use {
    crate::metric::MetricSample,
    std::{
        fs::File,
        io::{self, BufReader, Read},
        num::{ParseFloatError, ParseIntError},
        path::PathBuf,
    },
    thiserror::Error,
};

#[cfg(test)]
use std::{cell::RefCell, collections::VecDeque, io::Cursor};

pub use self::{
    cpuinfo::CpuInfo,
    meminfo::Memory,
    nvidia::{GpuRecord, NvidiaSmi},
    sentinel::{Recording, Sentinel},
    stat::{CpuId, CpuTime, Entry, EntryParseError, Measurement, Snapshot, StatReadError, UserHz},
    sysfs::{CpuFrequency, Thermal},
    table::{Field, Record, TableError},
};

mod cpuinfo;
mod meminfo;
mod nvidia;
mod sentinel;
mod sysfs;
mod table;

/// kernel statistics facilities.
///
/// this file provides tools to interact with `/proc/stat`.
mod stat;

#[cfg(windows)]
mod wmic;
#[cfg(windows)]
pub use self::wmic::Wmic;

/// a source of metric samples.
pub trait MetricSource {
    /// returns the current samples.
    fn sample(&mut self) -> Vec<MetricSample>;

    /// attributes every sample to `device`, if it is known.
    fn on_device(self, device: Option<String>) -> OnDevice<Self>
    where
        Self: Sized,
    {
        OnDevice {
            source: self,
            device,
        }
    }
}

/// a source whose samples are all read from one device.
pub struct OnDevice<S> {
    source: S,
    device: Option<String>,
}

/// a metric could not be read.
#[derive(Debug, Error)]
pub enum MetricUnavailable {
    #[error("could not read the metric")]
    Io(#[from] io::Error),
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("invalid integer")]
    Int(#[from] ParseIntError),
    #[error("invalid number")]
    Float(#[from] ParseFloatError),
    #[error("`{program}` exited with {status}")]
    Command {
        program: &'static str,
        status: std::process::ExitStatus,
    },
    #[error(transparent)]
    Table(#[from] TableError),
}

/// a file that is read from scratch on every observation, like those in `/proc` and `/sys`.
pub trait Pseudofile {
    /// returns a reader.
    fn open(&self) -> io::Result<impl Read>;

    /// reads the whole file.
    fn contents(&self) -> io::Result<String> {
        let mut contents = String::new();
        self.open()?.read_to_string(&mut contents)?;
        Ok(contents)
    }
}

/// a pseudo-file on disk.
#[derive(Clone, Debug)]
pub struct ProcFile {
    path: PathBuf,
}

/// a mock pseudo-file, yielding queued contents one open at a time.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct MockFile {
    contents: RefCell<VecDeque<String>>,
}

/// returns the sources available on this host.
pub fn host() -> Vec<Box<dyn MetricSource>> {
    let mut sources: Vec<Box<dyn MetricSource>> = Vec::new();

    #[cfg(target_os = "linux")]
    {
        let cpu = CpuInfo::read(&ProcFile::new(ProcFile::CPUINFO))
            .inspect_err(|error| tracing::debug!(%error, "cpu model is unknown"))
            .ok()
            .map(|info| info.to_string());

        sources.push(Box::new(Sentinel::new().on_device(cpu.clone())));
        sources.push(Box::new(CpuFrequency::new().on_device(cpu.clone())));
        sources.push(Box::new(Thermal::new().on_device(cpu)));
        sources.push(Box::new(Memory::new()));
    }

    #[cfg(windows)]
    sources.push(Box::new(Wmic::new()));

    sources.push(Box::new(NvidiaSmi::new()));
    sources
}

// === impl OnDevice ===

impl<S: MetricSource> MetricSource for OnDevice<S> {
    fn sample(&mut self) -> Vec<MetricSample> {
        let Self { source, device } = self;
        let samples = source.sample();

        match device {
            Some(device) => samples
                .into_iter()
                .map(|sample| sample.with_device(device.as_str()))
                .collect(),
            None => samples,
        }
    }
}

// === impl ProcFile ===

impl ProcFile {
    pub const STAT: &str = "/proc/stat";
    pub const MEMINFO: &str = "/proc/meminfo";
    pub const CPUINFO: &str = "/proc/cpuinfo";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Pseudofile for ProcFile {
    fn open(&self) -> io::Result<impl Read> {
        File::open(&self.path).map(BufReader::new)
    }
}

// === impl MockFile ===

#[cfg(test)]
impl MockFile {
    pub(crate) fn new<I>(contents: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let contents = contents.into_iter().map(Into::into).collect();
        Self {
            contents: RefCell::new(contents),
        }
    }

    /// returns a mock file that fails to open.
    pub(crate) fn missing() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl Pseudofile for MockFile {
    fn open(&self) -> io::Result<impl Read> {
        let Self { contents } = self;

        contents
            .borrow_mut()
            .pop_front()
            .map(Cursor::new)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "mock file has no contents"))
    }
}
