use {
    super::Pseudofile,
    std::{
        collections::BTreeMap,
        fmt::{self, Display},
        io::{self, BufRead, BufReader},
        num::ParseIntError,
        str::FromStr,
    },
    thiserror::Error,
    tracing::trace,
};

pub use self::{
    cpu_time::{CpuTime, Measurement},
    user_hz::UserHz,
};

mod cpu_time;
mod user_hz;


/// a snapshot of the cpus' statistics at a moment in time.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub system: CpuTime,
    pub cpus: BTreeMap<CpuId, CpuTime>,
}

/// an entry in the `/proc/stat` kernel statistics table.
///
/// see `proc_stat(5)` for more information.
#[derive(Debug, Eq, PartialEq)]
pub enum Entry {
    /// the amount of time that the system ("cpu" line) spent in various states.
    AllCpu { time: CpuTime },
    /// the amount of time that a specific cpu ("cpuN" line) spent in various states.
    Cpu { id: CpuId, time: CpuTime },
    /// any other statistic, such as `ctxt` or `intr`. its values are left unparsed.
    Other { kind: String },
}

#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct CpuId(u16);

#[derive(Debug, Eq, Error, PartialEq)]
pub enum EntryParseError {
    #[error("empty entry")]
    Empty,
    #[error("invalid cpu id")]
    CpuIdParse(#[source] ParseIntError),
    #[error("invalid time value")]
    UserHzParse(#[source] ParseIntError),
    #[error("expected 10 cpu times, found {found}")]
    CpuTime { found: usize },
}

#[derive(Debug, Error)]
pub enum StatReadError {
    #[error("could not read kernel statistics")]
    Io(#[from] io::Error),
    #[error("malformed kernel statistics")]
    Entry(#[from] EntryParseError),
    #[error("kernel statistics have no aggregate cpu entry")]
    MissingSystem,
}

// === impl Snapshot ===

impl Snapshot {
    /// uses the given source to parse a snapshot of the cpu statistics.
    ///
    /// entries other than cpu times are skipped.
    pub fn read(stats: &impl Pseudofile) -> Result<Snapshot, StatReadError> {
        let lines = BufReader::new(stats.open()?).lines();

        let mut system = None;
        let mut cpus = BTreeMap::new();
        for line in lines {
            match line?.parse::<Entry>() {
                Ok(Entry::AllCpu { time }) => system = Some(time),
                Ok(Entry::Cpu { id, time }) => {
                    cpus.insert(id, time);
                }
                Ok(Entry::Other { kind }) => trace!(%kind, "skipping entry"),
                Err(error) => return Err(error.into()),
            }
        }

        let system = system.ok_or(StatReadError::MissingSystem)?;
        Ok(Snapshot { system, cpus })
    }
}

// === impl Entry ===

impl FromStr for Entry {
    type Err = EntryParseError;
    fn from_str(entry: &str) -> Result<Self, Self::Err> {
        let mut tokens = entry.split_ascii_whitespace();
        let kind = tokens.next().ok_or(EntryParseError::Empty)?;

        let Some(suffix) = kind.strip_prefix("cpu") else {
            return Ok(Self::Other {
                kind: kind.to_owned(),
            });
        };
        let id = Self::parse_cpu_id(suffix)?;

        let time = tokens
            .map(str::parse::<UserHz>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(EntryParseError::UserHzParse)
            .and_then(CpuTime::try_from)?;

        Ok(match id {
            Some(id) => Self::Cpu { id, time },
            None => Self::AllCpu { time },
        })
    }
}

impl Entry {
    /// parses what follows the "cpu" prefix. an empty suffix marks the aggregate entry.
    fn parse_cpu_id(suffix: &str) -> Result<Option<CpuId>, EntryParseError> {
        if suffix.is_empty() {
            return Ok(None);
        }

        suffix
            .parse::<u16>()
            .map(CpuId)
            .map(Some)
            .map_err(EntryParseError::CpuIdParse)
    }
}

// === impl CpuId ===

impl Display for CpuId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self(id) = self;
        write!(f, "cpu{id}")
    }
}
