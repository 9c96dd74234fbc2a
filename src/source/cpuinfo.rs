//! the cpu model, from `/proc/cpuinfo`.

use {
    super::{MetricUnavailable, Pseudofile},
    std::{
        collections::BTreeSet,
        fmt::{self, Display},
    },
};

/// a cpu's model name, with its physical and logical core counts.
///
/// displays as a device heading, such as `AMD Ryzen 7 5800X (8 cores, 16 threads)`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CpuInfo {
    pub model: String,
    /// physical cores.
    pub cores: usize,
    /// logical processors.
    pub threads: usize,
}

// === impl CpuInfo ===

impl CpuInfo {
    const PROCESSOR: &str = "processor";
    const MODEL: &str = "model name";
    const PHYSICAL_ID: &str = "physical id";
    const CORE_ID: &str = "core id";

    pub fn read(file: &impl Pseudofile) -> Result<Self, MetricUnavailable> {
        Self::parse(&file.contents()?)
    }

    /// parses `/proc/cpuinfo`, which holds one block per logical processor.
    ///
    /// physical cores are told apart by their `physical id` and `core id`. when those are
    /// missing, as on some virtual machines, each logical processor counts as a core.
    pub fn parse(contents: &str) -> Result<Self, MetricUnavailable> {
        let mut model = None;
        let mut threads = 0;
        let mut package = None;
        let mut cores = BTreeSet::new();

        for line in contents.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();

            match key.trim() {
                Self::PROCESSOR => {
                    threads += 1;
                    package = None;
                }
                Self::MODEL if model.is_none() => {
                    model = Some(value.split_whitespace().collect::<Vec<_>>().join(" "));
                }
                Self::PHYSICAL_ID => package = Some(value.to_owned()),
                Self::CORE_ID => {
                    cores.insert((package.clone(), value.to_owned()));
                }
                _ => {}
            }
        }

        let model = model.ok_or(MetricUnavailable::MissingField(Self::MODEL))?;
        if threads == 0 {
            return Err(MetricUnavailable::MissingField(Self::PROCESSOR));
        }
        let cores = if cores.is_empty() { threads } else { cores.len() };

        Ok(Self {
            model,
            cores,
            threads,
        })
    }
}

impl Display for CpuInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            model,
            cores,
            threads,
        } = self;
        let plural = |n: usize| if n == 1 { "" } else { "s" };

        write!(
            f,
            "{model} ({cores} core{}, {threads} thread{})",
            plural(*cores),
            plural(*threads)
        )
    }
}
