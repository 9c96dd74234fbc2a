use {
    super::{
        MetricSource, ProcFile, Pseudofile,
        stat::{CpuId, Measurement, Snapshot, StatReadError},
    },
    crate::metric::{MetricSample, Unit},
    std::collections::BTreeMap,
    tracing::warn,
};

/// observes kernel statistics, reporting cpu utilization.
///
/// utilization is measured over the time between two observations. the first observation is
/// made when the sentinel is created, so that the first sample already has a baseline.
pub struct Sentinel<S = ProcFile> {
    /// the underlying source of kernel statistics.
    source: S,
    /// the last observed snapshot.
    last: Option<Snapshot>,
}

/// a recording of the system's cpu load between two snapshots.
#[derive(Clone, Debug)]
pub struct Recording {
    /// how the system cpus spent their time, in aggregate.
    pub system: Measurement,
    /// how each cpu spent its time.
    pub cpus: BTreeMap<CpuId, Measurement>,
}

/// === impl Sentinel ===

impl Sentinel {
    /// creates a [`Sentinel`] reading `/proc/stat`.
    pub fn new() -> Self {
        Self::with_source(ProcFile::new(ProcFile::STAT))
    }
}

impl Default for Sentinel {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Pseudofile> Sentinel<S> {
    const NAME: &str = "cpu";

    pub fn with_source(source: S) -> Self {
        let mut sentinel = Self { source, last: None };
        if let Err(error) = sentinel.observe() {
            warn!(%error, "could not read a baseline of kernel statistics");
        }
        sentinel
    }

    /// returns a [`Recording`] of cpu time since this was last called.
    ///
    /// NB: this returns `Ok(None)` if there is no previous snapshot to compare against.
    pub fn observe(&mut self) -> Result<Option<Recording>, StatReadError> {
        let Self { source, last } = self;

        let new = Snapshot::read(&*source)?;
        let recording = last
            .replace(new.clone())
            .map(|prev| Recording::new(prev, new));

        Ok(recording)
    }

    fn unavailable() -> Vec<MetricSample> {
        vec![MetricSample::unavailable(Self::NAME, Some(100.0), Unit::Percent)]
    }
}

impl<S: Pseudofile> MetricSource for Sentinel<S> {
    fn sample(&mut self) -> Vec<MetricSample> {
        match self.observe() {
            Ok(Some(recording)) => recording.samples(Self::NAME),
            Ok(None) => Self::unavailable(),
            Err(error) => {
                warn!(%error, "cpu utilization is unavailable");
                Self::unavailable()
            }
        }
    }
}

// === impl Recording ===

impl Recording {
    /// compares two snapshots.
    ///
    /// cpus that only appear in `b` (brought online in between) are left out.
    fn new(
        Snapshot {
            system: system_a,
            cpus: mut cpus_a,
        }: Snapshot,
        Snapshot {
            system: system_b,
            cpus: cpus_b,
        }: Snapshot,
    ) -> Recording {
        let system = Measurement::new(system_a, system_b);

        let cpus = cpus_b
            .into_iter()
            .filter_map(|(id, time_b)| {
                let time_a = cpus_a.remove(&id)?;
                Some((id, Measurement::new(time_a, time_b)))
            })
            .collect();

        Self { system, cpus }
    }

    /// returns the aggregate utilization, followed by each cpu's.
    fn samples(&self, name: &str) -> Vec<MetricSample> {
        let Self { system, cpus } = self;
        let sample = |name: String, measurement: &Measurement| MetricSample {
            name,
            value: measurement.utilization(),
            max_value: Some(100.0),
            unit: Unit::Percent,
            device: None,
        };

        std::iter::once(sample(name.to_owned(), system))
            .chain(cpus.iter().map(|(id, m)| sample(id.to_string(), m)))
            .collect()
    }
}
