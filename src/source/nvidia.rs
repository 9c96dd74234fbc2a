use {
    super::{MetricSource, MetricUnavailable},
    crate::metric::{MetricSample, Unit},
    std::process::Command,
    tracing::{debug, warn},
};

/// reports nvidia gpus, by querying `nvidia-smi`.
///
/// if the first query fails, the host is assumed to have no nvidia gpus and the source stays
/// silent from then on.
pub struct NvidiaSmi {
    program: &'static str,
    /// the names of the gpus seen in the last successful query.
    names: Vec<String>,
    enabled: bool,
}

/// one row of `nvidia-smi --query-gpu` output.
#[derive(Clone, Debug, PartialEq)]
pub struct GpuRecord {
    pub index: usize,
    pub name: String,
    /// percent.
    pub utilization: Option<f64>,
    /// bytes.
    pub memory_used: Option<f64>,
    /// bytes.
    pub memory_total: Option<f64>,
    /// degrees celsius.
    pub temperature: Option<f64>,
}

// === impl NvidiaSmi ===

impl NvidiaSmi {
    const PROGRAM: &str = "nvidia-smi";
    const ARGS: [&str; 2] = [
        "--query-gpu=index,name,utilization.gpu,memory.used,memory.total,temperature.gpu",
        "--format=csv,noheader,nounits",
    ];

    pub fn new() -> Self {
        Self::with_program(Self::PROGRAM)
    }

    pub fn with_program(program: &'static str) -> Self {
        Self {
            program,
            names: Vec::new(),
            enabled: true,
        }
    }

    fn query(&self) -> Result<Vec<GpuRecord>, MetricUnavailable> {
        let output = Command::new(self.program).args(Self::ARGS).output()?;
        if !output.status.success() {
            return Err(MetricUnavailable::Command {
                program: self.program,
                status: output.status,
            });
        }

        GpuRecord::parse_all(&String::from_utf8_lossy(&output.stdout))
    }
}

impl Default for NvidiaSmi {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricSource for NvidiaSmi {
    fn sample(&mut self) -> Vec<MetricSample> {
        if !self.enabled {
            return Vec::new();
        }

        match self.query() {
            Ok(records) => {
                self.names = records.iter().map(|record| record.name.clone()).collect();
                records.iter().flat_map(GpuRecord::samples).collect()
            }
            Err(error) if self.names.is_empty() => {
                debug!(%error, "no nvidia gpus found");
                self.enabled = false;
                Vec::new()
            }
            Err(error) => {
                warn!(%error, "gpu metrics are unavailable");
                self.names
                    .iter()
                    .enumerate()
                    .flat_map(|(index, name)| GpuRecord::unavailable(index, name.clone()).samples())
                    .collect()
            }
        }
    }
}

// === impl GpuRecord ===

impl GpuRecord {
    const FIELDS: [&str; 6] = [
        "index",
        "name",
        "utilization.gpu",
        "memory.used",
        "memory.total",
        "temperature.gpu",
    ];
    const BYTES_PER_MIB: f64 = (1_u64 << 20) as f64;
    const MAX_TEMPERATURE: f64 = 100.0;

    /// parses `csv,noheader,nounits` output, one gpu per line.
    pub fn parse_all(output: &str) -> Result<Vec<Self>, MetricUnavailable> {
        output
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::parse)
            .collect()
    }

    fn unavailable(index: usize, name: String) -> Self {
        Self {
            index,
            name,
            utilization: None,
            memory_used: None,
            memory_total: None,
            temperature: None,
        }
    }

    /// parses a reading such as `45`. readings like `[N/A]` or `[Not Supported]` are `None`.
    fn reading(field: &str) -> Option<f64> {
        field.trim().parse::<f64>().ok().filter(|v| v.is_finite())
    }

    /// returns this gpu's load, memory and temperature, under a heading of its name.
    pub fn samples(&self) -> Vec<MetricSample> {
        let Self {
            index,
            name,
            utilization,
            memory_used,
            memory_total,
            temperature,
        } = self;
        let sample = |suffix: &str, value: Option<f64>, max_value: Option<f64>, unit| MetricSample {
            name: format!("gpu{index} {suffix}"),
            value,
            max_value,
            unit,
            device: Some(name.clone()).filter(|name| !name.is_empty()),
        };

        vec![
            sample("load", *utilization, Some(100.0), Unit::Percent),
            sample("memory", *memory_used, *memory_total, Unit::Bytes),
            sample("temperature", *temperature, Some(Self::MAX_TEMPERATURE), Unit::Celsius),
        ]
    }
}

impl std::str::FromStr for GpuRecord {
    type Err = MetricUnavailable;
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut fields = line.split(',');
        let mut next = |i: usize| fields.next().ok_or(MetricUnavailable::MissingField(Self::FIELDS[i]));

        let index = next(0)?.trim().parse::<usize>()?;
        let name = next(1)?.trim().to_owned();
        let utilization = Self::reading(next(2)?);
        let memory_used = Self::reading(next(3)?).map(|mib| mib * Self::BYTES_PER_MIB);
        let memory_total = Self::reading(next(4)?).map(|mib| mib * Self::BYTES_PER_MIB);
        let temperature = Self::reading(next(5)?);

        Ok(Self {
            index,
            name,
            utilization,
            memory_used,
            memory_total,
            temperature,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTPUT: &str = "\
0, NVIDIA GeForce RTX 3080, 12, 1024, 10240, 45
1, Tesla T4, [N/A], 0, 15360, [Not Supported]
";

    #[test]
    fn parse() {
        let records = GpuRecord::parse_all(OUTPUT).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0],
            GpuRecord {
                index: 0,
                name: "NVIDIA GeForce RTX 3080".to_owned(),
                utilization: Some(12.0),
                memory_used: Some(1024.0 * 1048576.0),
                memory_total: Some(10240.0 * 1048576.0),
                temperature: Some(45.0),
            }
        );
        assert_eq!(records[1].utilization, None);
        assert_eq!(records[1].temperature, None);
    }

    #[test]
    fn short_rows_are_rejected() {
        let err = GpuRecord::parse_all("0, Tesla T4, 12\n").unwrap_err();
        assert!(matches!(err, MetricUnavailable::MissingField("memory.used")));
    }

    #[test]
    fn samples_per_gpu() {
        let records = GpuRecord::parse_all(OUTPUT).unwrap();
        let names = records
            .iter()
            .flat_map(GpuRecord::samples)
            .map(|s| s.name)
            .collect::<Vec<_>>();
        assert_eq!(
            names,
            [
                "gpu0 load",
                "gpu0 memory",
                "gpu0 temperature",
                "gpu1 load",
                "gpu1 memory",
                "gpu1 temperature",
            ]
        );
    }

    #[test]
    fn samples_are_headed_by_the_gpu_name() {
        let records = GpuRecord::parse_all(OUTPUT).unwrap();
        let devices = records
            .iter()
            .flat_map(GpuRecord::samples)
            .map(|s| s.device)
            .collect::<Vec<_>>();
        assert_eq!(devices[0].as_deref(), Some("NVIDIA GeForce RTX 3080"));
        assert_eq!(devices[5].as_deref(), Some("Tesla T4"));

        let unnamed = GpuRecord::parse_all("2, , 1, 1, 2, 30\n").unwrap();
        assert!(unnamed[0].samples().iter().all(|s| s.device.is_none()));
    }

    #[test]
    fn missing_program_disables_the_source() {
        let mut smi = NvidiaSmi::with_program("pdwnutil-test-no-such-program");
        assert!(smi.sample().is_empty());
        assert!(!smi.enabled);
        assert!(smi.sample().is_empty());
    }

    #[test]
    fn known_gpus_become_unavailable() {
        let mut smi = NvidiaSmi::with_program("pdwnutil-test-no-such-program");
        smi.names = vec!["Tesla T4".to_owned()];
        let samples = smi.sample();
        assert_eq!(samples.len(), 3);
        assert!(samples.iter().all(|s| s.value.is_none()));
        assert!(samples.iter().all(|s| s.device.as_deref() == Some("Tesla T4")));
        assert!(smi.enabled);
    }
}
