use {
    super::{MetricSource, MetricUnavailable, ProcFile, Pseudofile},
    crate::metric::{MetricSample, Unit},
    tracing::warn,
};

/// reports memory in use, from `/proc/meminfo`.
///
/// memory in use is the total minus what the kernel estimates to be available for new
/// allocations without swapping.
pub struct Memory<F = ProcFile> {
    file: F,
    /// the last known total, kept so that a failed read still shows the scale.
    total: Option<f64>,
}

/// the fields of `/proc/meminfo` this source needs, in bytes.
#[derive(Debug, Eq, PartialEq)]
struct MemInfo {
    total: u64,
    available: u64,
}

// === impl Memory ===

impl Memory {
    pub fn new() -> Self {
        Self::with_file(ProcFile::new(ProcFile::MEMINFO))
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Pseudofile> Memory<F> {
    const NAME: &str = "memory";

    pub fn with_file(file: F) -> Self {
        Self { file, total: None }
    }

    fn read(&self) -> Result<MemInfo, MetricUnavailable> {
        let contents = self.file.contents()?;
        MemInfo::parse(&contents)
    }
}

impl<F: Pseudofile> MetricSource for Memory<F> {
    fn sample(&mut self) -> Vec<MetricSample> {
        let sample = match self.read() {
            Ok(MemInfo { total, available }) => {
                let total = total as f64;
                self.total = Some(total);
                MetricSample::new(
                    Self::NAME,
                    total - available as f64,
                    Some(total),
                    Unit::Bytes,
                )
            }
            Err(error) => {
                warn!(%error, "memory usage is unavailable");
                MetricSample::unavailable(Self::NAME, self.total, Unit::Bytes)
            }
        };

        vec![sample]
    }
}

// === impl MemInfo ===

impl MemInfo {
    const TOTAL: &str = "MemTotal";
    const AVAILABLE: &str = "MemAvailable";

    fn parse(contents: &str) -> Result<Self, MetricUnavailable> {
        let (mut total, mut available) = (None, None);

        for line in contents.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let slot = match key.trim() {
                Self::TOTAL => &mut total,
                Self::AVAILABLE => &mut available,
                _ => continue,
            };
            *slot = Some(Self::parse_kib(value)?);
        }

        Ok(Self {
            total: total.ok_or(MetricUnavailable::MissingField(Self::TOTAL))?,
            available: available.ok_or(MetricUnavailable::MissingField(Self::AVAILABLE))?,
        })
    }

    /// parses a value like `16318412 kB` into bytes.
    fn parse_kib(value: &str) -> Result<u64, MetricUnavailable> {
        let value = value.trim();
        let kib = value.strip_suffix("kB").unwrap_or(value).trim();
        let kib = kib.parse::<u64>()?;
        Ok(kib.saturating_mul(1024))
    }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::source::MockFile};

    const MEMINFO: &str = "\
MemTotal:       16318412 kB
MemFree:         1024000 kB
MemAvailable:    8159206 kB
Buffers:          512000 kB
HugePages_Total:       0
";

    #[test]
    fn parse() {
        let info = MemInfo::parse(MEMINFO).unwrap();
        assert_eq!(
            info,
            MemInfo {
                total: 16318412 * 1024,
                available: 8159206 * 1024,
            }
        );
    }

    #[test]
    fn missing_available() {
        let err = MemInfo::parse("MemTotal: 100 kB\n").unwrap_err();
        assert!(matches!(err, MetricUnavailable::MissingField("MemAvailable")));
    }

    #[test]
    fn invalid_value() {
        let err = MemInfo::parse("MemTotal: lots kB\nMemAvailable: 1 kB\n").unwrap_err();
        assert!(matches!(err, MetricUnavailable::Int(_)));
    }

    #[test]
    fn sample_is_used_of_total() {
        let mut memory = Memory::with_file(MockFile::new([MEMINFO]));
        let [sample]: [MetricSample; 1] = memory.sample().try_into().unwrap();
        assert_eq!(sample.name, "memory");
        assert_eq!(sample.unit, Unit::Bytes);
        assert_eq!(sample.max_value, Some((16318412_u64 * 1024) as f64));
        assert_eq!(sample.value, Some(((16318412_u64 - 8159206) * 1024) as f64));
    }

    #[test]
    fn failed_read_keeps_the_last_total() {
        let mut memory = Memory::with_file(MockFile::new([MEMINFO]));
        let _ = memory.sample();
        let [sample]: [MetricSample; 1] = memory.sample().try_into().unwrap();
        assert_eq!(sample.value, None);
        assert_eq!(sample.max_value, Some((16318412_u64 * 1024) as f64));
    }
}
