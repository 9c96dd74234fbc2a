//! single-value files under `/sys`.

use {
    super::{MetricSource, MetricUnavailable, ProcFile, Pseudofile},
    crate::metric::{MetricSample, Unit},
    std::{
        fs,
        path::{Path, PathBuf},
        str::FromStr,
    },
    tracing::{debug, warn},
};

/// reports the clock speed of the first cpu, from `cpufreq`.
pub struct CpuFrequency<F = ProcFile> {
    /// the current frequency, in kHz.
    current: F,
    /// the maximum frequency, in kHz.
    max: F,
}

/// reports a temperature from a thermal zone.
pub struct Thermal<F = ProcFile> {
    /// the temperature, in millidegrees celsius.
    file: F,
}

/// reads a file holding a single number.
fn read_value<T: FromStr>(file: &impl Pseudofile) -> Result<T, MetricUnavailable>
where
    MetricUnavailable: From<T::Err>,
{
    let contents = file.contents()?;
    Ok(contents.trim().parse::<T>()?)
}

/// returns the entries of `dir` named `<prefix><n>`, ordered by `n`.
fn numbered(dir: &Path, prefix: &str) -> Vec<PathBuf> {
    let mut entries = fs::read_dir(dir)
        .into_iter()
        .flatten()
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let n = entry
                .file_name()
                .to_str()?
                .strip_prefix(prefix)?
                .parse::<u32>()
                .ok()?;
            Some((n, entry.path()))
        })
        .collect::<Vec<_>>();

    entries.sort();
    entries.into_iter().map(|(_, path)| path).collect()
}

// === impl CpuFrequency ===

impl CpuFrequency {
    const CURRENT: &str = "/sys/devices/system/cpu/cpu0/cpufreq/scaling_cur_freq";
    const MAX: &str = "/sys/devices/system/cpu/cpu0/cpufreq/cpuinfo_max_freq";

    pub fn new() -> Self {
        Self::with_files(ProcFile::new(Self::CURRENT), ProcFile::new(Self::MAX))
    }
}

impl Default for CpuFrequency {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Pseudofile> CpuFrequency<F> {
    const NAME: &str = "frequency";
    const HZ_PER_KHZ: f64 = 1e3;

    pub fn with_files(current: F, max: F) -> Self {
        Self { current, max }
    }
}

impl<F: Pseudofile> MetricSource for CpuFrequency<F> {
    fn sample(&mut self) -> Vec<MetricSample> {
        let max = read_value::<u64>(&self.max)
            .map(|khz| khz as f64 * Self::HZ_PER_KHZ)
            .ok();

        let sample = match read_value::<u64>(&self.current) {
            Ok(khz) => MetricSample::new(Self::NAME, khz as f64 * Self::HZ_PER_KHZ, max, Unit::Hertz),
            Err(error) => {
                warn!(%error, "cpu frequency is unavailable");
                MetricSample::unavailable(Self::NAME, max, Unit::Hertz)
            }
        };

        vec![sample]
    }
}

// === impl Thermal ===

impl Thermal {
    const THERMAL: &str = "/sys/class/thermal";
    const HWMON: &str = "/sys/class/hwmon";
    const PACKAGE_ZONE: &str = "x86_pkg_temp";
    const CORETEMP: &str = "coretemp";

    pub fn new() -> Self {
        let path = Self::locate(Path::new(Self::THERMAL), Path::new(Self::HWMON));
        debug!(path = %path.display(), "reading cpu temperature");
        Self::with_file(ProcFile::new(path))
    }

    /// finds the cpu package sensor.
    ///
    /// this is the thermal zone of type `x86_pkg_temp` if there is one, then the first
    /// `coretemp` hwmon device, and finally thermal zone 0.
    fn locate(thermal: &Path, hwmon: &Path) -> PathBuf {
        let named = |dir: &PathBuf, file: &str, name: &str| {
            ProcFile::new(dir.join(file))
                .contents()
                .is_ok_and(|contents| contents.trim() == name)
        };

        let package = || {
            numbered(thermal, "thermal_zone")
                .into_iter()
                .find(|zone| named(zone, "type", Self::PACKAGE_ZONE))
                .map(|zone| zone.join("temp"))
        };
        let coretemp = || {
            numbered(hwmon, "hwmon")
                .into_iter()
                .find(|device| named(device, "name", Self::CORETEMP))
                .map(|device| device.join("temp1_input"))
        };

        package()
            .or_else(coretemp)
            .unwrap_or_else(|| thermal.join("thermal_zone0").join("temp"))
    }
}

impl Default for Thermal {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Pseudofile> Thermal<F> {
    const NAME: &str = "temperature";
    /// the top of the temperature scale, in degrees celsius.
    const MAX: f64 = 100.0;

    pub fn with_file(file: F) -> Self {
        Self { file }
    }
}

impl<F: Pseudofile> MetricSource for Thermal<F> {
    fn sample(&mut self) -> Vec<MetricSample> {
        let sample = match read_value::<i64>(&self.file) {
            Ok(millis) => MetricSample::new(Self::NAME, millis as f64 / 1e3, Some(Self::MAX), Unit::Celsius),
            Err(error) => {
                warn!(%error, "temperature is unavailable");
                MetricSample::unavailable(Self::NAME, Some(Self::MAX), Unit::Celsius)
            }
        };

        vec![sample]
    }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::source::MockFile};

    /// creates `dir/file` holding `contents`.
    fn put(dir: &Path, file: &str, contents: &str) {
        let path = dir.join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn frequency() {
        let mut freq = CpuFrequency::with_files(
            MockFile::new(["1800000\n"]),
            MockFile::new(["3600000\n"]),
        );
        let samples = freq.sample();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].value, Some(1.8e9));
        assert_eq!(samples[0].max_value, Some(3.6e9));
        assert_eq!(samples[0].ratio(), Some(0.5));
    }

    #[test]
    fn frequency_without_a_maximum() {
        let mut freq = CpuFrequency::with_files(MockFile::new(["1800000\n"]), MockFile::missing());
        let samples = freq.sample();
        assert_eq!(samples[0].value, Some(1.8e9));
        assert_eq!(samples[0].max_value, None);
    }

    #[test]
    fn temperature() {
        let mut thermal = Thermal::with_file(MockFile::new(["45500\n"]));
        let samples = thermal.sample();
        assert_eq!(samples[0].name, "temperature");
        assert_eq!(samples[0].value, Some(45.5));
        assert_eq!(samples[0].unit, Unit::Celsius);
    }

    #[test]
    fn missing_sensor_is_unavailable() {
        let mut thermal = Thermal::with_file(MockFile::missing());
        let samples = thermal.sample();
        assert_eq!(samples[0].value, None);
        assert_eq!(samples[0].max_value, Some(100.0));
    }

    #[test]
    fn garbage_is_unavailable() {
        let mut thermal = Thermal::with_file(MockFile::new(["hot\n"]));
        assert_eq!(thermal.sample()[0].value, None);
    }

    #[test]
    fn package_zone_is_preferred() {
        let root = tempfile::tempdir().unwrap();
        let (thermal, hwmon) = (root.path().join("thermal"), root.path().join("hwmon"));
        put(&thermal, "thermal_zone0/type", "acpitz\n");
        put(&thermal, "thermal_zone1/type", "iwlwifi_1\n");
        put(&thermal, "thermal_zone10/type", "x86_pkg_temp\n");
        put(&thermal, "thermal_zone2/type", "x86_pkg_temp\n");
        put(&hwmon, "hwmon0/name", "coretemp\n");

        let path = Thermal::locate(&thermal, &hwmon);
        assert_eq!(path, thermal.join("thermal_zone2/temp"));
    }

    #[test]
    fn coretemp_is_the_fallback() {
        let root = tempfile::tempdir().unwrap();
        let (thermal, hwmon) = (root.path().join("thermal"), root.path().join("hwmon"));
        put(&thermal, "thermal_zone0/type", "acpitz\n");
        put(&hwmon, "hwmon0/name", "acpitz\n");
        put(&hwmon, "hwmon1/name", "coretemp\n");

        let path = Thermal::locate(&thermal, &hwmon);
        assert_eq!(path, hwmon.join("hwmon1/temp1_input"));
    }

    #[test]
    fn zone_zero_is_the_last_resort() {
        let root = tempfile::tempdir().unwrap();
        let (thermal, hwmon) = (root.path().join("thermal"), root.path().join("hwmon"));
        put(&thermal, "thermal_zone0/type", "acpitz\n");

        assert_eq!(Thermal::locate(&thermal, &hwmon), thermal.join("thermal_zone0/temp"));

        let missing = root.path().join("missing");
        assert_eq!(Thermal::locate(&missing, &missing), missing.join("thermal_zone0/temp"));
    }
}
