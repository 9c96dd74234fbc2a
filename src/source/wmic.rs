//! windows management instrumentation, through the `wmic` command.

use {
    super::{CpuInfo, MetricSource, MetricUnavailable, Record},
    crate::metric::{MetricSample, Unit},
    std::process::Command,
    tracing::warn,
};

/// reports cpu load, clock speed and memory in use, by querying `wmic`.
#[derive(Default)]
pub struct Wmic {
    /// the last known maximum clock speed, in hertz.
    max_frequency: Option<f64>,
    /// the last known total memory, in bytes.
    total_memory: Option<f64>,
    /// the last known processor heading.
    device: Option<String>,
}

// === impl Wmic ===

impl Wmic {
    const PROGRAM: &str = "wmic";
    const HZ_PER_MHZ: f64 = 1e6;
    const BYTES_PER_KIB: f64 = 1024.0;

    pub fn new() -> Self {
        Self::default()
    }

    /// runs `wmic <class> get <properties>`, and parses its table.
    fn get(class: &str, properties: &[&str]) -> Result<Vec<Record>, MetricUnavailable> {
        let output = Command::new(Self::PROGRAM)
            .arg(class)
            .arg("get")
            .arg(properties.join(","))
            .output()?;
        if !output.status.success() {
            return Err(MetricUnavailable::Command {
                program: Self::PROGRAM,
                status: output.status,
            });
        }

        Ok(Record::parse_table(class, &String::from_utf8_lossy(&output.stdout))?)
    }

    fn cpu(&mut self) -> Result<[MetricSample; 2], MetricUnavailable> {
        let records = Self::get(
            "cpu",
            &[
                "CurrentClockSpeed",
                "LoadPercentage",
                "MaxClockSpeed",
                "Name",
                "NumberOfCores",
                "NumberOfLogicalProcessors",
            ],
        )?;
        let cpu = records.first().ok_or(MetricUnavailable::MissingField("cpu"))?;

        if let Some(info) = Self::processor(cpu) {
            self.device = Some(info.to_string());
        }

        if let Some(max) = cpu.number("MaxClockSpeed") {
            self.max_frequency = Some(max * Self::HZ_PER_MHZ);
        }
        let load = cpu
            .number("LoadPercentage")
            .ok_or(MetricUnavailable::MissingField("LoadPercentage"))?;
        let frequency = cpu
            .number("CurrentClockSpeed")
            .ok_or(MetricUnavailable::MissingField("CurrentClockSpeed"))?;

        Ok([
            MetricSample::new("cpu", load, Some(100.0), Unit::Percent),
            MetricSample::new("frequency", frequency * Self::HZ_PER_MHZ, self.max_frequency, Unit::Hertz),
        ])
    }

    /// returns the model and core counts of a `Win32_Processor` record.
    fn processor(cpu: &Record) -> Option<CpuInfo> {
        let model = cpu.text("Name")?;
        let cores = cpu.number("NumberOfCores")? as usize;
        let threads = cpu.number("NumberOfLogicalProcessors").map_or(cores, |n| n as usize);

        Some(CpuInfo {
            model,
            cores,
            threads,
        })
    }

    fn memory(&mut self) -> Result<MetricSample, MetricUnavailable> {
        let records = Self::get("os", &["FreePhysicalMemory", "TotalVisibleMemorySize"])?;
        let os = records.first().ok_or(MetricUnavailable::MissingField("os"))?;

        let total = os
            .number("TotalVisibleMemorySize")
            .ok_or(MetricUnavailable::MissingField("TotalVisibleMemorySize"))?
            * Self::BYTES_PER_KIB;
        let free = os
            .number("FreePhysicalMemory")
            .ok_or(MetricUnavailable::MissingField("FreePhysicalMemory"))?
            * Self::BYTES_PER_KIB;
        self.total_memory = Some(total);

        Ok(MetricSample::new("memory", total - free, Some(total), Unit::Bytes))
    }
}

impl MetricSource for Wmic {
    fn sample(&mut self) -> Vec<MetricSample> {
        let mut samples = match self.cpu() {
            Ok(cpu) => Vec::from(cpu),
            Err(error) => {
                warn!(%error, "cpu metrics are unavailable");
                vec![
                    MetricSample::unavailable("cpu", Some(100.0), Unit::Percent),
                    MetricSample::unavailable("frequency", self.max_frequency, Unit::Hertz),
                ]
            }
        };
        if let Some(device) = &self.device {
            samples = samples
                .into_iter()
                .map(|sample| sample.with_device(device.as_str()))
                .collect();
        }

        samples.push(self.memory().unwrap_or_else(|error| {
            warn!(%error, "memory usage is unavailable");
            MetricSample::unavailable("memory", self.total_memory, Unit::Bytes)
        }));

        samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn processor_heading() {
        let output = "\
Name                                     NumberOfCores  NumberOfLogicalProcessors
Intel(R) Core(TM) i7-8700 CPU @ 3.20GHz  6              12
";
        let records = Record::parse_table("cpu", output).unwrap();
        let info = Wmic::processor(&records[0]).unwrap();
        assert_eq!(
            info.to_string(),
            "Intel(R) Core(TM) i7-8700 CPU @ 3.20GHz (6 cores, 12 threads)"
        );
    }

    #[test]
    fn processor_without_a_name() {
        let records = Record::parse_table("cpu", "NumberOfCores\n4\n").unwrap();
        assert_eq!(Wmic::processor(&records[0]), None);
    }
}
