use super::*;

/// how long a cpu has spent in each state since boot.
///
/// see `proc_stat(5)` for the meaning of each field.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CpuTime {
    user: UserHz,
    /// user mode, with low priority.
    nice: UserHz,
    system: UserHz,
    idle: UserHz,
    /// waiting for i/o to complete. not reliable, and may decrease.
    iowait: UserHz,
    irq: UserHz,
    softirq: UserHz,
    /// time spent in other operating systems, when running virtualized.
    steal: UserHz,
    guest: UserHz,
    guest_nice: UserHz,
}

/// the cpu time spent between two readings of a [`CpuTime`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Measurement(CpuTime);

// == impl Measurement ===

impl Measurement {
    /// returns the time spent between readings `a` and `b`.
    pub fn new(a: CpuTime, b: CpuTime) -> Self {
        let a: [_; CpuTime::FIELDS] = a.into();
        let b: [_; CpuTime::FIELDS] = b.into();

        let mut delta = [UserHz::default(); CpuTime::FIELDS];
        for (d, (a, b)) in delta.iter_mut().zip(a.into_iter().zip(b)) {
            *d = b - a;
        }

        Self(CpuTime::from(delta))
    }

    /// returns the share of time the cpu was busy, in percent.
    ///
    /// this is `None` if no time elapsed at all.
    pub fn utilization(&self) -> Option<f64> {
        let total = self.total();
        if total == UserHz::default() {
            return None;
        }

        let percent = (self.active() / total) * 100.0;
        Some(percent.clamp(0.0, 100.0))
    }

    pub fn active(&self) -> UserHz {
        let Self(time) = self;
        time.total() - time.idle
    }

    pub fn total(&self) -> UserHz {
        let Self(time) = self;
        time.total()
    }
}

// === impl CpuTime ===

impl CpuTime {
    const FIELDS: usize = 10;

    /// returns the sum of every state, idle included.
    pub fn total(&self) -> UserHz {
        let Self {
            user,
            nice,
            system,
            idle,
            iowait,
            irq,
            softirq,
            steal,
            // guest time is already counted in `user` and `nice`.
            guest: _,
            guest_nice: _,
        } = *self;

        [user, nice, system, idle, iowait, irq, softirq, steal]
            .into_iter()
            .sum()
    }
}

impl TryFrom<Vec<UserHz>> for CpuTime {
    type Error = EntryParseError;
    fn try_from(times: Vec<UserHz>) -> Result<Self, Self::Error> {
        let found = times.len();
        <[UserHz; Self::FIELDS]>::try_from(times)
            .map(Self::from)
            .map_err(|_| EntryParseError::CpuTime { found })
    }
}

impl From<[UserHz; CpuTime::FIELDS]> for CpuTime {
    fn from(
        [
            user,
            nice,
            system,
            idle,
            iowait,
            irq,
            softirq,
            steal,
            guest,
            guest_nice,
        ]: [UserHz; CpuTime::FIELDS],
    ) -> Self {
        Self {
            user,
            nice,
            system,
            idle,
            iowait,
            irq,
            softirq,
            steal,
            guest,
            guest_nice,
        }
    }
}

impl From<CpuTime> for [UserHz; CpuTime::FIELDS] {
    fn from(
        CpuTime {
            user,
            nice,
            system,
            idle,
            iowait,
            irq,
            softirq,
            steal,
            guest,
            guest_nice,
        }: CpuTime,
    ) -> Self {
        [
            user, nice, system, idle, iowait, irq, softirq, steal, guest, guest_nice,
        ]
    }
}
