//! the hardware status dashboard.

use {
    crate::{Error, MetricHistory, MetricRenderer, Render, source::MetricSource},
    std::io::Write,
    tracing::trace,
};

/// polls a set of metric sources, and draws their smoothed samples.
pub struct Dashboard {
    sources: Vec<Box<dyn MetricSource>>,
    history: MetricHistory,
    renderer: MetricRenderer,
}

// === impl Dashboard ===

impl Dashboard {
    pub fn new(sources: Vec<Box<dyn MetricSource>>) -> Self {
        Self::with_renderer(sources, MetricRenderer::default())
    }

    pub fn with_renderer(sources: Vec<Box<dyn MetricSource>>, renderer: MetricRenderer) -> Self {
        Self {
            sources,
            history: MetricHistory::default(),
            renderer,
        }
    }

    /// returns a dashboard showing the sources available on this host.
    pub fn host() -> Self {
        Self::new(crate::source::host())
    }

    pub fn history(&self) -> &MetricHistory {
        &self.history
    }
}

impl Render for Dashboard {
    fn render(&mut self, out: &mut dyn Write) -> Result<(), Error> {
        let Self {
            sources,
            history,
            renderer,
        } = self;

        let samples = sources
            .iter_mut()
            .flat_map(|source| source.sample())
            .collect::<Vec<_>>();
        trace!(samples = samples.len(), "sampled metrics");

        let (next, smoothed) = std::mem::take(history).update(samples);
        *history = next;

        renderer.render(&smoothed, out)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{MetricSample, Unit},
    };

    /// yields a fixed sequence of cpu readings, then nothing.
    struct Script(Vec<Option<f64>>);

    impl MetricSource for Script {
        fn sample(&mut self) -> Vec<MetricSample> {
            let Self(values) = self;
            if values.is_empty() {
                return Vec::new();
            }
            let sample = match values.remove(0) {
                Some(value) => MetricSample::new("cpu", value, Some(100.0), Unit::Percent),
                None => MetricSample::unavailable("cpu", Some(100.0), Unit::Percent),
            };
            vec![sample]
        }
    }

    fn frame(dashboard: &mut Dashboard) -> String {
        let mut out = Vec::<u8>::new();
        dashboard.render(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn samples_are_smoothed_across_frames() {
        let mut dashboard = Dashboard::new(vec![Box::new(Script(vec![Some(100.0), Some(0.0)]))]);

        let first = frame(&mut dashboard);
        assert!(first.contains("100%"), "{first:?}");
        assert_eq!(dashboard.history().get("cpu"), Some(100.0));

        let second = frame(&mut dashboard);
        assert!(second.contains(" 90%"), "{second:?}");
        assert_eq!(dashboard.history().get("cpu"), Some(90.0));
    }

    #[test]
    fn unavailable_samples_keep_their_average() {
        let mut dashboard = Dashboard::new(vec![Box::new(Script(vec![Some(40.0), None]))]);

        let _ = frame(&mut dashboard);
        let second = frame(&mut dashboard);
        assert!(second.contains("N/A"), "{second:?}");
        assert_eq!(dashboard.history().get("cpu"), Some(40.0));
    }

    #[test]
    fn one_line_per_sample() {
        let sources: Vec<Box<dyn MetricSource>> = vec![
            Box::new(Script(vec![Some(10.0)])),
            Box::new(Script(vec![Some(20.0)])),
        ];
        let mut dashboard = Dashboard::new(sources);
        assert_eq!(frame(&mut dashboard).lines().count(), 2);
    }

    #[test]
    fn no_sources_draw_nothing() {
        let mut dashboard = Dashboard::new(Vec::new());
        assert_eq!(frame(&mut dashboard), "");
    }
}
