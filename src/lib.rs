//! terminal utilities that redraw a frame in place.
//!
//! a [`Session`] switches the terminal to the alternate screen for as long as it lives. inside
//! it, a [`Refresh`] loop draws a frame with some [`Render`] implementation at a fixed
//! interval, until an [`Interrupt`] arrives. two frames are provided: [`Subprocess`] runs a
//! command and shows its output, and [`Dashboard`] draws hardware metrics.

pub use self::{
    dashboard::Dashboard,
    error::{Error, SubprocessError},
    escape::EscapeWriter,
    interrupt::{Interrupt, Trigger},
    metric::{MetricHistory, MetricSample, Unit},
    refresh::{Interval, IntervalError, Mode, Refresh, Render},
    render::{Band, MetricRenderer},
    session::Session,
    watch::Subprocess,
};

pub mod cli;
pub mod source;

mod dashboard;
mod error;
mod escape;
mod interrupt;
mod meter;
mod metric;
mod refresh;
mod render;
mod session;
mod watch;
