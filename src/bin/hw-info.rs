use {
    clap::Parser,
    pdwnutil::{Dashboard, Error, Interrupt, Session, cli::HwInfoArgs},
    std::io,
    tracing::info,
};

fn main() {
    if let Err(e) = run() {
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let HwInfoArgs { refresh, log } = HwInfoArgs::parse();
    log.init()?;

    let mut dashboard = Dashboard::host();
    let refresh = refresh.refresh();
    let interrupt = Interrupt::install().map_err(Error::from)?;
    info!(interval = %refresh.interval(), "showing hardware status");

    Session::scope(io::stdout().lock(), |out| {
        refresh.run(out, &interrupt, &mut dashboard)
    })?;

    Ok(())
}
