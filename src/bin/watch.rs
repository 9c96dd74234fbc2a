use {
    clap::Parser,
    pdwnutil::{Error, Interrupt, Session, Subprocess, cli::WatchArgs},
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
    let WatchArgs {
        refresh,
        strict,
        log,
        command,
    } = WatchArgs::parse();
    log.init()?;

    let mut subprocess = Subprocess::new(command, strict)?;
    let refresh = refresh.refresh();
    let interrupt = Interrupt::install().map_err(Error::from)?;
    info!(?subprocess, interval = %refresh.interval(), "watching");

    Session::scope(io::stdout().lock(), |out| {
        refresh.run(out, &interrupt, &mut subprocess)
    })?;

    Ok(())
}
