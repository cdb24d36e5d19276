use clap::Parser;
use ridereport::{
    config::{Args, PipelineConfig},
    pipeline,
};
use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    std::panic::set_hook(Box::new(|info| {
        eprintln!("panic: {:?}", info);
    }));

    // ─── 2) configure ────────────────────────────────────────────────
    let config = PipelineConfig::from(Args::parse());

    // ─── 3) run; only an unopenable store ends up here ──────────────
    if let Err(e) = pipeline::run(&config) {
        error!("aborting: {:#}", e);
        std::process::exit(1);
    }
}
