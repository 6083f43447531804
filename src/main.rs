use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

use exprtree::cli::{execute_command, output, Cli, CliError};
use exprtree::config::Settings;

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let settings = match std::env::current_dir()
        .map_err(CliError::from)
        .and_then(|cwd| Settings::load(Some(cwd.as_path())).map_err(CliError::from))
    {
        Ok(settings) => settings,
        Err(e) => exit_with(e),
    };

    if let Err(e) = execute_command(&cli, &settings) {
        exit_with(e);
    }
}

fn exit_with(e: CliError) -> ! {
    tracing::debug!("exiting: {:?}", e);
    output::error(&e);
    std::process::exit(e.exit_code());
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        3 => LevelFilter::TRACE,
        _ => {
            eprintln!("Don't be crazy, max is -v -v -v");
            LevelFilter::TRACE
        }
    };

    // Only our own spans and events
    let module_filter = filter_fn(|metadata| metadata.target().starts_with("exprtree"));

    // Create a subscriber with formatted output directed to stderr
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    let filtered_layer = fmt_layer.with_filter(filter).with_filter(module_filter);

    tracing_subscriber::registry().with(filtered_layer).init();

    match filter {
        LevelFilter::INFO => tracing::info!("Debug mode: info"),
        LevelFilter::DEBUG => tracing::debug!("Debug mode: debug"),
        LevelFilter::TRACE => tracing::debug!("Debug mode: trace"),
        _ => {}
    }
}
