//! Codeflare CLI - browse, tail and chart distributed job runs
//!
//! Binary name: `codeflare`

use std::process;

use clap::error::ErrorKind;
use codeflare::{build_cli, interactive, log_level, settle, App, CliOptions};
use codeflare_core::{load_config, Config};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

type FilterHandle = reload::Handle<EnvFilter, Registry>;

#[tokio::main]
async fn main() {
    let code = tokio::select! {
        result = run() => match result {
            Ok(code) => code,
            Err(err) => {
                #[allow(clippy::print_stderr)]
                {
                    eprintln!("Error: {err:#}");
                }
                err.downcast_ref::<codeflare_core::Error>()
                    .map_or(1, codeflare_core::Error::exit_code)
            }
        },
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received SIGINT, shutting down");
            130
        }
    };

    #[allow(clippy::exit)]
    process::exit(code);
}

async fn run() -> anyhow::Result<i32> {
    let matches = match build_cli().try_get_matches() {
        Ok(matches) => matches,
        Err(e) => {
            let should_exit_zero =
                matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion);
            let _ = e.print();
            return Ok(if should_exit_zero { 0 } else { 2 });
        }
    };
    let options = CliOptions::from_matches(&matches);

    let filter = init_tracing(options.verbose);
    let config = load_config(options.config.as_deref()).map_err(codeflare_core::Error::from)?;
    if let Some(filter) = filter {
        apply_config_level(&filter, &config, options.verbose);
    }

    let (app, report) = App::new(config);
    for failure in &report.failures {
        tracing::warn!(module = %failure.module, "feature module unavailable: {}", failure.error);
    }

    let mut stdout = std::io::stdout();

    if options.interactive {
        return Ok(interactive(&app, tokio::io::stdin(), &mut stdout).await);
    }

    if options.args.is_empty() {
        #[allow(clippy::print_stdout)]
        {
            println!("{}", app.usage());
        }
        return Ok(0);
    }

    Ok(settle(app.dispatch_args(&options.args), &mut stdout).await)
}

/// Installs the stderr subscriber before config is loaded, so config
/// loading itself can be traced with `-vv`. `RUST_LOG` wins and is final;
/// otherwise the returned handle lets the configured level take over.
fn init_tracing(verbose: u8) -> Option<FilterHandle> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return None;
    }

    let level = log_level(&Config::default().log.level, verbose);
    let (filter, handle) = reload::Layer::new(EnvFilter::new(level.to_string()));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
    Some(handle)
}

fn apply_config_level(filter: &FilterHandle, config: &Config, verbose: u8) {
    let level = log_level(&config.log.level, verbose);
    if let Err(e) = filter.reload(EnvFilter::new(level.to_string())) {
        tracing::warn!("failed to apply configured log level: {e}");
    }
}
