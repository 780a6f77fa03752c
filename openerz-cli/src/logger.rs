use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install a compact stderr subscriber; `RUST_LOG` takes precedence over `verbose`.
pub(crate) fn init(verbose: bool) {
    let default_directive = if verbose {
        "openerz_cli=debug,openerz_core=debug,openerz_provider_http=debug,info"
    } else {
        "openerz_cli=info,openerz_core=info,openerz_provider_http=info,warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_err| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}
