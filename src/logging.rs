use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "LEAGUE_LOG";

/// Initialize tracing on stderr so command output on stdout stays clean.
///
/// `LEAGUE_LOG` wins when set; otherwise verbosity picks the level
/// (0 = warn, 1 = info, 2+ = debug).
pub fn init_tracing(verbosity: u8) {
    let fallback = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
