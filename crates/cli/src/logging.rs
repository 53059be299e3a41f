use tracing_subscriber::EnvFilter;

/// HTTP client crates whose chatter is capped at `warn`.
const HTTP_CRATES: [&str; 3] = ["reqwest", "hyper", "hyper_util"];

fn level_name(verbosity: i8) -> &'static str {
    match verbosity {
        i8::MIN..=-3 => "off",
        -2 => "error",
        -1 => "warn",
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Filter directives for a net verbosity, `info` at zero.
pub fn directives(verbosity: i8) -> String {
    let level = level_name(verbosity);
    let http = if verbosity < 0 { level } else { "warn" };

    let mut directives = level.to_string();
    for name in HTTP_CRATES {
        directives.push_str(&format!(",{name}={http}"));
    }
    directives
}

/// Installs the global subscriber. `RUST_LOG`, when set and valid, wins over the flags.
pub fn init(verbosity: i8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directives(verbosity)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
