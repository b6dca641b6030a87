use std::sync::Once;

static INIT: Once = Once::new();

/// Install the global tracing subscriber once. `level` (from the CLI)
/// wins over `RUST_LOG`; without either, only warnings and errors show.
pub fn init_with_level(level: Option<&str>) {
    INIT.call_once(|| {
        let env = match level {
            Some(l) if !l.is_empty() => l.to_string(),
            _ => std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string()),
        };

        let filter = tracing_subscriber::EnvFilter::try_new(env.clone()).unwrap_or_else(|e| {
            eprintln!("invalid RUST_LOG/log level '{env}': {e}; falling back to 'warn'");
            tracing_subscriber::EnvFilter::new("warn")
        });

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .compact()
            .try_init();
    });
}
