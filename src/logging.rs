use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// `RUST_LOG` wins when set and valid; otherwise the configured level, and
/// `info` if that does not parse either.
fn resolve_filter(env_directives: Option<&str>, level: &str) -> EnvFilter {
    if let Some(directives) = env_directives
        && let Ok(filter) = EnvFilter::try_new(directives)
    {
        return filter;
    }
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}

pub fn init_logging(level: &str) {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(resolve_filter(env.as_deref(), level))
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok(); // Already set in tests
}
