use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Install the global JSON subscriber.
///
/// Filtering comes from `RUST_LOG`, defaulting to `info`. Fails if a global
/// subscriber is already installed.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;
    Ok(())
}

/// Like [`init`], but tolerates an already-installed subscriber. Test and
/// bench harnesses call this from every entrypoint without coordinating.
pub fn init_for_tests() {
    let _ = init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_initialization_is_tolerated() {
        init_for_tests();
        init_for_tests();
        // The second real init must report the collision rather than panic.
        assert!(init().is_err());
    }
}
