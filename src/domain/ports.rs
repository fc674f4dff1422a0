use async_trait::async_trait;

/// Source of oracle tuning knobs: CLI flags, TOML files or plain defaults.
pub trait ConfigProvider: Send + Sync {
    fn small_prime_limit(&self) -> u32;
    fn witness_rounds(&self) -> u32;
    fn max_digits(&self) -> usize;
    fn allow_separators(&self) -> bool;
    fn strong_lucas(&self) -> bool;
}

/// Request/response boundary between an interactive shell and the oracle.
#[async_trait]
pub trait PrimeService: Send + Sync {
    /// Always returns display text; failures are rendered as `Error: ...`.
    async fn check_prime(&self, number_to_check: &str) -> String;
}
