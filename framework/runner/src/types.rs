/// Recommended error type for a scenario `main` function and any shared behaviour code
/// written for hooks. This type is compatible with [crate::definition::HookResult] so
/// `?` propagates cleanly.
pub type GaleResult<T> = anyhow::Result<T>;
