#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid candidate space: {0}")]
    InvalidSpace(String),
    #[error("prefix set is empty")]
    EmptyPrefixSet,
    #[error("invalid target hash: {0}")]
    InvalidTarget(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("failed to spawn worker: {0}")]
    WorkerSpawn(String),
    #[error("worker failed: {0}")]
    WorkerExecution(String),
    #[error("settings error: {0}")]
    Settings(String),
}
