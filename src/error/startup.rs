use thiserror::Error;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Failed to build driver runtime: {source}")]
    RuntimeBuild {
        #[source]
        source: std::io::Error,
    },
    #[error("Cannot create worker thread {index}: {source}")]
    ThreadSpawn {
        index: usize,
        #[source]
        source: std::io::Error,
    },
}
