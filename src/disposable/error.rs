use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("disposable registry already initialised")]
    AlreadyInitialised,
    #[error("failed to read disposable domain list: {source}")]
    Read {
        #[source]
        source: std::io::Error,
    },
}

impl RegistryError {
    pub(crate) fn read(source: std::io::Error) -> Self {
        Self::Read { source }
    }
}
