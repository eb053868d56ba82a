use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TailError {
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl TailError {
    pub fn is_not_found(&self) -> bool {
        let source = match self {
            TailError::Open { source, .. } | TailError::Read { source, .. } => source,
        };
        source.kind() == io::ErrorKind::NotFound
    }
}
