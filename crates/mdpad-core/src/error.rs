use std::{io, path::PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is too large: {size} bytes exceeds {max} bytes", .path.display())]
    TooLarge { path: PathBuf, size: u64, max: u64 },

    #[error("failed to watch {}: {source}", .path.display())]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error("window system error: {0}")]
    Window(String),

    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),
}
