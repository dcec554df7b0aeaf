//! Centralized error type for the sonolab umbrella crate.
//!
//! Wraps all subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] sonolab_core::Error),

    #[cfg(feature = "export")]
    #[error("Export: {0}")]
    Export(#[from] sonolab_export::ExportError),

    #[error("{0} is not available for {1:?}")]
    Unsupported(&'static str, sonolab_core::Application),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
