use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the conversion library.
///
/// Most of these never reach the caller of a batch run: the orchestrators turn
/// them into status events at layer or container granularity.
#[derive(Debug, Error)]
pub enum Error {
    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("I/O error on {path}: {source}")]
    Path {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("missing <{0}> element in LandXML document")]
    MissingElement(&'static str),

    #[error("layer '{0}' not found")]
    LayerNotFound(String),

    #[error("container not found: {0}")]
    ContainerNotFound(PathBuf),

    #[error("geometry backend not ready: {0}")]
    BackendNotReady(String),
}

impl Error {
    pub(crate) fn path(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Path {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
