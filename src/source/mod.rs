//! Readers for vector containers.
//!
//! The conversion pipeline only needs three things from a container: its layer
//! names, the declared geometry type of a layer, and the features of a layer in
//! order. [`GdalSource`] reads real geodatabases; [`MemorySource`] serves
//! prepared features and is used by the tests.

mod memory;
mod ogr;

use std::path::Path;

use crate::error::Result;
use crate::model::{GeometryKind, SourceFeature};

pub use self::memory::{MemoryContainer, MemoryLayer, MemorySource};
pub use self::ogr::{GdalContainer, GdalSource};

/// Opens containers. One container is held open at a time.
pub trait VectorSource {
    type Container: VectorContainer;

    fn open(&self, path: &Path) -> Result<Self::Container>;
}

/// An opened, read-only container.
pub trait VectorContainer {
    fn layer_names(&self) -> Result<Vec<String>>;

    /// Declared geometry family of a layer.
    fn layer_geometry(&self, layer: &str) -> Result<GeometryKind>;

    /// Streams every feature of a layer, in layer order, to `visit`.
    fn for_each_feature(&self, layer: &str, visit: &mut dyn FnMut(SourceFeature)) -> Result<()>;
}
