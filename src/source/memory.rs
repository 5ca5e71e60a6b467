use std::collections::HashMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{FeatureAttributes, GeometryKind, GeometryRecord, SourceFeature};

use super::{VectorContainer, VectorSource};

/// In-memory containers keyed by directory name (e.g. `"site.gdb"`).
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    containers: HashMap<String, MemoryContainer>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_container(
        mut self,
        dir_name: impl Into<String>,
        container: MemoryContainer,
    ) -> Self {
        self.containers.insert(dir_name.into(), container);
        self
    }
}

impl VectorSource for MemorySource {
    type Container = MemoryContainer;

    fn open(&self, path: &Path) -> Result<MemoryContainer> {
        path.file_name()
            .and_then(|name| self.containers.get(name.to_string_lossy().as_ref()))
            .cloned()
            .ok_or_else(|| Error::ContainerNotFound(path.to_path_buf()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryContainer {
    layers: Vec<MemoryLayer>,
    unlistable: bool,
}

impl MemoryContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layer(mut self, layer: MemoryLayer) -> Self {
        self.layers.push(layer);
        self
    }

    /// A container whose layer list cannot be read.
    pub fn unlistable() -> Self {
        Self {
            layers: Vec::new(),
            unlistable: true,
        }
    }

    fn layer(&self, name: &str) -> Result<&MemoryLayer> {
        self.layers
            .iter()
            .find(|l| l.name == name)
            .ok_or_else(|| Error::LayerNotFound(name.to_string()))
    }
}

impl VectorContainer for MemoryContainer {
    fn layer_names(&self) -> Result<Vec<String>> {
        if self.unlistable {
            return Err(Error::BackendNotReady("layer list unavailable".to_string()));
        }
        Ok(self.layers.iter().map(|l| l.name.clone()).collect())
    }

    fn layer_geometry(&self, layer: &str) -> Result<GeometryKind> {
        let layer = self.layer(layer)?;
        if layer.unreadable {
            return Err(Error::LayerNotFound(layer.name.clone()));
        }
        Ok(layer.geometry)
    }

    fn for_each_feature(&self, layer: &str, visit: &mut dyn FnMut(SourceFeature)) -> Result<()> {
        let layer = self.layer(layer)?;
        for feature in &layer.features {
            visit(feature.clone());
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct MemoryLayer {
    pub name: String,
    pub geometry: GeometryKind,
    pub features: Vec<SourceFeature>,
    unreadable: bool,
}

impl MemoryLayer {
    pub fn new(name: impl Into<String>, geometry: GeometryKind) -> Self {
        Self {
            name: name.into(),
            geometry,
            features: Vec::new(),
            unreadable: false,
        }
    }

    /// A layer that is listed by its container but fails to open.
    pub fn unreadable(name: impl Into<String>) -> Self {
        Self {
            unreadable: true,
            ..Self::new(name, GeometryKind::Other)
        }
    }

    pub fn with_feature(
        mut self,
        geometry: Option<GeometryRecord>,
        attributes: FeatureAttributes,
    ) -> Self {
        let fid = self.features.len() as u64 + 1;
        self.features.push(SourceFeature {
            fid: Some(fid),
            geometry,
            attributes,
        });
        self
    }
}
