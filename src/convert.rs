//! Batch conversion of a directory of `.gdb` containers to LandXML.
//!
//! Containers are handled one at a time, in file-name order. For each one
//! every layer is processed in listing order while a single identifier counter
//! runs across all layers, and the collected points are written as
//! `<name>_combined.xml`. Failures stay local: a bad layer costs only that
//! layer, and a bad container costs only that container.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{error, info};

use crate::error::{Error, Result};
use crate::landxml::{write_document, DocumentBuilder};
use crate::layer::process_layer;
use crate::model::{ConversionOutcome, RunSummary};
use crate::source::{GdalSource, VectorContainer, VectorSource};
use crate::status::{StatusEvent, StatusSink};

pub const GDB_SUFFIX: &str = ".gdb";
pub const COMBINED_SUFFIX: &str = "_combined.xml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl ConversionConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn output_path(&self, gdb_base_name: &str) -> PathBuf {
        self.output_dir.join(format!("{}{}", gdb_base_name, COMBINED_SUFFIX))
    }
}

/// Converts every `.gdb` under `config.input_dir` through GDAL.
pub fn run_conversion(
    config: &ConversionConfig,
    sink: &dyn StatusSink,
) -> Result<RunSummary<ConversionOutcome>> {
    convert_directory(&GdalSource::new(), config, sink)
}

/// Converts every `.gdb` under `config.input_dir` using `source`.
///
/// Only directory-level failures are returned as errors (input or output
/// directory cannot be created or read). Everything else is reported through
/// `sink`. Containers whose layers cannot be listed are left out of both
/// counts of the summary. The final [`StatusEvent::Complete`] is emitted
/// exactly once, also when an error is returned.
pub fn convert_directory<S: VectorSource>(
    source: &S,
    config: &ConversionConfig,
    sink: &dyn StatusSink,
) -> Result<RunSummary<ConversionOutcome>> {
    let result = scan_and_convert(source, config, sink);
    if let Err(e) = &result {
        error!("Conversion aborted: {}", e);
    }
    sink.emit(StatusEvent::Complete);
    result
}

fn scan_and_convert<S: VectorSource>(
    source: &S,
    config: &ConversionConfig,
    sink: &dyn StatusSink,
) -> Result<RunSummary<ConversionOutcome>> {
    ensure_dir(&config.input_dir, sink)?;
    ensure_dir(&config.output_dir, sink)?;

    sink.emit(StatusEvent::SearchStarted {
        dir: config.input_dir.clone(),
        suffix: GDB_SUFFIX,
    });
    let gdbs = find_gdbs(&config.input_dir)?;
    info!("Found {} GDB folders", gdbs.len());

    let mut summary = RunSummary {
        found: gdbs.len(),
        ..RunSummary::default()
    };

    if gdbs.is_empty() {
        sink.emit(StatusEvent::NoInputsFound {
            dir: config.input_dir.clone(),
            suffix: GDB_SUFFIX,
        });
    }

    for gdb_path in &gdbs {
        match convert_gdb(source, gdb_path, config, sink) {
            Some(outcome) => {
                if outcome.success {
                    summary.converted += 1;
                }
                summary.outcomes.push(outcome);
            }
            // Unlistable containers count towards neither total.
            None => summary.found -= 1,
        }
    }

    sink.emit(StatusEvent::Summary {
        found: summary.found,
        converted: summary.converted,
        output_dir: config.output_dir.clone(),
    });
    Ok(summary)
}

/// Converts one container. `None` when its layers could not be listed.
fn convert_gdb<S: VectorSource>(
    source: &S,
    gdb_path: &Path,
    config: &ConversionConfig,
    sink: &dyn StatusSink,
) -> Option<ConversionOutcome> {
    let gdb_name = base_name(gdb_path);
    let xml_path = config.output_path(&gdb_name);
    sink.emit(StatusEvent::GdbStarted {
        path: gdb_path.to_path_buf(),
        output: xml_path.clone(),
    });

    let listed = source
        .open(gdb_path)
        .and_then(|container| container.layer_names().map(|layers| (container, layers)));
    let (container, layers) = match listed {
        Ok(listed) => listed,
        Err(e) => {
            error!("Could not list layers in {:?}: {}", gdb_path, e);
            sink.emit(StatusEvent::LayerListingFailed {
                gdb: gdb_name,
                error: e.to_string(),
            });
            return None;
        }
    };
    sink.emit(StatusEvent::LayersListed {
        gdb: gdb_name.clone(),
        layers: layers.clone(),
    });

    let mut builder = DocumentBuilder::new(gdb_name.clone(), Utc::now());
    let mut next_identifier = 1;
    for layer in &layers {
        let outcome = process_layer(&container, layer, next_identifier, sink);
        next_identifier = outcome.next_identifier;
        builder.append_records(outcome.records);
    }
    drop(container);

    let total_points = builder.len();
    if builder.is_empty() {
        sink.emit(StatusEvent::NoPointsCollected {
            gdb: gdb_name.clone(),
        });
        return Some(ConversionOutcome {
            gdb_name,
            total_points,
            success: false,
            xml_path: None,
        });
    }

    let document = builder.finish();
    match write_document(&document, &xml_path) {
        Ok(()) => {
            sink.emit(StatusEvent::XmlWritten {
                path: xml_path.clone(),
                points: total_points,
            });
            Some(ConversionOutcome {
                gdb_name,
                total_points,
                success: true,
                xml_path: Some(xml_path),
            })
        }
        Err(e) => {
            error!("Failed to write {:?}: {}", xml_path, e);
            sink.emit(StatusEvent::XmlWriteFailed {
                path: xml_path,
                error: e.to_string(),
            });
            Some(ConversionOutcome {
                gdb_name,
                total_points,
                success: false,
                xml_path: None,
            })
        }
    }
}

/// Creates `dir` when missing and reports it.
pub(crate) fn ensure_dir(dir: &Path, sink: &dyn StatusSink) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|e| Error::path(dir, e))?;
    sink.emit(StatusEvent::DirectoryCreated {
        path: dir.to_path_buf(),
    });
    Ok(())
}

/// Subdirectories of `dir` named `*.gdb` (any case), sorted by name.
pub fn find_gdbs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut gdbs = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| Error::path(dir, e))? {
        let path = entry.map_err(|e| Error::path(dir, e))?.path();
        let is_gdb = path
            .file_name()
            .map(|name| name.to_string_lossy().to_lowercase().ends_with(GDB_SUFFIX))
            .unwrap_or(false);
        if is_gdb && path.is_dir() {
            gdbs.push(path);
        }
    }
    gdbs.sort();
    Ok(gdbs)
}

/// File name without its final extension (`site.gdb` → `site`).
pub(crate) fn base_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FeatureAttributes, GeometryKind, GeometryRecord};
    use crate::source::{MemoryContainer, MemoryLayer, MemorySource};
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[test]
    fn test_find_gdbs_filters_and_sorts() {
        let temp_dir = TempDir::new().unwrap();
        for dir in ["b.gdb", "A.GDB", "notes"] {
            fs::create_dir(temp_dir.path().join(dir)).unwrap();
        }
        fs::write(temp_dir.path().join("c.gdb"), b"file, not a folder").unwrap();

        let gdbs = find_gdbs(temp_dir.path()).unwrap();
        let names: Vec<String> = gdbs.iter().map(|p| base_name(p)).collect();
        assert_eq!(names, vec!["A", "b"]);
    }

    #[test]
    fn test_output_path() {
        let config = ConversionConfig::new("in", "out");
        assert_eq!(
            config.output_path("site"),
            PathBuf::from("out").join("site_combined.xml")
        );
    }

    #[test]
    fn test_missing_input_dir_is_created() {
        let temp_dir = TempDir::new().unwrap();
        let config = ConversionConfig::new(
            temp_dir.path().join("input_gdbs"),
            temp_dir.path().join("output_xmls"),
        );
        let events = Mutex::new(Vec::new());
        let sink = |event: StatusEvent| events.lock().unwrap().push(event);

        let summary = convert_directory(&MemorySource::new(), &config, &sink).unwrap();

        assert_eq!(summary.found, 0);
        assert_eq!(summary.converted, 0);
        assert!(config.input_dir.is_dir());
        assert!(config.output_dir.is_dir());
        let events = events.lock().unwrap();
        assert!(events.contains(&StatusEvent::DirectoryCreated {
            path: config.input_dir.clone()
        }));
        assert_eq!(events.last(), Some(&StatusEvent::Complete));
    }

    #[test]
    fn test_write_failure_is_reported_per_gdb() {
        let temp_dir = TempDir::new().unwrap();
        let config = ConversionConfig::new(temp_dir.path().join("in"), temp_dir.path().join("out"));
        fs::create_dir_all(config.input_dir.join("site.gdb")).unwrap();
        // A directory where the XML should go makes the write fail.
        fs::create_dir_all(config.output_path("site")).unwrap();

        let source = MemorySource::new().with_container(
            "site.gdb",
            MemoryContainer::new().with_layer(
                MemoryLayer::new("pts", GeometryKind::Point).with_feature(
                    Some(GeometryRecord::Point(vec![1.0, 2.0])),
                    FeatureAttributes::new(),
                ),
            ),
        );
        let events = Mutex::new(Vec::new());
        let sink = |event: StatusEvent| events.lock().unwrap().push(event);

        let summary = convert_directory(&source, &config, &sink).unwrap();

        assert_eq!(summary.found, 1);
        assert_eq!(summary.converted, 0);
        assert!(!summary.outcomes[0].success);
        assert_eq!(summary.outcomes[0].total_points, 1);
        assert!(events
            .lock()
            .unwrap()
            .iter()
            .any(|e| matches!(e, StatusEvent::XmlWriteFailed { .. })));
    }
}
