//! Batch conversion of LandXML CgPoints back into File Geodatabases.
//!
//! Documents are parsed in parallel on the rayon pool; the geodatabases are
//! then written one at a time in path order, since GDAL datasets are not
//! shared across threads here.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{error, info};

use crate::convert::{base_name, ensure_dir};
use crate::error::{Error, Result};
use crate::landxml::{parse_cg_points, ParsedCgPoint};
use crate::model::{ReverseOutcome, RunSummary};
use crate::status::{StatusEvent, StatusSink};
use crate::writer::{GdbWriter, DEFAULT_LAYER_NAME};

pub const XML_SUFFIX: &str = ".xml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReverseConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub layer_name: String,
}

impl ReverseConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            layer_name: DEFAULT_LAYER_NAME.to_string(),
        }
    }

    pub fn with_layer_name(mut self, layer_name: impl Into<String>) -> Self {
        self.layer_name = layer_name.into();
        self
    }

    pub fn output_path(&self, xml_base_name: &str) -> PathBuf {
        self.output_dir.join(format!("{}.gdb", xml_base_name))
    }
}

/// Converts every `.xml` below `config.input_dir` into `<name>.gdb`.
///
/// Like the forward run, only directory-level failures are returned as
/// errors and [`StatusEvent::Complete`] is emitted exactly once.
pub fn run_reverse_conversion(
    config: &ReverseConfig,
    sink: &dyn StatusSink,
) -> Result<RunSummary<ReverseOutcome>> {
    let result = scan_and_convert(config, sink);
    if let Err(e) = &result {
        error!("Reverse conversion aborted: {}", e);
    }
    sink.emit(StatusEvent::Complete);
    result
}

fn scan_and_convert(
    config: &ReverseConfig,
    sink: &dyn StatusSink,
) -> Result<RunSummary<ReverseOutcome>> {
    ensure_dir(&config.input_dir, sink)?;
    ensure_dir(&config.output_dir, sink)?;

    sink.emit(StatusEvent::SearchStarted {
        dir: config.input_dir.clone(),
        suffix: XML_SUFFIX,
    });
    let xmls = find_xml_files(&config.input_dir)?;
    info!("Found {} XML files", xmls.len());

    let mut summary = RunSummary {
        found: xmls.len(),
        ..RunSummary::default()
    };
    if xmls.is_empty() {
        sink.emit(StatusEvent::NoInputsFound {
            dir: config.input_dir.clone(),
            suffix: XML_SUFFIX,
        });
    }

    // Parsed in parallel; results keep input order.
    let parsed: Vec<Result<Vec<ParsedCgPoint>>> =
        xmls.par_iter().map(|path| read_points(path)).collect();

    let writer = GdbWriter::with_layer_name(config.layer_name.clone());
    for (xml_path, points) in xmls.iter().zip(parsed) {
        let outcome = write_one(&writer, xml_path, points, config, sink);
        if outcome.success {
            summary.converted += 1;
        }
        summary.outcomes.push(outcome);
    }

    sink.emit(StatusEvent::Summary {
        found: summary.found,
        converted: summary.converted,
        output_dir: config.output_dir.clone(),
    });
    Ok(summary)
}

fn read_points(path: &Path) -> Result<Vec<ParsedCgPoint>> {
    let file = File::open(path).map_err(|e| Error::path(path, e))?;
    parse_cg_points(BufReader::new(file))
}

fn write_one(
    writer: &GdbWriter,
    xml_path: &Path,
    points: Result<Vec<ParsedCgPoint>>,
    config: &ReverseConfig,
    sink: &dyn StatusSink,
) -> ReverseOutcome {
    let xml_name = base_name(xml_path);
    let gdb_path = config.output_path(&xml_name);
    sink.emit(StatusEvent::XmlStarted {
        path: xml_path.to_path_buf(),
        output: gdb_path.clone(),
    });

    let failed = |xml_name: String| ReverseOutcome {
        xml_name,
        points_written: 0,
        success: false,
        gdb_path: None,
    };

    let points = match points {
        Ok(points) => points,
        Err(e) => {
            error!("Failed to parse {:?}: {}", xml_path, e);
            sink.emit(StatusEvent::XmlParseFailed {
                path: xml_path.to_path_buf(),
                error: e.to_string(),
            });
            return failed(xml_name);
        }
    };
    if points.is_empty() {
        sink.emit(StatusEvent::NoPointsCollected {
            gdb: xml_name.clone(),
        });
        return failed(xml_name);
    }

    match writer.write(&points, &gdb_path) {
        Ok(()) => {
            sink.emit(StatusEvent::GdbWritten {
                path: gdb_path.clone(),
                points: points.len(),
            });
            ReverseOutcome {
                xml_name,
                points_written: points.len(),
                success: true,
                gdb_path: Some(gdb_path),
            }
        }
        Err(e) => {
            error!("Failed to write {:?}: {:#}", gdb_path, e);
            sink.emit(StatusEvent::GdbWriteFailed {
                path: gdb_path,
                error: format!("{:#}", e),
            });
            failed(xml_name)
        }
    }
}

/// Every `*.xml` file below `dir` (any case, recursive), sorted by path.
pub fn find_xml_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        for entry in fs::read_dir(&current).map_err(|e| Error::path(&current, e))? {
            let path = entry.map_err(|e| Error::path(&current, e))?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("xml"))
                .unwrap_or(false)
            {
                found.push(path);
            }
        }
    }
    found.sort();
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[test]
    fn test_find_xml_files_recurses() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(temp_dir.path().join("top.xml"), b"").unwrap();
        fs::write(nested.join("deep.XML"), b"").unwrap();
        fs::write(nested.join("notes.txt"), b"").unwrap();

        let found = find_xml_files(temp_dir.path()).unwrap();
        let names: Vec<String> = found.iter().map(|p| base_name(p)).collect();
        assert_eq!(found.len(), 2);
        assert!(names.contains(&"top".to_string()));
        assert!(names.contains(&"deep".to_string()));
    }

    #[test]
    fn test_unparseable_xml_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let config = ReverseConfig::new(temp_dir.path().join("in"), temp_dir.path().join("out"));
        fs::create_dir_all(&config.input_dir).unwrap();
        fs::write(config.input_dir.join("broken.xml"), b"<LandXML><Units/></LandXML>").unwrap();

        let events = Mutex::new(Vec::new());
        let sink = |event: StatusEvent| events.lock().unwrap().push(event);
        let summary = run_reverse_conversion(&config, &sink).unwrap();

        assert_eq!(summary.found, 1);
        assert_eq!(summary.converted, 0);
        assert!(!summary.outcomes[0].success);
        let events = events.lock().unwrap();
        assert!(events
            .iter()
            .any(|e| matches!(e, StatusEvent::XmlParseFailed { .. })));
        assert_eq!(
            events.iter().filter(|e| **e == StatusEvent::Complete).count(),
            1
        );
    }

    #[test]
    fn test_empty_input_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config = ReverseConfig::new(temp_dir.path().join("in"), temp_dir.path().join("out"))
            .with_layer_name("Imported");
        assert_eq!(config.layer_name, "Imported");

        let summary = run_reverse_conversion(&config, &|_: StatusEvent| {}).unwrap();
        assert_eq!(summary.found, 0);
        assert!(config.input_dir.is_dir());
        assert_eq!(config.output_path("site"), config.output_dir.join("site.gdb"));
    }
}
