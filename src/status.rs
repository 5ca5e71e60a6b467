//! Status events emitted during a batch run.
//!
//! A run reports progress through a [`StatusSink`]. Sinks are called from
//! whichever thread drives the run and must not block.

use std::fmt;
use std::path::PathBuf;
use std::sync::mpsc::Sender;

use crate::model::GeometryKind;

#[derive(Debug, Clone, PartialEq)]
pub enum StatusEvent {
    DirectoryCreated {
        path: PathBuf,
    },
    SearchStarted {
        dir: PathBuf,
        suffix: &'static str,
    },
    NoInputsFound {
        dir: PathBuf,
        suffix: &'static str,
    },
    GdbStarted {
        path: PathBuf,
        output: PathBuf,
    },
    LayersListed {
        gdb: String,
        layers: Vec<String>,
    },
    LayerListingFailed {
        gdb: String,
        error: String,
    },
    LayerStarted {
        layer: String,
        next_identifier: u64,
    },
    LayerSkipped {
        layer: String,
        geometry: GeometryKind,
    },
    LayerProcessed {
        layer: String,
        points: usize,
        /// Features without geometry or usable coordinates.
        skipped_features: usize,
        next_identifier: u64,
    },
    LayerFailed {
        layer: String,
        error: String,
        available: Option<Vec<String>>,
    },
    NoPointsCollected {
        gdb: String,
    },
    XmlWritten {
        path: PathBuf,
        points: usize,
    },
    XmlWriteFailed {
        path: PathBuf,
        error: String,
    },
    XmlStarted {
        path: PathBuf,
        output: PathBuf,
    },
    XmlParseFailed {
        path: PathBuf,
        error: String,
    },
    GdbWritten {
        path: PathBuf,
        points: usize,
    },
    GdbWriteFailed {
        path: PathBuf,
        error: String,
    },
    Summary {
        found: usize,
        converted: usize,
        output_dir: PathBuf,
    },
    Complete,
}

impl StatusEvent {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            StatusEvent::LayerListingFailed { .. }
                | StatusEvent::LayerFailed { .. }
                | StatusEvent::XmlWriteFailed { .. }
                | StatusEvent::XmlParseFailed { .. }
                | StatusEvent::GdbWriteFailed { .. }
        )
    }
}

impl fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusEvent::DirectoryCreated { path } => {
                write!(f, "Created directory: {}", path.display())
            }
            StatusEvent::SearchStarted { dir, suffix } => {
                write!(f, "Searching for {} inputs in: {}", suffix, dir.display())
            }
            StatusEvent::NoInputsFound { dir, suffix } => {
                write!(f, "No {} inputs found in '{}'.", suffix, dir.display())
            }
            StatusEvent::GdbStarted { path, output } => write!(
                f,
                "--- Processing GDB: {} (combined output: {}) ---",
                path.display(),
                output.display()
            ),
            StatusEvent::LayersListed { gdb, layers } => {
                write!(f, "Layers in {}: {}", gdb, layers.join(", "))
            }
            StatusEvent::LayerListingFailed { gdb, error } => {
                write!(f, "Could not list layers for {}, skipping: {}", gdb, error)
            }
            StatusEvent::LayerStarted {
                layer,
                next_identifier,
            } => write!(
                f,
                "Processing layer '{}' (next oID {})",
                layer, next_identifier
            ),
            StatusEvent::LayerSkipped { layer, geometry } => write!(
                f,
                "Skipping layer '{}': geometry type {} is not processed",
                layer, geometry
            ),
            StatusEvent::LayerProcessed {
                layer,
                points,
                skipped_features,
                next_identifier,
            } => {
                write!(f, "Layer '{}': {} points added", layer, points)?;
                if *skipped_features > 0 {
                    write!(
                        f,
                        ", {} features skipped for missing or malformed geometry",
                        skipped_features
                    )?;
                }
                write!(f, " (next oID {})", next_identifier)
            }
            StatusEvent::LayerFailed {
                layer,
                error,
                available,
            } => {
                write!(f, "Could not read layer '{}': {}", layer, error)?;
                if let Some(layers) = available {
                    write!(f, " (available layers: {})", layers.join(", "))?;
                }
                Ok(())
            }
            StatusEvent::NoPointsCollected { gdb } => {
                write!(f, "No points found in any layer of {}; no combined XML created", gdb)
            }
            StatusEvent::XmlWritten { path, points } => write!(
                f,
                "Successfully created XML: {} with {} points.",
                path.display(),
                points
            ),
            StatusEvent::XmlWriteFailed { path, error } => {
                write!(f, "Error writing XML file {}: {}", path.display(), error)
            }
            StatusEvent::XmlStarted { path, output } => write!(
                f,
                "--- Processing XML: {} (output GDB: {}) ---",
                path.display(),
                output.display()
            ),
            StatusEvent::XmlParseFailed { path, error } => {
                write!(f, "Error parsing XML file {}: {}", path.display(), error)
            }
            StatusEvent::GdbWritten { path, points } => write!(
                f,
                "Successfully created GDB: {} with {} points.",
                path.display(),
                points
            ),
            StatusEvent::GdbWriteFailed { path, error } => {
                write!(f, "Error writing GDB {}: {}", path.display(), error)
            }
            StatusEvent::Summary {
                found,
                converted,
                output_dir,
            } => write!(
                f,
                "Finished processing. {} of {} input(s) converted and saved to '{}'.",
                converted,
                found,
                output_dir.display()
            ),
            StatusEvent::Complete => f.write_str("Conversion process complete."),
        }
    }
}

/// Receiver of status events.
pub trait StatusSink: Send + Sync {
    fn emit(&self, event: StatusEvent);
}

impl<F> StatusSink for F
where
    F: Fn(StatusEvent) + Send + Sync,
{
    fn emit(&self, event: StatusEvent) {
        self(event)
    }
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl StatusSink for TracingSink {
    fn emit(&self, event: StatusEvent) {
        if event.is_failure() {
            tracing::warn!("{}", event);
        } else {
            tracing::info!("{}", event);
        }
    }
}

/// Sends events over a channel, e.g. to a UI thread. Send errors are ignored.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: Sender<StatusEvent>,
}

impl ChannelSink {
    pub fn new(sender: Sender<StatusEvent>) -> Self {
        Self { sender }
    }
}

impl StatusSink for ChannelSink {
    fn emit(&self, event: StatusEvent) {
        let _ = self.sender.send(event);
    }
}
