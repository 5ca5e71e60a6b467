use tracing::{debug, warn};

use crate::extract::extract;
use crate::model::{CgPointRecord, LayerOutcome};
use crate::source::VectorContainer;
use crate::status::{StatusEvent, StatusSink};
use crate::synthesizer::{synthesize, VertexContext};

/// Converts every vertex of one layer into CgPoint records.
///
/// Identifiers are taken from `next_identifier` onwards, one per vertex. The
/// returned outcome carries the next free identifier. A layer that cannot be
/// read yields no records and leaves the identifier unchanged; the error is
/// reported through `sink` and never returned.
pub fn process_layer<C>(
    container: &C,
    layer_name: &str,
    next_identifier: u64,
    sink: &dyn StatusSink,
) -> LayerOutcome
where
    C: VectorContainer + ?Sized,
{
    sink.emit(StatusEvent::LayerStarted {
        layer: layer_name.to_string(),
        next_identifier,
    });

    let geometry = match container.layer_geometry(layer_name) {
        Ok(geometry) => geometry,
        Err(e) => return failed(container, layer_name, next_identifier, e.to_string(), sink),
    };

    if !geometry.is_processable() {
        sink.emit(StatusEvent::LayerSkipped {
            layer: layer_name.to_string(),
            geometry,
        });
        return LayerOutcome {
            records: Vec::new(),
            next_identifier,
            error: None,
        };
    }

    let mut records: Vec<CgPointRecord> = Vec::new();
    let mut next = next_identifier;
    let mut ordinal = 0u64;
    let mut skipped_features = 0usize;

    let streamed = container.for_each_feature(layer_name, &mut |feature| {
        ordinal += 1;
        let feature_id = feature.fid.unwrap_or(ordinal).to_string();

        let Some(geometry) = feature.geometry else {
            debug!("Feature {} in '{}' has no geometry", feature_id, layer_name);
            skipped_features += 1;
            return;
        };

        let vertices = extract(&geometry);
        if vertices.is_empty() {
            debug!(
                "Feature {} in '{}' yielded no usable coordinates",
                feature_id, layer_name
            );
            skipped_features += 1;
            return;
        }

        for (i, vertex) in vertices.into_iter().enumerate() {
            let ctx = VertexContext {
                attributes: &feature.attributes,
                geometry: geometry.kind(),
                feature_id: &feature_id,
                vertex_index: i + 1,
                identifier: next,
                layer_name,
            };
            records.push(synthesize(vertex, &ctx));
            next += 1;
        }
    });

    if let Err(e) = streamed {
        return failed(container, layer_name, next_identifier, e.to_string(), sink);
    }

    sink.emit(StatusEvent::LayerProcessed {
        layer: layer_name.to_string(),
        points: records.len(),
        skipped_features,
        next_identifier: next,
    });

    LayerOutcome {
        records,
        next_identifier: next,
        error: None,
    }
}

fn failed<C>(
    container: &C,
    layer_name: &str,
    next_identifier: u64,
    error: String,
    sink: &dyn StatusSink,
) -> LayerOutcome
where
    C: VectorContainer + ?Sized,
{
    warn!("Failed to read layer '{}': {}", layer_name, error);
    let available = container.layer_names().ok();
    sink.emit(StatusEvent::LayerFailed {
        layer: layer_name.to_string(),
        error: error.clone(),
        available,
    });
    LayerOutcome {
        records: Vec::new(),
        next_identifier,
        error: Some(error),
    }
}
