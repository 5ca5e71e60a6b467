//! Builds normalized CgPoint records from extracted vertices.
//!
//! Vertices of point features keep the surveyed point's own attributes. Vertices
//! taken from line and polygon edges get synthesized names and fixed codes so
//! they can be told apart from surveyed points downstream.

use crate::model::{CgPointRecord, FeatureAttributes, GeometryKind, Vertex};

pub const POINT_CODE: &str = "DefaultCode";
pub const DERIVED_CODE: &str = "DerivedVertex";
pub const DEFAULT_LATITUDE: &str = "0.0000000000";
pub const DEFAULT_LONGITUDE: &str = "0.0000000000";
pub const DEFAULT_ELLIPSOID_HEIGHT: &str = "0.000";

const LAYER_PREFIX_CHARS: usize = 8;

/// Where a vertex came from.
#[derive(Debug, Clone, Copy)]
pub struct VertexContext<'a> {
    pub attributes: &'a FeatureAttributes,
    /// Geometry family of the parent feature.
    pub geometry: GeometryKind,
    pub feature_id: &'a str,
    /// 1-based position of the vertex within its feature.
    pub vertex_index: usize,
    pub identifier: u64,
    pub layer_name: &'a str,
}

pub fn synthesize(vertex: Vertex, ctx: &VertexContext<'_>) -> CgPointRecord {
    let attrs = ctx.attributes;
    let id = ctx.identifier;

    let (name, code, description, solution_type, survey_method, class_value) =
        if ctx.geometry == GeometryKind::Point {
            (
                non_empty(attrs, "name").unwrap_or_else(|| format!("Point_{}", id)),
                attrs.text_or("code", POINT_CODE),
                non_empty(attrs, "description")
                    .or_else(|| non_empty(attrs, "desc"))
                    .unwrap_or_else(|| format!("Desc_{}", id)),
                attrs.text_or("solutionType", "unknown"),
                attrs.text_or("surveyMethod", ""),
                attrs.text_or("class", "default"),
            )
        } else {
            let base =
                non_empty(attrs, "name").unwrap_or_else(|| format!("Feat_{}", ctx.feature_id));
            (
                format!(
                    "{}_L{}_V{}",
                    base,
                    layer_prefix(ctx.layer_name),
                    ctx.vertex_index
                ),
                DERIVED_CODE.to_string(),
                format!(
                    "Vtx {} of {} from Lyr {}",
                    ctx.vertex_index, base, ctx.layer_name
                ),
                "derived_vertex".to_string(),
                "extracted_from_geometry".to_string(),
                "derived_default".to_string(),
            )
        };

    let name = if name.is_empty() {
        format!("Point_{}", id)
    } else {
        name
    };

    CgPointRecord {
        identifier: id,
        name,
        code,
        description,
        role: "surveyed".to_string(),
        time_stamp: non_empty(attrs, "timeStamp"),
        point_geometry: "point".to_string(),
        pnt_ref: attrs.text_or("pntRef", ""),
        solution_type,
        survey_method,
        survey_order: attrs.text_or("surveyOrder", ""),
        class_value,
        latitude: attrs.text_or("latitude", DEFAULT_LATITUDE),
        longitude: attrs.text_or("longitude", DEFAULT_LONGITUDE),
        ellipsoid_height: attrs.text_or("ellipsoidHeight", DEFAULT_ELLIPSOID_HEIGHT),
        coordinate: vertex,
    }
}

/// First eight characters of the layer name with spaces replaced.
pub fn layer_prefix(layer_name: &str) -> String {
    layer_name
        .chars()
        .take(LAYER_PREFIX_CHARS)
        .map(|c| if c == ' ' { '_' } else { c })
        .collect()
}

fn non_empty(attrs: &FeatureAttributes, key: &str) -> Option<String> {
    attrs.text(key).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AttributeValue;

    fn ctx<'a>(
        attributes: &'a FeatureAttributes,
        geometry: GeometryKind,
        vertex_index: usize,
        identifier: u64,
    ) -> VertexContext<'a> {
        VertexContext {
            attributes,
            geometry,
            feature_id: "7",
            vertex_index,
            identifier,
            layer_name: "kadaster grenzen",
        }
    }

    #[test]
    fn test_point_defaults() {
        let attrs = FeatureAttributes::new();
        let record = synthesize(
            Vertex::new(100.0, 200.0, 5.0),
            &ctx(&attrs, GeometryKind::Point, 1, 1),
        );

        assert_eq!(record.identifier, 1);
        assert_eq!(record.name, "Point_1");
        assert_eq!(record.code, "DefaultCode");
        assert_eq!(record.description, "Desc_1");
        assert_eq!(record.solution_type, "unknown");
        assert_eq!(record.survey_method, "");
        assert_eq!(record.class_value, "default");
        assert_eq!(record.latitude, DEFAULT_LATITUDE);
        assert_eq!(record.ellipsoid_height, "0.000");
        assert_eq!(record.coordinate_text(), "200.000 100.000 5.000");
    }

    #[test]
    fn test_point_keeps_source_attributes() {
        let mut attrs = FeatureAttributes::new()
            .with_text("name", "RP12")
            .with_text("code", "BM")
            .with_text("description", "benchmark")
            .with_text("class", "control");
        attrs.insert("surveyOrder", AttributeValue::Integer(2));
        let record = synthesize(
            Vertex::new(1.0, 2.0, 0.0),
            &ctx(&attrs, GeometryKind::Point, 1, 9),
        );

        assert_eq!(record.name, "RP12");
        assert_eq!(record.code, "BM");
        assert_eq!(record.description, "benchmark");
        assert_eq!(record.class_value, "control");
        assert_eq!(record.survey_order, "2");
    }

    #[test]
    fn test_empty_point_name_falls_back() {
        let attrs = FeatureAttributes::new().with_text("name", "");
        let record = synthesize(
            Vertex::new(0.0, 0.0, 0.0),
            &ctx(&attrs, GeometryKind::Point, 1, 4),
        );
        assert_eq!(record.name, "Point_4");
    }

    #[test]
    fn test_derived_vertex_naming() {
        let attrs = FeatureAttributes::new()
            .with_text("name", "Edge1")
            .with_text("code", "ignored");
        let record = synthesize(
            Vertex::new(0.0, 0.0, 0.0),
            &ctx(&attrs, GeometryKind::LineString, 2, 12),
        );

        assert_eq!(record.name, "Edge1_Lkadaster_V2");
        assert_eq!(record.code, "DerivedVertex");
        assert_eq!(record.description, "Vtx 2 of Edge1 from Lyr kadaster grenzen");
        assert_eq!(record.solution_type, "derived_vertex");
        assert_eq!(record.survey_method, "extracted_from_geometry");
        assert_eq!(record.class_value, "derived_default");
    }

    #[test]
    fn test_derived_vertex_without_name_uses_feature_id() {
        let attrs = FeatureAttributes::new();
        let record = synthesize(
            Vertex::new(0.0, 0.0, 0.0),
            &ctx(&attrs, GeometryKind::MultiPolygon, 1, 3),
        );
        assert_eq!(record.name, "Feat_7_Lkadaster_V1");
        assert_eq!(record.description, "Vtx 1 of Feat_7 from Lyr kadaster grenzen");
    }

    #[test]
    fn test_layer_prefix() {
        assert_eq!(layer_prefix("a b c d e f"), "a_b_c_d_");
        assert_eq!(layer_prefix("lines"), "lines");
        assert_eq!(layer_prefix("grenzpunkte_ä"), "grenzpun");
    }
}
