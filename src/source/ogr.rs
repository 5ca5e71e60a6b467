use std::path::Path;

use gdal::vector::{FieldValue, Geometry, LayerAccess, OGRwkbGeometryType};
use gdal::{Dataset, DatasetOptions, GdalOpenFlags};
use tracing::debug;

use crate::backend::linearize_curves;
use crate::error::Result;
use crate::model::{
    wkb_has_z, wkb_is_curve, AttributeValue, Coord, FeatureAttributes, GeometryKind,
    GeometryRecord, SourceFeature,
};

use super::{VectorContainer, VectorSource};

/// Reads containers through GDAL/OGR (the `OpenFileGDB` driver for `.gdb`).
#[derive(Debug, Default, Clone, Copy)]
pub struct GdalSource;

impl GdalSource {
    pub fn new() -> Self {
        Self
    }
}

impl VectorSource for GdalSource {
    type Container = GdalContainer;

    fn open(&self, path: &Path) -> Result<GdalContainer> {
        linearize_curves();
        let dataset = Dataset::open_ex(
            path,
            DatasetOptions {
                open_flags: GdalOpenFlags::GDAL_OF_VECTOR | GdalOpenFlags::GDAL_OF_READONLY,
                ..Default::default()
            },
        )?;
        debug!("Opened vector dataset: {:?}", path);
        Ok(GdalContainer { dataset })
    }
}

/// A read-only GDAL dataset. Closed when dropped.
pub struct GdalContainer {
    dataset: Dataset,
}

impl VectorContainer for GdalContainer {
    fn layer_names(&self) -> Result<Vec<String>> {
        Ok(self.dataset.layers().map(|layer| layer.name()).collect())
    }

    fn layer_geometry(&self, layer: &str) -> Result<GeometryKind> {
        let layer = self.dataset.layer_by_name(layer)?;
        let code = layer
            .defn()
            .geom_fields()
            .next()
            .map(|field| field.field_type())
            .unwrap_or(OGRwkbGeometryType::wkbNone);
        Ok(GeometryKind::from_wkb_code(code))
    }

    fn for_each_feature(&self, layer: &str, visit: &mut dyn FnMut(SourceFeature)) -> Result<()> {
        let mut layer = self.dataset.layer_by_name(layer)?;
        for feature in layer.features() {
            let attributes = feature
                .fields()
                .filter_map(|(name, value)| value.and_then(attribute_value).map(|v| (name, v)))
                .collect::<FeatureAttributes>();
            visit(SourceFeature {
                fid: feature.fid(),
                geometry: feature.geometry().map(geometry_record),
                attributes,
            });
        }
        Ok(())
    }
}

fn attribute_value(value: FieldValue) -> Option<AttributeValue> {
    match value {
        FieldValue::StringValue(s) => Some(AttributeValue::Text(s)),
        FieldValue::IntegerValue(i) => Some(AttributeValue::Integer(i64::from(i))),
        FieldValue::Integer64Value(i) => Some(AttributeValue::Integer(i)),
        FieldValue::RealValue(r) => Some(AttributeValue::Real(r)),
        other => other.into_string().map(AttributeValue::Text),
    }
}

/// Copies an OGR geometry into a [`GeometryRecord`].
///
/// Empty geometries, and empty parts of multi-part geometries, carry no
/// coordinates. Curves are stroked into line segments first.
pub(crate) fn geometry_record(geometry: &Geometry) -> GeometryRecord {
    let code = geometry.geometry_type();
    if wkb_is_curve(code) {
        return match linear_geometry(geometry) {
            Some(linear) if !wkb_is_curve(linear.geometry_type()) => geometry_record(&linear),
            _ => GeometryRecord::Unsupported(GeometryKind::from_wkb_code(code)),
        };
    }

    let has_z = wkb_has_z(code);
    match GeometryKind::from_wkb_code(code) {
        GeometryKind::Point => {
            GeometryRecord::Point(coords(geometry, has_z).into_iter().next().unwrap_or_default())
        }
        GeometryKind::LineString => GeometryRecord::LineString(coords(geometry, has_z)),
        GeometryKind::MultiLineString => GeometryRecord::MultiLineString(
            parts(geometry)
                .map(|i| coords(&geometry.get_geometry(i), has_z))
                .collect(),
        ),
        GeometryKind::Polygon => GeometryRecord::Polygon(rings(geometry, has_z)),
        GeometryKind::MultiPolygon => GeometryRecord::MultiPolygon(
            parts(geometry)
                .map(|i| rings(&geometry.get_geometry(i), has_z))
                .collect(),
        ),
        other => GeometryRecord::Unsupported(other),
    }
}

/// Linear approximation of a curve geometry, with OGR's default arc step.
fn linear_geometry(geometry: &Geometry) -> Option<Geometry> {
    // SAFETY: OGR_G_GetLinearGeometry only reads its input and returns a new
    // geometry owned by the caller, or null.
    unsafe {
        let c_linear = gdal_sys::OGR_G_GetLinearGeometry(
            geometry.c_geometry(),
            0.0,
            std::ptr::null_mut(),
        );
        if c_linear.is_null() {
            None
        } else {
            Some(Geometry::with_c_geometry(c_linear, true))
        }
    }
}

/// Indices of the sub-geometries, none for an empty geometry.
fn parts(geometry: &Geometry) -> std::ops::Range<usize> {
    if geometry.is_empty() {
        0..0
    } else {
        0..geometry.geometry_count()
    }
}

fn rings(polygon: &Geometry, has_z: bool) -> Vec<Vec<Coord>> {
    parts(polygon)
        .map(|i| coords(&polygon.get_geometry(i), has_z))
        .collect()
}

fn coords(geometry: &Geometry, has_z: bool) -> Vec<Coord> {
    // OGR reports one point for an empty Point, zero-filled.
    if geometry.is_empty() {
        return Vec::new();
    }
    geometry
        .get_point_vec()
        .into_iter()
        .map(|(x, y, z)| if has_z { vec![x, y, z] } else { vec![x, y] })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract;
    use crate::model::Vertex;
    use gdal::vector::LayerOptions;
    use gdal::DriverManager;

    fn record(wkt: &str) -> GeometryRecord {
        geometry_record(&Geometry::from_wkt(wkt).unwrap())
    }

    #[test]
    fn test_empty_point_has_no_coordinates() {
        let rec = record("POINT EMPTY");
        assert_eq!(rec, GeometryRecord::Point(vec![]));
        assert!(extract(&rec).is_empty());
    }

    #[test]
    fn test_empty_parts_have_no_coordinates() {
        assert_eq!(record("LINESTRING EMPTY"), GeometryRecord::LineString(vec![]));
        assert_eq!(record("MULTIPOLYGON EMPTY"), GeometryRecord::MultiPolygon(vec![]));
        assert_eq!(
            record("GEOMETRYCOLLECTION (POINT EMPTY)").kind(),
            GeometryKind::Other
        );
    }

    #[test]
    fn test_point_2d_and_3d() {
        assert_eq!(record("POINT (1 2)"), GeometryRecord::Point(vec![1.0, 2.0]));
        assert_eq!(
            record("POINT Z (1 2 3)"),
            GeometryRecord::Point(vec![1.0, 2.0, 3.0])
        );
    }

    #[test]
    fn test_linestring_z() {
        assert_eq!(
            record("LINESTRING Z (0 0 1, 1 1 2, 2 0 3)"),
            GeometryRecord::LineString(vec![
                vec![0.0, 0.0, 1.0],
                vec![1.0, 1.0, 2.0],
                vec![2.0, 0.0, 3.0],
            ])
        );
    }

    #[test]
    fn test_polygon_rings_keep_closure() {
        let rec = record("POLYGON ((0 0, 4 0, 4 4, 0 0), (1 1, 2 1, 2 2, 1 1))");
        let GeometryRecord::Polygon(rings) = &rec else {
            panic!("expected polygon, got {:?}", rec);
        };
        assert_eq!(rings.len(), 2);
        assert_eq!(rings[0].len(), 4);
        assert_eq!(rings[0][0], rings[0][3]);
        assert_eq!(rings[1][0], vec![1.0, 1.0]);

        // The extractor drops each closing vertex.
        assert_eq!(extract(&rec).len(), 6);
    }

    #[test]
    fn test_multilinestring() {
        assert_eq!(
            record("MULTILINESTRING ((0 0, 1 1), (5 5, 6 6, 7 7))"),
            GeometryRecord::MultiLineString(vec![
                vec![vec![0.0, 0.0], vec![1.0, 1.0]],
                vec![vec![5.0, 5.0], vec![6.0, 6.0], vec![7.0, 7.0]],
            ])
        );
    }

    #[test]
    fn test_multipolygon_z() {
        let rec = record(
            "MULTIPOLYGON Z (((0 0 1, 1 0 1, 1 1 1, 0 0 1)), ((5 5 2, 6 5 2, 6 6 2, 5 5 2)))",
        );
        let GeometryRecord::MultiPolygon(polygons) = &rec else {
            panic!("expected multipolygon, got {:?}", rec);
        };
        assert_eq!(polygons.len(), 2);
        assert_eq!(polygons[1][0][0], vec![5.0, 5.0, 2.0]);

        let vertices = extract(&rec);
        assert_eq!(vertices.len(), 6);
        assert_eq!(vertices[3], Vertex::new(5.0, 5.0, 2.0));
    }

    #[test]
    fn test_circular_string_is_stroked() {
        let rec = record("CIRCULARSTRING (0 0, 1 1, 2 0)");
        let GeometryRecord::LineString(line) = &rec else {
            panic!("expected linestring, got {:?}", rec);
        };
        assert!(line.len() > 3);
        assert_eq!(line.first(), Some(&vec![0.0, 0.0]));
        let last = line.last().unwrap();
        assert!((last[0] - 2.0).abs() < 1e-9 && last[1].abs() < 1e-9);
    }

    #[test]
    fn test_curve_polygon_is_stroked() {
        let rec = record("CURVEPOLYGON (CIRCULARSTRING (0 0, 2 0, 0 0))");
        assert_eq!(rec.kind(), GeometryKind::Polygon);
        assert!(extract(&rec).len() > 4);
    }

    #[test]
    fn test_curved_layer_reads_as_lines() {
        let Some(driver) = ["MEM", "Memory"]
            .into_iter()
            .find_map(|name| DriverManager::get_driver_by_name(name).ok())
        else {
            eprintln!("Skipping test: in-memory vector driver not available");
            return;
        };
        let Ok(mut dataset) = driver.create_vector_only("") else {
            eprintln!("Skipping test: in-memory vector driver cannot create datasets");
            return;
        };
        {
            let mut layer = dataset
                .create_layer(LayerOptions {
                    name: "arcs",
                    srs: None,
                    ty: OGRwkbGeometryType::wkbCircularString,
                    options: None,
                })
                .unwrap();
            layer
                .create_feature(Geometry::from_wkt("CIRCULARSTRING (0 0, 1 1, 2 0)").unwrap())
                .unwrap();
        }

        linearize_curves();
        let container = GdalContainer { dataset };
        assert_eq!(
            container.layer_geometry("arcs").unwrap(),
            GeometryKind::LineString
        );

        let mut features = Vec::new();
        container
            .for_each_feature("arcs", &mut |f| features.push(f))
            .unwrap();
        assert_eq!(features.len(), 1);
        let geometry = features[0].geometry.as_ref().unwrap();
        assert_eq!(geometry.kind(), GeometryKind::LineString);
        assert!(extract(geometry).len() > 3);
    }
}
