use anyhow::{Context, Result};
use gdal::spatial_ref::SpatialRef;
use gdal::vector::{
    FieldValue, Geometry, LayerAccess, LayerOptions, OGRFieldType, OGRwkbGeometryType,
};
use gdal::DriverManager;
use std::fs;
use std::path::Path;

use crate::backend::GDB_DRIVER;
use crate::landxml::ParsedCgPoint;

pub const DEFAULT_LAYER_NAME: &str = "SurveyPoints";
/// RD New. Attached as a label only, coordinates are written unchanged.
pub const SURVEY_EPSG: u32 = 28992;

const FIELDS: [(&str, OGRFieldType::Type); 8] = [
    ("name", OGRFieldType::OFTString),
    ("code", OGRFieldType::OFTString),
    ("desc", OGRFieldType::OFTString),
    ("oID", OGRFieldType::OFTString),
    ("solutionType", OGRFieldType::OFTString),
    ("surveyMethod", OGRFieldType::OFTString),
    ("class", OGRFieldType::OFTString),
    ("elevation_val", OGRFieldType::OFTReal),
];

/// Writes CgPoints into a new File Geodatabase as a single PointZ layer.
pub struct GdbWriter {
    layer_name: String,
}

impl Default for GdbWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl GdbWriter {
    pub fn new() -> Self {
        Self {
            layer_name: DEFAULT_LAYER_NAME.to_string(),
        }
    }

    pub fn with_layer_name(layer_name: impl Into<String>) -> Self {
        Self {
            layer_name: layer_name.into(),
        }
    }

    pub fn layer_name(&self) -> &str {
        &self.layer_name
    }

    /// Writes `points` to `output_path`, replacing any existing geodatabase there.
    pub fn write(&self, points: &[ParsedCgPoint], output_path: &Path) -> Result<()> {
        if output_path.exists() {
            fs::remove_dir_all(output_path)
                .with_context(|| format!("Failed to remove existing GDB {:?}", output_path))?;
        }

        let driver = DriverManager::get_driver_by_name(GDB_DRIVER)
            .context("Failed to get OpenFileGDB driver")?;

        let mut dataset = driver
            .create_vector_only(output_path)
            .context("Failed to create dataset")?;

        // CRS is a label only; skipped when PROJ cannot resolve it
        let srs = match SpatialRef::from_epsg(SURVEY_EPSG) {
            Ok(srs) => Some(srs),
            Err(e) => {
                tracing::warn!(
                    "Writing {:?} without CRS: EPSG:{} unavailable: {}",
                    output_path,
                    SURVEY_EPSG,
                    e
                );
                None
            }
        };

        let mut layer = dataset
            .create_layer(LayerOptions {
                name: &self.layer_name,
                srs: srs.as_ref(),
                ty: OGRwkbGeometryType::wkbPoint25D,
                options: None,
            })
            .context("Failed to create layer")?;

        layer
            .create_defn_fields(&FIELDS)
            .context("Failed to create layer fields")?;

        let field_names: Vec<&str> = FIELDS.iter().map(|(name, _)| *name).collect();

        for point in points {
            let mut geometry = Geometry::empty(OGRwkbGeometryType::wkbPoint25D)
                .context("Failed to create point geometry")?;
            let v = point.vertex;
            geometry.add_point((v.easting, v.northing, v.elevation));

            let values = [
                FieldValue::StringValue(point.name.clone()),
                FieldValue::StringValue(point.code.clone()),
                FieldValue::StringValue(point.desc.clone()),
                FieldValue::StringValue(point.oid.clone()),
                FieldValue::StringValue(point.solution_type.clone()),
                FieldValue::StringValue(point.survey_method.clone()),
                FieldValue::StringValue(point.class_value.clone()),
                FieldValue::RealValue(v.elevation),
            ];
            layer
                .create_feature_fields(geometry, &field_names, &values)
                .with_context(|| format!("Failed to write point '{}'", point.name))?;
        }

        tracing::info!(
            "Wrote {} points to layer '{}' of {:?}",
            points.len(),
            self.layer_name,
            output_path
        );

        Ok(())
    }
}
