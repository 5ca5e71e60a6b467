use chrono::{DateTime, Utc};

use crate::model::CgPointRecord;

/// `<Metric>` unit labels.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricUnits {
    pub area_unit: &'static str,
    pub linear_unit: &'static str,
    pub volume_unit: &'static str,
    pub temperature_unit: &'static str,
    pub pressure_unit: &'static str,
    pub diameter_unit: &'static str,
    pub angular_unit: &'static str,
    pub direction_unit: &'static str,
}

impl Default for MetricUnits {
    fn default() -> Self {
        Self {
            area_unit: "squareMeter",
            linear_unit: "meter",
            volume_unit: "cubicMeter",
            temperature_unit: "celsius",
            pressure_unit: "pascal",
            diameter_unit: "meter",
            angular_unit: "decimal dd.mm.ss",
            direction_unit: "decimal dd.mm.ss",
        }
    }
}

/// Descriptive `<CoordinateSystem>` block. Coordinates are never transformed;
/// these values only label the data (RD New + NAP heights).
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateSystem {
    pub desc: &'static str,
    pub name: &'static str,
    pub epsg_code: &'static str,
    pub horizontal_datum: &'static str,
    pub vertical_datum: &'static str,
    pub ellipsoid_name: &'static str,
    pub horizontal_coordinate_system_name: &'static str,
    pub zone: &'static str,
    pub false_northing: &'static str,
    pub false_easting: &'static str,
    pub latitude_of_natural_origin: &'static str,
    pub longitude_of_natural_origin: &'static str,
    pub natural_origin_scale_factor: &'static str,
}

impl Default for CoordinateSystem {
    fn default() -> Self {
        Self {
            desc: "RD / NAP",
            name: "RDNAP",
            epsg_code: "28992+5709",
            horizontal_datum: "Amersfoort",
            vertical_datum: "NAP",
            ellipsoid_name: "Bessel 1841",
            horizontal_coordinate_system_name: "RD",
            zone: "",
            false_northing: "0",
            false_easting: "0",
            latitude_of_natural_origin: "0",
            longitude_of_natural_origin: "0",
            natural_origin_scale_factor: "1",
        }
    }
}

/// `<Application>` and nested `<Author>` stamp.
#[derive(Debug, Clone, PartialEq)]
pub struct Application {
    pub name: &'static str,
    pub desc: &'static str,
    pub manufacturer: &'static str,
    pub version: &'static str,
    pub manufacturer_url: &'static str,
    pub created_by: &'static str,
    pub company: &'static str,
    pub company_url: &'static str,
}

impl Default for Application {
    fn default() -> Self {
        Self {
            name: "GDB to LandXML Converter",
            desc: "Converted from GDB",
            manufacturer: "gdb-landxml",
            version: env!("CARGO_PKG_VERSION"),
            manufacturer_url: "",
            created_by: "AutomatedProcess",
            company: "N/A",
            company_url: "",
        }
    }
}

/// A complete LandXML CgPoints document, ready for serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct LandXmlDocument {
    /// Base name of the source container; written as the `CgPoints` name.
    pub source_name: String,
    pub generated_at: DateTime<Utc>,
    pub units: MetricUnits,
    pub coordinate_system: CoordinateSystem,
    pub application: Application,
    pub points: Vec<CgPointRecord>,
}

impl LandXmlDocument {
    pub fn date_string(&self) -> String {
        self.generated_at.format("%Y-%m-%d").to_string()
    }

    pub fn time_string(&self) -> String {
        self.generated_at.format("%H:%M:%S").to_string()
    }

    /// ISO 8601 with milliseconds and a `Z` suffix.
    pub fn timestamp(&self) -> String {
        self.generated_at
            .format("%Y-%m-%dT%H:%M:%S%.3fZ")
            .to_string()
    }
}

/// Accumulates the records of every layer of one container.
#[derive(Debug, Clone)]
pub struct DocumentBuilder {
    source_name: String,
    generated_at: DateTime<Utc>,
    points: Vec<CgPointRecord>,
}

impl DocumentBuilder {
    pub fn new(source_name: impl Into<String>, generated_at: DateTime<Utc>) -> Self {
        Self {
            source_name: source_name.into(),
            generated_at,
            points: Vec::new(),
        }
    }

    /// Appends records in the order given.
    pub fn append_records<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = CgPointRecord>,
    {
        self.points.extend(records);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn finish(self) -> LandXmlDocument {
        LandXmlDocument {
            source_name: self.source_name,
            generated_at: self.generated_at,
            units: MetricUnits::default(),
            coordinate_system: CoordinateSystem::default(),
            application: Application::default(),
            points: self.points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FeatureAttributes, GeometryKind, Vertex};
    use crate::synthesizer::{synthesize, VertexContext};
    use chrono::TimeZone;

    fn record(id: u64) -> CgPointRecord {
        let attrs = FeatureAttributes::new();
        synthesize(
            Vertex::new(0.0, 0.0, 0.0),
            &VertexContext {
                attributes: &attrs,
                geometry: GeometryKind::Point,
                feature_id: "1",
                vertex_index: 1,
                identifier: id,
                layer_name: "pts",
            },
        )
    }

    #[test]
    fn test_builder_keeps_append_order() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        let mut builder = DocumentBuilder::new("site", at);
        assert!(builder.is_empty());

        builder.append_records(vec![record(1), record(2)]);
        builder.append_records(vec![record(3)]);
        assert_eq!(builder.len(), 3);

        let doc = builder.finish();
        let ids: Vec<u64> = doc.points.iter().map(|p| p.identifier).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(doc.source_name, "site");
    }

    #[test]
    fn test_timestamp_strings() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        let doc = DocumentBuilder::new("site", at).finish();
        assert_eq!(doc.date_string(), "2024-03-05");
        assert_eq!(doc.time_string(), "07:08:09");
        assert_eq!(doc.timestamp(), "2024-03-05T07:08:09.000Z");
    }
}
