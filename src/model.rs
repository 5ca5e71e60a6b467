use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// One coordinate tuple as read from a geometry: `[x, y]` or `[x, y, z]`.
pub type Coord = Vec<f64>;

/// A single extracted vertex. Elevation is `0.0` for 2D sources.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub easting: f64,
    pub northing: f64,
    pub elevation: f64,
}

impl Vertex {
    pub fn new(easting: f64, northing: f64, elevation: f64) -> Self {
        Self {
            easting,
            northing,
            elevation,
        }
    }
}

/// Geometry family, independent of Z/M dimensionality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    Other,
}

const WKB_25D_BIT: u32 = 0x8000_0000;

impl GeometryKind {
    /// Maps an OGR/WKB geometry type code onto its family.
    ///
    /// Both the legacy 2.5D flag and the ISO `+1000/+2000/+3000` offsets are
    /// flattened, so `wkbPoint25D`, `wkbPointZM` and `wkbPointM` are all `Point`.
    /// Curve types fall into the family of their linear counterpart
    /// (`CompoundCurve` is a `LineString`, `MultiSurface` a `MultiPolygon`).
    pub fn from_wkb_code(code: u32) -> Self {
        match wkb_flat_code(code) {
            1 => GeometryKind::Point,
            2 | 8 | 9 => GeometryKind::LineString,
            3 | 10 => GeometryKind::Polygon,
            4 => GeometryKind::MultiPoint,
            5 | 11 => GeometryKind::MultiLineString,
            6 | 12 => GeometryKind::MultiPolygon,
            _ => GeometryKind::Other,
        }
    }

    /// Whether layers of this family are converted to CgPoints.
    pub fn is_processable(self) -> bool {
        matches!(
            self,
            GeometryKind::Point
                | GeometryKind::LineString
                | GeometryKind::MultiLineString
                | GeometryKind::Polygon
                | GeometryKind::MultiPolygon
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            GeometryKind::Point => "Point",
            GeometryKind::LineString => "LineString",
            GeometryKind::Polygon => "Polygon",
            GeometryKind::MultiPoint => "MultiPoint",
            GeometryKind::MultiLineString => "MultiLineString",
            GeometryKind::MultiPolygon => "MultiPolygon",
            GeometryKind::Other => "Other",
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn wkb_flat_code(code: u32) -> u32 {
    (code & !WKB_25D_BIT) % 1000
}

/// Whether a WKB geometry type code carries a Z ordinate.
pub fn wkb_has_z(code: u32) -> bool {
    code & WKB_25D_BIT != 0 || matches!((code & !WKB_25D_BIT) / 1000, 1 | 3)
}

/// Whether a WKB geometry type code is one of the curve types
/// (`CircularString` through `MultiSurface`).
pub fn wkb_is_curve(code: u32) -> bool {
    matches!(wkb_flat_code(code), 8..=12)
}

/// Geometry payload with the nesting depth of its type.
///
/// 3D geometries are represented by three-component coordinate tuples.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryRecord {
    Point(Coord),
    LineString(Vec<Coord>),
    MultiLineString(Vec<Vec<Coord>>),
    /// Rings, exterior first.
    Polygon(Vec<Vec<Coord>>),
    MultiPolygon(Vec<Vec<Vec<Coord>>>),
    Unsupported(GeometryKind),
}

impl GeometryRecord {
    pub fn kind(&self) -> GeometryKind {
        match self {
            GeometryRecord::Point(_) => GeometryKind::Point,
            GeometryRecord::LineString(_) => GeometryKind::LineString,
            GeometryRecord::MultiLineString(_) => GeometryKind::MultiLineString,
            GeometryRecord::Polygon(_) => GeometryKind::Polygon,
            GeometryRecord::MultiPolygon(_) => GeometryKind::MultiPolygon,
            GeometryRecord::Unsupported(kind) => *kind,
        }
    }
}

/// Scalar attribute value read from a feature.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Text(String),
    Integer(i64),
    Real(f64),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Text(s) => f.write_str(s),
            AttributeValue::Integer(i) => write!(f, "{}", i),
            AttributeValue::Real(r) => write!(f, "{:?}", r),
        }
    }
}

/// Attribute mapping of one feature. Null fields are simply absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureAttributes {
    values: HashMap<String, AttributeValue>,
}

impl FeatureAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: AttributeValue) {
        self.values.insert(key.into(), value);
    }

    pub fn with_text(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, AttributeValue::Text(value.into()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.values.get(key)
    }

    /// Attribute rendered as text, if present.
    pub fn text(&self, key: &str) -> Option<String> {
        self.values.get(key).map(|v| v.to_string())
    }

    /// Attribute rendered as text, or `default` when absent.
    pub fn text_or(&self, key: &str, default: &str) -> String {
        self.text(key).unwrap_or_else(|| default.to_string())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, AttributeValue)> for FeatureAttributes {
    fn from_iter<I: IntoIterator<Item = (String, AttributeValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// A feature as handed over by a vector source.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFeature {
    pub fid: Option<u64>,
    pub geometry: Option<GeometryRecord>,
    pub attributes: FeatureAttributes,
}

/// Normalized CgPoint, the unit of output.
#[derive(Debug, Clone, PartialEq)]
pub struct CgPointRecord {
    /// Written as the `oID` attribute.
    pub identifier: u64,
    pub name: String,
    pub code: String,
    pub description: String,
    pub role: String,
    /// Falls back to the document generation timestamp when `None`.
    pub time_stamp: Option<String>,
    pub point_geometry: String,
    pub pnt_ref: String,
    pub solution_type: String,
    pub survey_method: String,
    pub survey_order: String,
    pub class_value: String,
    pub latitude: String,
    pub longitude: String,
    pub ellipsoid_height: String,
    pub coordinate: Vertex,
}

impl CgPointRecord {
    /// Coordinate text in NORTHING EASTING ELEVATION order, 3 decimals.
    pub fn coordinate_text(&self) -> String {
        format!(
            "{:.3} {:.3} {:.3}",
            self.coordinate.northing, self.coordinate.easting, self.coordinate.elevation
        )
    }
}

/// Result of one layer of one container.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerOutcome {
    pub records: Vec<CgPointRecord>,
    pub next_identifier: u64,
    pub error: Option<String>,
}

impl LayerOutcome {
    pub fn points_added(&self) -> usize {
        self.records.len()
    }
}

/// Result of one GDB container.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionOutcome {
    pub gdb_name: String,
    pub total_points: usize,
    pub success: bool,
    pub xml_path: Option<PathBuf>,
}

/// Result of one LandXML file converted back to a GDB.
#[derive(Debug, Clone, PartialEq)]
pub struct ReverseOutcome {
    pub xml_name: String,
    pub points_written: usize,
    pub success: bool,
    pub gdb_path: Option<PathBuf>,
}

/// Aggregate of a batch run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary<O> {
    /// Inputs attempted (containers whose layers could not be listed are left out).
    pub found: usize,
    /// Inputs that produced an output file.
    pub converted: usize,
    pub outcomes: Vec<O>,
}

impl<O> Default for RunSummary<O> {
    fn default() -> Self {
        Self {
            found: 0,
            converted: 0,
            outcomes: Vec::new(),
        }
    }
}
