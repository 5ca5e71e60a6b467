//! LandXML 1.2 CgPoints documents: building, serializing and parsing.

pub mod document;
pub mod parser;
pub mod writer;

pub use document::{DocumentBuilder, LandXmlDocument};
pub use parser::{parse_cg_points, ParsedCgPoint};
pub use writer::{to_bytes, write_document, XML_DECLARATION};

pub const LANDXML_NS: &str = "http://www.landxml.org/schema/LandXML-1.2";
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const SCHEMA_LOCATION: &str =
    "http://www.landxml.org/schema/LandXML-1.2 http://www.landxml.org/schema/LandXML-1.2/LandXML-1.2.xsd";
pub const SCHEMA_VERSION: &str = "1.2";
