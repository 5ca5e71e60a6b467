use std::fs;
use std::path::Path;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::document::LandXmlDocument;
use super::{LANDXML_NS, SCHEMA_LOCATION, SCHEMA_VERSION, XSI_NS};
use crate::error::{Error, Result};

/// Declaration written in place of the serializer's own.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no" ?>"#;

const INDENT: usize = 2;

/// Serializes a document to indented UTF-8 bytes.
///
/// The output depends only on the document, so serializing the same document
/// twice yields identical bytes.
pub fn to_bytes(doc: &LandXmlDocument) -> Result<Vec<u8>> {
    let timestamp = doc.timestamp();
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT);

    // Root element with namespace declarations
    let mut root = BytesStart::new("LandXML");
    root.push_attribute(("xmlns", LANDXML_NS));
    root.push_attribute(("xmlns:xsi", XSI_NS));
    root.push_attribute(("date", doc.date_string().as_str()));
    root.push_attribute(("time", doc.time_string().as_str()));
    root.push_attribute(("version", SCHEMA_VERSION));
    root.push_attribute(("language", "English"));
    root.push_attribute(("readOnly", "false"));
    root.push_attribute(("xsi:schemaLocation", SCHEMA_LOCATION));
    writer.write_event(Event::Start(root))?;

    // Units
    let u = &doc.units;
    writer.write_event(Event::Start(BytesStart::new("Units")))?;
    writer.write_event(Event::Empty(BytesStart::new("Metric").with_attributes([
        ("areaUnit", u.area_unit),
        ("linearUnit", u.linear_unit),
        ("volumeUnit", u.volume_unit),
        ("temperatureUnit", u.temperature_unit),
        ("pressureUnit", u.pressure_unit),
        ("diameterUnit", u.diameter_unit),
        ("angularUnit", u.angular_unit),
        ("directionUnit", u.direction_unit),
    ])))?;
    writer.write_event(Event::End(BytesEnd::new("Units")))?;

    // Coordinate system (descriptive only, nothing is reprojected)
    let cs = &doc.coordinate_system;
    writer.write_event(Event::Empty(BytesStart::new("CoordinateSystem").with_attributes([
        ("desc", cs.desc),
        ("name", cs.name),
        ("epsgCode", cs.epsg_code),
        ("horizontalDatum", cs.horizontal_datum),
        ("verticalDatum", cs.vertical_datum),
        ("ellipsoidName", cs.ellipsoid_name),
        (
            "horizontalCoordinateSystemName",
            cs.horizontal_coordinate_system_name,
        ),
        ("zone", cs.zone),
        ("falseNorthing", cs.false_northing),
        ("falseEasting", cs.false_easting),
        ("latitudeOfNaturalOrigin", cs.latitude_of_natural_origin),
        ("longitudeOfNaturalOrigin", cs.longitude_of_natural_origin),
        ("naturalOriginScaleFactor", cs.natural_origin_scale_factor),
    ])))?;

    // Application stamp
    let app = &doc.application;
    writer.write_event(Event::Start(BytesStart::new("Application").with_attributes([
        ("name", app.name),
        ("desc", app.desc),
        ("manufacturer", app.manufacturer),
        ("version", app.version),
        ("manufacturerURL", app.manufacturer_url),
        ("timeStamp", timestamp.as_str()),
    ])))?;
    writer.write_event(Event::Empty(BytesStart::new("Author").with_attributes([
        ("createdBy", app.created_by),
        ("company", app.company),
        ("companyURL", app.company_url),
        ("timeStamp", timestamp.as_str()),
    ])))?;
    writer.write_event(Event::End(BytesEnd::new("Application")))?;

    // Points
    writer.write_event(Event::Start(
        BytesStart::new("CgPoints").with_attributes([("name", doc.source_name.as_str())]),
    ))?;
    for point in &doc.points {
        let oid = point.identifier.to_string();
        let element = BytesStart::new("CgPoint").with_attributes([
            ("name", point.name.as_str()),
            ("oID", oid.as_str()),
            ("code", point.code.as_str()),
            ("desc", point.description.as_str()),
            ("role", point.role.as_str()),
            (
                "timeStamp",
                point.time_stamp.as_deref().unwrap_or(timestamp.as_str()),
            ),
            ("pointGeometry", point.point_geometry.as_str()),
            ("pntRef", point.pnt_ref.as_str()),
            ("solutionType", point.solution_type.as_str()),
            ("surveyMethod", point.survey_method.as_str()),
            ("surveyOrder", point.survey_order.as_str()),
            ("class", point.class_value.as_str()),
            ("latitude", point.latitude.as_str()),
            ("longitude", point.longitude.as_str()),
            ("ellipsoidHeight", point.ellipsoid_height.as_str()),
        ]);
        writer.write_event(Event::Start(element))?;
        writer.write_event(Event::Text(BytesText::new(&point.coordinate_text())))?;
        writer.write_event(Event::End(BytesEnd::new("CgPoint")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("CgPoints")))?;

    writer.write_event(Event::End(BytesEnd::new("LandXML")))?;

    let body = writer.into_inner();
    let mut bytes = Vec::with_capacity(XML_DECLARATION.len() + body.len() + 2);
    bytes.extend_from_slice(XML_DECLARATION.as_bytes());
    bytes.push(b'\n');
    bytes.extend_from_slice(&body);
    bytes.push(b'\n');
    Ok(bytes)
}

/// Serializes and writes a document in one go.
pub fn write_document(doc: &LandXmlDocument, output_path: &Path) -> Result<()> {
    let bytes = to_bytes(doc)?;
    fs::write(output_path, bytes).map_err(|e| Error::path(output_path, e))
}
