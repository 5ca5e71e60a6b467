//! # LandXML Parser
//!
//! Reads the `CgPoints/CgPoint` elements of a LandXML 1.2 document. Elements are
//! matched by namespace and local name, so prefixed and default-namespace
//! documents are both accepted. Elements outside the LandXML namespace are
//! ignored.
//!
//! Point text is read as `NORTHING EASTING ELEVATION`, the same order the writer
//! produces. A point whose text has fewer than three numeric values is skipped
//! with a warning; the rest of the document is still read.

use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use tracing::{debug, warn};

use super::LANDXML_NS;
use crate::error::{Error, Result};
use crate::model::Vertex;

/// One CgPoint as read back from a document.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCgPoint {
    pub name: String,
    pub code: String,
    pub desc: String,
    pub oid: String,
    pub solution_type: String,
    pub survey_method: String,
    pub class_value: String,
    pub vertex: Vertex,
}

#[derive(Debug, Default)]
struct PendingPoint {
    name: String,
    code: String,
    desc: String,
    oid: String,
    solution_type: String,
    survey_method: String,
    class_value: String,
    text: String,
}

impl PendingPoint {
    fn from_element(element: &BytesStart<'_>) -> Result<Self> {
        let mut point = PendingPoint::default();
        for attr in element.attributes() {
            let attr = attr?;
            let value = attr.unescape_value()?.into_owned();
            match attr.key.local_name().as_ref() {
                b"name" => point.name = value,
                b"code" => point.code = value,
                b"desc" => point.desc = value,
                b"oID" => point.oid = value,
                b"solutionType" => point.solution_type = value,
                b"surveyMethod" => point.survey_method = value,
                b"class" => point.class_value = value,
                _ => {}
            }
        }
        Ok(point)
    }

    fn finish(self) -> Option<ParsedCgPoint> {
        let values: Vec<f64> = self
            .text
            .split_whitespace()
            .map(str::parse)
            .collect::<std::result::Result<_, _>>()
            .ok()?;
        let [northing, easting, elevation] = values.get(..3)? else {
            return None;
        };
        Some(ParsedCgPoint {
            vertex: Vertex::new(*easting, *northing, *elevation),
            name: self.name,
            code: self.code,
            desc: self.desc,
            oid: self.oid,
            solution_type: self.solution_type,
            survey_method: self.survey_method,
            class_value: self.class_value,
        })
    }
}

fn is_landxml(ns: &ResolveResult<'_>) -> bool {
    matches!(ns, ResolveResult::Bound(Namespace(uri)) if *uri == LANDXML_NS.as_bytes())
}

/// Parses every CgPoint of a LandXML document.
///
/// Returns [`Error::MissingElement`] when the document has no `CgPoints`
/// element at all.
pub fn parse_cg_points<R: BufRead>(reader: R) -> Result<Vec<ParsedCgPoint>> {
    let mut reader = NsReader::from_reader(reader);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut points = Vec::new();
    let mut seen_collection = false;
    let mut current: Option<PendingPoint> = None;

    loop {
        match reader.read_resolved_event_into(&mut buf)? {
            (ns, Event::Start(e)) if is_landxml(&ns) => match e.local_name().as_ref() {
                b"CgPoints" => seen_collection = true,
                b"CgPoint" if seen_collection => current = Some(PendingPoint::from_element(&e)?),
                _ => {}
            },
            (ns, Event::Empty(e)) if is_landxml(&ns) => match e.local_name().as_ref() {
                b"CgPoints" => seen_collection = true,
                b"CgPoint" if seen_collection => {
                    let point = PendingPoint::from_element(&e)?;
                    warn!("No coordinate data for point '{}'", point.name);
                }
                _ => {}
            },
            (_, Event::Text(text)) => {
                if let Some(point) = current.as_mut() {
                    point.text.push_str(&text.unescape()?);
                }
            }
            (ns, Event::End(e)) if is_landxml(&ns) && e.local_name().as_ref() == b"CgPoint" => {
                if let Some(point) = current.take() {
                    let name = point.name.clone();
                    let text = point.text.clone();
                    match point.finish() {
                        Some(parsed) => points.push(parsed),
                        None => warn!(
                            "Could not parse coordinates for point '{}': '{}'",
                            name, text
                        ),
                    }
                }
            }
            (_, Event::Eof) => break,
            _ => {}
        }
        buf.clear();
    }

    if !seen_collection {
        return Err(Error::MissingElement("CgPoints"));
    }
    debug!("Parsed {} CgPoints", points.len());
    Ok(points)
}
