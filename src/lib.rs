pub mod backend;
pub mod convert;
pub mod error;
pub mod extract;
pub mod landxml;
pub mod layer;
pub mod model;
pub mod reverse;
pub mod source;
pub mod status;
pub mod synthesizer;
pub mod writer;

pub use convert::{convert_directory, run_conversion, ConversionConfig};
pub use error::{Error, Result};
pub use landxml::{parse_cg_points, DocumentBuilder, LandXmlDocument, ParsedCgPoint};
pub use model::{CgPointRecord, ConversionOutcome, ReverseOutcome, RunSummary, Vertex};
pub use reverse::{run_reverse_conversion, ReverseConfig};
pub use status::{ChannelSink, StatusEvent, StatusSink, TracingSink};
pub use writer::GdbWriter;
