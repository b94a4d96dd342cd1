//! Data model shared by every stage of ingestion and diffing.

pub mod identity;
pub mod location;
pub mod object;
pub mod record;
pub mod value;

pub use identity::DocumentIdentity;
pub use location::{GeographicLocation, GeometryKind};
pub use object::ObjectNode;
pub use record::Record;
pub use value::{FieldMap, FieldValue};
