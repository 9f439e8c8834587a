//! Common types shared by the quicklook crates: error kinds, extents,
//! derived 2D fields, attribute values and boundary outlines.

pub mod attribute;
pub mod bbox;
pub mod error;
pub mod field;
pub mod outline;

pub use attribute::{AttrKind, AttrValue};
pub use bbox::BoundingBox;
pub use error::{QuicklookError, QuicklookResult};
pub use field::Field2D;
pub use outline::Outline;
