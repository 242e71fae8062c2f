//! Foundation types for object edits.
//!
//! Every other `odb-*` crate depends on `odb-types`. It defines the dynamic
//! value model that edited objects are expressed in and the identifier that
//! ties an edit back to the stored object.
//!
//! # Key Types
//!
//! - [`Value`] — Tagged union over JSON-compatible data plus dates
//! - [`Shape`] — Structural classification used by the differ
//! - [`ObjectId`] — Identifier of the object being edited, carried verbatim
//! - [`FunctionRef`] — Opaque callable marker; never diffed or serialized

pub mod error;
pub mod object;
pub mod value;

pub use error::TypeError;
pub use object::ObjectId;
pub use value::{parse_index, FunctionRef, Number, Shape, Value};
