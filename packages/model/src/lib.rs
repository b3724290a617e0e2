//! # Weft Model
//!
//! Document tree, addressing and the atomic operation log for the weft
//! editing core.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ addressing: Path, Point, Range + transforms │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ tree: Value → Element / Text, queries       │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ operations: apply(snapshot) → snapshot'     │
//! │  - every operation has an exact inverse     │
//! │  - selection/annotations carried along      │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use weft_model::{Node, Operation, Path, Value};
//!
//! let value = Value::new([Node::element("paragraph", [Node::text("hello")])]);
//! let op = Operation::InsertText {
//!     path: Path::from([0, 0]),
//!     offset: 5,
//!     text: " world".into(),
//! };
//! let next = op.apply(&value).unwrap();
//! assert_eq!(next.string(), "hello world");
//!
//! let restored = op.inverse().unwrap().apply(&next).unwrap();
//! assert_eq!(restored, value);
//! ```

mod error;
mod location;
mod node;
mod operation;
mod path;
mod point;
mod positions;
mod query;
mod value;

pub use error::{ModelError, ModelResult};
pub use location::Location;
pub use node::{Data, Element, Mark, Node, NodeObject, Properties, Text};
pub use operation::Operation;
pub use path::{Affinity, Path};
pub use point::{Edge, Point, Range, RangeAffinity};
pub use positions::Unit;
pub use query::Descendants;
pub use value::{Annotation, NodeRef, Value};
