//! # pkport
//!
//! A declarative tag-porting engine. It reads loosely typed semantic records
//! (pku documents), validates and clamps every tag against the rules of a
//! target format, writes the results into bit-packed binary layouts and
//! reports each lossy or ambiguous step as an alert.
//!
//! The pieces, leaf first:
//! - [bits], [field], [layout], [store], [target]: declare a binary layout and
//!   read or write its fields at arbitrary bit offsets.
//! - [alert]: mergeable warnings and blocking choice alerts.
//! - [record]: the pku document and its typed reads.
//! - [tag]: the numeric, multi-numeric, indexed, boolean and string primitives.
//! - [resolver]: values that wait for a choice before being committed.
//! - [scheduler], [pipeline]: phased, dependency ordered execution.
//! - [overrides]: raw byte patches applied after everything else.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use pkport::bits::BitOrder;
//! use pkport::field::Field;
//! use pkport::layout::Layout;
//! use pkport::pipeline::{Pipeline, Session};
//! use pkport::record::SemanticRecord;
//! use pkport::scheduler::{Operation, Phase};
//! use pkport::tag::{self, FieldSlot, Unspecified};
//! use pkport::target::BinaryTarget;
//!
//! type Ctx = Session<SemanticRecord, BinaryTarget, ()>;
//!
//! fn friendship(ctx: &mut Ctx) -> Result<(), pkport::errors::PortError> {
//!     let source = ctx.source.int(&["Friendship"]);
//!     let mut slot = FieldSlot::new(&mut ctx.data, "Friendship")?;
//!     let alert = tag::numeric("Friendship", source, &mut slot, 70, Unspecified::Alert)?;
//!     ctx.warn(alert);
//!     Ok(())
//! }
//!
//! let layout = Layout::compile("demo", 1, BitOrder::LsbFirst, vec![Field::bytes("Friendship", 0, 1)]).unwrap();
//! let record = SemanticRecord::from_json(r#"{ "Friendship": 300 }"#).unwrap();
//! let session = Session::new(record, BinaryTarget::new(Arc::new(layout)), ());
//!
//! let pipeline = Pipeline::new(vec![Operation::new("Friendship", Phase::FirstPass, friendship)]).unwrap();
//! let finished = pipeline
//!     .start(session)
//!     .unwrap()
//!     .finish(&mut |_: &pkport::alert::ChoiceAlert| -> Option<usize> { None })
//!     .unwrap();
//!
//! assert_eq!(finished.data.bytes(), &[255]);
//! assert_eq!(finished.warnings.len(), 1);
//! ```

pub mod alert;
pub mod bits;
pub mod errors;
pub mod field;
pub mod layout;
pub mod overrides;
pub mod pipeline;
pub mod record;
pub mod resolver;
pub mod scheduler;
pub mod serde;
pub mod store;
pub mod tag;
pub mod target;

pub use errors::{PortError, PortResult};
