//! Schema inference and validation pipeline
//!
//! Candidates reported by the database's schema procedures are confirmed one
//! by one with `LIMIT 1` existence probes before they make it into the
//! exported document:
//!
//! ```text
//! introspection → decode → resolve → reduce (topology only)
//!               → validate (all three aspects) → assemble → export
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod assembler;
pub mod decoder;
pub mod export;
pub mod introspection;
pub mod predicate;
pub mod prober;
pub mod reducer;
pub mod validator;

pub use assembler::{AssemblyError, PartialSchema, SchemaAssembler, SchemaReport};
pub use decoder::{decode, resolve_triples, DecodedGraph, Triple};
pub use export::write_document;
pub use predicate::Predicate;
pub use prober::{CypherProber, ExistenceProbe};
pub use reducer::reduce;
pub use validator::{Aspect, Validated, ValidationWarning, Validator};
