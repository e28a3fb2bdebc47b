//! # slidex-opc
//!
//! Open Packaging Conventions (OPC) support for slidex.
//!
//! This crate provides:
//! - An in-memory part store backed by a ZIP archive ([`Package`])
//! - Per-owner relationship tables ([`Relationships`])
//! - Part-name arithmetic and a run-scoped name allocator ([`PartName`],
//!   [`PartNameAllocator`])
//! - A small owned XML element tree used to copy and rebuild XML parts
//!   ([`xml::XmlElement`])
//!
//! ## Example
//!
//! ```no_run
//! use slidex_opc::{Package, RelOwner};
//!
//! let package = Package::open("deck.pptx")?;
//! for rel in package.relationships(&RelOwner::Package) {
//!     println!("{} -> {:?}", rel.id, rel.target);
//! }
//! # Ok::<(), slidex_opc::OpcError>(())
//! ```

pub mod content_types;
pub mod error;
pub mod names;
pub mod package;
pub mod part;
pub mod relationships;
pub mod xml;

pub use content_types::ContentTypes;
pub use error::{OpcError, Result};
pub use names::{PartNameAllocator, PartNameTemplate};
pub use package::{Compression, Package, RelOwner, RelTarget, Relationship};
pub use part::{Part, PartName};
pub use relationships::{RelationshipTarget, Relationships, TargetMode};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
