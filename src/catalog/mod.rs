//! Catalog module
//!
//! Discovery of the selection document and resolution of a supplied one.
//!
//! # Example
//!
//! ```rust
//! use tap_incident::catalog::{discover, resolve};
//!
//! let catalog = discover().unwrap();
//! let resolved = resolve(Some(&catalog)).unwrap();
//! assert!(resolved.iter().all(|s| s.selected));
//! ```

mod discover;
mod selection;
mod types;

pub use discover::{catalog_entry, discover};
pub use selection::{resolve, resolve_entry, ResolvedStream};
pub use types::{Catalog, CatalogEntry, Inclusion, Metadata, MetadataEntry, PROPERTIES};

#[cfg(test)]
mod tests;
