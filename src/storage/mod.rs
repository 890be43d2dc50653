//! Output naming and the artifact catalog

mod catalog;
mod naming;

pub use catalog::{ArtifactCatalog, ArtifactRecord, JsonLinesCatalog, MemoryCatalog};
pub use naming::{ArtifactNamer, ReservedArtifact};
