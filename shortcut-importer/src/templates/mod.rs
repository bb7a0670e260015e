//! Template rendering using Handlebars.
//!
//! Renders the configurable pieces of text the importer writes into the
//! workspace: the provenance header of migrated descriptions and the names of
//! generated iterations.

mod error;
mod renderer;

pub use error::TemplateError;
pub use renderer::{create_handlebars_registry, TemplateRenderer};

/// Separator placed between the provenance header and the original issue body.
pub const DESCRIPTION_SEPARATOR: &str = "\n\n---\n\n";
