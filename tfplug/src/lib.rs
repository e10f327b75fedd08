//! tfplug - Terraform Plugin Framework for Rust
//!
//! The provider-facing half of a Terraform plugin: value model, schemas,
//! provider/resource/data source traits, and the helpers that keep state in
//! step with a remote JSON API (wire conversion, state merging, method
//! selection).

// Core modules
pub mod context;
pub mod error;
pub mod schema;
pub mod types;

// Provider API modules
pub mod data_source;
pub mod provider;
pub mod resource;

// Helper modules
pub mod import;
pub mod merge;
pub mod method;
pub mod plan_modifier;
pub mod wire;

// Re-exports for convenience
pub use context::Context;
pub use data_source::{DataSource, DataSourceWithConfigure};
pub use error::{Result, TfplugError};
pub use import::import_state_composite_id;
pub use merge::StateMerger;
pub use method::{pick_method, NO_METHOD};
pub use provider::{DataSourceFactory, Provider, ResourceFactory};
pub use resource::{Resource, ResourceWithConfigure, ResourceWithImportState};
pub use schema::{AttributeBuilder, AttributeType, FieldRole, NestedType, Schema, SchemaBuilder};
pub use types::{has_errors, AttributePath, Config, Diagnostic, Dynamic, DynamicValue, State};
