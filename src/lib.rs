#![deny(
    missing_debug_implementations,
    clippy::print_stderr,
    clippy::print_stdout
)]

//! # modforge
//!
//! The front half of a CRUD module scaffolder: a compact comma separated
//! schema goes in, an immutable [`BuildPlan`] comes out.
//!
//! ```
//! use modforge::{GenerateOptions, PlanBuilder};
//!
//! let options = GenerateOptions {
//!     display_name: "Job Opening".to_owned(),
//!     fields: "name:textbox,status:select:nullable:Open|Closed".to_owned(),
//!     filterable: vec!["status".to_owned()],
//!     ..Default::default()
//! };
//! let plan = PlanBuilder::new(&options).build();
//!
//! assert_eq!(plan.names.route, "job-openings");
//! assert_eq!(plan.filters.len(), 1);
//! assert!(plan.diagnostics.is_empty());
//! ```
//!
//! Rendering the plan into files and splicing it into an existing project is
//! done by `modforge-codegen`; the `modforge` binary lives in `modforge-cli`.

pub mod catalog;
mod error;
pub mod inference;
pub mod names;
pub mod plan;
pub mod schema;

pub use catalog::*;
pub use error::*;
pub use inference::*;
pub use names::Names;
pub use plan::*;
pub use schema::*;
