//! Rendering and materialisation of modforge build plans.
//!
//! [`Renderer`] turns a [`modforge::BuildPlan`] into module files, and
//! [`Materializer`] writes them and registers the module in the shared files
//! of an existing project.

mod materialize;
mod registry;
mod renderer;
mod template;
mod util;

pub use materialize::*;
pub use modforge::Error;
pub use registry::*;
pub use renderer::*;
pub use template::*;
