//! Project Management
//!
//! Loaded projects, the registry that keeps one live instance per file, and
//! cloning a project to a new location.
//!
//! ## Cloning
//!
//! Item includes are relative to the project file, so a copy written to
//! another directory would point at the wrong sources. Cloning rewrites
//! every compiled-source include:
//!
//! ```text
//! C:\Proj\A\A.proj   <Compile Include="..\Shared\Foo.cs" />
//! C:\Proj\B\B.proj   <Compile Include="..\Shared\Foo.cs">
//!                      <Link>Foo.cs</Link>
//!                    </Compile>
//! ```
//!
//! Conventions such as the identifier property or the source item kind
//! live in [`ProjectConventions`] and can be loaded from a JSON file.

mod conventions;
mod error;
mod paths;
#[allow(clippy::module_inception)]
mod project;
mod registry;

pub use conventions::ProjectConventions;
pub use error::ProjectError;
pub use paths::{
    include_file_name, normalize_project_path, project_directory, rebase_include,
    resolve_include, INCLUDE_SEPARATOR,
};
pub use project::Project;
pub use registry::{ProjectHandle, ProjectRegistry};
