//! Project Documents
//!
//! An editable in-memory model of project files: a `<Project>` root whose
//! children are property groups, item groups and imports.
//!
//! ```text
//! <Project>
//!   <PropertyGroup>                       default property group
//!     <ProjectGuid>{...}</ProjectGuid>
//!   </PropertyGroup>
//!   <PropertyGroup Condition=" '$(Configuration)|$(Platform)' == 'Debug|AnyCPU' ">
//!     ...
//!   </PropertyGroup>
//!   <ItemGroup>
//!     <Reference Include="System" />
//!     <Compile Include="Program.cs" />
//!   </ItemGroup>
//!   <Import Project="$(MSBuildToolsPath)\Microsoft.CSharp.targets" />
//! </Project>
//! ```
//!
//! Elements are addressed with [`ElementRef`]s that remember which document
//! they came from, so a node of one project can never be used to edit
//! another.

mod error;
mod evaluation;
mod nodes;
mod project_document;
mod query;
mod reader;
mod tree;
mod writer;

pub use error::DocumentError;
pub use evaluation::Evaluation;
pub use nodes::{
    Import, Item, ItemGroup, Property, PropertyGroup, CONDITION_ATTRIBUTE, IMPORT,
    INCLUDE_ATTRIBUTE, ITEM_GROUP, LABEL_ATTRIBUTE, PROJECT_ATTRIBUTE, PROPERTY_GROUP,
};
pub use project_document::{Element, ProjectDocument, MSBUILD_NAMESPACE};
pub use query::{ConditionalGroup, ConfigurationGroup, CONFIGURATION};
pub use reader::PROJECT_ELEMENT;
pub use tree::{DocumentId, ElementRef, NodeId};
