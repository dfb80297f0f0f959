//! Well-known names used to index and clone projects
//!
//! Stored as JSON so tools can adapt discovery to other project flavours
//! (e.g. `Microsoft.VisualBasic.targets`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::error::ProjectError;

/// Conventions used when indexing and cloning projects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConventions {
    /// Property that carries the project's GUID; its group is the default
    /// property group
    #[serde(default = "default_identifier_property")]
    pub identifier_property: String,

    /// Item kind used for assembly references
    #[serde(default = "default_reference_item")]
    pub reference_item: String,

    /// Reference whose item group is the default item group
    #[serde(default = "default_baseline_reference")]
    pub baseline_reference: String,

    /// File name of the standard build-tools import
    #[serde(default = "default_build_tools_import")]
    pub build_tools_import: String,

    /// Item kind of compiled source files; only these are rebased on clone
    #[serde(default = "default_source_item")]
    pub source_item: String,

    /// Metadata giving an item's display path in the IDE
    #[serde(default = "default_link_metadata")]
    pub link_metadata: String,

    /// Global properties used when evaluating projects
    #[serde(default = "default_global_properties")]
    pub global_properties: BTreeMap<String, String>,
}

fn default_identifier_property() -> String {
    "ProjectGuid".to_string()
}

fn default_reference_item() -> String {
    "Reference".to_string()
}

fn default_baseline_reference() -> String {
    "System".to_string()
}

fn default_build_tools_import() -> String {
    "Microsoft.CSharp.targets".to_string()
}

fn default_source_item() -> String {
    "Compile".to_string()
}

fn default_link_metadata() -> String {
    "Link".to_string()
}

fn default_global_properties() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("Configuration".to_string(), "Debug".to_string()),
        ("Platform".to_string(), "AnyCPU".to_string()),
    ])
}

impl Default for ProjectConventions {
    fn default() -> Self {
        Self {
            identifier_property: default_identifier_property(),
            reference_item: default_reference_item(),
            baseline_reference: default_baseline_reference(),
            build_tools_import: default_build_tools_import(),
            source_item: default_source_item(),
            link_metadata: default_link_metadata(),
            global_properties: default_global_properties(),
        }
    }
}

impl ProjectConventions {
    /// Default location of the conventions file
    pub fn default_path() -> io::Result<PathBuf> {
        let base = dirs::config_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, "Could not find config directory")
            })?;
        Ok(base.join("projkit").join("conventions.json"))
    }

    /// Load conventions from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ProjectError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Load from the default location, falling back to defaults if the file
    /// does not exist
    pub fn load_or_default() -> Result<Self, ProjectError> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save conventions as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ProjectError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Whether an import's project path names the standard build-tools target
    pub fn is_build_tools_import(&self, project: &str) -> bool {
        let file_name = project.rsplit(['\\', '/']).next().unwrap_or(project);
        file_name.eq_ignore_ascii_case(&self.build_tools_import)
    }
}
