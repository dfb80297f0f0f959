//! Evaluated property view
//!
//! Walks property groups in document order and records the value each
//! property ends up with for a given set of global properties. Group and
//! property conditions are honoured when they use the equality grammar;
//! anything else (`Exists(...)`, `and`/`or`) is treated as false. Values
//! are taken literally: `$(Name)` references inside them are not expanded.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::condition::ConditionSet;

use super::project_document::ProjectDocument;
use super::tree::DocumentId;

/// Property values as seen by a build with the given global properties
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    /// Lower-cased name -> (declared name, value)
    properties: HashMap<String, (String, String)>,
    document: Option<DocumentId>,
    revision: u64,
}

impl Evaluation {
    /// Evaluate property groups in document order.
    ///
    /// A group or property whose condition is false is skipped; later
    /// definitions override earlier ones. Global properties always win.
    pub fn evaluate(document: &ProjectDocument, globals: &BTreeMap<String, String>) -> Self {
        let mut properties: HashMap<String, (String, String)> = globals
            .iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), (name.clone(), value.clone())))
            .collect();

        for group in document.property_groups() {
            if !condition_holds(group.condition(), &properties) {
                continue;
            }
            for property in group.properties() {
                let key = property.name().to_ascii_lowercase();
                // Globals cannot be overridden from inside the project
                if globals.keys().any(|name| name.eq_ignore_ascii_case(&key)) {
                    continue;
                }
                if !condition_holds(property.condition(), &properties) {
                    continue;
                }
                properties.insert(key, (property.name().to_string(), property.value()));
            }
        }

        Self {
            properties,
            document: Some(document.id()),
            revision: document.revision(),
        }
    }

    /// Property value; names are case-insensitive
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .get(&name.to_ascii_lowercase())
            .map(|(_, value)| value.as_str())
    }

    /// All `(name, value)` pairs, in no particular order
    pub fn properties(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.properties
            .values()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Whether this evaluation reflects the document's current revision
    pub fn is_current(&self, document: &ProjectDocument) -> bool {
        self.document == Some(document.id()) && self.revision == document.revision()
    }
}

fn condition_holds(condition: Option<&str>, properties: &HashMap<String, (String, String)>) -> bool {
    let Some(text) = condition.filter(|text| !text.trim().is_empty()) else {
        return true;
    };
    match ConditionSet::parse(text) {
        Ok(conditions) => conditions.pairs().all(|(name, expected)| {
            let actual = properties
                .get(&name.to_ascii_lowercase())
                .map(|(_, value)| value.as_str())
                .unwrap_or_default();
            actual.eq_ignore_ascii_case(expected)
        }),
        Err(e) => {
            debug!(condition = text, error = %e, "condition not evaluated");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<Project>
  <PropertyGroup>
    <Configuration Condition=" '$(Configuration)' == '' ">Debug</Configuration>
    <AssemblyName>Sample</AssemblyName>
  </PropertyGroup>
  <PropertyGroup Condition=" '$(Configuration)|$(Platform)' == 'Debug|AnyCPU' ">
    <OutputPath>bin\Debug\</OutputPath>
  </PropertyGroup>
  <PropertyGroup Condition=" '$(Configuration)|$(Platform)' == 'Release|AnyCPU' ">
    <OutputPath>bin\Release\</OutputPath>
  </PropertyGroup>
  <PropertyGroup Condition="Exists('local.props')">
    <AssemblyName>Local</AssemblyName>
  </PropertyGroup>
</Project>"#;

    fn globals(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_configuration_applies() {
        let document = ProjectDocument::parse(SAMPLE).unwrap();
        let evaluation = Evaluation::evaluate(&document, &globals(&[("Platform", "AnyCPU")]));

        assert_eq!(evaluation.property("Configuration"), Some("Debug"));
        assert_eq!(evaluation.property("outputpath"), Some("bin\\Debug\\"));
        assert_eq!(evaluation.property("AssemblyName"), Some("Sample"));
    }

    #[test]
    fn test_globals_win() {
        let document = ProjectDocument::parse(SAMPLE).unwrap();
        let evaluation = Evaluation::evaluate(
            &document,
            &globals(&[("Configuration", "Release"), ("Platform", "AnyCPU")]),
        );

        assert_eq!(evaluation.property("Configuration"), Some("Release"));
        assert_eq!(evaluation.property("OutputPath"), Some("bin\\Release\\"));
    }

    #[test]
    fn test_staleness_tracks_revision() {
        let mut document = ProjectDocument::parse(SAMPLE).unwrap();
        let evaluation = Evaluation::evaluate(&document, &BTreeMap::new());
        assert!(evaluation.is_current(&document));

        let group = document.add_property_group().unwrap();
        document.set_property(group, "Extra", "1").unwrap();
        assert!(!evaluation.is_current(&document));
        assert!(!evaluation.is_current(&document.deep_clone()));
    }
}
