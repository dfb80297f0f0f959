//! Project struct and management functions

use chrono::{DateTime, Utc};
use std::path::Path;
use std::rc::Rc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::conventions::ProjectConventions;
use super::error::ProjectError;
use super::paths::{include_file_name, project_directory, rebase_include};
use crate::condition::ConditionSet;
use crate::document::{
    ElementRef, Evaluation, Import, ItemGroup, ProjectDocument, PropertyGroup, CONDITION_ATTRIBUTE,
};

/// A loaded project
///
/// Wraps the editable document together with its evaluated view and the
/// distinguished groups found when it was loaded. Those references are
/// discovered once; later edits do not move them.
#[derive(Debug)]
pub struct Project {
    document: ProjectDocument,
    evaluation: Evaluation,
    conventions: Rc<ProjectConventions>,

    /// Property group holding the identifier property
    default_property_group: Option<ElementRef>,

    /// Item group holding the baseline reference
    default_item_group: Option<ElementRef>,

    /// The standard build-tools `<Import>`
    build_tools_import: Option<ElementRef>,

    loaded_at: DateTime<Utc>,
    last_saved: Option<DateTime<Utc>>,
    disposed: bool,
}

impl Project {
    /// Load a project file
    pub fn load<P: AsRef<Path>>(
        path: P,
        conventions: Rc<ProjectConventions>,
    ) -> Result<Self, ProjectError> {
        let document = ProjectDocument::load(path)?;
        Ok(Self::from_document(document, conventions))
    }

    /// Wrap an already parsed document
    pub fn from_document(document: ProjectDocument, conventions: Rc<ProjectConventions>) -> Self {
        let evaluation = Evaluation::evaluate(&document, &conventions.global_properties);
        let mut project = Project {
            document,
            evaluation,
            conventions,
            default_property_group: None,
            default_item_group: None,
            build_tools_import: None,
            loaded_at: Utc::now(),
            last_saved: None,
            disposed: false,
        };
        project.discover();
        project
    }

    /// Create a new, unsaved project skeleton
    ///
    /// Contains a default property group (global property defaults and a
    /// fresh GUID), a default item group with the baseline reference, and
    /// the build-tools import.
    pub fn create(conventions: Rc<ProjectConventions>) -> Result<Self, ProjectError> {
        let mut document = ProjectDocument::new();

        let properties = document.add_property_group()?;
        for (name, value) in &conventions.global_properties {
            let property = document.set_property(properties, name, value)?;
            let unset = ConditionSet::from_pairs([(name.as_str(), "")])?;
            document.set_attribute(property, CONDITION_ATTRIBUTE, unset.text())?;
        }
        let guid = Uuid::new_v4().braced().to_string().to_uppercase();
        document.set_property(properties, &conventions.identifier_property, &guid)?;

        let items = document.add_item_group()?;
        document.add_item(
            items,
            &conventions.reference_item,
            &conventions.baseline_reference,
        )?;

        document.add_import(&format!(
            "$(MSBuildToolsPath)\\{}",
            conventions.build_tools_import
        ))?;

        Ok(Self::from_document(document, conventions))
    }

    /// Find the distinguished groups and import
    fn discover(&mut self) {
        let conventions = Rc::clone(&self.conventions);

        let identifier = conventions.identifier_property.clone();
        self.default_property_group = self
            .document
            .find_property_group(move |group| group.property(&identifier).is_some())
            .map(|group| group.element_ref());

        let reference_item = conventions.reference_item.clone();
        let baseline = conventions.baseline_reference.clone();
        self.default_item_group = self
            .document
            .find_item_group(move |group| {
                group.items().any(|item| {
                    item.kind() == reference_item
                        && item
                            .include()
                            .is_some_and(|include| is_reference_to(include, &baseline))
                })
            })
            .map(|group| group.element_ref());

        let import_conventions = Rc::clone(&conventions);
        self.build_tools_import = self
            .document
            .find_import(move |import| {
                import
                    .project()
                    .is_some_and(|project| import_conventions.is_build_tools_import(project))
            })
            .map(|import| import.element_ref());

        if self.default_property_group.is_none() {
            warn!(
                path = ?self.document.path(),
                property = %conventions.identifier_property,
                "no default property group"
            );
        }
        if self.default_item_group.is_none() {
            warn!(
                path = ?self.document.path(),
                reference = %conventions.baseline_reference,
                "no default item group"
            );
        }

        debug!(
            path = ?self.document.path(),
            default_property_group = self.default_property_group.is_some(),
            default_item_group = self.default_item_group.is_some(),
            build_tools_import = self.build_tools_import.is_some(),
            "indexed project"
        );
    }

    /// Project file path, if the project has one
    pub fn path(&self) -> Option<&Path> {
        self.document.path()
    }

    /// Directory containing the project file
    pub fn directory(&self) -> Option<String> {
        self.path().map(project_directory)
    }

    /// GUID from the identifier property of the default property group
    pub fn guid(&self) -> Option<Uuid> {
        let value = self
            .default_property_group()?
            .property(&self.conventions.identifier_property)?
            .value();
        Uuid::parse_str(value.trim()).ok()
    }

    /// The underlying document
    pub fn document(&self) -> &ProjectDocument {
        &self.document
    }

    /// Mutable access to the document; edits mark the evaluation stale
    pub fn document_mut(&mut self) -> &mut ProjectDocument {
        &mut self.document
    }

    /// Conventions the distinguished groups were found with
    pub fn conventions(&self) -> &ProjectConventions {
        &self.conventions
    }

    /// First property group that declares the identifier property
    pub fn default_property_group(&self) -> Option<PropertyGroup<'_>> {
        let element = self.document.element(self.default_property_group?).ok()?;
        PropertyGroup::from_element(element)
    }

    /// First item group that references the baseline assembly
    pub fn default_item_group(&self) -> Option<ItemGroup<'_>> {
        let element = self.document.element(self.default_item_group?).ok()?;
        ItemGroup::from_element(element)
    }

    /// The import of the language build targets
    pub fn build_tools_import(&self) -> Option<Import<'_>> {
        let element = self.document.element(self.build_tools_import?).ok()?;
        Import::from_element(element)
    }

    /// Ref form of [`Project::default_property_group`]
    pub fn default_property_group_ref(&self) -> Option<ElementRef> {
        self.default_property_group
    }

    /// Ref form of [`Project::default_item_group`]
    pub fn default_item_group_ref(&self) -> Option<ElementRef> {
        self.default_item_group
    }

    /// Ref form of [`Project::build_tools_import`]
    pub fn build_tools_import_ref(&self) -> Option<ElementRef> {
        self.build_tools_import
    }

    /// The evaluated view as of the last evaluation
    pub fn evaluation(&self) -> &Evaluation {
        &self.evaluation
    }

    /// Evaluated value of a property, re-evaluating first if needed
    pub fn evaluated_property(&mut self, name: &str) -> Option<&str> {
        self.reevaluate_if_necessary();
        self.evaluation.property(name)
    }

    /// Recompute the evaluated view if the document changed since the
    /// last evaluation. Returns whether anything was recomputed.
    pub fn reevaluate_if_necessary(&mut self) -> bool {
        if self.evaluation.is_current(&self.document) {
            return false;
        }
        self.evaluation =
            Evaluation::evaluate(&self.document, &self.conventions.global_properties);
        true
    }

    /// Find the property group guarded by exactly `conditions`, creating it
    /// if needed
    ///
    /// New groups go after the last group conditioned on the same names, or
    /// after the default property group, or at the end of the project.
    pub fn conditional_property_group(
        &mut self,
        conditions: &ConditionSet,
    ) -> Result<ElementRef, ProjectError> {
        self.ensure_live()?;
        if let Some(group) = self.document.find_conditional_property_group(conditions)? {
            return Ok(group.element_ref());
        }

        let mut anchor = None;
        for entry in self.document.conditional_property_groups(|_| true) {
            let (candidate, group) = entry?;
            if candidate.names(false) == conditions.names(false) {
                anchor = Some(group.element_ref());
            }
        }
        let anchor = anchor.or_else(|| {
            self.default_property_group
                .filter(|&group| self.document.element(group).is_ok())
        });

        let group = match anchor {
            Some(anchor) => self.document.create_property_group_after(anchor)?,
            None => self.document.add_property_group()?,
        };
        self.document.set_condition(group, Some(conditions))?;
        debug!(condition = conditions.text(), "created conditional property group");
        Ok(group)
    }

    /// Rewrite compiled-source includes, written relative to `from_dir`, so
    /// they resolve to the same files from this project's directory
    ///
    /// Items without display-link metadata get one set to the file name.
    /// Includes starting with a property reference cannot be resolved
    /// without evaluation and are left alone. Returns the number of items
    /// rewritten.
    pub(crate) fn rebase_source_items(&mut self, from_dir: &str) -> Result<usize, ProjectError> {
        let to_dir = self.directory().ok_or_else(|| {
            ProjectError::InvalidArgument("project has no file path".to_string())
        })?;
        let source_item = self.conventions.source_item.clone();
        let link = self.conventions.link_metadata.clone();

        let items: Vec<(ElementRef, String, bool)> = self
            .document
            .find_items(move |item| item.kind() == source_item)
            .filter_map(|item| {
                let include = item.include()?.to_string();
                Some((item.element_ref(), include, item.metadata(&link).is_some()))
            })
            .collect();

        let mut rewritten = 0;
        for (item, include, has_link) in items {
            if include.trim_start().starts_with("$(") {
                debug!(include = %include, "include uses a property; not rebased");
                continue;
            }

            let parts: Vec<&str> = include.split(';').filter(|p| !p.trim().is_empty()).collect();
            let rebased = parts
                .iter()
                .map(|part| rebase_include(part.trim(), from_dir, &to_dir))
                .collect::<Vec<_>>()
                .join(";");
            debug!(from = %include, to = %rebased, "rebased include");
            self.document.set_item_include(item, &rebased)?;

            if !has_link && parts.len() == 1 {
                if let Some(file_name) = include_file_name(parts[0].trim()) {
                    self.document.set_metadata(item, &link, file_name)?;
                }
            }
            rewritten += 1;
        }
        Ok(rewritten)
    }

    /// Save to the project's own path
    pub fn save(&mut self) -> Result<(), ProjectError> {
        self.ensure_live()?;
        self.reevaluate_if_necessary();
        self.document.save()?;
        self.last_saved = Some(Utc::now());
        info!(path = ?self.document.path(), "saved project");
        Ok(())
    }

    /// Write the project to another path
    ///
    /// The project keeps its own path, so registry lookups are unaffected.
    pub fn save_as<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ProjectError> {
        self.ensure_live()?;
        self.reevaluate_if_necessary();
        let path = path.as_ref();
        self.document.write_to(path)?;
        self.last_saved = Some(Utc::now());
        info!(path = %path.display(), "saved project copy");
        Ok(())
    }

    /// Release the document. Returns `false` if already released.
    pub fn dispose(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        self.disposed = true;

        let mut released = ProjectDocument::new();
        if let Some(path) = self.document.path() {
            released.set_path(path.to_path_buf());
        }
        self.document = released;
        self.evaluation = Evaluation::default();
        self.default_property_group = None;
        self.default_item_group = None;
        self.build_tools_import = None;
        debug!(path = ?self.document.path(), "released project document");
        true
    }

    /// Whether the project was unloaded
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// When this instance was constructed
    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// When this instance was last saved, if ever
    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.last_saved
    }

    pub(crate) fn ensure_live(&self) -> Result<(), ProjectError> {
        if self.disposed {
            Err(ProjectError::Disposed)
        } else {
            Ok(())
        }
    }
}

/// Whether a reference include names `assembly`, ignoring strong-name parts
/// (`System, Version=4.0.0.0, ...`)
fn is_reference_to(include: &str, assembly: &str) -> bool {
    include
        .split(',')
        .next()
        .is_some_and(|name| name.trim().eq_ignore_ascii_case(assembly))
}
