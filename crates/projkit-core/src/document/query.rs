//! Finding and creating structural nodes
//!
//! All lookups walk the document in order and are lazy; the plural
//! `find_*s` forms return iterators, the singular forms the first match.

use crate::condition::{ConditionError, ConditionSet};

use super::error::DocumentError;
use super::nodes::{
    Import, Item, ItemGroup, Property, PropertyGroup, CONDITION_ATTRIBUTE, IMPORT,
    INCLUDE_ATTRIBUTE, ITEM_GROUP, PROJECT_ATTRIBUTE, PROPERTY_GROUP,
};
use super::project_document::ProjectDocument;
use super::tree::ElementRef;

/// Condition variable that names the build configuration
pub const CONFIGURATION: &str = "Configuration";

/// Result of walking conditional property groups
pub type ConditionalGroup<'a> = Result<(ConditionSet, PropertyGroup<'a>), ConditionError>;

/// Result of walking configuration property groups
pub type ConfigurationGroup<'a> = Result<(String, PropertyGroup<'a>), ConditionError>;

impl ProjectDocument {
    // ----- property groups -----

    /// Every property group, at any depth
    pub fn property_groups(&self) -> impl Iterator<Item = PropertyGroup<'_>> + '_ {
        self.elements().filter_map(PropertyGroup::from_element)
    }

    /// Property groups matching `predicate`
    pub fn find_property_groups<'a, F>(
        &'a self,
        predicate: F,
    ) -> impl Iterator<Item = PropertyGroup<'a>> + 'a
    where
        F: Fn(&PropertyGroup<'a>) -> bool + 'a,
    {
        self.property_groups().filter(move |group| predicate(group))
    }

    /// First property group matching `predicate`
    pub fn find_property_group<'a, F>(&'a self, predicate: F) -> Option<PropertyGroup<'a>>
    where
        F: Fn(&PropertyGroup<'a>) -> bool + 'a,
    {
        self.find_property_groups(predicate).next()
    }

    /// Properties across all groups matching `predicate`
    pub fn find_properties<'a, F>(&'a self, predicate: F) -> impl Iterator<Item = Property<'a>> + 'a
    where
        F: Fn(&Property<'a>) -> bool + 'a,
    {
        self.property_groups()
            .flat_map(|group| group.properties())
            .filter(move |property| predicate(property))
    }

    /// First property matching `predicate`
    pub fn find_property<'a, F>(&'a self, predicate: F) -> Option<Property<'a>>
    where
        F: Fn(&Property<'a>) -> bool + 'a,
    {
        self.find_properties(predicate).next()
    }

    // ----- item groups -----

    /// Every item group, at any depth
    pub fn item_groups(&self) -> impl Iterator<Item = ItemGroup<'_>> + '_ {
        self.elements().filter_map(ItemGroup::from_element)
    }

    /// Item groups matching `predicate`
    pub fn find_item_groups<'a, F>(&'a self, predicate: F) -> impl Iterator<Item = ItemGroup<'a>> + 'a
    where
        F: Fn(&ItemGroup<'a>) -> bool + 'a,
    {
        self.item_groups().filter(move |group| predicate(group))
    }

    /// First item group matching `predicate`
    pub fn find_item_group<'a, F>(&'a self, predicate: F) -> Option<ItemGroup<'a>>
    where
        F: Fn(&ItemGroup<'a>) -> bool + 'a,
    {
        self.find_item_groups(predicate).next()
    }

    /// Items across all groups matching `predicate`
    pub fn find_items<'a, F>(&'a self, predicate: F) -> impl Iterator<Item = Item<'a>> + 'a
    where
        F: Fn(&Item<'a>) -> bool + 'a,
    {
        self.item_groups()
            .flat_map(|group| group.items())
            .filter(move |item| predicate(item))
    }

    /// First item matching `predicate`
    pub fn find_item<'a, F>(&'a self, predicate: F) -> Option<Item<'a>>
    where
        F: Fn(&Item<'a>) -> bool + 'a,
    {
        self.find_items(predicate).next()
    }

    // ----- imports -----

    /// Every import, at any depth
    pub fn imports(&self) -> impl Iterator<Item = Import<'_>> + '_ {
        self.elements().filter_map(Import::from_element)
    }

    /// Imports matching `predicate`
    pub fn find_imports<'a, F>(&'a self, predicate: F) -> impl Iterator<Item = Import<'a>> + 'a
    where
        F: Fn(&Import<'a>) -> bool + 'a,
    {
        self.imports().filter(move |import| predicate(import))
    }

    /// First import matching `predicate`
    pub fn find_import<'a, F>(&'a self, predicate: F) -> Option<Import<'a>>
    where
        F: Fn(&Import<'a>) -> bool + 'a,
    {
        self.find_imports(predicate).next()
    }

    // ----- conditional groups -----

    /// Property groups with a non-empty condition, parsed
    ///
    /// Groups whose parsed set fails `filter` are skipped. Malformed
    /// condition text is yielded as an error rather than skipped.
    pub fn conditional_property_groups<'a, F>(
        &'a self,
        filter: F,
    ) -> impl Iterator<Item = ConditionalGroup<'a>> + 'a
    where
        F: Fn(&ConditionSet) -> bool + 'a,
    {
        self.property_groups().filter_map(move |group| {
            let text = group.condition().filter(|text| !text.trim().is_empty())?;
            match ConditionSet::parse(text) {
                Ok(conditions) => filter(&conditions).then_some(Ok((conditions, group))),
                Err(e) => Some(Err(e)),
            }
        })
    }

    /// Property groups conditioned on `Configuration`, with its value
    pub fn configuration_property_groups<'a, F>(
        &'a self,
        filter: F,
    ) -> impl Iterator<Item = ConfigurationGroup<'a>> + 'a
    where
        F: Fn(&str) -> bool + 'a,
    {
        self.conditional_property_groups(|conditions| conditions.contains_key(CONFIGURATION))
            .filter_map(move |entry| match entry {
                Ok((conditions, group)) => {
                    let configuration = conditions.get(CONFIGURATION)?.to_string();
                    filter(&configuration).then_some(Ok((configuration, group)))
                }
                Err(e) => Some(Err(e)),
            })
    }

    /// First property group whose condition equals `conditions`, order
    /// included
    pub fn find_conditional_property_group(
        &self,
        conditions: &ConditionSet,
    ) -> Result<Option<PropertyGroup<'_>>, ConditionError> {
        for entry in self.conditional_property_groups(|_| true) {
            let (candidate, group) = entry?;
            if &candidate == conditions {
                return Ok(Some(group));
            }
        }
        Ok(None)
    }

    // ----- creation -----

    /// Insert an empty property group as the previous sibling of `anchor`.
    ///
    /// The anchor must be attached and must not be the root.
    pub fn create_property_group_before(
        &mut self,
        anchor: ElementRef,
    ) -> Result<ElementRef, DocumentError> {
        self.insert_element(anchor, PROPERTY_GROUP, false)
    }

    /// Insert an empty property group right after `anchor`
    pub fn create_property_group_after(
        &mut self,
        anchor: ElementRef,
    ) -> Result<ElementRef, DocumentError> {
        self.insert_element(anchor, PROPERTY_GROUP, true)
    }

    /// Insert an empty item group right before `anchor`
    pub fn create_item_group_before(
        &mut self,
        anchor: ElementRef,
    ) -> Result<ElementRef, DocumentError> {
        self.insert_element(anchor, ITEM_GROUP, false)
    }

    /// Insert an empty item group right after `anchor`
    pub fn create_item_group_after(
        &mut self,
        anchor: ElementRef,
    ) -> Result<ElementRef, DocumentError> {
        self.insert_element(anchor, ITEM_GROUP, true)
    }

    /// Append an empty property group at the end of the project
    pub fn add_property_group(&mut self) -> Result<ElementRef, DocumentError> {
        let root = self.root().element_ref();
        self.append_element(root, PROPERTY_GROUP)
    }

    /// Append an empty item group at the end of the project
    pub fn add_item_group(&mut self) -> Result<ElementRef, DocumentError> {
        let root = self.root().element_ref();
        self.append_element(root, ITEM_GROUP)
    }

    /// Append an `<Import Project="..."/>` at the end of the project
    pub fn add_import(&mut self, project: &str) -> Result<ElementRef, DocumentError> {
        let root = self.root().element_ref();
        let import = self.append_element(root, IMPORT)?;
        self.set_attribute(import, PROJECT_ATTRIBUTE, project)?;
        Ok(import)
    }

    // ----- editing -----

    /// Set or clear the `Condition` attribute of any element
    pub fn set_condition(
        &mut self,
        element: ElementRef,
        conditions: Option<&ConditionSet>,
    ) -> Result<(), DocumentError> {
        match conditions {
            Some(conditions) => self.set_attribute(element, CONDITION_ATTRIBUTE, conditions.text()),
            None => self.remove_attribute(element, CONDITION_ATTRIBUTE).map(|_| ()),
        }
    }

    /// Update the first property named `name` in the group, or append one
    pub fn set_property(
        &mut self,
        group: ElementRef,
        name: &str,
        value: &str,
    ) -> Result<ElementRef, DocumentError> {
        self.expect_kind(group, PROPERTY_GROUP)?;
        let existing = self
            .element(group)?
            .children()
            .find(|child| child.name() == name)
            .map(|child| child.element_ref());

        let property = match existing {
            Some(property) => property,
            None => self.append_element(group, name)?,
        };
        self.set_text(property, value)?;
        Ok(property)
    }

    /// Append an item of the given kind to an item group
    pub fn add_item(
        &mut self,
        group: ElementRef,
        kind: &str,
        include: &str,
    ) -> Result<ElementRef, DocumentError> {
        self.expect_kind(group, ITEM_GROUP)?;
        let item = self.append_element(group, kind)?;
        self.set_attribute(item, INCLUDE_ATTRIBUTE, include)?;
        Ok(item)
    }

    /// Replace an item's `Include` attribute
    pub fn set_item_include(
        &mut self,
        item: ElementRef,
        include: &str,
    ) -> Result<(), DocumentError> {
        self.set_attribute(item, INCLUDE_ATTRIBUTE, include)
    }

    /// Set item metadata in child-element form
    pub fn set_metadata(
        &mut self,
        item: ElementRef,
        name: &str,
        value: &str,
    ) -> Result<ElementRef, DocumentError> {
        let existing = self
            .element(item)?
            .children()
            .find(|child| child.name() == name)
            .map(|child| child.element_ref());

        let metadata = match existing {
            Some(metadata) => metadata,
            None => self.append_element(item, name)?,
        };
        self.set_text(metadata, value)?;
        Ok(metadata)
    }

    fn expect_kind(&self, element: ElementRef, expected: &str) -> Result<(), DocumentError> {
        let found = self.element(element)?.name();
        if found != expected {
            return Err(DocumentError::WrongKind {
                expected: expected.to_string(),
                found: found.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"<Project>
  <PropertyGroup>
    <Configuration Condition=" '$(Configuration)' == '' ">Debug</Configuration>
    <ProjectGuid>{6F1C2B43-8A1E-4C52-9E3B-1D2A3B4C5D6E}</ProjectGuid>
  </PropertyGroup>
  <PropertyGroup Condition=" '$(Configuration)|$(Platform)' == 'Debug|AnyCPU' ">
    <DebugSymbols>true</DebugSymbols>
  </PropertyGroup>
  <PropertyGroup Condition=" '$(Configuration)|$(Platform)' == 'Release|AnyCPU' ">
    <Optimize>true</Optimize>
  </PropertyGroup>
  <PropertyGroup Condition=" '$(Platform)' == 'x86' ">
    <PlatformTarget>x86</PlatformTarget>
  </PropertyGroup>
  <ItemGroup>
    <Reference Include="System" />
    <Compile Include="Program.cs" />
  </ItemGroup>
  <Import Project="$(MSBuildToolsPath)\Microsoft.CSharp.targets" />
</Project>"#;

    fn sample() -> ProjectDocument {
        ProjectDocument::parse(SAMPLE).unwrap()
    }

    #[test]
    fn test_find_first_and_all() {
        let document = sample();

        let conditioned: Vec<_> = document
            .find_property_groups(|group| group.condition().is_some())
            .collect();
        assert_eq!(conditioned.len(), 3);

        let guid = document
            .find_property(|property| property.name() == "ProjectGuid")
            .unwrap();
        assert_eq!(guid.value(), "{6F1C2B43-8A1E-4C52-9E3B-1D2A3B4C5D6E}");
        assert!(guid.group().unwrap().condition().is_none());

        let kinds: Vec<&str> = document.find_items(|_| true).map(|item| item.kind()).collect();
        assert_eq!(kinds, vec!["Reference", "Compile"]);

        let import = document
            .find_import(|import| import.project().is_some_and(|p| p.ends_with(".targets")))
            .unwrap();
        assert!(import.condition().is_none());
        assert!(document.find_item_group(|group| group.label().is_some()).is_none());
    }

    #[test]
    fn test_conditional_property_groups() {
        let document = sample();
        let parsed: Vec<(ConditionSet, PropertyGroup<'_>)> = document
            .conditional_property_groups(|_| true)
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0].0.get("Configuration"), Some("Debug"));
        assert_eq!(parsed[2].0.get("Platform"), Some("x86"));

        let release: Vec<_> = document
            .conditional_property_groups(|set| set.get("Configuration") == Some("Release"))
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(release.len(), 1);
        assert!(release[0].1.property("Optimize").is_some());
    }

    #[test]
    fn test_configuration_property_groups() {
        let document = sample();
        let configurations: Vec<String> = document
            .configuration_property_groups(|_| true)
            .map(|entry| entry.map(|(configuration, _)| configuration))
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(configurations, vec!["Debug", "Release"]);

        let debug_only = document
            .configuration_property_groups(|configuration| configuration == "Debug")
            .count();
        assert_eq!(debug_only, 1);
    }

    #[test]
    fn test_malformed_condition_propagates() {
        let document = ProjectDocument::parse(
            r#"<Project><PropertyGroup Condition="Exists('local.props')" /></Project>"#,
        )
        .unwrap();
        let results: Vec<_> = document.conditional_property_groups(|_| true).collect();
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(ConditionError::InvalidConditionText(_))));
    }

    #[test]
    fn test_find_conditional_property_group_is_order_sensitive() {
        let document = sample();
        let wanted = ConditionSet::from_pairs([("Configuration", "Release"), ("Platform", "AnyCPU")])
            .unwrap();
        let swapped = ConditionSet::from_pairs([("Platform", "AnyCPU"), ("Configuration", "Release")])
            .unwrap();

        assert!(document.find_conditional_property_group(&wanted).unwrap().is_some());
        assert!(document.find_conditional_property_group(&swapped).unwrap().is_none());
    }

    #[test]
    fn test_create_groups_around_anchor() {
        let mut document = sample();
        let anchor = document
            .find_item_group(|_| true)
            .map(|group| group.element_ref())
            .unwrap();

        let before = document.create_property_group_before(anchor).unwrap();
        let after = document.create_item_group_after(anchor).unwrap();

        let order: Vec<_> = document.root().children().map(|child| child.element_ref()).collect();
        let anchor_position = order.iter().position(|&r| r == anchor).unwrap();
        assert_eq!(order[anchor_position - 1], before);
        assert_eq!(order[anchor_position + 1], after);
        assert_eq!(document.element(before).unwrap().name(), "PropertyGroup");
        assert_eq!(document.element(after).unwrap().name(), "ItemGroup");
    }

    #[test]
    fn test_create_rejects_foreign_anchor() {
        let mut document = sample();
        let other = sample();
        let foreign = other.find_property_group(|_| true).unwrap().element_ref();

        let err = document.create_item_group_before(foreign).unwrap_err();
        assert!(matches!(err, DocumentError::ForeignNode));
        assert_eq!(err.to_string(), "child of current project required");
    }

    #[test]
    fn test_set_property_and_items() {
        let mut document = ProjectDocument::new();
        let group = document.add_property_group().unwrap();
        document.set_property(group, "OutputType", "Exe").unwrap();
        document.set_property(group, "OutputType", "Library").unwrap();

        let group_view = document.find_property_group(|_| true).unwrap();
        assert_eq!(group_view.properties().count(), 1);
        assert_eq!(group_view.property("OutputType").unwrap().value(), "Library");

        let items = document.add_item_group().unwrap();
        let item = document.add_item(items, "Compile", "Foo.cs").unwrap();
        document.set_metadata(item, "Link", "Foo.cs").unwrap();
        document.set_metadata(item, "Link", "Bar.cs").unwrap();

        let view = document.find_item(|item| item.kind() == "Compile").unwrap();
        assert_eq!(view.include(), Some("Foo.cs"));
        assert_eq!(view.metadata("Link").as_deref(), Some("Bar.cs"));

        let err = document.add_item(group, "Compile", "x.cs").unwrap_err();
        assert!(matches!(err, DocumentError::WrongKind { .. }));
    }

    #[test]
    fn test_set_condition() {
        let mut document = ProjectDocument::new();
        let group = document.add_property_group().unwrap();
        let conditions = ConditionSet::from_pairs([("Configuration", "Debug")]).unwrap();

        document.set_condition(group, Some(&conditions)).unwrap();
        assert_eq!(
            document.element(group).unwrap().attribute("Condition"),
            Some(" '$(Configuration)' == 'Debug' ")
        );

        document.set_condition(group, None).unwrap();
        assert_eq!(document.element(group).unwrap().attribute("Condition"), None);
    }
}
