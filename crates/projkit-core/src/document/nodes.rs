//! Typed views over the structural elements of a project

use super::project_document::Element;
use super::tree::ElementRef;

/// Element name of a property group
pub const PROPERTY_GROUP: &str = "PropertyGroup";
/// Element name of an item group
pub const ITEM_GROUP: &str = "ItemGroup";
/// Element name of an import
pub const IMPORT: &str = "Import";

/// Attribute holding a group, property or item condition
pub const CONDITION_ATTRIBUTE: &str = "Condition";
/// Free-form group label, e.g. `Globals`
pub const LABEL_ATTRIBUTE: &str = "Label";
/// Attribute naming the file or assembly an item refers to
pub const INCLUDE_ATTRIBUTE: &str = "Include";
/// Attribute naming the project file an import pulls in
pub const PROJECT_ATTRIBUTE: &str = "Project";

/// `<PropertyGroup>`
#[derive(Debug, Clone, Copy)]
pub struct PropertyGroup<'a> {
    element: Element<'a>,
}

impl<'a> PropertyGroup<'a> {
    pub(crate) fn from_element(element: Element<'a>) -> Option<Self> {
        (element.name() == PROPERTY_GROUP).then_some(Self { element })
    }

    /// The underlying element
    pub fn element(&self) -> Element<'a> {
        self.element
    }

    /// Address of the group, for edits
    pub fn element_ref(&self) -> ElementRef {
        self.element.element_ref()
    }

    /// Raw `Condition` attribute text
    pub fn condition(&self) -> Option<&'a str> {
        self.element.attribute(CONDITION_ATTRIBUTE)
    }

    /// Raw `Label` attribute text
    pub fn label(&self) -> Option<&'a str> {
        self.element.attribute(LABEL_ATTRIBUTE)
    }

    /// Properties in this group, in order
    pub fn properties(&self) -> impl Iterator<Item = Property<'a>> + 'a {
        self.element
            .children()
            .map(|element| Property { element })
    }

    /// First property with the given name
    pub fn property(&self, name: &str) -> Option<Property<'a>> {
        self.properties().find(|p| p.name() == name)
    }
}

/// A single property: `<Name>value</Name>` inside a property group
#[derive(Debug, Clone, Copy)]
pub struct Property<'a> {
    element: Element<'a>,
}

impl<'a> Property<'a> {
    /// Address of the property, for edits
    pub fn element_ref(&self) -> ElementRef {
        self.element.element_ref()
    }

    /// Property name, i.e. the element name
    pub fn name(&self) -> &'a str {
        self.element.name()
    }

    /// Unevaluated value text
    pub fn value(&self) -> String {
        self.element.text()
    }

    /// Raw `Condition` attribute text
    pub fn condition(&self) -> Option<&'a str> {
        self.element.attribute(CONDITION_ATTRIBUTE)
    }

    /// The enclosing property group, if the parent is one
    pub fn group(&self) -> Option<PropertyGroup<'a>> {
        self.element.parent().and_then(PropertyGroup::from_element)
    }
}

/// `<ItemGroup>`
#[derive(Debug, Clone, Copy)]
pub struct ItemGroup<'a> {
    element: Element<'a>,
}

impl<'a> ItemGroup<'a> {
    pub(crate) fn from_element(element: Element<'a>) -> Option<Self> {
        (element.name() == ITEM_GROUP).then_some(Self { element })
    }

    /// The underlying element
    pub fn element(&self) -> Element<'a> {
        self.element
    }

    /// Address of the group, for edits
    pub fn element_ref(&self) -> ElementRef {
        self.element.element_ref()
    }

    /// Raw `Condition` attribute text
    pub fn condition(&self) -> Option<&'a str> {
        self.element.attribute(CONDITION_ATTRIBUTE)
    }

    /// Raw `Label` attribute text
    pub fn label(&self) -> Option<&'a str> {
        self.element.attribute(LABEL_ATTRIBUTE)
    }

    /// Items in this group, in order
    pub fn items(&self) -> impl Iterator<Item = Item<'a>> + 'a {
        self.element.children().map(|element| Item { element })
    }
}

/// An item such as `<Compile Include="Foo.cs" />`
#[derive(Debug, Clone, Copy)]
pub struct Item<'a> {
    element: Element<'a>,
}

impl<'a> Item<'a> {
    /// Address of the item, for edits
    pub fn element_ref(&self) -> ElementRef {
        self.element.element_ref()
    }

    /// Item type, i.e. the element name (`Compile`, `Reference`, ...)
    pub fn kind(&self) -> &'a str {
        self.element.name()
    }

    /// Raw `Include` attribute text
    pub fn include(&self) -> Option<&'a str> {
        self.element.attribute(INCLUDE_ATTRIBUTE)
    }

    /// Raw `Condition` attribute text
    pub fn condition(&self) -> Option<&'a str> {
        self.element.attribute(CONDITION_ATTRIBUTE)
    }

    /// Metadata value, from a child element or, failing that, an attribute
    pub fn metadata(&self, name: &str) -> Option<String> {
        self.metadata_element(name)
            .map(|element| element.text())
            .or_else(|| self.element.attribute(name).map(str::to_string))
    }

    pub(crate) fn metadata_element(&self, name: &str) -> Option<Element<'a>> {
        self.element.children().find(|child| child.name() == name)
    }

    /// The enclosing item group, if the parent is one
    pub fn group(&self) -> Option<ItemGroup<'a>> {
        self.element.parent().and_then(ItemGroup::from_element)
    }
}

/// `<Import Project="..." />`
#[derive(Debug, Clone, Copy)]
pub struct Import<'a> {
    element: Element<'a>,
}

impl<'a> Import<'a> {
    pub(crate) fn from_element(element: Element<'a>) -> Option<Self> {
        (element.name() == IMPORT).then_some(Self { element })
    }

    /// Address of the import, for edits
    pub fn element_ref(&self) -> ElementRef {
        self.element.element_ref()
    }

    /// The imported project path, unevaluated
    pub fn project(&self) -> Option<&'a str> {
        self.element.attribute(PROJECT_ATTRIBUTE)
    }

    /// Raw `Condition` attribute text
    pub fn condition(&self) -> Option<&'a str> {
        self.element.attribute(CONDITION_ATTRIBUTE)
    }
}
