//! Tests for project document loading, editing and evaluation

use pretty_assertions::assert_eq;
use projkit_core::condition::ConditionSet;
use projkit_core::document::{DocumentError, Evaluation, ProjectDocument};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const LIBRARY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Project ToolsVersion="4.0" DefaultTargets="Build" xmlns="http://schemas.microsoft.com/developer/msbuild/2003">
  <PropertyGroup>
    <Configuration Condition=" '$(Configuration)' == '' ">Debug</Configuration>
    <ProjectGuid>{0A1B2C3D-4E5F-6789-ABCD-EF0123456789}</ProjectGuid>
    <OutputType>Library</OutputType>
    <OutputPath>bin\Default\</OutputPath>
  </PropertyGroup>
  <PropertyGroup Condition=" '$(Configuration)|$(Platform)' == 'Debug|AnyCPU' ">
    <OutputPath>bin\Debug\</OutputPath>
    <DefineConstants>DEBUG;TRACE</DefineConstants>
  </PropertyGroup>
  <PropertyGroup Condition=" '$(Configuration)|$(Platform)' == 'Release|AnyCPU' ">
    <OutputPath>bin\Release\</OutputPath>
    <Optimize>true</Optimize>
  </PropertyGroup>
  <PropertyGroup Condition="Exists('local.props')">
    <OutputType>Exe</OutputType>
  </PropertyGroup>
  <ItemGroup>
    <Reference Include="System" />
  </ItemGroup>
  <ItemGroup>
    <!-- sources -->
    <Compile Include="Library.cs" />
  </ItemGroup>
  <Import Project="$(MSBuildToolsPath)\Microsoft.CSharp.targets" />
</Project>
"#;

/// Create a project file and return its path
fn create_temp_project(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn globals(configuration: &str, platform: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("Configuration".to_string(), configuration.to_string()),
        ("Platform".to_string(), platform.to_string()),
    ])
}

#[test]
fn test_load_save_reload_is_stable() {
    let dir = TempDir::new().unwrap();
    let path = create_temp_project(&dir, "Library.csproj", LIBRARY);

    let document = ProjectDocument::load(&path).unwrap();
    assert_eq!(document.path(), Some(path.as_path()));
    let first = document.to_xml_string().unwrap();
    document.save().unwrap();

    let reloaded = ProjectDocument::load(&path).unwrap();
    assert_eq!(reloaded.to_xml_string().unwrap(), first);
    assert!(first.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
    assert!(first.contains("<!-- sources -->"));
    assert!(first.contains(
        "<PropertyGroup Condition=\" '$(Configuration)|$(Platform)' == 'Debug|AnyCPU' \">"
    ));
}

#[test]
fn test_save_without_path_fails() {
    let document = ProjectDocument::parse(LIBRARY).unwrap();
    assert!(matches!(document.save(), Err(DocumentError::NoPath)));
}

#[test]
fn test_save_as_retargets() {
    let dir = TempDir::new().unwrap();
    let mut document = ProjectDocument::parse(LIBRARY).unwrap();
    let target = dir.path().join("out").join("Copy.csproj");

    document.save_as(&target).unwrap();
    assert_eq!(document.path(), Some(target.as_path()));
    assert!(target.exists());
}

#[test]
fn test_load_rejects_non_project() {
    let dir = TempDir::new().unwrap();
    let path = create_temp_project(&dir, "NotAProject.xml", "<Solution><Entry /></Solution>");
    assert!(matches!(
        ProjectDocument::load(&path),
        Err(DocumentError::InvalidRoot(_))
    ));

    let missing = dir.path().join("missing.csproj");
    assert!(matches!(
        ProjectDocument::load(&missing),
        Err(DocumentError::Io(_))
    ));
}

#[test]
fn test_evaluation_selects_configuration() {
    let document = ProjectDocument::parse(LIBRARY).unwrap();

    let debug = Evaluation::evaluate(&document, &globals("Debug", "AnyCPU"));
    assert_eq!(debug.property("OutputPath"), Some(r"bin\Debug\"));
    assert_eq!(debug.property("DefineConstants"), Some("DEBUG;TRACE"));
    assert_eq!(debug.property("Optimize"), None);

    let release = Evaluation::evaluate(&document, &globals("release", "AnyCPU"));
    assert_eq!(release.property("outputpath"), Some(r"bin\Release\"));
    assert_eq!(release.property("Optimize"), Some("true"));

    // Unrecognised conditions never hold; globals are not overridden
    assert_eq!(debug.property("OutputType"), Some("Library"));
    assert_eq!(debug.property("Configuration"), Some("Debug"));

    let unknown = Evaluation::evaluate(&document, &globals("Profile", "x64"));
    assert_eq!(unknown.property("OutputPath"), Some(r"bin\Default\"));
}

#[test]
fn test_edits_invalidate_evaluation() {
    let mut document = ProjectDocument::parse(LIBRARY).unwrap();
    let evaluation = Evaluation::evaluate(&document, &globals("Debug", "AnyCPU"));
    assert!(evaluation.is_current(&document));

    let group = document
        .find_property_group(|group| group.condition().is_none())
        .unwrap()
        .element_ref();
    document.set_property(group, "AssemblyName", "Renamed").unwrap();
    assert!(!evaluation.is_current(&document));

    let evaluation = Evaluation::evaluate(&document, &globals("Debug", "AnyCPU"));
    assert_eq!(evaluation.property("AssemblyName"), Some("Renamed"));
}

#[test]
fn test_insert_conditional_group_round_trips() {
    let dir = TempDir::new().unwrap();
    let path = create_temp_project(&dir, "Library.csproj", LIBRARY);
    let mut document = ProjectDocument::load(&path).unwrap();

    let release = document
        .configuration_property_groups(|configuration| configuration == "Release")
        .next()
        .unwrap()
        .unwrap()
        .1
        .element_ref();
    let conditions = ConditionSet::from_pairs([("Configuration", "Staging"), ("Platform", "AnyCPU")])
        .unwrap();
    let staging = document.create_property_group_after(release).unwrap();
    document.set_condition(staging, Some(&conditions)).unwrap();
    document.set_property(staging, "OutputPath", r"bin\Staging\").unwrap();
    document.save().unwrap();

    let reloaded = ProjectDocument::load(&path).unwrap();
    let found = reloaded
        .find_conditional_property_group(&conditions)
        .unwrap()
        .unwrap();
    assert_eq!(
        found.property("OutputPath").map(|p| p.value()),
        Some(r"bin\Staging\".to_string())
    );

    let configurations: Vec<String> = reloaded
        .configuration_property_groups(|_| true)
        .filter_map(|entry| entry.ok().map(|(configuration, _)| configuration))
        .collect();
    assert_eq!(configurations, vec!["Debug", "Release", "Staging"]);
}

#[test]
fn test_anchor_from_another_project_rejected() {
    let mut target = ProjectDocument::parse(LIBRARY).unwrap();
    let other = ProjectDocument::parse(LIBRARY).unwrap();
    let foreign = other
        .find_item_group(|_| true)
        .map(|group| group.element_ref())
        .unwrap();

    let before = target.to_xml_string().unwrap();
    let err = target.create_property_group_before(foreign).unwrap_err();
    assert!(matches!(err, DocumentError::ForeignNode));
    assert_eq!(err.to_string(), "child of current project required");
    assert!(target.create_item_group_after(foreign).is_err());
    assert_eq!(target.to_xml_string().unwrap(), before);
}

#[test]
fn test_deep_clone_edits_stay_separate() {
    let source = ProjectDocument::parse(LIBRARY).unwrap();
    let mut copy = source.deep_clone();

    let item = source
        .find_item(|item| item.kind() == "Compile")
        .unwrap()
        .element_ref();
    assert!(copy.set_item_include(item, "Other.cs").is_err());

    let translated = copy.translate(item).unwrap();
    copy.set_item_include(translated, "Other.cs").unwrap();

    assert_eq!(
        source.find_item(|item| item.kind() == "Compile").unwrap().include(),
        Some("Library.cs")
    );
    assert_eq!(
        copy.find_item(|item| item.kind() == "Compile").unwrap().include(),
        Some("Other.cs")
    );
}

#[test]
fn test_value_text_survives_clone_and_save() {
    let dir = TempDir::new().unwrap();
    let path = create_temp_project(
        &dir,
        "Spacing.csproj",
        r#"<Project>
  <PropertyGroup>
    <NoWarn> 1591 </NoWarn>
    <Separator> </Separator>
    <Mixed>a <!-- c --> b</Mixed>
  </PropertyGroup>
</Project>
"#,
    );

    let source = ProjectDocument::load(&path).unwrap();
    let mut copy = source.deep_clone();
    let target = dir.path().join("Copy.csproj");
    copy.save_as(&target).unwrap();

    let saved = fs::read_to_string(&target).unwrap();
    assert!(saved.contains("<NoWarn> 1591 </NoWarn>"));
    assert!(saved.contains("<Separator> </Separator>"));
    assert!(saved.contains("<Mixed>a <!-- c --> b</Mixed>"));

    let reloaded = ProjectDocument::load(&target).unwrap();
    let values: Vec<(String, String)> = reloaded
        .find_properties(|_| true)
        .map(|property| (property.name().to_string(), property.value()))
        .collect();
    assert_eq!(
        values,
        vec![
            ("NoWarn".to_string(), " 1591 ".to_string()),
            ("Separator".to_string(), " ".to_string()),
            ("Mixed".to_string(), "a  b".to_string()),
        ]
    );
    assert_eq!(reloaded.to_xml_string().unwrap(), saved);
}
