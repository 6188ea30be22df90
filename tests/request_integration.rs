//! Integration tests for TOML request descriptions

use std::path::Path;

use csom_builder::{EnvelopeConfig, RenderError, RequestDescription};
use pretty_assertions::assert_eq;

#[test]
fn test_folder_query_fixture() {
    let desc = RequestDescription::from_str(include_str!("fixtures/folder_query.toml"))
        .expect("Should parse");
    let mut builder = desc.build().expect("Should build");
    let xml = builder.compile().into_result().expect("Should compile");

    let expected = concat!(
        r#"<Request xmlns="http://schemas.microsoft.com/sharepoint/clientquery/2009" SchemaVersion="15.0.0.0" LibraryVersion="16.0.0.0" ApplicationName="Gosip">"#,
        r#"<Actions>"#,
        r#"<Query Id="4" ObjectPathId="2"><Query SelectAllProperties="true"><Properties><Property Name="ServerRelativeUrl" ScalarProperty="true" /></Properties></Query></Query>"#,
        r#"<SetProperty Id="5" ObjectPathId="3" Name="Title"><Parameter Type="String">Renamed</Parameter></SetProperty>"#,
        r#"<Method Id="6" ObjectPathId="3" Name="Update"><Parameters></Parameters></Method>"#,
        r#"</Actions>"#,
        r#"<ObjectPaths>"#,
        r#"<StaticProperty Id="0" TypeId="{3747adcd-a3c3-41b9-bfab-4a64dd2f1e0a}" Name="Current" />"#,
        r#"<Property Id="1" ParentId="0" Name="Web" />"#,
        r#"<Method Id="2" ParentId="1" Name="GetFolderByServerRelativeUrl"><Parameters><Parameter Type="String">/sites/site/Lists/List</Parameter></Parameters></Method>"#,
        r#"<Method Id="3" ParentId="1" Name="GetList"><Parameters><Parameter Type="String">/sites/site/Lists/List</Parameter></Parameters></Method>"#,
        r#"</ObjectPaths>"#,
        r#"</Request>"#
    );
    assert_eq!(xml, expected);
}

#[test]
fn test_explicit_config_overrides_envelope_section() {
    let desc = RequestDescription::from_file(Path::new("tests/fixtures/folder_query.toml"))
        .expect("Should load");
    let mut builder = desc
        .build_with_config(EnvelopeConfig::new().with_application_name("Override"))
        .expect("Should build");
    let xml = builder.compile().into_result().expect("Should compile");
    assert!(xml.contains(r#"ApplicationName="Override""#));
}

#[test]
fn test_broken_fixture_reports_errors_and_document() {
    let desc = RequestDescription::from_str(include_str!("fixtures/broken.toml"))
        .expect("Should parse");
    let mut builder = desc.build().expect("Should build");
    let (xml, error) = builder.compile().into_parts();

    let error = error.expect("Should report render error");
    assert_eq!(
        error.errors,
        vec![RenderError::UnknownField {
            kind: "action",
            field: "ParentID".to_string(),
        }]
    );
    assert!(xml.contains(r#"<Query Id="{{.ID}}" ObjectPathId="{{.ParentID}}" />"#));
    assert!(xml.contains(r#"<ObjectIdentityQuery Id="3" ObjectPathId="1" />"#));
}

#[test]
fn test_missing_file() {
    assert!(RequestDescription::from_file(Path::new("tests/fixtures/does-not-exist.toml")).is_err());
}
