//! `#[derive(StacEnum)]` on user enums.

use serde_json::json;
use stacql::{FieldKind, FieldSpec, Literal, QueryBuilder, StacEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, StacEnum)]
#[stac(rename_all = "UPPERCASE")]
enum Polarization {
    Hh,
    Vv,
    Hv,
    Vh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, StacEnum)]
enum ProcessingLevel {
    Raw,
    SingleLookComplex,
    #[stac(rename = "GRD")]
    GroundRange,
}

#[test]
fn rename_all_applies_to_every_variant() {
    assert_eq!(Polarization::Hh.as_str(), "HH");
    assert_eq!(Polarization::Vh.to_string(), "VH");
    assert_eq!(Polarization::VARIANTS.len(), 4);
}

#[test]
fn default_rule_is_snake_case_and_rename_wins() {
    assert_eq!(ProcessingLevel::Raw.as_str(), "raw");
    assert_eq!(ProcessingLevel::SingleLookComplex.as_str(), "single_look_complex");
    assert_eq!(ProcessingLevel::GroundRange.as_str(), "GRD");
    assert_eq!(
        ProcessingLevel::from_str_value("GRD"),
        Some(ProcessingLevel::GroundRange)
    );
    assert_eq!(ProcessingLevel::from_str_value("ground_range"), None);
}

#[test]
fn converts_into_literals() {
    assert_eq!(Literal::from(Polarization::Hv), Literal::from("HV"));
    assert_eq!(Literal::from(&ProcessingLevel::Raw), Literal::from("raw"));
}

#[test]
fn derived_enum_backs_a_field() {
    let mut q = QueryBuilder::core_only();
    q.add_field(FieldSpec::new("sar:polarization", FieldKind::of_enum::<Polarization>()).unwrap())
        .unwrap();

    q.field("sar:polarization")
        .unwrap()
        .in_set([Polarization::Hh, Polarization::Vv])
        .unwrap();
    assert!(q.field("sar:polarization").unwrap().equals("hh").is_err());

    let doc = serde_json::to_value(q.query_dump().unwrap()).unwrap();
    assert_eq!(
        doc["filter"]["args"],
        json!([{"op": "in", "args": [{"property": "sar:polarization"}, ["HH", "VV"]]}])
    );
}
