use carconf_catalog::{Catalog, CatalogError, DefaultEntry};
use carconf_model::{CameraKind, Category};

const CATALOG: &str = r#"[
    {"category": "date", "correctAsOf": "2024-03-29"},
    {"category": "default", "elements": [
        {"category": "style", "code": "US-M3-T1"},
        {"category": "market", "code": "US"},
        {"category": "peg", "code": "T1"},
        {"category": "color", "code": "red"}
    ]},
    {"category": "market", "elements": [{"code": "US", "available": ""}, {"code": "EU", "available": ""}]},
    {"category": "mmc", "elements": [
        {"code": "M3", "available": "T1|T2"},
        {"code": "M5", "available": "T3"}
    ]},
    {"category": "peg", "elements": [
        {"code": "T1", "available": ""}, {"code": "T2", "available": ""}, {"code": "T3", "available": ""}
    ]},
    {"category": "style", "elements": [
        {"code": "US-M3-T1", "available": "US&T1&AWD"},
        {"code": "US-M3-T2", "available": "US&T2"},
        {"code": "EU-M5-T3", "available": "EU&T3"}
    ]},
    {"category": "color", "elements": [
        {"code": "red", "available": ""},
        {"code": "blue", "standard": "T2", "available": ""}
    ]},
    {"category": "packaging and accessories", "elements": [
        {"type": "group", "group": "roof", "multipleSelection": false,
         "groupElements": [{"code": "ROOF", "available": ""}, {"code": "RACK", "available": ""}]},
        {"type": "group", "hybridSelection": true, "groupElements": [
            {"multipleSelection": true, "elements": [{"code": "MATS"}, {"code": "NETS"}]},
            {"multipleSelection": false, "elements": [{"code": "TOW"}]}
        ]}
    ]},
    {"category": "standard part", "elements": [{"code": "SP1", "standard": "T1"}]},
    {"category": "camera", "elements": [
        {"type": "EXT", "code": "C01", "group": "Studio"},
        {"type": "INT", "code": "C10", "available": "T2"}
    ]}
]"#;

fn catalog() -> Catalog {
    Catalog::from_json_str(CATALOG).expect("catalog")
}

#[test]
fn finds_elements_and_categories() {
    let catalog = catalog();
    assert_eq!(catalog.find_element("blue").unwrap().standard.as_deref(), Some("T2"));
    assert_eq!(catalog.category_of("blue"), Category::Color);
    assert_eq!(catalog.category_of("T3"), Category::Trim);
    assert_eq!(catalog.category_of("SP1"), Category::StandardPart);
    assert_eq!(catalog.category_of("ROOF"), Category::Accessories);
    assert_eq!(catalog.category_of("attach-only"), Category::Accessories);
    assert!(catalog.find_element("attach-only").is_none());
    assert!(catalog.find_element("C01").is_some());
}

#[test]
fn flattens_accessory_groups() {
    let catalog = catalog();
    let codes: Vec<&str> = catalog
        .elements_of(Category::Accessories)
        .iter()
        .map(|element| element.code.as_str())
        .collect();
    assert_eq!(codes, vec!["ROOF", "RACK", "MATS", "NETS", "TOW"]);

    let groups = catalog.accessory_groups();
    assert_eq!(groups.len(), 3);
    assert!(!groups[0].multiple_selection);
    assert!(groups[1].multiple_selection);
    assert!(!catalog.accessory_group_of("TOW").unwrap().multiple_selection);
}

#[test]
fn indexes_styles_defaults_and_cameras() {
    let catalog = catalog();
    assert_eq!(catalog.style_records().len(), 3);
    assert!(catalog.style_records()[0].references("AWD"));
    assert!(catalog.style_records()[0].references("M3"));
    assert!(!catalog.style_records()[1].references("AWD"));

    assert_eq!(
        catalog.default_list()[1],
        DefaultEntry {
            category: Category::Market,
            code: "US".to_string()
        }
    );

    let exterior: Vec<&str> = catalog
        .cameras_of(CameraKind::Exterior)
        .map(|camera| camera.code.as_str())
        .collect();
    assert_eq!(exterior, vec!["C01"]);
    assert_eq!(catalog.cameras()[1].query_fragment(), "INT,C10");
    assert_eq!(
        catalog.correct_as_of().map(|date| date.to_string()).as_deref(),
        Some("2024-03-29")
    );
}

#[test]
fn valid_mmc_and_filtered_trims() {
    let catalog = catalog();
    let selected = vec!["US".to_string(), "T2".to_string()];
    assert_eq!(catalog.valid_mmc(&selected).unwrap().code, "M3");
    let nothing: Vec<String> = Vec::new();
    assert!(catalog.valid_mmc(&nothing).is_none());

    let trims: Vec<&str> = catalog
        .filtered_trims("US")
        .into_iter()
        .map(|trim| trim.code.as_str())
        .collect();
    assert_eq!(trims, vec!["T1", "T2"]);
}

#[test]
fn fingerprint_is_stable_hex() {
    let first = catalog();
    let second = catalog();
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert_eq!(first.fingerprint().len(), 64);
    assert!(first.fingerprint().chars().all(|ch| ch.is_ascii_hexdigit()));
}

#[test]
fn rejects_bad_documents() {
    assert!(matches!(
        Catalog::from_json_str("{"),
        Err(CatalogError::Json { .. })
    ));
    assert!(matches!(
        Catalog::from_json_str(r#"[{"category": "style", "elements": [{"code": "US-M3"}]}]"#),
        Err(CatalogError::Model(_))
    ));
    assert!(matches!(
        Catalog::from_json_str(r#"[{"category": "default", "elements": [{"code": "US"}]}]"#),
        Err(CatalogError::MissingCategory { .. })
    ));
    assert!(matches!(
        Catalog::from_json_str(r#"[{"category": "camera", "elements": [{"code": "C1", "type": "TOP"}]}]"#),
        Err(CatalogError::InvalidCamera { .. })
    ));
    assert!(matches!(
        Catalog::from_json_str(r#"[{"category": "date", "correctAsOf": "soon"}]"#),
        Err(CatalogError::InvalidDate { .. })
    ));
}

#[test]
fn category_listing_snapshot() {
    let catalog = catalog();
    let listing: Vec<String> = catalog
        .categories()
        .map(|category| format!("{category}={}", catalog.elements_of(category).len()))
        .collect();
    insta::assert_snapshot!(listing.join(" "), @"date=0 default=4 market=2 mmc=2 peg=3 style=3 color=2 packaging and accessories=5 standard part=1 camera=2");
}
