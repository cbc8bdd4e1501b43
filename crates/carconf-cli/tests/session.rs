//! Tests for replaying command-line selections and rendering their tables.

use std::path::{Path, PathBuf};

use carconf_catalog::Catalog;
use carconf_cli::session::{
    AmbiguousSelection, EngineOverrides, catalog_path, engine_options, replay,
};
use carconf_cli::summary::explain_table;
use carconf_engine::Configurator;
use carconf_model::{Category, EngineOptions, StyleTieBreak};

const CATALOG: &str = r#"[
    {"category": "default", "elements": [
        {"category": "style", "code": "US-M3-T1"},
        {"category": "market", "code": "US"},
        {"category": "peg", "code": "T1"},
        {"category": "color", "code": "red"},
        {"category": "wheels", "code": "W1"}
    ]},
    {"category": "market", "elements": [{"code": "US", "available": ""}]},
    {"category": "mmc", "elements": [
        {"code": "M3", "available": "T1"},
        {"code": "M4", "available": "T2"},
        {"code": "M5", "available": "T2"}
    ]},
    {"category": "peg", "elements": [
        {"code": "T1", "available": ""},
        {"code": "T2", "available": ""}
    ]},
    {"category": "style", "elements": [
        {"code": "US-M3-T1", "available": "US&T1"},
        {"code": "US-M4-T2", "available": "US&T2"},
        {"code": "US-M5-T2", "available": "US&T2"}
    ]},
    {"category": "color", "elements": [
        {"code": "red", "available": ""},
        {"code": "blue", "available": ""}
    ]},
    {"category": "wheels", "elements": [
        {"code": "W1", "available": "", "enableCodes": {"color": "red|blue"}}
    ]},
    {"category": "camera", "elements": [{"type": "EXT", "code": "C01"}]}
]"#;

fn catalog() -> Catalog {
    Catalog::from_json_str(CATALOG).unwrap()
}

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn replay_applies_assignments_in_order() {
    let catalog = catalog();
    let configurator = Configurator::new(&catalog);

    let configuration = replay(&configurator, &args(&["color=blue"]), &[], None).unwrap();
    assert_eq!(configuration.options.get(Category::Color), "blue");
    assert_eq!(configuration.options.get(Category::Wheels), "W1");
}

#[test]
fn tied_styles_need_a_pick() {
    let catalog = catalog();
    let configurator = Configurator::new(&catalog);

    let error = replay(&configurator, &args(&["peg=T2"]), &[], None).unwrap_err();
    let ambiguous = error.downcast_ref::<AmbiguousSelection>().unwrap();
    assert_eq!(ambiguous.candidates.len(), 2);
    assert_eq!(
        error.to_string(),
        "peg=T2 matches 2 styles equally (US-M4-T2, US-M5-T2); choose one with --pick"
    );

    let picked = replay(&configurator, &args(&["peg=T2"]), &[], Some(1)).unwrap();
    assert_eq!(picked.options.style_key().as_str(), "US-M5-T2");

    let error = replay(&configurator, &args(&["peg=T2"]), &[], Some(5)).unwrap_err();
    assert!(error.to_string().contains("out of range"));
}

#[test]
fn first_style_override_breaks_ties() {
    let catalog = catalog();
    let overrides = EngineOverrides {
        first_style: true,
        ..EngineOverrides::default()
    };
    let options = engine_options(None, overrides).unwrap();
    assert_eq!(options.style_tie_break, StyleTieBreak::First);

    let configurator = Configurator::new(&catalog).with_options(options);
    let configuration = replay(&configurator, &args(&["peg=T2"]), &[], None).unwrap();
    assert_eq!(configuration.options.style_key().as_str(), "US-M4-T2");
}

#[test]
fn overrides_win_over_defaults() {
    let overrides = EngineOverrides {
        no_reapply: true,
        no_market_fallback: true,
        first_style: false,
    };
    let options = overrides.apply(EngineOptions::default());
    assert!(!options.reapply_or_groups);
    assert!(!options.market_fallback);
    assert_eq!(options.style_tie_break, StyleTieBreak::Ask);
}

#[test]
fn malformed_assignment_is_reported() {
    let catalog = catalog();
    let configurator = Configurator::new(&catalog);

    let error = replay(&configurator, &args(&["color"]), &[], None).unwrap_err();
    assert!(format!("{error:#}").starts_with("parse selection 'color'"));

    let error = replay(&configurator, &args(&["color=purple"]), &[], None).unwrap_err();
    assert!(format!("{error:#}").contains("purple"));
}

#[test]
fn explicit_catalog_path_wins() {
    let path = catalog_path(Some(Path::new("showroom.json"))).unwrap();
    assert_eq!(path, PathBuf::from("showroom.json"));
}

#[test]
fn explain_table_lists_activations() {
    let catalog = catalog();
    let configurator = Configurator::new(&catalog);
    let defaults = configurator.apply_defaults();

    let mut table = explain_table(&configurator.explain(&defaults));
    table.force_no_tty();
    insta::assert_snapshot!(table.to_string(), @r"
    ╭──────┬──────────────┬─────────────╮
    │ Code ┆ Activated by ┆ Disabled by │
    ╞══════╪══════════════╪═════════════╡
    │ red  ┆ W1           ┆             │
    ╰──────┴──────────────┴─────────────╯
    ");
}
