use std::io::Write;

use carconf_catalog::{CatalogError, load_catalog, load_engine_options};
use carconf_model::StyleTieBreak;

fn temp_file(name: &str, contents: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("carconf-catalog-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).expect("create file");
    file.write_all(contents.as_bytes()).expect("write file");
    path
}

#[test]
fn loads_catalog_from_disk() {
    let path = temp_file(
        "catalog.json",
        r#"[{"category": "color", "elements": [{"code": "red", "available": ""}]}]"#,
    );
    let catalog = load_catalog(&path).expect("load catalog");
    assert!(catalog.find_element("red").is_some());
}

#[test]
fn missing_catalog_reports_path() {
    let error = load_catalog(std::path::Path::new("/definitely/not/here.json")).unwrap_err();
    assert!(matches!(error, CatalogError::Io { .. }));
    assert!(error.to_string().contains("/definitely/not/here.json"));
}

#[test]
fn loads_engine_options_from_toml() {
    let path = temp_file(
        "engine.toml",
        "reapply_or_groups = false\nstyle_tie_break = \"first\"\n",
    );
    let options = load_engine_options(&path).expect("load options");
    assert!(!options.reapply_or_groups);
    assert!(options.market_fallback);
    assert_eq!(options.style_tie_break, StyleTieBreak::First);

    let bad = temp_file("bad.toml", "reapply_or_groups = \"maybe\"\n");
    assert!(matches!(
        load_engine_options(&bad),
        Err(CatalogError::Toml { .. })
    ));
}
