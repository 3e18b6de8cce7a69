use std::path::Path;
use wg_project::{load_json, load_yaml, save_json, save_yaml};

#[test]
fn yaml_and_json_roundtrip() {
    let source = Path::new(env!("CARGO_MANIFEST_DIR")).join("cases/platform_network.yaml");
    let case = load_yaml(&source).unwrap();

    let dir = std::env::temp_dir().join(format!("wg-project-roundtrip-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let yaml = dir.join("case.yaml");
    save_yaml(&yaml, &case).unwrap();
    assert_eq!(load_yaml(&yaml).unwrap(), case);

    let json = dir.join("case.json");
    save_json(&json, &case).unwrap();
    assert_eq!(load_json(&json).unwrap(), case);

    std::fs::remove_dir_all(&dir).unwrap();
}
