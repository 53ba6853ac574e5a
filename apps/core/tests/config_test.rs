use recentpick_core::config::{self, Config, DEFAULT_CREATED_QUERY, DEFAULT_MODIFIED_QUERY};
use recentpick_core::placement::PlacementPreference;

#[test]
fn accepts_default_config() {
    let cfg = Config::default();
    assert_eq!(cfg.modified_query, DEFAULT_MODIFIED_QUERY);
    assert_eq!(cfg.created_query, DEFAULT_CREATED_QUERY);
    assert_eq!(cfg.placement, PlacementPreference::Tab);
    assert!(cfg.index_db_path.ends_with("index.sqlite3"));
    assert!(config::validate(&cfg).is_ok());
}

#[test]
fn default_queries_return_the_supported_columns() {
    for query in [DEFAULT_MODIFIED_QUERY, DEFAULT_CREATED_QUERY] {
        for column in ["\"Name\"", "\"Path\"", "\"Date\"", "\"Tags\""] {
            assert!(query.contains(column), "{column} missing from {query}");
        }
    }
}

#[test]
fn rejects_blank_paths() {
    let cfg = Config {
        index_db_path: Default::default(),
        ..Default::default()
    };
    assert!(config::validate(&cfg).is_err());
}

#[test]
fn missing_file_yields_defaults_bound_to_that_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    let cfg = config::load(Some(&path)).unwrap();
    assert_eq!(cfg.config_path, path);
    assert_eq!(cfg.placement, PlacementPreference::Tab);
    assert!(!path.exists());
}

#[test]
fn loads_partial_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "placement = \"split\"\nmodified_query = \"\"\n").unwrap();

    let cfg = config::load(Some(&path)).unwrap();
    assert_eq!(cfg.placement, PlacementPreference::Split);
    assert_eq!(cfg.modified_query, DEFAULT_MODIFIED_QUERY);
    assert_eq!(cfg.created_query, DEFAULT_CREATED_QUERY);
}

#[test]
fn loads_json5_with_comments() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json5");
    std::fs::write(
        &path,
        "{\n  // newest notes only\n  created_query: 'SELECT name AS \"Name\", path AS \"Path\" FROM file',\n  placement: 'window',\n}\n",
    )
    .unwrap();

    let cfg = config::load(Some(&path)).unwrap();
    assert_eq!(cfg.placement, PlacementPreference::Window);
    assert!(cfg.created_query.starts_with("SELECT name"));
}

#[test]
fn rejects_unknown_placement_value() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "placement = \"popup\"\n").unwrap();

    assert!(config::load(Some(&path)).is_err());
}

#[test]
fn saved_config_loads_back() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["nested/config.toml", "nested/config.json"] {
        let path = dir.path().join(name);
        let cfg = Config {
            placement: PlacementPreference::Window,
            modified_query: "SELECT 1 AS \"Name\"".to_string(),
            vault_root: Some(dir.path().to_path_buf()),
            config_path: path.clone(),
            ..Default::default()
        };

        config::save(&cfg).unwrap();
        let loaded = config::load(Some(&path)).unwrap();
        assert_eq!(loaded, cfg);
    }
}
