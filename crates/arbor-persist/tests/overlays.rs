use arbor_persist::{Configuration, Localization, OverlayConfig, OverlayContext, PersistConfig};
use arbor_store::{PathStore, Value};
use arbor_test_utils::{sample_messages, TempTree};
use pretty_assertions::assert_eq;

fn config_tree() -> TempTree {
    let tree = TempTree::new();
    tree.write("db.json", r#"{"host": "localhost", "pool": 4}"#);
    tree.write("prod/db.json", r#"{"host": "db.internal", "pool": 32}"#);
    tree.mkdir("test");
    tree
}

/// One context drives several stores; each re-selects on next access.
#[test]
fn test_shared_context_switches_all_stores() {
    let tree = config_tree();
    let context = OverlayContext::new();
    let mut first = Configuration::new(PersistConfig::new(tree.dir_path()), context.clone()).unwrap();
    let mut second = Configuration::new(PersistConfig::new(tree.dir_path()), context.clone()).unwrap();

    assert_eq!(first.get_integer("db:pool"), Some(4));
    assert_eq!(second.get_integer("db:pool"), Some(4));

    context.set_environment("prod");
    assert_eq!(first.get_integer("db:pool"), Some(32));
    assert_eq!(second.get_string("db:host").as_deref(), Some("db.internal"));
}

/// A valid overlay without its own file reads the base file.
#[test]
fn test_overlay_without_file_falls_back() {
    let tree = config_tree();
    let context = OverlayContext::new();
    context.set_environment("test");
    let mut config = Configuration::new(PersistConfig::new(tree.dir_path()), context).unwrap();

    assert_eq!(config.get_string("db:host").as_deref(), Some("localhost"));
    assert_eq!(config.environment(), "test");
}

/// Values set under one environment never leak into the next.
#[test]
fn test_switch_discards_unsaved_values() {
    let tree = config_tree();
    let context = OverlayContext::new();
    let mut config = Configuration::new(PersistConfig::new(tree.dir_path()), context.clone()).unwrap();

    config.set("db:scratch", "unsaved");
    assert!(config.exist("db:scratch"));

    context.set_environment("prod");
    assert!(!config.exist("db:scratch"));
    assert_eq!(config.get_integer("db:pool"), Some(32));
}

/// Translations follow the shared locale and fill placeholders.
#[test]
fn test_localized_messages() {
    let tree = TempTree::new();
    tree.write(
        "ui.json",
        sample_messages().to_json().to_string(),
    );
    tree.write("es/ui.json", r#"{"greeting": "¡Hola, {name}!"}"#);

    let context = OverlayContext::new();
    let mut l10n = Localization::new(
        PersistConfig::new(tree.dir_path()),
        OverlayConfig::new(),
        context.clone(),
    )
    .unwrap();

    let params = [("name", Value::from("Ada"))];
    assert_eq!(l10n.translate("ui:greeting", &params), "Hello, Ada!");

    context.set_locale("es");
    assert_eq!(l10n.translate("ui:greeting", &params), "¡Hola, Ada!");
    assert_eq!(l10n.translate("ui:farewell", &params), "ui:farewell");
}
