//! ワークスペースからの読み込みと実行中のカルチャ切り替えに関するテスト

#![allow(clippy::unwrap_used)]
#![allow(clippy::indexing_slicing)]
#![allow(missing_docs)]

use std::fs;
use std::path::Path;
use std::sync::{
    Arc,
    Mutex,
};

use googletest::prelude::*;
use live_translations::provider::{
    ResourceDictionary,
    ResourceEntry,
    ResourceFileProvider,
    ResourceReader,
};
use live_translations::{
    CultureChanged,
    KeyPolicy,
    Resource,
    SchemaMismatch,
    TranslationCatalog,
    TranslationError,
    WorkspaceLoader,
};
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn create_workspace() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "locales/en.json", r#"{"Greeting": "Hello", "Title": "Main window"}"#);
    write(root, "locales/fr.json", r#"{"Greeting": "Bonjour", "Title": "Fenêtre principale"}"#);
    write(root, "locales/it.json", r#"{"Greeting": "Ciao", "Title": "Finestra", "Extra": "x"}"#);
    write(root, "locales/de.json", r#"{"Greeting": "Hallo"}"#);
    temp_dir
}

#[test]
fn test_workspace_catalog_switches_culture() {
    let workspace = create_workspace();
    let loader = WorkspaceLoader::from_workspace(workspace.path()).unwrap();

    let mut catalog = loader.load_catalog().unwrap();

    assert_eq!(catalog.cultures().unwrap(), ["en", "fr"]);
    assert_that!(catalog.current().unwrap().unwrap().get("Greeting").unwrap(), eq("Hello"));

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    catalog.subscribe(move |event: &CultureChanged| sink.lock().unwrap().push(event.clone())).unwrap();

    catalog.set_current("fr").unwrap();
    catalog.set_current("fr").unwrap();

    assert_that!(catalog.current().unwrap().unwrap().get("Greeting").unwrap(), eq("Bonjour"));
    let events = events.lock().unwrap().clone();
    assert_eq!(
        events,
        [CultureChanged { previous: Some("en".to_string()), current: "fr".to_string() }]
    );
}

#[test]
fn test_workspace_catalog_lenient_accepts_superset() {
    let workspace = create_workspace();
    write(workspace.path(), ".live-translations.json", r#"{"keyPolicy": "lenient"}"#);
    let loader = WorkspaceLoader::from_workspace(workspace.path()).unwrap();

    let catalog = loader.load_catalog().unwrap();

    assert_eq!(catalog.cultures().unwrap(), ["en", "fr", "it"]);
    assert_that!(catalog.get("it").unwrap().unwrap().count().unwrap(), eq(3));
}

#[test]
fn test_manual_catalog_with_resource_files() {
    let mut catalog = TranslationCatalog::with_provider(ResourceFileProvider);
    let contract = ResourceReader::from_entries(vec![
        ("Greeting".to_string(), ResourceEntry::from("Hello")),
        ("Title".to_string(), ResourceEntry::from("Main window")),
        ("Icon".to_string(), ResourceEntry::Binary(vec![0x89, 0x50])),
    ]);
    catalog.set_key_contract_from(Box::new(contract)).unwrap();
    catalog.register_contract_as("en").unwrap();

    let missing: Resource = Box::new(ResourceReader::from_entries(vec![
        ("Greeting".to_string(), ResourceEntry::from("Bonjour")),
        ("Subtitle".to_string(), ResourceEntry::from("Sous-titre")),
    ]));
    let result = catalog.try_add("fr", missing);

    assert!(matches!(
        result,
        Err(TranslationError::SchemaMismatch(SchemaMismatch::MissingKeys { keys })) if keys == ["Title"]
    ));
    assert_eq!(catalog.cultures().unwrap(), ["en"]);
}

#[test]
fn test_release_disposes_everything() {
    let mut catalog = TranslationCatalog::new();
    catalog
        .set_data_provider(live_translations::provider::ResourceDictionaryProvider)
        .unwrap();
    catalog
        .set_key_contract_from(Box::new(ResourceDictionary::new().with("Greeting", "Hello")))
        .unwrap();
    catalog.set_key_policy(KeyPolicy::Strict).unwrap();
    assert!(catalog.add("es", Box::new(ResourceDictionary::new().with("Greeting", "Hola"))));
    catalog.set_current("es").unwrap();

    catalog.release();
    catalog.release();

    assert!(catalog.is_released());
    assert!(matches!(
        catalog.set_current("es"),
        Err(TranslationError::ObjectDisposed { operation: "set_current" })
    ));
}
