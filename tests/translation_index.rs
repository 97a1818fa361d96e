mod common;

use common::Project;
use laridx::config::IndexOptions;
use laridx::query::ArtifactQuery;

const MESSAGES_EN: &str = r#"<?php

return [
    'welcome' => 'Welcome!',
    'dashboard' => [
        'title' => 'Dashboard',
        'empty' => 'Nothing here yet',
    ],
];
"#;

const MESSAGES_FR: &str = r#"<?php
return [
    'welcome' => 'Bienvenue !',
];
"#;

fn project() -> Project {
    let project = Project::new();
    project
        .write("resources/lang/en/messages.php", MESSAGES_EN)
        .write("resources/lang/fr/messages.php", MESSAGES_FR)
        .write("resources/lang/de.json", "{\n  \"Log in\": \"Anmelden\"\n}\n");
    project
}

#[test]
fn nested_keys_are_flattened() {
    let index = project().index();
    let keys = index.translations().all();
    assert!(keys.contains(&"messages.welcome".to_string()));
    assert!(keys.contains(&"messages.dashboard.title".to_string()));
    assert!(keys.contains(&"messages.dashboard.empty".to_string()));
    assert!(keys.contains(&"Log in".to_string()));
    assert!(!keys.contains(&"messages.dashboard".to_string()));
}

#[test]
fn locales_are_kept_per_key() {
    let index = project().index();
    let translations = index.translations();
    let locales: Vec<String> = translations
        .declarations_of("messages.welcome")
        .into_iter()
        .map(|t| t.locale)
        .collect();
    assert_eq!(locales.len(), 2);
    assert!(locales.contains(&"en".to_string()));
    assert!(locales.contains(&"fr".to_string()));

    assert_eq!(translations.value_of("Log in"), "Anmelden");
    assert_eq!(translations.locale_of("Log in"), "de");
    assert_eq!(translations.value_of("missing.key"), "missing.key");
    assert_eq!(translations.locale_of("missing.key"), "en");
}

#[test]
fn declarations_find_nested_key_sites() {
    let index = project().index();
    let sites = index.translations().declarations("messages.dashboard.title");
    assert_eq!(sites.len(), 1);
    assert_eq!(sites[0].file, "resources/lang/en/messages.php");
    assert_eq!(sites[0].line, 5);

    let sites = index.translations().declarations("messages.welcome");
    let files: Vec<&str> = sites.iter().map(|s| s.file.as_str()).collect();
    assert!(files.contains(&"resources/lang/en/messages.php"));
    assert!(files.contains(&"resources/lang/fr/messages.php"));

    let sites = index.translations().declarations("Log in");
    assert_eq!(sites[0].file, "resources/lang/de.json");
    assert_eq!(sites[0].line, 1);
}

#[test]
fn lang_directory_at_project_root() {
    let project = Project::new();
    project.write("lang/en/auth.php", "<?php return ['failed' => 'These credentials do not match.'];");
    let index = project.index();
    assert!(index.translations().is_known("auth.failed"));
}

#[test]
fn strict_json_rejects_malformed_files() {
    let project = Project::new();
    project
        .write("lang/en.json", "{\"Save\": \"Save\",}")
        .write("lang/es.json", "{\"Cancel\": \"Cancelar\"}");

    let lenient = project.index();
    assert!(lenient.translations().is_known("Save"));

    let strict = project.index_with(IndexOptions::default().with_strict_json(true));
    assert!(!strict.translations().is_known("Save"));
    assert!(strict.translations().is_known("Cancel"));
    assert_eq!(strict.stats().errors, 1);
}
