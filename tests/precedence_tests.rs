// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for property source precedence.
//!
//! Every test lays out a directory tree, runs the engine against it and checks
//! which source a value ends up coming from.

use layercfg::adapters::map_source::DEFAULT_PROPERTIES;
use layercfg::prelude::*;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Writes `files` below a fresh directory.
fn tree(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (path, content) in files {
        let path = dir.path().join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
    dir
}

fn map(name: &str, pairs: &[(&str, &str)]) -> Arc<dyn PropertySource> {
    Arc::new(MapPropertySource::from_pairs(name, pairs.iter().copied()))
}

fn run(dir: &Path, env: &mut StandardEnvironment) -> Result<Profiles> {
    ConfigDataEnvironmentBuilder::new()
        .base_dir(dir)
        .resource_root(dir.join("resources"))
        .build(env)?
        .process_and_apply(env)
}

fn value(env: &StandardEnvironment, key: &str) -> Option<String> {
    env.get_property(key).map(String::from)
}

#[test]
#[cfg(all(feature = "cli", feature = "env"))]
fn test_precedence_cli_over_env_over_files() {
    let dir = tree(&[("app.properties", "a=file\nb=file\nc=file")]);
    let mut env = StandardEnvironment::new()
        .with_source(Arc::new(CommandLineAdapter::from_args(vec!["--a=cli"])))
        .with_source(Arc::new(EnvVarAdapter::with_values([("A", "env"), ("B", "env")])));

    run(dir.path(), &mut env).unwrap();

    assert_eq!(value(&env, "a").as_deref(), Some("cli"));
    assert_eq!(value(&env, "b").as_deref(), Some("env"));
    assert_eq!(value(&env, "c").as_deref(), Some("file"));
}

#[test]
#[cfg(feature = "env")]
fn test_precedence_env_activates_profile() {
    let dir = tree(&[
        ("app.properties", "k=plain"),
        ("app-prod.properties", "k=prod"),
    ]);
    let mut env = StandardEnvironment::new()
        .with_source(Arc::new(EnvVarAdapter::with_values([("APP_PROFILES_ACTIVE", "prod")])));

    let profiles = run(dir.path(), &mut env).unwrap();

    assert_eq!(profiles.active(), ["prod"]);
    assert_eq!(value(&env, "k").as_deref(), Some("prod"));
}

#[test]
fn test_precedence_profile_specific_over_plain() {
    let dir = tree(&[
        ("app.properties", "k=plain\nonly.plain=yes"),
        ("app-prod.properties", "k=prod"),
        ("app-dev.properties", "k=dev"),
    ]);
    let mut env = StandardEnvironment::new().with_source(map("args", &[("app.profiles.active", "prod")]));

    run(dir.path(), &mut env).unwrap();

    assert_eq!(value(&env, "k").as_deref(), Some("prod"));
    assert_eq!(value(&env, "only.plain").as_deref(), Some("yes"));
    assert!(!env.source_names().iter().any(|name| name.contains("app-dev")));
}

#[test]
fn test_precedence_last_active_profile_wins() {
    let dir = tree(&[
        ("app-dev.properties", "k=dev"),
        ("app-local.properties", "k=local"),
    ]);
    let mut env = StandardEnvironment::new().with_source(map("args", &[("app.profiles.active", "dev,local")]));

    run(dir.path(), &mut env).unwrap();

    assert_eq!(value(&env, "k").as_deref(), Some("local"));
}

#[test]
fn test_precedence_config_dir_over_root() {
    let dir = tree(&[
        ("app.properties", "a=root\nb=root\nc=root"),
        ("config/app.properties", "a=config\nb=config"),
        ("config/extra/app.properties", "a=wildcard"),
    ]);
    let mut env = StandardEnvironment::new();

    run(dir.path(), &mut env).unwrap();

    assert_eq!(value(&env, "a").as_deref(), Some("wildcard"));
    assert_eq!(value(&env, "b").as_deref(), Some("config"));
    assert_eq!(value(&env, "c").as_deref(), Some("root"));
}

#[test]
fn test_precedence_file_over_classpath() {
    let dir = tree(&[
        ("resources/app.properties", "a=classpath\nb=classpath"),
        ("app.properties", "a=file"),
    ]);
    let mut env = StandardEnvironment::new();

    run(dir.path(), &mut env).unwrap();

    assert_eq!(value(&env, "a").as_deref(), Some("file"));
    assert_eq!(value(&env, "b").as_deref(), Some("classpath"));
}

#[test]
#[cfg(feature = "yaml")]
fn test_precedence_properties_over_yaml() {
    let dir = tree(&[("app.yml", "a: yaml\nb: yaml"), ("app.properties", "a=properties")]);
    let mut env = StandardEnvironment::new();

    run(dir.path(), &mut env).unwrap();

    assert_eq!(value(&env, "a").as_deref(), Some("properties"));
    assert_eq!(value(&env, "b").as_deref(), Some("yaml"));
}

#[test]
fn test_precedence_later_document_wins() {
    let dir = tree(&[("app.properties", "a=first\nb=first\n#---\na=second")]);
    let mut env = StandardEnvironment::new();

    run(dir.path(), &mut env).unwrap();

    assert_eq!(value(&env, "a").as_deref(), Some("second"));
    assert_eq!(value(&env, "b").as_deref(), Some("first"));
}

#[test]
fn test_precedence_import_over_importer() {
    let dir = tree(&[
        ("app.properties", "a=importer\nb=importer\napp.config.import=file:./extra.properties"),
        ("extra.properties", "a=imported"),
    ]);
    let mut env = StandardEnvironment::new();

    run(dir.path(), &mut env).unwrap();

    assert_eq!(value(&env, "a").as_deref(), Some("imported"));
    assert_eq!(value(&env, "b").as_deref(), Some("importer"));
}

#[test]
fn test_precedence_additional_location_over_defaults() {
    let dir = tree(&[
        ("app.properties", "a=default\nb=default"),
        ("more/app.properties", "a=additional"),
    ]);
    let mut env = StandardEnvironment::new()
        .with_source(map("args", &[("app.config.additional-location", "optional:file:./more/")]));

    run(dir.path(), &mut env).unwrap();

    assert_eq!(value(&env, "a").as_deref(), Some("additional"));
    assert_eq!(value(&env, "b").as_deref(), Some("default"));
}

#[test]
fn test_precedence_location_replaces_defaults() {
    let dir = tree(&[
        ("app.properties", "a=default\nb=default"),
        ("custom/app.properties", "a=custom"),
    ]);
    let mut env = StandardEnvironment::new().with_source(map("args", &[("app.config.location", "file:./custom/")]));

    run(dir.path(), &mut env).unwrap();

    assert_eq!(value(&env, "a").as_deref(), Some("custom"));
    assert!(value(&env, "b").is_none());
}

#[test]
fn test_precedence_default_properties_last() {
    let dir = tree(&[("app.properties", "a=file")]);
    let mut env = StandardEnvironment::new()
        .with_source(map(DEFAULT_PROPERTIES, &[("a", "default"), ("z", "default")]))
        .with_source(map("args", &[("y", "args")]));

    run(dir.path(), &mut env).unwrap();

    assert_eq!(value(&env, "a").as_deref(), Some("file"));
    assert_eq!(value(&env, "y").as_deref(), Some("args"));
    assert_eq!(value(&env, "z").as_deref(), Some("default"));
    let names = env.source_names();
    assert_eq!(names.first().map(String::as_str), Some("args"));
    assert_eq!(names.last().map(String::as_str), Some(DEFAULT_PROPERTIES));
}
