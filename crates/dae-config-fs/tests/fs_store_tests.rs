// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
//! Integration tests for the filesystem config store.

use dae_app_core::config::{ConfigError, ConfigService, ConfigStore};
use dae_app_core::config_port::ConfigPort;
use dae_app_core::prefs::EditorPrefs;
use dae_config_fs::FsConfigStore;

#[test]
fn missing_blob_reports_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsConfigStore::with_base(dir.path()).unwrap();
    assert!(matches!(store.load_raw("nothing"), Err(ConfigError::NotFound)));
}

#[test]
fn save_then_load_leaves_no_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsConfigStore::with_base(dir.path().join("nested")).unwrap();
    store.save_raw("blob", b"{\"a\":1}").unwrap();
    assert_eq!(store.load_raw("blob").unwrap(), b"{\"a\":1}");
    let names: Vec<_> = std::fs::read_dir(store.base())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(names, ["blob.json"]);
}

#[test]
fn keys_cannot_escape_the_base_dir() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsConfigStore::with_base(dir.path()).unwrap();
    let err = store.save_raw("../outside", b"x").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidKey(_)));
}

#[test]
fn prefs_survive_a_new_store_instance() {
    let dir = tempfile::tempdir().unwrap();
    let mut prefs = EditorPrefs::default();
    prefs.scene.last_model = Some("models/duck.dae".into());
    prefs.hud.wireframe = true;

    ConfigService::new(FsConfigStore::with_base(dir.path()).unwrap()).save_prefs(&prefs);
    let loaded = ConfigService::new(FsConfigStore::with_base(dir.path()).unwrap())
        .load_prefs()
        .unwrap();
    assert_eq!(loaded, prefs);
}
