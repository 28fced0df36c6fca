use std::error::Error;
use std::fs;

use relaywatch::config::{load_and_validate, load_from_path};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn loads_a_full_config_with_defaults() -> TestResult {
    let dir = tempfile::tempdir()?;
    let watch_root = dir.path().join("work");
    fs::create_dir(&watch_root)?;

    let config_path = dir.path().join("Relaywatch.toml");
    fs::write(
        &config_path,
        format!(
            r#"
[paths]
watch_root = {watch:?}
integration_root = "/srv/integration"
publish_root = "/srv/publish"

[watch]
exclusion_marker = "_postfix"
"#,
            watch = watch_root
        ),
    )?;

    let cfg = load_and_validate(&config_path)?;
    assert_eq!(cfg.watch.debounce_window_ms, 100);
    assert_eq!(cfg.watch.effective_max_conversions(), 4);
    assert_eq!(cfg.watch.exclusion_marker.as_deref(), Some("_postfix"));
    assert!(!cfg.svn.enabled);

    Ok(())
}

#[test]
fn accepts_legacy_key_aliases() -> TestResult {
    let dir = tempfile::tempdir()?;
    let watch_root = dir.path().join("work");
    fs::create_dir(&watch_root)?;

    let config_path = dir.path().join("legacy.toml");
    fs::write(
        &config_path,
        format!(
            r#"
[paths]
FolderPath = {watch:?}
IntegrationSvnPath = "/srv/integration"
SoundDesignerSvnPath = "/srv/publish"

[watch]
ExclusionMarker = "_postfix"
"#,
            watch = watch_root
        ),
    )?;

    let cfg = load_from_path(&config_path)?;
    assert_eq!(cfg.paths.watch_root, watch_root);
    assert_eq!(cfg.paths.integration_root.to_str(), Some("/srv/integration"));
    assert_eq!(cfg.watch.exclusion_marker.as_deref(), Some("_postfix"));

    Ok(())
}

#[test]
fn missing_watch_root_is_fatal() -> TestResult {
    let dir = tempfile::tempdir()?;
    let config_path = dir.path().join("bad.toml");
    fs::write(
        &config_path,
        r#"
[paths]
watch_root = "/definitely/not/a/real/root"
integration_root = "/srv/integration"
publish_root = "/srv/publish"
"#,
    )?;

    assert!(load_and_validate(&config_path).is_err());

    Ok(())
}

#[test]
fn zero_debounce_window_is_rejected() -> TestResult {
    let dir = tempfile::tempdir()?;
    let watch_root = dir.path().join("work");
    fs::create_dir(&watch_root)?;

    let config_path = dir.path().join("bad.toml");
    fs::write(
        &config_path,
        format!(
            r#"
[paths]
watch_root = {watch:?}
integration_root = "/srv/integration"
publish_root = "/srv/publish"

[watch]
debounce_window_ms = 0
"#,
            watch = watch_root
        ),
    )?;

    assert!(load_and_validate(&config_path).is_err());

    Ok(())
}
