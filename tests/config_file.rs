mod common;

use common::*;
use pagefinder::ScanError;
use tempfile::TempDir;

#[test]
fn config_file_overrides_defaults() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("scan.json");
    std::fs::write(&path, r#"{ "min_contour_area": 5000.0, "max_width": 240 }"#)?;

    let config = PipelineConfig::from_json_file(&path)?;
    assert_eq!(config.min_contour_area, 5000.0);
    assert_eq!(config.max_width, 240);
    assert_eq!(config.max_height, 640);

    let detection = Pipeline::new(config).detect(&small_card_photo())?;
    assert_eq!(detection.diagnostics().resized.width(), 240);
    assert!(detection.quad().is_none());
    Ok(())
}

#[test]
fn malformed_config_is_a_parse_error() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ max_width: ")?;
    assert!(matches!(
        PipelineConfig::from_json_file(&path),
        Err(ScanError::Config(_))
    ));
    Ok(())
}

#[test]
fn invalid_values_are_rejected_on_load() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("even.json");
    std::fs::write(&path, r#"{ "blur_kernel": 6 }"#)?;
    assert!(matches!(
        PipelineConfig::from_json_file(&path),
        Err(ScanError::InvalidConfig(_))
    ));
    Ok(())
}
