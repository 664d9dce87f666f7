use std::fs;

use ascii_folio::render::Activation;
use ascii_folio::{AppConfig, ConfigError, Orientation, RendererConfig};

#[test]
fn missing_file_means_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, AppConfig::default());
    assert!(!config.overlay.enabled);
    assert_eq!(config.renderer("avatar"), Some(RendererConfig::avatar()));
}

#[test]
fn profiles_and_overlay_load_from_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ascii-folio.toml");
    fs::write(
        &path,
        r##"
[renderers.hero]
cell_size = 4
width = 320
height = 160
orientation = "inverted"
tint = "#7DD3FC"
alpha_threshold = 64
activation = "viewport-lazy"
downsample = 0.5

[renderers.hero.placeholders]
load_failure = "(missing)"

[overlay]
enabled = true
pixel_size = 12
"##,
    )
    .unwrap();

    let config = AppConfig::load(&path).unwrap();
    let hero = config.renderer("hero").unwrap();
    assert_eq!(hero.cell_size, 4);
    assert_eq!(hero.orientation, Orientation::Inverted);
    assert_eq!(hero.tint_rgb().unwrap(), Some([0x7d, 0xd3, 0xfc]));
    assert_eq!(hero.activation, Activation::ViewportLazy);
    assert_eq!(hero.placeholders.load_failure, "(missing)");
    assert_eq!(hero.placeholders.pixel_access, "[ICON]");
    assert!(hero.sampler().is_ok());

    assert!(config.overlay.enabled);
    assert_eq!(config.overlay.pixel_size, 12);
    assert_eq!(config.overlay.mix, 0.7);
}

#[test]
fn malformed_file_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[renderers.hero\ncell_size = ").unwrap();

    let err = AppConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("broken.toml"));
}

#[test]
fn invalid_sampler_values_surface_on_build() {
    let config = RendererConfig { downsample: 2.0, ..RendererConfig::default() };
    assert!(config.sampler().is_err());
}
