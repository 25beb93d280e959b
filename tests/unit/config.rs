use super::*;

#[test]
fn empty_json_yields_defaults() {
    let cfg = RenderConfig::from_json_str("{}").unwrap();
    assert_eq!(cfg, RenderConfig::default());
    assert_eq!(cfg.theme.title_size_px, 50.0);
    assert_eq!(cfg.fetch.timeout_ms, 5_000);
    assert!(!cfg.fetch.allow_file_urls);
    assert!(cfg.brand.is_none());
}

#[test]
fn partial_theme_overrides_keep_other_defaults() {
    let cfg = RenderConfig::from_json_str(
        r##"{
            "brand": "Acme",
            "theme": { "background": { "flat": "#101010" }, "title": [1.0, 1.0, 1.0] },
            "fetch": { "max_bytes": 2048 }
        }"##,
    )
    .unwrap();

    assert_eq!(cfg.brand.as_deref(), Some("Acme"));
    assert_eq!(
        cfg.theme.background,
        BackgroundStyle::Flat(Rgba8::rgb(0x10, 0x10, 0x10))
    );
    assert_eq!(cfg.theme.title, Rgba8::WHITE);
    assert_eq!(cfg.theme.body, Theme::default().body);
    assert_eq!(cfg.fetch.max_bytes, 2048);
    assert_eq!(cfg.fetch.timeout_ms, 5_000);
}

#[test]
fn gradient_background_parses() {
    let cfg = RenderConfig::from_json_str(
        r##"{ "theme": { "background": { "gradient": { "from": "#000000", "to": "#ffffff" } } } }"##,
    )
    .unwrap();
    assert_eq!(
        cfg.theme.background,
        BackgroundStyle::Gradient {
            from: Rgba8::BLACK,
            to: Rgba8::WHITE
        }
    );
}

#[test]
fn invalid_values_are_config_errors() {
    for bad in [
        r#"{ "theme": { "title_size_px": 0 } }"#,
        r#"{ "theme": { "line_height_px": -4 } }"#,
        r#"{ "theme": { "font_family": " " } }"#,
        r#"{ "fetch": { "max_bytes": 0 } }"#,
        r#"{ "fetch": { "timeout_ms": 0 } }"#,
        r#"{ "fetch": { "connect_timeout_ms": 0 } }"#,
        r##"{ "theme": { "title": "#zz" } }"##,
    ] {
        let err = RenderConfig::from_json_str(bad).unwrap_err();
        assert!(matches!(err, OgError::Config(_)), "{bad}: {err}");
    }
}

#[test]
fn from_path_reads_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ogcard.json");
    std::fs::write(&path, r#"{ "brand": "Your Brand" }"#).unwrap();
    let cfg = RenderConfig::from_path(&path).unwrap();
    assert_eq!(cfg.brand.as_deref(), Some("Your Brand"));

    assert!(RenderConfig::from_path(&dir.path().join("missing.json")).is_err());
}

#[test]
fn theme_palette_mirrors_theme_colors() {
    let theme = Theme::default();
    let p = theme.palette();
    assert_eq!(p.title, theme.title);
    assert_eq!(p.panel, theme.panel);
}
