//! CatalogOptions and SamplerOptions tests.

use std::time::Duration;

use framegrid::{
    CatalogOptions, OutputEncoding, SamplerOptions,
    configuration::{DEFAULT_JPEG_QUALITY, DEFAULT_PREVIEW_SUFFIX},
};

// ── SamplerOptions ─────────────────────────────────────────────────

#[test]
fn sampler_defaults() {
    let options = SamplerOptions::default();
    assert_eq!(options.scale_factor(), 0.7);
    assert_eq!(options.head_tail_percent(), 5);
    assert_eq!(options, SamplerOptions::new());
}

#[test]
fn sampler_builder() {
    let options = SamplerOptions::new()
        .with_scale_factor(0.25)
        .with_head_tail_percent(10);
    assert_eq!(options.scale_factor(), 0.25);
    assert_eq!(options.head_tail_percent(), 10);
}

#[test]
fn sampler_rejects_infinite_scale() {
    let options = SamplerOptions::new()
        .with_scale_factor(0.5)
        .with_scale_factor(f64::INFINITY);
    assert_eq!(options.scale_factor(), 0.5);
}

#[test]
fn sampler_clamps_half_or_more_trim() {
    assert_eq!(
        SamplerOptions::new()
            .with_head_tail_percent(50)
            .head_tail_percent(),
        49
    );
}

// ── CatalogOptions ─────────────────────────────────────────────────

#[test]
fn catalog_defaults() {
    let options = CatalogOptions::new();
    assert_eq!(options.sample_count(), 16);
    assert_eq!(options.columns(), 4);
    assert_eq!(options.output_encoding(), OutputEncoding::Document);

    let debug = format!("{options:?}");
    assert!(debug.contains(&format!("jpeg_quality: {DEFAULT_JPEG_QUALITY}")));
    assert!(debug.contains(&format!("preview_suffix: \"{DEFAULT_PREVIEW_SUFFIX}\"")));
    assert!(debug.contains("timeout: None"));
    assert!(debug.contains("has_cancellation: false"));
}

#[test]
fn catalog_builder() {
    let options = CatalogOptions::new()
        .with_sample_count(9)
        .with_columns(3)
        .with_sampler(SamplerOptions::new().with_scale_factor(0.5))
        .with_output_encoding(OutputEncoding::DoubleEncoded)
        .with_timeout(Duration::from_secs(30))
        .with_cancellation(framegrid::CancellationToken::new());

    assert_eq!(options.sample_count(), 9);
    assert_eq!(options.columns(), 3);
    assert_eq!(options.sampler().scale_factor(), 0.5);
    assert_eq!(options.output_encoding(), OutputEncoding::DoubleEncoded);

    let debug = format!("{options:?}");
    assert!(debug.contains("timeout: Some(30s)"));
    assert!(debug.contains("has_cancellation: true"));
}

#[test]
fn jpeg_quality_is_clamped() {
    let debug = format!("{:?}", CatalogOptions::new().with_jpeg_quality(250));
    assert!(debug.contains("jpeg_quality: 100"));
}
