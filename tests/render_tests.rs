// tests/render_tests.rs
use burn_severity::render::colormap::{evaluate, percentile_sorted};
use burn_severity::render::{
    render_classes, render_continuous, AnnotationEvent, AnnotationStore, ColorRamp, DisplayRange,
    LayerStyle, Legend, MapDocument, MapView, Rgb, SEVERITY_PALETTE,
};
use gdal::raster::Buffer;
use std::fs;
use std::thread;
use tempfile::TempDir;

#[test]
fn test_percentiles_interpolate_linearly() {
    let sorted: Vec<f64> = (0..=10).map(|v| v as f64).collect();
    assert_eq!(percentile_sorted(&sorted, 0.0), 0.0);
    assert_eq!(percentile_sorted(&sorted, 100.0), 10.0);
    assert!((percentile_sorted(&sorted, 2.0) - 0.2).abs() < 1e-12);
    assert!((percentile_sorted(&sorted, 98.0) - 9.8).abs() < 1e-12);
    assert!(percentile_sorted(&[], 50.0).is_nan());
}

#[test]
fn test_display_range_ignores_missing() {
    let mut data: Vec<f32> = (0..=100).map(|v| v as f32 / 100.0).collect();
    data.extend([f32::NAN, f32::NAN]);

    let range = DisplayRange::from_percentiles(&data, 2.0, 98.0).unwrap();
    assert!((range.min - 0.02).abs() < 1e-6);
    assert!((range.max - 0.98).abs() < 1e-6);

    assert!(DisplayRange::from_percentiles(&[f32::NAN], 2.0, 98.0).is_none());
}

#[test]
fn test_ramp_endpoints() {
    assert_eq!(evaluate(ColorRamp::RdYlGnReversed, 0.0), Rgb::new(0, 104, 55));
    assert_eq!(evaluate(ColorRamp::RdYlGnReversed, 1.0), Rgb::new(165, 0, 38));
    assert_eq!(evaluate(ColorRamp::RdYlGnReversed, 1.5), Rgb::new(165, 0, 38));
    assert_eq!(evaluate(ColorRamp::Grayscale, 0.5), Rgb::new(128, 128, 128));
    assert_eq!(ColorRamp::default().name(), "RdYlGn_r");
}

#[test]
fn test_render_continuous_masks_missing() {
    let grid = Buffer::new((3, 1), vec![-1.0f32, f32::NAN, 1.0]);
    let range = DisplayRange { min: -1.0, max: 1.0 };

    let rgba = render_continuous(&grid, ColorRamp::Grayscale, range);
    assert_eq!(rgba, vec![0, 0, 0, 255, 0, 0, 0, 0, 255, 255, 255, 255]);
}

#[test]
fn test_render_classes_uses_palette() {
    let classes = Buffer::new((3, 1), vec![3u8, 8, 200]);
    let rgba = render_classes(&classes, &SEVERITY_PALETTE);

    let low = SEVERITY_PALETTE[3];
    assert_eq!(&rgba[0..4], &[low.r, low.g, low.b, 255]);
    assert_eq!(&rgba[4..8], &[255, 255, 255, 255]);
    assert_eq!(&rgba[8..12], &[0, 0, 0, 0]);
}

#[test]
fn test_severity_legend_covers_every_class() {
    let legend = Legend::severity();
    assert_eq!(legend.labels.len(), 9);
    assert_eq!(legend.colors.len(), 9);
    assert_eq!(legend.labels[0], "Below -0.251");
    assert_eq!(legend.labels[8], "No Data");
    // Class 0 and the no-data class share the background color
    assert_eq!(legend.colors[0], legend.colors[8]);
    assert_eq!(legend.colors[0], "#ffffff");
    assert!(legend.to_text().starts_with("dNBR Burn Severity"));
}

#[test]
fn test_annotation_events_apply_in_order() {
    let store = AnnotationStore::new();
    let (tx, rx) = AnnotationStore::channel();

    tx.send(AnnotationEvent::Add {
        lon: -120.5,
        lat: 38.2,
        note: String::new(),
    })
    .unwrap();
    tx.send(AnnotationEvent::Add {
        lon: -120.4,
        lat: 38.3,
        note: "spot fire".to_string(),
    })
    .unwrap();
    tx.send(AnnotationEvent::SetNote {
        id: 0,
        note: "unburned island".to_string(),
    })
    .unwrap();
    tx.send(AnnotationEvent::Remove { id: 1 }).unwrap();
    tx.send(AnnotationEvent::Remove { id: 42 }).unwrap();

    assert_eq!(store.drain(&rx), 5);
    let annotations = store.snapshot();
    assert_eq!(annotations.len(), 1);
    assert_eq!(annotations[0].id, 0);
    assert_eq!(annotations[0].note, "unburned island");

    assert_eq!(store.apply(AnnotationEvent::SetNote { id: 7, note: "x".into() }), None);
}

#[test]
fn test_annotation_listen_until_senders_drop() {
    let store = AnnotationStore::new();
    let (tx, rx) = AnnotationStore::channel();

    let widget = thread::spawn(move || {
        for i in 0..3 {
            tx.send(AnnotationEvent::Add {
                lon: i as f64,
                lat: 0.0,
                note: format!("point {}", i),
            })
            .unwrap();
        }
    });

    assert_eq!(store.listen(rx), 3);
    widget.join().unwrap();
    assert_eq!(store.len(), 3);
}

#[test]
fn test_annotations_as_geojson() {
    let store = AnnotationStore::new();
    store.apply(AnnotationEvent::Add {
        lon: 10.0,
        lat: 45.0,
        note: "ridge".to_string(),
    });

    let geojson = store.to_geojson();
    assert_eq!(geojson["type"], "FeatureCollection");
    assert_eq!(geojson["features"][0]["geometry"]["coordinates"][0], 10.0);
    assert_eq!(geojson["features"][0]["geometry"]["coordinates"][1], 45.0);
    assert_eq!(geojson["features"][0]["properties"]["note"], "ridge");
}

#[test]
fn test_map_document_layers_and_legend() {
    let mut document = MapDocument::new(Some(MapView {
        center: [38.2, -120.5],
        zoom: 11,
    }));
    document.add_continuous(
        "dNBR",
        "dnbr.tif".as_ref(),
        ColorRamp::RdYlGnReversed,
        DisplayRange { min: -0.2, max: 0.9 },
    );
    document
        .add_classified("Burn severity", "classes.tif".as_ref(), Legend::severity(), 9)
        .unwrap();

    let value = serde_json::to_value(&document).unwrap();
    assert_eq!(value["view"]["zoom"], 11);
    assert_eq!(value["layers"][0]["kind"], "continuous");
    assert_eq!(value["layers"][0]["colormap"], "RdYlGn_r");
    assert_eq!(value["layers"][1]["kind"], "classified");
    assert_eq!(value["legend"]["labels"].as_array().unwrap().len(), 9);

    let parsed: MapDocument = serde_json::from_value(value).unwrap();
    assert!(matches!(parsed.layers[1].style, LayerStyle::Classified { .. }));
}

#[test]
fn test_map_document_rejects_uneven_legend() {
    let mut legend = Legend::severity();
    legend.colors.pop();

    let mut document = MapDocument::new(None);
    assert!(document
        .add_classified("Burn severity", "classes.tif".as_ref(), legend, 9)
        .is_err());
}

#[test]
fn test_map_document_rejects_legend_for_other_class_count() {
    let mut document = MapDocument::new(None);
    let err = document
        .add_classified("Burn severity", "classes.tif".as_ref(), Legend::severity(), 3)
        .err()
        .unwrap();
    assert!(err.to_string().contains("3 class codes"));
    assert!(document.layers.is_empty());
    assert!(document.legend.is_none());
}

#[test]
fn test_annotations_replayed_from_event_log() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("events.json");
    fs::write(
        &path,
        r#"[
            {"event": "add", "lon": -120.5, "lat": 38.2, "note": ""},
            {"event": "set_note", "id": 0, "note": "unburned island"},
            {"event": "add", "lon": -120.4, "lat": 38.3, "note": "dozer line"}
        ]"#,
    )
    .unwrap();

    let store = AnnotationStore::from_event_log(&path).unwrap();
    let annotations = store.snapshot();
    assert_eq!(annotations.len(), 2);
    assert_eq!(annotations[0].note, "unburned island");
    assert_eq!(annotations[1].id, 1);

    let mut document = MapDocument::new(None);
    document.attach_annotations(&store);
    assert_eq!(document.annotations["features"].as_array().unwrap().len(), 2);

    fs::write(&path, r#"[{"event": "move", "id": 0}]"#).unwrap();
    assert!(AnnotationStore::from_event_log(&path).is_err());
}
