use super::*;

#[test]
fn empty_object_yields_defaults() {
    let s = Settings::from_json_str("{}").unwrap();
    assert_eq!(s, Settings::default());
    assert_eq!(s.poster.columns, 3);
    assert_eq!(s.door_tags.rows, 4);
    assert_eq!(s.threading.chunk_size, 8);
}

#[test]
fn partial_sections_override_only_given_fields() {
    let s = Settings::from_json_str(
        r#"{ "poster": { "columns": 4, "fit": "contain", "paper": "letter" },
             "threading": { "threads": 2 } }"#,
    )
    .unwrap();
    assert_eq!(s.poster.columns, 4);
    assert_eq!(s.poster.rows, 3);
    assert_eq!(s.poster.fit, FitMode::Contain);
    assert_eq!(s.poster.paper, PaperPreset::Letter);
    assert_eq!(s.threading.threads, Some(2));
    assert_eq!(s.threading.chunk_size, 8);
}

#[test]
fn unknown_fields_are_rejected() {
    let err = Settings::from_json_str(r#"{ "poster": { "colums": 4 } }"#).unwrap_err();
    assert!(matches!(err, TileError::Validation(_)));
}

#[test]
fn sanitized_clamps_out_of_range_values() {
    let s = PosterSettings {
        columns: 0,
        rows: 99,
        margin_mm: -3.0,
        overlap_mm: 50.0,
        dpi: 4000,
        ..PosterSettings::default()
    }
    .sanitized();
    assert_eq!((s.columns, s.rows), (1, 20));
    assert_eq!(s.margin_mm, 0.0);
    assert_eq!(s.overlap_mm, 20.0);
    assert_eq!(s.dpi, 600);

    let t = DoorTagSettings {
        label_pt: 200.0,
        gutter_mm: 99.0,
        columns: 40,
        ..DoorTagSettings::default()
    }
    .sanitized();
    assert_eq!(t.label_pt, 48.0);
    assert_eq!(t.gutter_mm, 20.0);
    assert_eq!(t.columns, 12);
}

#[test]
fn to_request_carries_every_field() {
    let s = PosterSettings {
        orientation: Orientation::Landscape,
        trim_marks: false,
        ..PosterSettings::default()
    };
    let req = s.to_request();
    assert_eq!(req.page.width_mm, 297.0);
    assert_eq!(req.grid.columns, 3);
    assert_eq!(req.spacing.gap_mm, 5.0);
    assert!(!req.trim_marks);

    let tags = DoorTagSettings::default().to_request();
    assert_eq!(tags.spacing.gap_mm, 4.0);
    assert!(tags.include_photo);
}

#[test]
fn load_settings_reads_file_and_round_trips() {
    let dir = std::path::PathBuf::from("target").join("unit_config");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("settings.json");
    let mut settings = Settings::default();
    settings.door_tags.include_photo = false;
    std::fs::write(&path, settings.to_json_string().unwrap()).unwrap();

    assert_eq!(load_settings(&path).unwrap(), settings);
    assert!(load_settings(&dir.join("missing.json")).is_err());
}
