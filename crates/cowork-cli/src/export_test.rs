use cowork_core::{DetailRecord, ListingEntry};
use serde_json::json;

use super::*;

fn record(name: &str, link: Option<&str>) -> CombinedRecord {
    let entry = ListingEntry::new(Some(name.to_string()), link.map(String::from));
    let mut details = DetailRecord::default();
    if link.is_some() {
        details.phone = "930 000 000".to_string();
    }
    CombinedRecord::new(entry, details)
}

#[test]
fn empty_rows_write_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = XlsxSink::new(dir.path());

    assert!(!sink.save(&[], "checkpoint_10.xlsx"));
    assert!(!dir.path().join("checkpoint_10.xlsx").exists());
}

#[test]
fn saves_workbook_into_output_dir() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = XlsxSink::new(dir.path().join("out"));
    let rows = vec![
        record("Hub Eixample", Some("https://coworkingspain.es/espacio/hub")),
        record("Sin enlace", None),
    ];

    assert!(sink.save(&rows, "coworking_barcelona.xlsx"));

    let path = dir.path().join("out").join("coworking_barcelona.xlsx");
    let metadata = std::fs::metadata(&path).unwrap();
    assert!(metadata.len() > 0);
}

#[test]
fn saving_again_overwrites_previous_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = XlsxSink::new(dir.path());
    let one = vec![record("A", None)];
    let many: Vec<_> = (0..50).map(|i| record(&format!("Space {i}"), None)).collect();

    assert!(sink.save(&one, "final.xlsx"));
    assert!(sink.save(&many, "final.xlsx"));

    let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn unwritable_directory_returns_false() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"file").unwrap();
    let mut sink = XlsxSink::new(&blocker);

    assert!(!sink.save(&[record("A", None)], "final.xlsx"));
}

#[test]
fn header_follows_record_column_order() {
    let table = tabulate(&[record("A", Some("https://a.example"))]).unwrap();

    assert_eq!(
        table.header,
        vec![
            "Name",
            "Link",
            "Description",
            "Website",
            "Phone",
            "Address",
            "Services_List",
            "Detailed_Prices",
            "Surface_Area",
            "Private_Offices",
            "Meeting_Rooms_Count",
            "Capacity",
            "Image_URL",
        ]
    );
    assert_eq!(table.rows[0][0], "A");
    assert_eq!(table.rows[0][4], "930 000 000");
}

#[test]
fn header_is_union_of_keys_with_missing_cells_filled() {
    let rows = vec![
        json!({"Name": "A", "Phone": "1"}),
        json!({"Name": "B", "Capacity": "20"}),
    ];

    let table = tabulate(&rows).unwrap();

    assert_eq!(table.header, vec!["Name", "Phone", "Capacity"]);
    assert_eq!(table.rows[0], vec!["A", "1", "N/A"]);
    assert_eq!(table.rows[1], vec!["B", "N/A", "20"]);
}

#[test]
fn non_string_values_are_stringified() {
    let table = tabulate(&[json!({"Count": 3, "Missing": null})]).unwrap();

    assert_eq!(table.rows[0], vec!["3", "N/A"]);
}

#[test]
fn scalar_rows_are_rejected() {
    let err = tabulate(&[json!("just a string")]).unwrap_err();

    assert!(matches!(err, ExportError::NotARecord { index: 0 }));
}

#[test]
fn overlong_cells_are_clamped() {
    let long = "é".repeat(MAX_CELL_CHARS + 10);

    assert_eq!(clamp_cell(&long).chars().count(), MAX_CELL_CHARS);
    assert_eq!(clamp_cell("short"), "short");
}

#[test]
fn checkpoint_names_carry_the_processed_count() {
    assert_eq!(checkpoint_file_name(10), "checkpoint_10.xlsx");
    assert_eq!(checkpoint_file_name(20), "checkpoint_20.xlsx");
}
