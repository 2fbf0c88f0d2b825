//! File-backed extraction through the registry, the way the mapping engine
//! drives it: source options name the connector, the connector reads a path.

use dpp_ingest::ConnectorRegistry;
use dpp_model::{ConnectorError, Source, SourceOptions};
use serde_json::json;
use std::fs;

#[test]
fn isa95_file_to_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lots.xml");
    fs::write(
        &path,
        r#"<MaterialLotInformation xmlns="http://www.mesa.org/xml/B2MML">
  <MaterialLot>
    <ID>BAT-001</ID>
    <Status>Released</Status>
    <Property ID="capacity_kwh">
      <Value>101.5</Value>
    </Property>
  </MaterialLot>
  <MaterialLot>
    <ID>BAT-002</ID>
    <Status>Hold</Status>
  </MaterialLot>
</MaterialLotInformation>
"#,
    )
    .unwrap();

    let registry = ConnectorRegistry::with_defaults();
    let connector = registry.create(&SourceOptions::new("isa95")).unwrap();
    let records = connector.parse(&Source::path(&path)).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].get("MaterialLot/ID"), Some(&json!("BAT-001")));
    assert_eq!(
        records[0].get("MaterialLot/Property[@ID='capacity_kwh']/Value"),
        Some(&json!("101.5"))
    );
    assert_eq!(records[1].get("MaterialLot/Status"), Some(&json!("Hold")));
}

#[test]
fn csv_file_with_options() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lots.csv");
    fs::write(&path, "exported by MES\nlot_id;capacity\nBAT-001;100\n").unwrap();

    let registry = ConnectorRegistry::with_defaults();
    let options = SourceOptions::new("csv").with_skip_rows(1);
    let connector = registry.create(&options).unwrap();
    let records = connector.parse(&Source::path(&path)).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("lot_id"), Some(&json!("BAT-001")));
    assert_eq!(records[0].get("capacity"), Some(&json!("100")));
}

#[test]
fn missing_file_surfaces_io_context() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.csv");

    let registry = ConnectorRegistry::with_defaults();
    let connector = registry.create(&SourceOptions::new("csv")).unwrap();
    let error = connector.parse(&Source::path(&path)).unwrap_err();

    match error {
        ConnectorError::Read { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("unexpected error: {other}"),
    }
}
