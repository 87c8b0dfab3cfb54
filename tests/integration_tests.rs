// Integration tests for provsheet
//
// Drive the whole pipeline the way the provisioning workflow does: an
// export file on disk in, a normalized JSON document out, re-validated
// after a file round trip.

use std::fs;

use chrono::{TimeZone, Utc};
use tempfile::tempdir;

use provsheet::{
    extract_document, ExtractOptions, HeaderShape, NormalizedDocument, ShapeSelection,
};

/// A realistic matrix export: three header rows, marker-prefixed user rows,
/// a repeated user, an unrecognized summary row, quoted cells.
const FLEET_EXPORT: &str = "\
Username,Password,SSH Key,Access,,
,,,Frontend,Backend,Database
,,,HOST_10.0.0.5,HOST_10.0.0.7,HOST_10.0.1.9
\"User dave\",Hunter2,ssh-ed25519 AAAC3 dave@laptop,TRUE,true,
\"User erin\",Passw0rd,,yes,,1
\"User dave\",changed-later,changed-later,,,TRUE
Totals,,,2,1,2
";

fn pinned_options() -> ExtractOptions {
    ExtractOptions {
        generated_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
        ..Default::default()
    }
}

#[test]
fn test_fleet_extraction_end_to_end() {
    let extraction = extract_document(FLEET_EXPORT, &pinned_options()).unwrap();
    let doc = &extraction.document;

    assert_eq!(doc.metadata.header_shape, HeaderShape::Matrix);
    assert_eq!(doc.metadata.total_rows, 4);
    assert_eq!(doc.metadata.valid_rows, 3);
    assert_eq!(doc.metadata.skipped_rows, 1);

    // First-seen user order, first-row-wins credentials.
    let names: Vec<&str> = doc.users.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, vec!["dave", "erin"]);
    assert_eq!(doc.users[0].password, "Hunter2");
    assert_eq!(doc.users[0].ssh_key, "ssh-ed25519 AAAC3 dave@laptop");

    // dave's second row contributed only its host grant.
    assert_eq!(doc.users[0].hosts, vec!["10.0.0.5", "10.0.0.7", "10.0.1.9"]);
    assert_eq!(doc.users[0].host_count, 3);
    assert_eq!(doc.users[1].hosts, vec!["10.0.0.5", "10.0.1.9"]);

    // The index lists users in first-seen order and keys in user-walk order.
    assert_eq!(
        doc.resource_index.users_for("10.0.0.5"),
        Some(&["dave".to_string(), "erin".to_string()][..])
    );
    let addresses: Vec<&str> = doc
        .resource_index
        .entries()
        .iter()
        .map(|e| e.address.as_str())
        .collect();
    assert_eq!(addresses, vec!["10.0.0.5", "10.0.0.7", "10.0.1.9"]);
}

#[test]
fn test_referential_symmetry_holds() {
    let extraction = extract_document(FLEET_EXPORT, &pinned_options()).unwrap();
    let doc = &extraction.document;

    for user in &doc.users {
        for host in &user.hosts {
            let listed = doc
                .resource_index
                .users_for(host)
                .map(|users| users.contains(&user.username))
                .unwrap_or(false);
            assert!(listed, "index must list {} for {}", user.username, host);
        }
    }
    for entry in doc.resource_index.entries() {
        for username in &entry.users {
            let user = doc.users.iter().find(|u| &u.username == username).unwrap();
            assert!(
                user.hosts.contains(&entry.address),
                "{} must be assigned {}",
                username,
                entry.address
            );
        }
    }
}

#[test]
fn test_document_survives_file_roundtrip() {
    let dir = tempdir().unwrap();
    let export_path = dir.path().join("export.csv");
    let document_path = dir.path().join("creds.json");

    fs::write(&export_path, FLEET_EXPORT).unwrap();
    let raw = fs::read_to_string(&export_path).unwrap();
    let extraction = extract_document(&raw, &pinned_options()).unwrap();

    fs::write(
        &document_path,
        extraction.document.to_json(true).unwrap(),
    )
    .unwrap();

    let loaded =
        NormalizedDocument::from_json(&fs::read_to_string(&document_path).unwrap()).unwrap();
    assert_eq!(loaded, extraction.document);
    loaded.validate().unwrap();
}

#[test]
fn test_output_bytes_are_stable() {
    let options = pinned_options();
    let first = extract_document(FLEET_EXPORT, &options).unwrap();
    let second = extract_document(FLEET_EXPORT, &options).unwrap();

    assert_eq!(
        first.document.to_json(false).unwrap(),
        second.document.to_json(false).unwrap()
    );
    assert_eq!(
        first.document.to_json(true).unwrap(),
        second.document.to_json(true).unwrap()
    );
}

#[test]
fn test_legacy_export_has_empty_index() {
    let export = "Username,Password,SSH Key\nalice,Secret1,keyA\nbob,Secret2,\n";
    let extraction = extract_document(export, &pinned_options()).unwrap();
    let doc = &extraction.document;

    assert_eq!(doc.metadata.header_shape, HeaderShape::Legacy);
    assert_eq!(doc.users.len(), 2);
    assert!(doc.resource_index.is_empty());
    assert!(doc.metadata.column_detection.host_columns.is_empty());
    assert!(doc.users.iter().all(|u| u.hosts.is_empty()));
}

#[test]
fn test_quoted_cells_end_to_end() {
    let export = "\
Username,Password,SSH Key,Access
,,,Frontend
,,,HOST_10.0.0.5
\"User gina\",\"pw,with,commas\",\"ssh-rsa AAA, gina@host\",TRUE
";
    let extraction = extract_document(export, &pinned_options()).unwrap();
    let user = &extraction.document.users[0];

    assert_eq!(user.username, "gina");
    assert_eq!(user.password, "pw,with,commas");
    assert_eq!(user.ssh_key, "ssh-rsa AAA, gina@host");
    assert_eq!(user.hosts, vec!["10.0.0.5"]);
}

#[test]
fn test_forced_shape_overrides_detection() {
    // Force legacy over a matrix-looking file: the host row is just data.
    let options = ExtractOptions {
        shape: ShapeSelection::Legacy,
        ..pinned_options()
    };
    let export = "\
Username,Password,SSH Key
alice,Secret1,keyA
henry,Secret9,HOST_10.0.0.5
";
    let extraction = extract_document(export, &options).unwrap();
    assert_eq!(extraction.document.metadata.header_shape, HeaderShape::Legacy);
    assert_eq!(extraction.document.users.len(), 2);
}

#[test]
fn test_hand_edited_document_fails_validation() {
    let extraction = extract_document(FLEET_EXPORT, &pinned_options()).unwrap();
    let json = extraction.document.to_json(false).unwrap();

    // Sneak an unassigned user into the index.
    let tampered = json.replace("[\"dave\",\"erin\"]", "[\"dave\",\"erin\",\"mallory\"]");
    assert_ne!(tampered, json);

    let doc = NormalizedDocument::from_json(&tampered).unwrap();
    let err = doc.validate().unwrap_err();
    assert!(err.to_string().contains("mallory"));
}

#[test]
fn test_semicolon_delimited_export() {
    let options = ExtractOptions {
        delimiter: ';',
        ..pinned_options()
    };
    let export = "Username;Password;SSH Key\nalice;Secret1;keyA\n";
    let extraction = extract_document(export, &options).unwrap();
    assert_eq!(extraction.document.users[0].username, "alice");
    assert_eq!(extraction.document.users[0].password, "Secret1");
}
