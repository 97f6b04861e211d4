//! Integration tests for reading SOFA JSON dumps from disk.

mod common;

use common::{fixture, fixture_json, write_json, M};
use sofa::container::{Backend, FileOpener, JsonContainer, OpenOptions, Opener};
use sofa::{Error, Sofa};

#[test]
fn test_open_json() {
    let file = write_json(&fixture_json(), false);
    let from_file = Sofa::open(file.path()).expect("Failed to open JSON dump");
    let from_memory = Sofa::from_container(&fixture()).unwrap();
    assert_eq!(from_file, from_memory);
}

#[test]
fn test_open_gzip_json() {
    let file = write_json(&fixture_json(), true);
    let sofa = Sofa::open(file.path()).expect("Failed to open gzip JSON dump");
    assert_eq!(sofa.source().len(), M);
}

#[test]
fn test_open_options() {
    let file = write_json(&fixture_json(), false);
    for use_mmap in [true, false] {
        let options = OpenOptions::new().backend(Backend::Json).use_mmap(use_mmap);
        let sofa = Sofa::open_with(file.path(), &options).unwrap();
        assert_eq!(sofa.data_type(), "FIR");
    }
}

#[test]
fn test_open_missing_file() {
    let err = Sofa::open("/no/such/dir/subject.sofa").unwrap_err();
    assert!(matches!(err, Error::FileNotFound(_)));
}

#[test]
fn test_open_empty_path() {
    assert!(matches!(Sofa::open(""), Err(Error::InvalidInput(_))));
}

#[test]
fn test_missing_variable_in_file() {
    let mut doc = fixture_json();
    doc["variables"].as_object_mut().unwrap().remove("EmitterPosition");
    let file = write_json(&doc, false);
    let err = Sofa::open(file.path()).unwrap_err();
    assert_eq!(err.to_string(), "Required field missing: /EmitterPosition");
}

#[test]
fn test_unsupported_data_type_in_file() {
    let mut doc = fixture_json();
    doc["attributes"]["DataType"] = "TF".into();
    let file = write_json(&doc, false);
    assert!(matches!(Sofa::open(file.path()), Err(Error::UnsupportedDataType(t)) if t == "TF"));
}

#[test]
fn test_corrupt_file_is_io_class() {
    let file = write_json(&serde_json::json!("not an object"), false);
    let err = Sofa::open(file.path()).unwrap_err();
    assert!(matches!(err, Error::Json(_)));
    assert!(!err.is_missing());
}

#[test]
fn test_caller_opened_container_reused() {
    let file = write_json(&fixture_json(), false);
    let container = JsonContainer::open(file.path()).unwrap();
    let first = Sofa::from_container(&container).unwrap();
    let second = Sofa::from_container(&container).unwrap();
    assert_eq!(first, second);

    let boxed = FileOpener::default().open(file.path()).unwrap();
    assert!(boxed.is_open());
    assert_eq!(Sofa::from_container(boxed.as_ref()).unwrap(), first);
}
