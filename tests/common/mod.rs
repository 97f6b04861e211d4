//! Shared fixtures: a well-formed SimpleFreeFieldHRIR file, in memory and
//! as a JSON dump.

#![allow(dead_code)]

use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::{json, Value};
use sofa::container::{Array, Dataset, MemoryContainer, ROOT};
use sofa::schema::{Role, REQUIRED_ATTRIBUTES};
use tempfile::NamedTempFile;

pub const M: usize = 4;
pub const R: usize = 2;
pub const N: usize = 8;

fn required_value(key: &str) -> &'static str {
    match key {
        "Conventions" => "SOFA",
        "Version" => "2.1",
        "SOFAConventions" => "SimpleFreeFieldHRIR",
        "SOFAConventionsVersion" => "1.0",
        "DataType" => "FIR",
        "RoomType" => "free field",
        "Title" => "Fixture HRIR",
        "DateCreated" => "2024-01-01 00:00:00",
        "DateModified" => "2024-01-02 00:00:00",
        "APIName" => "sofa-rs",
        "APIVersion" => "0.1.0",
        "AuthorContact" => "nobody@example.com",
        "Organization" => "Test Lab",
        "License" => "CC BY 4.0",
        _ => unreachable!("unknown attribute {key}"),
    }
}

fn source_positions() -> Vec<f64> {
    (0..M).flat_map(|m| [m as f64 * 90.0, 0.0, 1.2]).collect()
}

fn impulse_responses() -> Vec<f64> {
    (0..M * R * N).map(|i| if i % N == 0 { 1.0 } else { 0.0 }).collect()
}

/// Well-formed in-memory file.
pub fn fixture() -> MemoryContainer {
    let mut c = MemoryContainer::new("fixture");
    for key in REQUIRED_ATTRIBUTES {
        c.set_attribute(ROOT, key, required_value(key));
    }

    set_position(&mut c, Role::Listener, Array::new((1, 3), vec![0.0, 0.0, 0.0]).unwrap(), "cartesian", "metre");
    set_position(&mut c, Role::Source, Array::new((M, 3), source_positions()).unwrap(), "spherical", "degree, degree, metre");
    set_position(&mut c, Role::Receiver, Array::new((R, 3), vec![0.0, 0.09, 0.0, 0.0, -0.09, 0.0]).unwrap(), "cartesian", "metre");
    set_position(&mut c, Role::Emitter, Array::new((1, 3), vec![0.0, 0.0, 0.0]).unwrap(), "cartesian", "metre");

    c.with_dataset("/Data.IR", Dataset::Numeric(Array::new((M, R, N), impulse_responses()).unwrap()))
        .with_dataset("/Data.Delay", Dataset::Numeric(Array::new((1, R), vec![0.0; R]).unwrap()))
        .with_dataset("/Data.SamplingRate", Dataset::Numeric(Array::new(1, vec![48000.0]).unwrap()))
        .with_attribute("/Data.SamplingRate", "Units", "hertz")
}

/// Fixture with every optional field populated.
pub fn full_fixture() -> MemoryContainer {
    let mut c = fixture()
        .with_attribute(ROOT, "ApplicationName", "fixture")
        .with_attribute(ROOT, "ApplicationVersion", "1")
        .with_attribute(ROOT, "Comment", "")
        .with_attribute(ROOT, "History", "created")
        .with_attribute(ROOT, "References", "none")
        .with_attribute(ROOT, "Origin", "synthetic");
    for role in Role::ALL {
        c.set_dataset(&format!("/{}Description", role), Dataset::Text(format!("{} description", role)));
        c.set_dataset(&format!("/{}View", role), Dataset::Numeric(Array::new((1, 3), vec![1.0, 0.0, 0.0]).unwrap()));
        c.set_dataset(&format!("/{}Up", role), Dataset::Numeric(Array::new((1, 3), vec![0.0, 0.0, 1.0]).unwrap()));
    }
    c
}

fn set_position(c: &mut MemoryContainer, role: Role, position: Array, kind: &str, units: &str) {
    let path = format!("/{}Position", role);
    c.set_dataset(&path, Dataset::Numeric(position));
    c.set_attribute(&path, "Type", kind);
    c.set_attribute(&path, "Units", units);
}

/// The fixture as a SOFA JSON dump.
pub fn fixture_json() -> Value {
    let attributes: serde_json::Map<String, Value> = REQUIRED_ATTRIBUTES
        .iter()
        .map(|k| (k.to_string(), Value::from(required_value(k))))
        .collect();

    let position = |shape: [usize; 2], data: Vec<f64>, kind: &str, units: &str| {
        json!({ "attributes": { "Type": kind, "Units": units }, "shape": shape, "data": data })
    };

    json!({
        "attributes": attributes,
        "dimensions": { "I": 1, "C": 3, "M": M, "R": R, "E": 1, "N": N, "S": 0 },
        "variables": {
            "ListenerPosition": position([1, 3], vec![0.0, 0.0, 0.0], "cartesian", "metre"),
            "SourcePosition": position([M, 3], source_positions(), "spherical", "degree, degree, metre"),
            "ReceiverPosition": position([R, 3], vec![0.0, 0.09, 0.0, 0.0, -0.09, 0.0], "cartesian", "metre"),
            "EmitterPosition": position([1, 3], vec![0.0, 0.0, 0.0], "cartesian", "metre"),
            "Data.IR": { "shape": [M, R, N], "data": impulse_responses() },
            "Data.Delay": { "shape": [1, R], "data": vec![0.0; R] },
            "Data.SamplingRate": { "attributes": { "Units": "hertz" }, "shape": [1], "data": [48000.0] }
        }
    })
}

/// Write a JSON document to a temp file, optionally gzip-compressed.
pub fn write_json(doc: &Value, gzip: bool) -> NamedTempFile {
    let bytes = serde_json::to_vec(doc).unwrap();
    let mut file = NamedTempFile::new().unwrap();
    if gzip {
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(&bytes).unwrap();
        file.write_all(&enc.finish().unwrap()).unwrap();
    } else {
        file.write_all(&bytes).unwrap();
    }
    file.flush().unwrap();
    file
}
