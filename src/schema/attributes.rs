//! Global (root-level) attributes.

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::field::{bind_all, take_required, FieldDescriptor, Slot};
use crate::container::Container;
use crate::util::Result;

/// Root attributes every SOFA file must carry.
pub const REQUIRED_ATTRIBUTES: [&str; 14] = [
    "Conventions",
    "Version",
    "SOFAConventions",
    "SOFAConventionsVersion",
    "DataType",
    "RoomType",
    "Title",
    "DateCreated",
    "DateModified",
    "APIName",
    "APIVersion",
    "AuthorContact",
    "Organization",
    "License",
];

/// Root attributes a SOFA file may carry.
pub const OPTIONAL_ATTRIBUTES: [&str; 6] = [
    "ApplicationName",
    "ApplicationVersion",
    "Comment",
    "History",
    "References",
    "Origin",
];

#[derive(Default)]
struct Draft {
    required: [Option<String>; 14],
    optional: [Option<String>; 6],
}

macro_rules! required {
    ($idx:literal) => {
        FieldDescriptor::attribute("", REQUIRED_ATTRIBUTES[$idx], REQUIRED_ATTRIBUTES[$idx], true, |d| {
            Slot::Text(&mut d.required[$idx])
        })
    };
}

macro_rules! optional {
    ($idx:literal) => {
        FieldDescriptor::attribute("", OPTIONAL_ATTRIBUTES[$idx], OPTIONAL_ATTRIBUTES[$idx], false, |d| {
            Slot::Text(&mut d.optional[$idx])
        })
    };
}

static ROOT_FIELDS: &[FieldDescriptor<Draft>] = &[
    required!(0),
    required!(1),
    required!(2),
    required!(3),
    required!(4),
    required!(5),
    required!(6),
    required!(7),
    required!(8),
    required!(9),
    required!(10),
    required!(11),
    required!(12),
    required!(13),
    optional!(0),
    optional!(1),
    optional!(2),
    optional!(3),
    optional!(4),
    optional!(5),
];

/// The global attributes of a SOFA file.
///
/// Required attributes are always present; an optional attribute the file
/// does not carry is `None`, which is distinct from an empty string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlobalAttributes {
    required: [String; 14],
    optional: [Option<String>; 6],
}

macro_rules! required_getters {
    ($($(#[$doc:meta])* $name:ident => $idx:literal),* $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $name(&self) -> &str {
                &self.required[$idx]
            }
        )*
    };
}

macro_rules! optional_getters {
    ($($name:ident => $idx:literal),* $(,)?) => {
        $(
            pub fn $name(&self) -> Option<&str> {
                self.optional[$idx].as_deref()
            }
        )*
    };
}

impl GlobalAttributes {
    /// Read all root attributes, required ones first.
    pub fn read(container: &dyn Container) -> Result<Self> {
        let mut draft = Draft::default();
        bind_all(&mut draft, container, "", ROOT_FIELDS)?;

        let mut required: [String; 14] = Default::default();
        for (i, (dst, src)) in required.iter_mut().zip(draft.required).enumerate() {
            *dst = take_required(src, || ROOT_FIELDS[i].location(""))?;
        }
        Ok(Self { required, optional: draft.optional })
    }

    required_getters! {
        /// Always `SOFA`.
        conventions => 0,
        version => 1,
        /// Convention name, e.g. `SimpleFreeFieldHRIR`.
        sofa_conventions => 2,
        sofa_conventions_version => 3,
        /// Payload tag, e.g. `FIR`.
        data_type => 4,
        room_type => 5,
        title => 6,
        date_created => 7,
        date_modified => 8,
        api_name => 9,
        api_version => 10,
        author_contact => 11,
        organization => 12,
        license => 13,
    }

    optional_getters! {
        application_name => 0,
        application_version => 1,
        comment => 2,
        history => 3,
        references => 4,
        origin => 5,
    }

    /// Look up an attribute by its file name, e.g. `"SOFAConventions"`.
    ///
    /// Returns None for absent optional attributes and unknown names.
    pub fn get(&self, key: &str) -> Option<&str> {
        if let Some(i) = REQUIRED_ATTRIBUTES.iter().position(|k| *k == key) {
            return Some(&self.required[i]);
        }
        let i = OPTIONAL_ATTRIBUTES.iter().position(|k| *k == key)?;
        self.optional[i].as_deref()
    }

    /// All known attributes in schema order, absent ones as `None`.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Option<&str>)> {
        let required = REQUIRED_ATTRIBUTES
            .iter()
            .zip(self.required.iter())
            .map(|(k, v)| (*k, Some(v.as_str())));
        let optional = OPTIONAL_ATTRIBUTES
            .iter()
            .zip(self.optional.iter())
            .map(|(k, v)| (*k, v.as_deref()));
        required.chain(optional)
    }
}

impl Serialize for GlobalAttributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(REQUIRED_ATTRIBUTES.len() + OPTIONAL_ATTRIBUTES.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, &value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{MemoryContainer, ROOT};
    use crate::util::Error;

    fn root() -> MemoryContainer {
        let mut c = MemoryContainer::new("t");
        for key in REQUIRED_ATTRIBUTES {
            c.set_attribute(ROOT, key, format!("{} value", key));
        }
        c
    }

    #[test]
    fn test_required_only() {
        let attrs = GlobalAttributes::read(&root()).unwrap();
        assert_eq!(attrs.conventions(), "Conventions value");
        assert_eq!(attrs.data_type(), "DataType value");
        assert_eq!(attrs.license(), "License value");
        assert_eq!(attrs.get("SOFAConventions"), Some("SOFAConventions value"));
        assert_eq!(attrs.comment(), None);
        assert_eq!(attrs.get("Comment"), None);
        assert_eq!(attrs.get("NotAnAttribute"), None);
        assert_eq!(attrs.iter().count(), 20);
    }

    #[test]
    fn test_optional_present() {
        let c = root()
            .with_attribute(ROOT, "Comment", "")
            .with_attribute(ROOT, "Origin", "measured");
        let attrs = GlobalAttributes::read(&c).unwrap();
        assert_eq!(attrs.comment(), Some(""));
        assert_eq!(attrs.origin(), Some("measured"));
        assert_eq!(attrs.history(), None);
    }

    #[test]
    fn test_each_required_missing() {
        for key in REQUIRED_ATTRIBUTES {
            let mut c = root();
            c.remove_attribute(ROOT, key);
            match GlobalAttributes::read(&c) {
                Err(Error::RequiredFieldMissing(path)) => assert_eq!(path, format!("/@{}", key)),
                other => panic!("{key}: unexpected result {other:?}"),
            }
        }
    }

    #[test]
    fn test_serialize() {
        let attrs = GlobalAttributes::read(&root()).unwrap();
        let json = serde_json::to_value(&attrs).unwrap();
        assert_eq!(json["Title"], "Title value");
        assert!(json["References"].is_null());
    }
}
