//! The root aggregate: one fully read SOFA file.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::container::{Container, FileOpener, OpenOptions, Opener};
use crate::schema::{Fir, Geometry, GlobalAttributes, Payload, PayloadRegistry, Role};
use crate::util::{Error, Result};

/// A SOFA file read into memory.
///
/// Construction is all-or-nothing: either every required attribute,
/// geometry field and payload field was found, or an error is returned.
/// The value holds no reference to the container it was read from.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Sofa {
    attributes: GlobalAttributes,
    listener: Geometry,
    source: Geometry,
    receiver: Geometry,
    emitter: Geometry,
    payload: Payload,
}

/// Container opened on behalf of the caller, closed when dropped.
struct OwnedContainer(Box<dyn Container>);

impl Drop for OwnedContainer {
    fn drop(&mut self) {
        if let Err(e) = self.0.close() {
            tracing::warn!(name = self.0.name(), "failed to close container: {}", e);
        }
    }
}

impl Sofa {
    /// Open and read a SOFA file, detecting the backend from its contents.
    ///
    /// # Example
    /// ```ignore
    /// let sofa = Sofa::open("subject_003.sofa")?;
    /// println!("{} measurements", sofa.source().len());
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, &OpenOptions::default())
    }

    /// Open and read a SOFA file with explicit open options.
    pub fn open_with(path: impl AsRef<Path>, options: &OpenOptions) -> Result<Self> {
        Self::open_with_opener(path, &FileOpener::new(options.clone()), &PayloadRegistry::default())
    }

    /// Open `path` through `opener` and read it using `registry`.
    ///
    /// The container is closed before returning, on success and on error.
    pub fn open_with_opener(
        path: impl AsRef<Path>,
        opener: &dyn Opener,
        registry: &PayloadRegistry,
    ) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(Error::InvalidInput("empty path".into()));
        }

        tracing::info!(path = %path.display(), "reading SOFA file");
        let handle = OwnedContainer(opener.open(path)?);
        Self::read(handle.0.as_ref(), registry)
    }

    /// Read from a container the caller opened. The container is left open.
    pub fn from_container(container: &dyn Container) -> Result<Self> {
        Self::from_container_with(container, &PayloadRegistry::default())
    }

    /// Read from a caller-owned container using `registry`.
    pub fn from_container_with(container: &dyn Container, registry: &PayloadRegistry) -> Result<Self> {
        if !container.is_open() {
            return Err(Error::InvalidInput(format!("container {} is closed", container.name())));
        }
        Self::read(container, registry)
    }

    fn read(container: &dyn Container, registry: &PayloadRegistry) -> Result<Self> {
        let attributes = GlobalAttributes::read(container)?;

        let listener = Geometry::read(Role::Listener, container)?;
        let source = Geometry::read(Role::Source, container)?;
        let receiver = Geometry::read(Role::Receiver, container)?;
        let emitter = Geometry::read(Role::Emitter, container)?;

        let payload = registry.dispatch(attributes.data_type(), container)?;
        tracing::debug!(
            conventions = attributes.sofa_conventions(),
            data_type = payload.tag(),
            "read SOFA aggregate"
        );

        Ok(Self { attributes, listener, source, receiver, emitter, payload })
    }

    pub fn attributes(&self) -> &GlobalAttributes {
        &self.attributes
    }

    /// Value of the `DataType` attribute.
    pub fn data_type(&self) -> &str {
        self.attributes.data_type()
    }

    pub fn listener(&self) -> &Geometry {
        &self.listener
    }

    pub fn source(&self) -> &Geometry {
        &self.source
    }

    pub fn receiver(&self) -> &Geometry {
        &self.receiver
    }

    pub fn emitter(&self) -> &Geometry {
        &self.emitter
    }

    pub fn geometry(&self, role: Role) -> &Geometry {
        match role {
            Role::Listener => &self.listener,
            Role::Source => &self.source,
            Role::Receiver => &self.receiver,
            Role::Emitter => &self.emitter,
        }
    }

    /// All four geometries in read order.
    pub fn geometries(&self) -> impl Iterator<Item = &Geometry> {
        Role::ALL.into_iter().map(move |role| self.geometry(role))
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// FIR payload, if that is the data type.
    pub fn fir(&self) -> Option<&Fir> {
        self.payload.as_fir()
    }
}

impl fmt::Display for Sofa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} {} ({})",
            self.attributes.sofa_conventions(),
            self.attributes.sofa_conventions_version(),
            self.attributes.title()
        )?;
        for g in self.geometries() {
            writeln!(f, "  {}", g)?;
        }
        write!(f, "  {}", self.payload)
    }
}
