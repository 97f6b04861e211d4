//! Measurement data payloads, selected by the root `DataType` attribute.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::field::{bind_all, take_required, FieldDescriptor, Slot};
use crate::container::{Array, Container};
use crate::util::{Error, Result};

#[derive(Default)]
struct FirDraft {
    impulse_response: Option<Array>,
    delay: Option<Array>,
    sampling_rate: Option<f64>,
    sampling_rate_units: Option<String>,
}

static FIR_FIELDS: &[FieldDescriptor<FirDraft>] = &[
    FieldDescriptor::dataset("Data.IR", "impulse_response", true, |d| {
        Slot::Array(&mut d.impulse_response)
    }),
    FieldDescriptor::dataset("Data.Delay", "delay", true, |d| Slot::Array(&mut d.delay)),
    FieldDescriptor::dataset("Data.SamplingRate", "sampling_rate", true, |d| {
        Slot::Number(&mut d.sampling_rate)
    }),
    FieldDescriptor::attribute("Data.SamplingRate", "Units", "sampling_rate_units", true, |d| {
        Slot::Text(&mut d.sampling_rate_units)
    }),
];

/// Finite impulse responses, `Data.IR` laid out as `[M, R, N]`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Fir {
    impulse_response: Array,
    delay: Array,
    sampling_rate: f64,
    sampling_rate_units: String,
}

impl Fir {
    pub const TAG: &'static str = "FIR";

    pub fn read(container: &dyn Container) -> Result<Self> {
        let mut draft = FirDraft::default();
        bind_all(&mut draft, container, "", FIR_FIELDS)?;

        let fir = Self {
            impulse_response: take_required(draft.impulse_response, || FIR_FIELDS[0].location(""))?,
            delay: take_required(draft.delay, || FIR_FIELDS[1].location(""))?,
            sampling_rate: take_required(draft.sampling_rate, || FIR_FIELDS[2].location(""))?,
            sampling_rate_units: take_required(draft.sampling_rate_units, || FIR_FIELDS[3].location(""))?,
        };
        tracing::debug!(shape = %fir.impulse_response.shape(), rate = fir.sampling_rate, "read FIR data");
        Ok(fir)
    }

    pub fn impulse_response(&self) -> &Array {
        &self.impulse_response
    }

    /// Broadcast delay in samples, `[I, R]` or `[M, R]`.
    pub fn delay(&self) -> &Array {
        &self.delay
    }

    pub fn sampling_rate(&self) -> f64 {
        self.sampling_rate
    }

    pub fn sampling_rate_units(&self) -> &str {
        &self.sampling_rate_units
    }

    /// `M`, the number of measurements.
    pub fn num_measurements(&self) -> usize {
        self.impulse_response.shape().size(0).unwrap_or(0)
    }

    /// `R`, the number of receivers.
    pub fn num_receivers(&self) -> usize {
        self.impulse_response.shape().size(1).unwrap_or(0)
    }

    /// `N`, samples per impulse response.
    pub fn num_samples(&self) -> usize {
        self.impulse_response.shape().size(2).unwrap_or(0)
    }

    /// Impulse response of measurement `m`, receiver `r`.
    pub fn response(&self, m: usize, r: usize) -> Option<&[f64]> {
        let (nr, n) = (self.num_receivers(), self.num_samples());
        if m >= self.num_measurements() || r >= nr || n == 0 {
            return None;
        }
        let start = (m * nr + r) * n;
        self.impulse_response.values().get(start..start + n)
    }
}

/// Data payload of a SOFA file.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "DataType")]
#[non_exhaustive]
pub enum Payload {
    #[serde(rename = "FIR")]
    Fir(Fir),
}

impl Payload {
    /// `DataType` tag of this payload.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Fir(_) => Fir::TAG,
        }
    }

    pub fn as_fir(&self) -> Option<&Fir> {
        match self {
            Self::Fir(fir) => Some(fir),
        }
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fir(fir) => write!(
                f,
                "FIR {} @ {} {}",
                fir.impulse_response.shape(),
                fir.sampling_rate,
                fir.sampling_rate_units
            ),
        }
    }
}

/// Builds a payload from an open container.
pub type PayloadConstructor = fn(&dyn Container) -> Result<Payload>;

fn read_fir(container: &dyn Container) -> Result<Payload> {
    Fir::read(container).map(Payload::Fir)
}

/// Maps `DataType` tags to payload constructors.
///
/// The default registry knows `FIR`. New payload kinds register a
/// constructor under their tag.
#[derive(Clone)]
pub struct PayloadRegistry {
    constructors: BTreeMap<String, PayloadConstructor>,
}

impl Default for PayloadRegistry {
    fn default() -> Self {
        Self::empty().with(Fir::TAG, read_fir)
    }
}

impl PayloadRegistry {
    /// Registry with no entries; every tag is unsupported.
    pub fn empty() -> Self {
        Self { constructors: BTreeMap::new() }
    }

    /// Register `constructor` for `tag`, returning any constructor it replaces.
    pub fn register(&mut self, tag: impl Into<String>, constructor: PayloadConstructor) -> Option<PayloadConstructor> {
        self.constructors.insert(tag.into(), constructor)
    }

    pub fn with(mut self, tag: impl Into<String>, constructor: PayloadConstructor) -> Self {
        self.register(tag, constructor);
        self
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.constructors.contains_key(tag)
    }

    /// Registered tags in sorted order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    /// Construct the payload registered for `tag`.
    pub fn dispatch(&self, tag: &str, container: &dyn Container) -> Result<Payload> {
        let constructor = self
            .constructors
            .get(tag)
            .ok_or_else(|| Error::UnsupportedDataType(tag.to_string()))?;
        constructor(container)
    }
}

impl fmt::Debug for PayloadRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.tags()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{Dataset, MemoryContainer};

    fn fir_container() -> MemoryContainer {
        MemoryContainer::new("t")
            .with_dataset(
                "/Data.IR",
                Dataset::Numeric(Array::new((2, 2, 3), (0..12).map(f64::from).collect()).unwrap()),
            )
            .with_dataset("/Data.Delay", Dataset::Numeric(Array::new((1, 2), vec![0.0, 0.0]).unwrap()))
            .with_dataset("/Data.SamplingRate", Dataset::Numeric(Array::from_vec(vec![44100.0])))
            .with_attribute("/Data.SamplingRate", "Units", "hertz")
    }

    #[test]
    fn test_read_fir() {
        let fir = Fir::read(&fir_container()).unwrap();
        assert_eq!(fir.sampling_rate(), 44100.0);
        assert_eq!(fir.sampling_rate_units(), "hertz");
        assert_eq!(fir.num_measurements(), 2);
        assert_eq!(fir.num_receivers(), 2);
        assert_eq!(fir.num_samples(), 3);
        assert_eq!(fir.delay().len(), 2);
        assert_eq!(fir.response(1, 0), Some(&[6.0, 7.0, 8.0][..]));
        assert_eq!(fir.response(2, 0), None);
    }

    #[test]
    fn test_fir_missing_units() {
        let mut c = fir_container();
        c.remove_attribute("/Data.SamplingRate", "Units");
        let err = Fir::read(&c).unwrap_err();
        assert_eq!(err.to_string(), "Required field missing: /Data.SamplingRate@Units");
    }

    #[test]
    fn test_dispatch() {
        let registry = PayloadRegistry::default();
        assert_eq!(registry.tags().collect::<Vec<_>>(), vec!["FIR"]);

        let payload = registry.dispatch("FIR", &fir_container()).unwrap();
        assert_eq!(payload.tag(), "FIR");
        assert!(payload.as_fir().is_some());

        let err = registry.dispatch("XYZ", &fir_container()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedDataType(ref tag) if tag == "XYZ"));
    }

    #[test]
    fn test_register() {
        let mut registry = PayloadRegistry::empty();
        assert!(matches!(
            registry.dispatch("FIR", &fir_container()),
            Err(Error::UnsupportedDataType(_))
        ));
        assert!(registry.register("FIR-E", read_fir).is_none());
        assert!(registry.contains("FIR-E"));
        assert!(registry.dispatch("FIR-E", &fir_container()).is_ok());
    }
}
