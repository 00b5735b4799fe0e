//! Opaque, lazily-resolved JSON box.
//!
//! A [`Boxed<T>`] carries a value whose concrete type is only known to the
//! reader at decode time. On the wire it is always the single-field envelope
//! `{"Data": <payload>}`; no type tag is written. The reader recovers the value
//! by [`resolve`](Boxed::resolve)-ing against an ordered list of candidates.
//!
//! # States
//!
//! - Built with [`Boxed::new`]: `data` and `raw` agree.
//! - Decoded from an envelope: only `raw` is set, `data` keeps its previous
//!   state (`None` for a fresh box) until a resolution succeeds.
//!
//! # Decoding rules
//!
//! The envelope must be a JSON object. The `Data` key is matched ASCII
//! case-insensitively, other keys are skipped, and when `Data` appears more
//! than once the last occurrence wins.

use std::fmt;

use serde::de::{self, IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::{RawValue, to_raw_value};

use crate::boxable::Boxable;
use crate::error::BoxError;

const DATA_FIELD: &str = "Data";

struct Envelope {
    data: Box<RawValue>,
}

impl<'de> Deserialize<'de> for Envelope {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(EnvelopeVisitor)
    }
}

struct EnvelopeVisitor;

impl<'de> Visitor<'de> for EnvelopeVisitor {
    type Value = Envelope;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a box envelope object with a `{DATA_FIELD}` field")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut data = None;
        while let Some(key) = map.next_key::<String>()? {
            if key.eq_ignore_ascii_case(DATA_FIELD) {
                data = Some(map.next_value::<Box<RawValue>>()?);
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        let Some(data) = data else {
            return Err(de::Error::missing_field(DATA_FIELD));
        };
        Ok(Envelope { data })
    }
}

/// A value of some [`Boxable`] type together with its serialized payload.
#[derive(Debug, Clone)]
pub struct Boxed<T> {
    data: Option<T>,
    raw: Box<RawValue>,
}

impl<T> Boxed<T>
where
    T: Boxable,
{
    /// Box a known value, serializing it right away.
    pub fn new(value: T) -> Result<Self, BoxError<T::Error>>
    where
        T: Serialize,
    {
        let raw = to_raw_value(&value).map_err(BoxError::ConstructionFailed)?;
        Ok(Self {
            data: Some(value),
            raw,
        })
    }

    /// Wrap an already extracted payload. The box starts unresolved.
    #[must_use]
    pub fn from_raw(raw: Box<RawValue>) -> Self {
        Self { data: None, raw }
    }

    /// Decode an envelope into a new, unresolved box.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, BoxError<T::Error>> {
        let envelope: Envelope =
            serde_json::from_slice(bytes).map_err(BoxError::DecodeEnvelopeFailed)?;
        Ok(Self::from_raw(envelope.data))
    }

    /// [`from_slice`](Self::from_slice) for string input.
    pub fn from_json_str(json: &str) -> Result<Self, BoxError<T::Error>> {
        Self::from_slice(json.as_bytes())
    }

    /// Replace the payload from a new envelope, keeping `data` as it is.
    ///
    /// The box is left untouched if `bytes` is not a valid envelope.
    pub fn decode_envelope(&mut self, bytes: &[u8]) -> Result<(), BoxError<T::Error>> {
        let envelope: Envelope =
            serde_json::from_slice(bytes).map_err(BoxError::DecodeEnvelopeFailed)?;
        self.raw = envelope.data;
        Ok(())
    }

    /// Try `candidates` in order against the stored payload.
    ///
    /// The first candidate whose [`Boxable::unbox`] succeeds becomes the
    /// box's data and no further candidates are pulled from the iterator.
    /// When all of them fail, `data` is left as it was and the error of the
    /// last candidate is returned; earlier errors are dropped.
    ///
    /// Resolving an already resolved box is allowed and behaves the same way.
    pub fn resolve<I>(&mut self, candidates: I) -> Result<&T, BoxError<T::Error>>
    where
        I: IntoIterator<Item = T>,
    {
        let mut last_error = None;
        for (index, mut candidate) in candidates.into_iter().enumerate() {
            match candidate.unbox(&self.raw) {
                Ok(()) => {
                    tracing::debug!(candidate = index, "resolved boxed value");
                    return Ok(self.data.insert(candidate));
                }
                Err(err) => {
                    tracing::trace!(candidate = index, error = %err, "candidate rejected payload");
                    last_error = Some(err);
                }
            }
        }

        tracing::debug!(
            had_candidates = last_error.is_some(),
            "no candidate matched boxed value"
        );
        Err(BoxError::NoCandidateMatched(last_error))
    }
}

impl<T> Boxed<T> {
    /// The resolved value, if any.
    #[must_use]
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Whether a resolution (or construction) has set `data`.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.data.is_some()
    }

    /// The stored payload, exactly as it will be written inside the envelope.
    #[must_use]
    pub fn raw(&self) -> &RawValue {
        &self.raw
    }

    /// Consume the box, keeping only the resolved value.
    #[must_use]
    pub fn into_data(self) -> Option<T> {
        self.data
    }

    /// Consume the box into its resolved value and payload.
    #[must_use]
    pub fn into_parts(self) -> (Option<T>, Box<RawValue>) {
        (self.data, self.raw)
    }

    /// Encode as a compact `{"Data":...}` envelope.
    #[must_use]
    pub fn to_json_string(&self) -> String {
        // `raw` is always a complete JSON value, so splicing it is valid JSON.
        format!("{{\"{DATA_FIELD}\":{}}}", self.raw.get())
    }

    /// [`to_json_string`](Self::to_json_string) as bytes.
    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        self.to_json_string().into_bytes()
    }
}

impl<T> Serialize for Boxed<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Envelope", 1)?;
        state.serialize_field(DATA_FIELD, &self.raw)?;
        state.end()
    }
}

impl<'de, T> Deserialize<'de> for Boxed<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let envelope = Envelope::deserialize(deserializer)?;
        Ok(Self {
            data: None,
            raw: envelope.data,
        })
    }
}
