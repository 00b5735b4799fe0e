//! The capability a type needs to live inside a [`Boxed`](crate::Boxed).

use std::error::Error as StdError;

use serde::de::DeserializeOwned;
use serde_json::value::RawValue;

/// A type that can try to populate itself from a raw JSON payload.
///
/// Candidates passed to [`Boxed::resolve`](crate::Boxed::resolve) are values of
/// the implementing type; the first one whose `unbox` succeeds becomes the
/// box's data. Implementations should leave `self` untouched on failure.
pub trait Boxable {
    type Error: StdError + Send + Sync + 'static;

    fn unbox(&mut self, raw: &RawValue) -> Result<(), Self::Error>;
}

/// Replace `target` with `raw` decoded as `T`.
///
/// The usual body of a [`Boxable::unbox`] impl. `target` is only written once
/// the whole payload has decoded.
pub fn unbox_json<T>(target: &mut T, raw: &RawValue) -> Result<(), serde_json::Error>
where
    T: DeserializeOwned,
{
    *target = serde_json::from_str(raw.get())?;
    Ok(())
}

impl<B> Boxable for Box<B>
where
    B: Boxable + ?Sized,
{
    type Error = B::Error;

    fn unbox(&mut self, raw: &RawValue) -> Result<(), Self::Error> {
        (**self).unbox(raw)
    }
}
