//! Opaque boxed values for anybox.
//!
//! A [`Boxed<T>`] lets a value whose concrete type the reader does not know in
//! advance travel as plain JSON. The payload carries no type tag; the reader
//! resolves it by trying an ordered list of [`Boxable`] candidates.
//!
//! Pure domain types: no IO, no async.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod boxable;
mod boxed;
mod error;

pub use boxable::{Boxable, unbox_json};
pub use boxed::Boxed;
pub use error::BoxError;
