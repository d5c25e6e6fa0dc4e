//! Grammar definitions bundled with Sapwood.

#[cfg(feature = "lang-arithmetic")]
pub mod arithmetic;
#[cfg(feature = "lang-json")]
pub mod json;
#[cfg(feature = "lang-python")]
pub mod python;
#[cfg(feature = "lang-python")]
mod python_scanner;
