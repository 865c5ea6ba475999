//! Optional extensions to the base camera controller.

#[cfg(feature = "extension_focus_indicator")]
pub mod focus_indicator;
#[cfg(feature = "rapier")]
pub mod rapier;
