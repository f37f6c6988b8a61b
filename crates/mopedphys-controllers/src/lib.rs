#![deny(missing_docs)]
//! Orientation stabilization for two-wheeled chassis.
//!
//! A stateless PD controller in the degree domain: [`StabilityCtrl::torque`]
//! returns a dt-scaled corrective torque for the current lean, and
//! [`StabilityCtrl::over_spin`] flags runaway rotation for the caller to damp
//! directly. Pure math over [`mopedphys_core::Scalar`]; force application
//! stays with the host.

mod stability;

pub use stability::{normalize_angle_deg, StabilityCtrl, StabilityParams};
