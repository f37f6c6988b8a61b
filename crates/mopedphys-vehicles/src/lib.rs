#![deny(missing_docs)]
//! Two-wheeled vehicle locomotion on a raycast suspension (MVP).
//!
//! Defines per-wheel suspension parameters, driver input, and a
//! `VehicleInstance` advanced once per fixed tick with `step`.
//!
//! This crate is *world-agnostic*: the host hands in a [`HostBody`] for the
//! shared chassis rigid body and a [`GroundRay`] for ground queries, both
//! resolved at assembly time. No ambient lookups and no back-door access to a
//! sibling's ray state; grounded state and contact points are read off
//! [`SuspensionPoint`] accessors.
//!
//! [`HostBody`]: mopedphys_core::HostBody
//! [`GroundRay`]: mopedphys_core::GroundRay

mod drive;
mod suspension;

pub use drive::{AxisInput, DriveParams, VehicleInstance, VehicleState, INPUT_DEADZONE};
pub use suspension::{SuspensionParams, SuspensionPoint, SuspensionSample};
