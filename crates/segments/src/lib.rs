//! Segment compilation: OneBot-style message segments in, typed host-client
//! message elements out.
//!
//! [`SegmentCompiler::compile`] looks the segment tag up in the
//! [`SegmentKind`] registry, validates the parameters, resolves and prepares
//! any referenced media and returns either an element or
//! [`BuildOutcome::ActionPerformed`] when the segment was carried out through
//! a service directly.

mod builders;
pub mod compiler;
pub mod element;
pub mod error;
pub mod face_catalog;
pub mod params;
pub mod registry;
pub mod transfer;

pub use {
    builders::{BuildOutcome, SegmentRequest},
    compiler::{Segment, SegmentCompiler, Services},
    element::MsgElement,
    error::{Error, Result},
    params::Params,
    registry::SegmentKind,
    transfer::TransferOrchestrator,
};
