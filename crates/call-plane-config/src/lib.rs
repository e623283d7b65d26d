// crates/call-plane-config/src/lib.rs
// ============================================================================
// Module: Call Plane Config Library
// Description: Canonical config model and validation for the call service.
// Purpose: Single source of truth for call-plane.toml semantics.
// Dependencies: call-plane-core, serde, toml
// ============================================================================

//! ## Overview
//! `call-plane-config` defines the canonical configuration model for the
//! call service: execution scheduling, per-batch operation limits, and audit
//! routing. Parsing is strict and validation fails closed; an invalid file
//! never yields a partially configured service.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
