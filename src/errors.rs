// ABOUTME: Error types for the server crate, re-exported from lexdraft-core
// ABOUTME: Keeps `crate::errors::AppError` paths stable across modules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Unified Error Handling
//!
//! `AppError` and `ErrorCode` live in `lexdraft-core`; this module re-exports
//! them so server modules import from one place. Module-local error enums
//! (`DatabaseError`, `ClassificationError`) convert into `AppError` at their
//! module boundary.

pub use lexdraft_core::errors::{AppError, AppResult, ErrorCode, ErrorResponse};
