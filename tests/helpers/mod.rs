// ABOUTME: Shared HTTP test helpers for route integration tests
// ABOUTME: Exports the Axum request builder and response wrapper
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

pub mod axum_test;
