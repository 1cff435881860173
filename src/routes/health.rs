// ABOUTME: Health check route for liveness probes
// ABOUTME: Reports service name and version without touching the store or the provider
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use axum::routing::get;
use axum::{Json, Router};
use lexdraft_core::constants::service::{SERVICE_NAME, SERVICE_VERSION};
use serde_json::{json, Value};

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create the health route
    pub fn routes() -> Router {
        async fn health_handler() -> Json<Value> {
            Json(json!({
                "status": "ok",
                "service": SERVICE_NAME,
                "version": SERVICE_VERSION,
            }))
        }

        Router::new().route("/health", get(health_handler))
    }
}
