// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types

use crate::collision::ObjectId;
use thiserror::Error;

/// Failures that abort a detection session as a whole
#[derive(Debug, Error)]
pub enum ClashError {
    #[error("no active model: the geometry host is unavailable")]
    HostUnavailable,

    #[error("invalid detection request: {0}")]
    InvalidRequest(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to load scene: {0}")]
    Scene(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Recoverable geometric failures reported by faces and hosts
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GeometryError {
    #[error("parameter ({u}, {v}) is outside the face domain")]
    OutOfDomain { u: f64, v: f64 },

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("object {0} is not part of the model")]
    UnknownObject(ObjectId),

    #[error("unsupported geometry: {0}")]
    Unsupported(String),
}
