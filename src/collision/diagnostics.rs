// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Sink for recoverable conditions met during a detection run
//!
//! Nothing recorded here fails a run. Every entry is also emitted as a
//! tracing event.

use super::ObjectId;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// No bounding box or no usable solids
    MissingGeometry,
    /// Degenerate UV steps while sampling a face
    InvalidSampling,
    /// Category label unknown to the host
    UnsupportedCategory,
    /// Selected level could not be resolved
    UnresolvedLevel,
    /// Narrow phase failed for a pair; the pair counts as clear
    CatastrophicFailure,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub timestamp: DateTime<Local>,
    pub kind: DiagnosticKind,
    pub objects: Vec<ObjectId>,
    pub message: String,
}

/// Thread-safe diagnostic log shared by cache population workers
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Mutex<Vec<Diagnostic>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, kind: DiagnosticKind, objects: &[ObjectId], message: impl Into<String>) {
        let message = message.into();
        match kind {
            DiagnosticKind::CatastrophicFailure => {
                tracing::error!(?kind, ?objects, "{message}");
            }
            _ => tracing::warn!(?kind, ?objects, "{message}"),
        }

        let entry = Diagnostic {
            timestamp: Local::now(),
            kind,
            objects: objects.to_vec(),
            message,
        };
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }

    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|entry| entry.kind == kind)
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
