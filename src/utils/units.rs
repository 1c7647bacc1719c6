// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Length unit conversion between display millimetres and model units

/// Millimetres per internal model unit (the model is in feet)
pub const MM_PER_MODEL_UNIT: f64 = 304.8;

/// Convert a display length in millimetres to model units
pub fn mm_to_model(mm: f64) -> f64 {
    mm / MM_PER_MODEL_UNIT
}

/// Convert a model length back to display millimetres
pub fn model_to_mm(length: f64) -> f64 {
    length * MM_PER_MODEL_UNIT
}
