// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Small shared helpers

pub mod units;

pub use units::{mm_to_model, model_to_mm, MM_PER_MODEL_UNIT};
