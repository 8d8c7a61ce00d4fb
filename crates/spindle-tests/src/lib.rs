// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # spindle-tests
//!
//! Integration tests and shared test tooling for SPINDLE.
//!
//! The `common` module provides a scripted agent transport, XML
//! fixtures, and wait helpers; the `tests/` directory drives the full
//! client through the end-to-end scenarios.

pub mod common;
