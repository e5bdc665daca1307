//! Common test utilities for trajmap.
//!
//! Shared helpers for the end-to-end rendering tests.
#![allow(dead_code)]

pub mod assertions;
pub mod image_utils;
pub mod test_data;
