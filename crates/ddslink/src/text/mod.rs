// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Text helpers for diagnostic output.
//!
//! - [`StrRef`]: zero-copy `[begin, end)` view that remembers its buffer
//! - [`Ellipsis`]: head/tail pair rendered as `head ... tail`
//! - [`shorten_json_string`]: bracket-aware shortening under a length budget

pub mod ellipsis;
pub mod shorten;
pub mod slice;

pub use ellipsis::{Ellipsis, ELLIPSIS_SEPARATOR};
pub use shorten::{shorten_json, shorten_json_string, DEFAULT_SHORTEN_LENGTH, MIN_SHORTEN_LENGTH};
pub use slice::StrRef;
