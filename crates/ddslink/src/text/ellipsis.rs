// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Head/tail pair rendered with an elided middle.

use super::slice::StrRef;
use std::fmt;

/// Separator rendered between the two halves.
pub const ELLIPSIS_SEPARATOR: &str = " ... ";

/// Two slices, possibly from different sources, rendered as
/// `first ... second`.
///
/// Which half is empty carries meaning:
///
/// | first | second | meaning | renders |
/// |-------|--------|---------|---------|
/// | set   | empty  | success, nothing elided | `first` |
/// | set   | set    | success, middle elided | `first ... second` |
/// | empty | set    | invalid / could not shorten | `second` |
/// | empty | empty  | empty | nothing |
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct Ellipsis<'a> {
    pub first: StrRef<'a>,
    pub second: StrRef<'a>,
}

impl<'a> Ellipsis<'a> {
    /// Length of the separator.
    pub const EXTRA_LENGTH: usize = ELLIPSIS_SEPARATOR.len();

    pub fn new(first: StrRef<'a>, second: StrRef<'a>) -> Self {
        Self { first, second }
    }

    /// An invalid result: no head, `text` kept as the tail.
    pub fn invalid(text: StrRef<'a>) -> Self {
        Self {
            first: StrRef::empty(),
            second: text,
        }
    }

    /// Rendered length: both halves, plus the separator when both are set.
    pub fn len(&self) -> usize {
        let l = self.first.len() + self.second.len();
        if self.first.as_bool() && self.second.as_bool() {
            l + Self::EXTRA_LENGTH
        } else {
            l
        }
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_empty() && self.second.is_empty()
    }

    /// Valid iff there is a head. An empty ellipsis is also invalid.
    pub fn is_valid(&self) -> bool {
        self.first.as_bool()
    }

    /// Render `first` and `second` without building an `Ellipsis`.
    pub fn format(first: StrRef<'_>, second: StrRef<'_>) -> String {
        Ellipsis::new(first, second).to_string()
    }
}

impl fmt::Display for Ellipsis<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.first.as_bool() {
            f.write_str(self.first.as_str())?;
            if self.second.as_bool() {
                f.write_str(ELLIPSIS_SEPARATOR)?;
                f.write_str(self.second.as_str())?;
            }
        } else if self.second.as_bool() {
            f.write_str(self.second.as_str())?;
        }
        Ok(())
    }
}
