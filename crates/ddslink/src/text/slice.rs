// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Non-owning bounded view over string data.

use std::fmt;

/// A `[begin, end)` byte range into a borrowed string.
///
/// Unlike a plain `&str` sub-slice, a `StrRef` remembers the buffer it was
/// cut from, so two refs into the same text can be compared and recombined
/// by offset (this is what the shortener splices on). The lifetime ties it to
/// the underlying buffer: a `StrRef` can never outlive what it views.
///
/// Offsets are in bytes. Constructing a ref with `begin > end` or `end`
/// past the buffer is a programming error and panics.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct StrRef<'a> {
    base: &'a str,
    begin: usize,
    end: usize,
}

impl<'a> StrRef<'a> {
    /// View the whole of `s`.
    pub fn new(s: &'a str) -> Self {
        Self {
            base: s,
            begin: 0,
            end: s.len(),
        }
    }

    /// View `base[begin..end]`.
    ///
    /// # Panics
    ///
    /// If `begin > end` or `end > base.len()`.
    pub fn from_range(base: &'a str, begin: usize, end: usize) -> Self {
        assert!(begin <= end, "StrRef: begin {} > end {}", begin, end);
        assert!(
            end <= base.len(),
            "StrRef: end {} past buffer length {}",
            end,
            base.len()
        );
        Self { base, begin, end }
    }

    /// View `length` bytes of `base` starting at `begin`.
    pub fn from_len(base: &'a str, begin: usize, length: usize) -> Self {
        Self::from_range(base, begin, begin + length)
    }

    /// An empty ref that views nothing.
    pub const fn empty() -> Self {
        Self {
            base: "",
            begin: 0,
            end: 0,
        }
    }

    /// Another ref into the same buffer, with absolute offsets.
    pub fn sub(&self, begin: usize, end: usize) -> Self {
        Self::from_range(self.base, begin, end)
    }

    #[inline]
    pub fn begin(&self) -> usize {
        self.begin
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    /// True iff non-empty.
    #[inline]
    pub fn as_bool(&self) -> bool {
        !self.is_empty()
    }

    /// First byte, `None` if empty.
    pub fn front(&self) -> Option<u8> {
        self.bytes().first().copied()
    }

    /// Last byte, `None` if empty.
    pub fn back(&self) -> Option<u8> {
        self.bytes().last().copied()
    }

    /// The viewed bytes.
    #[inline]
    pub fn bytes(&self) -> &'a [u8] {
        &self.base.as_bytes()[self.begin..self.end]
    }

    /// The whole buffer this ref points into.
    #[inline]
    pub fn base(&self) -> &'a str {
        self.base
    }

    /// The viewed text.
    ///
    /// Falls back to a lossy empty string if the range does not sit on
    /// character boundaries; refs built by this crate always do.
    pub fn as_str(&self) -> &'a str {
        self.base.get(self.begin..self.end).unwrap_or_default()
    }
}

impl Default for StrRef<'_> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'a> From<&'a str> for StrRef<'a> {
    fn from(s: &'a str) -> Self {
        Self::new(s)
    }
}

impl<'a> From<&'a String> for StrRef<'a> {
    fn from(s: &'a String) -> Self {
        Self::new(s.as_str())
    }
}

impl fmt::Display for StrRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for StrRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StrRef({}..{} {:?})", self.begin, self.end, self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_string_view() {
        let text = "haha";
        let r = StrRef::new(text);
        assert_eq!(r.len(), 4);
        assert!(r.as_bool());
        assert_eq!(r.front(), Some(b'h'));
        assert_eq!(r.back(), Some(b'a'));
        assert_eq!(r.to_string(), "haha");
    }

    #[test]
    fn ranges_share_the_base() {
        let text = "{\"a\":[1,2]}";
        let r = StrRef::new(text);
        let inner = r.sub(5, 10);
        assert_eq!(inner.as_str(), "[1,2]");
        assert_eq!(inner.begin(), 5);
        assert_eq!(inner.end(), 10);
        assert!(std::ptr::eq(inner.base(), r.base()));

        let by_len = StrRef::from_len(text, 5, 5);
        assert_eq!(by_len, inner);
    }

    #[test]
    fn empty_refs() {
        let e = StrRef::empty();
        assert!(e.is_empty());
        assert!(!e.as_bool());
        assert_eq!(e.front(), None);
        assert_eq!(e.back(), None);
        assert_eq!(e.to_string(), "");

        let text = "abc";
        let at_end = StrRef::from_range(text, 3, 3);
        assert!(at_end.is_empty());
    }

    #[test]
    #[should_panic(expected = "begin 3 > end 1")]
    fn reversed_range_panics() {
        let _ = StrRef::from_range("abcdef", 3, 1);
    }

    #[test]
    #[should_panic(expected = "past buffer length")]
    fn range_past_buffer_panics() {
        let _ = StrRef::from_range("abc", 0, 4);
    }
}
