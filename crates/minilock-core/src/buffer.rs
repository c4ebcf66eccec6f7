//! Bounded password buffer
//!
//! Holds the passphrase typed so far. The contents are wiped whenever the
//! buffer is cleared or dropped and are never exposed through `Debug`.

use std::fmt;

use zeroize::{Zeroize, Zeroizing};

/// Buffer capacity in bytes, including the byte reserved for a terminator
pub const PASSWORD_CAPACITY: usize = 256;

/// Password input buffer with a hard byte capacity
pub struct PasswordBuffer {
    contents: Zeroizing<String>,
    capacity: usize,
}

impl PasswordBuffer {
    /// Create an empty buffer with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(PASSWORD_CAPACITY)
    }

    /// Create an empty buffer holding at most `capacity - 1` bytes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            contents: Zeroizing::new(String::with_capacity(capacity)),
            capacity,
        }
    }

    /// Append decoded key text
    ///
    /// The text is taken whole or not at all: if the resulting length would
    /// reach the capacity, nothing is appended and `false` is returned.
    pub fn push_str(&mut self, text: &str) -> bool {
        if self.contents.len() + text.len() >= self.capacity {
            return false;
        }
        self.contents.push_str(text);
        true
    }

    /// Remove the last character, returning whether one was removed
    pub fn pop(&mut self) -> bool {
        // Truncated bytes stay in spare capacity until the next clear or drop,
        // both of which wipe the whole allocation.
        self.contents.pop().is_some()
    }

    /// Wipe the buffer, including spare capacity
    pub fn clear(&mut self) {
        self.contents.zeroize();
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// Number of characters, used for the mask
    pub fn char_count(&self) -> usize {
        self.contents.chars().count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Borrow the plaintext for verification
    pub fn as_str(&self) -> &str {
        &self.contents
    }
}

impl Default for PasswordBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PasswordBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordBuffer")
            .field("len", &self.contents.len())
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_pop() {
        let mut buffer = PasswordBuffer::new();
        assert!(buffer.push_str("o"));
        assert!(buffer.push_str("r"));
        assert_eq!(buffer.as_str(), "or");

        assert!(buffer.pop());
        assert_eq!(buffer.as_str(), "o");
        assert!(buffer.pop());
        assert!(!buffer.pop());
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_capacity_leaves_room_for_terminator() {
        let mut buffer = PasswordBuffer::with_capacity(4);
        assert!(buffer.push_str("abc"));
        assert!(!buffer.push_str("d"));
        assert_eq!(buffer.as_str(), "abc");
        assert_eq!(buffer.len(), 3);
    }

    #[test]
    fn test_multibyte_is_rejected_atomically() {
        let mut buffer = PasswordBuffer::with_capacity(4);
        assert!(buffer.push_str("ab"));
        // 'é' is two bytes and would fill the reserved byte
        assert!(!buffer.push_str("é"));
        assert_eq!(buffer.as_str(), "ab");
        assert!(buffer.push_str("c"));
    }

    #[test]
    fn test_pop_removes_whole_character() {
        let mut buffer = PasswordBuffer::new();
        buffer.push_str("aé");
        assert_eq!(buffer.char_count(), 2);
        assert_eq!(buffer.len(), 3);

        buffer.pop();
        assert_eq!(buffer.as_str(), "a");
    }

    #[test]
    fn test_clear() {
        let mut buffer = PasswordBuffer::new();
        buffer.push_str("secret");
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.char_count(), 0);
    }

    #[test]
    fn test_debug_hides_contents() {
        let mut buffer = PasswordBuffer::new();
        buffer.push_str("hunter2");
        let debug = format!("{:?}", buffer);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("len: 7"));
    }
}
