/// Fact-local primary keys: sequential from 1, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySequence {
    next: i64,
}

impl Default for KeySequence {
    fn default() -> Self {
        Self::new()
    }
}

impl KeySequence {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Hands out the next key.
    pub fn next_key(&mut self) -> i64 {
        let key = self.next;
        self.next += 1;
        key
    }

    /// Number of keys handed out so far.
    pub fn issued(&self) -> i64 {
        self.next - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_sequential() {
        let mut sequence = KeySequence::new();
        assert_eq!(sequence.next_key(), 1);
        assert_eq!(sequence.next_key(), 2);
        assert_eq!(sequence.issued(), 2);
    }
}
