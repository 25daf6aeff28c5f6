// Dense unique ID issuer.

/// Issues dense unique integer IDs within one trie generation.
///
/// Node IDs being dense and unique is what allows node *sets* to be hashed
/// canonically during subset construction.
#[derive(Debug, Default)]
pub struct Counter {
    next: usize,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next ID. IDs start at 0 and increase by 1.
    pub fn next(&mut self) -> usize {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Number of IDs issued so far.
    pub fn issued(&self) -> usize {
        self.next
    }
}
