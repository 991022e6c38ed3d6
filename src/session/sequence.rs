// src/session/sequence.rs — Drop completions that arrive out of order.

/// Hands out increasing sequence numbers and accepts a completion only if
/// nothing newer has been applied yet.
#[derive(Debug, Default, Clone)]
pub struct SequenceGuard {
    issued: u64,
    applied: u64,
}

impl SequenceGuard {
    pub fn next(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// True if `seq` is newer than the last accepted one; it then becomes
    /// the last accepted one.
    pub fn accept(&mut self, seq: u64) -> bool {
        if seq <= self.applied {
            return false;
        }
        self.applied = seq;
        true
    }
}
