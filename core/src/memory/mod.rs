//! Memory safety and zeroization foundation (Secure Core).
//!
//! This module is the ROOT of the trusted dependency graph.
//! All cryptography, keystores, and policy enforcement depend on
//! the guarantees enforced here.
//!
//! ─────────────────────────────────────────────────────────────
//! FORMAL SECURITY INVARIANTS (NON-NEGOTIABLE)
//!
//! I1. No stack-resident secrets.
//! I2. All secret material MUST be heap-allocated.
//! I3. All secret material MUST be deterministically zeroized.
//! I4. Long-lived secrets MUST reside in locked memory.
//! I5. Clone / Copy of secrets MUST be impossible.
//! I6. Public APIs MUST NOT expose unsafe memory access.
//! I7. Failure MUST leave memory in a safe, wiped state.
//!
//! Any violation of these invariants is a SECURITY BUG.
//! ─────────────────────────────────────────────────────────────

pub mod guard;

// ─────────────────────────────────────────────────────────────
// Curated public surface
// ─────────────────────────────────────────────────────────────
//
// Only export what other layers are allowed to touch.
// No wildcard exports.
// No internal helpers exposed.

pub use guard::{GuardedBox, GuardedBytes32, GuardedKey32};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guarded_key32_is_zeroed_on_init() {
        let key = GuardedKey32::zeroed();
        assert!(key.borrow().iter().all(|b| *b == 0));
    }

    #[test]
    fn guarded_key32_clone_is_independent() {
        let mut key = GuardedKey32::new([0xAA; 32]);
        let clone = key.clone();
        key.borrow_mut()[0] = 0x00;
        assert_eq!(clone.borrow()[0], 0xAA);
    }
}