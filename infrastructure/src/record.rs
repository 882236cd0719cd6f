//! The opaque fingerprint record a collaborator persists once an
//! enrollment commits (3. Data model, "Stored fingerprint record").

/// A single enrolled fingerprint, identified by its 32-byte SDCP
/// enrollment id. Opaque to the driver core beyond that id: no image
/// data, no match template, ever lives here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoredFingerprint {
    enrollment_id: [u8; 32],
}

impl StoredFingerprint {
    /// Wrap an enrollment id produced by a successful enroll-commit.
    pub fn new(enrollment_id: [u8; 32]) -> Self {
        Self { enrollment_id }
    }

    /// The 32-byte SDCP enrollment identifier.
    pub fn enrollment_id(&self) -> [u8; 32] {
        self.enrollment_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_the_enrollment_id() {
        let record = StoredFingerprint::new([0x07; 32]);
        assert_eq!(record.enrollment_id(), [0x07; 32]);
    }
}
