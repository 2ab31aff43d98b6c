//! Progress reporting for resumable uploads.
//!
//! The remote side reports how many bytes it has committed after each chunk;
//! the driver forwards that as an [`UploadProgress`] snapshot.

/// Snapshot of upload progress for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadProgress {
    /// Bytes the server has acknowledged so far.
    pub bytes_sent: u64,
    /// Total file size in bytes.
    pub total_bytes: u64,
}

impl UploadProgress {
    pub fn new(bytes_sent: u64, total_bytes: u64) -> Self {
        Self {
            bytes_sent,
            total_bytes,
        }
    }

    /// Fraction complete in [0.0, 1.0].
    pub fn fraction(&self) -> f64 {
        if self.total_bytes == 0 {
            return 1.0;
        }
        (self.bytes_sent as f64 / self.total_bytes as f64).min(1.0)
    }

    pub fn percent(&self) -> f64 {
        self.fraction() * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_bounds() {
        assert_eq!(UploadProgress::new(0, 0).fraction(), 1.0);
        assert_eq!(UploadProgress::new(0, 100).fraction(), 0.0);
        assert_eq!(UploadProgress::new(50, 100).percent(), 50.0);
        assert_eq!(UploadProgress::new(150, 100).fraction(), 1.0);
    }
}
