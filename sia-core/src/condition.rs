use crate::model::FileRecord;

/// A pure test over a single listed file.
pub trait FilePredicate {
    fn matches(&self, file: &FileRecord) -> bool;
}

impl<F> FilePredicate for F
where
    F: Fn(&FileRecord) -> bool,
{
    fn matches(&self, file: &FileRecord) -> bool {
        self(file)
    }
}

/// The target states the client knows how to wait for.
#[derive(Debug, Clone, PartialEq)]
pub enum FileCondition {
    /// The node reports the file as servable.
    Available { siapath: String },
    /// Redundancy has reached `threshold` (inclusive).
    RedundancyAtLeast { siapath: String, threshold: f64 },
    /// Upload progress has reached `percent` (inclusive).
    UploadProgressAtLeast { siapath: String, percent: f64 },
}

impl FileCondition {
    pub fn available(siapath: impl Into<String>) -> Self {
        Self::Available {
            siapath: siapath.into(),
        }
    }

    pub fn redundancy_at_least(siapath: impl Into<String>, threshold: f64) -> Self {
        Self::RedundancyAtLeast {
            siapath: siapath.into(),
            threshold,
        }
    }

    pub fn upload_progress_at_least(siapath: impl Into<String>, percent: f64) -> Self {
        Self::UploadProgressAtLeast {
            siapath: siapath.into(),
            percent,
        }
    }

    pub fn siapath(&self) -> &str {
        match self {
            Self::Available { siapath }
            | Self::RedundancyAtLeast { siapath, .. }
            | Self::UploadProgressAtLeast { siapath, .. } => siapath,
        }
    }
}

impl FilePredicate for FileCondition {
    fn matches(&self, file: &FileRecord) -> bool {
        if file.siapath != self.siapath() {
            return false;
        }
        match self {
            Self::Available { .. } => file.available,
            Self::RedundancyAtLeast { threshold, .. } => file.redundancy >= *threshold,
            Self::UploadProgressAtLeast { percent, .. } => file.upload_progress >= *percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(siapath: &str, available: bool, redundancy: f64) -> FileRecord {
        FileRecord {
            siapath: siapath.to_string(),
            file_size: 1,
            available,
            renewing: false,
            redundancy,
            upload_progress: 100.0,
            expiration: 0,
        }
    }

    #[test]
    fn available_requires_matching_path() {
        let condition = FileCondition::available("remote/a");
        assert!(condition.matches(&record("remote/a", true, 0.0)));
        assert!(!condition.matches(&record("remote/a", false, 0.0)));
        assert!(!condition.matches(&record("remote/b", true, 0.0)));
    }

    #[test]
    fn redundancy_threshold_is_inclusive() {
        let condition = FileCondition::redundancy_at_least("a", 3.0);
        assert!(!condition.matches(&record("a", true, 2.99)));
        assert!(condition.matches(&record("a", true, 3.0)));
        assert!(condition.matches(&record("a", false, 4.5)));
        assert!(!condition.matches(&record("b", true, 9.0)));
    }

    #[test]
    fn upload_progress_threshold() {
        let condition = FileCondition::upload_progress_at_least("a", 50.0);
        let mut file = record("a", false, 0.0);
        file.upload_progress = 49.9;
        assert!(!condition.matches(&file));
        file.upload_progress = 50.0;
        assert!(condition.matches(&file));
    }

    #[test]
    fn closures_are_predicates() {
        let large = |file: &FileRecord| file.file_size > 0 && file.renewing;
        let mut file = record("a", true, 1.0);
        assert!(!large.matches(&file));
        file.renewing = true;
        assert!(large.matches(&file));
    }
}
