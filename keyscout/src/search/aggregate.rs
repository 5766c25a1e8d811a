use crate::results::{FinalResult, PartialResult};

/// Merges the partial results of a finished run.
///
/// `partials` must be in worker-index order; each keyword's file list is the
/// concatenation of the workers' lists in that order. Chunks are disjoint, so
/// no path can appear twice under one keyword and nothing is deduplicated.
pub fn aggregate(partials: Vec<PartialResult>) -> FinalResult {
    let mut merged = PartialResult::new();
    for partial in partials {
        merged.merge(partial);
    }
    FinalResult::from(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    #[test]
    fn test_concatenates_in_worker_order() {
        let first = PartialResult::for_file(Path::new("a.txt"), ["alpha", "beta"], 10);
        let second = PartialResult::for_file(Path::new("b.txt"), ["beta", "gamma"], 10);

        let result = aggregate(vec![first, second]);
        assert_eq!(result.get("alpha"), &[PathBuf::from("a.txt")]);
        assert_eq!(
            result.get("beta"),
            &[PathBuf::from("a.txt"), PathBuf::from("b.txt")]
        );
        assert_eq!(result.get("gamma"), &[PathBuf::from("b.txt")]);
        assert!(result.get("delta").is_empty());
        assert_eq!(result.files_scanned, 2);
        assert_eq!(result.bytes_read, 20);
    }

    #[test]
    fn test_order_follows_input_not_path_names() {
        let first = PartialResult::for_file(Path::new("z.txt"), ["kw"], 1);
        let second = PartialResult::for_file(Path::new("a.txt"), ["kw"], 1);

        let result = aggregate(vec![first, second]);
        assert_eq!(
            result.get("kw"),
            &[PathBuf::from("z.txt"), PathBuf::from("a.txt")]
        );
    }

    #[test]
    fn test_empty_partials() {
        let result = aggregate(vec![PartialResult::new(), PartialResult::new()]);
        assert!(result.is_empty());
        assert_eq!(result.files_scanned, 0);

        assert_eq!(aggregate(Vec::new()), FinalResult::new());
    }

    #[test]
    fn test_skipped_files_are_kept() {
        let mut first = PartialResult::new();
        first.record_skip(
            Path::new("bad.txt"),
            &crate::errors::SearchError::file_not_found("bad.txt"),
        );
        let second = PartialResult::for_file(Path::new("ok.txt"), ["kw"], 1);

        let result = aggregate(vec![first, second]);
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.get("kw"), &[PathBuf::from("ok.txt")]);
    }
}
