//! Hallucination guard: drop findings that point at files outside the change.

use std::collections::HashSet;

use crate::finding::Finding;

/// Keep general findings and findings whose file is in `filenames`.
///
/// An empty `filenames` set disables the filter.
pub fn filter_grounded(findings: Vec<Finding>, filenames: &HashSet<&str>) -> Vec<Finding> {
    if filenames.is_empty() {
        return findings;
    }
    findings
        .into_iter()
        .filter(|f| match f.file.as_deref() {
            None => true,
            Some(file) => filenames.contains(file),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::Severity;

    fn finding(file: Option<&str>) -> Finding {
        let f = Finding::new("security", Severity::High, "security", "issue");
        match file {
            Some(path) => f.at(path, Some(1)),
            None => f,
        }
    }

    #[test]
    fn test_drops_file_absent_from_change_set() {
        let names: HashSet<&str> = ["y.ts"].into_iter().collect();
        let out = filter_grounded(vec![finding(Some("x.ts"))], &names);
        assert!(out.is_empty());
    }

    #[test]
    fn test_keeps_file_present_in_change_set() {
        let names: HashSet<&str> = ["x.ts", "y.ts"].into_iter().collect();
        let out = filter_grounded(vec![finding(Some("x.ts"))], &names);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_general_findings_always_kept() {
        let names: HashSet<&str> = ["y.ts"].into_iter().collect();
        let out = filter_grounded(vec![finding(None)], &names);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_exact_filename_match_only() {
        let names: HashSet<&str> = ["src/x.ts"].into_iter().collect();
        let out = filter_grounded(vec![finding(Some("x.ts")), finding(Some("./src/x.ts"))], &names);
        assert!(out.is_empty());
    }

    #[test]
    fn test_empty_filename_set_is_noop() {
        let input = vec![finding(Some("anything.rs")), finding(None)];
        let out = filter_grounded(input.clone(), &HashSet::new());
        assert_eq!(out, input);
    }
}
