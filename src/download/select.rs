//! Candidate selection: bucket listing filter and pre-signed URL naming

use log::debug;

use super::pattern::SearchPattern;
use super::types::{key_basename, key_depth, ObjectCandidate};
use crate::error::{Error, Result};

/// Filter a bucket listing down to download candidates, keeping listing order.
///
/// A key is accepted when its basename matches `pattern`, it is not a
/// directory marker, it starts with `s3_directory`, and, when
/// `current_directory_only` is set, it sits at the same depth as
/// `s3_directory + pattern`.
pub fn select_candidates(
    listing: impl IntoIterator<Item = ObjectCandidate>,
    s3_directory: &str,
    pattern: &SearchPattern,
    current_directory_only: bool,
) -> Vec<ObjectCandidate> {
    let target_depth = key_depth(&format!("{}{}", s3_directory, pattern.as_str()));

    listing
        .into_iter()
        .filter(|candidate| {
            let key = candidate.key.as_str();
            let accepted = pattern.matches(key_basename(key))
                && !key.ends_with('/')
                && key.starts_with(s3_directory)
                && (!current_directory_only || key_depth(key) == target_depth);
            if !accepted {
                debug!("select_skip: key={}", key);
            }
            accepted
        })
        .collect()
}

/// Object name for a pre-signed URL: the last path segment before the query.
pub fn object_name_from_url(url: &str) -> Result<String> {
    let path = url.split('?').next().unwrap_or(url);
    let segment = key_basename(path);
    let name = urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string());

    if name.is_empty() {
        return Err(Error::Configuration(format!(
            "cannot determine object name from pre-signed URL '{}'",
            path
        )));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(candidates: &[ObjectCandidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.key.as_str()).collect()
    }

    fn listing(keys: &[&str]) -> Vec<ObjectCandidate> {
        keys.iter().map(|k| ObjectCandidate::new(*k)).collect()
    }

    #[test]
    fn current_directory_only_excludes_nested_keys() {
        let pattern = SearchPattern::new("*.csv").unwrap();
        let selected = select_candidates(
            listing(&[
                "reports/2023/jan.csv",
                "reports/2023/feb.csv",
                "reports/2023/sub/old.csv",
            ]),
            "reports/2023/",
            &pattern,
            true,
        );
        assert_eq!(keys(&selected), vec!["reports/2023/jan.csv", "reports/2023/feb.csv"]);
    }

    #[test]
    fn nested_keys_included_without_restriction() {
        let pattern = SearchPattern::new("*.csv").unwrap();
        let selected = select_candidates(
            listing(&["reports/2023/jan.csv", "reports/2023/sub/old.csv"]),
            "reports/2023/",
            &pattern,
            false,
        );
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn directory_markers_never_selected() {
        let pattern = SearchPattern::new("*").unwrap();
        let selected = select_candidates(
            listing(&["reports/", "reports/2023/", "reports/a.txt"]),
            "reports/",
            &pattern,
            false,
        );
        assert_eq!(keys(&selected), vec!["reports/a.txt"]);
    }

    #[test]
    fn keys_outside_prefix_are_dropped() {
        let pattern = SearchPattern::new("*.txt").unwrap();
        let selected = select_candidates(
            listing(&["other/a.txt", "in/b.txt", "in/c.bin"]),
            "in/",
            &pattern,
            false,
        );
        assert_eq!(keys(&selected), vec!["in/b.txt"]);
    }

    #[test]
    fn empty_directory_at_bucket_root() {
        let pattern = SearchPattern::new("*.txt").unwrap();
        let selected =
            select_candidates(listing(&["a.txt", "dir/b.txt"]), "", &pattern, true);
        assert_eq!(keys(&selected), vec!["a.txt"]);
    }

    #[test]
    fn object_name_taken_before_query_marker() {
        assert_eq!(
            object_name_from_url("https://bucket.s3.amazonaws.com/dir/file%20one.txt?X-Amz-Signature=abc")
                .unwrap(),
            "file one.txt"
        );
        assert_eq!(
            object_name_from_url("https://host/plain.bin").unwrap(),
            "plain.bin"
        );
        assert!(object_name_from_url("https://host/dir/?sig=1").is_err());
    }
}
