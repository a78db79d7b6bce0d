//! Report discovery in output folders.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::NaiveDate;
use glob::{MatchOptions, Pattern};
use tracing::debug;

use crate::error::{IngestError, Result};

/// Patterns tried, in order, when looking for the latest CDR snapshot.
pub const CDR_REPORT_PATTERNS: &[&str] = &["CDR_*.csv", "*CDR*.csv", "*.csv"];

const NAME_MATCH: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

fn file_pattern(pattern: &str) -> Result<Pattern> {
    Pattern::new(pattern).map_err(|e| IngestError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.msg.to_string(),
    })
}

/// Lists files in `dir` whose name matches `pattern`, sorted by name.
pub fn list_matching(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let pattern = file_pattern(pattern)?;
    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| pattern.matches_with(name, NAME_MATCH));
        if matches {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// The last `_`-separated part of a file name, up to its `.`, that reads
/// as `YYYY-MM-DD` or `YYYYMMDD`.
///
/// `CDR_2025-01-06.csv`, `bmo-report_2025-01-06.BMO Report MTD.csv` and
/// `Sales_RNO_Report_20250106.Main Data.csv` all yield 2025-01-06.
pub fn date_from_file_name(path: &Path) -> Option<NaiveDate> {
    let name = path.file_name()?.to_str()?;
    name.split('_').collect::<Vec<_>>().into_iter().skip(1).rev().find_map(|part| {
        let stamp = part.split('.').next()?;
        NaiveDate::parse_from_str(stamp, "%Y-%m-%d")
            .or_else(|_| NaiveDate::parse_from_str(stamp, "%Y%m%d"))
            .ok()
    })
}

fn modified(path: &Path) -> Result<SystemTime> {
    std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map_err(|e| IngestError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Picks the newest of `files`.
///
/// When every name carries a date the newest date wins; otherwise the newest
/// modification time does.
pub fn newest(files: &[PathBuf]) -> Result<Option<PathBuf>> {
    let dated: Option<Vec<(NaiveDate, &PathBuf)>> = files
        .iter()
        .map(|path| date_from_file_name(path).map(|date| (date, path)))
        .collect();

    if let Some(dated) = dated {
        return Ok(dated
            .into_iter()
            .max_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)))
            .map(|(_, path)| path.clone()));
    }

    let mut best: Option<(SystemTime, &PathBuf)> = None;
    for path in files {
        let time = modified(path)?;
        if best.is_none_or(|(best_time, _)| time >= best_time) {
            best = Some((time, path));
        }
    }
    Ok(best.map(|(_, path)| path.clone()))
}

/// Finds the latest report in `dir`.
///
/// Patterns are tried in order; the first one with any match decides the
/// candidate set.
pub fn find_latest_report(dir: &Path, patterns: &[&str]) -> Result<PathBuf> {
    for pattern in patterns {
        let files = list_matching(dir, pattern)?;
        if files.is_empty() {
            continue;
        }
        if let Some(latest) = newest(&files)? {
            debug!(
                dir = %dir.display(),
                pattern,
                candidates = files.len(),
                latest = %latest.display(),
                "selected latest report"
            );
            return Ok(latest);
        }
    }

    Err(IngestError::NoReportFound {
        dir: dir.to_path_buf(),
        patterns: patterns.join(", "),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_pattern_matches_names() {
        let matches = |pattern: &str, name: &str| {
            file_pattern(pattern)
                .unwrap()
                .matches_with(name, NAME_MATCH)
        };
        assert!(matches("CDR_*.csv", "CDR_2025-01-06.csv"));
        assert!(matches("*CDR*.csv", "old_cdr_copy.CSV"));
        assert!(matches("*.csv", "a.csv"));
        assert!(matches("file?.csv", "file1.csv"));
        assert!(matches("Sales_RNO_Report_*.Main Data.csv", "Sales_RNO_Report_20250310.Main Data.csv"));
        assert!(!matches("CDR_*.csv", "CDR_2025.xlsx"));
        assert!(!matches("*.csv", "csv"));
    }

    #[test]
    fn test_invalid_pattern() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            list_matching(dir.path(), "[CDR_*.csv"),
            Err(IngestError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_list_matching_ignores_case_and_sorts() {
        let dir = TempDir::new().unwrap();
        for name in ["b_cdr.CSV", "a_CDR.csv", "notes.txt"] {
            std::fs::write(dir.path().join(name), "a\n1\n").unwrap();
        }

        let files = list_matching(dir.path(), "*cdr*.csv").unwrap();
        let names: Vec<_> = files.iter().map(|path| path.file_name().unwrap()).collect();
        assert_eq!(names, vec!["a_CDR.csv", "b_cdr.CSV"]);
    }

    #[test]
    fn test_date_from_file_name() {
        assert_eq!(
            date_from_file_name(Path::new("CDR_2025-01-06.csv")),
            NaiveDate::from_ymd_opt(2025, 1, 6)
        );
        assert_eq!(
            date_from_file_name(Path::new("Sales_RNO_Report_20250106.Main Data.csv")),
            NaiveDate::from_ymd_opt(2025, 1, 6)
        );
        assert_eq!(
            date_from_file_name(Path::new("Combined_Outbound_WMS_20250106.csv")),
            NaiveDate::from_ymd_opt(2025, 1, 6)
        );
        assert_eq!(date_from_file_name(Path::new("CDR.csv")), None);
        assert_eq!(date_from_file_name(Path::new("CDR_Report.csv")), None);
    }

    #[test]
    fn test_first_matching_pattern_decides() {
        let dir = TempDir::new().unwrap();
        for name in ["CDR_2025-01-05.csv", "CDR_2025-01-06.csv", "zzz.csv"] {
            std::fs::write(dir.path().join(name), "a\n1\n").unwrap();
        }

        let latest = find_latest_report(dir.path(), CDR_REPORT_PATTERNS).unwrap();
        assert_eq!(latest.file_name().unwrap(), "CDR_2025-01-06.csv");
    }

    #[test]
    fn test_no_report_found() {
        let dir = TempDir::new().unwrap();
        let result = find_latest_report(dir.path(), CDR_REPORT_PATTERNS);
        assert!(matches!(result, Err(IngestError::NoReportFound { .. })));
    }

    #[test]
    fn test_missing_directory() {
        let result = find_latest_report(Path::new("/no/such/dir"), &["*.csv"]);
        assert!(matches!(result, Err(IngestError::DirectoryNotFound { .. })));
    }
}
