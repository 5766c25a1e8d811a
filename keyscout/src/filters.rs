use glob::Pattern;
use std::path::Path;

/// Checks if a file should be scanned based on its extension.
///
/// Extensions compare case-insensitively and may be written with or without
/// the leading dot, so `"txt"` and `".TXT"` both accept `notes.txt`.
pub fn has_valid_extension(path: &Path, extensions: &Option<Vec<String>>) -> bool {
    match extensions {
        None => true,
        Some(exts) => {
            if let Some(ext) = path.extension() {
                if let Some(ext_str) = ext.to_str() {
                    return exts
                        .iter()
                        .map(|e| e.trim().trim_start_matches('.'))
                        .any(|e| e.eq_ignore_ascii_case(ext_str));
                }
            }
            false
        }
    }
}

/// Checks if a path matches one of the glob ignore patterns.
///
/// Callers pass the path relative to the search root.
pub fn should_ignore(path: &Path, ignore_patterns: &[String]) -> bool {
    if ignore_patterns.is_empty() {
        return false;
    }

    // Patterns use forward slashes on every platform
    let normalized_path = path.to_string_lossy().replace('\\', "/");
    ignore_patterns.iter().any(|pattern| {
        Pattern::new(pattern)
            .map(|p| p.matches(&normalized_path))
            .unwrap_or(false)
    })
}

/// Determines if a file should be included in the search
pub fn should_include_file(
    path: &Path,
    extensions: &Option<Vec<String>>,
    ignore_patterns: &[String],
) -> bool {
    has_valid_extension(path, extensions) && !should_ignore(path, ignore_patterns)
}
