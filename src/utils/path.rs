//! Sibling file discovery next to a script

use std::path::{Path, PathBuf};

use tracing::debug;

/// Path of `script` with its extension replaced by `suffix`.
///
/// `video.avs` + `.otc.txt` → `video.otc.txt`. Suffixes are appended
/// verbatim, so `_Chapters.xml` gives `video_Chapters.xml`.
pub fn with_suffix(script: &Path, suffix: &str) -> PathBuf {
    let mut stem = script.with_extension("").into_os_string();
    stem.push(suffix);
    PathBuf::from(stem)
}

/// First existing `script` sibling built from `suffixes`, in order
pub fn find_sibling(script: &Path, suffixes: &[String]) -> Option<PathBuf> {
    suffixes
        .iter()
        .map(|suffix| with_suffix(script, suffix))
        .find(|candidate| {
            let exists = candidate.is_file();
            debug!("Looking for {}: {}", candidate.display(), exists);
            exists
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_with_suffix() {
        assert_eq!(
            with_suffix(Path::new("dir/video.avs"), ".otc.txt"),
            PathBuf::from("dir/video.otc.txt")
        );
        assert_eq!(
            with_suffix(Path::new("video"), "_Chapters.xml"),
            PathBuf::from("video_Chapters.xml")
        );
    }

    #[test]
    fn test_find_sibling_respects_order() {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("video.avs");
        fs::write(dir.path().join("video.txt"), "").unwrap();
        fs::write(dir.path().join("video.tc.txt"), "").unwrap();

        let suffixes = vec![".tc.txt".to_string(), ".txt".to_string()];
        assert_eq!(
            find_sibling(&script, &suffixes),
            Some(dir.path().join("video.tc.txt"))
        );
    }

    #[test]
    fn test_find_sibling_none() {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("video.avs");
        assert_eq!(find_sibling(&script, &[".tc.txt".to_string()]), None);
    }
}
