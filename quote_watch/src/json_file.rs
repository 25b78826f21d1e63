//! Whole-file JSON persistence shared by the preference file and the quote store.
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use quote_common::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Read `path` as JSON, or `None` when the file does not exist yet.
pub fn read<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(serde_json::from_str(&text)?)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Replace `path` with `value`. Readers see the old or the new content, never a mix.
pub fn write<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    let tmp = temp_path(path);
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[test]
    fn missing_file_reads_as_none() {
        let tmp = TempDir::new().unwrap();
        let value: Option<BTreeMap<String, i32>> = read(&tmp.path().join("absent.json")).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn write_replaces_content_and_leaves_no_temp_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("data.json");
        write(&path, &BTreeMap::from([("a", 1)])).unwrap();
        write(&path, &BTreeMap::from([("b", 2)])).unwrap();

        let value: BTreeMap<String, i32> = read(&path).unwrap().unwrap();
        assert_eq!(value, BTreeMap::from([("b".to_string(), 2)]));
        assert!(!tmp.path().join("data.json.tmp").exists());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(read::<BTreeMap<String, i32>>(&path).is_err());
    }
}
