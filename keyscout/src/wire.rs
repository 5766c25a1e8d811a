//! Serde helpers for paths that have to survive a JSON round trip.
//!
//! A path that is valid UTF-8 is written as a plain string. Anything else is
//! written as the platform's raw path units (bytes on unix, UTF-16 units on
//! windows) so that the worker on the other side of the pipe opens exactly
//! the same file.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[cfg(unix)]
type RawPath = Vec<u8>;

#[cfg(unix)]
fn to_raw(path: &Path) -> RawPath {
    use std::os::unix::ffi::OsStrExt;
    path.as_os_str().as_bytes().to_vec()
}

#[cfg(unix)]
fn from_raw(raw: RawPath) -> PathBuf {
    use std::os::unix::ffi::OsStringExt;
    std::ffi::OsString::from_vec(raw).into()
}

#[cfg(windows)]
type RawPath = Vec<u16>;

#[cfg(windows)]
fn to_raw(path: &Path) -> RawPath {
    use std::os::windows::ffi::OsStrExt;
    path.as_os_str().encode_wide().collect()
}

#[cfg(windows)]
fn from_raw(raw: RawPath) -> PathBuf {
    use std::os::windows::ffi::OsStringExt;
    std::ffi::OsString::from_wide(&raw).into()
}

#[cfg(not(any(unix, windows)))]
type RawPath = String;

#[cfg(not(any(unix, windows)))]
fn to_raw(path: &Path) -> RawPath {
    path.to_string_lossy().into_owned()
}

#[cfg(not(any(unix, windows)))]
fn from_raw(raw: RawPath) -> PathBuf {
    PathBuf::from(raw)
}

struct WirePath<'a>(&'a Path);

impl Serialize for WirePath<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.0.to_str() {
            Some(text) => serializer.serialize_str(text),
            None => to_raw(self.0).serialize(serializer),
        }
    }
}

struct WirePaths<'a>(&'a [PathBuf]);

impl Serialize for WirePaths<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.0.iter().map(|path| WirePath(path.as_path())))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OwnedWirePath {
    Text(String),
    Raw(RawPath),
}

impl From<OwnedWirePath> for PathBuf {
    fn from(wire: OwnedWirePath) -> Self {
        match wire {
            OwnedWirePath::Text(text) => PathBuf::from(text),
            OwnedWirePath::Raw(raw) => from_raw(raw),
        }
    }
}

/// `#[serde(with)]` module for a single path
pub mod path {
    use super::*;

    pub fn serialize<S>(path: &Path, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        WirePath(path).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<PathBuf, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(OwnedWirePath::deserialize(deserializer)?.into())
    }
}

/// `#[serde(with)]` module for a list of paths
pub mod path_list {
    use super::*;

    pub fn serialize<S>(paths: &[PathBuf], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        WirePaths(paths).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<PathBuf>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let wire = Vec::<OwnedWirePath>::deserialize(deserializer)?;
        Ok(wire.into_iter().map(PathBuf::from).collect())
    }
}

/// `#[serde(with)]` module for keyword to paths maps
pub mod path_map {
    use super::*;

    pub fn serialize<S>(
        map: &BTreeMap<String, Vec<PathBuf>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(map.iter().map(|(keyword, paths)| (keyword, WirePaths(paths))))
    }

    pub fn deserialize<'de, D>(
        deserializer: D,
    ) -> Result<BTreeMap<String, Vec<PathBuf>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let wire = BTreeMap::<String, Vec<OwnedWirePath>>::deserialize(deserializer)?;
        Ok(wire
            .into_iter()
            .map(|(keyword, paths)| (keyword, paths.into_iter().map(PathBuf::from).collect()))
            .collect())
    }
}
