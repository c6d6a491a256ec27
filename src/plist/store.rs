//! Atomic file (de)serialization for [`Node`] trees.

use super::Node;
use crate::error::{Error, Result};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// What: Load a node tree from an XML property-list file.
///
/// Inputs:
/// - `path`: file to read.
///
/// Output:
/// - `Ok(Node)` on success.
/// - `Err(Error::Io)` if the file does not exist or cannot be read.
/// - `Err(Error::MalformedPlist)` if the bytes are not a well-formed plist.
pub fn load(path: &Path) -> Result<Node> {
    let file = File::open(path)?;
    let value = ::plist::Value::from_reader(BufReader::new(file))?;
    Node::try_from(value)
}

/// What: Write a node tree to a file, atomically.
///
/// Inputs:
/// - `path`: destination file.
/// - `tree`: the document to serialize.
///
/// Output:
/// - `Ok(())` once the file has landed at `path`.
///
/// Details:
/// - Writes to `path.tmp` first, flushes and syncs it, then renames it over
///   `path`. A crash at any point before the rename leaves the previous file
///   at `path` untouched, matching the durability guarantee in §5.
pub fn store(path: &Path, tree: &Node) -> Result<()> {
    let tmp_path = tmp_path_for(path);
    {
        let file = File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);
        let value = ::plist::Value::from(tree);
        value.to_writer_xml(&mut writer)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
    }
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

/// What: Parse a node tree from in-memory XML property-list bytes.
///
/// Details:
/// - Used to read the `props.plist`/`files.plist` entries extracted from an
///   archive, which never touch disk as standalone files.
pub fn load_bytes(bytes: &[u8]) -> Result<Node> {
    let value = ::plist::Value::from_reader(std::io::Cursor::new(bytes))?;
    Node::try_from(value)
}

/// What: Load a node tree from a gzip-compressed property-list file.
///
/// Details:
/// - Used only for the repository list (§4 data model); every other document
///   is stored uncompressed via [`load`]/[`store`].
pub fn load_compressed(path: &Path) -> Result<Node> {
    let file = File::open(path)?;
    let mut decoder = GzDecoder::new(BufReader::new(file));
    let mut xml = Vec::new();
    decoder.read_to_end(&mut xml)?;
    let value = ::plist::Value::from_reader(std::io::Cursor::new(xml))?;
    Node::try_from(value)
}

/// What: Write a node tree to a gzip-compressed file, atomically.
pub fn store_compressed(path: &Path, tree: &Node) -> Result<()> {
    let tmp_path = tmp_path_for(path);
    {
        let value = ::plist::Value::from(tree);
        let mut xml = Vec::new();
        value.to_writer_xml(&mut xml)?;

        let file = File::create(&tmp_path)?;
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        encoder.write_all(&xml)?;
        let mut writer = encoder.finish()?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
    }
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

/// What: Derive the `path.tmp` sibling used as the atomic-write staging file.
fn tmp_path_for(path: &Path) -> std::path::PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    tmp.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_tree() -> Node {
        let mut dict = Node::dict();
        dict.set("pkgindex-version", Node::from("1.0"));
        dict.set("location-local", Node::from("/srv/repo"));
        dict.set("total-pkgs", Node::from(1_i64));
        let mut pkg = Node::dict();
        pkg.set("pkgname", Node::from("foo"));
        pkg.set("version", Node::from("1.0_1"));
        dict.set("packages", Node::Array(vec![pkg]));
        dict
    }

    // Allow unwrap in tests - test failures should panic
    #[allow(clippy::unwrap_used)]
    #[test]
    fn store_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pkg-index.plist");
        let tree = sample_tree();
        store(&path, &tree).unwrap();
        let loaded = load(&path).unwrap();
        assert_eq!(tree, loaded);
    }

    // Allow unwrap in tests - test failures should panic
    #[allow(clippy::unwrap_used)]
    #[test]
    fn store_leaves_no_tmp_file_behind() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("regpkgdb.plist");
        store(&path, &sample_tree()).unwrap();
        assert!(!tmp_path_for(&path).exists());
        assert!(path.exists());
    }

    // Allow unwrap in tests - test failures should panic
    #[allow(clippy::unwrap_used)]
    #[test]
    fn compressed_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("repositories.plist");
        let tree = sample_tree();
        store_compressed(&path, &tree).unwrap();
        let loaded = load_compressed(&path).unwrap();
        assert_eq!(tree, loaded);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("absent.plist");
        assert!(matches!(load(&path), Err(Error::Io(_))));
    }

    // Allow unwrap in tests - test failures should panic
    #[allow(clippy::unwrap_used)]
    #[test]
    fn load_bytes_parses_in_memory_xml() {
        let tree = sample_tree();
        let value = ::plist::Value::from(&tree);
        let mut xml = Vec::new();
        value.to_writer_xml(&mut xml).unwrap();
        assert_eq!(load_bytes(&xml).unwrap(), tree);
    }
}
