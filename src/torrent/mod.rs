//! Module for `.torrent` metadata ([v1](http://bittorrent.org/beps/bep_0003.html))
//! related parsing/encoding/creation.
//!
//! Metadata produced here always uses the multi-file layout: `info` carries
//! a `files` list even when only one file is described.

use crate::bencode::{BencodeElem, Dictionary};
use crate::digest::{self, Digest};
use crate::TorrentTreeError;
use itertools::Itertools;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;

mod build;
mod piece;
mod read;
mod write;

pub use self::piece::{hash_pieces, PieceLength, DEFAULT_PIECE_LENGTH, MAX_FIXED_PIECE_LENGTH};

const PIECE_STRING_LENGTH: usize = digest::DIGEST_LENGTH;

/// A piece in `pieces`--the SHA1 hash of a torrent block.
pub type Piece = Vec<u8>;
/// Corresponds to a bencode integer. The underlying type is `i64`.
pub type Integer = i64;

/// A file contained in a torrent.
///
/// Unknown/extension fields will be placed in `extra_fields`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct File {
    /// File size in bytes.
    pub length: Integer,
    /// Path segments, as recorded in `path`.
    pub path: Vec<String>,
    /// Fields other than `length` and `path`.
    pub extra_fields: Option<Dictionary>,
}

/// Everything found in a *.torrent* file.
///
/// Unknown/extension fields will be placed in `extra_fields` (if the unknown
/// fields are found in the `info` dictionary then they are placed in
/// `extra_info_fields`). `private` lives in `extra_info_fields` too.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Torrent {
    /// URL of the torrent's tracker.
    pub announce: String,
    /// Total torrent size in bytes (i.e. sum of all files' sizes).
    pub length: Integer,
    pub files: Vec<File>,
    pub name: String,
    /// Block size in bytes.
    pub piece_length: Integer,
    /// SHA1 hashes of each block, in file order.
    pub pieces: Vec<Piece>,
    /// Top-level fields other than `announce` and `info`.
    pub extra_fields: Option<Dictionary>,
    /// Fields in `info` other than `files`, `name`, `piece length` and `pieces`.
    pub extra_info_fields: Option<Dictionary>,
}

/// Builder for creating `Torrent`s from a file or a byte stream.
///
/// This struct is used for **creating** `Torrent`s, so that you can
/// encode/serialize them to *.torrent* files. If you want to read
/// existing *.torrent* files then use [`Torrent::read_from_file()`]
/// or [`Torrent::read_from_bytes()`].
///
/// Required fields: `announce`, `path`, and `piece_length`.
/// They are set when calling the constructor [`new()`].
///
/// Optional fields can be set by calling the corresponding methods
///  (e.g. [`set_name()`]). Fields can be updated in the same way.
///
/// [`Torrent::read_from_file()`]: struct.Torrent.html#method.read_from_file
/// [`Torrent::read_from_bytes()`]: struct.Torrent.html#method.read_from_bytes
/// [`new()`]: #method.new
/// [`set_name()`]: #method.set_name
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TorrentBuilder {
    announce: String,
    name: Option<String>,
    path: PathBuf,
    file_path: Option<String>,
    piece_length: PieceLength,
    extra_fields: Option<Dictionary>,
    extra_info_fields: Option<Dictionary>,
    is_private: bool,
    #[cfg(feature = "parallel_single_file_hashing")]
    num_threads: usize,
}

/// Derive the content identifier (info hash) of serialized metadata.
///
/// `serialized` is decoded, its `info` dictionary is re-encoded and hashed.
/// The result only matches the identifier other tools compute when the
/// keys of `info` were already in canonical order in `serialized`.
pub fn content_identifier<B>(serialized: B) -> Result<Digest, TorrentTreeError>
where
    B: AsRef<[u8]>,
{
    let root = BencodeElem::from_bytes(serialized)?;
    let info = root.get("info")?.ok_or_else(|| {
        TorrentTreeError::MalformedTorrent(Cow::Borrowed("\"info\" does not exist."))
    })?;
    let id = digest::hash(&info.encode()?);

    tracing::debug!(info_hash = %digest::to_hex(&id), "derived content identifier");
    Ok(id)
}

impl Torrent {
    /// Construct the `info` dict based on the fields of `self`.
    ///
    /// Certain operations on torrents, such as calculating info
    /// hashes, require the extracted `info` dict. This
    /// convenience method does that.
    ///
    /// Note that the `info` dict is constructed each time this method
    /// is called (i.e. the return value is not cached).
    pub fn construct_info(&self) -> Result<BencodeElem, TorrentTreeError> {
        let mut info = BencodeElem::Dictionary(Dictionary::new());

        info.insert(
            "files",
            BencodeElem::List(
                self.files
                    .iter()
                    .cloned()
                    .map(File::into_bencode_elem)
                    .collect(),
            ),
        )?;
        info.insert("name", BencodeElem::from(self.name.as_str()))?;
        info.insert("piece length", BencodeElem::Integer(self.piece_length))?;

        let mut pieces = BencodeElem::Bytes(Vec::with_capacity(
            self.pieces.len() * PIECE_STRING_LENGTH,
        ));
        for piece in &self.pieces {
            pieces.append_bytes(piece)?;
        }
        info.insert("pieces", pieces)?;

        if let Some(ref extra_info_fields) = self.extra_info_fields {
            info.as_dictionary_mut()?
                .extend(extra_info_fields.clone());
        }

        Ok(info)
    }

    /// Calculate the `Torrent`'s info hash as defined in
    /// [BEP 3](http://bittorrent.org/beps/bep_0003.html).
    ///
    /// Note that the calculated info hash is not cached.
    pub fn info_hash(&self) -> Result<Digest, TorrentTreeError> {
        Ok(digest::hash(&self.construct_info()?.encode()?))
    }

    /// Same as [`info_hash()`], formatted as lower-case hex.
    ///
    /// [`info_hash()`]: #method.info_hash
    pub fn info_hash_hex(&self) -> Result<String, TorrentTreeError> {
        Ok(digest::to_hex(&self.info_hash()?))
    }

    /// Calculate the `Torrent`'s magnet link as defined in
    /// [BEP 9](http://bittorrent.org/beps/bep_0009.html).
    ///
    /// The `dn` parameter is set to `self.name` and `tr` to
    /// `self.announce`, both percent-encoded.
    pub fn magnet_link(&self) -> Result<String, TorrentTreeError> {
        Ok(format!(
            "magnet:?xt=urn:btih:{}&dn={}&tr={}",
            self.info_hash_hex()?,
            utf8_percent_encode(&self.name, NON_ALPHANUMERIC),
            utf8_percent_encode(&self.announce, NON_ALPHANUMERIC),
        ))
    }

    /// Check if this torrent is private as defined in
    /// [BEP 27](http://bittorrent.org/beps/bep_0027.html).
    ///
    /// Returns `true` if `private` maps to a bencode integer `1`.
    /// Returns `false` otherwise.
    pub fn is_private(&self) -> bool {
        match self.extra_info_fields {
            Some(ref dict) => match dict.get(&b"private"[..]) {
                Some(&BencodeElem::Integer(val)) => val == 1,
                _ => false,
            },
            None => false,
        }
    }
}

fn fmt_extra_fields(fields: &Option<Dictionary>, f: &mut fmt::Formatter) -> fmt::Result {
    if let Some(ref fields) = *fields {
        write!(
            f,
            "{}",
            fields.iter().format_with("", |(k, v), f| f(&format_args!(
                "-{}: {}\n",
                String::from_utf8_lossy(k),
                v
            )))
        )?;
    }
    Ok(())
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "{}\n\
             -size: {} bytes",
            self.path.join("/"),
            self.length
        )?;
        fmt_extra_fields(&self.extra_fields, f)?;
        writeln!(f, "========================================")
    }
}

impl fmt::Display for Torrent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}.torrent", self.name)?;
        writeln!(f, "-announce: {}", self.announce)?;
        writeln!(f, "-size: {} bytes", self.length)?;
        writeln!(f, "-piece length: {} bytes", self.piece_length)?;
        fmt_extra_fields(&self.extra_fields, f)?;
        fmt_extra_fields(&self.extra_info_fields, f)?;

        writeln!(f, "-files:")?;
        for (counter, file) in self.files.iter().enumerate() {
            writeln!(f, "[{}] {}", counter + 1, file)?;
        }

        writeln!(
            f,
            "-pieces: [{}]",
            self.pieces
                .iter()
                .format_with(", ", |piece, f| f(&format_args!(
                    "[{:02x}]",
                    piece.iter().format("")
                ))),
        )
    }
}


#[cfg(test)]
mod torrent_display_tests {
    use super::*;

    #[test]
    fn file_display_ok() {
        let file = File {
            length: 42,
            path: vec!["dir1".to_owned(), "file".to_owned()],
            extra_fields: None,
        };

        assert_eq!(
            file.to_string(),
            "dir1/file\n\
             -size: 42 bytes\n\
             ========================================\n"
        );
    }

    #[test]
    fn file_display_with_extra_fields() {
        let file = File {
            length: 42,
            path: vec!["dir1".to_owned(), "file".to_owned()],
            extra_fields: Some(
                vec![
                    (b"comment2".to_vec(), bencode_elem!("no comment")),
                    (b"comment1".to_vec(), bencode_elem!("no comment")),
                ]
                .into_iter()
                .collect(),
            ),
        };

        assert_eq!(
            file.to_string(),
            "dir1/file\n\
             -size: 42 bytes\n\
             -comment1: \"no comment\"\n\
             -comment2: \"no comment\"\n\
             ========================================\n"
        );
    }

    #[test]
    fn torrent_display_ok() {
        let torrent = Torrent {
            announce: "url".to_owned(),
            length: 4,
            files: vec![File {
                length: 4,
                path: vec!["sample".to_owned()],
                extra_fields: None,
            }],
            name: "sample".to_owned(),
            piece_length: 2,
            pieces: vec![vec![1, 2], vec![3, 4]],
            extra_fields: None,
            extra_info_fields: Some(
                vec![(b"private".to_vec(), bencode_elem!(1))]
                    .into_iter()
                    .collect(),
            ),
        };

        assert_eq!(
            torrent.to_string(),
            "sample.torrent\n\
             -announce: url\n\
             -size: 4 bytes\n\
             -piece length: 2 bytes\n\
             -private: 1\n\
             -files:\n\
             [1] sample\n\
             -size: 4 bytes\n\
             ========================================\n\
             \n\
             -pieces: [[0102], [0304]]\n"
        );
    }
}
