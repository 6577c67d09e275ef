//! [`torrent_tree`] is a library for encoding/decoding bencode, hashing file content
//! into SHA-1 pieces, and creating *.torrent* metadata from the result.
//!
//! # *Quick Start*
//! Create a torrent for a single file and save the *.torrent* file.
//!
//! ```no_run
//! use torrent_tree::torrent::{PieceLength, TorrentBuilder};
//!
//! let torrent = TorrentBuilder::new("udp://tracker.example:6969", "dir/file", PieceLength::Adaptive)
//!     .set_file_path("dir/file")
//!     .build()
//!     .unwrap();
//! torrent.write_into_file("sample.torrent").unwrap();
//! ```
//!
//! Derive the content identifier (info hash) of an existing *.torrent* file.
//!
//! ```no_run
//! use torrent_tree::digest;
//! use torrent_tree::torrent;
//!
//! let bytes = std::fs::read("sample.torrent").unwrap();
//! let id = torrent::content_identifier(&bytes).unwrap();
//! println!("{}", digest::to_hex(&id));
//! ```
//!
//! # *Overview*
//! - Methods for parsing and encoding are generally bound to structs (i.e. they are
//! "associated methods"). Methods that are general enough are placed at the module-level (e.g.
//! [`torrent_tree::bencode::write::encode_bytes()`]).
//! - Directory traversal, output naming and command-line handling are left to the caller.
//! The library takes a file (or a byte stream) and gives back a [`Torrent`] or a digest.
//!
//! ## Functionality
//! - SHA-1 (implemented in this crate) => [`digest`]
//! - bencode parsing/encoding (i.e. "bencoding/bdecoding") => [`BencodeElem`]
//! - torrent parsing/encoding (based on [`BencodeElem`]) => [`Torrent`]
//! - torrent creation => [`TorrentBuilder`]
//!
//! # *Correctness*
//! The bencode parser is written by hand. It is slightly stricter than required:
//! integers (and byte string lengths) with leading zeros are rejected, containers are
//! terminated by looking ahead for `e` instead of by failing to parse another element,
//! and nesting is bounded by [`MAX_DEPTH`].
//!
//! Dictionaries are kept sorted by raw key bytes. A dictionary whose keys are out of
//! order in the input is accepted, but it will be written back in sorted order, so
//! such input does not round-trip byte-for-byte.
//!
//! The SHA-1 implementation exists for correctness, not for collision resistance.
//!
//! [`torrent_tree`]: index.html
//! [`torrent_tree::bencode::write::encode_bytes()`]: bencode/write/fn.encode_bytes.html
//! [`digest`]: digest/index.html
//! [`BencodeElem`]: bencode/enum.BencodeElem.html
//! [`MAX_DEPTH`]: bencode/constant.MAX_DEPTH.html
//! [`Torrent`]: torrent/struct.Torrent.html
//! [`TorrentBuilder`]: torrent/struct.TorrentBuilder.html

use std::borrow::Cow;
use thiserror::Error;

pub(crate) mod util;
#[macro_use]
pub mod bencode;
pub mod digest;
pub mod torrent;

/// Custom error.
#[derive(Debug, Error)]
pub enum TorrentTreeError {
    /// The input does not start with a recognized tag, a length
    /// field can't be parsed, a byte string runs past the end of
    /// the input, etc.
    #[error("malformed input: {0}")]
    MalformedInput(Cow<'static, str>),

    /// Strict single-root decoding found bytes after the root element.
    #[error("trailing data: {0} byte(s) left after the root element")]
    TrailingData(usize),

    /// `BencodeElem::Uninitialized` can't be encoded.
    #[error("attempted to encode an uninitialized element")]
    UninitializedValue,

    /// A `BencodeElem` was accessed as a variant it is not.
    #[error("access type mismatch: {0}")]
    AccessTypeMismatch(Cow<'static, str>),

    /// Bencode is fine, but parsed data is gibberish, so we
    /// can't extract a torrent from it.
    #[error("malformed torrent: {0}")]
    MalformedTorrent(Cow<'static, str>),

    /// `TorrentBuilder` encounters problems when
    /// building `Torrent`. For instance, a field is set to
    /// an empty string by the caller.
    #[error("failed to build torrent: {0}")]
    TorrentBuilderFailure(Cow<'static, str>),

    /// An invalid argument is passed to a function.
    #[error("invalid argument: {0}")]
    InvalidArgument(Cow<'static, str>),

    /// Conversion between numeric types (e.g. `i64 -> u64`) has failed.
    #[error("numeric conversion failed: {0}")]
    FailedNumericConv(Cow<'static, str>),

    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
