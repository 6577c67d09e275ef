//! Module for bencode-related parsing/encoding.

use crate::TorrentTreeError;
use itertools::Itertools;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::convert::From;
use std::fmt;

#[cfg(test)]
#[macro_use]
mod macros;
mod read;
pub mod write;

pub use self::read::MAX_DEPTH;

const DICTIONARY_PREFIX: u8 = b'd';
const DICTIONARY_POSTFIX: u8 = b'e';
const LIST_PREFIX: u8 = b'l';
const LIST_POSTFIX: u8 = b'e';
const INTEGER_PREFIX: u8 = b'i';
const INTEGER_POSTFIX: u8 = b'e';
const STRING_DELIMITER: u8 = b':';

/// Corresponds to a bencode dictionary.
///
/// Keys are raw byte strings, ordered byte-lexicographically,
/// which is exactly the order a canonical encoding requires.
pub type Dictionary = BTreeMap<Vec<u8>, BencodeElem>;

/// An in-memory bencode element.
///
/// `Uninitialized` is a placeholder (it is what `Default` gives you, and
/// what [`entry()`] inserts for a missing key). It is never produced by
/// the parser, and encoding it fails.
///
/// [`entry()`]: #method.entry
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BencodeElem {
    Bytes(Vec<u8>),
    Integer(i64),
    List(Vec<BencodeElem>),
    Dictionary(Dictionary),
    Uninitialized,
}

impl Default for BencodeElem {
    fn default() -> BencodeElem {
        BencodeElem::Uninitialized
    }
}

impl BencodeElem {
    fn variant_name(&self) -> &'static str {
        match *self {
            BencodeElem::Bytes(_) => "bytes",
            BencodeElem::Integer(_) => "integer",
            BencodeElem::List(_) => "list",
            BencodeElem::Dictionary(_) => "dictionary",
            BencodeElem::Uninitialized => "uninitialized",
        }
    }

    fn mismatch(&self, expected: &str) -> TorrentTreeError {
        TorrentTreeError::AccessTypeMismatch(Cow::Owned(format!(
            "expected {}, found {}.",
            expected,
            self.variant_name()
        )))
    }

    /// Returns the underlying bytes, or `AccessTypeMismatch` if `self` is not `Bytes`.
    pub fn as_bytes(&self) -> Result<&[u8], TorrentTreeError> {
        match *self {
            BencodeElem::Bytes(ref bytes) => Ok(bytes),
            _ => Err(self.mismatch("bytes")),
        }
    }

    /// Returns the underlying integer, or `AccessTypeMismatch` if `self` is not `Integer`.
    pub fn as_integer(&self) -> Result<i64, TorrentTreeError> {
        match *self {
            BencodeElem::Integer(int) => Ok(int),
            _ => Err(self.mismatch("integer")),
        }
    }

    /// Returns the underlying list, or `AccessTypeMismatch` if `self` is not `List`.
    pub fn as_list(&self) -> Result<&[BencodeElem], TorrentTreeError> {
        match *self {
            BencodeElem::List(ref list) => Ok(list),
            _ => Err(self.mismatch("list")),
        }
    }

    pub fn as_list_mut(&mut self) -> Result<&mut Vec<BencodeElem>, TorrentTreeError> {
        match *self {
            BencodeElem::List(ref mut list) => Ok(list),
            _ => Err(self.mismatch("list")),
        }
    }

    /// Returns the underlying dictionary, or `AccessTypeMismatch` if `self` is not `Dictionary`.
    pub fn as_dictionary(&self) -> Result<&Dictionary, TorrentTreeError> {
        match *self {
            BencodeElem::Dictionary(ref dict) => Ok(dict),
            _ => Err(self.mismatch("dictionary")),
        }
    }

    pub fn as_dictionary_mut(&mut self) -> Result<&mut Dictionary, TorrentTreeError> {
        match *self {
            BencodeElem::Dictionary(ref mut dict) => Ok(dict),
            _ => Err(self.mismatch("dictionary")),
        }
    }

    /// Look up `key` in a dictionary.
    pub fn get<K>(&self, key: K) -> Result<Option<&BencodeElem>, TorrentTreeError>
    where
        K: AsRef<[u8]>,
    {
        Ok(self.as_dictionary()?.get(key.as_ref()))
    }

    /// Look up `key` in a dictionary, inserting `Uninitialized` if it's missing.
    pub fn entry<K>(&mut self, key: K) -> Result<&mut BencodeElem, TorrentTreeError>
    where
        K: Into<Vec<u8>>,
    {
        Ok(self.as_dictionary_mut()?.entry(key.into()).or_default())
    }

    /// Insert `val` under `key` in a dictionary, returning the value it replaced.
    pub fn insert<K>(
        &mut self,
        key: K,
        val: BencodeElem,
    ) -> Result<Option<BencodeElem>, TorrentTreeError>
    where
        K: Into<Vec<u8>>,
    {
        Ok(self.as_dictionary_mut()?.insert(key.into(), val))
    }

    /// Get the `idx`-th element of a list.
    pub fn nth(&self, idx: usize) -> Result<Option<&BencodeElem>, TorrentTreeError> {
        Ok(self.as_list()?.get(idx))
    }

    /// Append `elem` to a list.
    pub fn push(&mut self, elem: BencodeElem) -> Result<(), TorrentTreeError> {
        self.as_list_mut()?.push(elem);
        Ok(())
    }

    /// Append `bytes` to a byte string.
    pub fn append_bytes(&mut self, bytes: &[u8]) -> Result<(), TorrentTreeError> {
        match *self {
            BencodeElem::Bytes(ref mut existing) => {
                existing.extend_from_slice(bytes);
                Ok(())
            }
            _ => Err(self.mismatch("bytes")),
        }
    }
}

impl From<u8> for BencodeElem {
    fn from(val: u8) -> BencodeElem {
        BencodeElem::Integer(i64::from(val))
    }
}

impl From<u16> for BencodeElem {
    fn from(val: u16) -> BencodeElem {
        BencodeElem::Integer(i64::from(val))
    }
}

impl From<u32> for BencodeElem {
    fn from(val: u32) -> BencodeElem {
        BencodeElem::Integer(i64::from(val))
    }
}

impl From<i32> for BencodeElem {
    fn from(val: i32) -> BencodeElem {
        BencodeElem::Integer(i64::from(val))
    }
}

impl From<i64> for BencodeElem {
    fn from(val: i64) -> BencodeElem {
        BencodeElem::Integer(val)
    }
}

impl<'a> From<&'a str> for BencodeElem {
    fn from(val: &'a str) -> BencodeElem {
        BencodeElem::Bytes(val.as_bytes().to_vec())
    }
}

impl From<String> for BencodeElem {
    fn from(val: String) -> BencodeElem {
        BencodeElem::Bytes(val.into_bytes())
    }
}

impl<'a> From<&'a [u8]> for BencodeElem {
    fn from(val: &'a [u8]) -> BencodeElem {
        BencodeElem::Bytes(val.to_vec())
    }
}

impl From<Vec<u8>> for BencodeElem {
    fn from(val: Vec<u8>) -> BencodeElem {
        BencodeElem::Bytes(val)
    }
}

impl From<Vec<BencodeElem>> for BencodeElem {
    fn from(val: Vec<BencodeElem>) -> BencodeElem {
        BencodeElem::List(val)
    }
}

impl From<Dictionary> for BencodeElem {
    fn from(val: Dictionary) -> BencodeElem {
        BencodeElem::Dictionary(val)
    }
}

// Byte strings that happen to be valid UTF-8 are shown as strings.
fn fmt_bytes(bytes: &[u8], f: &mut fmt::Formatter) -> fmt::Result {
    match ::std::str::from_utf8(bytes) {
        Ok(string) => write!(f, "\"{}\"", string),
        Err(_) => write!(f, "[{:#04x}]", bytes.iter().format(", ")),
    }
}

impl fmt::Display for BencodeElem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            BencodeElem::Bytes(ref bytes) => fmt_bytes(bytes, f),
            BencodeElem::Integer(ref int) => write!(f, "{}", int),
            BencodeElem::List(ref list) => write!(f, "[{}]", itertools::join(list, ", ")),
            BencodeElem::Dictionary(ref dict) => write!(
                f,
                "{{ {} }}",
                dict.iter().format_with(", ", |(k, v), f| {
                    f(&format_args!("({}, {})", BencodeElem::from(k.as_slice()), v))
                })
            ),
            BencodeElem::Uninitialized => write!(f, "<uninitialized>"),
        }
    }
}
