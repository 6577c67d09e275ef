//! Module for bencode-related encoding.

use super::*;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Encode `bytes` and write the result to `dst`.
pub fn write_bytes<W>(bytes: &[u8], dst: &mut W) -> Result<(), TorrentTreeError>
where
    W: Write,
{
    dst.write_all(bytes.len().to_string().as_bytes())?;
    dst.write_all(&[STRING_DELIMITER])?;
    dst.write_all(bytes)?;
    Ok(())
}

/// Encode `int` and write the result to `dst`.
pub fn write_integer<W>(int: i64, dst: &mut W) -> Result<(), TorrentTreeError>
where
    W: Write,
{
    dst.write_all(&[INTEGER_PREFIX])?;
    dst.write_all(int.to_string().as_bytes())?;
    dst.write_all(&[INTEGER_POSTFIX])?;
    Ok(())
}

/// Encode `list` and write the result to `dst`.
///
/// Fails with `UninitializedValue` if `list` contains (at any depth)
/// an uninitialized element. `dst` may be partially written by then.
pub fn write_list<W>(list: &[BencodeElem], dst: &mut W) -> Result<(), TorrentTreeError>
where
    W: Write,
{
    dst.write_all(&[LIST_PREFIX])?;
    for item in list {
        item.write_into(dst)?;
    }
    dst.write_all(&[LIST_POSTFIX])?;
    Ok(())
}

/// Encode `dict` and write the result to `dst`.
///
/// Fails with `UninitializedValue` if `dict` contains (at any depth)
/// an uninitialized element. `dst` may be partially written by then.
pub fn write_dictionary<W>(dict: &Dictionary, dst: &mut W) -> Result<(), TorrentTreeError>
where
    W: Write,
{
    // "Keys must be strings and appear in sorted order
    // (sorted as raw strings, not alphanumerics)."
    // `Dictionary` iterates in exactly that order.
    dst.write_all(&[DICTIONARY_PREFIX])?;
    for (key, val) in dict {
        write_bytes(key, dst)?;
        val.write_into(dst)?;
    }
    dst.write_all(&[DICTIONARY_POSTFIX])?;
    Ok(())
}

/// Encode `bytes` and return the result in a `Vec`.
pub fn encode_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut encoded = Vec::with_capacity(bytes.len() + 21);
    write_bytes(bytes, &mut encoded).expect("Write to vec failed!");
    encoded
}

/// Encode `int` and return the result in a `Vec`.
pub fn encode_integer(int: i64) -> Vec<u8> {
    let mut encoded = Vec::new();
    write_integer(int, &mut encoded).expect("Write to vec failed!");
    encoded
}

/// Encode `list` and return the result in a `Vec`.
pub fn encode_list(list: &[BencodeElem]) -> Result<Vec<u8>, TorrentTreeError> {
    let mut encoded = Vec::new();
    write_list(list, &mut encoded)?;
    Ok(encoded)
}

/// Encode `dict` and return the result in a `Vec`.
pub fn encode_dictionary(dict: &Dictionary) -> Result<Vec<u8>, TorrentTreeError> {
    let mut encoded = Vec::new();
    write_dictionary(dict, &mut encoded)?;
    Ok(encoded)
}

impl BencodeElem {
    /// Encode `self` and write the result to `dst`.
    pub fn write_into<W>(&self, dst: &mut W) -> Result<(), TorrentTreeError>
    where
        W: Write,
    {
        match *self {
            BencodeElem::Bytes(ref bytes) => write_bytes(bytes, dst),
            BencodeElem::Integer(int) => write_integer(int, dst),
            BencodeElem::List(ref list) => write_list(list, dst),
            BencodeElem::Dictionary(ref dict) => write_dictionary(dict, dst),
            BencodeElem::Uninitialized => Err(TorrentTreeError::UninitializedValue),
        }
    }

    /// Encode `self` and write the result to `path`.
    ///
    /// `path` must be the path to a file.
    ///
    /// "This function will create a file if it does
    /// not exist, and will truncate it if it does."
    pub fn write_into_file<P>(&self, path: P) -> Result<(), TorrentTreeError>
    where
        P: AsRef<Path>,
    {
        let file = File::create(&path)?;
        let mut writer = BufWriter::new(&file);
        self.write_into(&mut writer)?;
        writer.flush()?;
        drop(writer);
        file.sync_all()?;
        Ok(())
    }

    /// Encode `self` and return the result in a `Vec`.
    pub fn encode(&self) -> Result<Vec<u8>, TorrentTreeError> {
        match *self {
            BencodeElem::Bytes(ref bytes) => Ok(encode_bytes(bytes)),
            BencodeElem::Integer(int) => Ok(encode_integer(int)),
            BencodeElem::List(ref list) => encode_list(list),
            BencodeElem::Dictionary(ref dict) => encode_dictionary(dict),
            BencodeElem::Uninitialized => Err(TorrentTreeError::UninitializedValue),
        }
    }
}
