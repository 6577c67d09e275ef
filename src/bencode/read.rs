use super::*;
use crate::util::ByteBuffer;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Maximum nesting depth of lists/dictionaries accepted by the parser.
pub const MAX_DEPTH: usize = 256;

impl BencodeElem {
    /// Parse one `BencodeElem` from the start of `bytes`.
    ///
    /// Returns the element and the number of bytes it occupies.
    ///
    /// If `allow_trailing` is `false` and anything is left after the
    /// element, `Err(TrailingData)` is returned. If `bytes` does not
    /// start with valid bencode, `Err(MalformedInput)` is returned.
    pub fn decode<B>(
        bytes: B,
        allow_trailing: bool,
    ) -> Result<(BencodeElem, usize), TorrentTreeError>
    where
        B: AsRef<[u8]>,
    {
        let mut bytes = ByteBuffer::new(bytes.as_ref());
        let element = Self::parse(&mut bytes, 0)?;

        if !allow_trailing && !bytes.is_empty() {
            return Err(TorrentTreeError::TrailingData(bytes.remaining()));
        }

        Ok((element, bytes.pos()))
    }

    /// Parse `bytes`, which must hold exactly one `BencodeElem`.
    pub fn from_bytes<B>(bytes: B) -> Result<BencodeElem, TorrentTreeError>
    where
        B: AsRef<[u8]>,
    {
        Self::decode(bytes, false).map(|(element, _)| element)
    }

    /// Parse the content of the file at `path`, which must hold
    /// exactly one `BencodeElem`.
    ///
    /// If any error is encountered (e.g. `IOError`), then `Err(error)`
    /// will be returned.
    pub fn from_file<P>(path: P) -> Result<BencodeElem, TorrentTreeError>
    where
        P: AsRef<Path>,
    {
        let file = File::open(&path)?;
        let mut bytes = Vec::new();

        BufReader::new(file).read_to_end(&mut bytes)?;
        Self::from_bytes(bytes)
    }

    fn peek_byte(bytes: &mut ByteBuffer) -> Result<u8, TorrentTreeError> {
        match bytes.peek() {
            Some(&byte) => Ok(byte),
            None => Err(TorrentTreeError::MalformedInput(Cow::Borrowed(
                "Expected more bytes, but none found.",
            ))),
        }
    }

    fn parse(bytes: &mut ByteBuffer, depth: usize) -> Result<BencodeElem, TorrentTreeError> {
        match Self::peek_byte(bytes)? {
            DICTIONARY_PREFIX => {
                bytes.advance(1);
                Self::decode_dictionary(bytes, depth + 1)
            }
            LIST_PREFIX => {
                bytes.advance(1);
                Self::decode_list(bytes, depth + 1)
            }
            INTEGER_PREFIX => {
                bytes.advance(1);
                Self::decode_integer(bytes)
            }
            b'0'..=b'9' => Self::decode_bytes(bytes),
            other => Err(TorrentTreeError::MalformedInput(Cow::Owned(format!(
                "Unrecognized tag {:#04x} at offset {}.",
                other,
                bytes.pos()
            )))),
        }
    }

    fn check_depth(depth: usize) -> Result<(), TorrentTreeError> {
        if depth > MAX_DEPTH {
            Err(TorrentTreeError::MalformedInput(Cow::Borrowed(
                "Nesting is too deep.",
            )))
        } else {
            Ok(())
        }
    }

    // The postfix is looked for *before* attempting to parse another
    // entry, so a malformed entry is always an error, never an end.
    fn decode_dictionary(
        bytes: &mut ByteBuffer,
        depth: usize,
    ) -> Result<BencodeElem, TorrentTreeError> {
        Self::check_depth(depth)?;
        let mut dict = Dictionary::new();

        while Self::peek_byte(bytes)? != DICTIONARY_POSTFIX {
            match Self::peek_byte(bytes)? {
                b'0'..=b'9' => {
                    let key = Self::read_bytes(bytes)?;
                    let val = Self::parse(bytes, depth)?;
                    // duplicate keys: last one wins
                    dict.insert(key, val);
                }
                _ => {
                    return Err(TorrentTreeError::MalformedInput(Cow::Borrowed(
                        "Non-string dictionary key.",
                    )));
                }
            }
        }
        bytes.advance(1); // consume the postfix

        Ok(BencodeElem::Dictionary(dict))
    }

    fn decode_list(bytes: &mut ByteBuffer, depth: usize) -> Result<BencodeElem, TorrentTreeError> {
        Self::check_depth(depth)?;
        let mut list = Vec::new();

        while Self::peek_byte(bytes)? != LIST_POSTFIX {
            // more to parse
            list.push(Self::parse(bytes, depth)?);
        }
        bytes.advance(1); // consume the postfix

        Ok(BencodeElem::List(list))
    }

    // Read up to (and consume) `delimiter`, returning what came before it.
    fn read_until<'a>(
        bytes: &mut ByteBuffer<'a>,
        delimiter: u8,
    ) -> Result<Vec<u8>, TorrentTreeError> {
        let old_pos = bytes.pos();
        let read: Vec<u8> = bytes.take_while(|&&b| b != delimiter).cloned().collect();
        let bytes_read = bytes.pos() - old_pos;

        if read.len() == bytes_read {
            Err(TorrentTreeError::MalformedInput(Cow::Owned(format!(
                "Delimiter '{}' not found.",
                char::from(delimiter)
            ))))
        } else {
            Ok(read)
        }
    }

    fn decode_integer(bytes: &mut ByteBuffer) -> Result<BencodeElem, TorrentTreeError> {
        match Self::peek_byte(bytes)? {
            b'-' | b'0'..=b'9' => (),
            _ => {
                return Err(TorrentTreeError::MalformedInput(Cow::Borrowed(
                    "Integer does not start with a digit or '-'.",
                )));
            }
        }

        let read = Self::read_until(bytes, INTEGER_POSTFIX)?;
        let (negative, digits) = match read.split_first() {
            Some((b'-', digits)) => (true, digits),
            _ => (false, &read[..]),
        };
        Self::check_digits(digits)?;
        if negative && digits == b"0" {
            return Err(TorrentTreeError::MalformedInput(Cow::Borrowed(
                "-0 found.",
            )));
        }

        // `read` is plain ASCII at this point
        let int_string = String::from_utf8_lossy(&read);
        match int_string.parse() {
            Ok(int) => Ok(BencodeElem::Integer(int)),
            Err(_) => Err(TorrentTreeError::MalformedInput(Cow::Owned(format!(
                "Input contains invalid integer: {}.",
                int_string
            )))),
        }
    }

    fn check_digits(digits: &[u8]) -> Result<(), TorrentTreeError> {
        if digits.is_empty() {
            Err(TorrentTreeError::MalformedInput(Cow::Borrowed(
                "Number without digits found.",
            )))
        } else if !digits.iter().all(u8::is_ascii_digit) {
            Err(TorrentTreeError::MalformedInput(Cow::Owned(format!(
                "Input contains invalid number: {}.",
                String::from_utf8_lossy(digits)
            ))))
        } else if digits[0] == b'0' && digits.len() != 1 {
            Err(TorrentTreeError::MalformedInput(Cow::Borrowed(
                "Number with leading zero(s) found.",
            )))
        } else {
            Ok(())
        }
    }

    fn decode_bytes(bytes: &mut ByteBuffer) -> Result<BencodeElem, TorrentTreeError> {
        Ok(BencodeElem::Bytes(Self::read_bytes(bytes)?))
    }

    fn read_bytes(bytes: &mut ByteBuffer) -> Result<Vec<u8>, TorrentTreeError> {
        let read = Self::read_until(bytes, STRING_DELIMITER)?;
        Self::check_digits(&read)?;

        let len = String::from_utf8_lossy(&read)
            .parse::<usize>()
            .map_err(|_| {
                TorrentTreeError::MalformedInput(Cow::Borrowed(
                    "A string's length does not fit into `usize`.",
                ))
            })?;

        match bytes.take_exact(len) {
            Some(content) => Ok(content.to_vec()),
            None => Err(TorrentTreeError::MalformedInput(Cow::Owned(format!(
                "A string's length ({}) runs past the end of input ({} byte(s) left).",
                len,
                bytes.remaining()
            )))),
        }
    }
}
