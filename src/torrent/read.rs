use super::*;
use crate::util;
use std::path::Path;

fn malformed(reason: &'static str) -> TorrentTreeError {
    TorrentTreeError::MalformedTorrent(Cow::Borrowed(reason))
}

// Remove `key` from `dict` and decode it as a UTF-8 string.
// `name` is the quoted key used in error messages.
fn extract_string(
    dict: &mut Dictionary,
    key: &[u8],
    name: &str,
) -> Result<String, TorrentTreeError> {
    match dict.remove(key) {
        Some(BencodeElem::Bytes(bytes)) => String::from_utf8(bytes).map_err(|_| {
            TorrentTreeError::MalformedTorrent(Cow::Owned(format!(
                "\"{}\" maps to invalid UTF8.",
                name
            )))
        }),
        Some(_) => Err(TorrentTreeError::MalformedTorrent(Cow::Owned(format!(
            "\"{}\" does not map to a string.",
            name
        )))),
        None => Err(TorrentTreeError::MalformedTorrent(Cow::Owned(format!(
            "\"{}\" does not exist.",
            name
        )))),
    }
}

fn extract_extra_fields(dict: Dictionary) -> Option<Dictionary> {
    if dict.is_empty() {
        None
    } else {
        Some(dict)
    }
}

impl File {
    fn extract_file(elem: BencodeElem) -> Result<File, TorrentTreeError> {
        match elem {
            BencodeElem::Dictionary(mut dict) => Ok(File {
                length: Self::extract_file_length(&mut dict)?,
                path: Self::extract_file_path(&mut dict)?,
                extra_fields: extract_extra_fields(dict),
            }),
            _ => Err(malformed("\"files\" contains a non-dictionary element.")),
        }
    }

    fn extract_file_length(dict: &mut Dictionary) -> Result<Integer, TorrentTreeError> {
        match dict.remove(&b"length"[..]) {
            Some(BencodeElem::Integer(len)) if len >= 0 => Ok(len),
            Some(BencodeElem::Integer(_)) => Err(malformed("\"length\" < 0.")),
            Some(_) => Err(malformed("\"length\" does not map to an integer.")),
            None => Err(malformed("\"length\" does not exist.")),
        }
    }

    fn extract_file_path(dict: &mut Dictionary) -> Result<Vec<String>, TorrentTreeError> {
        match dict.remove(&b"path"[..]) {
            Some(BencodeElem::List(list)) => {
                if list.is_empty() {
                    return Err(malformed("\"path\" maps to a 0-length list."));
                }

                list.into_iter()
                    .map(|segment| match segment {
                        BencodeElem::Bytes(bytes) => String::from_utf8(bytes)
                            .map_err(|_| malformed("\"path\" contains invalid UTF8.")),
                        _ => Err(malformed("\"path\" contains a non-string element.")),
                    })
                    .collect()
            }
            Some(_) => Err(malformed("\"path\" does not map to a list.")),
            None => Err(malformed("\"path\" does not exist.")),
        }
    }
}

impl Torrent {
    /// Parse `bytes` and return the extracted `Torrent`.
    ///
    /// If `bytes` is missing any required field (e.g. `info`), or if any other
    /// error is encountered, then `Err(error)` will be returned.
    pub fn read_from_bytes<B>(bytes: B) -> Result<Torrent, TorrentTreeError>
    where
        B: AsRef<[u8]>,
    {
        Self::from_parsed(BencodeElem::from_bytes(bytes)?)?.validate()
    }

    /// Parse the content of the file at `path` and return the extracted `Torrent`.
    ///
    /// If the file at `path` is missing any required field (e.g. `info`), or if any other
    /// error is encountered, then `Err(error)` will be returned.
    pub fn read_from_file<P>(path: P) -> Result<Torrent, TorrentTreeError>
    where
        P: AsRef<Path>,
    {
        Self::from_parsed(BencodeElem::from_file(path)?)?.validate()
    }

    // The piece table has to cover the content exactly:
    // one piece per `piece_length` bytes, the last one possibly short.
    fn validate(self) -> Result<Torrent, TorrentTreeError> {
        let length = util::i64_to_u64(self.length)?;
        let piece_length = util::i64_to_u64(self.piece_length)?;
        let expected = util::u64_to_usize((length + (piece_length - 1)) / piece_length)?;

        if self.pieces.len() == expected {
            Ok(self)
        } else {
            Err(TorrentTreeError::MalformedTorrent(Cow::Owned(format!(
                "{} byte(s) with a piece length of {} need {} piece(s), {} found.",
                self.length,
                self.piece_length,
                expected,
                self.pieces.len(),
            ))))
        }
    }

    fn from_parsed(parsed: BencodeElem) -> Result<Torrent, TorrentTreeError> {
        if let BencodeElem::Dictionary(mut parsed) = parsed {
            let announce = extract_string(&mut parsed, b"announce", "announce")?;
            let info = parsed.remove(&b"info"[..]);
            let extra_fields = extract_extra_fields(parsed);

            match info {
                Some(BencodeElem::Dictionary(mut info)) => {
                    let files = Self::extract_files(&mut info)?;

                    Ok(Torrent {
                        announce,
                        length: Self::extract_length(&files)?,
                        files,
                        name: extract_string(&mut info, b"name", "name")?,
                        piece_length: Self::extract_piece_length(&mut info)?,
                        pieces: Self::extract_pieces(&mut info)?,
                        extra_fields,
                        extra_info_fields: extract_extra_fields(info),
                    })
                }
                Some(_) => Err(malformed("\"info\" is not a dictionary.")),
                None => Err(malformed("\"info\" does not exist.")),
            }
        } else {
            Err(malformed("Torrent's top-level element is not a dictionary."))
        }
    }

    fn extract_files(dict: &mut Dictionary) -> Result<Vec<File>, TorrentTreeError> {
        match dict.remove(&b"files"[..]) {
            Some(BencodeElem::List(list)) => {
                if list.is_empty() {
                    Err(malformed("\"files\" maps to an empty list."))
                } else {
                    list.into_iter().map(File::extract_file).collect()
                }
            }
            Some(_) => Err(malformed("\"files\" does not map to a list.")),
            None => Err(malformed("\"files\" does not exist.")),
        }
    }

    fn extract_length(files: &[File]) -> Result<Integer, TorrentTreeError> {
        files.iter().try_fold(0, |acc: Integer, file| {
            acc.checked_add(file.length)
                .ok_or_else(|| malformed("Torrent's length overflowed in i64."))
        })
    }

    fn extract_piece_length(dict: &mut Dictionary) -> Result<Integer, TorrentTreeError> {
        match dict.remove(&b"piece length"[..]) {
            Some(BencodeElem::Integer(len)) if len > 0 => Ok(len),
            Some(BencodeElem::Integer(_)) => Err(malformed("\"piece length\" <= 0.")),
            Some(_) => Err(malformed("\"piece length\" does not map to an integer.")),
            None => Err(malformed("\"piece length\" does not exist.")),
        }
    }

    fn extract_pieces(dict: &mut Dictionary) -> Result<Vec<Piece>, TorrentTreeError> {
        match dict.remove(&b"pieces"[..]) {
            Some(BencodeElem::Bytes(bytes)) => {
                if (bytes.len() % PIECE_STRING_LENGTH) != 0 {
                    Err(TorrentTreeError::MalformedTorrent(Cow::Owned(format!(
                        "\"pieces\"' length is not a multiple of {}.",
                        PIECE_STRING_LENGTH,
                    ))))
                } else {
                    Ok(bytes
                        .chunks(PIECE_STRING_LENGTH)
                        .map(|chunk| chunk.to_vec())
                        .collect())
                }
            }
            Some(_) => Err(malformed("\"pieces\" does not map to a sequence of bytes.")),
            None => Err(malformed("\"pieces\" does not exist.")),
        }
    }
}
