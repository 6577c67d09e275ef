use super::{Integer, Piece};
use crate::digest;
use crate::util;
use crate::TorrentTreeError;
use std::io::Read;

/// Piece length used by `PieceLength::default()`: 1 MiB.
pub const DEFAULT_PIECE_LENGTH: Integer = 1 << 20;
/// Largest `PieceLength::Fixed` a `TorrentBuilder` accepts: 64 MiB.
pub const MAX_FIXED_PIECE_LENGTH: Integer = 1 << 26;

const MIN_PIECE_LENGTH: Integer = 1 << 12;
const MAX_PIECE_LENGTH: Integer = 1 << 20;
// adaptive mode aims for roughly one piece per this many bytes of piece table
const ADAPTIVE_DIVISOR: u64 = 5120;

/// How the piece length of a new torrent is chosen.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PieceLength {
    /// Scale with the content length, between 4 KiB and 1 MiB.
    Adaptive,
    /// Always use the given piece length.
    Fixed(Integer),
}

impl Default for PieceLength {
    fn default() -> PieceLength {
        PieceLength::Fixed(DEFAULT_PIECE_LENGTH)
    }
}

impl PieceLength {
    /// Resolve to a concrete piece length for content of `length` bytes.
    ///
    /// In adaptive mode this is `2^(floor(log2(length / 5120)) + 1)`,
    /// clamped to `[4096, 1048576]`. Content shorter than 5120 bytes
    /// gets the lower bound.
    pub fn resolve(self, length: u64) -> Integer {
        match self {
            PieceLength::Fixed(piece_length) => piece_length,
            PieceLength::Adaptive => {
                let quotient = length / ADAPTIVE_DIVISOR;
                if quotient == 0 {
                    return MIN_PIECE_LENGTH;
                }

                // floor(log2(quotient)) + 1
                let exponent = 64 - quotient.leading_zeros();
                if exponent >= MAX_PIECE_LENGTH.trailing_zeros() {
                    MAX_PIECE_LENGTH
                } else {
                    std::cmp::max(1 << exponent, MIN_PIECE_LENGTH)
                }
            }
        }
    }
}

/// Read `reader` to the end in `piece_length`-sized chunks and hash each one.
///
/// Returns the number of bytes read and the digests in stream order.
/// Only the final chunk may be shorter than `piece_length`, and it
/// is hashed only if it is non-empty.
pub fn hash_pieces<R>(
    mut reader: R,
    piece_length: Integer,
) -> Result<(u64, Vec<Piece>), TorrentTreeError>
where
    R: Read,
{
    let piece_length = util::i64_to_u64(piece_length)?;
    if piece_length == 0 {
        return Err(TorrentTreeError::InvalidArgument(std::borrow::Cow::Borrowed(
            "`piece_length` must be larger than 0.",
        )));
    }

    // grown by `read_to_end()` as needed, then reused across pieces
    let mut piece = Vec::new();
    let mut pieces = Vec::new();
    let mut total_read = 0;

    loop {
        let read = util::usize_to_u64(
            reader
                .by_ref()
                .take(piece_length)
                .read_to_end(&mut piece)?,
        )?;
        if read == 0 {
            break;
        }

        total_read += read;
        pieces.push(digest::hash(&piece).to_vec());
        tracing::trace!(index = pieces.len() - 1, len = read, "hashed piece");
        piece.clear();

        // `take()` only comes up short at the end of the stream
        if read < piece_length {
            break;
        }
    }

    Ok((total_read, pieces))
}
