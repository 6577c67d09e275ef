use super::*;
use crate::util;
#[cfg(feature = "parallel_single_file_hashing")]
use rayon::prelude::*;
use std::io::{BufReader, Read};
#[cfg(feature = "parallel_single_file_hashing")]
use std::io::Seek;
use std::path::Path;

impl TorrentBuilder {
    /// Create a new `TorrentBuilder` with required fields set.
    ///
    /// The caller has to ensure that the inputs are valid, as this method
    /// does not validate its inputs. If they turn out
    /// to be invalid, calling [`build()`] later will fail.
    ///
    /// # Notes
    /// - A valid `PieceLength::Fixed` is larger than `0`, is a power of `2`
    ///   and is at most [`MAX_FIXED_PIECE_LENGTH`].
    ///
    /// [`MAX_FIXED_PIECE_LENGTH`]: constant.MAX_FIXED_PIECE_LENGTH.html
    ///
    /// [`build()`]: #method.build
    pub fn new<S, P>(announce: S, path: P, piece_length: PieceLength) -> TorrentBuilder
    where
        S: Into<String>,
        P: AsRef<Path>,
    {
        TorrentBuilder {
            announce: announce.into(),
            path: path.as_ref().to_path_buf(),
            piece_length,
            ..Default::default()
        }
    }

    /// Build a `Torrent` by hashing the file at `path`.
    ///
    /// If `name` is not set, then the [last component] of `path`
    /// will be used as the `Torrent`'s `name` field. If `file_path`
    /// is not set, `path` itself is recorded as the file's path.
    ///
    /// `build()` **does not** provide comprehensive validation of
    /// any input. Basic cases such as setting `announce` to
    /// an empty string will be detected and `Err` will be returned.
    /// But more complicated cases such as using an invalid url
    /// as `announce` won't be detected.
    ///
    /// [last component]: https://doc.rust-lang.org/std/path/struct.Path.html#method.file_name
    pub fn build(self) -> Result<Torrent, TorrentTreeError> {
        self.validate()?;
        self.validate_path()?;

        let length = self.path.metadata()?.len();
        let piece_length = self.piece_length.resolve(length);
        tracing::debug!(
            path = %self.path.display(),
            length,
            piece_length,
            "building torrent from file"
        );

        let (read, pieces) = self.read_file(piece_length, length)?;
        if read != length {
            return Err(TorrentTreeError::TorrentBuilderFailure(Cow::Owned(format!(
                "`path` was expected to hold {} byte(s) but {} byte(s) were read.",
                length, read
            ))));
        }

        self.finish(length, piece_length, pieces)
    }

    /// Build a `Torrent` from `length` bytes of content read from `reader`.
    ///
    /// `path` is only used to derive defaults for `name` and `file_path`;
    /// it does not have to exist. Fails if `reader` does not yield
    /// exactly `length` bytes.
    pub fn build_from_reader<R>(self, reader: R, length: u64) -> Result<Torrent, TorrentTreeError>
    where
        R: Read,
    {
        self.validate()?;

        let piece_length = self.piece_length.resolve(length);
        tracing::debug!(length, piece_length, "building torrent from reader");

        let (read, pieces) = hash_pieces(reader, piece_length)?;
        if read != length {
            return Err(TorrentTreeError::TorrentBuilderFailure(Cow::Owned(format!(
                "reader was expected to yield {} byte(s) but yielded {}.",
                length, read
            ))));
        }

        self.finish(length, piece_length, pieces)
    }

    /// Set the `announce` field of the `Torrent` to be built.
    ///
    /// Calling this method multiple times will simply override previous settings.
    ///
    /// The caller has to ensure that `announce` is valid, as this method
    /// does not validate its value. If `announce`
    /// turns out to be invalid, calling [`build()`] later will fail.
    ///
    /// [`build()`]: #method.build
    pub fn set_announce<S>(self, announce: S) -> TorrentBuilder
    where
        S: Into<String>,
    {
        TorrentBuilder {
            announce: announce.into(),
            ..self
        }
    }

    /// Set the `name` field of the `Torrent` to be built.
    ///
    /// Calling this method multiple times will simply override previous settings.
    pub fn set_name<S>(self, name: S) -> TorrentBuilder
    where
        S: Into<String>,
    {
        TorrentBuilder {
            name: Some(name.into()),
            ..self
        }
    }

    /// Set the path to the file from which the `Torrent` will be built.
    ///
    /// Calling this method multiple times will simply override previous settings.
    pub fn set_path<P>(self, path: P) -> TorrentBuilder
    where
        P: AsRef<Path>,
    {
        TorrentBuilder {
            path: path.as_ref().to_path_buf(),
            ..self
        }
    }

    /// Set the `/`-separated path recorded in `info.files[0].path`.
    ///
    /// Leading separators are dropped. Nothing else is normalized,
    /// so `.` and `..` segments end up in the torrent as-is.
    pub fn set_file_path<S>(self, file_path: S) -> TorrentBuilder
    where
        S: Into<String>,
    {
        TorrentBuilder {
            file_path: Some(file_path.into()),
            ..self
        }
    }

    /// Set the piece length policy of the `Torrent` to be built.
    ///
    /// Calling this method multiple times will simply override previous settings.
    ///
    /// NOTE: **A valid `PieceLength::Fixed` is larger than `0`, is a power of `2`
    /// and is at most `MAX_FIXED_PIECE_LENGTH`.**
    pub fn set_piece_length(self, piece_length: PieceLength) -> TorrentBuilder {
        TorrentBuilder {
            piece_length,
            ..self
        }
    }

    /// Add an extra field to `Torrent` (i.e. to the root dictionary).
    ///
    /// Calling this method multiple times with the same key will
    /// simply override previous settings.
    pub fn add_extra_field(self, key: String, val: BencodeElem) -> TorrentBuilder {
        let mut extra_fields = self.extra_fields;
        extra_fields
            .get_or_insert_with(Dictionary::new)
            .insert(key.into_bytes(), val);

        TorrentBuilder {
            extra_fields,
            ..self
        }
    }

    /// Add an extra `info` field to `Torrent` (i.e. to the `info` dictionary).
    ///
    /// Calling this method multiple times with the same key will
    /// simply override previous settings.
    pub fn add_extra_info_field(self, key: String, val: BencodeElem) -> TorrentBuilder {
        let mut extra_info_fields = self.extra_info_fields;
        extra_info_fields
            .get_or_insert_with(Dictionary::new)
            .insert(key.into_bytes(), val);

        TorrentBuilder {
            extra_info_fields,
            ..self
        }
    }

    /// Make the `Torrent` private or public, as defined in [BEP 27].
    ///
    /// Calling this method multiple times will simply override previous settings.
    ///
    /// [BEP 27]: http://bittorrent.org/beps/bep_0027.html
    pub fn set_privacy(self, is_private: bool) -> TorrentBuilder {
        TorrentBuilder { is_private, ..self }
    }

    /// Change the number of threads used when hashing pieces.
    ///
    /// If set to 0, rayon picks the number of threads.
    /// **This is also the default behavior.**
    ///
    /// Set this to 1 if you prefer single-threaded hashing.
    #[cfg(feature = "parallel_single_file_hashing")]
    pub fn set_num_threads(self, num_threads: usize) -> TorrentBuilder {
        TorrentBuilder {
            num_threads,
            ..self
        }
    }

    fn finish(
        self,
        length: u64,
        piece_length: Integer,
        pieces: Vec<Piece>,
    ) -> Result<Torrent, TorrentTreeError> {
        // if `name` is not yet set, set it to the last component of `path`
        let name = match self.name {
            Some(name) => name,
            None => util::last_component(&self.path)?,
        };
        let file_path = match self.file_path {
            Some(file_path) => util::split_path(&file_path),
            None => util::split_path(&self.path.to_string_lossy()),
        };
        if file_path.is_empty() {
            return Err(TorrentTreeError::TorrentBuilderFailure(Cow::Borrowed(
                "TorrentBuilder has a file path without any segment.",
            )));
        }

        // set `private = 1` in `info` if the torrent is private
        let mut extra_info_fields = self.extra_info_fields;
        if self.is_private {
            extra_info_fields
                .get_or_insert_with(Dictionary::new)
                .insert(b"private".to_vec(), BencodeElem::Integer(1));
        }

        let length = util::u64_to_i64(length)?;
        tracing::debug!(%name, length, pieces = pieces.len(), "built torrent");

        Ok(Torrent {
            announce: self.announce,
            length,
            files: vec![File {
                length,
                path: file_path,
                extra_fields: None,
            }],
            name,
            piece_length,
            pieces,
            extra_fields: self.extra_fields,
            extra_info_fields,
        })
    }

    #[cfg(not(feature = "parallel_single_file_hashing"))]
    fn read_file(
        &self,
        piece_length: Integer,
        _length: u64,
    ) -> Result<(u64, Vec<Piece>), TorrentTreeError> {
        hash_pieces(BufReader::new(std::fs::File::open(&self.path)?), piece_length)
    }

    #[cfg(feature = "parallel_single_file_hashing")]
    fn read_file(
        &self,
        piece_length: Integer,
        length: u64,
    ) -> Result<(u64, Vec<Piece>), TorrentTreeError> {
        if self.num_threads == 1 {
            hash_pieces(BufReader::new(std::fs::File::open(&self.path)?), piece_length)
        } else {
            Self::read_file_parallel(&self.path, piece_length, length, self.num_threads)
        }
    }

    // Pieces are hashed out of order but collected by index,
    // so the result is still in file order.
    #[cfg(feature = "parallel_single_file_hashing")]
    fn read_file_parallel(
        path: &Path,
        piece_length: Integer,
        length: u64,
        num_threads: usize,
    ) -> Result<(u64, Vec<Piece>), TorrentTreeError> {
        let piece_length = util::i64_to_u64(piece_length)?;
        let pieces_total = (length + (piece_length - 1)) / piece_length;

        let thread_pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()
            .map_err(|e| {
                TorrentTreeError::TorrentBuilderFailure(Cow::Owned(format!(
                    "failed to create rayon thread pool: {}",
                    e
                )))
            })?;

        let chunks = thread_pool.install(|| {
            (0_u64..pieces_total)
                .into_par_iter()
                .map(|i| {
                    let mut file = std::fs::File::open(path)?;
                    let offset = i * piece_length;
                    let mut piece =
                        Vec::with_capacity(util::u64_to_usize(piece_length.min(length - offset))?);
                    file.seek(std::io::SeekFrom::Start(offset))?;
                    file.take(piece_length).read_to_end(&mut piece)?;
                    tracing::trace!(index = i, len = piece.len(), "hashed piece");
                    Ok((util::usize_to_u64(piece.len())?, digest::hash(&piece).to_vec()))
                })
                .collect::<Result<Vec<(u64, Piece)>, TorrentTreeError>>()
        })?;

        let read = chunks.iter().map(|&(len, _)| len).sum();
        let pieces = chunks.into_iter().map(|(_, piece)| piece).collect();
        Ok((read, pieces))
    }

    fn validate(&self) -> Result<(), TorrentTreeError> {
        self.validate_announce()?;
        self.validate_name()?;
        self.validate_file_path()?;
        self.validate_piece_length()?;
        Self::validate_extra_keys(&self.extra_fields, "extra_fields")?;
        Self::validate_extra_keys(&self.extra_info_fields, "extra_info_fields")
    }

    fn validate_announce(&self) -> Result<(), TorrentTreeError> {
        if self.announce.is_empty() {
            Err(TorrentTreeError::TorrentBuilderFailure(Cow::Borrowed(
                "TorrentBuilder has `announce` but its length is 0.",
            )))
        } else {
            Ok(())
        }
    }

    fn validate_name(&self) -> Result<(), TorrentTreeError> {
        match self.name {
            Some(ref name) if name.is_empty() => Err(TorrentTreeError::TorrentBuilderFailure(
                Cow::Borrowed("TorrentBuilder has `name` but its length is 0."),
            )),
            _ => Ok(()),
        }
    }

    fn validate_file_path(&self) -> Result<(), TorrentTreeError> {
        match self.file_path {
            Some(ref file_path) if util::split_path(file_path).is_empty() => {
                Err(TorrentTreeError::TorrentBuilderFailure(Cow::Borrowed(
                    "TorrentBuilder has `file_path` but it has no segment.",
                )))
            }
            _ => Ok(()),
        }
    }

    fn validate_path(&self) -> Result<(), TorrentTreeError> {
        if self.path.is_file() {
            Ok(())
        } else {
            Err(TorrentTreeError::TorrentBuilderFailure(Cow::Borrowed(
                "TorrentBuilder has `path` but it does not point to a file.",
            )))
        }
    }

    fn validate_piece_length(&self) -> Result<(), TorrentTreeError> {
        match self.piece_length {
            PieceLength::Adaptive => Ok(()),
            PieceLength::Fixed(piece_length) if piece_length <= 0 => {
                Err(TorrentTreeError::TorrentBuilderFailure(Cow::Borrowed(
                    "TorrentBuilder has `piece_length` <= 0.",
                )))
            }
            PieceLength::Fixed(piece_length) if piece_length > MAX_FIXED_PIECE_LENGTH => {
                Err(TorrentTreeError::TorrentBuilderFailure(Cow::Owned(format!(
                    "TorrentBuilder has `piece_length` > {}.",
                    MAX_FIXED_PIECE_LENGTH
                ))))
            }
            PieceLength::Fixed(piece_length) if (piece_length & (piece_length - 1)) != 0 => {
                Err(TorrentTreeError::TorrentBuilderFailure(Cow::Borrowed(
                    "TorrentBuilder has `piece_length` that is not a power of 2.",
                )))
            }
            PieceLength::Fixed(_) => Ok(()),
        }
    }

    fn validate_extra_keys(
        fields: &Option<Dictionary>,
        field_name: &str,
    ) -> Result<(), TorrentTreeError> {
        if let Some(ref fields) = *fields {
            if fields.keys().any(|key| key.is_empty()) {
                return Err(TorrentTreeError::TorrentBuilderFailure(Cow::Owned(format!(
                    "TorrentBuilder has `{}` but it contains a 0-length key.",
                    field_name
                ))));
            }
        }
        Ok(())
    }
}
