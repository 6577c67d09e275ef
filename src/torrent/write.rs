use super::*;
use std::io::Write;
use std::path::Path;

impl File {
    pub(crate) fn into_bencode_elem(self) -> BencodeElem {
        let mut result = Dictionary::new();

        result.insert(b"length".to_vec(), BencodeElem::Integer(self.length));
        result.insert(
            b"path".to_vec(),
            BencodeElem::List(self.path.into_iter().map(BencodeElem::from).collect()),
        );

        if let Some(extra_fields) = self.extra_fields {
            result.extend(extra_fields);
        }

        BencodeElem::Dictionary(result)
    }
}

impl Torrent {
    fn to_bencode_elem(&self) -> Result<BencodeElem, TorrentTreeError> {
        let mut result = Dictionary::new();

        result.insert(
            b"announce".to_vec(),
            BencodeElem::from(self.announce.as_str()),
        );
        result.insert(b"info".to_vec(), self.construct_info()?);

        if let Some(ref extra_fields) = self.extra_fields {
            result.extend(extra_fields.clone());
        }

        Ok(BencodeElem::Dictionary(result))
    }

    /// Encode `self` as bencode and write the result to `dst`.
    pub fn write_into<W>(&self, dst: &mut W) -> Result<(), TorrentTreeError>
    where
        W: Write,
    {
        self.to_bencode_elem()?.write_into(dst)
    }

    /// Encode `self` as bencode and write the result to `path`.
    ///
    /// `path` must be the path to a file.
    ///
    /// "This function will create a file if it does
    /// not exist, and will truncate it if it does."
    pub fn write_into_file<P>(&self, path: P) -> Result<(), TorrentTreeError>
    where
        P: AsRef<Path>,
    {
        self.to_bencode_elem()?.write_into_file(path)
    }

    /// Encode `self` as bencode and return the result in a `Vec`.
    pub fn encode(&self) -> Result<Vec<u8>, TorrentTreeError> {
        self.to_bencode_elem()?.encode()
    }
}
