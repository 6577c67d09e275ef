use crate::TorrentTreeError;
use conv::ValueFrom;
use std::borrow::Cow;
use std::path::Path;

pub(crate) fn u64_to_usize(src: u64) -> Result<usize, TorrentTreeError> {
    usize::value_from(src).map_err(|_| {
        TorrentTreeError::FailedNumericConv(Cow::Owned(format!(
            "[{}] does not fit into usize.",
            src
        )))
    })
}

pub(crate) fn usize_to_u64(src: usize) -> Result<u64, TorrentTreeError> {
    u64::value_from(src).map_err(|_| {
        TorrentTreeError::FailedNumericConv(Cow::Owned(format!(
            "[{}] does not fit into u64.",
            src
        )))
    })
}

pub(crate) fn i64_to_u64(src: i64) -> Result<u64, TorrentTreeError> {
    u64::value_from(src).map_err(|_| {
        TorrentTreeError::FailedNumericConv(Cow::Owned(format!(
            "[{}] does not fit into u64.",
            src
        )))
    })
}

pub(crate) fn u64_to_i64(src: u64) -> Result<i64, TorrentTreeError> {
    i64::value_from(src).map_err(|_| {
        TorrentTreeError::FailedNumericConv(Cow::Owned(format!(
            "[{}] does not fit into i64.",
            src
        )))
    })
}

pub(crate) fn last_component<P>(path: P) -> Result<String, TorrentTreeError>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    match path.file_name() {
        Some(s) => Ok(s.to_string_lossy().into_owned()),
        None => Err(TorrentTreeError::InvalidArgument(Cow::Owned(format!(
            "[{}] has no last component.",
            path.display()
        )))),
    }
}

// Leading empty segments (i.e. from leading separators) are dropped.
// Nothing else is touched: "a//b" keeps its empty middle segment and
// "." / ".." are passed through as-is.
pub(crate) fn split_path(path: &str) -> Vec<String> {
    path.split('/')
        .skip_while(|segment| segment.is_empty())
        .map(str::to_owned)
        .collect()
}

pub(crate) struct ByteBuffer<'a> {
    bytes: &'a [u8],
    position: usize, // current cursor position
    length: usize,   // total buffer length
}

impl<'a> ByteBuffer<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> ByteBuffer<'a> {
        ByteBuffer {
            bytes,
            position: 0,
            length: bytes.len(),
        }
    }

    pub(crate) fn peek(&self) -> Option<&'a u8> {
        if self.is_empty() {
            None
        } else {
            Some(&self.bytes[self.position])
        }
    }

    pub(crate) fn advance(&mut self, step: usize) {
        self.position += step;
        if self.position > self.length {
            self.position = self.length;
        }
    }

    // Take exactly `len` bytes, or nothing at all if fewer remain.
    pub(crate) fn take_exact(&mut self, len: usize) -> Option<&'a [u8]> {
        if len > self.remaining() {
            None
        } else {
            let taken = &self.bytes[self.position..self.position + len];
            self.position += len;
            Some(taken)
        }
    }

    pub(crate) fn pos(&self) -> usize {
        self.position
    }

    pub(crate) fn remaining(&self) -> usize {
        self.length - self.position
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.position >= self.length
    }
}

impl<'a> Iterator for ByteBuffer<'a> {
    type Item = &'a u8;

    fn next(&mut self) -> Option<&'a u8> {
        if self.is_empty() {
            None
        } else {
            self.position += 1;
            Some(&self.bytes[self.position - 1])
        }
    }
}

#[cfg(test)]
mod util_tests {
    use super::*;

    #[test]
    fn last_component_ok() {
        assert_eq!(
            last_component("/root/dir/file.ext").unwrap(),
            "file.ext".to_string()
        );
    }

    #[test]
    fn last_component_ok_2() {
        assert_eq!(
            last_component("/root/dir/dir2").unwrap(),
            "dir2".to_string()
        );
    }

    #[test]
    fn last_component_err() {
        match last_component("/root/dir/..") {
            Err(TorrentTreeError::InvalidArgument(m)) => {
                assert_eq!(m, "[/root/dir/..] has no last component.");
            }
            _ => panic!(),
        }
    }

    #[test]
    fn last_component_root_and_empty() {
        for path in &["/", ""] {
            match last_component(path) {
                Err(TorrentTreeError::InvalidArgument(m)) => {
                    assert_eq!(m, format!("[{}] has no last component.", path));
                }
                _ => panic!(),
            }
        }
    }

    #[test]
    fn split_path_ok() {
        assert_eq!(split_path("dir1/dir2/file"), vec!["dir1", "dir2", "file"]);
    }

    #[test]
    fn split_path_leading_separators() {
        assert_eq!(split_path("//dir1/file"), vec!["dir1", "file"]);
    }

    #[test]
    fn split_path_keeps_inner_and_dot_segments() {
        assert_eq!(
            split_path("/a//../b/"),
            vec!["a", "", "..", "b", ""]
        );
    }

    #[test]
    fn split_path_only_separators() {
        assert!(split_path("///").is_empty());
    }

    #[test]
    fn u64_to_usize_ok() {
        assert_eq!(u64_to_usize(42).unwrap(), 42);
    }

    #[test]
    fn usize_to_u64_ok() {
        assert_eq!(usize_to_u64(42).unwrap(), 42);
    }

    #[test]
    fn i64_to_u64_err() {
        match i64_to_u64(-1) {
            Err(TorrentTreeError::FailedNumericConv(m)) => {
                assert_eq!(m, "[-1] does not fit into u64.");
            }
            _ => panic!(),
        }
    }

    #[test]
    fn u64_to_i64_err() {
        match u64_to_i64(u64::max_value()) {
            Err(TorrentTreeError::FailedNumericConv(_)) => (),
            _ => panic!(),
        }
    }
}

#[cfg(test)]
mod byte_buffer_tests {
    use super::*;

    #[test]
    fn byte_buffer_sanity_test() {
        let bytes = vec![1, 2, 3];
        let mut buffer = ByteBuffer::new(&bytes);

        assert!(!buffer.is_empty());
        assert_eq!(buffer.peek(), Some(&1));
        assert_eq!(buffer.pos(), 0);
        buffer.advance(1);

        assert!(!buffer.is_empty());
        assert_eq!(buffer.peek(), Some(&2));
        assert_eq!(buffer.remaining(), 2);
        buffer.advance(2);

        assert!(buffer.is_empty());
        assert_eq!(buffer.peek(), None);
        assert_eq!(buffer.pos(), 3);
        buffer.advance(1);

        assert!(buffer.is_empty());
        assert_eq!(buffer.pos(), 3);
    }

    #[test]
    fn byte_buffer_take_exact() {
        let bytes = vec![1, 2, 3];
        let mut buffer = ByteBuffer::new(&bytes);

        assert_eq!(buffer.take_exact(2), Some(&[1, 2][..]));
        assert_eq!(buffer.take_exact(2), None);
        // a failed take leaves the cursor alone
        assert_eq!(buffer.pos(), 2);
        assert_eq!(buffer.take_exact(1), Some(&[3][..]));
        assert_eq!(buffer.take_exact(0), Some(&[][..]));
    }

    #[test]
    fn byte_buffer_iterator_test() {
        let bytes = vec![1, 2, 3];
        let mut buffer = ByteBuffer::new(&bytes);
        let mut output = Vec::new();

        for byte in &mut buffer {
            output.push(*byte);
        }

        assert!(buffer.is_empty());
        assert_eq!(buffer.next(), None);
        assert_eq!(bytes, output);
    }
}
