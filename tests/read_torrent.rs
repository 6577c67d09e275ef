use rand::Rng;
use torrent_tree::bencode::BencodeElem;
use torrent_tree::digest;
use torrent_tree::torrent::{self, File, PieceLength, Torrent, TorrentBuilder};
use torrent_tree::TorrentTreeError;

// Canonical metadata for a 3-byte file ("abc") with one piece.
fn sample_bytes() -> Vec<u8> {
    let mut bytes = b"d8:announce3:url4:info".to_vec();
    bytes.extend_from_slice(&sample_info_bytes());
    bytes.push(b'e');
    bytes
}

fn sample_info_bytes() -> Vec<u8> {
    let mut bytes = b"d5:filesld6:lengthi3e4:pathl3:dir3:abceee\
                      4:name3:abc12:piece lengthi4096e6:pieces20:"
        .to_vec();
    bytes.extend_from_slice(&digest::hash(b"abc"));
    bytes.push(b'e');
    bytes
}

#[test]
fn read_from_bytes_ok() {
    let torrent = Torrent::read_from_bytes(sample_bytes()).unwrap();

    assert_eq!(
        torrent,
        Torrent {
            announce: "url".to_owned(),
            length: 3,
            files: vec![File {
                length: 3,
                path: vec!["dir".to_owned(), "abc".to_owned()],
                extra_fields: None,
            }],
            name: "abc".to_owned(),
            piece_length: 4096,
            pieces: vec![digest::hash(b"abc").to_vec()],
            extra_fields: None,
            extra_info_fields: None,
        }
    );
    assert_eq!(torrent.encode().unwrap(), sample_bytes());
    assert_eq!(
        torrent.info_hash().unwrap(),
        digest::hash(&sample_info_bytes())
    );
}

#[test]
fn read_from_file_ok() {
    let mut content = vec![0_u8; 20_000];
    rand::thread_rng().fill(&mut content[..]);
    let torrent = TorrentBuilder::new("url", "sample", PieceLength::Adaptive)
        .add_extra_info_field("source".to_owned(), BencodeElem::from("tests"))
        .build_from_reader(&content[..], 20_000)
        .unwrap();

    let path = std::env::temp_dir().join(format!(
        "torrent_tree_{}.torrent",
        rand::thread_rng().gen::<u64>()
    ));
    torrent.write_into_file(&path).unwrap();

    assert_eq!(Torrent::read_from_file(&path).unwrap(), torrent);

    std::fs::remove_file(path).unwrap();
}

#[test]
fn read_from_file_missing() {
    match Torrent::read_from_file("no/such/file.torrent") {
        Err(TorrentTreeError::Io(_)) => (),
        _ => panic!(),
    }
}

#[test]
fn read_from_bytes_not_bencode() {
    match Torrent::read_from_bytes("x123") {
        Err(TorrentTreeError::MalformedInput(_)) => (),
        _ => panic!(),
    }
}

#[test]
fn read_from_bytes_single_file_layout() {
    // `length` directly in `info` instead of a `files` list
    let mut bytes = b"d8:announce3:url4:infod6:lengthi3e4:name3:abc\
                      12:piece lengthi4096e6:pieces20:"
        .to_vec();
    bytes.extend_from_slice(&digest::hash(b"abc"));
    bytes.extend_from_slice(b"ee");

    match Torrent::read_from_bytes(bytes) {
        Err(TorrentTreeError::MalformedTorrent(m)) => {
            assert_eq!(m, "\"files\" does not exist.");
        }
        _ => panic!(),
    }
}

#[test]
fn read_from_bytes_missing_piece() {
    let bytes = b"d8:announce3:url4:infod5:filesld6:lengthi3e4:pathl3:abceee\
                  4:name3:abc12:piece lengthi4096e6:pieces0:ee";

    match Torrent::read_from_bytes(&bytes[..]) {
        Err(TorrentTreeError::MalformedTorrent(m)) => {
            assert_eq!(
                m,
                "3 byte(s) with a piece length of 4096 need 1 piece(s), 0 found."
            );
        }
        _ => panic!(),
    }
}

#[test]
fn content_identifier_matches_raw_info() {
    assert_eq!(
        torrent::content_identifier(sample_bytes()).unwrap(),
        digest::hash(&sample_info_bytes())
    );
}

#[test]
fn content_identifier_non_canonical_info() {
    // same `info` entries as `sample_info_bytes()`, but `name` comes first
    let mut info = b"d4:name3:abc5:filesld6:lengthi3e4:pathl3:dir3:abceee\
                     12:piece lengthi4096e6:pieces20:"
        .to_vec();
    info.extend_from_slice(&digest::hash(b"abc"));
    info.push(b'e');

    let mut bytes = b"d8:announce3:url4:info".to_vec();
    bytes.extend_from_slice(&info);
    bytes.push(b'e');

    let id = torrent::content_identifier(&bytes).unwrap();
    assert_ne!(id, digest::hash(&info));
    assert_eq!(id, digest::hash(&sample_info_bytes()));
}

#[test]
fn content_identifier_trailing_data() {
    let mut bytes = sample_bytes();
    bytes.extend_from_slice(b"i0e");

    match torrent::content_identifier(bytes) {
        Err(TorrentTreeError::TrailingData(3)) => (),
        _ => panic!(),
    }
}
