// a macro to be used in tests to reduce boilerplate code
// informal syntax:
// -integer: as-is, works for (u8, u16, u32, i32, i64), conversion should be lossless
// -string: as-is, works for both owned and borrowed strings, becomes `Bytes`
// -bytes: (b1, b2, ...), support trailing comma
// -list: [e1, e2, ...], support trailing comma
// -dictionary: { (k1, v1), (k2, v2), ... }, keys are `&str`, support trailing comma
#[macro_export]
macro_rules! bencode_elem {
    ([ $( $element:tt ),* ]) => {
        $crate::bencode::BencodeElem::List(vec![ $( bencode_elem!($element) ),* ])
    };
    ([ $( $element:tt ),+ ,]) => {
        bencode_elem!([ $( $element ),* ])
    };
    (( $( $element:tt ),* )) => {
        $crate::bencode::BencodeElem::Bytes(vec![ $( $element ),* ])
    };
    (( $( $element:tt ),+ ,)) => {
        bencode_elem!(( $( $element ),* ))
    };
    ({ $( ($key:tt, $val:tt) ),* }) => {
        $crate::bencode::BencodeElem::Dictionary({
            let entries: Vec<(Vec<u8>, $crate::bencode::BencodeElem)> =
                vec![ $( ($key.as_bytes().to_vec(), bencode_elem!($val)) ),* ];
            entries.into_iter().collect::<$crate::bencode::Dictionary>()
        })
    };
    ({ $( ($key:tt, $val:tt) ),+ ,}) => {
        bencode_elem!({ $( ($key, $val) ),* })
    };
    ($other:expr) => {
        $crate::bencode::BencodeElem::from($other)
    }
}

#[cfg(test)]
mod bencode_elem_macro_tests {
    use crate::bencode::*;

    #[test]
    fn u8_to_integer_ok() {
        assert_eq!(bencode_elem!(0_u8), BencodeElem::Integer(0))
    }

    #[test]
    fn u32_to_integer_ok() {
        assert_eq!(bencode_elem!(0_u32), BencodeElem::Integer(0))
    }

    #[test]
    fn i64_to_integer_ok() {
        assert_eq!(bencode_elem!(-7_i64), BencodeElem::Integer(-7))
    }

    #[test]
    fn str_ref_to_bytes_ok() {
        assert_eq!(bencode_elem!("ab"), BencodeElem::Bytes(vec![b'a', b'b']))
    }

    #[test]
    fn string_to_bytes_ok() {
        let string = "".to_owned();
        assert_eq!(bencode_elem!(string), BencodeElem::Bytes(vec![]))
    }

    #[test]
    fn bytes_ok() {
        assert_eq!(
            bencode_elem!((0x01, 0x02)),
            BencodeElem::Bytes(vec![0x01, 0x02])
        )
    }

    #[test]
    fn bytes_empty() {
        assert_eq!(bencode_elem!(()), BencodeElem::Bytes(vec![]))
    }

    #[test]
    fn list_ok() {
        assert_eq!(
            bencode_elem!([0x01, "0x02", [0x03]]),
            BencodeElem::List(vec![
                BencodeElem::Integer(0x01),
                BencodeElem::Bytes(b"0x02".to_vec()),
                BencodeElem::List(vec![BencodeElem::Integer(0x03)]),
            ])
        )
    }

    #[test]
    fn list_empty() {
        assert_eq!(bencode_elem!([]), BencodeElem::List(vec![]))
    }

    #[test]
    fn dict_ok() {
        let mut inner = Dictionary::new();
        inner.insert(b"moo".to_vec(), BencodeElem::Integer(4));
        let mut outer = Dictionary::new();
        outer.insert(b"cow".to_vec(), BencodeElem::Dictionary(inner));
        outer.insert(b"spam".to_vec(), BencodeElem::Bytes(b"eggs".to_vec()));

        assert_eq!(
            bencode_elem!({ ("cow", { ("moo", 4) }), ("spam", "eggs") }),
            BencodeElem::Dictionary(outer)
        )
    }

    #[test]
    fn dict_empty() {
        assert_eq!(bencode_elem!({}), BencodeElem::Dictionary(Dictionary::new()))
    }
}
