use proptest::prelude::*;

use agora_types::{Address, ContentHash, Selector, Timestamp};

proptest! {
    /// Address text form parses back to the same address.
    #[test]
    fn address_text_roundtrip(bytes in prop::array::uniform20(0u8..)) {
        let addr = Address::new(bytes);
        let parsed: Address = addr.to_string().parse().unwrap();
        prop_assert_eq!(parsed, addr);
    }

    /// Address::is_zero is true only for all-zero bytes.
    #[test]
    fn address_is_zero_correct(bytes in prop::array::uniform20(0u8..)) {
        prop_assert_eq!(Address::new(bytes).is_zero(), bytes == [0u8; 20]);
    }

    /// Binary encoding keeps the raw bytes, not the hex text.
    #[test]
    fn address_bincode_is_raw_bytes(bytes in prop::array::uniform20(0u8..)) {
        let encoded = bincode::serialize(&Address::new(bytes)).unwrap();
        prop_assert_eq!(encoded.len(), 20);
        let decoded: Address = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded.as_bytes(), &bytes);
    }

    /// ContentHash text form parses back to the same hash.
    #[test]
    fn content_hash_text_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let hash = ContentHash::new(bytes);
        let parsed: ContentHash = hash.to_string().parse().unwrap();
        prop_assert_eq!(parsed, hash);
    }

    /// A payload's selector is its first four bytes whenever it has them.
    #[test]
    fn selector_from_payload_prefix(payload in prop::collection::vec(any::<u8>(), 0..64)) {
        let sel = Selector::from_payload(&payload);
        if payload.len() >= 4 {
            prop_assert_eq!(sel.as_bytes(), &payload[..4]);
        } else {
            prop_assert_eq!(sel, Selector::ZERO);
        }
    }

    /// Timestamp ordering: new(a) <= new(b) iff a <= b.
    #[test]
    fn timestamp_ordering(a in 0u64..u64::MAX, b in 0u64..u64::MAX) {
        let ta = Timestamp::new(a);
        let tb = Timestamp::new(b);
        prop_assert_eq!(ta <= tb, a <= b);
        prop_assert_eq!(ta == tb, a == b);
    }

    /// Timestamp elapsed_since: elapsed_since(now) = now - self (saturating).
    #[test]
    fn timestamp_elapsed_since(base in 0u64..1_000_000, offset in 0u64..1_000_000) {
        let t = Timestamp::new(base);
        let now = Timestamp::new(base + offset);
        prop_assert_eq!(t.elapsed_since(now), offset);
        prop_assert_eq!(now.elapsed_since(t), 0);
    }

    /// plus/minus saturate instead of wrapping.
    #[test]
    fn timestamp_shift_saturates(base in 0u64..u64::MAX, delta in 0u64..u64::MAX) {
        let t = Timestamp::new(base);
        prop_assert_eq!(t.plus(delta).as_secs(), base.saturating_add(delta));
        prop_assert_eq!(t.minus(delta).as_secs(), base.saturating_sub(delta));
    }
}
