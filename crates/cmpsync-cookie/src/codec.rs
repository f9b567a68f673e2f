use std::collections::BTreeSet;

use cmpsync_vendor::{is_custom_vendor, CUSTOM_VENDOR_START_ID};
use serde::{Deserialize, Serialize};

use crate::error::{CookieError, Result};
use crate::record::KnownVendorsRecord;

/// Code point of the character representing an all-zero block.
pub const BASE_CODE_POINT: u32 = 48;

/// Vendor ids packed per character.
pub const BLOCK_BITS: u32 = 6;

const BLOCK_MASK: u32 = (1 << BLOCK_BITS) - 1;

/// Largest registry id the packed string may carry.
const MAX_GLOBAL_ID: u32 = CUSTOM_VENDOR_START_ID - 1;

/// Serialized cookie container.
#[derive(Debug, Serialize, Deserialize)]
struct Container {
    global: String,
    custom: Vec<u32>,
}

/// Pack registry ids into one character per block of six ids.
///
/// The result has `max / 6 + 1` characters, or none for an empty set.
pub fn encode_global(ids: &BTreeSet<u32>) -> Result<String> {
    let Some(&max) = ids.last() else {
        return Ok(String::new());
    };
    if max > MAX_GLOBAL_ID {
        return Err(CookieError::IdOutOfRange {
            id: max,
            max: MAX_GLOBAL_ID,
        });
    }

    let mut masks = vec![0u32; (max / BLOCK_BITS + 1) as usize];
    for &id in ids {
        masks[(id / BLOCK_BITS) as usize] |= 1 << (id % BLOCK_BITS);
    }

    // BASE_CODE_POINT + 63 stays in ASCII, so from_u32 cannot fail.
    Ok(masks
        .into_iter()
        .filter_map(|mask| char::from_u32(BASE_CODE_POINT + mask))
        .collect())
}

/// Unpack a string produced by [`encode_global`].
pub fn decode_global(packed: &str) -> Result<BTreeSet<u32>> {
    let mut ids = BTreeSet::new();

    for (block, character) in packed.chars().enumerate() {
        let mask = (character as u32)
            .checked_sub(BASE_CODE_POINT)
            .filter(|mask| *mask <= BLOCK_MASK)
            .ok_or(CookieError::InvalidCharacter {
                position: block,
                character,
            })?;

        let block_start = u32::try_from(block)
            .ok()
            .and_then(|block| block.checked_mul(BLOCK_BITS))
            .unwrap_or(u32::MAX);

        for bit in 0..BLOCK_BITS {
            if mask & (1 << bit) == 0 {
                continue;
            }
            let id = block_start.saturating_add(bit);
            if id > MAX_GLOBAL_ID {
                return Err(CookieError::IdOutOfRange {
                    id,
                    max: MAX_GLOBAL_ID,
                });
            }
            ids.insert(id);
        }
    }

    Ok(ids)
}

/// Encode a cookie value from registry and custom id sets.
pub fn encode(global: &BTreeSet<u32>, custom: &BTreeSet<u32>) -> Result<String> {
    let container = Container {
        global: encode_global(global)?,
        custom: custom.iter().copied().collect(),
    };
    Ok(serde_json::to_string(&container)?)
}

/// Decode a cookie value. Either the whole value decodes or nothing does.
pub fn decode(value: &str) -> Result<KnownVendorsRecord> {
    let container: Container = serde_json::from_str(value)?;
    let global = decode_global(&container.global)?;
    if let Some(&id) = container
        .custom
        .iter()
        .find(|id| !is_custom_vendor(**id, CUSTOM_VENDOR_START_ID))
    {
        return Err(CookieError::CustomIdOutOfRange {
            id,
            min: CUSTOM_VENDOR_START_ID,
        });
    }
    let record = KnownVendorsRecord {
        global,
        custom: container.custom.into_iter().collect(),
    };
    tracing::trace!(
        global = record.global.len(),
        custom = record.custom.len(),
        "decoded known-vendor cookie"
    );
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_example_ids() {
        let packed = encode_global(&BTreeSet::from([0, 1, 7])).unwrap();
        let expected: String = [BASE_CODE_POINT + 3, BASE_CODE_POINT + 2]
            .into_iter()
            .filter_map(char::from_u32)
            .collect();
        assert_eq!(packed, expected);
        assert_eq!(packed, "32");
    }

    #[test]
    fn packed_length_follows_max_id() {
        assert_eq!(encode_global(&BTreeSet::from([5])).unwrap().len(), 1);
        assert_eq!(encode_global(&BTreeSet::from([6])).unwrap().len(), 2);
        assert_eq!(encode_global(&BTreeSet::from([600])).unwrap().len(), 101);
        assert_eq!(encode_global(&BTreeSet::new()).unwrap(), "");
    }

    #[test]
    fn packed_alphabet_spans_full_block() {
        let ids: BTreeSet<u32> = (0..6).collect();
        let packed = encode_global(&ids).unwrap();
        assert_eq!(packed.chars().next().map(|c| c as u32), Some(BASE_CODE_POINT + 63));
        assert_eq!(decode_global(&packed).unwrap(), ids);
    }

    #[test]
    fn cookie_roundtrip() {
        let global = BTreeSet::from([0, 1, 7, 52, 755]);
        let custom = BTreeSet::from([5000, 5001, 6100]);
        let value = encode(&global, &custom).unwrap();
        let record = decode(&value).unwrap();
        assert_eq!(record.global, global);
        assert_eq!(record.custom, custom);
    }

    #[test]
    fn packed_roundtrip_edge_sets() {
        let sets: Vec<BTreeSet<u32>> = vec![
            BTreeSet::new(),
            BTreeSet::from([0]),
            BTreeSet::from([MAX_GLOBAL_ID]),
            (0..6).collect(),
            (6..12).collect(),
            (0..120).step_by(2).collect(),
            (1..121).step_by(2).collect(),
            BTreeSet::from([5, 6, 4998, 4999]),
        ];
        for ids in sets {
            let packed = encode_global(&ids).unwrap();
            assert_eq!(decode_global(&packed).unwrap(), ids, "packed {packed:?}");
        }
    }

    #[test]
    fn container_shape() {
        let value = encode(&BTreeSet::from([0, 1, 7]), &BTreeSet::from([5000])).unwrap();
        assert_eq!(value, r#"{"global":"32","custom":[5000]}"#);
    }

    #[test]
    fn rejects_registry_id_in_custom_range() {
        let result = encode_global(&BTreeSet::from([CUSTOM_VENDOR_START_ID]));
        assert!(matches!(result, Err(CookieError::IdOutOfRange { .. })));
    }

    #[test]
    fn rejects_character_outside_alphabet() {
        let result = decode_global("3/");
        assert!(matches!(
            result,
            Err(CookieError::InvalidCharacter {
                position: 1,
                character: '/'
            })
        ));
        assert!(decode_global("p").is_err());
    }

    #[test]
    fn rejects_malformed_container() {
        assert!(matches!(decode("not json"), Err(CookieError::Malformed(_))));
        assert!(matches!(
            decode(r#"{"global":"3"}"#),
            Err(CookieError::Malformed(_))
        ));
        assert!(matches!(
            decode(r#"{"global":"3","custom":["x"]}"#),
            Err(CookieError::Malformed(_))
        ));
    }

    #[test]
    fn registry_id_in_custom_list_fails_whole_decode() {
        let result = decode(r#"{"global":"3","custom":[5000,42]}"#);
        assert!(matches!(
            result,
            Err(CookieError::CustomIdOutOfRange { id: 42, min: 5000 })
        ));
    }

    #[test]
    fn bad_character_fails_whole_decode() {
        let result = decode(r#"{"global":"33~3","custom":[5000]}"#);
        assert!(matches!(result, Err(CookieError::InvalidCharacter { .. })));
    }
}
