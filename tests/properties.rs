//! Property-based tests for pointer, array and enum decoding
//!
//! Uses proptest to check that decoding agrees with a direct reading of the
//! bytes and never panics, whatever the bytes are.

mod common;

use common::{Fixture, TestEnum, TestRoot};
use proptest::prelude::*;
use resblob::{
    BlobEnum, BlobError, BlobImage, BlobRef, BlobStr, BlobWriter, CompactEnum, LoadOptions,
    RelArray, RelPtr, View,
};

/// Read every field reachable from a `TestRoot`, discarding errors.
fn walk(root: &TestRoot) {
    let _ = root.int32();
    let _ = root.float();
    let _ = root.test_enum().and_then(|e| e.get());
    let _ = root.color().and_then(|c| c.get()).and_then(|c| c.rgba());
    let _ = root.handle().and_then(|h| h.get());
    let _ = root.bool1();
    let _ = root.int8();

    if let Ok(Some(data)) = root.data() {
        let _ = data.name().and_then(|n| n.text().map(str::len));
        let _ = data.file();
        let _ = data.floats().and_then(|a| a.to_vec());
        let _ = data.integer_list().and_then(|a| a.to_vec());
        if let Ok(lookup) = data.lookup() {
            let _ = lookup.get(&100).map(|v| v.map(|e| e.int()));
            for (_, element) in lookup.iter().flatten() {
                let _ = element.float();
            }
        }
        if let Ok(objects) = data.object_array() {
            for element in objects.iter().flatten() {
                let _ = element.int();
                let _ = element.float();
            }
        }
    }
}

proptest! {
    #[test]
    fn prop_pointer_resolves_or_reports_bounds(
        len in 8usize..256,
        slot in 0usize..64,
        offset in -512i32..512,
    ) {
        let at = (slot * 4) % (len - 4);
        let mut data: Vec<u8> = (0..len).map(|i| i as u8).collect();
        data[at..at + 4].copy_from_slice(&offset.to_le_bytes());

        let ptr = RelPtr::<u32>::view(BlobRef::new(&data), at).unwrap();
        let target = at as i64 + offset as i64;

        match ptr.get() {
            Ok(None) => prop_assert_eq!(offset, 0),
            Ok(Some(value)) => {
                prop_assert!(offset != 0);
                let t = target as usize;
                let expected = u32::from_le_bytes([data[t], data[t + 1], data[t + 2], data[t + 3]]);
                prop_assert_eq!(value, expected);
            }
            Err(BlobError::OutOfBounds { .. }) => {
                prop_assert!(target < 0 || target + 4 > len as i64);
            }
            Err(other) => prop_assert!(false, "unexpected error {:?}", other),
        }
    }

    #[test]
    fn prop_array_matches_elements(
        values in prop::collection::vec(any::<u32>(), 0..64),
        gap in 0usize..32,
    ) {
        let mut writer = BlobWriter::new();
        let header = writer.reserve(8, 4);
        writer.reserve(gap, 1);
        let base = writer.reserve(values.len() * 4, 4);
        for (i, v) in values.iter().enumerate() {
            writer.put_u32(base + i * 4, *v).unwrap();
        }
        writer.put_array(header, base, values.len()).unwrap();
        writer.set_root(header).unwrap();

        let image = BlobImage::load(writer.finish(false).unwrap()).unwrap();
        let array: RelArray<u32> = image.root().unwrap();

        prop_assert_eq!(array.len(), values.len());
        prop_assert_eq!(&array.to_vec().unwrap(), &values);
        // Iteration is restartable and agrees with indexing
        let mut reversed = array.iter().rev().collect::<Result<Vec<_>, _>>().unwrap();
        reversed.reverse();
        prop_assert_eq!(&reversed, &values);
        for (i, v) in values.iter().enumerate() {
            prop_assert_eq!(array.get(i).unwrap(), *v);
        }
        let out_of_range = matches!(
            array.get(values.len()),
            Err(BlobError::IndexOutOfRange { .. })
        );
        prop_assert!(out_of_range);
    }

    #[test]
    fn prop_enum_matches_declared_values(raw in prop_oneof![
        0xFFFF_0000u32..=0xFFFF_0003,
        any::<u32>(),
    ]) {
        let bytes = raw.to_le_bytes();
        let field = CompactEnum::<TestEnum, u32>::view(BlobRef::new(&bytes), 0).unwrap();
        let declared = TestEnum::VARIANTS.iter().any(|v| v.to_raw() == raw as u64);

        match field.get() {
            Ok(value) => {
                prop_assert!(declared);
                prop_assert_eq!(value.to_raw(), raw as u64);
                prop_assert_eq!(field.validate().unwrap().get(), value);
            }
            Err(_) => {
                prop_assert!(!declared);
                prop_assert!(field.validate().is_err());
            }
        }
    }

    #[test]
    fn prop_string_lengths(text in "\\PC{0,40}") {
        let mut writer = BlobWriter::new();
        let slot = writer.reserve(12, 4);
        writer.put_str(slot, &text).unwrap();
        writer.set_root(slot).unwrap();

        let image = BlobImage::load(writer.finish(true).unwrap()).unwrap();
        let s: BlobStr = image.root().unwrap();

        prop_assert_eq!(s.text().unwrap(), text.as_str());
        prop_assert_eq!(s.len(), text.len());
        prop_assert_eq!(s.char_count(), text.chars().count());
    }

    #[test]
    fn prop_damaged_blob_never_panics(
        position in any::<prop::sample::Index>(),
        value in any::<u8>(),
    ) {
        let mut bytes = Fixture::default().with_data().build();
        let at = position.index(bytes.len());
        bytes[at] = value;

        let options = LoadOptions { verify_checksum: false, ..LoadOptions::default() };
        if let Ok(image) = BlobImage::load_with(bytes, &options) {
            if let Ok(root) = image.root::<TestRoot>() {
                walk(&root);
            }
        }
    }
}
