#![no_main]
use libfuzzer_sys::fuzz_target;
use resblob::{BlobRef, BlobStr, FileId, InlineStr, RelArray, RelDict, RelPtr, View};

// Every view type at every offset of arbitrary bytes
fuzz_target!(|data: &[u8]| {
    let blob = BlobRef::new(data);

    for offset in 0..data.len().min(256) {
        let _ = RelPtr::<RelPtr<u32>>::view(blob, offset).and_then(|p| p.get());
        let _ = RelArray::<BlobStr>::view(blob, offset).map(|a| {
            a.iter()
                .map(|s| s.and_then(|s| s.text().map(str::len)))
                .count()
        });
        let _ = RelDict::<u16, BlobStr>::view(blob, offset).map(|d| {
            let _ = d.get(&0);
            d.iter().count()
        });
        let _ = BlobStr::view(blob, offset).and_then(|s| s.text().map(str::len));
        let _ = InlineStr::<15>::view(blob, offset).and_then(|s| s.text().map(str::len));
        let _ = FileId::view(blob, offset);
    }
});
