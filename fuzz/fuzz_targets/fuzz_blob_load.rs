#![no_main]
use libfuzzer_sys::fuzz_target;
use resblob::{BlobImage, LoadOptions, RelArray, RelPtr};

// Arbitrary bytes must either be rejected or decode without panicking
fuzz_target!(|data: &[u8]| {
    let options = LoadOptions {
        verify_checksum: false,
        ..LoadOptions::default()
    };
    let image = match BlobImage::load_with(data, &options) {
        Ok(image) => image,
        Err(_) => return,
    };

    if let Ok(array) = image.root::<RelArray<u32>>() {
        for value in array.iter() {
            let _ = value;
        }
    }
    if let Ok(ptr) = image.root::<RelPtr<u64>>() {
        let _ = ptr.get();
    }
});
