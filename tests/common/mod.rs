//! Test schema shared by the integration tests
//!
//! Hand-written equivalents of generated record views, plus a builder that
//! lays out one `TestRoot` blob with the reference encoder.

#![allow(dead_code)]

use resblob::{
    blob_enum, blob_record, BlobStr, BlobWriter, CompactEnum, Embedded, ExternalRef, FileId,
    Flags32, RelArray, RelDict, RelPtr, Resource, Result,
};

blob_enum! {
    pub enum TestEnum {
        EnumerationA = 0xFFFF_0000u32,
        EnumerationB = 0xFFFF_0001u32,
        EnumerationC = 0xFFFF_0002u32,
        EnumerationD = 0xFFFF_0003u32,
    }
}

blob_record! {
    /// RGBA, one byte per channel
    pub struct Color(4);
}

impl<'a> Color<'a> {
    pub fn rgba(&self) -> Result<[u8; 4]> {
        let r = self.record();
        Ok([r.field(0)?, r.field(1)?, r.field(2)?, r.field(3)?])
    }
}

blob_record! {
    pub struct TestArrayElement(8);
}

impl<'a> TestArrayElement<'a> {
    pub fn int(&self) -> Result<i32> {
        self.record().field(0)
    }

    pub fn float(&self) -> Result<f32> {
        self.record().field(4)
    }
}

blob_record! {
    pub struct TestData(60);
}

impl<'a> TestData<'a> {
    pub fn name(&self) -> Result<BlobStr<'a>> {
        self.record().field(0)
    }

    pub fn file(&self) -> Result<ExternalRef<TestResource>> {
        self.record().field(12)
    }

    pub fn floats(&self) -> Result<RelArray<'a, f32>> {
        self.record().field(20)
    }

    pub fn integer_list(&self) -> Result<RelArray<'a, i64>> {
        self.record().field(28)
    }

    pub fn object_array(&self) -> Result<RelArray<'a, TestArrayElement<'a>>> {
        self.record().field(36)
    }

    pub fn int_ptr_array(&self) -> Result<RelArray<'a, i64>> {
        self.record().field(44)
    }

    pub fn lookup(&self) -> Result<RelDict<'a, u32, TestArrayElement<'a>>> {
        self.record().field(52)
    }
}

blob_record! {
    pub struct TestRoot(32);
}

impl<'a> TestRoot<'a> {
    pub fn int32(&self) -> Result<i32> {
        self.record().field(0)
    }

    pub fn float(&self) -> Result<f32> {
        self.record().field(4)
    }

    pub fn test_enum(&self) -> Result<CompactEnum<TestEnum, u32>> {
        self.record().field(8)
    }

    pub fn color(&self) -> Result<Embedded<'a, Color<'a>>> {
        self.record().field(12)
    }

    pub fn handle(&self) -> Result<RelPtr<'a, i64>> {
        self.record().field(16)
    }

    pub fn data(&self) -> Result<Option<TestData<'a>>> {
        self.record().field::<RelPtr<'a, TestData<'a>>>(20)?.get()
    }

    pub fn bool4(&self) -> Result<bool> {
        self.record().flag(24, 0)
    }

    pub fn bool3(&self) -> Result<bool> {
        self.record().flag(24, 1)
    }

    pub fn bool2(&self) -> Result<bool> {
        self.record().flag(24, 2)
    }

    pub fn bool1(&self) -> Result<bool> {
        self.record().flag(24, 3)
    }

    pub fn flags(&self) -> Result<Flags32> {
        self.record().field(24)
    }

    pub fn int8(&self) -> Result<i8> {
        self.record().field(28)
    }
}

/// A blob file whose root is a `TestRoot`.
pub struct TestResource;

impl Resource for TestResource {
    type Root<'a> = TestRoot<'a>;
}

/// What to put in a generated test blob.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub int32: i32,
    pub enum_raw: u32,
    pub with_data: bool,
    pub name: String,
    pub file: FileId,
    pub checksum: bool,
}

impl Default for Fixture {
    fn default() -> Self {
        Fixture {
            int32: 42,
            enum_raw: 0xFFFF_0002,
            with_data: false,
            name: "test data".to_string(),
            file: FileId::NONE,
            checksum: true,
        }
    }
}

impl Fixture {
    pub fn with_data(mut self) -> Self {
        self.with_data = true;
        self
    }

    pub fn file(mut self, file: FileId) -> Self {
        self.with_data = true;
        self.file = file;
        self
    }

    pub fn int32(mut self, value: i32) -> Self {
        self.int32 = value;
        self
    }

    #[allow(clippy::approx_constant)]
    pub fn build(&self) -> Vec<u8> {
        let mut w = BlobWriter::new();
        let root = w.reserve(32, 8);

        w.put_i32(root, self.int32).unwrap();
        w.put_f32(root + 4, 3.14).unwrap();
        w.put_u32(root + 8, self.enum_raw).unwrap();
        for (i, channel) in [255u8, 128, 0, 64].iter().enumerate() {
            w.put_u8(root + 12 + i, *channel).unwrap();
        }

        let handle = w.reserve(8, 8);
        w.put_i64(handle, -5).unwrap();
        w.put_ptr(root + 16, handle).unwrap();

        if self.with_data {
            let data = w.reserve(60, 8);
            w.put_ptr(root + 20, data).unwrap();
            w.put_str(data, &self.name).unwrap();
            w.put_file_id(data + 12, self.file).unwrap();

            let floats = w.reserve(12, 4);
            for (i, v) in [1.0f32, 2.5, -0.5].iter().enumerate() {
                w.put_f32(floats + i * 4, *v).unwrap();
            }
            w.put_array(data + 20, floats, 3).unwrap();

            let ints = w.reserve(24, 8);
            for (i, v) in [10i64, -20, 30].iter().enumerate() {
                w.put_i64(ints + i * 8, *v).unwrap();
            }
            w.put_array(data + 28, ints, 3).unwrap();

            let objects = w.reserve(16, 4);
            for i in 0..2 {
                w.put_i32(objects + i * 8, i as i32 + 1).unwrap();
                w.put_f32(objects + i * 8 + 4, 0.5 * i as f32).unwrap();
            }
            w.put_array(data + 36, objects, 2).unwrap();

            w.put_array(data + 44, 0, 0).unwrap();

            // Keys 300 and 100, then their elements
            let lookup = w.reserve(8 + 16, 4);
            w.put_u32(lookup, 300).unwrap();
            w.put_u32(lookup + 4, 100).unwrap();
            for (i, (int, float)) in [(3, 1.5f32), (1, -1.0)].iter().enumerate() {
                w.put_i32(lookup + 8 + i * 8, *int).unwrap();
                w.put_f32(lookup + 12 + i * 8, *float).unwrap();
            }
            w.put_dict(data + 52, lookup, 2).unwrap();
        } else {
            w.put_null_ptr(root + 20).unwrap();
        }

        w.put_u32(root + 24, 0b1010).unwrap();
        w.put_i8(root + 28, -3).unwrap();

        w.set_root(root).unwrap();
        w.finish(self.checksum).unwrap()
    }
}
