//! Typed views over blob bytes
//!
//! A [`View`] is anything that can be decoded from a fixed-size slot inside a
//! blob. Primitives decode to plain values; records decode to a
//! [`RecordRef`] that reads its fields on demand. Generated schema code only
//! needs to implement `View` for each record and call the `RecordRef` field
//! readers with the field's byte offset.

use crate::bytes::BlobRef;
use crate::error::{Corruption, Result};
use std::marker::PhantomData;

/// A value decodable from `SIZE` bytes at an absolute offset in a blob.
pub trait View<'a>: Sized {
    /// Stride of this type inside records and arrays.
    const SIZE: usize;

    fn view(blob: BlobRef<'a>, offset: usize) -> Result<Self>;
}

macro_rules! primitive_view {
    ($($ty:ty => $read:ident),+ $(,)?) => {
        $(
            impl<'a> View<'a> for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                fn view(blob: BlobRef<'a>, offset: usize) -> Result<Self> {
                    blob.$read(offset)
                }
            }
        )+
    };
}

primitive_view! {
    u8 => read_u8,
    i8 => read_i8,
    u16 => read_u16,
    i16 => read_i16,
    u32 => read_u32,
    i32 => read_i32,
    u64 => read_u64,
    i64 => read_i64,
    f32 => read_f32,
    f64 => read_f64,
}

impl<'a> View<'a> for bool {
    const SIZE: usize = 1;

    fn view(blob: BlobRef<'a>, offset: usize) -> Result<Self> {
        match blob.read_u8(offset)? {
            0 => Ok(false),
            1 => Ok(true),
            value => Err(Corruption::InvalidBool { offset, value }.into()),
        }
    }
}

/// A packed 32-bit flag word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Flags32(pub u32);

impl Flags32 {
    /// Whether bit `bit` (0 = least significant) is set.
    pub fn is_set(&self, bit: u32) -> bool {
        bit < 32 && (self.0 >> bit) & 1 != 0
    }

    pub fn bits(&self) -> u32 {
        self.0
    }
}

impl<'a> View<'a> for Flags32 {
    const SIZE: usize = 4;

    fn view(blob: BlobRef<'a>, offset: usize) -> Result<Self> {
        Ok(Flags32(blob.read_u32(offset)?))
    }
}

/// Base of every record view: a blob and the record's absolute offset.
///
/// The record's full extent is bounds-checked once on construction.
#[derive(Clone, Copy, Debug)]
pub struct RecordRef<'a> {
    blob: BlobRef<'a>,
    offset: usize,
}

impl<'a> RecordRef<'a> {
    pub fn new(blob: BlobRef<'a>, offset: usize, size: usize) -> Result<Self> {
        blob.check(offset, size)?;
        Ok(RecordRef { blob, offset })
    }

    pub fn blob(&self) -> BlobRef<'a> {
        self.blob
    }

    /// Absolute offset of the record in its blob.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Decode the field at `field_offset` bytes into the record.
    pub fn field<T: View<'a>>(&self, field_offset: usize) -> Result<T> {
        T::view(self.blob, self.offset + field_offset)
    }

    /// Read one bit of a `u32` flag word at `field_offset`.
    pub fn flag(&self, field_offset: usize, bit: u32) -> Result<bool> {
        Ok(self.field::<Flags32>(field_offset)?.is_set(bit))
    }
}

/// A value stored inline in its parent record, by composition.
///
/// Carries no offset of its own: its bytes are part of the parent's extent
/// and it lives exactly as long as the parent's blob.
pub struct Embedded<'a, T> {
    blob: BlobRef<'a>,
    offset: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T: View<'a>> Embedded<'a, T> {
    /// Decode the inline value.
    pub fn get(&self) -> Result<T> {
        T::view(self.blob, self.offset)
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl<'a, T> Clone for Embedded<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T> Copy for Embedded<'a, T> {}

impl<'a, T> std::fmt::Debug for Embedded<'a, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Embedded")
            .field("offset", &self.offset)
            .finish()
    }
}

impl<'a, T: View<'a>> View<'a> for Embedded<'a, T> {
    const SIZE: usize = T::SIZE;

    fn view(blob: BlobRef<'a>, offset: usize) -> Result<Self> {
        blob.check(offset, T::SIZE)?;
        Ok(Embedded {
            blob,
            offset,
            _marker: PhantomData,
        })
    }
}

/// Declare a record view type of a fixed size.
///
/// The generated type wraps a [`RecordRef`] (reachable through `record()`)
/// and implements [`View`]; field accessors go in a separate `impl` block.
///
/// ```
/// use resblob::{blob_record, BlobRef, Result, View};
///
/// blob_record! {
///     /// 2D point: two f32s
///     pub struct Point(8);
/// }
///
/// impl<'a> Point<'a> {
///     pub fn x(&self) -> Result<f32> {
///         self.record().field(0)
///     }
///
///     pub fn y(&self) -> Result<f32> {
///         self.record().field(4)
///     }
/// }
///
/// let mut bytes = 1.0f32.to_le_bytes().to_vec();
/// bytes.extend_from_slice(&2.0f32.to_le_bytes());
/// let point = Point::view(BlobRef::new(&bytes), 0).unwrap();
/// assert_eq!(point.y().unwrap(), 2.0);
/// ```
#[macro_export]
macro_rules! blob_record {
    ($(#[$meta:meta])* $vis:vis struct $name:ident($size:expr);) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug)]
        $vis struct $name<'a>($crate::RecordRef<'a>);

        impl<'a> $name<'a> {
            #[allow(dead_code)]
            pub fn record(&self) -> $crate::RecordRef<'a> {
                self.0
            }
        }

        impl<'a> $crate::View<'a> for $name<'a> {
            const SIZE: usize = $size;

            fn view(blob: $crate::BlobRef<'a>, offset: usize) -> $crate::Result<Self> {
                $crate::RecordRef::new(blob, offset, $size).map($name)
            }
        }
    };
}
