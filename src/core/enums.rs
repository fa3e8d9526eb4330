//! Compact enums: enumerated values stored in a narrower integer
//!
//! Enumerator values are arbitrary (they may be sparse, or clustered near the
//! top of the storage range), so decoding is an equality match against the
//! declared table rather than a range check. Use [`blob_enum!`](crate::blob_enum)
//! to declare an enum and its table.

use crate::bytes::BlobRef;
use crate::error::{BlobError, Result};
use crate::view::View;
use std::fmt;
use std::marker::PhantomData;

/// An enum with an explicit raw value per variant.
pub trait BlobEnum: Copy + Sized + 'static {
    /// Type name used in error messages.
    const NAME: &'static str;

    /// Every declared variant, in declaration order.
    const VARIANTS: &'static [Self];

    /// Match `raw` against the declared values.
    fn from_raw(raw: u64) -> Option<Self>;

    fn to_raw(self) -> u64;
}

/// Unsigned integer widths a compact enum may be stored in.
pub trait EnumStorage: Copy + Into<u64> + TryFrom<u64> + fmt::Debug + for<'a> View<'a> {}

impl EnumStorage for u8 {}
impl EnumStorage for u16 {}
impl EnumStorage for u32 {}
impl EnumStorage for u64 {}

/// Declare an enum with explicit raw values and implement [`BlobEnum`] for it.
///
/// ```
/// resblob::blob_enum! {
///     pub enum Surface {
///         Asphalt = 0xFFFF_0000,
///         Gravel = 0xFFFF_0001,
///     }
/// }
///
/// use resblob::BlobEnum;
/// assert_eq!(Surface::from_raw(0xFFFF_0001), Some(Surface::Gravel));
/// assert_eq!(Surface::from_raw(2), None);
/// ```
#[macro_export]
macro_rules! blob_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $crate::BlobEnum for $name {
            const NAME: &'static str = stringify!($name);
            const VARIANTS: &'static [Self] = &[$( $name::$variant ),+];

            fn from_raw(raw: u64) -> ::core::option::Option<Self> {
                $(
                    if raw == ($value) as u64 {
                        return ::core::option::Option::Some($name::$variant);
                    }
                )+
                ::core::option::Option::None
            }

            fn to_raw(self) -> u64 {
                match self {
                    $( $name::$variant => ($value) as u64 ),+
                }
            }
        }
    };
}

/// Checked compact enum field: `S`-wide storage decoded to `E` on access.
pub struct CompactEnum<E, S> {
    raw: S,
    _marker: PhantomData<fn() -> E>,
}

impl<E: BlobEnum, S: EnumStorage> CompactEnum<E, S> {
    /// The stored integer, undecoded.
    pub fn raw(&self) -> S {
        self.raw
    }

    /// Decode, failing with `UnknownEnumValue` when no enumerator matches.
    pub fn get(&self) -> Result<E> {
        let value: u64 = self.raw.into();
        E::from_raw(value).ok_or(BlobError::UnknownEnumValue {
            name: E::NAME,
            value,
        })
    }

    /// Decode once and keep the result for infallible access.
    pub fn validate(&self) -> Result<TrustedEnum<E>> {
        self.get().map(TrustedEnum)
    }
}

impl<E, S: Copy> Clone for CompactEnum<E, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E, S: Copy> Copy for CompactEnum<E, S> {}

impl<E: BlobEnum, S: EnumStorage> fmt::Debug for CompactEnum<E, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompactEnum")
            .field("type", &E::NAME)
            .field("raw", &self.raw)
            .finish()
    }
}

impl<'a, E: BlobEnum, S: EnumStorage> View<'a> for CompactEnum<E, S> {
    const SIZE: usize = <S as View<'a>>::SIZE;

    fn view(blob: BlobRef<'a>, offset: usize) -> Result<Self> {
        Ok(CompactEnum {
            raw: <S as View<'a>>::view(blob, offset)?,
            _marker: PhantomData,
        })
    }
}

/// A compact enum value whose membership was already validated.
///
/// Only obtainable through [`CompactEnum::validate`], so `get` cannot fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrustedEnum<E>(E);

impl<E: BlobEnum> TrustedEnum<E> {
    pub fn get(&self) -> E {
        self.0
    }

    pub fn raw(&self) -> u64 {
        self.0.to_raw()
    }
}
