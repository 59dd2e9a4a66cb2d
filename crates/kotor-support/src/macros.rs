/// Implement conversions from an id newtype to narrower integer types.
///
/// The conversion must be able to fail; types that always fit should use `From`.
///
/// ```rust
/// use kotor_support::id_try_into;
/// pub struct SlotId(u32);
/// id_try_into!(SlotId => u8, i16);
/// assert_eq!(u8::try_from(SlotId(5)), Ok(5));
/// assert!(i16::try_from(SlotId(70000)).is_err());
/// ```
#[macro_export]
macro_rules! id_try_into {
    ($id:ident => $($to:ty),+ $(,)?) => {
        $(
            impl ::core::convert::TryFrom<$id> for $to {
                type Error = ::core::num::TryFromIntError;
                fn try_from(id: $id) -> ::core::result::Result<Self, Self::Error> {
                    ::core::convert::TryInto::try_into(id.0)
                }
            }
        )+
    };
}

/// Implement fallible conversions from integer types into an id newtype.
#[macro_export]
macro_rules! id_try_from {
    ($id:ident <= $($from:ty),+ $(,)?) => {
        $(
            impl ::core::convert::TryFrom<$from> for $id {
                type Error = ::core::num::TryFromIntError;
                fn try_from(n: $from) -> ::core::result::Result<Self, Self::Error> {
                    ::core::convert::TryInto::try_into(n).map(Self)
                }
            }
        )+
    };
}
