/// Adds conversions `from` and `into` integer to enums
///
/// Takes an enum that must have a `#[repr()]` as first meta field and assigns a
/// value to all enum variants. Values without a variant are kept in an
/// additional `Unknown` variant.
///
/// ```
/// # use imbuf_common::utils::convertible_enum;
/// convertible_enum!(
///     #[repr(u8)]
///     #[derive(Debug, PartialEq)]
///     pub enum Marker {
///         Soi = 0xD8,
///         Eoi = 0xD9,
///     }
/// );
/// let int: u8 = Marker::Eoi.into();
/// assert_eq!(int, 0xD9);
/// assert_eq!(Marker::from(0xD8), Marker::Soi);
/// assert_eq!(Marker::from(0xDA), Marker::Unknown(0xDA));
/// ```
#[macro_export]
macro_rules! convertible_enum {
    (#[repr($type:ty)]$(#[$meta:meta])* $visibility:vis enum $enum_name:ident {
        $($(#[$variant_meta:meta])* $variant_name:ident = $variant_value:expr,)*
    }) => {
        #[repr($type)]
        $(#[$meta])*
        $visibility enum $enum_name {
            $($(#[$variant_meta])* $variant_name = $variant_value,)*
            Unknown($type)
        }

        impl std::convert::From<$type> for $enum_name {
            fn from(v: $type) -> Self {
                $(if v == $variant_value {
                    return Self::$variant_name;
                })*
                Self::Unknown(v)
            }
        }

        impl std::convert::From<$enum_name> for $type {
            fn from(v: $enum_name) -> $type {
                match v {
                    $($enum_name::$variant_name => $variant_value,)*
                    $enum_name::Unknown(other) => other,
                }
            }
        }
    }
}

/// Adds conversions `try_from` and `into` integer to enums
///
/// Same as [`convertible_enum`] but without an `Unknown` variant. Conversion
/// from an integer without variant fails with a generated
/// `Unknown<Name>ValueError`.
///
/// ```
/// # use imbuf_common::utils::maybe_convertible_enum;
/// maybe_convertible_enum!(
///     #[repr(u8)]
///     #[derive(Debug, PartialEq)]
///     pub enum ColorType {
///         Gray = 0,
///         Rgb = 2,
///     }
/// );
/// let int: u8 = ColorType::Rgb.into();
/// assert_eq!(int, 2);
/// assert_eq!(ColorType::try_from(0), Ok(ColorType::Gray));
/// assert_eq!(ColorType::try_from(1), Err(UnknownColorTypeValueError(1)));
/// ```
#[macro_export]
macro_rules! maybe_convertible_enum {
    (#[repr($type:ty)]$(#[$meta:meta])* $visibility:vis enum $enum_name:ident {
        $($(#[$variant_meta:meta])* $variant_name:ident = $variant_value:expr,)*
    }) => {
        #[repr($type)]
        $(#[$meta])*
        $visibility enum $enum_name {
            $($(#[$variant_meta])* $variant_name = $variant_value,)*
        }

        $crate::paste::paste! {
            #[derive(Debug, Clone, Copy, PartialEq, Eq)]
            $visibility struct [<Unknown $enum_name ValueError>](pub $type);

            impl std::fmt::Display for [<Unknown $enum_name ValueError>] {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, concat!("Enum '", stringify!($enum_name), "' has no variant with value '{}'"), self.0)
                }
            }

            impl std::error::Error for [<Unknown $enum_name ValueError>] {}

            impl std::convert::TryFrom<$type> for $enum_name {
                type Error = [<Unknown $enum_name ValueError>];

                fn try_from(v: $type) -> Result<Self, Self::Error> {
                    $(if v == $variant_value {
                        return Ok(Self::$variant_name);
                    })*
                    Err([<Unknown $enum_name ValueError>](v))
                }
            }
        }

        impl std::convert::From<$enum_name> for $type {
            fn from(v: $enum_name) -> $type {
                match v {
                    $($enum_name::$variant_name => $variant_value,)*
                }
            }
        }
    }
}

pub use {convertible_enum, maybe_convertible_enum};
