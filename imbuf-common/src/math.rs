//! Overflow checked arithmetic for sizes read from untrusted headers

#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    #[error("Operation {0:?} + {1:?} failed")]
    AddFailed(Option<u64>, Option<u64>),
    #[error("Operation {0:?} - {1:?} failed")]
    SubFailed(Option<u64>, Option<u64>),
    #[error("Operation {0:?} * {1:?} failed")]
    MulFailed(Option<u64>, Option<u64>),
    #[error("Operation {0:?} / {1:?} failed")]
    DivFailed(Option<u64>, Option<u64>),
    #[error("Conversion failed for value {0:?}")]
    ConversionFailed(Option<u64>),
}

/// Container for integers where every operation is checked
///
/// The first failing operation is kept and returned by [`Checked::check`].
///
/// ```
/// # use imbuf_common::math::Checked;
/// let x = Checked::new(2_u32);
/// assert_eq!((x + 3_u32).check(), Ok(5));
/// assert!((x - 3_u32).check().is_err());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Checked<T>(Result<T, MathError>);

impl<T> Checked<T> {
    pub fn new(val: T) -> Self {
        Self(Ok(val))
    }

    pub fn check(self) -> Result<T, MathError> {
        self.0
    }
}

impl<T> From<T> for Checked<T> {
    fn from(val: T) -> Self {
        Self(Ok(val))
    }
}

/// Redefines variables as [`Checked`]
///
/// ```
/// # use imbuf_common::math::checked;
/// let width = 300_usize;
/// let height = 200_usize;
/// checked![width];
///
/// assert_eq!((width * height * 4_usize).check(), Ok(240_000));
///
/// let len = usize::MAX;
/// checked![len];
/// assert!((len + 1_usize).check().is_err());
/// ```
#[macro_export]
macro_rules! checked [
    ($($v:ident$(,)?)*) => {
        $( let $v = $crate::math::Checked::new($v); )*
    };
];

pub use checked;

macro_rules! impl_operator {
    ($op:ident, $f:ident, $t:ty) => {
        paste::paste! {
            impl [< Safe $op >] for $t {
                fn [< safe_ $f >](self, rhs: $t) -> Result<$t, MathError> {
                    self.[< checked_ $f >](rhs).ok_or_else(|| {
                        MathError:: [< $op Failed >] (self.try_into().ok(), rhs.try_into().ok())
                    })
                }
            }

            impl<R: Into<Self> + Copy> std::ops::$op<R> for Checked<$t> {
                type Output = Self;

                #[inline]
                fn $f(self, rhs: R) -> Self::Output {
                    let Checked(Ok(x)) = self else { return self };
                    let Checked(Ok(y)) = rhs.into() else { return rhs.into() };
                    Checked(x.[< safe_ $f >](y))
                }
            }
        }
    };
}

macro_rules! impl_integer {
    ($t:ty) => {
        impl_operator!(Add, add, $t);
        impl_operator!(Sub, sub, $t);
        impl_operator!(Mul, mul, $t);
        impl_operator!(Div, div, $t);

        impl Checked<$t> {
            /// Converts the contained value into `usize`
            pub fn usize(self) -> Checked<usize> {
                match self.0 {
                    Err(err) => Checked(Err(err)),
                    Ok(v) => Checked(v.usize()),
                }
            }
        }
    };
}

impl_integer!(u16);
impl_integer!(u32);
impl_integer!(u64);
impl_integer!(usize);

macro_rules! conversion_trait {
    ($trait:ident, $f:ident, $target:ty, [$($source:ty),*]) => {
        pub trait $trait: Sized + TryInto<$target> + TryInto<u64> + Copy {
            fn $f(self) -> Result<$target, MathError> {
                self.try_into()
                    .map_err(|_| MathError::ConversionFailed(self.try_into().ok()))
            }
        }

        $(impl $trait for $source {})*
    };
}

conversion_trait!(ToU8, u8, u8, [u16, u32, u64, usize]);
conversion_trait!(ToU16, u16, u16, [u8, u32, u64, usize]);
conversion_trait!(ToU32, u32, u32, [u8, u16, u64, usize]);
conversion_trait!(ToU64, u64, u64, [u8, u16, u32, usize]);
conversion_trait!(ToUsize, usize, usize, [u8, u16, u32, u64, usize]);

/// Same as `checked_add` functions but returns an error
pub trait SafeAdd: Sized {
    fn safe_add(self, rhs: Self) -> Result<Self, MathError>;
}

/// Same as `checked_sub` functions but returns an error
pub trait SafeSub: Sized {
    fn safe_sub(self, rhs: Self) -> Result<Self, MathError>;
}

/// Same as `checked_mul` functions but returns an error
pub trait SafeMul: Sized {
    fn safe_mul(self, rhs: Self) -> Result<Self, MathError>;
}

/// Same as `checked_div` functions but returns an error
pub trait SafeDiv: Sized {
    fn safe_div(self, rhs: Self) -> Result<Self, MathError>;
}
