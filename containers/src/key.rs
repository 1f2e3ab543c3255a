/// Unsigned integer types usable as sparse-set keys.
pub trait SparseKey: Copy + Eq {
    fn to_usize(self) -> usize;
    fn from_usize(value: usize) -> Self;
}

macro_rules! impl_sparse_key {
    ($($ty:ty),*) => {
        $(
            impl SparseKey for $ty {
                #[inline(always)]
                fn to_usize(self) -> usize {
                    self as usize
                }

                #[inline(always)]
                fn from_usize(value: usize) -> Self {
                    value as $ty
                }
            }
        )*
    };
}

impl_sparse_key!(u8, u16, u32, u64, usize);

/// Small unsigned integer types usable as z-index bucket keys. The bucket
/// fan is allocated eagerly, so only types with a small value range apply.
pub trait ZIndex: Copy + Eq {
    const BUCKET_COUNT: usize;

    fn to_usize(self) -> usize;
}

impl ZIndex for u8 {
    const BUCKET_COUNT: usize = u8::MAX as usize + 1;

    #[inline(always)]
    fn to_usize(self) -> usize {
        self as usize
    }
}

impl ZIndex for u16 {
    const BUCKET_COUNT: usize = u16::MAX as usize + 1;

    #[inline(always)]
    fn to_usize(self) -> usize {
        self as usize
    }
}
