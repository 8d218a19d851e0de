/// Implements a binary operator and its assigning form for all owned and
/// borrowed operand combinations, delegating to an inherent
/// `fn $method(&self, &Self) -> Self`.
macro_rules! impl_binop {
    ($ty:ident, $op:ident, $op_fn:ident, $assign:ident, $assign_fn:ident, $method:ident) => {
        impl core::ops::$op<$ty> for $ty {
            type Output = $ty;

            #[inline]
            fn $op_fn(self, rhs: $ty) -> $ty {
                $ty::$method(&self, &rhs)
            }
        }

        impl core::ops::$op<&$ty> for $ty {
            type Output = $ty;

            #[inline]
            fn $op_fn(self, rhs: &$ty) -> $ty {
                $ty::$method(&self, rhs)
            }
        }

        impl core::ops::$op<$ty> for &$ty {
            type Output = $ty;

            #[inline]
            fn $op_fn(self, rhs: $ty) -> $ty {
                $ty::$method(self, &rhs)
            }
        }

        impl core::ops::$op<&$ty> for &$ty {
            type Output = $ty;

            #[inline]
            fn $op_fn(self, rhs: &$ty) -> $ty {
                $ty::$method(self, rhs)
            }
        }

        impl core::ops::$assign<$ty> for $ty {
            #[inline]
            fn $assign_fn(&mut self, rhs: $ty) {
                *self = $ty::$method(self, &rhs);
            }
        }

        impl core::ops::$assign<&$ty> for $ty {
            #[inline]
            fn $assign_fn(&mut self, rhs: &$ty) {
                *self = $ty::$method(self, rhs);
            }
        }
    };
}

/// Field-like types: `+`, `-`, `*` and unary `-`.
macro_rules! impl_ring_ops {
    ($ty:ident) => {
        impl_binop!($ty, Add, add, AddAssign, add_assign, add);
        impl_binop!($ty, Sub, sub, SubAssign, sub_assign, sub);
        impl_binop!($ty, Mul, mul, MulAssign, mul_assign, mul);

        impl core::ops::Neg for $ty {
            type Output = $ty;

            #[inline]
            fn neg(self) -> $ty {
                self.negate()
            }
        }

        impl core::ops::Neg for &$ty {
            type Output = $ty;

            #[inline]
            fn neg(self) -> $ty {
                self.negate()
            }
        }
    };
}
