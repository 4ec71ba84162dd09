//! Type-tagged numeric buffers.
//!
//! A [`Mem`] holds a host array of one of the element types used by the
//! simulator. Noise data is only ever real (`f32` or `f64`), but buffers of
//! other element types can reach the numeric kernels, which must reject them
//! with [`NoiseError::BadDataType`].

use std::fmt::Debug;

use num_complex::Complex;
use num_traits::{Float, FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::error::NoiseError;

/// Floating point precision of the simulation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Precision {
    /// 32-bit floats
    Single,
    /// 64-bit floats
    #[default]
    Double,
}

impl Precision {
    /// The real element type used for buffers of this precision.
    pub fn element_type(self) -> ElementType {
        match self {
            Precision::Single => ElementType::Single,
            Precision::Double => ElementType::Double,
        }
    }

    /// Select the precision from the `simulation.double_precision` flag.
    pub fn from_double_flag(double_precision: bool) -> Self {
        if double_precision {
            Precision::Double
        } else {
            Precision::Single
        }
    }
}

/// The element type tag of a [`Mem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ElementType {
    /// `f32`
    #[strum(serialize = "f32")]
    Single,
    /// `f64`
    #[strum(serialize = "f64")]
    Double,
    /// `Complex<f32>`
    #[strum(serialize = "c32")]
    ComplexSingle,
    /// `Complex<f64>`
    #[strum(serialize = "c64")]
    ComplexDouble,
}

/// Where a model's data lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum Location {
    /// Host memory
    #[default]
    Cpu,
    /// Device memory
    Gpu,
}

/// A host-resident numeric array tagged with its element type.
#[derive(Debug, Clone, PartialEq)]
pub enum Mem {
    /// Real, single precision
    Single(Vec<f32>),
    /// Real, double precision
    Double(Vec<f64>),
    /// Complex, single precision
    ComplexSingle(Vec<Complex<f32>>),
    /// Complex, double precision
    ComplexDouble(Vec<Complex<f64>>),
}

/// Grow or shrink `v` to `len`, reporting allocation failure rather than
/// aborting.
fn try_resize<T: Clone>(v: &mut Vec<T>, len: usize, fill: T) -> Result<(), NoiseError> {
    if len > v.len() {
        v.try_reserve_exact(len - v.len())
            .map_err(|_| NoiseError::MemoryAllocFailure {
                what: "numeric buffer".into(),
                len,
            })?;
    }
    v.resize(len, fill);
    Ok(())
}

impl Mem {
    /// Create a zero-filled buffer of the given element type and length.
    pub fn new(element_type: ElementType, len: usize) -> Self {
        match element_type {
            ElementType::Single => Mem::Single(vec![0.0; len]),
            ElementType::Double => Mem::Double(vec![0.0; len]),
            ElementType::ComplexSingle => Mem::ComplexSingle(vec![Complex::default(); len]),
            ElementType::ComplexDouble => Mem::ComplexDouble(vec![Complex::default(); len]),
        }
    }

    /// Create a zero-filled real buffer of the given precision and length.
    pub fn with_precision(precision: Precision, len: usize) -> Self {
        Self::new(precision.element_type(), len)
    }

    /// Create a real buffer of the given precision holding `values`.
    pub fn from_f64s(precision: Precision, values: &[f64]) -> Self {
        match precision {
            Precision::Single => Mem::Single(values.iter().map(|&v| v as f32).collect()),
            Precision::Double => Mem::Double(values.to_vec()),
        }
    }

    /// The element type of this buffer.
    pub fn element_type(&self) -> ElementType {
        match self {
            Mem::Single(_) => ElementType::Single,
            Mem::Double(_) => ElementType::Double,
            Mem::ComplexSingle(_) => ElementType::ComplexSingle,
            Mem::ComplexDouble(_) => ElementType::ComplexDouble,
        }
    }

    /// The precision of a real buffer. Complex buffers give `None`.
    pub fn precision(&self) -> Option<Precision> {
        match self {
            Mem::Single(_) => Some(Precision::Single),
            Mem::Double(_) => Some(Precision::Double),
            Mem::ComplexSingle(_) | Mem::ComplexDouble(_) => None,
        }
    }

    /// The number of elements in this buffer.
    pub fn len(&self) -> usize {
        match self {
            Mem::Single(v) => v.len(),
            Mem::Double(v) => v.len(),
            Mem::ComplexSingle(v) => v.len(),
            Mem::ComplexDouble(v) => v.len(),
        }
    }

    /// Whether this buffer has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resize the buffer to `len` elements, zero-filling any new elements.
    ///
    /// # Errors
    ///
    /// [`NoiseError::MemoryAllocFailure`] if the buffer can't grow.
    pub fn resize(&mut self, len: usize) -> Result<(), NoiseError> {
        match self {
            Mem::Single(v) => try_resize(v, len, 0.0),
            Mem::Double(v) => try_resize(v, len, 0.0),
            Mem::ComplexSingle(v) => try_resize(v, len, Complex::default()),
            Mem::ComplexDouble(v) => try_resize(v, len, Complex::default()),
        }
    }

    /// Copy the contents of `src` into this buffer, resizing as needed.
    ///
    /// # Errors
    ///
    /// [`NoiseError::TypeMismatch`] if the element types differ.
    pub fn copy_from(&mut self, src: &Mem) -> Result<(), NoiseError> {
        if self.element_type() != src.element_type() {
            return Err(NoiseError::TypeMismatch {
                argument: "src".into(),
                function: "Mem::copy_from".into(),
                expected: self.element_type(),
                received: src.element_type(),
            });
        }
        self.resize(src.len())?;
        match (self, src) {
            (Mem::Single(d), Mem::Single(s)) => d.copy_from_slice(s),
            (Mem::Double(d), Mem::Double(s)) => d.copy_from_slice(s),
            (Mem::ComplexSingle(d), Mem::ComplexSingle(s)) => d.copy_from_slice(s),
            (Mem::ComplexDouble(d), Mem::ComplexDouble(s)) => d.copy_from_slice(s),
            _ => unreachable!("element types checked above"),
        }
        Ok(())
    }

    /// A typed view of the buffer, if it holds elements of type `F`.
    pub fn as_slice<F: NoiseFloat>(&self) -> Option<&[F]> {
        F::slice(self)
    }

    /// A mutable typed view of the buffer, if it holds elements of type `F`.
    pub fn as_mut_slice<F: NoiseFloat>(&mut self) -> Option<&mut [F]> {
        F::vec_mut(self).map(|v| v.as_mut_slice())
    }

    /// The values of a real buffer, widened to `f64`. Complex buffers give
    /// `None`.
    pub fn to_f64_vec(&self) -> Option<Vec<f64>> {
        match self {
            Mem::Single(v) => Some(v.iter().map(|&x| f64::from(x)).collect()),
            Mem::Double(v) => Some(v.clone()),
            Mem::ComplexSingle(_) | Mem::ComplexDouble(_) => None,
        }
    }
}

/// The real float types a noise kernel can run on, bridging the runtime
/// element-type tag of a [`Mem`] to a compile-time type.
pub trait NoiseFloat: Float + FromPrimitive + ToPrimitive + Debug + Send + Sync + 'static {
    /// The tag of a [`Mem`] holding this type.
    const ELEMENT_TYPE: ElementType;

    /// Borrow the elements of `mem` if it holds this type.
    fn slice(mem: &Mem) -> Option<&[Self]>;

    /// Mutably borrow the storage of `mem` if it holds this type.
    fn vec_mut(mem: &mut Mem) -> Option<&mut Vec<Self>>;

    /// Convert from an `f64` setting or constant.
    fn from_f64_lossy(value: f64) -> Self;

    /// Widen to `f64` for mixing with double precision constants.
    fn widen(self) -> f64;
}

impl NoiseFloat for f32 {
    const ELEMENT_TYPE: ElementType = ElementType::Single;

    fn slice(mem: &Mem) -> Option<&[Self]> {
        match mem {
            Mem::Single(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    fn vec_mut(mem: &mut Mem) -> Option<&mut Vec<Self>> {
        match mem {
            Mem::Single(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    fn from_f64_lossy(value: f64) -> Self {
        value as f32
    }

    #[inline]
    fn widen(self) -> f64 {
        f64::from(self)
    }
}

impl NoiseFloat for f64 {
    const ELEMENT_TYPE: ElementType = ElementType::Double;

    fn slice(mem: &Mem) -> Option<&[Self]> {
        match mem {
            Mem::Double(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    fn vec_mut(mem: &mut Mem) -> Option<&mut Vec<Self>> {
        match mem {
            Mem::Double(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    fn from_f64_lossy(value: f64) -> Self {
        value
    }

    #[inline]
    fn widen(self) -> f64 {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zeroed() {
        let mem = Mem::new(ElementType::Single, 3);
        assert_eq!(mem, Mem::Single(vec![0.0; 3]));
        let mem = Mem::new(ElementType::ComplexDouble, 2);
        assert_eq!(mem.len(), 2);
        assert_eq!(mem.element_type(), ElementType::ComplexDouble);
    }

    #[test]
    fn test_resize_grows_and_shrinks() {
        let mut mem = Mem::Double(vec![1.0, 2.0]);
        mem.resize(4).unwrap();
        assert_eq!(mem, Mem::Double(vec![1.0, 2.0, 0.0, 0.0]));
        mem.resize(1).unwrap();
        assert_eq!(mem, Mem::Double(vec![1.0]));
    }

    #[test]
    fn test_copy_from() {
        let src = Mem::Single(vec![1.0, 2.0, 3.0]);
        let mut dst = Mem::with_precision(Precision::Single, 0);
        dst.copy_from(&src).unwrap();
        assert_eq!(dst, src);
    }

    #[test]
    fn test_copy_from_type_mismatch() {
        let src = Mem::Single(vec![1.0]);
        let mut dst = Mem::Double(vec![5.0]);
        assert!(matches!(
            dst.copy_from(&src),
            Err(NoiseError::TypeMismatch {
                expected: ElementType::Double,
                received: ElementType::Single,
                ..
            })
        ));
        assert_eq!(dst, Mem::Double(vec![5.0]));
    }

    #[test]
    fn test_typed_slices() {
        let mut mem = Mem::from_f64s(Precision::Single, &[0.5, 1.5]);
        assert_eq!(mem.as_slice::<f32>(), Some(&[0.5_f32, 1.5][..]));
        assert!(mem.as_slice::<f64>().is_none());
        mem.as_mut_slice::<f32>().unwrap()[0] = 2.0;
        assert_eq!(mem.to_f64_vec(), Some(vec![2.0, 1.5]));
        assert!(Mem::new(ElementType::ComplexSingle, 1).to_f64_vec().is_none());
    }

    #[test]
    fn test_precision_from_str() {
        use std::str::FromStr;
        assert_eq!(Precision::from_str("single").unwrap(), Precision::Single);
        assert_eq!(Precision::from_double_flag(true), Precision::Double);
        assert_eq!(Precision::Double.element_type(), ElementType::Double);
        assert_eq!(Mem::Single(vec![]).precision(), Some(Precision::Single));
        assert_eq!(Mem::ComplexDouble(vec![]).precision(), None);
    }
}
