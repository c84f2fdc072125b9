use std::cmp::Ordering;

use sortexec_error::{DbError, Result};

use super::bitmap::Bitmap;
use super::datatype::DataType;
use super::scalar::ScalarValue;

/// Physical storage for an array.
///
/// Slots for null values hold the type's default value.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    Boolean(Vec<bool>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Float64(Vec<f64>),
    Utf8(Vec<String>),
}

/// Apply the same expression to the inner vec of every variant.
macro_rules! with_data {
    ($data:expr, $v:ident => $body:expr) => {
        match $data {
            ArrayData::Boolean($v) => $body,
            ArrayData::Int32($v) => $body,
            ArrayData::Int64($v) => $body,
            ArrayData::Float64($v) => $body,
            ArrayData::Utf8($v) => $body,
        }
    };
}

impl ArrayData {
    fn with_capacity(datatype: DataType, capacity: usize) -> Self {
        match datatype {
            DataType::Boolean => ArrayData::Boolean(Vec::with_capacity(capacity)),
            DataType::Int32 => ArrayData::Int32(Vec::with_capacity(capacity)),
            DataType::Int64 => ArrayData::Int64(Vec::with_capacity(capacity)),
            DataType::Float64 => ArrayData::Float64(Vec::with_capacity(capacity)),
            DataType::Utf8 => ArrayData::Utf8(Vec::with_capacity(capacity)),
        }
    }

    fn len(&self) -> usize {
        with_data!(self, v => v.len())
    }

    fn push_default(&mut self) {
        with_data!(self, v => v.push(Default::default()))
    }
}

/// A column of values with an optional validity mask.
#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    pub(crate) datatype: DataType,
    /// Validity mask, None if all values are valid.
    pub(crate) validity: Option<Bitmap>,
    pub(crate) data: ArrayData,
}

impl Array {
    pub fn new_empty(datatype: DataType) -> Self {
        Self::with_capacity(datatype, 0)
    }

    pub fn with_capacity(datatype: DataType, capacity: usize) -> Self {
        Array {
            datatype,
            validity: None,
            data: ArrayData::with_capacity(datatype, capacity),
        }
    }

    /// Create an array where every value is null.
    pub fn new_null(datatype: DataType, len: usize) -> Self {
        let mut data = ArrayData::with_capacity(datatype, len);
        for _ in 0..len {
            data.push_default();
        }
        Array {
            datatype,
            validity: Some(Bitmap::new_with_all_false(len)),
            data,
        }
    }

    /// Create an array by repeating a scalar value `len` times.
    pub fn new_repeated(datatype: DataType, value: &ScalarValue, len: usize) -> Result<Self> {
        if value.is_null() {
            return Ok(Self::new_null(datatype, len));
        }

        let mut array = Self::with_capacity(datatype, len);
        for _ in 0..len {
            array.push_value(value)?;
        }
        Ok(array)
    }

    pub fn datatype(&self) -> DataType {
        self.datatype
    }

    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn is_valid(&self, idx: usize) -> bool {
        match &self.validity {
            Some(validity) => validity.value(idx),
            None => true,
        }
    }

    pub fn get_value(&self, idx: usize) -> Result<ScalarValue> {
        if idx >= self.len() {
            return Err(DbError::new("Row index out of bounds")
                .with_field("idx", idx)
                .with_field("len", self.len()));
        }
        if !self.is_valid(idx) {
            return Ok(ScalarValue::Null);
        }

        Ok(match &self.data {
            ArrayData::Boolean(v) => ScalarValue::Boolean(v[idx]),
            ArrayData::Int32(v) => ScalarValue::Int32(v[idx]),
            ArrayData::Int64(v) => ScalarValue::Int64(v[idx]),
            ArrayData::Float64(v) => ScalarValue::Float64(v[idx]),
            ArrayData::Utf8(v) => ScalarValue::Utf8(v[idx].clone()),
        })
    }

    pub fn push_null(&mut self) {
        let len = self.len();
        self.data.push_default();
        self.validity
            .get_or_insert_with(|| Bitmap::new_with_all_true(len))
            .push(false);
    }

    /// Push a single value onto the end of the array.
    pub fn push_value(&mut self, value: &ScalarValue) -> Result<()> {
        if value.is_null() {
            self.push_null();
            return Ok(());
        }

        match (&mut self.data, value) {
            (ArrayData::Boolean(v), ScalarValue::Boolean(val)) => v.push(*val),
            (ArrayData::Int32(v), ScalarValue::Int32(val)) => v.push(*val),
            (ArrayData::Int64(v), ScalarValue::Int64(val)) => v.push(*val),
            (ArrayData::Float64(v), ScalarValue::Float64(val)) => v.push(*val),
            (ArrayData::Utf8(v), ScalarValue::Utf8(val)) => v.push(val.clone()),
            (_, other) => {
                return Err(DbError::new("Unexpected value for array")
                    .with_field("value", other)
                    .with_field("datatype", self.datatype));
            }
        }
        if let Some(validity) = &mut self.validity {
            validity.push(true);
        }
        Ok(())
    }

    /// Append a single row from `src` to the end of this array.
    #[inline]
    pub fn insert_from(&mut self, src: &Array, row: usize) -> Result<()> {
        if !src.is_valid(row) {
            self.push_null();
            return Ok(());
        }

        match (&mut self.data, &src.data) {
            (ArrayData::Boolean(dst), ArrayData::Boolean(src)) => dst.push(src[row]),
            (ArrayData::Int32(dst), ArrayData::Int32(src)) => dst.push(src[row]),
            (ArrayData::Int64(dst), ArrayData::Int64(src)) => dst.push(src[row]),
            (ArrayData::Float64(dst), ArrayData::Float64(src)) => dst.push(src[row]),
            (ArrayData::Utf8(dst), ArrayData::Utf8(src)) => dst.push(src[row].clone()),
            _ => return Err(type_mismatch(self.datatype, src.datatype)),
        }
        if let Some(validity) = &mut self.validity {
            validity.push(true);
        }
        Ok(())
    }

    /// Append all rows from `other` to this array.
    pub fn append(&mut self, other: &Array) -> Result<()> {
        let start = self.len();
        match (&mut self.data, &other.data) {
            (ArrayData::Boolean(dst), ArrayData::Boolean(src)) => dst.extend_from_slice(src),
            (ArrayData::Int32(dst), ArrayData::Int32(src)) => dst.extend_from_slice(src),
            (ArrayData::Int64(dst), ArrayData::Int64(src)) => dst.extend_from_slice(src),
            (ArrayData::Float64(dst), ArrayData::Float64(src)) => dst.extend_from_slice(src),
            (ArrayData::Utf8(dst), ArrayData::Utf8(src)) => dst.extend_from_slice(src),
            _ => return Err(type_mismatch(self.datatype, other.datatype)),
        }

        match (&mut self.validity, &other.validity) {
            (None, None) => (),
            (Some(validity), None) => {
                for _ in 0..other.len() {
                    validity.push(true);
                }
            }
            (validity, Some(other_validity)) => {
                let validity = validity.get_or_insert_with(|| Bitmap::new_with_all_true(start));
                for valid in other_validity.iter() {
                    validity.push(valid);
                }
            }
        }

        Ok(())
    }

    /// Create an empty array with the same type as this one.
    pub fn clone_empty(&self) -> Array {
        Array::new_empty(self.datatype)
    }

    /// Remove all values, keeping allocated capacity.
    pub fn clear(&mut self) {
        with_data!(&mut self.data, v => v.clear());
        self.validity = None;
    }

    /// Produce a new array containing the rows at `indices`, in order.
    pub fn take(&self, indices: &[usize]) -> Array {
        fn take_vec<T: Clone>(v: &[T], indices: &[usize]) -> Vec<T> {
            indices.iter().map(|&idx| v[idx].clone()).collect()
        }

        let data = match &self.data {
            ArrayData::Boolean(v) => ArrayData::Boolean(take_vec(v, indices)),
            ArrayData::Int32(v) => ArrayData::Int32(take_vec(v, indices)),
            ArrayData::Int64(v) => ArrayData::Int64(take_vec(v, indices)),
            ArrayData::Float64(v) => ArrayData::Float64(take_vec(v, indices)),
            ArrayData::Utf8(v) => ArrayData::Utf8(take_vec(v, indices)),
        };

        let validity = self
            .validity
            .as_ref()
            .map(|validity| indices.iter().map(|&idx| validity.value(idx)).collect());

        Array {
            datatype: self.datatype,
            validity,
            data,
        }
    }

    /// Remove the first `n` rows.
    pub fn skip_front(&mut self, n: usize) {
        let n = usize::min(n, self.len());
        if n == 0 {
            return;
        }
        with_data!(&mut self.data, v => {
            v.drain(..n);
        });
        if let Some(validity) = &self.validity {
            self.validity = Some(validity.iter().skip(n).collect());
        }
    }

    pub fn truncate(&mut self, len: usize) {
        with_data!(&mut self.data, v => v.truncate(len));
        if let Some(validity) = &mut self.validity {
            validity.truncate(len);
        }
    }

    /// Compare the value at `row` with the value at `other_row` in `other`.
    ///
    /// `nulls_direction` is the result of comparing a null (or NaN) against a
    /// non-null value: 1 places nulls after everything else, -1 before. Both
    /// arrays must have the same data type.
    #[inline]
    pub fn compare_at(
        &self,
        row: usize,
        other: &Array,
        other_row: usize,
        nulls_direction: i8,
    ) -> Ordering {
        let null_ord = if nulls_direction > 0 {
            Ordering::Greater
        } else {
            Ordering::Less
        };

        match (self.is_valid(row), other.is_valid(other_row)) {
            (true, true) => (),
            (false, false) => return Ordering::Equal,
            (false, true) => return null_ord,
            (true, false) => return null_ord.reverse(),
        }

        match (&self.data, &other.data) {
            (ArrayData::Boolean(l), ArrayData::Boolean(r)) => l[row].cmp(&r[other_row]),
            (ArrayData::Int32(l), ArrayData::Int32(r)) => l[row].cmp(&r[other_row]),
            (ArrayData::Int64(l), ArrayData::Int64(r)) => l[row].cmp(&r[other_row]),
            (ArrayData::Utf8(l), ArrayData::Utf8(r)) => l[row].cmp(&r[other_row]),
            (ArrayData::Float64(l), ArrayData::Float64(r)) => {
                let (l, r) = (l[row], r[other_row]);
                match (l.is_nan(), r.is_nan()) {
                    (false, false) => l.partial_cmp(&r).unwrap_or(Ordering::Equal),
                    (true, true) => Ordering::Equal,
                    (true, false) => null_ord,
                    (false, true) => null_ord.reverse(),
                }
            }
            _ => panic!(
                "attempted to compare arrays of different types: {} and {}",
                self.datatype, other.datatype
            ),
        }
    }
}

fn type_mismatch(dst: DataType, src: DataType) -> DbError {
    DbError::new("Array data types do not match")
        .with_field("dst", dst)
        .with_field("src", src)
}

macro_rules! impl_from_iter {
    ($native:ty, $variant:ident, $conv:expr) => {
        impl FromIterator<$native> for Array {
            fn from_iter<T: IntoIterator<Item = $native>>(iter: T) -> Self {
                let conv = $conv;
                let data: Vec<_> = iter.into_iter().map(conv).collect();
                Array {
                    datatype: DataType::$variant,
                    validity: None,
                    data: ArrayData::$variant(data),
                }
            }
        }

        impl FromIterator<Option<$native>> for Array {
            fn from_iter<T: IntoIterator<Item = Option<$native>>>(iter: T) -> Self {
                let conv = $conv;
                let mut array = Array::new_empty(DataType::$variant);
                for v in iter {
                    match v {
                        Some(v) => {
                            if let ArrayData::$variant(data) = &mut array.data {
                                data.push(conv(v));
                            }
                            if let Some(validity) = &mut array.validity {
                                validity.push(true);
                            }
                        }
                        None => array.push_null(),
                    }
                }
                array
            }
        }
    };
}

impl_from_iter!(bool, Boolean, |v| v);
impl_from_iter!(i32, Int32, |v| v);
impl_from_iter!(i64, Int64, |v| v);
impl_from_iter!(f64, Float64, |v| v);
impl_from_iter!(String, Utf8, |v| v);

impl<'a> FromIterator<&'a str> for Array {
    fn from_iter<T: IntoIterator<Item = &'a str>>(iter: T) -> Self {
        iter.into_iter().map(|s| s.to_string()).collect()
    }
}

impl<'a> FromIterator<Option<&'a str>> for Array {
    fn from_iter<T: IntoIterator<Item = Option<&'a str>>>(iter: T) -> Self {
        iter.into_iter().map(|s| s.map(|s| s.to_string())).collect()
    }
}
