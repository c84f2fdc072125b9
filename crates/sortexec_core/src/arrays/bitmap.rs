/// Packed bitmap used for array validity.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Bitmap {
    len: usize,
    data: Vec<u8>,
}

impl Bitmap {
    pub fn new_with_all_true(len: usize) -> Self {
        let mut bitmap = Bitmap {
            len,
            data: vec![u8::MAX; len.div_ceil(8)],
        };
        bitmap.clear_trailing_bits();
        bitmap
    }

    pub fn new_with_all_false(len: usize) -> Self {
        Bitmap {
            len,
            data: vec![0; len.div_ceil(8)],
        }
    }

    /// Get the value at some index.
    ///
    /// Panics if out of bounds.
    #[inline]
    pub fn value(&self, idx: usize) -> bool {
        assert!(idx < self.len, "index {idx} out of bounds for bitmap of len {}", self.len);
        self.data[idx >> 3] & (1 << (idx & 7)) != 0
    }

    #[inline]
    pub fn set(&mut self, idx: usize, val: bool) {
        assert!(idx < self.len, "index {idx} out of bounds for bitmap of len {}", self.len);
        if val {
            self.data[idx >> 3] |= 1 << (idx & 7);
        } else {
            self.data[idx >> 3] &= !(1 << (idx & 7));
        }
    }

    pub fn push(&mut self, val: bool) {
        if self.len % 8 == 0 {
            self.data.push(0);
        }
        self.len += 1;
        self.set(self.len - 1, val);
    }

    /// Truncate to `len` bits, no-op if already shorter.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        self.len = len;
        self.data.truncate(len.div_ceil(8));
        self.clear_trailing_bits();
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = bool> + '_ {
        (0..self.len).map(|idx| self.value(idx))
    }

    fn clear_trailing_bits(&mut self) {
        let rem = self.len % 8;
        if rem != 0 {
            if let Some(last) = self.data.last_mut() {
                *last &= (1 << rem) - 1;
            }
        }
    }
}

impl FromIterator<bool> for Bitmap {
    fn from_iter<T: IntoIterator<Item = bool>>(iter: T) -> Self {
        let mut bitmap = Bitmap::default();
        for v in iter {
            bitmap.push(v);
        }
        bitmap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_get() {
        let bitmap = Bitmap::from_iter([true, false, true, true, false, false, true, true, false]);
        let vals: Vec<_> = bitmap.iter().collect();
        assert_eq!(
            vec![true, false, true, true, false, false, true, true, false],
            vals
        );
        assert!(bitmap.value(7));
        assert!(!bitmap.value(8));
    }

    #[test]
    fn all_true_trailing_bits() {
        let bitmap = Bitmap::new_with_all_true(10);
        assert_eq!(vec![true; 10], bitmap.iter().collect::<Vec<_>>());
        assert_eq!(Bitmap::from_iter([true; 10]), bitmap);
    }

    #[test]
    fn truncate_clears_bits() {
        let mut bitmap = Bitmap::new_with_all_true(12);
        bitmap.truncate(3);
        assert_eq!(Bitmap::from_iter([true; 3]), bitmap);
        bitmap.push(false);
        assert_eq!(vec![true, true, true, false], bitmap.iter().collect::<Vec<_>>());
    }
}
