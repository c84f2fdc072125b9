use std::cmp::Ordering;

/// Binary min-heap of indices.
///
/// The heap never looks at the data the indices refer to. Every operation
/// that reorders the heap takes the comparison function as an argument, which
/// lets the owner of the data (cursors, batches) lend it out only for the
/// duration of the call.
///
/// The comparison must be a total order that's consistent across calls, and
/// should break ties (e.g. on the index itself) to keep output deterministic.
#[derive(Debug, Default, Clone)]
pub struct IndexHeap {
    heap: Vec<usize>,
}

impl IndexHeap {
    pub fn with_capacity(capacity: usize) -> Self {
        IndexHeap {
            heap: Vec::with_capacity(capacity),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Index at the top of the heap.
    pub fn peek(&self) -> Option<usize> {
        self.heap.first().copied()
    }

    pub fn push<F>(&mut self, idx: usize, cmp: F)
    where
        F: Fn(usize, usize) -> Ordering,
    {
        self.heap.push(idx);
        self.sift_up(self.heap.len() - 1, &cmp);
    }

    pub fn pop<F>(&mut self, cmp: F) -> Option<usize>
    where
        F: Fn(usize, usize) -> Ordering,
    {
        if self.heap.is_empty() {
            return None;
        }

        let top = self.heap.swap_remove(0);
        if !self.heap.is_empty() {
            self.sift_down(0, &cmp);
        }

        Some(top)
    }

    /// Restore heap order after the element at the top changed.
    ///
    /// Cheaper than a pop followed by a push when the top element is still
    /// live.
    pub fn update_top<F>(&mut self, cmp: F)
    where
        F: Fn(usize, usize) -> Ordering,
    {
        if !self.heap.is_empty() {
            self.sift_down(0, &cmp);
        }
    }

    fn sift_up<F>(&mut self, mut pos: usize, cmp: &F)
    where
        F: Fn(usize, usize) -> Ordering,
    {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if cmp(self.heap[pos], self.heap[parent]) != Ordering::Less {
                break;
            }
            self.heap.swap(pos, parent);
            pos = parent;
        }
    }

    fn sift_down<F>(&mut self, mut pos: usize, cmp: &F)
    where
        F: Fn(usize, usize) -> Ordering,
    {
        let len = self.heap.len();
        loop {
            let left = 2 * pos + 1;
            let right = left + 1;
            let mut smallest = pos;

            if left < len && cmp(self.heap[left], self.heap[smallest]) == Ordering::Less {
                smallest = left;
            }
            if right < len && cmp(self.heap[right], self.heap[smallest]) == Ordering::Less {
                smallest = right;
            }
            if smallest == pos {
                break;
            }

            self.heap.swap(pos, smallest);
            pos = smallest;
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::seq::SliceRandom;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn pops_in_order() {
        let values = [5, 3, 9, 1, 1, 7];
        let cmp = |a: usize, b: usize| values[a].cmp(&values[b]).then(a.cmp(&b));

        let mut heap = IndexHeap::default();
        for idx in 0..values.len() {
            heap.push(idx, cmp);
        }

        let mut out = Vec::new();
        while let Some(idx) = heap.pop(cmp) {
            out.push(idx);
        }

        // Ties broken by index.
        assert_eq!(vec![3, 4, 1, 0, 5, 2], out);
    }

    #[test]
    fn max_heap_with_reversed_cmp() {
        let values = [2, 8, 4];
        let mut heap = IndexHeap::default();
        for idx in 0..values.len() {
            heap.push(idx, |a, b| values[b].cmp(&values[a]));
        }
        assert_eq!(Some(1), heap.peek());
    }

    #[test]
    fn update_top_after_mutation() {
        let mut values = vec![1, 5, 3];
        let mut heap = IndexHeap::default();
        for idx in 0..values.len() {
            heap.push(idx, |a, b| values[a].cmp(&values[b]));
        }
        assert_eq!(Some(0), heap.peek());

        values[0] = 10;
        heap.update_top(|a, b| values[a].cmp(&values[b]));
        assert_eq!(Some(2), heap.peek());
    }

    #[test]
    fn random_matches_sort() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut values: Vec<i64> = (0..500).map(|v| v % 37).collect();
        values.shuffle(&mut rng);

        let cmp = |a: usize, b: usize| values[a].cmp(&values[b]).then(a.cmp(&b));
        let mut heap = IndexHeap::with_capacity(values.len());
        for idx in 0..values.len() {
            heap.push(idx, cmp);
        }

        let mut expected: Vec<usize> = (0..values.len()).collect();
        expected.sort_by(|&a, &b| cmp(a, b));

        let mut got = Vec::new();
        while let Some(idx) = heap.pop(cmp) {
            got.push(idx);
        }

        assert_eq!(expected, got);
    }
}
