//! Array backed priority queue used to build the Huffman tree.
//! Elements are (key,handle) pairs, the handle is usually an index into a node arena.
//! Ties between equal keys are resolved however the sift operations leave them,
//! the decoder gets the same order by inserting the same keys in the same order.
use num_traits::PrimInt;

pub struct MinHeap<K: PrimInt> {
    slots: Vec<(K,usize)>,
    capacity: usize
}

impl <K: PrimInt> MinHeap<K> {
    pub fn create(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            capacity
        }
    }
    pub fn len(&self) -> usize {
        self.slots.len()
    }
    /// Append and percolate up while strictly smaller than the parent.
    /// Panics if the heap already holds `capacity` elements.
    pub fn insert(&mut self,key: K,handle: usize) {
        assert!(self.slots.len() < self.capacity,"heap capacity exceeded");
        let mut i = self.slots.len();
        self.slots.push((key,handle));
        while i > 0 {
            let parent = (i - 1) / 2;
            if self.slots[i].0 >= self.slots[parent].0 {
                break;
            }
            self.slots.swap(i,parent);
            i = parent;
        }
    }
    /// Remove the root, the last element takes its place and percolates down.
    /// Returns `None` if the heap is empty.
    pub fn extract_min(&mut self) -> Option<(K,usize)> {
        if self.slots.is_empty() {
            return None;
        }
        let ans = self.slots.swap_remove(0);
        self.sift_down(0);
        Some(ans)
    }
    fn sift_down(&mut self,mut i: usize) {
        let n = self.slots.len();
        loop {
            let left = 2*i + 1;
            let right = 2*i + 2;
            let mut smallest = i;
            if left < n && self.slots[left].0 < self.slots[smallest].0 {
                smallest = left;
            }
            if right < n && self.slots[right].0 < self.slots[smallest].0 {
                smallest = right;
            }
            if smallest == i {
                break;
            }
            self.slots.swap(i,smallest);
            i = smallest;
        }
    }
}

#[test]
fn extracts_in_order() {
    let mut heap: MinHeap<u64> = MinHeap::create(256);
    for (handle,key) in [5,3,9,1,7,3,2].iter().enumerate() {
        heap.insert(*key,handle);
    }
    assert_eq!(heap.len(),7);
    let mut keys = Vec::new();
    while let Some((key,_handle)) = heap.extract_min() {
        keys.push(key);
    }
    assert_eq!(keys,vec![1,2,3,3,5,7,9]);
    assert_eq!(heap.len(),0);
}

#[test]
fn handles_follow_keys() {
    let mut heap: MinHeap<u32> = MinHeap::create(4);
    heap.insert(2,10);
    heap.insert(1,11);
    assert_eq!(heap.extract_min(),Some((1,11)));
    assert_eq!(heap.extract_min(),Some((2,10)));
    assert_eq!(heap.extract_min(),None);
}

#[test]
fn equal_keys_keep_insertion_order_on_insert() {
    // a new element only moves up past a strictly larger parent
    let mut heap: MinHeap<u32> = MinHeap::create(4);
    heap.insert(1,0);
    heap.insert(1,1);
    assert_eq!(heap.extract_min(),Some((1,0)));
    assert_eq!(heap.extract_min(),Some((1,1)));
}

#[test]
#[should_panic(expected = "heap capacity exceeded")]
fn capacity_is_fixed() {
    let mut heap: MinHeap<u32> = MinHeap::create(2);
    heap.insert(3,0);
    heap.insert(2,1);
    heap.insert(1,2);
}
