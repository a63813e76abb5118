use std::cell::RefCell;

use super::DatumP;

/// Fixed-size, origin-offset vector. Slots are replaced in place.
pub struct Array {
    origin: i32,
    items: RefCell<Vec<DatumP>>,
}

impl Array {
    pub fn new(origin: i32, items: Vec<DatumP>) -> Self {
        Array {
            origin,
            items: RefCell::new(items),
        }
    }

    pub fn origin(&self) -> i32 {
        self.origin
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    fn slot(&self, index: i64) -> Option<usize> {
        let offset = index - self.origin as i64;
        if offset < 0 || offset as usize >= self.len() {
            None
        } else {
            Some(offset as usize)
        }
    }

    /// Element at an origin-relative index.
    pub fn get(&self, index: i64) -> Option<DatumP> {
        let slot = self.slot(index)?;
        self.items.borrow().get(slot).cloned()
    }

    /// Replace the element at an origin-relative index.
    pub fn set(&self, index: i64, value: DatumP) -> bool {
        match self.slot(index) {
            Some(slot) => {
                self.items.borrow_mut()[slot] = value;
                true
            }
            None => false,
        }
    }

    pub fn to_vec(&self) -> Vec<DatumP> {
        self.items.borrow().clone()
    }
}
