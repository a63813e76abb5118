use std::cell::{Cell, RefCell};

use super::arena::{self, SourceId};
use super::astnode::AstGroups;
use super::{Datum, DatumP};

struct Pair {
    head: DatumP,
    tail: DatumP,
}

/// Persistent singly-linked list.
///
/// Each list value is one cell; `butfirst` returns the tail handle without
/// copying. A list also carries the parse attached to it by the parser and
/// the time that parse was made, which the compilation cache compares with
/// the last procedure definition.
pub struct List {
    id: SourceId,
    pair: RefCell<Option<Pair>>,
    stamp: Cell<u64>,
    ast: RefCell<Option<AstGroups>>,
}

impl List {
    fn cell(pair: Option<Pair>) -> DatumP {
        DatumP::new(Datum::List(List {
            id: arena::next_source_id(),
            pair: RefCell::new(pair),
            stamp: Cell::new(0),
            ast: RefCell::new(None),
        }))
    }

    pub fn empty() -> DatumP {
        List::cell(None)
    }

    pub fn cons(head: DatumP, tail: DatumP) -> DatumP {
        debug_assert!(tail.as_list().is_some());
        List::cell(Some(Pair { head, tail }))
    }

    pub fn from_vec(items: Vec<DatumP>) -> DatumP {
        items
            .into_iter()
            .rev()
            .fold(List::empty(), |tail, head| List::cons(head, tail))
    }

    pub fn id(&self) -> SourceId {
        self.id
    }

    pub fn is_empty(&self) -> bool {
        self.pair.borrow().is_none()
    }

    pub fn first(&self) -> Option<DatumP> {
        self.pair.borrow().as_ref().map(|p| p.head.clone())
    }

    /// Tail of the list, shared with this one.
    pub fn butfirst(&self) -> Option<DatumP> {
        self.pair.borrow().as_ref().map(|p| p.tail.clone())
    }

    pub fn last(&self) -> Option<DatumP> {
        self.iter().last()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn iter(&self) -> ListIter {
        ListIter {
            next: self.pair.borrow().as_ref().map(|p| (p.head.clone(), p.tail.clone())),
        }
    }

    pub fn to_vec(&self) -> Vec<DatumP> {
        self.iter().collect()
    }

    /// 1-based element access.
    pub fn item(&self, index: usize) -> Option<DatumP> {
        if index == 0 {
            return None;
        }
        self.iter().nth(index - 1)
    }

    /// Replace the head in place. Can create cycles.
    pub fn set_first(&self, value: DatumP) -> bool {
        match self.pair.borrow_mut().as_mut() {
            Some(pair) => {
                pair.head = value;
                true
            }
            None => false,
        }
    }

    /// Replace the tail in place. Can create cycles.
    pub fn set_butfirst(&self, tail: DatumP) -> bool {
        if tail.as_list().is_none() {
            return false;
        }
        match self.pair.borrow_mut().as_mut() {
            Some(pair) => {
                pair.tail = tail;
                true
            }
            None => false,
        }
    }

    /// Replace the element at a 1-based index. Can create cycles.
    pub fn set_item(&self, index: usize, value: DatumP) -> bool {
        if index == 0 {
            return false;
        }
        if index == 1 {
            return self.set_first(value);
        }
        match self.butfirst() {
            Some(tail) => match tail.as_list() {
                Some(rest) => rest.set_item(index - 1, value),
                None => false,
            },
            None => false,
        }
    }

    /// Time the attached parse was made; 0 if never parsed.
    pub fn stamp(&self) -> u64 {
        self.stamp.get()
    }

    pub fn restamp(&self) {
        self.stamp.set(arena::tick());
    }

    pub fn ast(&self) -> Option<AstGroups> {
        self.ast.borrow().clone()
    }

    /// Attach a parse of this list, stamped with the current time.
    pub fn attach_ast(&self, groups: AstGroups) {
        *self.ast.borrow_mut() = Some(groups);
        self.restamp();
    }
}

/// Iterator over the elements of a [`List`].
pub struct ListIter {
    next: Option<(DatumP, DatumP)>,
}

impl Iterator for ListIter {
    type Item = DatumP;

    fn next(&mut self) -> Option<DatumP> {
        let (head, tail) = self.next.take()?;
        self.next = tail.as_list().and_then(|l| {
            l.pair
                .borrow()
                .as_ref()
                .map(|p| (p.head.clone(), p.tail.clone()))
        });
        Some(head)
    }
}
