//! Call frames
//!
//! Variables are dynamically scoped: a read searches from the innermost
//! frame outwards, ending at the global frame. Each frame also keeps the
//! TEST state of its procedure and the line it is running, for error
//! reports.

use rustc_hash::FxHashMap;

use crate::value::DatumP;

pub struct Frame {
    /// Procedure datum, `None` for the global frame
    pub procedure: Option<DatumP>,
    /// Call node that created the frame
    pub node: Option<DatumP>,
    pub locals: FxHashMap<String, DatumP>,
    /// Result of the last TEST, `None` until one runs
    pub test: Option<bool>,
    /// Instruction list being run
    pub line: Option<DatumP>,
}

impl Frame {
    fn new(procedure: Option<DatumP>, node: Option<DatumP>) -> Self {
        Frame {
            procedure,
            node,
            locals: FxHashMap::default(),
            test: None,
            line: None,
        }
    }
}

pub struct FrameStack {
    frames: Vec<Frame>,
}

impl FrameStack {
    pub fn new() -> Self {
        FrameStack {
            frames: vec![Frame::new(None, None)],
        }
    }

    pub fn push(&mut self, procedure: DatumP, node: DatumP) {
        self.frames.push(Frame::new(Some(procedure), Some(node)));
    }

    /// Pop a procedure frame. The global frame stays.
    pub fn pop(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Number of procedure frames.
    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    pub fn top(&self) -> &Frame {
        &self.frames[self.frames.len() - 1]
    }

    pub fn top_mut(&mut self) -> &mut Frame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    pub fn global(&self) -> &Frame {
        &self.frames[0]
    }

    pub fn global_mut(&mut self) -> &mut Frame {
        &mut self.frames[0]
    }

    /// Look up `key` (uppercase), innermost frame first.
    pub fn get(&self, key: &str) -> Option<DatumP> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.locals.get(key).cloned())
    }

    /// Assign to the innermost binding of `key`, or create a global.
    pub fn set(&mut self, key: &str, value: DatumP) {
        for frame in self.frames.iter_mut().rev() {
            if let Some(slot) = frame.locals.get_mut(key) {
                *slot = value;
                return;
            }
        }
        self.global_mut().locals.insert(key.to_string(), value);
    }

    /// Bind `key` in the innermost frame.
    pub fn bind_local(&mut self, key: &str, value: DatumP) {
        self.top_mut().locals.insert(key.to_string(), value);
    }
}

impl Default for FrameStack {
    fn default() -> Self {
        Self::new()
    }
}
