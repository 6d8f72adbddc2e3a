use crate::runtime::value::ValueRef;
use std::collections::HashMap;

type Scope = HashMap<String, ValueRef>;

/// The scopes of one active function call, innermost block last.
#[derive(Clone, Debug, Default)]
struct Frame {
    scopes: Vec<Scope>,
}

impl Frame {
    fn new() -> Self {
        Self {
            scopes: vec![Scope::new()],
        }
    }
}

/// Live variable bindings: one frame per active call, one scope per active block.
///
/// Cloning copies the frame and scope containers but shares the value cells.
#[derive(Clone, Debug, Default)]
pub struct Environment {
    frames: Vec<Frame>,
}

impl Environment {
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    pub fn push_func(&mut self) {
        self.frames.push(Frame::new());
    }

    pub fn pop_func(&mut self) {
        self.frames.pop();
    }

    pub fn push_block(&mut self) {
        if let Some(frame) = self.frames.last_mut() {
            frame.scopes.push(Scope::new());
        }
    }

    pub fn pop_block(&mut self) {
        if let Some(frame) = self.frames.last_mut() {
            frame.scopes.pop();
        }
    }

    /// Binds `name` in the innermost scope. Returns `false` if that scope already has it.
    pub fn create(&mut self, name: &str, value: ValueRef) -> bool {
        let Some(scope) = self
            .frames
            .last_mut()
            .and_then(|frame| frame.scopes.last_mut())
        else {
            return false;
        };
        if scope.contains_key(name) {
            return false;
        }
        scope.insert(name.to_string(), value);
        true
    }

    /// Rebinds the nearest visible `name` in the current frame. Returns `false` if unbound.
    pub fn set(&mut self, name: &str, value: ValueRef) -> bool {
        let Some(frame) = self.frames.last_mut() else {
            return false;
        };
        for scope in frame.scopes.iter_mut().rev() {
            if let Some(slot) = scope.get_mut(name) {
                *slot = value;
                return true;
            }
        }
        false
    }

    pub fn get(&self, name: &str) -> Option<ValueRef> {
        let frame = self.frames.last()?;
        frame
            .scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).cloned())
    }

    /// Captures the current frame for later evaluation of a deferred expression.
    ///
    /// Names only ever resolve against the innermost frame, so outer frames are not copied.
    pub fn snapshot(&self) -> Environment {
        Environment {
            frames: self.frames.last().cloned().into_iter().collect(),
        }
    }

    pub fn frame_depth(&self) -> usize {
        self.frames.len()
    }

    pub fn scope_depth(&self) -> usize {
        self.frames.last().map_or(0, |frame| frame.scopes.len())
    }
}
