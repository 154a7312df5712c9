//! Execution contexts and the scope arena
//!
//! A [`Context`] is one call frame: it names the frame for tracebacks, links
//! to the caller and points at the scope frame its bindings live in. Scope
//! frames are stored in [`Scopes`], an arena addressed by [`ScopeId`], each
//! frame linking to its lexical parent.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use log::trace;

use super::value::Value;
use crate::error::Position;

/// Index of a frame in the scope arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

impl ScopeId {
    /// The global frame every arena starts with
    pub const GLOBAL: ScopeId = ScopeId(0);
}

/// One call or program frame
#[derive(Debug)]
pub struct Context {
    pub display_name: String,
    /// Calling context, for tracebacks
    pub parent: Option<Rc<Context>>,
    /// Where this frame was entered from, in the parent
    pub parent_entry: Option<Position>,
    pub scope: ScopeId,
}

impl Context {
    /// The root `<program>` context
    pub fn root(scope: ScopeId) -> Self {
        Self {
            display_name: "<program>".to_string(),
            parent: None,
            parent_entry: None,
            scope,
        }
    }

    /// A call frame entered from `parent` at `entry`
    pub fn call(
        display_name: impl Into<String>,
        parent: &Rc<Context>,
        entry: Position,
        scope: ScopeId,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            parent: Some(Rc::clone(parent)),
            parent_entry: Some(entry),
            scope,
        }
    }
}

/// Keeps a scope frame alive after its call returns.
///
/// Every function value holds the handle of the frame it was defined in;
/// a returned frame is freed once no handle to it remains outside the
/// frames that are themselves unreachable.
#[derive(Debug, Clone)]
pub struct ScopeHandle {
    id: ScopeId,
    anchor: Rc<()>,
}

impl ScopeHandle {
    pub fn id(&self) -> ScopeId {
        self.id
    }
}

#[derive(Debug, Default)]
struct Frame {
    symbols: HashMap<String, Value>,
    parent: Option<ScopeId>,
    /// Cloned into every [`ScopeHandle`] of this frame
    anchor: Rc<()>,
    /// Live frames whose parent is this one
    children: usize,
    /// The call that owns the frame has returned
    returned: bool,
}

impl Frame {
    fn handles_outstanding(&self) -> usize {
        Rc::strong_count(&self.anchor) - 1
    }
}

/// Arena of scope frames
#[derive(Debug)]
pub struct Scopes {
    frames: Vec<Option<Frame>>,
    free: Vec<usize>,
    /// Returned frames still kept alive by a handle or a child frame
    pending: Vec<usize>,
    next_collect: usize,
}

const MIN_COLLECT_THRESHOLD: usize = 64;

impl Default for Scopes {
    fn default() -> Self {
        Self::new()
    }
}

impl Scopes {
    /// An arena holding only the global frame, which is never released
    pub fn new() -> Self {
        Self {
            frames: vec![Some(Frame::default())],
            free: Vec::new(),
            pending: Vec::new(),
            next_collect: MIN_COLLECT_THRESHOLD,
        }
    }

    fn frame(&self, id: ScopeId) -> &Frame {
        match self.frames.get(id.0) {
            Some(Some(frame)) => frame,
            _ => panic!("scope frame {} used after release", id.0),
        }
    }

    fn frame_mut(&mut self, id: ScopeId) -> &mut Frame {
        match self.frames.get_mut(id.0) {
            Some(Some(frame)) => frame,
            _ => panic!("scope frame {} used after release", id.0),
        }
    }

    /// Allocate a new empty frame
    pub fn push(&mut self, parent: Option<ScopeId>) -> ScopeId {
        if let Some(parent) = parent {
            self.frame_mut(parent).children += 1;
        }

        let frame = Frame {
            parent,
            ..Frame::default()
        };

        match self.free.pop() {
            Some(index) => {
                self.frames[index] = Some(frame);
                ScopeId(index)
            }
            None => {
                self.frames.push(Some(frame));
                ScopeId(self.frames.len() - 1)
            }
        }
    }

    /// A handle that keeps `id` alive past the end of its call
    pub fn handle(&self, id: ScopeId) -> ScopeHandle {
        ScopeHandle {
            id,
            anchor: Rc::clone(&self.frame(id).anchor),
        }
    }

    /// End the call that owns `id`.
    ///
    /// The frame is freed at once unless a handle or a child frame still
    /// refers to it; then it waits for a later [`Scopes::collect`].
    pub fn release(&mut self, id: ScopeId) {
        if id == ScopeId::GLOBAL {
            return;
        }

        let frame = self.frame_mut(id);
        frame.returned = true;
        if frame.handles_outstanding() == 0 && frame.children == 0 {
            self.free_frame(id.0);
            return;
        }

        self.pending.push(id.0);
        if self.pending.len() >= self.next_collect {
            self.collect();
            self.next_collect = (self.pending.len() * 2).max(MIN_COLLECT_THRESHOLD);
        }
    }

    fn free_frame(&mut self, index: usize) {
        if let Some(frame) = self.frames[index].take() {
            if let Some(parent) = frame.parent {
                if let Some(Some(parent)) = self.frames.get_mut(parent.0) {
                    parent.children -= 1;
                }
            }
            self.free.push(index);
        }
    }

    /// Free every returned frame that nothing live can reach any more.
    ///
    /// Handles held by values stored inside returned frames do not count,
    /// so a function bound in its own defining frame does not keep that
    /// frame alive on its own.
    pub fn collect(&mut self) {
        if self.pending.is_empty() {
            return;
        }

        let pending: HashSet<usize> = self.pending.iter().copied().collect();

        let mut internal: HashMap<usize, usize> = HashMap::new();
        for &index in &self.pending {
            for value in self.frame(ScopeId(index)).symbols.values() {
                value.for_each_scope(&mut |scope| {
                    if pending.contains(&scope.0) {
                        *internal.entry(scope.0).or_default() += 1;
                    }
                });
            }
        }

        // Roots: pending frames with handles held elsewhere, and the
        // parents of frames whose call is still running
        let mut stack: Vec<ScopeId> = self
            .pending
            .iter()
            .filter(|index| {
                let frame = self.frame(ScopeId(**index));
                frame.handles_outstanding() > internal.get(*index).copied().unwrap_or(0)
            })
            .map(|index| ScopeId(*index))
            .collect();
        stack.extend(
            self.frames
                .iter()
                .flatten()
                .filter(|frame| !frame.returned)
                .filter_map(|frame| frame.parent),
        );

        let mut reachable = HashSet::new();
        while let Some(id) = stack.pop() {
            if !pending.contains(&id.0) || !reachable.insert(id.0) {
                continue;
            }
            let frame = self.frame(id);
            stack.extend(frame.parent);
            for value in frame.symbols.values() {
                value.for_each_scope(&mut |scope| stack.push(scope));
            }
        }

        let (keep, unreachable): (Vec<usize>, Vec<usize>) = self
            .pending
            .iter()
            .copied()
            .partition(|index| reachable.contains(index));
        trace!("collected {} scope frames", unreachable.len());

        self.pending = keep;
        for index in unreachable {
            self.free_frame(index);
        }
    }

    pub fn parent(&self, id: ScopeId) -> Option<ScopeId> {
        self.frame(id).parent
    }

    /// Look a name up, innermost frame first
    pub fn get(&self, id: ScopeId, name: &str) -> Option<&Value> {
        let mut next = Some(id);
        while let Some(id) = next {
            let frame = self.frame(id);
            if let Some(value) = frame.symbols.get(name) {
                return Some(value);
            }
            next = frame.parent;
        }
        None
    }

    /// Bind in `id` itself, shadowing any outer binding
    pub fn set(&mut self, id: ScopeId, name: &str, value: Value) {
        self.frame_mut(id).symbols.insert(name.to_string(), value);
    }

    /// Overwrite an existing binding held by `id` or its immediate parent.
    ///
    /// Returns false, changing nothing, when neither frame holds the name.
    pub fn reassign(&mut self, id: ScopeId, name: &str, value: Value) -> bool {
        let target = if self.frame(id).symbols.contains_key(name) {
            Some(id)
        } else {
            self.parent(id)
                .filter(|parent| self.frame(*parent).symbols.contains_key(name))
        };

        match target {
            Some(target) => {
                self.set(target, name, value);
                true
            }
            None => false,
        }
    }

    /// Number of frames currently allocated
    pub fn live_frames(&self) -> usize {
        self.frames.iter().filter(|f| f.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_walks_parents() {
        let mut scopes = Scopes::new();
        scopes.set(ScopeId::GLOBAL, "x", Value::Number(1.0));
        let inner = scopes.push(Some(ScopeId::GLOBAL));

        assert_eq!(scopes.get(inner, "x"), Some(&Value::Number(1.0)));
        assert_eq!(scopes.get(inner, "y"), None);

        scopes.set(inner, "x", Value::Number(2.0));
        assert_eq!(scopes.get(inner, "x"), Some(&Value::Number(2.0)));
        assert_eq!(scopes.get(ScopeId::GLOBAL, "x"), Some(&Value::Number(1.0)));
    }

    #[test]
    fn test_reassign_reaches_one_parent_only() {
        let mut scopes = Scopes::new();
        scopes.set(ScopeId::GLOBAL, "x", Value::Number(1.0));
        let middle = scopes.push(Some(ScopeId::GLOBAL));
        let inner = scopes.push(Some(middle));

        assert!(scopes.reassign(middle, "x", Value::Number(2.0)));
        assert_eq!(scopes.get(ScopeId::GLOBAL, "x"), Some(&Value::Number(2.0)));

        assert!(!scopes.reassign(inner, "x", Value::Number(3.0)));
        assert_eq!(scopes.get(inner, "x"), Some(&Value::Number(2.0)));
        assert!(!scopes.reassign(inner, "missing", Value::Number(3.0)));
    }

    #[test]
    fn test_released_frames_are_reused() {
        let mut scopes = Scopes::new();
        let a = scopes.push(Some(ScopeId::GLOBAL));
        assert_eq!(scopes.live_frames(), 2);

        scopes.release(a);
        assert_eq!(scopes.live_frames(), 1);

        let b = scopes.push(None);
        assert_eq!(a, b);
        assert_eq!(scopes.get(b, "anything"), None);
    }

    #[test]
    fn test_handles_keep_returned_frames() {
        let mut scopes = Scopes::new();
        let outer = scopes.push(Some(ScopeId::GLOBAL));
        scopes.set(outer, "captured", Value::Number(7.0));

        let handle = scopes.handle(outer);
        scopes.release(outer);
        scopes.collect();
        assert_eq!(scopes.live_frames(), 2);
        assert_eq!(scopes.get(handle.id(), "captured"), Some(&Value::Number(7.0)));

        drop(handle);
        scopes.collect();
        assert_eq!(scopes.live_frames(), 1);
    }

    #[test]
    fn test_live_child_keeps_parent() {
        let mut scopes = Scopes::new();
        let outer = scopes.push(Some(ScopeId::GLOBAL));
        let inner = scopes.push(Some(outer));
        scopes.set(outer, "n", Value::Number(1.0));

        // the parent's call returns while the child's is still running
        let handle = scopes.handle(outer);
        scopes.release(outer);
        drop(handle);
        scopes.collect();
        assert_eq!(scopes.get(inner, "n"), Some(&Value::Number(1.0)));

        scopes.release(inner);
        scopes.collect();
        assert_eq!(scopes.live_frames(), 1);
    }

    #[test]
    fn test_global_frame_is_never_released() {
        let mut scopes = Scopes::new();
        scopes.set(ScopeId::GLOBAL, "x", Value::Number(1.0));
        scopes.release(ScopeId::GLOBAL);
        scopes.collect();
        assert_eq!(scopes.get(ScopeId::GLOBAL, "x"), Some(&Value::Number(1.0)));
    }

    #[test]
    #[should_panic(expected = "used after release")]
    fn test_released_frame_access_panics() {
        let mut scopes = Scopes::new();
        let frame = scopes.push(None);
        scopes.release(frame);
        scopes.get(frame, "x");
    }
}
