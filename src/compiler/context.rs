//! Per-compilation state

use crate::ir::Binding;

/// Binding allocator for one compile pass
///
/// Created fresh for every top-level compile call and dropped when it returns.
/// Bindings are numbered from zero in traversal order, so compiling the same
/// expression twice yields the same binding layout.
#[derive(Debug, Default)]
pub struct CompilationContext {
    next_binding: u64,
}

impl CompilationContext {
    /// Create a context whose first binding is `$0`
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next unused binding
    pub fn allocate(&mut self) -> Binding {
        let binding = Binding::from_raw(self.next_binding);
        self.next_binding += 1;
        binding
    }

    /// Number of bindings allocated so far
    pub fn allocated(&self) -> u64 {
        self.next_binding
    }
}
