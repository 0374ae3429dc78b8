//! Scope tracking and `::`-qualified name helpers

/// Separator between scope segments
pub const SCOPE_SEPARATOR: &str = "::";

/// Context for tracking the lexical scope during a cursor walk
#[derive(Debug, Clone, Default)]
pub struct ScopeContext {
    /// Stack of scope names from root to current position
    scope_stack: Vec<String>,
}

impl ScopeContext {
    /// Create a new root scope context
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a new named scope onto the stack
    ///
    /// Unnamed scopes (anonymous namespaces, inline enum scopes) push an empty
    /// segment that does not show up in qualified names.
    pub fn push_scope(&mut self, name: impl Into<String>) {
        self.scope_stack.push(name.into());
    }

    /// Pop the current scope from the stack
    pub fn pop_scope(&mut self) {
        self.scope_stack.pop();
    }

    pub fn depth(&self) -> usize {
        self.scope_stack.len()
    }

    /// Current scope path, empty for the global scope
    pub fn current(&self) -> String {
        join_segments(self.scope_stack.iter().map(String::as_str))
    }

    /// Build a fully qualified name from the current scope
    pub fn qualify(&self, name: &str) -> String {
        qualify(&self.current(), name)
    }
}

fn join_segments<'a>(segments: impl Iterator<Item = &'a str>) -> String {
    segments
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(SCOPE_SEPARATOR)
}

/// Qualify `name` with `scope`; the global scope leaves the name unchanged
pub fn qualify(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else if name.is_empty() {
        scope.to_string()
    } else {
        format!("{scope}{SCOPE_SEPARATOR}{name}")
    }
}

/// Split a qualified name at top-level `::`, ignoring separators nested in
/// template argument lists or parentheses
pub fn split_qualified(name: &str) -> Vec<&str> {
    let bytes = name.as_bytes();
    let mut segments = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'<' | b'(' | b'[' => depth += 1,
            b'>' | b')' | b']' => depth -= 1,
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                segments.push(&name[start..i]);
                i += 2;
                start = i;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    segments.push(&name[start..]);
    segments
}

/// Parent scope of a qualified name, empty for global names
pub fn parent_scope(name: &str) -> String {
    let segments = split_qualified(name);
    join_segments(segments[..segments.len() - 1].iter().copied())
}

/// Scopes from `scope` outward to the global scope, innermost first
///
/// `"a::b"` yields `"a::b"`, `"a"`, `""`.
pub fn enclosing_scopes(scope: &str) -> Vec<String> {
    let segments: Vec<&str> = split_qualified(scope)
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect();
    let mut result: Vec<String> = (1..=segments.len())
        .rev()
        .map(|n| segments[..n].join(SCOPE_SEPARATOR))
        .collect();
    result.push(String::new());
    result
}
