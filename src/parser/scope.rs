//! Scope stack
//!
//! Tracks the chain of namespaces and classes enclosing the parser cursor,
//! together with the access level currently in effect in each. The global
//! scope is always at the bottom and cannot be popped.

use super::lexer::Token;
use crate::error::ScopeError;

/// Maximum number of frames, the global scope included.
pub const MAX_SCOPE_DEPTH: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Namespace,
    Class,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Protected,
    Private,
}

impl Access {
    pub fn as_str(self) -> &'static str {
        match self {
            Access::Public => "public",
            Access::Protected => "protected",
            Access::Private => "private",
        }
    }

    /// Parse an access keyword token.
    pub fn from_token(token: &Token) -> Option<Self> {
        if token.kind != super::lexer::TokenKind::Identifier {
            return None;
        }
        match token.text.as_str() {
            "public" => Some(Access::Public),
            "protected" => Some(Access::Protected),
            "private" => Some(Access::Private),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub kind: ScopeKind,
    pub name: String,
    pub access: Access,
}

#[derive(Debug, Clone)]
pub struct ScopeStack {
    root: Scope,
    nested: Vec<Scope>,
    capacity: usize,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::with_capacity(MAX_SCOPE_DEPTH)
    }
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// A stack holding at most `capacity` frames, the global one included.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            root: Scope {
                kind: ScopeKind::Global,
                name: String::new(),
                access: Access::Public,
            },
            nested: Vec::with_capacity(capacity - 1),
            capacity,
        }
    }

    /// Drop every frame except the global one.
    pub fn reset(&mut self) {
        self.nested.clear();
        self.root.access = Access::Public;
    }

    pub fn depth(&self) -> usize {
        self.nested.len() + 1
    }

    pub fn top(&self) -> &Scope {
        self.nested.last().unwrap_or(&self.root)
    }

    pub fn top_mut(&mut self) -> &mut Scope {
        match self.nested.last_mut() {
            Some(scope) => scope,
            None => &mut self.root,
        }
    }

    pub fn push(
        &mut self,
        kind: ScopeKind,
        name: impl Into<String>,
        access: Access,
    ) -> Result<(), ScopeError> {
        if self.depth() >= self.capacity {
            return Err(ScopeError::Overflow(self.capacity));
        }
        self.nested.push(Scope {
            kind,
            name: name.into(),
            access,
        });
        Ok(())
    }

    pub fn pop(&mut self) -> Result<Scope, ScopeError> {
        self.nested.pop().ok_or(ScopeError::Underflow)
    }

    /// Name of the class whose body the cursor is in, if any.
    pub fn enclosing_class(&self) -> Option<&str> {
        let top = self.top();
        (top.kind == ScopeKind::Class).then_some(top.name.as_str())
    }

    /// Access to report for a declaration, only inside a class body.
    pub fn member_access(&self) -> Option<Access> {
        let top = self.top();
        (top.kind == ScopeKind::Class).then_some(top.access)
    }
}
