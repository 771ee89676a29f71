//! Type expression tree
//!
//! Declarations are streamed straight into the output document, so the only
//! tree the parser builds is the [`TypeNode`] for one type expression. Each
//! node owns its children and is dropped once written.

/// Qualifier flags shared by every type node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Qualifiers {
    pub is_const: bool,
    pub is_volatile: bool,
    pub is_mutable: bool,
    pub is_static: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeNode {
    pub qualifiers: Qualifiers,
    pub kind: TypeKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// A (possibly `::`-qualified) type name such as `std::string`.
    Literal { name: String },
    Pointer(Box<TypeNode>),
    /// `T&`
    Reference(Box<TypeNode>),
    /// `T&&`
    RvalueReference(Box<TypeNode>),
    Template {
        name: String,
        arguments: Vec<TypeNode>,
    },
    /// A function type, e.g. `void(int)` or `T(*)(int, char)`.
    Function {
        returns: Box<TypeNode>,
        parameters: Vec<FunctionParam>,
    },
}

/// One parameter of a function type.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionParam {
    pub name: Option<String>,
    pub ty: TypeNode,
}

impl TypeNode {
    pub fn new(kind: TypeKind) -> Self {
        Self {
            qualifiers: Qualifiers::default(),
            kind,
        }
    }

    pub fn literal(name: impl Into<String>) -> Self {
        Self::new(TypeKind::Literal { name: name.into() })
    }

    /// The node tag used in the output document.
    pub fn tag(&self) -> &'static str {
        match self.kind {
            TypeKind::Literal { .. } => "literal",
            TypeKind::Pointer(_) => "pointer",
            TypeKind::Reference(_) => "reference",
            TypeKind::RvalueReference(_) => "lreference",
            TypeKind::Template { .. } => "template",
            TypeKind::Function { .. } => "function",
        }
    }

    /// Name of a literal or template node.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            TypeKind::Literal { name } | TypeKind::Template { name, .. } => {
                Some(name)
            }
            _ => None,
        }
    }

    /// The wrapped node of a pointer or reference.
    pub fn base(&self) -> Option<&TypeNode> {
        match &self.kind {
            TypeKind::Pointer(base)
            | TypeKind::Reference(base)
            | TypeKind::RvalueReference(base) => Some(base),
            _ => None,
        }
    }
}
