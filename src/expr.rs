use serde::Serialize;

use crate::token::Token;

/// Stable identity of an expression node.
///
/// The resolver's side table is keyed by this id rather than by node
/// contents: two `a` references on different lines are equal as values but
/// may live at different scope depths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ExprId(pub usize);

/// Hands out [`ExprId`]s.  One generator lives as long as the session so ids
/// never repeat between REPL lines.
#[derive(Debug, Default)]
pub struct ExprIds {
    next: usize,
}

impl ExprIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh(&mut self) -> ExprId {
        let id = ExprId(self.next);
        self.next += 1;
        id
    }
}

/// A **literal constant** that appears directly in the source code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LiteralValue {
    /// Numeric literal ‑ stored as IEEE‑754 `f64`.
    Number(f64),

    /// String literal without surrounding quotes.
    Str(String),

    True,

    False,

    Nil,
}

/// An expression node: identity plus shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub id: ExprId,
    pub kind: ExprKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    // Number, string, `true`, `false` or `nil`
    Literal(LiteralValue),

    // Variable read
    Variable(Token),

    // `name = value`
    Assign {
        name: Token,
        value: Box<Expr>,
    },

    // `!x`, `-x`
    Unary {
        operator: Token,
        right: Box<Expr>,
    },

    // Arithmetic, comparison and equality operators
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    // Short‑circuiting `and` / `or`
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    // Parenthesised sub‑expression
    Grouping(Box<Expr>),

    // `callee(arguments)`; `paren` is the closing `)` kept for error reporting
    Call {
        callee: Box<Expr>,
        paren: Token,
        arguments: Vec<Expr>,
    },

    // `object.name`
    Get {
        object: Box<Expr>,
        name: Token,
    },

    // `object.name = value`
    Set {
        object: Box<Expr>,
        name: Token,
        value: Box<Expr>,
    },

    // `this` inside a method
    This(Token),

    // `super.method`
    Super {
        keyword: Token,
        method: Token,
    },
}

impl Expr {
    pub fn new(id: ExprId, kind: ExprKind) -> Self {
        Self { id, kind }
    }

    /// Best line to blame for this expression, if it carries a token.
    pub fn line(&self) -> Option<usize> {
        match &self.kind {
            ExprKind::Literal(_) => None,

            ExprKind::Variable(token) | ExprKind::This(token) => Some(token.line),

            ExprKind::Assign { name, .. }
            | ExprKind::Get { name, .. }
            | ExprKind::Set { name, .. } => Some(name.line),

            ExprKind::Unary { operator, .. }
            | ExprKind::Binary { operator, .. }
            | ExprKind::Logical { operator, .. } => Some(operator.line),

            ExprKind::Grouping(inner) => inner.line(),

            ExprKind::Call { paren, .. } => Some(paren.line),

            ExprKind::Super { keyword, .. } => Some(keyword.line),
        }
    }
}
