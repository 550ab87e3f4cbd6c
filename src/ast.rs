use std::rc::Rc;

/// Represents a literal value in the language.
///
/// `LiteralValue` covers all raw, constant values that can appear directly in
/// source code. Lists and objects are not literals here because their elements
/// are arbitrary expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// A 64-bit signed integer literal.
    Integer(i64),
    /// A 64-bit floating-point literal.
    Real(f64),
    /// A string literal, already unescaped.
    Str(String),
    /// A boolean literal value: `true` or `false`.
    Bool(bool),
    /// The `null` literal.
    Null,
}

impl From<i64> for LiteralValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for LiteralValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<bool> for LiteralValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for LiteralValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

/// An abstract syntax tree (AST) node representing an expression in the
/// language.
///
/// Every variant carries the source line it started on, which runtime errors
/// report.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal value (number, string, boolean or null).
    Literal {
        /// The constant value.
        value: LiteralValue,
        /// Line number in the source code.
        line:  usize,
    },
    /// Reference to a variable by name.
    Identifier {
        /// Name of the variable.
        name: String,
        /// Line number in the source code.
        line: usize,
    },
    /// List literal expression, e.g. `[1, 2, 3]`.
    List {
        /// Elements of the list.
        items: Vec<Self>,
        /// Line number in the source code.
        line:  usize,
    },
    /// Object literal expression, e.g. `{"a": 1}`.
    Object {
        /// Key and value expressions in source order.
        entries: Vec<(Self, Self)>,
        /// Line number in the source code.
        line:    usize,
    },
    /// A unary operation (negation or logical not).
    Unary {
        /// The unary operator to apply.
        op:   UnaryOperator,
        /// The operand expression.
        expr: Box<Self>,
        /// Line number in the source code.
        line: usize,
    },
    /// A strict binary operation: both operands are always evaluated.
    Binary {
        /// Left operand.
        left:  Box<Self>,
        /// The operator.
        op:    BinaryOperator,
        /// Right operand.
        right: Box<Self>,
        /// Line number in the source code.
        line:  usize,
    },
    /// A short-circuiting `&&` or `||`.
    Logical {
        /// Left operand, always evaluated.
        left:  Box<Self>,
        /// The operator.
        op:    LogicalOperator,
        /// Right operand, evaluated only when the left one does not decide.
        right: Box<Self>,
        /// Line number in the source code.
        line:  usize,
    },
    /// Indexing expression, e.g. `a[2]` or `point.x`.
    Index {
        /// The value being indexed.
        base:  Box<Self>,
        /// The index or key.
        index: Box<Self>,
        /// Line number in the source code.
        line:  usize,
    },
    /// Assignment; evaluates to the assigned value.
    Assign {
        /// Where the value is stored.
        target: AssignTarget,
        /// The value being assigned.
        value:  Box<Self>,
        /// Line number in the source code.
        line:   usize,
    },
    /// Function literal, e.g. `function(a, b) { return a + b }`.
    Function {
        /// Parameters and body, shared with every closure created from it.
        def:  Rc<FunctionDef>,
        /// Line number in the source code.
        line: usize,
    },
    /// Call expression, e.g. `f(1, 2)`.
    Call {
        /// Expression producing the function to call.
        callee:    Box<Self>,
        /// Arguments to the function.
        arguments: Vec<Self>,
        /// Line number in the source code.
        line:      usize,
    },
}

impl Expr {
    /// Gets the line number from `self`.
    /// ## Example
    /// ```
    /// use quill::ast::Expr;
    ///
    /// let expr = Expr::Identifier { name: "x".to_string(),
    ///                               line: 5, };
    ///
    /// assert_eq!(expr.line_number(), 5);
    /// ```
    #[must_use]
    pub const fn line_number(&self) -> usize {
        match self {
            Self::Literal { line, .. }
            | Self::Identifier { line, .. }
            | Self::List { line, .. }
            | Self::Object { line, .. }
            | Self::Unary { line, .. }
            | Self::Binary { line, .. }
            | Self::Logical { line, .. }
            | Self::Index { line, .. }
            | Self::Assign { line, .. }
            | Self::Function { line, .. }
            | Self::Call { line, .. } => *line,
        }
    }

    /// A short, stable name for the kind of node, used by instrumentation.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Literal { value: LiteralValue::Integer(_) | LiteralValue::Real(_),
                            .. } => "number",
            Self::Literal { value: LiteralValue::Str(_),
                            .. } => "string",
            Self::Literal { value: LiteralValue::Bool(_),
                            .. } => "boolean",
            Self::Literal { value: LiteralValue::Null,
                            .. } => "null",
            Self::Identifier { .. } => "identifier",
            Self::List { .. } => "list",
            Self::Object { .. } => "object",
            Self::Unary { op, .. } => op.kind(),
            Self::Binary { op, .. } => op.symbol(),
            Self::Logical { op, .. } => op.symbol(),
            Self::Index { .. } => "index",
            Self::Assign { .. } => "assign",
            Self::Function { .. } => "function",
            Self::Call { .. } => "call",
        }
    }
}

/// The left-hand side of an assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignTarget {
    /// A bare identifier, optionally marked `extern`.
    Variable {
        /// The name being bound.
        name:      String,
        /// When set, the name must already be bound in an enclosing scope and
        /// that binding is updated instead of creating a local one.
        is_extern: bool,
    },
    /// An element of an array or an entry of an object.
    Index {
        /// The container being written into.
        base:  Box<Expr>,
        /// The index or key.
        index: Box<Expr>,
    },
}

/// Parameters and body of a function literal.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    /// The parameter names, in order.
    pub params: Vec<String>,
    /// The statements executed when the function is called.
    pub body:   Block,
}

/// Represents a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// An expression evaluated for its value or side effects. Function
    /// declarations arrive here as an assignment of a function literal.
    Expression {
        /// The expression to evaluate.
        expr: Expr,
        /// Line number in the source code.
        line: usize,
    },
    /// `if (condition) { ... } else { ... }`.
    If {
        /// The condition.
        condition:   Expr,
        /// Statements run when the condition is truthy.
        then_branch: Block,
        /// Statements run otherwise, if present.
        else_branch: Option<Block>,
        /// Line number in the source code.
        line:        usize,
    },
    /// `while (condition) { ... }`.
    While {
        /// The loop condition, re-evaluated before each iteration.
        condition: Expr,
        /// The loop body.
        body:      Block,
        /// Line number in the source code.
        line:      usize,
    },
    /// `print [expr]`.
    Print {
        /// The value to print; a blank line when absent.
        value: Option<Expr>,
        /// Line number in the source code.
        line:  usize,
    },
    /// `return [expr]`.
    Return {
        /// The returned value; `null` when absent.
        value: Option<Expr>,
        /// Line number in the source code.
        line:  usize,
    },
    /// `exit [expr]`.
    Exit {
        /// The exit status; `0` when absent.
        value: Option<Expr>,
        /// Line number in the source code.
        line:  usize,
    },
    /// `import expr`.
    Import {
        /// Expression producing the path of the file to include.
        path: Expr,
        /// Line number in the source code.
        line: usize,
    },
    /// `break`.
    Break {
        /// Line number in the source code.
        line: usize,
    },
    /// `continue`.
    Continue {
        /// Line number in the source code.
        line: usize,
    },
    /// `assert condition [, explanation]`.
    Assert {
        /// The condition that must be truthy.
        condition:   Expr,
        /// Optional message evaluated only when the assertion fails.
        explanation: Option<Expr>,
        /// Line number in the source code.
        line:        usize,
    },
}

impl Statement {
    /// Gets the line number from `self`.
    #[must_use]
    pub const fn line_number(&self) -> usize {
        match self {
            Self::Expression { line, .. }
            | Self::If { line, .. }
            | Self::While { line, .. }
            | Self::Print { line, .. }
            | Self::Return { line, .. }
            | Self::Exit { line, .. }
            | Self::Import { line, .. }
            | Self::Break { line }
            | Self::Continue { line }
            | Self::Assert { line, .. } => *line,
        }
    }

    /// A short, stable name for the kind of node, used by instrumentation.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Expression { .. } => "expression",
            Self::If { .. } => "if",
            Self::While { .. } => "while",
            Self::Print { .. } => "print",
            Self::Return { .. } => "return",
            Self::Exit { .. } => "exit",
            Self::Import { .. } => "import",
            Self::Break { .. } => "break",
            Self::Continue { .. } => "continue",
            Self::Assert { .. } => "assert",
        }
    }

    /// Whether the statement ends with a `}` and therefore needs no `;`
    /// separator after it.
    #[must_use]
    pub fn is_block_bodied(&self) -> bool {
        match self {
            Self::If { .. } | Self::While { .. } => true,
            Self::Expression { expr: Expr::Assign { value, .. },
                               .. } => matches!(**value, Expr::Function { .. }),
            _ => false,
        }
    }
}

/// A `{ ... }` sequence of statements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    /// Statements inside the block.
    pub statements: Vec<Statement>,
    /// Line number of the opening brace.
    pub line:       usize,
}

/// A whole parsed source file: its top-level statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// The top-level statement list.
    pub body: Block,
}

/// Represents a strict binary operator.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BinaryOperator {
    /// Addition or concatenation (`+`)
    Add,
    /// Subtraction (`-`)
    Sub,
    /// Multiplication or repetition (`*`)
    Mul,
    /// Division (`/`)
    Div,
    /// Modulo (`%`)
    Mod,
    /// Less than (`<`)
    Less,
    /// Greater than (`>`)
    Greater,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than or equal (`>=`)
    GreaterEqual,
    /// Equal to (`==`)
    Equal,
    /// Not equal to (`!=`)
    NotEqual,
}

impl BinaryOperator {
    /// The operator as written in source.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Less => "<",
            Self::Greater => ">",
            Self::LessEqual => "<=",
            Self::GreaterEqual => ">=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
        }
    }
}

/// Represents a short-circuiting operator.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LogicalOperator {
    /// Logical and (`&&` / `and`)
    And,
    /// Logical or (`||` / `or`)
    Or,
}

impl LogicalOperator {
    /// The operator as written in source.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::And => "&&",
            Self::Or => "||",
        }
    }
}

/// Represents a unary operator.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UnaryOperator {
    /// Arithmetic negation (e.g. `-x`).
    Negate,
    /// Logical NOT (e.g. `!x` or `not x`).
    Not,
}

impl UnaryOperator {
    const fn kind(self) -> &'static str {
        match self {
            Self::Negate => "negate",
            Self::Not => "not",
        }
    }
}

impl std::fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl std::fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
