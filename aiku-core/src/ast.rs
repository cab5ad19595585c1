use std::fmt::Display;
use std::rc::Rc;

#[derive(Debug, PartialEq, Clone)]
pub enum Statement {
    VariableDeclaration(VariableDeclaration),
    FunctionDeclaration(FunctionDeclaration),
    If(IfStatement),
    ForIn(ForInStatement),
    Return(ReturnStatement),
    Expression(Expression),
}

#[derive(Debug, PartialEq, Clone)]
pub struct VariableDeclaration {
    pub name: Identifier,
    pub value: Expression,
}

#[derive(Debug, PartialEq, Clone)]
pub struct FunctionDeclaration {
    pub name: Identifier,
    pub params: Vec<Identifier>,
    pub body: Vec<Statement>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct IfStatement {
    pub test: Expression,
    pub consequent: Vec<Statement>,
    /// Empty when the `sinon` block is absent.
    pub alternate: Vec<Statement>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ForInStatement {
    pub variable: Identifier,
    pub iterable: Expression,
    pub body: Vec<Statement>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ReturnStatement {
    pub value: Expression,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    Identifier(Identifier),
    NumberLiteral(f64),
    StringLiteral(String),
    ListLiteral(Vec<Expression>),
    ListAccess {
        object: Box<Expression>,
        index: Box<Expression>,
    },
    Call {
        callee: Identifier,
        arguments: Vec<Expression>,
    },
    Binary {
        operator: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BinaryOperator {
    Plus,
    Minus,
    Multiply,
    Divide,
    GreaterThan,
    LessThan,
    GreaterEqual,
    LessEqual,
    Equal,
}

impl BinaryOperator {
    pub fn as_str(&self) -> &'static str {
        use BinaryOperator::*;
        match self {
            Plus => "+",
            Minus => "-",
            Multiply => "*",
            Divide => "/",
            GreaterThan => ">",
            LessThan => "<",
            GreaterEqual => ">=",
            LessEqual => "<=",
            Equal => "==",
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Identifier {
    pub name: Rc<str>,
}

impl Identifier {
    pub fn new(name: impl Into<Rc<str>>) -> Self {
        Identifier { name: name.into() }
    }
}

#[derive(Debug, PartialEq)]
pub struct Program {
    pub body: Vec<Statement>,
}

fn write_block(
    f: &mut std::fmt::Formatter<'_>,
    statements: &[Statement],
) -> std::fmt::Result {
    for statement in statements {
        writeln!(f, "  {}", statement)?;
    }
    Ok(())
}

impl Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Statement::*;
        match self {
            VariableDeclaration(decl) => {
                write!(f, "variable {} = {}", decl.name, decl.value)
            }
            FunctionDeclaration(decl) => {
                writeln!(
                    f,
                    "fonction {}({})",
                    decl.name,
                    decl.params
                        .iter()
                        .map(|param| param.name.as_ref())
                        .collect::<Vec<_>>()
                        .join(", ")
                )?;
                write_block(f, &decl.body)?;
                write!(f, "fin")
            }
            If(statement) => {
                writeln!(f, "si {} alors", statement.test)?;
                write_block(f, &statement.consequent)?;
                if !statement.alternate.is_empty() {
                    writeln!(f, "sinon")?;
                    write_block(f, &statement.alternate)?;
                }
                write!(f, "fin")
            }
            ForIn(statement) => {
                writeln!(
                    f,
                    "pour {} dans {} faire",
                    statement.variable, statement.iterable
                )?;
                write_block(f, &statement.body)?;
                write!(f, "fin")
            }
            Return(statement) => write!(f, "retourner {}", statement.value),
            Expression(expression) => write!(f, "{}", expression),
        }
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Expression::*;
        match self {
            Identifier(ident) => write!(f, "{}", ident),
            NumberLiteral(value) => write!(f, "{}", value),
            StringLiteral(value) => write!(f, "\"{}\"", value),
            ListLiteral(elements) => {
                write!(f, "liste(")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, ")")
            }
            ListAccess { object, index } => write!(f, "{}[{}]", object, index),
            Call { callee, arguments } => {
                write!(
                    f,
                    "{}({})",
                    callee,
                    arguments
                        .iter()
                        .map(|argument| argument.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            }
            Binary {
                operator,
                left,
                right,
            } => write!(f, "({} {} {})", left, operator.as_str(), right),
        }
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for statement in &self.body {
            writeln!(f, "{}", statement)?;
        }
        Ok(())
    }
}
