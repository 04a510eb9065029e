//! Symbolic scalar expressions.
//!
//! Expressions describe tensor shapes and index arithmetic without committing
//! to concrete values. A [`Expr::Read`] node represents a symbolic element
//! read from a [`Tensor`](crate::tensor::Tensor), tagged with the tensor
//! handle so later passes can trace which operation produced the value.

use crate::tensor::Tensor;
use rustc_hash::{FxHashMap, FxHashSet};
use std::ops::{Add, Div, Mul, Neg, Not, Rem, Sub};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Const(i64),
    Bool(bool),
    Var(String),

    Add(Box<Self>, Box<Self>),
    Sub(Box<Self>, Box<Self>),
    Mul(Box<Self>, Box<Self>),
    Div(Box<Self>, Box<Self>),
    Rem(Box<Self>, Box<Self>),

    And(Box<Self>, Box<Self>),
    Or(Box<Self>, Box<Self>),
    Not(Box<Self>),
    Lt(Box<Self>, Box<Self>),
    Eq(Box<Self>, Box<Self>),
    Gt(Box<Self>, Box<Self>),

    /// Symbolic read of one tensor element at the given coordinates.
    ///
    /// The handle carries the producing operation and output index when the
    /// tensor is a computed value, which is the provenance downstream passes
    /// rely on. Built through [`Tensor::call`](crate::tensor::Tensor::call),
    /// which checks that the coordinate count matches the tensor's rank.
    Read {
        tensor: Tensor,
        indices: Vec<Expr>,
    },
}

impl Expr {
    pub fn var(name: &str) -> Self {
        Self::Var(name.to_string())
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Const(0))
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Expr::Const(1))
    }

    pub fn lt(self, rhs: impl Into<Expr>) -> Self {
        Self::Lt(Box::new(self), Box::new(rhs.into()))
    }

    pub fn eq(self, rhs: impl Into<Expr>) -> Self {
        Self::Eq(Box::new(self), Box::new(rhs.into()))
    }

    pub fn gt(self, rhs: impl Into<Expr>) -> Self {
        Self::Gt(Box::new(self), Box::new(rhs.into()))
    }

    pub fn and(self, rhs: impl Into<Expr>) -> Self {
        Self::And(Box::new(self), Box::new(rhs.into()))
    }

    pub fn or(self, rhs: impl Into<Expr>) -> Self {
        Self::Or(Box::new(self), Box::new(rhs.into()))
    }

    /// Folds constants and eliminates arithmetic identities.
    ///
    /// A `Read` is opaque to simplification: only its index expressions are
    /// simplified, the read itself is never rewritten.
    pub fn simplify(self) -> Self {
        match self {
            Expr::Add(lhs, rhs) => match (lhs.simplify(), rhs.simplify()) {
                (Expr::Const(0), e) | (e, Expr::Const(0)) => e,
                (Expr::Const(l), Expr::Const(r)) => Expr::Const(l + r),
                (l, r) => l + r,
            },
            Expr::Sub(lhs, rhs) => match (lhs.simplify(), rhs.simplify()) {
                (e, Expr::Const(0)) => e,
                (l, r) if l == r => Expr::Const(0),
                (Expr::Const(l), Expr::Const(r)) => Expr::Const(l - r),
                (Expr::Const(0), Expr::Sub(a, b)) => (*b - *a).simplify(),
                (l, r) => l - r,
            },
            Expr::Mul(lhs, rhs) => match (lhs.simplify(), rhs.simplify()) {
                (Expr::Const(0), _) | (_, Expr::Const(0)) => Expr::Const(0),
                (Expr::Const(1), e) | (e, Expr::Const(1)) => e,
                (Expr::Const(l), Expr::Const(r)) => Expr::Const(l * r),
                (l, r) => l * r,
            },
            Expr::Div(lhs, rhs) => match (lhs.simplify(), rhs.simplify()) {
                (_, Expr::Const(0)) => panic!("division by zero"),
                (e, Expr::Const(1)) => e,
                (l, r) if l == r => Expr::Const(1),
                (Expr::Const(0), _) => Expr::Const(0),
                (Expr::Const(l), Expr::Const(r)) => Expr::Const(l / r),
                (l, r) => l / r,
            },
            Expr::Rem(lhs, rhs) => match (lhs.simplify(), rhs.simplify()) {
                (_, Expr::Const(0)) => panic!("division by zero"),
                (_, Expr::Const(1)) => Expr::Const(0),
                (l, r) if l == r => Expr::Const(0),
                (Expr::Const(0), _) => Expr::Const(0),
                (Expr::Const(l), Expr::Const(r)) => Expr::Const(l % r),
                (l, r) => l % r,
            },
            Expr::And(lhs, rhs) => match (lhs.simplify(), rhs.simplify()) {
                (Expr::Bool(true), e) | (e, Expr::Bool(true)) => e,
                (Expr::Bool(false), _) | (_, Expr::Bool(false)) => Expr::Bool(false),
                (l, r) => l.and(r),
            },
            Expr::Or(lhs, rhs) => match (lhs.simplify(), rhs.simplify()) {
                (Expr::Bool(true), _) | (_, Expr::Bool(true)) => Expr::Bool(true),
                (Expr::Bool(false), e) | (e, Expr::Bool(false)) => e,
                (l, r) => l.or(r),
            },
            Expr::Not(e) => match e.simplify() {
                Expr::Bool(b) => Expr::Bool(!b),
                Expr::Not(inner) => *inner,
                e => !e,
            },
            Expr::Lt(lhs, rhs) => match (lhs.simplify(), rhs.simplify()) {
                (Expr::Const(l), Expr::Const(r)) => Expr::Bool(l < r),
                (l, r) => l.lt(r),
            },
            Expr::Eq(lhs, rhs) => match (lhs.simplify(), rhs.simplify()) {
                (Expr::Const(l), Expr::Const(r)) => Expr::Bool(l == r),
                (l, r) if l == r => Expr::Bool(true),
                (l, r) => l.eq(r),
            },
            Expr::Gt(lhs, rhs) => match (lhs.simplify(), rhs.simplify()) {
                (Expr::Const(l), Expr::Const(r)) => Expr::Bool(l > r),
                (l, r) => l.gt(r),
            },
            Expr::Read { tensor, indices } => Expr::Read {
                tensor,
                indices: indices.into_iter().map(Expr::simplify).collect(),
            },
            e @ (Expr::Const(_) | Expr::Bool(_) | Expr::Var(_)) => e,
        }
    }

    /// Names of all `Var` nodes reachable from this expression.
    pub fn variables(&self) -> FxHashSet<String> {
        let mut vars = FxHashSet::default();
        self.collect_variables(&mut vars);
        vars
    }

    fn collect_variables(&self, vars: &mut FxHashSet<String>) {
        match self {
            Expr::Var(name) => {
                vars.insert(name.clone());
            }
            Expr::Add(l, r)
            | Expr::Sub(l, r)
            | Expr::Mul(l, r)
            | Expr::Div(l, r)
            | Expr::Rem(l, r)
            | Expr::And(l, r)
            | Expr::Or(l, r)
            | Expr::Lt(l, r)
            | Expr::Eq(l, r)
            | Expr::Gt(l, r) => {
                l.collect_variables(vars);
                r.collect_variables(vars);
            }
            Expr::Not(e) => e.collect_variables(vars),
            Expr::Read { indices, .. } => {
                for i in indices {
                    i.collect_variables(vars);
                }
            }
            Expr::Const(_) | Expr::Bool(_) => {}
        }
    }

    /// Evaluates the expression under a variable assignment.
    ///
    /// Booleans evaluate to 0/1.
    ///
    /// # Panics
    ///
    /// Panics on an unbound variable, and on a `Read` node: tensor reads are
    /// symbolic only and have no value at graph-construction time.
    pub fn evaluate(&self, vars: &FxHashMap<String, i64>) -> i64 {
        match self {
            Expr::Const(c) => *c,
            Expr::Bool(b) => *b as i64,
            Expr::Var(v) => *vars
                .get(v)
                .unwrap_or_else(|| panic!("variable '{v}' not found in evaluation context")),
            Expr::Add(l, r) => l.evaluate(vars) + r.evaluate(vars),
            Expr::Sub(l, r) => l.evaluate(vars) - r.evaluate(vars),
            Expr::Mul(l, r) => l.evaluate(vars) * r.evaluate(vars),
            Expr::Div(l, r) => l.evaluate(vars) / r.evaluate(vars),
            Expr::Rem(l, r) => l.evaluate(vars) % r.evaluate(vars),
            Expr::And(l, r) => ((l.evaluate(vars) != 0) && (r.evaluate(vars) != 0)) as i64,
            Expr::Or(l, r) => ((l.evaluate(vars) != 0) || (r.evaluate(vars) != 0)) as i64,
            Expr::Not(e) => (e.evaluate(vars) == 0) as i64,
            Expr::Lt(l, r) => (l.evaluate(vars) < r.evaluate(vars)) as i64,
            Expr::Eq(l, r) => (l.evaluate(vars) == r.evaluate(vars)) as i64,
            Expr::Gt(l, r) => (l.evaluate(vars) > r.evaluate(vars)) as i64,
            Expr::Read { tensor, .. } => {
                panic!("cannot evaluate symbolic read of tensor '{}'", tensor.name())
            }
        }
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Const(c) => write!(f, "{c}"),
            Expr::Bool(b) => write!(f, "{b}"),
            Expr::Var(v) => write!(f, "{v}"),
            Expr::Add(l, r) => write!(f, "({l} + {r})"),
            Expr::Sub(l, r) => write!(f, "({l} - {r})"),
            Expr::Mul(l, r) => write!(f, "({l} * {r})"),
            Expr::Div(l, r) => write!(f, "({l} / {r})"),
            Expr::Rem(l, r) => write!(f, "({l} % {r})"),
            Expr::And(l, r) => write!(f, "({l} && {r})"),
            Expr::Or(l, r) => write!(f, "({l} || {r})"),
            Expr::Not(e) => write!(f, "!{e}"),
            Expr::Lt(l, r) => write!(f, "({l} < {r})"),
            Expr::Eq(l, r) => write!(f, "({l} == {r})"),
            Expr::Gt(l, r) => write!(f, "({l} > {r})"),
            Expr::Read { tensor, indices } => {
                write!(f, "{}[", tensor.name())?;
                for (n, i) in indices.iter().enumerate() {
                    if n > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{i}")?;
                }
                write!(f, "]")
            }
        }
    }
}

macro_rules! impl_from_integer_for_expr {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Expr {
                fn from(n: $t) -> Self {
                    Expr::Const(n as i64)
                }
            }
        )*
    };
}

impl_from_integer_for_expr!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

macro_rules! impl_expr_binary_op {
    ($trait:ident, $fname:ident, $variant:expr) => {
        impl<T: Into<Expr>> $trait<T> for Expr {
            type Output = Expr;
            fn $fname(self, rhs: T) -> Self::Output {
                $variant(Box::new(self), Box::new(rhs.into()))
            }
        }
    };
}

impl_expr_binary_op!(Add, add, Expr::Add);
impl_expr_binary_op!(Sub, sub, Expr::Sub);
impl_expr_binary_op!(Mul, mul, Expr::Mul);
impl_expr_binary_op!(Div, div, Expr::Div);
impl_expr_binary_op!(Rem, rem, Expr::Rem);

impl Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Expr::from(0i64) - self
    }
}

impl Not for Expr {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self::Not(Box::new(self))
    }
}
