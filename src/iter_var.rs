use crate::expr::Expr;

/// An iteration variable together with the extent of its domain.
///
/// Operations describe their top-level iteration domain as an ordered list of
/// these; scheduling passes consume them, this model only carries them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IterVar {
    /// Name of the loop variable.
    pub var: String,
    /// Symbolic number of iterations, starting from zero.
    pub extent: Expr,
}

impl IterVar {
    pub fn new(var: impl Into<String>, extent: impl Into<Expr>) -> Self {
        IterVar {
            var: var.into(),
            extent: extent.into(),
        }
    }
}

impl std::fmt::Display for IterVar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} < {}", self.var, self.extent)
    }
}
