//! Filter polymorphism: a sum type resolved once at the entry of each
//! query/scan, per spec's REDESIGN FLAGS guidance.
//!
//! The string-expression arm is the out-of-scope external collaborator
//! named in spec.md §1 (the original's `filtration.Expression`): the
//! core only defines the [`FilterCompiler`] seam it would plug into.

use crate::error::{DynafileError, Result};
use crate::item::Item;

pub type Predicate = Box<dyn Fn(&Item) -> bool + Send + Sync>;

/// A caller-supplied compiler for string filter expressions. Not
/// implemented in this crate; callers who want string filters provide
/// one at table-open time.
pub trait FilterCompiler: Send + Sync {
    fn compile(&self, expression: &str) -> Result<Predicate>;
}

pub enum Filter {
    /// `null` in spec.md: truthiness, i.e. a non-empty item.
    AlwaysTruthy,
    Predicate(Predicate),
    Expression(String),
}

impl Default for Filter {
    fn default() -> Self {
        Filter::AlwaysTruthy
    }
}

impl Filter {
    pub(crate) fn resolve(self, compiler: Option<&dyn FilterCompiler>) -> Result<Predicate> {
        match self {
            Filter::AlwaysTruthy => Ok(Box::new(|item: &Item| !item.is_empty())),
            Filter::Predicate(predicate) => Ok(predicate),
            Filter::Expression(expression) => match compiler {
                Some(compiler) => compiler.compile(&expression),
                None => Err(DynafileError::UnsupportedFilter {
                    reason: format!(
                        "string filter {expression:?} requires a FilterCompiler to be configured"
                    ),
                }),
            },
        }
    }
}

impl std::fmt::Debug for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Filter::AlwaysTruthy => write!(f, "Filter::AlwaysTruthy"),
            Filter::Predicate(_) => write!(f, "Filter::Predicate(..)"),
            Filter::Expression(expr) => write!(f, "Filter::Expression({expr:?})"),
        }
    }
}
