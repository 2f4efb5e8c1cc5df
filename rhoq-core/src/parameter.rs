//! Symbolic parameter expressions and bindings for variational circuits
//!
//! A gate angle is either a constant or a linear combination of named
//! parameters, `const + Σᵢ coeffᵢ·nameᵢ`. Expressions are evaluated against
//! a [`ParameterBinding`], which maps names to real values and carries a
//! per-name requires-gradient flag. Evaluation is pure; the binding is
//! read-only during simulation.

use crate::error::{CoreError, Result};
use ahash::{AHashMap, AHashSet};

/// A linear combination of named parameters with a constant offset
///
/// # Example
/// ```
/// use rhoq_core::ParameterExpr;
///
/// // theta = 0.5 + 2·a
/// let expr = ParameterExpr::constant(0.5).add_term("a", 2.0);
/// assert_eq!(expr.coeff("a"), 2.0);
/// assert!(!expr.is_const());
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParameterExpr {
    constant: f64,
    terms: AHashMap<String, f64>,
}

impl ParameterExpr {
    /// Create a constant expression with no symbolic part
    pub fn constant(value: f64) -> Self {
        Self {
            constant: value,
            terms: AHashMap::new(),
        }
    }

    /// Create an expression consisting of a single named parameter
    pub fn name(name: impl Into<String>) -> Self {
        let mut terms = AHashMap::new();
        terms.insert(name.into(), 1.0);
        Self {
            constant: 0.0,
            terms,
        }
    }

    /// Builder pattern: add `coeff · name` to the expression
    pub fn add_term(mut self, name: impl Into<String>, coeff: f64) -> Self {
        *self.terms.entry(name.into()).or_insert(0.0) += coeff;
        self
    }

    /// Whether the expression has no symbolic part
    #[inline]
    pub fn is_const(&self) -> bool {
        self.terms.is_empty()
    }

    /// Coefficient of a named parameter (0 if absent)
    #[inline]
    pub fn coeff(&self, name: &str) -> f64 {
        self.terms.get(name).copied().unwrap_or(0.0)
    }

    /// Iterate over the (name, coefficient) terms
    pub fn terms(&self) -> impl Iterator<Item = (&str, f64)> {
        self.terms.iter().map(|(n, c)| (n.as_str(), *c))
    }

    /// Evaluate the linear combination against a binding
    ///
    /// # Errors
    /// Returns [`CoreError::MissingParameter`] if a named parameter is
    /// absent from the binding.
    pub fn combination(&self, binding: &ParameterBinding) -> Result<f64> {
        let mut value = self.constant;
        for (name, coeff) in &self.terms {
            let v = binding
                .get(name)
                .ok_or_else(|| CoreError::MissingParameter(name.clone()))?;
            value += coeff * v;
        }
        Ok(value)
    }

    /// Whether any named parameter in this expression requires a gradient
    /// under the given binding
    pub fn requires_grad(&self, binding: &ParameterBinding) -> bool {
        self.terms.keys().any(|n| binding.requires_grad(n))
    }
}

impl From<f64> for ParameterExpr {
    fn from(value: f64) -> Self {
        Self::constant(value)
    }
}

impl From<&str> for ParameterExpr {
    fn from(name: &str) -> Self {
        Self::name(name)
    }
}

impl std::ops::Neg for ParameterExpr {
    type Output = ParameterExpr;

    fn neg(mut self) -> ParameterExpr {
        self.constant = -self.constant;
        for coeff in self.terms.values_mut() {
            *coeff = -*coeff;
        }
        self
    }
}

/// An immutable mapping from parameter name to real value
///
/// Every name carries a requires-gradient flag, true by default; names
/// bound through [`ParameterBinding::with_no_grad`] are excluded from
/// gradient accumulation (typically encoder parameters).
///
/// # Example
/// ```
/// use rhoq_core::ParameterBinding;
///
/// let pr = ParameterBinding::new()
///     .with("theta", 0.3)
///     .with_no_grad("alpha", 1.0);
/// assert!(pr.requires_grad("theta"));
/// assert!(!pr.requires_grad("alpha"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct ParameterBinding {
    values: AHashMap<String, f64>,
    no_grad: AHashSet<String>,
}

impl ParameterBinding {
    /// Create an empty binding
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: bind a gradient-requiring parameter
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    /// Builder pattern: bind a parameter excluded from gradients
    pub fn with_no_grad(mut self, name: impl Into<String>, value: f64) -> Self {
        let name = name.into();
        self.no_grad.insert(name.clone());
        self.values.insert(name, value);
        self
    }

    /// Set a parameter value, keeping its gradient flag
    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    /// Look up a parameter value
    #[inline]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Whether a bound name participates in gradient accumulation
    #[inline]
    pub fn requires_grad(&self, name: &str) -> bool {
        self.values.contains_key(name) && !self.no_grad.contains(name)
    }

    /// Number of bound parameters
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the binding is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over bound names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|n| n.as_str())
    }
}
