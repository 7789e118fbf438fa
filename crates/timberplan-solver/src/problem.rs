use std::fmt;

/// A linear program over named, non-negative variables.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct LpProblem {
    /// Variable names, one per column
    pub variables: Vec<String>,
    /// Objective function
    pub objective: Objective,
    /// Constraint rows
    pub constraints: Vec<Constraint>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Objective {
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    pub sense: Sense,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Minimize,
    Maximize,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Constraint {
    /// Name/label for the row (for diagnostics and duals)
    pub name: String,
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Comparison against the right-hand side
    pub relation: Relation,
    /// Right-hand side value
    pub rhs: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Less than or equal (<=)
    Le,
    /// Greater than or equal (>=)
    Ge,
    /// Equal (=)
    Eq,
}

impl Relation {
    pub fn symbol(self) -> &'static str {
        match self {
            Relation::Le => "<=",
            Relation::Ge => ">=",
            Relation::Eq => "=",
        }
    }
}

impl LpProblem {
    pub fn new(variables: Vec<String>) -> Self {
        let n = variables.len();
        Self {
            variables,
            objective: Objective {
                coefficients: vec![0.0; n],
                sense: Sense::Minimize,
            },
            constraints: Vec::new(),
        }
    }

    pub fn maximize(&mut self, coefficients: Vec<f64>) {
        self.objective = Objective {
            coefficients,
            sense: Sense::Maximize,
        };
    }

    pub fn minimize(&mut self, coefficients: Vec<f64>) {
        self.objective = Objective {
            coefficients,
            sense: Sense::Minimize,
        };
    }

    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        coefficients: Vec<f64>,
        relation: Relation,
        rhs: f64,
    ) {
        self.constraints.push(Constraint {
            name: name.into(),
            coefficients,
            relation,
            rhs,
        });
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }
}

/// Writes a linear sum like `3 x + y - 2 z`, skipping zero coefficients.
fn fmt_terms(f: &mut fmt::Formatter<'_>, coefficients: &[f64], variables: &[String]) -> fmt::Result {
    let mut first = true;
    for (coef, var) in coefficients.iter().zip(variables) {
        if *coef == 0.0 {
            continue;
        }
        if first {
            if *coef < 0.0 {
                write!(f, "-")?;
            }
        } else if *coef < 0.0 {
            write!(f, " - ")?;
        } else {
            write!(f, " + ")?;
        }
        let magnitude = coef.abs();
        if magnitude == 1.0 {
            write!(f, "{}", var)?;
        } else {
            write!(f, "{} {}", magnitude, var)?;
        }
        first = false;
    }
    if first {
        write!(f, "0")?;
    }
    Ok(())
}

impl fmt::Display for LpProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.objective.sense {
            Sense::Minimize => "minimize",
            Sense::Maximize => "maximize",
        };
        write!(f, "{} ", verb)?;
        fmt_terms(f, &self.objective.coefficients, &self.variables)?;
        writeln!(f)?;
        writeln!(f, "subject to")?;
        for c in &self.constraints {
            write!(f, "  {}: ", c.name)?;
            fmt_terms(f, &c.coefficients, &self.variables)?;
            writeln!(f, " {} {}", c.relation.symbol(), c.rhs)?;
        }
        write!(f, "  {} >= 0", self.variables.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let mut problem = LpProblem::new(vec!["x".to_string(), "y".to_string()]);
        problem.maximize(vec![3.0, -1.0]);
        problem.add_constraint("cap", vec![1.0, 2.0], Relation::Le, 10.0);
        problem.add_constraint("floor", vec![0.0, 1.0], Relation::Ge, 1.0);

        let text = problem.to_string();
        assert!(text.starts_with("maximize 3 x - y"), "got: {}", text);
        assert!(text.contains("cap: x + 2 y <= 10"), "got: {}", text);
        assert!(text.contains("floor: y >= 1"), "got: {}", text);
        assert!(text.ends_with("x, y >= 0"), "got: {}", text);
    }
}
