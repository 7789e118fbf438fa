use thiserror::Error;

use crate::problem::{LpProblem, Relation, Sense};
use crate::solution::{Duals, ReducedCost, ShadowPrice, SolveStatus, Solution};

#[derive(Error, Debug)]
pub enum SolverError {
    #[error("constraint `{name}` has {got} coefficients, expected {expected}")]
    ConstraintWidth {
        name: String,
        got: usize,
        expected: usize,
    },
    #[error("objective has {got} coefficients, expected {expected}")]
    ObjectiveWidth { got: usize, expected: usize },
}

/// Two-phase primal simplex over a dense tableau.
///
/// Entering columns follow Bland's rule, so degenerate bases (equality rows
/// with zero right-hand sides are routine in production-planning models)
/// cannot cycle.
pub struct Simplex {
    /// Maximum pivots across both phases
    max_iterations: usize,
    /// Tolerance for floating point comparisons
    tolerance: f64,
}

impl Default for Simplex {
    fn default() -> Self {
        Self {
            max_iterations: 10_000,
            tolerance: 1e-9,
        }
    }
}

enum PivotOutcome {
    Optimal,
    Unbounded,
    IterationLimit,
}

enum Phase1Outcome {
    Feasible,
    Infeasible,
    IterationLimit,
}

impl Simplex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn solve(&self, problem: &LpProblem) -> Result<Solution, SolverError> {
        let mut tableau = Tableau::build(problem)?;

        if tableau.n_artificial > 0 {
            match self.phase1(&mut tableau) {
                Phase1Outcome::Feasible => {}
                Phase1Outcome::Infeasible => return Ok(Solution::infeasible()),
                Phase1Outcome::IterationLimit => {
                    return Ok(self.extract(&tableau, problem, SolveStatus::IterationLimit));
                }
            }
        }

        // Phase 2: optimize the real objective, never entering on an
        // artificial column.
        let structural_cols = tableau.n_vars + tableau.n_slack;
        let status = match self.optimize(&mut tableau, structural_cols) {
            PivotOutcome::Optimal => SolveStatus::Optimal,
            PivotOutcome::Unbounded => return Ok(Solution::unbounded()),
            PivotOutcome::IterationLimit => SolveStatus::IterationLimit,
        };

        Ok(self.extract(&tableau, problem, status))
    }

    /// Pivot until no entering column remains among the first `limit` columns.
    fn optimize(&self, t: &mut Tableau, limit: usize) -> PivotOutcome {
        for _ in 0..self.max_iterations {
            let Some(col) = self.entering(t, limit) else {
                return PivotOutcome::Optimal;
            };
            let Some(row) = self.leaving(t, col) else {
                return PivotOutcome::Unbounded;
            };
            t.pivot(row, col);
        }
        PivotOutcome::IterationLimit
    }

    /// Bland's rule: the lowest-index column that can improve the objective.
    fn entering(&self, t: &Tableau, limit: usize) -> Option<usize> {
        let obj = t.rows.len() - 1;
        (0..limit).find(|&j| t.rows[obj][j] > self.tolerance)
    }

    /// Minimum-ratio test; ties break toward the smallest basic index.
    fn leaving(&self, t: &Tableau, col: usize) -> Option<usize> {
        let rhs_col = t.rows[0].len() - 1;
        let mut best: Option<(usize, f64)> = None;

        for i in 0..t.basis.len() {
            let val = t.rows[i][col];
            if val <= self.tolerance {
                continue;
            }
            let ratio = t.rows[i][rhs_col] / val;
            best = match best {
                None => Some((i, ratio)),
                Some((_, r)) if ratio < r - 1e-12 => Some((i, ratio)),
                Some((row, r)) if (ratio - r).abs() <= 1e-12 && t.basis[i] < t.basis[row] => {
                    Some((i, ratio))
                }
                other => other,
            };
        }

        best.map(|(row, _)| row)
    }

    /// Drive the artificial variables to zero under an auxiliary objective.
    fn phase1(&self, t: &mut Tableau) -> Phase1Outcome {
        let obj = t.rows.len() - 1;
        let n_cols = t.rows[0].len();
        let art_start = t.n_vars + t.n_slack;

        let saved = t.rows[obj].clone();

        // Auxiliary objective: maximize -(sum of artificials).
        for v in t.rows[obj].iter_mut() {
            *v = 0.0;
        }
        for j in art_start..art_start + t.n_artificial {
            t.rows[obj][j] = -1.0;
        }
        // Cancel the -1 entries of artificials that start in the basis.
        for i in 0..t.basis.len() {
            if t.basis[i] >= art_start {
                for j in 0..n_cols {
                    t.rows[obj][j] += t.rows[i][j];
                }
            }
        }

        // The auxiliary objective is bounded above by zero; an unbounded
        // report cannot occur on a well-formed tableau.
        if let PivotOutcome::IterationLimit = self.optimize(t, n_cols - 1) {
            return Phase1Outcome::IterationLimit;
        }

        let rhs_col = n_cols - 1;
        for i in 0..t.basis.len() {
            if t.basis[i] >= art_start && t.rows[i][rhs_col].abs() > self.tolerance {
                return Phase1Outcome::Infeasible;
            }
        }

        // Pivot any leftover artificial out of the basis. Its value is zero
        // here, so the pivot does not move the solution; a row with no other
        // nonzero entry is redundant and keeps its artificial at zero.
        for i in 0..t.basis.len() {
            if t.basis[i] < art_start {
                continue;
            }
            if let Some(col) = (0..art_start).find(|&j| t.rows[i][j].abs() > self.tolerance) {
                t.pivot(i, col);
            }
        }

        // Restore the real objective and re-reduce it against the basis.
        t.rows[obj] = saved;
        for i in 0..t.basis.len() {
            let factor = t.rows[obj][t.basis[i]];
            if factor.abs() > self.tolerance {
                for j in 0..n_cols {
                    t.rows[obj][j] -= factor * t.rows[i][j];
                }
            }
        }

        Phase1Outcome::Feasible
    }

    fn extract(&self, t: &Tableau, problem: &LpProblem, status: SolveStatus) -> Solution {
        let n_vars = problem.num_variables();
        let rhs_col = t.rows[0].len() - 1;

        let mut values = vec![0.0; n_vars];
        for (i, &basic) in t.basis.iter().enumerate() {
            if basic < n_vars {
                values[basic] = t.rows[i][rhs_col];
            }
        }

        let objective_value = problem
            .objective
            .coefficients
            .iter()
            .zip(&values)
            .map(|(c, v)| c * v)
            .sum();

        let duals = if status == SolveStatus::Optimal {
            self.duals(t, problem, &values)
        } else {
            Duals::default()
        };

        Solution {
            status,
            values,
            objective_value,
            duals,
        }
    }

    /// Read dual values off the final objective row.
    ///
    /// Each constraint row recorded the column of its slack (or artificial)
    /// variable at build time; that column is a unit column of the row, so its
    /// final reduced cost is the negated tableau dual. The sense factor maps
    /// tableau duals (the tableau always maximizes) back to the original
    /// objective, so a shadow price is ∂objective/∂rhs as the caller wrote it.
    fn duals(&self, t: &Tableau, problem: &LpProblem, values: &[f64]) -> Duals {
        let obj = t.rows.len() - 1;
        let sense = match problem.objective.sense {
            Sense::Maximize => 1.0,
            Sense::Minimize => -1.0,
        };

        let mut shadow_prices = Vec::with_capacity(problem.num_constraints());
        for (i, c) in problem.constraints.iter().enumerate() {
            let (col, row_sign) = t.dual_cols[i];
            let value = sense * row_sign * -t.rows[obj][col];
            shadow_prices.push(ShadowPrice {
                constraint: c.name.clone(),
                value,
            });
        }

        let reduced_costs = problem
            .variables
            .iter()
            .enumerate()
            .map(|(j, var)| {
                let is_basic = t.basis.contains(&j);
                ReducedCost {
                    variable: var.clone(),
                    value: values[j],
                    reduced_cost: if is_basic { 0.0 } else { sense * t.rows[obj][j] },
                    is_basic,
                }
            })
            .collect();

        let binding = shadow_prices
            .iter()
            .filter(|sp| sp.value.abs() > self.tolerance)
            .map(|sp| sp.constraint.clone())
            .collect();

        Duals {
            shadow_prices,
            reduced_costs,
            binding,
        }
    }
}

struct Tableau {
    /// Constraint rows followed by the objective row; last column is the RHS
    rows: Vec<Vec<f64>>,
    /// Basic column per constraint row
    basis: Vec<usize>,
    n_vars: usize,
    n_slack: usize,
    n_artificial: usize,
    /// Per constraint row: the unit column its dual is read from, and the row
    /// sign (-1.0 if the row was negated to make the RHS non-negative)
    dual_cols: Vec<(usize, f64)>,
}

impl Tableau {
    fn build(problem: &LpProblem) -> Result<Tableau, SolverError> {
        let n_vars = problem.num_variables();
        let n_constraints = problem.num_constraints();

        if problem.objective.coefficients.len() != n_vars {
            return Err(SolverError::ObjectiveWidth {
                got: problem.objective.coefficients.len(),
                expected: n_vars,
            });
        }

        // Normalize rows to a non-negative RHS; negating flips the relation.
        let mut normalized = Vec::with_capacity(n_constraints);
        for c in &problem.constraints {
            if c.coefficients.len() != n_vars {
                return Err(SolverError::ConstraintWidth {
                    name: c.name.clone(),
                    got: c.coefficients.len(),
                    expected: n_vars,
                });
            }
            let mut coefficients = c.coefficients.clone();
            let mut relation = c.relation;
            let mut rhs = c.rhs;
            let mut row_sign = 1.0;
            if rhs < 0.0 {
                for v in coefficients.iter_mut() {
                    *v = -*v;
                }
                rhs = -rhs;
                row_sign = -1.0;
                relation = match relation {
                    Relation::Le => Relation::Ge,
                    Relation::Ge => Relation::Le,
                    Relation::Eq => Relation::Eq,
                };
            }
            normalized.push((coefficients, relation, rhs, row_sign));
        }

        let mut n_slack = 0;
        let mut n_artificial = 0;
        for (_, relation, _, _) in &normalized {
            match relation {
                Relation::Le => n_slack += 1,
                Relation::Ge => {
                    n_slack += 1; // surplus
                    n_artificial += 1;
                }
                Relation::Eq => n_artificial += 1,
            }
        }

        let n_cols = n_vars + n_slack + n_artificial + 1;
        let mut tableau = Tableau {
            rows: vec![vec![0.0; n_cols]; n_constraints + 1],
            basis: vec![0; n_constraints],
            n_vars,
            n_slack,
            n_artificial,
            dual_cols: Vec::with_capacity(n_constraints),
        };

        let mut slack_idx = n_vars;
        let mut artificial_idx = n_vars + n_slack;

        for (i, (coefficients, relation, rhs, row_sign)) in normalized.into_iter().enumerate() {
            tableau.rows[i][..n_vars].copy_from_slice(&coefficients);
            tableau.rows[i][n_cols - 1] = rhs;

            match relation {
                Relation::Le => {
                    tableau.rows[i][slack_idx] = 1.0;
                    tableau.basis[i] = slack_idx;
                    tableau.dual_cols.push((slack_idx, row_sign));
                    slack_idx += 1;
                }
                Relation::Ge => {
                    tableau.rows[i][slack_idx] = -1.0; // surplus
                    slack_idx += 1;
                    tableau.rows[i][artificial_idx] = 1.0;
                    tableau.basis[i] = artificial_idx;
                    tableau.dual_cols.push((artificial_idx, row_sign));
                    artificial_idx += 1;
                }
                Relation::Eq => {
                    tableau.rows[i][artificial_idx] = 1.0;
                    tableau.basis[i] = artificial_idx;
                    tableau.dual_cols.push((artificial_idx, row_sign));
                    artificial_idx += 1;
                }
            }
        }

        // The tableau maximizes; negate the coefficients for minimization.
        let obj = n_constraints;
        for (j, &coef) in problem.objective.coefficients.iter().enumerate() {
            tableau.rows[obj][j] = match problem.objective.sense {
                Sense::Maximize => coef,
                Sense::Minimize => -coef,
            };
        }

        Ok(tableau)
    }

    fn pivot(&mut self, row: usize, col: usize) {
        let n_rows = self.rows.len();
        let n_cols = self.rows[0].len();

        self.basis[row] = col;

        let pivot_val = self.rows[row][col];
        for j in 0..n_cols {
            self.rows[row][j] /= pivot_val;
        }

        for i in 0..n_rows {
            if i == row {
                continue;
            }
            let factor = self.rows[i][col];
            if factor == 0.0 {
                continue;
            }
            for j in 0..n_cols {
                self.rows[i][j] -= factor * self.rows[row][j];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::LpProblem;

    fn assert_near(actual: f64, expected: f64, what: &str) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "{} = {} (expected {})",
            what,
            actual,
            expected
        );
    }

    #[test]
    fn test_simple_maximization() {
        // Maximize: 3x + 2y
        // Subject to:
        //   x + y <= 4
        //   x <= 3
        //   y <= 3
        // Optimal: x=3, y=1, obj=11
        let mut problem = LpProblem::new(vec!["x".to_string(), "y".to_string()]);
        problem.maximize(vec![3.0, 2.0]);
        problem.add_constraint("sum", vec![1.0, 1.0], Relation::Le, 4.0);
        problem.add_constraint("x_max", vec![1.0, 0.0], Relation::Le, 3.0);
        problem.add_constraint("y_max", vec![0.0, 1.0], Relation::Le, 3.0);

        let solution = Simplex::new().solve(&problem).unwrap();

        assert_eq!(solution.status, SolveStatus::Optimal);
        assert_near(solution.values[0], 3.0, "x");
        assert_near(solution.values[1], 1.0, "y");
        assert_near(solution.objective_value, 11.0, "obj");
    }

    #[test]
    fn test_minimization_with_ge() {
        // Minimize: 2x + 3y
        // Subject to:
        //   x + y >= 4
        //   x <= 3
        //   y <= 3
        // Optimal: x=3, y=1, obj=9
        let mut problem = LpProblem::new(vec!["x".to_string(), "y".to_string()]);
        problem.minimize(vec![2.0, 3.0]);
        problem.add_constraint("sum", vec![1.0, 1.0], Relation::Ge, 4.0);
        problem.add_constraint("x_max", vec![1.0, 0.0], Relation::Le, 3.0);
        problem.add_constraint("y_max", vec![0.0, 1.0], Relation::Le, 3.0);

        let solution = Simplex::new().solve(&problem).unwrap();

        assert_eq!(solution.status, SolveStatus::Optimal);
        assert_near(solution.values[0], 3.0, "x");
        assert_near(solution.values[1], 1.0, "y");
        assert_near(solution.objective_value, 9.0, "obj");

        // Raising the >= 4 floor by one unit costs 3 (another unit of y);
        // relaxing x <= 3 saves 1 by swapping y for x.
        assert_near(solution.duals.shadow_prices[0].value, 3.0, "dual(sum)");
        assert_near(solution.duals.shadow_prices[1].value, -1.0, "dual(x_max)");
        assert!(solution.duals.binding.contains(&"sum".to_string()));
    }

    #[test]
    fn test_equality_duals() {
        // Maximize: 3x + 2y
        // Subject to:
        //   x + y = 4
        //   x <= 3
        // Optimal: x=3, y=1, obj=11; duals 2 and 1
        let mut problem = LpProblem::new(vec!["x".to_string(), "y".to_string()]);
        problem.maximize(vec![3.0, 2.0]);
        problem.add_constraint("total", vec![1.0, 1.0], Relation::Eq, 4.0);
        problem.add_constraint("x_max", vec![1.0, 0.0], Relation::Le, 3.0);

        let solution = Simplex::new().solve(&problem).unwrap();

        assert_eq!(solution.status, SolveStatus::Optimal);
        assert_near(solution.values[0], 3.0, "x");
        assert_near(solution.values[1], 1.0, "y");
        assert_near(solution.objective_value, 11.0, "obj");
        assert_near(solution.duals.shadow_prices[0].value, 2.0, "dual(total)");
        assert_near(solution.duals.shadow_prices[1].value, 1.0, "dual(x_max)");
    }

    #[test]
    fn test_infeasible() {
        // x >= 5 and x <= 3
        let mut problem = LpProblem::new(vec!["x".to_string()]);
        problem.minimize(vec![1.0]);
        problem.add_constraint("lower", vec![1.0], Relation::Ge, 5.0);
        problem.add_constraint("upper", vec![1.0], Relation::Le, 3.0);

        let solution = Simplex::new().solve(&problem).unwrap();

        assert_eq!(solution.status, SolveStatus::Infeasible);
        assert!(solution.values.is_empty());
    }

    #[test]
    fn test_unbounded() {
        // Maximize x with only a floor on x
        let mut problem = LpProblem::new(vec!["x".to_string()]);
        problem.maximize(vec![1.0]);
        problem.add_constraint("floor", vec![1.0], Relation::Ge, 1.0);

        let solution = Simplex::new().solve(&problem).unwrap();

        assert_eq!(solution.status, SolveStatus::Unbounded);
    }

    #[test]
    fn test_negative_rhs_normalization() {
        // x - y <= -2 is x >= ... with a negated row; optimal pushes y up
        // Minimize y subject to y - x >= 2, x >= 1  =>  x=1, y=3
        let mut problem = LpProblem::new(vec!["x".to_string(), "y".to_string()]);
        problem.minimize(vec![0.0, 1.0]);
        problem.add_constraint("gap", vec![1.0, -1.0], Relation::Le, -2.0);
        problem.add_constraint("x_min", vec![1.0, 0.0], Relation::Ge, 1.0);

        let solution = Simplex::new().solve(&problem).unwrap();

        assert_eq!(solution.status, SolveStatus::Optimal);
        assert_near(solution.values[0], 1.0, "x");
        assert_near(solution.values[1], 3.0, "y");
    }

    #[test]
    fn test_constraint_width_error() {
        let mut problem = LpProblem::new(vec!["x".to_string(), "y".to_string()]);
        problem.maximize(vec![1.0, 1.0]);
        problem.add_constraint("short", vec![1.0], Relation::Le, 1.0);

        let err = Simplex::new().solve(&problem).unwrap_err();
        assert!(matches!(err, SolverError::ConstraintWidth { .. }), "{err}");
    }
}
