/// The result of solving an LP problem
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Solution {
    pub status: SolveStatus,
    /// Value for each variable, in problem column order
    pub values: Vec<f64>,
    /// Objective value under the original coefficients
    pub objective_value: f64,
    /// Dual information, populated only for optimal solutions
    pub duals: Duals,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// An optimal solution was found
    Optimal,
    /// No point satisfies all constraints
    Infeasible,
    /// The objective can be improved without bound
    Unbounded,
    /// The pivot cap was reached before optimality was proven
    IterationLimit,
}

/// Dual values at the optimum.
///
/// Shadow prices are stated in terms of the original objective: the change in
/// objective value per unit increase of a constraint's right-hand side.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default)]
pub struct Duals {
    pub shadow_prices: Vec<ShadowPrice>,
    pub reduced_costs: Vec<ReducedCost>,
    /// Names of constraints that are tight at the optimum with a nonzero dual
    pub binding: Vec<String>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct ShadowPrice {
    pub constraint: String,
    pub value: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct ReducedCost {
    pub variable: String,
    /// Value in the solution
    pub value: f64,
    /// How far the variable's objective coefficient is from letting it enter
    /// the basis; zero for basic variables
    pub reduced_cost: f64,
    pub is_basic: bool,
}

impl Solution {
    pub fn infeasible() -> Self {
        Self {
            status: SolveStatus::Infeasible,
            values: Vec::new(),
            objective_value: f64::NAN,
            duals: Duals::default(),
        }
    }

    pub fn unbounded() -> Self {
        Self {
            status: SolveStatus::Unbounded,
            values: Vec::new(),
            objective_value: f64::NAN,
            duals: Duals::default(),
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolveStatus::Optimal
    }
}
