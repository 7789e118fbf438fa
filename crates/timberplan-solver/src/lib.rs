mod problem;
mod simplex;
mod solution;

pub use problem::{Constraint, LpProblem, Objective, Relation, Sense};
pub use simplex::{Simplex, SolverError};
pub use solution::{Duals, ReducedCost, ShadowPrice, SolveStatus, Solution};
