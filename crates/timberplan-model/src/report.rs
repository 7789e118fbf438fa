use timberplan_solver::{Solution, SolveStatus};

use crate::build::{Column, PlanLp, Row};
use crate::scenario::Scenario;

/// A production plan unflattened from the solver's value vector.
///
/// Every LP column lands in exactly one row here; totals are recomputed from
/// the rows, which at an optimum agree with the solver's objective value.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone)]
pub struct PlanReport {
    pub scenario: String,
    pub status: SolveStatus,
    pub production: Vec<ProductionRow>,
    pub usage: Vec<UsageRow>,
    pub totals: Totals,
    /// Dual interpretation, present only for optimal solutions
    pub analysis: Option<Analysis>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone)]
pub struct ProductionRow {
    pub product: String,
    pub quantity: f64,
    pub revenue: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone)]
pub struct UsageRow {
    pub material: String,
    pub product: String,
    pub quantity: f64,
    pub cost: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone)]
pub struct Totals {
    pub revenue: f64,
    pub material_cost: f64,
    pub net_revenue: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone)]
pub struct Analysis {
    pub binding: Vec<BindingNote>,
    pub reduced_costs: Vec<ReducedCostNote>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone)]
pub struct BindingNote {
    pub constraint: String,
    pub shadow_price: f64,
    pub note: String,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone)]
pub struct ReducedCostNote {
    pub variable: String,
    pub reduced_cost: f64,
    pub note: String,
}

const NOTE_TOLERANCE: f64 = 1e-6;

impl PlanReport {
    pub fn from_solution(scenario: &Scenario, plan: &PlanLp, solution: &Solution) -> Self {
        let value = |j: usize| solution.values.get(j).copied().unwrap_or(0.0);

        let mut production = Vec::new();
        let mut usage = Vec::new();
        for (j, col) in plan.columns.iter().enumerate() {
            match *col {
                Column::Production { product } => {
                    let p = &scenario.products[product];
                    let quantity = value(j);
                    production.push(ProductionRow {
                        product: p.label().to_string(),
                        quantity,
                        revenue: quantity * p.unit_price,
                    });
                }
                Column::Usage { material, product } => {
                    let m = &scenario.materials[material];
                    let quantity = value(j);
                    usage.push(UsageRow {
                        material: m.label().to_string(),
                        product: scenario.products[product].label().to_string(),
                        quantity,
                        cost: quantity * m.unit_cost,
                    });
                }
            }
        }

        let revenue: f64 = production.iter().map(|r| r.revenue).sum();
        let material_cost: f64 = usage.iter().map(|r| r.cost).sum();

        let analysis = solution
            .is_optimal()
            .then(|| Self::analysis(scenario, plan, solution));

        PlanReport {
            scenario: scenario
                .title
                .clone()
                .unwrap_or_else(|| "untitled".to_string()),
            status: solution.status,
            production,
            usage,
            totals: Totals {
                revenue,
                material_cost,
                net_revenue: revenue - material_cost,
            },
            analysis,
        }
    }

    fn analysis(scenario: &Scenario, plan: &PlanLp, solution: &Solution) -> Analysis {
        let mut binding = Vec::new();
        for (i, sp) in solution.duals.shadow_prices.iter().enumerate() {
            if sp.value.abs() < NOTE_TOLERANCE {
                continue;
            }
            let note = match plan.rows[i] {
                // Balance rows are equalities, tight by definition; their
                // duals are internal transfer prices, not worth a headline.
                Row::Balance { .. } => continue,
                Row::Supply { material } => {
                    let m = &scenario.materials[material];
                    format!(
                        "one more {} of {} is worth {:.2} in net revenue",
                        m.unit.as_deref().unwrap_or("unit"),
                        m.label(),
                        sp.value
                    )
                }
                Row::Minimum { product } => {
                    let p = &scenario.products[product];
                    format!(
                        "each unit of the {} minimum changes net revenue by {:.2}",
                        p.label(),
                        sp.value
                    )
                }
            };
            binding.push(BindingNote {
                constraint: sp.constraint.clone(),
                shadow_price: sp.value,
                note,
            });
        }

        let reduced_costs = solution
            .duals
            .reduced_costs
            .iter()
            .filter(|rc| !rc.is_basic && rc.reduced_cost.abs() > NOTE_TOLERANCE)
            .map(|rc| ReducedCostNote {
                variable: rc.variable.clone(),
                reduced_cost: rc.reduced_cost,
                note: format!(
                    "{} stays out of the plan until its margin improves by {:.2}",
                    rc.variable,
                    rc.reduced_cost.abs()
                ),
            })
            .collect();

        Analysis {
            binding,
            reduced_costs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::build_lp;
    use timberplan_solver::Simplex;

    fn assert_near(actual: f64, expected: f64, tol: f64, what: &str) {
        assert!(
            (actual - expected).abs() < tol,
            "{} = {} (expected {})",
            what,
            actual,
            expected
        );
    }

    fn solve_sawmill() -> (Scenario, PlanLp, Solution) {
        let scenario = Scenario::sawmill();
        let plan = build_lp(&scenario).unwrap();
        let solution = Simplex::new().solve(&plan.problem).unwrap();
        (scenario, plan, solution)
    }

    #[test]
    fn test_sawmill_optimum() {
        let (scenario, plan, solution) = solve_sawmill();
        assert_eq!(solution.status, SolveStatus::Optimal);

        let report = PlanReport::from_solution(&scenario, &plan, &solution);

        // Pine runs out at 3500 + 500 and birch at 3500 + 2500; the mill
        // makes 3500/3 plywood and 500 board.
        assert_eq!(report.production.len(), 2);
        assert_near(report.production[0].quantity, 3500.0 / 3.0, 1e-6, "plywood");
        assert_near(report.production[1].quantity, 500.0, 1e-6, "board");

        assert_eq!(report.usage.len(), 4);
        assert_near(report.usage[0].quantity, 3500.0, 1e-6, "pine->plywood");
        assert_near(report.usage[1].quantity, 500.0, 1e-6, "pine->board");
        assert_near(report.usage[2].quantity, 3500.0, 1e-6, "birch->plywood");
        assert_near(report.usage[3].quantity, 2500.0, 1e-6, "birch->board");

        assert_near(
            report.totals.net_revenue,
            4_040_000.0 / 3.0,
            1e-3,
            "net revenue",
        );
        assert_near(
            report.totals.net_revenue,
            solution.objective_value,
            1e-6,
            "totals vs objective",
        );
        assert_near(report.totals.revenue, 2_746_666.667, 1e-2, "revenue");
        assert_near(report.totals.material_cost, 1_400_000.0, 1e-3, "cost");
    }

    #[test]
    fn test_sawmill_analysis() {
        let (scenario, plan, solution) = solve_sawmill();
        let report = PlanReport::from_solution(&scenario, &plan, &solution);

        let analysis = report.analysis.expect("optimal solve has analysis");

        // Both wood supplies are binding; the contractual minimums are slack.
        let names: Vec<&str> = analysis.binding.iter().map(|b| b.constraint.as_str()).collect();
        assert!(names.contains(&"pine_supply"), "{names:?}");
        assert!(names.contains(&"birch_supply"), "{names:?}");
        assert!(!names.iter().any(|n| n.ends_with("_min")), "{names:?}");

        let pine = analysis
            .binding
            .iter()
            .find(|b| b.constraint == "pine_supply")
            .unwrap();
        let birch = analysis
            .binding
            .iter()
            .find(|b| b.constraint == "birch_supply")
            .unwrap();
        assert_near(pine.shadow_price, 800.0 / 3.0, 1e-3, "pine shadow price");
        assert_near(birch.shadow_price, 140.0 / 3.0, 1e-3, "birch shadow price");
    }

    #[test]
    fn test_infeasible_scenario() {
        // Minimums that cannot fit in the pine supply.
        let mut scenario = Scenario::sawmill();
        scenario.products[1].min_production = 5000.0;

        let plan = build_lp(&scenario).unwrap();
        let solution = Simplex::new().solve(&plan.problem).unwrap();
        assert_eq!(solution.status, SolveStatus::Infeasible);

        let report = PlanReport::from_solution(&scenario, &plan, &solution);
        assert_eq!(report.status, SolveStatus::Infeasible);
        assert!(report.analysis.is_none());
        assert_near(report.totals.net_revenue, 0.0, 1e-9, "net revenue");
    }
}
