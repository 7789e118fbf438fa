use timberplan_solver::{LpProblem, Relation};

use crate::scenario::{ModelError, Scenario};

/// What an LP column stands for; indices point into the scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    /// Production quantity of a product
    Production { product: usize },
    /// Quantity of a material consumed by a product
    Usage { material: usize, product: usize },
}

/// What an LP row enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Row {
    /// Total usage of a material stays within its supply
    Supply { material: usize },
    /// Production meets the product's contractual minimum
    Minimum { product: usize },
    /// Usage of a material tracks production at the conversion ratio
    Balance { material: usize, product: usize },
}

/// An LP instance plus the maps tying its columns and rows back to the
/// scenario. The report builder inverts `columns` to unflatten the solver's
/// value vector.
#[derive(Debug, Clone)]
pub struct PlanLp {
    pub problem: LpProblem,
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
}

/// Translate a scenario into an LP instance.
///
/// One production variable per product, one usage variable per declared
/// (material, product) input pair. Rows: a supply limit per material, a
/// minimum per product, and a balance equation per usage variable. The
/// objective maximizes revenue minus material cost; non-negativity is
/// implicit in the solver's standard form.
pub fn build_lp(scenario: &Scenario) -> Result<PlanLp, ModelError> {
    scenario.validate()?;

    let n_products = scenario.products.len();

    // Usage columns follow the production block, grouped by material.
    let mut usages: Vec<(usize, usize, f64)> = Vec::new();
    for (mi, m) in scenario.materials.iter().enumerate() {
        for (pi, p) in scenario.products.iter().enumerate() {
            if let Some(amount) = p.input_amount(&m.key) {
                usages.push((mi, pi, amount));
            }
        }
    }

    let mut columns: Vec<Column> = Vec::with_capacity(n_products + usages.len());
    let mut names: Vec<String> = Vec::with_capacity(columns.capacity());
    for (pi, p) in scenario.products.iter().enumerate() {
        columns.push(Column::Production { product: pi });
        names.push(p.key.clone());
    }
    for &(mi, pi, _) in &usages {
        columns.push(Column::Usage {
            material: mi,
            product: pi,
        });
        names.push(format!(
            "{}->{}",
            scenario.materials[mi].key, scenario.products[pi].key
        ));
    }

    let n = columns.len();
    let mut problem = LpProblem::new(names);

    // Net revenue: price per unit produced minus cost per unit consumed.
    let coefficients = columns
        .iter()
        .map(|col| match *col {
            Column::Production { product } => scenario.products[product].unit_price,
            Column::Usage { material, .. } => -scenario.materials[material].unit_cost,
        })
        .collect();
    problem.maximize(coefficients);

    let mut rows = Vec::with_capacity(scenario.materials.len() + n_products + usages.len());

    for (mi, m) in scenario.materials.iter().enumerate() {
        let mut coeffs = vec![0.0; n];
        for (k, &(umi, _, _)) in usages.iter().enumerate() {
            if umi == mi {
                coeffs[n_products + k] = 1.0;
            }
        }
        problem.add_constraint(format!("{}_supply", m.key), coeffs, Relation::Le, m.supply);
        rows.push(Row::Supply { material: mi });
    }

    for (pi, p) in scenario.products.iter().enumerate() {
        let mut coeffs = vec![0.0; n];
        coeffs[pi] = 1.0;
        problem.add_constraint(
            format!("{}_min", p.key),
            coeffs,
            Relation::Ge,
            p.min_production,
        );
        rows.push(Row::Minimum { product: pi });
    }

    for (k, &(mi, pi, amount)) in usages.iter().enumerate() {
        let mut coeffs = vec![0.0; n];
        coeffs[n_products + k] = 1.0;
        coeffs[pi] = -amount;
        problem.add_constraint(
            format!(
                "{}_{}_balance",
                scenario.materials[mi].key, scenario.products[pi].key
            ),
            coeffs,
            Relation::Eq,
            0.0,
        );
        rows.push(Row::Balance {
            material: mi,
            product: pi,
        });
    }

    Ok(PlanLp {
        problem,
        columns,
        rows,
    })
}
