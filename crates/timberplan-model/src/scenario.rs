use std::collections::HashSet;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("scenario has no materials")]
    NoMaterials,
    #[error("scenario has no products")]
    NoProducts,
    #[error("duplicate material key `{0}`")]
    DuplicateMaterial(String),
    #[error("duplicate product key `{0}`")]
    DuplicateProduct(String),
    #[error("product `{product}` consumes unknown material `{material}`")]
    UnknownMaterial { product: String, material: String },
    #[error("product `{product}` lists material `{material}` more than once")]
    DuplicateInput { product: String, material: String },
    #[error("product `{product}` declares a non-positive amount of `{material}`")]
    NonPositiveInput { product: String, material: String },
    #[error("material `{0}` has a negative supply")]
    NegativeSupply(String),
    #[error("product `{0}` has a negative minimum production")]
    NegativeMinimum(String),
    #[error(
        "minimum production alone consumes {needed} of `{material}` but only {supply} is available"
    )]
    MinimumsExceedSupply {
        material: String,
        needed: f64,
        supply: f64,
    },
}

/// A raw material the mill buys: priced per unit, limited in supply.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Material {
    pub key: String,
    /// Display name; falls back to the key
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: Option<String>,
    /// Unit of measure, e.g. "m3"
    #[cfg_attr(feature = "serde", serde(default))]
    pub unit: Option<String>,
    /// Purchase cost per unit
    pub unit_cost: f64,
    /// Units available in the planning period
    pub supply: f64,
}

/// Material consumed per unit of a product.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Input {
    /// Key of the consumed material
    pub material: String,
    /// Units of the material per unit of product
    pub amount: f64,
}

/// A finished product: priced per unit, with a contractual minimum and a
/// recipe of material inputs.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Product {
    pub key: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub unit: Option<String>,
    /// Selling price per unit
    pub unit_price: f64,
    /// Units that must be produced regardless of profitability
    #[cfg_attr(feature = "serde", serde(default))]
    pub min_production: f64,
    pub inputs: Vec<Input>,
}

/// The full parameter table for one planning problem.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Scenario {
    #[cfg_attr(feature = "serde", serde(default))]
    pub title: Option<String>,
    pub materials: Vec<Material>,
    pub products: Vec<Product>,
}

impl Material {
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.key)
    }
}

impl Product {
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.key)
    }

    /// Units of the given material consumed per unit of this product.
    pub fn input_amount(&self, material_key: &str) -> Option<f64> {
        self.inputs
            .iter()
            .find(|i| i.material == material_key)
            .map(|i| i.amount)
    }
}

impl Scenario {
    /// The worked example: a sawmill turning pine and birch logs into plywood
    /// and board under supply limits and contractual minimums.
    pub fn sawmill() -> Self {
        Self {
            title: Some("Sawmill production".to_string()),
            materials: vec![
                Material {
                    key: "pine".to_string(),
                    name: Some("Pine logs".to_string()),
                    unit: Some("m3".to_string()),
                    unit_cost: 200.0,
                    supply: 4000.0,
                },
                Material {
                    key: "birch".to_string(),
                    name: Some("Birch logs".to_string()),
                    unit: Some("m3".to_string()),
                    unit_cost: 100.0,
                    supply: 6000.0,
                },
            ],
            products: vec![
                Product {
                    key: "plywood".to_string(),
                    name: Some("Plywood".to_string()),
                    unit: Some("unit".to_string()),
                    unit_price: 1840.0,
                    min_production: 200.0,
                    inputs: vec![
                        Input {
                            material: "pine".to_string(),
                            amount: 3.0,
                        },
                        Input {
                            material: "birch".to_string(),
                            amount: 3.0,
                        },
                    ],
                },
                Product {
                    key: "board".to_string(),
                    name: Some("Board".to_string()),
                    unit: Some("unit".to_string()),
                    unit_price: 1200.0,
                    min_production: 400.0,
                    inputs: vec![
                        Input {
                            material: "pine".to_string(),
                            amount: 1.0,
                        },
                        Input {
                            material: "birch".to_string(),
                            amount: 5.0,
                        },
                    ],
                },
            ],
        }
    }

    /// Structural validity; the first problem found, if any.
    pub fn validate(&self) -> Result<(), ModelError> {
        match self.structural_problems().into_iter().next() {
            Some(problem) => Err(problem),
            None => Ok(()),
        }
    }

    /// Every problem in the scenario. Structural problems come first; when
    /// the structure is sound, the feasibility screen runs too.
    pub fn check(&self) -> Vec<ModelError> {
        let mut problems = self.structural_problems();
        if problems.is_empty() {
            problems.extend(self.feasibility_screen());
        }
        problems
    }

    fn structural_problems(&self) -> Vec<ModelError> {
        let mut problems = Vec::new();

        if self.materials.is_empty() {
            problems.push(ModelError::NoMaterials);
        }
        if self.products.is_empty() {
            problems.push(ModelError::NoProducts);
        }

        let mut seen_materials = HashSet::new();
        for m in &self.materials {
            if !seen_materials.insert(m.key.as_str()) {
                problems.push(ModelError::DuplicateMaterial(m.key.clone()));
            }
            if m.supply < 0.0 {
                problems.push(ModelError::NegativeSupply(m.key.clone()));
            }
        }

        let material_keys: HashSet<&str> = self.materials.iter().map(|m| m.key.as_str()).collect();
        let mut seen_products = HashSet::new();
        for p in &self.products {
            if !seen_products.insert(p.key.as_str()) {
                problems.push(ModelError::DuplicateProduct(p.key.clone()));
            }
            if p.min_production < 0.0 {
                problems.push(ModelError::NegativeMinimum(p.key.clone()));
            }
            let mut seen_inputs = HashSet::new();
            for input in &p.inputs {
                if !material_keys.contains(input.material.as_str()) {
                    problems.push(ModelError::UnknownMaterial {
                        product: p.key.clone(),
                        material: input.material.clone(),
                    });
                }
                if !seen_inputs.insert(input.material.as_str()) {
                    problems.push(ModelError::DuplicateInput {
                        product: p.key.clone(),
                        material: input.material.clone(),
                    });
                }
                if input.amount <= 0.0 {
                    problems.push(ModelError::NonPositiveInput {
                        product: p.key.clone(),
                        material: input.material.clone(),
                    });
                }
            }
        }

        problems
    }

    /// Producing only the minimums must fit within every supply; anything
    /// over is infeasible before the solver ever runs.
    fn feasibility_screen(&self) -> Vec<ModelError> {
        let mut problems = Vec::new();
        for m in &self.materials {
            let needed: f64 = self
                .products
                .iter()
                .map(|p| p.min_production * p.input_amount(&m.key).unwrap_or(0.0))
                .sum();
            if needed > m.supply + 1e-9 {
                problems.push(ModelError::MinimumsExceedSupply {
                    material: m.key.clone(),
                    needed,
                    supply: m.supply,
                });
            }
        }
        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sawmill_is_valid() {
        let scenario = Scenario::sawmill();
        assert!(scenario.validate().is_ok());
        assert!(scenario.check().is_empty());
    }

    #[test]
    fn test_duplicate_material() {
        let mut scenario = Scenario::sawmill();
        let copy = scenario.materials[0].clone();
        scenario.materials.push(copy);

        let err = scenario.validate().unwrap_err();
        assert!(matches!(err, ModelError::DuplicateMaterial(ref k) if k == "pine"), "{err}");
    }

    #[test]
    fn test_unknown_material_in_recipe() {
        let mut scenario = Scenario::sawmill();
        scenario.products[0].inputs.push(Input {
            material: "oak".to_string(),
            amount: 1.0,
        });

        let err = scenario.validate().unwrap_err();
        assert!(matches!(err, ModelError::UnknownMaterial { .. }), "{err}");
    }

    #[test]
    fn test_feasibility_screen() {
        // A board minimum of 5000 needs 5000 m3 of pine; only 4000 exist.
        let mut scenario = Scenario::sawmill();
        scenario.products[1].min_production = 5000.0;

        assert!(scenario.validate().is_ok());
        let problems = scenario.check();
        assert!(
            problems
                .iter()
                .any(|p| matches!(p, ModelError::MinimumsExceedSupply { material, .. } if material == "pine")),
            "{problems:?}"
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_scenario_from_json() {
        let source = r#"
        {
            "title": "Tiny mill",
            "materials": [
                {"key": "pine", "unit_cost": 10.0, "supply": 100.0}
            ],
            "products": [
                {
                    "key": "board",
                    "unit_price": 50.0,
                    "inputs": [{"material": "pine", "amount": 2.0}]
                }
            ]
        }
        "#;

        let scenario: Scenario = serde_json::from_str(source).unwrap();
        assert_eq!(scenario.title.as_deref(), Some("Tiny mill"));
        assert_eq!(scenario.materials.len(), 1);
        assert_eq!(scenario.products[0].min_production, 0.0);
        assert_eq!(scenario.products[0].input_amount("pine"), Some(2.0));
        assert!(scenario.validate().is_ok());
    }
}
