use clap::{Parser, Subcommand};
use std::path::PathBuf;

use timberplan_model::{build_lp, PlanLp, PlanReport, Scenario};
use timberplan_solver::{Simplex, SolveStatus};

#[derive(Parser)]
#[command(name = "timberplan")]
#[command(about = "Worked linear-programming examples for production planning", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the LP instance built from a scenario
    Show {
        /// Scenario file (JSON); defaults to the built-in sawmill example
        file: Option<PathBuf>,
        /// Output format (pretty, json)
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },
    /// Build and solve a scenario, printing the production plan
    Solve {
        /// Scenario file (JSON); defaults to the built-in sawmill example
        file: Option<PathBuf>,
        /// Show binding constraints, shadow prices, and reduced costs
        #[arg(short, long)]
        analysis: bool,
        /// Output format (pretty, json)
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },
    /// Check a scenario file for problems
    Check {
        /// The file to check
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Show { file, format } => {
            let scenario = load_scenario(file.as_deref());
            let plan = build_plan(&scenario);
            if format == "json" {
                match serde_json::to_string_pretty(&plan.problem) {
                    Ok(text) => println!("{}", text),
                    Err(e) => {
                        eprintln!("Error serializing output: {}", e);
                        std::process::exit(1);
                    }
                }
            } else {
                println!("{}", plan.problem);
            }
        }
        Commands::Solve {
            file,
            analysis,
            format,
        } => {
            let scenario = load_scenario(file.as_deref());
            let plan = build_plan(&scenario);

            let solution = match Simplex::new().solve(&plan.problem) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Solver error: {}", e);
                    std::process::exit(1);
                }
            };

            let report = PlanReport::from_solution(&scenario, &plan, &solution);

            if format == "json" {
                match serde_json::to_string_pretty(&report) {
                    Ok(text) => println!("{}", text),
                    Err(e) => {
                        eprintln!("Error serializing output: {}", e);
                        std::process::exit(1);
                    }
                }
                if !solution.is_optimal() {
                    std::process::exit(1);
                }
                return;
            }

            println!("Scenario: {}", report.scenario);
            match solution.status {
                SolveStatus::Optimal => {
                    println!("Status: OPTIMAL");
                    println!();
                    print_report(&report, analysis);
                }
                SolveStatus::Infeasible => {
                    println!("Status: INFEASIBLE");
                    println!("No production plan satisfies all constraints.");
                    for problem in scenario.check() {
                        println!("  - {}", problem);
                    }
                    std::process::exit(1);
                }
                SolveStatus::Unbounded => {
                    println!("Status: UNBOUNDED");
                    println!("Net revenue can grow without limit; the scenario is missing a supply bound.");
                    std::process::exit(1);
                }
                SolveStatus::IterationLimit => {
                    println!("Status: ITERATION LIMIT");
                    println!("The solver ran out of pivots before proving optimality.");
                    std::process::exit(1);
                }
            }
        }
        Commands::Check { file } => {
            let scenario = load_scenario(Some(file.as_path()));
            let problems = scenario.check();

            if problems.is_empty() {
                println!("✓ {} is valid", file.display());
                println!("  {} materials", scenario.materials.len());
                println!("  {} products", scenario.products.len());
                let inputs: usize = scenario.products.iter().map(|p| p.inputs.len()).sum();
                println!("  {} input pairs", inputs);
            } else {
                eprintln!("✗ {} has problems:", file.display());
                for problem in &problems {
                    eprintln!("  - {}", problem);
                }
                std::process::exit(1);
            }
        }
    }
}

fn load_scenario(file: Option<&std::path::Path>) -> Scenario {
    let Some(path) = file else {
        return Scenario::sawmill();
    };

    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            std::process::exit(1);
        }
    };

    match serde_json::from_str(&source) {
        Ok(scenario) => scenario,
        Err(e) => {
            eprintln!("Error parsing {}: {}", path.display(), e);
            std::process::exit(1);
        }
    }
}

fn build_plan(scenario: &Scenario) -> PlanLp {
    match build_lp(scenario) {
        Ok(plan) => plan,
        Err(e) => {
            eprintln!("Model error: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_report(report: &PlanReport, analysis: bool) {
    println!("Production:");
    for row in &report.production {
        println!(
            "  {:20} {:>12.2}   revenue {:>14.2}",
            row.product, row.quantity, row.revenue
        );
    }
    println!();

    println!("Material usage:");
    for row in &report.usage {
        println!(
            "  {:14} -> {:12} {:>12.2}   cost {:>14.2}",
            row.material, row.product, row.quantity, row.cost
        );
    }
    println!();

    println!("Revenue:       {:>14.2}", report.totals.revenue);
    println!("Material cost: {:>14.2}", report.totals.material_cost);
    println!("Net revenue:   {:>14.2}", report.totals.net_revenue);

    if !analysis {
        return;
    }

    let Some(ref analysis) = report.analysis else {
        return;
    };

    println!();
    println!("Analysis:");
    println!();

    if !analysis.binding.is_empty() {
        println!("Binding constraints:");
        for note in &analysis.binding {
            println!("  {:24} {:>10.4}", note.constraint, note.shadow_price);
            println!("    {}", note.note);
        }
    }

    if !analysis.reduced_costs.is_empty() {
        println!();
        println!("Reduced costs:");
        for note in &analysis.reduced_costs {
            println!("  {:24} {:>10.4}", note.variable, note.reduced_cost);
            println!("    {}", note.note);
        }
    }
}
