//! CBC-backed seed solver.
//!
//! Builds the wave selection MILP with `good_lp`: binary selection
//! variables per order and per aisle, the wave size window on the unit
//! total, and one balance constraint per item keeping picked units within
//! stocked units. The objective maximizes total units picked minus a small
//! per-aisle penalty ([`super::AISLE_EPSILON`]).

use std::collections::HashSet;

use good_lp::{
    constraint, default_solver, variable, Expression, ProblemVariables, Solution, SolverModel,
};

use super::{AISLE_EPSILON, IlpSolver};
use crate::instance::WaveInstance;
use crate::solution::Wave;

/// Seed solver backed by the Cbc mixed-integer solver.
#[derive(Debug, Default)]
pub struct CbcSolver;

impl CbcSolver {
    pub fn new() -> Self {
        CbcSolver
    }
}

impl IlpSolver for CbcSolver {
    fn solve(&self, instance: &WaveInstance, budget_ms: u64) -> Wave {
        let mut vars = ProblemVariables::new();
        let x: Vec<_> = (0..instance.n_orders)
            .map(|o| vars.add(variable().binary().name(format!("x_{}", o))))
            .collect();
        let y: Vec<_> = (0..instance.n_aisles)
            .map(|a| vars.add(variable().binary().name(format!("y_{}", a))))
            .collect();

        let mut objective = Expression::from(0.0);
        let mut total_units = Expression::from(0.0);
        for o in 0..instance.n_orders {
            let weight = instance.order_sums[o] as f64;
            objective = objective + weight * x[o];
            total_units = total_units + weight * x[o];
        }
        for a in 0..instance.n_aisles {
            objective = objective + (-AISLE_EPSILON) * y[a];
        }

        let mut balance: Vec<Expression> = (0..instance.n_items)
            .map(|_| Expression::from(0.0))
            .collect();
        for (o, order) in instance.orders.iter().enumerate() {
            for (&item, &quantity) in order {
                balance[item] = balance[item].clone() + quantity as f64 * x[o];
            }
        }
        for (a, aisle) in instance.aisles.iter().enumerate() {
            for (&item, &quantity) in aisle {
                balance[item] = balance[item].clone() + (-(quantity as f64)) * y[a];
            }
        }

        let mut model = vars.maximise(objective).using(default_solver);
        model.set_parameter("sec", &format!("{:.3}", budget_ms as f64 / 1000.0));

        let lower = total_units.clone();
        let upper = total_units;
        model = model.with(constraint!(lower >= instance.wave_size_lb as f64));
        model = model.with(constraint!(upper <= instance.wave_size_ub as f64));
        for item_balance in balance {
            model = model.with(constraint!(item_balance <= 0.0));
        }

        let solution = match model.solve() {
            Ok(solution) => solution,
            Err(_) => return Wave::empty(),
        };

        let orders: HashSet<usize> = (0..instance.n_orders)
            .filter(|&o| solution.value(x[o]) > 0.5)
            .collect();
        let aisles: HashSet<usize> = (0..instance.n_aisles)
            .filter(|&a| solution.value(y[a]) > 0.5)
            .collect();

        Wave::from_sets(instance, orders, aisles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_seed_solves_single_order_instance() {
        let instance = WaveInstance::new(
            "test",
            vec![HashMap::from([(0, 5)])],
            vec![HashMap::from([(0, 10)])],
            1,
            1,
            10,
        );
        let wave = CbcSolver::new().solve(&instance, 10_000);
        assert_eq!(wave.total_units, 5);
        assert!(wave.is_feasible(&instance));
    }

    #[test]
    fn test_infeasible_window_yields_empty_seed() {
        // LB of 6 cannot be reached with a single 5-unit order.
        let instance = WaveInstance::new(
            "test",
            vec![HashMap::from([(0, 5)])],
            vec![HashMap::from([(0, 10)])],
            1,
            6,
            10,
        );
        let wave = CbcSolver::new().solve(&instance, 10_000);
        assert!(wave.orders.is_empty());
    }
}
