//! Independent check of the knowledge base with a SAT solver.
//!
//! Every observation becomes "this cell is safe and exactly `count` of its
//! neighbors are hazards". A conclusion is sound when assuming its opposite
//! makes the formula unsatisfiable.

use crate::agent::Observation;
use crate::knowledge::KnowledgeBase;
use crate::point::Point;
use itertools::Itertools;
use std::collections::HashMap;
use varisat::{CnfFormula, ExtendFormula, Lit, Solver, Var};

/// Verifies every classified cell in `knowledge` against the raw observations.
/// Returns the number of conclusions checked.
pub fn audit(
    width: usize,
    height: usize,
    observations: &[Observation],
    knowledge: &KnowledgeBase,
) -> anyhow::Result<usize> {
    let mut solver = Solver::new();
    let mut var_map: HashMap<Point, Var> = HashMap::new();
    let mut formula = CnfFormula::new();

    for observation in observations {
        let probed = *var_map
            .entry(observation.cell)
            .or_insert_with(|| solver.new_var());
        formula.add_clause(&[Lit::from_var(probed, false)]);

        let lits: Vec<Lit> = observation
            .cell
            .neighbors(width, height)
            .map(|n| {
                let var = *var_map.entry(n).or_insert_with(|| solver.new_var());
                Lit::from_var(var, true)
            })
            .collect();
        encode_exactly_k(&mut formula, &lits, observation.count as usize);
    }

    solver.add_formula(&formula);
    if !solver.solve()? {
        anyhow::bail!("observations contradict each other");
    }

    let conclusions = knowledge
        .known_safe()
        .iter()
        .map(|&cell| (cell, false))
        .chain(knowledge.known_hazard().iter().map(|&cell| (cell, true)));

    let mut verified = 0;
    for (cell, is_hazard) in conclusions {
        let Some(&var) = var_map.get(&cell) else {
            anyhow::bail!("{cell} was classified without any observation touching it");
        };

        // Assume the opposite of the conclusion.
        solver.assume(&[Lit::from_var(var, !is_hazard)]);
        let opposite_possible = solver.solve()?;
        solver.assume(&[]);

        if opposite_possible {
            let claim = if is_hazard { "a hazard" } else { "safe" };
            anyhow::bail!("{cell} is classified as {claim} but the observations do not prove it");
        }
        verified += 1;
    }

    Ok(verified)
}

/// Exactly `k` of `lits` are true. Neighborhoods hold at most 8 cells, so the
/// naive combination encoding stays small.
fn encode_exactly_k(formula: &mut CnfFormula, lits: &[Lit], k: usize) {
    let n = lits.len();
    if k > n {
        formula.add_clause(&[]);
        return;
    }

    // At most k: every k+1 subset has a false literal.
    if k < n {
        for combo in lits.iter().copied().combinations(k + 1) {
            let clause: Vec<Lit> = combo.into_iter().map(|lit| !lit).collect();
            formula.add_clause(&clause);
        }
    }

    // At least k: every n-k+1 subset has a true literal.
    if k > 0 {
        for combo in lits.iter().copied().combinations(n - k + 1) {
            formula.add_clause(&combo);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::InferenceAgent;
    use crate::game::Game;

    fn p(row: usize, col: usize) -> Point {
        Point::new(row, col)
    }

    #[test]
    fn test_deductions_are_entailed() {
        let game = Game::with_hazards(3, 3, [p(0, 0)]).unwrap();
        let mut agent = InferenceAgent::new(3, 3);
        agent.add_knowledge(p(1, 1), game.nearby_hazards(p(1, 1))).unwrap();
        agent.add_knowledge(p(0, 1), game.nearby_hazards(p(0, 1))).unwrap();
        while let Some(cell) = agent.safe_unplayed_cell() {
            agent.add_knowledge(cell, game.nearby_hazards(cell)).unwrap();
        }

        let verified = audit(3, 3, agent.observations(), agent.knowledge()).unwrap();
        assert_eq!(verified, 9);
    }

    #[test]
    fn test_unproven_conclusion_is_reported() {
        let mut kb = KnowledgeBase::new();
        kb.record_observation(p(1, 1), 1, p(1, 1).neighbors(3, 3))
            .unwrap();
        // Nothing shows (0,0) is safe
        kb.mark_safe(p(0, 0)).unwrap();

        let observations = [Observation {
            cell: p(1, 1),
            count: 1,
        }];
        assert!(audit(3, 3, &observations, &kb).is_err());
    }

    #[test]
    fn test_contradictory_observations_are_reported() {
        // (0,0) claims all three neighbors are hazards, yet (0,1) was probed safely
        let observations = [
            Observation {
                cell: p(0, 0),
                count: 3,
            },
            Observation {
                cell: p(0, 1),
                count: 0,
            },
        ];
        let result = audit(2, 2, &observations, &KnowledgeBase::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_exactly_k_encoding() {
        let mut solver = Solver::new();
        let vars: Vec<Var> = (0..3).map(|_| solver.new_var()).collect();
        let lits: Vec<Lit> = vars.iter().map(|&v| Lit::from_var(v, true)).collect();

        let mut formula = CnfFormula::new();
        encode_exactly_k(&mut formula, &lits, 2);
        solver.add_formula(&formula);

        // Two true literals satisfy it, three do not
        solver.assume(&[lits[0], lits[1], !lits[2]]);
        assert!(solver.solve().unwrap());
        solver.assume(&lits);
        assert!(!solver.solve().unwrap());
        solver.assume(&[!lits[0], !lits[1]]);
        assert!(!solver.solve().unwrap());
    }
}
