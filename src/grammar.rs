use std::collections::HashMap;

use rand::Rng;

use crate::error::LsystemError;

pub const MAX_ITERATIONS: u32 = 12;
pub const MAX_SEQUENCE_LEN: usize = 1_000_000;

/// A symbol's successor. Resolved to one of these two shapes when rules are
/// loaded; expansion never re-inspects raw preset data.
#[derive(Clone, Debug, PartialEq)]
pub enum Rule {
    Deterministic(String),
    Stochastic(Vec<(String, f64)>),
}

pub type RuleSet = HashMap<char, Rule>;

impl Rule {
    pub fn validate(&self, symbol: char) -> Result<(), LsystemError> {
        if let Rule::Stochastic(options) = self {
            for (_, weight) in options {
                if !weight.is_finite() || *weight < 0.0 {
                    return Err(LsystemError::InvalidWeight {
                        symbol,
                        weight: *weight,
                    });
                }
            }
        }
        Ok(())
    }

    // None means "keep the symbol itself" (empty option list).
    fn successor<R: Rng>(&self, stochastic: bool, rng: &mut R) -> Option<&str> {
        match self {
            Rule::Deterministic(succ) => Some(succ),
            Rule::Stochastic(options) => {
                let (first, _) = options.first()?;
                if !stochastic {
                    return Some(first);
                }
                let total: f64 = options.iter().map(|(_, w)| w).sum();
                if total <= 0.0 {
                    return Some(first);
                }
                let mut r = rng.gen_range(0.0..total);
                for (succ, weight) in options {
                    if r < *weight {
                        return Some(succ);
                    }
                    r -= weight;
                }
                Some(first)
            }
        }
    }
}

/// Growth guards for expansion. Sequence length can explode exponentially
/// with the iteration count, so both knobs turn runaway requests into
/// errors instead of hangs.
#[derive(Clone, Copy, Debug)]
pub struct Limits {
    pub max_iterations: u32,
    pub max_sequence: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_iterations: MAX_ITERATIONS,
            max_sequence: MAX_SEQUENCE_LEN,
        }
    }
}

/// Expand `axiom` through `iterations` full rewrite passes.
///
/// Symbols without a rule entry are their own successor. With `stochastic`
/// clear, a stochastic rule collapses to its first option, so the result is
/// a pure function of the inputs.
pub fn expand(
    axiom: &str,
    rules: &RuleSet,
    iterations: u32,
    stochastic: bool,
) -> Result<String, LsystemError> {
    expand_with_rng(
        axiom,
        rules,
        iterations,
        stochastic,
        &Limits::default(),
        &mut rand::thread_rng(),
    )
}

/// Like [`expand`] but with explicit growth limits and randomness source.
/// Callers that need reproducible stochastic expansion pass a seeded RNG.
pub fn expand_with_rng<R: Rng>(
    axiom: &str,
    rules: &RuleSet,
    iterations: u32,
    stochastic: bool,
    limits: &Limits,
    rng: &mut R,
) -> Result<String, LsystemError> {
    if iterations > limits.max_iterations {
        return Err(LsystemError::IterationCap {
            requested: iterations,
            max: limits.max_iterations,
        });
    }
    for (symbol, rule) in rules {
        rule.validate(*symbol)?;
    }

    let mut current = axiom.to_string();
    for pass in 0..iterations {
        // Each pass materializes fully before the next starts; successors
        // produced in this pass are never rewritten by it.
        let mut next = String::with_capacity(current.len() * 2);
        for symbol in current.chars() {
            match rules.get(&symbol).and_then(|r| r.successor(stochastic, rng)) {
                Some(succ) => next.push_str(succ),
                None => next.push(symbol),
            }
            if next.len() > limits.max_sequence {
                return Err(LsystemError::SequenceCap {
                    pass: pass + 1,
                    max: limits.max_sequence,
                });
            }
        }
        current = next;
    }
    Ok(current)
}
