use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::LsystemError;
use crate::grammar::{Rule, RuleSet};

/// Rule entry as it appears in preset JSON: either a plain replacement
/// string or an ordered list of [replacement, weight] pairs. Anything else
/// fails deserialization instead of guessing.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum RuleSpec {
    Plain(String),
    Weighted(Vec<(String, f64)>),
}

impl From<RuleSpec> for Rule {
    fn from(spec: RuleSpec) -> Self {
        match spec {
            RuleSpec::Plain(succ) => Rule::Deterministic(succ),
            RuleSpec::Weighted(options) => Rule::Stochastic(options),
        }
    }
}

/// One named L-system: grammar plus drawing parameters. Angle is in
/// degrees, length in output units.
#[derive(Clone, Debug, Deserialize)]
pub struct Preset {
    pub name: String,
    pub axiom: String,
    pub rules: HashMap<char, RuleSpec>,
    pub angle: f64,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    pub length: f64,
}

fn default_iterations() -> u32 {
    4
}

impl Preset {
    pub fn rule_set(&self) -> RuleSet {
        self.rules
            .iter()
            .map(|(symbol, spec)| (*symbol, spec.clone().into()))
            .collect()
    }
}

pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Preset, LsystemError> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Parse one `symbol=successor` line of rule text. Blank lines and `#`
/// comments parse to None.
pub fn parse_rule_line(line: &str) -> Result<Option<(char, Rule)>, LsystemError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let (left, right) = line.split_once('=').ok_or_else(|| {
        LsystemError::Preset(format!("expected 'symbol=successor', got '{line}'"))
    })?;
    let left = left.trim();
    let mut chars = left.chars();
    let symbol = match (chars.next(), chars.next()) {
        (Some(c), None) => c,
        _ => {
            return Err(LsystemError::Preset(format!(
                "rule symbol must be a single character, got '{left}'"
            )));
        }
    };
    Ok(Some((symbol, Rule::Deterministic(right.trim().to_string()))))
}

fn plain(
    name: &str,
    axiom: &str,
    rules: &[(char, &str)],
    angle: f64,
    iterations: u32,
    length: f64,
) -> Preset {
    Preset {
        name: name.to_string(),
        axiom: axiom.to_string(),
        rules: rules
            .iter()
            .map(|(s, r)| (*s, RuleSpec::Plain(r.to_string())))
            .collect(),
        angle,
        iterations,
        length,
    }
}

/// Built-in catalog: classic bracketed plants, two closed curves, and one
/// weighted grammar whose silhouette changes on every stochastic run.
pub fn builtin() -> Vec<Preset> {
    let mut presets = vec![
        plain("plant-a", "F", &[('F', "F[+F]F[-F]F")], 25.7, 5, 2.0),
        plain("plant-b", "F", &[('F', "F[+F]F[-F][F]")], 20.0, 5, 10.0),
        plain("plant-c", "F", &[('F', "FF-[-F+F+F]+[+F-F-F]")], 22.5, 4, 10.0),
        plain("plant-d", "X", &[('X', "F[+X]F[-X]+X"), ('F', "FF")], 20.0, 7, 2.0),
        plain("plant-e", "X", &[('X', "F[+X][-X]FX"), ('F', "FF")], 25.7, 7, 2.0),
        plain(
            "plant-f",
            "X",
            &[('X', "F-[[X]+X]+F[+FX]-X"), ('F', "FF")],
            22.5,
            5,
            5.0,
        ),
        plain(
            "pentaplexity",
            "F++F++F++F++F",
            &[('F', "F++F++F+++++F-F++F")],
            36.0,
            4,
            2.0,
        ),
        plain("koch", "F++F++F", &[('F', "F-F++F-F")], 60.0, 4, 2.0),
    ];

    let mut weedy = HashMap::new();
    weedy.insert(
        'F',
        RuleSpec::Weighted(vec![
            ("F[+F]F[-F]F".to_string(), 0.5),
            ("F[+F]F".to_string(), 0.3),
            ("F[-F]F".to_string(), 0.2),
        ]),
    );
    presets.push(Preset {
        name: "stochastic-plant".to_string(),
        axiom: "F".to_string(),
        rules: weedy,
        angle: 25.7,
        iterations: 5,
        length: 3.0,
    });

    presets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_weighted_rules() {
        let json = r#"{
            "name": "mixed",
            "axiom": "X",
            "rules": {
                "F": "FF",
                "X": [["F[+X]", 0.6], ["F[-X]", 0.4]]
            },
            "angle": 22.5,
            "iterations": 3,
            "length": 4.0
        }"#;
        let preset: Preset = serde_json::from_str(json).unwrap();
        let rules = preset.rule_set();
        assert_eq!(rules[&'F'], Rule::Deterministic("FF".to_string()));
        assert_eq!(
            rules[&'X'],
            Rule::Stochastic(vec![
                ("F[+X]".to_string(), 0.6),
                ("F[-X]".to_string(), 0.4),
            ])
        );
    }

    #[test]
    fn iterations_default_when_omitted() {
        let json = r#"{
            "name": "bare",
            "axiom": "F",
            "rules": { "F": "F+F" },
            "angle": 90.0,
            "length": 1.0
        }"#;
        let preset: Preset = serde_json::from_str(json).unwrap();
        assert_eq!(preset.iterations, 4);
    }

    #[test]
    fn malformed_rule_entry_fails_loudly() {
        let json = r#"{
            "name": "broken",
            "axiom": "F",
            "rules": { "F": 12 },
            "angle": 90.0,
            "iterations": 1,
            "length": 1.0
        }"#;
        assert!(serde_json::from_str::<Preset>(json).is_err());

        // A pair missing its weight is malformed too.
        let json = r#"{
            "name": "broken",
            "axiom": "F",
            "rules": { "F": [["FF"]] },
            "angle": 90.0,
            "iterations": 1,
            "length": 1.0
        }"#;
        assert!(serde_json::from_str::<Preset>(json).is_err());
    }

    #[test]
    fn multi_character_rule_symbol_is_rejected() {
        let json = r#"{
            "name": "broken",
            "axiom": "F",
            "rules": { "FX": "FF" },
            "angle": 90.0,
            "iterations": 1,
            "length": 1.0
        }"#;
        assert!(serde_json::from_str::<Preset>(json).is_err());
    }

    #[test]
    fn rule_line_parsing() {
        let (symbol, rule) = parse_rule_line("X = F[+X]F").unwrap().unwrap();
        assert_eq!(symbol, 'X');
        assert_eq!(rule, Rule::Deterministic("F[+X]F".to_string()));

        assert!(parse_rule_line("").unwrap().is_none());
        assert!(parse_rule_line("# comment").unwrap().is_none());
        assert!(parse_rule_line("F[+F]F").is_err());
        assert!(parse_rule_line("FX=F").is_err());
    }

    #[test]
    fn builtin_rules_all_validate() {
        for preset in builtin() {
            for (symbol, rule) in preset.rule_set() {
                rule.validate(symbol).unwrap();
            }
            assert!(!preset.axiom.is_empty(), "{} has no axiom", preset.name);
            assert!(preset.iterations <= crate::grammar::MAX_ITERATIONS);
        }
    }
}
