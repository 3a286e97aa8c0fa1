use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use lsystem_garden::{
    expand, interpret, preset, spawn_viewer, Geometry, LsystemError, Point, Preset, RuleSet,
    Scene,
};

struct Params {
    preset_name: String,
    axiom: String,
    rules: RuleSet,
    angle: f64,
    iterations: u32,
    length: f64,
    stochastic: bool,
    fluctuation: bool,
}

impl Params {
    fn from_preset(preset: &Preset) -> Self {
        Params {
            preset_name: preset.name.clone(),
            axiom: preset.axiom.clone(),
            rules: preset.rule_set(),
            angle: preset.angle,
            iterations: preset.iterations,
            length: preset.length,
            stochastic: false,
            fluctuation: false,
        }
    }

    fn display(&self) {
        println!("\n╭─── current l-system ───╮");
        println!("│ preset: {}", self.preset_name);
        println!("│ axiom: {}", self.axiom);
        let mut symbols: Vec<&char> = self.rules.keys().collect();
        symbols.sort();
        for symbol in symbols {
            println!("│ rule {}: {:?}", symbol, self.rules[symbol]);
        }
        println!("│ angle: {}°  length: {}", self.angle, self.length);
        println!("│ iterations: {}", self.iterations);
        println!(
            "│ stochastic: {}  fluctuation: {}",
            self.stochastic, self.fluctuation
        );
        println!("╰────────────────────────╯\n");
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut catalog = preset::builtin();
    load_preset_dir(&mut catalog);

    let scene = Arc::new(Mutex::new(Scene::empty()));
    spawn_viewer(Arc::clone(&scene));

    let mut params = Params::from_preset(&catalog[0]);
    regenerate(&params, &scene);

    println!("\n╭──────────────────────────────────────────╮");
    println!("│       l-system garden — turtle lab       │");
    println!("│                                          │");
    println!("│ grammar rewriting grows branch geometry  │");
    println!("│ the window tracks every regeneration     │");
    println!("│                                          │");
    println!("│ /presets /load <name>  /state  /quit     │");
    println!("│ /axiom <s>  /rule <sym>=<succ>           │");
    println!("│ /clear-rules  /iter <n>  /angle <deg>    │");
    println!("│ /length <l>  /stochastic  /fluct         │");
    println!("│ /regen  /export <path.png>               │");
    println!("╰──────────────────────────────────────────╯\n");

    loop {
        print!("lsys: ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        match input {
            "/quit" => break,
            "/state" => {
                params.display();
                continue;
            }
            "/presets" => {
                println!();
                for preset in &catalog {
                    println!(
                        "  {} — axiom {}, angle {}°, {} iterations",
                        preset.name, preset.axiom, preset.angle, preset.iterations
                    );
                }
                println!();
                continue;
            }
            "/stochastic" => {
                params.stochastic = !params.stochastic;
                println!(
                    "stochastic rules {}",
                    if params.stochastic { "on" } else { "off" }
                );
                regenerate(&params, &scene);
                continue;
            }
            "/fluct" => {
                params.fluctuation = !params.fluctuation;
                println!(
                    "fluctuation {}",
                    if params.fluctuation { "on" } else { "off" }
                );
                regenerate(&params, &scene);
                continue;
            }
            "/clear-rules" => {
                params.rules.clear();
                println!("rule table cleared");
                regenerate(&params, &scene);
                continue;
            }
            "/regen" => {
                regenerate(&params, &scene);
                continue;
            }
            _ => {}
        }

        if let Some(name) = input.strip_prefix("/load ") {
            let name = name.trim();
            match catalog.iter().find(|p| p.name == name) {
                Some(preset) => {
                    params = Params::from_preset(preset);
                    println!("loaded '{}'", name);
                    regenerate(&params, &scene);
                }
                None => println!("no preset named '{}' (see /presets)", name),
            }
        } else if let Some(axiom) = input.strip_prefix("/axiom ") {
            params.axiom = axiom.trim().to_string();
            regenerate(&params, &scene);
        } else if let Some(line) = input.strip_prefix("/rule ") {
            match preset::parse_rule_line(line) {
                Ok(Some((symbol, rule))) => {
                    params.rules.insert(symbol, rule);
                    regenerate(&params, &scene);
                }
                Ok(None) => println!("usage: /rule <sym>=<successor>"),
                Err(e) => println!("error: {}", e),
            }
        } else if let Some(n) = input.strip_prefix("/iter ") {
            match n.trim().parse::<u32>() {
                Ok(n) => {
                    params.iterations = n;
                    regenerate(&params, &scene);
                }
                Err(_) => println!("usage: /iter <non-negative integer>"),
            }
        } else if let Some(a) = input.strip_prefix("/angle ") {
            match a.trim().parse::<f64>() {
                Ok(a) => {
                    params.angle = a;
                    regenerate(&params, &scene);
                }
                Err(_) => println!("usage: /angle <degrees>"),
            }
        } else if let Some(l) = input.strip_prefix("/length ") {
            match l.trim().parse::<f64>() {
                Ok(l) => {
                    params.length = l;
                    regenerate(&params, &scene);
                }
                Err(_) => println!("usage: /length <step length>"),
            }
        } else if let Some(path) = input.strip_prefix("/export ") {
            let geometry = { scene.lock().unwrap().geometry.clone() };
            match lsystem_garden::save_png(&geometry, 1024, 1024, path.trim()) {
                Ok(()) => println!("saved {}", path.trim()),
                Err(e) => println!("error: {}", e),
            }
        } else {
            println!("unknown command (see the banner above)");
        }
    }

    Ok(())
}

fn generate(params: &Params) -> Result<(usize, Geometry), LsystemError> {
    let sequence = expand(
        &params.axiom,
        &params.rules,
        params.iterations,
        params.stochastic,
    )?;
    let geometry = interpret(
        &sequence,
        params.angle,
        params.length,
        Point::new(0.0, 0.0),
        params.fluctuation,
    )?;
    Ok((sequence.chars().count(), geometry))
}

// On failure the previous scene stays up; no partial geometry is shown.
fn regenerate(params: &Params, scene: &Arc<Mutex<Scene>>) {
    match generate(params) {
        Ok((sequence_len, geometry)) => {
            println!(
                "{} symbols → {} segments, {} leaves",
                sequence_len,
                geometry.segments.len(),
                geometry.leaves.len()
            );
            *scene.lock().unwrap() = Scene {
                sequence_len,
                geometry,
            };
        }
        Err(e) => println!("error: {}", e),
    }
}

fn load_preset_dir(catalog: &mut Vec<Preset>) {
    let dir = "presets";
    if !std::path::Path::new(dir).exists() {
        return;
    }

    for entry in walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        if entry.path().extension().map(|x| x == "json").unwrap_or(false) {
            match preset::load_file(entry.path()) {
                Ok(preset) => {
                    println!(
                        "loaded preset '{}' from {}",
                        preset.name,
                        entry.path().display()
                    );
                    catalog.push(preset);
                }
                Err(e) => println!("{}: {}", entry.path().display(), e),
            }
        }
    }
}
