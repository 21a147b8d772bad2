use crawltest::catalog::{Page, Route};
use crawltest::scenario::{self, Report, ScenarioKind};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let cmd = args.get(1).map(String::as_str);

    match cmd {
        None | Some("--help") | Some("-h") | Some("help") => print_help(),
        Some("pages") => print_pages(),
        Some("scenario") => {
            let (kinds, json) = match scenario_args(&args[2..]) {
                Ok(parsed) => parsed,
                Err(e) => {
                    eprintln!("{e}");
                    print_help();
                    std::process::exit(2);
                }
            };
            let reports: Vec<Report> = kinds.into_iter().map(scenario::run).collect();
            if json {
                match serde_json::to_string_pretty(&reports) {
                    Ok(s) => println!("{s}"),
                    Err(e) => {
                        eprintln!("failed to encode report: {e}");
                        std::process::exit(1);
                    }
                }
            } else {
                for report in &reports {
                    print_report(report);
                }
            }
        }
        Some(other) => {
            eprintln!("Unknown command: {other}");
            print_help();
            std::process::exit(2);
        }
    }
}

/// Scenario selection from the arguments after `scenario`. The first
/// non-flag argument names the scenario; flags may come before or after it.
fn scenario_args(args: &[String]) -> Result<(Vec<ScenarioKind>, bool), String> {
    let mut json = false;
    let mut which = None;
    for arg in args {
        match arg.as_str() {
            "--json" => json = true,
            flag if flag.starts_with('-') => return Err(format!("Unknown flag: {flag}")),
            name if which.is_none() => which = Some(name),
            extra => return Err(format!("Unexpected argument: {extra}")),
        }
    }

    let kinds = match which.unwrap_or("all") {
        "all" => ScenarioKind::all().to_vec(),
        other => match ScenarioKind::parse(other) {
            Some(kind) => vec![kind],
            None => return Err(format!("Unknown scenario: {other}")),
        },
    };
    Ok((kinds, json))
}

fn print_help() {
    println!("crawltest (crawler fixture widgets)");
    println!("usage:");
    println!("  crawltest scenario [lazy|feed|all] [--json]");
    println!("  crawltest pages");
    println!("  crawltest help");
}

fn print_pages() {
    for route in Route::all() {
        let label = match route {
            Route::Page(page) => page.nav_label().to_string(),
            Route::DeepLevel(n) => format!("Level {n} Page"),
            Route::Redirect => format!("redirect -> {}", Page::Home.path()),
            Route::RateLimited(n) => format!("Rate Limited Page {n}"),
            Route::IframeContent => "iframe content".to_string(),
        };
        println!("{:<40} {label}", route.path());
    }
}

fn print_report(report: &Report) {
    println!("== {} ==", report.scenario.label());
    for step in &report.steps {
        println!("{:>6} ms  {:<22} {}", step.at_ms, step.action, step.state);
    }
    println!("notifications: {}", report.notifications);
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn json_flag_may_precede_the_scenario() {
        let (kinds, json) = scenario_args(&args(&["--json", "lazy"])).unwrap();
        assert_eq!(kinds, vec![ScenarioKind::Lazy]);
        assert!(json);

        let (kinds, json) = scenario_args(&args(&["feed", "--json"])).unwrap();
        assert_eq!(kinds, vec![ScenarioKind::Feed]);
        assert!(json);
    }

    #[test]
    fn no_name_runs_everything() {
        let (kinds, json) = scenario_args(&args(&[])).unwrap();
        assert_eq!(kinds, ScenarioKind::all().to_vec());
        assert!(!json);

        let (kinds, _) = scenario_args(&args(&["--json"])).unwrap();
        assert_eq!(kinds, ScenarioKind::all().to_vec());
    }

    #[test]
    fn bad_arguments_are_rejected() {
        assert!(scenario_args(&args(&["nope"])).is_err());
        assert!(scenario_args(&args(&["lazy", "feed"])).is_err());
        assert!(scenario_args(&args(&["--yaml"])).is_err());
    }
}
