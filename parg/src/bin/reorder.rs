// Manual test runner for `parg::reorder`.
//
// usage: reorder OPTSTRING LONGOPTS [ARG]...
//
// LONGOPTS is a comma-separated list of long names, each optionally
// followed by `:` (required value) or `::` (optional value). An empty
// string disables long options, so `--x` scans as the short options `-`, `x`.

use parg::{reorder, Arity, LongOption};

fn parse_longopts(spec: &str) -> Vec<LongOption<'_>> {
    spec.split(',')
        .filter(|s| !s.is_empty())
        .enumerate()
        .map(|(i, s)| {
            let (name, arity) = if let Some(name) = s.strip_suffix("::") {
                (name, Arity::Optional)
            } else if let Some(name) = s.strip_suffix(':') {
                (name, Arity::Required)
            } else {
                (s, Arity::None)
            };
            LongOption::new(name, arity, 256 + i as i32)
        })
        .collect()
}

fn main() {
    let mut argv: Vec<String> = std::env::args().collect();

    if argv.len() < 3 {
        println!("usage: reorder OPTSTRING LONGOPTS [ARG]...");
        std::process::exit(1);
    }

    let optstring = argv.remove(1);
    let longspec = argv.remove(1);
    let longopts = parse_longopts(&longspec);

    let longopts = (!longopts.is_empty()).then_some(longopts.as_slice());
    let split = reorder(&mut argv, &optstring, longopts);

    println!("split={}", split);
    for (i, arg) in argv.iter().enumerate().skip(1) {
        println!("{}: {}", i, arg);
    }
}
