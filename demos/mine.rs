extern crate apriori_all;

use apriori_all::{AprioriAll, MiningConfig, Report, SequenceStore};
use std::env;
use std::process;
use tracing_subscriber::EnvFilter;

const DATA: &str = "5 4 5
<{1,5}{2}{3}{4}>
<{1}{3}{4}{3,5}>
<{1}{2}{3}{4}>
<{1}{3}{5}>
<{4}{5}>
";

// cargo run --example mine -- [database] [min-support-percentage]
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = env::args().skip(1);
    let store = match args.next() {
        Some(path) => SequenceStore::read(&path),
        None => SequenceStore::load(DATA),
    };
    let store = store.unwrap_or_else(|err| {
        eprintln!("{}", err);
        process::exit(1);
    });

    let percentage = args.next().and_then(|p| p.parse().ok()).unwrap_or(50);
    let frequent = AprioriAll::new(MiningConfig::new(percentage))
        .run(&store)
        .unwrap_or_else(|err| {
            eprintln!("{}", err);
            process::exit(1);
        });

    print!("{}", Report::new(&store, &frequent));

    for (pattern, support) in frequent.report().filter(|(p, _)| p.len() > 1) {
        println!(
            "Pattern: {}, Support: {}",
            store.alphabet().render(pattern),
            support
        );
    }
}
