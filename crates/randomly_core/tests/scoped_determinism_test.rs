use std::collections::HashSet;
use std::thread;

use chrono::{TimeZone, Utc};

use randomly_core::derive::seed_for_scope;
use randomly_core::{Randomly, ReplayLog, SeedContext, Settings, Variants};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum OrderStatus {
    Open,
    Paid,
    Shipped,
    Cancelled,
}

impl Variants for OrderStatus {
    const ALL: &'static [Self] = &[Self::Open, Self::Paid, Self::Shipped, Self::Cancelled];
}

fn context(seed: u64) -> SeedContext {
    SeedContext::new(Settings {
        seed: Some(seed),
        run_start_time: Some(Utc.with_ymd_and_hms(2026, 6, 15, 10, 30, 0).unwrap()),
        ..Settings::default()
    })
}

/// A mixed workload touching every primitive once.
fn workload(r: &mut Randomly) -> Vec<String> {
    let items = ["alpha", "beta", "gamma", "delta", "epsilon"];
    vec![
        r.int_between(-1_000, 1_000).unwrap().to_string(),
        r.long_between(0, i64::MAX).unwrap().to_string(),
        r.double_between_rounded(2, 0.0, 100.0).unwrap().to_string(),
        r.index(17).unwrap().to_string(),
        r.element_of(&items).unwrap().to_string(),
        format!("{:?}", r.elements_of(&items, 3).unwrap()),
        format!("{:?}", r.unique_indices(4, 9).unwrap()),
        format!("{:?}", r.enum_of::<OrderStatus>().unwrap()),
        r.maybe_text("note").or_empty(),
        r.text().alpha_numeric(12).unwrap(),
        r.id().uuid().unwrap().to_string(),
        r.date_time().instant_in_past(0, 30).unwrap().to_rfc3339(),
        r.finance().currency_code().unwrap().to_string(),
    ]
}

#[test]
fn same_root_and_scope_reproduce_twenty_draws() {
    let ctx = context(123_456);
    let mut a = ctx.scoped("MyTest#caseA").unwrap();
    let mut b = ctx.scoped("MyTest#caseA").unwrap();
    let first: Vec<i64> = (0..20).map(|_| a.long_between(0, 1 << 40).unwrap()).collect();
    let second: Vec<i64> = (0..20).map(|_| b.long_between(0, 1 << 40).unwrap()).collect();
    assert_eq!(first, second);
}

#[test]
fn separate_contexts_with_same_seed_agree() {
    let mut a = context(99).scoped("Checkout#vat").unwrap();
    let mut b = context(99).scoped("Checkout#vat").unwrap();
    assert_eq!(workload(&mut a), workload(&mut b));
}

#[test]
fn sibling_scopes_and_roots_diverge() {
    let ctx = context(123_456);
    let mut a = ctx.scoped("ScopeA").unwrap();
    let mut b = ctx.scoped("ScopeB").unwrap();
    assert_ne!(workload(&mut a), workload(&mut b));

    let mut other_root = context(123_457).scoped("ScopeA").unwrap();
    let mut a_again = ctx.scoped("ScopeA").unwrap();
    assert_ne!(workload(&mut other_root), workload(&mut a_again));
}

#[test]
fn instance_seed_matches_derivation() {
    let ctx = context(123);
    let r = ctx.scoped("MyTest#x").unwrap();
    assert_eq!(r.instance_seed(), seed_for_scope(123, "MyTest#x").unwrap());
    assert_eq!(r.instance_seed(), 0x03f6_e3b5_b449_d5bc);
}

#[test]
fn threads_see_the_same_scoped_sequences() {
    let ctx = context(2026);
    let scopes: Vec<String> = (0..8).map(|i| format!("Parallel#{i}")).collect();

    let sequential: Vec<Vec<String>> = scopes
        .iter()
        .map(|scope| workload(&mut ctx.scoped(scope).unwrap()))
        .collect();

    let parallel: Vec<Vec<String>> = thread::scope(|s| {
        let handles: Vec<_> = scopes
            .iter()
            .rev()
            .map(|scope| {
                let ctx = &ctx;
                s.spawn(move || {
                    // Unscoped instances in between must not disturb scoped ones.
                    ctx.randomly().unwrap();
                    workload(&mut ctx.scoped(scope).unwrap())
                })
            })
            .collect();
        let mut results: Vec<Vec<String>> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();
        results.reverse();
        results
    });

    assert_eq!(sequential, parallel);
}

#[test]
fn unscoped_instances_never_share_a_substream() {
    let ctx = context(5);
    let labels: HashSet<String> = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                s.spawn(|| {
                    (0..25)
                        .map(|_| ctx.randomly().unwrap().scope_label().to_string())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect()
    });
    assert_eq!(labels.len(), 200);
}

#[test]
fn replay_info_reproduces_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("replay.txt");
    let ctx = SeedContext::new(Settings {
        seed: Some(4242),
        locale: Some("de-DE".parse().unwrap()),
        maybe_rate: Some(0.25),
        run_start_time: Some(Utc.with_ymd_and_hms(2026, 2, 1, 8, 0, 0).unwrap()),
    })
    .with_replay_log(ReplayLog::new(&log_path));

    let mut original = ctx.scoped("Invoice#pdf").unwrap();
    let expected = workload(&mut original);
    let info = original.replay_info();
    assert_eq!(
        info,
        "seed=4242 runStartTime=2026-02-01T08:00:00Z locale=de-DE maybeRate=0.25"
    );

    let logged = std::fs::read_to_string(&log_path).unwrap();
    assert!(logged.contains(&format!("| scoped(\"Invoice#pdf\") | {info}")));

    // Feed the logged settings back through the environment layer.
    let replay_env = Settings::from_env_with(|key: &str| {
        let value = match key {
            "RANDOMLY_SEED" => "4242",
            "RANDOMLY_LOCALE" => "de-DE",
            "RANDOMLY_MAYBE_RATE" => "0.25",
            "RANDOMLY_RUN_START_TIME" => "2026-02-01T08:00:00Z",
            _ => return None,
        };
        Some(value.to_string())
    })
    .unwrap();
    let mut replayed = SeedContext::new(replay_env).scoped("Invoice#pdf").unwrap();
    assert_eq!(workload(&mut replayed), expected);
}
