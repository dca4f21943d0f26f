use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use partshop::access::{defaults, run_probes, AccessChecker, Operation, ResourcePermissions, Role, RoleTable, User, UserDirectory};

fn wide_checker(n_users: usize, n_resources: usize) -> AccessChecker {
    let mut role = Role::new("wide", "");
    for r in 0..n_resources {
        role = role.grant(format!("res{}", r), ResourcePermissions::new(true, r % 2 == 0, false));
    }
    let roles = RoleTable::new(vec![role]).unwrap();
    let users = UserDirectory::new((0..n_users).map(|i| User::new(format!("user{}", i), "wide", ""))).unwrap();
    AccessChecker::new(roles, users)
}

fn bench_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("access_check");

    let builtin = AccessChecker::new(defaults::default_role_table(), defaults::default_user_directory());
    let probes = defaults::standard_probes();
    group.throughput(Throughput::Elements(probes.len() as u64));
    group.bench_function("standard_probes", |b| {
        b.iter(|| criterion::black_box(run_probes(&builtin, &probes)));
    });

    for &n in &[1_000usize, 100_000usize] {
        let checker = wide_checker(n, 64);
        let names: Vec<String> = (0..n).step_by(7).map(|i| format!("user{}", i)).collect();
        group.throughput(Throughput::Elements(names.len() as u64));
        group.bench_with_input(BenchmarkId::new("typed_write", n), &n, |b, _| {
            b.iter(|| {
                let mut granted = 0usize;
                for (i, u) in names.iter().enumerate() {
                    if checker.check_access(u, &format!("res{}", i % 64), Operation::Write).has_access { granted += 1; }
                }
                criterion::black_box(granted)
            });
        });
        group.bench_with_input(BenchmarkId::new("unknown_user", n), &n, |b, _| {
            b.iter(|| criterion::black_box(checker.check_access_raw("nobody", "res0", "read")));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_access);
criterion_main!(benches);
