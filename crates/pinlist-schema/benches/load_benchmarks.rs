use criterion::{criterion_group, criterion_main, Criterion};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

fn create_test_project(dir: &Path, files: usize, pins_per_file: usize) -> PathBuf {
    let mut root = String::from("# install requirements\n");
    for f in 0..files {
        let mut body = format!("# group {f}\n");
        for p in 0..pins_per_file {
            let _ = writeln!(body, "pkg-{f}-{p}==1.{p}.0");
        }
        fs::write(dir.join(format!("part-{f}.txt")), body).unwrap();
        let _ = writeln!(root, "-r part-{f}.txt");
    }
    let path = dir.join("requirements.txt");
    fs::write(&path, root).unwrap();
    path
}

fn bench_load(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let root = create_test_project(dir.path(), 8, 50);
    c.bench_function("load_8_includes_400_pins", |b| {
        b.iter(|| pinlist_schema::load(&root).unwrap());
    });
}

fn bench_validate(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let root = create_test_project(dir.path(), 8, 50);
    let flat = pinlist_schema::load(&root).unwrap();
    c.bench_function("validate_400_pins", |b| {
        b.iter(|| flat.validate().unwrap());
    });
}

fn bench_digest(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let root = create_test_project(dir.path(), 8, 50);
    let flat = pinlist_schema::load(&root).unwrap();
    c.bench_function("digest_400_pins", |b| {
        b.iter(|| flat.compute_digest());
    });
}

criterion_group!(benches, bench_load, bench_validate, bench_digest);
criterion_main!(benches);
