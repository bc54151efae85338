use di_checker::{
    ir::{Block, CompilationUnit, Function, OpId},
    Action, BugRecord, CheckerConfig, DebugInfoChecker, Diagnostics, SnapshotRegistry,
};
use pretty_assertions::assert_eq;

include!("../test_stdio.rs");

/// `foo.c` with `f` carrying a subprogram and a located `call`
fn unit() -> (CompilationUnit, OpId) {
    let mut unit = CompilationUnit::with_debug_info("foo.c");
    let sp = unit.new_subprogram().unwrap();
    let loc = unit.new_location().unwrap();
    let i1 = unit.new_op("call").unwrap().with_location(loc);
    let id = i1.id;

    let f = Function::definition("f", vec![Block::named("entry", vec![i1])]);
    unit.push_function(f.with_subprogram(sp));

    (unit, id)
}

fn strip(unit: &mut CompilationUnit, id: OpId) {
    let f = unit.function_mut("f").unwrap();
    f.subprogram = None;
    f.operation_mut(id).unwrap().location = None;
}

fn expected_bugs() -> Vec<BugRecord> {
    vec![
        BugRecord::Subprogram {
            name: "f".into(),
            action: Action::Dropped,
        },
        BugRecord::Location {
            function: "f".into(),
            block: "entry".into(),
            opcode: "call".into(),
            action: Action::Dropped,
        },
    ]
}

#[test]
fn end_to_end() {
    let out = TestStdio::new();
    let mut checker =
        DebugInfoChecker::with_diagnostics(CheckerConfig::default(), Diagnostics::new(out.clone()));
    let mut registry = SnapshotRegistry::new();
    let (mut unit, id) = unit();

    assert!(checker.collect(&unit, unit.functions(), &mut registry, "inline"));

    let before = registry.get("inline").unwrap();
    assert!(before.subprogram("f").unwrap().is_some());
    assert_eq!(before.has_location(id), Some(true));

    strip(&mut unit, id);

    let outcome = checker.check_step(&unit, unit.functions(), &registry, "inline");

    assert!(!outcome.passed());
    assert_eq!(outcome.bugs(), expected_bugs().as_slice());
    assert_eq!(
        out.lines(),
        vec![
            "  ***ERROR: inline dropped DISubprogram for the f from file: foo.c",
            "  ***ERROR: inline dropped DILocation for the call in f (BB name: entry) from file: foo.c",
            "inline: FAIL",
        ]
    );
}

#[test]
fn json_export() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.json");
    let out = TestStdio::new();
    let mut checker = DebugInfoChecker::with_diagnostics(
        CheckerConfig::default().with_export(&path),
        Diagnostics::new(out.clone()),
    );
    let mut registry = SnapshotRegistry::new();
    let (mut unit, id) = unit();

    // Metadata preserved, nothing appended
    checker.collect(&unit, unit.functions(), &mut registry, "inline");
    assert!(checker.check(&unit, unit.functions(), &registry, "inline"));
    assert!(!path.exists());

    checker.collect(&unit, unit.functions(), &mut registry, "inline");
    strip(&mut unit, id);
    assert!(!checker.check(&unit, unit.functions(), &registry, "inline"));

    let exported = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        exported,
        concat!(
            r#"{"file":"foo.c","pass":"inline","bugs":["#,
            r#"{"metadata":"DISubprogram","name":"f","action":"drop"},"#,
            r#"{"metadata":"DILocation","fn-name":"f","bb-name":"entry","instr":"call","action":"drop"}"#,
            "]}\n"
        )
    );
    assert_eq!(out.lines(), vec!["inline: PASS", "inline: FAIL"]);

    let summary = di_checker::summary::Summary::from_file(&path).unwrap();
    assert_eq!(summary.subprogram_counts().get("inline"), Some(&1));
    assert_eq!(summary.location_counts().get("inline"), Some(&1));
}

#[test]
fn serialized_units_keep_operation_identity() {
    let out = TestStdio::new();
    let mut checker =
        DebugInfoChecker::with_diagnostics(CheckerConfig::default(), Diagnostics::new(out.clone()));
    let mut registry = SnapshotRegistry::new();
    let (before, id) = unit();

    let mut after: CompilationUnit =
        serde_json::from_str(&serde_json::to_string(&before).unwrap()).unwrap();
    after
        .function_mut("f")
        .unwrap()
        .operation_mut(id)
        .unwrap()
        .location = None;

    checker.collect(&before, before.functions(), &mut registry, "sroa");
    let outcome = checker.check_step(&after, after.functions(), &registry, "sroa");

    assert_eq!(outcome.bugs(), &expected_bugs()[1..]);
}

#[test]
fn independent_registries() {
    let out = TestStdio::new();
    let mut checker =
        DebugInfoChecker::with_diagnostics(CheckerConfig::default(), Diagnostics::new(out.clone()));
    let (mut a, a_id) = unit();
    let (b, _) = unit();
    let (mut reg_a, mut reg_b) = (SnapshotRegistry::new(), SnapshotRegistry::new());

    checker.collect(&a, a.functions(), &mut reg_a, "gvn");
    checker.collect(&b, b.functions(), &mut reg_b, "gvn");
    strip(&mut a, a_id);

    assert!(!checker.check(&a, a.functions(), &reg_a, "gvn"));
    assert!(checker.check(&b, b.functions(), &reg_b, "gvn"));
}
