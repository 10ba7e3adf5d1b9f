use std::{
    fs,
    path::{Path, PathBuf},
    rc::Rc,
};

use triangle::{
    driver::{self, Options, Outcome},
    error::{Kind, Reporter},
    fold::FoldCounts,
    machine::{Instruction, Opcode},
    parse::parse,
    source::Source,
    summary::SummaryVisitor,
};

fn program(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/programs")
        .join(name)
}

fn load(name: &str) -> Rc<Source> {
    Source::load(program(name)).unwrap()
}

fn compile(name: &str, options: Options) -> (Outcome, String) {
    let mut out = Vec::new();
    let outcome = driver::compile(&load(name), options, &mut out).unwrap();

    (outcome, String::from_utf8(out).unwrap())
}

fn summarize(name: &str) -> SummaryVisitor {
    let mut reporter = Reporter::new(true);
    let program = parse(&load(name), &mut reporter);
    assert_eq!(reporter.errors(), 0, "{}", reporter);

    SummaryVisitor::summarize(&program)
}

fn object_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("triangle-{}-{}.tam", std::process::id(), name))
}

#[test]
fn hi_summary() {
    let stats = summarize("hi.tri");
    assert_eq!((stats.integers(), stats.characters()), (0, 2));
}

#[test]
fn double_summary() {
    let stats = summarize("double.tri");
    assert_eq!((stats.integers(), stats.characters()), (1, 0));
}

#[test]
fn boolean_folding() {
    let (outcome, output) = compile("booleans-to-fold.tri", Options::FOLD);

    assert!(outcome.successful(), "{}", output);
    assert_eq!(
        outcome.folds(),
        Some(FoldCounts {
            integers: 0,
            booleans: 4
        })
    );
}

#[test]
fn folding_keeps_the_program_valid() {
    let (plain, _) = compile("booleans-to-fold.tri", Options::empty());
    let (folded, _) = compile("booleans-to-fold.tri", Options::FOLD);

    let plain = plain.object().unwrap().instructions().len();
    let folded = folded.object().unwrap().instructions().len();
    assert!(folded < plain);
}

#[test]
fn curly_while_compiles() {
    let mut reporter = Reporter::new(true);
    parse(&load("while-curly.tri"), &mut reporter);
    assert_eq!(reporter.errors(), 0, "{}", reporter);

    let (outcome, output) = compile("while-curly.tri", Options::empty());
    assert!(outcome.successful(), "{}", output);
}

#[test]
fn every_feature_together() {
    let (outcome, output) = compile("records.tri", Options::FOLD);
    assert!(outcome.successful(), "{}", output);

    let code = outcome.object().unwrap().instructions();
    let last: &Instruction = code.last().unwrap();
    assert_eq!(last.op, Opcode::Halt);
}

#[test]
fn undeclared_identifier_writes_no_object() {
    let (outcome, _) = compile("undeclared.tri", Options::empty());
    let reporter = outcome.reporter();

    assert!(reporter.errors() >= 1);
    assert!(reporter
        .diagnostics()
        .iter()
        .any(|diagnostic| diagnostic.kind() == Kind::Semantic));

    let path = object_path("undeclared");
    let _ = fs::remove_file(&path);

    let mut out = Vec::new();
    let successful = driver::run(&program("undeclared.tri"), &path, Options::empty(), &mut out).unwrap();

    assert!(!successful);
    assert!(!path.exists());
    assert!(String::from_utf8(out)
        .unwrap()
        .ends_with("Compilation was unsuccessful.\n"));
}

#[test]
fn object_file_is_written_on_success() {
    let path = object_path("hi");
    let mut out = Vec::new();

    let successful = driver::run(&program("hi.tri"), &path, Options::empty(), &mut out).unwrap();
    assert!(successful);

    let bytes = fs::read(&path).unwrap();
    let _ = fs::remove_file(&path);

    assert!(!bytes.is_empty());
    assert_eq!(bytes.len() % Instruction::ENCODED_SIZE, 0);
    assert!(String::from_utf8(out)
        .unwrap()
        .ends_with("Compilation was successful.\n"));
}

#[test]
fn missing_source_is_fatal() {
    let mut out = Vec::new();
    let result = driver::run(
        &program("does-not-exist.tri"),
        &object_path("missing"),
        Options::empty(),
        &mut out,
    );

    let error = result.unwrap_err();
    assert!(error.to_string().starts_with("Can't access source file"));
}
