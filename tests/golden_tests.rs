// Snapshot tests: every tests/scripts/*.py program is run and its printed
// output compared with the matching .out file.

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tinypy::interpreter::Interpreter;
use tinypy::run_source;

#[test]
fn test_scripts_match_expected_output() {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("scripts");
    let mut scripts: Vec<_> = fs::read_dir(&dir)
        .unwrap()
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().map(|e| e == "py").unwrap_or(false))
        .collect();
    scripts.sort();
    assert!(!scripts.is_empty(), "no scripts found in {}", dir.display());

    let mut failures = Vec::new();
    for path in &scripts {
        let source = fs::read_to_string(path).unwrap();
        let expected = fs::read_to_string(path.with_extension("out")).unwrap();

        let buffer = Arc::new(Mutex::new(Vec::new()));
        let mut interp = Interpreter::new();
        interp.set_output(buffer.clone());
        if let Err(err) = run_source(&source, &mut interp) {
            failures.push(format!("{}: {}: {}", path.display(), err.kind, err.message));
            continue;
        }

        let actual = String::from_utf8_lossy(&buffer.lock().unwrap()).to_string();
        if actual != expected {
            failures.push(format!(
                "{}\nExpected:\n{}\nGot:\n{}",
                path.display(),
                expected,
                actual
            ));
        }
    }

    assert!(failures.is_empty(), "{}", failures.join("\n\n"));
}
