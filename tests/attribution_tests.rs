use lineprof::attribution::attribute;
use lineprof::parser::{group_by_location, CallRecord};
use lineprof::utils::{AttributionConfig, Diagnostics, FileError, NoopDiagnostics};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

// `f` spans one-based lines 3-7
const SOURCE: &str = "\
import math

def f(x):
    a = math.sqrt(x)
    b = a * 2
    c = b + 1
    return c

print(f(4))
y = 0
";

#[derive(Default)]
struct RecordingDiagnostics {
    skipped: Mutex<Vec<PathBuf>>,
}

impl Diagnostics for RecordingDiagnostics {
    fn file_skipped(&self, path: &Path, _error: &FileError) {
        self.skipped.lock().unwrap().push(path.to_path_buf());
    }
}

fn write_source(dir: &Path, name: &str, source: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, source).unwrap();
    path
}

#[test]
fn test_end_to_end_scope_share() {
    let dir = TempDir::new().unwrap();
    let path = write_source(dir.path(), "m.py", SOURCE);
    let p = path.display();

    let records = vec![
        CallRecord::new(format!("{}(5): f", p))
            .with_calls(1)
            .with_device_total(100.0),
        CallRecord::new(format!("{}(6): f", p))
            .with_calls(1)
            .with_device_total(50.0),
    ];
    let grouped = group_by_location(&records, &NoopDiagnostics);

    let files = attribute(grouped, &AttributionConfig::new(), &NoopDiagnostics);
    let file = &files[&path];

    // Zero-based line 4 is one-based line 5
    let owner = file.scopes().owner(4).unwrap();
    assert_eq!(owner.name(), "f");
    assert_eq!(owner.range(), 2..7);
    assert_eq!(owner.stats().device_total, 150.0);

    let share = file.line_share(4).unwrap();
    assert!((share.device_share - 100.0 / 150.0).abs() < 1e-12);
    assert_eq!(file.overall().device_total, 150.0);
    assert_eq!(file.overall().calls, 2);
}

#[test]
fn test_unparseable_file_is_excluded() {
    let dir = TempDir::new().unwrap();
    let good = write_source(dir.path(), "good.py", SOURCE);
    let bad = write_source(dir.path(), "bad.py", "def broken(:\n    pass\n");

    let records = vec![
        CallRecord::new(format!("{}(4): f", good.display())).with_calls(1),
        CallRecord::new(format!("{}(1): broken", bad.display())).with_calls(1),
    ];
    let grouped = group_by_location(&records, &NoopDiagnostics);

    let diagnostics = RecordingDiagnostics::default();
    let files = attribute(grouped, &AttributionConfig::new(), &diagnostics);

    assert_eq!(files.len(), 1);
    assert!(files.contains_key(&good));
    assert_eq!(*diagnostics.skipped.lock().unwrap(), vec![bad]);
}

#[test]
fn test_missing_source_file_is_excluded() {
    let records = vec![CallRecord::new("/definitely/not/here.py(1): f").with_calls(1)];
    let grouped = group_by_location(&records, &NoopDiagnostics);

    let diagnostics = RecordingDiagnostics::default();
    let files = attribute(grouped, &AttributionConfig::new(), &diagnostics);

    assert!(files.is_empty());
    assert_eq!(diagnostics.skipped.lock().unwrap().len(), 1);
}

#[test]
fn test_relocated_trace_is_resolved() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("src");
    fs::create_dir_all(src.join("pkg")).unwrap();
    let path = write_source(&src.join("pkg"), "m.py", SOURCE);

    let records = vec![
        CallRecord::new("/home/ci/project/pkg/m.py(5): f")
            .with_calls(3)
            .with_host_total(30.0),
        CallRecord::new("/usr/lib/python3/os.py(100): stat").with_calls(1),
    ];
    let grouped = group_by_location(&records, &NoopDiagnostics);

    let config = AttributionConfig::new()
        .with_source_root(&src)
        .with_filter_root("/home/ci/project");
    let files = attribute(grouped, &config, &NoopDiagnostics);

    assert_eq!(files.len(), 1);
    let file = &files[&path];
    assert_eq!(file.line(4).unwrap().calls, 3);
    assert_eq!(file.scope_name(4).as_deref(), Some("f"));
}

#[test]
fn test_same_source_and_filter_root_keeps_nothing() {
    let dir = TempDir::new().unwrap();
    let path = write_source(dir.path(), "m.py", SOURCE);

    let records = vec![CallRecord::new(format!("{}(5): f", path.display())).with_calls(1)];
    let grouped = group_by_location(&records, &NoopDiagnostics);

    let config = AttributionConfig::new()
        .with_source_root(dir.path())
        .with_filter_root(dir.path());
    let files = attribute(grouped, &config, &NoopDiagnostics);

    assert!(files.is_empty());
}
