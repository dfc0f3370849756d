use numtable::capi::{self, SPECS};
use numtable::{Flow, NumTable};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

// Check that every entry point returns what the spec suite asserts on.
#[test]
fn entry_points() {
    init_tracing();

    let expected = [
        ("st_init_numtable", 0),
        ("st_init_numtable_with_size", 0),
        ("st_insert", 1),
        ("st_foreach", 7),
        ("st_lookup", 42),
    ];

    for (name, result) in expected {
        assert_eq!(capi::call(name), Some(result), "{}", name);
    }

    let names: Vec<&str> = SPECS.iter().map(|spec| spec.name).collect();
    let expected_names: Vec<&str> = expected.iter().map(|(name, _)| *name).collect();
    assert_eq!(names, expected_names);
}

#[test]
fn unknown_entry_point() {
    init_tracing();

    assert_eq!(capi::call("st_free_table"), None);
}

// Grow a table through several resizes with logging enabled, then free it.
#[test]
fn grow_and_free() {
    init_tracing();

    let mut table = NumTable::new();
    for i in 0..1000usize {
        table.insert(i, i);
    }
    table.insert(500, 0);
    assert_eq!(table.len(), 1000);

    let mut total = 0;
    table.foreach(|_, v| {
        total += v;
        Flow::Continue
    });
    assert_eq!(total, (0..1000).sum::<usize>() - 500);

    table.free();
}
