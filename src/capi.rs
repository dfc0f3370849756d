//! Named entry points for a C API spec suite.
//!
//! Each entry point takes no arguments, builds its own [NumTable], runs one scenario, frees
//! the table and returns a single integer for the caller to assert on. [SPECS] lists them by
//! name so a harness can look them up the way it would look up methods on a class.

use crate::{Flow, NumTable};


/// The key and value type used by the entry points: a pointer-sized integer.
pub type Data = usize;

/// An entry point and the name it is called by.
#[derive(Clone, Copy, Debug)]
pub struct Spec {
    pub name: &'static str,
    pub func: fn() -> i64,
}

impl Spec {
    /// Runs the entry point.
    #[inline]
    pub fn call(&self) -> i64 {
        (self.func)()
    }
}

/// Every entry point, in definition order.
pub static SPECS: &[Spec] = &[
    Spec {
        name: "st_init_numtable",
        func: st_init_numtable,
    },
    Spec {
        name: "st_init_numtable_with_size",
        func: st_init_numtable_with_size,
    },
    Spec {
        name: "st_insert",
        func: st_insert,
    },
    Spec {
        name: "st_foreach",
        func: st_foreach,
    },
    Spec {
        name: "st_lookup",
        func: st_lookup,
    },
];

/// Calls the entry point named `name`. Returns [None] if there is no such entry point.
pub fn call(name: &str) -> Option<i64> {
    let Some(spec) = SPECS.iter().find(|spec| spec.name == name) else {
        tracing::debug!(name, "no entry point with this name");
        return None;
    };
    let result = spec.call();
    tracing::debug!(name, result, "called entry point");
    Some(result)
}

/// Returns the entry count of a new table.
pub fn st_init_numtable() -> i64 {
    let tbl: NumTable<Data, Data> = NumTable::new();
    let entries = tbl.len();
    tbl.free();
    entries as i64
}

/// Returns the entry count of a new table sized for 128 entries.
pub fn st_init_numtable_with_size() -> i64 {
    let tbl: NumTable<Data, Data> = NumTable::with_capacity(128);
    let entries = tbl.len();
    tbl.free();
    entries as i64
}

/// Returns the entry count after inserting one entry.
pub fn st_insert() -> i64 {
    let mut tbl: NumTable<Data, Data> = NumTable::with_capacity(128);
    tbl.insert(1, 1);
    let entries = tbl.len();
    tbl.free();
    entries as i64
}

/// Returns the sum of the values 3 and 4, added up by a visitor.
pub fn st_foreach() -> i64 {
    let mut tbl: NumTable<Data, Data> = NumTable::with_capacity(128);
    tbl.insert(1, 3);
    tbl.insert(2, 4);
    let mut total: Data = 0;
    tbl.foreach(|_, value| {
        total = total.wrapping_add(*value);
        Flow::Continue
    });
    tbl.free();
    total as i64
}

/// Returns the value stored under key 7, or 0 if it is missing.
pub fn st_lookup() -> i64 {
    let mut tbl: NumTable<Data, Data> = NumTable::with_capacity(128);
    tbl.insert(7, 42);
    tbl.insert(2, 4);
    let result = tbl.lookup(&7).unwrap_or(0);
    tbl.free();
    result as i64
}
