#![no_main]

use libfuzzer_sys::fuzz_target;

use snmp_mib::oid::{Oid, compare_arcs};

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(oid) = Oid::parse(s) else {
        return;
    };

    // the display form parses back to the same OID
    let reparsed = Oid::parse(&oid.to_string()).expect("display form must parse");
    assert_eq!(reparsed, oid);

    if let Some(parent) = oid.parent() {
        assert_eq!(compare_arcs(parent.arcs(), oid.arcs()), std::cmp::Ordering::Less);
    }
});
