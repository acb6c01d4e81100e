use cixkit_core::{Diameter, ToolInventory};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn tooling_xml(spindles: u32) -> String {
    let mut xml = String::from("<Tooling>\n");
    for id in 1..=spindles {
        let diameter = 2 + (id % 12);
        xml.push_str(&format!(
            "  <Spindle Name=\"T{}\" Child=\"D{}MM70\"/>\n",
            id, diameter
        ));
    }
    xml.push_str("</Tooling>\n");
    xml
}

fn bench_inventory_load(c: &mut Criterion) {
    let xml = tooling_xml(64);
    c.bench_function("inventory_load_64", |b| {
        b.iter(|| ToolInventory::load(black_box(&xml)))
    });
}

fn bench_spindles_for(c: &mut Criterion) {
    let inventory = ToolInventory::load(&tooling_xml(64)).expect("valid tooling");
    let diameter = Diameter::new(5.0).expect("positive diameter");
    c.bench_function("spindles_for", |b| {
        b.iter(|| inventory.spindles_for(black_box(diameter), 0.01))
    });
}

criterion_group!(benches, bench_inventory_load, bench_spindles_for);
criterion_main!(benches);
