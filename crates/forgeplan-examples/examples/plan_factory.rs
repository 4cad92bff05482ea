//! Plan a small factory and print the resulting logistics network.
//!
//! Builds a registry with a short production chain (ore -> plate -> motor),
//! plans a motor line, and walks the finished graph node by node.
//!
//! Run with: `cargo run -p forgeplan-examples --example plan_factory`

use forgeplan_core::graph::{FabInput, FabOutput, FactoryGraph};
use forgeplan_core::planner::{build_factory, Requirement};
use forgeplan_core::rate::{rate, rate_to_f64};
use forgeplan_core::registry::{RecipeEntry, Registry, RegistryBuilder};

fn main() {
    let mut builder = RegistryBuilder::new();

    let iron_ore = builder.register_item("iron_ore");
    let copper_ore = builder.register_item("copper_ore");
    let iron_plate = builder.register_item("iron_plate");
    let copper_wire = builder.register_item("copper_wire");
    let slag = builder.register_item("slag");
    let motor = builder.register_item("motor");

    // 2 iron_ore -> 1 iron_plate per minute.
    builder
        .register_recipe(
            RecipeEntry { item: iron_plate, quantity: 1 },
            vec![RecipeEntry { item: iron_ore, quantity: 2 }],
            vec![],
            rate(1.0),
        )
        .unwrap();

    // 1 copper_ore -> 2 copper_wire + 1 slag per minute.
    builder
        .register_recipe(
            RecipeEntry { item: copper_wire, quantity: 2 },
            vec![RecipeEntry { item: copper_ore, quantity: 1 }],
            vec![RecipeEntry { item: slag, quantity: 1 }],
            rate(1.0),
        )
        .unwrap();

    // 2 iron_plate + 4 copper_wire -> 1 motor per minute.
    builder
        .register_recipe(
            RecipeEntry { item: motor, quantity: 1 },
            vec![
                RecipeEntry { item: iron_plate, quantity: 2 },
                RecipeEntry { item: copper_wire, quantity: 4 },
            ],
            vec![],
            rate(1.0),
        )
        .unwrap();

    let registry = builder.build().unwrap();

    // Three motor units, keeping 50 motors buffered at the sink.
    let requirements = [Requirement {
        item: motor,
        count: 3,
        maintain: 50,
    }];
    let graph = build_factory(&registry, &requirements).unwrap();

    let summary = graph.summary();
    println!("=== Planned factory ===\n");
    println!("storage nodes:       {}", summary.storages);
    println!("fabrication nodes:   {}", summary.fabrications);
    println!("output sinks:        {}", summary.outputs);
    println!("relays:              {}", summary.relays);
    println!("relay storages:      {}", summary.relay_storages);
    println!("directed links:      {}", summary.links);

    print_storages(&graph, &registry);
    print_fabrications(&graph, &registry);
    print_outputs(&graph, &registry);
}

fn item_name(registry: &Registry, id: forgeplan_core::id::ItemId) -> &str {
    registry.get_item(id).map(|def| def.name.as_str()).unwrap_or("?")
}

fn print_storages(graph: &FactoryGraph, registry: &Registry) {
    println!("\n--- Storage buffers ---");
    for sid in graph.storage_ids() {
        let storage = graph.storage(sid);
        let kind = if storage.externally_fed {
            "ore"
        } else if storage.split.is_some() {
            "split"
        } else {
            "buffer"
        };
        println!(
            "{:>8} {:<12} ingress {:>6.2}/min egress {:>6.2}/min links {}in/{}out",
            kind,
            item_name(registry, storage.item),
            rate_to_f64(storage.ingress),
            rate_to_f64(storage.egress),
            storage.incoming_links(),
            storage.outgoing_links(),
        );
    }
}

fn print_fabrications(graph: &FactoryGraph, registry: &Registry) {
    println!("\n--- Fabrication units ---");
    for fid in graph.fabrication_ids() {
        let fab = graph.fabrication(fid);
        let inputs: Vec<String> = fab
            .inputs
            .iter()
            .map(|input| match input {
                FabInput::Storage { item, rate, .. } => {
                    format!("{} @{:.2}/min", item_name(registry, *item), rate_to_f64(*rate))
                }
                FabInput::RelayStorage { .. } => "relay-storage".to_string(),
            })
            .collect();
        let output = match fab.output {
            Some(FabOutput::Storage(_)) => "buffer",
            Some(FabOutput::Sink(_)) => "sink",
            None => "unwired",
        };
        println!(
            "{:<12} <- [{}] -> {}",
            item_name(registry, fab.item),
            inputs.join(", "),
            output,
        );
    }
}

fn print_outputs(graph: &FactoryGraph, registry: &Registry) {
    println!("\n--- Delivery sinks ---");
    for oid in graph.output_ids() {
        let output = graph.output(oid);
        println!(
            "{:<12} target {:.2}/min, maintain {}, fed by {} unit(s)",
            item_name(registry, output.item),
            rate_to_f64(output.rate),
            output.maintain,
            output.producers.len(),
        );
    }
}
