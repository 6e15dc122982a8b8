//! Example: Load a scene file and print its hierarchy and animation.
//!
//! Run with: cargo run --example inspect_scene -- character.json

use std::env;

use rigscale_core::scene::{Deformer, NodeAttribute, SceneNode};
use rigscale_core::{load_scene, Channel};

fn print_node(node: &SceneNode, depth: usize) {
    let indent = "  ".repeat(depth + 1);
    let t = node.translation;
    println!(
        "{}[{}] {} ({}) at ({:.2}, {:.2}, {:.2})",
        indent,
        node.id.0,
        node.name,
        node.attribute.label(),
        t.x,
        t.y,
        t.z
    );

    match &node.attribute {
        NodeAttribute::Skeleton(skeleton) => {
            if let Some(extent) = skeleton.extent() {
                println!("{}  extent: {:.3}", indent, extent);
            }
        }
        NodeAttribute::Mesh(mesh) => {
            println!("{}  vertices: {}, polygons: {}", indent, mesh.vertices.len(), mesh.polygons.len());
            for deformer in &mesh.deformers {
                match deformer {
                    Deformer::Skin(skin) => {
                        println!("{}  skin '{}' with {} clusters", indent, skin.name, skin.clusters.len())
                    }
                    Deformer::BlendShape { name } => println!("{}  blend shape '{}'", indent, name),
                    Deformer::VertexCache { name } => println!("{}  vertex cache '{}'", indent, name),
                    Deformer::Unknown { name } => println!("{}  deformer '{}'", indent, name),
                }
            }
        }
        _ => {}
    }

    for child in &node.children {
        print_node(child, depth + 1);
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        println!("Usage: inspect_scene <path-to-scene.json>");
        println!("\nExample:");
        println!("  cargo run --example inspect_scene -- character.json");
        return;
    }

    let path = &args[1];
    println!("Loading scene file: {}", path);

    match load_scene(path) {
        Ok(scene) => {
            println!("\n=== Scene: {} ===", scene.name);
            println!("Nodes: {}", scene.node_count());
            println!("Axis system: {:?}", scene.axis_system);
            println!("Unit: {:?}", scene.system_unit);

            println!("\n--- Hierarchy ---");
            print_node(&scene.root, 0);

            println!("\n--- Animation ---");
            for stack in &scene.animation_stacks {
                println!("  Stack '{}'", stack.name);
                for layer in &stack.layers {
                    let mut counts = [0usize; 3];
                    for curves in layer.curves.values() {
                        for (i, channel) in [Channel::Translation, Channel::Rotation, Channel::Scale]
                            .into_iter()
                            .enumerate()
                        {
                            counts[i] += curves.channel(channel).iter().flatten().count();
                        }
                    }
                    println!(
                        "    Layer '{}': {} nodes, {} translation / {} rotation / {} scale curves",
                        layer.name,
                        layer.curves.len(),
                        counts[0],
                        counts[1],
                        counts[2]
                    );
                }
            }
        }
        Err(e) => {
            eprintln!("Error loading scene file: {}", e);
        }
    }
}
