//! Blockly model demo
//!
//! Builds a small program out of blocks, joins and copies a block, and
//! prints the resulting workspace as an outline. Set `RUST_LOG=debug` to
//! watch the graph mutations.

use anyhow::{Context, Result};
use blockly_core::Position;
use blockly_model::prelude::*;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    println!("blockly v{}", blockly_model::VERSION);
    println!();

    let mut graph = BlockGraph::new();
    let mut workspace = Workspace::new("demo");

    let repeat = repeat_block().make_block_in(&mut graph)?;
    let print = print_block()?.make_block_in(&mut graph)?;
    let text = text_block("hello")?.make_block_in(&mut graph)?;

    graph
        .connect(ConnectionRef::input(print, 0), ConnectionRef::output(text))
        .context("plugging text into print")?;
    let statements = graph
        .get(repeat)?
        .input_index("DO")
        .context("repeat block has no DO input")?;
    graph
        .connect(
            ConnectionRef::input(repeat, statements),
            ConnectionRef::previous(print),
        )
        .context("nesting print inside repeat")?;
    workspace.add_block_tree(&mut graph, repeat)?;

    // A copy carries the fields but none of the connections
    let copy = BlockBuilder::from_block(graph.get(print)?)
        .with_position(Position::new(0.0, 120.0))
        .make_block()?;
    let copy = graph.insert(copy);
    workspace.add_block_tree(&mut graph, copy)?;

    workspace.validate_with(&graph)?;
    tracing::info!(
        "Workspace '{}' holds {} block(s) in {} tree(s)",
        workspace.name,
        workspace.block_count(),
        workspace.top_blocks(&graph).len()
    );

    for top in workspace.top_blocks(&graph) {
        print_tree(&graph, top, 0)?;
    }
    Ok(())
}

fn repeat_block() -> BlockBuilder {
    let mut times = InputBuilder::new(InputType::Dummy, "");
    times.append_fields([
        Field::label("repeat", "repeat"),
        Field::text_input("TIMES", "10"),
        Field::label("times", "times"),
    ]);
    let mut body = InputBuilder::new(InputType::Statement, "DO");
    body.append_field(Field::label("do", "do"));

    BlockBuilder::new("controls_repeat")
        .with_input(times)
        .with_input(body)
        .with_colour_hue(120.0)
        .with_tooltip("Do some statements several times.")
}

fn print_block() -> EngineResult<BlockBuilder> {
    let mut value = InputBuilder::new(InputType::Value, "TEXT");
    value.append_field(Field::label("print", "print"));

    let mut bob = BlockBuilder::new("text_print")
        .with_input(value)
        .with_colour_hue(160.0);
    bob.set_previous_connection(true, None)?;
    bob.set_next_connection(true, None)?;
    Ok(bob)
}

fn text_block(text: &str) -> EngineResult<BlockBuilder> {
    let mut input = InputBuilder::new(InputType::Dummy, "");
    input.append_field(Field::text_input("TEXT", text));

    let mut bob = BlockBuilder::new("text")
        .with_input(input)
        .with_colour_hue(160.0);
    bob.set_output_connection(true, Some(vec!["String".to_string()]))?;
    Ok(bob)
}

fn print_tree(graph: &BlockGraph, id: BlockId, depth: usize) -> Result<()> {
    let block = graph.get(id)?;
    let fields: Vec<String> = block
        .inputs()
        .iter()
        .flat_map(|input| input.fields())
        .map(|field| field.text())
        .collect();
    println!(
        "{}{} [{}] {}",
        "  ".repeat(depth),
        block.name(),
        block.colour,
        fields.join(" ")
    );

    for index in 0..block.inputs().len() {
        if let Some(child) = graph.input_child(id, index) {
            print_tree(graph, child, depth + 1)?;
        }
    }
    if let Some(next) = graph.next_block(id) {
        print_tree(graph, next, depth)?;
    }
    Ok(())
}
