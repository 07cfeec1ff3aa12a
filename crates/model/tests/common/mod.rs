//! Shared fixtures for the model integration tests

#![allow(dead_code)]

use blockly_model::prelude::*;

pub const ACCURACY: f32 = 0.001;

pub fn tags(list: &[&str]) -> Option<Vec<String>> {
    Some(list.iter().map(|t| t.to_string()).collect())
}

/// A statement block with one input of every type and a field of every kind
pub fn frankenblock_builder() -> BlockBuilder {
    let mut bob = BlockBuilder::new("frankenblock");

    let mut input = InputBuilder::new(InputType::Value, "value_input");
    input.append_fields([
        Field::text_input("text_input", "something"),
        Field::checkbox("checkbox", true),
    ]);
    bob.input_builders.push(input);

    let mut input = InputBuilder::new(InputType::Statement, "statement_input");
    input.append_fields([
        Field::dropdown(
            "dropdown",
            vec![
                DropdownOption::new("option1", "OPTION1"),
                DropdownOption::new("option2", "OPTION2"),
                DropdownOption::new("option3", "OPTION3"),
            ],
            0,
        )
        .expect("valid dropdown"),
        Field::variable("variable", "item").expect("valid variable"),
    ]);
    bob.input_builders.push(input);

    let mut input = InputBuilder::new(InputType::Dummy, "dummy_input");
    input.append_fields([
        Field::angle("angle", 90.0).expect("valid angle"),
        Field::colour("color", Colour::rgb(1.0, 0.0, 1.0)),
        Field::image(
            "no name",
            "https://www.gstatic.com/codesite/ph/images/star_on.gif",
            Size::new(15.0, 20.0),
            "*",
        )
        .expect("valid image"),
    ]);
    bob.input_builders.push(input);

    bob.set_previous_connection(true, None)
        .expect("no output connection");
    bob.set_next_connection(true, tags(&["Boolean", "Number", "Array"]))
        .expect("no output connection");

    bob.with_colour_hue(20.0)
        .with_help_url("http://www.example.com")
        .with_tooltip("a tooltip")
}

/// Make a frankenblock and register it in `workspace`
pub fn build_frankenblock(graph: &mut BlockGraph, workspace: &mut Workspace) -> BlockId {
    let id = frankenblock_builder()
        .make_block_in(graph)
        .expect("frankenblock builds");
    workspace
        .add_block_tree(graph, id)
        .expect("fresh block registers");
    id
}

pub fn validate_frankenblock(block: &Block) {
    assert_eq!(block.name(), "frankenblock");
    assert_eq!(block.inputs().len(), 3);
    assert!((block.colour.hue() - 20.0 / 360.0).abs() < ACCURACY);
    assert_eq!(block.help_url, "http://www.example.com");
    assert_eq!(block.tooltip, "a tooltip");

    let previous = block.previous_connection().expect("previous connection");
    assert_eq!(previous.type_checks(), None);
    assert_eq!(previous.source_block(), block.id());

    let next = block.next_connection().expect("next connection");
    let expected: Vec<String> = ["Boolean", "Number", "Array"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(next.type_checks(), Some(&expected[..]));
    assert_eq!(next.source_block(), block.id());
    assert!(block.output_connection().is_none());

    let field_counts: Vec<usize> = block.inputs().iter().map(|i| i.fields().len()).collect();
    assert_eq!(field_counts, vec![2, 2, 3]);

    let input = &block.inputs()[0];
    assert_eq!(input.input_type(), InputType::Value);
    assert_eq!(input.source_block(), block.id());
    assert_eq!(input.connection().unwrap().source_block(), block.id());
    assert_eq!(input.fields()[0].name(), "text_input");
    assert_eq!(
        input.fields()[0].value(),
        &FieldValue::Input {
            text: "something".to_string()
        }
    );
    assert_eq!(input.fields()[1].kind(), FieldKind::Checkbox);

    let input = &block.inputs()[1];
    assert_eq!(input.input_type(), InputType::Statement);
    assert_eq!(input.source_block(), block.id());
    assert_eq!(input.connection().unwrap().source_block(), block.id());
    assert_eq!(input.fields()[0].kind(), FieldKind::Dropdown);
    assert_eq!(input.fields()[1].kind(), FieldKind::Variable);

    let input = &block.inputs()[2];
    assert_eq!(input.input_type(), InputType::Dummy);
    assert_eq!(input.source_block(), block.id());
    assert!(input.connection().is_none());
    assert_eq!(input.fields()[0].kind(), FieldKind::Angle);
    assert_eq!(input.fields()[1].kind(), FieldKind::Colour);
    assert_eq!(input.fields()[2].kind(), FieldKind::Image);
}
