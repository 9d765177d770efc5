//! # End-to-End Code Generation Tests
//!
//! These tests compile whole translation units and check the emitted program
//! text, the state table and the scheduled declaration order.

use domino::ast::{Expression, FunctionDecl, Param, Statement, TopLevelDecl, TranslationUnit};
use domino::compiler::{DeclKind, LoweringMode};
use domino::{CompileOptions, Compiler, Error};
use std::cell::Cell;
use std::rc::Rc;

fn state_var(name: &str, init: &str) -> TopLevelDecl {
    TopLevelDecl::Variable {
        type_name: "int".to_string(),
        name: name.to_string(),
        init: Some(Expression::int(init)),
    }
}

fn function(name: &str, param_type: &str, body: Statement) -> TopLevelDecl {
    TopLevelDecl::Function(FunctionDecl {
        name: name.to_string(),
        return_type: "void".to_string(),
        params: vec![Param::new(param_type, "pkt")],
        body,
    })
}

fn packet_function(name: &str, body: Statement) -> TopLevelDecl {
    function(name, "struct Packet", body)
}

/// `if (p.proto == 6) { s.count = s.count + 1; } else { s.count = s.count; }`
fn proto_counter_body() -> Statement {
    Statement::block(vec![Statement::if_else(
        Expression::binary("==", Expression::field("proto"), Expression::int("6")),
        Statement::block(vec![Statement::assign(
            Expression::state("count"),
            Expression::binary("+", Expression::state("count"), Expression::int("1")),
        )]),
        Statement::block(vec![Statement::assign(
            Expression::state("count"),
            Expression::state("count"),
        )]),
    )])
}

/// Test the worked example: one conditional over one packet field
#[test]
fn test_proto_counter_end_to_end() {
    let unit = TranslationUnit::new(vec![
        state_var("count", "0"),
        packet_function("func", proto_counter_body()),
    ]);

    let result = Compiler::new(CompileOptions::default())
        .compile(&unit)
        .unwrap();

    let expected = concat!(
        "extern \"C\" {\n",
        "void atom0(Packet & packet, State & state) {\n",
        "  bool tmp0;\n",
        "  tmp0 = (1 ? (p(\"proto\")==6) : tmp0);\n",
        "  s(\"count\") = (( 1 && tmp0 ) ? (s(\"count\")+1) : s(\"count\"));\n",
        "  s(\"count\") = (( 1 && !tmp0 ) ? (s(\"count\")) : s(\"count\"));\n",
        "}\n",
        "PacketFieldSet test_fields({\"proto\"});\n",
        "Pipeline test_pipeline{{Atom(atom0, FieldContainer())}};\n",
        "}\n",
    );
    assert_eq!(result.code, expected);

    assert_eq!(result.atoms.len(), 1);
    let fields: Vec<&str> = result.atoms[0].fields.iter().map(|f| f.as_str()).collect();
    assert_eq!(fields, vec!["proto"]);
    assert_eq!(result.state_table.get("count"), Some(&0));
    assert!(result.warnings.is_empty());
}

/// Test the declaration scheduling example: only the packet function is emitted
#[test]
fn test_declaration_scheduling_example() {
    let unit = TranslationUnit::new(vec![
        function("FunctionB", "int", Statement::block(vec![])),
        state_var("VariableA", "3"),
        packet_function(
            "FunctionC",
            Statement::block(vec![Statement::assign(
                Expression::field("out"),
                Expression::state("VariableA"),
            )]),
        ),
        TopLevelDecl::TypeAlias {
            name: "TypedefD".to_string(),
            target: "unsigned int".to_string(),
        },
    ]);

    let result = Compiler::new(CompileOptions::default())
        .compile(&unit)
        .unwrap();

    let order: Vec<(&str, DeclKind)> = result
        .schedule
        .iter()
        .map(|entry| (entry.name.as_str(), entry.kind))
        .collect();
    assert_eq!(
        order,
        vec![
            ("VariableA", DeclKind::StateVariable),
            ("FunctionB", DeclKind::OrdinaryFunction),
            ("FunctionC", DeclKind::PacketFunction),
            ("TypedefD", DeclKind::TypeAlias),
        ]
    );
    assert_eq!(result.atoms.len(), 1);
    assert_eq!(result.code.matches("extern \"C\"").count(), 1);
    assert_eq!(result.state_table.get("VariableA"), Some(&3));
}

/// Test that the front-end predicate is consulted exactly once per function
#[test]
fn test_predicate_called_once_per_function() {
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let predicate = move |func: &FunctionDecl| {
        counter.set(counter.get() + 1);
        func.name.starts_with("process")
    };

    let unit = TranslationUnit::new(vec![
        function("helper", "int", Statement::block(vec![])),
        function("process_a", "whatever", Statement::block(vec![])),
        function("process_b", "whatever", Statement::block(vec![])),
        state_var("unused", "1"),
    ]);

    let result = Compiler::with_predicate(CompileOptions::default(), predicate)
        .compile(&unit)
        .unwrap();

    assert_eq!(calls.get(), 3);
    let atom_names: Vec<&str> = result.atoms.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(atom_names, vec!["atom0", "atom1"]);
}

/// Test that temporaries are numbered across the whole translation unit
#[test]
fn test_temporaries_unique_across_functions() {
    let unit = TranslationUnit::new(vec![
        state_var("count", "0"),
        packet_function("first", proto_counter_body()),
        packet_function("second", proto_counter_body()),
    ]);

    let result = Compiler::new(CompileOptions::default())
        .compile(&unit)
        .unwrap();

    assert!(result.atoms[0].body.contains("bool tmp0;"));
    assert!(result.atoms[1].body.contains("bool tmp1;"));
    assert!(!result.atoms[1].body.contains("tmp0"));
}

/// Test that repeated compilation produces byte-identical output
#[test]
fn test_repeated_compilation_is_deterministic() {
    let unit = TranslationUnit::new(vec![
        state_var("count", "0"),
        packet_function("func", proto_counter_body()),
    ]);
    let compiler = Compiler::new(CompileOptions::default());

    let first = compiler.compile(&unit).unwrap();
    let second = compiler.compile(&unit).unwrap();
    assert_eq!(first.code, second.code);
}

/// Test that the include prologue appears once, before the first atom
#[test]
fn test_include_prologue() {
    let unit = TranslationUnit::new(vec![
        state_var("count", "0"),
        packet_function("first", proto_counter_body()),
        packet_function("second", proto_counter_body()),
    ]);
    let options = CompileOptions {
        emit_includes: true,
        ..CompileOptions::default()
    };

    let result = Compiler::new(options).compile(&unit).unwrap();
    assert!(result.code.starts_with(
        "#include \"packet.h\"\n#include \"atom.h\"\n#include \"pipeline.h\"\nextern \"C\" {\n"
    ));
    assert_eq!(result.code.matches("#include \"packet.h\"").count(), 1);
}

/// Test direct lowering keeps the branch structure
#[test]
fn test_direct_lowering_mode() {
    let unit = TranslationUnit::new(vec![
        state_var("count", "0"),
        packet_function("func", proto_counter_body()),
    ]);
    let options = CompileOptions {
        lowering_mode: LoweringMode::Direct,
        ..CompileOptions::default()
    };

    let result = Compiler::new(options).compile(&unit).unwrap();
    assert!(result.code.contains(
        "  if (p(\"proto\")==6) { s(\"count\")=s(\"count\")+1; } else { s(\"count\")=s(\"count\"); };\n"
    ));
    assert!(!result.code.contains("tmp0"));
}

/// Test that state variables no atom touches produce a warning
#[test]
fn test_unreferenced_state_warning() {
    let unit = TranslationUnit::new(vec![
        state_var("count", "0"),
        state_var("stale", "5"),
        packet_function("func", proto_counter_body()),
    ]);

    let result = Compiler::new(CompileOptions::default())
        .compile(&unit)
        .unwrap();
    assert_eq!(
        result.warnings,
        vec!["state variable stale is never referenced by any atom".to_string()]
    );
}

/// Test that a failure in a later function leaves no output at all
#[test]
fn test_failure_is_all_or_nothing() {
    let bad_body = Statement::block(vec![Statement::if_then(
        Expression::field("a"),
        Statement::block(vec![Statement::CompoundAssignment {
            op: "+=".to_string(),
            lhs: Expression::state("count"),
            rhs: Expression::int("1"),
        }]),
    )]);
    let unit = TranslationUnit::new(vec![
        state_var("count", "0"),
        packet_function("good", proto_counter_body()),
        packet_function("bad", bad_body),
    ]);

    let err = Compiler::new(CompileOptions::default())
        .compile(&unit)
        .unwrap_err();
    assert_eq!(
        err,
        Error::UnsupportedConstruct {
            kind: "compound assignment `+=`".to_string()
        }
    );
}

/// Test compiling a JSON hand-off from the front end
#[test]
fn test_compile_json_unit() {
    let json = r#"{
        "decls": [
            { "Variable": { "type_name": "int", "name": "last", "init": { "IntegerLiteral": "0x0" } } },
            { "Function": {
                "name": "func",
                "return_type": "void",
                "params": [ { "type_name": "struct Packet", "name": "pkt" } ],
                "body": { "Compound": [
                    { "Assignment": {
                        "lhs": { "StateAccess": "last" },
                        "rhs": { "FieldAccess": "sport" }
                    } }
                ] }
            } }
        ]
    }"#;

    let result = Compiler::new(CompileOptions::default())
        .compile_json(json)
        .unwrap();
    assert!(result
        .code
        .contains("  s(\"last\") = (1 ? (p(\"sport\")) : s(\"last\"));\n"));
    assert_eq!(result.state_table.get("last"), Some(&0));

    let as_json = serde_json::to_value(&result).unwrap();
    assert_eq!(as_json["state_table"]["last"], 0);
}

/// Test that atom names and temporaries skip file-scope names and parameters
#[test]
fn test_generated_names_skip_user_names() {
    let unit = TranslationUnit::new(vec![
        state_var("count", "0"),
        TopLevelDecl::Function(FunctionDecl {
            name: "atom0".to_string(),
            return_type: "void".to_string(),
            params: vec![Param::new("struct Packet", "tmp1")],
            body: proto_counter_body(),
        }),
        packet_function("tmp0", proto_counter_body()),
    ]);

    let result = Compiler::new(CompileOptions::default())
        .compile(&unit)
        .unwrap();

    let atom_names: Vec<&str> = result.atoms.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(atom_names, vec!["atom1", "atom2"]);
    assert!(result.atoms[0].body.contains("bool tmp2;"));
    assert!(result.atoms[1].body.contains("bool tmp3;"));
    assert!(!result.code.contains("void atom0("));
    assert!(!result.code.contains("bool tmp0;"));
    assert!(!result.code.contains("bool tmp1;"));
    assert!(result
        .code
        .contains("Pipeline test_pipeline{{Atom(atom1, FieldContainer())}};\n"));
}
