// Integration tests for whole headers and parse sessions

use header_parser::{Error, Options, Parser};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

fn lua_options() -> Options {
    Options::new()
        .enum_keyword("LUA_ENUM")
        .class_keyword("LUA_CLASS")
        .constructor_keyword("LUA_CONSTRUCTOR")
        .namespace_keyword("LUA_NAMESPACE")
        .function_keyword("LUA_FUNCTION")
        .property_keyword("LUA_PROPERTY")
        .custom_keyword("LUA_MODULE")
}

fn parse_document(files: &[(&str, &str)]) -> Value {
    let mut parser = Parser::new(lua_options());
    let json = parser
        .parse_batch(files.iter().copied())
        .expect("Parsing failed");
    serde_json::from_str(&json).expect("Output is not valid JSON")
}

#[test]
fn test_game_header() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/game.h");
    let source = fs::read_to_string(path).expect("Failed to read fixture");

    let document = parse_document(&[("game.h", source.as_str())]);
    assert_eq!(document.as_array().unwrap().len(), 1);
    assert_eq!(document[0]["file"], "game.h");

    let content = document[0]["content"].as_array().unwrap();
    assert_eq!(content.len(), 4);
    assert_eq!(
        content[0],
        json!({ "type": "include", "line": 2, "file": "string" })
    );
    assert_eq!(
        content[1],
        json!({ "type": "include", "line": 3, "file": "Entity.h" })
    );
    assert_eq!(
        content[2],
        json!({
            "type": "macro",
            "name": "LUA_MODULE",
            "line": 5,
            "meta": { "name": "game", "version": 2 }
        })
    );

    let namespace = &content[3];
    assert_eq!(namespace["type"], "namespace");
    assert_eq!(namespace["name"], "game");
    assert_eq!(namespace["line"], 7);
    let members = namespace["members"].as_array().unwrap();
    assert_eq!(members.len(), 2);

    assert_eq!(
        members[0],
        json!({
            "type": "enum",
            "line": 10,
            "comment": "Kinds of object in the world",
            "meta": {},
            "name": "ObjectType",
            "cxxclass": true,
            "base": "std::uint8_t",
            "members": [
                { "key": "Player", "value": "1" },
                { "key": "Npc", "value": "Player<<1" },
                { "key": "Item" }
            ]
        })
    );

    let player = &members[1];
    assert_eq!(player["type"], "class");
    assert_eq!(player["line"], 19);
    assert_eq!(player["comment"], "A player in the world");
    assert_eq!(
        player["meta"],
        json!({ "name": "Player", "doc": { "group": "actors", "weight": 1.5 } })
    );
    assert_eq!(
        player["parents"],
        json!([
            {
                "access": "public",
                "name": { "type": "literal", "name": "Entity" }
            },
            {
                "access": "protected",
                "virtual": true,
                "name": { "type": "literal", "name": "Serializable" }
            }
        ])
    );
    assert!(player.get("access").is_none());

    let methods = player["members"].as_array().unwrap();
    let names: Vec<&str> = methods
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        ["Reset", "Player", "Move", "Inventory", "OnEvent", "health", "nickname"]
    );

    assert_eq!(methods[0]["access"], "private");
    assert!(methods[0].get("comment").is_none());

    assert_eq!(
        methods[1],
        json!({
            "type": "constructor",
            "macro": "LUA_CONSTRUCTOR",
            "line": 26,
            "meta": {},
            "access": "public",
            "explicit": true,
            "name": "Player",
            "arguments": [
                {
                    "type": {
                        "type": "reference",
                        "baseType": { "const": true, "type": "literal", "name": "std::string" }
                    },
                    "name": "name"
                },
                {
                    "type": { "type": "literal", "name": "int" },
                    "name": "level",
                    "defaultValue": 1
                }
            ]
        })
    );

    let movement = &methods[2];
    assert_eq!(movement["comment"], "Moves the player by an offset");
    assert_eq!(movement["meta"], json!({ "static": false }));
    assert_eq!(movement["virtual"], true);
    assert_eq!(movement["const"], true);
    assert_eq!(movement["override"], true);
    assert_eq!(movement["returnType"], json!({ "type": "literal", "name": "bool" }));
    assert_eq!(movement["arguments"][1]["defaultValue"], 0.5);

    assert_eq!(methods[3]["returnType"]["type"], "template");
    assert_eq!(methods[3]["const"], true);

    let on_event = &methods[4]["arguments"];
    assert_eq!(on_event[0]["type"]["type"], "function");
    assert!(on_event[0].get("name").is_none());
    assert_eq!(on_event[1]["defaultValue"], "Callback(1,2)");

    assert_eq!(
        methods[5],
        json!({
            "type": "property",
            "macro": "LUA_PROPERTY",
            "line": 45,
            "meta": { "GET": null, "SET": null },
            "access": "public",
            "dataType": { "type": "literal", "name": "int" },
            "name": "health"
        })
    );
    assert_eq!(methods[6]["access"], "protected");
    assert_eq!(methods[6]["mutable"], true);
    assert_eq!(methods[6]["dataType"]["type"], "pointer");
}

#[test]
fn test_output_layout() {
    let mut parser = Parser::new(Options::default());
    let json = parser.parse_batch([("a.h", "")]).unwrap();
    assert_eq!(
        json,
        "[\n    {\n        \"file\": \"a.h\",\n        \"content\": []\n    }\n]"
    );
}

#[test]
fn test_empty_session() {
    let mut parser = Parser::new(Options::default());
    let session = parser.open(Vec::new()).unwrap();
    assert_eq!(session.close().unwrap(), b"[]");
}

#[test]
fn test_files_keep_order() {
    let document = parse_document(&[("b.h", ""), ("a.h", ""), ("c.h", "")]);
    let files: Vec<&str> = document
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["file"].as_str().unwrap())
        .collect();
    assert_eq!(files, ["b.h", "a.h", "c.h"]);
}

#[test]
fn test_failed_file_is_left_out() {
    let mut parser = Parser::new(Options::default());
    let mut session = parser.open(Vec::new()).unwrap();

    let err = session
        .parse("CLASS() class Foo {\n CONSTRUCTOR() Bar();\n};", "bad.h")
        .unwrap_err();
    match &err {
        Error::Parse {
            file,
            line,
            message,
        } => {
            assert_eq!(file, "bad.h");
            assert_eq!(*line, 2);
            assert!(message.contains("does not match"), "{message}");
        }
        other => panic!("Expected parse error, found {:?}", other),
    }
    assert!(!err.is_fatal());

    session.parse("FUNCTION() void f();", "good.h").unwrap();
    assert_eq!(session.files(), 1);

    let bytes = session.close().unwrap();
    let document: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(document.as_array().unwrap().len(), 1);
    assert_eq!(document[0]["file"], "good.h");
    assert_eq!(document[0]["content"][0]["name"], "f");
}

#[test]
fn test_parser_is_reusable_across_sessions() {
    let mut parser = Parser::new(Options::default());
    let first = parser.parse_batch([("a.h", "namespace a {")]);
    assert!(first.is_err());

    let second = parser
        .parse_batch([("b.h", "FUNCTION() void f();")])
        .unwrap();
    let document: Value = serde_json::from_str(&second).unwrap();
    assert!(document[0]["content"][0].get("access").is_none());
}

#[test]
fn test_batch_stops_at_first_failure() {
    let mut parser = Parser::new(Options::default());
    let err = parser
        .parse_batch([("ok.h", ""), ("broken.h", "ENUM() enum {"), ("never.h", "")])
        .unwrap_err();
    assert!(err.to_string().starts_with("broken.h:1:"), "{err}");
}

/// Run `test` on a thread with room for deeply recursive parses.
fn with_large_stack(test: impl FnOnce() + Send + 'static) {
    std::thread::Builder::new()
        .stack_size(64 * 1024 * 1024)
        .spawn(test)
        .unwrap()
        .join()
        .unwrap();
}

#[test]
fn test_scope_overflow_is_fatal() {
    with_large_stack(|| {
        let source = "namespace n { ".repeat(300);
        let mut parser = Parser::new(Options::default());
        let err = parser.parse_batch([("deep.h", source.as_str())]).unwrap_err();
        assert!(err.is_fatal(), "{err}");
    });
}

#[test]
fn test_deep_nesting_within_limit() {
    with_large_stack(|| {
        let source = format!("{}{}", "namespace n { ".repeat(128), "} ".repeat(128));
        let document = parse_document(&[("deep.h", source.as_str())]);
        let mut node = &document[0]["content"][0];
        let mut depth = 0;
        while node["type"] == "namespace" {
            depth += 1;
            node = &node["members"][0];
        }
        assert_eq!(depth, 128);
    });
}

#[test]
fn test_options_from_json() {
    let options = Options::from_json(
        r#"{ "class_keyword": "EXPORT", "property_keywords": ["FIELD", "PROP"] }"#,
    )
    .unwrap();
    let mut parser = Parser::new(options);
    let json = parser
        .parse_batch([(
            "x.h",
            "EXPORT() struct V { FIELD() float x; PROP() float y; };",
        )])
        .unwrap();
    let document: Value = serde_json::from_str(&json).unwrap();
    let members = &document[0]["content"][0]["members"];
    assert_eq!(members[0]["macro"], "FIELD");
    assert_eq!(members[1]["macro"], "PROP");
    assert_eq!(members[1]["access"], "public");
}
