use httpmock::prelude::*;
use serde_json::json;

use crate::fixture::TestFixture;

fn ll1_data() -> serde_json::Value {
    json!({
        "S": "E",
        "Vn": ["E", "A", "T"],
        "Vt": ["+", "i", "#"],
        "first": {"E": ["i"], "A": ["+", "@"], "T": ["i"]},
        "follow": {"E": ["#"], "A": ["#"], "T": ["+", "#"]},
        "table": {"E|i": "E->TA", "A|+": "A->+TA", "A|#": "A->@", "T|i": "T->i"},
        "isLL1": true
    })
}

#[test]
fn analyze_persists_draft_and_logs_run() {
    let server = MockServer::start();
    let analyse = server.mock(|when, then| {
        when.method(POST)
            .path("/api/LL1Analyse")
            .json_body(json!({"inpProductions": ["E->TA", "A->+TA|@", "T->i"]}));
        then.status(200).json_body(json!({"code": 200, "data": ll1_data()}));
    });
    let fixture = TestFixture::with_backend("analyze_persists_draft_and_logs_run", &server.base_url());

    let (output, json) = fixture.run_json(&[
        "analyze", "ll1", "-p", "E->TA", "-p", "A->+TA|@", "-p", "T->i",
    ]);
    assert_command_success!(output);
    analyse.assert();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["data"]["analysis"]["kind"], "ll1");
    assert_eq!(json["data"]["analysis"]["result"]["isLL1"], true);

    let (output, json) = fixture.run_json(&["session", "show", "ll1"]);
    assert_command_success!(output);
    assert_eq!(json["data"]["key"], "store_ll1_store");
    assert_eq!(json["data"]["draft"]["productions"][2], "T->i");

    let (output, json) = fixture.run_json(&["session", "history", "ll1"]);
    assert_command_success!(output);
    assert_eq!(json["data"]["entries"].as_array().unwrap().len(), 1);

    let (output, json) = fixture.run_json(&["log"]);
    assert_command_success!(output);
    assert_eq!(json["data"]["current"], "ll1");
    assert_eq!(json["data"]["entries"][0]["success"], true);
}

#[test]
fn analyze_reuses_stored_productions() {
    let server = MockServer::start();
    let analyse = server.mock(|when, then| {
        when.method(POST)
            .path("/api/LL1Analyse")
            .json_body(json!({"inpProductions": ["S->a"]}));
        then.status(200).json_body(json!({"code": 200, "data": {"S": "S", "isLL1": true}}));
    });
    let trace = server.mock(|when, then| {
        when.method(POST)
            .path("/api/LL1AnalyseInp")
            .json_body(json!({"inpProductions": ["S->a"], "inpStr": "a"}));
        then.status(200).json_body(json!({
            "code": 200,
            "data": {"info_res": "accept", "info_step": [0, 1], "info_msg": ["match a"], "info_stack": [], "info_str": []}
        }));
    });
    let fixture = TestFixture::with_backend("analyze_reuses_stored_productions", &server.base_url());

    assert_command_success!(fixture.run_glab(&["session", "add", "ll1", "S->a"]));
    let output = fixture.run_glab(&["analyze", "ll1", "--input", "a"]);
    assert_command_success!(output);
    assert_stdout_contains!(output, "accept");
    assert_stdout_contains!(output, "match a");
    analyse.assert();
    trace.assert();
}

#[test]
fn lr_productions_are_stored_without_spaces() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST)
            .path("/api/LR0Analyse")
            .json_body(json!({"inpProductions": ["S->aS|b"]}));
        then.status(200).json_body(json!({"code": 0, "data": {"S": "S'", "isLR0": true}}));
    });
    let fixture = TestFixture::with_backend("lr_productions_are_stored_without_spaces", &server.base_url());

    assert_command_success!(fixture.run_glab(&["analyze", "lr0", "-p", "S -> a S | b"]));
    let (_, json) = fixture.run_json(&["session", "show", "lr0"]);
    assert_eq!(json["data"]["draft"]["productions"][0], "S->aS|b");
}

#[test]
fn backend_rejection_is_reported_and_logged() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/SLR1Analyse");
        then.status(200).json_body(json!({"code": 500, "msg": "not a grammar"}));
    });
    let fixture = TestFixture::with_backend("backend_rejection_is_reported_and_logged", &server.base_url());

    let output = fixture.run_glab(&["--json", "analyze", "slr1", "-p", "x"]);
    assert!(!output.success);
    assert_eq!(output.exit_code, 1);
    let json = output.json();
    assert_eq!(json["status"], "error");
    assert_eq!(json["code"], "backend");
    assert!(json["message"].as_str().unwrap().contains("not a grammar"));

    let (_, log) = fixture.run_json(&["log"]);
    assert_eq!(log["data"]["entries"][0]["success"], false);
    assert_eq!(log["data"]["entries"][0]["kind"], "slr1");
}

#[test]
fn analyze_without_productions_fails_validation() {
    let fixture = TestFixture::new("analyze_without_productions_fails_validation");
    let output = fixture.run_glab(&["--json", "analyze", "ll1"]);
    assert!(!output.success);
    assert_eq!(output.json()["code"], "invalid_input");
}

#[test]
fn regex_prints_requested_automaton() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST)
            .path("/api/Regex_to_DFAM")
            .json_body(json!({"inpRegex": "(a|b)*abb"}));
        then.status(200).json_body(json!({
            "code": 200,
            "data": {
                "table": {}, "table_to_num": {}, "table_to_num_min": {"A": {"a": "B"}},
                "NFA_dot_str": "digraph nfa {}",
                "DFA_dot_str": "digraph dfa {}",
                "Min_DFA_dot_str": "digraph min {}"
            }
        }));
    });
    let fixture = TestFixture::with_backend("regex_prints_requested_automaton", &server.base_url());

    let output = fixture.run_glab(&["regex", "(a|b)*abb", "--view", "nfa", "--dot"]);
    assert_command_success!(output);
    assert_eq!(output.stdout.trim(), "digraph nfa {}");

    let output = fixture.run_glab(&["regex"]);
    assert_command_success!(output);
    assert_stdout_contains!(output, "digraph min {}");

    let (_, json) = fixture.run_json(&["session", "show", "fa"]);
    assert_eq!(json["data"]["input_regex"], "(a|b)*abb");
}

#[test]
fn set_get_remove_cycle() {
    let fixture = TestFixture::new("set_get_remove_cycle");

    assert_command_success!(fixture.run_glab(&["set", "counter", r#"{"count": 1}"#]));

    let (output, json) = fixture.run_json(&["get", "counter"]);
    assert_command_success!(output);
    assert_eq!(json["data"]["result"]["outcome"], "loaded");
    assert_eq!(json["data"]["result"]["data"], json!({"count": 1}));
    assert_eq!(json["data"]["result"]["version"], "1.0.0");

    let output = fixture.run_glab(&["get", "counter", "--raw"]);
    assert_stdout_contains!(output, "\"checksum\"");

    assert_command_success!(fixture.run_glab(&["remove", "counter"]));
    let output = fixture.run_glab(&["--json", "get", "counter"]);
    assert!(!output.success);
    assert_eq!(output.json()["code"], "not_found");
}

#[test]
fn zero_ttl_stores_a_record_without_expiry() {
    let fixture = TestFixture::new("zero_ttl_stores_a_record_without_expiry");

    let (output, json) = fixture.run_json(&["set", "keep", "1", "--ttl-secs", "0"]);
    assert_command_success!(output);
    assert!(json["data"]["ttl_secs"].is_null());

    std::thread::sleep(std::time::Duration::from_millis(20));
    let (output, json) = fixture.run_json(&["get", "keep"]);
    assert_command_success!(output);
    assert_eq!(json["data"]["result"]["outcome"], "loaded");
    let raw = fixture.manager().raw("keep").unwrap().unwrap();
    assert!(!raw.contains("expiresAt"), "{raw}");
}

#[test]
fn get_reports_missing_migration_path() {
    let fixture = TestFixture::new("get_reports_missing_migration_path");
    assert_command_success!(fixture.run_glab(&["set", "k", "[1,2]", "--version", "1.0.0"]));

    let (output, json) = fixture.run_json(&["get", "k", "--version", "2.0.0"]);
    assert_command_success!(output);
    assert_eq!(json["data"]["result"]["outcome"], "no_migration_path");
    assert!(fixture.manager().raw("k").unwrap().is_none());
}

#[test]
fn clear_requires_approval() {
    let fixture = TestFixture::new("clear_requires_approval");
    assert_command_success!(fixture.run_glab(&["set", "a", "1"]));

    let output = fixture.run_glab(&["--json", "clear"]);
    assert!(!output.success);
    assert_eq!(output.json()["code"], "approval_required");
    assert!(fixture.manager().raw("a").unwrap().is_some());

    assert_command_success!(fixture.run_glab(&["clear", "--approve"]));
    assert!(fixture.manager().keys().unwrap().is_empty());
}

#[test]
fn export_then_import_into_another_store() {
    let source = TestFixture::new("export_source");
    let target = TestFixture::new("export_target");
    assert_command_success!(source.run_glab(&["set", "a", r#"{"x": 1}"#]));
    assert_command_success!(source.run_glab(&["set", "b", r#""text""#]));

    let export_path = source.root.join("export.json");
    let export_arg = export_path.to_string_lossy().to_string();
    assert_command_success!(source.run_glab(&["export", "--key", "a", "--out", &export_arg]));

    let (output, json) = target.run_json(&["import", &export_arg]);
    assert_command_success!(output);
    assert_eq!(json["data"]["imported"], 1);

    let manager = target.manager();
    assert_eq!(manager.load_value("a", None), Some(json!({"x": 1})));
    assert!(manager.raw("b").unwrap().is_none());
}

#[test]
fn stats_lists_largest_keys() {
    let fixture = TestFixture::new("stats_lists_largest_keys");
    assert_command_success!(fixture.run_glab(&["set", "small", "1"]));
    assert_command_success!(fixture.run_glab(&["set", "large", r#"{"payload": "xxxxxxxxxxxxxxxxxxxxxxxx"}"#]));

    let (output, json) = fixture.run_json(&["stats"]);
    assert_command_success!(output);
    assert_eq!(json["data"]["total_keys"], 2);
    assert_eq!(json["data"]["items"][0]["key"], "large");
}

#[test]
fn expired_records_are_evicted_on_open() {
    let fixture = TestFixture::new("expired_records_are_evicted_on_open");
    assert_command_success!(fixture.run_glab(&["set", "short", "1", "--ttl-secs", "1"]));
    std::thread::sleep(std::time::Duration::from_millis(1100));

    let (output, json) = fixture.run_json(&["prune"]);
    assert_command_success!(output);
    assert!(json["data"]["removed"].as_u64().is_some());
    assert!(fixture.manager().raw("short").unwrap().is_none());
}

#[test]
fn config_show_reflects_file_and_env() {
    let fixture = TestFixture::with_backend("config_show_reflects_file_and_env", "http://backend.test:8080");
    let (output, json) = fixture.run_json(&["config", "show"]);
    assert_command_success!(output);
    assert_eq!(json["data"]["config"]["backend"]["base_url"], "http://backend.test:8080");
    assert_eq!(json["data"]["config"]["persistence"]["save_delay_ms"], 0);
    assert_eq!(
        json["data"]["store_path"],
        fixture.db_path.to_string_lossy().as_ref()
    );
}

#[test]
fn ping_unreachable_backend_fails() {
    let fixture = TestFixture::new("ping_unreachable_backend_fails");
    let output = fixture.run_glab(&["--json", "ping"]);
    assert!(!output.success);
    assert_eq!(output.json()["code"], "http");
}
