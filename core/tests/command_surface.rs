//! JSON command surface: replies and error payloads as a client sees them.

use oracle_core::{
    app::OracleApp,
    command::ClientCommand,
    config::OracleConfig,
    demo::{seed_demo_catalog, DemoCatalog},
    identity::StaticIdentity,
    pointer::{CookiePointer, WorkspacePointer},
    types::{Identity, Role},
};
use serde_json::{json, Value};

fn setup() -> (OracleApp, String, DemoCatalog) {
    let app = OracleApp::build_test(OracleConfig::default_test()).expect("app");
    let ws = app.store().insert_workspace("Studio", None).unwrap();
    app.store().add_membership(&ws.id, "user-ana", Role::Client).unwrap();
    let catalog = seed_demo_catalog(app.store(), &ws.id).unwrap();
    (app, ws.id, catalog)
}

fn ana() -> StaticIdentity {
    StaticIdentity::signed_in(Identity::new("user-ana", "ana@oracle.test"))
}

fn send(app: &OracleApp, identity: &StaticIdentity, pointer: &mut CookiePointer, line: Value) -> Value {
    let cmd: ClientCommand = serde_json::from_value(line).expect("valid command");
    app.handle(identity, pointer, &cmd)
}

#[test]
fn create_reading_returns_reading_id() {
    let (app, ws, catalog) = setup();
    let mut pointer = CookiePointer::new(None);

    let reply = send(
        &app,
        &ana(),
        &mut pointer,
        json!({ "type": "create_reading", "spreadId": catalog.three_card_spread_id }),
    );
    let reading_id = reply["readingId"].as_str().expect("readingId in reply");
    assert_eq!(pointer.get().as_deref(), Some(ws.as_str()));

    let detail = send(
        &app,
        &ana(),
        &mut pointer,
        json!({ "type": "get_reading", "readingId": reading_id }),
    );
    assert_eq!(detail["reading"]["reading_id"], json!(reading_id));
    assert_eq!(detail["items"].as_array().map(Vec::len), Some(3));
    assert_eq!(detail["items"][0]["snapshot"]["position"]["title"], json!("Past"));

    let history = send(&app, &ana(), &mut pointer, json!({ "type": "history" }));
    assert_eq!(history["readings"].as_array().map(Vec::len), Some(1));
    assert!(history["next_cursor"].is_string());
}

#[test]
fn errors_carry_message_and_status() {
    let (app, _ws, catalog) = setup();
    let create = json!({ "type": "create_reading", "spreadId": catalog.one_card_spread_id });

    let mut pointer = CookiePointer::new(None);
    let reply = send(&app, &StaticIdentity::anonymous(), &mut pointer, create.clone());
    assert_eq!(reply["status"], json!(401));
    assert!(reply["message"].is_string());

    let outsider = StaticIdentity::signed_in(Identity::new("user-out", "out@oracle.test"));
    let reply = send(&app, &outsider, &mut pointer, create);
    assert_eq!(reply["status"], json!(400), "no workspace: {reply}");

    let reply = send(
        &app,
        &ana(),
        &mut pointer,
        json!({ "type": "create_reading", "spreadId": "missing" }),
    );
    assert_eq!(reply["status"], json!(404));

    let reply = send(&app, &ana(), &mut pointer, json!({ "type": "create_reading" }));
    assert_eq!(reply["status"], json!(400), "spreadId is required: {reply}");

    let reply = send(&app, &ana(), &mut pointer, json!({ "type": "list_allowed_emails" }));
    assert_eq!(reply["status"], json!(403));
}

#[test]
fn person_commands_round_trip() {
    let (app, _ws, catalog) = setup();
    let mut pointer = CookiePointer::new(None);

    let reply = send(
        &app,
        &ana(),
        &mut pointer,
        json!({ "type": "create_person", "name": "Carla", "tags": ["family"] }),
    );
    let person_id = reply["personId"].as_str().expect("personId").to_string();

    let reply = send(
        &app,
        &ana(),
        &mut pointer,
        json!({
            "type": "create_reading",
            "spreadId": catalog.one_card_spread_id,
            "personId": person_id,
        }),
    );
    assert!(reply["readingId"].is_string(), "reply {reply}");

    let persons = send(&app, &ana(), &mut pointer, json!({ "type": "list_persons" }));
    assert_eq!(persons[0]["reading_count"], json!(1));

    let reply = send(
        &app,
        &ana(),
        &mut pointer,
        json!({ "type": "archive_person", "personId": person_id }),
    );
    assert_eq!(reply, json!({ "ok": true }));
}

#[test]
fn redeem_command_sets_pointer() {
    let app = OracleApp::build_test(OracleConfig::default_test()).expect("app");
    let ws = app.store().insert_workspace("Studio", None).unwrap();
    app.store()
        .insert_access_code("WELCOME", &ws.id, Role::Staff, None)
        .unwrap();

    let newcomer = StaticIdentity::signed_in(Identity::new("user-new", "new@oracle.test"));
    let mut pointer = CookiePointer::new(None);
    let reply = send(
        &app,
        &newcomer,
        &mut pointer,
        json!({ "type": "redeem_access_code", "code": "WELCOME" }),
    );

    assert_eq!(reply["workspaceId"], json!(ws.id));
    assert_eq!(reply["role"], json!("staff"));
    assert_eq!(pointer.get().as_deref(), Some(ws.id.as_str()));
}

#[test]
fn master_commands_over_json() {
    let config = OracleConfig::default_test().with_master_email("  Root@Oracle.test");
    let app = OracleApp::build_test(config).expect("app");
    let root = StaticIdentity::signed_in(Identity::new("user-root", "root@oracle.test"));
    let mut pointer = CookiePointer::new(None);

    let reply = send(
        &app,
        &root,
        &mut pointer,
        json!({ "type": "add_allowed_email", "email": "guest@example.com" }),
    );
    let id = reply["allowedEmailId"].as_str().expect("id").to_string();

    let reply = send(
        &app,
        &root,
        &mut pointer,
        json!({ "type": "set_allowed_email_enabled", "allowedEmailId": id, "enabled": false }),
    );
    assert_eq!(reply, json!({ "ok": true }));

    let listed = send(&app, &root, &mut pointer, json!({ "type": "list_allowed_emails" }));
    assert_eq!(listed[0]["enabled"], json!(false));

    let reply = send(
        &app,
        &root,
        &mut pointer,
        json!({ "type": "delete_allowed_email", "allowedEmailId": id }),
    );
    assert_eq!(reply, json!({ "ok": true }));
}
