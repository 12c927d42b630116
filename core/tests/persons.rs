//! Person profiles: creation rules, listing and archiving.

use oracle_core::{
    app::OracleApp,
    config::OracleConfig,
    error::OracleError,
    identity::StaticIdentity,
    pointer::CookiePointer,
    tenancy::{RouteScope, TenantContext},
    types::{Identity, Role},
};
use std::time::Duration;

fn app_with_members() -> OracleApp {
    let app = OracleApp::build_test(OracleConfig::default_test()).expect("app");
    let ws = app.store().insert_workspace("Studio", None).unwrap();
    app.store().add_membership(&ws.id, "user-owner", Role::Owner).unwrap();
    app.store().add_membership(&ws.id, "user-ana", Role::Client).unwrap();
    app.store().add_membership(&ws.id, "user-beto", Role::Client).unwrap();
    app
}

fn ctx_for(app: &OracleApp, user_id: &str) -> TenantContext {
    let identity = StaticIdentity::signed_in(Identity::new(user_id, format!("{user_id}@oracle.test")));
    let mut pointer = CookiePointer::new(None);
    app.resolve(&identity, &mut pointer, RouteScope::Tenant)
        .expect("tenant context")
}

#[test]
fn name_is_trimmed_and_required() {
    let app = app_with_members();
    let ctx = ctx_for(&app, "user-ana");

    let err = app.persons().create_person(&ctx, "   ", None, &[]).unwrap_err();
    assert!(matches!(err, OracleError::InvalidInput { .. }), "got {err:?}");

    app.persons()
        .create_person(&ctx, "  Carla  ", None, &[" tarot ".into(), "".into()])
        .unwrap();
    let listed = app.persons().list_own_persons(&ctx).unwrap();
    assert_eq!(listed[0].name, "Carla");
    assert_eq!(listed[0].tags, vec!["tarot".to_string()]);
}

#[test]
fn duplicate_active_name_per_creator_is_rejected() {
    let app = app_with_members();
    let ana = ctx_for(&app, "user-ana");
    let beto = ctx_for(&app, "user-beto");

    let first = app.persons().create_person(&ana, "Carla", None, &[]).unwrap();
    let err = app.persons().create_person(&ana, "Carla", None, &[]).unwrap_err();
    assert!(matches!(err, OracleError::InvalidInput { .. }), "got {err:?}");

    // Another creator may use the same name.
    app.persons().create_person(&beto, "Carla", None, &[]).unwrap();

    // Archiving frees the name again.
    app.persons().archive_person(&ana, &first).unwrap();
    app.persons().create_person(&ana, "Carla", None, &[]).unwrap();
}

#[test]
fn list_shows_only_own_active_profiles_newest_first() {
    let app = app_with_members();
    let ana = ctx_for(&app, "user-ana");
    let beto = ctx_for(&app, "user-beto");

    app.persons().create_person(&ana, "First", None, &[]).unwrap();
    std::thread::sleep(Duration::from_millis(2));
    let archived = app.persons().create_person(&ana, "Gone", None, &[]).unwrap();
    std::thread::sleep(Duration::from_millis(2));
    app.persons().create_person(&ana, "Latest", None, &[]).unwrap();
    app.persons().create_person(&beto, "Not mine", None, &[]).unwrap();
    app.persons().archive_person(&ana, &archived).unwrap();

    let names: Vec<String> = app
        .persons()
        .list_own_persons(&ana)
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["Latest".to_string(), "First".to_string()]);
}

#[test]
fn only_creator_or_elevated_role_may_archive() {
    let app = app_with_members();
    let ana = ctx_for(&app, "user-ana");
    let beto = ctx_for(&app, "user-beto");
    let owner = ctx_for(&app, "user-owner");

    let person_id = app.persons().create_person(&ana, "Carla", None, &[]).unwrap();

    let err = app.persons().archive_person(&beto, &person_id).unwrap_err();
    assert!(matches!(err, OracleError::Forbidden { .. }), "got {err:?}");

    app.persons().archive_person(&owner, &person_id).unwrap();

    let err = app.persons().archive_person(&ana, &person_id).unwrap_err();
    assert!(matches!(err, OracleError::NotFound { .. }), "already archived: {err:?}");
}
