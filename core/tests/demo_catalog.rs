//! Demo catalog seeding: repeatable, role-guarded, one workspace per caller.

use oracle_core::{
    app::OracleApp,
    config::OracleConfig,
    demo::{seed_demo_catalog, seed_demo_workspace},
    error::OracleError,
    identity::StaticIdentity,
    pointer::CookiePointer,
    tenancy::{RouteScope, TenantContext},
    types::{Identity, Role},
};

fn app() -> OracleApp {
    OracleApp::build_test(OracleConfig::default_test()).expect("app")
}

fn join_ctx(app: &OracleApp, user_id: &str) -> TenantContext {
    let identity = StaticIdentity::signed_in(Identity::new(user_id, &format!("{user_id}@oracle.test")));
    let mut pointer = CookiePointer::new(None);
    app.resolve(&identity, &mut pointer, RouteScope::Join)
        .expect("join context")
}

#[test]
fn seeding_twice_reuses_the_deck_and_spreads() {
    let app = app();
    let ws = app.store().insert_workspace("Studio", None).unwrap();

    let first = seed_demo_catalog(app.store(), &ws.id).unwrap();
    let second = seed_demo_catalog(app.store(), &ws.id).unwrap();

    assert_eq!(first.deck_id, second.deck_id);
    assert_eq!(first.one_card_spread_id, second.one_card_spread_id);
    assert_eq!(first.three_card_spread_id, second.three_card_spread_id);

    let mut first_cards = first.card_ids.clone();
    let mut second_cards = second.card_ids.clone();
    first_cards.sort();
    second_cards.sort();
    assert_eq!(first_cards, second_cards);

    assert_eq!(app.store().published_cards(&ws.id, None).unwrap().len(), 5);
    assert_eq!(app.store().published_decks(&ws.id).unwrap().len(), 1);
    assert_eq!(app.store().published_spreads(&ws.id).unwrap().len(), 2);
}

#[test]
fn caller_without_workspace_gets_an_owned_one() {
    let app = app();

    let ctx = join_ctx(&app, "user-ana");
    assert!(ctx.workspace_id.is_none());
    let (workspace_id, catalog) = seed_demo_workspace(app.store(), &ctx).unwrap();

    assert_eq!(
        app.store().membership_role(&workspace_id, "user-ana").unwrap(),
        Some(Role::Owner)
    );
    let ws = app.store().get_workspace(&workspace_id).unwrap().expect("workspace");
    assert_eq!(ws.slug, None);
    assert_eq!(catalog.card_ids.len(), 5);
}

#[test]
fn two_callers_each_get_their_own_demo_workspace() {
    let app = app();

    let (ana_ws, _) = seed_demo_workspace(app.store(), &join_ctx(&app, "user-ana")).unwrap();
    let (bea_ws, _) = seed_demo_workspace(app.store(), &join_ctx(&app, "user-bea")).unwrap();

    assert_ne!(ana_ws, bea_ws);
    assert_eq!(app.store().workspace_count().unwrap(), 2);
}

#[test]
fn owner_reseeds_the_active_workspace_in_place() {
    let app = app();

    let (workspace_id, first) = seed_demo_workspace(app.store(), &join_ctx(&app, "user-ana")).unwrap();
    let (again_id, second) = seed_demo_workspace(app.store(), &join_ctx(&app, "user-ana")).unwrap();

    assert_eq!(workspace_id, again_id);
    assert_eq!(first.deck_id, second.deck_id);
    assert_eq!(app.store().workspace_count().unwrap(), 1);
    assert_eq!(app.store().published_cards(&workspace_id, None).unwrap().len(), 5);
}

#[test]
fn client_cannot_seed_the_demo_catalog() {
    let app = app();
    let ws = app.store().insert_workspace("Studio", None).unwrap();
    app.store().add_membership(&ws.id, "user-cli", Role::Client).unwrap();

    let ctx = join_ctx(&app, "user-cli");
    assert_eq!(ctx.workspace_id.as_deref(), Some(ws.id.as_str()));
    let err = seed_demo_workspace(app.store(), &ctx).unwrap_err();
    assert!(matches!(err, OracleError::Forbidden { .. }), "{err:?}");
    assert!(app.store().published_cards(&ws.id, None).unwrap().is_empty());
}

#[test]
fn anonymous_caller_cannot_seed() {
    let app = app();
    let mut pointer = CookiePointer::new(None);
    let ctx = app.resolve(&StaticIdentity::anonymous(), &mut pointer, RouteScope::Join);
    match ctx {
        Err(OracleError::Unauthenticated) => {}
        Ok(ctx) => assert!(matches!(
            seed_demo_workspace(app.store(), &ctx),
            Err(OracleError::Unauthenticated)
        )),
        Err(other) => panic!("unexpected error: {other:?}"),
    }
}
