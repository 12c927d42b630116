//! oracle-runner: headless runner for tenant-scoped card readings.
//!
//! Usage:
//!   oracle-runner --db oracle.db --user u1 --email a@b.c --seed-demo
//!   oracle-runner --db oracle.db --config oracle.json --user u1 --email a@b.c \
//!       create-reading --spread SPREAD_ID [--deck DECK_ID] [--person PERSON_ID]
//!   oracle-runner --db oracle.db --user u1 --email a@b.c --ipc-mode

use anyhow::{Context, Result};
use oracle_core::{
    app::OracleApp,
    command::ClientCommand,
    config::{OracleConfig, ProvisioningPolicy},
    demo::seed_demo_workspace,
    identity::{IdentityProvider, StaticIdentity},
    pointer::{CookiePointer, WorkspacePointer},
    reading::CreateReadingRequest,
    store::OracleStore,
    tenancy::RouteScope,
    types::Identity,
};
use std::env;
use std::io::{self, BufRead, Write};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let seed_requested = args.iter().any(|a| a == "--seed-demo");
    let db = flag_value(&args, "--db").unwrap_or(":memory:");
    let user = flag_value(&args, "--user");
    let email = flag_value(&args, "--email").unwrap_or_default();

    let config = match flag_value(&args, "--config") {
        Some(path) => OracleConfig::load(path)?,
        None => OracleConfig::default(),
    };

    if !ipc_mode {
        println!("Oracle - oracle-runner");
        println!("  db:           {db}");
        println!("  user:         {}", user.unwrap_or("(anonymous)"));
        println!("  provisioning: {}", policy_label(&config.provisioning));
        println!();
    }

    // For :memory: use a shared-cache URI so the admin handle's second
    // connection sees the same database.
    let store = if db == ":memory:" {
        OracleStore::in_memory()?
    } else {
        OracleStore::open(db)?
    };
    store.migrate()?;
    let app = OracleApp::build(store, config)?;

    let identity = match user {
        Some(id) => StaticIdentity::signed_in(Identity::new(id, email)),
        None => StaticIdentity::anonymous(),
    };
    let mut pointer = CookiePointer::new(flag_value(&args, "--pointer"));

    if seed_requested {
        seed_demo(&app, &identity, &mut pointer)?;
    }

    if ipc_mode {
        run_ipc_loop(&app, &identity, &mut pointer)?;
    } else if args.iter().any(|a| a == "create-reading") {
        let spread = flag_value(&args, "--spread").context("create-reading needs --spread")?;
        let mut request = CreateReadingRequest::for_spread(spread);
        if let Some(deck) = flag_value(&args, "--deck") {
            request = request.with_deck(deck);
        }
        if let Some(person) = flag_value(&args, "--person") {
            request = request.with_person(person);
        }
        let reply = app.handle(&identity, &mut pointer, &ClientCommand::CreateReading(request));
        println!("{}", serde_json::to_string(&reply)?);
        if let Some(reading_id) = reply["readingId"].as_str() {
            print_reading(&app, &identity, &mut pointer, reading_id)?;
        }
    } else {
        print_summary(&app, &identity, &mut pointer)?;
    }

    Ok(())
}

fn run_ipc_loop(
    app: &OracleApp,
    identity: &dyn IdentityProvider,
    pointer: &mut CookiePointer,
) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: ClientCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "message": e.to_string(), "status": 400 });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        if cmd == ClientCommand::Quit {
            break;
        }
        let reply = app.handle(identity, pointer, &cmd);
        writeln!(stdout, "{}", serde_json::to_string(&reply)?)?;
        stdout.flush()?;
    }
    Ok(())
}

/// Publish the demo catalog into the caller's workspace (or a new one).
fn seed_demo(
    app: &OracleApp,
    identity: &dyn IdentityProvider,
    pointer: &mut CookiePointer,
) -> Result<()> {
    let ctx = app.resolve(identity, pointer, RouteScope::Join)?;
    let (workspace_id, catalog) = seed_demo_workspace(app.store(), &ctx)?;
    pointer.set(&workspace_id);

    println!("=== DEMO CATALOG ===");
    println!("  workspace:      {workspace_id}");
    println!("  deck:           {}", catalog.deck_id);
    println!("  cards:          {}", catalog.card_ids.len());
    println!("  1 card spread:  {}", catalog.one_card_spread_id);
    println!("  3 cards spread: {}", catalog.three_card_spread_id);
    println!();
    Ok(())
}

fn print_reading(
    app: &OracleApp,
    identity: &dyn IdentityProvider,
    pointer: &mut CookiePointer,
    reading_id: &str,
) -> Result<()> {
    let ctx = app.resolve(identity, pointer, RouteScope::Tenant)?;
    let detail = app.readings().get_reading(&ctx, reading_id)?;
    println!();
    println!("=== READING ===");
    println!("  reading_id: {}", detail.reading.reading_id);
    println!("  spread:     {}", detail.reading.spread_name);
    println!("  seed:       {}", detail.reading.random_seed);
    for item in &detail.items {
        println!(
            "  {}. {:<12} {} ({})",
            item.position_index,
            item.snapshot.position.title,
            item.snapshot.card.name,
            item.snapshot.card.short_message
        );
    }
    Ok(())
}

fn print_summary(
    app: &OracleApp,
    identity: &dyn IdentityProvider,
    pointer: &mut CookiePointer,
) -> Result<()> {
    let ctx = match app.resolve(identity, pointer, RouteScope::Join) {
        Ok(ctx) => ctx,
        Err(e) => {
            println!("  (not signed in: {e})");
            return Ok(());
        }
    };
    println!("=== TENANCY ===");
    println!("  state:     {:?}", ctx.state);
    println!("  master:    {}", ctx.is_master);
    let Some(workspace_id) = ctx.workspace_id.as_deref() else {
        println!("  workspace: (none, redeem an access code to join)");
        return Ok(());
    };
    let role = ctx.role.map(|r| r.as_str()).unwrap_or("-");
    println!("  workspace: {workspace_id}");
    println!("  role:      {role}");
    println!("  pointer:   {}", pointer.get().unwrap_or_default());

    println!();
    println!("=== CATALOG ===");
    for spread in app.store().published_spreads(workspace_id)? {
        println!(
            "  spread {} | {} | {} card(s)",
            spread.spread_id, spread.name, spread.card_count
        );
    }
    for deck in app.store().published_decks(workspace_id)? {
        println!("  deck   {} | {}", deck.deck_id, deck.name);
    }
    println!("  readings:  {}", app.store().reading_count(workspace_id)?);
    Ok(())
}

fn policy_label(policy: &ProvisioningPolicy) -> String {
    match policy {
        ProvisioningPolicy::NoProvision => "no_provision".into(),
        ProvisioningPolicy::GlobalAutoJoin { workspace_id } => {
            format!("global_auto_join ({workspace_id})")
        }
        ProvisioningPolicy::PersonalAutoCreate => "personal_auto_create".into(),
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
