//! Demo catalog: one published deck of five archangel cards and the two
//! stock spreads. Lets a fresh database serve readings straight away.

use crate::{
    error::{OracleError, OracleResult},
    store::{NewCard, OracleStore},
    tenancy::TenantContext,
    types::{ContentStatus, EntityId, WorkspaceId},
};

struct DemoCard {
    name: &'static str,
    image_path: &'static str,
    short_message: &'static str,
    meaning: &'static str,
    meaning_extended: &'static str,
}

const DEMO_DECK_NAME: &str = "Arcángeles";

const DEMO_WORKSPACE_NAME: &str = "Demo workspace";

const DEMO_CARDS: [DemoCard; 5] = [
    DemoCard {
        name: "Arcángel Miguel",
        image_path: "/cards/arcangel-miguel.png",
        short_message: "Protección y fortaleza",
        meaning: "Pedí protección y avanzá con coraje. Estás siendo guiada/o hacia lo correcto.",
        meaning_extended: "Marcá límites, soltá el miedo y tomá una decisión clara. La energía te acompaña para actuar con firmeza y amor.",
    },
    DemoCard {
        name: "Arcángel Gabriel",
        image_path: "/cards/arcangel-gabriel.png",
        short_message: "Mensaje y claridad",
        meaning: "Tu intuición trae una señal. Decí tu verdad con suavidad y precisión.",
        meaning_extended: "Es buen momento para comunicar, crear o pedir ayuda. Prestá atención a sueños, sincronías y conversaciones clave.",
    },
    DemoCard {
        name: "Arcángel Rafael",
        image_path: "/cards/arcangel-rafael.png",
        short_message: "Sanación y bienestar",
        meaning: "Cuidá tu energía y tu cuerpo. La sanación está en marcha.",
        meaning_extended: "Bajá el ritmo, priorizá hábitos que te nutran y aceptá apoyo. La recuperación se acelera cuando te tratás con ternura.",
    },
    DemoCard {
        name: "Arcángel Uriel",
        image_path: "/cards/arcangel-uriel.png",
        short_message: "Sabiduría y solución",
        meaning: "Una idea práctica aparece. Confiá en tu capacidad de resolver.",
        meaning_extended: "Buscá una respuesta simple y accionable. Orden, foco y un paso a la vez: ahí está la llave.",
    },
    DemoCard {
        name: "Arcángel Metatrón",
        image_path: "/cards/arcangel-metatron.png",
        short_message: "Propósito y alineación",
        meaning: "Volvé a tu centro. Elegí lo que te eleva y te ordena.",
        meaning_extended: "Priorizá lo esencial, soltá distracciones y escuchá tu llamado. Cuando te alineás, el camino se abre con claridad.",
    },
];

/// Ids of the rows written by [`seed_demo_catalog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoCatalog {
    pub deck_id: EntityId,
    pub card_ids: Vec<EntityId>,
    pub one_card_spread_id: EntityId,
    pub three_card_spread_id: EntityId,
}

/// Publish the demo deck and spreads into `workspace_id`. Running it again
/// reuses the existing deck and spreads, so the draw pool never grows.
pub fn seed_demo_catalog(store: &OracleStore, workspace_id: &str) -> OracleResult<DemoCatalog> {
    let (deck_id, card_ids) = match store.deck_id_by_name(workspace_id, DEMO_DECK_NAME)? {
        Some(deck_id) => {
            let card_ids = store
                .published_cards(workspace_id, Some(deck_id.as_str()))?
                .into_iter()
                .map(|c| c.card_id)
                .collect();
            (deck_id, card_ids)
        }
        None => {
            let deck_id =
                store.insert_deck(workspace_id, DEMO_DECK_NAME, ContentStatus::Published)?;
            let card_ids = insert_demo_cards(store, workspace_id, &deck_id)?;
            (deck_id, card_ids)
        }
    };

    let one_card_spread_id = demo_spread(store, workspace_id, "1 card", &["Message"])?;
    let three_card_spread_id =
        demo_spread(store, workspace_id, "3 cards", &["Past", "Present", "Future"])?;

    log::info!(
        "demo catalog ready in workspace={workspace_id}: {} cards, 2 spreads",
        card_ids.len()
    );
    Ok(DemoCatalog {
        deck_id,
        card_ids,
        one_card_spread_id,
        three_card_spread_id,
    })
}

/// Seed the demo catalog for the caller: into the active workspace when the
/// caller is owner or staff there, or into a new workspace the caller owns
/// when they have none yet.
pub fn seed_demo_workspace(
    store: &OracleStore,
    ctx: &TenantContext,
) -> OracleResult<(WorkspaceId, DemoCatalog)> {
    let identity = ctx.require_identity()?;
    let workspace_id = match (&ctx.workspace_id, ctx.role) {
        (Some(workspace_id), Some(role)) if role.is_elevated() => workspace_id.clone(),
        (Some(_), _) => {
            return Err(OracleError::forbidden(
                "only owner or staff can publish the demo catalog",
            ))
        }
        (None, _) => {
            store
                .insert_workspace_with_owner(DEMO_WORKSPACE_NAME, &identity.id)?
                .id
        }
    };
    let catalog = seed_demo_catalog(store, &workspace_id)?;
    Ok((workspace_id, catalog))
}

fn insert_demo_cards(
    store: &OracleStore,
    workspace_id: &str,
    deck_id: &str,
) -> OracleResult<Vec<EntityId>> {
    let mut card_ids = Vec::with_capacity(DEMO_CARDS.len());
    for card in &DEMO_CARDS {
        let card_id = store.insert_card(
            workspace_id,
            &NewCard {
                deck_id: Some(deck_id.to_string()),
                name: card.name.to_string(),
                image_path: Some(card.image_path.to_string()),
                short_message: card.short_message.to_string(),
                meaning: card.meaning.to_string(),
                meaning_extended: Some(card.meaning_extended.to_string()),
                status: ContentStatus::Published,
            },
        )?;
        card_ids.push(card_id);
    }
    Ok(card_ids)
}

fn demo_spread(
    store: &OracleStore,
    workspace_id: &str,
    name: &str,
    titles: &[&str],
) -> OracleResult<EntityId> {
    match store.spread_id_by_name(workspace_id, name)? {
        Some(spread_id) => Ok(spread_id),
        None => store.insert_spread(
            workspace_id,
            name,
            titles.len() as i64,
            ContentStatus::Published,
            titles,
        ),
    }
}
