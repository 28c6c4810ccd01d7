// Request flows: session guards, then a spawned service call reporting back as an AppEvent

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::api::CravynClient;
use crate::events::AppEvent;
use crate::session::{Session, SurprisePlan};

pub fn generate_recipe(
    session: &mut Session,
    client: &CravynClient,
    event_tx: &UnboundedSender<AppEvent>,
) -> Option<JoinHandle<()>> {
    let (request_id, request) = session.begin_generate()?;
    log::info!(
        "Generating recipe {request_id} from {} ingredients",
        request.ingredients.len()
    );

    let client = client.clone();
    let tx = event_tx.clone();

    Some(tokio::spawn(async move {
        let result = client.generate_recipe(&request).await;
        let _ = tx.send(AppEvent::RecipeGenerated { request_id, result });
    }))
}

pub fn surprise_me(
    session: &mut Session,
    client: &CravynClient,
    event_tx: &UnboundedSender<AppEvent>,
) -> Option<JoinHandle<()>> {
    let (request_id, plan) = session.begin_surprise(&mut rand::thread_rng())?;

    let client = client.clone();
    let tx = event_tx.clone();

    Some(tokio::spawn(async move {
        let (constrained, result) = match plan {
            SurprisePlan::Constrained(request) => {
                log::info!("Surprise {request_id} with {:?}", request.ingredients);
                (true, client.generate_recipe(&request).await)
            }
            SurprisePlan::Random => {
                log::info!("Surprise {request_id} from any recipe");
                (false, client.surprise_me().await)
            }
        };
        let _ = tx.send(AppEvent::SurpriseGenerated {
            request_id,
            constrained,
            result,
        });
    }))
}

pub fn generate_image(
    session: &mut Session,
    client: &CravynClient,
    event_tx: &UnboundedSender<AppEvent>,
) -> Option<JoinHandle<()>> {
    let (request_id, recipe_id) = session.begin_image()?;
    log::info!("Generating image {request_id} for recipe {recipe_id}");

    let client = client.clone();
    let tx = event_tx.clone();

    Some(tokio::spawn(async move {
        let result = client.generate_image(&recipe_id).await;
        let _ = tx.send(AppEvent::ImageGenerated {
            request_id,
            recipe_id,
            result,
        });
    }))
}

pub fn refresh_recent_recipes(
    session: &mut Session,
    client: &CravynClient,
    event_tx: &UnboundedSender<AppEvent>,
) -> JoinHandle<()> {
    let (request_id, limit) = session.begin_recent_refresh();

    let client = client.clone();
    let tx = event_tx.clone();

    tokio::spawn(async move {
        let result = client.list_recipes(limit).await;
        let _ = tx.send(AppEvent::RecentRecipesLoaded { request_id, result });
    })
}

/// Apply a task report to the session.
///
/// A newly generated recipe is stored by the service, so the recent list is
/// refetched; the returned handle belongs to that refresh.
pub fn handle_app_event(
    session: &mut Session,
    event: AppEvent,
    client: &CravynClient,
    event_tx: &UnboundedSender<AppEvent>,
) -> Option<JoinHandle<()>> {
    match event {
        AppEvent::RecipeGenerated { request_id, result } => session
            .apply_generated(request_id, result)
            .then(|| refresh_recent_recipes(session, client, event_tx)),
        AppEvent::SurpriseGenerated {
            request_id,
            constrained,
            result,
        } => {
            let applied = session.apply_surprise(request_id, result);
            (applied && constrained).then(|| refresh_recent_recipes(session, client, event_tx))
        }
        AppEvent::ImageGenerated {
            request_id,
            recipe_id,
            result,
        } => {
            session.apply_image(request_id, &recipe_id, result);
            None
        }
        AppEvent::RecentRecipesLoaded { request_id, result } => {
            session.apply_recent(request_id, result);
            None
        }
    }
}
