use chrono::Utc;
use log::{error, info};
use std::time::Duration;

use crate::lifecycle::{GiveawayEngine, SEND_DELAY};

/// polling period of the control loop
const TICK_PERIOD: Duration = Duration::from_secs(60);

/// single sequential control loop: discovers due giveaways and drives their
/// transitions. runs for the lifetime of the process; a slow tick simply
/// delays the next one, ticks never overlap.
pub async fn run_scheduler(engine: GiveawayEngine) {
    info!("Starting giveaway scheduler");
    let mut interval = tokio::time::interval(TICK_PERIOD);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        run_tick(&engine).await;
    }
}

/// one pass over everything that is due. each giveaway is handled in
/// isolation: a failure is logged and the tick moves on, the repository
/// will surface the giveaway again next time.
pub async fn run_tick(engine: &GiveawayEngine) {
    let now = Utc::now();
    let (to_publish, to_evaluate) = match engine.repository().list_due(now).await {
        Ok(due) => due,
        Err(err) => {
            error!("scheduler could not query due giveaways: {}", err);
            return;
        }
    };

    for giveaway in to_publish {
        if let Err(err) = engine.publish(giveaway.id).await {
            error!("failed to publish giveaway {}: {}", giveaway.id, err);
        }
        tokio::time::sleep(SEND_DELAY).await;
    }

    for giveaway in to_evaluate {
        // keep the public counter fresh; this also notices deleted posts
        match engine.refresh_join_button(&giveaway).await {
            Ok(true) => {}
            Ok(false) => continue, // post gone, giveaway was closed
            Err(err) => {
                error!(
                    "failed to refresh the button of giveaway {}: {}",
                    giveaway.id, err
                );
                continue;
            }
        }
        tokio::time::sleep(SEND_DELAY).await;

        let deadline_reached = giveaway.end_at.map(|end_at| end_at <= now).unwrap_or(false);
        // the repository filter on end_count is coarse; only the live
        // participant count decides whether the threshold is met
        let threshold_reached = match giveaway.end_count {
            Some(end_count) => {
                engine.participants().count(giveaway.id).await >= end_count as usize
            }
            None => false,
        };

        if deadline_reached || threshold_reached {
            if let Err(err) = engine.finish(giveaway.id).await {
                error!("failed to finish giveaway {}: {}", giveaway.id, err);
            }
            tokio::time::sleep(SEND_DELAY).await;
        }
    }
}
