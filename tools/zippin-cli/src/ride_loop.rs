use std::future::Future;

use tokio::time::MissedTickBehavior;
use zippin_common::ride::RideProgress;
use zippin_common::RideSession;

/// Drive an active `session` with one tick per fare interval until `max_ticks`
/// ticks have fired or `stop` resolves. Returns the number of ticks applied.
///
/// The interval lives only inside this function: once it returns no further
/// tick can reach the session, so the caller may stop it right away.
pub async fn drive_ride<F, P>(
    session: &mut RideSession,
    max_ticks: Option<u64>,
    stop: F,
    mut on_progress: P,
) -> u64
where
    F: Future<Output = ()>,
    P: FnMut(&RideProgress),
{
    let mut interval = tokio::time::interval(session.fare().tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the ride starts counting after it.
    interval.tick().await;
    tokio::pin!(stop);

    let mut ticks = 0;
    loop {
        if max_ticks.is_some_and(|max| ticks >= max) {
            break;
        }
        tokio::select! {
            biased;
            _ = &mut stop => {
                tracing::debug!(ticks, "stop requested");
                break;
            }
            _ = interval.tick() => {
                if !session.tick() {
                    break;
                }
                ticks += 1;
                if let Some(progress) = session.progress() {
                    on_progress(progress);
                }
            }
        }
    }
    ticks
}
