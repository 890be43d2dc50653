// Tests for the progress observer slot and ticker

mod common;

use anyhow::Result;
use common::{tick_observer, EventLog, Fixture};
use soundrecorder::session::{ObserverSlot, ProgressTicker};
use soundrecorder::{ProgressObserver, SessionClock};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

fn counting_observer(count: &Arc<AtomicUsize>) -> Arc<dyn ProgressObserver> {
    let count = Arc::clone(count);
    Arc::new(move |_elapsed: Duration| {
        count.fetch_add(1, Ordering::SeqCst);
    })
}

#[tokio::test(start_paused = true)]
async fn test_setting_observer_replaces_previous() -> Result<()> {
    let fx = Fixture::new();
    let session = fx.session();
    let first_count = Arc::new(AtomicUsize::new(0));
    let second_count = Arc::new(AtomicUsize::new(0));
    let first = counting_observer(&first_count);
    let second = counting_observer(&second_count);

    session.set_progress_observer(Some(&first));
    session.start().await?;
    sleep(Duration::from_millis(1500)).await;

    session.set_progress_observer(Some(&second));
    sleep(Duration::from_secs(1)).await;

    assert_eq!(first_count.load(Ordering::SeqCst), 1);
    assert_eq!(second_count.load(Ordering::SeqCst), 1);

    session.set_progress_observer(None);
    sleep(Duration::from_secs(2)).await;

    assert_eq!(first_count.load(Ordering::SeqCst), 1);
    assert_eq!(second_count.load(Ordering::SeqCst), 1);
    assert!(session.is_recording().await, "observer changes never touch recording state");

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_observer_attached_before_start_sees_ticks() -> Result<()> {
    let fx = Fixture::new();
    let session = fx.session();
    let observer = tick_observer(&fx.log);
    session.set_progress_observer(Some(&observer));

    sleep(Duration::from_secs(2)).await;
    assert!(fx.log.matching("tick:").is_empty(), "no ticks while idle");

    session.start().await?;
    sleep(Duration::from_millis(1100)).await;
    assert_eq!(fx.log.matching("tick:"), vec!["tick:1"]);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_observer_may_clear_itself_mid_tick() -> Result<()> {
    let fx = Fixture::new();
    let session = fx.session();
    let count = Arc::new(AtomicUsize::new(0));

    let observer: Arc<dyn ProgressObserver> = {
        let session = Arc::clone(&session);
        let count = Arc::clone(&count);
        Arc::new(move |_elapsed: Duration| {
            count.fetch_add(1, Ordering::SeqCst);
            session.set_progress_observer(None);
        })
    };
    session.set_progress_observer(Some(&observer));

    session.start().await?;
    sleep(Duration::from_millis(3500)).await;

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert!(session.is_recording().await);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_dropped_observer_is_skipped() -> Result<()> {
    let fx = Fixture::new();
    let session = fx.session();
    let count = Arc::new(AtomicUsize::new(0));

    let observer = counting_observer(&count);
    session.set_progress_observer(Some(&observer));
    session.start().await?;
    sleep(Duration::from_millis(1500)).await;

    drop(observer);
    sleep(Duration::from_secs(3)).await;

    assert_eq!(count.load(Ordering::SeqCst), 1);
    // The surface keeps updating regardless
    assert_eq!(fx.log.matching("surface.update:").len(), 4);

    Ok(())
}

#[test]
fn test_slot_holds_weak_reference() {
    let slot = ObserverSlot::new();
    assert!(slot.current().is_none());

    let count = Arc::new(AtomicUsize::new(0));
    let observer = counting_observer(&count);
    slot.set(Some(&observer));
    assert_eq!(Arc::strong_count(&observer), 1, "slot must not own the observer");

    slot.notify(Duration::from_secs(1));
    assert_eq!(count.load(Ordering::SeqCst), 1);

    drop(observer);
    assert!(slot.current().is_none());
    slot.notify(Duration::from_secs(2));
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_ticker_first_fire_after_one_period() {
    let log = EventLog::default();
    let slot = Arc::new(ObserverSlot::new());
    let observer = tick_observer(&log);
    slot.set(Some(&observer));

    let ticker = ProgressTicker::start(
        SessionClock::start(),
        Arc::clone(&slot),
        Arc::new(common::RecordingSurface::new(log.clone())),
    );

    sleep(Duration::from_millis(999)).await;
    assert!(log.matching("tick:").is_empty());

    sleep(Duration::from_millis(2001)).await;
    ticker.cancel().await;
    let fired = log.matching("tick:");
    assert!(fired.len() >= 2 && fired.len() <= 3, "got {:?}", fired);
    assert_eq!(&fired[..2], &["tick:1".to_string(), "tick:2".to_string()]);

    sleep(Duration::from_secs(5)).await;
    assert_eq!(log.matching("tick:").len(), fired.len());
}
