use std::time::Duration;

use parts_fitment::cascade::quick_filter::{QuickFilter, QuickFilterPublisher};

const DELAY: Duration = Duration::from_millis(200);

#[tokio::test(start_paused = true)]
async fn test_only_last_value_in_burst_is_emitted() {
    let (publisher, mut rx) = QuickFilterPublisher::new(DELAY);

    publisher.set(QuickFilter::new(None, Some("bra")));
    tokio::time::sleep(Duration::from_millis(50)).await;
    publisher.set(QuickFilter::new(None, Some("brake")));
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(rx.try_recv().is_err());

    publisher.set(QuickFilter::new(Some("12"), Some("brake pads")));
    tokio::time::sleep(Duration::from_millis(250)).await;

    assert_eq!(rx.try_recv().unwrap(), QuickFilter::new(Some("12"), Some("brake pads")));
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_empty_filter_is_suppressed() {
    let (publisher, mut rx) = QuickFilterPublisher::new(DELAY);

    publisher.set(QuickFilter::new(Some("  "), Some("")));
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(rx.try_recv().is_err());

    // An empty value also cancels a pending non-empty one.
    publisher.set(QuickFilter::new(None, Some("oil")));
    tokio::time::sleep(Duration::from_millis(50)).await;
    publisher.set(QuickFilter::default());
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_values_are_trimmed() {
    let (publisher, mut rx) = QuickFilterPublisher::new(DELAY);
    publisher.set(QuickFilter {
        category_id: Some(" 7 ".into()),
        search_term: Some("   ".into()),
    });
    tokio::time::sleep(Duration::from_millis(250)).await;
    let got = rx.try_recv().unwrap();
    assert_eq!(got.category_id.as_deref(), Some("7"));
    assert_eq!(got.search_term, None);
}
