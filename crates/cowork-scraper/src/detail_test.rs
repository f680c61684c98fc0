use std::time::Duration;

use super::*;
use crate::fake::{FakeCall, FakeDriver, FakePage};

const URL: &str = "https://coworkingspain.es/espacio/hub-eixample";

const PAGE: &str = r#"<html><body>
    <div class="space-info">
      <div class="field-name-field-coworking-telefono"><div class="field-item even">931 000 000</div></div>
    </div>
    <div class="photoswipe-gallery"><a class="photoswipe" href="https://img.example/hub.jpg">foto</a></div>
</body></html>"#;

fn driver_with(page: FakePage) -> FakeDriver {
    FakeDriver::new().with_page(URL, page)
}

#[tokio::test]
async fn extracts_fields_from_loaded_page() {
    let mut driver = driver_with(FakePage::new(PAGE));

    let record = extract(&mut driver, URL, &Timings::immediate()).await;

    assert_eq!(record.phone, "931 000 000");
    assert_eq!(record.image_url, "https://img.example/hub.jpg");
    assert_eq!(record.description, "N/A");
    assert!(record.is_well_formed());
    assert_eq!(driver.navigations(), vec![URL]);
}

#[tokio::test]
async fn stops_scrolling_once_height_is_stable() {
    let mut driver = driver_with(FakePage::new(PAGE).with_heights(vec![1200, 1200]));

    extract(&mut driver, URL, &Timings::immediate()).await;

    assert_eq!(driver.count_of(&FakeCall::ScrollToBottom), 1);
}

#[tokio::test]
async fn scrolls_at_most_three_times() {
    let page = FakePage::new(PAGE).with_heights(vec![1000, 2000, 3000, 4000, 5000]);
    let mut driver = driver_with(page);

    extract(&mut driver, URL, &Timings::immediate()).await;

    assert_eq!(
        driver.count_of(&FakeCall::ScrollToBottom),
        MAX_SCROLL_CYCLES
    );
}

#[tokio::test]
async fn grows_then_settles() {
    let page = FakePage::new(PAGE).with_heights(vec![1000, 1800, 1800]);
    let mut driver = driver_with(page);

    extract(&mut driver, URL, &Timings::immediate()).await;

    assert_eq!(driver.count_of(&FakeCall::ScrollToBottom), 2);
}

#[tokio::test]
async fn hanging_navigation_yields_sentinel_record() {
    let page = FakePage::new(PAGE).loading_for(Duration::from_secs(30));
    let mut driver = driver_with(page);
    let timings = Timings::immediate().with_page_load_timeout(Duration::from_millis(20));

    let record = extract(&mut driver, URL, &timings).await;

    assert_eq!(record, DetailRecord::default());
    assert_eq!(driver.count_of(&FakeCall::ScrollToBottom), 0);
}

#[tokio::test]
async fn unreachable_page_yields_sentinel_record() {
    let mut driver = driver_with(FakePage::unreachable());

    let record = extract(&mut driver, URL, &Timings::immediate()).await;

    assert_eq!(record, DetailRecord::default());
}

#[tokio::test]
async fn lost_session_yields_sentinel_record() {
    let mut driver = FakeDriver::broken();

    let record = extract(&mut driver, URL, &Timings::immediate()).await;

    assert_eq!(record, DetailRecord::default());
    assert!(record.is_well_formed());
}
