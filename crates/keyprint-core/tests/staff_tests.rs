use keyprint_core::staff::*;
use keyprint_core::*;

const ORIGIN: &str = "https://kiosk.example";

fn four_by_five_link(image: &str) -> String {
    share_url(ORIGIN, &Layout::four_by_five_from_url(image)).unwrap()
}

fn cd_link() -> String {
    let mut layout = Layout::new(Template::Cd3Simple);
    layout.get_mut("disc").unwrap().image_ref = Some("https://img.example/disc.png".to_string());
    share_url(ORIGIN, &layout).unwrap()
}

#[test]
fn test_collector_dedupes_and_caps() {
    let mut collector = ScanCollector::new();
    assert_eq!(
        collector.add_scanned(&four_by_five_link("https://img.example/1.png")).unwrap(),
        ScanOutcome::AddedFourUp { count: 1 }
    );
    assert_eq!(
        collector.add_scanned(&four_by_five_link("https://img.example/1.png")).unwrap(),
        ScanOutcome::Duplicate
    );
    for i in 2..=4 {
        let outcome = collector
            .add_scanned(&four_by_five_link(&format!("https://img.example/{i}.png")))
            .unwrap();
        assert_eq!(outcome, ScanOutcome::AddedFourUp { count: i });
    }
    assert_eq!(
        collector.add_scanned(&four_by_five_link("https://img.example/5.png")).unwrap(),
        ScanOutcome::Full
    );
    assert_eq!(collector.four_up().len(), FOUR_UP_CAPACITY);
}

#[test]
fn test_bad_scan_leaves_collection_untouched() {
    let mut collector = ScanCollector::new();
    collector
        .add_scanned(&four_by_five_link("https://img.example/1.png"))
        .unwrap();
    let err = collector.add_scanned("definitely not a code").unwrap_err();
    assert!(err.is_input_error());
    assert_eq!(collector.four_up().len(), 1);
}

#[test]
fn test_photo_link_becomes_a_card() {
    let mut collector = ScanCollector::new();
    assert_eq!(
        collector.add_image_url("  https://img.example/7.png ").unwrap(),
        ScanOutcome::AddedFourUp { count: 1 }
    );
    // the same photo scanned as a share link is the same card
    assert_eq!(
        collector.add_scanned(&four_by_five_link("https://img.example/7.png")).unwrap(),
        ScanOutcome::Duplicate
    );

    let card = &collector.four_up()[0];
    assert_eq!(card.front.img.as_deref(), Some("https://img.example/7.png"));
    assert_eq!(card.back.img.as_deref(), Some("https://img.example/7.png"));
    assert_eq!((card.front.tx, card.front.ty, card.front.scale), (0.0, 0.0, 1.0));

    let err = collector.add_image_url("not a link").unwrap_err();
    assert!(err.is_input_error());
    assert_eq!(collector.four_up().len(), 1);
}

#[test]
fn test_scan_box_takes_codes_and_photo_links() {
    let mut collector = ScanCollector::new();
    assert_eq!(
        collector.add_entry(&four_by_five_link("https://img.example/1.png")).unwrap(),
        ScanOutcome::AddedFourUp { count: 1 }
    );
    assert_eq!(
        collector.add_entry("https://img.example/2.png").unwrap(),
        ScanOutcome::AddedFourUp { count: 2 }
    );
    assert_eq!(collector.add_entry(&cd_link()).unwrap(), ScanOutcome::AddedCd);

    // a broken share link is not mistaken for a photo
    let broken = format!("{ORIGIN}/p/4x5/edit?data=%%%");
    assert!(collector.add_entry(&broken).unwrap_err().is_input_error());
    assert!(collector.add_entry("hello").unwrap_err().is_input_error());
    assert_eq!(collector.four_up().len(), 2);
}

#[test]
fn test_handoff_needs_two_cards_or_a_cd() {
    let mut session = StaffSession::new(MemoryStore::new());
    let mut collector = ScanCollector::new();
    collector
        .add_scanned(&four_by_five_link("https://img.example/1.png"))
        .unwrap();
    assert_eq!(collector.ready_sheet(), None);
    assert!(collector.handoff(&mut session).is_err());

    collector
        .add_scanned(&four_by_five_link("https://img.example/2.png"))
        .unwrap();
    assert_eq!(collector.handoff(&mut session).unwrap(), SheetKind::FourUp);
    assert_eq!(session.four_up().unwrap().len(), 2);

    collector.add_scanned(&cd_link()).unwrap();
    assert_eq!(collector.ready_sheet(), Some(SheetKind::Cd));
    assert_eq!(collector.handoff(&mut session).unwrap(), SheetKind::Cd);
    assert!(session.cd().is_some());
}

#[test]
fn test_sheet_plan_from_session() {
    let mut session = StaffSession::new(MemoryStore::new());
    assert!(SheetPlan::from_session(&session, SheetKind::FourUp).is_err());

    let mut collector = ScanCollector::new();
    for i in 1..=3 {
        collector
            .add_scanned(&four_by_five_link(&format!("https://img.example/{i}.png")))
            .unwrap();
    }
    collector.handoff(&mut session).unwrap();

    let plan = SheetPlan::from_session(&session, SheetKind::FourUp).unwrap();
    assert_eq!(plan.arrangement(), Arrangement::FourUpSheet);
    assert_eq!(plan.sheet_layout().placements.len(), 3);
    assert_eq!(plan.label("c"), "Card 3");
    assert_eq!(
        plan.panel("b").unwrap().image_ref.as_deref(),
        Some("https://img.example/2.png")
    );
}

#[test]
fn test_unreadable_entry_counts_as_absent() {
    let mut store = MemoryStore::new();
    store.set(FOUR_UP_KEY, "{not json".to_string());
    let session = StaffSession::new(store);
    assert!(session.four_up().is_none());
    assert!(ScanCollector::from_session(&session).four_up().is_empty());
}

#[tokio::test]
async fn test_json_file_store_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let store = JsonFileStore::open(&path).await.unwrap();
    let mut session = StaffSession::new(store);
    let mut collector = ScanCollector::new();
    collector.add_scanned(&cd_link()).unwrap();
    collector.handoff(&mut session).unwrap();
    session.store().flush().await.unwrap();

    let reopened = StaffSession::new(JsonFileStore::open(&path).await.unwrap());
    let cd = reopened.cd().unwrap();
    assert_eq!(cd.disc.img.as_deref(), Some("https://img.example/disc.png"));

    let resumed = ScanCollector::from_session(&reopened);
    assert!(resumed.cd().is_some());
}

#[tokio::test]
async fn test_json_file_store_rejects_garbage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    tokio::fs::write(&path, "[1, 2, 3]").await.unwrap();
    let err = JsonFileStore::open(&path).await.unwrap_err();
    assert!(matches!(err, KeyprintError::Store(_)));
}
