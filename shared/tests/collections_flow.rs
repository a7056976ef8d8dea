use crux_core::testing::AppTester;
use verso_shared::capabilities::{FetchError, ImageCacheOperation, TimerId, TimerOperation};
use verso_shared::poller::PollPhase;
use verso_shared::thumbnails::ImageSource;
use verso_shared::{App, CollectionSummary, CoreConfig, Effect, Event, Model, MountId, ScreenKind};

fn http_urls(effects: &[Effect]) -> Vec<String> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::Http(req) => Some(req.operation.url.clone()),
            _ => None,
        })
        .collect()
}

fn summary_fetches(effects: &[Effect]) -> usize {
    http_urls(effects)
        .iter()
        .filter(|u| u.ends_with("/api/countries"))
        .count()
}

fn timer_ops(effects: &[Effect]) -> Vec<TimerOperation> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::Timer(req) => Some(req.operation.clone()),
            _ => None,
        })
        .collect()
}

fn started_timer(effects: &[Effect]) -> TimerId {
    timer_ops(effects)
        .into_iter()
        .find_map(|op| match op {
            TimerOperation::Start { id, millis } => {
                assert_eq!(millis, 2_000);
                Some(id)
            }
            TimerOperation::Cancel { .. } => None,
        })
        .expect("a retry timer should be started")
}

fn current_mount(model: &Model) -> MountId {
    model
        .collections
        .as_ref()
        .expect("a collections screen should be mounted")
        .mount_id()
}

fn empty(mount: MountId) -> Event {
    Event::SummariesFetched {
        mount,
        result: Ok(Vec::new()),
    }
}

#[test]
fn home_seeds_once_per_session() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let update = app.update(Event::CollectionsMounted { kind: ScreenKind::Home }, &mut model);
    let urls = http_urls(&update.effects);
    assert_eq!(urls.len(), 2);
    assert!(urls[0].ends_with("/api/demo/seed"));
    assert!(urls[1].ends_with("/api/countries"));

    // A seed failure is logged and swallowed.
    app.update(
        Event::SeedCompleted(Err(FetchError::Status { status: 500 })),
        &mut model,
    );

    let update = app.update(Event::CollectionsMounted { kind: ScreenKind::Home }, &mut model);
    let urls = http_urls(&update.effects);
    assert_eq!(urls.len(), 1, "second mount must not seed again");
    assert!(urls[0].ends_with("/api/countries"));
}

#[test]
fn trip_list_shows_japan_with_its_thumbnail() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let update = app.update(
        Event::CollectionsMounted {
            kind: ScreenKind::TripList,
        },
        &mut model,
    );
    assert_eq!(http_urls(&update.effects).len(), 1);
    assert!(app.view(&model).collections.unwrap().loading);

    let mount = current_mount(&model);
    let update = app.update(
        Event::SummariesFetched {
            mount,
            result: Ok(vec![CollectionSummary::new("Japan", 3)]),
        },
        &mut model,
    );
    let queries: Vec<String> = update
        .effects
        .iter()
        .filter_map(|e| match e {
            Effect::ImageCache(req) => match &req.operation {
                ImageCacheOperation::Get { query } => Some(query.clone()),
            },
            _ => None,
        })
        .collect();
    assert_eq!(queries, vec!["Japan mountain lake sunrise".to_string()]);

    // Still loading until the thumbnail lookup answers.
    let view = app.view(&model).collections.unwrap();
    assert!(view.loading);
    assert_eq!(view.phase, PollPhase::Populated);

    app.update(
        Event::ThumbnailResolved {
            mount,
            country: "Japan".into(),
            result: Ok(Some("abc123".into())),
        },
        &mut model,
    );

    let view = app.view(&model).collections.unwrap();
    assert!(!view.loading);
    assert_eq!(view.total_count, 3);
    assert_eq!(view.country_count, 1);
    assert_eq!(view.cards[0].initials, "JA");
    assert_eq!(
        view.cards[0].image,
        Some(ImageSource::DataUri("data:image/jpeg;base64,abc123".into()))
    );
}

#[test]
fn home_polls_ten_times_then_falls_back_to_placeholders() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let update = app.update(Event::CollectionsMounted { kind: ScreenKind::Home }, &mut model);
    let mount = current_mount(&model);
    let mut fetches = summary_fetches(&update.effects);

    loop {
        let update = app.update(empty(mount), &mut model);
        if timer_ops(&update.effects).is_empty() {
            break;
        }
        let id = started_timer(&update.effects);
        let update = app.update(Event::TimerFired { id }, &mut model);
        fetches += summary_fetches(&update.effects);
    }
    assert_eq!(fetches, 10);

    let view = app.view(&model).collections.unwrap();
    assert!(!view.loading);
    assert_eq!(view.phase, PollPhase::Exhausted);
    assert!(view.showing_placeholders);
    assert_eq!(view.total_count, 25);
    let countries: Vec<&str> = view.cards.iter().map(|c| c.country.as_str()).collect();
    assert_eq!(countries, ["Japan", "Bali", "Goa"]);
    assert_eq!(
        view.cards[1].image,
        Some(ImageSource::BundledAsset("assets/thumbs/bali.jpg".into()))
    );
}

#[test]
fn home_simple_polls_five_times_without_seeding_or_thumbnails() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let update = app.update(
        Event::CollectionsMounted {
            kind: ScreenKind::HomeSimple,
        },
        &mut model,
    );
    assert_eq!(http_urls(&update.effects).len(), 1);

    let view = app.view(&model).collections.unwrap();
    assert!(view.loading);
    assert!(view.showing_placeholders);

    let mount = current_mount(&model);
    let mut fetches = 1;
    loop {
        let update = app.update(empty(mount), &mut model);
        if timer_ops(&update.effects).is_empty() {
            break;
        }
        let id = started_timer(&update.effects);
        fetches += summary_fetches(&app.update(Event::TimerFired { id }, &mut model).effects);
    }
    assert_eq!(fetches, 5);

    let update = app.update(
        Event::SummariesFetched {
            mount,
            result: Ok(vec![CollectionSummary::new("Goa", 1)]),
        },
        &mut model,
    );
    assert!(
        !update.effects.iter().any(|e| matches!(e, Effect::ImageCache(_))),
        "a finished poller ignores late answers"
    );
    let view = app.view(&model).collections.unwrap();
    assert!(view.cards.iter().all(|c| c.image.is_none()));
}

#[test]
fn unmount_mid_poll_cancels_the_pending_timer() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    app.update(Event::CollectionsMounted { kind: ScreenKind::Home }, &mut model);
    let mount = current_mount(&model);

    // Attempts 1..=3 come back empty; each schedules the next attempt.
    for _ in 0..3 {
        let update = app.update(empty(mount), &mut model);
        let id = started_timer(&update.effects);
        app.update(Event::TimerFired { id }, &mut model);
    }
    // Attempt 4 is empty too; its retry timer is now pending.
    let update = app.update(empty(mount), &mut model);
    let pending = started_timer(&update.effects);

    let update = app.update(Event::CollectionsUnmounted, &mut model);
    assert_eq!(
        timer_ops(&update.effects),
        vec![TimerOperation::Cancel { id: pending }]
    );
    assert!(model.collections.is_none());

    // The shell may still deliver the timer; nothing must be fetched.
    let update = app.update(Event::TimerFired { id: pending }, &mut model);
    assert!(http_urls(&update.effects).is_empty());
}

#[test]
fn transport_failure_is_shown_inline_and_not_retried() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    app.update(
        Event::CollectionsMounted {
            kind: ScreenKind::TripList,
        },
        &mut model,
    );
    let mount = current_mount(&model);
    let update = app.update(
        Event::SummariesFetched {
            mount,
            result: Err(FetchError::transport("connection refused")),
        },
        &mut model,
    );
    assert!(timer_ops(&update.effects).is_empty());
    assert!(http_urls(&update.effects).is_empty());

    let view = app.view(&model).collections.unwrap();
    assert!(!view.loading);
    assert_eq!(view.phase, PollPhase::Failed);
    assert_eq!(view.error.as_deref(), Some("Failed to load your collections"));
}

#[test]
fn results_for_a_previous_mount_are_dropped() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    app.update(
        Event::CollectionsMounted {
            kind: ScreenKind::TripList,
        },
        &mut model,
    );
    let first = current_mount(&model);

    app.update(
        Event::CollectionsMounted {
            kind: ScreenKind::HomeSimple,
        },
        &mut model,
    );
    let second = current_mount(&model);
    assert_ne!(first, second);

    let update = app.update(
        Event::SummariesFetched {
            mount: first,
            result: Ok(vec![CollectionSummary::new("Japan", 3)]),
        },
        &mut model,
    );
    assert!(update.effects.is_empty());

    let view = app.view(&model).collections.unwrap();
    assert_eq!(view.screen, ScreenKind::HomeSimple);
    assert!(view.showing_placeholders);
}

#[test]
fn picking_dims_the_other_collections() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    app.update(
        Event::CollectionsMounted {
            kind: ScreenKind::TripList,
        },
        &mut model,
    );
    let mount = current_mount(&model);
    app.update(
        Event::SummariesFetched {
            mount,
            result: Ok(vec![
                CollectionSummary::new("Japan", 3),
                CollectionSummary::new("Bali", 2),
            ]),
        },
        &mut model,
    );

    let update = app.update(
        Event::CollectionPicked {
            country: "Peru".into(),
        },
        &mut model,
    );
    assert!(update.effects.is_empty());

    app.update(
        Event::CollectionPicked {
            country: "Bali".into(),
        },
        &mut model,
    );
    let view = app.view(&model).collections.unwrap();
    assert_eq!(view.picked.as_deref(), Some("Bali"));
    assert!(view.cards[0].dimmed);
    assert!(view.cards[1].picked && !view.cards[1].dimmed);

    app.update(Event::SelectionCleared, &mut model);
    let view = app.view(&model).collections.unwrap();
    assert!(view.cards.iter().all(|c| !c.dimmed && !c.picked));
}

#[test]
fn invalid_configuration_keeps_the_previous_one() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let config = CoreConfig::from_json(r#"{"api_base_url":"https://api.verso.travel"}"#).unwrap();
    app.update(Event::Configure(config.clone()), &mut model);
    assert_eq!(model.config, config);

    let bad = CoreConfig::from_json(r#"{"api_base_url":"ftp://nope"}"#).unwrap();
    app.update(Event::Configure(bad), &mut model);
    assert_eq!(model.config, config);

    let update = app.update(
        Event::CollectionsMounted {
            kind: ScreenKind::TripList,
        },
        &mut model,
    );
    assert_eq!(
        http_urls(&update.effects),
        vec!["https://api.verso.travel/api/countries".to_string()]
    );
}

#[test]
fn thumbnails_for_a_previous_mount_are_dropped() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    let japan = || vec![CollectionSummary::new("Japan", 3)];

    app.update(
        Event::CollectionsMounted {
            kind: ScreenKind::TripList,
        },
        &mut model,
    );
    let first = current_mount(&model);
    app.update(
        Event::SummariesFetched {
            mount: first,
            result: Ok(japan()),
        },
        &mut model,
    );

    app.update(
        Event::CollectionsMounted {
            kind: ScreenKind::TripList,
        },
        &mut model,
    );
    let second = current_mount(&model);
    app.update(
        Event::SummariesFetched {
            mount: second,
            result: Ok(japan()),
        },
        &mut model,
    );

    // The lookup started by the first mount answers late.
    let update = app.update(
        Event::ThumbnailResolved {
            mount: first,
            country: "Japan".into(),
            result: Ok(Some("stale".into())),
        },
        &mut model,
    );
    assert!(update.effects.is_empty());

    let view = app.view(&model).collections.unwrap();
    assert!(view.loading, "the current batch is still waiting on its own lookup");
    assert_eq!(
        view.cards[0].image,
        Some(ImageSource::BundledAsset("assets/thumbs/japan.jpg".into()))
    );

    app.update(
        Event::ThumbnailResolved {
            mount: second,
            country: "Japan".into(),
            result: Ok(Some("data:image/png;base64,fresh".into())),
        },
        &mut model,
    );
    let view = app.view(&model).collections.unwrap();
    assert!(!view.loading);
    assert_eq!(
        view.cards[0].image,
        Some(ImageSource::DataUri("data:image/png;base64,fresh".into()))
    );
}
