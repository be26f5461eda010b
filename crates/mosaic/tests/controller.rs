//! End-to-end scenarios over the public facade: selection, caching,
//! staleness, promotion, error isolation, responsiveness, lazy autoload.

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use bytes::Bytes;
use mosaic::{
    MediaQueue,
    loaders::{LoadRequest, LoadResult, MemoryFetch},
    prelude::*,
    queue::{Job, Ticket, TicketId},
};
use parking_lot::Mutex;
use tokio::sync::{Notify, broadcast};
use url::Url;

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

// ==== Test loaders ====

/// Accepts everything; yields vector markup equal to the request URL.
#[derive(Default)]
struct TagLoader {
    loads: AtomicUsize,
}

#[async_trait]
impl Loader for TagLoader {
    async fn attempt(&self, request: &LoadRequest) -> Option<LoadResult<Media>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Some(Ok(Media::Vector {
            markup: request.url.as_str().into(),
            alt: request.alt.clone(),
        }))
    }
}

/// Like `TagLoader`, but each attempt blocks until released.
#[derive(Default)]
struct GatedLoader {
    notify: Notify,
    loads: AtomicUsize,
}

impl GatedLoader {
    fn release_one(&self) {
        self.notify.notify_one();
    }
}

#[async_trait]
impl Loader for GatedLoader {
    async fn attempt(&self, request: &LoadRequest) -> Option<LoadResult<Media>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.notify.notified().await;
        Some(Ok(Media::Vector {
            markup: request.url.as_str().into(),
            alt: request.alt.clone(),
        }))
    }
}

/// Scheduler decorator that records promotions.
struct RecordingScheduler {
    inner: MediaQueue,
    promoted: Mutex<Vec<TicketId>>,
}

impl RecordingScheduler {
    fn new(concurrency: usize) -> Self {
        Self {
            inner: MediaQueue::new(concurrency),
            promoted: Mutex::new(Vec::new()),
        }
    }
}

impl Scheduler<Media, mosaic::loaders::LoadError> for RecordingScheduler {
    fn submit(
        &self,
        job: Job<Media, mosaic::loaders::LoadError>,
    ) -> Ticket<Media, mosaic::loaders::LoadError> {
        self.inner.submit(job)
    }

    fn promote(&self, id: TicketId) -> bool {
        self.promoted.lock().push(id);
        self.inner.promote(id)
    }
}

// ==== Event helpers ====

async fn next_event<F, T>(rx: &mut broadcast::Receiver<Event>, mut pick: F) -> T
where
    F: FnMut(&Event) -> Option<T>,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Some(value) = pick(&event) {
                        return value;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => panic!("event stream closed"),
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}

fn success_for(placeholder: PlaceholderId) -> impl FnMut(&Event) -> Option<Media> {
    move |event| match event {
        Event::Placeholder(PlaceholderEvent::LoadSuccess {
            placeholder: p,
            media,
        }) if *p == placeholder => Some(media.clone()),
        _ => None,
    }
}

/// Assert that nothing matching `pick` shows up for a little while.
async fn expect_quiet<F>(rx: &mut broadcast::Receiver<Event>, mut pick: F)
where
    F: FnMut(&Event) -> bool,
{
    let deadline = tokio::time::sleep(Duration::from_millis(200));
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            () = &mut deadline => return,
            event = rx.recv() => {
                if let Ok(event) = event {
                    assert!(!pick(&event), "unexpected event: {event:?}");
                }
            }
        }
    }
}

fn raster_bytes(media: &Media) -> &[u8] {
    match media {
        Media::Raster { bytes, .. } => bytes,
        Media::Vector { .. } => panic!("expected raster media"),
    }
}

fn vector_markup(media: &Media) -> &str {
    match media {
        Media::Vector { markup, .. } => markup,
        Media::Raster { .. } => panic!("expected vector media"),
    }
}

// ==== Scenarios ====

#[tokio::test]
async fn selection_and_loading_follow_the_viewport() {
    let fetch = Arc::new(MemoryFetch::new());
    fetch.insert(
        url("https://example.com/a.jpg"),
        Bytes::from_static(b"small"),
        Some("image/jpeg"),
    );
    fetch.insert(
        url("https://example.com/b.jpg"),
        Bytes::from_static(b"wide"),
        Some("image/jpeg"),
    );

    let runtime = Runtime::with_fetch(Options::default().with_autoload(Autoload::None), fetch);
    runtime.viewport().set(Viewport::new(1024, 768));

    let controller = runtime
        .placeholder(PlaceholderConfig::new(vec![
            SourceSpec::new(url("https://example.com/a.jpg")),
            SourceSpec::new(url("https://example.com/b.jpg")).with_media("(min-width: 800px)"),
        ]))
        .unwrap();

    let mut rx = controller.subscribe();
    controller.load().unwrap();
    let media = next_event(&mut rx, success_for(controller.id())).await;
    assert_eq!(raster_bytes(&media), b"wide");
    assert_eq!(
        controller.current_url().unwrap().as_str(),
        "https://example.com/b.jpg"
    );
    assert!(controller.is_loaded());
    assert_eq!(controller.phase(), Phase::Loaded);

    // Narrower viewport re-selects the unconditioned fallback.
    runtime.viewport().set(Viewport::new(500, 700));
    controller.load().unwrap();
    let media = next_event(&mut rx, success_for(controller.id())).await;
    assert_eq!(raster_bytes(&media), b"small");
    assert_eq!(
        controller.current_url().unwrap().as_str(),
        "https://example.com/a.jpg"
    );
}

#[tokio::test]
async fn cached_source_redisplays_without_a_second_request() {
    let loader = Arc::new(TagLoader::default());
    let runtime = Runtime::with_fetch(
        Options::default()
            .with_autoload(Autoload::None)
            .with_loader("jpg", Arc::clone(&loader) as Arc<dyn Loader>),
        Arc::new(MemoryFetch::new()),
    );

    let controller = runtime
        .placeholder(PlaceholderConfig::single(url("https://example.com/a.jpg")))
        .unwrap();
    let mut rx = controller.subscribe();

    controller.load().unwrap();
    let first = next_event(&mut rx, success_for(controller.id())).await;

    controller.load().unwrap();
    let second = next_event(&mut rx, success_for(controller.id())).await;

    assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
    assert_eq!(first, second);
}

#[tokio::test]
async fn stale_result_is_cached_but_never_shown() {
    let fast = Arc::new(TagLoader::default());
    let gated = Arc::new(GatedLoader::default());
    let runtime = Runtime::with_fetch(
        Options::default()
            .with_autoload(Autoload::None)
            .with_loader("png", Arc::clone(&fast) as Arc<dyn Loader>)
            .with_loader("jpg", Arc::clone(&gated) as Arc<dyn Loader>),
        Arc::new(MemoryFetch::new()),
    );
    runtime.viewport().set(Viewport::new(1024, 768));

    let controller = runtime
        .placeholder(PlaceholderConfig::new(vec![
            SourceSpec::new(url("https://example.com/a.png")),
            SourceSpec::new(url("https://example.com/b.jpg")).with_media("(min-width: 800px)"),
        ]))
        .unwrap();
    let mut rx = controller.subscribe();

    // Wide viewport selects b.jpg, which hangs in its loader.
    controller.load().unwrap();

    // Selection changes to a.png before b.jpg resolves.
    runtime.viewport().set(Viewport::new(500, 700));
    controller.load().unwrap();
    let media = next_event(&mut rx, success_for(controller.id())).await;
    assert_eq!(vector_markup(&media), "https://example.com/a.png");

    // The superseded b.jpg result arrives late and must not be shown.
    gated.release_one();
    let id = controller.id();
    expect_quiet(&mut rx, |event| {
        matches!(
            event,
            Event::Placeholder(PlaceholderEvent::LoadSuccess { placeholder, media })
                if *placeholder == id && vector_markup(media) == "https://example.com/b.jpg"
        )
    })
    .await;

    // Re-selecting b.jpg later shows the retained cache without reloading.
    runtime.viewport().set(Viewport::new(1024, 768));
    controller.load().unwrap();
    let media = next_event(&mut rx, success_for(controller.id())).await;
    assert_eq!(vector_markup(&media), "https://example.com/b.jpg");
    assert_eq!(gated.loads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn configuration_error_is_isolated_from_siblings() {
    let gated = Arc::new(GatedLoader::default());
    let runtime = Runtime::with_fetch(
        Options::default()
            .with_autoload(Autoload::None)
            .with_loader("jpg", Arc::clone(&gated) as Arc<dyn Loader>),
        Arc::new(MemoryFetch::new()),
    );

    let healthy = runtime
        .placeholder(PlaceholderConfig::single(url("https://example.com/ok.jpg")))
        .unwrap();
    let mut rx = healthy.subscribe();
    healthy.load().unwrap();

    // No registered loader matches this extension; the error is loud and
    // synchronous.
    let broken = runtime
        .placeholder(PlaceholderConfig::single(url(
            "https://example.com/x.unknownext",
        )))
        .unwrap();
    let err = broken.load().unwrap_err();
    assert!(matches!(
        err,
        MosaicError::Load(mosaic::loaders::LoadError::NoLoaderFound { .. })
    ));

    // The sibling's in-flight request is unaffected.
    gated.release_one();
    let media = next_event(&mut rx, success_for(healthy.id())).await;
    assert_eq!(vector_markup(&media), "https://example.com/ok.jpg");
}

#[tokio::test]
async fn reselecting_a_pending_source_promotes_instead_of_duplicating() {
    let gated = Arc::new(GatedLoader::default());
    let scheduler = Arc::new(RecordingScheduler::new(1));
    let runtime = Runtime::with_fetch(
        Options::default()
            .with_autoload(Autoload::None)
            .with_loader("jpg", Arc::clone(&gated) as Arc<dyn Loader>),
        Arc::new(MemoryFetch::new()),
    )
    .with_scheduler(Arc::clone(&scheduler) as _);

    let first = runtime
        .placeholder(PlaceholderConfig::single(url("https://example.com/1.jpg")))
        .unwrap();
    let second = runtime
        .placeholder(PlaceholderConfig::single(url("https://example.com/2.jpg")))
        .unwrap();
    let mut rx = second.subscribe();

    // K=1: the first load occupies the slot, the second stays pending.
    first.load().unwrap();
    second.load().unwrap();

    // Re-selecting the pending source reuses its request and promotes it.
    second.load().unwrap();
    assert_eq!(scheduler.promoted.lock().len(), 1);

    gated.release_one(); // first
    gated.release_one(); // second, once dispatched
    let media = next_event(&mut rx, success_for(second.id())).await;
    assert_eq!(vector_markup(&media), "https://example.com/2.jpg");

    // One request per placeholder, no duplicates.
    assert_eq!(gated.loads.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn responsive_runtime_reselects_until_destroyed() {
    let fetch = Arc::new(MemoryFetch::new());
    fetch.insert(
        url("https://example.com/a.jpg"),
        Bytes::from_static(b"small"),
        Some("image/jpeg"),
    );
    fetch.insert(
        url("https://example.com/b.jpg"),
        Bytes::from_static(b"wide"),
        Some("image/jpeg"),
    );

    let runtime = Runtime::with_fetch(Options::default().with_responsive(true), fetch);
    runtime.viewport().set(Viewport::new(1024, 768));
    let mut rx = runtime.subscribe();

    let controller = runtime
        .placeholder(PlaceholderConfig::new(vec![
            SourceSpec::new(url("https://example.com/a.jpg")),
            SourceSpec::new(url("https://example.com/b.jpg")).with_media("(min-width: 800px)"),
        ]))
        .unwrap();

    // Immediate autoload picks the wide source.
    let media = next_event(&mut rx, success_for(controller.id())).await;
    assert_eq!(raster_bytes(&media), b"wide");

    // A viewport change re-runs selection without any explicit call.
    runtime.viewport().set(Viewport::new(500, 700));
    let media = next_event(&mut rx, success_for(controller.id())).await;
    assert_eq!(raster_bytes(&media), b"small");

    // Teardown is idempotent and stops the re-selection.
    controller.destroy();
    controller.destroy();
    runtime.viewport().set(Viewport::new(1024, 768));
    let id = controller.id();
    expect_quiet(&mut rx, |event| {
        matches!(
            event,
            Event::Placeholder(PlaceholderEvent::LoadSuccess { placeholder, .. })
                if *placeholder == id
        )
    })
    .await;
}

#[tokio::test]
async fn lazy_autoload_waits_for_a_plugin_trigger() {
    #[derive(Default)]
    struct CapturePlugin {
        slot: Mutex<Option<SourceController>>,
    }

    impl Plugin for CapturePlugin {
        fn initialize(&self, controller: &SourceController) {
            *self.slot.lock() = Some(controller.clone());
        }
    }

    let loader = Arc::new(TagLoader::default());
    let plugin = Arc::new(CapturePlugin::default());
    let runtime = Runtime::with_fetch(
        Options::default()
            .with_autoload(Autoload::Lazy)
            .with_loader("jpg", Arc::clone(&loader) as Arc<dyn Loader>)
            .with_plugin(Arc::clone(&plugin) as Arc<dyn Plugin>),
        Arc::new(MemoryFetch::new()),
    );
    let mut rx = runtime.subscribe();

    let controller = runtime
        .placeholder(PlaceholderConfig::single(url("https://example.com/a.jpg")))
        .unwrap();
    assert_eq!(controller.autoload(), Autoload::Lazy);
    assert_eq!(controller.phase(), Phase::Idle);

    // Nothing loads until the plugin decides the placeholder is visible.
    let id = controller.id();
    expect_quiet(&mut rx, |event| {
        matches!(
            event,
            Event::Placeholder(PlaceholderEvent::LoadSuccess { placeholder, .. })
                if *placeholder == id
        )
    })
    .await;
    assert_eq!(loader.loads.load(Ordering::SeqCst), 0);

    let captured = plugin.slot.lock().clone().unwrap();
    captured.load().unwrap();
    let media = next_event(&mut rx, success_for(controller.id())).await;
    assert_eq!(vector_markup(&media), "https://example.com/a.jpg");
}
