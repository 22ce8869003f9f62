//! End-to-end dispatch through the hub with a single draining consumer.

use std::sync::Arc;
use std::time::{Duration, Instant};

use freightline_common::{Event, FreightCalculated, Route, RouteError, Waypoint};
use freightline_engine::testing::{
    sample_directions, sample_route_created, CollectingSink, FailingCalculator, FailingStore,
    ImmediatePacer,
};
use freightline_engine::{
    drain, output_channels, DistanceFreightCalculator, EventHub, FreightCalculator,
    IntervalPacer, MemoryRouteStore, OutputReceivers, Pacer, RouteStore,
};
use tokio::time::timeout;

const GUARD: Duration = Duration::from_secs(5);

fn hub_with(
    store: Arc<dyn RouteStore>,
    calculator: Arc<dyn FreightCalculator>,
    pacer: Arc<dyn Pacer>,
) -> (Arc<EventHub>, OutputReceivers) {
    let (senders, receivers) = output_channels();
    let hub = EventHub::new(store, calculator, pacer, senders);
    (Arc::new(hub), receivers)
}

fn default_hub(store: Arc<MemoryRouteStore>) -> (Arc<EventHub>, OutputReceivers) {
    hub_with(
        store,
        Arc::new(DistanceFreightCalculator::default()),
        Arc::new(ImmediatePacer::new()),
    )
}

async fn seed_route(store: &MemoryRouteStore, route_id: &str, directions: Vec<Waypoint>) {
    let route = Route::new(route_id, 10, directions).with_freight_price(1.8);
    store.create_route(route).await.unwrap();
}

fn coords(sink: &CollectingSink, route_id: &str) -> Vec<(f64, f64)> {
    sink.moves()
        .into_iter()
        .filter(|m| m.route_id == route_id)
        .map(|m| (m.lat, m.lng))
        .collect()
}

fn waypoint_coords(waypoints: &[Waypoint]) -> Vec<(f64, f64)> {
    waypoints.iter().map(|w| (w.lat, w.lng)).collect()
}

// =========================================================================
// RouteCreated
// =========================================================================

#[tokio::test]
async fn route_created_emits_exactly_one_freight_event() {
    let store = Arc::new(MemoryRouteStore::new());
    let (hub, outputs) = default_hub(store.clone());

    let handle = hub.spawn_dispatch(Event::RouteCreated(sample_route_created("1")));
    drop(hub);

    let mut sink = CollectingSink::new();
    let stats = timeout(GUARD, drain(outputs, &mut sink)).await.unwrap();
    handle.await.unwrap().unwrap();

    assert_eq!(stats.freight, 1);
    assert_eq!(stats.movement, 0);
    let freight = sink.freight();
    assert_eq!(freight.len(), 1);
    assert_eq!(freight[0].route_id, "1");
    assert!(freight[0].amount >= 0.0);
    assert_eq!(freight[0].amount, store.get_route("1").await.unwrap().freight_price);
}

#[tokio::test]
async fn duplicate_route_is_rejected_without_second_freight_event() {
    let store = Arc::new(MemoryRouteStore::new());
    let (hub, outputs) = default_hub(store.clone());

    let mut sink = CollectingSink::new();
    let consumer = tokio::spawn(async move {
        let stats = drain(outputs, &mut sink).await;
        (stats, sink)
    });

    hub.dispatch(Event::RouteCreated(sample_route_created("1")))
        .await
        .unwrap();
    let err = hub
        .dispatch(Event::RouteCreated(sample_route_created("1")))
        .await
        .unwrap_err();
    drop(hub);

    assert!(matches!(err, RouteError::Conflict { ref route_id } if route_id == "1"));
    let (stats, sink) = timeout(GUARD, consumer).await.unwrap().unwrap();
    assert_eq!(stats.freight, 1);
    assert_eq!(sink.freight().len(), 1);
}

#[tokio::test]
async fn calculation_failure_writes_nothing_and_stores_nothing() {
    let store = Arc::new(MemoryRouteStore::new());
    let (hub, mut outputs) = hub_with(
        store.clone(),
        Arc::new(FailingCalculator::new("no tariff for region")),
        Arc::new(ImmediatePacer::new()),
    );

    // Nobody reads the outputs: a write would hang, so returning at all
    // shows nothing was written.
    let result = timeout(
        GUARD,
        hub.dispatch(Event::RouteCreated(sample_route_created("1"))),
    )
    .await
    .unwrap();

    let err = result.unwrap_err();
    assert!(matches!(err, RouteError::Calculation { ref reason, .. } if reason == "no tariff for region"));
    assert!(store.is_empty());

    drop(hub);
    assert!(outputs.freight.recv().await.is_none());
}

#[tokio::test]
async fn store_errors_propagate_unchanged() {
    let (hub, _outputs) = hub_with(
        Arc::new(FailingStore::new("disk full")),
        Arc::new(DistanceFreightCalculator::default()),
        Arc::new(ImmediatePacer::new()),
    );

    let create = hub
        .dispatch(Event::RouteCreated(sample_route_created("1")))
        .await
        .unwrap_err();
    let deliver = hub.dispatch(Event::delivery_started("1")).await.unwrap_err();

    assert!(matches!(create, RouteError::Store(ref m) if m == "disk full"));
    assert!(matches!(deliver, RouteError::Store(ref m) if m == "disk full"));
}

// =========================================================================
// DeliveryStarted
// =========================================================================

#[tokio::test]
async fn delivery_emits_one_move_per_waypoint_in_order() {
    let store = Arc::new(MemoryRouteStore::new());
    let directions = vec![
        Waypoint::new(44.95, -93.09),
        Waypoint::new(45.00, -93.20),
        Waypoint::new(45.10, -93.25),
        Waypoint::new(45.12, -93.30),
        Waypoint::new(46.78, -92.10),
    ];
    seed_route(&store, "duluth", directions.clone()).await;
    let (hub, outputs) = default_hub(store);

    let handle = hub.spawn_dispatch(Event::delivery_started("duluth"));
    drop(hub);

    let mut sink = CollectingSink::new();
    let stats = timeout(GUARD, drain(outputs, &mut sink)).await.unwrap();
    handle.await.unwrap().unwrap();

    assert_eq!(stats.movement, directions.len());
    assert_eq!(stats.freight, 0);
    assert_eq!(coords(&sink, "duluth"), waypoint_coords(&directions));
}

#[tokio::test]
async fn consecutive_moves_are_spaced_by_the_pacing_interval() {
    let interval = Duration::from_millis(20);
    let store = Arc::new(MemoryRouteStore::new());
    seed_route(&store, "1", sample_directions()).await;
    let (hub, outputs) = hub_with(
        store,
        Arc::new(DistanceFreightCalculator::default()),
        Arc::new(IntervalPacer::new(interval)),
    );

    let handle = hub.spawn_dispatch(Event::delivery_started("1"));
    drop(hub);

    let mut sink = CollectingSink::new();
    timeout(GUARD, drain(outputs, &mut sink)).await.unwrap();
    handle.await.unwrap().unwrap();

    let arrivals = sink.move_arrivals("1");
    assert_eq!(arrivals.len(), 3);
    for pair in arrivals.windows(2) {
        assert!(
            pair[1].duration_since(pair[0]) >= interval,
            "moves arrived {:?} apart",
            pair[1].duration_since(pair[0])
        );
    }
}

#[tokio::test]
async fn unknown_route_is_not_found_and_writes_nothing() {
    let store = Arc::new(MemoryRouteStore::new());
    let (hub, mut outputs) = default_hub(store);

    // A consumer that only reads movement would still be fine: nothing is
    // ever written.
    let movement_reader = tokio::spawn(async move {
        let mut seen = 0;
        while outputs.movement.recv().await.is_some() {
            seen += 1;
        }
        seen
    });

    let err = timeout(GUARD, hub.dispatch(Event::delivery_started("ghost")))
        .await
        .unwrap()
        .unwrap_err();
    drop(hub);

    assert!(err.is_not_found());
    assert_eq!(timeout(GUARD, movement_reader).await.unwrap().unwrap(), 0);
}

#[tokio::test]
async fn parallel_deliveries_keep_per_route_order() {
    let store = Arc::new(MemoryRouteStore::new());
    let north: Vec<Waypoint> = (0..6).map(|i| Waypoint::new(i as f64, 0.0)).collect();
    let south: Vec<Waypoint> = (0..6).map(|i| Waypoint::new(-(i as f64), 0.0)).collect();
    seed_route(&store, "north", north.clone()).await;
    seed_route(&store, "south", south.clone()).await;
    let (hub, outputs) = default_hub(store);

    let a = hub.spawn_dispatch(Event::delivery_started("north"));
    let b = hub.spawn_dispatch(Event::delivery_started("south"));
    drop(hub);

    let mut sink = CollectingSink::new();
    let stats = timeout(GUARD, drain(outputs, &mut sink)).await.unwrap();
    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    assert_eq!(stats.movement, 12);
    assert_eq!(coords(&sink, "north"), waypoint_coords(&north));
    assert_eq!(coords(&sink, "south"), waypoint_coords(&south));
}

// =========================================================================
// Full pipeline
// =========================================================================

#[tokio::test]
async fn create_then_deliver_with_single_multiplexing_consumer() {
    let interval = Duration::from_millis(10);
    let store = Arc::new(MemoryRouteStore::new());
    let (hub, outputs) = hub_with(
        store.clone(),
        Arc::new(DistanceFreightCalculator::default()),
        Arc::new(IntervalPacer::new(interval)),
    );

    let started = Instant::now();
    let mut sink = CollectingSink::new();
    let consumer = tokio::spawn(async move {
        let stats = drain(outputs, &mut sink).await;
        (stats, sink)
    });

    let created = hub.spawn_dispatch(Event::route_created("1", 100, sample_directions()));
    timeout(GUARD, async {
        while !store.contains("1") {
            tokio::task::yield_now().await;
        }
    })
    .await
    .unwrap();
    let delivered = hub.spawn_dispatch(Event::delivery_started("1"));
    drop(hub);

    created.await.unwrap().unwrap();
    delivered.await.unwrap().unwrap();
    let (stats, sink) = timeout(GUARD, consumer).await.unwrap().unwrap();

    assert!(started.elapsed() >= interval * 3);
    assert_eq!(stats.freight, 1);
    assert_eq!(stats.movement, 3);

    let freight = sink.freight();
    assert_eq!(freight[0].route_id, "1");
    assert!((freight[0].amount - 15.30).abs() < 1e-9);
    assert_eq!(
        coords(&sink, "1"),
        vec![(1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]
    );
}

// =========================================================================
// Channel discipline
// =========================================================================

#[tokio::test]
async fn freight_writer_blocks_while_only_movement_is_drained() {
    let store = Arc::new(MemoryRouteStore::new());
    let (hub, outputs) = default_hub(store.clone());
    let OutputReceivers {
        freight: _freight_unread,
        mut movement,
    } = outputs;

    let movement_reader = tokio::spawn(async move { while movement.recv().await.is_some() {} });

    let pending = timeout(
        Duration::from_millis(100),
        hub.dispatch(Event::RouteCreated(sample_route_created("1"))),
    )
    .await;

    assert!(pending.is_err(), "freight write should still be pending");
    // The workflow ran up to the write: the route is stored.
    assert!(store.contains("1"));

    drop(hub);
    timeout(GUARD, movement_reader).await.unwrap().unwrap();
}

#[tokio::test]
async fn outbound_variants_are_ignored() {
    let store = Arc::new(MemoryRouteStore::new());
    let (hub, _outputs) = default_hub(store.clone());

    // No consumer at all: any write would hang past the timeout.
    let freight = Event::FreightCalculated(FreightCalculated {
        route_id: "1".into(),
        amount: 3.0,
    });
    let moved = Event::DriverMoved(freightline_common::DriverMoved::at(
        "1",
        Waypoint::new(1.0, 1.0),
    ));

    timeout(Duration::from_millis(100), hub.dispatch(freight))
        .await
        .unwrap()
        .unwrap();
    timeout(Duration::from_millis(100), hub.dispatch(moved))
        .await
        .unwrap()
        .unwrap();
    assert!(store.is_empty());
}
