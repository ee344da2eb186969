//! Query Execution Tests
//!
//! End-to-end list reads against an in-memory collection:
//! - Filter, sort and window applied together
//! - Pagination links at page boundaries
//! - Field selection keeps the id
//! - Store failures surface unchanged

use devcamper::query::{execute, translate, PageRef, PopulateSpec, RawParams, ResultEnvelope};
use devcamper::store::{Collection, MemoryCollection, StoreError};
use serde_json::{json, Value};

// =============================================================================
// Helper Functions
// =============================================================================

async fn bootcamps() -> MemoryCollection {
    let coll = MemoryCollection::new("bootcamps");
    for (id, name, cost, state) in [
        ("b1", "Devworks", 1000, "MA"),
        ("b2", "ModernTech", 2500, "MA"),
        ("b3", "Codemasters", 1800, "NH"),
        ("b4", "Devcentral", 3000, "RI"),
        ("b5", "Bootcamp Alpha", 2000, "MA"),
    ] {
        coll.insert(json!({
            "_id": id,
            "name": name,
            "averageCost": cost,
            "location": {"state": state}
        }))
        .await
        .unwrap();
    }
    coll
}

async fn numbered(n: usize) -> MemoryCollection {
    let coll = MemoryCollection::new("courses");
    for i in 0..n {
        coll.insert(json!({"_id": format!("c{:02}", i), "position": i}))
            .await
            .unwrap();
    }
    coll
}

async fn run(coll: &MemoryCollection, raw: RawParams) -> ResultEnvelope {
    let descriptor = translate(&raw).unwrap();
    execute(&descriptor, coll, None).await.unwrap()
}

fn names(envelope: &ResultEnvelope) -> Vec<&str> {
    envelope
        .data
        .iter()
        .filter_map(|d| d["name"].as_str())
        .collect()
}

// =============================================================================
// Filtering, Sorting, Windowing
// =============================================================================

/// averageCost[lte]=2000&sort=name&page=1&limit=2 over five records
#[tokio::test]
async fn test_filtered_sorted_first_page() {
    let coll = bootcamps().await;
    let env = run(
        &coll,
        RawParams::from_pairs([
            ("averageCost[lte]", "2000"),
            ("sort", "name"),
            ("page", "1"),
            ("limit", "2"),
        ]),
    )
    .await;

    assert!(env.success);
    assert_eq!(env.count, 2);
    assert_eq!(names(&env), vec!["Bootcamp Alpha", "Codemasters"]);
    assert_eq!(env.pagination.next, Some(PageRef { page: 2, limit: 2 }));
    assert_eq!(env.pagination.prev, None);
}

#[tokio::test]
async fn test_second_page_is_last() {
    let coll = bootcamps().await;
    let env = run(
        &coll,
        RawParams::from_pairs([
            ("averageCost[lte]", "2000"),
            ("sort", "name"),
            ("page", "2"),
            ("limit", "2"),
        ]),
    )
    .await;

    assert_eq!(names(&env), vec!["Devworks"]);
    assert_eq!(env.pagination.next, None);
    assert_eq!(env.pagination.prev, Some(PageRef { page: 1, limit: 2 }));
}

#[tokio::test]
async fn test_every_record_satisfies_filter() {
    let coll = bootcamps().await;
    let env = run(
        &coll,
        RawParams::from_pairs([("averageCost[gt]", "1500"), ("location.state", "MA")]),
    )
    .await;

    assert_eq!(env.count, 2);
    for record in &env.data {
        assert!(record["averageCost"].as_i64().unwrap() > 1500);
        assert_eq!(record["location"]["state"], "MA");
    }
}

#[tokio::test]
async fn test_in_operator() {
    let coll = bootcamps().await;
    let env = run(
        &coll,
        RawParams::from_pairs([("location.state[in]", "NH,RI"), ("sort", "-averageCost")]),
    )
    .await;
    assert_eq!(names(&env), vec!["Devcentral", "Codemasters"]);
}

#[tokio::test]
async fn test_no_match_is_empty_success() {
    let coll = bootcamps().await;
    let env = run(&coll, RawParams::new().with("averageCost[gt]", "99999")).await;

    assert!(env.success);
    assert_eq!(env.count, 0);
    assert!(env.data.is_empty());
    assert_eq!(env.pagination.next, None);
    assert_eq!(env.pagination.prev, None);
}

// =============================================================================
// Pagination Boundaries
// =============================================================================

#[tokio::test]
async fn test_last_full_page_has_no_next() {
    let coll = numbered(30).await;
    let env = run(
        &coll,
        RawParams::from_pairs([("sort", "position"), ("page", "3"), ("limit", "10")]),
    )
    .await;

    assert_eq!(env.count, 10);
    assert_eq!(env.data[0]["position"], 20);
    assert_eq!(env.pagination.next, None);
    assert_eq!(env.pagination.prev, Some(PageRef { page: 2, limit: 10 }));
}

#[tokio::test]
async fn test_page_past_end_is_empty() {
    let coll = numbered(30).await;
    let env = run(&coll, RawParams::from_pairs([("page", "5"), ("limit", "10")])).await;

    assert_eq!(env.count, 0);
    assert_eq!(env.pagination.next, None);
    assert_eq!(env.pagination.prev, Some(PageRef { page: 4, limit: 10 }));
}

#[tokio::test]
async fn test_default_sort_newest_first() {
    let coll = MemoryCollection::new("reviews");
    for (id, at) in [
        ("r1", "2026-01-01T00:00:00.000Z"),
        ("r2", "2026-03-01T00:00:00.000Z"),
        ("r3", "2026-02-01T00:00:00.000Z"),
    ] {
        coll.insert(json!({"_id": id, "createdAt": at})).await.unwrap();
    }

    let env = run(&coll, RawParams::new()).await;
    let ids: Vec<_> = env.data.iter().map(|d| d["_id"].clone()).collect();
    assert_eq!(ids, vec![json!("r2"), json!("r3"), json!("r1")]);
}

// =============================================================================
// Projection and Population
// =============================================================================

#[tokio::test]
async fn test_select_keeps_id() {
    let coll = bootcamps().await;
    let env = run(
        &coll,
        RawParams::from_pairs([("select", "name"), ("sort", "name"), ("limit", "1")]),
    )
    .await;

    assert_eq!(env.data, vec![json!({"_id": "b5", "name": "Bootcamp Alpha"})]);
}

#[tokio::test]
async fn test_population_is_limited_to_page() {
    let camps = bootcamps().await;
    let courses = MemoryCollection::new("courses");
    for (id, camp) in [("c1", "b1"), ("c2", "b1"), ("c3", "b4")] {
        courses
            .insert(json!({"_id": id, "bootcamp": camp}))
            .await
            .unwrap();
    }

    let descriptor = translate(&RawParams::from_pairs([("sort", "averageCost"), ("limit", "1")])).unwrap();
    let spec = PopulateSpec::children("courses", &courses, "bootcamp");
    let env = execute(&descriptor, &camps, Some(&spec)).await.unwrap();

    assert_eq!(env.count, 1);
    assert_eq!(env.data[0]["_id"], "b1");
    let ids: Vec<&Value> = env.data[0]["courses"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| &c["_id"])
        .collect();
    assert_eq!(ids, vec![&json!("c1"), &json!("c2")]);
}

// =============================================================================
// Store Failures
// =============================================================================

#[tokio::test]
async fn test_store_unavailable_propagates() {
    let coll = bootcamps().await;
    coll.set_available(false);

    let descriptor = translate(&RawParams::new()).unwrap();
    let result = execute(&descriptor, &coll, None).await;
    assert!(matches!(result, Err(StoreError::Unavailable(_))));

    coll.set_available(true);
    assert_eq!(coll.name(), "bootcamps");
    assert!(execute(&descriptor, &coll, None).await.is_ok());
}
