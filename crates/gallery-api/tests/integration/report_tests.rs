//! Statistics and warehouse report integration tests.

use axum::http::StatusCode;
use axum::Router;
use serde_json::{json, Value};

use super::common::{
    create_artwork, create_exhibition, create_test_router, create_visitor, get_request, id_of,
    post_json_request, send_request,
};

async fn record_visit(app: &Router, visitor: &str, exhibition: &str, date: &str, price: f64) {
    let (status, body): (StatusCode, Value) = send_request(
        app.clone(),
        post_json_request(
            &format!("/api/visitors/{visitor}/visits"),
            &json!({ "exhibitionId": exhibition, "visitDate": date, "ticketPrice": price }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "visit creation failed: {body}");
}

async fn sync(app: &Router) {
    let (status, body): (StatusCode, Value) =
        send_request(app.clone(), post_json_request("/api/etl/sync", &json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "succeeded");
}

#[tokio::test]
async fn test_statistics_reflect_collection() {
    let (app, _state) = create_test_router().await;

    create_artwork(&app, "One", "painting", 100.0).await;
    create_artwork(&app, "Two", "sculpture", 250.5).await;

    let (status, stats): (StatusCode, Value) =
        send_request(app, get_request("/api/statistics")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["totalArtworks"], 2);
    assert_eq!(stats["totalCollectionValue"], 350.5);
    assert_eq!(stats["artworksByStatus"]["available"], 2);
}

#[tokio::test]
async fn test_collection_value_percentages_sum_to_hundred() {
    let (app, _state) = create_test_router().await;

    create_artwork(&app, "A", "painting", 100.0).await;
    create_artwork(&app, "B", "sculpture", 100.0).await;
    create_artwork(&app, "C", "drawing", 100.0).await;
    sync(&app).await;

    let (status, report): (StatusCode, Value) =
        send_request(app, get_request("/api/reports/collection-value")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["totalArtworks"], 3);
    assert_eq!(report["grandTotal"], 300.0);

    let sum: f64 = report["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["percentage"].as_f64().unwrap())
        .sum();
    assert!((sum - 100.0).abs() < 1e-9, "percentages summed to {sum}");
}

#[tokio::test]
async fn test_visitor_growth_year_over_year() {
    let (app, _state) = create_test_router().await;

    let exhibition = id_of(&create_exhibition(&app, "Annual Show", "active").await);
    let visitor = id_of(&create_visitor(&app, "ada@example.com").await);

    record_visit(&app, &visitor, &exhibition, "2023-05-01", 10.0).await;
    record_visit(&app, &visitor, &exhibition, "2023-06-01", 10.0).await;
    record_visit(&app, &visitor, &exhibition, "2024-05-01", 15.0).await;
    record_visit(&app, &visitor, &exhibition, "2024-06-01", 15.0).await;
    record_visit(&app, &visitor, &exhibition, "2024-07-01", 15.0).await;
    sync(&app).await;

    let (status, report): (StatusCode, Value) =
        send_request(app.clone(), get_request("/api/reports/visitor-growth")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["totalVisits"], 5);

    let rows = report["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["year"], 2023);
    assert!(rows[0]["growthRate"].is_null());
    assert_eq!(rows[1]["year"], 2024);
    assert_eq!(rows[1]["growthRate"], 0.5);

    let (status, report): (StatusCode, Value) =
        send_request(app, get_request("/api/reports/exhibition-performance")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["rows"][0]["visitCount"], 5);
    assert_eq!(report["totalRevenue"], 65.0);
}

#[tokio::test]
async fn test_reports_are_empty_before_first_sync() {
    let (app, _state) = create_test_router().await;
    create_artwork(&app, "Unsynced", "painting", 100.0).await;

    for path in [
        "/api/reports/collection-value",
        "/api/reports/visitor-growth",
        "/api/reports/exhibition-performance",
        "/api/reports/loan-summary",
        "/api/reports/restoration-costs",
        "/api/reports/insurance-coverage",
    ] {
        let (status, report): (StatusCode, Value) =
            send_request(app.clone(), get_request(path)).await;
        assert_eq!(status, StatusCode::OK, "{path}");
        assert!(report["rows"].as_array().unwrap().is_empty(), "{path}");
    }
}

async fn create(app: &Router, uri: &str, body: Value) -> Value {
    let (status, created): (StatusCode, Value) =
        send_request(app.clone(), post_json_request(uri, &body)).await;
    assert_eq!(status, StatusCode::CREATED, "POST {uri} failed: {created}");
    created
}

#[tokio::test]
async fn test_exhibition_performance_orders_by_visits() {
    let (app, _state) = create_test_router().await;

    let quiet = id_of(&create_exhibition(&app, "Quiet Room", "active").await);
    let busy = id_of(&create_exhibition(&app, "Blockbuster", "active").await);
    let visitor = id_of(&create_visitor(&app, "fan@example.com").await);

    record_visit(&app, &visitor, &quiet, "2024-04-01", 12.0).await;
    record_visit(&app, &visitor, &busy, "2024-04-02", 10.0).await;
    record_visit(&app, &visitor, &busy, "2024-04-03", 10.0).await;
    record_visit(&app, &visitor, &busy, "2024-04-04", 20.0).await;
    sync(&app).await;

    let (status, report): (StatusCode, Value) =
        send_request(app, get_request("/api/reports/exhibition-performance")).await;
    assert_eq!(status, StatusCode::OK);

    let rows = report["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["exhibitionId"], busy);
    assert_eq!(rows[0]["visitCount"], 3);
    assert_eq!(rows[0]["revenue"], 40.0);
    assert_eq!(rows[0]["averageTicketPrice"], 13.33);
    assert_eq!(rows[1]["title"], "Quiet Room");
    assert_eq!(rows[1]["averageTicketPrice"], 12.0);
}

#[tokio::test]
async fn test_loan_summary_groups_by_status() {
    let (app, _state) = create_test_router().await;

    for (title, status, fee) in [
        ("Loan A", "requested", 1000.0),
        ("Loan B", "requested", 1000.0),
        ("Loan C", "returned", 500.0),
    ] {
        let artwork = id_of(&create_artwork(&app, title, "painting", 100.0).await);
        create(
            &app,
            "/api/loans",
            json!({
                "artworkId": artwork,
                "institution": "Tate Modern",
                "direction": "outgoing",
                "startDate": "2024-01-01",
                "endDate": "2024-02-01",
                "loanFee": fee,
                "status": status
            }),
        )
        .await;
    }
    sync(&app).await;

    let (status, report): (StatusCode, Value) =
        send_request(app, get_request("/api/reports/loan-summary")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["totalLoans"], 3);
    assert_eq!(report["totalFees"], 2500.0);

    let rows = report["rows"].as_array().unwrap();
    assert_eq!(rows[0]["status"], "requested");
    assert_eq!(rows[0]["loanCount"], 2);
    assert_eq!(rows[0]["totalFees"], 2000.0);
    assert_eq!(rows[1]["status"], "returned");

    let sum: f64 = rows.iter().map(|r| r["percentage"].as_f64().unwrap()).sum();
    assert!((sum - 100.0).abs() < 1e-9, "percentages summed to {sum}");
}

#[tokio::test]
async fn test_restoration_costs_growth_needs_prior_year() {
    let (app, _state) = create_test_router().await;
    let artwork = id_of(&create_artwork(&app, "Much Restored", "painting", 100.0).await);

    for (start, cost) in [
        ("2022-03-01", 1000.0),
        ("2023-03-01", 750.0),
        ("2023-09-01", 750.0),
        ("2025-01-10", 400.0),
    ] {
        create(
            &app,
            "/api/restorations",
            json!({
                "artworkId": artwork,
                "description": "Surface cleaning",
                "startDate": start,
                "cost": cost
            }),
        )
        .await;
    }
    sync(&app).await;

    let (status, report): (StatusCode, Value) =
        send_request(app, get_request("/api/reports/restoration-costs")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["totalRestorations"], 4);
    assert_eq!(report["totalCost"], 2900.0);

    let rows = report["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["year"], 2022);
    assert!(rows[0]["growthRate"].is_null());
    assert_eq!(rows[1]["year"], 2023);
    assert_eq!(rows[1]["restorationCount"], 2);
    assert_eq!(rows[1]["growthRate"], 0.5);
    // 2024 had no restorations, so 2025 has nothing to compare against.
    assert_eq!(rows[2]["year"], 2025);
    assert!(rows[2]["growthRate"].is_null());
}

#[tokio::test]
async fn test_insurance_coverage_counts_active_policies_only() {
    let (app, _state) = create_test_router().await;
    let artwork = id_of(&create_artwork(&app, "Insured", "sculpture", 100.0).await);

    for (number, provider, coverage, status) in [
        ("POL-1", "Lloyd's", 3000.0, "active"),
        ("POL-2", "AXA", 1000.0, "active"),
        ("POL-3", "AXA", 5000.0, "expired"),
        ("POL-4", "Chubb", 8000.0, "cancelled"),
    ] {
        create(
            &app,
            "/api/insurances",
            json!({
                "artworkId": artwork,
                "provider": provider,
                "policyNumber": number,
                "coverageAmount": coverage,
                "premium": coverage / 100.0,
                "startDate": "2024-01-01",
                "endDate": "2024-12-31",
                "status": status
            }),
        )
        .await;
    }
    sync(&app).await;

    let (status, report): (StatusCode, Value) =
        send_request(app, get_request("/api/reports/insurance-coverage")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["totalPolicies"], 2);
    assert_eq!(report["totalCoverage"], 4000.0);
    assert_eq!(report["totalPremium"], 40.0);

    let rows = report["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["provider"], "Lloyd's");
    assert_eq!(rows[0]["percentage"], 75.0);
    assert_eq!(rows[1]["provider"], "AXA");
    assert_eq!(rows[1]["policyCount"], 1);
    assert_eq!(rows[1]["percentage"], 25.0);
}
