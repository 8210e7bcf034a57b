//! Integration tests for the resource wrappers.
//!
//! Each test mounts the endpoint a wrapper is expected to call and checks
//! the method, path, body, and decoded result.

use std::time::Duration;

use chrono::NaiveDate;
use fulfillment_api::rest::resources::{
    Address, Item, ItemListParams, LineItem, ModifyRequest, NewItem, NewShipment, NewWarehousing,
    Page, Shipment, ShipmentStatus, Transfer, TransferStatus, TransferUpdate, Warehousing,
    WarehousingListParams, WarehousingStatus,
};
use fulfillment_api::rest::Resource;
use fulfillment_api::{
    ApiClient, ApiToken, BaseUrl, ClientConfig, ErrorKind, FileUpload, IssueKind, RetryPolicy,
};
use serde_json::json;
use wiremock::matchers::{any, body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_client(server: &MockServer) -> ApiClient {
    let config = ClientConfig::builder()
        .api_token(ApiToken::new("test-token").unwrap())
        .base_url(BaseUrl::new(server.uri()).unwrap())
        .retry(RetryPolicy::default().backoff(|_| Duration::from_millis(1)))
        .build()
        .unwrap();
    ApiClient::new(config).unwrap()
}

/// Mounts a catch-all mock that fails the test if any request arrives.
async fn expect_no_requests(server: &MockServer) {
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}

fn item_json(id: &str, code: &str) -> serde_json::Value {
    json!({
        "id": id,
        "code": code,
        "name": "T-shirt",
        "price": 1200,
        "kind": "normal",
        "created_at": "2024-05-01T09:30:00Z",
        "updated_at": "2024-05-02T09:30:00Z"
    })
}

fn recipient() -> Address {
    Address {
        name: Some("Jane Smith".into()),
        postal_code: Some("94107".into()),
        region: Some("CA".into()),
        city: Some("San Francisco".into()),
        address_line1: Some("500 Howard St".into()),
        phone: Some("415-555-0100".into()),
        ..Default::default()
    }
}

// ============================================================================
// Items
// ============================================================================

#[tokio::test]
async fn test_item_get_decodes_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/items/itm_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(item_json("itm_1", "SKU-1")))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server);
    let item = Item::get(&client, "itm_1").await.unwrap();

    assert_eq!(item.id.as_deref(), Some("itm_1"));
    assert_eq!(item.code.as_deref(), Some("SKU-1"));
    assert_eq!(item.price, Some(1200.0));
    assert!(item.created_at.is_some());
}

#[tokio::test]
async fn test_item_get_encodes_identifier() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/items/A%2F1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(item_json("A/1", "A/1")))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server);
    let item = Item::get(&client, "A/1").await.unwrap();
    assert_eq!(item.code.as_deref(), Some("A/1"));
}

#[tokio::test]
async fn test_item_get_blank_id_sends_no_request() {
    let server = MockServer::start().await;
    expect_no_requests(&server).await;

    let client = create_client(&server);
    let error = Item::get(&client, "   ").await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Validation);
    assert!(error.issues()[0].is_at(&["id"]));
}

#[tokio::test]
async fn test_item_get_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/items/missing"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"message": "Item not found"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server);
    let error = Item::get(&client, "missing").await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::NotFound);
    assert_eq!(error.to_string(), "Not found: Item not found");
}

#[tokio::test]
async fn test_item_list_sends_params_and_unwraps_plural_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/items"))
        .and(query_param("page", "2"))
        .and(query_param("keyword", "shirt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [item_json("itm_1", "SKU-1"), item_json("itm_2", "SKU-2")],
            "total": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server);
    let params = ItemListParams {
        page: Page {
            page: Some(2),
            per_page: None,
        },
        keyword: Some("shirt".into()),
        ..Default::default()
    };
    let items = Item::list(&client, &params).await.unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[1].code.as_deref(), Some("SKU-2"));
}

#[tokio::test]
async fn test_item_create_missing_code_sends_no_request() {
    let server = MockServer::start().await;
    expect_no_requests(&server).await;

    let client = create_client(&server);
    let error = Item::create(
        &client,
        &NewItem {
            name: Some("T-shirt".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Validation);
    assert_eq!(error.issues().len(), 1);
    assert!(error.issues()[0].is_at(&["code"]));
}

#[tokio::test]
async fn test_item_create_posts_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/items"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"code": "SKU-1", "name": "T-shirt", "price": 1200.0})))
        .respond_with(ResponseTemplate::new(201).set_body_json(item_json("itm_1", "SKU-1")))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server);
    let item = Item::create(
        &client,
        &NewItem {
            code: Some("SKU-1".into()),
            name: Some("T-shirt".into()),
            price: Some(1200.0),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(item.id.as_deref(), Some("itm_1"));
}

#[tokio::test]
async fn test_item_update_server_rejection_is_validation() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/items/itm_1"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"message": "Barcode already used"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server);
    let update = fulfillment_api::rest::resources::ItemUpdate {
        barcode: Some("4901234567894".into()),
        ..Default::default()
    };
    let error = Item::update(&client, "itm_1", &update).await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Validation);
    assert_eq!(error.status_code(), Some(422));
    assert_eq!(error.issues()[0].kind, IssueKind::Custom);
}

#[tokio::test]
async fn test_item_delete_with_empty_body_returns_empty_object() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/items/itm_1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server);
    let ack = Item::delete(&client, "itm_1").await.unwrap();
    assert_eq!(ack, json!({}));
}

#[tokio::test]
async fn test_item_bulk_create_wraps_items() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/items/bulk"))
        .and(body_json(json!({"items": [
            {"code": "A", "name": "First"},
            {"code": "B", "name": "Second"}
        ]})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "items": [item_json("itm_a", "A"), item_json("itm_b", "B")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server);
    let new_item = |code: &str, name: &str| NewItem {
        code: Some(code.into()),
        name: Some(name.into()),
        ..Default::default()
    };
    let items = Item::bulk_create(&client, &[new_item("A", "First"), new_item("B", "Second")])
        .await
        .unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id.as_deref(), Some("itm_a"));
}

#[tokio::test]
async fn test_item_bulk_create_reports_indexed_issue() {
    let server = MockServer::start().await;
    expect_no_requests(&server).await;

    let client = create_client(&server);
    let items = [
        NewItem {
            code: Some("A".into()),
            name: Some("First".into()),
            ..Default::default()
        },
        NewItem {
            code: Some("B".into()),
            ..Default::default()
        },
    ];
    let error = Item::bulk_create(&client, &items).await.unwrap_err();

    assert!(error.issues()[0].is_at(&["items", "1", "name"]));
}

#[tokio::test]
async fn test_item_upload_image_sends_multipart_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/items/itm_1/images"))
        .and(body_string_contains("name=\"file\""))
        .and(body_string_contains("filename=\"front.png\""))
        .and(body_string_contains("fake-png-bytes"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "img_1",
            "url": "https://cdn.example.com/front.png",
            "position": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server);
    let upload = FileUpload::new("front.png", "image/png", b"fake-png-bytes".to_vec());
    let image = Item::upload_image(&client, "itm_1", upload).await.unwrap();

    assert_eq!(image.id.as_deref(), Some("img_1"));
    assert_eq!(image.position, Some(1));
}

#[tokio::test]
async fn test_item_delete_image_checks_both_identifiers() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/items/itm_1/images/img_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"deleted": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server);
    let ack = Item::delete_image(&client, "itm_1", "img_1").await.unwrap();
    assert_eq!(ack, json!({"deleted": true}));

    let error = Item::delete_image(&client, "itm_1", "").await.unwrap_err();
    assert!(error.issues()[0].is_at(&["image_id"]));
}

// ============================================================================
// Warehousings
// ============================================================================

fn warehousing_payload(items: Vec<LineItem>) -> NewWarehousing {
    NewWarehousing {
        reference: Some("PO-100".into()),
        expected_date: NaiveDate::from_ymd_opt(2024, 6, 1),
        arrival_time_from: Some("09:00".into()),
        arrival_time_to: Some("12:00".into()),
        items: Some(items),
        note: None,
    }
}

#[tokio::test]
async fn test_warehousing_create_posts_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/warehousings"))
        .and(body_json(json!({
            "reference": "PO-100",
            "expected_date": "2024-06-01",
            "arrival_time_from": "09:00",
            "arrival_time_to": "12:00",
            "items": [{"item_code": "A-1", "quantity": 10}]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "wh_1",
            "reference": "PO-100",
            "status": "pending",
            "expected_date": "2024-06-01",
            "items": [{"item_code": "A-1", "quantity": 10}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server);
    let warehousing = Warehousing::create(&client, &warehousing_payload(vec![LineItem::new("A-1", 10)]))
        .await
        .unwrap();

    assert_eq!(warehousing.status, Some(WarehousingStatus::Pending));
}

#[tokio::test]
async fn test_warehousing_duplicate_codes_send_no_request() {
    let server = MockServer::start().await;
    expect_no_requests(&server).await;

    let client = create_client(&server);
    let payload = warehousing_payload(vec![LineItem::new("A-1", 1), LineItem::new("A-1", 2)]);
    let error = Warehousing::create(&client, &payload).await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Validation);
    assert_eq!(error.issues()[0].kind, IssueKind::Custom);
    assert!(error.issues()[0].is_at(&["items", "1", "item_code"]));
}

#[tokio::test]
async fn test_warehousing_reversed_arrival_window_sends_no_request() {
    let server = MockServer::start().await;
    expect_no_requests(&server).await;

    let client = create_client(&server);
    let mut payload = warehousing_payload(vec![LineItem::new("A-1", 1)]);
    payload.arrival_time_from = Some("15:00".into());
    let error = Warehousing::update(&client, "wh_1", &payload).await.unwrap_err();

    assert!(error.issues()[0].is_at(&["arrival_time_to"]));
}

#[tokio::test]
async fn test_warehousing_list_stocked() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/warehousings/stocked"))
        .and(query_param("item_code", "A-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "warehousings": [{
                "id": "wh_1",
                "status": "stocked",
                "expected_date": "2024-06-01",
                "items": [{"item_code": "A-1", "quantity": 10}],
                "stocked_at": "2024-06-01T10:15:00Z"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server);
    let params = WarehousingListParams {
        item_code: Some("A-1".into()),
        ..Default::default()
    };
    let stocked = Warehousing::list_stocked(&client, &params).await.unwrap();

    assert_eq!(stocked.len(), 1);
    assert!(stocked[0].stocked_at.is_some());
}

#[tokio::test]
async fn test_warehousing_label_returns_pdf_bytes() {
    let server = MockServer::start().await;
    let pdf = b"%PDF-1.4\n%fake label\n".to_vec();
    Mock::given(method("GET"))
        .and(path("/api/warehousings/wh_1/label.pdf"))
        .and(header("accept", "application/pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "application/pdf")
                .set_body_bytes(pdf.clone()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server);
    let bytes = Warehousing::label(&client, "wh_1").await.unwrap();
    assert_eq!(bytes, pdf);
}

// ============================================================================
// Shipments
// ============================================================================

fn shipment_json(status: &str) -> serde_json::Value {
    json!({
        "id": "shp_1",
        "reference": "ORD-1",
        "status": status,
        "recipient": {
            "name": "Jane Smith",
            "postal_code": "94107",
            "region": "CA",
            "city": "San Francisco",
            "address_line1": "500 Howard St",
            "phone": "415-555-0100"
        },
        "items": [{"item_code": "A-1", "quantity": 1}],
        "tracking_number": null
    })
}

#[tokio::test]
async fn test_shipment_create_and_get() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/shipments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(shipment_json("pending")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/shipments/shp_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(shipment_json("picking")))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server);
    let created = Shipment::create(
        &client,
        &NewShipment {
            reference: Some("ORD-1".into()),
            recipient: Some(recipient()),
            items: Some(vec![LineItem::new("A-1", 1)]),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(created.status, Some(ShipmentStatus::Pending));

    let fetched = Shipment::get(&client, "shp_1").await.unwrap();
    assert_eq!(fetched.status, Some(ShipmentStatus::Picking));
    assert_eq!(fetched.recipient.unwrap().city.as_deref(), Some("San Francisco"));
}

#[tokio::test]
async fn test_shipment_modify_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/shipments/shp_1/modify"))
        .and(body_json(json!({
            "reason": "Customer moved",
            "requested_delivery_date": "2024-07-03"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(shipment_json("pending")))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server);
    let request = ModifyRequest {
        reason: Some("Customer moved".into()),
        requested_delivery_date: NaiveDate::from_ymd_opt(2024, 7, 3),
        ..Default::default()
    };
    let shipment = Shipment::modify_request(&client, "shp_1", &request).await.unwrap();
    assert_eq!(shipment.id.as_deref(), Some("shp_1"));
}

#[tokio::test]
async fn test_shipment_cancel_request_accepts_empty_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/shipments/shp_1/cancel"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server);
    let ack = Shipment::cancel_request(&client, "shp_1").await.unwrap();
    assert_eq!(ack, json!({}));
}

#[tokio::test]
async fn test_shipment_cancel_conflict_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/shipments/shp_1/cancel"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({"message": "Already shipped"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server);
    let error = Shipment::cancel_request(&client, "shp_1").await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Api);
    assert_eq!(error.status_code(), Some(409));
    assert_eq!(error.to_string(), "API error 409: Already shipped");
}

#[tokio::test]
async fn test_shipment_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server);
    let error = Shipment::list(&client, &Default::default()).await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Authentication);
    assert_eq!(error.to_string(), "Authentication error: Authentication failed");
}

// ============================================================================
// Transfers
// ============================================================================

#[tokio::test]
async fn test_transfer_update_sends_partial_body() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/transfers/trf_1"))
        .and(body_json(json!({"scheduled_date": "2024-08-12"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "trf_1",
            "from_warehouse": "TOKYO",
            "to_warehouse": "OSAKA",
            "status": "requested",
            "scheduled_date": "2024-08-12",
            "items": [{"item_code": "A-1", "quantity": 3}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server);
    let update = TransferUpdate {
        scheduled_date: NaiveDate::from_ymd_opt(2024, 8, 12),
        ..Default::default()
    };
    let transfer = Transfer::update(&client, "trf_1", &update).await.unwrap();

    assert_eq!(transfer.status, Some(TransferStatus::Requested));
    assert_eq!(transfer.scheduled_date, NaiveDate::from_ymd_opt(2024, 8, 12));
}

#[tokio::test]
async fn test_transfer_list_with_status_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/transfers"))
        .and(query_param("status", "in_transit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"transfers": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server);
    let params = fulfillment_api::rest::resources::TransferListParams {
        status: Some(TransferStatus::InTransit),
        ..Default::default()
    };
    let transfers = Transfer::list(&client, &params).await.unwrap();
    assert!(transfers.is_empty());
}
