use parcelmap::prelude::*;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn geocoder_for(server: &MockServer) -> GatewayGeocoder {
    let config = GeocodeConfig::default()
        .with_base_url(format!("{}/", server.uri()))
        .with_timeout(Duration::from_secs(2));
    GatewayGeocoder::new(&config).expect("client should build")
}

const REVERSE_BODY: &str = r#"{
    "place_id": 123456,
    "lat": "28.6314512",
    "lon": "77.2166672",
    "display_name": "12, Janpath, Connaught Place, New Delhi, Delhi, 110001, India",
    "address": {
        "house_number": "12",
        "road": "Janpath",
        "suburb": "Connaught Place",
        "city": "New Delhi",
        "state": "Delhi",
        "postcode": "110001",
        "country": "India",
        "country_code": "in"
    }
}"#;

#[tokio::test]
async fn test_reverse_maps_address_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/reverse"))
        .and(query_param("lat", "28.6315"))
        .and(query_param("lon", "77.2167"))
        .respond_with(ResponseTemplate::new(200).set_body_string(REVERSE_BODY))
        .expect(1)
        .mount(&server)
        .await;

    let geocoder = geocoder_for(&server).await;
    let clicked = LatLng::new(28.6315, 77.2167);
    let place = geocoder.reverse(clicked).await.unwrap();

    // The clicked point wins over the matched object's centroid
    assert_eq!(place.coordinate, clicked);
    assert!(place.display_name.starts_with("12, Janpath"));

    let fields = place.address_fields().unwrap();
    assert_eq!(fields.line1(), "12 Janpath");
    assert_eq!(fields.locality(), Some("New Delhi"));
    assert_eq!(fields.state(), Some("Delhi"));
    assert_eq!(fields.postal_code(), Some("110001"));
    assert_eq!(fields.country(), Some("India"));
}

#[tokio::test]
async fn test_reverse_unable_to_geocode() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/reverse"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"error":"Unable to geocode"}"#),
        )
        .mount(&server)
        .await;

    let geocoder = geocoder_for(&server).await;
    let err = geocoder.reverse(LatLng::new(0.0, -160.0)).await.unwrap_err();
    assert!(matches!(err, GeocodeError::NotFound));
}

#[tokio::test]
async fn test_reverse_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/reverse"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let geocoder = geocoder_for(&server).await;
    let err = geocoder.reverse(LatLng::new(28.6, 77.2)).await.unwrap_err();
    assert!(matches!(err, GeocodeError::Status(502)));

    // The widget-facing helper degrades to "no address"
    let fields = parcelmap::geocode::reverse_lookup(&geocoder, LatLng::new(28.6, 77.2)).await;
    assert!(fields.is_none());
}

#[tokio::test]
async fn test_reverse_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/reverse"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let geocoder = geocoder_for(&server).await;
    let err = geocoder.reverse(LatLng::new(28.6, 77.2)).await.unwrap_err();
    assert!(matches!(err, GeocodeError::Malformed(_)));
}

#[tokio::test]
async fn test_search_parses_mixed_coordinates() {
    let server = MockServer::start().await;
    let body = r#"[
        {"display_name": "Indira Gandhi International Airport, Delhi, India",
         "lat": "28.5562", "lon": "77.1000",
         "address": {"aeroway": "IGI", "city": "New Delhi", "state": "Delhi"}},
        {"display_name": "Terminal 3, Delhi, India", "lat": 28.5550, "lon": 77.0844},
        {"display_name": "Broken entry", "lat": "n/a", "lon": "77.0"}
    ]"#;
    Mock::given(method("GET"))
        .and(path("/geo/search"))
        .and(query_param("q", "Delhi Airport"))
        .and(query_param("limit", "6"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(&server)
        .await;

    let geocoder = geocoder_for(&server).await;
    let places = geocoder.forward("Delhi Airport", 6).await.unwrap();

    assert_eq!(places.len(), 2);
    assert_eq!(places[0].coordinate, LatLng::new(28.5562, 77.1));
    assert_eq!(places[0].address.locality(), Some("New Delhi"));
    assert_eq!(places[1].display_name, "Terminal 3, Delhi, India");
    assert_eq!(places[1].coordinate, LatLng::new(28.555, 77.0844));
}

#[tokio::test]
async fn test_search_respects_limit() {
    let server = MockServer::start().await;
    let entries: Vec<String> = (0..5)
        .map(|i| format!(r#"{{"display_name":"Sector {i}, Noida","lat":"28.5{i}","lon":"77.3"}}"#))
        .collect();
    Mock::given(method("GET"))
        .and(path("/geo/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!("[{}]", entries.join(","))))
        .mount(&server)
        .await;

    let geocoder = geocoder_for(&server).await;
    let places = geocoder.forward("Noida sector", 3).await.unwrap();
    assert_eq!(places.len(), 3);
    assert_eq!(places[2].display_name, "Sector 2, Noida");
}

#[tokio::test]
async fn test_search_failure_yields_no_candidates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let geocoder = geocoder_for(&server).await;
    assert!(matches!(
        geocoder.forward("Delhi", 6).await,
        Err(GeocodeError::Status(500))
    ));

    let places = parcelmap::geocode::forward_search(&geocoder, "Delhi", 6).await;
    assert!(places.is_empty());
}

#[tokio::test]
async fn test_slow_gateway_times_out_as_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/reverse"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(REVERSE_BODY)
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let config = GeocodeConfig::default()
        .with_base_url(server.uri())
        .with_timeout(Duration::from_millis(200));
    let geocoder = GatewayGeocoder::new(&config).unwrap();
    let at = LatLng::new(28.6315, 77.2167);

    match geocoder.reverse(at).await {
        Err(GeocodeError::Transport(e)) => assert!(e.is_timeout(), "{e}"),
        other => panic!("expected a transport timeout, got {other:?}"),
    }

    let fields = parcelmap::geocode::reverse_lookup(&geocoder, at).await;
    assert!(fields.is_none());
}
