use pmomediasource::{
    MediaKind, PlaylistClient, PlaylistProvider, RemotePlaylistProvider, DEFAULT_VIDEO_DURATION,
};
use std::io::Write;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LISTING: &str = r#"[
    {"url": "https://cdn.example.com/welcome.jpg", "type": "image", "durationInSeconds": 5},
    {"url": "https://cdn.example.com/spot.mp4", "type": "video"}
]"#;

fn write_fallback_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::with_suffix(".yaml").unwrap();
    writeln!(
        file,
        "- url: \"https://local.example.com/default.jpg\"\n  type: image"
    )
    .unwrap();
    file
}

#[tokio::test]
async fn test_remote_listing_is_mapped_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(LISTING, "application/json"),
        )
        .mount(&server)
        .await;

    let client = PlaylistClient::new(format!("{}/", server.uri())).unwrap();
    let provider = RemotePlaylistProvider::new(client);

    let playlist = provider.get_playlist().await.unwrap();
    assert_eq!(playlist.len(), 2);
    assert_eq!(playlist[0].source_uri(), "https://cdn.example.com/welcome.jpg");
    assert_eq!(playlist[0].kind(), MediaKind::Image);
    assert_eq!(playlist[0].duration(), Duration::from_secs(5));
    assert_eq!(playlist[1].kind(), MediaKind::Video);
    assert_eq!(playlist[1].duration(), DEFAULT_VIDEO_DURATION);
}

#[tokio::test]
async fn test_server_error_uses_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let fallback = write_fallback_file();
    let client = PlaylistClient::new(format!("{}/", server.uri())).unwrap();
    let provider = RemotePlaylistProvider::with_fallback(client, fallback.path());

    let playlist = provider.get_playlist().await.unwrap();
    assert_eq!(playlist.len(), 1);
    assert_eq!(
        playlist[0].source_uri(),
        "https://local.example.com/default.jpg"
    );
}

#[tokio::test]
async fn test_empty_listing_uses_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("[]", "application/json"))
        .mount(&server)
        .await;

    let fallback = write_fallback_file();
    let client = PlaylistClient::new(format!("{}/", server.uri())).unwrap();
    let provider = RemotePlaylistProvider::with_fallback(client, fallback.path());

    let playlist = provider.get_playlist().await.unwrap();
    assert_eq!(playlist.len(), 1);
}

#[tokio::test]
async fn test_unreachable_endpoint_uses_fallback() {
    // Port 9 (discard): connection refused immediately
    let client = PlaylistClient::builder("http://127.0.0.1:9/")
        .timeout(Duration::from_millis(500))
        .build()
        .unwrap();

    let fallback = write_fallback_file();
    let provider = RemotePlaylistProvider::with_fallback(client, fallback.path());

    let playlist = provider.get_playlist().await.unwrap();
    assert_eq!(playlist.len(), 1);
}

#[tokio::test]
async fn test_no_fallback_yields_empty_playlist() {
    let client = PlaylistClient::builder("http://127.0.0.1:9/")
        .timeout(Duration::from_millis(500))
        .build()
        .unwrap();
    let provider = RemotePlaylistProvider::new(client);

    let playlist = provider.get_playlist().await.unwrap();
    assert!(playlist.is_empty());
}
