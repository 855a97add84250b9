//! Integration tests for navigation: collections fetched over HTTP, then a
//! walk through fragments with back/forward history, resolving each one.

use pretty_assertions::assert_eq;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use retroflix::content::{load_collections, Collections};
use retroflix::listing::PageType;
use retroflix::net::{build_client, HttpFetcher};
use retroflix::router::{detail_fragment, nav_highlight, resolve, Location, RouteView};

const TV: &str = r#"[
    {"id": 1, "name": "Star Plus", "category": "Entertainment", "link": "https://starplus.example"},
    {"id": "news/24", "name": "News 24", "category": "News"}
]"#;

const OTT: &str = r#"[
    {"id": "nf", "name": "Netflix", "category": "Streaming", "link": "https://netflix.example"}
]"#;

async fn collections_from_server() -> Collections {
    let server = MockServer::start().await;
    for (doc, body) in [("/tv.json", TV), ("/ott.json", OTT)] {
        Mock::given(method("GET"))
            .and(path(doc))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
            .mount(&server)
            .await;
    }

    let client = build_client(Duration::from_secs(2)).unwrap();
    let fetcher = HttpFetcher::new(client, Duration::from_secs(2));
    let base = Url::parse(&format!("{}/", server.uri())).unwrap();
    load_collections(&fetcher, &base).await.unwrap()
}

fn view_at(location: &Location, collections: &Collections) -> RouteView {
    resolve(&location.route(), collections)
}

#[tokio::test]
async fn test_browse_select_and_go_back() {
    let collections = collections_from_server().await;
    let mut location = Location::new("#live-tv");

    assert_eq!(
        view_at(&location, &collections),
        RouteView::Listing(PageType::LiveTv)
    );

    // Numeric ids arrive as strings and route like any other
    let star = collections.tv[0].clone();
    assert_eq!(star.id, "1");
    let change = location
        .navigate_to(&detail_fragment(PageType::LiveTv, &star))
        .unwrap();
    assert_eq!(change.fragment, "#live-tv/1");
    match view_at(&location, &collections) {
        RouteView::Detail { item, page } => {
            assert_eq!(item.name, "Star Plus");
            assert_eq!(page, PageType::LiveTv);
        }
        other => panic!("expected detail, got {other:?}"),
    }
    assert_eq!(nav_highlight(&location.route()), Some("live-tv"));

    location.back().unwrap();
    assert_eq!(location.fragment(), "#live-tv");
    location.forward().unwrap();
    assert_eq!(location.fragment(), "#live-tv/1");
}

#[tokio::test]
async fn test_ids_with_slashes_and_unknown_items() {
    let collections = collections_from_server().await;
    let mut location = Location::new("#ott");

    location.navigate_to("#live-tv/news/24").unwrap();
    assert!(matches!(
        view_at(&location, &collections),
        RouteView::Detail { ref item, .. } if item.name == "News 24"
    ));

    location.navigate_to("#ott/missing").unwrap();
    assert_eq!(view_at(&location, &collections), RouteView::NotFound);

    // An id on a page without a collection looks in the OTT list
    location.navigate_to("#partners/nf").unwrap();
    assert!(matches!(
        view_at(&location, &collections),
        RouteView::Detail { page: PageType::Ott, .. }
    ));
    assert_eq!(nav_highlight(&location.route()), None);
}

#[tokio::test]
async fn test_non_page_fragments() {
    let collections = collections_from_server().await;
    let mut location = Location::new("#about");

    assert_eq!(view_at(&location, &collections), RouteView::About);

    location.navigate_to("notifications").unwrap();
    assert_eq!(location.fragment(), "#notifications");
    assert_eq!(view_at(&location, &collections), RouteView::Keep);

    location.navigate_to("#whatever").unwrap();
    assert_eq!(
        view_at(&location, &collections),
        RouteView::Listing(PageType::LiveTv)
    );

    // Re-navigating to the current fragment is not a change
    assert!(location.navigate_to("#whatever").is_none());
    assert!(location.can_go_back());
}
