//! End-to-end crawl tests against a local `wiremock` storefront.
//!
//! Cover menu discovery, next-link pagination with detail pages, and the
//! partial-result behavior when pages or products are refused.

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use webetl_core::sites::parse_sites;
use webetl_core::{SiteConfig, UnitPrice};
use webetl_scraper::{
    discover_category_urls, extract_site, raw_csv_path, write_products_csv, NoBrowser,
    PageFetcher, SiteContext,
};

fn test_fetcher() -> PageFetcher {
    PageFetcher::new(5, "webetl-test/0.1").expect("failed to build test PageFetcher")
}

fn bakery(base: &str) -> SiteConfig {
    let yaml = format!(
        r#"
websites:
  bakery:
    website_path: "{base}/"
    loading_type: pagination
    menu:
      tag_name: ul
      menu_selector: "^menu$"
      filter_keyword: "-c/"
    product_tag: li
    product_selector: "^product$"
    skip_url_patterns: ["/gift-card"]
    pagination:
      next_selector: "a.next"
      max_pages: 5
    product_detail_selectors:
      name: "h1.title"
      unit_price: "p.price"
      original_category: "span.posted_in"
"#
    );
    parse_sites(&yaml)
        .expect("valid site yaml")
        .websites
        .remove("bakery")
        .expect("bakery site")
}

fn card(slug: &str) -> String {
    format!(r#"<li class="product"><a href="/p/{slug}/">{slug}</a></li>"#)
}

fn detail(name: &str, price: &str) -> String {
    format!(
        r#"<h1 class="title">{name}</h1><p class="price">{price}</p>
           <span class="posted_in"><a href="/cakes-c/">Cakes</a></span>"#
    )
}

async fn mount_page(server: &MockServer, route: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

// ---------------------------------------------------------------------------
// Menu discovery
// ---------------------------------------------------------------------------

#[tokio::test]
async fn menu_discovery_returns_leaf_categories() {
    let server = MockServer::start().await;
    let menu = r##"
        <ul class="menu">
          <li><a href="/cakes-c/">Cakes</a></li>
          <li><a href="/cakes-c/mousse-c/">Mousse</a></li>
          <li><a href="#" data-url="/buns-c/">Buns</a></li>
          <li><a href="/contact/">Contact</a></li>
        </ul>"##;
    mount_page(&server, "/", 200, menu).await;

    let site = bakery(&server.uri());
    let urls = discover_category_urls(&test_fetcher(), "bakery", &site).await;

    assert_eq!(
        urls,
        vec![
            format!("{}/cakes-c/mousse-c/", server.uri()),
            format!("{}/buns-c/", server.uri()),
        ]
    );
}

#[tokio::test]
async fn forbidden_menu_page_yields_no_categories() {
    let server = MockServer::start().await;
    mount_page(&server, "/", 403, "denied").await;

    let site = bakery(&server.uri());
    let urls = discover_category_urls(&test_fetcher(), "bakery", &site).await;
    assert!(urls.is_empty());
}

// ---------------------------------------------------------------------------
// Pagination traversal
// ---------------------------------------------------------------------------

#[tokio::test]
async fn paginated_category_follows_next_links_in_order() {
    let server = MockServer::start().await;
    let page_one = format!(
        r#"<ul>{}{}{}</ul><a class="next" href="?page=2">Next</a>"#,
        card("opera"),
        card("gift-card"),
        card("flan"),
    );
    let page_two = format!(
        r#"<ul>{}{}</ul><a class="next" href="?page=2">Next</a>"#,
        card("flan"),
        card("tiramisu"),
    );
    Mock::given(method("GET"))
        .and(path("/cakes-c/"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page_two))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/cakes-c/", 200, &page_one).await;
    mount_page(&server, "/p/opera/", 200, &detail("Opera", "450.000 ₫")).await;
    mount_page(&server, "/p/flan/", 200, &detail("Flan", "35.000 ₫")).await;
    mount_page(&server, "/p/tiramisu/", 200, &detail("Tiramisu", "55.000 ₫")).await;

    let site = bakery(&server.uri());
    let fetcher = test_fetcher();
    let ctx = SiteContext {
        name: "bakery",
        site: &site,
        fetcher: &fetcher,
        user_agent: "ua",
    };
    let products = extract_site(&ctx, &NoBrowser, &[format!("{}/cakes-c/", server.uri())]).await;

    let names: Vec<&str> = products.iter().map(|p| p.product_name.as_str()).collect();
    assert_eq!(names, vec!["Opera", "Flan", "Tiramisu"]);
    assert_eq!(products[0].product_unit_price, UnitPrice::Flat(450_000));
    assert_eq!(products[0].original_category, vec!["Cakes"]);
    assert_eq!(products[0].website_name, "bakery");
}

#[tokio::test]
async fn forbidden_product_is_dropped_and_others_kept() {
    let server = MockServer::start().await;
    let listing = format!("<ul>{}{}</ul>", card("opera"), card("flan"));
    mount_page(&server, "/cakes-c/", 200, &listing).await;
    mount_page(&server, "/p/opera/", 403, "denied").await;
    mount_page(&server, "/p/flan/", 200, &detail("Flan", "35.000")).await;

    let site = bakery(&server.uri());
    let fetcher = test_fetcher();
    let ctx = SiteContext {
        name: "bakery",
        site: &site,
        fetcher: &fetcher,
        user_agent: "ua",
    };
    let products = extract_site(&ctx, &NoBrowser, &[format!("{}/cakes-c/", server.uri())]).await;

    assert_eq!(products.len(), 1);
    assert_eq!(products[0].product_name, "Flan");
}

#[tokio::test]
async fn failed_second_page_keeps_first_page_products() {
    let server = MockServer::start().await;
    let page_one = format!(
        r#"<ul>{}</ul><a class="next" href="?page=2">Next</a>"#,
        card("opera")
    );
    Mock::given(method("GET"))
        .and(path("/cakes-c/"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_page(&server, "/cakes-c/", 200, &page_one).await;
    mount_page(&server, "/p/opera/", 200, &detail("Opera", "450.000")).await;

    let site = bakery(&server.uri());
    let fetcher = test_fetcher();
    let ctx = SiteContext {
        name: "bakery",
        site: &site,
        fetcher: &fetcher,
        user_agent: "ua",
    };
    let products = extract_site(&ctx, &NoBrowser, &[format!("{}/cakes-c/", server.uri())]).await;

    assert_eq!(products.len(), 1);
    assert_eq!(products[0].product_name, "Opera");
}

#[tokio::test]
async fn unreachable_category_does_not_stop_the_site() {
    let server = MockServer::start().await;
    mount_page(&server, "/gone-c/", 404, "").await;
    mount_page(&server, "/cakes-c/", 200, &format!("<ul>{}</ul>", card("flan"))).await;
    mount_page(&server, "/p/flan/", 200, &detail("Flan", "35.000")).await;

    let site = bakery(&server.uri());
    let fetcher = test_fetcher();
    let ctx = SiteContext {
        name: "bakery",
        site: &site,
        fetcher: &fetcher,
        user_agent: "ua",
    };
    let categories = [
        format!("{}/gone-c/", server.uri()),
        format!("{}/cakes-c/", server.uri()),
    ];
    let products = extract_site(&ctx, &NoBrowser, &categories).await;

    assert_eq!(products.len(), 1);

    let dir = tempfile::tempdir().expect("tempdir");
    let out = raw_csv_path(dir.path(), "bakery");
    write_products_csv(&out, &products).expect("raw csv written");
    let raw = std::fs::read_to_string(&out).expect("raw csv readable");
    assert_eq!(raw.lines().count(), 2);
}
