#[cfg(feature = "browser")]
pub mod browser;
pub mod cards;
pub mod client;
pub mod detail;
pub mod error;
pub mod extract;
pub mod html;
pub mod menu;
pub mod output;
pub mod render;
pub mod seeds;
pub mod traversal;

#[cfg(feature = "browser")]
pub use browser::ChromeLauncher;
pub use cards::{extract_cards, CardExtraction};
pub use client::PageFetcher;
pub use detail::{extract_detail, parse_detail};
pub use error::ScraperError;
pub use extract::{dedup_records, extract_site};
pub use menu::{collect_menu_urls, discover_category_urls, retain_leaf_categories};
pub use output::{raw_csv_path, write_products_csv};
pub use render::{Lookup, NoBrowser, RenderSession, SessionLauncher};
pub use seeds::{load_seeds, save_seeds, CategorySeeds};
pub use traversal::{enumerate_products, SeenUrls, SiteContext};
