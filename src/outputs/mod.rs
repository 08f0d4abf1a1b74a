//! Everything that lands on disk.
//!
//! # Submodules
//!
//! - [`json`]: atomic JSON writes and reads of previously written documents
//! - [`sitemap`]: `sitemap.xml` and `robots.txt` for the public site
//! - [`digest`]: the weekly safety digest in Markdown
//! - [`posts`]: dated blog posts and the content-update summary
//!
//! # Output Structure
//!
//! ```text
//! data/
//! ├── alerts.json          # { items, summary }
//! ├── recalls.json         # { items, summary }
//! ├── openfda_food.json    # raw openFDA results
//! └── air-quality.json     # { summary, cities }
//!
//! public/
//! ├── sitemap.xml
//! └── robots.txt
//!
//! content/
//! ├── weekly-digest.md
//! ├── content-update-summary.json
//! └── blog/
//!     ├── weather-alerts-YYYY-MM-DD.md
//!     ├── air-quality-report-YYYY-MM-DD.md
//!     └── recalls-roundup-YYYY-MM-DD.md
//! ```

pub mod digest;
pub mod json;
pub mod posts;
pub mod sitemap;
