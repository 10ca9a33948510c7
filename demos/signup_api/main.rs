//! Signup API Example
//!
//! Shows both ways of declaring form filters:
//! - In code, through a `FormFilters` implementation
//! - From a YAML document loaded into a `FiltersConfig`
//!
//! Try it:
//!
//! ```bash
//! curl -X POST localhost:3000/signup \
//!   -H 'content-type: application/json' \
//!   -d '{"email": "  Ann@Example.COM ", "tags": [" Rust ", " Axum "], "age": "42 years"}'
//!
//! curl 'localhost:3000/search?q=%20%3Cb%3Erust%3C/b%3E%20&page=2'
//! ```

use anyhow::Result;
use axum::routing::get;
use std::sync::OnceLock;
use this_filters::prelude::*;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

const FILTERS_YAML: &str = r#"
forms:
  search:
    q: [StringTrim, StripTags, StringToLower]
    page: ToInt
"#;

struct SignupForm;

impl FormFilters for SignupForm {
    fn filters() -> Arc<FieldFilters> {
        static FILTERS: OnceLock<Arc<FieldFilters>> = OnceLock::new();
        FILTERS
            .get_or_init(|| {
                Arc::new(
                    FieldFilters::new()
                        .field("email", FilterSpec::chain(["StringTrim", "StringToLower"]))
                        .field("tags", FilterSpec::chain(["StringTrim", "StringToLower"]))
                        .field("age", "ToInt"),
                )
            })
            .clone()
    }
}

struct SearchForm;

impl FormFilters for SearchForm {
    fn filters() -> Arc<FieldFilters> {
        static FILTERS: OnceLock<Arc<FieldFilters>> = OnceLock::new();
        FILTERS
            .get_or_init(|| match FiltersConfig::from_yaml_str(FILTERS_YAML) {
                Ok(config) => config.shared_form("search"),
                Err(e) => {
                    tracing::error!("invalid search filters: {}", e);
                    Arc::new(FieldFilters::new())
                }
            })
            .clone()
    }
}

async fn signup(form: Filtered<SignupForm>) -> Result<Json<Value>, SanitizeError> {
    let email = form.input(Some("email"), None)?;
    let tags = form.input(Some("tags"), Some(json!([])))?;
    let age = form.input(Some("age"), None)?;

    Ok(Json(json!({
        "email": email,
        "tags": tags,
        "age": age,
    })))
}

async fn search(Sanitized(query, ..): Sanitized<SearchForm>) -> Json<Value> {
    Json(Value::Object(query))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,this_filters=debug")),
        )
        .init();

    let app = Router::new()
        .route("/signup", post(signup))
        .route("/search", get(search))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;

    println!("🌐 Server running on http://127.0.0.1:3000");
    println!("    POST   /signup   - email, tags and age are filtered");
    println!("    GET    /search   - q and page are filtered (YAML config)");

    axum::serve(listener, app).await?;

    Ok(())
}
