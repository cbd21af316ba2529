//! Front-end page

use axum::{extract::State, response::Html};

use crate::AppState;

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// Upload / manual-entry page; confidence bands come from config
pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_index(state.config.confidence_low, state.config.confidence_medium))
}

fn render_index(low: f64, medium: f64) -> String {
    INDEX_HTML
        .replace("{{CONFIDENCE_LOW}}", &low.to_string())
        .replace("{{CONFIDENCE_MEDIUM}}", &medium.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds_injected() {
        let page = render_index(0.5, 0.8);
        assert!(page.contains("low: 0.5, medium: 0.8"));
        assert!(!page.contains("{{"));
    }

    #[test]
    fn test_page_posts_to_both_endpoints() {
        let page = render_index(0.6, 0.85);
        assert!(page.contains("'predict_csv'"));
        assert!(page.contains("'predict'"));
        assert!(page.contains("Destination_Port"));
    }
}
