//! Level-start advice line
//!
//! Fetches a one-line tip from the backing server when a level begins and
//! drops it into the HUD. The fetch is fire-and-forget: any failure (no
//! server, bad status, empty body) falls back to a canned tip, and a stale
//! response simply overwrites the fallback text.

/// Canned tips used whenever the server can't be reached
pub const FALLBACK_ADVICE: &[&str] = &[
    "Your first probe is always safe. Open big, then read the numbers.",
    "A number counts mines in all eight neighbors, corners included.",
    "Flag shots cost a probe too. Spend them where the numbers demand it.",
    "Short pulls drop short. The preview dots show the whole arc.",
    "Zeros cascade. Hunt for open ground before picking at the edges.",
];

/// Context sent with an advice request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdviceQuery {
    pub level: u32,
    pub grid_size: usize,
    pub mines_left: i32,
}

impl AdviceQuery {
    pub fn url(&self) -> String {
        format!(
            "/api/advice?level={}&size={}&mines={}",
            self.level, self.grid_size, self.mines_left
        )
    }

    /// Deterministic canned tip for this query
    pub fn fallback(&self) -> &'static str {
        let index = (self.level as usize).wrapping_add(self.grid_size) % FALLBACK_ADVICE.len();
        FALLBACK_ADVICE[index]
    }
}

/// Kick off an advice fetch and write the result into the element with the
/// given id (WASM only)
#[cfg(target_arch = "wasm32")]
pub fn fetch_advice(query: AdviceQuery, element_id: &str) {
    use wasm_bindgen_futures::spawn_local;

    let element_id = element_id.to_string();
    set_advice_text(&element_id, query.fallback());

    spawn_local(async move {
        match request_advice(&query).await {
            Some(text) => set_advice_text(&element_id, &text),
            None => log::debug!("advice fetch failed, keeping fallback"),
        }
    });
}

#[cfg(target_arch = "wasm32")]
fn set_advice_text(element_id: &str, text: &str) {
    let element = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(element_id));
    if let Some(element) = element {
        element.set_text_content(Some(text));
    }
}

#[cfg(target_arch = "wasm32")]
async fn request_advice(query: &AdviceQuery) -> Option<String> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    let window = web_sys::window()?;
    let response = JsFuture::from(window.fetch_with_str(&query.url()))
        .await
        .ok()?;
    let response: web_sys::Response = response.dyn_into().ok()?;
    if !response.ok() {
        log::debug!("advice server returned {}", response.status());
        return None;
    }

    let text = JsFuture::from(response.text().ok()?).await.ok()?;
    text.as_string()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Native builds have no server; hand back the canned tip directly
#[cfg(not(target_arch = "wasm32"))]
pub fn fetch_advice(query: AdviceQuery, _element_id: &str) {
    log::info!("advice: {}", query.fallback());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_url() {
        let query = AdviceQuery {
            level: 3,
            grid_size: 15,
            mines_left: 27,
        };
        assert_eq!(query.url(), "/api/advice?level=3&size=15&mines=27");
    }

    #[test]
    fn test_url_handles_negative_mines_left() {
        // Over-flagging drives mines_left below zero
        let query = AdviceQuery {
            level: 1,
            grid_size: 5,
            mines_left: -2,
        };
        assert_eq!(query.url(), "/api/advice?level=1&size=5&mines=-2");
    }

    #[test]
    fn test_fallback_is_deterministic_and_in_range() {
        let query = AdviceQuery {
            level: 7,
            grid_size: 30,
            mines_left: 100,
        };
        assert_eq!(query.fallback(), query.fallback());
        assert!(FALLBACK_ADVICE.contains(&query.fallback()));
    }
}
