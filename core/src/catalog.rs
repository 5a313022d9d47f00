//! Catalog listing, image fetch and local search.
//!
//! # Design
//! `PetCatalogClient` holds only the catalog URL. Like the upload pipeline,
//! each network step is a `build_*` / `parse_*` pair, and the composite
//! `fetch_all` just runs the pair through an `HttpTransport`.

use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, HttpTransport};
use crate::types::PetRecord;

/// Stateless client for the pets listing endpoint.
#[derive(Debug, Clone)]
pub struct PetCatalogClient {
    pets_url: String,
}

impl PetCatalogClient {
    pub fn new(pets_url: &str) -> Self {
        Self {
            pets_url: pets_url.to_string(),
        }
    }

    pub fn build_fetch_all(&self) -> HttpRequest {
        let mut req = HttpRequest::get(self.pets_url.as_str());
        req.headers
            .push(("accept".to_string(), "application/json".to_string()));
        req
    }

    /// Decode the whole array or nothing. Server order is preserved.
    pub fn parse_fetch_all(&self, response: HttpResponse) -> Result<Vec<PetRecord>, ApiError> {
        if !response.is_success() {
            warn!(status = response.status, "catalog request failed");
            return Err(ApiError::Transport(format!(
                "HTTP {}: {}",
                response.status,
                response.body_text()
            )));
        }
        let pets: Vec<PetRecord> = serde_json::from_slice(&response.body).map_err(|e| {
            warn!(error = %e, "catalog body did not decode");
            ApiError::from(e)
        })?;
        info!(count = pets.len(), "catalog loaded");
        Ok(pets)
    }

    pub fn fetch_all<T: HttpTransport>(&self, transport: &T) -> Result<Vec<PetRecord>, ApiError> {
        debug!(url = %self.pets_url, "fetching catalog");
        let response = transport.execute(self.build_fetch_all())?;
        self.parse_fetch_all(response)
    }

    pub fn build_fetch_image(&self, image_url: &str) -> HttpRequest {
        HttpRequest::get(image_url)
    }

    pub fn parse_fetch_image(&self, response: HttpResponse) -> Result<Vec<u8>, ApiError> {
        if !response.is_success() {
            return Err(ApiError::Transport(format!("HTTP {}", response.status)));
        }
        if response.body.is_empty() {
            return Err(ApiError::Decode("empty image body".to_string()));
        }
        Ok(response.body)
    }

    /// Download the raw bytes behind a record's `image_url`.
    pub fn fetch_image<T: HttpTransport>(
        &self,
        transport: &T,
        pet: &PetRecord,
    ) -> Result<Vec<u8>, ApiError> {
        debug!(url = %pet.image_url, "fetching pet image");
        let response = transport.execute(self.build_fetch_image(&pet.image_url))?;
        self.parse_fetch_image(response)
    }
}

/// Case-insensitive match on title or description. A blank query keeps
/// everything; any other query is matched as typed, surrounding spaces
/// included.
pub fn filter_pets(pets: &[PetRecord], query: &str) -> Vec<PetRecord> {
    if query.trim().is_empty() {
        return pets.to_vec();
    }
    let needle = query.to_lowercase();
    pets.iter()
        .filter(|pet| {
            pet.title.to_lowercase().contains(&needle)
                || pet.description.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn client() -> PetCatalogClient {
        PetCatalogClient::new("http://localhost:3000/pets")
    }

    fn pet(title: &str, description: &str) -> PetRecord {
        PetRecord {
            title: title.to_string(),
            description: description.to_string(),
            image_url: format!("http://x/{title}.jpg"),
            created_at: "2024-01-01".to_string(),
        }
    }

    #[test]
    fn build_fetch_all_produces_get() {
        let req = client().build_fetch_all();
        assert_eq!(req.method, crate::http::HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/pets");
        assert!(req.body.is_none());
        assert_eq!(req.header("Accept"), Some("application/json"));
    }

    #[test]
    fn parse_fetch_all_single_record() {
        let body = r#"[{"title":"Rex","description":"Friendly dog","url":"http://x/rex.jpg","created":"2024-01-01"}]"#;
        let pets = client().parse_fetch_all(HttpResponse::new(200, body)).unwrap();
        assert_eq!(pets.len(), 1);
        assert_eq!(pets[0].title, "Rex");
        assert_eq!(pets[0].description, "Friendly dog");
        assert_eq!(pets[0].image_url, "http://x/rex.jpg");
        assert_eq!(pets[0].created_at, "2024-01-01");
    }

    #[test]
    fn parse_fetch_all_preserves_order() {
        let body = r#"[
            {"title":"B","description":"","url":"u","created":"c"},
            {"title":"A","description":"","url":"u","created":"c"},
            {"title":"C","description":"","url":"u","created":"c"}
        ]"#;
        let pets = client().parse_fetch_all(HttpResponse::new(200, body)).unwrap();
        let titles: Vec<&str> = pets.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["B", "A", "C"]);
    }

    #[test]
    fn parse_fetch_all_one_bad_record_fails_everything() {
        let body = r#"[
            {"title":"Ok","description":"","url":"u","created":"c"},
            {"title":"Broken","description":"","url":"u"}
        ]"#;
        let err = client().parse_fetch_all(HttpResponse::new(200, body)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn parse_fetch_all_bad_json() {
        let err = client()
            .parse_fetch_all(HttpResponse::new(200, "not json"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn parse_fetch_all_object_instead_of_array() {
        let err = client()
            .parse_fetch_all(HttpResponse::new(200, r#"{"title":"Rex"}"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn parse_fetch_all_server_error_is_transport() {
        let err = client()
            .parse_fetch_all(HttpResponse::new(503, "unavailable"))
            .unwrap_err();
        assert_eq!(err, ApiError::Transport("HTTP 503: unavailable".to_string()));
    }

    #[test]
    fn parse_fetch_image_rejects_empty_body() {
        let err = client()
            .parse_fetch_image(HttpResponse::new(200, Vec::new()))
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn parse_fetch_image_returns_bytes() {
        let bytes = client()
            .parse_fetch_image(HttpResponse::new(200, vec![0xff, 0xd8, 0xff]))
            .unwrap();
        assert_eq!(bytes, vec![0xff, 0xd8, 0xff]);
    }

    #[test]
    fn filter_blank_query_keeps_all() {
        let pets = vec![pet("Rex", "dog"), pet("Tom", "cat")];
        assert_eq!(filter_pets(&pets, ""), pets);
        assert_eq!(filter_pets(&pets, "   "), pets);
    }

    #[test]
    fn filter_matches_title_or_description_ignoring_case() {
        let pets = vec![
            pet("Rex", "Friendly dog"),
            pet("Tom", "Grumpy cat"),
            pet("Doge", "Meme"),
        ];
        let titles = |v: Vec<PetRecord>| v.into_iter().map(|p| p.title).collect::<Vec<_>>();
        assert_eq!(titles(filter_pets(&pets, "DOG")), ["Rex", "Doge"]);
        assert_eq!(titles(filter_pets(&pets, "cat")), ["Tom"]);
        assert!(filter_pets(&pets, "hamster").is_empty());
    }

    #[test]
    fn filter_does_not_trim_query() {
        let pets = vec![pet("Rex", "Friendly dog")];
        assert!(filter_pets(&pets, "dog ").is_empty());
        assert_eq!(filter_pets(&pets, "y d").len(), 1);
    }
}
