//! Location and document handlers.

use async_trait::async_trait;
use rand::Rng;
use wagpt_core::{Context, Handler, HandlerResponse, Location, Message, Result, Session};

pub const NEARBY_PLACES: [&str; 5] = [
    "Coffee Shop (500m)",
    "Supermarket (1.2km)",
    "Park (800m)",
    "Restaurant (350m)",
    "Gas Station (1.5km)",
];

const PLACES_PER_REPLY: usize = 3;

/// Picks up to `count` distinct entries of [`NEARBY_PLACES`].
pub fn nearby_places<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<&'static str> {
    let mut pool = NEARBY_PLACES.to_vec();
    let mut picked = Vec::with_capacity(count);
    while picked.len() < count && !pool.is_empty() {
        let index = rng.gen_range(0..pool.len());
        picked.push(pool.remove(index));
    }
    picked
}

pub fn location_reply<R: Rng + ?Sized>(location: &Location, rng: &mut R) -> String {
    let name = location.name.as_deref().unwrap_or("this location");
    let places = nearby_places(rng, PLACES_PER_REPLY);
    format!(
        "Thank you for sharing your location at {} ({}, {}).\n\n*Nearby Places:*\n• {}\n\n\
         _Note: These are simulated nearby places for demonstration purposes._",
        name,
        location.latitude,
        location.longitude,
        places.join("\n• ")
    )
}

pub struct LocationHandler;

#[async_trait]
impl Handler for LocationHandler {
    async fn handle(&self, _ctx: &Context, message: &Message, _session: &mut Session) -> Result<HandlerResponse> {
        let Some(location) = message.location() else {
            return Ok(HandlerResponse::Stop);
        };
        let reply = location_reply(location, &mut rand::thread_rng());
        Ok(HandlerResponse::Reply(reply))
    }
}

pub fn document_reply(file_name: Option<&str>) -> String {
    format!(
        "I received your document: \"{}\"\n\n\
         _Note: This is a demonstration of document handling capabilities._",
        file_name.unwrap_or("unknown file")
    )
}

pub struct DocumentHandler;

#[async_trait]
impl Handler for DocumentHandler {
    async fn handle(&self, _ctx: &Context, message: &Message, _session: &mut Session) -> Result<HandlerResponse> {
        let Some(media) = message.media() else {
            return Ok(HandlerResponse::Stop);
        };
        Ok(HandlerResponse::Reply(document_reply(media.file_name.as_deref())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_nearby_places_are_distinct() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let places = nearby_places(&mut rng, 3);
            assert_eq!(places.len(), 3);
            let unique: HashSet<_> = places.iter().collect();
            assert_eq!(unique.len(), 3);
            assert!(places.iter().all(|p| NEARBY_PLACES.contains(p)));
        }
    }

    #[test]
    fn test_nearby_places_count_is_bounded_by_pool() {
        let places = nearby_places(&mut StdRng::seed_from_u64(1), 10);
        assert_eq!(places.len(), NEARBY_PLACES.len());
    }

    #[test]
    fn test_location_reply() {
        let location = Location {
            latitude: 55.7539,
            longitude: 37.6208,
            name: None,
            address: None,
        };
        let reply = location_reply(&location, &mut StdRng::seed_from_u64(9));

        assert!(reply.starts_with(
            "Thank you for sharing your location at this location (55.7539, 37.6208).\n\n*Nearby Places:*\n• "
        ));
        assert_eq!(reply.matches("\n• ").count(), 3);
        assert!(reply.ends_with("_Note: These are simulated nearby places for demonstration purposes._"));
    }

    #[test]
    fn test_document_reply() {
        assert_eq!(
            document_reply(Some("report.pdf")),
            "I received your document: \"report.pdf\"\n\n_Note: This is a demonstration of document handling capabilities._"
        );
        assert!(document_reply(None).contains("\"unknown file\""));
    }
}
