use std::net::SocketAddr;

lazy_static::lazy_static! {
    pub static ref PROJECT_NAME: String = String::from("PortfolioTracker");
}

/// Listen address for the API server, port taken from `PORT` when set.
#[must_use]
pub fn bind_addr() -> SocketAddr {
    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);
    SocketAddr::from(([127, 0, 0, 1], port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_port() {
        // PORT is not set in the test environment
        if std::env::var("PORT").is_err() {
            assert_eq!(bind_addr().port(), 3000);
        }
    }
}
