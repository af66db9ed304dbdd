pub const LIVENESS_MESSAGE: &str = "GHL ChatGPT Auto-Responder is running!";

// GET / — used by the platform's health checks.
pub async fn liveness_handler() -> &'static str {
    LIVENESS_MESSAGE
}
