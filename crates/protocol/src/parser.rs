//! Frame payload parsing.
//!
//! Turns one candidate frame string into a typed [`JobEvent`], or
//! nothing. Malformed frames and unrecognized discriminators are
//! logged and dropped; they must never abort the job.

use cardforge_core::event::JobEvent;

/// Required line prefix for a push-mode frame.
pub const FRAME_PREFIX: &str = "data: ";

/// Parse one frame into an event, or drop it silently.
///
/// A frame is only considered if it starts with [`FRAME_PREFIX`] and
/// its stripped, trimmed payload is syntactically a JSON object. An
/// `error` frame parses into a normal [`JobEvent::Error`]; whether
/// that is terminal is the reducer's decision, not the parser's.
pub fn parse_frame(line: &str) -> Option<JobEvent> {
    let payload = line.strip_prefix(FRAME_PREFIX)?.trim();
    if !payload.starts_with('{') || !payload.ends_with('}') {
        return None;
    }

    match serde_json::from_str::<JobEvent>(payload) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::debug!(error = %e, frame = %payload, "Dropping unparseable frame");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn parses_a_well_formed_frame() {
        let ev = parse_frame(r#"data: {"type":"status","message":"rendering"}"#);
        assert_matches!(ev, Some(JobEvent::Status { message }) if message == "rendering");
    }

    #[test]
    fn requires_the_data_prefix() {
        assert!(parse_frame(r#"{"type":"status","message":"rendering"}"#).is_none());
        assert!(parse_frame(r#"event: {"type":"status","message":"x"}"#).is_none());
    }

    #[test]
    fn tolerates_whitespace_around_the_payload() {
        let ev = parse_frame("data:  {\"type\":\"quality_report\",\"score\":0.9} \r");
        assert_matches!(ev, Some(JobEvent::QualityReport { .. }));
    }

    #[test]
    fn drops_non_object_payloads() {
        assert!(parse_frame("data: hello").is_none());
        assert!(parse_frame("data: [1,2,3]").is_none());
        assert!(parse_frame("data: ").is_none());
    }

    #[test]
    fn drops_malformed_json() {
        assert!(parse_frame(r#"data: {"type":"status","message":"#).is_none());
        assert!(parse_frame("data: {not json}").is_none());
    }

    #[test]
    fn drops_unrecognized_discriminators() {
        assert!(parse_frame(r#"data: {"type":"heartbeat"}"#).is_none());
        assert!(parse_frame(r#"data: {"kind":"status","message":"x"}"#).is_none());
    }

    #[test]
    fn error_frames_parse_as_normal_events() {
        let ev = parse_frame(r#"data: {"type":"error","message":"generation failed"}"#);
        assert_matches!(
            ev,
            Some(JobEvent::Error {
                message,
                timed_out: false,
            }) if message == "generation failed"
        );
    }
}
