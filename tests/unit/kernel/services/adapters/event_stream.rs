use super::*;

const SESSION_FRAME: &str = "data: {\"directory\":\"/work\",\"payload\":{\"type\":\"session.created\",\"properties\":{\"info\":{\"id\":\"ses_1\"}}}}\n\n";

#[test]
fn decodes_complete_frames() {
    let mut decoder = SseDecoder::default();
    let envelopes = decoder.feed(SESSION_FRAME.as_bytes());
    assert_eq!(envelopes.len(), 1);
    assert_eq!(envelopes[0].directory.as_deref(), Some("/work"));
    assert_eq!(envelopes[0].payload.kind, "session.created");
    assert!(decoder.is_empty_buffer());
}

#[test]
fn frames_split_across_chunks() {
    let mut decoder = SseDecoder::default();
    let bytes = SESSION_FRAME.as_bytes();
    let (head, tail) = bytes.split_at(25);
    assert!(decoder.feed(head).is_empty());
    assert!(!decoder.is_empty_buffer());
    assert_eq!(decoder.feed(tail).len(), 1);
}

#[test]
fn multibyte_text_split_mid_sequence() {
    let frame = "data: {\"payload\":{\"type\":\"todo.updated\",\"properties\":{\"title\":\"日本\"}}}\n\n";
    let bytes = frame.as_bytes();
    let cut = frame.find('日').unwrap() + 1;

    let mut decoder = SseDecoder::default();
    assert!(decoder.feed(&bytes[..cut]).is_empty());
    let envelopes = decoder.feed(&bytes[cut..]);
    assert_eq!(envelopes.len(), 1);
    assert_eq!(envelopes[0].payload.properties["title"], "日本");
    assert!(envelopes[0].is_global());
}

#[test]
fn crlf_heartbeats_and_garbage_are_skipped() {
    let mut decoder = SseDecoder::default();
    let input = format!(
        ": heartbeat\r\n\r\ndata: not json\r\n\r\n{}",
        SESSION_FRAME.replace('\n', "\r\n")
    );
    let envelopes = decoder.feed(input.as_bytes());
    assert_eq!(envelopes.len(), 1);
    assert_eq!(envelopes[0].payload.kind, "session.created");
}

#[test]
fn multi_line_data_is_joined() {
    let mut decoder = SseDecoder::default();
    let input = "event: message\ndata: {\"directory\":\"global\",\ndata: \"payload\":{\"type\":\"global.disposed\"}}\n\n";
    let envelopes = decoder.feed(input.as_bytes());
    assert_eq!(envelopes.len(), 1);
    assert!(envelopes[0].is_global());
}
