use super::pagination::{PageRequest, MAX_PAGE_LIMIT};

#[test]
fn test_page_request_default() {
    let request = PageRequest::default();
    assert_eq!(request.limit, 50);
    assert_eq!(request.offset, 0);
}

#[test]
fn test_clamped_keeps_valid_values() {
    let request = PageRequest {
        limit: 25,
        offset: 75,
    }
    .clamped();
    assert_eq!(request.limit, 25);
    assert_eq!(request.offset, 75);
}

#[test]
fn test_clamped_caps_limit() {
    let request = PageRequest {
        limit: 5000,
        offset: 0,
    }
    .clamped();
    assert_eq!(request.limit, MAX_PAGE_LIMIT);
}

#[test]
fn test_clamped_zero_limit_falls_back_to_default() {
    let request = PageRequest {
        limit: 0,
        offset: 10,
    }
    .clamped();
    assert_eq!(request.limit, 50);
    assert_eq!(request.offset, 10);
}
