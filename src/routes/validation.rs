use crate::constants::MAX_PAGE_SIZE;

/// Turn 1-based page/limit query parameters into a (skip, take) window
///
/// Page defaults to 1, the limit to the endpoint's default page size,
/// and requested limits are clamped to `MAX_PAGE_SIZE`.
pub fn page_window(page: Option<u32>, limit: Option<u32>, default_limit: u32) -> (usize, usize) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_SIZE);
    ((page as usize - 1) * limit as usize, limit as usize)
}
