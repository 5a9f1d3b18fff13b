//! Continuation-token pagination.

use std::future::Future;

use crate::error::RegistryError;
use crate::model::Page;

/// Fetches every page of a listing and returns the items in page order.
///
/// `fetch` is called with `None` for the first page and with the previous
/// page's continuation token afterwards. Pagination ends at the first page
/// whose token is absent or empty. An error on any page is returned as-is
/// and the items accumulated so far are discarded.
///
/// # Errors
///
/// Returns the first error produced by `fetch`.
///
/// # Examples
///
/// ```
/// use retention_registry::{collect_pages, Page, RegistryError};
///
/// # tokio_test_block(async {
/// let items = collect_pages(|token: Option<String>| async move {
///     Ok::<_, RegistryError>(match token.as_deref() {
///         None => Page::new(vec![1, 2], Some("next".to_string())),
///         Some(_) => Page::new(vec![3], None),
///     })
/// })
/// .await
/// .unwrap();
/// assert_eq!(items, vec![1, 2, 3]);
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
pub async fn collect_pages<T, F, Fut>(mut fetch: F) -> Result<Vec<T>, RegistryError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, RegistryError>>,
{
    let mut items = Vec::new();
    let mut token: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = fetch(token.take()).await?;
        pages += 1;
        let next = page.next_token().map(ToString::to_string);
        items.extend(page.items);

        match next {
            Some(next) => token = Some(next),
            None => break,
        }
    }

    tracing::debug!(pages, items = items.len(), "Collected paginated listing");
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[tokio::test]
    async fn test_chained_pages_collected_in_order() {
        let seen = Mutex::new(Vec::new());
        let items = collect_pages(|token: Option<String>| {
            seen.lock().unwrap().push(token.clone());
            async move {
                Ok(match token.as_deref() {
                    None => Page::new(vec!["a1", "a2"], Some("t1".to_string())),
                    Some("t1") => Page::new(vec!["b1", "b2"], Some("t2".to_string())),
                    Some("t2") => Page::new(vec!["c1", "c2"], Some(String::new())),
                    Some(other) => panic!("unexpected token {other}"),
                })
            }
        })
        .await
        .unwrap();

        assert_eq!(items, vec!["a1", "a2", "b1", "b2", "c1", "c2"]);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![None, Some("t1".to_string()), Some("t2".to_string())]
        );
    }

    #[tokio::test]
    async fn test_single_page_without_token() {
        let items = collect_pages(|_| async { Ok(Page::new(vec![1, 2, 3], None)) })
            .await
            .unwrap();
        assert_eq!(items, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_empty_listing() {
        let items: Vec<u8> = collect_pages(|_| async { Ok(Page::new(Vec::new(), None)) })
            .await
            .unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_error_on_later_page_discards_everything() {
        let result: Result<Vec<u8>, _> = collect_pages(|token: Option<String>| async move {
            match token {
                None => Ok(Page::new(vec![1, 2], Some("t1".to_string()))),
                Some(_) => Err(RegistryError::http(500, "boom")),
            }
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn test_empty_intermediate_page_keeps_following_token() {
        let items = collect_pages(|token: Option<String>| async move {
            Ok(match token.as_deref() {
                None => Page::new(Vec::new(), Some("t1".to_string())),
                _ => Page::new(vec![7], None),
            })
        })
        .await
        .unwrap();
        assert_eq!(items, vec![7]);
    }
}
