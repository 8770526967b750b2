//! Collect-then-notify combinator for fragment streams.

use crate::error::ChatError;
use crate::model::FragmentStream;
use futures_util::StreamExt;
use futures_util::stream;
use std::future::Future;

struct AggregateState<F> {
    fragments: FragmentStream,
    buffer: String,
    on_complete: Option<F>,
}

/// Pass fragments through unchanged and call `on_complete` once with their
/// concatenation after the source is exhausted.
///
/// A fragment error is forwarded and ends the stream without calling
/// `on_complete`. An error from `on_complete` is yielded as the last item.
pub fn aggregate_fragments<F, Fut>(fragments: FragmentStream, on_complete: F) -> FragmentStream
where
    F: FnOnce(String) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), ChatError>> + Send + 'static,
{
    let state = AggregateState {
        fragments,
        buffer: String::new(),
        on_complete: Some(on_complete),
    };
    Box::pin(stream::unfold(state, |mut state| async move {
        if state.on_complete.is_none() {
            return None;
        }
        match state.fragments.next().await {
            Some(Ok(fragment)) => {
                state.buffer.push_str(&fragment);
                Some((Ok(fragment), state))
            }
            Some(Err(err)) => {
                state.on_complete = None;
                Some((Err(err), state))
            }
            None => {
                let on_complete = state.on_complete.take()?;
                let text = std::mem::take(&mut state.buffer);
                match on_complete(text).await {
                    Ok(()) => None,
                    Err(err) => Some((Err(err), state)),
                }
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::aggregate_fragments;
    use crate::error::ChatError;
    use crate::model::FragmentStream;
    use futures_util::StreamExt;
    use futures_util::stream;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn fragments(items: Vec<Result<&'static str, ChatError>>) -> FragmentStream {
        Box::pin(stream::iter(
            items.into_iter().map(|item| item.map(str::to_string)),
        ))
    }

    #[tokio::test]
    async fn notifies_once_with_concatenated_text() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let stream = aggregate_fragments(
            fragments(vec![Ok("Hel"), Ok("lo"), Ok(" world")]),
            move |text| async move {
                sink.lock().push(text);
                Ok(())
            },
        );

        let passed: Vec<String> = stream
            .map(|item| item.expect("fragment"))
            .collect()
            .await;
        assert_eq!(passed, vec!["Hel", "lo", " world"]);
        assert_eq!(*seen.lock(), vec!["Hello world".to_string()]);
    }

    #[tokio::test]
    async fn does_not_notify_before_completion() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut stream = aggregate_fragments(
            fragments(vec![Ok("a"), Ok("b")]),
            move |text| async move {
                sink.lock().push(text);
                Ok(())
            },
        );

        assert_eq!(stream.next().await.expect("item").expect("ok"), "a");
        assert_eq!(stream.next().await.expect("item").expect("ok"), "b");
        assert!(seen.lock().is_empty());
        assert!(stream.next().await.is_none());
        assert_eq!(*seen.lock(), vec!["ab".to_string()]);
        assert!(stream.next().await.is_none());
        assert_eq!(seen.lock().len(), 1);
    }

    #[tokio::test]
    async fn fragment_error_skips_notification() {
        let seen = Arc::new(Mutex::new(0usize));
        let sink = seen.clone();
        let stream = aggregate_fragments(
            fragments(vec![
                Ok("partial"),
                Err(ChatError::Model("connection reset".to_string())),
                Ok("never"),
            ]),
            move |_text| async move {
                *sink.lock() += 1;
                Ok(())
            },
        );

        let items: Vec<Result<String, ChatError>> = stream.collect().await;
        assert_eq!(items.len(), 2);
        assert!(matches!(items[1], Err(ChatError::Model(_))));
        assert_eq!(*seen.lock(), 0);
    }

    #[tokio::test]
    async fn completion_error_is_the_last_item() {
        let stream = aggregate_fragments(fragments(vec![Ok("x")]), |_text| async {
            Err(ChatError::Model("persist failed".to_string()))
        });

        let items: Vec<Result<String, ChatError>> = stream.collect().await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_deref().expect("fragment"), "x");
        assert!(items[1].is_err());
    }
}
