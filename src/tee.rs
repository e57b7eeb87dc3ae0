use crate::body::ByteStream;
use bytes::Bytes;
use futures_util::{StreamExt, TryStreamExt};
use http_body::{Body as HttpBody, Frame};
use http_body_util::{BodyExt, StreamBody};
use shared_http_body::SharedBody;
use std::{io, sync::Arc};

/// Split `stream` into two streams that each yield every chunk of the source.
///
/// Both halves are clones of one [`SharedBody`], so either can be read first
/// and a pending read on one is woken when the other pulls the source forward.
pub fn tee(stream: ByteStream) -> (ByteStream, ByteStream) {
    // frames must be Clone to be shared, io::Error is not
    let body = StreamBody::new(stream.map(|chunk| chunk.map(Frame::data).map_err(Arc::new)));
    let shared = SharedBody::new(body);
    (into_stream(shared.clone()), into_stream(shared))
}

fn into_stream<B>(body: B) -> ByteStream
where
    B: HttpBody<Data = Bytes, Error = Arc<io::Error>> + Send + Sync + 'static,
{
    Box::pin(
        body.into_data_stream()
            .map_err(|e| io::Error::new(e.kind(), e)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use futures_util::{poll, stream};
    use std::time::Duration;
    use tokio::sync::oneshot;

    fn chunks(parts: &[&'static str]) -> ByteStream {
        Box::pin(stream::iter(
            parts
                .iter()
                .map(|p| Ok::<_, io::Error>(Bytes::from_static(p.as_bytes())))
                .collect::<Vec<_>>(),
        ))
    }

    async fn collect(branch: ByteStream) -> Result<Vec<Bytes>> {
        let items: Vec<io::Result<Bytes>> = branch.collect().await;
        Ok(items.into_iter().collect::<io::Result<Vec<_>>>()?)
    }

    #[tokio::test]
    async fn both_branches_should_see_every_chunk() -> Result<()> {
        let (a, b) = tee(chunks(&["he", "llo", " world"]));
        let first = collect(a).await?;
        let second = collect(b).await?;
        assert_eq!(first, second);
        assert_eq!(first.concat(), b"hello world");
        Ok(())
    }

    #[tokio::test]
    async fn branches_should_interleave() -> Result<()> {
        let (mut a, mut b) = tee(chunks(&["1", "2", "3"]));
        assert_eq!(a.next().await.transpose()?, Some(Bytes::from_static(b"1")));
        assert_eq!(b.next().await.transpose()?, Some(Bytes::from_static(b"1")));
        assert_eq!(b.next().await.transpose()?, Some(Bytes::from_static(b"2")));
        assert_eq!(a.next().await.transpose()?, Some(Bytes::from_static(b"2")));
        assert_eq!(a.next().await.transpose()?, Some(Bytes::from_static(b"3")));
        assert!(a.next().await.is_none());
        assert_eq!(b.next().await.transpose()?, Some(Bytes::from_static(b"3")));
        assert!(b.next().await.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn errors_should_reach_both_branches() {
        let source: ByteStream = Box::pin(stream::iter(vec![
            Ok(Bytes::from_static(b"ok")),
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "boom")),
        ]));
        let (mut a, mut b) = tee(source);
        for branch in [&mut a, &mut b] {
            assert!(matches!(branch.next().await, Some(Ok(ref chunk)) if chunk == "ok"));
            let err = branch.next().await.and_then(Result::err).expect("error item");
            assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
            assert_eq!(err.to_string(), "boom");
        }
    }

    #[tokio::test]
    async fn dropped_branch_should_not_block_sibling() -> Result<()> {
        let (a, b) = tee(chunks(&["x", "y"]));
        drop(b);
        assert_eq!(collect(a).await?.concat(), b"xy");
        Ok(())
    }

    #[tokio::test]
    async fn idle_branch_should_not_starve_waiting_sibling() -> Result<()> {
        // a oneshot receiver only remembers the last waker that polled it
        let (tx, rx) = oneshot::channel::<Bytes>();
        let source: ByteStream = Box::pin(stream::once(async move { rx.await.map_err(io::Error::other) }));
        let (mut a, mut b) = tee(source);

        let waiting = tokio::spawn(async move { a.next().await });
        tokio::task::yield_now().await;
        assert!(poll!(b.next()).is_pending());

        tx.send(Bytes::from_static(b"late"))
            .map_err(|_| anyhow::anyhow!("receiver dropped"))?;
        let item = tokio::time::timeout(Duration::from_secs(1), waiting).await??;
        assert_eq!(item.transpose()?, Some(Bytes::from_static(b"late")));
        assert_eq!(b.next().await.transpose()?, Some(Bytes::from_static(b"late")));
        Ok(())
    }
}
