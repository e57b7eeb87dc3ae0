use anyhow::Result;
use bytes::Bytes;
use curl_render::{Body, Request, RequestInit, render, to_curl};
use futures_util::stream;
use serde_json::json;
use std::io;

#[tokio::main]
async fn main() -> Result<()> {
    let init = RequestInit::new()
        .method("patch")
        .header("Accept", "application/vnd.github+json")
        .header("Authorization", "Bearer abcd1234")
        .header("Accept-Encoding", "gzip")
        .body(json!({ "visibility": "private" }));
    println!(
        "{}",
        to_curl("https://api.github.com/user/email/visibility", Some(init)).await?
    );

    let body = Body::stream(stream::iter(vec![Ok::<_, io::Error>(Bytes::from_static(
        b"name=it's me",
    ))]));
    let mut rendered = render(
        "https://httpbin.org/post",
        Some(RequestInit::new().method("POST").body(body)),
    )
    .await?;
    println!("{rendered}");
    println!("body handed back: {:?}", rendered.take_body());

    let request = Request::new("https://ifconfig.me/").header("User-Agent", "curl-render");
    println!("{}", to_curl(request, None).await?);
    Ok(())
}
