/**************************************************************************
  Copyright 2026 Francesco Versaci (https://github.com/fversaci/)

  Licensed under the Apache License, Version 2.0 (the "License");
  you may not use this file except in compliance with the License.
  You may obtain a copy of the License at

      http://www.apache.org/licenses/LICENSE-2.0

  Unless required by applicable law or agreed to in writing, software
  distributed under the License is distributed on an "AS IS" BASIS,
  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
  See the License for the specific language governing permissions and
  limitations under the License.
**************************************************************************/
use crate::error::{Result, TilerError};
use image::DynamicImage;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;

fn is_image_type(content_type: &str) -> bool {
    content_type
        .trim_start()
        .to_ascii_lowercase()
        .starts_with("image/")
}

/// Accepts only 2xx responses carrying an `image/*` content type.
pub fn check_image_response(url: &str, status: StatusCode, content_type: Option<&str>) -> Result<()> {
    if status.is_success() && content_type.is_some_and(is_image_type) {
        return Ok(());
    }
    Err(TilerError::InvalidImage {
        url: url.to_string(),
        status,
        content_type: content_type.map(str::to_string),
    })
}

/// Downloads and decodes the image at `url`.
pub async fn fetch_image(http: &reqwest::Client, url: &str) -> Result<DynamicImage> {
    log::debug!("Downloading {url}");
    let response = http.get(url).send().await?;
    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|header| header.to_str().ok())
        .map(str::to_string);
    check_image_response(url, status, content_type.as_deref())?;
    let bytes = response.bytes().await?;
    log::debug!("Downloaded {} bytes", bytes.len());
    Ok(image::load_from_memory(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves a single canned HTTP response and returns its URL.
    async fn serve_once(status_line: &str, content_type: &str, body: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let head = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut req = Vec::new();
            let mut buf = [0u8; 1024];
            while !req.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = sock.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                req.extend_from_slice(&buf[..n]);
            }
            sock.write_all(head.as_bytes()).await.unwrap();
            sock.write_all(&body).await.unwrap();
            sock.shutdown().await.unwrap();
        });
        format!("http://{addr}/tile.png")
    }

    fn http() -> reqwest::Client {
        reqwest::Client::builder().no_proxy().build().unwrap()
    }

    fn png_bytes() -> Vec<u8> {
        let img = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255]));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn accepts_only_images() {
        let url = "http://localhost/a.png";
        assert!(check_image_response(url, StatusCode::OK, Some("image/png")).is_ok());
        assert!(check_image_response(url, StatusCode::OK, Some("Image/PNG")).is_ok());
        assert!(check_image_response(url, StatusCode::OK, Some("text/html")).is_err());
        assert!(check_image_response(url, StatusCode::OK, None).is_err());
        assert!(check_image_response(url, StatusCode::NOT_FOUND, Some("image/png")).is_err());
    }

    #[tokio::test]
    async fn downloads_png() {
        let url = serve_once("200 OK", "image/png", png_bytes()).await;
        let img = fetch_image(&http(), &url).await.unwrap();
        assert_eq!((img.width(), img.height()), (4, 4));
        assert_eq!(img.to_rgba8().get_pixel(0, 0), &Rgba([10, 20, 30, 255]));
    }

    #[tokio::test]
    async fn not_found_is_invalid_image() {
        let url = serve_once("404 Not Found", "text/plain", b"gone".to_vec()).await;
        let err = fetch_image(&http(), &url).await.unwrap_err();
        match err {
            TilerError::InvalidImage { status, .. } => assert_eq!(status, StatusCode::NOT_FOUND),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn html_is_invalid_image() {
        let url = serve_once("200 OK", "text/html", b"<html></html>".to_vec()).await;
        let err = fetch_image(&http(), &url).await.unwrap_err();
        assert!(matches!(err, TilerError::InvalidImage { .. }));
        assert!(!err.is_transient());
    }
}
