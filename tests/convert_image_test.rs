//! Tests for POST /convert-image/.

mod common;

use axum::http::StatusCode;
use common::fixtures::{dimensions, photo_like_png, solid_png};
use common::{MultipartBody, TestApp};

#[tokio::test]
async fn test_red_png_to_webp() {
    let app = TestApp::new();
    let form = MultipartBody::new()
        .file("red.png", "image/png", &solid_png(16, 16, [255, 0, 0, 255]))
        .text("format", "webp");

    let response = app.post_form("/convert-image/", form).await;

    common::assert_ok(&response);
    assert_eq!(response.header("content-type"), Some("image/webp"));
    assert_eq!(
        response.header("content-disposition"),
        Some("attachment; filename=converted.webp")
    );
    assert_eq!(
        image::guess_format(&response.body).unwrap(),
        image::ImageFormat::WebP
    );
    assert_eq!(dimensions(&response.body), (16, 16));

    let decoded = image::load_from_memory(&response.body).unwrap().to_rgb8();
    assert_eq!(decoded.get_pixel(8, 8).0, [255, 0, 0]);
}

#[tokio::test]
async fn test_unknown_format_rejected_without_image() {
    let app = TestApp::new();
    let form = MultipartBody::new()
        .file("red.png", "image/png", &solid_png(4, 4, [255, 0, 0, 255]))
        .text("format", "xyz");

    let response = app.post_form("/convert-image/", form).await;

    let message = common::assert_json_error(&response, StatusCode::BAD_REQUEST);
    assert_eq!(message, "Unsupported format: xyz");
    assert!(image::guess_format(&response.body).is_err());
    assert!(response.header("content-disposition").is_none());
}

#[tokio::test]
async fn test_unknown_format_checked_before_decoding() {
    let app = TestApp::new();
    // Not an image at all; the format error still wins
    let form = MultipartBody::new()
        .file("junk.png", "image/png", b"junk")
        .text("format", "xyz");

    let response = app.post_form("/convert-image/", form).await;

    let message = common::assert_json_error(&response, StatusCode::BAD_REQUEST);
    assert_eq!(message, "Unsupported format: xyz");
}

#[tokio::test]
async fn test_missing_format_rejected() {
    let app = TestApp::new();
    let form = MultipartBody::new().file("a.png", "image/png", &solid_png(4, 4, [0, 0, 0, 255]));

    let response = app.post_form("/convert-image/", form).await;

    let message = common::assert_json_error(&response, StatusCode::BAD_REQUEST);
    assert_eq!(message, "Missing required field: format");
}

#[tokio::test]
async fn test_every_format_preserves_dimensions() {
    let app = TestApp::new();
    let source = photo_like_png(20, 10, 9);

    let cases = [
        ("jpeg", "image/jpeg", "converted.jpg"),
        ("jpg", "image/jpeg", "converted.jpg"),
        ("png", "image/png", "converted.png"),
        ("gif", "image/gif", "converted.gif"),
        ("webp", "image/webp", "converted.webp"),
        ("bmp", "image/bmp", "converted.bmp"),
        ("tiff", "image/tiff", "converted.tiff"),
        ("TIF", "image/tiff", "converted.tiff"),
    ];

    for (format, media_type, filename) in cases {
        let form = MultipartBody::new()
            .file("source.png", "image/png", &source)
            .text("format", format);
        let response = app.post_form("/convert-image/", form).await;

        common::assert_ok(&response);
        assert_eq!(response.header("content-type"), Some(media_type), "{format}");
        assert_eq!(
            response.header("content-disposition"),
            Some(format!("attachment; filename={filename}").as_str()),
            "{format}"
        );
        assert_eq!(dimensions(&response.body), (20, 10), "{format}");
    }
}

#[tokio::test]
async fn test_jpeg_input_converts_to_png() {
    let app = TestApp::new();
    let jpeg = {
        let form = MultipartBody::new()
            .file("a.png", "image/png", &photo_like_png(24, 24, 10))
            .text("format", "jpeg");
        app.post_form("/convert-image/", form).await.body
    };

    let form = MultipartBody::new()
        .file("a.jpg", "image/jpeg", &jpeg)
        .text("format", "png");
    let response = app.post_form("/convert-image/", form).await;

    common::assert_ok(&response);
    assert_eq!(
        image::guess_format(&response.body).unwrap(),
        image::ImageFormat::Png
    );
}

#[tokio::test]
async fn test_transparent_pixels_keep_rgb_when_alpha_dropped() {
    let app = TestApp::new();
    let source = solid_png(4, 4, [0, 0, 255, 0]);

    for format in ["bmp", "webp"] {
        let form = MultipartBody::new()
            .file("clear.png", "image/png", &source)
            .text("format", format);
        let response = app.post_form("/convert-image/", form).await;

        common::assert_ok(&response);
        let decoded = image::load_from_memory(&response.body).unwrap();
        assert!(!decoded.color().has_alpha(), "{format}");
        assert_eq!(decoded.to_rgb8().get_pixel(0, 0).0, [0, 0, 255], "{format}");
    }
}

#[tokio::test]
async fn test_undecodable_file_rejected() {
    let app = TestApp::new();
    let form = MultipartBody::new()
        .file("broken.gif", "image/gif", b"GIF89a truncated")
        .text("format", "png");

    let response = app.post_form("/convert-image/", form).await;

    common::assert_json_error(&response, StatusCode::BAD_REQUEST);
}
