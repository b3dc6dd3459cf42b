use crate::config::Settings;
use anyhow::Context;
use image::{ImageBuffer, Rgb};
use ndarray::{s, Array4, ArrayD};
use ndarray_npy::read_npy;
use std::io::Cursor;

/// Posts the first held-out test image to the running service and
/// prints the raw response for manual comparison against the expected
/// label. No assertion is made here; correctness is read off the logs.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let x_test: Array4<f32> = read_npy(&settings.data.x_test_path)
        .with_context(|| format!("failed to read {:?}", settings.data.x_test_path))?;
    let y_test: ArrayD<f32> = read_npy(&settings.data.y_test_path)
        .with_context(|| format!("failed to read {:?}", settings.data.y_test_path))?;

    tracing::info!("x_test shape: {:?}", x_test.shape());
    tracing::info!("y_test shape: {:?}", y_test.shape());
    if let Some(expected) = y_test.iter().next() {
        tracing::info!("first expected label: {}", expected);
    }

    let jpeg_data = encode_first_image(&x_test)?;

    let part = reqwest::multipart::Part::bytes(jpeg_data)
        .file_name("image.jpg")
        .mime_str("image/jpeg")?;
    let form = reqwest::multipart::Form::new().part("image", part);

    let response = reqwest::Client::new()
        .post(&settings.api.url)
        .multipart(form)
        .send()
        .await
        .with_context(|| format!("request to {} failed", settings.api.url))?;

    tracing::info!("response status: {}", response.status());
    println!("{}", response.text().await?);

    Ok(())
}

/// Rescales the first normalized image back to u8 and re-encodes it as
/// an in-memory JPEG, the same shape the service expects on upload.
fn encode_first_image(x_test: &Array4<f32>) -> anyhow::Result<Vec<u8>> {
    let (count, height, width, channels) = x_test.dim();
    anyhow::ensure!(count > 0, "x_test contains no images");
    anyhow::ensure!(channels == 3, "expected RGB images, got {} channels", channels);

    let first = x_test.slice(s![0, .., .., ..]);
    let mut img = ImageBuffer::<Rgb<u8>, Vec<u8>>::new(width as u32, height as u32);
    for (y, row) in first.outer_iter().enumerate() {
        for (x, pixel) in row.outer_iter().enumerate() {
            img.put_pixel(
                x as u32,
                y as u32,
                Rgb([to_u8(pixel[0usize]), to_u8(pixel[1usize]), to_u8(pixel[2usize])]),
            );
        }
    }

    let mut jpeg_data = Vec::new();
    img.write_to(&mut Cursor::new(&mut jpeg_data), image::ImageFormat::Jpeg)?;

    Ok(jpeg_data)
}

fn to_u8(value: f32) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}
