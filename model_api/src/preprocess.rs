use image::{imageops::FilterType, GenericImageView};
use ndarray::{Array, Ix4};
use thiserror::Error;

pub const INPUT_WIDTH: u32 = 224;
pub const INPUT_HEIGHT: u32 = 224;

#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("error reading image: {0}")]
    Read(std::io::Error),
    #[error("error decoding image: {0}")]
    Decode(image::ImageError),
}

/// Adapts uploaded image bytes into the tensor the classifier expects:
/// resized to 224x224, NHWC with a leading batch dimension, channels
/// scaled to [0, 1].
pub fn image_to_tensor(image_data: &[u8]) -> Result<Array<f32, Ix4>, PreprocessError> {
    let image_reader = image::ImageReader::new(std::io::Cursor::new(image_data))
        .with_guessed_format()
        .map_err(PreprocessError::Read)?;

    let img = image_reader
        .decode()
        .map_err(PreprocessError::Decode)?
        .resize_exact(INPUT_WIDTH, INPUT_HEIGHT, FilterType::CatmullRom);

    let mut input = Array::zeros((1, INPUT_HEIGHT as usize, INPUT_WIDTH as usize, 3));
    for pixel in img.pixels() {
        let x = pixel.0 as usize;
        let y = pixel.1 as usize;
        let [r, g, b, _] = pixel.2 .0;
        input[[0, y, x, 0]] = (r as f32) / 255.;
        input[[0, y, x, 1]] = (g as f32) / 255.;
        input[[0, y, x, 2]] = (b as f32) / 255.;
    }

    Ok(input)
}
