//! Resize backends for camera images.
use super::Interpolation;
use crate::error::ResizeError;
use ndarray::{Array3, ArrayView3};

/// Resizes `(H, W, C)` images.
pub trait ImageResize {
    /// Returns `img` resized to `(height, width, C)`.
    fn resize(
        &self,
        img: ArrayView3<u8>,
        height: u32,
        width: u32,
        interpolation: Interpolation,
    ) -> Result<Array3<u8>, ResizeError>;
}

/// Returns the resize backend compiled into the crate, if any.
pub fn default_resizer() -> Option<Box<dyn ImageResize>> {
    #[cfg(feature = "image")]
    {
        Some(Box::new(ImageOpsResizer))
    }
    #[cfg(not(feature = "image"))]
    {
        None
    }
}

fn check_size(img: &ArrayView3<u8>, height: u32, width: u32) -> Result<(), ResizeError> {
    let (h, w, _) = img.dim();
    if h == 0 || w == 0 || height == 0 || width == 0 {
        return Err(ResizeError::InvalidSize {
            from: (h, w),
            to: (height as usize, width as usize),
        });
    }
    Ok(())
}

/// Source indices and weights contributing to each destination index.
///
/// Weights of one destination index sum to 1.
fn area_weights(src: usize, dst: usize) -> Vec<Vec<(usize, f64)>> {
    let scale = src as f64 / dst as f64;
    (0..dst)
        .map(|o| {
            let start = o as f64 * scale;
            let end = start + scale;
            let first = start.floor() as usize;
            let last = (end.ceil() as usize).min(src);
            (first..last)
                .filter_map(|i| {
                    let w = end.min(i as f64 + 1.0) - start.max(i as f64);
                    if w > 1e-12 {
                        Some((i, w / scale))
                    } else {
                        None
                    }
                })
                .collect()
        })
        .collect()
}

/// Area interpolation: each output pixel is the mean of the source region it covers.
pub fn resize_area(img: ArrayView3<u8>, height: u32, width: u32) -> Result<Array3<u8>, ResizeError> {
    check_size(&img, height, width)?;
    let (h, w, c) = img.dim();
    let (height, width) = (height as usize, width as usize);
    let wy = area_weights(h, height);
    let wx = area_weights(w, width);
    let mut out = Array3::<u8>::zeros((height, width, c));
    let mut acc = vec![0f64; c];

    for (oy, ys) in wy.iter().enumerate() {
        for (ox, xs) in wx.iter().enumerate() {
            acc.iter_mut().for_each(|a| *a = 0.0);
            for &(y, fy) in ys.iter() {
                for &(x, fx) in xs.iter() {
                    let f = fy * fx;
                    for (ch, a) in acc.iter_mut().enumerate() {
                        *a += f * img[[y, x, ch]] as f64;
                    }
                }
            }
            for (ch, a) in acc.iter().enumerate() {
                out[[oy, ox, ch]] = a.round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    Ok(out)
}

#[cfg(feature = "image")]
pub use image_backend::ImageOpsResizer;

#[cfg(feature = "image")]
mod image_backend {
    use super::{check_size, resize_area, ImageResize, Interpolation};
    use crate::error::ResizeError;
    use image::{
        imageops::{resize, FilterType},
        ImageBuffer, Luma, Pixel, Rgb, Rgba,
    };
    use ndarray::{Array3, ArrayView3};

    /// Resize backend on top of the `image` crate.
    ///
    /// [`Interpolation::Area`] is computed by [`resize_area`]; other
    /// interpolations use [`image::imageops::resize`].
    pub struct ImageOpsResizer;

    fn resize_as<P>(
        img: ArrayView3<u8>,
        height: u32,
        width: u32,
        filter: FilterType,
    ) -> Result<Array3<u8>, ResizeError>
    where
        P: Pixel<Subpixel = u8> + 'static,
    {
        let (h, w, c) = img.dim();
        let raw: Vec<u8> = img.iter().cloned().collect();
        let buf = ImageBuffer::<P, Vec<u8>>::from_raw(w as u32, h as u32, raw)
            .ok_or_else(|| ResizeError::Shape(format!("{:?}", (h, w, c))))?;
        let out = resize(&buf, width, height, filter);
        Array3::from_shape_vec((height as usize, width as usize, c), out.into_raw())
            .map_err(|e| ResizeError::Shape(e.to_string()))
    }

    impl ImageResize for ImageOpsResizer {
        fn resize(
            &self,
            img: ArrayView3<u8>,
            height: u32,
            width: u32,
            interpolation: Interpolation,
        ) -> Result<Array3<u8>, ResizeError> {
            check_size(&img, height, width)?;
            let filter = match interpolation {
                Interpolation::Area => return resize_area(img, height, width),
                Interpolation::Nearest => FilterType::Nearest,
                Interpolation::Triangle => FilterType::Triangle,
                Interpolation::CatmullRom => FilterType::CatmullRom,
                Interpolation::Lanczos3 => FilterType::Lanczos3,
            };
            match img.dim().2 {
                1 => resize_as::<Luma<u8>>(img, height, width, filter),
                3 => resize_as::<Rgb<u8>>(img, height, width, filter),
                4 => resize_as::<Rgba<u8>>(img, height, width, filter),
                c => Err(ResizeError::UnsupportedChannels(c)),
            }
        }
    }
}
